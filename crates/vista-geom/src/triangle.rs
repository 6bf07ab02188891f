use crate::{Aabb, Transform, Vec3};

/// Material-independent triangle tags carried through collision results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TriangleFlags(pub u8);

impl TriangleFlags {
    pub const NONE: TriangleFlags = TriangleFlags(0);
    /// Generated from a height field.
    pub const TERRAIN: TriangleFlags = TriangleFlags(1 << 0);
    /// Part of a region boundary polygon.
    pub const GATE: TriangleFlags = TriangleFlags(1 << 1);

    #[inline]
    pub fn contains(self, other: TriangleFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for TriangleFlags {
    type Output = TriangleFlags;
    fn bitor(self, rhs: TriangleFlags) -> TriangleFlags {
        TriangleFlags(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v: [Vec3; 3],
    pub flags: TriangleFlags,
}

const AXIS_EPS: f32 = 1e-12;

impl Triangle {
    #[inline]
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            v: [a, b, c],
            flags: TriangleFlags::NONE,
        }
    }

    #[inline]
    pub const fn with_flags(mut self, flags: TriangleFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn is_terrain(&self) -> bool {
        self.flags.contains(TriangleFlags::TERRAIN)
    }

    /// Unnormalised face normal, `(v1 - v0) x (v2 - v0)`.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        (self.v[1] - self.v[0]).cross(self.v[2] - self.v[0])
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.v)
    }

    pub fn transformed(&self, t: &Transform) -> Triangle {
        Triangle {
            v: self.v.map(|p| t.apply_point(p)),
            flags: self.flags,
        }
    }

    pub fn translated(&self, by: Vec3) -> Triangle {
        Triangle {
            v: self.v.map(|p| p + by),
            flags: self.flags,
        }
    }

    /// Two-sided segment test. Returns the fraction along `delta` at which the
    /// segment starting at `start` crosses the triangle.
    pub fn intersect_segment(&self, start: Vec3, delta: Vec3) -> Option<f32> {
        let e1 = self.v[1] - self.v[0];
        let e2 = self.v[2] - self.v[0];
        let p = delta.cross(e2);
        let det = e1.dot(p);
        if det.abs() < 1e-10 {
            return None;
        }
        let inv = 1.0 / det;
        let s = start - self.v[0];
        let u = s.dot(p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = delta.dot(q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv;
        (0.0..=1.0).contains(&t).then_some(t)
    }

    /// Continuous separating-axis test of `moving` translated by `delta`
    /// against `self`. Returns the first contact fraction in `[0, 1]`.
    pub fn sweep_triangle(&self, moving: &Triangle, delta: Vec3) -> Option<f32> {
        let a = &moving.v;
        let b = &self.v;
        let ea = [a[1] - a[0], a[2] - a[1], a[0] - a[2]];
        let eb = [b[1] - b[0], b[2] - b[1], b[0] - b[2]];
        let na = moving.normal();
        let nb = self.normal();

        let mut axes: Vec<Vec3> = Vec::with_capacity(17);
        axes.push(na);
        axes.push(nb);
        for ai in ea {
            for bi in eb {
                axes.push(ai.cross(bi));
            }
            axes.push(na.cross(ai));
        }
        for bi in eb {
            axes.push(nb.cross(bi));
        }

        let mut t_enter = 0.0f32;
        let mut t_exit = 1.0f32;
        for axis in axes {
            if axis.length_squared() < AXIS_EPS {
                continue;
            }
            let (amin, amax) = project(a, axis);
            let (bmin, bmax) = project(b, axis);
            let speed = delta.dot(axis);
            if speed.abs() < AXIS_EPS {
                if amin > bmax || amax < bmin {
                    return None;
                }
                continue;
            }
            let t0 = (bmin - amax) / speed;
            let t1 = (bmax - amin) / speed;
            let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
            t_enter = t_enter.max(lo);
            t_exit = t_exit.min(hi);
            if t_enter > t_exit {
                return None;
            }
        }
        Some(t_enter)
    }
}

#[inline]
fn project(pts: &[Vec3; 3], axis: Vec3) -> (f32, f32) {
    let d0 = pts[0].dot(axis);
    let d1 = pts[1].dot(axis);
    let d2 = pts[2].dot(axis);
    (d0.min(d1).min(d2), d0.max(d1).max(d2))
}
