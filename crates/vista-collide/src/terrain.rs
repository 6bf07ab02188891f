//! Height-field collision surface.
//!
//! Vertices sit on a regular grid in local x/z with `spacing` between
//! samples. Triangles are produced only for the quads a query's bounds touch;
//! a quad is skipped when any of its four corners is flagged as a hole. The
//! quad diagonal alternates with `(x + z) % 2`.

use vista_geom::{Aabb, Triangle, TriangleFlags, Vec3};

#[derive(Clone, Debug)]
pub struct HeightField {
    spacing: f32,
    width: usize,
    depth: usize,
    heights: Vec<f32>,
    holes: Vec<bool>,
    bounds: Aabb,
}

impl HeightField {
    /// `heights` and `holes` are row-major with x varying fastest and must
    /// both hold `width * depth` samples (an empty `holes` means none).
    /// Returns `None` for fewer than 2x2 samples or mismatched lengths.
    pub fn new(
        spacing: f32,
        width: usize,
        depth: usize,
        heights: Vec<f32>,
        holes: Vec<bool>,
    ) -> Option<Self> {
        if width < 2 || depth < 2 || spacing <= 0.0 || heights.len() != width * depth {
            return None;
        }
        let holes = if holes.is_empty() {
            vec![false; width * depth]
        } else if holes.len() == width * depth {
            holes
        } else {
            return None;
        };
        let (lo, hi) = heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), h| (lo.min(*h), hi.max(*h)));
        let bounds = Aabb::new(
            Vec3::new(0.0, lo, 0.0),
            Vec3::new((width - 1) as f32 * spacing, hi, (depth - 1) as f32 * spacing),
        );
        Some(Self {
            spacing,
            width,
            depth,
            heights,
            holes,
            bounds,
        })
    }

    /// A flat field at height `y`.
    pub fn flat(spacing: f32, width: usize, depth: usize, y: f32) -> Option<Self> {
        Self::new(spacing, width, depth, vec![y; width * depth], Vec::new())
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    #[inline]
    fn vertex(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            x as f32 * self.spacing,
            self.heights[z * self.width + x],
            z as f32 * self.spacing,
        )
    }

    fn quad_is_hole(&self, x: usize, z: usize) -> bool {
        let w = self.width;
        self.holes[z * w + x]
            || self.holes[z * w + x + 1]
            || self.holes[(z + 1) * w + x]
            || self.holes[(z + 1) * w + x + 1]
    }

    fn push_quad(&self, x: usize, z: usize, out: &mut Vec<Triangle>) {
        let p00 = self.vertex(x, z);
        let p10 = self.vertex(x + 1, z);
        let p01 = self.vertex(x, z + 1);
        let p11 = self.vertex(x + 1, z + 1);
        let (a, b) = if (x + z) % 2 == 0 {
            (Triangle::new(p00, p11, p10), Triangle::new(p00, p01, p11))
        } else {
            (Triangle::new(p00, p01, p10), Triangle::new(p10, p01, p11))
        };
        out.push(a.with_flags(TriangleFlags::TERRAIN));
        out.push(b.with_flags(TriangleFlags::TERRAIN));
    }

    /// Appends the non-hole triangles of every quad overlapping the x/z
    /// range `[min, max]` (local space).
    pub fn triangles_in(&self, min: Vec3, max: Vec3, out: &mut Vec<Triangle>) {
        let quads_x = (self.width - 1) as i64;
        let quads_z = (self.depth - 1) as i64;
        let x0 = ((min.x / self.spacing).floor() as i64).max(0);
        let z0 = ((min.z / self.spacing).floor() as i64).max(0);
        let x1 = ((max.x / self.spacing).floor() as i64).min(quads_x - 1);
        let z1 = ((max.z / self.spacing).floor() as i64).min(quads_z - 1);
        for z in z0..=z1 {
            for x in x0..=x1 {
                let (x, z) = (x as usize, z as usize);
                if !self.quad_is_hole(x, z) {
                    self.push_quad(x, z, out);
                }
            }
        }
    }

    pub fn collide(&self, sweep: &crate::Sweep, hit: &mut dyn FnMut(&Triangle, f32) -> bool) -> bool {
        let bb = sweep.bounds();
        if !bb.intersects(&self.bounds) {
            return true;
        }
        let mut tris = Vec::new();
        self.triangles_in(bb.min, bb.max, &mut tris);
        for tri in &tris {
            if let Some(t) = sweep.hit_fraction(tri) {
                if !hit(tri, t) {
                    return false;
                }
            }
        }
        true
    }

    /// Height of the surface at local `(x, z)`, or `None` outside the field
    /// or over a hole.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let top = self.bounds.max.y + 1.0;
        let drop = top - self.bounds.min.y + 1.0;
        let sweep = crate::Sweep::ray(Vec3::new(x, top, z), Vec3::new(x, top - drop, z));
        let mut best: Option<f32> = None;
        self.collide(&sweep, &mut |_, t| {
            best = Some(best.map_or(t, |b: f32| b.min(t)));
            true
        });
        best.map(|t| top - t * drop)
    }
}
