use crate::{Aabb, Transform, Triangle, Vec3};

/// Planar convex polygon with a cached unit normal (Newell's method) and
/// plane offset `d` such that `normal.dot(p) == d` for points on the plane.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolygon {
    points: Vec<Vec3>,
    normal: Vec3,
    d: f32,
}

const PLANAR_TOLERANCE: f32 = 1e-3;

impl ConvexPolygon {
    /// Returns `None` for fewer than three points, a degenerate area, or
    /// points that stray off the fitted plane.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut n = Vec3::ZERO;
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        if n.length_squared() <= 1e-12 {
            return None;
        }
        let normal = n.normalized();
        let centroid = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / points.len() as f32;
        let d = normal.dot(centroid);
        let scale = Aabb::from_points(points.iter().copied()).extent().length().max(1.0);
        if points
            .iter()
            .any(|p| (normal.dot(*p) - d).abs() > PLANAR_TOLERANCE * scale)
        {
            return None;
        }
        Some(Self { points, normal, d })
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.d
    }

    pub fn centroid(&self) -> Vec3 {
        self.points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / self.points.len() as f32
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
    }

    pub fn transformed(&self, t: &Transform) -> ConvexPolygon {
        let points: Vec<Vec3> = self.points.iter().map(|p| t.apply_point(*p)).collect();
        let normal = t.apply_vector(self.normal);
        // A rigid or uniformly scaled basis keeps the polygon planar; refit
        // from the first point rather than re-running validation.
        let normal = if normal.length_squared() > 0.0 {
            normal.normalized()
        } else {
            self.normal
        };
        let d = normal.dot(points[0]);
        ConvexPolygon { points, normal, d }
    }

    /// True when the projection of `p` onto the plane lies inside the polygon.
    fn projection_inside(&self, p: Vec3) -> bool {
        let n = self.points.len();
        (0..n).all(|i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            (b - a).cross(p - a).dot(self.normal) >= -1e-6
        })
    }

    /// Distance from `p` to the closest point of the polygon's area.
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        let dist = self.signed_distance(p);
        let on_plane = p - self.normal * dist;
        if self.projection_inside(on_plane) {
            return dist.abs();
        }
        let n = self.points.len();
        (0..n)
            .map(|i| segment_distance(p, self.points[i], self.points[(i + 1) % n]))
            .fold(f32::MAX, f32::min)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        if self.signed_distance(center).abs() > radius {
            return false;
        }
        self.distance_to_point(center) <= radius
    }

    /// Same vertex set within `eps`, in any winding or starting vertex.
    pub fn coincides(&self, other: &ConvexPolygon, eps: f32) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .all(|p| other.points.iter().any(|q| p.distance(*q) <= eps))
    }

    /// Fan triangulation around the first vertex.
    pub fn triangles(&self) -> Vec<Triangle> {
        (1..self.points.len() - 1)
            .map(|i| Triangle::new(self.points[0], self.points[i], self.points[i + 1]))
            .collect()
    }
}

fn segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}
