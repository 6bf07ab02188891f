use crate::Vec3;

/// Affine transform stored as three basis columns plus a translation.
///
/// `apply_point(p) = origin + x_axis * p.x + y_axis * p.y + z_axis * p.z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub origin: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x_axis: Vec3::new(1.0, 0.0, 0.0),
        y_axis: Vec3::new(0.0, 1.0, 0.0),
        z_axis: Vec3::new(0.0, 0.0, 1.0),
        origin: Vec3::ZERO,
    };

    #[inline]
    pub fn translation(v: Vec3) -> Self {
        Self {
            origin: v,
            ..Self::IDENTITY
        }
    }

    /// Rotation about +Y by `radians` (counter-clockwise looking down -Y).
    pub fn rotation_y(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x_axis: Vec3::new(c, 0.0, -s),
            y_axis: Vec3::UP,
            z_axis: Vec3::new(s, 0.0, c),
            origin: Vec3::ZERO,
        }
    }

    pub fn from_yaw_translation(yaw_radians: f32, translation: Vec3) -> Self {
        let mut t = Self::rotation_y(yaw_radians);
        t.origin = translation;
        t
    }

    #[inline]
    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        self.origin + self.apply_vector(p)
    }

    #[inline]
    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        self.x_axis * v.x + self.y_axis * v.y + self.z_axis * v.z
    }

    /// `self * rhs`: applies `rhs` first, then `self`.
    pub fn then_from(&self, rhs: &Transform) -> Transform {
        Transform {
            x_axis: self.apply_vector(rhs.x_axis),
            y_axis: self.apply_vector(rhs.y_axis),
            z_axis: self.apply_vector(rhs.z_axis),
            origin: self.apply_point(rhs.origin),
        }
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.x_axis.dot(self.y_axis.cross(self.z_axis))
    }

    /// Inverse transform, or `None` for a singular basis.
    pub fn inverse(&self) -> Option<Transform> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        // Rows of the inverse basis are the cofactor columns.
        let r0 = self.y_axis.cross(self.z_axis) * inv_det;
        let r1 = self.z_axis.cross(self.x_axis) * inv_det;
        let r2 = self.x_axis.cross(self.y_axis) * inv_det;
        let x_axis = Vec3::new(r0.x, r1.x, r2.x);
        let y_axis = Vec3::new(r0.y, r1.y, r2.y);
        let z_axis = Vec3::new(r0.z, r1.z, r2.z);
        let mut inv = Transform {
            x_axis,
            y_axis,
            z_axis,
            origin: Vec3::ZERO,
        };
        inv.origin = -inv.apply_vector(self.origin);
        Some(inv)
    }

    /// Largest axis length; scales radii conservatively.
    pub fn max_scale(&self) -> f32 {
        self.x_axis
            .length()
            .max(self.y_axis.length())
            .max(self.z_axis.length())
    }
}
