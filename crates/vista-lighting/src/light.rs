use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vista_geom::{Aabb, Transform, Vec3};

/// Geometry of a light, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Infinitely distant; reaches everything it is seeded into.
    Directional { direction: Vec3 },
    Omni {
        position: Vec3,
        inner_radius: f32,
        outer_radius: f32,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        inner_radius: f32,
        outer_radius: f32,
        /// Cosine of the cone half-angle.
        cone_cos: f32,
    },
}

impl LightKind {
    /// Same geometry expressed through `t`. Radii scale by the largest axis
    /// scale so the bounding sphere stays conservative.
    pub fn transformed(&self, t: &Transform) -> LightKind {
        let s = t.max_scale();
        match *self {
            LightKind::Directional { direction } => LightKind::Directional {
                direction: t.apply_vector(direction).normalized(),
            },
            LightKind::Omni {
                position,
                inner_radius,
                outer_radius,
            } => LightKind::Omni {
                position: t.apply_point(position),
                inner_radius: inner_radius * s,
                outer_radius: outer_radius * s,
            },
            LightKind::Spot {
                position,
                direction,
                inner_radius,
                outer_radius,
                cone_cos,
            } => LightKind::Spot {
                position: t.apply_point(position),
                direction: t.apply_vector(direction).normalized(),
                inner_radius: inner_radius * s,
                outer_radius: outer_radius * s,
                cone_cos,
            },
        }
    }
}

/// A light source. Geometry can change while the light is shared; colour
/// and priority are fixed.
#[derive(Debug)]
pub struct Light {
    kind: RwLock<LightKind>,
    pub colour: [f32; 3],
    pub priority: i32,
}

impl Light {
    pub fn new(kind: LightKind, colour: [f32; 3], priority: i32) -> Self {
        Self {
            kind: RwLock::new(kind),
            colour,
            priority,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LightKind> {
        self.kind.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LightKind> {
        self.kind.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn kind(&self) -> LightKind {
        *self.read()
    }

    pub fn is_directional(&self) -> bool {
        matches!(*self.read(), LightKind::Directional { .. })
    }

    /// Centre and outer radius; `None` for directional lights.
    pub fn sphere(&self) -> Option<(Vec3, f32)> {
        match *self.read() {
            LightKind::Directional { .. } => None,
            LightKind::Omni {
                position,
                outer_radius,
                ..
            }
            | LightKind::Spot {
                position,
                outer_radius,
                ..
            } => Some((position, outer_radius)),
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        self.sphere().map(|(p, _)| p)
    }

    pub fn radius(&self) -> Option<f32> {
        self.sphere().map(|(_, r)| r)
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.sphere().map(|(c, r)| {
            let e = Vec3::new(r, r, r);
            Aabb::new(c - e, c + e)
        })
    }

    /// Moves a positional light. Directional lights are unchanged.
    pub fn set_position(&self, to: Vec3) {
        match &mut *self.write() {
            LightKind::Directional { .. } => {}
            LightKind::Omni { position, .. } | LightKind::Spot { position, .. } => *position = to,
        }
    }

    pub fn set_outer_radius(&self, to: f32) {
        match &mut *self.write() {
            LightKind::Directional { .. } => {}
            LightKind::Omni { outer_radius, .. } | LightKind::Spot { outer_radius, .. } => {
                *outer_radius = to
            }
        }
    }
}

/// Shared handle to a [`Light`]. Equality and hashing are by identity, so
/// two handles are equal only if they point at the same light.
#[derive(Clone, Debug)]
pub struct LightHandle(Arc<Light>);

impl LightHandle {
    pub fn new(light: Light) -> Self {
        Self(Arc::new(light))
    }

    pub fn omni(position: Vec3, radius: f32, colour: [f32; 3]) -> Self {
        Self::new(Light::new(
            LightKind::Omni {
                position,
                inner_radius: 0.0,
                outer_radius: radius,
            },
            colour,
            0,
        ))
    }

    pub fn directional(direction: Vec3, colour: [f32; 3]) -> Self {
        Self::new(Light::new(
            LightKind::Directional {
                direction: direction.normalized(),
            },
            colour,
            0,
        ))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &LightHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for LightHandle {
    type Target = Light;

    fn deref(&self) -> &Light {
        &self.0
    }
}

impl PartialEq for LightHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for LightHandle {}

impl Hash for LightHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}
