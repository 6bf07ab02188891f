use crate::{LightHandle, LightKind};

/// A set of lights grouped by kind, plus an ambient colour. Membership is
/// by handle identity; adding a handle twice is a no-op.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightContainer {
    pub ambient: [f32; 3],
    directionals: Vec<LightHandle>,
    omnis: Vec<LightHandle>,
    spots: Vec<LightHandle>,
}

impl LightContainer {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, light: &LightHandle) -> &Vec<LightHandle> {
        match light.kind() {
            LightKind::Directional { .. } => &self.directionals,
            LightKind::Omni { .. } => &self.omnis,
            LightKind::Spot { .. } => &self.spots,
        }
    }

    fn bucket_mut(&mut self, light: &LightHandle) -> &mut Vec<LightHandle> {
        match light.kind() {
            LightKind::Directional { .. } => &mut self.directionals,
            LightKind::Omni { .. } => &mut self.omnis,
            LightKind::Spot { .. } => &mut self.spots,
        }
    }

    pub fn contains(&self, light: &LightHandle) -> bool {
        self.bucket(light).iter().any(|l| l.ptr_eq(light))
    }

    /// Returns false if the light was already present.
    pub fn add(&mut self, light: &LightHandle) -> bool {
        if self.contains(light) {
            return false;
        }
        self.bucket_mut(light).push(light.clone());
        true
    }

    /// Returns false if the light was not present.
    pub fn remove(&mut self, light: &LightHandle) -> bool {
        let bucket = self.bucket_mut(light);
        match bucket.iter().position(|l| l.ptr_eq(light)) {
            Some(i) => {
                bucket.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn directionals(&self) -> &[LightHandle] {
        &self.directionals
    }

    pub fn omnis(&self) -> &[LightHandle] {
        &self.omnis
    }

    pub fn spots(&self) -> &[LightHandle] {
        &self.spots
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightHandle> {
        self.directionals
            .iter()
            .chain(self.omnis.iter())
            .chain(self.spots.iter())
    }

    pub fn len(&self) -> usize {
        self.directionals.len() + self.omnis.len() + self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.ambient = [0.0; 3];
        self.directionals.clear();
        self.omnis.clear();
        self.spots.clear();
    }
}

/// Per-region light state.
#[derive(Debug, Default)]
pub struct EmissionCache {
    pub(crate) own: LightContainer,
    /// Own lights plus everything seeping in; `None` until first computed.
    pub(crate) all: Option<LightContainer>,
    pub(crate) dirty: bool,
    pub(crate) sees_sky: bool,
}

impl EmissionCache {
    #[inline]
    pub fn own(&self) -> &LightContainer {
        &self.own
    }

    /// Last computed aggregate, which may be stale while dirty.
    #[inline]
    pub fn aggregate(&self) -> Option<&LightContainer> {
        self.all.as_ref()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn sees_sky(&self) -> bool {
        self.sees_sky
    }
}
