use hashbrown::HashMap;
use vista_collide::ObstacleIndex;
use vista_geom::{Aabb, Vec3};

use crate::{GridSpan, RegionId, SpaceConfig};

/// Contents of one grid cell.
#[derive(Debug)]
pub struct Column {
    pub x: i32,
    pub z: i32,
    index: ObstacleIndex,
    regions: Vec<RegionId>,
    /// Set while some bound region overlapping this cell has not been
    /// focused into it yet.
    pub(crate) stale: bool,
}

impl Column {
    fn new(x: i32, z: i32, grid_size: f32, depth: u32) -> Self {
        Self {
            x,
            z,
            index: ObstacleIndex::new(x as f32 * grid_size, z as f32 * grid_size, grid_size, depth),
            regions: Vec::new(),
            stale: false,
        }
    }

    #[inline]
    pub fn index(&self) -> &ObstacleIndex {
        &self.index
    }

    #[inline]
    pub(crate) fn index_mut(&mut self) -> &mut ObstacleIndex {
        &mut self.index
    }

    #[inline]
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    #[inline]
    pub fn holds(&self, id: RegionId) -> bool {
        self.regions.contains(&id)
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn add_region(&mut self, id: RegionId) {
        if !self.holds(id) {
            self.regions.push(id);
        }
    }
}

/// Fixed-size x/z grid of lazily created columns.
#[derive(Debug)]
pub struct RegionGrid {
    grid_size: f32,
    tree_depth: u32,
    span: GridSpan,
    columns: HashMap<(i32, i32), Column>,
}

impl RegionGrid {
    pub fn new(config: &SpaceConfig) -> Self {
        Self {
            grid_size: config.grid_size,
            tree_depth: config.obstacle_tree_depth,
            span: config.span,
            columns: HashMap::new(),
        }
    }

    #[inline]
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    #[inline]
    pub fn span(&self) -> GridSpan {
        self.span
    }

    #[inline]
    pub fn cell_of(&self, p: Vec3) -> (i32, i32) {
        (
            (p.x / self.grid_size).floor() as i32,
            (p.z / self.grid_size).floor() as i32,
        )
    }

    /// Cells whose square overlaps `bb` in x/z.
    pub fn cells_overlapping(&self, bb: &Aabb) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (x0, z0) = self.cell_of(bb.min);
        let (x1, z1) = self.cell_of(bb.max);
        (z0..=z1).flat_map(move |z| (x0..=x1).map(move |x| (x, z)))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    #[inline]
    pub fn column_at(&self, x: i32, z: i32) -> Option<&Column> {
        self.columns.get(&(x, z))
    }

    /// Column under `point`, if it exists. Queries never create columns.
    pub fn column(&self, point: Vec3) -> Option<&Column> {
        let (x, z) = self.cell_of(point);
        self.column_at(x, z)
    }

    /// Column at grid coordinates, created on demand when `can_create` and
    /// the coordinates are inside the span. The flag reports a creation.
    pub(crate) fn column_at_mut(&mut self, x: i32, z: i32, can_create: bool) -> Option<(&mut Column, bool)> {
        if self.columns.contains_key(&(x, z)) {
            return self.columns.get_mut(&(x, z)).map(|c| (c, false));
        }
        if !can_create || !self.span.contains(x, z) {
            return None;
        }
        let (size, depth) = (self.grid_size, self.tree_depth);
        let column = self
            .columns
            .entry((x, z))
            .or_insert_with(|| Column::new(x, z, size, depth));
        Some((column, true))
    }

    pub fn column_mut(&mut self, point: Vec3, can_create: bool) -> Option<&mut Column> {
        let (x, z) = self.cell_of(point);
        self.column_at_mut(x, z, can_create).map(|(c, _)| c)
    }

    /// The cells `bounds` spans plus a one-cell margin.
    pub fn margin_cells(&self, bounds: &Aabb) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (x0, z0) = self.cell_of(bounds.min);
        let (x1, z1) = self.cell_of(bounds.max);
        (z0 - 1..=z1 + 1).flat_map(move |z| (x0 - 1..=x1 + 1).map(move |x| (x, z)))
    }

    /// Destroys every populated column around `bounds`: the cells it spans
    /// plus a one-cell margin. Returns the regions those columns held.
    pub fn ignore_region(&mut self, bounds: &Aabb) -> Vec<RegionId> {
        let mut evicted = Vec::new();
        for (x, z) in self.margin_cells(bounds) {
            if let Some(column) = self.columns.remove(&(x, z)) {
                log::trace!(target: "world", "column ({}, {}) destroyed", x, z);
                for id in column.regions {
                    if !evicted.contains(&id) {
                        evicted.push(id);
                    }
                }
            }
        }
        evicted
    }

    /// Moves the span and drops columns that fall outside it. Returns the
    /// regions those columns held.
    pub fn set_span(&mut self, span: GridSpan) -> Vec<RegionId> {
        self.span = span;
        let outside: Vec<(i32, i32)> = self
            .columns
            .keys()
            .copied()
            .filter(|(x, z)| !span.contains(*x, *z))
            .collect();
        let mut evicted = Vec::new();
        for key in outside {
            if let Some(column) = self.columns.remove(&key) {
                for id in column.regions {
                    if !evicted.contains(&id) {
                        evicted.push(id);
                    }
                }
            }
        }
        evicted
    }
}
