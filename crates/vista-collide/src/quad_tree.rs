use std::sync::Arc;

use vista_geom::{Aabb, Vec3};

use crate::Obstacle;

#[derive(Debug)]
struct QuadNode {
    min_x: f32,
    min_z: f32,
    size: f32,
    level: u32,
    children: Option<[u32; 4]>,
    elements: Vec<Arc<Obstacle>>,
}

impl QuadNode {
    fn covered_by(&self, min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> bool {
        min_x <= self.min_x
            && min_z <= self.min_z
            && max_x >= self.min_x + self.size
            && max_z >= self.min_z + self.size
    }

    fn overlaps(&self, min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> bool {
        min_x <= self.min_x + self.size
            && max_x >= self.min_x
            && min_z <= self.min_z + self.size
            && max_z >= self.min_z
    }
}

/// Per-column quad tree over the x/z square of one grid cell.
///
/// An obstacle is stored at every node whose square its bounds fully cover,
/// or at the deepest level otherwise; an obstacle that spans many nodes is
/// therefore seen several times by one traversal and relies on the query's
/// generation mark for dedup. Nodes live in one pool and are created lazily.
#[derive(Debug)]
pub struct ObstacleIndex {
    nodes: Vec<QuadNode>,
    depth: u32,
    inserted: usize,
}

impl ObstacleIndex {
    pub fn new(min_x: f32, min_z: f32, size: f32, depth: u32) -> Self {
        Self {
            nodes: vec![QuadNode {
                min_x,
                min_z,
                size,
                level: 0,
                children: None,
                elements: Vec::new(),
            }],
            depth,
            inserted: 0,
        }
    }

    /// Number of obstacles inserted (not node entries).
    #[inline]
    pub fn len(&self) -> usize {
        self.inserted
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts a static obstacle under every node its bounds cover.
    pub fn add(&mut self, obstacle: Arc<Obstacle>, bounds: &Aabb) {
        self.inserted += 1;
        let root = &self.nodes[0];
        let (min_x, min_z) = (bounds.min.x, bounds.min.z);
        let (max_x, max_z) = (bounds.max.x, bounds.max.z);
        if !root.overlaps(min_x, min_z, max_x, max_z) {
            log::trace!(target: "collide", "obstacle outside column square, kept at root");
            self.nodes[0].elements.push(obstacle);
            return;
        }
        self.insert(0, &obstacle, min_x, min_z, max_x, max_z);
    }

    fn insert(&mut self, node: u32, obstacle: &Arc<Obstacle>, min_x: f32, min_z: f32, max_x: f32, max_z: f32) {
        let n = &self.nodes[node as usize];
        if n.level >= self.depth || n.covered_by(min_x, min_z, max_x, max_z) {
            self.nodes[node as usize].elements.push(Arc::clone(obstacle));
            return;
        }
        let children = self.ensure_children(node);
        for child in children {
            if self.nodes[child as usize].overlaps(min_x, min_z, max_x, max_z) {
                self.insert(child, obstacle, min_x, min_z, max_x, max_z);
            }
        }
    }

    fn ensure_children(&mut self, node: u32) -> [u32; 4] {
        if let Some(c) = self.nodes[node as usize].children {
            return c;
        }
        let (min_x, min_z, size, level) = {
            let n = &self.nodes[node as usize];
            (n.min_x, n.min_z, n.size, n.level)
        };
        let half = size * 0.5;
        let base = self.nodes.len() as u32;
        for (dx, dz) in [(0.0, 0.0), (half, 0.0), (0.0, half), (half, half)] {
            self.nodes.push(QuadNode {
                min_x: min_x + dx,
                min_z: min_z + dz,
                size: half,
                level: level + 1,
                children: None,
                elements: Vec::new(),
            });
        }
        let c = [base, base + 1, base + 2, base + 3];
        self.nodes[node as usize].children = Some(c);
        c
    }

    /// Dynamic obstacles go straight to the root and are seen by every
    /// traversal of this column.
    pub fn add_to_root(&mut self, obstacle: Arc<Obstacle>) {
        self.inserted += 1;
        self.nodes[0].elements.push(obstacle);
    }

    pub fn remove_from_root(&mut self, obstacle: &Arc<Obstacle>) -> bool {
        let elements = &mut self.nodes[0].elements;
        match elements.iter().position(|o| Arc::ptr_eq(o, obstacle)) {
            Some(i) => {
                elements.swap_remove(i);
                self.inserted -= 1;
                true
            }
            None => false,
        }
    }

    /// Lazily yields candidate obstacles whose nodes the x/z footprint of the
    /// segment `start..end`, widened by `radius`, touches. Nearer nodes are
    /// visited first.
    pub fn traverse(&self, start: Vec3, end: Vec3, radius: f32) -> Traverse<'_> {
        Traverse {
            index: self,
            stack: vec![0],
            current: &[],
            start,
            delta: end - start,
            radius,
        }
    }

    fn segment_touches(&self, node: &QuadNode, start: Vec3, delta: Vec3, radius: f32) -> bool {
        let min = [node.min_x - radius, node.min_z - radius];
        let max = [node.min_x + node.size + radius, node.min_z + node.size + radius];
        let s = [start.x, start.z];
        let d = [delta.x, delta.z];
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        for axis in 0..2 {
            if d[axis].abs() < 1e-9 {
                if s[axis] < min[axis] || s[axis] > max[axis] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / d[axis];
            let a = (min[axis] - s[axis]) * inv;
            let b = (max[axis] - s[axis]) * inv;
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            t0 = t0.max(lo);
            t1 = t1.min(hi);
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

pub struct Traverse<'a> {
    index: &'a ObstacleIndex,
    stack: Vec<u32>,
    current: &'a [Arc<Obstacle>],
    start: Vec3,
    delta: Vec3,
    radius: f32,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Arc<Obstacle>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((first, rest)) = self.current.split_first() {
                self.current = rest;
                return Some(first);
            }
            let idx = self.stack.pop()?;
            let index = self.index;
            let node = &index.nodes[idx as usize];
            if !index.segment_touches(node, self.start, self.delta, self.radius) {
                continue;
            }
            if let Some(children) = node.children {
                let mut order = children.map(|c| {
                    let n = &index.nodes[c as usize];
                    let centre = Vec3::new(n.min_x + n.size * 0.5, 0.0, n.min_z + n.size * 0.5);
                    let along = (centre.x - self.start.x) * self.delta.x
                        + (centre.z - self.start.z) * self.delta.z;
                    (along, c)
                });
                // Far first on the stack so the nearest child pops next.
                order.sort_by(|a, b| b.0.total_cmp(&a.0));
                self.stack.extend(order.iter().map(|(_, c)| *c));
            }
            self.current = &node.elements;
        }
    }
}
