//! Static-mesh collision surface.
//!
//! Triangles are sorted into a node-splitting tree without clipping: a
//! triangle straddling or lying on a node's plane stays at that node, the
//! rest go to the front or back child. Queries prune a child when the whole
//! swept volume lies on the other side of the plane.

use vista_geom::{Aabb, Triangle, Vec3};

const PLANE_TOLERANCE: f32 = 1e-3;

#[derive(Clone, Debug)]
struct BspNode {
    normal: Vec3,
    d: f32,
    triangles: Vec<u32>,
    front: Option<u32>,
    back: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    triangles: Vec<Triangle>,
    root: Option<u32>,
    bounds: Aabb,
}

impl BspTree {
    /// Builds the tree. Triangles with no area are dropped since no sweep
    /// can report them.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| t.normal().length_squared() > 1e-12)
            .collect();
        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| t.v));
        let mut tree = BspTree {
            nodes: Vec::new(),
            triangles,
            root: None,
            bounds,
        };
        let all: Vec<u32> = (0..tree.triangles.len() as u32).collect();
        tree.root = tree.build(all);
        log::trace!(
            target: "collide",
            "bsp built tris={} nodes={}",
            tree.triangles.len(),
            tree.nodes.len()
        );
        tree
    }

    /// Axis-aligned box of `half_extents` around the origin, two triangles per face.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let p = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
        let quads = [
            [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
            [p(-1., 1., -1.), p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.)],
            [p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.), p(1., -1., -1.)],
            [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
            [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
            [p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.), p(1., -1., 1.)],
        ];
        let mut tris = Vec::with_capacity(12);
        for q in quads {
            tris.push(Triangle::new(q[0], q[1], q[2]));
            tris.push(Triangle::new(q[0], q[2], q[3]));
        }
        Self::new(tris)
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build(&mut self, indices: Vec<u32>) -> Option<u32> {
        if indices.is_empty() {
            return None;
        }
        let splitter = self.triangles[indices[indices.len() / 2] as usize];
        let normal = splitter.normal().normalized();
        let d = normal.dot(splitter.v[0]);

        let mut on = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();
        for i in indices {
            let tri = &self.triangles[i as usize];
            let (lo, hi) = tri
                .v
                .iter()
                .map(|v| normal.dot(*v) - d)
                .fold((f32::MAX, f32::MIN), |(lo, hi), s| (lo.min(s), hi.max(s)));
            if lo > PLANE_TOLERANCE {
                front.push(i);
            } else if hi < -PLANE_TOLERANCE {
                back.push(i);
            } else {
                on.push(i);
            }
        }

        let idx = self.nodes.len() as u32;
        self.nodes.push(BspNode {
            normal,
            d,
            triangles: on,
            front: None,
            back: None,
        });
        let f = self.build(front);
        let b = self.build(back);
        let node = &mut self.nodes[idx as usize];
        node.front = f;
        node.back = b;
        Some(idx)
    }

    /// Visits every triangle hit by `sweep` (local space) with its contact
    /// fraction. Returns false if `hit` asked to stop.
    pub fn collide(
        &self,
        sweep: &crate::Sweep,
        hit: &mut dyn FnMut(&Triangle, f32) -> bool,
    ) -> bool {
        let Some(root) = self.root else { return true };
        if !sweep.bounds().intersects(&self.bounds.expanded(PLANE_TOLERANCE)) {
            return true;
        }
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i as usize];
            for &ti in &node.triangles {
                let tri = &self.triangles[ti as usize];
                if let Some(t) = sweep.hit_fraction(tri) {
                    if !hit(tri, t) {
                        return false;
                    }
                }
            }
            let (lo, hi) = sweep.plane_range(node.normal, node.d);
            if let Some(front) = node.front {
                if hi >= -PLANE_TOLERANCE {
                    stack.push(front);
                }
            }
            if let Some(back) = node.back {
                if lo <= PLANE_TOLERANCE {
                    stack.push(back);
                }
            }
        }
        true
    }
}
