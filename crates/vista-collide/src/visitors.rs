//! Stock collision visitors.

use vista_geom::Triangle;

use crate::{CollideVerdict, CollisionVisitor, Obstacle};

/// Finds the nearest hit of any kind.
#[derive(Debug, Default)]
pub struct ClosestObstacle {
    pub distance: Option<f32>,
    pub item: Option<String>,
}

impl CollisionVisitor for ClosestObstacle {
    fn visit(&mut self, obstacle: &Obstacle, _triangle: &Triangle, distance: f32) -> CollideVerdict {
        self.distance = Some(distance);
        self.item = obstacle.owner().map(|o| o.name.clone());
        CollideVerdict::CollideBefore
    }
}

/// Stops at the first hit; for line-of-sight style checks.
#[derive(Debug, Default)]
pub struct AnyObstacle {
    pub hit: bool,
}

impl CollisionVisitor for AnyObstacle {
    fn visit(&mut self, _obstacle: &Obstacle, _triangle: &Triangle, _distance: f32) -> CollideVerdict {
        self.hit = true;
        CollideVerdict::Stop
    }
}

/// Nearest terrain triangle; everything else is passed over.
#[derive(Debug, Default)]
pub struct ClosestTerrain {
    pub distance: Option<f32>,
}

impl CollisionVisitor for ClosestTerrain {
    fn visit(&mut self, _obstacle: &Obstacle, triangle: &Triangle, distance: f32) -> CollideVerdict {
        if !triangle.is_terrain() {
            return CollideVerdict::CollideAll;
        }
        self.distance = Some(distance);
        CollideVerdict::CollideBefore
    }
}

/// Nearest hit together with the world-space triangle it struck.
#[derive(Debug, Default)]
pub struct ClosestTriangle {
    pub hit: Option<(Triangle, f32)>,
}

impl CollisionVisitor for ClosestTriangle {
    fn visit(&mut self, _obstacle: &Obstacle, triangle: &Triangle, distance: f32) -> CollideVerdict {
        self.hit = Some((*triangle, distance));
        CollideVerdict::CollideBefore
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedHit {
    pub item: String,
    pub region: String,
    pub distance: f32,
    pub triangle: Triangle,
}

/// Records every hit in report order.
#[derive(Debug, Default)]
pub struct HitRecorder {
    pub hits: Vec<RecordedHit>,
}

impl CollisionVisitor for HitRecorder {
    fn visit(&mut self, obstacle: &Obstacle, triangle: &Triangle, distance: f32) -> CollideVerdict {
        let (item, region) = obstacle
            .owner()
            .map(|o| (o.name.clone(), o.region.clone()))
            .unwrap_or_default();
        self.hits.push(RecordedHit {
            item,
            region,
            distance,
            triangle: *triangle,
        });
        CollideVerdict::CollideAll
    }
}
