mod common;

use std::sync::Arc;

use common::{Side, block, build, gate, square, wall};
use vista_collide::{BspTree, ClosestObstacle, CollisionItem, ShapeAdapter};
use vista_geom::{Aabb, Transform, Vec3};
use vista_world::record::BoundaryRecord;

fn pair() -> Vec<vista_world::RegionRecord> {
    vec![
        square("a", [0.0, 0.0, 0.0], 10.0, vec![gate(Side::East, 10.0, "b")]),
        square("b", [10.0, 0.0, 0.0], 10.0, vec![gate(Side::West, 10.0, "a")]),
    ]
}

#[test]
fn matched_boundaries_link_both_ways() {
    let (world, ids) = build(&pair(), 10.0);
    let a = world.region(ids[0]).unwrap();
    let b = world.region(ids[1]).unwrap();
    assert_eq!(a.boundaries[0].neighbor, Some(ids[1]));
    assert_eq!(b.boundaries[0].neighbor, Some(ids[0]));
    assert_eq!(a.neighbors().collect::<Vec<_>>(), vec![(0, ids[1])]);
}

#[test]
fn link_waits_for_neighbour_and_survives_rebind() {
    let (mut world, ids) = build(&pair()[..1], 10.0);
    assert!(!world.region(ids[0]).unwrap().boundaries[0].is_bound());

    let assets = common::assets();
    let b = world.load_region(pair()[1].prepare(&assets).unwrap()).unwrap();
    assert!(!world.region(ids[0]).unwrap().boundaries[0].is_bound());
    world.bind_region(b);
    assert_eq!(world.region(ids[0]).unwrap().boundaries[0].neighbor, Some(b));

    world.unbind_region(b);
    assert_eq!(world.region(ids[0]).unwrap().boundaries[0].neighbor, None);
    assert_eq!(world.region(b).unwrap().boundaries[0].neighbor, None);

    world.bind_region(b);
    assert_eq!(world.region(ids[0]).unwrap().boundaries[0].neighbor, Some(b));
    assert_eq!(world.region(b).unwrap().boundaries[0].neighbor, Some(ids[0]));
}

#[test]
fn non_coincident_boundaries_stay_unlinked() {
    let a = square("a", [0.0, 0.0, 0.0], 10.0, vec![gate(Side::East, 10.0, "b")]);
    // Names a, but its polygon is the half-height wall.
    let b = square(
        "b",
        [10.0, 0.0, 0.0],
        10.0,
        vec![BoundaryRecord {
            neighbor: Some("a".into()),
            points: wall(Side::West, 10.0, 0.0, 5.0),
            collide: false,
        }],
    );
    let (world, ids) = build(&[a, b], 10.0);
    assert!(!world.region(ids[0]).unwrap().boundaries[0].is_bound());
    assert!(!world.region(ids[1]).unwrap().boundaries[0].is_bound());
}

#[test]
fn external_boundaries_never_link() {
    let a = square(
        "a",
        [0.0, 0.0, 0.0],
        10.0,
        vec![BoundaryRecord {
            neighbor: None,
            points: wall(Side::East, 10.0, 0.0, 10.0),
            collide: false,
        }],
    );
    let (world, ids) = build(&[a, pair().remove(1)], 10.0);
    let region = world.region(ids[0]).unwrap();
    assert!(region.boundaries[0].is_external());
    assert!(!region.boundaries[0].is_bound());
}

#[test]
fn dynamic_obstacles_move_and_leave() {
    let (mut world, _) = build(&pair(), 10.0);
    let item = CollisionItem::new("barrel", "", Aabb::new(Vec3::ZERO, Vec3::ZERO));
    let shape = ShapeAdapter::Mesh(Arc::new(BspTree::cuboid(Vec3::new(1.0, 1.0, 1.0))));
    let near = (Vec3::new(0.0, 1.3, 5.2), Vec3::new(9.0, 1.3, 5.2));
    let far = (Vec3::new(31.0, 1.3, 15.2), Vec3::new(39.0, 1.3, 15.2));

    let id = world
        .add_dynamic_obstacle(&item, Transform::translation(Vec3::new(5.0, 1.0, 5.0)), shape)
        .unwrap();
    let mut closest = ClosestObstacle::default();
    assert!((world.collide_ray(near.0, near.1, &mut closest) - 4.0).abs() < 1e-3);
    assert_eq!(closest.item.as_deref(), Some("barrel"));

    // Nothing is bound out there; the column is created for it.
    assert!(world.grid().column_at(3, 1).is_none());
    assert!(world.move_dynamic_obstacle(id, Transform::translation(Vec3::new(35.0, 1.0, 15.0))));
    assert!(world.grid().column_at(3, 1).is_some());
    assert!(world.line_of_sight(near.0, near.1));
    assert!(!world.line_of_sight(far.0, far.1));

    assert!(world.remove_dynamic_obstacle(id));
    assert!(!world.remove_dynamic_obstacle(id));
    assert!(world.line_of_sight(far.0, far.1));
}

#[test]
fn dynamic_obstacles_survive_region_churn() {
    let (mut world, ids) = build(&pair(), 10.0);
    let item = CollisionItem::new("barrel", "", Aabb::new(Vec3::ZERO, Vec3::ZERO));
    let shape = ShapeAdapter::Mesh(Arc::new(BspTree::cuboid(Vec3::new(1.0, 1.0, 1.0))));
    world
        .add_dynamic_obstacle(&item, Transform::translation(Vec3::new(5.0, 1.0, 5.0)), shape)
        .unwrap();

    world.unbind_region(ids[1]);
    world.bind_region(ids[1]);
    assert!(!world.line_of_sight(Vec3::new(0.0, 1.3, 5.2), Vec3::new(9.0, 1.3, 5.2)));
}

#[test]
fn dropped_owner_detaches_dynamic_obstacle() {
    let (mut world, _) = build(&pair(), 10.0);
    let item = CollisionItem::new("ghost", "", Aabb::new(Vec3::ZERO, Vec3::ZERO));
    let shape = ShapeAdapter::Mesh(Arc::new(BspTree::cuboid(Vec3::new(1.0, 1.0, 1.0))));
    let id = world
        .add_dynamic_obstacle(&item, Transform::translation(Vec3::new(5.0, 1.0, 5.0)), shape)
        .unwrap();
    drop(item);
    assert!(world.line_of_sight(Vec3::new(0.0, 1.3, 5.2), Vec3::new(9.0, 1.3, 5.2)));
    assert!(!world.move_dynamic_obstacle(id, Transform::IDENTITY));
}

#[test]
fn dynamic_obstacle_outlives_margin_column_teardown() {
    let (mut world, ids) = build(&[block("a", [0.0; 3], [9.0, 10.0, 9.0], Vec::new())], 10.0);
    let item = CollisionItem::new("barrel", "", Aabb::new(Vec3::ZERO, Vec3::ZERO));
    let shape = ShapeAdapter::Mesh(Arc::new(BspTree::cuboid(Vec3::new(1.0, 1.0, 1.0))));
    world
        .add_dynamic_obstacle(&item, Transform::translation(Vec3::new(15.0, 1.0, 5.0)), shape)
        .unwrap();
    let (from, to) = (Vec3::new(11.0, 1.3, 5.2), Vec3::new(19.0, 1.3, 5.2));
    assert!(!world.line_of_sight(from, to));

    // Cell (1, 0) lies in the margin of "a" and holds no region.
    world.unbind_region(ids[0]);
    let column = world.grid().column_at(1, 0).unwrap();
    assert!(column.regions().is_empty());
    let mut closest = ClosestObstacle::default();
    assert!((world.collide_ray(from, to, &mut closest) - 3.0).abs() < 1e-3);

    world.bind_region(ids[0]);
    assert!(!world.line_of_sight(from, to));
    assert!(world.grid().column_at(0, 0).unwrap().holds(ids[0]));
}
