mod common;

use common::{Scene, chain, diamond};
use vista_geom::Vec3;
use vista_lighting::LightHandle;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

#[test]
fn diamond_aggregate_holds_light_once() {
    let mut scene = Scene::new(&diamond(10.0), 2);
    let light = LightHandle::omni(Vec3::new(11.0, 1.0, 11.0), 5.0, WHITE);
    scene.add("d", &light);

    assert!(scene.sees("b", &light));
    assert!(scene.sees("c", &light));
    assert_eq!(scene.count("a", &light), 1);
    assert_eq!(scene.count("d", &light), 1);
}

#[test]
fn seep_stops_at_max_depth() {
    let light = LightHandle::omni(Vec3::new(31.0, 5.0, 5.0), 25.0, WHITE);

    let mut scene = Scene::new(&chain(4), 2);
    scene.add("x3", &light);
    assert!(scene.sees("x2", &light));
    assert!(scene.sees("x1", &light));
    assert_eq!(scene.count("x0", &light), 0);

    let mut deeper = Scene::new(&chain(4), 3);
    deeper.add("x3", &light);
    assert!(deeper.sees("x0", &light));
}

#[test]
fn seep_requires_every_boundary_on_the_path() {
    let mut scene = Scene::new(&chain(3), 2);
    // Reaches the x1/x2 gate but not the x0/x1 gate.
    let light = LightHandle::omni(Vec3::new(22.0, 5.0, 5.0), 5.0, WHITE);
    scene.add("x2", &light);
    assert!(scene.sees("x1", &light));
    assert_eq!(scene.count("x0", &light), 0);
}

#[test]
fn light_near_shared_gate_seeps_both_ways() {
    let mut scene = Scene::new(&chain(2), 2);
    let west = LightHandle::omni(Vec3::new(9.5, 5.0, 5.0), 1.0, WHITE);
    let east = LightHandle::omni(Vec3::new(10.5, 5.0, 5.0), 1.0, WHITE);
    let far = LightHandle::omni(Vec3::new(8.0, 5.0, 5.0), 1.0, WHITE);
    scene.add("x0", &west);
    scene.add("x1", &east);
    scene.add("x0", &far);

    assert!(scene.sees("x1", &west));
    assert!(scene.sees("x0", &east));
    assert!(!scene.sees("x1", &far));
    assert!(scene.sees("x0", &far));
}

#[test]
fn directional_lights_skip_boundary_tests() {
    let mut scene = Scene::new(&chain(3), 2);
    let sun = LightHandle::directional(Vec3::new(0.0, -1.0, 0.0), WHITE);
    scene.add("x2", &sun);
    assert!(scene.sees("x0", &sun));
    assert!(scene.sees("x1", &sun));
}

#[test]
fn adding_marks_only_the_seep_neighbourhood_dirty() {
    let mut scene = Scene::new(&chain(4), 2);
    let ids: Vec<_> = (0..4).map(|i| scene.id(&format!("x{}", i))).collect();
    assert!(ids.iter().all(|id| !scene.lighting.is_dirty(*id)));

    let light = LightHandle::omni(Vec3::new(35.0, 5.0, 5.0), 1.0, WHITE);
    assert!(scene.lighting.add_light(&scene.world, ids[3], &light));
    assert!(!scene.lighting.add_light(&scene.world, ids[3], &light));
    assert!(!scene.lighting.is_dirty(ids[0]));
    assert!(ids[1..].iter().all(|id| scene.lighting.is_dirty(*id)));

    assert_eq!(scene.lighting.refresh_dirty(&scene.world), 3);
    assert!(ids.iter().all(|id| !scene.lighting.is_dirty(*id)));
    assert_eq!(scene.lighting.refresh_dirty(&scene.world), 0);
}

#[test]
fn update_on_clean_cache_is_idempotent() {
    let mut scene = Scene::new(&diamond(10.0), 2);
    scene.add("d", &LightHandle::omni(Vec3::new(11.0, 1.0, 11.0), 5.0, WHITE));
    scene.add("b", &LightHandle::omni(Vec3::new(15.0, 5.0, 5.0), 2.0, WHITE));
    let a = scene.id("a");
    let first = scene.lighting.all_lights(&scene.world, a).unwrap().clone();
    let second = scene.lighting.all_lights(&scene.world, a).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(first, scene.lighting.collect(&scene.world, a));
}

#[test]
fn removed_light_leaves_neighbours() {
    let mut scene = Scene::new(&diamond(10.0), 2);
    let light = LightHandle::omni(Vec3::new(11.0, 1.0, 11.0), 5.0, WHITE);
    scene.add("d", &light);
    assert!(scene.sees("a", &light));

    let d = scene.id("d");
    assert!(scene.lighting.remove_light(&scene.world, d, &light));
    assert!(!scene.lighting.remove_light(&scene.world, d, &light));
    assert_eq!(scene.count("a", &light), 0);
    assert_eq!(scene.count("d", &light), 0);
}

#[test]
fn unbinding_a_region_withdraws_its_lights() {
    let mut scene = Scene::new(&diamond(10.0), 2);
    let light = LightHandle::omni(Vec3::new(11.0, 1.0, 11.0), 5.0, WHITE);
    scene.add("d", &light);
    assert!(scene.sees("a", &light));

    let d = scene.id("d");
    scene.lighting.unbind(&scene.world, d);
    scene.world.unbind_region(d);
    assert_eq!(scene.count("a", &light), 0);
    assert_eq!(scene.count("b", &light), 0);
    assert!(scene.lighting.all_lights(&scene.world, d).is_none());
    assert!(scene.lighting.own_lights(d).unwrap().contains(&light));

    scene.world.bind_region(d);
    scene.lighting.bind(&scene.world, d);
    assert_eq!(scene.count("a", &light), 1);
}

#[test]
fn own_lights_outside_the_box_are_not_aggregated() {
    let mut scene = Scene::new(&chain(1), 2);
    let stray = LightHandle::omni(Vec3::new(30.0, 5.0, 5.0), 2.0, WHITE);
    scene.add("x0", &stray);
    let id = scene.id("x0");
    assert!(scene.lighting.own_lights(id).unwrap().contains(&stray));
    assert_eq!(scene.count("x0", &stray), 0);
}

#[test]
fn sky_regions_receive_sun_and_ambient() {
    let mut records = chain(2);
    records[0].sees_sky = true;
    let mut scene = Scene::new(&records, 2);
    let (x0, x1) = (scene.id("x0"), scene.id("x1"));
    let sun = scene.lighting.sun().clone();

    let all = scene.lighting.all_lights(&scene.world, x0).unwrap();
    assert!(all.contains(&sun));
    assert_ne!(all.ambient, [0.0; 3]);
    let all = scene.lighting.all_lights(&scene.world, x1).unwrap();
    assert!(!all.contains(&sun));
    assert_eq!(all.ambient, [0.0; 3]);
}
