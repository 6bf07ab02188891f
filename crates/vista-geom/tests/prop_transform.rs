use proptest::prelude::*;
use vista_geom::{Aabb, Transform, Vec3};

fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps && (a.z - b.z).abs() <= eps
}

fn small_f32() -> impl Strategy<Value = f32> {
    -1_000.0f32..1_000.0
}

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (small_f32(), small_f32(), small_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_rigid() -> impl Strategy<Value = Transform> {
    (-std::f32::consts::PI..std::f32::consts::PI, small_vec3())
        .prop_map(|(yaw, t)| Transform::from_yaw_translation(yaw, t))
}

proptest! {
    #[test]
    fn inverse_round_trips_points(t in arb_rigid(), p in small_vec3()) {
        let inv = t.inverse().unwrap();
        prop_assert!(vapprox(inv.apply_point(t.apply_point(p)), p, 1e-2));
    }

    #[test]
    fn compose_matches_sequential_application(a in arb_rigid(), b in arb_rigid(), p in small_vec3()) {
        let ab = a.then_from(&b);
        prop_assert!(vapprox(ab.apply_point(p), a.apply_point(b.apply_point(p)), 1e-2));
    }

    #[test]
    fn rigid_transforms_preserve_distance(t in arb_rigid(), p in small_vec3(), q in small_vec3()) {
        let d0 = p.distance(q);
        let d1 = t.apply_point(p).distance(t.apply_point(q));
        prop_assert!((d0 - d1).abs() <= 1e-2 + d0 * 1e-4);
    }

    #[test]
    fn transformed_box_contains_transformed_center(t in arb_rigid(), a in small_vec3(), b in small_vec3()) {
        let bb = Aabb::new(a.min(b), a.max(b));
        let moved = bb.transformed(&t);
        prop_assert!(moved.expanded(1e-2).contains(t.apply_point(bb.center())));
    }
}
