use proptest::prelude::*;
use vista_collide::{BspTree, Sweep};
use vista_geom::{Triangle, Vec3};

fn coord() -> impl Strategy<Value = f32> {
    -50.0f32..50.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_triangle() -> impl Strategy<Value = Triangle> {
    (arb_vec3(), arb_vec3(), arb_vec3()).prop_map(|(a, b, c)| Triangle::new(a, b, c))
}

fn brute_force(tris: &[Triangle], sweep: &Sweep) -> Vec<u32> {
    let mut out: Vec<u32> = tris
        .iter()
        .filter(|t| t.normal().length_squared() > 1e-12)
        .filter_map(|t| sweep.hit_fraction(t))
        .map(f32::to_bits)
        .collect();
    out.sort_unstable();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Plane pruning never loses a hit that an exhaustive scan finds.
    #[test]
    fn bsp_matches_exhaustive_scan(
        tris in prop::collection::vec(arb_triangle(), 1..40),
        start in arb_vec3(),
        end in arb_vec3(),
    ) {
        let bsp = BspTree::new(tris.clone());
        let sweep = Sweep::ray(start, end);
        let mut found = Vec::new();
        bsp.collide(&sweep, &mut |_, t| { found.push(t.to_bits()); true });
        found.sort_unstable();
        prop_assert_eq!(found, brute_force(&tris, &sweep));
    }

    #[test]
    fn bsp_prism_matches_exhaustive_scan(
        tris in prop::collection::vec(arb_triangle(), 1..20),
        probe in arb_triangle(),
        delta in arb_vec3(),
    ) {
        prop_assume!(probe.normal().length_squared() > 1e-3);
        let bsp = BspTree::new(tris.clone());
        let sweep = Sweep::prism(probe, delta);
        let mut found = Vec::new();
        bsp.collide(&sweep, &mut |_, t| { found.push(t.to_bits()); true });
        found.sort_unstable();
        prop_assert_eq!(found, brute_force(&tris, &sweep));
    }
}
