use proptest::prelude::*;
use vista_collide::GridWalk;
use vista_geom::Vec3;

fn arb_point() -> impl Strategy<Value = Vec3> {
    (-200.0f32..200.0, -20.0f32..20.0, -200.0f32..200.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Every sampled point of the segment lies in a yielded cell.
    #[test]
    fn walk_covers_the_segment(start in arb_point(), end in arb_point()) {
        let grid = 10.0;
        let cells: Vec<(i32, i32)> = GridWalk::new(start, end, 0.0, grid).map(|s| (s.x, s.z)).collect();
        for i in 0..=64 {
            let p = start.lerp(end, i as f32 / 64.0);
            let c = ((p.x / grid).floor() as i32, (p.z / grid).floor() as i32);
            // Samples that land within float noise of a cell edge may belong
            // to either neighbour.
            let near_edge = (p.x / grid - (p.x / grid).round()).abs() < 1e-3
                || (p.z / grid - (p.z / grid).round()).abs() < 1e-3;
            prop_assert!(near_edge || cells.contains(&c), "missing cell {:?}", c);
        }
    }

    #[test]
    fn travel_is_monotonic_and_bounded(start in arb_point(), end in arb_point(), r in 0.0f32..25.0) {
        let length = (end - start).length();
        let mut last = 0.0f32;
        for step in GridWalk::new(start, end, r, 10.0) {
            prop_assert!(step.s_travel <= step.e_travel + 1e-3);
            prop_assert!(step.s_travel + 1e-3 >= last);
            prop_assert!(step.e_travel <= length + 1e-2);
            last = step.s_travel;
        }
    }
}
