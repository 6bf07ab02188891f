use vista_geom::{Aabb, ConvexPolygon, Transform, Triangle, TriangleFlags, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

fn square_wall_x(x: f32, z0: f32, z1: f32, y0: f32, y1: f32) -> ConvexPolygon {
    ConvexPolygon::new(vec![
        Vec3::new(x, y0, z0),
        Vec3::new(x, y0, z1),
        Vec3::new(x, y1, z1),
        Vec3::new(x, y1, z0),
    ])
    .unwrap()
}

#[test]
fn vec3_cross_properties() {
    let i = Vec3::new(1.0, 0.0, 0.0);
    let j = Vec3::new(0.0, 1.0, 0.0);
    let k = Vec3::new(0.0, 0.0, 1.0);

    assert!(vec3_approx_eq(i.cross(j), k, 1e-6));
    assert!(vec3_approx_eq(j.cross(k), i, 1e-6));
    assert!(vec3_approx_eq(k.cross(i), j, 1e-6));

    let a = Vec3::new(2.0, -1.0, 3.0);
    let b = Vec3::new(-4.0, 0.5, 1.0);
    let c = a.cross(b);
    assert!(approx_eq(a.dot(c), 0.0, 1e-6));
    assert!(approx_eq(b.dot(c), 0.0, 1e-6));
}

#[test]
fn aabb_empty_absorbs_points() {
    let mut bb = Aabb::EMPTY;
    assert!(bb.is_empty());
    assert!(approx_eq(bb.volume(), 0.0, 0.0));
    bb.add_point(Vec3::new(1.0, 2.0, 3.0));
    bb.add_point(Vec3::new(-1.0, 0.0, 5.0));
    assert!(!bb.is_empty());
    assert!(vec3_approx_eq(bb.min, Vec3::new(-1.0, 0.0, 3.0), 1e-6));
    assert!(vec3_approx_eq(bb.max, Vec3::new(1.0, 2.0, 5.0), 1e-6));
    assert!(approx_eq(bb.volume(), 8.0, 1e-6));
}

#[test]
fn aabb_overlap_and_sphere() {
    let a = Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
    let b = Aabb::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 10.0, 10.0));
    let c = Aabb::new(Vec3::new(10.5, 0.0, 0.0), Vec3::new(20.0, 10.0, 10.0));
    assert!(a.intersects(&b), "touching boxes overlap");
    assert!(!a.intersects(&c));
    assert!(a.intersects_sphere(Vec3::new(12.0, 5.0, 5.0), 2.0));
    assert!(!a.intersects_sphere(Vec3::new(12.0, 5.0, 5.0), 1.9));
}

#[test]
fn transform_inverse_and_compose() {
    let t = Transform::from_yaw_translation(0.7, Vec3::new(3.0, -2.0, 8.0));
    let inv = t.inverse().unwrap();
    let p = Vec3::new(1.5, 4.0, -7.0);
    assert!(vec3_approx_eq(inv.apply_point(t.apply_point(p)), p, 1e-4));

    let ident = t.then_from(&inv);
    assert!(vec3_approx_eq(ident.apply_point(p), p, 1e-4));

    let quarter = Transform::rotation_y(core::f32::consts::FRAC_PI_2);
    assert!(vec3_approx_eq(
        quarter.apply_vector(Vec3::new(1.0, 0.0, 0.0)),
        Vec3::new(0.0, 0.0, -1.0),
        1e-6
    ));
}

#[test]
fn singular_transform_has_no_inverse() {
    let mut t = Transform::IDENTITY;
    t.z_axis = Vec3::ZERO;
    assert!(t.inverse().is_none());
}

#[test]
fn segment_hits_triangle_from_both_sides() {
    let tri = Triangle::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
    );
    let down = tri.intersect_segment(Vec3::new(1.0, 5.0, 1.0), Vec3::new(0.0, -10.0, 0.0));
    assert!(approx_eq(down.unwrap(), 0.5, 1e-6));
    let up = tri.intersect_segment(Vec3::new(1.0, -2.0, 1.0), Vec3::new(0.0, 4.0, 0.0));
    assert!(approx_eq(up.unwrap(), 0.5, 1e-6));
    assert!(tri.intersect_segment(Vec3::new(3.5, 5.0, 3.5), Vec3::new(0.0, -10.0, 0.0)).is_none());
    assert!(tri.intersect_segment(Vec3::new(1.0, 5.0, 1.0), Vec3::new(0.0, -4.0, 0.0)).is_none());
}

#[test]
fn swept_triangle_first_contact() {
    let floor = Triangle::new(
        Vec3::new(-10.0, 0.0, -10.0),
        Vec3::new(10.0, 0.0, -10.0),
        Vec3::new(0.0, 0.0, 10.0),
    );
    let probe = Triangle::new(
        Vec3::new(-1.0, 2.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    );
    let t = floor.sweep_triangle(&probe, Vec3::new(0.0, -4.0, 0.0)).unwrap();
    assert!(approx_eq(t, 0.25, 1e-5));
    assert!(floor.sweep_triangle(&probe, Vec3::new(0.0, 4.0, 0.0)).is_none());
    assert!(floor.sweep_triangle(&probe, Vec3::new(0.0, -0.5, 0.0)).is_none());
}

#[test]
fn triangle_flags() {
    let t = Triangle::new(Vec3::ZERO, Vec3::UP, Vec3::new(1.0, 0.0, 0.0))
        .with_flags(TriangleFlags::TERRAIN);
    assert!(t.is_terrain());
    assert!(!Triangle::new(Vec3::ZERO, Vec3::UP, Vec3::new(1.0, 0.0, 0.0)).is_terrain());
}

#[test]
fn polygon_rejects_degenerate_input() {
    assert!(ConvexPolygon::new(vec![Vec3::ZERO, Vec3::UP]).is_none());
    assert!(ConvexPolygon::new(vec![Vec3::ZERO, Vec3::UP, Vec3::UP * 2.0]).is_none());
    let bent = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.5),
    ];
    assert!(ConvexPolygon::new(bent).is_none());
}

#[test]
fn polygon_sphere_inside_and_edge() {
    let wall = square_wall_x(10.0, 0.0, 10.0, 0.0, 10.0);
    assert!(wall.intersects_sphere(Vec3::new(11.0, 5.0, 5.0), 1.5));
    assert!(!wall.intersects_sphere(Vec3::new(12.0, 5.0, 5.0), 1.5));
    // Beyond the z = 10 edge: distance to the edge is sqrt(1 + 4).
    let p = Vec3::new(11.0, 5.0, 12.0);
    assert!(approx_eq(wall.distance_to_point(p), 5.0f32.sqrt(), 1e-5));
    assert!(wall.intersects_sphere(p, 2.3));
    assert!(!wall.intersects_sphere(p, 2.2));
}

#[test]
fn polygon_coincides_ignores_winding() {
    let a = square_wall_x(10.0, 0.0, 10.0, 0.0, 10.0);
    let mut pts = a.points().to_vec();
    pts.reverse();
    pts.rotate_left(1);
    let b = ConvexPolygon::new(pts).unwrap();
    assert!(a.coincides(&b, 1e-4));
    let c = square_wall_x(10.1, 0.0, 10.0, 0.0, 10.0);
    assert!(!a.coincides(&c, 0.01));
    assert_eq!(a.triangles().len(), 2);
}
