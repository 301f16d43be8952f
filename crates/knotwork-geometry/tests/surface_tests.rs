use approx::{assert_abs_diff_eq, assert_relative_eq};
use knotwork_core::traits::BoundingBox;
use knotwork_core::KnotworkError;
use knotwork_geometry::{
    neighbor_structure, quad_reorder, BSplineSurface, ControlGrid, EvalConfig, NeighborConfig,
    Surface, SurfaceBuilder, SurfaceInsertion, SurfaceNormal,
};
use knotwork_math::{bounding_box_coords, Point3};

/// A 4 x 3 patch bulging upward in the middle, as flat coordinate rows.
fn patch_coords() -> Vec<[f64; 3]> {
    let mut rows = Vec::new();
    for i in 0..4 {
        for j in 0..3 {
            let z = if (i == 1 || i == 2) && j == 1 { 2.0 } else { 0.0 };
            rows.push([i as f64, j as f64, z]);
        }
    }
    rows
}

fn patch() -> BSplineSurface<Point3> {
    SurfaceBuilder::new()
        .degree_u(3)
        .degree_v(2)
        .ctrlpts_from_coords(&patch_coords(), 4, 3)
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_corners_interpolate() {
    let surf = patch();
    assert_eq!(surf.dimension(), 3);
    assert_eq!(surf.domain_u(), (0.0, 1.0));
    assert_eq!(surf.domain_v(), (0.0, 1.0));

    let corners = [
        ((0.0, 0.0), Point3::new(0.0, 0.0, 0.0)),
        ((0.0, 1.0), Point3::new(0.0, 2.0, 0.0)),
        ((1.0, 0.0), Point3::new(3.0, 0.0, 0.0)),
        ((1.0, 1.0), Point3::new(3.0, 2.0, 0.0)),
    ];
    for ((u, v), expected) in corners {
        let p = surf.evaluate(u, v).unwrap();
        assert_abs_diff_eq!((p - expected).length(), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_symmetric_bulge() {
    let surf = patch();
    let mid = surf.evaluate(0.5, 0.5).unwrap();
    assert_abs_diff_eq!(mid.x, 1.5, epsilon = 1e-10);
    assert_abs_diff_eq!(mid.y, 1.0, epsilon = 1e-10);
    assert!(mid.z > 0.0);

    // Mirror symmetry in u
    let a = surf.evaluate(0.2, 0.4).unwrap();
    let b = surf.evaluate(0.8, 0.4).unwrap();
    assert_relative_eq!(a.z, b.z, epsilon = 1e-10);

    // The top of the bulge has a vertical normal
    let n = surf.normal(0.5, 0.5).unwrap();
    assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(n.z.abs(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_derivatives_match_finite_difference() {
    let surf = patch();
    let (u, v, h) = (0.35, 0.6, 1e-6);
    let skl = surf.derivatives(u, v, 2).unwrap();
    let su = (surf.evaluate(u + h, v).unwrap() - surf.evaluate(u - h, v).unwrap()) / (2.0 * h);
    let sv = (surf.evaluate(u, v + h).unwrap() - surf.evaluate(u, v - h).unwrap()) / (2.0 * h);
    assert_abs_diff_eq!((skl[1][0] - su).length(), 0.0, epsilon = 1e-4);
    assert_abs_diff_eq!((skl[0][1] - sv).length(), 0.0, epsilon = 1e-4);
    // Only k + l <= order is filled
    assert_eq!(skl[2][1], Point3::ZERO);
}

#[test]
fn test_evaluate_list_keeps_order() {
    let surf = patch();
    let params = [(0.9, 0.1), (0.0, 0.0), (0.5, 0.25), (1.0, 1.0)];
    let points = surf.evaluate_list(&params).unwrap();
    for (&(u, v), p) in params.iter().zip(&points) {
        assert_eq!(*p, surf.evaluate(u, v).unwrap());
    }
    assert!(matches!(
        surf.evaluate_list(&[(0.5, 0.5), (-1.0, 0.5)]),
        Err(KnotworkError::OutOfDomain { .. })
    ));
}

#[test]
fn test_sample_grid() {
    let surf: BSplineSurface<Point3> = SurfaceBuilder::new()
        .degree_u(3)
        .degree_v(2)
        .ctrlpts_from_coords(&patch_coords(), 4, 3)
        .unwrap()
        .config(EvalConfig::default().with_delta(0.25))
        .build()
        .unwrap();
    let points = surf.sample().unwrap();
    assert_eq!(points.len(), 25);
    // Row-major with v fast: index 1 is (u = 0, v = 0.25)
    assert_eq!(points[1], surf.evaluate(0.0, 0.25).unwrap());
    assert_eq!(points[5], surf.evaluate(0.25, 0.0).unwrap());
}

#[test]
fn test_insertion_u_then_v() {
    let surf = patch();
    let refined = surf
        .insert_knot(SurfaceInsertion::uv(0.5, 0.3, 2, 1))
        .unwrap();
    assert_eq!(refined.ctrlpts().size_u(), 6);
    assert_eq!(refined.ctrlpts().size_v(), 4);
    assert_eq!(refined.knotvector_u().len(), 10);
    assert_eq!(refined.knotvector_v().len(), 7);

    for i in 0..=8 {
        for j in 0..=8 {
            let (u, v) = (i as f64 / 8.0, j as f64 / 8.0);
            let a = surf.evaluate(u, v).unwrap();
            let b = refined.evaluate(u, v).unwrap();
            assert_abs_diff_eq!((a - b).length(), 0.0, epsilon = 1e-10);
        }
    }

    let only_v = surf.insert_knot(SurfaceInsertion::v(0.5, 1)).unwrap();
    assert_eq!(only_v.knotvector_u(), surf.knotvector_u());
    assert_eq!(only_v.ctrlpts().size_v(), 4);

    assert!(surf.insert_knot(SurfaceInsertion::u(1.2, 1)).is_err());
}

#[test]
fn test_rational_surface_cylinder_patch() {
    // Quarter cylinder of radius 1 along y
    let w = std::f64::consts::FRAC_1_SQRT_2;
    let grid = ControlGrid::from_rows(vec![
        vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
        vec![Point3::new(1.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0)],
        vec![Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 1.0, 1.0)],
    ])
    .unwrap();
    let surf = SurfaceBuilder::new()
        .degree_u(2)
        .degree_v(1)
        .ctrlpts(grid)
        .weights(vec![1.0, 1.0, w, w, 1.0, 1.0])
        .build_nurbs()
        .unwrap();

    for p in surf.sample().unwrap() {
        assert_abs_diff_eq!((p.x * p.x + p.z * p.z).sqrt(), 1.0, epsilon = 1e-10);
    }

    let refined = surf.insert_knot(SurfaceInsertion::u(0.5, 1)).unwrap();
    let p = refined.evaluate(0.25, 0.5).unwrap();
    assert_abs_diff_eq!((p.x * p.x + p.z * p.z).sqrt(), 1.0, epsilon = 1e-10);

    // Normal points along the radius
    let n = surf.normal(0.5, 0.5).unwrap();
    let p = surf.evaluate(0.5, 0.5).unwrap();
    let radial = Point3::new(p.x, 0.0, p.z).normalize();
    assert_abs_diff_eq!(n.dot(radial).abs(), 1.0, epsilon = 1e-10);
}

#[test]
fn test_spatial_helpers_on_control_grid() {
    let surf = patch();
    let (min, max) = surf.bounding_box().unwrap();
    assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(max, Point3::new(3.0, 2.0, 2.0));

    let (cmin, cmax) = bounding_box_coords(&patch_coords()).unwrap();
    assert_eq!(cmin, vec![0.0, 0.0, 0.0]);
    assert_eq!(cmax, vec![3.0, 2.0, 2.0]);

    let records = neighbor_structure(surf.ctrlpts(), NeighborConfig::default());
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.neighbors().len() == 4));
    // Corner (0, 0): the u-1 neighbor is reflected from (1, 0)
    assert_eq!(records[0].neighbors()[2], Point3::new(-1.0, 0.0, 0.0));

    let path = quad_reorder(surf.ctrlpts().points(), 4, 3).unwrap();
    assert_eq!(path.len(), 24);
    assert_eq!(path[0], Point3::new(3.0, 0.0, 0.0));
    assert_eq!(path[12], Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_serde_round_trip() {
    let surf = patch();
    let json = serde_json::to_string(&surf).unwrap();
    let back: BSplineSurface<Point3> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.ctrlpts(), surf.ctrlpts());
    assert_eq!(back.knotvector_v(), surf.knotvector_v());
    assert_eq!(back.evaluate(0.3, 0.7).unwrap(), surf.evaluate(0.3, 0.7).unwrap());
}
