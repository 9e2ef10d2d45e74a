use super::*;

fn assert_close(a: (f64, f64), b: [f64; 2]) {
    assert!(
        (a.0 - b[0]).abs() < 1e-6 && (a.1 - b[1]).abs() < 1e-6,
        "{a:?} != {b:?}"
    );
}

#[test]
fn rect_corners_land_on_quad_corners() {
    let quad = Quad::new([12.0, 30.0], [200.0, 0.0], [190.0, 160.0], [0.0, 130.0]);
    let h = Homography::from_rect_to_quad(200.0, 160.0, &quad).unwrap();
    let src = [[0.0, 0.0], [200.0, 0.0], [200.0, 160.0], [0.0, 160.0]];
    for (s, d) in src.iter().zip(quad.corners.iter()) {
        assert_close(h.apply(s[0], s[1]).unwrap(), *d);
    }
}

#[test]
fn identity_quad_solves_to_identity() {
    let h = Homography::from_rect_to_quad(64.0, 32.0, &Quad::identity(64, 32)).unwrap();
    for (got, want) in h.coeffs().iter().zip(Homography::IDENTITY.coeffs().iter()) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn inverse_round_trips_points() {
    let quad = Quad::far_skew(100, 80, 30.0);
    let h = Homography::from_rect_to_quad(100.0, 80.0, &quad).unwrap();
    let inv = h.inverse().unwrap();
    for (x, y) in [(3.5, 7.25), (50.0, 40.0), (99.0, 1.0)] {
        let (u, v) = h.apply(x, y).unwrap();
        assert_close(inv.apply(u, v).unwrap(), [x, y]);
    }
}

#[test]
fn collapsed_quad_is_rejected() {
    let quad = Quad::new([5.0, 5.0], [5.0, 5.0], [5.0, 5.0], [5.0, 5.0]);
    let err = Homography::from_rect_to_quad(10.0, 10.0, &quad).unwrap_err();
    assert!(err.to_string().contains("degenerate warp quad"));
}
