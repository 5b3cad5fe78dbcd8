use fpmosaic::{
    estimate_transform, MatchedPair, MinutiaPoint, MinutiaType, MosaicError, Template, Transform,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_PI_2, PI};

fn template(points: &[(f64, f64, f64)]) -> Template {
    let minutiae = points
        .iter()
        .map(|&(x, y, dir)| MinutiaPoint::new(x, y, dir, MinutiaType::Ending))
        .collect();
    Template::new(200, 200, minutiae).unwrap()
}

fn identity_pairs(n: usize) -> Vec<MatchedPair> {
    (0..n).map(|i| MatchedPair::new(i, i)).collect()
}

/// Sum of squared residuals between rotated centred candidate points and
/// centred probe points.
fn centred_cost(probe: &[(f64, f64)], candidate: &[(f64, f64)], rotation: f64) -> f64 {
    let n = probe.len() as f64;
    let mean = |pts: &[(f64, f64)]| {
        let (sx, sy) = pts
            .iter()
            .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
        (sx / n, sy / n)
    };
    let (mpx, mpy) = mean(probe);
    let (mcx, mcy) = mean(candidate);
    let rot = Transform::new(rotation, 0.0, 0.0);
    probe
        .iter()
        .zip(candidate)
        .map(|(&(px, py), &(cx, cy))| {
            let (rx, ry) = rot.rotate(cx - mcx, cy - mcy);
            let (dx, dy) = (rx - (px - mpx), ry - (py - mpy));
            dx * dx + dy * dy
        })
        .sum()
}

#[test]
fn single_pair_uses_directions_and_pins_translation() {
    let probe = template(&[(0.0, 0.0, 0.0)]);
    let candidate = template(&[(10.0, 10.0, 0.0)]);
    let t = estimate_transform(&[MatchedPair::new(0, 0)], &probe, &candidate).unwrap();

    assert_eq!(t.rotation, 0.0);
    assert!((t.tx + 10.0).abs() < 1e-12);
    assert!((t.ty + 10.0).abs() < 1e-12);
}

#[test]
fn single_pair_maps_candidate_onto_probe() {
    let probe = template(&[(37.5, 12.25, 1.2)]);
    let candidate = template(&[(80.0, 140.0, -0.4)]);
    let t = estimate_transform(&[MatchedPair::new(0, 0)], &probe, &candidate).unwrap();

    assert!((t.rotation - 1.6).abs() < 1e-12);
    let (x, y) = t.apply(80.0, 140.0);
    assert!((x - 37.5).abs() < 1e-9);
    assert!((y - 12.25).abs() < 1e-9);
}

#[test]
fn quarter_turn_is_recovered() {
    let candidate_pts = [(20.0, 30.0), (60.0, 35.0), (45.0, 80.0)];
    let (cx, cy) = (125.0 / 3.0, 145.0 / 3.0);
    let turn = Transform::new(FRAC_PI_2, 0.0, 0.0);
    let probe_pts: Vec<(f64, f64)> = candidate_pts
        .iter()
        .map(|&(x, y)| {
            let (rx, ry) = turn.rotate(x - cx, y - cy);
            (rx + cx, ry + cy)
        })
        .collect();

    let probe = template(&probe_pts.iter().map(|&(x, y)| (x, y, 0.0)).collect::<Vec<_>>());
    let candidate =
        template(&candidate_pts.iter().map(|&(x, y)| (x, y, 0.0)).collect::<Vec<_>>());
    let t = estimate_transform(&identity_pairs(3), &probe, &candidate).unwrap();

    assert!((t.rotation - FRAC_PI_2).abs() < 1e-6, "rotation {}", t.rotation);
    for (&(px, py), &(cx, cy)) in probe_pts.iter().zip(candidate_pts.iter()) {
        let (x, y) = t.apply(cx, cy);
        assert!((x - px).abs() < 1e-9 && (y - py).abs() < 1e-9);
    }
}

#[test]
fn closed_form_rotation_beats_brute_force_sweep() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let n = rng.random_range(2..12);
        let truth = rng.random_range(-PI..PI);
        let turn = Transform::new(truth, rng.random_range(-50.0..50.0), 0.0);
        let candidate_pts: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.random_range(0.0..200.0), rng.random_range(0.0..200.0)))
            .collect();
        let probe_pts: Vec<(f64, f64)> = candidate_pts
            .iter()
            .map(|&(x, y)| {
                let (tx, ty) = turn.apply(x, y);
                (
                    tx + rng.random_range(-4.0..4.0),
                    ty + rng.random_range(-4.0..4.0),
                )
            })
            .collect();

        let probe = template(&probe_pts.iter().map(|&(x, y)| (x, y, 0.0)).collect::<Vec<_>>());
        let candidate =
            template(&candidate_pts.iter().map(|&(x, y)| (x, y, 0.0)).collect::<Vec<_>>());
        let t = estimate_transform(&identity_pairs(n), &probe, &candidate).unwrap();
        let best = centred_cost(&probe_pts, &candidate_pts, t.rotation);

        let steps = 20_000;
        for k in 0..steps {
            let angle = -PI + 2.0 * PI * k as f64 / steps as f64;
            let cost = centred_cost(&probe_pts, &candidate_pts, angle);
            assert!(
                best <= cost + 1e-9,
                "sweep angle {angle} cost {cost} beats closed form {best}"
            );
        }
    }
}

#[test]
fn transforms_stay_rigid() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let n = rng.random_range(1..8);
        let pts: Vec<(f64, f64, f64)> = (0..n)
            .map(|_| {
                (
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-10.0..10.0),
                )
            })
            .collect();
        let other: Vec<(f64, f64, f64)> = (0..n)
            .map(|_| {
                (
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-500.0..500.0),
                    rng.random_range(-10.0..10.0),
                )
            })
            .collect();
        let t = estimate_transform(&identity_pairs(n), &template(&pts), &template(&other)).unwrap();
        assert!((t.cos * t.cos + t.sin * t.sin - 1.0).abs() < 1e-9);
        assert!((t.cos - t.rotation.cos()).abs() < 1e-12);
        assert!((t.sin - t.rotation.sin()).abs() < 1e-12);
    }
}

#[test]
fn first_resolving_pair_anchors_translation() {
    let probe = template(&[(10.0, 10.0, 0.0), (50.0, 10.0, 0.0), (30.0, 40.0, 0.0)]);
    let candidate = template(&[(12.0, 11.0, 0.0), (52.0, 13.0, 0.0), (31.0, 44.0, 0.0)]);
    let pairs = [
        MatchedPair::new(99, 0),
        MatchedPair::new(1, 1),
        MatchedPair::new(0, 0),
        MatchedPair::new(2, 2),
    ];
    let t = estimate_transform(&pairs, &probe, &candidate).unwrap();
    let (x, y) = t.apply(52.0, 13.0);
    assert!((x - 50.0).abs() < 1e-9);
    assert!((y - 10.0).abs() < 1e-9);
}

#[test]
fn unresolvable_pairs_are_insufficient() {
    let probe = template(&[(0.0, 0.0, 0.0)]);
    let candidate = template(&[(1.0, 1.0, 0.0)]);

    let err = estimate_transform(&[], &probe, &candidate).unwrap_err();
    assert_eq!(err, MosaicError::InsufficientPairs { pairs: 0 });

    let pairs = [MatchedPair::new(0, 3), MatchedPair::new(2, 0)];
    let err = estimate_transform(&pairs, &probe, &candidate).unwrap_err();
    assert_eq!(err, MosaicError::InsufficientPairs { pairs: 2 });
}
