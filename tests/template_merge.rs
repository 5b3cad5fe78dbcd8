use fpmosaic::lowlevel::merge_templates;
use fpmosaic::{
    mosaic_from_pairs, MatchedPair, MergeMatched, MergeOptions, MinutiaPoint, MinutiaType,
    MosaicError, Template, TemplateSource, Transform,
};

fn ending(x: f64, y: f64, dir: f64) -> MinutiaPoint {
    MinutiaPoint::new(x, y, dir, MinutiaType::Ending)
}

fn bifurcation(x: f64, y: f64, dir: f64) -> MinutiaPoint {
    MinutiaPoint::new(x, y, dir, MinutiaType::Bifurcation)
}

fn assert_close(a: &MinutiaPoint, b: &MinutiaPoint) {
    assert!((a.x - b.x).abs() < 1e-9, "x {} vs {}", a.x, b.x);
    assert!((a.y - b.y).abs() < 1e-9, "y {} vs {}", a.y, b.y);
    assert!((a.direction - b.direction).abs() < 1e-9);
    assert_eq!(a.kind, b.kind);
}

#[test]
fn default_merge_of_single_anchor_keeps_probe() {
    let probe = Template::new(100, 80, vec![ending(0.0, 0.0, 0.0)]).unwrap();
    let candidate = Template::new(100, 80, vec![ending(10.0, 10.0, 0.0)]).unwrap();

    let result = mosaic_from_pairs(
        &probe,
        &candidate,
        vec![MatchedPair::new(0, 0)],
        42.0,
        &MergeOptions::default(),
    )
    .unwrap();

    assert_eq!(result.transform.rotation, 0.0);
    assert!((result.transform.tx + 10.0).abs() < 1e-12);
    assert!((result.transform.ty + 10.0).abs() < 1e-12);
    assert_eq!(result.template, probe);
    assert_eq!(result.pairs, vec![MatchedPair::new(0, 0)]);
    assert_eq!(result.score, 42.0);
}

fn fixture() -> (Template, Template, Vec<MatchedPair>, Transform) {
    let probe = Template::new(
        50,
        40,
        vec![ending(5.0, 5.0, 0.1), bifurcation(20.0, 8.0, 1.0)],
    )
    .unwrap();
    let candidate = Template::new(
        30,
        30,
        vec![bifurcation(1.0, 1.0, 0.3), ending(4.0, 9.0, 2.0), ending(7.0, 2.0, -1.0)],
    )
    .unwrap();
    let pairs = vec![MatchedPair::new(0, 0)];
    (probe, candidate, pairs, Transform::new(0.0, 2.0, 3.0))
}

#[test]
fn candidate_policy_overwrites_matched_slot() {
    let (probe, candidate, pairs, t) = fixture();
    let options = MergeOptions {
        merge_matched: MergeMatched::Candidate,
        include_unmatched: false,
    };
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &options).unwrap();

    assert_eq!(merged.len(), 2);
    assert_close(&merged.minutiae()[0], &bifurcation(3.0, 4.0, 0.3));
    assert_close(&merged.minutiae()[1], &probe.minutiae()[1]);
}

#[test]
fn average_policy_keeps_probe_type() {
    let (probe, candidate, pairs, t) = fixture();
    let options = MergeOptions {
        merge_matched: MergeMatched::Average,
        include_unmatched: false,
    };
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &options).unwrap();

    assert_close(&merged.minutiae()[0], &ending(4.0, 4.5, 0.2));
}

#[test]
fn unmatched_candidates_append_in_index_order() {
    let (probe, candidate, pairs, t) = fixture();
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &MergeOptions::default()).unwrap();

    assert_eq!(merged.len(), 4);
    assert_eq!(&merged.minutiae()[..2], probe.minutiae());
    assert_close(&merged.minutiae()[2], &ending(6.0, 12.0, 2.0));
    assert_close(&merged.minutiae()[3], &ending(9.0, 5.0, -1.0));
    assert_eq!(merged.width(), 50);
    assert_eq!(merged.height(), 40);
}

#[test]
fn rotation_is_added_to_directions() {
    let (probe, candidate, pairs, _) = fixture();
    let t = Transform::new(0.5, 10.0, 10.0);
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &MergeOptions::default()).unwrap();

    let expected = t.apply_minutia(&candidate.minutiae()[2]);
    assert_close(&merged.minutiae()[3], &expected);
    assert!((expected.direction + 0.5).abs() < 1e-12);
}

#[test]
fn out_of_range_pairs_are_skipped() {
    let (probe, candidate, _, t) = fixture();
    let pairs = vec![MatchedPair::new(0, 9), MatchedPair::new(7, 1)];
    let options = MergeOptions {
        merge_matched: MergeMatched::Candidate,
        include_unmatched: true,
    };
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &options).unwrap();

    // Probe slots untouched; only candidate 1 counts as paired.
    assert_eq!(&merged.minutiae()[..2], probe.minutiae());
    assert_eq!(merged.len(), 4);
    assert_close(&merged.minutiae()[2], &bifurcation(3.0, 4.0, 0.3));
    assert_close(&merged.minutiae()[3], &ending(9.0, 5.0, -1.0));
}

#[test]
fn negative_coordinates_are_shifted_and_bounds_grow() {
    let (probe, candidate, pairs, _) = fixture();
    let t = Transform::new(0.0, -20.0, 60.0);
    let merged = merge_templates(&probe, &candidate, &pairs, &t, &MergeOptions::default()).unwrap();

    for m in merged.minutiae() {
        assert!(m.x >= 0.0 && m.y >= 0.0, "negative minutia {m:?}");
    }
    // Candidate 1 lands at (-16, 69): everything shifts right by 16.
    assert_close(&merged.minutiae()[0], &ending(21.0, 5.0, 0.1));
    assert_close(&merged.minutiae()[2], &ending(0.0, 69.0, 2.0));
    assert_eq!(merged.width(), 50);
    assert_eq!(merged.height(), 70);
}

#[test]
fn merged_bounds_never_shrink_below_probe() {
    let probe = Template::new(500, 400, vec![ending(1.0, 1.0, 0.0)]).unwrap();
    let candidate = Template::new(10, 10, vec![ending(1.0, 1.0, 0.0), ending(3.0, 3.0, 0.0)])
        .unwrap();
    let merged = merge_templates(
        &probe,
        &candidate,
        &[MatchedPair::new(0, 0)],
        &Transform::identity(),
        &MergeOptions::default(),
    )
    .unwrap();
    assert_eq!((merged.width(), merged.height()), (500, 400));
}

#[test]
fn empty_templates_pass_through() {
    let probe = Template::new(16, 16, Vec::new()).unwrap();
    let candidate = Template::new(8, 8, Vec::new()).unwrap();
    let merged = merge_templates(
        &probe,
        &candidate,
        &[],
        &Transform::identity(),
        &MergeOptions::default(),
    )
    .unwrap();
    assert_eq!(merged, probe);
}

/// Template held by some other matcher, with unchecked dimensions.
struct ForeignTemplate {
    width: usize,
    height: usize,
    minutiae: Vec<MinutiaPoint>,
}

impl TemplateSource for ForeignTemplate {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn minutiae(&self) -> &[MinutiaPoint] {
        &self.minutiae
    }
}

#[test]
fn zero_sized_source_is_rejected_by_mosaic() {
    let foreign = ForeignTemplate {
        width: 0,
        height: 0,
        minutiae: vec![ending(0.0, 0.0, 0.0)],
    };
    let candidate = Template::new(10, 10, vec![ending(2.0, 2.0, 0.0)]).unwrap();

    let err = mosaic_from_pairs(
        &foreign,
        &candidate,
        vec![MatchedPair::new(0, 0)],
        1.0,
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        MosaicError::InvalidDimensions {
            width: 0,
            height: 0
        }
    );

    let err = mosaic_from_pairs(
        &candidate,
        &foreign,
        vec![MatchedPair::new(0, 0)],
        1.0,
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MosaicError::InvalidDimensions { .. }));
}

#[test]
fn zero_sized_empty_source_is_rejected_by_merge() {
    let foreign = ForeignTemplate {
        width: 0,
        height: 12,
        minutiae: Vec::new(),
    };
    let candidate = Template::new(8, 8, Vec::new()).unwrap();

    let err = merge_templates(
        &foreign,
        &candidate,
        &[],
        &Transform::identity(),
        &MergeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        MosaicError::InvalidDimensions {
            width: 0,
            height: 12
        }
    );
}
