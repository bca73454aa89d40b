//! Contract checks for the synthetic reference backend.

use regex::Regex;

use genplot::{OutputSource, PlotMode, RecordKind, SyntheticSource};

#[test]
fn record_lookup_accepts_file_name_prefixes() {
    let source = SyntheticSource::new("run1.out.h5");
    let direct = source
        .get_data("Field/power", PlotMode::Mean, 0.0)
        .unwrap()
        .expect("record exists");
    let prefixed = source
        .get_data("run1.out.h5/Field/power", PlotMode::Mean, 0.0)
        .unwrap()
        .expect("prefixed path resolves too");
    assert_eq!(direct.y, prefixed.y);
}

#[test]
fn unknown_records_are_no_data() {
    let source = SyntheticSource::new("run1.out.h5");
    assert!(source
        .get_data("Field/nothing", PlotMode::Profile, 0.0)
        .unwrap()
        .is_none());
    assert!(source.get_coherence("missing", 0.0, 1).unwrap().is_none());
    assert!(source.get_convolution("missing", 0.0).unwrap().is_none());
    assert!(source.get_wigner("Wigner(missing)", 0.0).unwrap().is_none());
}

#[test]
fn profile_and_reductions_have_matching_axes() {
    let source = SyntheticSource::new("run1.out.h5");

    let profile = source
        .get_data("Field/power", PlotMode::Profile, 0.5)
        .unwrap()
        .unwrap();
    assert_eq!(profile.kind, RecordKind::Plot);
    assert_eq!(profile.xlabel, "s (m)");
    assert_eq!(profile.x.len(), profile.y.len());

    let mean = source
        .get_data("Field/power", PlotMode::Mean, 0.5)
        .unwrap()
        .unwrap();
    assert_eq!(mean.xlabel, "z (m)");
    assert_eq!(mean.x.len(), mean.y.len());

    let map = source
        .get_data("Field/power", PlotMode::TwoD, 0.5)
        .unwrap()
        .unwrap();
    assert_eq!(map.kind, RecordKind::Image);
    let z = map.z.as_ref().unwrap();
    assert_eq!(z.len(), map.x.len());
    assert_eq!(z[0].len(), map.y.len());
}

#[test]
fn normalized_profile_peaks_at_one() {
    let source = SyntheticSource::new("run1.out.h5");
    let profile = source
        .get_data("Field/power", PlotMode::ProfileNorm, 0.9)
        .unwrap()
        .unwrap();
    let max = profile.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!((max - 1.0).abs() < 1e-12);
}

#[test]
fn position_selects_different_slices() {
    let source = SyntheticSource::new("run1.out.h5");
    let early = source
        .get_data("Field/power", PlotMode::Profile, 0.0)
        .unwrap()
        .unwrap();
    let late = source
        .get_data("Field/power", PlotMode::Profile, 1.0)
        .unwrap()
        .unwrap();
    assert_ne!(early.y, late.y, "the gain curve separates early from late");
}

#[test]
fn coherence_is_normalized_at_zero_delay() {
    let source = SyntheticSource::new("run1.out.h5");
    for order in [1, 2] {
        let curve = source
            .get_coherence("Field/intensity", 0.8, order)
            .unwrap()
            .unwrap();
        assert!((curve.y[0] - 1.0).abs() < 1e-12);
        assert_eq!(curve.xlabel, "s (m)");
    }
}

#[test]
fn wigner_unwraps_its_display_text() {
    let source = SyntheticSource::new("run1.out.h5");
    let map = source
        .get_wigner("Wigner(run1.out.h5/Field/intensity)", 0.8)
        .unwrap()
        .expect("wrapped text resolves");
    assert_eq!(map.kind, RecordKind::Image);
    let z = map.z.as_ref().unwrap();
    assert_eq!(z.len(), map.x.len());
    assert_eq!(z[0].len(), map.y.len());
}

#[test]
fn reload_is_deterministic() {
    let mut source = SyntheticSource::new("run1.out.h5");
    let before = source
        .get_data("Beam/energy", PlotMode::Mean, 0.3)
        .unwrap()
        .unwrap();
    source.reload().unwrap();
    let after = source
        .get_data("Beam/energy", PlotMode::Mean, 0.3)
        .unwrap()
        .unwrap();
    assert_eq!(before.y, after.y);
}

#[test]
fn find_records_matches_full_paths() {
    let source = SyntheticSource::new("run1.out.h5");
    let found = source.find_records(&Regex::new("Field([/]|[2-9][/])intensity").unwrap());
    let names: Vec<&str> = found.iter().map(String::as_str).collect();
    assert_eq!(names, ["Field/intensity", "Field2/intensity"]);

    assert!(source.find_records(&Regex::new("no such record").unwrap()).is_empty());
}

#[test]
fn lattice_records_use_step_rendering() {
    let source = SyntheticSource::new("run1.out.h5");
    let aw = source
        .get_data("Lattice/aw", PlotMode::Profile, 0.0)
        .unwrap()
        .unwrap();
    assert_eq!(aw.line, genplot::LineKind::Steps);
    assert_eq!(aw.xlabel, "z (m)");
}
