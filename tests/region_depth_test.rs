use camino::Utf8PathBuf;

use hypodepth::geo::GeoFeatureSet;
use hypodepth::region_depth::{RegionDepthConfig, RegionDepthLookup};

const CRATON_BNA: &str = r#""craton","rank 1","defaultDepth: 10, maxDepth: 35",5
-100.0,35.0
-95.0,35.0
-95.0,40.0
-100.0,40.0
-100.0,35.0
"#;

const SUBDUCTION_BNA: &str = r#""slab","rank 1","maxDepth: 700",4
140.0,30.0
150.0,30.0
150.0,45.0
140.0,45.0
"#;

fn config(regions: &[&str]) -> RegionDepthConfig {
    RegionDepthConfig {
        enabled: true,
        regions: regions.iter().map(|s| s.to_string()).collect(),
        global_default_depth: 15.0,
        global_max_depth: 700.0,
    }
}

#[test]
fn test_craton_match_and_global_fallback() {
    let features = GeoFeatureSet::from_bna_str(CRATON_BNA).unwrap();

    let mut lookup = RegionDepthLookup::new();
    lookup.set_config(config(&["craton"]));
    assert!(lookup.init(&features));
    assert!(lookup.is_initialized());

    let inside = lookup.get_constraints(37.5, -97.5);
    assert!(inside.matched);
    assert_eq!(inside.region_name, "craton");
    assert_eq!(inside.default_depth, 10.0);
    assert_eq!(inside.max_depth, 35.0);

    let outside = lookup.get_constraints(0.0, 0.0);
    assert!(!outside.matched);
    assert_eq!(outside.default_depth, 15.0);
    assert_eq!(outside.max_depth, 700.0);
}

#[test]
fn test_first_match_wins_for_overlapping_regions() {
    // Two copies of the same polygon under different names: whichever is
    // configured first must supply the constraints.
    let overlapping = format!(
        "{}{}",
        CRATON_BNA.replace("craton", "a"),
        CRATON_BNA
            .replace("craton", "b")
            .replace("maxDepth: 35", "maxDepth: 700"),
    );
    let features = GeoFeatureSet::from_bna_str(&overlapping).unwrap();

    let mut lookup = RegionDepthLookup::new();
    lookup.set_config(config(&["a", "b"]));
    assert!(lookup.init(&features));

    let constraints = lookup.get_constraints(37.5, -97.5);
    assert_eq!(constraints.region_name, "a");
    assert_eq!(constraints.max_depth, 35.0);
}

#[test]
fn test_order_swap_of_disjoint_regions_is_invisible_outside_both() {
    let combined = format!("{CRATON_BNA}{SUBDUCTION_BNA}");
    let features = GeoFeatureSet::from_bna_str(&combined).unwrap();

    let mut forward = RegionDepthLookup::new();
    forward.set_config(config(&["craton", "slab"]));
    assert!(forward.init(&features));

    let mut reversed = RegionDepthLookup::new();
    reversed.set_config(config(&["slab", "craton"]));
    assert!(reversed.init(&features));

    // Outside both polygons the order cannot matter.
    for (lat, lon) in [(0.0, 0.0), (-45.0, 20.0), (60.0, -30.0)] {
        assert_eq!(
            forward.get_constraints(lat, lon),
            reversed.get_constraints(lat, lon)
        );
    }

    // Inside exactly one polygon the same region answers either way.
    assert_eq!(forward.get_constraints(37.5, -97.5).region_name, "craton");
    assert_eq!(reversed.get_constraints(37.5, -97.5).region_name, "craton");
    assert_eq!(forward.get_constraints(37.0, 145.0).region_name, "slab");
    assert_eq!(reversed.get_constraints(37.0, 145.0).region_name, "slab");
}

#[test]
fn test_region_without_default_depth_keeps_global() {
    let features = GeoFeatureSet::from_bna_str(SUBDUCTION_BNA).unwrap();

    let mut lookup = RegionDepthLookup::new();
    lookup.set_config(config(&["slab"]));
    assert!(lookup.init(&features));

    let constraints = lookup.get_constraints(37.0, 145.0);
    assert!(constraints.matched);
    assert!(!constraints.has_default_depth);
    assert!(constraints.has_max_depth);
    assert_eq!(constraints.default_depth, 15.0);
    assert_eq!(constraints.max_depth, 700.0);
}

#[test]
fn test_load_from_file_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    let dir_path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    std::fs::write(dir_path.join("craton.bna"), CRATON_BNA).unwrap();
    std::fs::write(dir_path.join("slab.bna"), SUBDUCTION_BNA).unwrap();
    std::fs::write(dir_path.join("notes.txt"), "not a polygon file").unwrap();

    let single = GeoFeatureSet::from_bna_file(&dir_path.join("craton.bna")).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single.features()[0].name(), "craton");

    let set = GeoFeatureSet::from_bna_dir(&dir_path).unwrap();
    assert_eq!(set.len(), 2);
    // File-name order: craton.bna before slab.bna.
    assert_eq!(set.features()[0].name(), "craton");
    assert_eq!(set.features()[1].name(), "slab");

    let mut lookup = RegionDepthLookup::new();
    lookup.set_config(config(&["craton", "slab"]));
    assert!(lookup.init(&set));
    assert_eq!(lookup.region_count(), 2);
}
