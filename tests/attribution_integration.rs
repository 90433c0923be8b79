//! Attribution resolver integration tests
//!
//! Exercises the walker and resolver together over realistic patch forests.

use def_attribution::attribution::{AttributionResolver, PatchWalker, MAX_SCAN_DEPTH};
use def_attribution::content::{ContentNode, Package, PatchOperation};
use def_attribution::core::types::{PackageId, RecordName};
use proptest::prelude::*;

fn inject(name: &str) -> PatchOperation {
    PatchOperation::add(vec![ContentNode::element(
        "ThingDef",
        vec![ContentNode::text("defName", name)],
    )])
}

/// A `defName` carrying `name` at exactly `depth` levels below the top
fn nested(name: &str, depth: usize) -> ContentNode {
    let mut node = ContentNode::text("defName", name);
    for level in 0..depth {
        node = ContentNode::element(format!("level{}", level), vec![node]);
    }
    node
}

fn owner<'m>(map: &'m def_attribution::AttributionMap, name: &str) -> Option<&'m PackageId> {
    map.owner(&RecordName::new(name))
}

#[test]
fn test_first_package_in_load_order_wins() {
    let alpha = Package::new("alpha.pack", "Alpha").with_patch(inject("Shared"));
    let beta = Package::new("beta.pack", "Beta")
        .with_patch(inject("Shared"))
        .with_patch(inject("BetaOnly"));

    let (map, stats) = AttributionResolver::new(false).resolve_all([&alpha, &beta]);

    assert_eq!(owner(&map, "Shared"), Some(&alpha.id));
    assert_eq!(owner(&map, "BetaOnly"), Some(&beta.id));
    assert_eq!(stats.names_attributed, 2);
    assert_eq!(stats.packages_scanned, 2);
}

#[test]
fn test_shallow_scan_reads_only_top_level_children() {
    let package = Package::new("deep.pack", "Deep").with_patch(PatchOperation::add(vec![
        nested("Top", 0),
        nested("Child", 1),
        nested("Grandchild", 2),
    ]));

    let (shallow, _) = AttributionResolver::new(false).resolve_all([&package]);
    assert!(owner(&shallow, "Top").is_some());
    assert!(owner(&shallow, "Child").is_some());
    assert!(owner(&shallow, "Grandchild").is_none());

    let (deep, _) = AttributionResolver::new(true).resolve_all([&package]);
    assert!(owner(&deep, "Grandchild").is_some());
}

#[test]
fn test_deep_scan_stops_at_depth_limit() {
    let package = Package::new("deep.pack", "Deep").with_patch(PatchOperation::add(vec![
        nested("AtLimit", MAX_SCAN_DEPTH),
        nested("PastLimit", MAX_SCAN_DEPTH + 1),
    ]));

    let (map, _) = AttributionResolver::new(true).resolve_all([&package]);

    assert!(owner(&map, "AtLimit").is_some());
    assert!(owner(&map, "PastLimit").is_none());
}

#[test]
fn test_both_branches_of_conditionals_are_scanned() {
    let package = Package::new("compat.pack", "Compat").with_patch(PatchOperation::find_package(
        vec!["other.pack".into()],
        Some(PatchOperation::sequence(vec![
            inject("WithOther"),
            PatchOperation::other("remove"),
        ])),
        Some(PatchOperation::conditional(
            "/Defs/ThingDef[defName=\"Gun\"]",
            None,
            Some(inject("Fallback")),
        )),
    ));

    let (map, _) = AttributionResolver::new(false).resolve_all([&package]);

    assert_eq!(owner(&map, "WithOther"), Some(&package.id));
    assert_eq!(owner(&map, "Fallback"), Some(&package.id));
}

#[test]
fn test_malformed_package_contributes_nothing() {
    let broken = Package::new("broken.pack", "Broken")
        .with_patch(inject("Claimed"))
        .with_patch(PatchOperation::add(vec![ContentNode::element(
            "defName",
            vec![ContentNode::text("li", "oops")],
        )]));
    let later = Package::new("later.pack", "Later").with_patch(inject("Claimed"));

    let (map, stats) = AttributionResolver::new(false).resolve_all([&broken, &later]);

    assert_eq!(owner(&map, "Claimed"), Some(&later.id));
    assert_eq!(stats.packages_failed, 1);
    assert_eq!(stats.names_attributed, 1);
}

#[test]
fn test_add_without_value_is_malformed() {
    let broken = Package::new("broken.pack", "Broken")
        .with_patch(inject("Valid"))
        .with_patch(PatchOperation::Add {
            xpath: "/Defs".into(),
            value: None,
        });

    let (map, stats) = AttributionResolver::new(false).resolve_all([&broken]);

    assert!(map.is_empty());
    assert_eq!(stats.packages_failed, 1);
}

#[test]
fn test_non_content_operations_are_ignored() {
    let package = Package::new("edits.pack", "Edits")
        .with_patch(PatchOperation::other("replace"))
        .with_patch(PatchOperation::other("attribute_set"));

    let (map, stats) = AttributionResolver::new(true).resolve_all([&package]);

    assert!(map.is_empty());
    assert_eq!(stats.packages_failed, 0);
    assert_eq!(stats.fragments_scanned, 0);
}

#[test]
fn test_walker_yields_content_fragments_in_order() {
    let forest = vec![
        inject("A"),
        PatchOperation::conditional("/x", Some(inject("B")), Some(inject("C"))),
        PatchOperation::insert("/Defs/ThingDef", vec![ContentNode::text("defName", "D")]),
    ];

    let names: Vec<String> = PatchWalker::forest(&forest)
        .fragments()
        .filter_map(|f| f.nodes)
        .flat_map(|nodes| nodes.iter())
        .map(|node| match node.children.first() {
            Some(child) => child.text.clone().unwrap_or_default(),
            None => node.text.clone().unwrap_or_default(),
        })
        .collect();

    assert_eq!(names, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_empty_marker_is_ignored() {
    let package = Package::new("blank.pack", "Blank").with_patch(PatchOperation::add(vec![
        ContentNode::element("ThingDef", vec![ContentNode::text("defName", "   ")]),
    ]));

    let (map, stats) = AttributionResolver::new(false).resolve_all([&package]);

    assert!(map.is_empty());
    assert_eq!(stats.packages_failed, 0);
}

proptest! {
    #[test]
    fn prop_earliest_injector_owns_each_name(
        claims in prop::collection::vec(prop::collection::vec(0usize..8, 0..6), 1..8),
    ) {
        let packages: Vec<Package> = claims
            .iter()
            .enumerate()
            .map(|(p, names)| {
                names.iter().fold(
                    Package::new(format!("pack{}", p), format!("Pack {}", p)),
                    |package, n| package.with_patch(inject(&format!("Name{}", n))),
                )
            })
            .collect();

        let (map, _) = AttributionResolver::new(false).resolve_all(packages.iter());

        for n in 0..8 {
            let expected = claims
                .iter()
                .position(|names| names.contains(&n))
                .map(|p| &packages[p].id);
            prop_assert_eq!(owner(&map, &format!("Name{}", n)), expected);
        }
    }
}
