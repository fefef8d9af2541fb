use std::cmp::Ordering;
use std::sync::Arc;

use rand::{
    Rng,
    SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use rstest::*;

use super::*;
use crate::data_structs::annotation::{
    AnnotName,
    AnnotObject,
    AnnotTypeKey,
    FeatData,
    FeatSubtype,
    FeatTypeOrder,
    SeqAlign,
    SeqFeature,
    SeqGraph,
    SnpRecord,
};
use crate::data_structs::coords::{
    SeqInterval,
    SeqLoc,
    SeqRange,
};
use crate::data_structs::typedef::SeqIdStr;
use crate::data_structs::{
    AnnotKind,
    MappedField,
    ResolveMethod,
    SortOrder,
    Strand,
};
use crate::error::CollectError;
use crate::mapping::AnnotMappingInfo;
use crate::source::{
    Container,
    Scope,
    Segment,
    SegmentMap,
};

fn iv(
    id: &str,
    from: u32,
    to: u32,
    strand: Strand,
) -> SeqInterval {
    SeqInterval::new(id.into(), from, to, strand)
}

fn gene(
    id: &str,
    from: u32,
    to: u32,
) -> AnnotObject {
    SeqFeature::new(FeatSubtype::Gene, iv(id, from, to, Strand::Forward).into()).into()
}

/// `S` is built from the reverse complement of `T[1000, 1100)`; container 1
/// owns `T`.
#[fixture]
fn segmented() -> Scope {
    let mut scope = Scope::new();
    scope.add_sequence(
        &["S"],
        None,
        Some(SegmentMap::new(vec![Segment::reference(
            0, 100, "T", 1000, true,
        )])),
    );
    scope.add_sequence(&["T"], None, None);
    scope.add_container(
        Container::builder(1)
            .owns("T")
            .with_objects(AnnotName::Unnamed, [gene("T", 1020, 1050)])
            .build(),
    );
    scope
}

#[fixture]
fn flat() -> Scope {
    let mut scope = Scope::new();
    scope.add_sequence(&["S"], None, None);
    scope.add_container(
        Container::builder(1)
            .owns("S")
            .with_objects(
                AnnotName::Unnamed,
                [50, 10, 30, 20, 40].map(|from| gene("S", from, from + 5)),
            )
            .build(),
    );
    scope
}

#[rstest]
fn test_segment_hit_is_mapped_to_master(segmented: Scope) {
    let selector = AnnotSelector::default().with_resolve_depth(1);
    let result = AnnotCollector::new(&segmented, &selector)
        .collect_by_single_sequence(&"S".into(), SeqRange::new(0, 100), Strand::None)
        .unwrap();

    assert_eq!(result.len(), 1);
    let item = result.get(0).unwrap();
    assert_eq!(item.mapped_range(), SeqRange::new(50, 80));
    assert_eq!(item.mapped_strand(), Strand::Reverse);
    assert!(!item.is_partial());
    let feature = item.feature().unwrap().unwrap();
    assert_eq!(
        feature.location(),
        &SeqLoc::Int(iv("S", 50, 80, Strand::Reverse))
    );
}

#[rstest]
fn test_depth_zero_stays_on_master(segmented: Scope) {
    let selector = AnnotSelector::default();
    let result = AnnotCollector::new(&segmented, &selector)
        .collect_by_single_sequence(&"S".into(), SeqRange::new(0, 100), Strand::None)
        .unwrap();
    assert!(result.is_empty());
}

#[rstest]
fn test_sorted_cap_keeps_prefix(flat: Scope) {
    let selector = AnnotSelector::default().with_max_size(Some(2));
    let result = AnnotCollector::new(&flat, &selector)
        .collect_by_single_sequence(&"S".into(), SeqRange::whole(), Strand::None)
        .unwrap();
    let starts = result.iter().map(|i| i.mapped_range().from()).collect::<Vec<_>>();
    assert_eq!(starts, vec![10, 20]);
}

#[rstest]
fn test_unsorted_cap_stops_early(flat: Scope) {
    let selector = AnnotSelector::default()
        .with_sort_order(SortOrder::None)
        .with_max_size(Some(3));
    let result = AnnotCollector::new(&flat, &selector)
        .collect_by_single_sequence(&"S".into(), SeqRange::whole(), Strand::None)
        .unwrap();
    assert_eq!(result.len(), 3);
}

#[rstest]
fn test_types_only_pass(flat: Scope) {
    let selector = AnnotSelector::default().with_collect_types(true);
    let result = AnnotCollector::new(&flat, &selector)
        .collect_by_single_sequence(&"S".into(), SeqRange::new(0, 15), Strand::None)
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(
        result.annot_types().iter().copied().collect::<Vec<_>>(),
        vec![AnnotTypeKey::Feat(FeatSubtype::Gene)]
    );
}

#[test]
fn test_product_field_search() {
    let mut scope = Scope::new();
    scope.add_sequence(&["S"], None, None);
    scope.add_sequence(&["P"], None, None);
    let cds = SeqFeature::new(FeatSubtype::Cdregion, iv("S", 100, 400, Strand::Forward).into())
        .with_product(Some(iv("P", 0, 100, Strand::None).into()));
    scope.add_container(
        Container::builder(1)
            .owns("S")
            .with_objects(AnnotName::Unnamed, [AnnotObject::from(cds)])
            .build(),
    );

    let selector = AnnotSelector::default().with_field(MappedField::Product);
    let collector = AnnotCollector::new(&scope, &selector);
    let on_product = collector
        .collect_by_single_sequence(&"P".into(), SeqRange::new(10, 20), Strand::None)
        .unwrap();
    assert_eq!(on_product.len(), 1);
    assert_eq!(on_product.get(0).unwrap().mapped_range(), SeqRange::new(0, 100));

    let on_location = collector
        .collect_by_single_sequence(&"S".into(), SeqRange::new(100, 200), Strand::None)
        .unwrap();
    assert!(on_location.is_empty());
}

#[test]
fn test_location_map_groups_by_id() {
    let loc = SeqLoc::from_intervals(vec![
        iv("A", 0, 10, Strand::Forward),
        iv("B", 5, 15, Strand::None),
        iv("A", 20, 30, Strand::Forward),
    ])
    .unwrap();
    let map = location_map(&loc);
    assert_eq!(map.len(), 2);
    assert_eq!(map[&SeqIdStr::from("A")], vec![
        (SeqRange::new(0, 10), Strand::Forward),
        (SeqRange::new(20, 30), Strand::Forward),
    ]);
}

#[test]
fn test_pending_reference_refuses_location() {
    let container = Arc::new(Container::builder(1).build());
    let reference = AnnotObjectRef::new(
        container,
        3,
        Arc::new(gene("S", 0, 10)),
        AnnotMappingInfo::pending(SeqRange::new(0, 10), Strand::Forward),
    );
    assert_eq!(
        reference.mapped_location().unwrap_err(),
        CollectError::UnmappedAccess {
            container: 1,
            index:     3,
        }
    );
    assert!(reference.materialize_feature().is_err());
}

#[test]
fn test_selector_from_partial_json() {
    let selector: AnnotSelector = serde_json::from_str(
        r#"{
            "resolve_method": "tse_only",
            "resolve_depth": 2,
            "sort_order": "reverse",
            "limit": {"kind": "annot", "container": 4, "name": {"named": "snp"}}
        }"#,
    )
    .unwrap();
    assert_eq!(selector.resolve_method(), ResolveMethod::TseOnly);
    assert_eq!(selector.resolve_depth(), 2);
    assert_eq!(selector.sort_order(), SortOrder::Reverse);
    assert_eq!(selector.limit().container(), Some(4));
    assert!(selector.accepts_name(&"snp".into()));
    assert!(!selector.accepts_name(&AnnotName::Unnamed));
    // Untouched fields keep their defaults.
    assert!(selector.merge_conversions());
    assert_eq!(selector.adaptive_triggers(), &[
        FeatSubtype::Gene,
        FeatSubtype::Cdregion,
        FeatSubtype::MRna
    ]);
}

#[rstest]
#[case::no_limit(AnnotSelector::default().with_resolve_method(ResolveMethod::None))]
#[case::zero_cap(AnnotSelector::default().with_max_size(Some(0)))]
fn test_selector_validation(#[case] selector: AnnotSelector) {
    assert!(matches!(
        selector.validate(),
        Err(CollectError::LimitConfiguration(_))
    ));
}

#[test]
fn test_selector_type_filters() {
    let selector = AnnotSelector::default().only_subtypes([FeatSubtype::MRna]);
    assert!(selector.accepts_key(AnnotTypeKey::Feat(FeatSubtype::MRna)));
    assert!(!selector.accepts_key(AnnotTypeKey::Feat(FeatSubtype::Gene)));
    assert!(!selector.accepts_key(AnnotTypeKey::Align));
    assert!(!AnnotSelector::default().accepts_key(AnnotTypeKey::Locs));
}

fn random_object(
    rng: &mut ChaCha8Rng,
    range: SeqRange,
) -> AnnotObject {
    const SUBTYPES: [FeatSubtype; 4] = [
        FeatSubtype::Gene,
        FeatSubtype::MRna,
        FeatSubtype::Exon,
        FeatSubtype::Variation,
    ];
    let interval = iv("S", range.from(), range.from() + 1, Strand::None);
    match rng.gen_range(0..6) {
        0 => SeqAlign::new(vec![interval]).into(),
        1 => SeqGraph::new(interval, vec![1, 2]).into(),
        2 => SnpRecord::new("S".into(), range.from(), vec![]).into(),
        _ => {
            let data = match rng.gen_range(0..3) {
                0 => {
                    FeatData::Gene {
                        locus: Some(format!("g{}", rng.gen_range(0..3))),
                    }
                },
                1 => {
                    FeatData::Opaque {
                        bytes: vec![rng.gen()],
                    }
                },
                _ => FeatData::Empty,
            };
            let subtype = SUBTYPES[rng.gen_range(0..SUBTYPES.len())];
            SeqFeature::new(subtype, interval.into())
                .with_data(data)
                .into()
        },
    }
}

fn random_refs(
    rng: &mut ChaCha8Rng,
    n: u32,
) -> Vec<AnnotObjectRef> {
    let container = Arc::new(Container::builder(1).build());
    let mut refs: Vec<AnnotObjectRef> = (0..n)
        .map(|index| {
            let range = random_range(rng);
            AnnotObjectRef::new(
                Arc::clone(&container),
                index,
                Arc::new(random_object(rng, range)),
                AnnotMappingInfo::unmapped(range, Strand::None),
            )
        })
        .collect();
    // Unmerged mapping reports one object once per segment piece.
    for _ in 0..n / 3 {
        let piece = refs[rng.gen_range(0..refs.len())].clone();
        refs.push(AnnotObjectRef::new(
            Arc::clone(piece.container()),
            piece.index(),
            Arc::clone(piece.object_arc()),
            AnnotMappingInfo::unmapped(random_range(rng), Strand::None),
        ));
    }
    refs
}

fn random_range(rng: &mut ChaCha8Rng) -> SeqRange {
    let from = rng.gen_range(0..8);
    if rng.gen_bool(0.1) {
        SeqRange::wrapped(from + 90, from)
    }
    else {
        SeqRange::new(from, from + rng.gen_range(0..4))
    }
}

#[rstest]
#[case(SortOrder::Normal)]
#[case(SortOrder::Reverse)]
fn test_order_is_strict_weak(#[case] sort: SortOrder) {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0bde);
    let types = FeatTypeOrder::default();
    let order = ObjectRefOrder::new(sort, &types);

    for _ in 0..10 {
        let refs = random_refs(&mut rng, 30);
        for a in refs.iter() {
            assert_eq!(order.compare(a, a), Ordering::Equal);
            for b in refs.iter() {
                assert_eq!(order.compare(a, b), order.compare(b, a).reverse());
                if a.key() == b.key() && a.mapped_range() != b.mapped_range() {
                    assert_ne!(order.compare(a, b), Ordering::Equal);
                }
                if order.compare(a, b) != Ordering::Less {
                    continue;
                }
                for c in refs.iter() {
                    if order.compare(b, c) == Ordering::Less {
                        assert_eq!(order.compare(a, c), Ordering::Less, "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }
    }
}

#[test]
fn test_order_tie_break() {
    let container = Arc::new(Container::builder(1).build());
    let range = SeqRange::new(10, 20);
    let make = |index, object: AnnotObject| {
        AnnotObjectRef::new(
            Arc::clone(&container),
            index,
            Arc::new(object),
            AnnotMappingInfo::unmapped(range, Strand::None),
        )
    };
    let align = make(0, SeqAlign::new(vec![iv("S", 10, 20, Strand::None)]).into());
    let exon = make(
        1,
        SeqFeature::new(FeatSubtype::Exon, iv("S", 10, 20, Strand::None).into()).into(),
    );
    let gene_ref = make(2, gene("S", 10, 20));
    let snp = make(3, SnpRecord::new("S".into(), 10, vec![]).into());
    let variation = make(
        4,
        SeqFeature::new(FeatSubtype::Variation, iv("S", 10, 11, Strand::None).into()).into(),
    );
    let wide = AnnotObjectRef::new(
        Arc::clone(&container),
        5,
        Arc::new(gene("S", 10, 30)),
        AnnotMappingInfo::unmapped(SeqRange::new(10, 30), Strand::None),
    );

    let types = FeatTypeOrder::default();
    let mut refs = vec![
        align.clone(),
        snp.clone(),
        exon.clone(),
        variation.clone(),
        gene_ref.clone(),
        wide.clone(),
    ];
    refs.sort_by(|a, b| ObjectRefOrder::new(SortOrder::Normal, &types).compare(a, b));
    assert_eq!(refs[0], wide);
    assert_eq!(refs[1], gene_ref);
    // Features before alignments; the full variation before its table form.
    let variation_pos = refs.iter().position(|r| r == &variation).unwrap();
    let snp_pos = refs.iter().position(|r| r == &snp).unwrap();
    assert!(variation_pos < snp_pos);
    assert_eq!(refs.last().unwrap(), &align);
    assert_eq!(refs.last().unwrap().kind(), AnnotKind::Align);
    assert!(refs.iter().position(|r| r == &exon).unwrap() < refs.len() - 1);
}
