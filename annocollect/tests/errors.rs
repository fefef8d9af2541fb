mod common;

use annocollect::prelude::*;
use common::{
    gene,
    summary,
    CountingSource,
    TestScope,
};
use rstest::{
    fixture,
    rstest,
};

/// `S` is assembled from the known `T` and the unknown `Z`; container 1
/// keeps part of its genes in a chunk.
#[fixture]
fn scope() -> Scope {
    TestScope::new()
        .segmented("S", vec![
            Segment::reference(0, 100, "T", 0, false),
            Segment::reference(100, 100, "Z", 0, false),
        ])
        .sequence(&["T"])
        .container(
            Container::builder(1)
                .owns("T")
                .with_objects(AnnotName::Unnamed, [gene("T", 10, 20)])
                .with_chunk(AnnotName::Unnamed, vec![gene("T", 30, 40)])
                .build(),
        )
        .container(
            Container::builder(2)
                .with_objects("extra".into(), [gene("T", 50, 60), gene("Q", 0, 5)])
                .build(),
        )
        .build()
}

#[rstest]
fn test_failed_chunk_load_releases_locks(scope: Scope) {
    let source = CountingSource::new(scope).failing_on(0);
    let selector = AnnotSelector::default();
    let err = AnnotCollector::new(&source, &selector)
        .collect_by_single_sequence(&"T".into(), SeqRange::new(0, 100), Strand::None)
        .unwrap_err();

    assert_eq!(err, CollectError::ChunkLoad {
        container: 1,
        chunk:     0,
        reason:    "storage unavailable".into(),
    });
    assert!(!err.is_recoverable());
    for id in [1, 2] {
        assert_eq!(source.container(id).unwrap().user_count(), 0);
    }
    // Nothing was loaded, so a later attempt starts from the same state.
    let container = source.container(1).unwrap();
    assert_eq!(container.read_annots().unwrap().pending_chunks(), vec![0]);
}

#[rstest]
fn test_fail_policy_on_query_id(scope: Scope) {
    let selector = AnnotSelector::default().with_unresolved(UnresolvedPolicy::Fail);
    let err = AnnotCollector::new(&scope, &selector)
        .collect_by_single_sequence(&"missing".into(), SeqRange::whole(), Strand::None)
        .unwrap_err();
    assert_eq!(err, CollectError::UnresolvedId("missing".into()));
}

#[rstest]
fn test_fail_policy_on_segment(scope: Scope) {
    let collect = |selector: &AnnotSelector| {
        AnnotCollector::new(&scope, selector).collect_by_single_sequence(
            &"S".into(),
            SeqRange::new(0, 200),
            Strand::None,
        )
    };

    let fail = AnnotSelector::default()
        .with_resolve_depth(1)
        .with_unresolved(UnresolvedPolicy::Fail);
    assert_eq!(
        collect(&fail).unwrap_err(),
        CollectError::UnresolvedId("Z".into())
    );
    for id in [1, 2] {
        assert_eq!(scope.container(id).unwrap().user_count(), 0);
    }

    let ignore = AnnotSelector::default().with_resolve_depth(1);
    let result = collect(&ignore).unwrap();
    assert_eq!(summary(&result), vec![(1, 0, 10, 20), (1, 1, 30, 40), (2, 0, 50, 60)]);
}

#[rstest]
fn test_resolve_none_needs_limit(scope: Scope) {
    let selector = AnnotSelector::default().with_resolve_method(ResolveMethod::None);
    let err = AnnotCollector::new(&scope, &selector)
        .collect_by_single_sequence(&"T".into(), SeqRange::whole(), Strand::None)
        .unwrap_err();
    assert!(matches!(err, CollectError::LimitConfiguration(_)));

    let limited = selector.with_limit(SearchLimit::Container { id: 2 });
    let result = AnnotCollector::new(&scope, &limited)
        .collect_by_single_sequence(&"T".into(), SeqRange::whole(), Strand::None)
        .unwrap();
    assert_eq!(summary(&result), vec![(2, 0, 50, 60)]);
}

#[rstest]
fn test_collect_limited(scope: Scope) {
    let no_limit = AnnotSelector::default();
    assert!(matches!(
        AnnotCollector::new(&scope, &no_limit).collect_limited(),
        Err(CollectError::LimitConfiguration(_))
    ));

    let unknown = AnnotSelector::default().with_limit(SearchLimit::Container { id: 9 });
    assert!(matches!(
        AnnotCollector::new(&scope, &unknown).collect_limited(),
        Err(CollectError::LimitConfiguration(_))
    ));

    let whole = AnnotSelector::default().with_limit(SearchLimit::Container { id: 2 });
    let result = AnnotCollector::new(&scope, &whole).collect_limited().unwrap();
    assert_eq!(summary(&result), vec![(2, 1, 0, 5), (2, 0, 50, 60)]);

    let wrong_name = AnnotSelector::default().with_limit(SearchLimit::Annot {
        container: 2,
        name:      AnnotName::Unnamed,
    });
    assert!(AnnotCollector::new(&scope, &wrong_name)
        .collect_limited()
        .unwrap()
        .is_empty());
}

#[rstest]
fn test_fixed_collection_loads_chunks(scope: Scope) {
    let container = scope.container(1).unwrap();
    let result = AnnotCollector::new(&scope, &AnnotSelector::default())
        .collect_fixed(&container)
        .unwrap();
    assert_eq!(summary(&result), vec![(1, 0, 10, 20), (1, 1, 30, 40)]);
    assert!(container.read_annots().unwrap().pending_chunks().is_empty());
}

#[test]
fn test_zero_cap_is_rejected() {
    let scope = TestScope::new().sequence(&["S"]).build();
    let selector = AnnotSelector::default().with_max_size(Some(0));
    assert!(matches!(
        AnnotCollector::new(&scope, &selector).collect_by_single_sequence(
            &"S".into(),
            SeqRange::whole(),
            Strand::None
        ),
        Err(CollectError::LimitConfiguration(_))
    ));
}
