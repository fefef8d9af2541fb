#![allow(dead_code)]

use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;

use annocollect::prelude::*;
use rand::Rng;

pub fn iv(
    id: &str,
    from: u32,
    to: u32,
    strand: Strand,
) -> SeqInterval {
    SeqInterval::new(id.into(), from, to, strand)
}

pub fn feature(
    subtype: FeatSubtype,
    id: &str,
    from: u32,
    to: u32,
    strand: Strand,
) -> AnnotObject {
    SeqFeature::new(subtype, iv(id, from, to, strand).into()).into()
}

pub fn gene(
    id: &str,
    from: u32,
    to: u32,
) -> AnnotObject {
    feature(FeatSubtype::Gene, id, from, to, Strand::Forward)
}

/// Random genes on `id`, all within `[0, length)`.
pub fn random_genes<R: Rng>(
    rng: &mut R,
    id: &str,
    n: usize,
    length: u32,
) -> Vec<AnnotObject> {
    (0..n)
        .map(|_| {
            let from = rng.gen_range(0..length - 1);
            let to = rng.gen_range(from + 1..=length.min(from + 200));
            let subtype = match rng.gen_range(0..3) {
                0 => FeatSubtype::Gene,
                1 => FeatSubtype::MRna,
                _ => FeatSubtype::Exon,
            };
            feature(subtype, id, from, to, Strand::Forward)
        })
        .collect()
}

/// Builder for in-memory scopes used across the integration tests.
#[derive(Default)]
pub struct TestScope {
    scope: Scope,
}

impl TestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(
        mut self,
        ids: &[&str],
    ) -> Self {
        self.scope.add_sequence(ids, None, None);
        self
    }

    pub fn segmented(
        mut self,
        id: &str,
        segments: Vec<Segment>,
    ) -> Self {
        self.scope
            .add_sequence(&[id], None, Some(SegmentMap::new(segments)));
        self
    }

    pub fn container(
        mut self,
        container: Container,
    ) -> Self {
        self.scope.add_container(container);
        self
    }

    pub fn build(self) -> Scope {
        self.scope
    }
}

/// Wraps a [`Scope`] and counts chunk loads; loading `fail_on` fails.
pub struct CountingSource {
    pub inner:   Scope,
    pub fail_on: Option<ChunkId>,
    pub loads:   AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: Scope) -> Self {
        Self {
            inner,
            fail_on: None,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(
        mut self,
        chunk: ChunkId,
    ) -> Self {
        self.fail_on = Some(chunk);
        self
    }

    pub fn load_calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DataSource for CountingSource {
    fn synonyms(
        &self,
        id: &SeqIdStr,
    ) -> Option<SynonymSet> {
        self.inner.synonyms(id)
    }

    fn resolve_containers(
        &self,
        ids: &[SeqIdStr],
        scope: ContainerScope,
    ) -> Vec<Arc<Container>> {
        self.inner.resolve_containers(ids, scope)
    }

    fn segment_map(
        &self,
        id: &SeqIdStr,
    ) -> Option<&SegmentMap> {
        self.inner.segment_map(id)
    }

    fn container(
        &self,
        id: ContainerId,
    ) -> Option<Arc<Container>> {
        self.inner.container(id)
    }

    fn load_chunks(
        &self,
        container: &Container,
        chunks: &[ChunkId],
    ) -> CollectResult<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(chunk) = self.fail_on.filter(|c| chunks.contains(c)) {
            return Err(CollectError::ChunkLoad {
                container: container.id(),
                chunk,
                reason: "storage unavailable".into(),
            });
        }
        container.load_chunks(chunks)
    }
}

/// `(container, index, from, to)` of every result, in result order.
pub fn summary(result: &AnnotResultSet) -> Vec<(ContainerId, ObjectIndex, u32, u32)> {
    result
        .iter()
        .map(|item| {
            let r = item.reference();
            (
                r.container_id(),
                r.index(),
                item.mapped_range().from(),
                item.mapped_range().to(),
            )
        })
        .collect()
}
