use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;
use std::sync::Arc;

use anyhow::{
    bail,
    Context,
};
use hashbrown::HashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use super::container::{
    Container,
    ContainerBuilder,
};
use super::segment::{
    Segment,
    SegmentMap,
};
use crate::data_structs::annotation::{
    AnnotName,
    AnnotObject,
};
use crate::data_structs::typedef::{
    ChunkId,
    ContainerId,
    SeqIdStr,
};
use crate::error::CollectResult;

/// Alternate ids naming the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymSet {
    /// Canonical ids used for index lookups. The first one is the primary.
    ids:     Vec<SeqIdStr>,
    /// The sequence's own raw id list, used for containers with mismatched
    /// ids.
    raw_ids: Vec<SeqIdStr>,
    /// Top-level container of the sequence, if loaded.
    owner:   Option<ContainerId>,
}

impl SynonymSet {
    pub fn new(
        ids: Vec<SeqIdStr>,
        raw_ids: Vec<SeqIdStr>,
        owner: Option<ContainerId>,
    ) -> Self {
        Self {
            ids,
            raw_ids,
            owner,
        }
    }

    /// Synonym set of an id nobody knows about.
    pub fn unresolved(id: &SeqIdStr) -> Self {
        Self::new(vec![id.clone()], vec![id.clone()], None)
    }

    pub fn primary(&self) -> Option<&SeqIdStr> {
        self.ids.first()
    }

    pub fn ids(&self) -> &[SeqIdStr] {
        &self.ids
    }

    pub fn raw_ids(&self) -> &[SeqIdStr] {
        &self.raw_ids
    }

    pub fn owner(&self) -> Option<ContainerId> {
        self.owner
    }

    pub fn contains(
        &self,
        id: &SeqIdStr,
    ) -> bool {
        self.ids.contains(id)
    }
}

/// Restriction applied when resolving containers for a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerScope {
    /// Any container of the scope annotating the sequence.
    All,
    /// Only the given top-level container.
    Tse(ContainerId),
}

/// Source of containers, synonyms and segment maps consumed by the
/// collector. All calls are synchronous and may block.
pub trait DataSource: Send + Sync {
    fn synonyms(
        &self,
        id: &SeqIdStr,
    ) -> Option<SynonymSet>;

    /// Containers annotating any of `ids`.
    fn resolve_containers(
        &self,
        ids: &[SeqIdStr],
        scope: ContainerScope,
    ) -> Vec<Arc<Container>>;

    fn segment_map(
        &self,
        id: &SeqIdStr,
    ) -> Option<&SegmentMap>;

    fn container(
        &self,
        id: ContainerId,
    ) -> Option<Arc<Container>>;

    /// On success every stub of `chunks` is materialized.
    fn load_chunks(
        &self,
        container: &Container,
        chunks: &[ChunkId],
    ) -> CollectResult<()> {
        container.load_chunks(chunks)
    }
}

#[derive(Debug, Clone)]
struct SequenceRecord {
    ids:      Vec<SeqIdStr>,
    raw_ids:  Vec<SeqIdStr>,
    segments: Option<SegmentMap>,
}

/// In-memory [`DataSource`].
#[derive(Debug, Default)]
pub struct Scope {
    containers: IndexMap<ContainerId, Arc<Container>>,
    sequences:  Vec<SequenceRecord>,
    by_id:      HashMap<SeqIdStr, usize>,
    owners:     HashMap<SeqIdStr, ContainerId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sequence under its synonyms. `raw_ids` default to `ids`.
    pub fn add_sequence(
        &mut self,
        ids: &[&str],
        raw_ids: Option<&[&str]>,
        segments: Option<SegmentMap>,
    ) {
        let ids = ids.iter().map(|id| SeqIdStr::from(*id)).collect_vec();
        let raw_ids = raw_ids
            .map(|raw| raw.iter().map(|id| SeqIdStr::from(*id)).collect_vec())
            .unwrap_or_else(|| ids.clone());
        let pos = self.sequences.len();
        for id in ids.iter() {
            self.by_id.insert(id.clone(), pos);
        }
        self.sequences.push(SequenceRecord {
            ids,
            raw_ids,
            segments,
        });
    }

    pub fn add_container(
        &mut self,
        container: Container,
    ) -> Arc<Container> {
        for id in container.owned_ids() {
            self.owners.insert(id.clone(), container.id());
        }
        let container = Arc::new(container);
        self.containers
            .insert(container.id(), Arc::clone(&container));
        container
    }

    pub fn containers(&self) -> impl Iterator<Item = &Arc<Container>> {
        self.containers.values()
    }

    fn owner_of(
        &self,
        ids: &[SeqIdStr],
    ) -> Option<ContainerId> {
        ids.iter().find_map(|id| self.owners.get(id).copied())
    }

    pub fn from_description(desc: ScopeDescription) -> anyhow::Result<Self> {
        let mut scope = Scope::new();
        for seq in desc.sequences {
            if seq.ids.is_empty() {
                bail!("sequence description without ids");
            }
            let ids = seq.ids.iter().map(|s| s.as_str()).collect_vec();
            let raw = seq
                .raw_ids
                .as_ref()
                .map(|r| r.iter().map(|s| s.as_str()).collect_vec());
            if let Some(bad) = seq
                .segments
                .iter()
                .flatten()
                .find(|segment| !segment.is_valid())
            {
                bail!(
                    "segment at {} of sequence {} overflows the position range",
                    bad.position(),
                    seq.ids[0]
                );
            }
            let segments = seq.segments.map(SegmentMap::new);
            scope.add_sequence(&ids, raw.as_deref(), segments);
        }
        for cont in desc.containers {
            if scope.containers.contains_key(&cont.id) {
                bail!("duplicate container id {}", cont.id);
            }
            let mut builder = ContainerBuilder::new(cont.id)
                .mismatched_ids(cont.mismatched_ids);
            if let Some(label) = cont.label.as_deref() {
                builder = builder.label(label);
            }
            for id in cont.owns.iter() {
                builder = builder.owns(id);
            }
            for annot in cont.annots {
                let chunked = annot.chunks.iter().flatten();
                for object in annot.objects.iter().chain(chunked) {
                    object.validate().with_context(|| {
                        format!("invalid object location in container {}", cont.id)
                    })?;
                }
                for object in annot.objects {
                    builder.add_object(annot.name.clone(), object);
                }
                for chunk in annot.chunks {
                    builder.add_chunk(annot.name.clone(), chunk);
                }
            }
            scope.add_container(builder.build());
        }
        Ok(scope)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let desc: ScopeDescription = serde_json::from_reader(reader)
            .context("failed to parse scope description")?;
        Self::from_description(desc)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref()).with_context(|| {
            format!("failed to open scope file {}", path.as_ref().display())
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl DataSource for Scope {
    fn synonyms(
        &self,
        id: &SeqIdStr,
    ) -> Option<SynonymSet> {
        match self.by_id.get(id) {
            Some(&pos) => {
                let record = &self.sequences[pos];
                Some(SynonymSet::new(
                    record.ids.clone(),
                    record.raw_ids.clone(),
                    self.owner_of(&record.ids),
                ))
            },
            // Owned by a container but never described separately.
            None => {
                self.owners.get(id).map(|owner| {
                    SynonymSet::new(vec![id.clone()], vec![id.clone()], Some(*owner))
                })
            },
        }
    }

    fn resolve_containers(
        &self,
        ids: &[SeqIdStr],
        scope: ContainerScope,
    ) -> Vec<Arc<Container>> {
        self.containers
            .values()
            .filter(|c| {
                match scope {
                    ContainerScope::All => true,
                    ContainerScope::Tse(tse) => c.id() == tse,
                }
            })
            .filter(|c| ids.iter().any(|id| c.annotates(id) || c.owns(id)))
            .cloned()
            .collect_vec()
    }

    fn segment_map(
        &self,
        id: &SeqIdStr,
    ) -> Option<&SegmentMap> {
        self.by_id
            .get(id)
            .and_then(|&pos| self.sequences[pos].segments.as_ref())
    }

    fn container(
        &self,
        id: ContainerId,
    ) -> Option<Arc<Container>> {
        self.containers.get(&id).cloned()
    }
}

/// JSON description of a [`Scope`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeDescription {
    #[serde(default)]
    pub sequences:  Vec<SequenceDescription>,
    #[serde(default)]
    pub containers: Vec<ContainerDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceDescription {
    pub ids:      Vec<SeqIdStr>,
    #[serde(default)]
    pub raw_ids:  Option<Vec<SeqIdStr>>,
    #[serde(default)]
    pub segments: Option<Vec<Segment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDescription {
    pub id:             ContainerId,
    #[serde(default)]
    pub label:          Option<String>,
    #[serde(default)]
    pub owns:           Vec<SeqIdStr>,
    #[serde(default)]
    pub mismatched_ids: bool,
    #[serde(default)]
    pub annots:         Vec<AnnotDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotDescription {
    #[serde(default)]
    pub name:    AnnotName,
    #[serde(default)]
    pub objects: Vec<AnnotObject>,
    /// Groups of objects registered as not-yet-loaded chunks.
    #[serde(default)]
    pub chunks:  Vec<Vec<AnnotObject>>,
}
