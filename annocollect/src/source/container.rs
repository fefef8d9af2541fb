use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Arc,
    RwLock,
    RwLockReadGuard,
};

use hashbrown::{
    HashMap,
    HashSet,
};
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

use super::index::{
    IndexEntry,
    RangeIndex,
};
use crate::data_structs::annotation::{
    AnnotName,
    AnnotObject,
};
use crate::data_structs::typedef::{
    ChunkId,
    ContainerId,
    ObjectIndex,
    SeqIdStr,
};
use crate::data_structs::MappedField;
use crate::error::{
    CollectError,
    CollectResult,
};

/// Location and product indexes of one named annotation subset.
#[derive(Debug, Clone, Default)]
pub struct AnnotIndex {
    location: RangeIndex,
    product:  RangeIndex,
}

impl AnnotIndex {
    pub fn by_field(
        &self,
        field: MappedField,
    ) -> &RangeIndex {
        match field {
            MappedField::Location => &self.location,
            MappedField::Product => &self.product,
        }
    }

    fn by_field_mut(
        &mut self,
        field: MappedField,
    ) -> &mut RangeIndex {
        match field {
            MappedField::Location => &mut self.location,
            MappedField::Product => &mut self.product,
        }
    }

    fn index_object(
        &mut self,
        index: ObjectIndex,
        object: &AnnotObject,
    ) {
        let key = object.type_key();
        for field in [MappedField::Location, MappedField::Product] {
            for (id, range) in object.index_extents(field) {
                self.by_field_mut(field)
                    .insert(id, key, range, IndexEntry::Object(index));
            }
        }
    }

    fn index_stub(
        &mut self,
        chunk: ChunkId,
        objects: &[AnnotObject],
    ) {
        for field in [MappedField::Location, MappedField::Product] {
            // Wrapping extents are split first so the stubs still cover
            // both sides of the origin.
            let parts = objects
                .iter()
                .flat_map(|obj| {
                    let key = obj.type_key();
                    obj.index_extents(field)
                        .into_iter()
                        .flat_map(move |(id, range)| {
                            range
                                .parts()
                                .into_iter()
                                .map(move |part| ((id.clone(), key), part))
                        })
                })
                .into_group_map();
            for ((id, key), ranges) in parts {
                let merged = ranges
                    .into_iter()
                    .sorted_by_key(|r| (r.from(), r.to()))
                    .coalesce(|a, b| a.union(&b).ok_or((a, b)))
                    .collect_vec();
                for range in merged {
                    self.by_field_mut(field).insert(
                        id.clone(),
                        key,
                        range,
                        IndexEntry::Stub(chunk),
                    );
                }
            }
        }
    }

    fn remove_stubs(
        &mut self,
        chunk: ChunkId,
    ) {
        self.location.remove_stubs(chunk);
        self.product.remove_stubs(chunk);
    }
}

/// Mutable part of a container, guarded by the annotation lock.
#[derive(Debug, Default)]
pub struct AnnotState {
    objects: Vec<(AnnotName, Arc<AnnotObject>)>,
    annots:  IndexMap<AnnotName, AnnotIndex>,
    pending: HashMap<ChunkId, Vec<(AnnotName, AnnotObject)>>,
}

impl AnnotState {
    pub fn annot(
        &self,
        name: &AnnotName,
    ) -> Option<&AnnotIndex> {
        self.annots.get(name)
    }

    pub fn annots(&self) -> impl Iterator<Item = (&AnnotName, &AnnotIndex)> {
        self.annots.iter()
    }

    pub fn object(
        &self,
        index: ObjectIndex,
    ) -> Option<&Arc<AnnotObject>> {
        self.objects.get(index as usize).map(|(_, obj)| obj)
    }

    pub fn n_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn pending_chunks(&self) -> Vec<ChunkId> {
        self.pending.keys().copied().sorted().collect_vec()
    }

    fn push(
        &mut self,
        name: AnnotName,
        object: AnnotObject,
    ) -> ObjectIndex {
        let index = self.objects.len() as ObjectIndex;
        self.annots
            .entry(name.clone())
            .or_default()
            .index_object(index, &object);
        self.objects.push((name, Arc::new(object)));
        index
    }
}

/// Load-once bundle of annotation objects for one top-level entity.
///
/// The index is read concurrently under the annotation lock; chunk loading
/// takes the same lock for writing. Objects are only ever appended, so an
/// [`ObjectIndex`] stays valid for the container's lifetime.
#[derive(Debug)]
pub struct Container {
    id:                 ContainerId,
    label:              String,
    owned_ids:          Vec<SeqIdStr>,
    annotated_ids:      HashSet<SeqIdStr>,
    has_mismatched_ids: bool,
    state:              RwLock<AnnotState>,
    users:              AtomicUsize,
    loads:              AtomicUsize,
}

impl Container {
    pub fn builder(id: ContainerId) -> ContainerBuilder {
        ContainerBuilder::new(id)
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sequences this container is the top-level entity of.
    pub fn owned_ids(&self) -> &[SeqIdStr] {
        &self.owned_ids
    }

    pub fn owns(
        &self,
        id: &SeqIdStr,
    ) -> bool {
        self.owned_ids.contains(id)
    }

    /// Checks if the index mentions `id`, loaded or not.
    pub fn annotates(
        &self,
        id: &SeqIdStr,
    ) -> bool {
        self.annotated_ids.contains(id)
    }

    /// Some objects are indexed under ids that are not synonyms of the
    /// sequence they annotate.
    pub fn has_mismatched_ids(&self) -> bool {
        self.has_mismatched_ids
    }

    /// Acquires the annotation read lock.
    pub fn read_annots(&self) -> CollectResult<RwLockReadGuard<'_, AnnotState>> {
        self.state
            .read()
            .map_err(|_| CollectError::LockPoisoned(self.id))
    }

    /// Materializes the given chunks and drops their stubs. Already loaded
    /// chunks are skipped.
    pub fn load_chunks(
        &self,
        chunks: &[ChunkId],
    ) -> CollectResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CollectError::LockPoisoned(self.id))?;
        for &chunk in chunks.iter().unique() {
            let Some(objects) = state.pending.remove(&chunk) else {
                let stubbed = state
                    .annots
                    .values()
                    .any(|a| a.location.stubs().contains(&chunk));
                if stubbed {
                    return Err(CollectError::ChunkLoad {
                        container: self.id,
                        chunk,
                        reason: "no payload registered for chunk".into(),
                    });
                }
                continue;
            };
            let n_objects = objects.len();
            for (name, object) in objects {
                state.push(name, object);
            }
            state
                .annots
                .values_mut()
                .for_each(|annot| annot.remove_stubs(chunk));
            self.loads.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Loaded chunk {} of container {} ({} objects)",
                chunk, self.id, n_objects
            );
        }
        Ok(())
    }

    /// Number of chunk loads performed so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Registers a user of the container for the lifetime of the guard.
    pub fn lock(self: &Arc<Self>) -> ContainerLock {
        self.users.fetch_add(1, Ordering::AcqRel);
        ContainerLock {
            container: Arc::clone(self),
        }
    }

    /// Number of live [`ContainerLock`] guards.
    pub fn user_count(&self) -> usize {
        self.users.load(Ordering::Acquire)
    }
}

/// RAII user lock of a container held for one collection pass.
#[derive(Debug)]
pub struct ContainerLock {
    container: Arc<Container>,
}

impl ContainerLock {
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }
}

impl Drop for ContainerLock {
    fn drop(&mut self) {
        self.container.users.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Assembles a [`Container`]: loaded objects go straight into the index,
/// chunks are registered as stubs covering the extent of their objects.
#[derive(Debug)]
pub struct ContainerBuilder {
    id:                 ContainerId,
    label:              Option<String>,
    owned_ids:          Vec<SeqIdStr>,
    has_mismatched_ids: bool,
    state:              AnnotState,
    next_chunk:         ChunkId,
}

impl ContainerBuilder {
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            label: None,
            owned_ids: Vec::new(),
            has_mismatched_ids: false,
            state: AnnotState::default(),
            next_chunk: 0,
        }
    }

    pub fn label(
        mut self,
        label: &str,
    ) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    pub fn owns(
        mut self,
        id: &str,
    ) -> Self {
        self.owned_ids.push(id.into());
        self
    }

    pub fn mismatched_ids(
        mut self,
        value: bool,
    ) -> Self {
        self.has_mismatched_ids = value;
        self
    }

    pub fn add_object(
        &mut self,
        name: AnnotName,
        object: AnnotObject,
    ) -> ObjectIndex {
        self.state.push(name, object)
    }

    pub fn with_objects<I>(
        mut self,
        name: AnnotName,
        objects: I,
    ) -> Self
    where
        I: IntoIterator<Item = AnnotObject>, {
        for object in objects {
            self.add_object(name.clone(), object);
        }
        self
    }

    /// Registers a not-yet-loaded chunk and returns its id.
    pub fn add_chunk(
        &mut self,
        name: AnnotName,
        objects: Vec<AnnotObject>,
    ) -> ChunkId {
        let chunk = self.next_chunk;
        self.next_chunk += 1;
        self.state
            .annots
            .entry(name.clone())
            .or_default()
            .index_stub(chunk, &objects);
        self.state.pending.insert(
            chunk,
            objects.into_iter().map(|o| (name.clone(), o)).collect(),
        );
        chunk
    }

    pub fn with_chunk(
        mut self,
        name: AnnotName,
        objects: Vec<AnnotObject>,
    ) -> Self {
        self.add_chunk(name, objects);
        self
    }

    pub fn build(self) -> Container {
        let annotated_ids = self
            .state
            .annots
            .values()
            .flat_map(|a| {
                a.location
                    .seq_ids()
                    .into_iter()
                    .chain(a.product.seq_ids())
            })
            .collect();
        Container {
            id: self.id,
            label: self
                .label
                .unwrap_or_else(|| format!("container-{}", self.id)),
            owned_ids: self.owned_ids,
            annotated_ids,
            has_mismatched_ids: self.has_mismatched_ids,
            state: RwLock::new(self.state),
            users: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        }
    }
}
