use std::collections::{
    BTreeSet,
    VecDeque,
};
use std::sync::Arc;

use hashbrown::HashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    debug,
    trace,
    warn,
};

use super::{
    AnnotObjectRef,
    AnnotResultSet,
    AnnotSelector,
    ObjectRefOrder,
};
use crate::data_structs::annotation::{
    AnnotName,
    AnnotObject,
    AnnotTypeKey,
};
use crate::data_structs::coords::{
    SeqLoc,
    SeqRange,
};
use crate::data_structs::typedef::{
    is_gi_like,
    ChunkId,
    ContainerId,
    ObjectIndex,
    SeqIdStr,
};
use crate::data_structs::{
    MappedField,
    OverlapType,
    ResolveMethod,
    SortOrder,
    Strand,
    UnresolvedPolicy,
};
use crate::error::{
    CollectError,
    CollectResult,
};
use crate::mapping::{
    AnnotMappingInfo,
    ConversionSet,
    ObjectKey,
    SeqLocConversion,
};
use crate::source::{
    AnnotState,
    Container,
    ContainerLock,
    ContainerScope,
    DataSource,
    IndexEntry,
    SynonymSet,
};

/// Ranges and strands to search, per sequence id.
pub type LocationMap = IndexMap<SeqIdStr, Vec<(SeqRange, Strand)>>;

/// Groups the intervals of `loc` by sequence id.
pub fn location_map(loc: &SeqLoc) -> LocationMap {
    let mut map = LocationMap::new();
    for interval in loc.intervals() {
        map.entry(interval.id().clone())
            .or_default()
            .push((interval.range(), interval.strand()));
    }
    map
}

/// Finds annotation objects overlapping a region across the containers of
/// a [`DataSource`], maps them into the caller's coordinates and returns
/// them sorted and deduplicated.
pub struct AnnotCollector<'a, S: DataSource + ?Sized> {
    source:   &'a S,
    selector: &'a AnnotSelector,
}

impl<'a, S: DataSource + ?Sized> AnnotCollector<'a, S> {
    pub fn new(
        source: &'a S,
        selector: &'a AnnotSelector,
    ) -> Self {
        Self { source, selector }
    }

    /// Searches one sequence, recursing into its segments when the
    /// selector allows it.
    pub fn collect_by_single_sequence(
        &self,
        id: &SeqIdStr,
        range: SeqRange,
        strand: Strand,
    ) -> CollectResult<AnnotResultSet> {
        self.selector.validate()?;
        let mut pass = CollectPass::new(self.source, self.selector);
        pass.add_root(id, range, strand)?;
        pass.run()
    }

    /// Searches every range of every sequence in `map`.
    pub fn collect_by_location_map(
        &self,
        map: &LocationMap,
    ) -> CollectResult<AnnotResultSet> {
        self.selector.validate()?;
        let mut pass = CollectPass::new(self.source, self.selector);
        for (id, ranges) in map.iter() {
            for (range, strand) in ranges.iter() {
                pass.add_root(id, *range, *strand)?;
            }
        }
        pass.multi_range = map.values().map(Vec::len).sum::<usize>() > 1;
        pass.run()
    }

    pub fn collect_by_location(
        &self,
        loc: &SeqLoc,
    ) -> CollectResult<AnnotResultSet> {
        self.collect_by_location_map(&location_map(loc))
    }

    /// Walks every object of one container, without resolution or mapping.
    pub fn collect_fixed(
        &self,
        container: &Arc<Container>,
    ) -> CollectResult<AnnotResultSet> {
        self.selector.validate()?;
        let mut pass = CollectPass::new(self.source, self.selector);
        pass.fixed = true;
        let ids = container
            .read_annots()?
            .annots()
            .flat_map(|(_, annot)| annot.by_field(self.selector.field()).seq_ids())
            .unique()
            .collect_vec();
        let item = SearchItem {
            synonyms:   SynonymSet::new(ids, Vec::new(), Some(container.id())),
            range:      SeqRange::whole(),
            strand:     Strand::None,
            conversion: None,
            depth:      0,
            unresolved: true,
        };
        pass.lock(container);
        pass.search_container(container, &item)?;
        pass.finish()
    }

    /// Walks the container named by the selector's search limit.
    pub fn collect_limited(&self) -> CollectResult<AnnotResultSet> {
        let limit = self.selector.limit();
        let id = limit.container().ok_or_else(|| {
            CollectError::LimitConfiguration(
                "searching all objects needs a container search limit".into(),
            )
        })?;
        let container = self.source.container(id).ok_or_else(|| {
            CollectError::LimitConfiguration(format!("container {} is not in scope", id))
        })?;
        self.collect_fixed(&container)
    }
}

/// One sequence range to search, expressed in that sequence's coordinates.
#[derive(Debug, Clone)]
struct SearchItem {
    synonyms:   SynonymSet,
    range:      SeqRange,
    strand:     Strand,
    /// Maps this level onto the caller's coordinates; `None` at the top.
    conversion: Option<SeqLocConversion>,
    depth:      usize,
    /// No segment recursion below this item.
    unresolved: bool,
}

impl SearchItem {
    fn level_id(&self) -> Option<&SeqIdStr> {
        self.synonyms.primary()
    }
}

/// Object read from the index under the annotation lock.
#[derive(Debug, Clone)]
struct Candidate {
    index:  ObjectIndex,
    key:    AnnotTypeKey,
    object: Arc<AnnotObject>,
}

type GroupKey = (AnnotName, SeqIdStr, AnnotTypeKey);

/// Scan state of one container. Groups that hit chunk stubs are rolled
/// back, the chunks are loaded with the lock released and only those groups
/// are scanned again.
#[derive(Debug)]
enum ScanState {
    Scanning,
    AwaitingLoad {
        chunks: Vec<ChunkId>,
        groups: Vec<GroupKey>,
    },
    Retrying {
        groups: Vec<GroupKey>,
    },
}

/// State of a single collection call. Dropping it releases every container
/// lock and pending mapping.
struct CollectPass<'a, S: DataSource + ?Sized> {
    source:      &'a S,
    selector:    &'a AnnotSelector,
    locks:       IndexMap<ContainerId, ContainerLock>,
    work:        VecDeque<SearchItem>,
    results:     Vec<AnnotObjectRef>,
    pending:     HashSet<ObjectKey>,
    /// Mapped references that will be returned, counted towards the cap.
    mapped:      usize,
    mapped_keys: HashSet<ObjectKey>,
    conversions: ConversionSet,
    types:       BTreeSet<AnnotTypeKey>,
    loc_guard:   HashSet<(SeqIdStr, SeqRange)>,
    tse:         Option<ContainerId>,
    need_unique: bool,
    multi_range: bool,
    fixed:       bool,
}

impl<'a, S: DataSource + ?Sized> CollectPass<'a, S> {
    fn new(
        source: &'a S,
        selector: &'a AnnotSelector,
    ) -> Self {
        Self {
            source,
            selector,
            locks: IndexMap::new(),
            work: VecDeque::new(),
            results: Vec::new(),
            pending: HashSet::new(),
            mapped: 0,
            mapped_keys: HashSet::new(),
            conversions: ConversionSet::new(),
            types: BTreeSet::new(),
            loc_guard: HashSet::new(),
            tse: None,
            need_unique: false,
            multi_range: false,
            fixed: false,
        }
    }

    fn add_root(
        &mut self,
        id: &SeqIdStr,
        range: SeqRange,
        strand: Strand,
    ) -> CollectResult<()> {
        let (synonyms, unresolved) = match self.source.synonyms(id) {
            Some(synonyms) => (synonyms, false),
            None => {
                match self.selector.unresolved() {
                    UnresolvedPolicy::Ignore => {
                        debug!("Skipping unresolved sequence {}", id);
                        return Ok(());
                    },
                    UnresolvedPolicy::Search => (SynonymSet::unresolved(id), true),
                    UnresolvedPolicy::Fail => {
                        return Err(CollectError::UnresolvedId(id.clone()))
                    },
                }
            },
        };
        if self.tse.is_none() {
            self.tse = synonyms.owner();
        }
        if range.is_circular() {
            self.need_unique = true;
        }
        if let Some(primary) = synonyms.primary() {
            self.loc_guard.insert((primary.clone(), range));
        }
        self.work.push_back(SearchItem {
            synonyms,
            range,
            strand,
            conversion: None,
            depth: 0,
            unresolved,
        });
        Ok(())
    }

    fn run(mut self) -> CollectResult<AnnotResultSet> {
        while let Some(item) = self.work.pop_front() {
            if self.is_full() {
                debug!("Result cap reached, {} items left unsearched", self.work.len() + 1);
                break;
            }
            self.search_item(&item)?;
        }
        self.finish()
    }

    /// Only an unsorted search may stop early; a sorted one must see every
    /// candidate before truncating. Deferred references may still be dropped
    /// and duplicates are removed later, so neither is counted.
    fn is_full(&self) -> bool {
        let found = if self.need_unique || self.multi_range {
            self.mapped_keys.len()
        }
        else {
            self.mapped
        };
        !self.selector.collect_types()
            && self.selector.sort_order() == SortOrder::None
            && self.selector.max_size().is_some_and(|max| found >= max)
    }

    fn lock(
        &mut self,
        container: &Arc<Container>,
    ) {
        self.locks
            .entry(container.id())
            .or_insert_with(|| container.lock());
    }

    fn search_item(
        &mut self,
        item: &SearchItem,
    ) -> CollectResult<()> {
        let containers = self.containers_for(item)?;
        trace!(
            "Searching {:?} {} at depth {} in {} containers",
            item.level_id(),
            item.range,
            item.depth,
            containers.len()
        );
        let mut shallow_enough = false;
        for (n, container) in containers.iter().enumerate() {
            self.lock(container);
            if n == 0 && self.selector.adaptive_depth() && !self.selector.exact_depth() {
                shallow_enough = self.has_triggers(container, item)?;
            }
            self.search_container(container, item)?;
            if self.is_full() {
                return Ok(());
            }
        }
        if shallow_enough {
            debug!(
                "Adaptive depth stops below {:?} at depth {}",
                item.level_id(),
                item.depth
            );
        }
        else if !item.unresolved && item.depth < self.selector.resolve_depth() {
            self.push_segments(item)?;
        }
        Ok(())
    }

    fn containers_for(
        &self,
        item: &SearchItem,
    ) -> CollectResult<Vec<Arc<Container>>> {
        let ids = item
            .synonyms
            .ids()
            .iter()
            .chain(item.synonyms.raw_ids())
            .unique()
            .cloned()
            .collect_vec();
        let mut containers = match self.selector.resolve_method() {
            ResolveMethod::None => {
                let id = self.selector.limit().container().ok_or_else(|| {
                    CollectError::LimitConfiguration(
                        "resolve method 'none' needs a container search limit".into(),
                    )
                })?;
                self.source.container(id).into_iter().collect_vec()
            },
            ResolveMethod::TseOnly => {
                match self.tse {
                    Some(tse) => self.source.resolve_containers(&ids, ContainerScope::Tse(tse)),
                    None => Vec::new(),
                }
            },
            ResolveMethod::All => self.source.resolve_containers(&ids, ContainerScope::All),
        };
        if self.selector.exclude_external() {
            let owner = item.synonyms.owner();
            containers.retain(|c| Some(c.id()) == owner);
        }
        if let Some(limit) = self.selector.limit().container() {
            containers.retain(|c| c.id() == limit);
        }
        Ok(containers)
    }

    /// Ids an object of `container` may be indexed under for this item.
    fn search_ids(
        &self,
        container: &Container,
        synonyms: &SynonymSet,
    ) -> Vec<SeqIdStr> {
        let mut ids = synonyms.ids().to_vec();
        if container.has_mismatched_ids() {
            let gi_only = self.selector.gi_only_mismatch();
            ids.extend(
                synonyms
                    .raw_ids()
                    .iter()
                    .filter(|id| !gi_only || is_gi_like(id))
                    .cloned(),
            );
        }
        ids.into_iter().unique().collect_vec()
    }

    fn has_triggers(
        &self,
        container: &Container,
        item: &SearchItem,
    ) -> CollectResult<bool> {
        let ids = self.search_ids(container, &item.synonyms);
        let state = container.read_annots()?;
        let found = state.annots().any(|(_, annot)| {
            let index = annot.by_field(MappedField::Location);
            ids.iter().any(|id| {
                self.selector.adaptive_triggers().iter().any(|subtype| {
                    !index
                        .find(id, AnnotTypeKey::Feat(*subtype), &item.range)
                        .is_empty()
                })
            })
        });
        Ok(found)
    }

    /// Scans one container for `item`, loading chunks as stubs are hit.
    fn search_container(
        &mut self,
        container: &Arc<Container>,
        item: &SearchItem,
    ) -> CollectResult<()> {
        let ids = self.search_ids(container, &item.synonyms);
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut loaded: HashSet<ChunkId> = HashSet::new();
        let mut state = ScanState::Scanning;

        loop {
            state = match state {
                ScanState::Scanning => {
                    let annots = container.read_annots()?;
                    self.gather(&annots, &ids, item, None, &mut candidates)
                },
                ScanState::Retrying { groups } => {
                    let annots = container.read_annots()?;
                    self.gather(&annots, &ids, item, Some(&groups), &mut candidates)
                },
                ScanState::AwaitingLoad { chunks, groups } => {
                    if let Some(chunk) = chunks.iter().find(|c| loaded.contains(*c)) {
                        return Err(CollectError::ChunkLoad {
                            container: container.id(),
                            chunk:     *chunk,
                            reason:    "stub still present after load".into(),
                        });
                    }
                    debug!(
                        "Loading chunks {:?} of container {} for {} groups",
                        chunks,
                        container.id(),
                        groups.len()
                    );
                    self.source.load_chunks(container, &chunks)?;
                    loaded.extend(chunks);
                    ScanState::Retrying { groups }
                },
            };
            if let ScanState::Scanning = state {
                break;
            }
        }

        let mut seen: HashSet<ObjectIndex> = HashSet::new();
        for candidate in candidates {
            if !seen.insert(candidate.index) {
                continue;
            }
            if candidate.key == AnnotTypeKey::Locs {
                if !self.fixed {
                    self.expand_locs(container, &candidate, &ids, item);
                }
                continue;
            }
            if !self.matches(&candidate.object, &ids, item) {
                continue;
            }
            if self.selector.collect_types() {
                self.types.insert(candidate.key);
                continue;
            }
            self.add_object(container, candidate, &ids, item);
            if self.is_full() {
                break;
            }
        }
        Ok(())
    }

    /// Reads candidates of every group (or of `retry` only) under the lock.
    /// A group hitting stubs keeps none of its candidates. Returns the next
    /// scan state, `Scanning` meaning done.
    fn gather(
        &self,
        annots: &AnnotState,
        ids: &[SeqIdStr],
        item: &SearchItem,
        retry: Option<&[GroupKey]>,
        candidates: &mut Vec<Candidate>,
    ) -> ScanState {
        let field = self.selector.field();
        let mut chunks: Vec<ChunkId> = Vec::new();
        let mut stubbed: Vec<GroupKey> = Vec::new();

        for (name, annot) in annots.annots() {
            if !self.selector.accepts_name(name) {
                continue;
            }
            let index = annot.by_field(field);
            for id in ids.iter() {
                for key in index.keys_for(id) {
                    let wanted = self.selector.accepts_key(key)
                        || (key == AnnotTypeKey::Locs && field == MappedField::Location);
                    if !wanted {
                        continue;
                    }
                    let group = (name.clone(), id.clone(), key);
                    if retry.is_some_and(|groups| !groups.contains(&group)) {
                        continue;
                    }

                    let mark = candidates.len();
                    let mut group_chunks = Vec::new();
                    for entry in index.find(id, key, &item.range) {
                        match entry {
                            IndexEntry::Object(idx) => {
                                match annots.object(idx) {
                                    Some(object) => {
                                        candidates.push(Candidate {
                                            index: idx,
                                            key,
                                            object: Arc::clone(object),
                                        })
                                    },
                                    None => warn!("Index points past object {}", idx),
                                }
                            },
                            IndexEntry::Stub(chunk) => group_chunks.push(chunk),
                        }
                    }
                    if !group_chunks.is_empty() {
                        candidates.truncate(mark);
                        chunks.extend(group_chunks);
                        stubbed.push(group);
                    }
                }
            }
        }

        if chunks.is_empty() {
            ScanState::Scanning
        }
        else {
            ScanState::AwaitingLoad {
                chunks: chunks.into_iter().unique().collect_vec(),
                groups: stubbed,
            }
        }
    }

    fn matches(
        &self,
        object: &AnnotObject,
        ids: &[SeqIdStr],
        item: &SearchItem,
    ) -> bool {
        let Some(loc) = object.located_by(self.selector.field()) else {
            return false;
        };
        match self.selector.overlap() {
            OverlapType::TotalRange => {
                loc.total_range_on(ids).is_some_and(|(range, strand)| {
                    range.intersects(&item.range) && strand.compatible(&item.strand)
                })
            },
            OverlapType::Intervals => {
                loc.intervals().into_iter().any(|iv| {
                    ids.contains(iv.id())
                        && iv.range().intersects(&item.range)
                        && iv.strand().compatible(&item.strand)
                })
            },
        }
    }

    /// Records a matching object, mapping it now when one conversion covers
    /// it exactly and deferring it otherwise.
    fn add_object(
        &mut self,
        container: &Arc<Container>,
        candidate: Candidate,
        ids: &[SeqIdStr],
        item: &SearchItem,
    ) {
        let key = (container.id(), candidate.index);
        let object = Arc::clone(&candidate.object);
        let Some(loc) = object.located_by(self.selector.field()) else {
            return;
        };
        let Some((own_range, own_strand)) = loc.total_range_on(ids) else {
            return;
        };
        if own_range.is_circular() {
            self.need_unique = true;
        }
        let loc_ids = loc.seq_ids();
        let hit_ids = ids.iter().filter(|id| loc_ids.contains(id)).collect_vec();

        let Some(conversion) = item.conversion.as_ref() else {
            if !self.fixed && loc.is_multi_id() && self.selector.merge_conversions() {
                for id in hit_ids {
                    self.conversions
                        .add(key, SeqLocConversion::identity(id));
                }
                self.push_pending(container, candidate, own_range, own_strand);
            }
            else {
                let (range, strand) = if self.fixed {
                    loc.total_range().unwrap_or((own_range, own_strand))
                }
                else {
                    (own_range, own_strand)
                };
                self.push(container, candidate, AnnotMappingInfo::unmapped(range, strand));
            }
            return;
        };

        let per_id = hit_ids
            .into_iter()
            .map(|id| conversion.for_source(id))
            .collect_vec();
        let is_align = matches!(object.as_ref(), AnnotObject::Align(_));

        if let [single] = per_id.as_slice() {
            if !is_align && single.covers(&loc) {
                if let Some(info) = mapped_info(single, &loc) {
                    self.push(container, candidate, info);
                    return;
                }
                warn!(
                    "{}",
                    CollectError::ConversionFailure {
                        container: key.0,
                        index:     key.1,
                        reason:    format!("exact conversion {} failed", single),
                    }
                );
                return;
            }
        }

        if is_align || self.selector.merge_conversions() {
            for conv in per_id {
                self.conversions.add(key, conv);
            }
            self.push_pending(container, candidate, own_range, own_strand);
            return;
        }

        // Direct mapping: each conversion clips on its own.
        for conv in per_id {
            match mapped_info(&conv, &loc) {
                Some(info) => self.push(container, candidate.clone(), info),
                None => {
                    debug!(
                        "{}",
                        CollectError::EmptyMappingResult {
                            container: key.0,
                            index:     key.1,
                        }
                    )
                },
            }
        }
    }

    fn push(
        &mut self,
        container: &Arc<Container>,
        candidate: Candidate,
        info: AnnotMappingInfo,
    ) {
        trace!(
            "Found {}:{} at {}",
            container.id(),
            candidate.index,
            info.total_range()
        );
        if !info.is_pending() {
            self.mapped += 1;
            self.mapped_keys.insert((container.id(), candidate.index));
        }
        self.results.push(AnnotObjectRef::new(
            Arc::clone(container),
            candidate.index,
            candidate.object,
            info,
        ));
    }

    /// Adds a reference awaiting the conversion set, once per object.
    fn push_pending(
        &mut self,
        container: &Arc<Container>,
        candidate: Candidate,
        range: SeqRange,
        strand: Strand,
    ) {
        if self.pending.insert((container.id(), candidate.index)) {
            self.push(container, candidate, AnnotMappingInfo::pending(range, strand));
        }
    }

    /// Follows an indirection object: the part of `item` it covers is
    /// searched again on its target, mapped back through the indirection.
    fn expand_locs(
        &mut self,
        container: &Container,
        candidate: &Candidate,
        ids: &[SeqIdStr],
        item: &SearchItem,
    ) {
        let AnnotObject::Locs(locs) = candidate.object.as_ref() else {
            return;
        };
        let target = match locs.target() {
            SeqLoc::Int(target) => target,
            _ => {
                warn!(
                    "{}",
                    CollectError::BadLocationShape {
                        container: container.id(),
                        index:     candidate.index,
                    }
                );
                return;
            },
        };
        let location = locs.location();
        if !ids.contains(location.id()) {
            return;
        }
        let Some(overlap) = item
            .range
            .parts()
            .iter()
            .find_map(|part| part.intersection(&location.range()))
        else {
            return;
        };

        let back = SeqLocConversion::between(target, location);
        let Some(sub) = back
            .inverse()
            .and_then(|fwd| fwd.convert_range(&overlap))
            .map(|c| c.range)
        else {
            return;
        };
        let synonyms = self
            .source
            .synonyms(target.id())
            .unwrap_or_else(|| SynonymSet::unresolved(target.id()));
        let target_id = synonyms.primary().unwrap_or(target.id()).clone();
        if !self.loc_guard.insert((target_id.clone(), sub)) {
            trace!("Indirection to {}:{} already expanded", target_id, sub);
            return;
        }
        self.need_unique = true;

        let back = back.for_source(&target_id);
        let conversion = match item.conversion.as_ref() {
            Some(outer) => {
                match back.combine(&outer.for_source(location.id())) {
                    Some(net) => net,
                    None => return,
                }
            },
            None => back,
        };
        trace!("Following indirection to {}:{}", target_id, sub);
        self.work.push_back(SearchItem {
            synonyms,
            range: sub,
            strand: item.strand.flipped(conversion.is_reverse()),
            conversion: Some(conversion),
            depth: item.depth,
            unresolved: false,
        });
    }

    /// Queues the segments of the item's sequence that intersect its range.
    fn push_segments(
        &mut self,
        item: &SearchItem,
    ) -> CollectResult<()> {
        let source = self.source;
        let Some((level_id, map)) = item
            .synonyms
            .ids()
            .iter()
            .find_map(|id| source.segment_map(id).map(|m| (id, m)))
        else {
            return Ok(());
        };
        let level_id = item.level_id().unwrap_or(level_id).clone();

        for segment in map.overlapping(&item.range) {
            let Some((ref_id, _, reversed)) = segment.referenced() else {
                continue;
            };
            let Some(overlap) = item
                .range
                .parts()
                .iter()
                .find_map(|part| part.intersection(&segment.master_range()))
            else {
                continue;
            };
            let Some(seg_conv) = SeqLocConversion::from_segment(segment, &level_id) else {
                continue;
            };
            let Some(sub) = seg_conv
                .inverse()
                .and_then(|inv| inv.convert_range(&overlap))
                .map(|c| c.range)
            else {
                continue;
            };

            let (synonyms, unresolved) = match source.synonyms(ref_id) {
                Some(synonyms) => (synonyms, false),
                None => {
                    match self.selector.unresolved() {
                        UnresolvedPolicy::Ignore => {
                            trace!("Skipping unresolved segment {}", ref_id);
                            continue;
                        },
                        UnresolvedPolicy::Search => (SynonymSet::unresolved(ref_id), true),
                        UnresolvedPolicy::Fail => {
                            return Err(CollectError::UnresolvedId(ref_id.clone()))
                        },
                    }
                },
            };
            if self.selector.resolve_method() == ResolveMethod::TseOnly
                && synonyms.owner() != self.tse
            {
                trace!("Segment {} is outside the top-level container", ref_id);
                continue;
            }

            let ref_primary = synonyms.primary().unwrap_or(ref_id).clone();
            let seg_conv = seg_conv.for_source(&ref_primary);
            let conversion = match item.conversion.as_ref() {
                Some(outer) => {
                    match seg_conv.combine(outer) {
                        Some(net) => net,
                        None => continue,
                    }
                },
                None => seg_conv,
            };
            self.work.push_back(SearchItem {
                synonyms,
                range: sub,
                strand: item.strand.flipped(reversed),
                conversion: Some(conversion),
                depth: item.depth + 1,
                unresolved,
            });
        }
        Ok(())
    }

    /// Resolves deferred mappings, deduplicates, sorts and applies the cap.
    fn finish(mut self) -> CollectResult<AnnotResultSet> {
        let field = self.selector.field();
        let conversions = std::mem::take(&mut self.conversions);
        let mut results = std::mem::take(&mut self.results);
        let n_pending = self.pending.len();

        results.retain_mut(|reference| {
            if !reference.mapping().is_pending() {
                return true;
            }
            let key = reference.key();
            let object = Arc::clone(reference.object_arc());
            match conversions.resolve(key, &object, field, reference.mapping_mut()) {
                Ok(()) => true,
                Err(err @ CollectError::EmptyMappingResult { .. }) => {
                    debug!("{}", err);
                    false
                },
                Err(err) => {
                    warn!("{}", err);
                    false
                },
            }
        });

        if self.need_unique || self.multi_range {
            let mut seen: HashSet<ObjectKey> = HashSet::new();
            results.retain(|reference| seen.insert(reference.key()));
        }

        if self.selector.sort_order() != SortOrder::None {
            let order =
                ObjectRefOrder::new(self.selector.sort_order(), self.selector.type_order());
            results.sort_by(|a, b| order.compare(a, b));
        }
        if let Some(max) = self.selector.max_size() {
            results.truncate(max);
        }

        debug!(
            "Collected {} objects from {} containers ({} deferred mappings)",
            results.len(),
            self.locks.len(),
            n_pending
        );
        Ok(AnnotResultSet::new(results, std::mem::take(&mut self.types)))
    }
}

/// Maps `loc` through one conversion into a finished mapping record.
fn mapped_info(
    conversion: &SeqLocConversion,
    loc: &SeqLoc,
) -> Option<AnnotMappingInfo> {
    let (mapped, partial_from, partial_to) = conversion.convert_loc(loc)?;
    let (range, strand) = mapped.total_range_on(&[conversion.dst_id().clone()])?;
    let mut info = AnnotMappingInfo::unmapped(range, strand);
    info.set_mapped_location(mapped, range, strand);
    info.set_partial(partial_from, partial_to);
    Some(info)
}
