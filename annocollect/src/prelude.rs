pub use crate::collector::{
    location_map,
    AnnotCollector,
    AnnotItem,
    AnnotObjectRef,
    AnnotResultSet,
    AnnotSelector,
    LocationMap,
    ObjectRefOrder,
    SearchLimit,
};
pub use crate::data_structs::annotation::{
    AnnotLocs,
    AnnotName,
    AnnotObject,
    AnnotTypeKey,
    FeatData,
    FeatSubtype,
    FeatType,
    FeatTypeOrder,
    SeqAlign,
    SeqFeature,
    SeqGraph,
    SnpRecord,
};
pub use crate::data_structs::coords::{
    SeqInterval,
    SeqLoc,
    SeqRange,
};
pub use crate::data_structs::typedef::{
    ChunkId,
    ContainerId,
    ObjectIndex,
    PosType,
    SeqIdStr,
};
pub use crate::data_structs::{
    AnnotKind,
    MappedField,
    OverlapType,
    ResolveMethod,
    SortOrder,
    Strand,
    UnresolvedPolicy,
};
pub use crate::error::{
    CollectError,
    CollectResult,
};
pub use crate::mapping::{
    AnnotMappingInfo,
    ConversionSet,
    SeqLocConversion,
};
pub use crate::source::{
    AnnotIndex,
    Container,
    ContainerScope,
    DataSource,
    Scope,
    Segment,
    SegmentMap,
    SynonymSet,
};
