mod feat_type;
mod object;

pub use feat_type::{
    AnnotTypeKey,
    FeatSubtype,
    FeatType,
    FeatTypeOrder,
};
pub use object::{
    AnnotLocs,
    AnnotName,
    AnnotObject,
    FeatData,
    SeqAlign,
    SeqFeature,
    SeqGraph,
    SnpRecord,
};
