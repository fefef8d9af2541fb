use std::cmp::Ordering;

use super::AnnotObjectRef;
use crate::data_structs::annotation::FeatTypeOrder;
use crate::data_structs::SortOrder;

/// Orders references by identity only.
pub fn compare_identity(
    a: &AnnotObjectRef,
    b: &AnnotObjectRef,
) -> Ordering {
    a.key().cmp(&b.key())
}

/// Presentation order of references.
///
/// Wrapping ranges come first. Otherwise ascending order sorts by start and
/// then by descending end; reverse order sorts by descending end and then by
/// start. Equal extents are broken by annotation kind, type priority and
/// subtype. Full features then precede table surrogates and are ordered by
/// content; identity decides the rest. References to the same object are
/// equal only when their mapped ranges are.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRefOrder<'a> {
    order: SortOrder,
    types: &'a FeatTypeOrder,
}

impl<'a> ObjectRefOrder<'a> {
    pub fn new(
        order: SortOrder,
        types: &'a FeatTypeOrder,
    ) -> Self {
        Self { order, types }
    }

    pub fn compare(
        &self,
        a: &AnnotObjectRef,
        b: &AnnotObjectRef,
    ) -> Ordering {
        // One object mapped in several pieces is ordered by its ranges.
        if a.key() == b.key() && a.mapped_range() == b.mapped_range() {
            return Ordering::Equal;
        }
        b.is_circular()
            .cmp(&a.is_circular())
            .then_with(|| self.compare_extent(a, b))
            .then_with(|| self.tie_break(a, b))
    }

    fn compare_extent(
        &self,
        a: &AnnotObjectRef,
        b: &AnnotObjectRef,
    ) -> Ordering {
        let (ra, rb) = (a.mapped_range(), b.mapped_range());
        match self.order {
            SortOrder::Reverse => {
                rb.to()
                    .cmp(&ra.to())
                    .then_with(|| ra.from().cmp(&rb.from()))
            },
            SortOrder::Normal | SortOrder::None => {
                ra.from()
                    .cmp(&rb.from())
                    .then_with(|| rb.to().cmp(&ra.to()))
            },
        }
    }

    fn tie_break(
        &self,
        a: &AnnotObjectRef,
        b: &AnnotObjectRef,
    ) -> Ordering {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| {
                match (a.subtype(), b.subtype()) {
                    (Some(sa), Some(sb)) => {
                        self.types
                            .priority(sa.feat_type())
                            .cmp(&self.types.priority(sb.feat_type()))
                            .then_with(|| sa.code().cmp(&sb.code()))
                    },
                    _ => Ordering::Equal,
                }
            })
            // Full features before table surrogates.
            .then_with(|| a.is_table().cmp(&b.is_table()))
            .then_with(|| {
                match (a.object().as_feat(), b.object().as_feat()) {
                    (Some(fa), Some(fb)) => {
                        fa.compare_content(fb).unwrap_or(Ordering::Equal)
                    },
                    _ => Ordering::Equal,
                }
            })
            .then_with(|| compare_identity(a, b))
    }
}
