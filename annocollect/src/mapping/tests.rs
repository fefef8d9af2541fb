use rand::{
    Rng,
    SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use rstest::*;

use super::*;
use crate::data_structs::annotation::{
    AnnotObject,
    FeatSubtype,
    SeqAlign,
    SeqFeature,
};
use crate::data_structs::coords::{
    SeqInterval,
    SeqLoc,
    SeqRange,
};
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};
use crate::data_structs::{
    MappedField,
    Strand,
};
use crate::error::CollectError;
use crate::source::Segment;

fn master() -> SeqIdStr {
    "S".into()
}

fn iv(
    id: &str,
    from: u32,
    to: u32,
    strand: Strand,
) -> SeqInterval {
    SeqInterval::new(id.into(), from, to, strand)
}

#[fixture]
fn forward() -> SeqLocConversion {
    SeqLocConversion::from_segment(&Segment::reference(0, 100, "T", 1000, false), &master())
        .unwrap()
}

#[fixture]
fn reversed() -> SeqLocConversion {
    SeqLocConversion::from_segment(&Segment::reference(0, 100, "T", 1000, true), &master())
        .unwrap()
}

#[rstest]
fn test_forward_segment_shift(forward: SeqLocConversion) {
    assert_eq!(forward.shift(), -1000);
    let c = forward.convert_range(&SeqRange::new(1020, 1050)).unwrap();
    assert_eq!(c.range, SeqRange::new(20, 50));
    assert!(c.is_exact());
    assert_eq!(forward.convert_pos(1000), Some(0));
    assert_eq!(forward.convert_pos(1100), None);
}

#[rstest]
fn test_reversed_segment_flips(reversed: SeqLocConversion) {
    assert_eq!(reversed.convert_pos(1000), Some(99));
    assert_eq!(reversed.convert_pos(1099), Some(0));
    let c = reversed.convert_range(&SeqRange::new(1020, 1050)).unwrap();
    assert_eq!(c.range, SeqRange::new(50, 80));

    let (mapped, _) = reversed
        .convert_interval(&iv("T", 1020, 1050, Strand::Forward))
        .unwrap();
    assert_eq!(mapped.strand(), Strand::Reverse);
    assert_eq!(mapped.id().as_str(), "S");
}

#[rstest]
#[case::forward(false, SeqRange::new(0, 10), true, false)]
#[case::reversed(true, SeqRange::new(90, 100), false, true)]
fn test_clipping_flags(
    #[case] flip: bool,
    #[case] expected: SeqRange,
    #[case] partial_from: bool,
    #[case] partial_to: bool,
) {
    let conv = SeqLocConversion::from_segment(
        &Segment::reference(0, 100, "T", 1000, flip),
        &master(),
    )
    .unwrap();
    let c = conv.convert_range(&SeqRange::new(990, 1010)).unwrap();
    assert_eq!(c.range, expected);
    assert_eq!((c.partial_from, c.partial_to), (partial_from, partial_to));
    assert!(conv.convert_range(&SeqRange::new(0, 10)).is_none());
}

#[rstest]
fn test_combine_forward_then_reverse(forward: SeqLocConversion) {
    let outer = SeqLocConversion::from_segment(
        &Segment::reference(500, 100, "S", 0, true),
        &"M".into(),
    )
    .unwrap();
    let net = forward.combine(&outer).unwrap();
    assert!(net.is_reverse());
    assert_eq!(net.src_range(), SeqRange::new(1000, 1100));
    assert_eq!(net.dst_id().as_str(), "M");

    let direct = net.convert_range(&SeqRange::new(1020, 1050)).unwrap();
    let stepwise = forward
        .convert_range(&SeqRange::new(1020, 1050))
        .and_then(|c| outer.convert_range(&c.range))
        .unwrap();
    assert_eq!(direct.range, SeqRange::new(550, 580));
    assert_eq!(direct.range, stepwise.range);

    // Chains must meet on the same sequence.
    assert!(outer.combine(&forward).is_none());
}

#[rstest]
#[case::forward(false)]
#[case::reversed(true)]
fn test_inverse_round_trip(#[case] flip: bool) {
    let conv = SeqLocConversion::from_segment(
        &Segment::reference(300, 100, "T", 1000, flip),
        &master(),
    )
    .unwrap();
    let back = conv.inverse().unwrap();
    assert_eq!(back.src_id().as_str(), "S");
    assert_eq!(back.src_range(), SeqRange::new(300, 400));
    let there = conv.convert_range(&SeqRange::new(1010, 1030)).unwrap().range;
    assert_eq!(
        back.convert_range(&there).unwrap().range,
        SeqRange::new(1010, 1030)
    );
}

#[rstest]
fn test_identity_is_neutral(forward: SeqLocConversion) {
    let id = SeqLocConversion::identity(&master());
    assert!(id.is_identity());
    assert_eq!(forward.combine(&id), Some(forward.clone()));
}

#[rstest]
fn test_convert_loc_drops_foreign_pieces(forward: SeqLocConversion) {
    let loc = SeqLoc::Packed {
        intervals: vec![
            iv("X", 0, 10, Strand::Forward),
            iv("T", 1010, 1020, Strand::Forward),
            iv("T", 1090, 1120, Strand::Forward),
        ],
    };
    let (mapped, partial_from, partial_to) = forward.convert_loc(&loc).unwrap();
    assert_eq!(mapped.intervals().len(), 2);
    assert_eq!(mapped.total_range().unwrap().0, SeqRange::new(10, 100));
    assert!(partial_from);
    assert!(partial_to);
    assert!(!forward.covers(&loc));
    assert!(forward.covers(&iv("T", 1010, 1020, Strand::Forward).into()));
}

#[test]
fn test_between_maps_target_onto_location() {
    let conv = SeqLocConversion::between(
        &iv("T", 5000, 5100, Strand::Forward),
        &iv("S", 200, 300, Strand::Forward),
    );
    assert_eq!(conv.convert_pos(5000), Some(200));
    let rev = SeqLocConversion::between(
        &iv("T", 5000, 5100, Strand::Reverse),
        &iv("S", 200, 300, Strand::Forward),
    );
    assert_eq!(rev.convert_pos(5000), Some(299));
}

fn two_segment_set(key: ObjectKey) -> ConversionSet {
    let mut set = ConversionSet::new();
    for seg in [
        Segment::reference(0, 100, "T", 1000, false),
        Segment::reference(100, 100, "T", 1100, false),
    ] {
        set.add(key, SeqLocConversion::from_segment(&seg, &master()).unwrap());
    }
    set
}

#[test]
fn test_conversion_set_merges_partial_mappings() {
    let key = (1, 0);
    let set = two_segment_set(key);
    assert_eq!(set.conversions(&key).len(), 2);

    let object: AnnotObject =
        SeqFeature::new(FeatSubtype::Gene, iv("T", 1090, 1110, Strand::Forward).into())
            .into();
    let mut info = AnnotMappingInfo::pending(SeqRange::new(1090, 1110), Strand::Forward);
    set.resolve(key, &object, MappedField::Location, &mut info)
        .unwrap();

    assert!(!info.is_pending());
    assert_eq!(info.total_range(), SeqRange::new(90, 110));
    assert!(!info.is_partial());
    assert_eq!(info.mapped_location().unwrap().intervals().len(), 2);
}

#[test]
fn test_conversion_set_empty_result() {
    let key = (1, 3);
    let set = two_segment_set(key);
    let object: AnnotObject =
        SeqFeature::new(FeatSubtype::Gene, iv("T", 5000, 5100, Strand::Forward).into())
            .into();
    let mut info = AnnotMappingInfo::pending(SeqRange::new(5000, 5100), Strand::Forward);
    let err = set
        .resolve(key, &object, MappedField::Location, &mut info)
        .unwrap_err();
    assert_eq!(err, CollectError::EmptyMappingResult {
        container: 1,
        index:     3,
    });
    assert!(err.is_recoverable());
}

#[test]
fn test_conversion_set_rejects_bad_shape() {
    let key = (1, 4);
    let set = two_segment_set(key);
    let object: AnnotObject = SeqFeature::new(FeatSubtype::Gene, SeqLoc::Packed {
        intervals: vec![],
    })
    .into();
    let mut info = AnnotMappingInfo::pending(SeqRange::new(0, 1), Strand::None);
    let err = set
        .resolve(key, &object, MappedField::Location, &mut info)
        .unwrap_err();
    assert!(matches!(err, CollectError::ConversionFailure { .. }));
}

#[test]
fn test_conversion_set_maps_align_rows() {
    let key = (2, 0);
    let set = two_segment_set(key);
    let object: AnnotObject = SeqAlign::new(vec![
        iv("T", 1010, 1020, Strand::Forward),
        iv("X", 0, 10, Strand::Forward),
    ])
    .into();
    let mut info = AnnotMappingInfo::pending(SeqRange::new(1010, 1020), Strand::Forward);
    set.resolve(key, &object, MappedField::Location, &mut info)
        .unwrap();
    assert_eq!(info.total_range(), SeqRange::new(10, 20));
    match info.mapped() {
        MappedObject::Align(align) => {
            assert_eq!(align.rows()[0], iv("S", 10, 20, Strand::Forward));
            assert_eq!(align.rows()[1], iv("X", 0, 10, Strand::Forward));
        },
        other => panic!("unexpected payload {:?}", other),
    }
}

fn random_conversion(
    rng: &mut ChaCha8Rng,
    src: &str,
    dst: &str,
    near: PosType,
) -> SeqLocConversion {
    let len = rng.gen_range(1..400);
    let from = near.saturating_add(rng.gen_range(0..300)).saturating_sub(150);
    let target = rng.gen_range(0..20_000) as i64;
    let reverse = rng.gen_bool(0.5);
    let shift = if reverse {
        target + from as i64 + len as i64 - 1
    }
    else {
        target - from as i64
    };
    SeqLocConversion::new(
        src.into(),
        SeqRange::new(from, from + len),
        dst.into(),
        shift,
        reverse,
    )
}

#[test]
fn test_combine_associativity() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    for _ in 0..2000 {
        let a = random_conversion(&mut rng, "A", "B", 5_000);
        let a_image = a
            .convert_range(&a.src_range())
            .map(|c| c.range.from())
            .unwrap_or(0);
        let b = random_conversion(&mut rng, "B", "C", a_image);
        let b_image = b
            .convert_range(&b.src_range())
            .map(|c| c.range.from())
            .unwrap_or(0);
        let c = random_conversion(&mut rng, "C", "D", b_image);

        let start = a.src_range().from().saturating_sub(rng.gen_range(0..50));
        let end = a.src_range().to() + rng.gen_range(0..50);
        let from = rng.gen_range(start..end);
        let to = rng.gen_range(from + 1..=end);
        let query = SeqRange::new(from, to);

        let stepwise = a
            .convert_range(&query)
            .and_then(|x| b.convert_range(&x.range))
            .and_then(|x| c.convert_range(&x.range))
            .map(|x| x.range);
        let left = a
            .combine(&b)
            .and_then(|ab| ab.combine(&c))
            .and_then(|abc| abc.convert_range(&query))
            .map(|x| x.range);
        let right = b
            .combine(&c)
            .and_then(|bc| a.combine(&bc))
            .and_then(|abc| abc.convert_range(&query))
            .map(|x| x.range);

        assert_eq!(left, stepwise, "a={} b={} c={} q={}", a, b, c, query);
        assert_eq!(right, stepwise, "a={} b={} c={} q={}", a, b, c, query);
    }
}
