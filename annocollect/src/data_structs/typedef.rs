use smallstr::SmallString;

pub const SMALLSTR_SIZE: usize = 20;
/// Sequence identifier. Most accessions fit inline without allocation.
pub type SeqIdStr = SmallString<[u8; SMALLSTR_SIZE]>;
pub type PosType = u32;
/// Signed offset used by coordinate conversions.
pub type ShiftType = i64;
pub type ContainerId = u32;
pub type ObjectIndex = u32;
pub type ChunkId = u32;

/// Ids of the form `gi|123` or a bare integer are treated as GI-like.
pub fn is_gi_like(id: &str) -> bool {
    let digits = id.strip_prefix("gi|").unwrap_or(id);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
