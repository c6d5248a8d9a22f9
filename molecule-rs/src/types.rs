/// Index of a reference sequence in the alignment header.
pub type RefId = usize;
/// Sequence number of an emitted molecule (written as the `MI` tag).
pub type MoleculeId = u32;
/// 0-based reference coordinate.
pub type Pos = i64;
