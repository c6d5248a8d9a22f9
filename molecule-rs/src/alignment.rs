use crate::types::{MoleculeId, Pos, RefId};
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::RecordBuf;

pub const BARCODE_TAG: Tag = Tag::new(b'B', b'X');
pub const MOLECULE_ID_TAG: Tag = Tag::new(b'M', b'I');

/// Mapping quality reported when the record carries none.
pub const MAPQ_UNAVAILABLE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// The view of one alignment the molecule engine needs.
///
/// Coordinates are 0-based and the end is exclusive, so `alignment_end() - position()`
/// is the number of reference bases covered.
pub trait AlignmentRecord {
    fn is_unmapped(&self) -> bool;
    fn is_supplementary(&self) -> bool;
    fn is_reverse(&self) -> bool;
    fn reference_id(&self) -> Option<RefId>;
    /// Leftmost aligned reference position.
    fn position(&self) -> Pos;
    fn alignment_end(&self) -> Pos;
    /// 255 when unavailable.
    fn mapping_quality(&self) -> u8;
    /// `AS` tag.
    fn alignment_score(&self) -> Option<i64>;
    /// `NM` tag.
    fn mismatches(&self) -> Option<i64>;
    /// `BX` tag.
    fn barcode(&self) -> Option<&[u8]>;
    fn query_length(&self) -> usize;
    /// Attach the `MI` annotation.
    fn set_molecule_id(&mut self, id: MoleculeId);

    fn strand(&self) -> Strand {
        if self.is_reverse() {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }
}

impl AlignmentRecord for RecordBuf {
    fn is_unmapped(&self) -> bool {
        self.flags().is_unmapped()
    }

    fn is_supplementary(&self) -> bool {
        self.flags().is_supplementary()
    }

    fn is_reverse(&self) -> bool {
        self.flags().is_reverse_complemented()
    }

    fn reference_id(&self) -> Option<RefId> {
        self.reference_sequence_id()
    }

    fn position(&self) -> Pos {
        // noodles positions are 1-based.
        self.alignment_start()
            .map_or(-1, |pos| usize::from(pos) as Pos - 1)
    }

    fn alignment_end(&self) -> Pos {
        // A 1-based inclusive end is the 0-based exclusive end.
        RecordBuf::alignment_end(self).map_or(-1, |pos| usize::from(pos) as Pos)
    }

    fn mapping_quality(&self) -> u8 {
        RecordBuf::mapping_quality(self).map_or(MAPQ_UNAVAILABLE, u8::from)
    }

    fn alignment_score(&self) -> Option<i64> {
        get_int_tag(self, &Tag::ALIGNMENT_SCORE)
    }

    fn mismatches(&self) -> Option<i64> {
        get_int_tag(self, &Tag::EDIT_DISTANCE)
    }

    fn barcode(&self) -> Option<&[u8]> {
        match self.data().get(&BARCODE_TAG)? {
            Value::String(s) => {
                let bytes: &[u8] = s.as_ref();
                Some(bytes)
            }
            _ => None,
        }
    }

    fn query_length(&self) -> usize {
        self.sequence().len()
    }

    fn set_molecule_id(&mut self, id: MoleculeId) {
        self.data_mut().insert(MOLECULE_ID_TAG, Value::UInt32(id));
    }
}

fn get_int_tag(record: &RecordBuf, tag: &Tag) -> Option<i64> {
    match record.data().get(tag)? {
        Value::Int8(n) => Some(i64::from(*n)),
        Value::UInt8(n) => Some(i64::from(*n)),
        Value::Int16(n) => Some(i64::from(*n)),
        Value::UInt16(n) => Some(i64::from(*n)),
        Value::Int32(n) => Some(i64::from(*n)),
        Value::UInt32(n) => Some(i64::from(*n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles::core::Position;
    use noodles::sam::alignment::record::cigar::{op::Kind, Op};
    use noodles::sam::alignment::record::{Flags, MappingQuality};
    use noodles::sam::alignment::record_buf::Sequence;

    fn record(flags: Flags, data: Vec<(Tag, Value)>) -> RecordBuf {
        RecordBuf::builder()
            .set_flags(flags)
            .set_reference_sequence_id(2)
            .set_alignment_start(Position::try_from(101).unwrap())
            .set_mapping_quality(MappingQuality::new(37).unwrap())
            .set_cigar([Op::new(Kind::Match, 50)].into_iter().collect())
            .set_sequence(Sequence::from(vec![b'A'; 50]))
            .set_data(data.into_iter().collect())
            .build()
    }

    #[test]
    fn coordinates_are_zero_based_half_open() {
        let rec = record(Flags::empty(), Vec::new());
        assert_eq!(AlignmentRecord::position(&rec), 100);
        assert_eq!(AlignmentRecord::alignment_end(&rec), 150);
        assert_eq!(AlignmentRecord::reference_id(&rec), Some(2));
        assert_eq!(AlignmentRecord::mapping_quality(&rec), 37);
        assert_eq!(AlignmentRecord::query_length(&rec), 50);
        assert_eq!(rec.strand(), Strand::Forward);
    }

    #[test]
    fn reads_tags_of_any_integer_width() {
        let rec = record(
            Flags::REVERSE_COMPLEMENTED,
            vec![
                (Tag::ALIGNMENT_SCORE, Value::UInt8(48)),
                (Tag::EDIT_DISTANCE, Value::Int32(2)),
                (BARCODE_TAG, Value::from("ACGTACGT-1")),
            ],
        );
        assert_eq!(rec.alignment_score(), Some(48));
        assert_eq!(rec.mismatches(), Some(2));
        assert_eq!(rec.barcode(), Some(&b"ACGTACGT-1"[..]));
        assert_eq!(rec.strand(), Strand::Reverse);
    }

    #[test]
    fn missing_tags_are_none() {
        let rec = record(Flags::SUPPLEMENTARY, Vec::new());
        assert_eq!(rec.alignment_score(), None);
        assert_eq!(rec.mismatches(), None);
        assert_eq!(rec.barcode(), None);
        assert!(AlignmentRecord::is_supplementary(&rec));
    }

    #[test]
    fn molecule_id_replaces_existing_tag() {
        let mut rec = record(Flags::empty(), vec![(MOLECULE_ID_TAG, Value::from("old"))]);
        rec.set_molecule_id(7);
        assert_eq!(rec.data().get(&MOLECULE_ID_TAG), Some(&Value::UInt32(7)));
    }
}
