//! Segment-aligned part-range planning (SPEC_FULL.md §4.3).
//!
//! Grounded on the offset arithmetic in the `crypt4gh` byte-position helpers
//! (`to_encrypted`/`unencrypted_to_data_block` style functions): each emitted
//! range is exactly one on-wire Crypt4GH segment, so a part fetched from the
//! inbox can be decrypted independently of its neighbours.

use crate::constants::SEGMENT_CIPHERTEXT_LEN;
use crate::models::{FileUpload, PartRange};

/// Plan the sequence of segment-aligned byte ranges within the post-envelope
/// ciphertext region of `file`.
///
/// `envelope_len` is the byte length of the Crypt4GH envelope, as returned by
/// [`crate::crypt4gh::envelope::decode_envelope`]. The final range may be shorter
/// than a full segment.
pub fn plan_part_ranges(file: &FileUpload, envelope_len: u64) -> Vec<PartRange> {
    let ciphertext_size = file.encrypted_size - envelope_len;
    plan_ranges(ciphertext_size)
}

fn plan_ranges(ciphertext_size: u64) -> Vec<PartRange> {
    let mut ranges = Vec::new();
    let mut start = 0u64;
    while start < ciphertext_size {
        let stop = (start + SEGMENT_CIPHERTEXT_LEN).min(ciphertext_size);
        ranges.push(PartRange { start, stop });
        start = stop;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_short_segment() {
        let ranges = plan_ranges(12 + 10 + 16);
        assert_eq!(ranges, vec![PartRange { start: 0, stop: 38 }]);
    }

    #[test]
    fn several_full_segments_plus_remainder() {
        let full = SEGMENT_CIPHERTEXT_LEN;
        let ciphertext_size = full * 3 + 38;
        let ranges = plan_ranges(ciphertext_size);
        assert_eq!(ranges.len(), 4);
        for (i, r) in ranges.iter().take(3).enumerate() {
            assert_eq!(r.start, full * i as u64);
            assert_eq!(r.stop, full * (i as u64 + 1));
        }
        let last = ranges.last().unwrap();
        assert_eq!(last.stop - last.start, 38);
    }

    #[test]
    fn ranges_are_contiguous_and_sum_to_total() {
        let ciphertext_size = SEGMENT_CIPHERTEXT_LEN * 5 + 1000;
        let ranges = plan_ranges(ciphertext_size);
        let mut total = 0u64;
        for window in ranges.windows(2) {
            assert_eq!(window[0].stop, window[1].start);
        }
        for r in &ranges {
            total += r.len();
        }
        assert_eq!(total, ciphertext_size);
    }

    #[test]
    fn exact_multiple_of_segment_size_has_no_short_final_part() {
        let ciphertext_size = SEGMENT_CIPHERTEXT_LEN * 2;
        let ranges = plan_ranges(ciphertext_size);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].len(), SEGMENT_CIPHERTEXT_LEN);
    }

    proptest::proptest! {
        #[test]
        fn plan_ranges_covers_every_byte_exactly_once(ciphertext_size in 0u64..(SEGMENT_CIPHERTEXT_LEN as u64 * 10)) {
            let ranges = plan_ranges(ciphertext_size);

            let mut total = 0u64;
            for window in ranges.windows(2) {
                prop_assert_eq!(window[0].stop, window[1].start);
            }
            for (i, r) in ranges.iter().enumerate() {
                if i + 1 < ranges.len() {
                    prop_assert_eq!(r.len(), SEGMENT_CIPHERTEXT_LEN as u64);
                } else {
                    prop_assert!(r.len() <= SEGMENT_CIPHERTEXT_LEN as u64);
                    prop_assert!(!r.is_empty() || ciphertext_size == 0);
                }
                total += r.len();
            }
            prop_assert_eq!(total, ciphertext_size);
        }
    }
}
