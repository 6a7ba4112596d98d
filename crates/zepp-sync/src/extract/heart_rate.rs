//! Heart-rate blob decoder
//!
//! The band packs periodic heart-rate samples as consecutive big-endian
//! u16 values, one per minute of the day starting one minute after
//! midnight. Values of 200 and above are the firmware's "no reading"
//! initialisation value and carry no data.

use crate::models::Record;

/// Raw values at or above this mean "no reading was taken"
const NO_READING_SENTINEL: u16 = 200;

/// Decode a day's packed heart-rate blob into one record per usable
/// sample. Pair N (0-indexed) is the sample taken at
/// `midnight + (N + 1)` minutes; a trailing odd byte is discarded.
pub fn decode(blob: &[u8], midnight_epoch: i64) -> impl Iterator<Item = Record> + '_ {
    blob.chunks_exact(2)
        .enumerate()
        .filter_map(move |(n, pair)| {
            let value = u16::from_be_bytes([pair[0], pair[1]]);
            if value >= NO_READING_SENTINEL {
                return None;
            }
            Some(
                Record::at_epoch(midnight_epoch + (n as i64 + 1) * 60)
                    .tag("hr_measure", "periodic")
                    .field("heart_rate", value as i64),
            )
        })
}
