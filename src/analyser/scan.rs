//! Classification of framed packets against the signature table.
use super::patterns::{PatternId, PATTERNS};

/// Finds the first table entry matching `bytes` (a complete framed packet).
///
/// Entries are gated by length first: only those whose `total_length` equals
/// `bytes.len() - 2` are compared, and the comparison starts after the SOP.
/// Returns `None` for unknown packets and for packets too short to carry a
/// signature.
pub fn classify(bytes: &[u8]) -> Option<PatternId> {
    let len = bytes.len();
    if len <= 2 {
        log::warn!("Packet too short to classify ({len} bytes)");
        return None;
    }

    let found = PATTERNS
        .iter()
        .position(|entry| entry.framed_length() == len && bytes[1..].starts_with(entry.signature()))
        .map(PatternId);

    if found.is_none() {
        log::debug!("No signature matches {}", hex::encode_upper(bytes));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::patterns::find_by_name;

    fn id(name: &str) -> Option<PatternId> {
        Some(find_by_name(name).unwrap())
    }

    /// SOP + signature + parameter filler + terminator for a table entry.
    fn synthetic(entry_index: usize, filler: u8) -> Vec<u8> {
        let entry = &PATTERNS[entry_index];
        let mut bytes = vec![0x81];
        bytes.extend_from_slice(entry.signature());
        bytes.resize(entry.total_length + 1, filler);
        bytes.push(0xFF);
        bytes
    }

    #[test]
    fn every_entry_is_reachable() {
        for (index, entry) in PATTERNS.iter().enumerate() {
            let found = classify(&synthetic(index, 0x00)).unwrap();
            // an earlier entry with the same length and signature shadows a later one
            let shadow = found.entry();
            assert_eq!(shadow.framed_length(), entry.framed_length(), "{}", entry.name);
            assert!(entry.signature().starts_with(shadow.signature()), "{}", entry.name);
            assert!(found.0 <= index);
        }
    }

    #[test]
    fn entries_with_distinct_signatures_classify_to_themselves() {
        for (index, entry) in PATTERNS.iter().enumerate() {
            let shadowed = PATTERNS[..index].iter().any(|earlier| {
                earlier.total_length == entry.total_length
                    && entry.signature().starts_with(earlier.signature())
            });
            if shadowed {
                continue;
            }
            for filler in [0x00, 0x07, 0x0F] {
                let found = classify(&synthetic(index, filler));
                assert_eq!(found, Some(PatternId(index)), "{}", entry.name);
            }
        }
    }

    #[test]
    fn shared_reply_byte_is_split_by_length() {
        assert_eq!(classify(&[0x90, 0x50, 0xFF]), id("RPL: Done"));
        assert_eq!(classify(&[0x90, 0x50, 0x02, 0xFF]), id("RPL: Byte"));
        assert_eq!(classify(&[0x90, 0x50, 0x01, 0x02, 0x03, 0x04, 0xFF]), id("RPL: Word"));
    }

    #[test]
    fn sop_byte_is_ignored() {
        assert_eq!(classify(&[0x81, 0x01, 0x04, 0x00, 0x02, 0xFF]), id("CMD: Power"));
        assert_eq!(classify(&[0x88, 0x01, 0x04, 0x00, 0x03, 0xFF]), id("CMD: Power"));
    }

    #[test]
    fn parameters_are_not_compared() {
        let zoom = [0x81, 0x01, 0x04, 0x47, 0x01, 0x02, 0x03, 0x04, 0xFF];
        assert_eq!(classify(&zoom), id("CMD: ZoomDirect"));
        assert_eq!(classify(&[0x81, 0x01, 0x04, 0x74, 0x02, 0xFF]), id("CMD: Title"));
    }

    #[test]
    fn not_executable_wins_over_generic_error() {
        assert_eq!(classify(&[0x90, 0x61, 0x41, 0xFF]), id("RPL: Not Executable"));
        assert_eq!(classify(&[0x90, 0x62, 0x41, 0xFF]), id("RPL: Not Executable Sock2"));
        assert_eq!(classify(&[0x90, 0x61, 0x02, 0xFF]), id("RPL: **ERROR**"));
        assert_eq!(classify(&[0x90, 0x62, 0x03, 0xFF]), id("RPL: **ERROR** Sock2"));
    }

    #[test]
    fn short_packets_are_never_classified() {
        assert_eq!(classify(&[]), None);
        assert_eq!(classify(&[0x90]), None);
        assert_eq!(classify(&[0x90, 0xFF]), None);
    }

    #[test]
    fn unknown_signature() {
        assert_eq!(classify(&[0x81, 0x01, 0x7E, 0x01, 0x00, 0xFF]), None);
        // right signature, wrong length
        assert_eq!(classify(&[0x90, 0x41, 0x00, 0xFF]), None);
    }
}
