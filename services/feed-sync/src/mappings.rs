//! Mapping payload decoder
//!
//! Turns the raw `identifier:name;identifier:name` payload into a
//! `MappingTable`. Bad pairs are skipped and reported; decoding never
//! aborts.

use feed_types::errors::MappingError;
use feed_types::mapping::MappingTable;

const PAIR_SEPARATOR: char = ';';
const KEY_SEPARATOR: char = ':';

/// Result of decoding one mapping payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingDecode {
    /// Every well-formed pair, last pair per identifier wins.
    pub table: MappingTable,
    /// Warnings and skipped pairs, in payload order.
    pub errors: Vec<MappingError>,
}

impl MappingDecode {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decode a raw mapping payload.
///
/// Each pair is split on its first `:`, so names may themselves contain
/// colons. Blank segments (e.g. from a trailing `;`) are not pairs and are
/// skipped without an error.
pub fn decode_mappings(raw: &str) -> MappingDecode {
    let mut decoded = MappingDecode::default();

    if raw.trim().is_empty() {
        decoded.errors.push(MappingError::EmptyPayload);
        return decoded;
    }

    for segment in raw.split(PAIR_SEPARATOR) {
        if segment.trim().is_empty() {
            continue;
        }

        match split_pair(segment) {
            Some((id, name)) => decoded.table.insert(id, name),
            None => decoded.errors.push(MappingError::MalformedPair {
                pair: segment.to_string(),
            }),
        }
    }

    decoded
}

fn split_pair(segment: &str) -> Option<(&str, &str)> {
    let (id, name) = segment.split_once(KEY_SEPARATOR)?;
    let (id, name) = (id.trim(), name.trim());
    if id.is_empty() || name.is_empty() {
        return None;
    }
    Some((id, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_valid_payload() {
        let raw = "29190088-763e-4d1c-861a-d16dbfcf858c:Real Madrid;\
                   33ff69aa-c714-470c-b90d-d3883c95adce:Barcelona";

        let decoded = decode_mappings(raw);

        assert!(decoded.is_clean());
        assert_eq!(decoded.table.len(), 2);
        assert_eq!(
            decoded.table.resolve("29190088-763e-4d1c-861a-d16dbfcf858c"),
            Some("Real Madrid")
        );
        assert_eq!(
            decoded.table.resolve("33ff69aa-c714-470c-b90d-d3883c95adce"),
            Some("Barcelona")
        );
    }

    #[test]
    fn test_empty_payload_is_warning() {
        for raw in ["", "   ", "\n\t"] {
            let decoded = decode_mappings(raw);
            assert!(decoded.table.is_empty());
            assert_eq!(decoded.errors, vec![MappingError::EmptyPayload]);
            assert!(decoded.errors[0].is_warning());
        }
    }

    #[test]
    fn test_whitespace_trimmed_around_both_sides() {
        let decoded = decode_mappings("  id1 :  TeamA ; id2:TeamB  ");

        assert!(decoded.is_clean());
        assert_eq!(decoded.table.resolve("id1"), Some("TeamA"));
        assert_eq!(decoded.table.resolve("id2"), Some("TeamB"));
    }

    #[test]
    fn test_split_on_first_colon_only() {
        let decoded = decode_mappings("kickoff:12:30 local");
        assert_eq!(decoded.table.resolve("kickoff"), Some("12:30 local"));
    }

    #[test]
    fn test_malformed_pairs_skipped_and_reported() {
        let decoded = decode_mappings("id1:TeamA;:noId;noName:;garbage;id2:TeamB");

        assert_eq!(decoded.table.len(), 2);
        assert_eq!(decoded.table.resolve("id1"), Some("TeamA"));
        assert_eq!(decoded.table.resolve("id2"), Some("TeamB"));
        assert_eq!(
            decoded.errors,
            vec![
                MappingError::MalformedPair { pair: ":noId".to_string() },
                MappingError::MalformedPair { pair: "noName:".to_string() },
                MappingError::MalformedPair { pair: "garbage".to_string() },
            ]
        );
    }

    #[test]
    fn test_trailing_separator_is_not_an_error() {
        let decoded = decode_mappings("id1:TeamA;");
        assert!(decoded.is_clean());
        assert_eq!(decoded.table.len(), 1);
    }

    #[test]
    fn test_last_pair_wins() {
        let decoded = decode_mappings("id1:TeamA;id1:TeamC");
        assert_eq!(decoded.table.len(), 1);
        assert_eq!(decoded.table.resolve("id1"), Some("TeamC"));
    }

    fn pair_strategy() -> impl Strategy<Value = (String, String)> {
        ("[a-z0-9-]{1,12}", "[A-Za-z ]{0,6}[A-Za-z]")
    }

    proptest! {
        #[test]
        fn prop_decoding_is_idempotent(pairs in prop::collection::vec(pair_strategy(), 0..20)) {
            let raw = pairs
                .iter()
                .map(|(id, name)| format!("{}:{}", id, name))
                .collect::<Vec<_>>()
                .join(";");

            prop_assert_eq!(decode_mappings(&raw), decode_mappings(&raw));
        }

        #[test]
        fn prop_every_valid_pair_resolves_to_last_name(pairs in prop::collection::vec(pair_strategy(), 1..20)) {
            let raw = pairs
                .iter()
                .map(|(id, name)| format!("{}:{}", id, name))
                .collect::<Vec<_>>()
                .join(";");

            let decoded = decode_mappings(&raw);
            prop_assert!(decoded.is_clean());
            for (id, _) in &pairs {
                let last = pairs.iter().rev().find(|(k, _)| k == id).map(|(_, v)| v.trim());
                prop_assert_eq!(decoded.table.resolve(id), last);
            }
        }
    }
}
