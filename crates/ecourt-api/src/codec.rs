// Court-name codec
//
// `/court/names` answers with a single delimited string instead of a
// JSON list:
//
//   0~Select Court Name#D~--------#3^1~1-A. Sharma-District Judge#3^2~2-...
//
// Records are separated by `#`. A data record is `group^number~name`;
// rows without `^` are placeholders ("select a court", separators).

use serde::{Deserialize, Serialize};

/// Separates records in the encoded string.
pub const RECORD_DELIMITER: char = '#';
/// Separates the group code from the detail field.
pub const GROUP_DELIMITER: char = '^';
/// Separates the court number from the display name.
pub const NAME_DELIMITER: char = '~';

/// Court numbers the backend uses for placeholder rows.
const PLACEHOLDER_NUMBERS: [&str; 2] = ["0", "D"];

/// One court decoded from the `/court/names` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtRecord {
    /// Which establishment group the court belongs to. Sent back as
    /// `court_code` when requesting that court's cause list.
    pub group_code: String,
    /// Court number within the group.
    pub court_number: String,
    /// Human-readable name, trimmed.
    pub display_name: String,
    /// The segment this record was decoded from, verbatim.
    pub raw_segment: String,
}

/// Decode the encoded court-name string into records.
///
/// Placeholder rows, empty names and sentinel court numbers are dropped.
/// The display name is everything after the first `~`, so names that
/// themselves contain `~` are kept whole.
pub fn decode(raw: &str) -> Vec<CourtRecord> {
    raw.split(RECORD_DELIMITER)
        .filter_map(decode_segment)
        .collect()
}

fn decode_segment(segment: &str) -> Option<CourtRecord> {
    let (group_code, detail) = segment.split_once(GROUP_DELIMITER)?;
    let (court_number, name) = detail.split_once(NAME_DELIMITER)?;
    let display_name = name.trim();

    if group_code.is_empty()
        || court_number.is_empty()
        || PLACEHOLDER_NUMBERS.contains(&court_number)
        || display_name.is_empty()
    {
        return None;
    }

    Some(CourtRecord {
        group_code: group_code.to_owned(),
        court_number: court_number.to_owned(),
        display_name: display_name.to_owned(),
        raw_segment: segment.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_two_records() {
        let courts = decode("3^1~Judge A#3^2~Judge B");
        assert_eq!(courts.len(), 2);
        assert_eq!(courts[0].group_code, "3");
        assert_eq!(courts[0].court_number, "1");
        assert_eq!(courts[0].display_name, "Judge A");
        assert_eq!(courts[0].raw_segment, "3^1~Judge A");
        assert_eq!(courts[1].court_number, "2");
        assert_eq!(courts[1].display_name, "Judge B");
    }

    #[test]
    fn placeholder_rows_are_dropped() {
        assert!(decode("0~Select#D~----").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn sentinel_numbers_are_dropped_even_with_group() {
        let courts = decode("1^0~Select Court#1^D~--------#1^4~Real Court");
        assert_eq!(courts.len(), 1);
        assert_eq!(courts[0].court_number, "4");
    }

    #[test]
    fn realistic_payload() {
        let raw = "0~Select Court Name#D~--------------------------------\
                   #3^1~1-Moushumi De-District and Sessions Judge\
                   #3^2~2-Akhtabul Ala-Asstt Sessions Judge\
                   #D~--------------------------------\
                   #1^5~5-Civil Judge Senior Division";
        let courts = decode(raw);
        let numbers: Vec<_> = courts.iter().map(|c| c.court_number.as_str()).collect();
        assert_eq!(numbers, ["1", "2", "5"]);
        assert_eq!(
            courts[0].display_name,
            "1-Moushumi De-District and Sessions Judge"
        );
        assert_eq!(courts[2].group_code, "1");
    }

    #[test]
    fn name_keeps_text_after_a_second_tilde() {
        let courts = decode("2^7~7-Court Room~Annex Building");
        assert_eq!(courts.len(), 1);
        assert_eq!(courts[0].court_number, "7");
        assert_eq!(courts[0].display_name, "7-Court Room~Annex Building");
    }

    #[test]
    fn blank_names_and_missing_parts_are_dropped() {
        assert!(decode("3^1~   ").is_empty());
        assert!(decode("3^1").is_empty());
        assert!(decode("^1~Orphan").is_empty());
        assert!(decode("3^~No Number").is_empty());
    }

    #[test]
    fn names_are_trimmed_but_raw_segment_is_verbatim() {
        let courts = decode("3^9~  Padded Name \n");
        assert_eq!(courts[0].display_name, "Padded Name");
        assert_eq!(courts[0].raw_segment, "3^9~  Padded Name \n");
    }

    #[test]
    fn decode_is_idempotent_on_raw_segments() {
        let raw = "0~Select#3^1~Judge A#3^2~Judge B~Annex#D~----#1^3~ Judge C ";
        for record in decode(raw) {
            assert_eq!(decode(&record.raw_segment), vec![record.clone()]);
        }
    }
}
