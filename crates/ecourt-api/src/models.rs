// Wire types for the lookup backend.
//
// Every success body is wrapped as `{ "status": "success", "data": {...} }`.
// The payload types below describe `data`; the client strips the envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::codec::CourtRecord;
use crate::de::{opt_string_or_number, string_or_number};

/// Date format the cause-list endpoint expects.
pub const WIRE_DATE_FORMAT: &str = "%d-%m-%Y";

// ── Envelope ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatesData {
    #[serde(default)]
    pub states: Vec<State>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DistrictsData {
    #[serde(default)]
    pub districts: Vec<District>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComplexData {
    #[serde(default, rename = "courtComplex")]
    pub court_complex: Vec<CourtComplex>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourtNamesData {
    #[serde(default, rename = "courtNames")]
    pub court_names: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CauseListData {
    #[serde(default)]
    pub cases: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaseDetailsData {
    #[serde(default)]
    pub history: Option<CaseHistory>,
}

// ── Location hierarchy ──────────────────────────────────────────────

/// A state as listed by `/court/states`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(deserialize_with = "string_or_number")]
    pub state_code: String,
    pub state_name: String,
}

/// A district within a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    #[serde(deserialize_with = "string_or_number")]
    pub dist_code: String,
    pub dist_name: String,
}

/// A court complex within a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtComplex {
    #[serde(deserialize_with = "string_or_number")]
    pub complex_code: String,
    /// Establishment codes of the complex, comma-separated. This, not
    /// `complex_code`, is what `/court/names` takes as `court_code`.
    #[serde(deserialize_with = "string_or_number")]
    pub njdg_est_code: String,
    pub court_complex_name: String,
}

impl CourtComplex {
    /// The value to pass as `court_code` when listing this complex's courts.
    pub fn court_code(&self) -> &str {
        &self.njdg_est_code
    }
}

// ── Cause list ──────────────────────────────────────────────────────

/// Which docket a cause list covers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CauseListType {
    #[default]
    Civil,
    Criminal,
}

/// Everything needed to request one court's cause list for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseListCriteria {
    pub state_code: String,
    pub district_code: String,
    pub court_code: String,
    pub court_number: String,
    pub cause_list_type: CauseListType,
    pub date: NaiveDate,
}

impl CauseListCriteria {
    /// Criteria for a court decoded from `/court/names`. The record's
    /// group code is the court code the cause-list endpoint expects.
    pub fn for_court(
        state_code: &str,
        district_code: &str,
        court: &CourtRecord,
        cause_list_type: CauseListType,
        date: NaiveDate,
    ) -> Self {
        Self {
            state_code: state_code.to_owned(),
            district_code: district_code.to_owned(),
            court_code: court.group_code.clone(),
            court_number: court.court_number.clone(),
            cause_list_type,
            date,
        }
    }

    pub(crate) fn to_body(&self) -> CauseListBody<'_> {
        CauseListBody {
            state_code: &self.state_code,
            district_code: &self.district_code,
            court_code: &self.court_code,
            court_number: &self.court_number,
            cause_list_type: self.cause_list_type,
            date: self.date.format(WIRE_DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CauseListBody<'a> {
    pub state_code: &'a str,
    pub district_code: &'a str,
    pub court_code: &'a str,
    pub court_number: &'a str,
    pub cause_list_type: CauseListType,
    pub date: String,
}

/// A court's cause list as returned by the backend: an HTML fragment
/// holding one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseList {
    pub html: String,
}

// ── Case details ────────────────────────────────────────────────────

/// The `history` record for a case looked up by CNR.
///
/// Only the fields the CLI renders are typed; everything else the
/// backend sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseHistory {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub cino: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub case_no: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub reg_no: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub reg_year: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub fil_no: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub fil_year: Option<String>,
    #[serde(default)]
    pub date_of_filing: Option<String>,
    #[serde(default)]
    pub dt_regis: Option<String>,
    #[serde(default)]
    pub date_first_list: Option<String>,
    #[serde(default)]
    pub date_next_list: Option<String>,
    #[serde(default)]
    pub date_of_decision: Option<String>,
    #[serde(default)]
    pub purpose_name: Option<String>,
    /// `"N"` while the case is active.
    #[serde(default)]
    pub archive: Option<String>,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub pet_adv: Option<String>,
    #[serde(default)]
    pub res_name: Option<String>,
    #[serde(default)]
    pub res_adv: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub court_no: Option<String>,
    #[serde(default)]
    pub desgname: Option<String>,
    #[serde(default)]
    pub state_name: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    /// Acts and sections, as an HTML table.
    #[serde(default)]
    pub act: Option<String>,
    /// Hearing history, as an HTML table.
    #[serde(default, rename = "historyOfCaseHearing")]
    pub history_of_case_hearing: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CaseHistory {
    /// Whether the case is still active (not archived).
    pub fn is_active(&self) -> bool {
        self.archive.as_deref() == Some("N")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn cause_list_body_uses_wire_date_and_uppercase_type() {
        let criteria = CauseListCriteria {
            state_code: "13".into(),
            district_code: "4".into(),
            court_code: "3".into(),
            court_number: "2".into(),
            cause_list_type: CauseListType::Criminal,
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        };
        let body = serde_json::to_value(criteria.to_body()).unwrap();
        assert_eq!(
            body,
            json!({
                "state_code": "13",
                "district_code": "4",
                "court_code": "3",
                "court_number": "2",
                "cause_list_type": "CRIMINAL",
                "date": "07-03-2024",
            })
        );
    }

    #[test]
    fn criteria_for_court_uses_group_code() {
        let court = CourtRecord {
            group_code: "3".into(),
            court_number: "1".into(),
            display_name: "Judge A".into(),
            raw_segment: "3^1~Judge A".into(),
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let criteria = CauseListCriteria::for_court("13", "4", &court, CauseListType::Civil, date);
        assert_eq!(criteria.court_code, "3");
        assert_eq!(criteria.court_number, "1");
    }

    #[test]
    fn cause_list_type_parses_case_insensitively() {
        assert_eq!("civil".parse::<CauseListType>().unwrap(), CauseListType::Civil);
        assert_eq!("CRIMINAL".parse::<CauseListType>().unwrap(), CauseListType::Criminal);
        assert_eq!(CauseListType::Criminal.to_string(), "CRIMINAL");
    }

    #[test]
    fn case_history_keeps_unknown_fields() {
        let history: CaseHistory = serde_json::from_value(json!({
            "cino": "UPBL060053572018",
            "type_name": "Civil Suit",
            "reg_no": 412,
            "archive": "N",
            "historyOfCaseHearing": "<table></table>",
            "ltype_name": "local",
        }))
        .unwrap();
        assert_eq!(history.cino.as_deref(), Some("UPBL060053572018"));
        assert_eq!(history.reg_no.as_deref(), Some("412"));
        assert!(history.is_active());
        assert_eq!(history.history_of_case_hearing.as_deref(), Some("<table></table>"));
        assert_eq!(history.extra.get("ltype_name"), Some(&json!("local")));
    }

    #[test]
    fn complex_codes_accept_numbers() {
        let complex: CourtComplex = serde_json::from_value(json!({
            "complex_code": 1_130_004,
            "njdg_est_code": "1,2,3",
            "court_complex_name": "District Court Complex",
        }))
        .unwrap();
        assert_eq!(complex.complex_code, "1130004");
        assert_eq!(complex.court_code(), "1,2,3");
    }
}
