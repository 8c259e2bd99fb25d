//! # Ranking
//! Orders case records newest-first by decision date.
//! Pure functions, no I/O.

use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::record::CaseRecord;

pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Parse a listing date such as `2026.02.04`.
/// Anything unparseable maps to `NaiveDate::MIN`, so it ranks oldest.
pub fn parse_decision_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

pub fn record_date(rec: &CaseRecord) -> NaiveDate {
    rec.decision_date
        .as_deref()
        .map(parse_decision_date)
        .unwrap_or(NaiveDate::MIN)
}

/// Sort newest-first. The sort is stable: records sharing a date keep the
/// order they were encountered in.
pub fn rank(records: &mut [CaseRecord]) {
    records.sort_by_key(|r| Reverse(record_date(r)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, date: Option<&str>) -> CaseRecord {
        let mut r = CaseRecord::new(id);
        r.decision_date = date.map(str::to_string);
        r
    }

    fn ids(v: &[CaseRecord]) -> Vec<&str> {
        v.iter().map(|r| r.case_number.as_str()).collect()
    }

    #[test]
    fn parses_dotted_dates() {
        assert_eq!(
            parse_decision_date("2026.02.04"),
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
        assert_eq!(
            parse_decision_date(" 2025.12.31 "),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert_eq!(parse_decision_date("garbage"), NaiveDate::MIN);
        assert_eq!(parse_decision_date("2026-02-04"), NaiveDate::MIN);
    }

    #[test]
    fn newest_first_with_undated_last() {
        let mut v = vec![
            rec("old", Some("2024.01.01")),
            rec("none", None),
            rec("bad", Some("날짜 미표기")),
            rec("new", Some("2026.03.01")),
        ];
        rank(&mut v);
        assert_eq!(ids(&v), vec!["new", "old", "none", "bad"]);
    }

    #[test]
    fn ties_keep_encounter_order() {
        let mut v = vec![
            rec("a", Some("2026.01.05")),
            rec("b", Some("2026.01.09")),
            rec("c", Some("2026.01.05")),
            rec("d", Some("2026.01.05")),
        ];
        rank(&mut v);
        assert_eq!(ids(&v), vec!["b", "a", "c", "d"]);
    }
}
