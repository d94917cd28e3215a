//! Display formatting for bill fields. Raw values are kept alongside the
//! formatted ones so a malformed date never breaks rendering.

use chrono::{Datelike, NaiveDate};

const MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// `2004-04-04` -> `4 Avr. 04`; anything unparseable comes back verbatim.
pub fn format_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => {
            let month = MONTHS_FR[date.month0() as usize];
            format!("{} {}. {:02}", date.day(), month, date.year() % 100)
        }
        Err(_) => raw.to_string(),
    }
}

pub fn format_status(raw: &str) -> String {
    match raw {
        "pending" => "En attente".to_string(),
        "accepted" => "Accepté".to_string(),
        "refused" => "Refusé".to_string(),
        other => other.to_string(),
    }
}

/// Strict `YYYY-MM-DD` check (years 1900-2099) used to exclude malformed
/// dates from ordering guarantees.
pub fn is_display_date(raw: &str) -> bool {
    raw.len() == 10
        && (raw.starts_with("19") || raw.starts_with("20"))
        && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates_in_french_short_form() {
        assert_eq!(format_date("2004-04-04"), "4 Avr. 04");
        assert_eq!(format_date("2001-01-01"), "1 Jan. 01");
        assert_eq!(format_date("2021-09-30"), "30 Sep. 21");
    }

    #[test]
    fn malformed_dates_pass_through() {
        assert_eq!(format_date("not-a-date"), "not-a-date");
        assert_eq!(format_date("2004-13-40"), "2004-13-40");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn statuses_are_localized() {
        assert_eq!(format_status("pending"), "En attente");
        assert_eq!(format_status("accepted"), "Accepté");
        assert_eq!(format_status("refused"), "Refusé");
        assert_eq!(format_status("draft"), "draft");
    }

    #[test]
    fn display_date_check_is_strict() {
        assert!(is_display_date("2004-04-04"));
        assert!(!is_display_date("04-04-2004"));
        assert!(!is_display_date("2104-04-04"));
        assert!(!is_display_date("2004-4-4"));
    }
}
