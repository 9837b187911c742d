use crate::parser::parse_date;
use crate::types::{DateSet, DateToken};

/// Latest date in the set, or `None` when the page listed nothing.
pub fn select_newest(dates: &DateSet, year: i32) -> Option<DateToken> {
    let mut newest: Option<&DateToken> = None;
    for date in dates {
        match newest {
            Some(current) if !is_after(date, current, year) => {}
            _ => newest = Some(date),
        }
    }
    newest.cloned()
}

/// Strictly later than `reference`. The same date is never "after" itself.
pub fn is_after(candidate: &DateToken, reference: &DateToken, year: i32) -> bool {
    parse_date(candidate.as_str(), year) > parse_date(reference.as_str(), year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_dates;

    fn set_of(html_dates: &[&str]) -> DateSet {
        let html: String = html_dates
            .iter()
            .map(|d| format!(r#"<time datetime="{d}T18:00:00">18:00</time>"#))
            .collect();
        extract_dates(&html, 2025)
    }

    #[test]
    fn test_select_newest_empty_is_none() {
        assert_eq!(select_newest(&DateSet::default(), 2025), None);
    }

    #[test]
    fn test_select_newest_picks_latest() {
        let dates = set_of(&["2025-09-24", "2025-09-30"]);
        assert_eq!(select_newest(&dates, 2025), Some(DateToken::from("30.09")));

        let dates = set_of(&["2025-10-01", "2025-09-24", "2025-09-30"]);
        assert_eq!(select_newest(&dates, 2025), Some(DateToken::from("1.10")));
    }

    #[test]
    fn test_is_after_is_strict() {
        for token in ["1.01", "24.09", "31.12", "31.02"] {
            let date = DateToken::from(token);
            assert!(!is_after(&date, &date, 2025), "{token} must not be after itself");
        }

        assert!(is_after(&DateToken::from("24.09"), &DateToken::from("20.09"), 2025));
        assert!(!is_after(&DateToken::from("20.09"), &DateToken::from("24.09"), 2025));
        assert!(is_after(&DateToken::from("1.10"), &DateToken::from("30.09"), 2025));
    }

    #[test]
    fn test_impossible_days_compare_after_rolling_over() {
        let feb_31 = DateToken::from("31.02");
        assert!(is_after(&feb_31, &DateToken::from("2.03"), 2025));
        assert!(!is_after(&feb_31, &DateToken::from("3.03"), 2025));
        assert!(!is_after(&DateToken::from("0.10"), &DateToken::from("30.09"), 2025));

        let dates = DateSet::from_sorted(vec![
            DateToken::from("28.02"),
            DateToken::from("2.03"),
            feb_31.clone(),
        ]);
        assert_eq!(select_newest(&dates, 2025), Some(feb_31));
    }

    #[test]
    fn test_everything_is_after_a_malformed_reference() {
        let empty = DateToken::from("");
        let garbled = DateToken::from("next week");

        assert!(is_after(&DateToken::from("1.01"), &empty, 2025));
        assert!(is_after(&DateToken::from("24.09"), &garbled, 2025));
        assert!(!is_after(&empty, &garbled, 2025));
    }
}
