//! Age from a VK birth date.

use chrono::{Datelike, NaiveDate, Utc};

/// Used when the birth year is hidden or unusable.
pub const DEFAULT_AGE: u32 = 25;

/// Age in whole years, counting only the year.
///
/// Accepts `d.m.yyyy` (VK's `bdate` format) naming a real calendar date.
/// `d.m` without a year, malformed input and years after `current_year`
/// all yield [`DEFAULT_AGE`].
pub fn derive_age(bdate: Option<&str>, current_year: i32) -> u32 {
    bdate
        .and_then(birth_year)
        .filter(|year| *year <= current_year)
        .map(|year| (current_year - year) as u32)
        .unwrap_or(DEFAULT_AGE)
}

/// [`derive_age`] against today's UTC year.
pub fn current_age(bdate: Option<&str>) -> u32 {
    derive_age(bdate, Utc::now().year())
}

fn birth_year(bdate: &str) -> Option<i32> {
    let mut parts = bdate.trim().split('.');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        assert_eq!(derive_age(Some("14.03.1996"), 2024), 28);
        assert_eq!(derive_age(Some("1.1.2000"), 2024), 24);
    }

    #[test]
    fn test_missing_or_partial_date() {
        assert_eq!(derive_age(None, 2024), DEFAULT_AGE);
        assert_eq!(derive_age(Some(""), 2024), DEFAULT_AGE);
        assert_eq!(derive_age(Some("14.3"), 2024), DEFAULT_AGE);
    }

    #[test]
    fn test_malformed_date() {
        assert_eq!(derive_age(Some("abc"), 2024), DEFAULT_AGE);
        assert_eq!(derive_age(Some("31.02.1990"), 2024), DEFAULT_AGE);
        assert_eq!(derive_age(Some("1.1.1990.5"), 2024), DEFAULT_AGE);
    }

    #[test]
    fn test_future_year() {
        assert_eq!(derive_age(Some("1.1.2030"), 2024), DEFAULT_AGE);
        assert_eq!(derive_age(Some("1.1.2024"), 2024), 0);
    }
}
