use chrono::{Months, NaiveDate};

/// Adds whole calendar months to a date, clamping to the end of the
/// target month (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn adds_plain_months() {
        assert_eq!(add_months(d(2024, 1, 1), 1), d(2024, 2, 1));
        assert_eq!(add_months(d(2024, 1, 15), 11), d(2024, 12, 15));
        assert_eq!(add_months(d(2024, 11, 30), 3), d(2025, 2, 28));
    }

    #[test]
    fn clamps_to_end_of_month() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
    }

    #[test]
    fn zero_months_is_identity() {
        assert_eq!(add_months(d(2024, 6, 5), 0), d(2024, 6, 5));
    }
}
