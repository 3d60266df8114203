//! Month arithmetic on `NaiveDate`

use chrono::{Datelike, Months, NaiveDate};

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

/// `day` of the month containing `date`, clamped to the month's last day
pub fn clamped_day(date: NaiveDate, day: u32) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(day.clamp(1, last)).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .unwrap_or(date)
}

/// First day of the month before the one containing `date`
pub fn previous_month_start(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_sub_months(Months::new(1))
        .unwrap_or(date)
}

/// "YYYY-MM" key for the month containing `date`
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_clamped_day() {
        assert_eq!(clamped_day(date("2024-04-10"), 31), date("2024-04-30"));
        assert_eq!(clamped_day(date("2023-02-01"), 29), date("2023-02-28"));
        assert_eq!(clamped_day(date("2024-01-10"), 15), date("2024-01-15"));
        assert_eq!(clamped_day(date("2024-01-10"), 0), date("2024-01-01"));
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(month_start(date("2024-03-17")), date("2024-03-01"));
        assert_eq!(month_end(date("2024-02-03")), date("2024-02-29"));
        assert_eq!(next_month_start(date("2024-12-31")), date("2025-01-01"));
        assert_eq!(previous_month_start(date("2024-01-15")), date("2023-12-01"));
        assert_eq!(month_key(date("2024-03-17")), "2024-03");
    }
}
