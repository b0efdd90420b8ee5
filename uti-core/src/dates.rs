//! Tính toán theo ngày lịch trên `NaiveDate`.
//!
//! Không có giờ hay múi giờ, nên số ngày qua thời điểm đổi giờ mùa hè vẫn là số nguyên chính xác.

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Đọc chuỗi `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Số ngày lịch có dấu từ `a` đến `b` (`b - a`).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// Dịch `date` đi `n` ngày; chặn ở biên của kiểu dữ liệu.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let shifted = if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    shifted.unwrap_or(if n >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// `start <= date <= end`.
pub fn in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

/// Cửa sổ ngày (tính cả hai đầu), ghi lại trong chuỗi lý do.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `[center - radius, center + radius]`.
    pub fn around(center: NaiveDate, radius_days: u32) -> Self {
        let radius = i64::from(radius_days);
        Self {
            start: add_days(center, -radius),
            end: add_days(center, radius),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        in_range(date, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(d("2025-12-10"), d("2025-12-13")), 3);
        assert_eq!(days_between(d("2025-12-13"), d("2025-12-10")), -3);
        assert_eq!(days_between(d("2025-12-10"), d("2025-12-10")), 0);
    }

    #[test]
    fn days_between_across_dst_and_leap_day() {
        // 2025-03-09 là ngày đổi giờ mùa hè ở phần lớn múi giờ Mỹ.
        assert_eq!(days_between(d("2025-03-08"), d("2025-03-10")), 2);
        assert_eq!(days_between(d("2024-02-28"), d("2024-03-01")), 2);
    }

    #[test]
    fn add_days_crosses_month_and_year() {
        assert_eq!(add_days(d("2025-12-30"), 3), d("2026-01-02"));
        assert_eq!(add_days(d("2025-03-01"), -1), d("2025-02-28"));
        assert_eq!(add_days(d("2025-03-01"), 0), d("2025-03-01"));
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
    }

    #[test]
    fn in_range_is_inclusive() {
        let (start, end) = (d("2025-12-10"), d("2025-12-13"));
        assert!(in_range(start, start, end));
        assert!(in_range(end, start, end));
        assert!(!in_range(d("2025-12-14"), start, end));
        assert!(!in_range(d("2025-12-09"), start, end));
    }

    #[test]
    fn window_around_spans_seven_days() {
        let window = DateWindow::around(d("2025-12-13"), 3);
        assert_eq!(window.start, d("2025-12-10"));
        assert_eq!(window.end, d("2025-12-16"));
        assert_eq!(days_between(window.start, window.end) + 1, 7);
    }

    #[test]
    fn parse_rejects_other_formats() {
        assert_eq!(parse_date("2025/12/13"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date(" 2025-12-13 "), Some(d("2025-12-13")));
    }
}
