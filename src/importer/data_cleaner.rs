// ==========================================
// 废料分析系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 日期与数值解析 / 班次标准化
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 兼容的纯日期格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// 兼容的日期时间格式 (时间部分截断)
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return Some(date);
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt.date());
            }
        }

        // 带时区: 取记录自身时区下的日期
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    fn normalize_shift(&self, value: Option<&str>, default_shift: &str) -> String {
        let cleaned = match self.normalize_null(value) {
            Some(v) => self.clean_text(&v, true),
            None => return default_shift.to_uppercase(),
        };

        strip_shift_prefix(&cleaned).to_string()
    }
}

/// 去除前导 "SHIFT" + 空白 (对应 `^SHIFT\s+`)
fn strip_shift_prefix(value: &str) -> &str {
    match value.strip_prefix("SHIFT") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  hello  ", true), "HELLO");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ")), None);
        assert_eq!(cleaner.normalize_null(Some("")), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ")),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

        assert_eq!(cleaner.parse_date("2025-10-01"), Some(expected));
        assert_eq!(cleaner.parse_date("20251001"), Some(expected));
        assert_eq!(cleaner.parse_date("2025/10/01"), Some(expected));
        assert_eq!(cleaner.parse_date("2025-10-01 13:45:00"), Some(expected));
        assert_eq!(cleaner.parse_date("2025-10-01T13:45:00.123"), Some(expected));
        assert_eq!(cleaner.parse_date("2025-10-01T23:00:00+02:00"), Some(expected));

        assert_eq!(cleaner.parse_date(""), None);
        assert_eq!(cleaner.parse_date("not a date"), None);
        assert_eq!(cleaner.parse_date("2025-02-30"), None);
    }

    #[test]
    fn test_parse_number() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_number(" 12.5 "), Some(12.5));
        assert_eq!(cleaner.parse_number("abc"), None);
        assert_eq!(cleaner.parse_number("NaN"), None);
        assert_eq!(cleaner.parse_number("inf"), None);
        assert_eq!(cleaner.parse_number(""), None);
    }

    #[test]
    fn test_normalize_shift() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_shift(Some("shift b"), "A"), "B");
        assert_eq!(cleaner.normalize_shift(Some("  Shift   C "), "A"), "C");
        assert_eq!(cleaner.normalize_shift(Some("b"), "A"), "B");
        assert_eq!(cleaner.normalize_shift(Some("SHIFTX"), "A"), "SHIFTX");
        assert_eq!(cleaner.normalize_shift(None, "A"), "A");
        assert_eq!(cleaner.normalize_shift(Some("   "), "A"), "A");
    }
}
