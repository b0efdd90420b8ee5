//! Tín hiệu bí tiểu từ ghi chú điều dưỡng.
//!
//! Ghi chú được tính khi có ghi nhận siêu âm bàng quang hoặc thông tiểu một lần, và văn bản
//! có thể tích vượt ngưỡng nằm gần một từ khóa tiết niệu.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::RuleConfig;

/// Từ khóa dài đứng trước để `尿管` không bị `尿` che mất.
const URINARY_KEYWORDS: [&str; 2] = ["尿管", "尿"];

static VOLUME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2,4})\s*(mL|ml|cc|㏄|毫升)").expect("Invalid volume regex")
});

/// Một lần nhắc thể tích thỏa bộ dò.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMatch {
    pub value: u32,
    pub unit: String,
    /// Đoạn văn bản chứa giá trị.
    pub window: String,
}

/// Chiến lược tìm thể tích hợp lệ trong văn bản tự do.
pub trait RetentionMatcher: Send + Sync {
    fn find_volume(&self, text: &str) -> Option<VolumeMatch>;
}

/// Dò theo khoảng cách ký tự: xét mọi lần xuất hiện từ khóa và mọi số trong cửa sổ của nó.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityVolumeMatcher {
    radius_chars: usize,
    min_volume_ml: u32,
}

impl ProximityVolumeMatcher {
    pub fn new(radius_chars: usize, min_volume_ml: u32) -> Self {
        Self {
            radius_chars,
            min_volume_ml,
        }
    }

    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new(config.retention_proximity_chars, config.retention_min_volume_ml)
    }

    fn scan_window(&self, window: &str) -> Option<VolumeMatch> {
        VOLUME_REGEX.captures_iter(window).find_map(|caps| {
            let value = caps.get(1)?.as_str().parse::<u32>().ok()?;
            if value <= self.min_volume_ml {
                return None;
            }
            Some(VolumeMatch {
                value,
                unit: caps.get(2)?.as_str().to_string(),
                window: window.to_string(),
            })
        })
    }
}

impl Default for ProximityVolumeMatcher {
    fn default() -> Self {
        Self::from_config(&RuleConfig::default())
    }
}

impl RetentionMatcher for ProximityVolumeMatcher {
    fn find_volume(&self, text: &str) -> Option<VolumeMatch> {
        URINARY_KEYWORDS.iter().find_map(|keyword| {
            text.match_indices(*keyword).find_map(|(idx, kw)| {
                let window = char_window(text, idx, idx + kw.len(), self.radius_chars);
                self.scan_window(window)
            })
        })
    }
}

/// Đoạn của `text` mở rộng `radius` ký tự về hai phía của `[start, end)`.
fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let lo = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[lo..hi]
}

/// Mã cố định trong chuỗi lý do. Tên mã giữ theo định nghĩa giám sát (100 mL) kể cả khi
/// `retention_min_volume_ml` được cấu hình khác.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RetentionCode {
    #[serde(rename = "urinary_retention_volume_gt_100")]
    VolumeAboveThreshold,
    #[serde(rename = "no_scan_or_straight_cath")]
    NoProcedure,
    #[serde(rename = "empty_note")]
    EmptyNote,
    #[serde(rename = "no_volume_gt_100_near_urinary_keyword")]
    NoVolumeNearKeyword,
}

/// Kết quả luật bí tiểu như ghi trong chuỗi lý do.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RetentionOutcome {
    pub ok: bool,
    pub reason: RetentionCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

impl RetentionOutcome {
    fn miss(reason: RetentionCode) -> Self {
        Self {
            ok: false,
            reason,
            value: None,
            unit: None,
            window: None,
        }
    }
}

/// Luật bí tiểu, trả thêm ngày triệu chứng khi khớp.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetentionDateOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_date: Option<NaiveDate>,
    pub retention: RetentionOutcome,
}

pub fn urinary_retention_symptom(
    has_procedure: bool,
    note: &str,
    matcher: &dyn RetentionMatcher,
) -> RetentionOutcome {
    if !has_procedure {
        return RetentionOutcome::miss(RetentionCode::NoProcedure);
    }
    if note.is_empty() {
        return RetentionOutcome::miss(RetentionCode::EmptyNote);
    }

    match matcher.find_volume(note) {
        Some(hit) => RetentionOutcome {
            ok: true,
            reason: RetentionCode::VolumeAboveThreshold,
            value: Some(hit.value),
            unit: Some(hit.unit),
            window: Some(hit.window),
        },
        None => RetentionOutcome::miss(RetentionCode::NoVolumeNearKeyword),
    }
}

pub fn urinary_retention_as_symptom_date(
    has_procedure: bool,
    note: &str,
    symptom_date: NaiveDate,
    matcher: &dyn RetentionMatcher,
) -> RetentionDateOutcome {
    let retention = urinary_retention_symptom(has_procedure, note, matcher);
    RetentionDateOutcome {
        ok: retention.ok,
        symptom_date: retention.ok.then_some(symptom_date),
        retention,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(text: &str) -> Option<VolumeMatch> {
        ProximityVolumeMatcher::default().find_volume(text)
    }

    #[test]
    fn volume_near_catheter_keyword_matches() {
        let hit = find("留置尿管，引流 120 mL 清澈").unwrap();
        assert_eq!(hit.value, 120);
        assert_eq!(hit.unit, "mL");
        assert!(hit.window.contains("尿管"));
    }

    #[test]
    fn volume_at_threshold_does_not_match() {
        assert_eq!(find("尿量 100 mL"), None);
        assert_eq!(find("膀胱掃描尿量 90 mL"), None);
        assert_eq!(find("尿量 101ml").map(|m| m.value), Some(101));
    }

    #[test]
    fn every_unit_is_recognised() {
        for unit in ["mL", "ml", "cc", "㏄", "毫升"] {
            let hit = find(&format!("單導尿 350{unit}")).unwrap();
            assert_eq!(hit.unit, unit);
        }
        assert_eq!(find("尿量 350 L"), None);
    }

    #[test]
    fn later_number_in_window_is_checked() {
        let hit = find("尿量 50 mL 後再測 300 mL").unwrap();
        assert_eq!(hit.value, 300);
    }

    #[test]
    fn later_keyword_occurrence_is_checked() {
        let text = format!("尿{}。另外單導尿，殘尿 450 cc", "無異常".repeat(10));
        let hit = find(&text).unwrap();
        assert_eq!(hit.value, 450);
        assert_eq!(hit.unit, "cc");
    }

    #[test]
    fn volume_outside_proximity_is_ignored() {
        let text = format!("尿{}250 mL", "x".repeat(25));
        assert_eq!(find(&text), None);
        let text = format!("尿{}250 mL", "x".repeat(10));
        assert_eq!(find(&text).map(|m| m.value), Some(250));
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        // 20 ký tự trước từ khóa chiếm hơn 20 byte.
        let text = format!("250 mL{}尿", "評".repeat(14));
        assert_eq!(find(&text).map(|m| m.value), Some(250));
        let text = format!("250 mL{}尿", "評".repeat(15));
        assert_eq!(find(&text), None);
    }

    #[test]
    fn window_is_clamped_to_text() {
        assert_eq!(char_window("abc尿def", 3, 6, 20), "abc尿def");
        assert_eq!(char_window("abc尿def", 3, 6, 1), "c尿d");
        assert_eq!(char_window("abc尿def", 3, 6, 0), "尿");
    }

    #[test]
    fn missing_procedure_short_circuits() {
        let outcome = urinary_retention_symptom(false, "尿量 500 mL", &ProximityVolumeMatcher::default());
        assert!(!outcome.ok);
        assert_eq!(outcome.reason, RetentionCode::NoProcedure);
    }

    #[test]
    fn empty_note_short_circuits() {
        let outcome = urinary_retention_symptom(true, "", &ProximityVolumeMatcher::default());
        assert_eq!(outcome.reason, RetentionCode::EmptyNote);
    }

    #[test]
    fn symptom_date_only_on_hit() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 12).unwrap();
        let matcher = ProximityVolumeMatcher::default();
        let hit = urinary_retention_as_symptom_date(true, "尿量 120 mL", date, &matcher);
        assert_eq!(hit.symptom_date, Some(date));
        let miss = urinary_retention_as_symptom_date(true, "尿量 80 mL", date, &matcher);
        assert!(!miss.ok);
        assert_eq!(miss.symptom_date, None);
    }

    #[test]
    fn custom_matcher_plugs_in() {
        struct Always;
        impl RetentionMatcher for Always {
            fn find_volume(&self, _text: &str) -> Option<VolumeMatch> {
                Some(VolumeMatch {
                    value: 999,
                    unit: "mL".into(),
                    window: String::new(),
                })
            }
        }
        let outcome = urinary_retention_symptom(true, "no keyword", &Always);
        assert!(outcome.ok);
        assert_eq!(outcome.value, Some(999));
    }
}
