//! Logic lõi đánh giá tiêu chí giám sát nhiễm trùng đường tiết niệu (UTI).
//!
//! Một lần đánh giá là một hàm thuần: nhận [`CaseRecord`], trả về [`Evaluation`]
//! gồm quyết định kèm chuỗi lý do theo đúng thứ tự các bước.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod admission;
pub mod catheter;
pub mod classify;
pub mod dates;
pub mod decision;
pub mod demo;
pub mod engine;
pub mod infection;
pub mod retention;
pub mod window;

pub use decision::{Decision, Exclusion, ExclusionReason, Reason, Stage};
pub use engine::{evaluate, evaluate_with_matcher, Evaluation};
pub use retention::{ProximityVolumeMatcher, RetentionMatcher, VolumeMatch};

/// Cấu hình các ngưỡng của bộ quy tắc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleConfig {
    /// Bán kính (ngày) cửa sổ triệu chứng quanh ngày xét nghiệm.
    pub symptom_window_days: u32,
    /// Ngưỡng sốt (°C), so sánh `>=`.
    pub fever_threshold_c: f64,
    /// Ngưỡng hạ thân nhiệt cho trẻ dưới 1 tuổi (°C), so sánh `<=`.
    pub infant_hypothermia_c: f64,
    /// Tuổi dưới ngưỡng này (so sánh `<`) thuộc nhóm nhũ nhi.
    pub infant_age_years: f64,
    /// Tuổi trên ngưỡng này (so sánh `>`) áp dụng luật người cao tuổi không đặt ống.
    pub elderly_age_years: f64,
    /// Ngày nằm viện tối thiểu (ngày nhập viện là ngày 1).
    pub admission_min_day: u32,
    /// Số ngày đặt ống thông tối thiểu (tính cả hai đầu).
    pub catheter_min_days: u32,
    /// Số ngày sau khi rút ống vẫn tính là có ống thông.
    pub catheter_grace_days: u32,
    /// Thể tích nước tiểu tồn lưu phải lớn hơn giá trị này (mL).
    pub retention_min_volume_ml: u32,
    /// Số ký tự mỗi bên quanh từ khóa khi dò thể tích.
    pub retention_proximity_chars: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            symptom_window_days: 3,
            fever_threshold_c: 38.1,
            infant_hypothermia_c: 35.9,
            infant_age_years: 1.0,
            elderly_age_years: 65.0,
            admission_min_day: 3,
            catheter_min_days: 3,
            catheter_grace_days: 1,
            retention_min_volume_ml: 100,
            retention_proximity_chars: 20,
        }
    }
}

impl RuleConfig {
    /// Ghi đè các ngưỡng được cung cấp, giữ mặc định cho phần còn lại.
    pub fn with_overrides(mut self, overrides: RuleOverrides) -> Self {
        if let Some(days) = overrides.symptom_window_days {
            self.symptom_window_days = days;
        }
        if let Some(temp) = overrides.fever_threshold_c {
            self.fever_threshold_c = temp;
        }
        if let Some(temp) = overrides.infant_hypothermia_c {
            self.infant_hypothermia_c = temp;
        }
        if let Some(age) = overrides.infant_age_years {
            self.infant_age_years = age;
        }
        if let Some(age) = overrides.elderly_age_years {
            self.elderly_age_years = age;
        }
        if let Some(day) = overrides.admission_min_day {
            self.admission_min_day = day;
        }
        if let Some(days) = overrides.catheter_min_days {
            self.catheter_min_days = days;
        }
        if let Some(days) = overrides.catheter_grace_days {
            self.catheter_grace_days = days;
        }
        if let Some(volume) = overrides.retention_min_volume_ml {
            self.retention_min_volume_ml = volume;
        }
        if let Some(chars) = overrides.retention_proximity_chars {
            self.retention_proximity_chars = chars;
        }
        self
    }
}

/// Cấu hình một phần, đọc từ file JSON hoặc từ JavaScript.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleOverrides {
    #[serde(default)]
    pub symptom_window_days: Option<u32>,
    #[serde(default)]
    pub fever_threshold_c: Option<f64>,
    #[serde(default)]
    pub infant_hypothermia_c: Option<f64>,
    #[serde(default)]
    pub infant_age_years: Option<f64>,
    #[serde(default)]
    pub elderly_age_years: Option<f64>,
    #[serde(default)]
    pub admission_min_day: Option<u32>,
    #[serde(default)]
    pub catheter_min_days: Option<u32>,
    #[serde(default)]
    pub catheter_grace_days: Option<u32>,
    #[serde(default)]
    pub retention_min_volume_ml: Option<u32>,
    #[serde(default)]
    pub retention_proximity_chars: Option<usize>,
}

/// Phân loại ca bệnh sau khi được thu nhận.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    /// Từ 1 tuổi trở lên, có ống thông.
    #[serde(rename = "1a")]
    Adult1a,
    /// Từ 1 tuổi trở lên, không có ống thông.
    #[serde(rename = "1b")]
    Adult1b,
    /// Dưới 1 tuổi, có ống thông.
    #[serde(rename = "2a")]
    Infant2a,
    /// Dưới 1 tuổi, không có ống thông.
    #[serde(rename = "2b")]
    Infant2b,
}

impl Category {
    pub fn code(self) -> &'static str {
        match self {
            Category::Adult1a => "1a",
            Category::Adult1b => "1b",
            Category::Infant2a => "2a",
            Category::Infant2b => "2b",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Một đợt đặt ống thông tiểu, tính cả ngày đặt và ngày rút.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatheterPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Ca bệnh đã kiểm tra kiểu dữ liệu, đầu vào của engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub admit_date: NaiveDate,
    pub lab_date: NaiveDate,
    pub symptom_dates: BTreeSet<NaiveDate>,
    pub age_years: f64,
    pub temp_c: Option<f64>,
    pub catheter_periods: Vec<CatheterPeriod>,
    pub infant_keywords_hit: bool,
    pub urinary_retention_date: Option<NaiveDate>,
    pub has_bladder_scan_or_straight_cath: Option<bool>,
    pub nursing_note_text: String,
    pub urinary_other_symptom: Option<bool>,
}

impl CaseRecord {
    /// Đọc và kiểm tra ca bệnh từ chuỗi JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CaseError> {
        let input: CaseInput =
            serde_json::from_str(json).map_err(|err| CaseError::Parse(err.to_string()))?;
        input.validate()
    }

    /// Đọc và kiểm tra ca bệnh từ `serde_json::Value`.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, CaseError> {
        let input = CaseInput::deserialize(value).map_err(|err| CaseError::Parse(err.to_string()))?;
        input.validate()
    }
}

/// Dạng thô của ca bệnh như được gửi qua JSON (ngày là chuỗi `YYYY-MM-DD`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseInput {
    #[serde(default)]
    pub admit_date: Option<String>,
    #[serde(default)]
    pub lab_date: Option<String>,
    #[serde(default)]
    pub symptom_dates: Option<Vec<String>>,
    #[serde(default)]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub temp_c: Option<f64>,
    #[serde(default)]
    pub catheter_periods: Option<Vec<PeriodInput>>,
    #[serde(default)]
    pub infant_keywords_hit: Option<bool>,
    #[serde(default)]
    pub urinary_retention_date: Option<String>,
    #[serde(default)]
    pub has_bladder_scan_or_straight_cath: Option<bool>,
    #[serde(default)]
    pub nursing_note_text: Option<String>,
    #[serde(default)]
    pub urinary_other_symptom: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PeriodInput {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl CaseInput {
    /// Kiểm tra và chuyển sang [`CaseRecord`]. Lỗi ở đây nghĩa là "không đánh giá được",
    /// khác với bị loại khỏi nhóm giám sát.
    pub fn validate(&self) -> Result<CaseRecord, CaseError> {
        let admit_date = required_date("admitDate", self.admit_date.as_deref())?;
        let lab_date = required_date("labDate", self.lab_date.as_deref())?;

        let mut symptom_dates = BTreeSet::new();
        for (idx, raw) in self.symptom_dates.iter().flatten().enumerate() {
            // Chuỗi rỗng coi như không có, giống `urinaryRetentionDate`.
            if let Some(raw) = non_blank(Some(raw.as_str())) {
                symptom_dates.insert(parse_field_date(&format!("symptomDates[{idx}]"), raw)?);
            }
        }

        let age_years = self.age_years.ok_or(CaseError::MissingField("ageYears".into()))?;
        if !age_years.is_finite() || age_years < 0.0 {
            return Err(CaseError::InvalidNumber {
                field: "ageYears".into(),
                value: age_years,
            });
        }

        if let Some(temp) = self.temp_c {
            if !temp.is_finite() {
                return Err(CaseError::InvalidNumber {
                    field: "tempC".into(),
                    value: temp,
                });
            }
        }

        let mut catheter_periods = Vec::new();
        for (idx, period) in self.catheter_periods.iter().flatten().enumerate() {
            let start_field = format!("catheterPeriods[{idx}].start");
            let end_field = format!("catheterPeriods[{idx}].end");
            let start = match non_blank(period.start.as_deref()) {
                Some(raw) => parse_field_date(&start_field, raw)?,
                None => return Err(CaseError::MissingField(start_field)),
            };
            let end = match non_blank(period.end.as_deref()) {
                Some(raw) => parse_field_date(&end_field, raw)?,
                None => return Err(CaseError::MissingField(end_field)),
            };
            catheter_periods.push(CatheterPeriod { start, end });
        }

        let urinary_retention_date = match non_blank(self.urinary_retention_date.as_deref()) {
            Some(raw) => Some(parse_field_date("urinaryRetentionDate", raw)?),
            None => None,
        };

        Ok(CaseRecord {
            admit_date,
            lab_date,
            symptom_dates,
            age_years,
            temp_c: self.temp_c,
            catheter_periods,
            infant_keywords_hit: self.infant_keywords_hit.unwrap_or(false),
            urinary_retention_date,
            has_bladder_scan_or_straight_cath: self.has_bladder_scan_or_straight_cath,
            nursing_note_text: self.nursing_note_text.clone().unwrap_or_default(),
            urinary_other_symptom: self.urinary_other_symptom,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|raw| !raw.is_empty())
}

fn required_date(field: &str, value: Option<&str>) -> Result<NaiveDate, CaseError> {
    match non_blank(value) {
        Some(raw) => parse_field_date(field, raw),
        None => Err(CaseError::MissingField(field.to_string())),
    }
}

fn parse_field_date(field: &str, raw: &str) -> Result<NaiveDate, CaseError> {
    dates::parse_date(raw).ok_or_else(|| CaseError::InvalidDate {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Lỗi kiểm tra đầu vào: ca bệnh không thể đánh giá.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaseError {
    #[error("Thiếu trường bắt buộc `{0}`")]
    MissingField(String),
    #[error("Trường `{field}` không phải ngày hợp lệ (YYYY-MM-DD): {value:?}")]
    InvalidDate { field: String, value: String },
    #[error("Trường `{field}` có giá trị số không hợp lệ: {value}")]
    InvalidNumber { field: String, value: f64 },
    #[error("Không đọc được dữ liệu ca bệnh: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_input() -> CaseInput {
        CaseInput {
            admit_date: Some("2025-12-10".into()),
            lab_date: Some("2025-12-13".into()),
            age_years: Some(40.0),
            ..CaseInput::default()
        }
    }

    #[test]
    fn validate_fills_defaults() {
        let record = minimal_input().validate().unwrap();
        assert!(record.symptom_dates.is_empty());
        assert!(record.catheter_periods.is_empty());
        assert!(!record.infant_keywords_hit);
        assert_eq!(record.nursing_note_text, "");
        assert_eq!(record.urinary_other_symptom, None);
    }

    #[test]
    fn duplicate_symptom_dates_collapse() {
        let mut input = minimal_input();
        input.symptom_dates = Some(vec![
            "2025-12-12".into(),
            "2025-12-11".into(),
            "2025-12-12".into(),
        ]);
        let record = input.validate().unwrap();
        let dates: Vec<_> = record.symptom_dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, ["2025-12-11", "2025-12-12"]);
    }

    #[test]
    fn missing_admit_date_is_reported() {
        let mut input = minimal_input();
        input.admit_date = None;
        assert_eq!(
            input.validate(),
            Err(CaseError::MissingField("admitDate".into()))
        );
    }

    #[test]
    fn malformed_catheter_date_names_the_field() {
        let mut input = minimal_input();
        input.catheter_periods = Some(vec![PeriodInput {
            start: Some("2025-12-10".into()),
            end: Some("2025/12/13".into()),
        }]);
        assert_eq!(
            input.validate(),
            Err(CaseError::InvalidDate {
                field: "catheterPeriods[0].end".into(),
                value: "2025/12/13".into(),
            })
        );
    }

    #[test]
    fn negative_age_is_rejected() {
        let mut input = minimal_input();
        input.age_years = Some(-1.0);
        assert!(matches!(
            input.validate(),
            Err(CaseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn blank_retention_date_counts_as_absent() {
        let mut input = minimal_input();
        input.urinary_retention_date = Some(String::new());
        assert_eq!(input.validate().unwrap().urinary_retention_date, None);
    }

    #[test]
    fn blank_symptom_dates_are_skipped() {
        let mut input = minimal_input();
        input.symptom_dates = Some(vec!["".into(), "  ".into(), "2025-12-12".into()]);
        let record = input.validate().unwrap();
        let dates: Vec<_> = record.symptom_dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, ["2025-12-12"]);

        input.symptom_dates = Some(vec!["".into(), "12/12".into()]);
        assert_eq!(
            input.validate(),
            Err(CaseError::InvalidDate {
                field: "symptomDates[1]".into(),
                value: "12/12".into(),
            })
        );
    }

    #[test]
    fn blank_catheter_bound_is_missing() {
        let mut input = minimal_input();
        input.catheter_periods = Some(vec![PeriodInput {
            start: Some(" ".into()),
            end: Some("2025-12-13".into()),
        }]);
        assert_eq!(
            input.validate(),
            Err(CaseError::MissingField("catheterPeriods[0].start".into()))
        );
    }

    #[test]
    fn non_numeric_temperature_is_a_parse_error() {
        let json = r#"{"admitDate":"2025-12-10","labDate":"2025-12-13","ageYears":40,"tempC":"hot"}"#;
        assert!(matches!(
            CaseRecord::from_json_str(json),
            Err(CaseError::Parse(_))
        ));
    }

    #[test]
    fn overrides_keep_unspecified_defaults() {
        let config = RuleConfig::default().with_overrides(RuleOverrides {
            fever_threshold_c: Some(38.0),
            ..RuleOverrides::default()
        });
        assert_eq!(config.fever_threshold_c, 38.0);
        assert_eq!(config.symptom_window_days, 3);
    }
}
