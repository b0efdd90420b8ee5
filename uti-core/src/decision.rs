//! Bản ghi quyết định và chuỗi lý do theo thứ tự.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::admission::AdmissionOutcome;
use crate::catheter::CatheterOutcome;
use crate::classify::ClassifyOutcome;
use crate::infection::InfectionDayOutcome;
use crate::retention::{RetentionDateOutcome, RetentionOutcome};
use crate::window::WindowOutcome;
use crate::Category;

/// Mã các bước của pipeline, theo thứ tự chạy.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    #[serde(rename = "urinary_retention_symptomdate")]
    UrinaryRetentionSymptomDate,
    #[serde(rename = "urinary_retention")]
    UrinaryRetention,
    #[serde(rename = "symptom_window")]
    SymptomWindow,
    #[serde(rename = "infection_day")]
    InfectionDay,
    #[serde(rename = "admission_day3")]
    AdmissionDay3,
    #[serde(rename = "catheter")]
    Catheter,
    #[serde(rename = "classify")]
    Classify,
}

impl Stage {
    pub fn code(self) -> &'static str {
        match self {
            Stage::UrinaryRetentionSymptomDate => "urinary_retention_symptomdate",
            Stage::UrinaryRetention => "urinary_retention",
            Stage::SymptomWindow => "symptom_window",
            Stage::InfectionDay => "infection_day",
            Stage::AdmissionDay3 => "admission_day3",
            Stage::Catheter => "catheter",
            Stage::Classify => "classify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Lý do máy đọc được khi ca bị loại. Mã là định danh cố định theo định nghĩa giám sát
/// (ví dụ `admission_day_lt_3`); ngưỡng đã cấu hình nằm trong bản ghi của từng bước.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    #[serde(rename = "no_symptom_in_window")]
    NoSymptomInWindow,
    #[serde(rename = "admission_day_lt_3")]
    AdmissionDayBelowThreshold,
    #[serde(rename = "infant_temp_not_ok")]
    InfantTempNotOk,
    #[serde(rename = "infant_keywords_not_hit")]
    InfantKeywordsNotHit,
    #[serde(rename = "no_fever_for_age_ge_1")]
    NoFeverForAgeGe1,
    #[serde(rename = "age_gt_65_no_catheter_fever_only")]
    ElderlyNoCatheterFeverOnly,
}

impl ExclusionReason {
    pub fn code(self) -> &'static str {
        match self {
            ExclusionReason::NoSymptomInWindow => "no_symptom_in_window",
            ExclusionReason::AdmissionDayBelowThreshold => "admission_day_lt_3",
            ExclusionReason::InfantTempNotOk => "infant_temp_not_ok",
            ExclusionReason::InfantKeywordsNotHit => "infant_keywords_not_hit",
            ExclusionReason::NoFeverForAgeGe1 => "no_fever_for_age_ge_1",
            ExclusionReason::ElderlyNoCatheterFeverOnly => "age_gt_65_no_catheter_fever_only",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Exclusion {
    pub stage: Stage,
    pub reason: ExclusionReason,
}

/// Một mục trong chuỗi lý do, gắn nhãn theo `step`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "step")]
pub enum Reason {
    #[serde(rename = "urinary_retention_symptomdate")]
    UrinaryRetentionSymptomDate(RetentionDateOutcome),
    #[serde(rename = "urinary_retention")]
    UrinaryRetention(RetentionOutcome),
    #[serde(rename = "symptom_window")]
    SymptomWindow(WindowOutcome),
    #[serde(rename = "infection_day")]
    InfectionDay(InfectionDayOutcome),
    #[serde(rename = "admission_day3")]
    AdmissionDay3(AdmissionOutcome),
    #[serde(rename = "catheter")]
    Catheter(CatheterOutcome),
    #[serde(rename = "classify")]
    Classify(ClassifyOutcome),
}

impl Reason {
    pub fn stage(&self) -> Stage {
        match self {
            Reason::UrinaryRetentionSymptomDate(_) => Stage::UrinaryRetentionSymptomDate,
            Reason::UrinaryRetention(_) => Stage::UrinaryRetention,
            Reason::SymptomWindow(_) => Stage::SymptomWindow,
            Reason::InfectionDay(_) => Stage::InfectionDay,
            Reason::AdmissionDay3(_) => Stage::AdmissionDay3,
            Reason::Catheter(_) => Stage::Catheter,
            Reason::Classify(_) => Stage::Classify,
        }
    }
}

/// Kết quả của một lần đánh giá.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infection_day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_catheter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<Exclusion>,
    pub reasons: Vec<Reason>,
}

impl Decision {
    /// `1a`/`1b`/`2a`/`2b` hoặc `exclude`.
    pub fn outcome_label(&self) -> &'static str {
        match self.category {
            Some(category) if self.ok => category.code(),
            _ => "exclude",
        }
    }

    pub fn reason_for(&self, stage: Stage) -> Option<&Reason> {
        self.reasons.iter().find(|reason| reason.stage() == stage)
    }

    /// Tóm tắt ngắn cho bảng đối chiếu: mã của bước phân loại trước, sau đó các cổng trước nó.
    pub fn main_reason(&self) -> String {
        if let Some(Reason::Classify(outcome)) = self.reason_for(Stage::Classify) {
            if !outcome.ok {
                return outcome
                    .reason
                    .map_or("classify_failed", ExclusionReason::code)
                    .to_string();
            }
        }
        if let Some(Reason::AdmissionDay3(outcome)) = self.reason_for(Stage::AdmissionDay3) {
            if !outcome.ok {
                return "exclude: admission day < 3".to_string();
            }
        }
        let window_failed = matches!(
            self.reason_for(Stage::SymptomWindow),
            Some(Reason::SymptomWindow(outcome)) if !outcome.ok
        );
        let infection_failed = matches!(
            self.reason_for(Stage::InfectionDay),
            Some(Reason::InfectionDay(outcome)) if !outcome.ok
        );
        if window_failed || infection_failed {
            return "exclude: no symptom in ±3d window".to_string();
        }
        if self.ok { "included" } else { "excluded" }.to_string()
    }
}
