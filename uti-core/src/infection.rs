//! Xác định ngày nhiễm trùng.
//!
//! Chỉ lùi về triệu chứng sớm nhất trong cửa sổ khi triệu chứng đó trước ngày xét nghiệm;
//! ngược lại ngày xét nghiệm là ngày nhiễm trùng.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::DateWindow;
use crate::RuleConfig;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum InfectionRule {
    #[serde(rename = "symptom_after_or_on_lab")]
    SymptomOnOrAfterLab,
    #[serde(rename = "symptom_before_lab")]
    SymptomBeforeLab,
    #[serde(rename = "temp_only_use_labDate")]
    TemperatureOnly,
    #[serde(rename = "no_symptom_in_window")]
    NoSymptomInWindow,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfectionDayOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infection_day: Option<NaiveDate>,
    pub rule: InfectionRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub in_window: Vec<NaiveDate>,
}

impl InfectionDayOutcome {
    /// Qua cổng chỉ nhờ nhiệt độ: dùng nguyên ngày xét nghiệm.
    pub fn temperature_only(lab_date: NaiveDate) -> Self {
        Self {
            ok: true,
            infection_day: Some(lab_date),
            rule: InfectionRule::TemperatureOnly,
            window: None,
            in_window: Vec::new(),
        }
    }
}

pub fn compute_infection_day(
    lab_date: NaiveDate,
    symptom_dates: &BTreeSet<NaiveDate>,
    config: &RuleConfig,
) -> InfectionDayOutcome {
    let window = DateWindow::around(lab_date, config.symptom_window_days);
    // BTreeSet duyệt tăng dần, phần tử đầu là sớm nhất.
    let in_window: Vec<NaiveDate> = symptom_dates
        .iter()
        .copied()
        .filter(|date| window.contains(*date))
        .collect();

    let Some(&earliest) = in_window.first() else {
        return InfectionDayOutcome {
            ok: false,
            infection_day: None,
            rule: InfectionRule::NoSymptomInWindow,
            window: Some(window),
            in_window,
        };
    };

    let (infection_day, rule) = if earliest >= lab_date {
        (lab_date, InfectionRule::SymptomOnOrAfterLab)
    } else {
        (earliest, InfectionRule::SymptomBeforeLab)
    };

    InfectionDayOutcome {
        ok: true,
        infection_day: Some(infection_day),
        rule,
        window: Some(window),
        in_window,
    }
}
