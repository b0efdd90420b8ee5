//! Cổng cửa sổ triệu chứng: có dấu hiệu đi kèm trong ±N ngày quanh ngày xét nghiệm.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::DateWindow;
use crate::RuleConfig;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowOutcome {
    pub ok: bool,
    /// Có ít nhất một ngày triệu chứng trong cửa sổ.
    pub has_other: bool,
    pub temp_abnormal: bool,
    pub window: DateWindow,
}

pub fn is_infant(age_years: f64, config: &RuleConfig) -> bool {
    age_years < config.infant_age_years
}

/// Sốt với mọi tuổi; trẻ dưới 1 tuổi tính cả hạ thân nhiệt. Không có số đo thì không bất thường.
pub fn temperature_abnormal(temp_c: Option<f64>, age_years: f64, config: &RuleConfig) -> bool {
    let Some(temp) = temp_c else {
        return false;
    };
    if is_infant(age_years, config) {
        temp >= config.fever_threshold_c || temp <= config.infant_hypothermia_c
    } else {
        temp >= config.fever_threshold_c
    }
}

pub fn symptom_window_ok(
    lab_date: NaiveDate,
    symptom_dates: &BTreeSet<NaiveDate>,
    temp_c: Option<f64>,
    age_years: f64,
    config: &RuleConfig,
) -> WindowOutcome {
    let window = DateWindow::around(lab_date, config.symptom_window_days);
    let has_other = symptom_dates.iter().any(|date| window.contains(*date));
    let temp_abnormal = temperature_abnormal(temp_c, age_years, config);

    WindowOutcome {
        ok: has_other || temp_abnormal,
        has_other,
        temp_abnormal,
        window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn dates(list: &[&str]) -> BTreeSet<NaiveDate> {
        list.iter().map(|s| d(s)).collect()
    }

    #[test]
    fn symptom_on_window_edge_passes() {
        let config = RuleConfig::default();
        let lab = d("2025-12-13");
        for edge in ["2025-12-10", "2025-12-16"] {
            let outcome = symptom_window_ok(lab, &dates(&[edge]), None, 40.0, &config);
            assert!(outcome.ok && outcome.has_other, "{edge}");
        }
    }

    #[test]
    fn symptom_outside_window_fails_without_fever() {
        let config = RuleConfig::default();
        let outcome = symptom_window_ok(
            d("2025-12-13"),
            &dates(&["2025-12-09", "2025-12-17"]),
            Some(37.0),
            40.0,
            &config,
        );
        assert!(!outcome.ok);
        assert!(!outcome.has_other);
    }

    #[test]
    fn fever_alone_passes() {
        let config = RuleConfig::default();
        let outcome = symptom_window_ok(d("2025-12-13"), &BTreeSet::new(), Some(38.1), 40.0, &config);
        assert!(outcome.ok);
        assert!(outcome.temp_abnormal);
        assert!(!outcome.has_other);
    }

    #[test]
    fn infant_window_needs_symptom_or_abnormal_temperature() {
        let config = RuleConfig::default();
        let far = dates(&["2025-12-09"]);
        let lab = d("2025-12-13");

        let normal = symptom_window_ok(lab, &far, Some(37.0), 0.5, &config);
        assert!(!normal.ok);
        assert!(!normal.has_other);

        let cold = symptom_window_ok(lab, &far, Some(35.9), 0.5, &config);
        assert!(cold.ok && cold.temp_abnormal);
    }

    #[test]
    fn hypothermia_counts_only_for_infants() {
        let config = RuleConfig::default();
        assert!(temperature_abnormal(Some(35.9), 0.5, &config));
        assert!(!temperature_abnormal(Some(36.0), 0.5, &config));
        assert!(!temperature_abnormal(Some(35.0), 1.0, &config));
        assert!(temperature_abnormal(Some(38.1), 1.0, &config));
        assert!(!temperature_abnormal(Some(38.0), 30.0, &config));
        assert!(!temperature_abnormal(None, 0.5, &config));
    }
}
