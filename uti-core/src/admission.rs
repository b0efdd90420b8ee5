//! Cổng ngày nằm viện. Ngày nhập viện là ngày 1; nhiễm trùng xuất hiện ngày 1 hoặc 2 là
//! mắc phải từ cộng đồng và bị loại.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::days_between;
use crate::RuleConfig;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionOutcome {
    pub ok: bool,
    pub day_index: i64,
    pub threshold: u32,
    pub admit_date: NaiveDate,
    pub infection_day: NaiveDate,
}

pub fn passes_admission_day(
    admit_date: NaiveDate,
    infection_day: NaiveDate,
    config: &RuleConfig,
) -> AdmissionOutcome {
    let day_index = days_between(admit_date, infection_day) + 1;
    AdmissionOutcome {
        ok: day_index >= i64::from(config.admission_min_day),
        day_index,
        threshold: config.admission_min_day,
        admit_date,
        infection_day,
    }
}
