//! Liên quan ống thông tiểu.
//!
//! Một đợt được tính khi kéo dài ít nhất `catheter_min_days` (tính cả hai đầu) và ngày nhiễm
//! trùng nằm trong đợt hoặc trong `catheter_grace_days` ngày sau khi rút. Báo đợt hợp lệ đầu
//! tiên theo thứ tự đầu vào.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{add_days, days_between, in_range};
use crate::{CatheterPeriod, RuleConfig};

/// Mã cố định; hậu tố `3days` theo định nghĩa giám sát, ngưỡng thực tế nằm ở
/// [`CatheterOutcome::min_days`] và [`CatheterOutcome::grace_days`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CatheterRule {
    #[serde(rename = "infection_during_catheter_3days")]
    DuringCatheter,
    #[serde(rename = "infection_day_after_removal_3days")]
    AfterRemoval,
    #[serde(rename = "no_catheter_meeting_rule")]
    NoQualifyingPeriod,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatheterOutcome {
    pub has_catheter: bool,
    pub rule: CatheterRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_period: Option<CatheterPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_days: Option<i64>,
    pub infection_day: NaiveDate,
    pub min_days: u32,
    pub grace_days: u32,
}

pub fn catheter_status(
    infection_day: NaiveDate,
    periods: &[CatheterPeriod],
    config: &RuleConfig,
) -> CatheterOutcome {
    let grace = i64::from(config.catheter_grace_days);

    for period in periods {
        let total_days = days_between(period.start, period.end) + 1;
        if total_days < i64::from(config.catheter_min_days) {
            continue;
        }

        let during = in_range(infection_day, period.start, period.end);
        let after_removal = grace > 0
            && in_range(
                infection_day,
                add_days(period.end, 1),
                add_days(period.end, grace),
            );

        if during || after_removal {
            return CatheterOutcome {
                has_catheter: true,
                rule: if during {
                    CatheterRule::DuringCatheter
                } else {
                    CatheterRule::AfterRemoval
                },
                matched_period: Some(*period),
                total_days: Some(total_days),
                infection_day,
                min_days: config.catheter_min_days,
                grace_days: config.catheter_grace_days,
            };
        }
    }

    CatheterOutcome {
        has_catheter: false,
        rule: CatheterRule::NoQualifyingPeriod,
        matched_period: None,
        total_days: None,
        infection_day,
        min_days: config.catheter_min_days,
        grace_days: config.catheter_grace_days,
    }
}
