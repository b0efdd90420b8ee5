//! Pipeline đánh giá.
//!
//! Thứ tự: chuẩn hóa bí tiểu → cửa sổ triệu chứng → ngày nhiễm trùng → ngày nằm viện thứ 3 →
//! ống thông → phân loại. Mỗi bước thêm đúng một [`Reason`]; bước chặn thất bại thì dừng.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::admission::passes_admission_day;
use crate::catheter::catheter_status;
use crate::classify::{classify_by_age_and_symptoms, Classification, ClassifyOutcome};
use crate::decision::{Decision, Exclusion, ExclusionReason, Reason, Stage};
use crate::infection::{compute_infection_day, InfectionDayOutcome};
use crate::retention::{
    urinary_retention_as_symptom_date, urinary_retention_symptom, ProximityVolumeMatcher,
    RetentionMatcher,
};
use crate::window::symptom_window_ok;
use crate::{CaseRecord, Category, RuleConfig};

/// Quyết định kèm bản sao ca bệnh đã chuẩn hóa dùng để tính ra nó.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluation {
    pub decision: Decision,
    pub normalized: CaseRecord,
}

/// Đánh giá với bộ dò thể tích theo khoảng cách ký tự lấy từ cấu hình.
pub fn evaluate(case: &CaseRecord, config: &RuleConfig) -> Evaluation {
    let matcher = ProximityVolumeMatcher::from_config(config);
    evaluate_with_matcher(case, config, &matcher)
}

pub fn evaluate_with_matcher(
    case: &CaseRecord,
    config: &RuleConfig,
    matcher: &dyn RetentionMatcher,
) -> Evaluation {
    let mut trail = Trail::default();
    let normalized = normalize(case, matcher, &mut trail);
    let decision = run_pipeline(&normalized, config, trail);

    debug!(
        ok = decision.ok,
        outcome = decision.outcome_label(),
        steps = decision.reasons.len(),
        "case evaluated"
    );

    Evaluation {
        decision,
        normalized,
    }
}

/// Đưa tín hiệu bí tiểu vào bản sao ca bệnh: nếu khớp thì thêm ngày bí tiểu vào ngày triệu
/// chứng; `urinary_other_symptom` chỉ được điền khi người gọi để trống.
fn normalize(case: &CaseRecord, matcher: &dyn RetentionMatcher, trail: &mut Trail) -> CaseRecord {
    let mut normalized = case.clone();

    if let (Some(date), Some(has_procedure)) = (
        case.urinary_retention_date,
        case.has_bladder_scan_or_straight_cath,
    ) {
        let outcome = urinary_retention_as_symptom_date(
            has_procedure,
            &case.nursing_note_text,
            date,
            matcher,
        );
        debug!(
            step = %Stage::UrinaryRetentionSymptomDate,
            ok = outcome.ok,
            "retention symptom date"
        );
        if let Some(symptom_date) = outcome.symptom_date {
            normalized.symptom_dates.insert(symptom_date);
            normalized.urinary_other_symptom.get_or_insert(true);
        }
        trail.push(Reason::UrinaryRetentionSymptomDate(outcome));
    }

    if normalized.urinary_other_symptom.is_none() {
        let outcome = urinary_retention_symptom(
            case.has_bladder_scan_or_straight_cath.unwrap_or(false),
            &case.nursing_note_text,
            matcher,
        );
        debug!(step = %Stage::UrinaryRetention, ok = outcome.ok, "retention symptom");
        normalized.urinary_other_symptom = Some(outcome.ok);
        trail.push(Reason::UrinaryRetention(outcome));
    }

    normalized
}

fn run_pipeline(case: &CaseRecord, config: &RuleConfig, mut trail: Trail) -> Decision {
    let window = symptom_window_ok(
        case.lab_date,
        &case.symptom_dates,
        case.temp_c,
        case.age_years,
        config,
    );
    debug!(
        step = %Stage::SymptomWindow,
        ok = window.ok,
        has_other = window.has_other,
        temp_abnormal = window.temp_abnormal,
        "symptom window"
    );
    trail.push(Reason::SymptomWindow(window));
    if !window.ok {
        return trail.exclude(Stage::SymptomWindow, ExclusionReason::NoSymptomInWindow);
    }

    let infection = if window.has_other {
        compute_infection_day(case.lab_date, &case.symptom_dates, config)
    } else {
        InfectionDayOutcome::temperature_only(case.lab_date)
    };
    debug!(
        step = %Stage::InfectionDay,
        ok = infection.ok,
        rule = ?infection.rule,
        "infection day"
    );
    let resolved = infection.infection_day.filter(|_| infection.ok);
    trail.push(Reason::InfectionDay(infection));
    let Some(infection_day) = resolved else {
        return trail.exclude(Stage::InfectionDay, ExclusionReason::NoSymptomInWindow);
    };
    trail.infection_day = Some(infection_day);

    let admission = passes_admission_day(case.admit_date, infection_day, config);
    debug!(
        step = %Stage::AdmissionDay3,
        ok = admission.ok,
        day_index = admission.day_index,
        "admission day"
    );
    trail.push(Reason::AdmissionDay3(admission));
    if !admission.ok {
        return trail.exclude(
            Stage::AdmissionDay3,
            ExclusionReason::AdmissionDayBelowThreshold,
        );
    }

    let catheter = catheter_status(infection_day, &case.catheter_periods, config);
    debug!(
        step = %Stage::Catheter,
        has_catheter = catheter.has_catheter,
        rule = ?catheter.rule,
        "catheter status"
    );
    trail.push(Reason::Catheter(catheter));
    trail.has_catheter = Some(catheter.has_catheter);

    let classification = classify_by_age_and_symptoms(case, catheter.has_catheter, config);
    debug!(step = %Stage::Classify, ?classification, "classification");
    trail.push(Reason::Classify(ClassifyOutcome::new(
        classification,
        catheter.has_catheter,
    )));

    match classification {
        Classification::Included(category) => trail.include(category),
        Classification::Excluded(reason) => trail.exclude(Stage::Classify, reason),
    }
}

/// Gom chuỗi lý do (chỉ thêm) và các trường đã xác định đến thời điểm hiện tại.
#[derive(Default)]
struct Trail {
    reasons: Vec<Reason>,
    infection_day: Option<NaiveDate>,
    has_catheter: Option<bool>,
}

impl Trail {
    fn push(&mut self, reason: Reason) {
        self.reasons.push(reason);
    }

    fn include(self, category: Category) -> Decision {
        Decision {
            ok: true,
            infection_day: self.infection_day,
            category: Some(category),
            has_catheter: self.has_catheter,
            exclusion: None,
            reasons: self.reasons,
        }
    }

    fn exclude(self, stage: Stage, reason: ExclusionReason) -> Decision {
        Decision {
            ok: false,
            infection_day: self.infection_day,
            category: None,
            has_catheter: self.has_catheter,
            exclusion: Some(Exclusion { stage, reason }),
            reasons: self.reasons,
        }
    }
}
