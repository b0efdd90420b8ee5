//! Bộ ca mẫu cố định dùng để kiểm tra thủ công và làm dữ liệu test.

use crate::{CaseInput, PeriodInput};

/// Một ca mẫu kèm nhãn kỳ vọng (`1a`/`1b`/`2a`/`2b`/`exclude`).
#[derive(Debug, Clone, PartialEq)]
pub struct DemoCase {
    pub id: &'static str,
    pub title: &'static str,
    pub expected: &'static str,
    pub input: CaseInput,
}

fn date(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn period(start: &str, end: &str) -> PeriodInput {
    PeriodInput {
        start: date(start),
        end: date(end),
    }
}

/// Sáu ca mẫu: bốn nhóm thu nhận và hai ca bị loại.
pub fn demo_cases() -> Vec<DemoCase> {
    vec![
        DemoCase {
            id: "case_1a_catheter_ge1_fever_retention",
            title: "UTI-1a",
            expected: "1a",
            input: CaseInput {
                admit_date: date("2025-12-10"),
                lab_date: date("2025-12-13"),
                symptom_dates: Some(Vec::new()),
                age_years: Some(40.0),
                temp_c: Some(38.6),
                catheter_periods: Some(vec![period("2025-12-10", "2025-12-13")]),
                infant_keywords_hit: Some(false),
                urinary_retention_date: date("2025-12-12"),
                has_bladder_scan_or_straight_cath: Some(true),
                nursing_note_text: Some("膀胱掃描顯示尿量 120 mL，評估單導。".to_string()),
                urinary_other_symptom: None,
            },
        },
        DemoCase {
            id: "case_1b_nocatheter_ge1_fever_retention",
            title: "UTI-1b",
            expected: "1b",
            input: CaseInput {
                admit_date: date("2025-12-10"),
                lab_date: date("2025-12-13"),
                symptom_dates: Some(Vec::new()),
                age_years: Some(30.0),
                temp_c: Some(38.3),
                catheter_periods: Some(Vec::new()),
                infant_keywords_hit: Some(false),
                urinary_retention_date: date("2025-12-12"),
                has_bladder_scan_or_straight_cath: Some(true),
                nursing_note_text: Some(
                    "病人排尿困難，膀胱掃描尿量 150 mL，已評估單導。".to_string(),
                ),
                urinary_other_symptom: None,
            },
        },
        DemoCase {
            id: "case_2a_infant_catheter_hypothermia_keywords",
            title: "UTI-2a",
            expected: "2a",
            input: CaseInput {
                admit_date: date("2025-12-01"),
                lab_date: date("2025-12-04"),
                symptom_dates: Some(vec!["2025-12-04".to_string()]),
                age_years: Some(0.3),
                temp_c: Some(35.8),
                catheter_periods: Some(vec![period("2025-12-01", "2025-12-04")]),
                infant_keywords_hit: Some(true),
                urinary_retention_date: None,
                has_bladder_scan_or_straight_cath: Some(false),
                nursing_note_text: Some(String::new()),
                urinary_other_symptom: None,
            },
        },
        DemoCase {
            id: "case_2b_infant_nocatheter_fever_keywords",
            title: "UTI-2b",
            expected: "2b",
            input: CaseInput {
                admit_date: date("2025-12-01"),
                lab_date: date("2025-12-04"),
                symptom_dates: Some(vec!["2025-12-05".to_string()]),
                age_years: Some(0.8),
                temp_c: Some(38.2),
                catheter_periods: Some(Vec::new()),
                infant_keywords_hit: Some(true),
                urinary_retention_date: None,
                has_bladder_scan_or_straight_cath: Some(false),
                nursing_note_text: Some(String::new()),
                urinary_other_symptom: None,
            },
        },
        DemoCase {
            id: "exclude_admit_day_1_2",
            title: "EX-AdmDay12",
            expected: "exclude",
            input: CaseInput {
                admit_date: date("2025-12-10"),
                lab_date: date("2025-12-11"),
                symptom_dates: Some(vec!["2025-12-11".to_string()]),
                age_years: Some(50.0),
                temp_c: Some(38.5),
                catheter_periods: Some(vec![period("2025-12-10", "2025-12-13")]),
                infant_keywords_hit: Some(false),
                urinary_retention_date: None,
                has_bladder_scan_or_straight_cath: Some(false),
                nursing_note_text: Some(String::new()),
                urinary_other_symptom: Some(true),
            },
        },
        DemoCase {
            id: "exclude_gt65_nocatheter_fever_only",
            title: "EX->65FeverOnly",
            expected: "exclude",
            input: CaseInput {
                admit_date: date("2025-12-10"),
                lab_date: date("2025-12-13"),
                symptom_dates: Some(vec!["2025-12-13".to_string()]),
                age_years: Some(70.0),
                temp_c: Some(38.6),
                catheter_periods: Some(Vec::new()),
                infant_keywords_hit: Some(false),
                urinary_retention_date: None,
                has_bladder_scan_or_straight_cath: Some(false),
                nursing_note_text: Some(String::new()),
                urinary_other_symptom: Some(false),
            },
        },
    ]
}
