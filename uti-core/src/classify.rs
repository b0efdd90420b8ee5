//! Phân loại cuối cùng theo tuổi và triệu chứng: 1a/1b/2a/2b.

use serde::Serialize;

use crate::decision::ExclusionReason;
use crate::window::{is_infant, temperature_abnormal};
use crate::{CaseRecord, Category, RuleConfig};

/// Kết quả phân loại: thu nhận vào một nhóm hoặc bị loại với một lý do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Included(Category),
    Excluded(ExclusionReason),
}

/// Bản ghi bước `classify` trong chuỗi lý do.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ExclusionReason>,
    pub has_catheter: bool,
}

impl ClassifyOutcome {
    pub fn new(classification: Classification, has_catheter: bool) -> Self {
        match classification {
            Classification::Included(category) => Self {
                ok: true,
                category: Some(category),
                reason: None,
                has_catheter,
            },
            Classification::Excluded(reason) => Self {
                ok: false,
                category: None,
                reason: Some(reason),
                has_catheter,
            },
        }
    }
}

/// Trẻ dưới 1 tuổi cần nhiệt độ bất thường và từ khóa nhũ nhi. Các tuổi khác cần sốt;
/// trên 65 tuổi không có ống thông cần thêm một triệu chứng tiết niệu khác ngoài sốt.
pub fn classify_by_age_and_symptoms(
    case: &CaseRecord,
    has_catheter: bool,
    config: &RuleConfig,
) -> Classification {
    let age = case.age_years;

    if is_infant(age, config) {
        if !temperature_abnormal(case.temp_c, age, config) {
            return Classification::Excluded(ExclusionReason::InfantTempNotOk);
        }
        if !case.infant_keywords_hit {
            return Classification::Excluded(ExclusionReason::InfantKeywordsNotHit);
        }
        return Classification::Included(if has_catheter {
            Category::Infant2a
        } else {
            Category::Infant2b
        });
    }

    let fever = case
        .temp_c
        .is_some_and(|temp| temp >= config.fever_threshold_c);
    if !fever {
        return Classification::Excluded(ExclusionReason::NoFeverForAgeGe1);
    }

    // So sánh `>`: đúng 65 tuổi chưa thuộc nhóm cao tuổi.
    if !has_catheter && age > config.elderly_age_years && case.urinary_other_symptom != Some(true) {
        return Classification::Excluded(ExclusionReason::ElderlyNoCatheterFeverOnly);
    }

    Classification::Included(if has_catheter {
        Category::Adult1a
    } else {
        Category::Adult1b
    })
}
