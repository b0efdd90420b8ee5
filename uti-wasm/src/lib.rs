//! Bridge WASM <-> JavaScript cho giao diện đánh giá UTI.

use serde_wasm_bindgen::{from_value, to_value};
use uti_core::{evaluate, CaseError, CaseRecord, RuleConfig, RuleOverrides};
use uti_fhir::FhirError;
use wasm_bindgen::prelude::*;

/// Đánh giá một ca bệnh (object JSON dạng camelCase), trả về `{ decision, normalized }`.
#[wasm_bindgen]
pub fn evaluate_case(input_case: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let case_value = from_value::<serde_json::Value>(input_case)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON ca bệnh: {err}")))?;
    let cfg = read_config(config)?;

    let case = CaseRecord::from_json_value(&case_value)
        .map_err(|err| JsValue::from_str(&format_case_error(&err)))?;
    let evaluation = evaluate(&case, &cfg);

    to_value(&evaluation)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Đánh giá một `Patient` hoặc `Bundle` FHIR; trả về danh sách kết quả theo từng bệnh nhân.
#[wasm_bindgen]
pub fn evaluate_patient(resource: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let resource_value = from_value::<serde_json::Value>(resource)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON resource: {err}")))?;
    let cfg = read_config(config)?;

    let results = uti_fhir::evaluate_resource_value(&resource_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_fhir_error(&err)))?;

    to_value(&results)
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<RuleConfig, JsValue> {
    // `undefined`/`null` từ JS đều coi như không truyền cấu hình.
    match config.filter(|js_cfg| !js_cfg.is_undefined() && !js_cfg.is_null()) {
        Some(js_cfg) => {
            let overrides: RuleOverrides = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(RuleConfig::default().with_overrides(overrides))
        }
        None => Ok(RuleConfig::default()),
    }
}

fn format_case_error(err: &CaseError) -> String {
    format!("Ca bệnh không hợp lệ: {err}")
}

fn format_fhir_error(err: &FhirError) -> String {
    format!("FHIR error [{}]: {err}", err.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_error_message_names_field() {
        let message = format_case_error(&CaseError::MissingField("labDate".into()));
        assert!(message.contains("labDate"));
    }

    #[test]
    fn fhir_error_message_carries_code() {
        let message = format_fhir_error(&FhirError::MissingExtension);
        assert!(message.starts_with("FHIR error [missing_extension]"));
    }
}
