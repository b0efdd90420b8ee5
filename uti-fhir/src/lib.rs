//! FHIR JSON adapter: pulls the embedded UTI case payload out of `Patient` resources and
//! runs it through the rule engine.
//!
//! The case travels as a JSON string in `Patient.extension[].valueString` under
//! [`UTI_CASE_EXTENSION_URL`]. Fetching from and posting to a server is left to callers.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uti_core::{evaluate, CaseError, CaseInput, CaseRecord, Evaluation, RuleConfig};

/// StructureDefinition URL of the extension carrying the case payload.
pub const UTI_CASE_EXTENSION_URL: &str =
    "https://cch.org.tw/fhir/StructureDefinition/uti-demo-input";

/// Errors raised while reading FHIR input.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("Cannot parse FHIR JSON: {0}")]
    Parse(String),
    #[error("Expected resourceType Patient or Bundle, received {0}")]
    UnexpectedResource(String),
    #[error("Patient has no UTI case payload extension")]
    MissingExtension,
    #[error("Embedded case is not evaluable: {0}")]
    InvalidCase(#[from] CaseError),
    #[error("Cannot serialise case payload: {0}")]
    Serialize(String),
}

impl FhirError {
    /// Short code used in the per-patient failure entry.
    pub fn code(&self) -> &'static str {
        match self {
            FhirError::Parse(_) => "invalid_json",
            FhirError::UnexpectedResource(_) => "unexpected_resource",
            FhirError::MissingExtension => "missing_extension",
            FhirError::InvalidCase(_) => "invalid_case",
            FhirError::Serialize(_) => "serialize_failed",
        }
    }
}

/// Per-patient result inside a bundle run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientEvaluation {
    pub patient_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub outcome: PatientOutcome,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatientOutcome {
    Evaluated(Evaluation),
    NotEvaluable(LoadFailure),
}

/// Why a patient's case could not be loaded; kept apart from clinical exclusions.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoadFailure {
    pub step: &'static str,
    pub reason: &'static str,
    pub detail: String,
}

impl PatientEvaluation {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match &self.outcome {
            PatientOutcome::Evaluated(evaluation) => Some(evaluation),
            PatientOutcome::NotEvaluable(_) => None,
        }
    }

    /// Outcome label for comparison tables; unloadable cases read as `exclude`.
    pub fn outcome_label(&self) -> &'static str {
        self.evaluation()
            .map_or("exclude", |evaluation| evaluation.decision.outcome_label())
    }
}

/// Evaluate every patient in a JSON string holding a `Patient` or a `Bundle`.
pub fn evaluate_resource_str(
    json: &str,
    config: &RuleConfig,
) -> Result<Vec<PatientEvaluation>, FhirError> {
    let value: Value = serde_json::from_str(json).map_err(|err| FhirError::Parse(err.to_string()))?;
    evaluate_resource_value(&value, config)
}

/// Evaluate every patient in a `Patient` or `Bundle` value. A patient without a usable
/// payload yields a [`PatientOutcome::NotEvaluable`] entry instead of failing the run.
pub fn evaluate_resource_value(
    resource: &Value,
    config: &RuleConfig,
) -> Result<Vec<PatientEvaluation>, FhirError> {
    match resource_type(resource) {
        "Patient" => Ok(vec![evaluate_patient_entry(resource, config)]),
        "Bundle" => {
            let entries = resource
                .get("entry")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let results: Vec<PatientEvaluation> = entries
                .iter()
                .filter_map(|entry| entry.get("resource"))
                .filter(|resource| resource_type(resource) == "Patient")
                .map(|patient| evaluate_patient_entry(patient, config))
                .collect();
            debug!(patients = results.len(), "bundle evaluated");
            Ok(results)
        }
        other => Err(FhirError::UnexpectedResource(other.to_string())),
    }
}

/// Evaluate one `Patient`, failing if its payload is missing or invalid.
pub fn evaluate_patient(patient: &Value, config: &RuleConfig) -> Result<Evaluation, FhirError> {
    let case = extract_case(patient)?;
    Ok(evaluate(&case, config))
}

/// Read and validate the case embedded in a `Patient` resource.
pub fn extract_case(patient: &Value) -> Result<CaseRecord, FhirError> {
    let kind = resource_type(patient);
    if kind != "Patient" {
        return Err(FhirError::UnexpectedResource(kind.to_string()));
    }

    let payload = patient
        .get("extension")
        .and_then(Value::as_array)
        .and_then(|extensions| {
            extensions.iter().find(|ext| {
                ext.get("url").and_then(Value::as_str) == Some(UTI_CASE_EXTENSION_URL)
            })
        })
        .and_then(|ext| ext.get("valueString"))
        .and_then(Value::as_str)
        .ok_or(FhirError::MissingExtension)?;

    Ok(CaseRecord::from_json_str(payload)?)
}

/// Build a demo `Patient` resource carrying `case` in the payload extension.
pub fn build_demo_patient(title: &str, gender: &str, case: &CaseInput) -> Result<Value, FhirError> {
    let payload =
        serde_json::to_string(case).map_err(|err| FhirError::Serialize(err.to_string()))?;
    Ok(json!({
        "resourceType": "Patient",
        "name": [{ "family": "Demo", "given": [title] }],
        "gender": gender,
        // Placeholder only; the payload's ageYears is authoritative.
        "birthDate": "1970-01-01",
        "extension": [{
            "url": UTI_CASE_EXTENSION_URL,
            "valueString": payload,
        }],
    }))
}

fn evaluate_patient_entry(patient: &Value, config: &RuleConfig) -> PatientEvaluation {
    let patient_ref = format!("Patient/{}", resource_id(patient));
    let title = extract_patient_name(patient);

    let outcome = match evaluate_patient(patient, config) {
        Ok(evaluation) => PatientOutcome::Evaluated(evaluation),
        Err(err) => {
            warn!(patient = %patient_ref, error = %err, "patient case not evaluable");
            PatientOutcome::NotEvaluable(LoadFailure {
                step: "load_demoCase",
                reason: err.code(),
                detail: err.to_string(),
            })
        }
    };

    PatientEvaluation {
        patient_ref,
        title,
        outcome,
    }
}

fn resource_type(resource: &Value) -> &str {
    resource
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn resource_id(resource: &Value) -> String {
    resource
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

fn extract_patient_name(resource: &Value) -> Option<String> {
    let name = resource.get("name")?.as_array()?.first()?;
    if let Some(text) = name.get("text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.trim().to_string());
        }
    }
    let given = name
        .get("given")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(Value::as_str)
        .unwrap_or("");
    let family = name.get("family").and_then(Value::as_str).unwrap_or("");
    let full = format!("{given} {family}").trim().to_string();
    if full.is_empty() {
        None
    } else {
        Some(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uti_core::demo::demo_cases;

    fn patient_with_payload(payload: &str) -> Value {
        json!({
            "resourceType": "Patient",
            "id": "672841",
            "name": [{ "family": "Demo", "given": ["UTI-1a"] }],
            "extension": [
                { "url": "http://example.org/other", "valueString": "{}" },
                { "url": UTI_CASE_EXTENSION_URL, "valueString": payload }
            ]
        })
    }

    #[test]
    fn picks_extension_by_url() {
        let patient = patient_with_payload(
            r#"{"admitDate":"2025-12-10","labDate":"2025-12-13","ageYears":40,"tempC":38.6}"#,
        );
        let case = extract_case(&patient).unwrap();
        assert_eq!(case.age_years, 40.0);
        assert_eq!(case.temp_c, Some(38.6));
    }

    #[test]
    fn missing_extension_is_reported() {
        let patient = json!({ "resourceType": "Patient", "id": "1" });
        assert!(matches!(
            extract_case(&patient),
            Err(FhirError::MissingExtension)
        ));
    }

    #[test]
    fn invalid_payload_is_not_evaluable() {
        let patient = patient_with_payload(r#"{"labDate":"2025-12-13","ageYears":40}"#);
        let results = evaluate_resource_value(&patient, &RuleConfig::default()).unwrap();
        match &results[0].outcome {
            PatientOutcome::NotEvaluable(failure) => {
                assert_eq!(failure.step, "load_demoCase");
                assert_eq!(failure.reason, "invalid_case");
            }
            other => panic!("expected load failure, got {other:?}"),
        }
        assert_eq!(results[0].outcome_label(), "exclude");
    }

    #[test]
    fn serialise_failure_is_not_reported_as_parse() {
        let err = FhirError::Serialize("key must be a string".into());
        assert_eq!(err.code(), "serialize_failed");
        assert_eq!(
            err.to_string(),
            "Cannot serialise case payload: key must be a string"
        );
        assert_ne!(err.code(), FhirError::Parse(String::new()).code());
    }

    #[test]
    fn demo_patient_payload_is_valid_case_json() {
        let demo = &demo_cases()[0];
        let patient = build_demo_patient(demo.title, "other", &demo.input).unwrap();
        let payload = patient["extension"][0]["valueString"].as_str().unwrap();
        let case = CaseRecord::from_json_str(payload).unwrap();
        assert_eq!(Some(case), demo.input.validate().ok());
    }

    #[test]
    fn non_patient_resource_is_rejected() {
        let observation = json!({ "resourceType": "Observation" });
        assert!(matches!(
            evaluate_resource_value(&observation, &RuleConfig::default()),
            Err(FhirError::UnexpectedResource(kind)) if kind == "Observation"
        ));
    }

    #[test]
    fn demo_patient_round_trips_through_extension() {
        let config = RuleConfig::default();
        for demo in demo_cases() {
            let patient = build_demo_patient(demo.title, "other", &demo.input).unwrap();
            let evaluation = evaluate_patient(&patient, &config).unwrap();
            assert_eq!(evaluation.decision.outcome_label(), demo.expected, "{}", demo.title);
            let name = format!("{} Demo", demo.title);
            assert_eq!(extract_patient_name(&patient), Some(name));
        }
    }
}
