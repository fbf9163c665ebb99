//! Wire types for the prediction endpoint
//!
//! The request is the flat 19-key mapping the endpoint expects; the
//! response mirrors its JSON envelope. Conversions to the domain types
//! in `crate::state` live here so the rest of the application never
//! handles raw wire data.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{
    ApplicationForm, ClassProbabilities, CreditScore, ModelSummary, PredictionOutcome,
};

use super::error::ServiceError;

/// Applicant feature vector sent to the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: i64,
    pub occupation: String,
    pub annual_income: f64,
    pub monthly_salary: f64,
    pub num_bank_accounts: i64,
    pub num_credit_cards: i64,
    pub interest_rate: f64,
    pub num_loans: i64,
    pub delay_from_due_date: i64,
    pub num_delayed_payments: i64,
    pub credit_utilization_ratio: f64,
    pub credit_history_age: i64,
    pub outstanding_debt: f64,
    pub total_emi_per_month: f64,
    pub amount_invested_monthly: f64,
    pub monthly_balance: f64,
    pub credit_mix: String,
    pub payment_of_min_amount: String,
    pub payment_behaviour: String,
}

impl PredictionRequest {
    /// Build the request from a fully validated form.
    ///
    /// Callers run `validate_all` first, so a value that fails to parse
    /// here is a defect in the field catalog rather than user input.
    pub fn from_form(form: &ApplicationForm) -> Result<Self> {
        let text = |name: &str| -> Result<String> {
            form.field(name)
                .map(|f| f.raw_value.trim().to_string())
                .ok_or_else(|| anyhow!("form has no field named {name}"))
        };
        let number = |name: &str| -> Result<f64> {
            text(name)?
                .parse::<f64>()
                .with_context(|| format!("field {name} is not a number"))
        };
        let integer = |name: &str| -> Result<i64> {
            let value = number(name)?;
            debug_assert!(value.fract() == 0.0, "field {name} validated as integer");
            Ok(value as i64)
        };

        Ok(Self {
            age: integer("age")?,
            occupation: text("occupation")?,
            annual_income: number("annual_income")?,
            monthly_salary: number("monthly_salary")?,
            num_bank_accounts: integer("num_bank_accounts")?,
            num_credit_cards: integer("num_credit_cards")?,
            interest_rate: number("interest_rate")?,
            num_loans: integer("num_loans")?,
            delay_from_due_date: integer("delay_from_due_date")?,
            num_delayed_payments: integer("num_delayed_payments")?,
            credit_utilization_ratio: number("credit_utilization_ratio")?,
            credit_history_age: integer("credit_history_age")?,
            outstanding_debt: number("outstanding_debt")?,
            total_emi_per_month: number("total_emi_per_month")?,
            amount_invested_monthly: number("amount_invested_monthly")?,
            monthly_balance: number("monthly_balance")?,
            credit_mix: text("credit_mix")?,
            payment_of_min_amount: text("payment_of_min_amount")?,
            payment_behaviour: text("payment_behaviour")?,
        })
    }
}

/// JSON envelope returned by the prediction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PredictionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Classification payload inside a successful envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub prediction_code: i32,
    pub probabilities: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResponse {
    /// Interpret the envelope: a classification, an upstream failure, or
    /// a body that does not satisfy the contract.
    pub fn into_outcome(self) -> Result<PredictionOutcome, ServiceError> {
        if !self.success {
            let message = self
                .error
                .unwrap_or_else(|| "prediction service reported an unspecified error".to_string());
            return Err(ServiceError::Upstream(message));
        }

        let result = self.result.ok_or_else(|| {
            ServiceError::MalformedResponse("successful envelope without a result".to_string())
        })?;

        let score = CreditScore::from_label(&result.prediction).ok_or_else(|| {
            ServiceError::MalformedResponse(format!("unknown class {:?}", result.prediction))
        })?;

        let prob = |label: &str| -> Result<f64, ServiceError> {
            result.probabilities.get(label).copied().ok_or_else(|| {
                ServiceError::MalformedResponse(format!("missing probability for {label}"))
            })
        };

        Ok(PredictionOutcome {
            score,
            prediction_code: result.prediction_code,
            probabilities: ClassProbabilities {
                poor: prob("Poor")?,
                standard: prob("Standard")?,
                good: prob("Good")?,
            },
            timestamp: result.timestamp,
        })
    }
}

/// Read-only model metadata returned by the model-info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub name: String,
    pub version: String,
    pub accuracy: f64,
    pub feature_count: usize,
    pub target_classes: Vec<String>,
}

impl From<ModelInfoResponse> for ModelSummary {
    fn from(info: ModelInfoResponse) -> Self {
        Self {
            name: info.name,
            version: info.version,
            accuracy: info.accuracy,
            feature_count: info.feature_count,
            target_classes: info.target_classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled_form() -> ApplicationForm {
        let mut form = ApplicationForm::new();
        let values: &[(&str, &str)] = &[
            ("age", "30"),
            ("occupation", "Engineer"),
            ("annual_income", "50000"),
            ("monthly_salary", "4000"),
            ("num_bank_accounts", "2"),
            ("num_credit_cards", "3"),
            ("monthly_balance", "1200"),
            ("interest_rate", "12.5"),
            ("num_loans", "1"),
            ("credit_utilization_ratio", "30.5"),
            ("credit_history_age", "120"),
            ("outstanding_debt", "15000"),
            ("credit_mix", "Standard"),
            ("delay_from_due_date", "5"),
            ("num_delayed_payments", "2"),
            ("total_emi_per_month", "800"),
            ("amount_invested_monthly", "500"),
            ("payment_of_min_amount", "Yes"),
            ("payment_behaviour", "Low_spent_Small_value_payments"),
        ];
        for (name, value) in values {
            form.field_mut(name).unwrap().set_raw(value);
        }
        form
    }

    fn sample_result() -> PredictionResult {
        let mut probabilities = BTreeMap::new();
        probabilities.insert("Poor".to_string(), 0.1);
        probabilities.insert("Standard".to_string(), 0.6);
        probabilities.insert("Good".to_string(), 0.3);
        PredictionResult {
            prediction: "Standard".to_string(),
            prediction_code: 1,
            probabilities,
            timestamp: Utc::now(),
        }
    }

    mod request_assembly {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_from_form_maps_every_field() {
            let request = PredictionRequest::from_form(&filled_form()).unwrap();
            assert_eq!(request.age, 30);
            assert_eq!(request.occupation, "Engineer");
            assert_eq!(request.annual_income, 50_000.0);
            assert_eq!(request.interest_rate, 12.5);
            assert_eq!(request.credit_utilization_ratio, 30.5);
            assert_eq!(request.payment_behaviour, "Low_spent_Small_value_payments");
        }

        #[test]
        fn test_request_serializes_with_wire_keys() {
            let request = PredictionRequest::from_form(&filled_form()).unwrap();
            let json = serde_json::to_value(&request).unwrap();
            assert_eq!(json["age"], 30);
            assert_eq!(json["num_bank_accounts"], 2);
            assert_eq!(json["payment_of_min_amount"], "Yes");
            assert_eq!(json.as_object().unwrap().len(), 19);
        }
    }

    mod response_interpretation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_successful_envelope_becomes_outcome() {
            let response = PredictionResponse {
                success: true,
                result: Some(sample_result()),
                error: None,
            };
            let outcome = response.into_outcome().unwrap();
            assert_eq!(outcome.score, CreditScore::Standard);
            assert_eq!(outcome.prediction_code, 1);
            assert!((outcome.probabilities.sum() - 1.0).abs() < 1e-3);
        }

        #[test]
        fn test_failure_envelope_carries_error_verbatim() {
            let response = PredictionResponse {
                success: false,
                result: None,
                error: Some("Model not loaded".to_string()),
            };
            match response.into_outcome() {
                Err(ServiceError::Upstream(message)) => assert_eq!(message, "Model not loaded"),
                other => panic!("expected upstream error, got {other:?}"),
            }
        }

        #[test]
        fn test_success_without_result_is_malformed() {
            let response = PredictionResponse {
                success: true,
                result: None,
                error: None,
            };
            assert!(matches!(
                response.into_outcome(),
                Err(ServiceError::MalformedResponse(_))
            ));
        }

        #[test]
        fn test_unknown_class_is_malformed() {
            let mut result = sample_result();
            result.prediction = "Excellent".to_string();
            let response = PredictionResponse {
                success: true,
                result: Some(result),
                error: None,
            };
            assert!(matches!(
                response.into_outcome(),
                Err(ServiceError::MalformedResponse(_))
            ));
        }

        #[test]
        fn test_missing_probability_is_malformed() {
            let mut result = sample_result();
            result.probabilities.remove("Good");
            let response = PredictionResponse {
                success: true,
                result: Some(result),
                error: None,
            };
            assert!(matches!(
                response.into_outcome(),
                Err(ServiceError::MalformedResponse(_))
            ));
        }

        #[test]
        fn test_envelope_round_trips_through_json() {
            let response = PredictionResponse {
                success: true,
                result: Some(sample_result()),
                error: None,
            };
            let json = serde_json::to_string(&response).unwrap();
            let parsed: PredictionResponse = serde_json::from_str(&json).unwrap();
            assert!(parsed.success);
            assert_eq!(parsed.result.unwrap().prediction, "Standard");
        }
    }
}
