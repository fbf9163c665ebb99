//! Local classifier evaluated from a model artifact on disk
//!
//! The artifact is a JSON file carrying model metadata, the feature
//! layout (numeric columns with a scale divisor, categorical columns
//! with their level encoding) and per-class linear weights. Prediction
//! is a softmax over the class scores. When no artifact is available a
//! built-in default model is used so the application stays usable.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::{ClassProbabilities, CreditScore, ModelSummary, PredictionOutcome};

use super::error::ServiceError;
use super::traits::PredictionService;
use super::types::PredictionRequest;

/// One input column of the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Categorical levels in encoding order; empty for numeric columns
    #[serde(default)]
    pub levels: Vec<String>,
    /// Divisor applied to numeric columns before scoring
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

/// Pre-trained linear model stored as a JSON artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub accuracy: f64,
    pub target_classes: Vec<String>,
    pub features: Vec<FeatureSpec>,
    /// Per-class intercepts
    pub bias: Vec<f64>,
    /// Per-class weight rows, one weight per feature
    pub weights: Vec<Vec<f64>>,
}

impl ModelArtifact {
    /// Check the artifact is internally consistent
    pub fn validate(&self) -> Result<()> {
        let classes = self.target_classes.len();
        if classes == 0 {
            bail!("artifact declares no target classes");
        }
        for label in ["Poor", "Standard", "Good"] {
            if !self.target_classes.iter().any(|c| c == label) {
                bail!("artifact is missing target class {label}");
            }
        }
        if self.bias.len() != classes {
            bail!(
                "artifact has {} bias terms for {} classes",
                self.bias.len(),
                classes
            );
        }
        if self.weights.len() != classes {
            bail!(
                "artifact has {} weight rows for {} classes",
                self.weights.len(),
                classes
            );
        }
        for (index, row) in self.weights.iter().enumerate() {
            if row.len() != self.features.len() {
                bail!(
                    "weight row {index} has {} entries for {} features",
                    row.len(),
                    self.features.len()
                );
            }
        }
        if let Some(feature) = self.features.iter().find(|f| f.scale == 0.0) {
            bail!("feature {} has a zero scale", feature.name);
        }
        Ok(())
    }
}

/// Prediction collaborator backed by a local model
pub struct LocalClassifier {
    artifact: ModelArtifact,
}

impl LocalClassifier {
    /// Load a model artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse model artifact {}", path.display()))?;
        artifact.validate()?;
        tracing::info!(
            model = %artifact.name,
            version = %artifact.version,
            "model artifact loaded"
        );
        Ok(Self { artifact })
    }

    /// Load from disk, falling back to the built-in default model when
    /// the path is absent or unreadable
    pub fn load_or_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|err| {
                tracing::warn!("using built-in model: {err:#}");
                Self::fallback()
            }),
            None => Self::fallback(),
        }
    }

    /// The built-in default model
    pub fn fallback() -> Self {
        Self {
            artifact: builtin_artifact(),
        }
    }

    #[allow(dead_code)]
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    // Encode the request into the artifact's feature layout. Categorical
    // levels the model never saw encode to 0.
    fn feature_vector(&self, request: &PredictionRequest) -> Vec<f64> {
        self.artifact
            .features
            .iter()
            .map(|feature| {
                if feature.levels.is_empty() {
                    numeric_value(request, &feature.name).unwrap_or(0.0) / feature.scale
                } else {
                    categorical_value(request, &feature.name)
                        .and_then(|value| feature.levels.iter().position(|l| l == value))
                        .unwrap_or(0) as f64
                }
            })
            .collect()
    }

    fn class_scores(&self, inputs: &[f64]) -> Vec<f64> {
        self.artifact
            .weights
            .iter()
            .zip(&self.artifact.bias)
            .map(|(row, bias)| {
                bias + row
                    .iter()
                    .zip(inputs)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
            })
            .collect()
    }
}

#[async_trait]
impl PredictionService for LocalClassifier {
    async fn classify(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionOutcome, ServiceError> {
        let inputs = self.feature_vector(&request);
        let probabilities = softmax(&self.class_scores(&inputs));

        let (code, _) = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| ServiceError::Upstream("model produced no scores".to_string()))?;

        let label = &self.artifact.target_classes[code];
        let score = CreditScore::from_label(label)
            .ok_or_else(|| ServiceError::Upstream(format!("model produced unknown class {label}")))?;

        let prob = |label: &str| -> f64 {
            self.artifact
                .target_classes
                .iter()
                .position(|c| c == label)
                .map(|index| probabilities[index])
                .unwrap_or(0.0)
        };

        Ok(PredictionOutcome {
            score,
            prediction_code: code as i32,
            probabilities: ClassProbabilities {
                poor: prob("Poor"),
                standard: prob("Standard"),
                good: prob("Good"),
            },
            timestamp: Utc::now(),
        })
    }

    async fn describe_model(&self) -> Result<ModelSummary, ServiceError> {
        Ok(ModelSummary {
            name: self.artifact.name.clone(),
            version: self.artifact.version.clone(),
            accuracy: self.artifact.accuracy,
            feature_count: self.artifact.features.len(),
            target_classes: self.artifact.target_classes.clone(),
        })
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn numeric_value(request: &PredictionRequest, name: &str) -> Option<f64> {
    match name {
        "age" => Some(request.age as f64),
        "annual_income" => Some(request.annual_income),
        "monthly_salary" => Some(request.monthly_salary),
        "num_bank_accounts" => Some(request.num_bank_accounts as f64),
        "num_credit_cards" => Some(request.num_credit_cards as f64),
        "interest_rate" => Some(request.interest_rate),
        "num_loans" => Some(request.num_loans as f64),
        "delay_from_due_date" => Some(request.delay_from_due_date as f64),
        "num_delayed_payments" => Some(request.num_delayed_payments as f64),
        "credit_utilization_ratio" => Some(request.credit_utilization_ratio),
        "credit_history_age" => Some(request.credit_history_age as f64),
        "outstanding_debt" => Some(request.outstanding_debt),
        "total_emi_per_month" => Some(request.total_emi_per_month),
        "amount_invested_monthly" => Some(request.amount_invested_monthly),
        "monthly_balance" => Some(request.monthly_balance),
        _ => None,
    }
}

fn categorical_value<'a>(request: &'a PredictionRequest, name: &str) -> Option<&'a str> {
    match name {
        "occupation" => Some(&request.occupation),
        "credit_mix" => Some(&request.credit_mix),
        "payment_of_min_amount" => Some(&request.payment_of_min_amount),
        "payment_behaviour" => Some(&request.payment_behaviour),
        _ => None,
    }
}

fn builtin_artifact() -> ModelArtifact {
    let numeric = |name: &str, scale: f64| FeatureSpec {
        name: name.to_string(),
        levels: Vec::new(),
        scale,
    };
    let categorical = |name: &str, levels: &[&str]| FeatureSpec {
        name: name.to_string(),
        levels: levels.iter().map(|l| l.to_string()).collect(),
        scale: 1.0,
    };

    ModelArtifact {
        name: "builtin-logistic".to_string(),
        version: "0.1.0".to_string(),
        accuracy: 0.85,
        target_classes: vec![
            "Poor".to_string(),
            "Standard".to_string(),
            "Good".to_string(),
        ],
        features: vec![
            numeric("credit_utilization_ratio", 100.0),
            numeric("num_delayed_payments", 50.0),
            numeric("delay_from_due_date", 365.0),
            numeric("credit_history_age", 600.0),
            numeric("annual_income", 200_000.0),
            numeric("outstanding_debt", 100_000.0),
            categorical("credit_mix", &["Good", "Standard", "Bad"]),
            categorical("payment_of_min_amount", &["Yes", "No"]),
        ],
        bias: vec![-0.5, 0.5, -0.2],
        weights: vec![
            vec![2.0, 2.5, 1.5, -1.5, -1.0, 1.5, 0.8, 0.5],
            vec![0.3, 0.2, 0.3, 0.2, 0.2, 0.3, 0.1, 0.1],
            vec![-2.0, -2.2, -1.5, 2.0, 1.5, -1.2, -0.9, -0.4],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn request() -> PredictionRequest {
        PredictionRequest {
            age: 30,
            occupation: "Engineer".to_string(),
            annual_income: 50_000.0,
            monthly_salary: 4_000.0,
            num_bank_accounts: 2,
            num_credit_cards: 3,
            interest_rate: 12.5,
            num_loans: 1,
            delay_from_due_date: 5,
            num_delayed_payments: 2,
            credit_utilization_ratio: 30.5,
            credit_history_age: 120,
            outstanding_debt: 15_000.0,
            total_emi_per_month: 800.0,
            amount_invested_monthly: 500.0,
            monthly_balance: 1_200.0,
            credit_mix: "Standard".to_string(),
            payment_of_min_amount: "Yes".to_string(),
            payment_behaviour: "Low_spent_Small_value_payments".to_string(),
        }
    }

    fn strong_request() -> PredictionRequest {
        PredictionRequest {
            credit_utilization_ratio: 5.0,
            num_delayed_payments: 0,
            delay_from_due_date: 0,
            credit_history_age: 500,
            annual_income: 150_000.0,
            outstanding_debt: 2_000.0,
            credit_mix: "Good".to_string(),
            payment_of_min_amount: "Yes".to_string(),
            ..request()
        }
    }

    fn weak_request() -> PredictionRequest {
        PredictionRequest {
            credit_utilization_ratio: 95.0,
            num_delayed_payments: 45,
            delay_from_due_date: 300,
            credit_history_age: 6,
            annual_income: 10_000.0,
            outstanding_debt: 90_000.0,
            credit_mix: "Bad".to_string(),
            payment_of_min_amount: "No".to_string(),
            ..request()
        }
    }

    #[tokio::test]
    async fn test_probabilities_form_a_distribution() {
        let classifier = LocalClassifier::fallback();
        let outcome = classifier.classify(request()).await.unwrap();
        let probs = outcome.probabilities;
        for p in [probs.poor, probs.standard, probs.good] {
            assert!((0.0..=1.0).contains(&p));
        }
        assert!((probs.sum() - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_strong_profile_scores_good() {
        let classifier = LocalClassifier::fallback();
        let outcome = classifier.classify(strong_request()).await.unwrap();
        assert_eq!(outcome.score, CreditScore::Good);
        assert!(outcome.probabilities.good > outcome.probabilities.poor);
    }

    #[tokio::test]
    async fn test_weak_profile_scores_poor() {
        let classifier = LocalClassifier::fallback();
        let outcome = classifier.classify(weak_request()).await.unwrap();
        assert_eq!(outcome.score, CreditScore::Poor);
        assert!(outcome.probabilities.poor > outcome.probabilities.good);
    }

    #[tokio::test]
    async fn test_prediction_code_indexes_target_classes() {
        let classifier = LocalClassifier::fallback();
        let outcome = classifier.classify(strong_request()).await.unwrap();
        let label = &classifier.artifact().target_classes[outcome.prediction_code as usize];
        assert_eq!(label, outcome.score.as_str());
    }

    #[tokio::test]
    async fn test_unseen_category_encodes_to_zero() {
        let classifier = LocalClassifier::fallback();
        let mut unseen = strong_request();
        unseen.credit_mix = "Unheard-of".to_string();
        let mut baseline = strong_request();
        baseline.credit_mix = "Good".to_string();
        // "Good" is level 0, so an unseen level scores identically.
        let a = classifier.classify(unseen).await.unwrap();
        let b = classifier.classify(baseline).await.unwrap();
        assert_eq!(a.probabilities, b.probabilities);
    }

    #[tokio::test]
    async fn test_describe_model_reports_artifact_metadata() {
        let classifier = LocalClassifier::fallback();
        let summary = classifier.describe_model().await.unwrap();
        assert_eq!(summary.name, "builtin-logistic");
        assert_eq!(summary.feature_count, 8);
        assert_eq!(summary.accuracy, 0.85);
        assert_eq!(
            summary.target_classes,
            vec!["Poor", "Standard", "Good"]
        );
    }

    #[test]
    fn test_load_reads_artifact_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = builtin_artifact();
        fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();
        let classifier = LocalClassifier::load(&path).unwrap();
        assert_eq!(classifier.artifact().name, artifact.name);
    }

    #[test]
    fn test_load_or_fallback_uses_builtin_when_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let classifier = LocalClassifier::load_or_fallback(Some(missing.as_path()));
        assert_eq!(classifier.artifact().name, "builtin-logistic");
    }

    #[test]
    fn test_validate_rejects_ragged_weights() {
        let mut artifact = builtin_artifact();
        artifact.weights[1].pop();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_validate_requires_all_three_classes() {
        let mut artifact = builtin_artifact();
        artifact.target_classes[2] = "Excellent".to_string();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn test_softmax_is_stable_for_large_scores() {
        let probs = softmax(&[1000.0, 1001.0, 999.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
