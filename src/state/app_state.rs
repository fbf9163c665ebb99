//! Application state definitions

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::forms::ApplicationForm;

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// The multi-step application form
    #[default]
    Form,
    /// Classification result for the submitted application
    Result,
    /// Read-only model metadata
    ModelInfo,
}

/// Credit score classes produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditScore {
    Poor,
    Standard,
    Good,
}

impl CreditScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Standard => "Standard",
            Self::Good => "Good",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Poor" => Some(Self::Poor),
            "Standard" => Some(Self::Standard),
            "Good" => Some(Self::Good),
            _ => None,
        }
    }
}

/// Per-class probability distribution over the three score classes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub poor: f64,
    pub standard: f64,
    pub good: f64,
}

impl ClassProbabilities {
    pub fn get(&self, score: CreditScore) -> f64 {
        match score {
            CreditScore::Poor => self.poor,
            CreditScore::Standard => self.standard,
            CreditScore::Good => self.good,
        }
    }

    #[allow(dead_code)]
    pub fn sum(&self) -> f64 {
        self.poor + self.standard + self.good
    }
}

/// A classification returned by the prediction collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub score: CreditScore,
    pub prediction_code: i32,
    pub probabilities: ClassProbabilities,
    pub timestamp: DateTime<Utc>,
}

/// Model metadata, for display only
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub name: String,
    pub version: String,
    pub accuracy: f64,
    pub feature_count: usize,
    pub target_classes: Vec<String>,
}

/// Severity of a status notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A human-readable message surfaced in the status area
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,

    // The in-progress application
    pub form: ApplicationForm,

    // Submission lifecycle; true only between submit-initiated and
    // submit-resolved
    pub is_submitting: bool,

    // Latest classification and model metadata
    pub last_result: Option<PredictionOutcome>,
    pub model_info: Option<ModelSummary>,

    // Status area
    pub notice: Option<Notice>,

    // Set on edits; the event loop flushes the draft once this has been
    // quiet for the debounce window
    pub dirty_since: Option<Instant>,
}

impl AppState {
    /// Surface an informational notice
    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    /// Surface an error notice
    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    /// Record that the form changed and a draft write is pending
    pub fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    /// Take the pending-draft marker, if any
    #[allow(dead_code)]
    pub fn clear_dirty(&mut self) -> bool {
        self.dirty_since.take().is_some()
    }

    /// Reset to a fresh form session (after a successful submission)
    pub fn start_new_session(&mut self) {
        self.form = ApplicationForm::new();
        self.current_view = View::Form;
        self.notice = None;
        self.dirty_since = None;
    }
}
