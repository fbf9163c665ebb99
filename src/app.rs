//! Application state and core logic

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::TuiConfig;
use crate::service::{
    HttpPredictionClient, LocalClassifier, PredictionRequest, PredictionService, ServiceError,
};
use crate::snapshot::SnapshotStore;
use crate::state::{AdvanceOutcome, AppState, View};

/// Quiet period after the last edit before the draft is written
pub const DRAFT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Outcome of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The collaborator returned a classification
    Accepted,
    /// A field failed local validation; no request was sent
    RejectedValidation,
    /// The request was sent but did not produce a classification
    RejectedTransport,
    /// A submission is already in flight; this attempt was a no-op
    AlreadyInFlight,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Prediction collaborator (remote endpoint or local model)
    service: Box<dyn PredictionService>,
    /// Draft store for the in-progress form
    snapshots: SnapshotStore,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance
    pub async fn new() -> Result<Self> {
        let config = TuiConfig::load().unwrap_or_default();

        let endpoint = match std::env::var("CREDIT_TUI_ENDPOINT") {
            Ok(_) => Some(HttpPredictionClient::resolve_address(None)),
            Err(_) => config.endpoint.clone(),
        };
        let service: Box<dyn PredictionService> = match endpoint {
            Some(address) => Box::new(HttpPredictionClient::new(&address)?),
            None => Box::new(LocalClassifier::load_or_fallback(
                config.model_path.as_deref(),
            )),
        };

        let mut app = Self::with_parts(service, SnapshotStore::new());
        app.refresh_model_info().await;
        Ok(app)
    }

    /// Assemble an App from explicit collaborators (used directly by tests)
    pub fn with_parts(service: Box<dyn PredictionService>, snapshots: SnapshotStore) -> Self {
        let mut app = Self {
            state: AppState::default(),
            service,
            snapshots,
            quit: false,
        };
        app.restore_draft();
        app
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Fetch model metadata for the info view; absence is not an error
    pub async fn refresh_model_info(&mut self) {
        match self.service.describe_model().await {
            Ok(info) => self.state.model_info = Some(info),
            Err(err) => tracing::warn!("model info unavailable: {err}"),
        }
    }

    // Runs once at session start: a saved draft pre-populates matching
    // fields and surfaces a one-time notice.
    fn restore_draft(&mut self) {
        if let Some(snapshot) = self.snapshots.load() {
            let restored = self.state.form.restore(&snapshot.values);
            if restored > 0 {
                self.state
                    .notify_info("Previous form data has been restored.");
            }
        }
    }

    /// Write the draft now and drop the pending-edit marker
    pub fn save_draft(&mut self) {
        self.state.dirty_since = None;
        self.snapshots.save(&self.state.form.values());
    }

    /// Write the draft if edits have been quiet for the debounce window
    pub fn flush_draft_if_quiet(&mut self) {
        if let Some(since) = self.state.dirty_since {
            if since.elapsed() >= DRAFT_DEBOUNCE {
                self.save_draft();
            }
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // All controls are disabled while a submission is in flight.
        if self.state.is_submitting {
            return Ok(());
        }

        match self.state.current_view {
            View::Form => self.handle_form_key(key).await?,
            View::Result => self.handle_result_key(key),
            View::ModelInfo => self.handle_model_info_key(key),
        }
        Ok(())
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        // Ctrl+S saves the draft immediately, skipping the debounce.
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.save_draft();
            self.state.notify_info("Draft saved.");
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => self.state.form.next_position(),
            KeyCode::BackTab => self.state.form.prev_position(),
            KeyCode::F(1) => self.show_model_info().await,
            _ if self.state.form.on_buttons_row() => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.state.form.prev_button(),
                KeyCode::Right | KeyCode::Char('l') => self.state.form.next_button(),
                KeyCode::Enter => self.activate_button().await,
                _ => {}
            },
            KeyCode::Enter => self.state.form.next_position(),
            KeyCode::Up => {
                if let Some(field) = self.state.form.active_field_mut() {
                    if !field.is_editable() {
                        field.cycle_prev();
                        self.state.mark_dirty();
                    }
                }
            }
            KeyCode::Down => {
                if let Some(field) = self.state.form.active_field_mut() {
                    if !field.is_editable() {
                        field.cycle_next();
                        self.state.mark_dirty();
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.state.form.active_field_mut() {
                    field.pop_char();
                    self.state.mark_dirty();
                }
            }
            KeyCode::Delete => {
                if let Some(field) = self.state.form.active_field_mut() {
                    field.clear();
                    self.state.mark_dirty();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.state.form.active_field_mut() {
                    if field.is_editable() {
                        field.push_char(c);
                        self.state.mark_dirty();
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => self.state.start_new_session(),
            KeyCode::Char('m') => self.state.current_view = View::ModelInfo,
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            _ => {}
        }
    }

    fn handle_model_info_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => {
                self.state.current_view = if self.state.last_result.is_some() {
                    View::Result
                } else {
                    View::Form
                };
            }
            _ => {}
        }
    }

    async fn show_model_info(&mut self) {
        if self.state.model_info.is_none() {
            self.refresh_model_info().await;
        }
        self.state.current_view = View::ModelInfo;
    }

    async fn activate_button(&mut self) {
        match self.state.form.selected_button {
            0 => self.retreat_step(),
            _ => {
                if self.state.form.is_last_step() {
                    self.submit().await;
                } else {
                    self.advance_step();
                }
            }
        }
    }

    /// Try to move the wizard forward one step
    pub fn advance_step(&mut self) {
        match self.state.form.advance() {
            AdvanceOutcome::Advanced => {
                let announcement = self.state.form.announcement();
                self.state.notify_info(announcement);
            }
            AdvanceOutcome::Rejected { invalid_count } => {
                self.state
                    .notify_error(aggregate_message(invalid_count, "continuing"));
            }
            AdvanceOutcome::AtLastStep => {}
        }
    }

    /// Move the wizard back one step
    pub fn retreat_step(&mut self) {
        if self.state.form.retreat() {
            let announcement = self.state.form.announcement();
            self.state.notify_info(announcement);
        }
    }

    /// Submit the application for classification.
    ///
    /// Re-validates every step first: a restored draft can land the user
    /// on the last step with stale earlier steps. At most one submission
    /// is in flight; the guard is released on every path out.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state.is_submitting {
            return SubmitOutcome::AlreadyInFlight;
        }

        let validation = self.state.form.validate_all();
        if !validation.is_clean() {
            if let Some(step) = validation.first_invalid_step {
                self.state.form.go_to_step(step);
            }
            self.state
                .notify_error(aggregate_message(validation.invalid_count, "submitting"));
            return SubmitOutcome::RejectedValidation;
        }

        let request = match PredictionRequest::from_form(&self.state.form) {
            Ok(request) => request,
            Err(err) => {
                // A validated form that fails to serialize is a catalog
                // defect, not a user error.
                debug_assert!(false, "validated form failed to serialize: {err:#}");
                tracing::error!("request assembly failed: {err:#}");
                self.state
                    .notify_error("Could not assemble the prediction request.");
                return SubmitOutcome::RejectedValidation;
            }
        };

        self.state.is_submitting = true;
        let response = self.service.classify(request).await;

        let outcome = match response {
            Ok(prediction) => {
                // Only a confirmed success clears the draft.
                self.snapshots.clear();
                self.state.dirty_since = None;
                self.state.last_result = Some(prediction);
                self.state.current_view = View::Result;
                self.state.notice = None;
                SubmitOutcome::Accepted
            }
            Err(err) => {
                // Form data and the draft stay intact for a retry. An
                // upstream error string is shown verbatim.
                let message = match &err {
                    ServiceError::Upstream(message) => message.clone(),
                    other => other.to_string(),
                };
                self.state.notify_error(message);
                SubmitOutcome::RejectedTransport
            }
        };
        self.state.is_submitting = false;
        outcome
    }
}

fn aggregate_message(invalid_count: usize, action: &str) -> String {
    if invalid_count == 1 {
        format!("1 field needs attention before {action}.")
    } else {
        format!("{invalid_count} fields need attention before {action}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockPredictionService;
    use crate::state::{
        ClassProbabilities, CreditScore, ModelSummary, NoticeLevel, PredictionOutcome,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_outcome() -> PredictionOutcome {
        PredictionOutcome {
            score: CreditScore::Good,
            prediction_code: 2,
            probabilities: ClassProbabilities {
                poor: 0.1,
                standard: 0.2,
                good: 0.7,
            },
            timestamp: Utc::now(),
        }
    }

    fn sample_summary() -> ModelSummary {
        ModelSummary {
            name: "test-model".to_string(),
            version: "1.0".to_string(),
            accuracy: 0.9,
            feature_count: 8,
            target_classes: vec![
                "Poor".to_string(),
                "Standard".to_string(),
                "Good".to_string(),
            ],
        }
    }

    fn app_with(mock: MockPredictionService, store: SnapshotStore) -> App {
        App::with_parts(Box::new(mock), store)
    }

    fn temp_store() -> (TempDir, SnapshotStore) {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::with_path(dir.path().join("draft.json"));
        (dir, store)
    }

    fn fill_form(app: &mut App) {
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
            app.state.form.field_mut(name).unwrap().set_raw(value);
        }
    }

    mod submission {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_successful_submission_clears_draft_and_shows_result() {
            let mut mock = MockPredictionService::new();
            mock.expect_classify()
                .times(1)
                .returning(|_| Ok(sample_outcome()));
            let (_dir, store) = temp_store();
            let probe = SnapshotStore::with_path(_dir.path().join("draft.json"));

            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.save_draft();
            assert!(probe.load().is_some());

            let outcome = app.submit().await;
            assert_eq!(outcome, SubmitOutcome::Accepted);
            assert_eq!(app.state.current_view, View::Result);
            assert_eq!(
                app.state.last_result.as_ref().unwrap().score,
                CreditScore::Good
            );
            assert!(!app.state.is_submitting);
            // Draft removed only after a confirmed success.
            assert!(probe.load().is_none());
        }

        #[tokio::test]
        async fn test_transport_failure_keeps_data_and_draft() {
            let mut mock = MockPredictionService::new();
            mock.expect_classify()
                .times(1)
                .returning(|_| Err(ServiceError::Transport("connection refused".to_string())));
            let (_dir, store) = temp_store();
            let probe = SnapshotStore::with_path(_dir.path().join("draft.json"));

            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.save_draft();

            let outcome = app.submit().await;
            assert_eq!(outcome, SubmitOutcome::RejectedTransport);
            assert_eq!(app.state.current_view, View::Form);
            assert!(!app.state.is_submitting);
            // Entered values and the saved draft both survive.
            assert_eq!(app.state.form.field("age").unwrap().raw_value, "30");
            assert!(probe.load().is_some());
            let notice = app.state.notice.as_ref().unwrap();
            assert_eq!(notice.level, NoticeLevel::Error);
        }

        #[tokio::test]
        async fn test_upstream_error_string_is_shown_verbatim() {
            let mut mock = MockPredictionService::new();
            mock.expect_classify()
                .times(1)
                .returning(|_| Err(ServiceError::Upstream("Model not loaded".to_string())));
            let (_dir, store) = temp_store();

            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.submit().await;
            assert_eq!(app.state.notice.as_ref().unwrap().text, "Model not loaded");
        }

        #[tokio::test]
        async fn test_submission_revalidates_every_step() {
            // age on step 1 is invalid while the user sits on step 4.
            let mut mock = MockPredictionService::new();
            mock.expect_classify().times(0);
            let (_dir, store) = temp_store();

            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.state.form.field_mut("age").unwrap().set_raw("15");
            app.state.form.go_to_step(4);

            let outcome = app.submit().await;
            assert_eq!(outcome, SubmitOutcome::RejectedValidation);
            // Navigated back to the first step containing an invalid field.
            assert_eq!(app.state.form.current_step(), 1);
            assert_eq!(app.state.form.active_field_name(), Some("age"));
            let notice = app.state.notice.as_ref().unwrap();
            assert_eq!(notice.level, NoticeLevel::Error);
            assert!(notice.text.contains("1 field"));
        }

        #[tokio::test]
        async fn test_second_submission_while_in_flight_is_noop() {
            let mut mock = MockPredictionService::new();
            mock.expect_classify().times(0);
            let (_dir, store) = temp_store();

            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.state.is_submitting = true;

            let outcome = app.submit().await;
            assert_eq!(outcome, SubmitOutcome::AlreadyInFlight);
        }

        #[tokio::test]
        async fn test_keys_are_ignored_while_submitting() {
            let mock = MockPredictionService::new();
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);
            app.state.is_submitting = true;

            app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE))
                .await
                .unwrap();
            assert_eq!(app.state.form.field("age").unwrap().raw_value, "");
        }
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_advance_announces_the_new_step() {
            let mock = MockPredictionService::new();
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);
            fill_form(&mut app);

            app.advance_step();
            let notice = app.state.notice.clone().unwrap();
            assert_eq!(notice.level, NoticeLevel::Info);
            assert_eq!(notice.text, "Step 2 of 4: Financial");
        }

        #[tokio::test]
        async fn test_rejected_advance_counts_failing_fields() {
            let mock = MockPredictionService::new();
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);

            app.advance_step();
            let notice = app.state.notice.clone().unwrap();
            assert_eq!(notice.level, NoticeLevel::Error);
            assert_eq!(notice.text, "2 fields need attention before continuing.");
        }

        #[tokio::test]
        async fn test_typing_marks_the_draft_dirty() {
            let mock = MockPredictionService::new();
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);

            app.handle_key(KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE))
                .await
                .unwrap();
            assert_eq!(app.state.form.field("age").unwrap().raw_value, "3");
            assert!(app.state.dirty_since.is_some());
        }

        #[tokio::test]
        async fn test_new_session_from_result_view() {
            let mut mock = MockPredictionService::new();
            mock.expect_classify()
                .times(1)
                .returning(|_| Ok(sample_outcome()));
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);
            fill_form(&mut app);
            app.submit().await;
            assert_eq!(app.state.current_view, View::Result);

            app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE))
                .await
                .unwrap();
            assert_eq!(app.state.current_view, View::Form);
            assert_eq!(app.state.form.field("age").unwrap().raw_value, "");
            assert_eq!(app.state.form.current_step(), 1);
        }
    }

    mod draft_restore {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_saved_draft_is_restored_with_notice() {
            let (_dir, store) = temp_store();
            {
                let mock = MockPredictionService::new();
                let mut app = app_with(mock, store);
                fill_form(&mut app);
                app.save_draft();
            }

            let store = SnapshotStore::with_path(_dir.path().join("draft.json"));
            let mock = MockPredictionService::new();
            let app = app_with(mock, store);
            assert_eq!(app.state.form.field("age").unwrap().raw_value, "30");
            assert_eq!(
                app.state.notice.as_ref().unwrap().text,
                "Previous form data has been restored."
            );
        }

        #[tokio::test]
        async fn test_fresh_session_has_no_restore_notice() {
            let (_dir, store) = temp_store();
            let mock = MockPredictionService::new();
            let app = app_with(mock, store);
            assert!(app.state.notice.is_none());
        }

        #[tokio::test]
        async fn test_flush_respects_debounce_window() {
            let (_dir, store) = temp_store();
            let probe = SnapshotStore::with_path(_dir.path().join("draft.json"));
            let mock = MockPredictionService::new();
            let mut app = app_with(mock, store);

            app.state.form.field_mut("age").unwrap().set_raw("30");
            app.state.mark_dirty();
            // Edit is too recent: nothing is written yet.
            app.flush_draft_if_quiet();
            assert!(probe.load().is_none());
            assert!(app.state.dirty_since.is_some());
        }
    }

    mod model_info {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_refresh_model_info_populates_state() {
            let mut mock = MockPredictionService::new();
            mock.expect_describe_model()
                .times(1)
                .returning(|| Ok(sample_summary()));
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);

            app.refresh_model_info().await;
            let info = app.state.model_info.as_ref().unwrap();
            assert_eq!(info.name, "test-model");
            assert_eq!(info.feature_count, 8);
        }

        #[tokio::test]
        async fn test_model_info_failure_is_not_fatal() {
            let mut mock = MockPredictionService::new();
            mock.expect_describe_model()
                .times(1)
                .returning(|| Err(ServiceError::Transport("down".to_string())));
            let (_dir, store) = temp_store();
            let mut app = app_with(mock, store);

            app.refresh_model_info().await;
            assert!(app.state.model_info.is_none());
            assert!(app.state.notice.is_none());
        }
    }
}
