//! Multi-step application form: step definitions, navigation rules and
//! whole-form validation
//!
//! The wizard owns every field of the credit application and the current
//! step. Forward navigation is gated on the current step validating
//! cleanly; backward navigation is unconditional and never touches data.

use std::collections::BTreeMap;

use super::field::{FormField, ValidationState};
use super::validation;

/// Number of wizard steps
pub const STEP_COUNT: usize = 4;

/// Occupation choices offered on the personal step
pub const OCCUPATIONS: &[&str] = &[
    "Engineer",
    "Teacher",
    "Doctor",
    "Lawyer",
    "Manager",
    "Sales",
    "Student",
    "Artist",
    "Entrepreneur",
    "Accountant",
    "Nurse",
    "Other",
];

/// Credit mix categories
pub const CREDIT_MIX: &[&str] = &["Good", "Standard", "Bad"];

/// Whether the minimum amount is usually paid
pub const PAYMENT_OF_MIN_AMOUNT: &[&str] = &["Yes", "No"];

/// Spending/payment pattern categories
pub const PAYMENT_BEHAVIOURS: &[&str] = &[
    "High_spent_Small_value_payments",
    "Low_spent_Large_value_payments",
    "High_spent_Medium_value_payments",
    "Low_spent_Medium_value_payments",
    "High_spent_Large_value_payments",
    "Low_spent_Small_value_payments",
];

/// One screen of the wizard and the fields it owns
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// 1-based step index
    pub index: usize,
    pub title: &'static str,
    pub field_names: &'static [&'static str],
}

/// Visual state of a step indicator entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepIndicator {
    Completed,
    Active,
    Upcoming,
}

/// Result of a forward navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next step
    Advanced,
    /// Current step has failing required fields; step unchanged
    Rejected { invalid_count: usize },
    /// Already on the last step; submission is the only way forward
    AtLastStep,
}

/// Aggregate result of validating the whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullValidation {
    pub invalid_count: usize,
    /// First step (1-based) containing an invalid field, if any
    pub first_invalid_step: Option<usize>,
}

impl FullValidation {
    pub fn is_clean(&self) -> bool {
        self.invalid_count == 0
    }
}

static STEPS: &[StepDefinition] = &[
    StepDefinition {
        index: 1,
        title: "Personal",
        field_names: &["age", "occupation"],
    },
    StepDefinition {
        index: 2,
        title: "Financial",
        field_names: &[
            "annual_income",
            "monthly_salary",
            "num_bank_accounts",
            "num_credit_cards",
            "monthly_balance",
        ],
    },
    StepDefinition {
        index: 3,
        title: "Credit",
        field_names: &[
            "interest_rate",
            "num_loans",
            "credit_utilization_ratio",
            "credit_history_age",
            "outstanding_debt",
            "credit_mix",
        ],
    },
    StepDefinition {
        index: 4,
        title: "Payment Behavior",
        field_names: &[
            "delay_from_due_date",
            "num_delayed_payments",
            "total_emi_per_month",
            "amount_invested_monthly",
            "payment_of_min_amount",
            "payment_behaviour",
        ],
    },
];

/// The in-progress application form session
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    fields: Vec<FormField>,
    /// 1-based current step
    current_step: usize,
    /// Position within the current step: field offsets, then the buttons row
    active_position: usize,
    /// Which button is selected when on the buttons row (0=Back, 1=Next/Submit)
    pub selected_button: usize,
}

impl ApplicationForm {
    pub fn new() -> Self {
        let fields = vec![
            FormField::integer("age", "Age", Some(18.0), Some(100.0), "e.g., 30"),
            FormField::select("occupation", "Occupation", OCCUPATIONS),
            FormField::number(
                "annual_income",
                "Annual Income ($)",
                Some(0.0),
                Some(10_000_000.0),
                "e.g., 50000",
            ),
            FormField::number(
                "monthly_salary",
                "Monthly In-hand Salary ($)",
                Some(0.0),
                Some(1_000_000.0),
                "e.g., 4000",
            ),
            FormField::integer(
                "num_bank_accounts",
                "Number of Bank Accounts",
                Some(0.0),
                Some(20.0),
                "e.g., 2",
            ),
            FormField::integer(
                "num_credit_cards",
                "Number of Credit Cards",
                Some(0.0),
                Some(20.0),
                "e.g., 3",
            ),
            FormField::number(
                "monthly_balance",
                "Monthly Balance ($)",
                Some(-100_000.0),
                Some(100_000.0),
                "e.g., 1200",
            ),
            FormField::number(
                "interest_rate",
                "Interest Rate (%)",
                Some(0.0),
                Some(50.0),
                "e.g., 12.5",
            ),
            FormField::integer("num_loans", "Number of Loans", Some(0.0), Some(20.0), "e.g., 1"),
            // Range is owned by the semantic rule so the message can speak
            // in percent.
            FormField::number(
                "credit_utilization_ratio",
                "Credit Utilization Ratio (%)",
                None,
                None,
                "e.g., 30.5",
            ),
            FormField::integer(
                "credit_history_age",
                "Credit History Age (months)",
                Some(0.0),
                Some(600.0),
                "e.g., 120",
            ),
            FormField::number(
                "outstanding_debt",
                "Outstanding Debt ($)",
                Some(0.0),
                Some(10_000_000.0),
                "e.g., 15000",
            ),
            FormField::select("credit_mix", "Credit Mix", CREDIT_MIX),
            FormField::integer(
                "delay_from_due_date",
                "Average Delay from Due Date (days)",
                Some(0.0),
                Some(365.0),
                "e.g., 5",
            ),
            FormField::integer(
                "num_delayed_payments",
                "Number of Delayed Payments",
                Some(0.0),
                Some(50.0),
                "e.g., 2",
            ),
            FormField::number(
                "total_emi_per_month",
                "Total EMI per Month ($)",
                Some(0.0),
                Some(100_000.0),
                "e.g., 800",
            ),
            FormField::number(
                "amount_invested_monthly",
                "Amount Invested Monthly ($)",
                Some(0.0),
                Some(100_000.0),
                "e.g., 500",
            ),
            FormField::select(
                "payment_of_min_amount",
                "Payment of Minimum Amount",
                PAYMENT_OF_MIN_AMOUNT,
            ),
            FormField::select("payment_behaviour", "Payment Behaviour", PAYMENT_BEHAVIOURS),
        ];

        // Every name a step references must resolve to a field. Anything
        // else is a defect in this catalog, not reachable from user input.
        debug_assert_eq!(STEPS.len(), STEP_COUNT);
        debug_assert!(
            STEPS
                .iter()
                .flat_map(|s| s.field_names)
                .all(|name| fields.iter().any(|f| f.name == *name)),
            "step references a field missing from the catalog"
        );

        Self {
            fields,
            current_step: 1,
            active_position: 0,
            selected_button: 1,
        }
    }

    // --- step accessors ---

    pub fn step_count(&self) -> usize {
        STEPS.len()
    }

    /// 1-based current step index
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn steps(&self) -> &'static [StepDefinition] {
        STEPS
    }

    pub fn current_step_def(&self) -> &'static StepDefinition {
        &STEPS[self.current_step - 1]
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == STEPS.len()
    }

    /// Visual state of a step indicator entry (1-based index)
    pub fn step_indicator(&self, index: usize) -> StepIndicator {
        if index < self.current_step {
            StepIndicator::Completed
        } else if index == self.current_step {
            StepIndicator::Active
        } else {
            StepIndicator::Upcoming
        }
    }

    /// Progress through the wizard as a ratio in [0, 1]
    pub fn progress(&self) -> f64 {
        self.current_step as f64 / STEPS.len() as f64
    }

    /// Announcement for the current step, e.g. "Step 2 of 4: Financial"
    pub fn announcement(&self) -> String {
        format!(
            "Step {} of {}: {}",
            self.current_step,
            STEPS.len(),
            self.current_step_def().title
        )
    }

    // --- field accessors ---

    #[allow(dead_code)]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Fields of a step (1-based index), in declared order
    pub fn step_fields(&self, index: usize) -> Vec<&FormField> {
        STEPS[index - 1]
            .field_names
            .iter()
            .filter_map(|name| self.field(name))
            .collect()
    }

    // --- focus handling within the current step ---

    /// Number of focusable positions in the current step (fields + buttons row)
    fn position_count(&self) -> usize {
        self.current_step_def().field_names.len() + 1
    }

    /// Whether the buttons row is currently active
    pub fn on_buttons_row(&self) -> bool {
        self.active_position == self.position_count() - 1
    }

    /// Offset of the active field within the current step, if not on buttons
    pub fn active_position(&self) -> usize {
        self.active_position
    }

    /// Name of the focused field, unless the buttons row is active
    pub fn active_field_name(&self) -> Option<&'static str> {
        self.current_step_def()
            .field_names
            .get(self.active_position)
            .copied()
    }

    pub fn active_field_mut(&mut self) -> Option<&mut FormField> {
        let name = self.active_field_name()?;
        self.field_mut(name)
    }

    /// Move focus to the next position (wraps around)
    pub fn next_position(&mut self) {
        self.validate_focused();
        self.active_position = (self.active_position + 1) % self.position_count();
    }

    /// Move focus to the previous position (wraps around)
    pub fn prev_position(&mut self) {
        self.validate_focused();
        self.active_position = if self.active_position == 0 {
            self.position_count() - 1
        } else {
            self.active_position - 1
        };
    }

    /// Move to the next button on the buttons row (wraps around)
    pub fn next_button(&mut self) {
        self.selected_button = (self.selected_button + 1) % 2;
    }

    /// Move to the previous button on the buttons row (wraps around)
    pub fn prev_button(&mut self) {
        self.selected_button = if self.selected_button == 0 { 1 } else { 0 };
    }

    // Leaving a field is the blur analogue: record its verdict so the
    // inline message appears/disappears as the user tabs through.
    fn validate_focused(&mut self) {
        if let Some(field) = self.active_field_mut() {
            let verdict = validation::validate(field);
            field.apply_verdict(verdict.ok, verdict.message);
        }
    }

    // --- step navigation ---

    /// Validate the current step and move forward if it is clean.
    ///
    /// On rejection the step is unchanged and focus lands on the first
    /// invalid field.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.is_last_step() {
            return AdvanceOutcome::AtLastStep;
        }

        let invalid_count = self.validate_step(self.current_step);
        if invalid_count > 0 {
            self.focus_first_invalid();
            return AdvanceOutcome::Rejected { invalid_count };
        }

        self.current_step += 1;
        self.enter_step();
        AdvanceOutcome::Advanced
    }

    /// Move backward unconditionally; no-op on the first step.
    ///
    /// Returns whether the step changed. Never validates, never clears.
    pub fn retreat(&mut self) -> bool {
        if self.current_step <= 1 {
            return false;
        }
        self.current_step -= 1;
        self.enter_step();
        true
    }

    /// Jump to a step directly (submission rejection path); focus goes to
    /// the first invalid field of that step, or its first field.
    pub fn go_to_step(&mut self, index: usize) {
        debug_assert!((1..=STEPS.len()).contains(&index));
        self.current_step = index.clamp(1, STEPS.len());
        self.enter_step();
        self.focus_first_invalid();
    }

    fn enter_step(&mut self) {
        self.active_position = 0;
        self.selected_button = 1;
    }

    fn focus_first_invalid(&mut self) {
        let names = self.current_step_def().field_names;
        let position = names.iter().position(|name| {
            self.field(name)
                .is_some_and(|f| f.validation == ValidationState::Invalid)
        });
        if let Some(position) = position {
            self.active_position = position;
        }
    }

    // --- validation aggregation ---

    /// Validate every field of a step (1-based), recording verdicts.
    /// Returns the number of fields that block forward navigation.
    pub fn validate_step(&mut self, index: usize) -> usize {
        let names = STEPS[index - 1].field_names;
        let mut blocked = 0;
        for name in names {
            if let Some(field) = self.field_mut(name) {
                let verdict = validation::validate(field);
                field.apply_verdict(verdict.ok, verdict.message);
                if field.blocks_advance() {
                    blocked += 1;
                }
            }
        }
        blocked
    }

    /// Re-validate every step of the form, recording verdicts.
    ///
    /// Restored drafts can reach the last step with stale earlier steps,
    /// so submission always runs this over the whole form.
    pub fn validate_all(&mut self) -> FullValidation {
        let mut invalid_count = 0;
        let mut first_invalid_step = None;
        for step in 1..=STEPS.len() {
            let blocked = self.validate_step(step);
            invalid_count += blocked;
            if blocked > 0 && first_invalid_step.is_none() {
                first_invalid_step = Some(step);
            }
        }
        FullValidation {
            invalid_count,
            first_invalid_step,
        }
    }

    // --- snapshot interchange ---

    /// Raw values of all fields, keyed by field name
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.raw_value.clone()))
            .collect()
    }

    /// Pre-populate fields from a saved snapshot; unknown keys are ignored
    /// and unmatched fields keep their defaults. Returns how many fields
    /// were restored.
    pub fn restore(&mut self, values: &BTreeMap<String, String>) -> usize {
        let mut restored = 0;
        for (name, value) in values {
            if value.is_empty() {
                continue;
            }
            if let Some(field) = self.field_mut(name) {
                field.set_raw(value);
                restored += 1;
            }
        }
        restored
    }
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self::new()
    }
}
