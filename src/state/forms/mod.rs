//! Form domain layer
//!
//! Pure form state: fields, validation and the multi-step wizard. No
//! rendering and no IO happens in here.

mod field;
mod validation;
mod wizard;

pub use field::{FieldKind, FormField, ValidationState};
pub use validation::{validate, Verdict};
pub use wizard::{
    AdvanceOutcome, ApplicationForm, FullValidation, StepDefinition, StepIndicator, CREDIT_MIX,
    OCCUPATIONS, PAYMENT_BEHAVIOURS, PAYMENT_OF_MIN_AMOUNT, STEP_COUNT,
};
