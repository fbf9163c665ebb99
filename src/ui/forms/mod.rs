//! Form rendering module
//!
//! UI components for rendering the application wizard:
//! - `field_renderer`: field rendering utilities
//! - `wizard_form`: the multi-step form with indicator and buttons

mod field_renderer;
mod wizard_form;

pub use wizard_form::draw;
