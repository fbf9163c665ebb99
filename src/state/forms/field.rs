//! Form field value objects

/// How a field is edited and type-checked
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free-form text
    Text,
    /// Email address (`local@domain.tld`)
    Email,
    /// Real number, optionally constrained to an inclusive range
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    /// One choice from a fixed option list
    Select { options: &'static [&'static str] },
}

/// Validation lifecycle of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationState {
    #[default]
    Unvalidated,
    Valid,
    Invalid,
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub raw_value: String,
    pub validation: ValidationState,
    /// Inline error message; present only while the field is invalid
    pub error: Option<String>,
    pub placeholder: &'static str,
}

impl FormField {
    /// Create a new free-form text field
    pub fn text(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Text, placeholder)
    }

    /// Create a new email field
    #[allow(dead_code)]
    pub fn email(name: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self::with_kind(name, label, FieldKind::Email, placeholder)
    }

    /// Create a new number field with optional inclusive bounds
    pub fn number(
        name: &'static str,
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
        placeholder: &'static str,
    ) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Number {
                min,
                max,
                integer: false,
            },
            placeholder,
        )
    }

    /// Create a new whole-number field with optional inclusive bounds
    pub fn integer(
        name: &'static str,
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
        placeholder: &'static str,
    ) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Number {
                min,
                max,
                integer: true,
            },
            placeholder,
        )
    }

    /// Create a new select field over a fixed option list
    pub fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self::with_kind(name, label, FieldKind::Select { options }, "")
    }

    fn with_kind(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        placeholder: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            raw_value: String::new(),
            validation: ValidationState::default(),
            error: None,
            placeholder,
        }
    }

    /// Whether this field accepts typed characters (as opposed to cycling)
    pub fn is_editable(&self) -> bool {
        !matches!(self.kind, FieldKind::Select { .. })
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match self.kind {
            FieldKind::Select { .. } => {}
            FieldKind::Number { .. } => {
                if c.is_ascii_digit() || c == '.' || (c == '-' && self.raw_value.is_empty()) {
                    self.raw_value.push(c);
                    self.mark_edited();
                }
            }
            FieldKind::Text | FieldKind::Email => {
                self.raw_value.push(c);
                self.mark_edited();
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        if self.is_editable() && self.raw_value.pop().is_some() {
            self.mark_edited();
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        self.raw_value.clear();
        self.mark_edited();
    }

    /// Select the next option (select fields only, wraps around)
    pub fn cycle_next(&mut self) {
        if let FieldKind::Select { options } = self.kind {
            let next = match self.selected_index() {
                Some(i) => (i + 1) % options.len(),
                None => 0,
            };
            self.raw_value = options[next].to_string();
            self.mark_edited();
        }
    }

    /// Select the previous option (select fields only, wraps around)
    pub fn cycle_prev(&mut self) {
        if let FieldKind::Select { options } = self.kind {
            let prev = match self.selected_index() {
                Some(0) | None => options.len() - 1,
                Some(i) => i - 1,
            };
            self.raw_value = options[prev].to_string();
            self.mark_edited();
        }
    }

    /// Index of the current value within the option list, if it is one
    pub fn selected_index(&self) -> Option<usize> {
        match self.kind {
            FieldKind::Select { options } => options.iter().position(|o| *o == self.raw_value),
            _ => None,
        }
    }

    /// Replace the raw value (snapshot restore path)
    pub fn set_raw(&mut self, value: &str) {
        self.raw_value = value.to_string();
        self.validation = ValidationState::Unvalidated;
        self.error = None;
    }

    /// Record a validation verdict on the field
    pub fn apply_verdict(&mut self, ok: bool, message: Option<String>) {
        if ok {
            self.validation = ValidationState::Valid;
            self.error = None;
        } else {
            self.validation = ValidationState::Invalid;
            self.error = message;
        }
    }

    /// Whether the field currently blocks forward navigation
    pub fn blocks_advance(&self) -> bool {
        self.required && self.validation != ValidationState::Valid
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> &str {
        &self.raw_value
    }

    // Edits invalidate the previous verdict; a cleared field drops its
    // inline error immediately, a partial edit keeps it until revalidation.
    fn mark_edited(&mut self) {
        self.validation = ValidationState::Unvalidated;
        if self.raw_value.is_empty() {
            self.error = None;
        }
    }
}
