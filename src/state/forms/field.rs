//! Form field value objects

/// Type-safe field values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Decimal amount kept as typed; digits and one decimal point only
    Amount(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
    pub is_multiline: bool,
}

impl FormField {
    /// Create a new text field
    pub fn text(name: &str, label: &str, is_multiline: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::Text(String::new()),
            is_multiline,
        }
    }

    /// Create a new amount field with an initial value
    pub fn amount_with_value(name: &str, label: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::Amount(value.to_string()),
            is_multiline: false,
        }
    }

    /// Create a new amount field
    pub fn amount(name: &str, label: &str) -> Self {
        Self::amount_with_value(name, label, "")
    }

    /// Raw text of the field
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Amount(s) => s,
        }
    }

    /// Parsed amount; empty or malformed input reads as `None`
    pub fn as_amount(&self) -> Option<f64> {
        match &self.value {
            FieldValue::Amount(s) => s.trim().parse().ok(),
            FieldValue::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().trim().is_empty()
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match &mut self.value {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Amount(s) => {
                if c.is_ascii_digit() || (c == '.' && !s.contains('.')) {
                    s.push(c);
                }
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Amount(s) => {
                s.pop();
            }
        }
    }

    /// Replace the value, keeping the field's kind
    pub fn set_value(&mut self, value: impl Into<String>) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Amount(s) => *s = value.into(),
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Amount(s) => s.clear(),
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        self.as_text().to_string()
    }
}

/// Apply a keystroke to a plain string using the same rules as [`FormField`]
pub fn push_input_char(value: &str, c: char, numeric: bool) -> Option<String> {
    if numeric && !(c.is_ascii_digit() || (c == '.' && !value.contains('.'))) {
        return None;
    }
    let mut next = value.to_string();
    next.push(c);
    Some(next)
}
