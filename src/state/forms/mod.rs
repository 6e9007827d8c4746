//! Form domain layer
//!
//! Type-safe form handling for the wizard's local input forms.

mod field;
mod line_form;

pub use field::{push_input_char, FormField};
pub use line_form::{EstimationLineForm, Form};
