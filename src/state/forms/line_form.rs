//! Form state for adding an estimation line

use super::field::FormField;
use crate::state::{EstimationLine, ItemType, LineDraft, LineId, LinePatch};
use thiserror::Error;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> &mut FormField;
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

#[derive(Error, Debug, PartialEq)]
pub enum LineFormError {
    #[error("Description is required")]
    MissingDescription,
    #[error("{0} must be a number")]
    InvalidAmount(&'static str),
    #[error("Quantity must be greater than zero")]
    ZeroQuantity,
}

/// Form for adding an estimation line, or editing one in place
#[derive(Debug, Clone)]
pub struct EstimationLineForm {
    pub description: FormField,
    pub unit_amount: FormField,
    pub quantity: FormField,
    pub depreciation: FormField,
    /// Index into the item type list, cycled with left/right
    pub item_type_index: usize,
    pub active_field_index: usize,
    /// Line being edited; `None` while adding
    pub editing: Option<LineId>,
}

impl EstimationLineForm {
    pub fn new() -> Self {
        Self {
            description: FormField::text("description", "Description", false),
            unit_amount: FormField::amount("unit_amount", "Unit amount"),
            quantity: FormField::amount_with_value("quantity", "Quantity", "1"),
            depreciation: FormField::amount("depreciation", "Depreciation"),
            item_type_index: 0,
            active_field_index: 0,
            editing: None,
        }
    }

    pub fn next_item_type(&mut self, count: usize) {
        if count > 0 {
            self.item_type_index = (self.item_type_index + 1) % count;
        }
    }

    pub fn prev_item_type(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if self.item_type_index == 0 {
            self.item_type_index = count - 1;
        } else {
            self.item_type_index -= 1;
        }
    }

    pub fn selected_item_type<'a>(&self, item_types: &'a [ItemType]) -> Option<&'a ItemType> {
        item_types.get(self.item_type_index)
    }

    /// Validate and convert into a line draft.
    ///
    /// Empty depreciation reads as zero; unit amount and quantity must parse.
    pub fn to_draft(&self, item_types: &[ItemType]) -> Result<LineDraft, LineFormError> {
        if self.description.is_empty() {
            return Err(LineFormError::MissingDescription);
        }
        let unit_amount = self
            .unit_amount
            .as_amount()
            .ok_or(LineFormError::InvalidAmount("Unit amount"))?;
        let quantity = self
            .quantity
            .as_amount()
            .ok_or(LineFormError::InvalidAmount("Quantity"))?;
        if quantity <= 0.0 {
            return Err(LineFormError::ZeroQuantity);
        }
        let depreciation = if self.depreciation.is_empty() {
            0.0
        } else {
            self.depreciation
                .as_amount()
                .ok_or(LineFormError::InvalidAmount("Depreciation"))?
        };

        Ok(LineDraft {
            item_type_id: self.selected_item_type(item_types).map(|t| t.id),
            description: self.description.as_text().trim().to_string(),
            unit_amount,
            quantity,
            depreciation,
        })
    }

    /// Fill the form from an existing line and switch to editing it
    pub fn load_line(&mut self, line: &EstimationLine, item_types: &[ItemType]) {
        self.description.set_value(line.description.as_str());
        self.unit_amount.set_value(line.unit_amount.to_string());
        self.quantity.set_value(line.quantity.to_string());
        self.depreciation.set_value(line.depreciation.to_string());
        if let Some(index) = item_types
            .iter()
            .position(|t| Some(t.id) == line.item_type_id)
        {
            self.item_type_index = index;
        }
        self.active_field_index = 0;
        self.editing = Some(line.id);
    }

    /// Validate and convert into a patch for the line being edited.
    ///
    /// The item type is fixed once a line exists, so it is not part of the patch.
    pub fn to_patch(&self) -> Result<LinePatch, LineFormError> {
        let draft = self.to_draft(&[])?;
        Ok(LinePatch {
            description: Some(draft.description),
            unit_amount: Some(draft.unit_amount),
            quantity: Some(draft.quantity),
            depreciation: Some(draft.depreciation),
        })
    }

    /// Reset values but keep the chosen item type for the next line
    pub fn reset(&mut self) {
        let item_type_index = self.item_type_index;
        *self = Self::new();
        self.item_type_index = item_type_index;
    }
}

impl Default for EstimationLineForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for EstimationLineForm {
    fn field_count(&self) -> usize {
        4 // description, unit amount, quantity, depreciation
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(3);
    }
    fn get_active_field_mut(&mut self) -> &mut FormField {
        match self.active_field_index {
            0 => &mut self.description,
            1 => &mut self.unit_amount,
            2 => &mut self.quantity,
            _ => &mut self.depreciation,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        match index {
            0 => Some(&self.description),
            1 => Some(&self.unit_amount),
            2 => Some(&self.quantity),
            3 => Some(&self.depreciation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_types() -> Vec<ItemType> {
        vec![
            ItemType {
                id: 3,
                name: "Parts".to_string(),
                code: None,
            },
            ItemType {
                id: 4,
                name: "Labour".to_string(),
                code: Some("LAB".to_string()),
            },
        ]
    }

    fn type_text(form: &mut EstimationLineForm, text: &str) {
        for c in text.chars() {
            form.get_active_field_mut().push_char(c);
        }
    }

    #[test]
    fn test_new_has_correct_defaults() {
        let form = EstimationLineForm::new();
        assert_eq!(form.active_field_index, 0);
        assert_eq!(form.quantity.as_text(), "1");
        assert_eq!(form.field_count(), 4);
    }

    #[test]
    fn test_next_field_cycles() {
        let mut form = EstimationLineForm::new();
        for _ in 0..4 {
            form.next_field();
        }
        assert_eq!(form.active_field_index, 0);
        form.prev_field();
        assert_eq!(form.active_field_index, 3);
    }

    #[test]
    fn test_set_active_field_clamps() {
        let mut form = EstimationLineForm::new();
        form.set_active_field(100);
        assert_eq!(form.active_field_index, 3);
    }

    #[test]
    fn test_get_field_returns_correct_fields() {
        let form = EstimationLineForm::new();
        assert_eq!(form.get_field(0).unwrap().name, "description");
        assert_eq!(form.get_field(1).unwrap().name, "unit_amount");
        assert_eq!(form.get_field(2).unwrap().name, "quantity");
        assert_eq!(form.get_field(3).unwrap().name, "depreciation");
        assert!(form.get_field(4).is_none());
    }

    #[test]
    fn test_item_type_cycles() {
        let mut form = EstimationLineForm::new();
        form.prev_item_type(2);
        assert_eq!(form.item_type_index, 1);
        form.next_item_type(2);
        assert_eq!(form.item_type_index, 0);
        form.next_item_type(0);
        assert_eq!(form.item_type_index, 0);
    }

    #[test]
    fn test_to_draft() {
        let mut form = EstimationLineForm::new();
        type_text(&mut form, "Door panel");
        form.next_field();
        type_text(&mut form, "150");
        form.next_field();
        form.get_active_field_mut().clear();
        type_text(&mut form, "2");
        form.next_item_type(2);

        let draft = form.to_draft(&item_types()).unwrap();
        assert_eq!(draft.item_type_id, Some(4));
        assert_eq!(draft.description, "Door panel");
        assert_eq!(draft.unit_amount, 150.0);
        assert_eq!(draft.quantity, 2.0);
        assert_eq!(draft.depreciation, 0.0);
    }

    #[test]
    fn test_load_line_then_patch() {
        let line = EstimationLine {
            id: LineId::Server(8),
            item_type_id: Some(4),
            description: "Bumper".to_string(),
            unit_amount: 300.0,
            quantity: 1.0,
            depreciation: 25.5,
            amount: 274.5,
        };
        let mut form = EstimationLineForm::new();
        form.load_line(&line, &item_types());

        assert_eq!(form.editing, Some(LineId::Server(8)));
        assert_eq!(form.item_type_index, 1);
        assert_eq!(form.unit_amount.as_text(), "300");
        assert_eq!(form.depreciation.as_text(), "25.5");

        form.set_active_field(2);
        form.get_active_field_mut().clear();
        type_text(&mut form, "2");
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.quantity, Some(2.0));
        assert_eq!(patch.description.as_deref(), Some("Bumper"));

        form.reset();
        assert_eq!(form.editing, None);
        assert_eq!(form.item_type_index, 1);
    }

    #[test]
    fn test_to_draft_validation() {
        let form = EstimationLineForm::new();
        assert_eq!(
            form.to_draft(&item_types()),
            Err(LineFormError::MissingDescription)
        );

        let mut form = EstimationLineForm::new();
        type_text(&mut form, "Paint");
        assert_eq!(
            form.to_draft(&item_types()),
            Err(LineFormError::InvalidAmount("Unit amount"))
        );

        form.next_field();
        type_text(&mut form, "10");
        form.next_field();
        form.get_active_field_mut().clear();
        type_text(&mut form, "0");
        assert_eq!(form.to_draft(&item_types()), Err(LineFormError::ZeroQuantity));
    }

    #[test]
    fn test_reset_keeps_item_type() {
        let mut form = EstimationLineForm::new();
        form.next_item_type(2);
        type_text(&mut form, "Paint");
        form.reset();
        assert_eq!(form.item_type_index, 1);
        assert!(form.description.is_empty());
    }
}
