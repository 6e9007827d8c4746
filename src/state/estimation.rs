//! Estimation line aggregation for claim surveys

use crate::state::{EstimationDetails, EstimationLineRecord};
use thiserror::Error;
use uuid::Uuid;

/// Identity of an estimation line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineId {
    /// Line already stored on the server
    Server(i64),
    /// Line added during this wizard session, not yet created remotely
    Local(Uuid),
}

/// `quantity × unit_amount − depreciation`
pub fn line_amount(quantity: f64, unit_amount: f64, depreciation: f64) -> f64 {
    quantity * unit_amount - depreciation
}

/// One costed line item
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationLine {
    pub id: LineId,
    pub item_type_id: Option<i64>,
    pub description: String,
    pub unit_amount: f64,
    pub quantity: f64,
    pub depreciation: f64,
    pub amount: f64,
}

impl EstimationLine {
    pub fn is_new(&self) -> bool {
        matches!(self.id, LineId::Local(_))
    }

    pub fn server_id(&self) -> Option<i64> {
        match self.id {
            LineId::Server(id) => Some(id),
            LineId::Local(_) => None,
        }
    }

    fn recompute(&mut self) {
        self.amount = line_amount(self.quantity, self.unit_amount, self.depreciation);
    }
}

impl From<&EstimationLineRecord> for EstimationLine {
    fn from(record: &EstimationLineRecord) -> Self {
        let mut line = Self {
            id: LineId::Server(record.id),
            item_type_id: record.item_type_id,
            description: record.description.clone().unwrap_or_default(),
            unit_amount: record.unit_amount,
            quantity: record.quantity,
            depreciation: record.depreciation,
            amount: 0.0,
        };
        line.recompute();
        line
    }
}

/// Values for a line the surveyor is adding
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineDraft {
    pub item_type_id: Option<i64>,
    pub description: String,
    pub unit_amount: f64,
    pub quantity: f64,
    pub depreciation: f64,
}

/// Partial edit of an existing or new line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinePatch {
    pub description: Option<String>,
    pub unit_amount: Option<f64>,
    pub quantity: Option<f64>,
    pub depreciation: Option<f64>,
}

#[derive(Error, Debug, PartialEq)]
pub enum EstimationError {
    #[error("Estimation line not found")]
    NotFound,
    #[error("Lines stored on the server cannot be removed")]
    ExistingLine,
}

/// Lines split by where they have to be sent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinePartition {
    pub new_items: Vec<EstimationLine>,
    pub existing_items: Vec<EstimationLine>,
}

impl LinePartition {
    pub fn len(&self) -> usize {
        self.new_items.len() + self.existing_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Working set of estimation lines for one wizard session
#[derive(Debug, Clone, Default)]
pub struct EstimationAggregator {
    estimation_id: Option<i64>,
    items: Vec<EstimationLine>,
    total: f64,
}

impl EstimationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection with the lines the server already holds
    pub fn from_details(details: &EstimationDetails) -> Self {
        let mut aggregator = Self::new();
        aggregator.merge_details(details);
        aggregator
    }

    /// Fold in a fetched estimation and return the recomputed total.
    ///
    /// Server lines missing from the working set go ahead of the lines added in
    /// this session. Lines already present keep their local edits.
    pub fn merge_details(&mut self, details: &EstimationDetails) -> f64 {
        self.estimation_id = Some(details.id);
        let fetched: Vec<EstimationLine> = details
            .lines
            .iter()
            .filter(|record| !self.items.iter().any(|l| l.id == LineId::Server(record.id)))
            .map(EstimationLine::from)
            .collect();
        let insert_at = self.items.iter().take_while(|l| !l.is_new()).count();
        self.items.splice(insert_at..insert_at, fetched);
        self.recompute_total()
    }

    pub fn estimation_id(&self) -> Option<i64> {
        self.estimation_id
    }

    pub fn items(&self) -> &[EstimationLine] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Append a new line and return the recomputed total
    pub fn add_item(&mut self, draft: LineDraft) -> f64 {
        let mut line = EstimationLine {
            id: LineId::Local(Uuid::new_v4()),
            item_type_id: draft.item_type_id,
            description: draft.description,
            unit_amount: draft.unit_amount,
            quantity: draft.quantity,
            depreciation: draft.depreciation,
            amount: 0.0,
        };
        line.recompute();
        tracing::debug!(amount = line.amount, "Added estimation line");
        self.items.push(line);
        self.recompute_total()
    }

    /// Remove a line added in this session
    pub fn remove_item(&mut self, id: LineId) -> Result<f64, EstimationError> {
        let index = self
            .items
            .iter()
            .position(|line| line.id == id)
            .ok_or(EstimationError::NotFound)?;
        if !self.items[index].is_new() {
            return Err(EstimationError::ExistingLine);
        }
        self.items.remove(index);
        Ok(self.recompute_total())
    }

    /// Edit a line in place and return the recomputed total
    pub fn update_item(&mut self, id: LineId, patch: LinePatch) -> Result<f64, EstimationError> {
        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(EstimationError::NotFound)?;

        if let Some(description) = patch.description {
            line.description = description;
        }
        if let Some(unit_amount) = patch.unit_amount {
            line.unit_amount = unit_amount;
        }
        if let Some(quantity) = patch.quantity {
            line.quantity = quantity;
        }
        if let Some(depreciation) = patch.depreciation {
            line.depreciation = depreciation;
        }
        line.recompute();

        Ok(self.recompute_total())
    }

    /// Split lines into those to create and those to update
    pub fn partition(&self) -> LinePartition {
        let (new_items, existing_items): (Vec<_>, Vec<_>) =
            self.items.iter().cloned().partition(|l| l.is_new());
        LinePartition {
            new_items,
            existing_items,
        }
    }

    fn recompute_total(&mut self) -> f64 {
        self.total = self.items.iter().map(|line| line.amount).sum();
        self.total
    }
}
