//! Parsing of caller-supplied batches and the per-item report they produce.
//!
//! Batches are processed item by item: a bad entry is rejected on its own and
//! never rolls back entries applied before it.

use serde::Serialize;
use serde_json::Value;

use super::errors::DomainError;
use super::order::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewItem {
    pub offer_id: i64,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    pub item_id: i64,
    pub quantity: Quantity,
}

/// Accepts either a JSON array or a string holding a JSON-encoded array.
pub fn decode_batch(raw: &Value) -> Result<Vec<Value>, String> {
    match raw {
        Value::Array(items) => Ok(items.clone()),
        Value::String(text) => serde_json::from_str::<Vec<Value>>(text)
            .map_err(|e| format!("items is not a JSON array: {e}")),
        _ => Err("items must be a JSON array".to_string()),
    }
}

/// An integer, or a string made only of ASCII digits.
pub fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if is_digits(s) => s.parse().ok(),
        _ => None,
    }
}

/// Splits a comma separated id list, silently dropping anything that is not
/// a plain non-negative integer. Order is kept and duplicates are removed.
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = Vec::new();
    for id in raw
        .split(',')
        .map(str::trim)
        .filter(|s| is_digits(s))
        .filter_map(|s| s.parse().ok())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Flattens an id list given either as comma separated text or as a JSON
/// array of ids into the text form [`parse_id_list`] reads. Array entries
/// that are neither strings nor numbers become empty tokens.
pub fn id_list_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => String::new(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

pub fn parse_new_item(item: &Value) -> Result<NewItem, DomainError> {
    let offer_id = parse_id(field(item, "product_info")?)
        .ok_or_else(|| DomainError::Validation("product_info must be an integer id".into()))?;
    Ok(NewItem {
        offer_id,
        quantity: parse_quantity(field(item, "quantity")?)?,
    })
}

pub fn parse_quantity_change(item: &Value) -> Result<QuantityChange, DomainError> {
    let item_id = parse_id(field(item, "id")?)
        .ok_or_else(|| DomainError::Validation("id must be an integer id".into()))?;
    Ok(QuantityChange {
        item_id,
        quantity: parse_quantity(field(item, "quantity")?)?,
    })
}

fn parse_quantity(value: &Value) -> Result<Quantity, DomainError> {
    let raw = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DomainError::Validation("quantity must be an integer".into()))?;
    Quantity::new(raw)
}

fn field<'a>(item: &'a Value, name: &str) -> Result<&'a Value, DomainError> {
    item.get(name)
        .ok_or_else(|| DomainError::Validation(format!("missing field '{name}'")))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Applied { index: usize, id: i64 },
    Rejected { index: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSummary {
    /// Every entry was applied.
    Complete,
    /// Some entries were applied, some rejected.
    Partial,
    /// Entries were present but none was applied.
    Failed,
    /// Nothing to process, including a payload that could not be decoded.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    /// Set when the payload could not be decoded at all.
    pub malformed: Option<String>,
}

impl BatchReport {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            outcomes: Vec::new(),
            malformed: Some(reason.into()),
        }
    }

    pub fn applied(&mut self, index: usize, id: i64) {
        self.outcomes.push(ItemOutcome::Applied { index, id });
    }

    pub fn rejected(&mut self, index: usize, err: &DomainError) {
        self.outcomes.push(ItemOutcome::Rejected {
            index,
            reason: err.to_string(),
        });
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Applied { .. }))
            .count()
    }

    pub fn summary(&self) -> BatchSummary {
        let applied = self.applied_count();
        match (applied, self.outcomes.len()) {
            (_, 0) => BatchSummary::Empty,
            (0, _) => BatchSummary::Failed,
            (a, n) if a == n => BatchSummary::Complete,
            _ => BatchSummary::Partial,
        }
    }
}
