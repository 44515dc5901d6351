//! Reconciling time entries against the lines already present in a ledger.

mod format;

pub use format::{LedgerLine, format_entry};

use crate::{Ledger, TimeEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileItem {
    /// The formatted line is already in the ledger.
    InLedger(String),
    /// The formatted line still has to be added.
    OnlyInTimesheet(String),
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub items: Vec<ReconcileItem>,
}

impl Reconciliation {
    pub fn existing(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            ReconcileItem::InLedger(line) => Some(line.as_str()),
            ReconcileItem::OnlyInTimesheet(_) => None,
        })
    }

    pub fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            ReconcileItem::OnlyInTimesheet(line) => Some(line.as_str()),
            ReconcileItem::InLedger(_) => None,
        })
    }

    pub fn has_new_lines(&self) -> bool {
        self.new_lines().next().is_some()
    }
}

/// Format every entry and look it up verbatim anywhere in the ledger.
pub fn reconcile(ledger: &Ledger, entries: &[TimeEntry], shorthand: &str) -> Reconciliation {
    let existing = ledger.line_set();

    let items = entries
        .iter()
        .map(|entry| {
            let line = format_entry(entry, shorthand);
            if existing.contains(line.as_str()) {
                ReconcileItem::InLedger(line)
            } else {
                ReconcileItem::OnlyInTimesheet(line)
            }
        })
        .collect();

    Reconciliation { items }
}
