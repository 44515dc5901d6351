//! Parsing `zeiterfassung.txt` ledgers.
//!
//! A ledger is a list of booking lines, split into billing blocks by a line of
//! 78 `=`. The line right after the last separator states whether that block has
//! been billed:
//!
//! ```text
//! 01.03.2024  3:15h ? abc Layout
//! ==============================================================================
//! Abgerechnet: noch nicht
//! ```
//!
//! New lines are only added while the last block is not (fully) billed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const SEPARATOR: &str =
    "==============================================================================";

const NOT_YET_BILLED: &str = "abgerechnet: noch nicht";
const PARTIALLY_BILLED: &str = "abgerechnet: teilweise";

/// Billing state of a block that may still be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingState {
    NotYetBilled,
    PartiallyBilled,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No separator line found in {}", .path.display())]
    NoSeparator { path: PathBuf },
    #[error(
        "Last Abrechnungsblock is abgerechnet, create a new block manually.\nBlockpostfix was: {line:?}"
    )]
    Billed { line: String },
}

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    lines: Vec<String>,
}

impl Ledger {
    pub fn read(path: &Path) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path).map_err(|source| LedgerError::Read {
            path: path.to_owned(),
            source,
        })?;
        Ok(Ledger::parse(path, &content))
    }

    pub fn parse(path: &Path, content: &str) -> Self {
        Ledger {
            path: path.to_owned(),
            lines: content.lines().map(str::to_owned).collect(),
        }
    }

    /// Index of the last block separator.
    pub fn last_separator(&self) -> Option<usize> {
        self.lines.iter().rposition(|line| line == SEPARATOR)
    }

    /// Check that the last billing block may still receive new lines.
    pub fn open_block(&self) -> Result<BillingState, LedgerError> {
        let separator = self.last_separator().ok_or_else(|| LedgerError::NoSeparator {
            path: self.path.clone(),
        })?;

        let line = self
            .lines
            .get(separator + 1)
            .map(String::as_str)
            .unwrap_or_default();
        // a trailing dot and the capitalisation vary between ledgers
        let normalized = line.trim().to_lowercase();
        if normalized.starts_with(NOT_YET_BILLED) {
            Ok(BillingState::NotYetBilled)
        } else if normalized.starts_with(PARTIALLY_BILLED) {
            Ok(BillingState::PartiallyBilled)
        } else {
            Err(LedgerError::Billed {
                line: line.to_owned(),
            })
        }
    }

    /// All lines, for exact duplicate checks.
    pub fn line_set(&self) -> HashSet<&str> {
        self.lines.iter().map(String::as_str).collect()
    }
}
