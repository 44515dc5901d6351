pub mod classify;
pub mod commit;
pub mod ledger;
pub mod reconcile;
pub mod resolve;
pub mod timesheet;

pub use anyhow::Result;

pub use classify::{Classified, Classifier, ProjectId};
pub use ledger::{BillingState, Ledger, LedgerError};
pub use reconcile::{ReconcileItem, Reconciliation};
pub use resolve::{Layout, ResolveError};
pub use timesheet::{TimeEntry, Timesheet};
