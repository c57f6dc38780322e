// Application layer: the ledger service and the errors it reports.
// Presentation layers (the CLI session, or anything else) call into
// `LedgerService` and never touch the repository directly.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
