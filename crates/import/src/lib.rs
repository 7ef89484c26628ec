//! `payline-import` — transactional spreadsheet import pipeline.
//!
//! Each importer follows the same contract: normalize the upload, locate
//! and validate headers (whole-file fatal when they are missing), then run
//! every data row inside its own savepoint so one malformed row never
//! aborts the rest of the file. The surrounding application passes bytes in
//! and serializes the returned summary.

pub mod booked;
pub mod commission_sheet;
pub mod directory;
pub mod error;
pub mod lead_status;
pub mod performance;
pub mod store;
pub mod summary;
mod tabular;
pub mod unit_of_work;

pub use directory::{EmployeeDirectory, EmployeeId, SqliteDirectory};
pub use error::ImportError;
pub use summary::{ImportSummary, RowError, WorkbookSummary};
