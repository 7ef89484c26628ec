//! Savepoint-per-row unit of work.
//!
//! A whole file runs in one transaction; each data row runs inside a
//! nested savepoint. A failing row rolls back only its own writes (the
//! savepoint drops with rollback behavior on every exit path) and is
//! reported in the summary; the rest of the file proceeds. Only an error
//! establishing or releasing the savepoint itself is infrastructure-level
//! and aborts the whole import.

use rusqlite::{Connection, Transaction};

use crate::error::ImportError;

/// A recoverable per-row failure: recorded in the summary, import continues.
#[derive(Debug)]
pub struct RowFailure {
    pub reason: String,
    pub context: Option<String>,
}

impl RowFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into(), context: None }
    }

    pub fn with_context(reason: impl Into<String>, context: impl Into<String>) -> Self {
        Self { reason: reason.into(), context: Some(context.into()) }
    }
}

impl From<rusqlite::Error> for RowFailure {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Run one row's logic inside a savepoint.
///
/// `Ok(Ok(v))` — row committed. `Ok(Err(failure))` — row rolled back,
/// import continues. `Err(_)` — the savepoint machinery itself failed;
/// the caller must abort the whole transaction.
pub fn row_scope<T, F>(tx: &mut Transaction<'_>, f: F) -> Result<Result<T, RowFailure>, ImportError>
where
    F: FnOnce(&Connection) -> Result<T, RowFailure>,
{
    let sp = tx
        .savepoint()
        .map_err(|e| ImportError::Transaction(e.to_string()))?;
    match f(&sp) {
        Ok(value) => {
            sp.commit()
                .map_err(|e| ImportError::Transaction(e.to_string()))?;
            Ok(Ok(value))
        }
        Err(failure) => {
            // dropping the savepoint rolls this row back
            drop(sp);
            Ok(Err(failure))
        }
    }
}
