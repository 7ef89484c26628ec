//! `payline-calc` — sales commission calculation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns computed results.
//! No IO or database dependencies; the import crate loads [`CalcInput`] and
//! the surrounding application serializes [`CalcResult`].

pub mod adjustments;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod rates;

pub use config::CalcConfig;
pub use engine::calculate;
pub use error::CalcError;
pub use model::{CalcInput, CalcResult};
