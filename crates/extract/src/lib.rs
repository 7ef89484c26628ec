//! `payline-extract` — extraction layer over normalized cell matrices.
//!
//! Pure engine crate: stateless cell parsers, free-text directive parsing,
//! and the heuristic detector that locates data blocks inside loosely
//! formatted sheets. No IO, no database.

pub mod config;
pub mod detect;
pub mod directive;
pub mod error;
pub mod period;
pub mod value;

pub use config::DetectorConfig;
pub use detect::{detect_blocks, Block, BlockKind, BlockRow};
pub use directive::{parse_directive, Directive};
pub use error::ExtractError;
pub use period::parse_period_from_sheet_name;
