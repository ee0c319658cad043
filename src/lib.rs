#![doc(test(attr(deny(warnings))))]

//! Godown computes warehouse rental, interest, settlement and profit reports
//! from books of stock movements and loans.
//!
//! The heavy lifting lives in the workspace crates; this crate wires
//! configuration, storage and the report services together behind
//! [`ReportDesk`] and the `godown_cli` binary.

pub mod cli;
pub mod desk;
pub mod errors;
pub mod utils;

use std::sync::Once;

pub use desk::{policy_from_config, BookRef, ReportDesk};
pub use errors::{CliError, GodownError, Result};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Godown tracing initialized.");
    });
}
