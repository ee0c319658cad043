//! godown-domain
//!
//! Pure domain models (stock movements, stockist loans, company loans, books).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod book;
pub mod common;
pub mod events;
pub mod records;

pub use book::*;
pub use common::*;
pub use events::*;
pub use records::*;
