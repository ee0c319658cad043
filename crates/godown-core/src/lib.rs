//! godown-core
//!
//! Accrual engine, rate policy, event extraction and report assemblers.
//! Depends on godown-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod accrual;
pub mod breakeven_service;
pub mod error;
pub mod extract;
pub mod interest_service;
pub mod profit_loss_service;
pub mod rates;
pub mod rental_service;
pub mod settlement_service;
pub mod source;
pub mod statement_service;
pub mod storage;
pub mod time;


pub use accrual::*;
pub use breakeven_service::*;
pub use error::CoreError;
pub use extract::*;
pub use interest_service::*;
pub use profit_loss_service::*;
pub use rates::*;
pub use rental_service::*;
pub use settlement_service::*;
pub use source::*;
pub use statement_service::*;
pub use storage::{book_warnings, BookStorage};
pub use time::*;
