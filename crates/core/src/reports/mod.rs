//! Sales reports derived from the transaction log.
//!
//! This module provides pure aggregation over recorded transactions:
//! - Dashboard totals (sales, profit, per-user, per-day)
//! - Daily closing
//! - Filtered history with totals
//! - Viewer scoping (staff only ever see their own rows)

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
