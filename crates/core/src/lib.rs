//! Core business logic for the nursery shop.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing, roles, one-time passcodes, login session state
//! - `catalog` - Category/type table and item validation
//! - `ledger` - Sale/return arithmetic and stock adjustment rules
//! - `reports` - Dashboard, daily closing and filtered views over the log
//! - `invoice` - Printable invoice for a recorded transaction

pub mod auth;
pub mod catalog;
pub mod invoice;
pub mod ledger;
pub mod reports;
