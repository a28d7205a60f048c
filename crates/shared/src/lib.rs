//! Shared configuration, errors, and service plumbing for the nursery shop backend.
//!
//! This crate provides common pieces used across all other crates:
//! - Application configuration (`AppConfig`)
//! - Application-wide error envelope (`AppError`)
//! - JWT claims and token service
//! - Mail delivery for one-time passcodes

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;


pub use auth::Claims;
pub use config::{AppConfig, EmailConfig};
pub use email::{EmailError, EmailService, Notifier};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
