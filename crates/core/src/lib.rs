//! Core billing logic for Aquabill.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, billing calculations, and the supply cutoff policy live here.
//!
//! # Modules
//!
//! - `month` - Calendar month ordering and naming
//! - `billing` - Due amounts and balance summaries
//! - `supply` - Water-supply cutoff evaluation
//! - `usage` - Usage growth estimation
//! - `auth` - Password hashing

pub mod auth;
pub mod billing;
pub mod month;
pub mod supply;
pub mod usage;
