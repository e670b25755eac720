//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod auth;
pub mod group;
pub mod user;
