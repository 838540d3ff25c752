//! tdiary - Terminal travel diary
//!
//! One entry per calendar date with text, photos and a mood, stored in a
//! SQLite database. Journals saved by older versions as a single JSON blob are
//! migrated into the database on first start.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::TdiaryError;
