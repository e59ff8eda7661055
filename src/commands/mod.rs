//! CLI commands

pub mod list;
pub mod related;
pub mod show;
