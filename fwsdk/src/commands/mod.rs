//! Command line subcommands
//!
//! Each subcommand returns `Ok(true)` on success, `Ok(false)` when the
//! operation failed in an expected way, and `Err` for anything else.

pub mod clean;
pub mod status;
pub mod update;
