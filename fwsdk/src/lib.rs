//! fwsdk
//!
//! Resolves, downloads and deploys firmware SDK bundles into a local state
//! directory, skipping the work when the deployed SDK is already current.

pub mod commands;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod loader;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
