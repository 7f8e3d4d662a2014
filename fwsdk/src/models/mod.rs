//! Data models

pub mod channel_index;
pub mod file_kind;
pub mod request;
