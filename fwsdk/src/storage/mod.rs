//! On-disk state: layout, settings and persisted deployment state

pub mod layout;
pub mod settings;
pub mod state;
