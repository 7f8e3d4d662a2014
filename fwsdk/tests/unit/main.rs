//! Integration tests against a local update server

mod common;
mod test_deploy;
mod test_loaders;
