// Library root: re-exports all modules so integration tests and the CLI
// front-end can access the crate's public API.

pub mod api;
pub mod config;
pub mod prop;
pub mod rank;
pub mod teams;
pub mod verify;
