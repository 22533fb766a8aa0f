// ABOUTME: Command handlers behind the edgecron binary
// ABOUTME: One module per command group, all printing through colored

pub mod auth;
pub mod config;
pub mod setup;
pub mod status;
