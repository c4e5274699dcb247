//! repo-review: clone a repository, read its text files and have a local
//! model review them (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod chat;
pub mod config;
pub mod constants;
pub mod env;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod providers;
pub mod review;
pub mod server;
