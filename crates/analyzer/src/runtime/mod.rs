//! Runtime module — process setup for the CLI.

pub mod boot;
