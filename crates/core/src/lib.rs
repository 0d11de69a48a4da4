//! Pure core of spadeploy: environment configuration, stack composition and
//! deploy planning. Nothing in this crate touches the network, the file system
//! or child processes.

pub mod config;
pub mod deploy;
pub mod template;
