//! Subcommand implementations.

pub mod decode;
pub mod extract;
pub mod init;
pub mod output;
