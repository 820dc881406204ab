//! Command implementations for the anneal CLI.

pub mod compare;
pub mod export;
pub mod extract;
pub mod init;
pub mod pipeline;
pub mod sanitize;
pub mod split;
pub mod status;
pub mod train;
pub mod validate;
pub mod versions;
