//! Catalog operations shared by the CLI and the HTTP API

pub mod bulk;
pub mod catalog;
pub mod format;
pub mod import;
pub mod search;
pub mod util;
