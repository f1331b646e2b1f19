//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod new;
pub(crate) mod rollback;
pub(crate) mod status;
pub(crate) mod update;
