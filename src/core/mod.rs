pub mod format;
pub mod metadata;
pub(crate) mod permissions;
