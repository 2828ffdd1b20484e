pub mod filesystem;
pub mod mount;
