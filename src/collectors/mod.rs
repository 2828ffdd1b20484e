pub mod filesystem;
pub mod mock;
pub mod mounts;
pub mod runner;
