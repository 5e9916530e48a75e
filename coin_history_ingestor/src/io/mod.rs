pub mod file;
pub mod sink;
pub mod store;
