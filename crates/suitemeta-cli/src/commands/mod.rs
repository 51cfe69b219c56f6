pub mod build_metadata;
pub mod config;
pub mod tree;
pub mod validate;
