pub mod compile;
pub mod config;
pub mod labels;
pub mod preset;
pub mod validate;
