pub mod config;
pub mod credential;
pub mod diagnostics;
pub mod model;
pub mod validate;
