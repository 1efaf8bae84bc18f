pub mod adviser;
pub mod config;
pub mod paths;
pub mod project_types;
pub mod query;
