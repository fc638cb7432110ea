pub mod config;
pub mod dataset;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod place;
pub mod staging;
