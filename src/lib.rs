pub mod cards;
pub mod config;
pub mod output;
pub mod scoring;
pub mod server;
pub mod store;
pub mod submit;
