pub mod cli;
pub mod export;
pub mod load_config;
pub mod provider;
pub mod render;

pub use cli::{run, Cli, Commands};
