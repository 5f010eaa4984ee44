mod config;
mod jobs;
mod root;

pub use config::ConfigCommand;
pub use jobs::JobsCommand;
pub use root::Cli;
