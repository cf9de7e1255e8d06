pub mod commands;
pub mod config;

pub use commands::{
    export_project, import_document, run, validate_project, Cli, CommandError, Commands, Summary,
};
pub use config::{Config, ConfigError};
