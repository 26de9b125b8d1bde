pub mod cli_args;
pub mod commands;
pub mod stats;

pub use cli_args::ArgsValidationError;
pub use cli_args::Command;
pub use cli_args::WorklogCli;
pub use commands::run;
