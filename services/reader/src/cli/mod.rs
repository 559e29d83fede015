pub mod commands;
pub mod render;
pub mod shell;

pub use commands::{Command, CommandError};
pub use shell::{Flow, Shell};
