mod core;
mod option;

pub use self::core::{Command, CommandLineParser};
pub use option::Opt;
