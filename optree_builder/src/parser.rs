mod base;
mod completion;
mod interface;
mod middleware;
mod printer;
mod scanner;

pub use base::*;
pub use interface::{ConsoleInterface, UserInterface};
pub use middleware::{Parsed, Program};
pub(crate) use middleware::{CommandFn, EnvLookup};
pub use printer::ErrorContext;

#[cfg(test)]
pub(crate) use interface::util;
