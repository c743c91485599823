//! Builder module for `optree`.
//! See [documentation root](https://docs.rs/optree/latest/optree/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
#[cfg(feature = "interrupt")]
mod interrupt;
mod matcher;
mod model;
mod parser;
mod tree;

pub use api::*;
pub use constant::{COMPLETION_EXIT_CODE, COMPLETION_LINE_ENV, COMPLETION_READLINE_ENV};
#[cfg(feature = "interrupt")]
pub use interrupt::InterruptContext;
pub use model::*;
pub use parser::{
    ConfigError, ConsoleInterface, Error, ErrorContext, HandlerError, ParseError, Parsed, Program,
    UserInterface,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
