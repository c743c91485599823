//! `optree` is a command tree option parser for Rust.
//!
//! Programs are described as a tree of commands, each carrying options.
//! An option declared at a command is visible at every command beneath it, so global flags like `--verbose` are declared once at the root.
//! `optree` attempts to prioritize the following design concerns:
//! * *Familiar syntax*:
//! Long (`--name value`, `--name=value`) and short (`-n value`) options, in any of three short option styles (see [`Mode`]).
//! * *Forgiving input*:
//! Any unambiguous prefix of an option name is accepted (`--verb` for `--verbose`).
//! An ambiguous prefix is an error that lists the candidates.
//! * *Nested commands*:
//! Commands nest arbitrarily (`program remote add ...`), each with their own options, help message and handler.
//! * *Shell completion out of the box*:
//! The same scanner that parses the command line also completes it (see **Completion** below).
//! * *Lenient where asked*:
//! Unknown options may fail the parse, warn, or pass through to the program untouched (see [`UnknownMode`]).
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/greeter.rs")]
//! ```
//!
//! ```console
//! $ greeter hello -h
//! usage: greeter hello [-?] [-n NAME] [-t TIMES] [-v]
//!
//! Say hello.
//!
//! options:
//!  -?, --help          Show this help message and exit.
//!  -n, --name NAME     Who to greet. (env: GREETER_NAME)
//!  -t, --times TIMES   How many times to say it.
//!  -v, --verbose       Explain what happened.
//!
//! $ greeter hello --na rust -t 2
//! Hello, rust!
//! Hello, rust!
//!
//! $ greeter farewell --tone rude
//! Parse error: Option 'tone' does not accept 'rude' (valid values: polite, curt).
//! farewell --tone rude
//!                 ^
//! ```
//!
//! # Builder Api
//! Configure `optree` by starting with a [`CommandLineParser`], `add`ing options ([`Opt`]) and declaring commands ([`Command`]).
//! Declarations may happen in any order; errors (ex: a repeated option name) are reported when the parser is built.
//!
//! ### Option types
//! Every option has a type, chosen by its [`Opt`] constructor:
//! * [`Opt::bool`]: a flag. Giving it flips the default; an inline argument (`--flag=false`) is also accepted.
//! * [`Opt::string`], [`Opt::int`], [`Opt::float`]: a single value. Repeating the option overwrites it.
//! * [`Opt::strings`], [`Opt::ints`], [`Opt::string_map`]: accumulate values over every occurrence.
//! These accept an arity ([`Opt::args`]): `--port 1 2` fills a `1..=2` arity in one occurrence.
//! Integer lists also take ascending ranges (`1..3`), and maps take `key=value` pairs.
//!
//! ### Results
//! [`Program::parse`] returns the [`Parsed`] outcome: the resolved command path, the remaining text (positional tokens and everything after `--`), and typed accessors for the option values.
//! Alternatively, attach handlers to the commands and call [`Program::dispatch`].
//! A handler may [`Parsed::rescan`] its remaining text, continuing from the option values gathered so far.
//!
//! ```no_run
#![doc = include_str!("../demos/bundled.rs")]
//! ```
//!
//! # Cli Semantics
//! * Options are matched at the current command, against every name and alias visible there.
//! An exact match wins, otherwise a unique prefix.
//! * A positional token naming a sub-command descends into it; from then on, options of the sub-command (and everything inherited) apply.
//! * Option arguments are taken from the following tokens, but never from a token that looks like an option: use `--name=-1` for those.
//! * `--` ends option processing; everything after it is remaining text.
//! * Options may take their value from an environment variable when not given ([`Opt::env`]).
//!
//! # Completion
//! When `COMP_LINE` is set, [`Program::parse`] and [`Program::dispatch`] print the completion candidates for that line and exit with code `124`.
//! For bash:
//! ```console
//! $ complete -C greeter greeter
//! ```
//!
//! # Features
//! * `tracing_debug`: Emit `tracing` debug events from the scanner and the parse steps.
//! * `interrupt`: The [`InterruptContext`] for cancelling long running handlers on Ctrl-C.
pub use optree_builder::*;
