use std::env;
use std::rc::Rc;

use crate::api::Opt;
use crate::constant::*;
use crate::model::{Mode, UnknownMode};
use crate::parser::{
    ConfigError, ConsoleInterface, EnvLookup, HandlerError, Parsed, Program, UserInterface,
};
use crate::tree::{NodeId, NodeKind, OptionDescriptor, Suggestions, Tree};

/// The command line parser builder.
///
/// Options and commands are declared in any order: an option declared at a command is visible in every command beneath it.
/// Every command starts with the help option (`--help`, `-?`).
///
/// ### Example
/// ```
/// # use optree_builder as optree;
/// use optree::{CommandLineParser, Opt};
///
/// let mut program = CommandLineParser::new("program")
///     .add(Opt::bool("verbose", false).alias("v"))
///     .command("greet", |cmd| cmd.add(Opt::string("name", "world")))
///     .build();
///
/// let parsed = program.parse_tokens(&["-v", "greet", "--na", "rust"]).unwrap();
/// assert_eq!(parsed.command_path(), vec!["greet"]);
/// assert_eq!(parsed.bool("verbose"), Some(true));
/// assert_eq!(parsed.string("name"), Some("rust"));
/// ```
pub struct CommandLineParser {
    tree: Tree,
    mode: Mode,
    windows: bool,
    env_lookup: EnvLookup,
    terminal_width: Option<usize>,
    deferred_error: Option<ConfigError>,
}

impl std::fmt::Debug for CommandLineParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLineParser")
            .field("tree", &self.tree)
            .field("mode", &self.mode)
            .field("windows", &self.windows)
            .field("deferred_error", &self.deferred_error)
            .finish_non_exhaustive()
    }
}

impl CommandLineParser {
    /// Create a command line parser.
    ///
    /// ### Example
    /// ```
    /// # use optree_builder as optree;
    /// use optree::CommandLineParser;
    ///
    /// let mut program = CommandLineParser::new("program")
    ///     .build();
    ///
    /// program.parse_tokens(empty::slice()).unwrap();
    /// ```
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tree: Tree::new(program),
            mode: Mode::default(),
            windows: false,
            env_lookup: Box::new(|variable: &str| env::var(variable).ok()),
            terminal_width: None,
            deferred_error: None,
        }
        .add(
            Opt::bool(HELP_NAME, false)
                .alias(HELP_ALIAS)
                .description(HELP_MESSAGE),
        )
    }

    fn root(&mut self) -> Command<'_> {
        Command {
            node: self.tree.root(),
            tree: &mut self.tree,
            deferred_error: &mut self.deferred_error,
        }
    }

    /// Document the about message for the program.
    /// If repeated, only the final message applies.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.root().about(description);
        self
    }

    /// Set how single-dash tokens are interpreted (default [`Mode::Normal`]).
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Also recognize `/name` (and `/name:argument`) as options.
    pub fn windows_style(mut self) -> Self {
        self.windows = true;
        self
    }

    /// Set the policy for unknown options at the program.
    /// Commands declared afterwards inherit it.
    pub fn unknown_mode(mut self, unknown_mode: UnknownMode) -> Self {
        self.root().unknown_mode(unknown_mode);
        self
    }

    /// Stop matching options at the first positional token of the program.
    /// Commands declared afterwards inherit it.
    pub fn require_order(mut self) -> Self {
        self.root().require_order();
        self
    }

    /// Lower-case the keys of map options at the program.
    /// Commands declared afterwards inherit it.
    pub fn map_keys_lower(mut self) -> Self {
        self.root().map_keys_lower();
        self
    }

    /// Replace how environment variables are read (default [`std::env::var`]).
    ///
    /// ### Example
    /// ```
    /// # use optree_builder as optree;
    /// use optree::{CommandLineParser, Opt};
    ///
    /// let mut program = CommandLineParser::new("program")
    ///     .add(Opt::int("port", 80).env("PORT"))
    ///     .env_lookup(|variable| (variable == "PORT").then(|| "8080".to_string()))
    ///     .build();
    ///
    /// let parsed = program.parse_tokens(empty::slice()).unwrap();
    /// assert_eq!(parsed.int("port"), Some(8080));
    /// assert_eq!(parsed.called_as("port"), Some("PORT"));
    /// ```
    pub fn env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Lay out help messages for a fixed terminal width, instead of detecting it.
    pub fn terminal_width(mut self, terminal_width: usize) -> Self {
        self.terminal_width.replace(terminal_width);
        self
    }

    /// Add an option to the program.
    /// It is visible at the program and every command beneath.
    pub fn add(mut self, option: Opt) -> Self {
        self.root().add(option);
        self
    }

    /// Add the command `name` to the program, declaring its contents via `setup`.
    ///
    /// ### Example
    /// ```
    /// # use optree_builder as optree;
    /// use optree::{CommandLineParser, Opt};
    ///
    /// let mut program = CommandLineParser::new("program")
    ///     .command("remote", |remote| {
    ///         remote
    ///             .about("Manage remotes.")
    ///             .command("add", |add| add.add(Opt::bool("fetch", false)))
    ///             .command("remove", |remove| remove)
    ///     })
    ///     .build();
    ///
    /// let parsed = program.parse_tokens(&["remote", "add", "--fetch", "origin"]).unwrap();
    /// assert_eq!(parsed.command_path(), vec!["remote", "add"]);
    /// assert_eq!(parsed.remaining(), &["origin".to_string()]);
    /// ```
    pub fn command(
        mut self,
        name: impl Into<String>,
        setup: impl FnOnce(Command<'_>) -> Command<'_>,
    ) -> Self {
        self.root().command(name, setup);
        self
    }

    /// Add the built-in `help` command: `program help <command>...` shows the help of that command.
    pub fn help_command(mut self) -> Self {
        let root = self.tree.root();

        match self.tree.declare_command(root, HELP_NAME, NodeKind::Help) {
            Ok(help) => {
                self.tree
                    .node_mut(help)
                    .about
                    .replace(HELP_COMMAND_MESSAGE.to_string());
            }
            Err(error) => defer(&mut self.deferred_error, error),
        }

        self
    }

    /// Set the function invoked by [`Program::dispatch`] when the program itself is the resolved command.
    pub fn handler(
        mut self,
        handler: impl Fn(&mut Parsed<'_>) -> Result<(), HandlerError> + 'static,
    ) -> Self {
        self.root().handler(handler);
        self
    }

    /// Completion candidates for the program's positional tokens.
    pub fn suggestions(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.root().suggestions(values);
        self
    }

    /// Compute completion candidates for the program's positional tokens from the partial word.
    pub fn dynamic_suggestions(
        mut self,
        provider: impl Fn(&str) -> Vec<String> + 'static,
    ) -> Self {
        self.root().dynamic_suggestions(provider);
        self
    }

    fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<Program, ConfigError> {
        if let Some(error) = self.deferred_error {
            return Err(error);
        }

        Ok(Program::new(
            self.tree,
            self.mode,
            self.windows,
            self.env_lookup,
            self.terminal_width,
            user_interface,
        ))
    }

    /// Build the command line parser as a Result, printing to a custom [`UserInterface`].
    /// This finalizes the configuration and reports the first declaration error (ex: a repeated option name).
    pub fn build_with(
        self,
        user_interface: impl UserInterface + 'static,
    ) -> Result<Program, ConfigError> {
        self.build_with_interface(Box::new(user_interface))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and reports the first declaration error (ex: a repeated option name).
    pub fn build_parser(self) -> Result<Program, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::default()))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated option name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> Program {
        match self.build_parser() {
            Ok(program) => program,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

/// A command under construction.
///
/// Received by the `setup` closure of [`CommandLineParser::command`] (and [`Command::command`]).
/// Declaration errors are reported when the parser is built.
pub struct Command<'t> {
    tree: &'t mut Tree,
    node: NodeId,
    deferred_error: &'t mut Option<ConfigError>,
}

impl<'t> Command<'t> {
    /// Document the about message for this command.
    /// If repeated, only the final message applies.
    pub fn about(self, description: impl Into<String>) -> Self {
        self.tree.node_mut(self.node).about.replace(description.into());
        self
    }

    /// Add an option to this command.
    /// It is visible at this command and every command beneath.
    pub fn add(self, option: Opt) -> Self {
        let result = OptionDescriptor::try_from(option)
            .and_then(|descriptor| self.tree.declare_option(self.node, descriptor));

        if let Err(error) = result {
            defer(self.deferred_error, error);
        }

        self
    }

    /// Add the sub-command `name`, declaring its contents via `setup`.
    pub fn command(
        self,
        name: impl Into<String>,
        setup: impl FnOnce(Command<'_>) -> Command<'_>,
    ) -> Self {
        match self.tree.declare_command(self.node, name, NodeKind::Command) {
            Ok(child) => {
                setup(Command {
                    tree: &mut *self.tree,
                    node: child,
                    deferred_error: &mut *self.deferred_error,
                });
            }
            Err(error) => defer(self.deferred_error, error),
        }

        self
    }

    /// Set the function invoked by [`Program::dispatch`] when this is the resolved command.
    pub fn handler(
        self,
        handler: impl Fn(&mut Parsed<'_>) -> Result<(), HandlerError> + 'static,
    ) -> Self {
        self.tree.node_mut(self.node).handler.replace(Rc::new(handler));
        self
    }

    /// Set the policy for unknown options at this command (and the sub-commands declared afterwards).
    pub fn unknown_mode(self, unknown_mode: UnknownMode) -> Self {
        self.tree.node_mut(self.node).settings.unknown_mode = unknown_mode;
        self
    }

    /// Stop matching options at the first positional token of this command (and the sub-commands declared afterwards).
    pub fn require_order(self) -> Self {
        self.tree.node_mut(self.node).settings.require_order = true;
        self
    }

    /// Lower-case the keys of map options at this command (and the sub-commands declared afterwards).
    pub fn map_keys_lower(self) -> Self {
        self.tree.node_mut(self.node).settings.map_keys_lower = true;
        self
    }

    /// Completion candidates for this command's positional tokens.
    pub fn suggestions(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.tree
            .node_mut(self.node)
            .suggestions
            .replace(Suggestions::Static(values));
        self
    }

    /// Compute completion candidates for this command's positional tokens from the partial word.
    pub fn dynamic_suggestions(self, provider: impl Fn(&str) -> Vec<String> + 'static) -> Self {
        self.tree
            .node_mut(self.node)
            .suggestions
            .replace(Suggestions::Dynamic(Box::new(provider)));
        self
    }
}

// The first declaration error wins.
fn defer(deferred_error: &mut Option<ConfigError>, error: ConfigError) {
    if deferred_error.is_none() {
        deferred_error.replace(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::util::InMemoryInterface;
    use crate::parser::Error;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[test]
    fn empty_build() {
        // Setup
        let clp = CommandLineParser::new("program");

        // Execute
        let mut program = clp.build_parser().unwrap();

        // Verify
        let parsed = program.parse_tokens(empty::slice()).unwrap();
        assert_eq!(parsed.command_path(), Vec::<&str>::default());
        assert!(parsed.remaining().is_empty());
        assert_eq!(parsed.bool("help"), Some(false));
    }

    #[test]
    fn help_option_propagates() {
        // Setup
        let interface = InMemoryInterface::default();
        let mut program = CommandLineParser::new("program")
            .command("sub", |sub| sub.about("A sub-command."))
            .build_with(interface.clone())
            .unwrap();

        // Execute
        let error = program.parse_tokens(&["sub", "-?"]).unwrap_err();

        // Verify
        assert_matches!(error, Error::Help);
        let message = interface.consume_message();
        assert_contains!(message, "usage: program sub [-?]");
        assert_contains!(message, "A sub-command.");
    }

    #[rstest]
    #[case(
        CommandLineParser::new("program").add(Opt::bool("help", false)),
        ConfigError::DuplicateOption { command: "program".to_string(), alias: "help".to_string() }
    )]
    #[case(
        CommandLineParser::new("program")
            .add(Opt::bool("verbose", false).alias("v"))
            .add(Opt::string("version", "").alias("v")),
        ConfigError::DuplicateOption { command: "program".to_string(), alias: "v".to_string() }
    )]
    #[case(
        CommandLineParser::new("program")
            .command("sub", |sub| sub.add(Opt::int("port", 0).alias("p")))
            .add(Opt::string("password", "").alias("p")),
        ConfigError::AliasCollision { command: "program sub".to_string(), alias: "p".to_string() }
    )]
    #[case(
        CommandLineParser::new("program")
            .command("sub", |sub| sub)
            .command("sub", |sub| sub),
        ConfigError::DuplicateCommand("sub".to_string())
    )]
    #[case(
        CommandLineParser::new("program").command("", |sub| sub),
        ConfigError::EmptyCommandName
    )]
    #[case(
        CommandLineParser::new("program")
            .command("help", |sub| sub)
            .help_command(),
        ConfigError::DuplicateCommand("help".to_string())
    )]
    #[case(
        CommandLineParser::new("program").command("sub", |sub| {
            sub.command("inner", |inner| inner.add(Opt::strings("items").args(2, 1)))
        }),
        ConfigError::InvalidArity { option: "items".to_string(), min: 2, max: 1 }
    )]
    fn config_errors(#[case] clp: CommandLineParser, #[case] expected: ConfigError) {
        assert_eq!(clp.build_parser().unwrap_err(), expected);
    }

    #[test]
    fn first_error_wins() {
        let clp = CommandLineParser::new("program")
            .add(Opt::bool("", false))
            .command("sub", |sub| sub)
            .command("sub", |sub| sub);

        assert_eq!(clp.build_parser().unwrap_err(), ConfigError::EmptyOptionName);
    }

    #[test]
    fn declaration_order_irrelevant() {
        // Setup
        let mut program = CommandLineParser::new("program")
            .command("sub", |sub| sub.command("inner", |inner| inner))
            .add(Opt::int("level", 1).alias("l"))
            .build_with(InMemoryInterface::default())
            .unwrap();

        // Execute
        let parsed = program.parse_tokens(&["sub", "inner", "-l", "3"]).unwrap();

        // Verify
        assert_eq!(parsed.command_path(), vec!["sub", "inner"]);
        assert_eq!(parsed.int("level"), Some(3));
        assert_eq!(parsed.called_as("level"), Some("l"));
    }

    #[test]
    fn settings_inherited_by_later_commands() {
        // Setup
        let mut program = CommandLineParser::new("program")
            .unknown_mode(UnknownMode::Pass)
            .command("sub", |sub| sub)
            .build_with(InMemoryInterface::default())
            .unwrap();

        // Execute
        let parsed = program.parse_tokens(&["sub", "--mystery"]).unwrap();

        // Verify
        assert_eq!(parsed.remaining(), &["--mystery".to_string()]);
    }
}
