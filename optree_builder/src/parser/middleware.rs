use std::collections::BTreeMap;
use std::env;
use std::rc::Rc;

use crate::constant::*;
use crate::model::{CompletionMode, Mode, UnknownMode, Value};
use crate::parser::completion::split_line;
use crate::parser::interface::UserInterface;
use crate::parser::printer::{ErrorContext, Printer};
use crate::parser::scanner::{scan, ScanError};
use crate::parser::{Error, HandlerError, ParseError};
use crate::tree::{NodeId, NodeKind, OptionDescriptor, Tree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

pub(crate) type CommandFn = Rc<dyn Fn(&mut Parsed<'_>) -> Result<(), HandlerError>>;
pub(crate) type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// A built command line parser.
///
/// Build via [`CommandLineParser`](crate::CommandLineParser).
pub struct Program {
    tree: Tree,
    mode: Mode,
    windows: bool,
    env_lookup: EnvLookup,
    terminal_width: Option<usize>,
    user_interface: Box<dyn UserInterface>,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("tree", &self.tree)
            .field("mode", &self.mode)
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}

impl Program {
    pub(crate) fn new(
        tree: Tree,
        mode: Mode,
        windows: bool,
        env_lookup: EnvLookup,
        terminal_width: Option<usize>,
        user_interface: Box<dyn UserInterface>,
    ) -> Self {
        Self {
            tree,
            mode,
            windows,
            env_lookup,
            terminal_width,
            user_interface,
        }
    }

    /// Run the parser against the input tokens.
    ///
    /// Parsing happens in two phases:
    /// 1. The tokens are scanned, descending into commands and saving option values as they are matched.
    /// 2. The resolved command is settled, in order:
    ///    help (printed, returning [`Error::Help`]),
    ///    unknown options (per each command's [`UnknownMode`]),
    ///    environment variables (for options not given on the command line),
    ///    and finally required options.
    ///
    /// Errors are printed to the user interface before being returned.
    pub fn parse_tokens(&mut self, tokens: &[&str]) -> Result<Parsed<'_>, Error> {
        let tokens: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
        self.tree.reset();
        let root = self.tree.root();

        let node = match scan(None, &mut self.tree, root, &tokens, self.mode, self.windows) {
            Ok(scan) => scan.node,
            Err(ScanError { index, error }) => return Err(self.fail(error, Some(index), &tokens)),
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Scanned {} token(s), resolving to '{}'.",
                tokens.len(),
                self.tree.command_path(node).join(" ")
            );
        }

        self.settle(node, &tokens)?;
        Ok(Parsed {
            program: self,
            node,
        })
    }

    /// Run the parser against the process arguments ([`env::args`]).
    ///
    /// When the shell is asking for completions (`COMP_LINE` is set), the candidates are printed instead and the process exits with code `124`.
    /// Otherwise, on any error the process exits (via `std::process::exit`) with [`Error::exit_code`].
    pub fn parse(&mut self) -> Parsed<'_> {
        let arguments: Vec<String> = env::args().skip(1).collect();
        self.answer_completion(&arguments);
        let tokens: Vec<&str> = arguments.iter().map(AsRef::as_ref).collect();

        match self.parse_tokens(&tokens) {
            Ok(parsed) => parsed,
            Err(error) => std::process::exit(error.exit_code()),
        }
    }

    /// Parse the input tokens, and then invoke the handler of the resolved command.
    ///
    /// A resolved command without a handler prints its help when it has sub-commands (returning [`Error::Help`]), and otherwise does nothing.
    pub fn dispatch_tokens(&mut self, tokens: &[&str]) -> Result<(), Error> {
        let result = self.parse_tokens(tokens)?.run();

        if let Err(error @ Error::Handler(_)) = &result {
            self.user_interface.print_error(error);
        }

        result
    }

    /// Dispatch against the process arguments ([`env::args`]).
    ///
    /// Completion and exit behaviour is the same as [`Program::parse`].
    pub fn dispatch(&mut self) {
        let arguments: Vec<String> = env::args().skip(1).collect();
        self.answer_completion(&arguments);
        let tokens: Vec<&str> = arguments.iter().map(AsRef::as_ref).collect();

        if let Err(error) = self.dispatch_tokens(&tokens) {
            std::process::exit(error.exit_code());
        }
    }

    /// The completion candidates for the partial command `line` (including the program name), where `current_word` is the word under the cursor.
    ///
    /// Scanning errors yield no candidates.
    pub fn complete(
        &mut self,
        line: &str,
        current_word: &str,
        mode: CompletionMode,
    ) -> Vec<String> {
        let tokens = split_line(line, current_word);
        self.tree.reset();
        let root = self.tree.root();

        match scan(Some(mode), &mut self.tree, root, &tokens, self.mode, self.windows) {
            Ok(scan) => scan.completions,
            Err(ScanError { error: _error, .. }) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("No completions: {_error}");
                }
                Vec::default()
            }
        }
    }

    /// The help message of the command at `command_path` (the command names below the program).
    pub fn help(&self, command_path: &[&str]) -> Option<String> {
        let mut node = self.tree.root();

        for name in command_path {
            node = *self.tree.node(node).children.get(*name)?;
        }

        Some(self.printer().render(node).join("\n"))
    }

    fn answer_completion(&mut self, arguments: &[String]) {
        if let Some(line) = (self.env_lookup)(COMPLETION_LINE_ENV) {
            let mode = if (self.env_lookup)(COMPLETION_READLINE_ENV).is_some() {
                CompletionMode::Readline
            } else {
                CompletionMode::Shell
            };
            // The shell invokes `program <command> <word> <previous-word>`.
            let current_word = arguments.get(1).map(String::as_str).unwrap_or_default();
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Completing '{current_word}' in {mode:?} mode for the line '{line}'.");
            }

            for candidate in self.complete(&line, current_word, mode) {
                self.user_interface.print_completion(candidate);
            }

            std::process::exit(COMPLETION_EXIT_CODE);
        }
    }

    fn settle(&mut self, node: NodeId, tokens: &[String]) -> Result<(), Error> {
        if self.tree.node(node).kind == NodeKind::Help {
            let target = self.help_target(node);
            self.print_help(target);
            return Err(Error::Help);
        }

        if self.help_requested(node) {
            self.print_help(node);
            return Err(Error::Help);
        }

        for id in self.tree.path(node) {
            let command = self.tree.node(id);
            let mut last_index = None;

            for unknown in &command.unknown {
                // Pieces of the same bundled token are reported once.
                if last_index == Some(unknown.index) {
                    continue;
                }
                last_index = Some(unknown.index);

                match command.settings.unknown_mode {
                    UnknownMode::Fail => {
                        return Err(self.fail(
                            ParseError::UnknownOption(unknown.token.clone()),
                            Some(unknown.index),
                            tokens,
                        ));
                    }
                    UnknownMode::Warn => {
                        self.user_interface
                            .print_warning(format!("Unknown option '{}'.", unknown.token));
                    }
                    UnknownMode::Pass => {}
                }
            }
        }

        self.apply_env(node);

        for id in self.tree.visible_options(node) {
            let option = self.tree.option(id);

            if option.required && !option.is_called() {
                let error = ParseError::MissingRequiredOption(option.name().to_string());
                return Err(self.fail(error, None, tokens));
            }
        }

        Ok(())
    }

    // Fill in each option not given on the command line from its environment variable (if any).
    // Values that don't convert are ignored.
    fn apply_env(&mut self, node: NodeId) {
        let lower_keys = self.tree.node(node).settings.map_keys_lower;

        for id in self.tree.visible_options(node) {
            let option = self.tree.option(id);

            let variable = match &option.env {
                Some(variable) if !option.is_called() => variable.clone(),
                _ => continue,
            };

            let value = match (self.env_lookup)(&variable) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };

            let mut candidate = option.clone();
            candidate.mark_called(variable);

            match candidate.save(&value, lower_keys) {
                Ok(()) => *self.tree.option_mut(id) = candidate,
                Err(_error) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Ignoring the environment value: {_error}");
                    }
                }
            }
        }
    }

    fn help_requested(&self, node: NodeId) -> bool {
        self.tree
            .node(node)
            .options
            .get(HELP_NAME)
            .map(|id| self.tree.option(*id).is_called())
            .unwrap_or(false)
    }

    // `help a b` shows the help of the command `a b`, or of its deepest existing prefix.
    fn help_target(&self, help: NodeId) -> NodeId {
        let command = self.tree.node(help);
        let mut target = command.parent.unwrap_or_else(|| self.tree.root());

        for name in &command.text {
            match self.tree.node(target).children.get(name) {
                Some(child) if self.tree.node(*child).kind != NodeKind::Help => target = *child,
                _ => break,
            }
        }

        target
    }

    fn printer(&self) -> Printer<'_> {
        match self.terminal_width {
            Some(terminal_width) => Printer::new(&self.tree, Some(terminal_width)),
            None => Printer::terminal(&self.tree),
        }
    }

    fn print_help(&self, node: NodeId) {
        for line in self.printer().render(node) {
            self.user_interface.print(line);
        }
    }

    fn fail(&self, error: ParseError, index: Option<usize>, tokens: &[String]) -> Error {
        let error = Error::Parse(error);
        self.user_interface.print_error(&error);

        if let Some(index) = index {
            self.user_interface
                .print_error_context(ErrorContext::new(index, tokens));
        }

        error
    }
}

/// The outcome of a successful parse: the resolved command, and the values of the options visible there.
///
/// Options are looked up by their name or any alias.
/// The typed getters return `None` when no such option is visible, or when the type doesn't match.
pub struct Parsed<'p> {
    program: &'p mut Program,
    node: NodeId,
}

impl<'p> std::fmt::Debug for Parsed<'p> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parsed")
            .field("command_path", &self.command_path())
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl<'p> Parsed<'p> {
    /// The command names from below the program down to the resolved command (empty when it is the program itself).
    pub fn command_path(&self) -> Vec<&str> {
        let mut path = self.program.tree.command_path(self.node);
        path.remove(0);
        path
    }

    /// The text gathered at the resolved command: its positional tokens, everything after `--`, and any forwarded unknown options.
    pub fn remaining(&self) -> &[String] {
        &self.program.tree.node(self.node).text
    }

    /// Whether the option was given (on the command line or via its environment variable).
    pub fn called(&self, name: &str) -> bool {
        self.option(name)
            .map(|option| option.is_called())
            .unwrap_or(false)
    }

    /// The alias the option was given by (or the environment variable name, when it came from the environment).
    pub fn called_as(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(|option| option.used_alias())
    }

    /// The value of the option (its default, when not called).
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.option(name).map(|option| option.value())
    }

    #[allow(missing_docs)]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.value(name)? {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.value(name)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn strings(&self, name: &str) -> Option<&[String]> {
        match self.value(name)? {
            Value::Strings(values) => Some(values),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn ints(&self, name: &str) -> Option<&[i64]> {
        match self.value(name)? {
            Value::Ints(values) => Some(values),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn string_map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        match self.value(name)? {
            Value::StringMap(values) => Some(values),
            _ => None,
        }
    }

    /// The help message of the resolved command.
    pub fn help(&self) -> String {
        self.program.printer().render(self.node).join("\n")
    }

    fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        let tree = &self.program.tree;
        tree.node(self.node)
            .options
            .get(name)
            .map(|id| tree.option(*id))
    }

    /// Scan `tokens` from the resolved command onwards, on top of the option values gathered so far.
    ///
    /// This lets a handler parse its [`remaining`](Parsed::remaining) text once it knows how to.
    /// The resolved command's text is replaced, descending into sub-commands moves the resolved command,
    /// and the outcome is settled the same way as [`Program::parse_tokens`] (help, unknown options, environment variables, required options).
    pub fn rescan(&mut self, tokens: &[&str]) -> Result<(), Error> {
        let tokens: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
        let program = &mut *self.program;

        // Unknown options found earlier have been settled already.
        for id in program.tree.path(self.node) {
            program.tree.node_mut(id).unknown.clear();
        }
        program.tree.node_mut(self.node).text.clear();

        let node = match scan(
            None,
            &mut program.tree,
            self.node,
            &tokens,
            program.mode,
            program.windows,
        ) {
            Ok(scan) => scan.node,
            Err(ScanError { index, error }) => {
                return Err(program.fail(error, Some(index), &tokens))
            }
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Rescanned {} token(s), resolving to '{}'.",
                tokens.len(),
                program.tree.command_path(node).join(" ")
            );
        }

        self.node = node;
        program.settle(node, &tokens)
    }

    pub(crate) fn run(&mut self) -> Result<(), Error> {
        let command = self.program.tree.node(self.node);
        let handler = command.handler.clone();
        let has_children = !command.children.is_empty();

        match handler {
            Some(handler) => handler(self).map_err(Error::Handler),
            None if has_children => {
                self.program.print_help(self.node);
                Err(Error::Help)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandLineParser, Opt};
    use crate::parser::util::InMemoryInterface;
    use crate::test::assert_contains;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn build(clp: CommandLineParser) -> (Program, InMemoryInterface) {
        let interface = InMemoryInterface::default();
        let program = clp
            .terminal_width(80)
            .build_with(interface.clone())
            .unwrap();
        (program, interface)
    }

    fn environment(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + 'static {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| variables.get(name).cloned()
    }

    fn owned(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    fn remote() -> CommandLineParser {
        CommandLineParser::new("program")
            .about("Does things.")
            .add(Opt::bool("verbose", false).alias("v"))
            .command("remote", |remote| {
                remote
                    .about("Manage remotes.")
                    .command("add", |add| {
                        add.about("Add a remote.")
                            .add(Opt::bool("fetch", false))
                    })
            })
            .help_command()
    }

    #[test]
    fn help_option() {
        // Setup
        let (mut program, interface) = build(remote());

        // Execute
        let error = program.parse_tokens(&["-v", "--help"]).unwrap_err();

        // Verify
        assert_matches!(error, Error::Help);
        let message = interface.consume_message();
        assert_contains!(message, "usage: program [-?] [-v] <command> ...");
        assert_contains!(message, "Does things.");
    }

    #[test]
    fn help_beats_unknown() {
        let (mut program, interface) = build(remote());

        let error = program.parse_tokens(&["--mystery", "-?"]).unwrap_err();

        assert_matches!(error, Error::Help);
        assert_contains!(interface.consume_message(), "usage: program [-?]");
    }

    #[rstest]
    #[case(vec!["help"], "usage: program [-?]")]
    #[case(vec!["help", "remote"], "usage: program remote [-?]")]
    #[case(vec!["help", "remote", "add"], "Add a remote.")]
    #[case(vec!["help", "remote", "nope"], "usage: program remote [-?]")]
    #[case(vec!["help", "nope", "add"], "usage: program [-?]")]
    #[case(vec!["remote", "add", "--help"], "usage: program remote add [--fetch] [-?] [-v]")]
    fn help_command(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let (mut program, interface) = build(remote());

        // Execute
        let error = program.parse_tokens(&tokens).unwrap_err();

        // Verify
        assert_matches!(error, Error::Help);
        assert_contains!(interface.consume_message(), expected);
    }

    #[test]
    fn unknown_fail() {
        // Setup
        let (mut program, interface) = build(remote());

        // Execute
        let error = program
            .parse_tokens(&["--verbose", "--mystery", "remote"])
            .unwrap_err();

        // Verify
        assert_matches!(error, Error::Parse(ParseError::UnknownOption(token)) => {
            assert_eq!(token, "--mystery");
        });
        let recorded = interface.consume();
        assert_eq!(
            recorded.errors,
            vec!["Parse error: Unknown option '--mystery'.".to_string()]
        );
        assert_eq!(
            recorded.error_context,
            Some(ErrorContext::new(
                1,
                &owned(&["--verbose", "--mystery", "remote"])
            ))
        );
    }

    #[test]
    fn unknown_warn() {
        // Setup
        let (mut program, interface) = build(
            CommandLineParser::new("program")
                .mode(Mode::Bundling)
                .unknown_mode(UnknownMode::Warn)
                .add(Opt::bool("all", false).alias("a")),
        );

        // Execute
        let parsed = program.parse_tokens(&["-xaz", "--mystery", "text"]).unwrap();

        // Verify
        assert_eq!(parsed.remaining(), &owned(&["-xaz", "--mystery", "text"]));
        assert_eq!(parsed.bool("all"), Some(true));
        let recorded = interface.consume();
        assert_eq!(
            recorded.warnings,
            vec![
                "Unknown option '-xaz'.".to_string(),
                "Unknown option '--mystery'.".to_string(),
            ]
        );
        assert!(recorded.errors.is_empty());
    }

    #[test]
    fn unknown_pass() {
        let (mut program, interface) = build(
            CommandLineParser::new("program")
                .unknown_mode(UnknownMode::Pass)
                .add(Opt::string("name", "")),
        );

        let parsed = program
            .parse_tokens(&["--mystery=1", "--name", "x"])
            .unwrap();

        assert_eq!(parsed.remaining(), &owned(&["--mystery=1"]));
        assert_eq!(parsed.string("name"), Some("x"));
        assert!(interface.consume().warnings.is_empty());
    }

    #[rstest]
    #[case(vec![], vec![("PORT", "8080")], 8080, Some("PORT"))]
    #[case(vec!["--port", "1"], vec![("PORT", "8080")], 1, Some("port"))]
    #[case(vec![], vec![("PORT", "not-a-number")], 80, None)]
    #[case(vec![], vec![("PORT", "")], 80, None)]
    #[case(vec![], vec![], 80, None)]
    fn env_fallback(
        #[case] tokens: Vec<&str>,
        #[case] variables: Vec<(&str, &str)>,
        #[case] expected: i64,
        #[case] called_as: Option<&str>,
    ) {
        // Setup
        let (mut program, _) = build(
            CommandLineParser::new("program")
                .add(Opt::int("port", 80).env("PORT"))
                .env_lookup(environment(&variables)),
        );

        // Execute
        let parsed = program.parse_tokens(&tokens).unwrap();

        // Verify
        assert_eq!(parsed.int("port"), Some(expected));
        assert_eq!(parsed.called("port"), called_as.is_some());
        assert_eq!(parsed.called_as("port"), called_as);
    }

    #[test]
    fn required_from_env() {
        let (mut program, _) = build(
            CommandLineParser::new("program")
                .add(Opt::string("token", "").env("TOKEN").required())
                .env_lookup(environment(&[("TOKEN", "abc")])),
        );

        let parsed = program.parse_tokens(empty::slice()).unwrap();

        assert_eq!(parsed.string("token"), Some("abc"));
    }

    #[test]
    fn required_missing() {
        // Setup
        let (mut program, interface) = build(
            CommandLineParser::new("program")
                .command("login", |login| login.add(Opt::string("token", "").required()))
                .env_lookup(environment(&[])),
        );

        // Execute
        let root = program.parse_tokens(empty::slice()).is_ok();
        let login = program.parse_tokens(&["login"]).unwrap_err();

        // Verify
        assert!(root);
        assert_matches!(login, Error::Parse(ParseError::MissingRequiredOption(name)) => {
            assert_eq!(name, "token");
        });
        let recorded = interface.consume();
        assert_eq!(
            recorded.errors,
            vec!["Parse error: Missing required option 'token'.".to_string()]
        );
        assert_eq!(recorded.error_context, None);
    }

    #[test]
    fn scan_error_context() {
        let (mut program, interface) =
            build(CommandLineParser::new("program").add(Opt::int("count", 0)));

        let error = program.parse_tokens(&["--count", "many"]).unwrap_err();

        assert_matches!(error, Error::Parse(ParseError::InvalidConversion { .. }));
        let recorded = interface.consume();
        assert_eq!(
            recorded.error_context.unwrap().to_string(),
            "--count many\n        ^"
        );
    }

    #[test]
    fn parse_tokens_resets() {
        // Setup
        let (mut program, _) = build(remote());

        // Execute
        let first = program
            .parse_tokens(&["remote", "add", "--fetch", "origin"])
            .map(|parsed| (parsed.bool("fetch"), parsed.remaining().to_vec()))
            .unwrap();
        let parsed = program.parse_tokens(&["remote", "add"]).unwrap();

        // Verify
        assert_eq!(first, (Some(true), owned(&["origin"])));
        assert_eq!(parsed.bool("fetch"), Some(false));
        assert!(parsed.remaining().is_empty());
    }

    #[test]
    fn getters() {
        let (mut program, _) = build(
            CommandLineParser::new("program")
                .add(Opt::bool("verbose", false).alias("v"))
                .add(Opt::float("ratio", 0.5))
                .add(Opt::strings("item").args(1, 2))
                .add(Opt::string_map("label")),
        );

        let parsed = program
            .parse_tokens(&["--item", "a", "b", "--label", "k=v", "--", "--verbose"])
            .unwrap();

        assert_eq!(parsed.bool("v"), Some(false));
        assert_eq!(parsed.float("ratio"), Some(0.5));
        assert_eq!(parsed.strings("item"), Some(&owned(&["a", "b"])[..]));
        assert_eq!(
            parsed.string_map("label"),
            Some(&BTreeMap::from([("k".to_string(), "v".to_string())]))
        );
        assert_eq!(parsed.remaining(), &owned(&["--verbose"]));
        assert_eq!(parsed.int("verbose"), None);
        assert_eq!(parsed.value("missing"), None);
        assert!(!parsed.called("missing"));
    }

    #[test]
    fn dispatch() {
        // Setup
        let seen = Rc::new(RefCell::new(Vec::default()));
        let record = seen.clone();
        let (mut program, _) = build(CommandLineParser::new("program").command(
            "greet",
            move |greet| {
                greet
                    .add(Opt::string("name", "world"))
                    .handler(move |parsed| {
                        let name = parsed.string("name").unwrap_or_default();
                        record.borrow_mut().push(name.to_string());
                        Ok(())
                    })
            },
        ));

        // Execute
        program.dispatch_tokens(&["greet"]).unwrap();
        program.dispatch_tokens(&["greet", "--name", "rust"]).unwrap();

        // Verify
        assert_eq!(*seen.borrow(), vec!["world".to_string(), "rust".to_string()]);
    }

    #[test]
    fn dispatch_without_handler() {
        // Setup
        let (mut program, interface) = build(remote());

        // Execute
        let parent = program.dispatch_tokens(&["remote"]).unwrap_err();
        let message = interface.consume_message();
        let leaf = program.dispatch_tokens(&["remote", "add"]);

        // Verify
        assert_matches!(parent, Error::Help);
        assert_contains!(message, "usage: program remote [-?]");
        assert_matches!(leaf, Ok(()));
    }

    #[test]
    fn dispatch_handler_error() {
        // Setup
        let (mut program, interface) = build(
            CommandLineParser::new("program").handler(|_| Err("boom".into())),
        );

        // Execute
        let error = program.dispatch_tokens(empty::slice()).unwrap_err();

        // Verify
        assert_matches!(error, Error::Handler(_));
        assert_eq!(error.exit_code(), 1);
        assert_eq!(
            interface.consume().errors,
            vec!["Command error: boom".to_string()]
        );
    }

    #[test]
    fn rescan_continues() {
        // Setup
        let seen = Rc::new(RefCell::new(Vec::default()));
        let record = seen.clone();
        let (mut program, _) = build(
            CommandLineParser::new("program")
                .add(Opt::bool("verbose", false).alias("v"))
                .add(Opt::strings("tag"))
                .require_order()
                .handler(move |parsed| {
                    // The first word says how to read the rest.
                    let rest = parsed.remaining().to_vec();
                    let rest: Vec<&str> = rest.iter().skip(1).map(String::as_str).collect();
                    parsed.rescan(&rest)?;
                    record.borrow_mut().push((
                        parsed.bool("verbose"),
                        parsed.strings("tag").map(<[String]>::to_vec),
                        parsed.remaining().to_vec(),
                    ));
                    Ok(())
                }),
        );

        // Execute
        program
            .dispatch_tokens(&["-v", "--tag", "a", "then", "--tag", "b", "tail"])
            .unwrap();

        // Verify
        assert_eq!(
            *seen.borrow(),
            vec![(Some(true), Some(owned(&["a", "b"])), owned(&["tail"]))]
        );
    }

    #[rstest]
    #[case(vec!["deploy", "--region", "eu"], Ok(vec!["deploy".to_string()]))]
    #[case(vec!["deploy"], Err("region".to_string()))]
    fn rescan_settles_final_command(
        #[case] rest: Vec<&'static str>,
        #[case] expected: Result<Vec<String>, String>,
    ) {
        // Setup
        let seen = Rc::new(RefCell::new(Vec::default()));
        let record = seen.clone();
        let (mut program, _) = build(
            CommandLineParser::new("program")
                .command("deploy", |deploy| {
                    deploy.add(Opt::string("region", "").required())
                })
                .handler(move |parsed| {
                    let outcome = match parsed.rescan(&rest) {
                        Ok(()) => Ok(parsed
                            .command_path()
                            .into_iter()
                            .map(String::from)
                            .collect()),
                        Err(Error::Parse(ParseError::MissingRequiredOption(option))) => {
                            Err(option)
                        }
                        Err(error) => panic!("unexpected error: {error}"),
                    };
                    record.borrow_mut().push(outcome);
                    Ok(())
                }),
        );

        // Execute
        // Nothing past `--` is scanned, so the first pass stays at the program.
        let first = program
            .parse_tokens(&["--", "deploy"])
            .map(|parsed| parsed.command_path().len());
        program.dispatch_tokens(&["--", "deploy"]).unwrap();

        // Verify
        assert_matches!(first, Ok(0));
        assert_eq!(*seen.borrow(), vec![expected]);
    }

    #[rstest]
    #[case("program --ver", "--ver", vec!["--verbose"])]
    #[case("program re", "re", vec!["remote"])]
    #[case("program remote ", "", vec!["add"])]
    #[case("program --mystery=", "--mystery=", vec![])]
    fn complete(#[case] line: &str, #[case] current_word: &str, #[case] expected: Vec<&str>) {
        let (mut program, interface) = build(remote());

        let completions = program.complete(line, current_word, CompletionMode::Shell);

        assert_eq!(completions, expected);
        assert!(interface.consume().completions.is_empty());
    }

    #[test]
    fn help_lookup() {
        let (program, _) = build(remote());

        assert_contains!(program.help(&["remote"]).unwrap(), "Manage remotes.");
        assert_contains!(program.help(&[]).unwrap(), "usage: program [-?]");
        assert_eq!(program.help(&["nope"]), None);
    }
}
