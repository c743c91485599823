use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::ValueKind;
use crate::parser::interface::ColumnRenderer;
use crate::tree::{NodeId, OptionDescriptor, Tree};

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

/// Renders the help for a command.
pub(crate) struct Printer<'t> {
    tree: &'t Tree,
    terminal_width: Option<usize>,
}

impl<'t> Printer<'t> {
    pub(crate) fn terminal(tree: &'t Tree) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(tree, terminal_width)
    }

    pub(crate) fn new(tree: &'t Tree, terminal_width: Option<usize>) -> Self {
        Self {
            tree,
            terminal_width,
        }
    }

    pub(crate) fn render(&self, node: NodeId) -> Vec<String> {
        let command = self.tree.node(node);
        let mut summary = Vec::default();
        let mut options = Vec::default();

        for id in self.tree.visible_options(node) {
            let option = self.tree.option(id);
            let (flags, usage) = flags(option);

            if option.required {
                summary.push(usage);
            } else {
                summary.push(format!("[{usage}]"));
            }

            options.push((flags, option_help(option)));
        }

        let commands: Vec<(String, String)> = command
            .children
            .iter()
            .map(|(name, child)| {
                (
                    name.clone(),
                    self.tree.node(*child).about.clone().unwrap_or_default(),
                )
            })
            .collect();

        if !commands.is_empty() {
            summary.push("<command> ...".to_string());
        }

        let left_column_width = options
            .iter()
            .chain(commands.iter())
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or_default();
        let middle_column_width = options
            .iter()
            .chain(commands.iter())
            .map(|(_, middle)| middle.chars().count() + MAIN_INDENT)
            .max()
            .unwrap_or_default();
        let column_renderer = ColumnRenderer::guided(
            PADDING_WIDTH,
            left_column_width,
            std::cmp::max(middle_column_width, 2),
            self.terminal_width,
        );

        let program = self.tree.command_path(node).join(" ");
        let mut lines = if summary.is_empty() {
            vec![format!("usage: {program}")]
        } else {
            vec![format!("usage: {program} {}", summary.join(" "))]
        };

        if let Some(about) = &command.about {
            lines.push(String::default());
            lines.push(about.clone());
        }

        if !commands.is_empty() {
            lines.push(String::default());
            lines.push("commands:".to_string());

            for (name, about) in &commands {
                lines.extend(column_renderer.render(MAIN_INDENT, name, about));
            }
        }

        if !options.is_empty() {
            lines.push(String::default());
            lines.push("options:".to_string());

            for (flags, help) in &options {
                lines.extend(column_renderer.render(MAIN_INDENT, flags, help));
            }
        }

        lines
    }
}

/// The listing (`-n, --name NAME`) and usage (`-n NAME`) forms of the option.
fn flags(option: &OptionDescriptor) -> (String, String) {
    let mut forms: Vec<String> = option
        .aliases()
        .iter()
        .map(|alias| {
            if alias.chars().count() == 1 {
                format!("-{alias}")
            } else {
                format!("--{alias}")
            }
        })
        .collect();
    // Short forms first; the sort is stable so declaration order holds otherwise.
    forms.sort_by_key(|form| form.starts_with("--"));

    let grammar = grammar(option);
    (
        format!("{}{grammar}", forms.join(", ")),
        format!("{}{grammar}", forms[0]),
    )
}

fn grammar(option: &OptionDescriptor) -> String {
    let example = match &option.arg_name {
        Some(arg_name) => arg_name.clone(),
        None if option.kind() == ValueKind::StringMap => "KEY=VALUE".to_string(),
        None => option.name().to_ascii_uppercase().replace('-', "_"),
    };
    let bound = option.bound();

    if bound.max() == 0 {
        return String::default();
    }

    let mut out = " ".to_string();
    out.push_str(
        &std::iter::repeat(example)
            .take(bound.min())
            .collect::<Vec<String>>()
            .join(" "),
    );

    if bound.max() > bound.min() {
        out.push_str(" [...]");
    }

    if option.optional {
        format!(" [{}]", out.trim_start())
    } else {
        out
    }
}

fn option_help(option: &OptionDescriptor) -> String {
    let mut parts = Vec::default();

    if !option.valid.is_empty() {
        parts.push(format!("{{{}}}", option.valid.join(", ")));
    }

    if let Some(description) = &option.description {
        parts.push(description.clone());
    }

    if let Some(env) = &option.env {
        parts.push(format!("(env: {env})"));
    }

    parts.join(" ")
}

/// The command line, with a marker under the token that caused a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    index: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(index: usize, tokens: &[String]) -> Self {
        Self {
            index,
            tokens: tokens.to_vec(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width: usize = self
            .tokens
            .iter()
            .take(self.index)
            .map(|token| token.chars().count() + 1)
            .sum();

        write!(f, "{}\n{:width$}^", self.tokens.join(" "), "")
    }
}
