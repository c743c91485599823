use std::collections::BTreeMap;

use crate::model::UnknownMode;
use crate::parser::CommandFn;
use crate::tree::{NodeId, OptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    Command,
    // The built-in `help` command: never receives propagated options.
    Help,
}

/// Behaviour a command inherits from its parent when it is declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeSettings {
    pub unknown_mode: UnknownMode,
    pub require_order: bool,
    pub map_keys_lower: bool,
}

/// An option-looking token (or one bundled piece of it) that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnknownOption {
    pub index: usize,
    pub token: String,
    pub name: String,
    pub argument: Option<String>,
}

/// Completion candidates for a command's free text.
pub(crate) enum Suggestions {
    Static(Vec<String>),
    Dynamic(Box<dyn Fn(&str) -> Vec<String>>),
}

impl Suggestions {
    pub(crate) fn candidates(&self, partial: &str) -> Vec<String> {
        match self {
            Suggestions::Static(values) => values.clone(),
            Suggestions::Dynamic(provider) => provider(partial),
        }
    }
}

impl std::fmt::Debug for Suggestions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suggestions::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Suggestions::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

pub(crate) struct CommandNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub about: Option<String>,
    pub settings: NodeSettings,
    // Every name and alias visible at this command (its own and all inherited), mapping to the shared descriptor.
    pub options: BTreeMap<String, OptionId>,
    pub children: BTreeMap<String, NodeId>,
    pub text: Vec<String>,
    pub unknown: Vec<UnknownOption>,
    pub suggestions: Option<Suggestions>,
    pub handler: Option<CommandFn>,
}

impl CommandNode {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: NodeKind,
        parent: Option<NodeId>,
        settings: NodeSettings,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent,
            about: None,
            settings,
            options: BTreeMap::default(),
            children: BTreeMap::default(),
            text: Vec::default(),
            unknown: Vec::default(),
            suggestions: None,
            handler: None,
        }
    }
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("settings", &self.settings)
            .field("options", &self.options)
            .field("children", &self.children)
            .field("text", &self.text)
            .field("unknown", &self.unknown)
            .field("suggestions", &self.suggestions)
            .finish_non_exhaustive()
    }
}
