mod descriptor;
mod node;

pub(crate) use descriptor::*;
pub(crate) use node::*;

use crate::parser::ConfigError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct OptionId(usize);

/// The command tree.
///
/// Nodes and option descriptors live in two arenas.
/// Nodes refer to each other (parent/children) and to descriptors by index, so a descriptor is shared by every command it propagates to.
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<CommandNode>,
    options: Vec<OptionDescriptor>,
}

impl Tree {
    pub(crate) fn new(program: impl Into<String>) -> Self {
        Self {
            nodes: vec![CommandNode::new(
                program,
                NodeKind::Root,
                None,
                NodeSettings::default(),
            )],
            options: Vec::default(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn option(&self, id: OptionId) -> &OptionDescriptor {
        &self.options[id.0]
    }

    pub(crate) fn option_mut(&mut self, id: OptionId) -> &mut OptionDescriptor {
        &mut self.options[id.0]
    }

    /// Declare `descriptor` at `at`, and propagate it to every (non-help) command beneath.
    ///
    /// Nothing is changed when this fails.
    pub(crate) fn declare_option(
        &mut self,
        at: NodeId,
        descriptor: OptionDescriptor,
    ) -> Result<OptionId, ConfigError> {
        let node = self.node(at);

        for (i, alias) in descriptor.aliases().iter().enumerate() {
            if node.options.contains_key(alias) || descriptor.aliases()[..i].contains(alias) {
                return Err(ConfigError::DuplicateOption {
                    command: self.command_path(at).join(" "),
                    alias: alias.clone(),
                });
            }
        }

        let targets: Vec<NodeId> = std::iter::once(at)
            .chain(self.descendants(at))
            .filter(|id| self.node(*id).kind != NodeKind::Help)
            .collect();

        for target in &targets {
            let options = &self.node(*target).options;

            if let Some(alias) = descriptor
                .aliases()
                .iter()
                .find(|alias| options.contains_key(*alias))
            {
                return Err(ConfigError::AliasCollision {
                    command: self.command_path(*target).join(" "),
                    alias: alias.clone(),
                });
            }
        }

        let id = OptionId(self.options.len());
        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Declaring option {:?} as {id:?} across {} command(s).",
                descriptor.aliases(),
                targets.len()
            );
        }

        for target in targets {
            let options = &mut self.nodes[target.0].options;

            for alias in descriptor.aliases() {
                options.insert(alias.clone(), id);
            }
        }

        self.options.push(descriptor);
        Ok(id)
    }

    /// Declare the command `name` under `parent`.
    ///
    /// The new command inherits its parent's settings, and every option visible at the parent (unless it is the help command).
    pub(crate) fn declare_command(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, ConfigError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ConfigError::EmptyCommandName);
        }

        if self.node(parent).children.contains_key(&name) {
            return Err(ConfigError::DuplicateCommand(name));
        }

        let id = NodeId(self.nodes.len());
        let parent_node = self.node(parent);
        let mut node = CommandNode::new(name.clone(), kind, Some(parent), parent_node.settings);

        if kind != NodeKind::Help {
            node.options = parent_node.options.clone();
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Declaring command '{name}' as {id:?} under {parent:?}, inheriting {} option key(s).",
                node.options.len()
            );
        }

        self.nodes.push(node);
        self.node_mut(parent).children.insert(name, id);
        Ok(id)
    }

    /// Every node strictly beneath `id`, depth first.
    pub(crate) fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::default();
        let mut stack: Vec<NodeId> = self.node(id).children.values().rev().copied().collect();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.values().rev().copied());
        }

        out
    }

    /// The nodes from the root down to (and including) `id`.
    pub(crate) fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut current = id;

        while let Some(parent) = self.node(current).parent {
            out.push(parent);
            current = parent;
        }

        out.reverse();
        out
    }

    /// The names from the program down to `id`.
    pub(crate) fn command_path(&self, id: NodeId) -> Vec<&str> {
        self.path(id)
            .into_iter()
            .map(|node| self.node(node).name.as_str())
            .collect()
    }

    /// The distinct options visible at `id`, sorted by name.
    pub(crate) fn visible_options(&self, id: NodeId) -> Vec<OptionId> {
        let mut out: Vec<OptionId> = self.node(id).options.values().copied().collect();
        out.sort();
        out.dedup();
        out.sort_by(|a, b| self.option(*a).name().cmp(self.option(*b).name()));
        out
    }

    /// Clear everything gathered by a previous scan, so the tree may be scanned again.
    pub(crate) fn reset(&mut self) {
        for node in self.nodes.iter_mut() {
            node.text.clear();
            node.unknown.clear();
        }

        for option in self.options.iter_mut() {
            option.reset();
        }
    }
}
