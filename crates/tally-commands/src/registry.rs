//! Command registry: lookup, introspection, and guarded execution.

use std::collections::HashMap;

use crate::builtins;
use crate::command::{Command, CommandError};
use crate::metadata::{CommandMetadata, CommandResult};
use tally_core::Value;

/// The fixed catalog of named commands.
///
/// Built once at startup and shared read-only from then on; execution
/// never mutates it, so it can sit behind an `Arc` across workers.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    /// Registration order, so `list()` is stable for UIs.
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The catalog with every built-in command registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for command in builtins::all() {
            registry.register(command);
        }
        registry
    }

    /// Register a command under its declared name. A later registration
    /// with the same name replaces the earlier one.
    pub fn register(&mut self, command: Box<dyn Command>) {
        let name = command.metadata().name;
        if self.commands.insert(name.clone(), command).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Full catalog metadata, in registration order.
    pub fn list(&self) -> Vec<CommandMetadata> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .map(|cmd| cmd.metadata())
            .collect()
    }

    /// Catalog metadata filtered by category tag.
    pub fn commands_by_category(&self, category: &str) -> Vec<CommandMetadata> {
        self.list()
            .into_iter()
            .filter(|meta| meta.category == category)
            .collect()
    }

    /// Registered command names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Execute a command by name against evaluated arguments.
    ///
    /// Every failure mode - unknown name, missing required arguments, too
    /// many arguments, or a fault inside the command body - comes back as
    /// a failed [`CommandResult`], never a panic.
    pub fn execute(&self, name: &str, args: &[Value]) -> CommandResult {
        let command = match self.get(name) {
            Some(command) => command,
            None => return CommandResult::fail(format!("Unknown command: {name}")),
        };

        let arity = command.arity();
        if args.len() < *arity.start() {
            let missing: Vec<String> = command
                .metadata()
                .required_parameters()
                .iter()
                .map(|s| s.to_string())
                .collect();
            return CommandResult::fail(CommandError::MissingParameters(missing).to_string());
        }
        if args.len() > *arity.end() {
            return CommandResult::fail(
                CommandError::TooManyArguments {
                    command: name.to_string(),
                    max: *arity.end(),
                    got: args.len(),
                }
                .to_string(),
            );
        }

        match command.invoke(args) {
            Ok(value) => CommandResult::ok(value),
            Err(err) => CommandResult::fail(err.to_string()),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
