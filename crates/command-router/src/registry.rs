//! Registry of commands, validated as they are added.

use crate::command::{name_key, Command};
use crate::error::ConfigError;
use arg_types::TypeRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Registry of top-level commands, looked up by name or alias.
pub struct CommandRegistry {
    types: Arc<TypeRegistry>,
    commands: Vec<Arc<Command>>,
    /// Lowercased name or alias to index in `commands`.
    index: HashMap<String, usize>,
    default: Option<usize>,
}

impl CommandRegistry {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            commands: Vec::new(),
            index: HashMap::new(),
            default: None,
        }
    }

    /// Validate and register a command with its sub-commands.
    pub fn add(&mut self, mut command: Command) -> Result<Arc<Command>, ConfigError> {
        self.validate_tree(&command, &command.name)?;
        for sub in &command.subs {
            reject_nested_default(sub)?;
        }

        let own_key = name_key(&command.name);
        if let Some(&existing) = self.index.get(&own_key) {
            let existing = &self.commands[existing];
            return Err(if name_key(&existing.name) == own_key {
                ConfigError::DuplicateCommand(command.name.clone())
            } else {
                ConfigError::AliasCollision {
                    alias: command.name.clone(),
                    command: command.name.clone(),
                    existing: existing.name.clone(),
                }
            });
        }

        let mut own_keys = vec![own_key];
        for alias in &command.aliases {
            let key = name_key(alias);
            if let Some(&existing) = self.index.get(&key) {
                return Err(ConfigError::AliasCollision {
                    alias: alias.clone(),
                    command: command.name.clone(),
                    existing: self.commands[existing].name.clone(),
                });
            }
            if own_keys.contains(&key) {
                return Err(ConfigError::AliasCollision {
                    alias: alias.clone(),
                    command: command.name.clone(),
                    existing: command.name.clone(),
                });
            }
            own_keys.push(key);
        }

        if command.is_default {
            if let Some(existing) = self.default {
                return Err(ConfigError::DuplicateDefault {
                    command: command.name.clone(),
                    existing: self.commands[existing].name.clone(),
                });
            }
        }

        let native = command.native;
        command.assign_lineage(Vec::new(), native);

        let position = self.commands.len();
        for key in own_keys {
            self.index.insert(key, position);
        }
        if command.is_default {
            self.default = Some(position);
        }

        info!(
            command = %command.name,
            aliases = command.aliases.len(),
            subs = command.subs.len(),
            "Registered command"
        );
        let command = Arc::new(command);
        self.commands.push(command.clone());
        Ok(command)
    }

    /// Checks shared by top-level and sub-commands.
    fn validate_tree(&self, command: &Command, path: &str) -> Result<(), ConfigError> {
        for name in std::iter::once(&command.name).chain(&command.aliases) {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidName(name.clone()));
            }
        }

        if let Some(cooldown) = command.cooldown {
            if cooldown.duration.is_zero() {
                return Err(ConfigError::InvalidCooldown(path.to_string()));
            }
        }

        command.args.validate(path, &self.types)?;

        let mut siblings: HashMap<String, &str> = HashMap::new();
        for sub in &command.subs {
            let sub_path = format!("{} {}", path, sub.name);
            if let Some(existing) = siblings.get(&name_key(&sub.name)) {
                return Err(if name_key(existing) == name_key(&sub.name) {
                    ConfigError::DuplicateCommand(sub_path)
                } else {
                    ConfigError::AliasCollision {
                        alias: sub.name.clone(),
                        command: sub_path,
                        existing: existing.to_string(),
                    }
                });
            }
            siblings.insert(name_key(&sub.name), &sub.name);
            for alias in &sub.aliases {
                if let Some(existing) = siblings.insert(name_key(alias), &sub.name) {
                    return Err(ConfigError::AliasCollision {
                        alias: alias.clone(),
                        command: sub_path,
                        existing: existing.to_string(),
                    });
                }
            }
            self.validate_tree(sub, &sub_path)?;
        }

        Ok(())
    }

    /// Look up a top-level command by name or alias.
    pub fn get(&self, token: &str) -> Option<&Arc<Command>> {
        self.index
            .get(&name_key(token))
            .map(|&i| &self.commands[i])
    }

    pub fn default_command(&self) -> Option<&Arc<Command>> {
        self.default.map(|i| &self.commands[i])
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }
}

fn reject_nested_default(command: &Command) -> Result<(), ConfigError> {
    if command.is_default {
        return Err(ConfigError::NestedDefault(command.name.clone()));
    }
    command.subs.iter().try_for_each(reject_nested_default)
}
