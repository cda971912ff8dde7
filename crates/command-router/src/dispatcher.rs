//! Message dispatch: invocation parsing, gates, resolution, handler.

use crate::bag::ArgumentBag;
use crate::command::{Command, CommandContext};
use crate::cooldown::{cooldown_key, CooldownTrigger};
use crate::gate::Gates;
use crate::middleware::MiddlewareData;
use crate::registry::CommandRegistry;
use crate::resolver::ArgumentResolver;
use crate::schema::ArgumentSchema;
use crate::tokens::{tokenize, ParsedTokens, RawValue};
use crate::usage;
use arg_types::ResolveContext;
use chat_platform::{Message, Platform, Scheduler, SystemMessageKind, TokioScheduler};
use cooldown_store::CooldownStore;
use futures::FutureExt;
use serde::Deserialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

fn default_prefix() -> String {
    "!".to_string()
}

/// Dispatcher settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Text that marks a message as a command.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// The bot's own user id. Enables mention invocation and bot permission checks.
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Users allowed to run owner-only commands.
    #[serde(default)]
    pub owner_ids: Vec<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            bot_id: None,
            owner_ids: Vec::new(),
        }
    }
}

/// Structured slash-command invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    /// Command names from the top-level command down.
    pub path: Vec<String>,
    pub options: Vec<(String, RawValue)>,
}

impl Interaction {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not addressed to the bot, or no command matched.
    Ignored,
    /// Help was shown instead of running the command.
    Usage { command: String },
    /// A gate or an argument failed; the user was told why.
    Rejected { command: String, reason: String },
    /// A middleware aborted silently.
    Silenced { command: String },
    Completed { command: String },
    /// The handler returned an error or panicked.
    Failed { command: String, error: String },
}

impl DispatchOutcome {
    /// Path of the command involved, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Ignored => None,
            DispatchOutcome::Usage { command }
            | DispatchOutcome::Rejected { command, .. }
            | DispatchOutcome::Silenced { command }
            | DispatchOutcome::Completed { command }
            | DispatchOutcome::Failed { command, .. } => Some(command),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed { .. })
    }
}

/// Routes messages to commands.
pub struct Dispatcher {
    commands: Arc<CommandRegistry>,
    platform: Arc<dyn Platform>,
    gates: Gates,
    scheduler: Arc<dyn Scheduler>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(commands: Arc<CommandRegistry>, platform: Arc<dyn Platform>, config: DispatcherConfig) -> Self {
        let gates = Gates::new(CooldownStore::new(), config.owner_ids.clone(), config.bot_id.clone());
        Self {
            commands,
            platform,
            gates,
            scheduler: Arc::new(TokioScheduler),
            config,
        }
    }

    /// Use a shared cooldown store.
    pub fn with_cooldowns(mut self, cooldowns: CooldownStore) -> Self {
        self.gates = Gates::new(cooldowns, self.config.owner_ids.clone(), self.config.bot_id.clone());
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn cooldowns(&self) -> &CooldownStore {
        self.gates.cooldowns()
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Text after the prefix or bot mention. DMs need neither.
    fn strip_invocation<'m>(&self, message: &'m Message) -> Option<&'m str> {
        let content = message.content.trim_start();

        if !self.config.prefix.is_empty() {
            if let Some(rest) = content.strip_prefix(self.config.prefix.as_str()) {
                return Some(rest);
            }
        }

        if let Some(bot_id) = &self.config.bot_id {
            for mention in [format!("<@{}>", bot_id), format!("<@!{}>", bot_id)] {
                if let Some(rest) = content.strip_prefix(mention.as_str()) {
                    return Some(rest);
                }
            }
        }

        message.is_dm().then_some(content)
    }

    /// Handle one text message.
    #[instrument(skip_all, fields(message_id = %message.id, author = %message.author.id))]
    pub async fn dispatch(&self, message: &Message) -> DispatchOutcome {
        if message.author.bot {
            return DispatchOutcome::Ignored;
        }
        let Some(body) = self.strip_invocation(message) else {
            return DispatchOutcome::Ignored;
        };

        let tokens = tokenize(body);
        if tokens.is_empty() {
            return DispatchOutcome::Ignored;
        }

        let (mut command, mut consumed) = match self.commands.get(&tokens[0].text) {
            Some(command) if !tokens[0].quoted => (command.as_ref(), 1),
            _ => match self.commands.default_command() {
                Some(command) => (command.as_ref(), 0),
                None => {
                    debug!(token = %tokens[0].text, "No command matched");
                    return DispatchOutcome::Ignored;
                }
            },
        };

        while let Some(token) = tokens.get(consumed) {
            match command.find_sub(&token.text) {
                Some(sub) if !token.quoted => {
                    command = sub;
                    consumed += 1;
                }
                _ => break,
            }
        }

        let arguments = &tokens[consumed..];
        let tail = arguments.first().map(|t| &body[t.start..]).unwrap_or("");

        if let Some(first) = arguments.first() {
            if !first.quoted && (first.text == "--help" || first.text == "-h") {
                return self.send_usage(command, message).await;
            }
        }

        self.execute(command, message, |schema| ParsedTokens::parse(arguments, tail, schema))
            .await
    }

    /// Handle a structured interaction. Options are matched to arguments by name.
    #[instrument(skip_all, fields(message_id = %message.id, path = ?interaction.path))]
    pub async fn dispatch_interaction(&self, message: &Message, interaction: Interaction) -> DispatchOutcome {
        let mut path = interaction.path.iter();
        let Some(mut command) = path
            .next()
            .and_then(|name| self.commands.get(name))
            .map(|c| c.as_ref())
        else {
            return DispatchOutcome::Ignored;
        };

        for name in path {
            match command.find_sub(name) {
                Some(sub) => command = sub,
                None => {
                    warn!(sub = %name, command = %command.path(), "Interaction names an unknown sub-command");
                    return DispatchOutcome::Ignored;
                }
            }
        }

        let options = interaction.options;
        self.execute(command, message, move |_| ParsedTokens::from_named(options))
            .await
    }

    async fn execute<P>(&self, command: &Command, message: &Message, parse: P) -> DispatchOutcome
    where
        P: FnOnce(&ArgumentSchema) -> ParsedTokens,
    {
        let path = command.path();
        let Some(handler) = command.get_handler() else {
            return self.send_usage(command, message).await;
        };

        // Validators, lazy defaults and middlewares are user code too.
        let (data, args) = match AssertUnwindSafe(self.admit(command, message, parse))
            .catch_unwind()
            .await
        {
            Ok(Ok(admitted)) => admitted,
            Ok(Err(outcome)) => return outcome,
            Err(panic) => return self.fail(command, message, panic_message(panic.as_ref())).await,
        };

        let cooldown = match (command.cooldown, cooldown_key(command, message)) {
            (Some(cooldown), Some(key)) => CooldownTrigger::new(
                self.gates.cooldowns().clone(),
                &key,
                cooldown.duration,
                self.scheduler.clone(),
            ),
            _ => CooldownTrigger::disabled(),
        };

        let context = CommandContext {
            message: message.clone(),
            args,
            path: path.clone(),
            prefix: self.config.prefix.clone(),
            data,
            cooldown,
            platform: self.platform.clone(),
            commands: self.commands.clone(),
        };

        info!(command = %path, "Running command");
        let error = match AssertUnwindSafe(handler.run(context)).catch_unwind().await {
            Ok(Ok(())) => return DispatchOutcome::Completed { command: path },
            Ok(Err(e)) => format!("{:#}", e),
            Err(panic) => panic_message(panic.as_ref()),
        };
        self.fail(command, message, error).await
    }

    /// Gate chain then argument resolution. `Err` carries the outcome to report.
    async fn admit<P>(
        &self,
        command: &Command,
        message: &Message,
        parse: P,
    ) -> Result<(MiddlewareData, ArgumentBag), DispatchOutcome>
    where
        P: FnOnce(&ArgumentSchema) -> ParsedTokens,
    {
        let path = command.path();
        let data = match self.gates.check(command, message, self.platform.as_ref()).await {
            Ok(data) => data,
            Err(failure) if failure.is_silent() => {
                debug!(command = %path, reason = %failure, "Invocation silenced");
                return Err(DispatchOutcome::Silenced { command: path });
            }
            Err(failure) => {
                info!(command = %path, reason = %failure, "Invocation rejected by gate");
                return Err(self.reject(message, path, failure.to_string()).await);
            }
        };

        let tokens = parse(&command.args);
        let ctx = ResolveContext::new(message, self.platform.as_ref());
        match ArgumentResolver::new(self.commands.types())
            .resolve(&command.args, tokens, &ctx)
            .await
        {
            Ok(args) => Ok((data, args)),
            Err(e) => {
                info!(command = %path, argument = e.argument(), "Argument resolution failed");
                Err(self.reject(message, path, e.to_string()).await)
            }
        }
    }

    async fn fail(&self, command: &Command, message: &Message, error: String) -> DispatchOutcome {
        let path = command.path();
        error!(
            command = %path,
            location = %command.location,
            error = %error,
            "Command handler failed"
        );
        let report = format!("An error occurred while running `{}`:\n```\n{}\n```", path, error);
        self.notify(message, SystemMessageKind::Error, &report).await;
        DispatchOutcome::Failed { command: path, error }
    }

    async fn send_usage(&self, command: &Command, message: &Message) -> DispatchOutcome {
        let text = usage::usage(command, &self.config.prefix);
        self.notify(message, SystemMessageKind::Default, &text).await;
        DispatchOutcome::Usage {
            command: command.path(),
        }
    }

    async fn reject(&self, message: &Message, command: String, reason: String) -> DispatchOutcome {
        self.notify(message, SystemMessageKind::Error, &reason).await;
        DispatchOutcome::Rejected { command, reason }
    }

    async fn notify(&self, message: &Message, kind: SystemMessageKind, content: &str) {
        if let Err(e) = self.platform.send_system_message(message, kind, content).await {
            warn!(channel = %message.channel.id, error = %e, "Failed to send system message");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arg_types::TypeRegistry;
    use chat_platform::{InMemoryPlatform, User};

    fn dispatcher(config: DispatcherConfig) -> Dispatcher {
        let mut registry = CommandRegistry::new(Arc::new(TypeRegistry::with_builtins()));
        registry
            .add(Command::new("ping").handler(|_ctx: CommandContext| async { Ok::<(), anyhow::Error>(()) }))
            .unwrap();
        Dispatcher::new(Arc::new(registry), Arc::new(InMemoryPlatform::new()), config)
    }

    fn guild_text(content: &str) -> Message {
        let mut message = Message::direct("m1", User::new("u1", "alice"), content);
        message.guild = Some(chat_platform::Guild {
            id: "g1".into(),
            name: "Guild".into(),
            owner_id: "owner".into(),
        });
        message.channel = chat_platform::Channel::text("c1", "general", "g1");
        message
    }

    #[test]
    fn test_config_defaults() {
        let config: DispatcherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.prefix, "!");
        assert!(config.owner_ids.is_empty());
    }

    #[test]
    fn test_strip_invocation() {
        let d = dispatcher(DispatcherConfig {
            bot_id: Some("99".into()),
            ..Default::default()
        });
        assert_eq!(d.strip_invocation(&guild_text("!ping")), Some("ping"));
        assert_eq!(d.strip_invocation(&guild_text("<@99> ping")), Some(" ping"));
        assert_eq!(d.strip_invocation(&guild_text("<@!99>ping")), Some("ping"));
        assert_eq!(d.strip_invocation(&guild_text("ping")), None);
        assert_eq!(
            d.strip_invocation(&Message::direct("m1", User::new("u1", "a"), "ping")),
            Some("ping")
        );
    }

    #[tokio::test]
    async fn test_bots_are_ignored() {
        let d = dispatcher(DispatcherConfig::default());
        let mut message = guild_text("!ping");
        message.author.bot = true;
        assert_eq!(d.dispatch(&message).await, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_unknown_and_empty() {
        let d = dispatcher(DispatcherConfig::default());
        assert_eq!(d.dispatch(&guild_text("!nope")).await, DispatchOutcome::Ignored);
        assert_eq!(d.dispatch(&guild_text("!   ")).await, DispatchOutcome::Ignored);
        assert_eq!(
            d.dispatch(&guild_text("!ping")).await,
            DispatchOutcome::Completed {
                command: "ping".into()
            }
        );
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "panic: boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "panic: bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "panic: handler panicked");
    }
}
