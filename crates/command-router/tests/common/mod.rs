//! Common test utilities for dispatch tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chat_platform::{Channel, Guild, InMemoryPlatform, Member, Message, SentMessage, User};
use command_router::{
    ArgumentBag, Command, CommandContext, CommandHandler, CommandRegistry, Dispatcher,
    DispatcherConfig, MiddlewareData, TypeRegistry,
};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const BOT_ID: &str = "900";
pub const OWNER_ID: &str = "boss";

/// One recorded handler invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub args: ArgumentBag,
    pub data: MiddlewareData,
}

/// Handler that records every invocation.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn last(&self) -> Call {
        self.calls
            .lock()
            .await
            .last()
            .cloned()
            .expect("handler was never called")
    }
}

#[async_trait]
impl CommandHandler for Recorder {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        self.calls.lock().await.push(Call {
            path: ctx.path.clone(),
            args: ctx.args.clone(),
            data: ctx.data.clone(),
        });
        Ok(())
    }
}

pub fn guild() -> Guild {
    Guild {
        id: "g1".into(),
        name: "Test Guild".into(),
        owner_id: "owner".into(),
    }
}

pub fn member(id: &str, roles: &[&str]) -> Member {
    Member {
        user: User::new(id, format!("user-{}", id)),
        guild_id: "g1".into(),
        nickname: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Message from user `u1` in the guild's `#general`.
pub fn guild_message(content: &str) -> Message {
    guild_message_from(member("u1", &[]), content)
}

pub fn guild_message_from(author: Member, content: &str) -> Message {
    Message::in_guild(
        "m1",
        author,
        Channel::text("c1", "general", "g1"),
        guild(),
        content,
    )
}

pub fn dm_message(content: &str) -> Message {
    Message::direct("m1", User::new("u1", "user-u1"), content)
}

pub fn config() -> DispatcherConfig {
    DispatcherConfig {
        prefix: "!".into(),
        bot_id: Some(BOT_ID.into()),
        owner_ids: vec![OWNER_ID.into()],
    }
}

/// Build a dispatcher over `commands` and an in-memory platform.
pub fn build(commands: Vec<Command>) -> (Dispatcher, Arc<InMemoryPlatform>) {
    build_with(InMemoryPlatform::new(), commands)
}

pub fn build_with(platform: InMemoryPlatform, commands: Vec<Command>) -> (Dispatcher, Arc<InMemoryPlatform>) {
    let mut registry = CommandRegistry::new(Arc::new(TypeRegistry::with_builtins()));
    for command in commands {
        registry.add(command).expect("valid test command");
    }
    let platform = Arc::new(platform);
    let dispatcher = Dispatcher::new(Arc::new(registry), platform.clone(), config());
    (dispatcher, platform)
}

/// Contents of the messages sent since the last call.
pub async fn sent(platform: &InMemoryPlatform) -> Vec<SentMessage> {
    platform.take_sent().await
}
