//! Per-command middleware run as the last gate before a handler.

use crate::command::Command;
use async_trait::async_trait;
use chat_platform::Message;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Values shared by the middlewares of one dispatch, then handed to the handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiddlewareData {
    values: Map<String, Value>,
}

impl MiddlewareData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Store any serializable value.
    pub fn insert_as<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<(), serde_json::Error> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a value back into a concrete type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of a middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareResult {
    Pass,
    /// Stop without telling the user.
    Abort,
    /// Stop and show this text to the user.
    Reject(String),
}

impl From<bool> for MiddlewareResult {
    fn from(pass: bool) -> Self {
        if pass {
            MiddlewareResult::Pass
        } else {
            MiddlewareResult::Abort
        }
    }
}

impl From<String> for MiddlewareResult {
    fn from(reason: String) -> Self {
        MiddlewareResult::Reject(reason)
    }
}

impl From<&str> for MiddlewareResult {
    fn from(reason: &str) -> Self {
        MiddlewareResult::Reject(reason.to_string())
    }
}

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs and rejection reports.
    fn name(&self) -> &str;

    async fn run(
        &self,
        message: &Message,
        command: &Command,
        data: &mut MiddlewareData,
    ) -> MiddlewareResult;
}

type MiddlewareFn = dyn for<'a> Fn(&'a Message, &'a Command, &'a mut MiddlewareData) -> BoxFuture<'a, MiddlewareResult>
    + Send
    + Sync;

/// Middleware built from a closure returning a boxed future.
pub struct FnMiddleware {
    name: String,
    f: Arc<MiddlewareFn>,
}

impl FnMiddleware {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a Message, &'a Command, &'a mut MiddlewareData) -> BoxFuture<'a, MiddlewareResult>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

#[async_trait]
impl Middleware for FnMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        message: &Message,
        command: &Command,
        data: &mut MiddlewareData,
    ) -> MiddlewareResult {
        (self.f)(message, command, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_platform::User;
    use futures::FutureExt;

    #[test]
    fn test_data_round_trip() {
        let mut data = MiddlewareData::new();
        data.insert("count", 3);
        data.insert_as("tags", &vec!["a", "b"]).unwrap();

        assert_eq!(data.get_as::<u32>("count"), Some(3));
        assert_eq!(data.get_as::<Vec<String>>("tags"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(data.get_as::<String>("count"), None);
        assert!(!data.contains("missing"));
    }

    #[test]
    fn test_result_conversions() {
        assert_eq!(MiddlewareResult::from(true), MiddlewareResult::Pass);
        assert_eq!(MiddlewareResult::from(false), MiddlewareResult::Abort);
        assert_eq!(MiddlewareResult::from("nope"), MiddlewareResult::Reject("nope".into()));
    }

    #[tokio::test]
    async fn test_fn_middleware_writes_data() {
        let middleware = FnMiddleware::new("stamp", |message, _command, data| {
            async move {
                data.insert("author", message.author.name.clone());
                MiddlewareResult::Pass
            }
            .boxed()
        });
        let command = Command::new("ping");
        let message = Message::direct("m1", User::new("1", "alice"), "!ping");
        let mut data = MiddlewareData::new();

        let result = middleware.run(&message, &command, &mut data).await;
        assert_eq!(result, MiddlewareResult::Pass);
        assert_eq!(middleware.name(), "stamp");
        assert_eq!(data.get_as::<String>("author"), Some("alice".into()));
    }
}
