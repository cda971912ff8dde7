//! Chat platform collaborator interfaces.
//!
//! The command runtime never talks to a chat service directly. It sends
//! system messages, looks up entities and permissions, and schedules
//! deferred callbacks through the traits defined here.

mod error;
mod memory;
mod platform;
mod schedule;
mod types;

pub use error::PlatformError;
pub use memory::InMemoryPlatform;
pub use platform::Platform;
pub use schedule::{IdleTimer, ScheduledHandle, Scheduler, TokioScheduler};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn guild() -> Guild {
        Guild {
            id: "g1".into(),
            name: "Test Guild".into(),
            owner_id: "owner".into(),
        }
    }

    fn member(id: &str, roles: &[&str]) -> Member {
        Member {
            user: User::new(id, format!("user-{id}")),
            guild_id: "g1".into(),
            nickname: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn guild_message(content: &str) -> Message {
        Message::in_guild(
            "m1",
            member("42", &["r1"]),
            Channel::text("c1", "general", "g1"),
            guild(),
            content,
        )
    }

    #[test]
    fn test_direct_message_context() {
        let msg = Message::direct("m1", User::new("42", "alice"), "hello");
        assert!(msg.is_dm());
        assert!(msg.guild_id().is_none());
        assert!(msg.author_roles().is_empty());
        assert_eq!(msg.channel.kind, ChannelKind::Dm);
    }

    #[test]
    fn test_guild_message_context() {
        let msg = guild_message("hello");
        assert!(!msg.is_dm());
        assert_eq!(msg.guild_id(), Some("g1"));
        assert_eq!(msg.author_roles(), ["r1".to_string()]);
        assert_eq!(msg.author.id, "42");
    }

    #[test]
    fn test_with_content_keeps_context() {
        let msg = guild_message("hello").with_content("bye");
        assert_eq!(msg.content, "bye");
        assert_eq!(msg.channel.id, "c1");
    }

    #[test]
    fn test_entity_serialization_is_tagged() {
        let entity = Entity::Role(Role {
            id: "r1".into(),
            name: "mods".into(),
            guild_id: "g1".into(),
        });
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"], "role");
        assert_eq!(json["name"], "mods");
        assert_eq!(entity.kind(), EntityKind::Role);
    }

    #[tokio::test]
    async fn test_in_memory_fetch() {
        let platform = InMemoryPlatform::new()
            .with_user(User::new("7", "bob"))
            .with_member(member("42", &[]))
            .with_invite(Invite {
                code: "abc".into(),
                guild_id: Some("g1".into()),
                channel_id: None,
            });
        let msg = guild_message("x");

        let user = platform.fetch_entity(EntityKind::User, "7", &msg).await.unwrap();
        assert!(matches!(user, Some(Entity::User(u)) if u.name == "bob"));

        let member = platform.fetch_entity(EntityKind::Member, "42", &msg).await.unwrap();
        assert!(matches!(member, Some(Entity::Member(_))));

        let missing = platform.fetch_entity(EntityKind::Role, "nope", &msg).await.unwrap();
        assert!(missing.is_none());

        let invite = platform.fetch_entity(EntityKind::Invite, "abc", &msg).await.unwrap();
        assert!(invite.is_some());
    }

    #[tokio::test]
    async fn test_member_fetch_outside_guild() {
        let platform = InMemoryPlatform::new().with_member(member("42", &[]));
        let msg = Message::direct("m1", User::new("42", "alice"), "hi");

        let result = platform.fetch_entity(EntityKind::Member, "42", &msg).await;
        assert!(matches!(result, Err(PlatformError::NotInGuild)));
    }

    #[tokio::test]
    async fn test_records_sent_messages() {
        let platform = InMemoryPlatform::new();
        let msg = guild_message("x");

        assert_ok!(
            platform
                .send_system_message(&msg, SystemMessageKind::Error, "nope")
                .await
        );

        let sent = platform.take_sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, SystemMessageKind::Error);
        assert_eq!(sent[0].channel_id, "c1");
        assert!(platform.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_permissions_are_live() {
        let platform = InMemoryPlatform::new().with_permissions("42", ["SEND_MESSAGES"]);
        let msg = guild_message("x");

        let perms = platform.permissions("42", &msg).await.unwrap();
        assert!(perms.contains("SEND_MESSAGES"));

        platform.set_permissions("42", ["BAN_MEMBERS"]).await;
        let perms = platform.permissions("42", &msg).await.unwrap();
        assert!(!perms.contains("SEND_MESSAGES"));
        assert!(perms.contains("BAN_MEMBERS"));

        assert!(platform.permissions("unknown", &msg).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let _handle = TokioScheduler.schedule(
            Duration::from_secs(5),
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_callback_never_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let handle = TokioScheduler.schedule(
            Duration::from_secs(5),
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timer_reset_on_touch() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let timer = IdleTimer::start(Arc::new(TokioScheduler), Duration::from_secs(10), move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });

        tokio::time::sleep(Duration::from_secs(8)).await;
        timer.touch();
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timer_stop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let timer = IdleTimer::start(Arc::new(TokioScheduler), Duration::from_secs(1), move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });

        timer.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
