//! Argument type system for chat commands.
//!
//! A [`TypeRegistry`] maps declared type names to [`TypeResolver`]s that turn
//! raw argument text into [`ArgumentValue`]s.

pub mod builtin;
mod error;
mod registry;
mod types;
mod value;

pub use builtin::parse_bool_token;
pub use error::{TypeErrorKind, TypeRegistryError, TypeResolverError};
pub use registry::TypeRegistry;
pub use types::{ResolveContext, TypeResolver};
pub use value::{ArgumentValue, Pattern};

#[cfg(test)]
mod tests {
    use super::*;
    use chat_platform::{Emote, User};
    use std::time::Duration;

    #[test]
    fn test_error_description_lists_examples() {
        let err = TypeResolverError::malformed(
            "Invalid number",
            vec!["42".into(), "-4.5".into()],
            "abc",
        );
        let text = err.describe();
        assert!(text.starts_with("Invalid number"));
        assert!(text.contains("`42`, `-4.5`"));
        assert!(text.contains("Provided: `abc`"));
        assert_eq!(err.to_string(), "Invalid number");
    }

    #[test]
    fn test_value_labels_and_accessors() {
        let n = ArgumentValue::from(7i64);
        assert_eq!(n.type_label(), "number");
        assert_eq!(n.as_i64(), Some(7));
        assert_eq!(ArgumentValue::Num(7.5).as_i64(), None);
        assert_eq!(n.as_str(), None);

        let d = ArgumentValue::from(Duration::from_secs(90));
        assert_eq!(d.as_duration(), Some(Duration::from_secs(90)));
        assert_eq!(d.to_string(), "1m 30s");
    }

    #[test]
    fn test_value_display_uses_mention_syntax() {
        let user = ArgumentValue::User(User::new("5", "bob"));
        assert_eq!(user.to_string(), "<@5>");

        let emote = ArgumentValue::Emote(Emote {
            id: "9".into(),
            name: "wave".into(),
            animated: true,
        });
        assert_eq!(emote.to_string(), "<a:wave:9>");

        let list = ArgumentValue::Array(vec!["a".into(), ArgumentValue::Num(2.0)]);
        assert_eq!(list.to_string(), "a,2");
    }
}
