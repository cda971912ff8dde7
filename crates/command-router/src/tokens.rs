//! Shell-like tokenizer and schema-aware token parser.

use crate::schema::{ArgumentKind, ArgumentSchema};
use arg_types::{parse_bool_token, ArgumentValue};
use std::collections::VecDeque;

/// One whitespace-separated word of the message, quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Byte offset of the first character in the source text.
    pub start: usize,
    /// Byte offset one past the last character in the source text.
    pub end: usize,
    /// Started with a quote, so never treated as an option or flag.
    pub quoted: bool,
}

/// Split `input` into words.
///
/// `"..."` and `'...'` group words; inside double quotes a backslash escapes
/// `"` and `\`. An unterminated quote runs to the end of the input.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, first)) = chars.peek() {
        if first.is_whitespace() {
            chars.next();
            continue;
        }

        let mut text = String::new();
        let mut end = input.len();

        while let Some(&(at, c)) = chars.peek() {
            if c.is_whitespace() {
                end = at;
                break;
            }
            chars.next();
            match c {
                '"' => {
                    while let Some((_, c)) = chars.next() {
                        match c {
                            '"' => break,
                            '\\' => match chars.peek() {
                                Some(&(_, next @ ('"' | '\\'))) => {
                                    text.push(next);
                                    chars.next();
                                }
                                _ => text.push('\\'),
                            },
                            c => text.push(c),
                        }
                    }
                }
                '\'' => {
                    for (_, c) in chars.by_ref() {
                        if c == '\'' {
                            break;
                        }
                        text.push(c);
                    }
                }
                c => text.push(c),
            }
        }

        tokens.push(Token {
            text,
            start,
            end,
            quoted: first == '"' || first == '\'',
        });
    }

    tokens
}

/// A raw value as handed to the argument resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    /// Bare flag with no value.
    Bool(bool),
    /// Already typed, from a structured interaction.
    Typed(ArgumentValue),
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<ArgumentValue> for RawValue {
    fn from(value: ArgumentValue) -> Self {
        RawValue::Typed(value)
    }
}

/// Tokens sorted into positional words and named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTokens {
    pub positional: VecDeque<String>,
    /// `(key, value)` in the order given. Keys carry no dashes.
    pub named: Vec<(String, RawValue)>,
    /// Untouched source text after the command path.
    pub tail: String,
}

fn is_negative_number(text: &str) -> bool {
    text.strip_prefix('-')
        .map(|n| !n.is_empty() && n.replace('_', "").parse::<f64>().is_ok())
        .unwrap_or(false)
}

fn looks_like_option(token: &Token) -> bool {
    !token.quoted && token.text.len() > 1 && token.text.starts_with('-') && !is_negative_number(&token.text)
}

fn takes_value(schema: &ArgumentSchema, key: &str) -> bool {
    schema
        .iter()
        .filter(|spec| spec.kind != ArgumentKind::Flag)
        .any(|spec| spec.answers_to(key))
}

impl ParsedTokens {
    /// Sort tokens using the schema to tell flags from options.
    ///
    /// A flag only consumes the next token when it is a yes/no word. Options
    /// accept `--key=value`, `--key value` and `-k value`; `-abc` sets each
    /// letter's flag. Negative numbers stay positional and `--` ends option
    /// parsing.
    pub fn parse(tokens: &[Token], tail: impl Into<String>, schema: &ArgumentSchema) -> Self {
        let mut parsed = ParsedTokens {
            tail: tail.into(),
            ..Default::default()
        };
        let mut options_done = false;
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            if options_done || !looks_like_option(token) {
                parsed.positional.push_back(token.text.clone());
                continue;
            }
            if token.text == "--" {
                options_done = true;
                continue;
            }

            let (body, long) = match token.text.strip_prefix("--") {
                Some(body) => (body, true),
                None => (&token.text[1..], false),
            };

            if let Some((key, value)) = body.split_once('=') {
                parsed.named.push((key.to_string(), RawValue::from(value)));
                continue;
            }

            if !long && body.chars().count() > 1 {
                let letters: Vec<String> = body.chars().map(String::from).collect();
                if letters.iter().all(|l| schema.flag(l).is_some()) {
                    for letter in letters {
                        parsed.named.push((letter, RawValue::Bool(true)));
                    }
                } else {
                    parsed.positional.push_back(token.text.clone());
                }
                continue;
            }

            let key = body.to_string();
            if schema.flag(&key).is_some() {
                let next_is_bool = iter
                    .peek()
                    .map(|next| !next.quoted && parse_bool_token(&next.text).is_some())
                    .unwrap_or(false);
                match iter.next_if(|_| next_is_bool) {
                    Some(next) => parsed.named.push((key, RawValue::Text(next.text.clone()))),
                    None => parsed.named.push((key, RawValue::Bool(true))),
                }
            } else if takes_value(schema, &key) {
                if let Some(next) = iter.next_if(|next| !looks_like_option(next)) {
                    parsed.named.push((key, RawValue::Text(next.text.clone())));
                }
            } else {
                parsed.named.push((key, RawValue::Bool(true)));
            }
        }

        parsed
    }

    /// Build from already-named values, as a structured interaction supplies them.
    pub fn from_named<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, RawValue)>,
        K: Into<String>,
    {
        ParsedTokens {
            named: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Default::default()
        }
    }

    /// Remove and return the first value given under `key`.
    pub fn take_named(&mut self, key: &str) -> Option<RawValue> {
        let index = self.named.iter().position(|(k, _)| k == key)?;
        Some(self.named.remove(index).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ArgumentSpec;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn schema() -> ArgumentSchema {
        ArgumentSchema::new()
            .with(ArgumentSpec::positional("n", "number"))
            .with(ArgumentSpec::option("reason", "string").short("r"))
            .with(ArgumentSpec::flag("muted").short("m"))
            .with(ArgumentSpec::flag("all").short("a"))
            .with(ArgumentSpec::rest("text"))
    }

    fn parse(input: &str) -> ParsedTokens {
        ParsedTokens::parse(&tokenize(input), input, &schema())
    }

    #[test]
    fn test_tokenize_quotes() {
        let tokens = tokenize(r#"say "hello world" 'it''s' done"#);
        assert_eq!(texts(&tokens), ["say", "hello world", "its", "done"]);
        assert!(tokens[1].quoted);
        assert!(!tokens[0].quoted);
    }

    #[test]
    fn test_tokenize_spans() {
        let input = "  ping   \"a b\" c";
        let tokens = tokenize(input);
        assert_eq!(&input[tokens[0].start..tokens[0].end], "ping");
        assert_eq!(&input[tokens[1].start..tokens[1].end], "\"a b\"");
        assert_eq!(tokens[2].start, input.len() - 1);
        assert_eq!(tokens[2].end, input.len());
    }

    #[test]
    fn test_tokenize_escapes() {
        let tokens = tokenize(r#""say \"hi\"" "\d+" /\w/"#);
        assert_eq!(texts(&tokens), [r#"say "hi""#, r"\d+", r"/\w/"]);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let tokens = tokenize("echo \"runs to the end");
        assert_eq!(texts(&tokens), ["echo", "runs to the end"]);
    }

    #[test]
    fn test_tokenize_multibyte() {
        let input = "héllo wörld";
        let tokens = tokenize(input);
        assert_eq!(texts(&tokens), ["héllo", "wörld"]);
        assert_eq!(&input[tokens[1].start..tokens[1].end], "wörld");
    }

    #[test]
    fn test_flag_does_not_swallow_word() {
        let parsed = parse("-m extra");
        assert_eq!(parsed.named, vec![("m".to_string(), RawValue::Bool(true))]);
        assert_eq!(parsed.positional, ["extra"]);
    }

    #[test]
    fn test_flag_takes_yes_no() {
        let parsed = parse("--muted no");
        assert_eq!(parsed.named, vec![("muted".to_string(), RawValue::from("no"))]);
        assert!(parsed.positional.is_empty());
    }

    #[test]
    fn test_option_forms() {
        let parsed = parse("--reason=spam -r flood --reason \"too loud\"");
        assert_eq!(
            parsed.named,
            vec![
                ("reason".to_string(), RawValue::from("spam")),
                ("r".to_string(), RawValue::from("flood")),
                ("reason".to_string(), RawValue::from("too loud")),
            ]
        );
    }

    #[test]
    fn test_option_without_value() {
        let parsed = parse("--reason --muted");
        assert_eq!(parsed.named, vec![("muted".to_string(), RawValue::Bool(true))]);
    }

    #[test]
    fn test_clustered_flags() {
        let parsed = parse("-am");
        assert_eq!(
            parsed.named,
            vec![
                ("a".to_string(), RawValue::Bool(true)),
                ("m".to_string(), RawValue::Bool(true)),
            ]
        );

        let parsed = parse("-mx");
        assert!(parsed.named.is_empty());
        assert_eq!(parsed.positional, ["-mx"]);
    }

    #[test]
    fn test_negative_numbers_are_positional() {
        let parsed = parse("-5 --reason -1_000");
        assert_eq!(parsed.positional, ["-5"]);
        assert_eq!(parsed.named, vec![("reason".to_string(), RawValue::from("-1_000"))]);
    }

    #[test]
    fn test_double_dash_ends_options() {
        let parsed = parse("-- --muted -m");
        assert!(parsed.named.is_empty());
        assert_eq!(parsed.positional, ["--muted", "-m"]);
    }

    #[test]
    fn test_quoted_dash_is_positional() {
        let parsed = parse("\"--muted\"");
        assert!(parsed.named.is_empty());
        assert_eq!(parsed.positional, ["--muted"]);
    }

    #[test]
    fn test_take_named() {
        let mut parsed = ParsedTokens::from_named([("n", RawValue::from("1")), ("n", RawValue::from("2"))]);
        assert_eq!(parsed.take_named("n"), Some(RawValue::from("1")));
        assert_eq!(parsed.take_named("n"), Some(RawValue::from("2")));
        assert_eq!(parsed.take_named("n"), None);
    }
}
