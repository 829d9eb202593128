//! Subscription expressions evaluated by the hub.
//!
//! An expression is a conjunction of equality clauses over dotted event
//! paths, e.g.
//!
//! ```text
//! topic=ftrack.action.launch and source.user.username=alice and data.actionIdentifier=component.add
//! ```
//!
//! Values may be wrapped in single or double quotes to carry whitespace,
//! quote characters or the word `and`. Inside quotes a backslash takes the
//! next character literally.

use crate::error::{ActionError, Result};
use crate::types::Event;
use regex::Regex;
use std::sync::OnceLock;

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    expression: String,
    clauses: Vec<Clause>,
}

impl Subscription {
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| ActionError::InvalidSubscription {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let words = split_words(expression).map_err(|reason| invalid(reason))?;
        if words.is_empty() {
            return Err(invalid("expression is empty"));
        }

        let mut clauses = Vec::new();
        for group in words.split(|w| w.eq_ignore_ascii_case("and")) {
            if group.is_empty() {
                return Err(invalid("dangling 'and'"));
            }
            let text = group.join(" ");
            let Some((key, value)) = text.split_once('=') else {
                return Err(invalid(&format!("clause '{text}' has no '='")));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid(&format!("clause '{text}' has an empty key")));
            }
            if !key_re().is_match(key) {
                return Err(invalid(&format!("invalid key '{key}'")));
            }
            clauses.push(Clause {
                key: key.to_string(),
                value: unquote(value.trim()),
            });
        }

        Ok(Self {
            expression: expression.trim().to_string(),
            clauses,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// True when every clause resolves on `event` to exactly its value.
    pub fn matches(&self, event: &Event) -> bool {
        self.clauses
            .iter()
            .all(|c| event.field(&c.key).as_deref() == Some(c.value.as_str()))
    }
}

/// Split on unquoted whitespace. Quotes are kept in the words so a quoted
/// `and` is never taken as a separator.
fn split_words(expression: &str) -> std::result::Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in expression.chars() {
        match quote {
            Some(_) if escaped => {
                current.push(ch);
                escaped = false;
            }
            Some(_) if ch == '\\' => {
                current.push(ch);
                escaped = true;
            }
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err("unterminated quote");
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

/// Strip surrounding quotes and resolve backslash escapes inside them.
/// Bare values are taken as written.
fn unquote(value: &str) -> String {
    let Some(q) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return value.to_string();
    };
    if value.len() < 2 || !value.ends_with(q) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() - 2);
    let mut chars = value[1..value.len() - 1].chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            _ => out.push(ch),
        }
    }
    out
}

/// Render `value` so it parses back to itself as a clause value.
pub fn quote_value(value: &str) -> String {
    let bare = !value.is_empty()
        && !value.eq_ignore_ascii_case("and")
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'');
    if bare {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DISCOVER_TOPIC, LAUNCH_TOPIC};
    use serde_json::json;

    #[test]
    fn parses_conjunction() {
        let sub = Subscription::parse(
            "topic=ftrack.action.launch and source.user.username=alice \
             and data.actionIdentifier=component.add",
        )
        .unwrap();
        let keys: Vec<_> = sub.clauses.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(
            keys,
            ["topic", "source.user.username", "data.actionIdentifier"]
        );
        assert_eq!(sub.clauses[2].value, "component.add");
    }

    #[test]
    fn and_is_case_insensitive_and_spacing_is_loose() {
        let sub = Subscription::parse("topic = a.b  AND data.x='hello world'").unwrap();
        assert_eq!(
            sub.clauses,
            &[
                Clause {
                    key: "topic".into(),
                    value: "a.b".into()
                },
                Clause {
                    key: "data.x".into(),
                    value: "hello world".into()
                },
            ]
        );
    }

    #[test]
    fn quoted_and_is_not_a_separator() {
        let sub = Subscription::parse(r#"data.label="this and that""#).unwrap();
        assert_eq!(sub.clauses.len(), 1);
        assert_eq!(sub.clauses[0].value, "this and that");
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in [
            "",
            "   ",
            "topic",
            "=value",
            "topic=a and",
            "and topic=a",
            "topic=a and and data.x=b",
            "to pic=a",
            "data..x=1",
            "topic=\"unterminated",
        ] {
            assert!(
                matches!(
                    Subscription::parse(bad),
                    Err(ActionError::InvalidSubscription { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn matches_requires_every_clause() {
        let sub = Subscription::parse(&format!(
            "topic={LAUNCH_TOPIC} and source.user.username=alice and data.actionIdentifier=component.add"
        ))
        .unwrap();

        let hit = Event::new(LAUNCH_TOPIC, "alice", json!({ "actionIdentifier": "component.add" }));
        assert!(sub.matches(&hit));

        let other_user = Event::new(LAUNCH_TOPIC, "bob", json!({ "actionIdentifier": "component.add" }));
        assert!(!sub.matches(&other_user));

        let other_action = Event::new(LAUNCH_TOPIC, "alice", json!({ "actionIdentifier": "other" }));
        assert!(!sub.matches(&other_action));

        let other_topic = Event::new(DISCOVER_TOPIC, "alice", json!({ "actionIdentifier": "component.add" }));
        assert!(!sub.matches(&other_topic));
    }

    #[test]
    fn empty_value_matches_only_empty_string() {
        let sub = Subscription::parse("data.tag=").unwrap();
        assert!(sub.matches(&Event::new("t", "u", json!({ "tag": "" }))));
        assert!(!sub.matches(&Event::new("t", "u", json!({}))));
    }

    #[test]
    fn escaped_quotes_inside_quoted_values() {
        let sub = Subscription::parse(r#"data.who="say \"hi\" \\ o'brien""#).unwrap();
        assert_eq!(sub.clauses[0].value, r#"say "hi" \ o'brien"#);
    }

    #[test]
    fn quote_value_survives_parsing() {
        for value in [
            "alice",
            "o'brien",
            "Jane Doe",
            r#"Jane "JD" Doe"#,
            r#"it's "quoted""#,
            r"back\slash",
            "AND",
            "a=b",
            "",
        ] {
            let sub = Subscription::parse(&format!("data.who={}", quote_value(value)))
                .unwrap_or_else(|e| panic!("{value}: {e}"));
            assert_eq!(sub.clauses[0].value, value);
        }
    }

    #[test]
    fn plain_values_stay_bare() {
        assert_eq!(quote_value("alice"), "alice");
        assert_eq!(quote_value("o'brien"), r#""o'brien""#);
    }
}
