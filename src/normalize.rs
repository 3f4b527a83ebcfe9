use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A line break plus any whitespace that follows it (including further breaks).
static BREAK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r\n|\r|\n)\s*").unwrap());

/// Collapse every line-break run to a single space.
pub fn normalize_text(text: &str) -> Cow<'_, str> {
    BREAK_RUN_RE.replace_all(text, " ")
}

/// Normalize every string leaf of a JSON value, at any depth.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) if BREAK_RUN_RE.is_match(&s) => {
            Value::String(normalize_text(&s).into_owned())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Normalize a typed record by way of its serialized form, so every string
/// field is covered without per-field code.
pub fn normalize<T>(record: &T) -> serde_json::Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let value = serde_json::to_value(record)?;
    serde_json::from_value(normalize_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, Member, Page, Section};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collapses_crlf_and_indent() {
        assert_eq!(normalize_text("first line\r\n      second"), "first line second");
    }

    #[test]
    fn collapses_blank_lines() {
        assert_eq!(normalize_text("a\n\n\t  b\nc"), "a b c");
    }

    #[test]
    fn untouched_text_is_borrowed() {
        assert!(matches!(normalize_text("no breaks here"), Cow::Borrowed(_)));
    }

    #[test]
    fn trailing_break_becomes_space() {
        assert_eq!(normalize_text("end\n"), "end ");
    }

    #[test]
    fn nested_values() {
        let v = json!({
            "name": "Jane\n  Doe",
            "count": 3,
            "flag": true,
            "languages": [{ "page": { "sections": [{ "description": "<p>a\r\n b</p>" }] } }],
            "missing": null
        });
        let n = normalize_value(v);
        assert_eq!(
            n,
            json!({
                "name": "Jane Doe",
                "count": 3,
                "flag": true,
                "languages": [{ "page": { "sections": [{ "description": "<p>a b</p>" }] } }],
                "missing": null
            })
        );
    }

    #[test]
    fn idempotent_on_values() {
        let inputs = [
            json!("a\r\n\r\n  b \n"),
            json!(["x\n", ["y\n\n z"], { "k": "\n\n" }]),
            json!({ "deep": { "deeper": ["one\r\ntwo", 1, null] } }),
            json!(" \n \t\n"),
        ];
        for v in inputs {
            let once = normalize_value(v);
            let twice = normalize_value(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn typed_record() {
        let member = Member {
            name: Some("Jane\r\n   Doe".into()),
            page_name: Some("jane-doe".into()),
            languages: vec![Language {
                name: "Français".into(),
                code: "".into(),
                academic: Some("Ph.D.\n psychologue".into()),
                summary: None,
                page: Some(Page {
                    title: None,
                    sections: vec![Section {
                        title: None,
                        description: Some("<p>line\n   one</p>".into()),
                    }],
                }),
            }],
            ..Default::default()
        };
        let n = normalize(&member).unwrap();
        assert_eq!(n.name.as_deref(), Some("Jane Doe"));
        assert_eq!(n.languages[0].academic.as_deref(), Some("Ph.D. psychologue"));
        assert_eq!(
            n.languages[0].page.as_ref().unwrap().sections[0].description.as_deref(),
            Some("<p>line one</p>")
        );
        assert_eq!(n.languages[0].summary, None);
        assert_eq!(normalize(&n).unwrap(), n);
    }
}
