use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{CmsError, Result};

/// `{{{raw}}}` or `{{escaped}}`; word-character names only. The triple form is
/// tried first at each position.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\{(\w+)\}\}\}|\{\{(\w+)\}\}").unwrap());

pub type TemplateData = HashMap<String, String>;

/// HTML-escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Template {
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CmsError::TemplateNotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|e| CmsError::io(path, e))?;
        Ok(Template::new(source))
    }

    /// Substitute every placeholder in one pass. Unknown names render as the
    /// empty string; substituted text is never scanned again.
    pub fn render(&self, data: &TemplateData) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.source, |caps: &Captures| {
                if let Some(raw) = caps.get(1) {
                    data.get(raw.as_str()).cloned().unwrap_or_default()
                } else {
                    let key = caps.get(2).map_or("", |m| m.as_str());
                    data.get(key)
                        .map(|v| escape_html(v).into_owned())
                        .unwrap_or_default()
                }
            })
            .into_owned()
    }
}
