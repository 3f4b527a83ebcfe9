//! The closed tag vocabulary of the team markup.
//!
//! Every tag is declared once in [`RULES`] with the tag it lives under, whether
//! it is read once (first match wins) or repeatedly (all blocks, document
//! order), and the attributes its start tag carries. Extraction never matches
//! a tag outside this table, which keeps the one-level nesting assumption in
//! a single place.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use Cardinality::{Repeated, Singular};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Team,
    Member,
    Name,
    PhoneNumber,
    EmailAddress,
    Photo,
    WebSite,
    PageName,
    Language,
    Academic,
    Summary,
    Page,
    Section,
    Title,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First match only; later duplicates are ignored.
    Singular,
    /// Every non-overlapping block, in document order.
    Repeated,
}

#[derive(Debug)]
pub struct Rule {
    pub tag: Tag,
    pub parent: Option<Tag>,
    pub cardinality: Cardinality,
    /// Start-tag attributes, in the fixed order they must appear.
    pub attributes: &'static [&'static str],
}

const fn rule(tag: Tag, parent: Option<Tag>, cardinality: Cardinality) -> Rule {
    Rule {
        tag,
        parent,
        cardinality,
        attributes: &[],
    }
}

pub const RULES: &[Rule] = &[
    rule(Tag::Team, None, Singular),
    rule(Tag::Member, Some(Tag::Team), Repeated),
    rule(Tag::Name, Some(Tag::Member), Singular),
    rule(Tag::PhoneNumber, Some(Tag::Member), Singular),
    rule(Tag::EmailAddress, Some(Tag::Member), Singular),
    rule(Tag::Photo, Some(Tag::Member), Singular),
    rule(Tag::WebSite, Some(Tag::Member), Singular),
    rule(Tag::PageName, Some(Tag::Member), Singular),
    Rule {
        tag: Tag::Language,
        parent: Some(Tag::Member),
        cardinality: Repeated,
        attributes: &["name", "code"],
    },
    rule(Tag::Academic, Some(Tag::Language), Singular),
    rule(Tag::Summary, Some(Tag::Language), Singular),
    rule(Tag::Page, Some(Tag::Language), Singular),
    rule(Tag::Section, Some(Tag::Page), Repeated),
    rule(Tag::Title, Some(Tag::Section), Singular),
    rule(Tag::Description, Some(Tag::Section), Singular),
];

static PATTERNS: LazyLock<HashMap<Tag, Regex>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|r| (r.tag, Regex::new(&block_pattern(r)).unwrap()))
        .collect()
});

/// `<Tag a="..." b="...">inner</Tag>`, lazy inner match so blocks never overlap.
fn block_pattern(rule: &Rule) -> String {
    let name = rule.tag.name();
    let attrs: String = rule
        .attributes
        .iter()
        .map(|a| format!(r#"\s+{}="([^"]*)""#, a))
        .collect();
    let close = if rule.attributes.is_empty() { "" } else { r"\s*" };
    format!(r"(?s)<{name}{attrs}{close}>(.*?)</{name}>")
}

/// One matched block: attribute values in declared order and the untrimmed
/// inner text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'h> {
    pub attributes: Vec<&'h str>,
    pub inner: &'h str,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Team => "Team",
            Tag::Member => "Member",
            Tag::Name => "Name",
            Tag::PhoneNumber => "PhoneNumber",
            Tag::EmailAddress => "EmailAddress",
            Tag::Photo => "Photo",
            Tag::WebSite => "WebSite",
            Tag::PageName => "PageName",
            Tag::Language => "Language",
            Tag::Academic => "Academic",
            Tag::Summary => "Summary",
            Tag::Page => "Page",
            Tag::Section => "Section",
            Tag::Title => "Title",
            Tag::Description => "Description",
        }
    }

    pub fn rule(self) -> &'static Rule {
        RULES
            .iter()
            .find(|r| r.tag == self)
            .unwrap_or_else(|| unreachable!("no rule for {:?}", self))
    }

    pub fn pattern(self) -> &'static Regex {
        &PATTERNS[&self]
    }

    /// First block of a singular tag.
    pub fn block(self, haystack: &str) -> Option<Block<'_>> {
        debug_assert_eq!(self.rule().cardinality, Singular, "{:?}", self);
        self.matches(haystack).next()
    }

    /// First-match, trimmed inner text of a singular field.
    pub fn first(self, haystack: &str) -> Option<String> {
        self.block(haystack).map(|b| b.inner.trim().to_string())
    }

    /// Every block of a repeated tag, in document order.
    pub fn blocks(self, haystack: &str) -> impl Iterator<Item = Block<'_>> {
        debug_assert_eq!(self.rule().cardinality, Repeated, "{:?}", self);
        self.matches(haystack)
    }

    fn matches(self, haystack: &str) -> impl Iterator<Item = Block<'_>> {
        let n = self.rule().attributes.len();
        self.pattern().captures_iter(haystack).map(move |caps| Block {
            attributes: (1..=n)
                .map(|i| caps.get(i).map_or("", |m| m.as_str()))
                .collect(),
            inner: caps.get(n + 1).map_or("", |m| m.as_str()),
        })
    }
}
