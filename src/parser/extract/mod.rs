pub mod language;
pub mod member;
pub mod page;

use tracing::debug;

use super::rules::Tag;
use crate::model::Directory;

/// Recover the directory tree from a whole markup document.
///
/// Members are read from the `Team` block when there is one, otherwise from
/// the whole document. Never fails: missing or unterminated tags only leave
/// fields unset.
pub fn extract_directory(markup: &str) -> Directory {
    let scope = Tag::Team.block(markup).map_or(markup, |b| b.inner);
    let members: Vec<_> = Tag::Member
        .blocks(scope)
        .map(|b| member::extract(b.inner))
        .collect();
    debug!(members = members.len(), "extracted directory");
    Directory { members }
}

// ── Tests ──
