pub mod extract;
pub mod paragraphs;
pub mod rules;

use rayon::prelude::*;

use crate::model::{Directory, Member};
use crate::normalize::normalize;

/// Three-step pipeline: markup → directory tree → paragraph-wrapped
/// descriptions → normalized records. Members keep document order.
pub fn process_document(markup: &str) -> serde_json::Result<Directory> {
    let directory = extract::extract_directory(markup);
    let members = directory
        .members
        .into_par_iter()
        .map(prepare_member)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(Directory { members })
}

/// Reconstruct paragraphs in every section description, then normalize
/// every string field.
pub fn prepare_member(mut member: Member) -> serde_json::Result<Member> {
    let sections = member
        .languages
        .iter_mut()
        .filter_map(|l| l.page.as_mut())
        .flat_map(|p| p.sections.iter_mut());
    for section in sections {
        if let Some(d) = section.description.as_mut() {
            *d = paragraphs::reconstruct(d).into_owned();
        }
    }
    normalize(&member)
}

// ── Tests ──
