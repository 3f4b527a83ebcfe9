use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{CmsError, Result};
use crate::model::{Directory, Member};
use crate::normalize::normalize_value;

const EXTENSION: &str = "json";

/// A record loaded from the content directory, keyed by its file stem.
#[derive(Debug, Clone)]
pub struct StoredMember {
    pub key: String,
    pub member: Member,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveStats {
    pub saved: usize,
    pub failed: usize,
    pub removed: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeStats {
    pub total: usize,
    pub changed: usize,
    pub failed: usize,
}

pub fn record_path(dir: &Path, page_name: &str) -> PathBuf {
    dir.join(format!("{}.{}", page_name, EXTENSION))
}

/// Strip an optional `.json` suffix from a record key.
pub fn record_key(name: &str) -> &str {
    name.strip_suffix(".json").unwrap_or(name)
}

fn to_pretty<T: serde::Serialize>(path: &Path, value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| CmsError::Record {
        path: path.to_path_buf(),
        source,
    })
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CmsError::io(dir, e))
}

/// Write one member as `<pageName>.json`, pretty-printed.
pub fn save_member(dir: &Path, member: &Member) -> Result<PathBuf> {
    let path = record_path(dir, member.page_name()?);
    let json = to_pretty(&path, member)?;
    fs::write(&path, json).map_err(|e| CmsError::io(&path, e))?;
    Ok(path)
}

/// Write every member of the directory. A member without a usable page name,
/// or repeating an earlier page name, is reported and skipped; the rest are
/// still written. Records left over from members no longer in the directory
/// are removed afterwards.
pub fn save_directory(dir: &Path, directory: &Directory) -> Result<SaveStats> {
    ensure_dir(dir)?;
    let mut stats = SaveStats::default();
    let mut seen = HashSet::new();

    for member in &directory.members {
        let result = member.page_name().and_then(|page| {
            if !seen.insert(page.to_string()) {
                return Err(CmsError::DuplicatePage(page.to_string()));
            }
            save_member(dir, member)
        });
        match result {
            Ok(path) => {
                debug!(path = ?path, "saved record");
                stats.saved += 1;
            }
            Err(e) => {
                warn!(page = member.label(), error = %e, "record not saved");
                stats.failed += 1;
            }
        }
    }
    stats.removed = prune_records(dir, &seen)?;
    Ok(stats)
}

/// Delete record files whose key is not in `keep`.
pub fn prune_records(dir: &Path, keep: &HashSet<String>) -> Result<usize> {
    let mut removed = 0;
    for path in record_files(dir)? {
        let key = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if keep.contains(&key) {
            continue;
        }
        fs::remove_file(&path).map_err(|e| CmsError::io(&path, e))?;
        info!(path = ?path, "removed stale record");
        removed += 1;
    }
    Ok(removed)
}

/// Record files in the content directory, sorted by name.
pub fn record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| CmsError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}

fn read_value(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| CmsError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| CmsError::Record {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_member(path: &Path) -> Result<StoredMember> {
    let text = fs::read_to_string(path).map_err(|e| CmsError::io(path, e))?;
    let member = serde_json::from_str(&text).map_err(|source| CmsError::Record {
        path: path.to_path_buf(),
        source,
    })?;
    let key = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(StoredMember { key, member })
}

/// Load every record. An unreadable content directory is fatal; a single
/// unreadable or invalid file is reported and skipped.
pub fn load_members(dir: &Path) -> Result<(Vec<StoredMember>, usize)> {
    let mut members = Vec::new();
    let mut failed = 0;
    for path in record_files(dir)? {
        match load_member(&path) {
            Ok(m) => members.push(m),
            Err(e) => {
                warn!(error = %e, "skipping record");
                failed += 1;
            }
        }
    }
    Ok((members, failed))
}

/// Normalize every stored record in place. Files already normalized are not
/// rewritten.
pub fn normalize_records(dir: &Path) -> Result<NormalizeStats> {
    let mut stats = NormalizeStats::default();
    for path in record_files(dir)? {
        stats.total += 1;
        let result = read_value(&path).and_then(|value| {
            let normalized = normalize_value(value.clone());
            if normalized == value {
                return Ok(false);
            }
            let json = to_pretty(&path, &normalized)?;
            fs::write(&path, json).map_err(|e| CmsError::io(&path, e))?;
            Ok(true)
        });
        match result {
            Ok(true) => {
                info!(path = ?path, "normalized");
                stats.changed += 1;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "record not normalized");
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;
    use pretty_assertions::assert_eq;

    fn member(page: Option<&str>) -> Member {
        Member {
            name: Some("Jane\n   Doe".into()),
            photo: Some("img/jane.jpg".into()),
            page_name: page.map(String::from),
            languages: vec![Language {
                name: "Français".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let m = member(Some("jane-doe"));
        let path = save_member(dir.path(), &m).unwrap();
        assert_eq!(path, dir.path().join("jane-doe.json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"name\""));

        let (loaded, failed) = load_members(dir.path()).unwrap();
        assert_eq!(failed, 0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "jane-doe");
        assert_eq!(loaded[0].member, m);
    }

    #[test]
    fn save_directory_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let directory = Directory {
            members: vec![
                member(Some("a")),
                member(None),
                member(Some("a")),
                member(Some("b")),
            ],
        };
        let stats = save_directory(dir.path(), &directory).unwrap();
        assert_eq!(stats, SaveStats { saved: 2, failed: 2, removed: 0 });
        assert_eq!(record_files(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn empty_page_name_is_not_saved() {
        let directory = crate::parser::extract::extract_directory(
            r#"<Team><Member><Name>Jane</Name><PageName></PageName>
<Language name="Français" code=""></Language></Member></Team>"#,
        );
        let dir = tempfile::tempdir().unwrap();
        let stats = save_directory(dir.path(), &directory).unwrap();
        assert_eq!(stats.saved, 0);
        assert_eq!(stats.failed, 1);
        assert!(!dir.path().join(".json").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn page_name_cannot_escape_the_content_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("members");
        let directory = Directory {
            members: vec![member(Some("../x"))],
        };
        let stats = save_directory(&dir, &directory).unwrap();
        assert_eq!(stats.failed, 1);
        assert!(!root.path().join("x.json").exists());
    }

    #[test]
    fn stale_records_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let first = Directory {
            members: vec![member(Some("a")), member(Some("b"))],
        };
        save_directory(dir.path(), &first).unwrap();
        fs::write(dir.path().join("notes.txt"), "kept").unwrap();

        let second = Directory {
            members: vec![member(Some("b")), member(Some("c"))],
        };
        let stats = save_directory(dir.path(), &second).unwrap();
        assert_eq!(stats, SaveStats { saved: 2, failed: 0, removed: 1 });
        let keys: Vec<_> = load_members(dir.path())
            .unwrap()
            .0
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn invalid_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        save_member(dir.path(), &member(Some("ok"))).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let (loaded, failed) = load_members(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(failed, 1);
    }

    #[test]
    fn missing_content_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_members(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn normalize_in_place_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_member(dir.path(), &member(Some("jane"))).unwrap();

        let first = normalize_records(dir.path()).unwrap();
        assert_eq!(first, NormalizeStats { total: 1, changed: 1, failed: 0 });
        let after_first = fs::read_to_string(&path).unwrap();
        assert!(after_first.contains("\"Jane Doe\""));

        let second = normalize_records(dir.path()).unwrap();
        assert_eq!(second, NormalizeStats { total: 1, changed: 0, failed: 0 });
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn record_key_strips_extension() {
        assert_eq!(record_key("jane-doe.json"), "jane-doe");
        assert_eq!(record_key("jane-doe"), "jane-doe");
    }
}
