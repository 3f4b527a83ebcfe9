use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::error::{CmsError, Result};
use crate::model::Member;
use crate::render::template::Template;
use crate::render::{self, RenderedPage};
use crate::settings::Settings;
use crate::store::{self, StoredMember};

/// Build stats returned after completion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub members: usize,
    pub pages: usize,
    pub failed: usize,
    pub listed: usize,
    pub removed: usize,
}

/// Regenerate the whole output directory from the stored records.
///
/// Per-member failures (bad record, missing required field) are logged and
/// counted; anything that makes the output as a whole unusable is returned
/// as an error.
pub fn build(settings: &Settings) -> Result<BuildReport> {
    store::ensure_dir(&settings.output_dir)?;

    let (records, load_failures) = store::load_members(&settings.content_dir)?;
    let (records, duplicates) = unique_pages(records);
    info!(records = records.len(), "loaded records");

    let active_pages = active_pages(&records);
    let active_photos = active_photos(&records);

    let removed = cleanup(settings, &active_pages, &active_photos)?;
    copy_assets(settings)?;
    copy_static_pages(settings)?;
    copy_member_photos(settings, &active_photos)?;

    let template = Template::load(&settings.member_template())?;
    let (members, pages, render_failures) = write_member_pages(settings, &template, &records)?;

    let listed = write_team_page(settings, &records)?;

    Ok(BuildReport {
        members,
        pages,
        failed: load_failures + duplicates + render_failures,
        listed,
        removed,
    })
}

/// Drop records whose page name was already taken by an earlier record (in
/// file name order); their pages would overwrite each other.
fn unique_pages(records: Vec<StoredMember>) -> (Vec<StoredMember>, usize) {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if let Ok(page) = record.member.page_name() {
            if !seen.insert(page.to_string()) {
                let e = CmsError::DuplicatePage(page.to_string());
                error!(page = %record.key, error = %e, "record skipped");
                duplicates += 1;
                continue;
            }
        }
        kept.push(record);
    }
    (kept, duplicates)
}

/// `<name>.html` for the default page and every variant of every record.
fn active_pages(records: &[StoredMember]) -> HashSet<String> {
    let mut pages = HashSet::new();
    for record in records {
        let Ok(page) = record.member.page_name() else {
            continue;
        };
        pages.insert(format!("{}.html", page));
        if let Ok(names) = record.member.output_names() {
            pages.extend(names.into_iter().map(|n| format!("{}.html", n)));
        }
    }
    pages
}

fn active_photos(records: &[StoredMember]) -> HashSet<String> {
    records
        .iter()
        .filter_map(|r| r.member.photo_file())
        .map(str::to_string)
        .collect()
}

fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(|e| CmsError::io(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

fn remove(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| CmsError::io(path, e))
}

/// Delete member pages and photos that no record refers to any more. Protected
/// files and allowlisted site images are never touched.
fn cleanup(
    settings: &Settings,
    active_pages: &HashSet<String>,
    active_photos: &HashSet<String>,
) -> Result<usize> {
    let mut removed = 0;

    for name in file_names(&settings.output_dir)? {
        if name.ends_with(".html") && !settings.is_protected(&name) && !active_pages.contains(&name)
        {
            remove(&settings.output_dir.join(&name))?;
            info!(file = %name, "removed stale page");
            removed += 1;
        }
    }

    let img = settings.output_dir.join("img");
    if img.is_dir() {
        for name in file_names(&img)? {
            if !settings.is_site_image(&name) && !active_photos.contains(&name) {
                remove(&img.join(&name))?;
                info!(file = %name, "removed stale photo");
                removed += 1;
            }
        }
    }

    Ok(removed)
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).map_err(|e| CmsError::io(dest, e))?;
    Ok(())
}

/// Recursive copy; a missing source is not an error.
fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        return Ok(());
    }
    store::ensure_dir(dest)?;
    for entry in fs::read_dir(src).map_err(|e| CmsError::io(src, e))? {
        let entry = entry.map_err(|e| CmsError::io(src, e))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

/// Stylesheets, plus the allowlisted site images (member photos are copied
/// separately).
fn copy_assets(settings: &Settings) -> Result<()> {
    copy_dir(
        &settings.site_dir.join("css"),
        &settings.output_dir.join("css"),
    )?;

    let src = settings.site_dir.join("img");
    let dest = settings.output_dir.join("img");
    store::ensure_dir(&dest)?;
    if src.is_dir() {
        for name in file_names(&src)? {
            if settings.is_site_image(&name) {
                copy_file(&src.join(&name), &dest.join(&name))?;
            }
        }
    }
    Ok(())
}

fn copy_static_pages(settings: &Settings) -> Result<()> {
    for page in &settings.static_pages {
        let src = settings.site_dir.join(page);
        if src.is_file() {
            copy_file(&src, &settings.output_dir.join(page))?;
            info!(page = %page, "copied static page");
        } else {
            warn!(page = %page, "static page not found");
        }
    }
    Ok(())
}

fn copy_member_photos(settings: &Settings, photos: &HashSet<String>) -> Result<()> {
    let src = settings.site_dir.join("img");
    let dest = settings.output_dir.join("img");
    let mut copied = 0;
    for photo in photos {
        let from = src.join(photo);
        if from.is_file() {
            copy_file(&from, &dest.join(photo))?;
            copied += 1;
        } else {
            warn!(photo = %photo, "member photo not found");
        }
    }
    info!(copied, "copied member photos");
    Ok(())
}

/// Render in parallel, write in record order. Returns (members rendered,
/// pages written, failures).
fn write_member_pages(
    settings: &Settings,
    template: &Template,
    records: &[StoredMember],
) -> Result<(usize, usize, usize)> {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let rendered: Vec<(&StoredMember, Result<Vec<RenderedPage>>)> = records
        .par_iter()
        .map(|r| {
            let pages = render::render_member(template, &r.member, settings);
            pb.inc(1);
            (r, pages)
        })
        .collect();
    pb.finish_and_clear();

    let (mut members, mut pages, mut failed) = (0, 0, 0);
    for (record, result) in rendered {
        match result {
            Ok(rendered) => {
                for page in &rendered {
                    let path = settings.output_dir.join(page.file_name());
                    fs::write(&path, &page.html).map_err(|e| CmsError::io(&path, e))?;
                    info!(page = %page.file_name(), "generated");
                }
                members += 1;
                pages += rendered.len();
            }
            Err(e) => {
                error!(page = %record.key, error = %e, "member not rendered");
                failed += 1;
            }
        }
    }
    Ok((members, pages, failed))
}

/// Members in the declared listing order. Every record must be listed; listed
/// names without a record are skipped.
pub fn ordered_members<'a>(
    order: &[String],
    records: &'a [StoredMember],
) -> Result<Vec<&'a Member>> {
    let declared: HashSet<&str> = order.iter().map(|n| store::record_key(n)).collect();
    let missing: Vec<String> = records
        .iter()
        .filter(|r| !declared.contains(r.key.as_str()))
        .map(|r| r.key.clone())
        .collect();
    if !missing.is_empty() {
        return Err(CmsError::MemberOrder(missing));
    }

    let mut members = Vec::with_capacity(order.len());
    for name in order {
        let key = store::record_key(name);
        match records.iter().find(|r| r.key == key) {
            Some(r) => members.push(&r.member),
            None => warn!(page = %key, "listed member has no record"),
        }
    }
    Ok(members)
}

fn write_team_page(settings: &Settings, records: &[StoredMember]) -> Result<usize> {
    let members = ordered_members(&settings.team.member_order, records)?;
    let template = Template::load(&settings.team_template())?;
    let html = render::render_team(&template, &members, settings);

    let path = settings.output_dir.join(&settings.team.output);
    fs::write(&path, html).map_err(|e| CmsError::io(&path, e))?;
    info!(page = %settings.team.output, members = members.len(), "generated team page");
    Ok(members.len())
}
