use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{CmsError, Result};

pub const DEFAULT_CONFIG: &str = "cms.toml";

/// Pipeline configuration. Built once in `main` and passed down explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: PathBuf,
    pub content_dir: PathBuf,
    pub site_dir: PathBuf,
    pub output_dir: PathBuf,
    pub member: MemberSettings,
    pub team: TeamSettings,
    pub static_pages: Vec<String>,
    pub site_images: Vec<String>,
    pub protected_files: Vec<String>,
    pub page_title: String,
    pub page_titles: HashMap<String, String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemberSettings {
    pub template: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    pub template: String,
    pub output: String,
    pub member_order: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: PathBuf::from("members.xml"),
            content_dir: PathBuf::from("content/members"),
            site_dir: PathBuf::from("site"),
            output_dir: PathBuf::from("docs"),
            member: MemberSettings::default(),
            team: TeamSettings::default(),
            static_pages: Vec::new(),
            site_images: Vec::new(),
            protected_files: [
                "index.html",
                "team.html",
                "services.html",
                "contact.html",
                "career.html",
                "links.html",
                ".htaccess",
                "CNAME",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            page_title: "Team".to_string(),
            page_titles: HashMap::new(),
            year: None,
        }
    }
}

impl Default for MemberSettings {
    fn default() -> Self {
        MemberSettings {
            template: "member.html".to_string(),
        }
    }
}

impl Default for TeamSettings {
    fn default() -> Self {
        TeamSettings {
            template: "team.html".to_string(),
            output: "team.html".to_string(),
            member_order: Vec::new(),
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file (optional unless given explicitly), then
    /// `CMS_*` environment variables. Relative paths resolve against the
    /// config file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        };

        let settings: Settings = Config::builder()
            .add_source(File::from(file.as_path()).required(required))
            .add_source(
                Environment::with_prefix("CMS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .map_err(|source| CmsError::Config {
                path: file.clone(),
                source,
            })?;

        let base = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(settings.rooted_at(&base))
    }

    pub fn rooted_at(mut self, base: &Path) -> Self {
        for p in [
            &mut self.source,
            &mut self.content_dir,
            &mut self.site_dir,
            &mut self.output_dir,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        self
    }

    pub fn member_template(&self) -> PathBuf {
        self.site_dir.join(&self.member.template)
    }

    pub fn team_template(&self) -> PathBuf {
        self.site_dir.join(&self.team.template)
    }

    /// Localized document title; falls back to `page_title`.
    pub fn title_for(&self, code: &str) -> &str {
        self.page_titles
            .get(code)
            .map(String::as_str)
            .unwrap_or(&self.page_title)
    }

    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn is_site_image(&self, file: &str) -> bool {
        self.site_images.iter().any(|s| s == file)
    }

    pub fn is_protected(&self, file: &str) -> bool {
        self.protected_files.iter().any(|s| s == file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::default().rooted_at(dir.path());
        assert_eq!(s.content_dir, dir.path().join("content/members"));
        assert_eq!(s.member_template(), dir.path().join("site/member.html"));
        assert!(s.is_protected("index.html"));
    }

    #[test]
    fn loads_toml_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cms.toml");
        std::fs::write(
            &path,
            r#"
output_dir = "public"
site_images = ["banner1.jpg"]
page_title = "Clinique"

[page_titles]
en = "Clinic"

[team]
member_order = ["jane-doe.json", "john-roe"]
"#,
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.output_dir, dir.path().join("public"));
        assert_eq!(s.team.member_order, vec!["jane-doe.json", "john-roe"]);
        assert_eq!(s.team.template, "team.html");
        assert!(s.is_site_image("banner1.jpg"));
        assert_eq!(s.title_for("en"), "Clinic");
        assert_eq!(s.title_for(""), "Clinique");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CmsError::Config { .. }));
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cms.toml");
        std::fs::write(&path, "[team]\noutput = \"team.html\"\n").unwrap();

        std::env::set_var("CMS_TEAM__OUTPUT", "equipe.html");
        let loaded = Settings::load(Some(&path));
        std::env::remove_var("CMS_TEAM__OUTPUT");

        let s = loaded.unwrap();
        assert_eq!(s.team.output, "equipe.html");
        assert_eq!(s.team.template, "team.html");
    }

    #[test]
    fn year_override() {
        let s = Settings {
            year: Some(2019),
            ..Settings::default()
        };
        assert_eq!(s.year(), 2019);
    }
}
