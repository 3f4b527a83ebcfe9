use serde::{Deserialize, Serialize};

use crate::error::{CmsError, Result};

/// Every member extracted from one markup document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    pub members: Vec<Member>,
}

/// One team member. Required fields stay optional here so a missing tag
/// never aborts extraction; consumers call [`Member::require`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    /// Empty for the default variant.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document name for one language variant: `page` for the default variant,
/// `page-code` otherwise.
pub fn output_name(page_name: &str, code: &str) -> String {
    if code.is_empty() {
        page_name.to_string()
    } else {
        format!("{}-{}", page_name, code)
    }
}

impl Member {
    /// Identifier used in log lines, even when the page name is unset.
    pub fn label(&self) -> &str {
        self.page_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
    }

    /// Look up a required field, failing with the member's label.
    pub fn require<'a>(
        &self,
        field: &'static str,
        value: &'a Option<String>,
    ) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| CmsError::MissingField {
            page: self.label().to_string(),
            field,
        })
    }

    /// The page name, which doubles as the record and document file stem, so
    /// it must be one non-empty path component.
    pub fn page_name(&self) -> Result<&str> {
        let page = self.require("pageName", &self.page_name)?;
        if page.is_empty() || page == "." || page == ".." || page.contains(['/', '\\']) {
            return Err(CmsError::InvalidPageName(page.to_string()));
        }
        Ok(page)
    }

    pub fn default_language(&self) -> Option<&Language> {
        self.languages.iter().find(|l| l.code.is_empty())
    }

    /// Output names for every variant, in declaration order.
    pub fn output_names(&self) -> Result<Vec<String>> {
        let page = self.page_name()?;
        Ok(self
            .languages
            .iter()
            .map(|l| output_name(page, &l.code))
            .collect())
    }

    /// File name of the photo, without any directory prefix.
    pub fn photo_file(&self) -> Option<&str> {
        let photo = self.photo.as_deref()?;
        let file = photo.rsplit(['/', '\\']).next().unwrap_or(photo);
        if file.is_empty() {
            None
        } else {
            Some(file)
        }
    }
}
