pub mod template;

use std::fmt::Write;

use crate::error::Result;
use crate::model::{output_name, Language, Member, Page};
use crate::settings::Settings;
use template::{escape_html, Template, TemplateData};

/// One rendered output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Output name without extension.
    pub name: String,
    pub html: String,
}

impl RenderedPage {
    pub fn file_name(&self) -> String {
        format!("{}.html", self.name)
    }
}

/// Navigation between the language variants of one member. Empty when there
/// is nothing to switch to.
pub fn language_links(languages: &[Language], current_code: &str, page_name: &str) -> String {
    if languages.len() <= 1 {
        return String::new();
    }
    let mut html = String::from(r#"<div class="navigationHeader language">"#);
    for lang in languages {
        let class = if lang.code == current_code { "currentpage" } else { "" };
        let _ = write!(
            html,
            r#"<a class="{}" href="{}">{}</a>"#,
            class,
            escape_html(&output_name(page_name, &lang.code)),
            escape_html(&lang.name),
        );
    }
    html.push_str("</div>");
    html
}

fn is_set(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

pub fn contact_info(member: &Member) -> String {
    let mut html = String::new();
    if let Some(phone) = is_set(&member.phone_number) {
        let _ = write!(
            html,
            r#"&nbsp;<p>Tel:</p><h2><span class="texthighlightcolor"><div class="icon icon-phone"></div>{}</span></h2>"#,
            escape_html(phone)
        );
    }
    if let Some(email) = is_set(&member.email_address) {
        let email = escape_html(email);
        let _ = write!(
            html,
            r#"&nbsp;<p>Courriel:</p><h2><span class="texthighlightcolor"><a href="mailto:{0}"><div class="icon icon-envelope"></div>{0}</a></span></h2>"#,
            email
        );
    }
    if let Some(site) = is_set(&member.web_site) {
        let _ = write!(
            html,
            r#"&nbsp;<p>Liens:</p><h2><span class="texthighlightcolor"><a href="{}"><div class="icon icon-globe"></div>Site web</a></span></h2>"#,
            escape_html(site)
        );
    }
    html
}

/// Section blocks in page order. Descriptions are already markup and go in
/// as is; titles are escaped.
pub fn sections(page: Option<&Page>) -> String {
    let mut html = String::new();
    for section in page.iter().flat_map(|p| &p.sections) {
        if let Some(title) = is_set(&section.title) {
            let _ = write!(
                html,
                r#"<div class="section cf"><div class="header lightgray"><h3><span>{}</span></h3></div></div>"#,
                escape_html(title)
            );
        }
        if let Some(description) = is_set(&section.description) {
            let _ = write!(html, r#"<div class="sectiontext">{}</div>"#, description);
        }
    }
    html
}

/// Placeholder values for one language variant of a member page.
pub fn member_page_data(
    member: &Member,
    lang: &Language,
    settings: &Settings,
) -> Result<TemplateData> {
    let name = member.require("name", &member.name)?;
    let photo = member.require("photo", &member.photo)?;
    let page_name = member.page_name()?;

    let title = lang
        .page
        .as_ref()
        .and_then(|p| is_set(&p.title))
        .unwrap_or_else(|| settings.title_for(&lang.code));

    let mut data = TemplateData::new();
    data.insert("name".into(), name.to_string());
    data.insert("photo".into(), photo.to_string());
    data.insert("pageTitle".into(), title.to_string());
    data.insert("languageCode".into(), lang.code.clone());
    data.insert("year".into(), settings.year().to_string());
    if let Some(academic) = &lang.academic {
        data.insert("academic".into(), academic.clone());
    }
    if let Some(summary) = &lang.summary {
        data.insert("summary".into(), summary.clone());
    }
    data.insert(
        "languageLinks".into(),
        language_links(&member.languages, &lang.code, page_name),
    );
    data.insert("contactInfo".into(), contact_info(member));
    data.insert("sections".into(), sections(lang.page.as_ref()));
    Ok(data)
}

/// Every language variant of one member, in declaration order.
pub fn render_member(
    template: &Template,
    member: &Member,
    settings: &Settings,
) -> Result<Vec<RenderedPage>> {
    let page_name = member.page_name()?;
    member
        .languages
        .iter()
        .map(|lang| {
            let data = member_page_data(member, lang, settings)?;
            Ok(RenderedPage {
                name: output_name(page_name, &lang.code),
                html: template.render(&data),
            })
        })
        .collect()
}

/// Team listing card for a member's default variant. Members without a
/// default variant or page name are not listed.
pub fn team_card(member: &Member) -> Option<String> {
    let lang = member.default_language()?;
    let href = escape_html(member.page_name().ok()?).into_owned();
    let photo = escape_html(member.photo.as_deref().unwrap_or_default()).into_owned();
    let name = escape_html(member.name.as_deref().unwrap_or_default()).into_owned();
    let academic = escape_html(lang.academic.as_deref().unwrap_or_default()).into_owned();
    let summary = escape_html(lang.summary.as_deref().unwrap_or_default()).into_owned();
    Some(format!(
        r#"<a href="{href}"><img src="{photo}"/></a><div class="member-description"><h3><span><a href="{href}">{name}</a></span></h3><h1><span>{academic}</span></h1><p><span>{summary}</span></p></div><div class="detailLink memberLink"><a href="{href}">détails</a></div>"#
    ))
}

/// Cards laid out two per row; an odd count closes the last row.
pub fn team_grid(cards: &[String]) -> String {
    let mut html = String::new();
    for (i, card) in cards.iter().enumerate() {
        if i % 2 == 0 {
            let _ = write!(
                html,
                r#"<div class="cf"><div class="col1_50_50 section cf memberIntroRow2Col">{}</div>"#,
                card
            );
        } else {
            let _ = write!(
                html,
                r#"<div class="col2_50_50 section cf memberIntroRow2Col">{}</div></div>"#,
                card
            );
        }
    }
    if cards.len() % 2 != 0 {
        html.push_str("</div>");
    }
    html
}

pub fn render_team(template: &Template, members: &[&Member], settings: &Settings) -> String {
    let cards: Vec<String> = members.iter().filter_map(|m| team_card(m)).collect();
    let mut data = TemplateData::new();
    data.insert("members".into(), team_grid(&cards));
    data.insert("year".into(), settings.year().to_string());
    data.insert("pageTitle".into(), settings.title_for("").to_string());
    template.render(&data)
}
