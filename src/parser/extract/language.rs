use crate::model::Language;
use crate::parser::rules::{Block, Tag};

use super::page;

/// One `Language` block. Attribute values are taken verbatim.
pub fn extract(block: Block<'_>) -> Language {
    let attr = |i: usize| block.attributes.get(i).copied().unwrap_or_default().to_string();
    let body = block.inner;
    Language {
        name: attr(0),
        code: attr(1),
        academic: Tag::Academic.first(body),
        summary: Tag::Summary.first(body),
        page: Tag::Page.block(body).map(|b| page::extract(b.inner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(s: &str) -> Language {
        extract(Tag::Language.blocks(s).next().unwrap())
    }

    #[test]
    fn default_variant() {
        let l = lang(
            r#"<Language name="Français" code="">
                <Academic>Ph.D., psychologue</Academic>
                <Summary>Thérapie individuelle</Summary>
            </Language>"#,
        );
        assert_eq!(l.name, "Français");
        assert_eq!(l.code, "");
        assert_eq!(l.academic.as_deref(), Some("Ph.D., psychologue"));
        assert_eq!(l.summary.as_deref(), Some("Thérapie individuelle"));
        assert_eq!(l.page, None);
    }

    #[test]
    fn attribute_values_verbatim() {
        let l = lang(r#"<Language name=" English " code="en">x</Language>"#);
        assert_eq!(l.name, " English ");
        assert_eq!(l.code, "en");
    }

    #[test]
    fn with_page() {
        let l = lang(
            r#"<Language name="English" code="en"><Page>
                <Section><Title>About</Title><Description>Text</Description></Section>
            </Page></Language>"#,
        );
        let page = l.page.unwrap();
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.title, None);
    }

    #[test]
    fn empty_page_has_no_sections() {
        let l = lang(r#"<Language name="English" code="en"><Page></Page></Language>"#);
        assert_eq!(l.page.unwrap().sections.len(), 0);
    }
}
