use crate::model::{Page, Section};
use crate::parser::rules::Tag;

pub fn extract(body: &str) -> Page {
    Page {
        title: None,
        sections: Tag::Section.blocks(body).map(|b| section(b.inner)).collect(),
    }
}

/// Description keeps its inline markup; only the outer whitespace goes.
fn section(body: &str) -> Section {
    Section {
        title: Tag::Title.first(body),
        description: Tag::Description.first(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_in_order() {
        let p = extract(
            "<Section><Title>One</Title></Section>\
             <Section><Description>Two</Description></Section>\
             <Section></Section>",
        );
        assert_eq!(p.sections.len(), 3);
        assert_eq!(p.sections[0].title.as_deref(), Some("One"));
        assert_eq!(p.sections[0].description, None);
        assert_eq!(p.sections[1].title, None);
        assert_eq!(p.sections[1].description.as_deref(), Some("Two"));
        assert_eq!(p.sections[2], Section::default());
    }

    #[test]
    fn description_markup_is_kept() {
        let p = extract(
            "<Section><Description>\n  <p>See <a href=\"https://x.org\">x</a></p>||more\n</Description></Section>",
        );
        assert_eq!(
            p.sections[0].description.as_deref(),
            Some("<p>See <a href=\"https://x.org\">x</a></p>||more")
        );
    }

    #[test]
    fn duplicate_sections_are_not_merged() {
        let p = extract("<Section><Title>A</Title></Section><Section><Title>A</Title></Section>");
        assert_eq!(p.sections.len(), 2);
    }
}
