use crate::model::Member;
use crate::parser::rules::Tag;

use super::language;

/// Fields of one `Member` block. Singular fields take the first match only.
pub fn extract(block: &str) -> Member {
    Member {
        name: Tag::Name.first(block),
        phone_number: Tag::PhoneNumber.first(block),
        email_address: Tag::EmailAddress.first(block),
        photo: Tag::Photo.first(block),
        web_site: Tag::WebSite.first(block),
        page_name: Tag::PageName.first(block),
        languages: Tag::Language.blocks(block).map(language::extract).collect(),
    }
}
