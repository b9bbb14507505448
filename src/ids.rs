use std::sync::LazyLock;

use regex::Regex;

static TITLE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/title/(tt\d+)/").unwrap());
static PERSON_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/name/(nm\d+)/").unwrap());
static GENRE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/interest/(in\d+)/").unwrap());
static COMPANY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/company/(co\d+)/").unwrap());

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Title,
    Person,
    Genre,
    Company,
}

impl EntityKind {
    fn pattern(self) -> &'static Regex {
        match self {
            EntityKind::Title => &TITLE_ID,
            EntityKind::Person => &PERSON_ID,
            EntityKind::Genre => &GENRE_ID,
            EntityKind::Company => &COMPANY_ID,
        }
    }
}

/// Pulls the canonical id of `kind` out of a relative link path.
pub fn extract_id(kind: EntityKind, href: &str) -> Option<&str> {
    kind.pattern().captures(href).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Reduces a poster URL such as
/// `https://m.media-amazon.com/images/M/MV5BMDAy...@._V1_QL75_UX190_.jpg`
/// to its stable hash segment (`MV5BMDAy...@`).
pub fn poster_hash(src: &str) -> Option<String> {
    let part = src.split('.').nth(2)?;
    let hash = part.rsplit('/').next()?;
    (!hash.is_empty()).then(|| hash.to_string())
}
