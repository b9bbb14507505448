//! Field extractors over parsed upstream pages.
//!
//! Every extractor is a pure function of the document. A missing node leaves the
//! field at its zero value; nothing here fails a whole record. Singular fields
//! take the first matching node, list fields keep document order.

use std::{collections::HashSet, sync::LazyLock};

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{
    ids::{self, EntityKind},
    models::{CastEntry, EpisodeRecord, ListItem, PersonRef, TitleKind, TitleRecord},
};

macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
        &*SELECTOR
    }};
}

const WEEKDAYS: [&str; 7] = ["Mon, ", "Tue, ", "Wed, ", "Thu, ", "Fri, ", "Sat, ", "Sun, "];

/// Runs every title-page extractor and merges the results into one record.
pub fn title_record(html: &str, imdb_id: &str) -> TitleRecord {
    let doc = Html::parse_document(html);
    let mut record = TitleRecord::new(imdb_id);
    let mut missing = Vec::new();

    fill(&mut record.title, title(&doc), "title", &mut missing);
    fill(&mut record.kind, kind(&doc), "kind", &mut missing);
    fill(&mut record.overview, overview(&doc), "overview", &mut missing);
    fill(&mut record.poster, poster(&doc), "poster", &mut missing);
    fill(&mut record.seasons, seasons(&doc), "seasons", &mut missing);
    fill(&mut record.episodes, episodes(&doc), "episodes", &mut missing);
    fill(&mut record.score, score(&doc), "score", &mut missing);
    fill(&mut record.scored_by, scored_by(&doc), "scored_by", &mut missing);
    fill(&mut record.year, year(&doc, imdb_id), "year", &mut missing);
    fill(&mut record.rating, content_rating(&doc, imdb_id), "rating", &mut missing);

    record.directors = directors(&doc);
    record.creators = creators(&doc, imdb_id);
    record.genres = genres(&doc);
    record.production_companies = production_companies(&doc);

    record.apply_director_invariant();

    debug!(imdb_id = %imdb_id, missing = ?missing, "extracted title record");
    record
}

fn fill<T>(slot: &mut T, value: Option<T>, field: &'static str, missing: &mut Vec<&'static str>) {
    match value {
        Some(value) => *slot = value,
        None => missing.push(field),
    }
}

pub fn title(doc: &Html) -> Option<String> {
    doc.select(selector!("span.hero__primary-text")).next().and_then(trimmed_text)
}

pub fn kind(doc: &Html) -> Option<TitleKind> {
    let heading = doc.select(selector!("h1[data-testid='hero__pageTitle']")).next()?;
    let label = next_element(heading)?.select(selector!("li")).next()?;
    Some(TitleKind::from_label(&text(label)))
}

pub fn overview(doc: &Html) -> Option<String> {
    let interests = doc.select(selector!("div[data-testid='interests']")).next()?;
    let plot = next_element(interests).filter(|el| el.value().name() == "p")?;
    let mut spans = plot.select(selector!("span"));
    let first = spans.next();
    spans.next().or(first).and_then(trimmed_text)
}

pub fn poster(doc: &Html) -> Option<String> {
    let img = doc.select(selector!("img.ipc-image")).next()?;
    ids::poster_hash(img.value().attr("src")?)
}

pub fn seasons(doc: &Html) -> Option<u32> {
    let label = doc
        .select(selector!("select#browse-episodes-season"))
        .next()?
        .value()
        .attr("aria-label")?;
    label.trim().trim_end_matches(" seasons").trim_end_matches(" season").trim().parse().ok()
}

pub fn episodes(doc: &Html) -> Option<u32> {
    let el = doc.select(selector!("span.ipc-title__subtext")).next()?;
    text(el).trim().parse().ok()
}

fn aggregate_rating(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(selector!("div[data-testid='hero-rating-bar__aggregate-rating__score']")).next()
}

pub fn score(doc: &Html) -> Option<f32> {
    let span = aggregate_rating(doc)?.select(selector!("span")).next()?;
    text(span).trim().parse().ok()
}

pub fn scored_by(doc: &Html) -> Option<u64> {
    let count = next_element(next_element(aggregate_rating(doc)?)?)?;
    parse_count(&text(count))
}

pub fn year(doc: &Html, imdb_id: &str) -> Option<String> {
    let href = format!("/title/{imdb_id}/releaseinfo?ref_=tt_ov_rdat");
    anchors_with_href(doc, &href).next().and_then(trimmed_text)
}

pub fn content_rating(doc: &Html, imdb_id: &str) -> Option<String> {
    let href = format!("/title/{imdb_id}/parentalguide/certificates?ref_=tt_ov_pg");
    anchors_with_href(doc, &href).next().and_then(trimmed_text)
}

/// Person links following the first label that mentions a director.
pub fn directors(doc: &Html) -> Vec<PersonRef> {
    doc.select(selector!("span"))
        .find(|el| text(*el).contains("Director"))
        .and_then(next_element)
        .map(|list| linked_items(list, EntityKind::Person))
        .unwrap_or_default()
}

pub fn creators(doc: &Html, imdb_id: &str) -> Vec<PersonRef> {
    let href = format!("/title/{imdb_id}/fullcredits/?ref_=tt_cst_scc_sm#writer");
    anchors_with_href(doc, &href)
        .filter_map(next_element)
        .flat_map(|list| linked_items(list, EntityKind::Person))
        .collect()
}

pub fn genres(doc: &Html) -> Vec<ListItem> {
    doc.select(selector!("div[data-testid='interests']"))
        .flat_map(|el| linked_items(el, EntityKind::Genre))
        .collect()
}

pub fn production_companies(doc: &Html) -> Vec<ListItem> {
    doc.select(selector!("a"))
        .filter(|a| text(*a).contains("Production companies"))
        .filter_map(next_element)
        .flat_map(|list| linked_items(list, EntityKind::Company))
        .collect()
}

/// Cast rows from the full credits page. Rows without a person link are skipped.
pub fn cast_entries(html: &str, imdb_id: &str) -> Vec<CastEntry> {
    let doc = Html::parse_document(html);
    doc.select(selector!("tr.odd, tr.even"))
        .filter_map(|row| {
            let photo = row.select(selector!("td.primary_photo")).next()?;
            let link = photo.select(selector!("a[href]")).next()?;
            let id = ids::extract_id(EntityKind::Person, link.value().attr("href")?)?;
            let name = link.select(selector!("img[title]")).next()?.value().attr("title")?;

            let character = row
                .select(selector!("td.character"))
                .next()
                .map(|cell| {
                    let linked: String = cell.select(selector!("a")).map(text).collect();
                    let raw = if linked.trim().is_empty() { text(cell) } else { linked };
                    collapse_whitespace(&raw)
                })
                .unwrap_or_default();

            Some(CastEntry {
                imdb_id: imdb_id.to_string(),
                actor: PersonRef { id: id.to_string(), name: name.trim().to_string() },
                character,
            })
        })
        .collect()
}

/// Title ids linked from a search results page, first occurrence only.
pub fn search_result_ids(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    doc.select(selector!("a.ipc-title-link-wrapper"))
        .filter_map(|a| ids::extract_id(EntityKind::Title, a.value().attr("href")?))
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn season_episodes(html: &str) -> Vec<EpisodeRecord> {
    let doc = Html::parse_document(html);
    doc.select(selector!("article.episode-item-wrapper"))
        .map(|item| EpisodeRecord {
            name: item
                .select(selector!(".ipc-title__text"))
                .next()
                .map(|el| episode_name(&text(el)))
                .unwrap_or_default(),
            overview: item
                .select(selector!(".ipc-html-content-inner-div"))
                .next()
                .map(|el| collapse_whitespace(&text(el)))
                .unwrap_or_default(),
            poster: item
                .select(selector!("img.ipc-image"))
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(ids::poster_hash)
                .unwrap_or_default(),
            air_date: item
                .select(selector!("span"))
                .map(text)
                .map(|t| t.trim().to_string())
                .find(|t| WEEKDAYS.iter().any(|day| t.starts_with(*day)))
                .unwrap_or_default(),
            rating: item
                .select(selector!("span.ipc-rating-star--rating"))
                .next()
                .and_then(|el| text(el).trim().parse().ok())
                .unwrap_or_default(),
        })
        .collect()
}

/// Drops the `S1.E1 ∙ ` prefix from an episode heading.
fn episode_name(heading: &str) -> String {
    let heading = heading.trim();
    match heading.split_once(" ∙ ") {
        Some((prefix, name)) if prefix.starts_with('S') => name.trim().to_string(),
        _ => heading.to_string(),
    }
}

/// Parses vote counts such as `2.9M`, `850K` or `(1,234)`.
pub(crate) fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .trim_matches(|c: char| c == '(' || c == ')')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let (digits, scale) = match cleaned.chars().last()? {
        'K' | 'k' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'M' | 'm' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'B' | 'b' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let value: f64 = digits.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| (value * scale).round() as u64)
}

fn linked_items(scope: ElementRef<'_>, kind: EntityKind) -> Vec<ListItem> {
    scope
        .select(selector!("a[href]"))
        .filter_map(|a| {
            let id = ids::extract_id(kind, a.value().attr("href")?)?;
            Some(ListItem { id: id.to_string(), name: text(a).trim().to_string() })
        })
        .collect()
}

fn anchors_with_href<'a>(doc: &'a Html, href: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    doc.select(selector!("a[href]")).filter(move |a| a.value().attr("href") == Some(href))
}

fn next_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

fn text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn trimmed_text(el: ElementRef<'_>) -> Option<String> {
    let text = text(el);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
