use std::{
    collections::HashMap,
    fmt::Write,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    cache::CacheManager,
    db,
    error::{AppError, AppResult},
    fetcher::{Fetcher, ImdbUrls},
    processor::Acquirer,
};

pub const BASE_URL: &str = "https://imdb.test";
pub const COLLECTION: &str = "titles";

pub fn urls() -> ImdbUrls {
    ImdbUrls::new(BASE_URL)
}

pub async fn memory_cache() -> CacheManager {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    CacheManager::new(db, 7)
}

pub fn acquirer(fetcher: Arc<StubFetcher>, cache: CacheManager, max_concurrent: usize) -> Acquirer {
    Acquirer::new(fetcher, cache, urls(), COLLECTION, max_concurrent)
}

/// Serves canned pages by URL and counts every request.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.pages.get(url).cloned().ok_or_else(|| AppError::upstream(url, "404 Not Found"))
    }
}

/// Builder for a title page shaped like the upstream markup.
#[derive(Clone, Debug)]
pub struct TitlePage {
    pub id: String,
    pub title: String,
    pub kind_label: String,
    pub year: String,
    pub rating: Option<String>,
    pub overview: String,
    pub poster: String,
    pub score: Option<(String, String)>,
    pub genres: Vec<(String, String)>,
    pub directors: Vec<(String, String)>,
    pub creators: Vec<(String, String)>,
    pub companies: Vec<(String, String)>,
    pub seasons: Option<u32>,
    pub episodes: Option<u32>,
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(id, name)| (id.to_string(), name.to_string())).collect()
}

impl TitlePage {
    pub fn movie(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind_label: "1994".to_string(),
            year: "1994".to_string(),
            rating: Some("R".to_string()),
            overview: format!("The full story of {title}."),
            poster: format!("MV5B{id}@"),
            score: Some(("9.3".to_string(), "3M".to_string())),
            genres: pairs(&[("in0000076", "Drama"), ("in0000077", "Prison Drama")]),
            directors: pairs(&[("nm0001104", "Frank Darabont")]),
            creators: Vec::new(),
            companies: pairs(&[("co0040620", "Castle Rock Entertainment")]),
            seasons: None,
            episodes: None,
        }
    }

    pub fn series(id: &str, title: &str) -> Self {
        Self {
            kind_label: "TV Series".to_string(),
            year: "2008–2013".to_string(),
            rating: Some("TV-MA".to_string()),
            score: Some(("9.5".to_string(), "2.3M".to_string())),
            genres: pairs(&[("in0000090", "Crime"), ("in0000076", "Drama")]),
            directors: Vec::new(),
            creators: pairs(&[("nm0319213", "Vince Gilligan")]),
            companies: pairs(&[("co0172007", "High Bridge Entertainment")]),
            seasons: Some(5),
            episodes: Some(62),
            ..Self::movie(id, title)
        }
    }

    pub fn html(&self) -> String {
        let id = &self.id;
        let mut out = String::from("<!DOCTYPE html><html><head><title>IMDb</title></head><body>");

        out.push_str(r#"<section class="hero">"#);
        write!(
            out,
            r#"<h1 data-testid="hero__pageTitle"><span class="hero__primary-text">{}</span></h1>"#,
            self.title
        )
        .unwrap();
        write!(out, r#"<ul class="ipc-inline-list"><li>{}</li>"#, self.kind_label).unwrap();
        write!(out, r#"<li><a href="/title/{id}/releaseinfo?ref_=tt_ov_rdat">{}</a></li>"#, self.year)
            .unwrap();
        if let Some(rating) = &self.rating {
            write!(
                out,
                r#"<li><a href="/title/{id}/parentalguide/certificates?ref_=tt_ov_pg">{rating}</a></li>"#
            )
            .unwrap();
        }
        out.push_str("</ul></section>");

        write!(
            out,
            r#"<div class="ipc-poster"><img class="ipc-image" src="https://m.media-amazon.com/images/M/{}._V1_QL75_UX190_.jpg"></div>"#,
            self.poster
        )
        .unwrap();
        out.push_str(r#"<img class="ipc-image" src="https://m.media-amazon.com/images/M/MV5Bsecondary@._V1_.jpg">"#);

        if let Some((score, scored_by)) = &self.score {
            write!(
                out,
                r#"<div class="rating-bar"><div data-testid="hero-rating-bar__aggregate-rating__score"><span>{score}</span><span>/10</span></div><div></div><div>{scored_by}</div></div>"#
            )
            .unwrap();
        }

        out.push_str(r#"<section><div data-testid="interests">"#);
        for (genre_id, name) in &self.genres {
            write!(
                out,
                r#"<a class="ipc-chip" href="/interest/{genre_id}/?ref_=tt_ov_in_1"><span class="ipc-chip__text">{name}</span></a>"#
            )
            .unwrap();
        }
        write!(
            out,
            r#"</div><p data-testid="plot"><span>Short plot.</span><span>{}</span></p></section>"#,
            self.overview
        )
        .unwrap();

        out.push_str(r#"<ul class="ipc-metadata-list">"#);
        if !self.directors.is_empty() {
            out.push_str(r#"<li><span class="ipc-metadata-list-item__label">Director</span>"#);
            push_links(&mut out, "name", &self.directors);
            out.push_str("</li>");
        }
        if !self.creators.is_empty() {
            write!(out, r#"<li><a href="/title/{id}/fullcredits/?ref_=tt_cst_scc_sm#writer">Creators</a>"#)
                .unwrap();
            push_links(&mut out, "name", &self.creators);
            out.push_str("</li>");
        }
        if !self.companies.is_empty() {
            write!(out, r#"<li><a href="/title/{id}/companycredits/?ref_=tt_dt_co">Production companies</a>"#)
                .unwrap();
            push_links(&mut out, "company", &self.companies);
            out.push_str("</li>");
        }
        out.push_str("</ul>");

        if let Some(seasons) = self.seasons {
            write!(
                out,
                r#"<select id="browse-episodes-season" aria-label="{seasons} seasons"><option value="1">1</option></select>"#
            )
            .unwrap();
        }
        if let Some(episodes) = self.episodes {
            write!(
                out,
                r#"<h3 class="ipc-title__text">Episodes<span class="ipc-title__subtext">{episodes}</span></h3>"#
            )
            .unwrap();
        }

        out.push_str("</body></html>");
        out
    }
}

fn push_links(out: &mut String, segment: &str, items: &[(String, String)]) {
    out.push_str(r#"<div><ul class="ipc-inline-list">"#);
    for (id, name) in items {
        write!(out, r#"<li><a href="/{segment}/{id}/?ref_=tt_ov_1">{name}</a></li>"#).unwrap();
    }
    out.push_str("</ul></div>");
}

pub fn search_page(ids: &[&str]) -> String {
    let mut out = String::from(r#"<html><body><ul class="ipc-metadata-list">"#);
    for (i, id) in ids.iter().enumerate() {
        write!(
            out,
            r#"<li><div class="ipc-title"><a class="ipc-title-link-wrapper" href="/title/{id}/?ref_=sr_t_{n}"><h3 class="ipc-title__text">{n}. Result</h3></a></div></li>"#,
            n = i + 1
        )
        .unwrap();
    }
    out.push_str("</ul></body></html>");
    out
}

/// Rows are `(person id, actor name, character)`.
pub fn cast_page(rows: &[(&str, &str, &str)]) -> String {
    let mut out = String::from(
        r#"<html><body><table class="cast_list"><tbody><tr><td colspan="4">Cast (in credits order)</td></tr>"#,
    );
    for (i, (person, name, character)) in rows.iter().enumerate() {
        let class = if i % 2 == 0 { "odd" } else { "even" };
        write!(
            out,
            r#"<tr class="{class}"><td class="primary_photo"><a href="/name/{person}/?ref_=ttfc_fc_cl_i{i}"><img title="{name}" alt="{name}"></a></td><td><a href="/name/{person}/">{name}</a></td><td class="ellipsis">...</td><td class="character"><a href="/title/tt0111161/characters/{person}">{character}</a></td></tr>"#
        )
        .unwrap();
    }
    out.push_str("</tbody></table></body></html>");
    out
}

/// Episodes are `(name, air date, rating)`.
pub fn season_page(season: u32, episodes: &[(&str, &str, &str)]) -> String {
    let mut out = String::from("<html><body><section>");
    for (i, (name, air_date, rating)) in episodes.iter().enumerate() {
        write!(
            out,
            r#"<article class="episode-item-wrapper"><div><img class="ipc-image" src="https://m.media-amazon.com/images/M/MV5Bep{season}x{n}@._V1_.jpg"></div><div><h4 class="ipc-title__text">S{season}.E{n} ∙ {name}</h4><span>{air_date}</span><div class="ipc-html-content-inner-div">Plot of {name}.</div><span class="ipc-rating-star--rating">{rating}</span></div></article>"#,
            n = i + 1
        )
        .unwrap();
    }
    out.push_str("</section></body></html>");
    out
}
