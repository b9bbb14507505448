use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub name: String,
}

/// Directors, creators and actors share the list item shape.
pub type PersonRef = ListItem;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TitleKind {
    Movie,
    Series,
    #[default]
    Unknown,
}

impl TitleKind {
    /// Maps the label shown under the hero title ("TV Series", "TV Movie", ...).
    pub fn from_label(label: &str) -> Self {
        if label.contains("Series") {
            TitleKind::Series
        } else if label.contains("Movie") {
            TitleKind::Movie
        } else {
            TitleKind::Unknown
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub imdb_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TitleKind,
    pub overview: String,
    pub poster: String,
    pub directors: Vec<PersonRef>,
    pub creators: Vec<PersonRef>,
    pub genres: Vec<ListItem>,
    pub production_companies: Vec<ListItem>,
    pub score: f32,
    pub scored_by: u64,
    pub seasons: u32,
    pub episodes: u32,
    pub year: String,
    pub rating: String,
    pub expire_at: Option<jiff::Timestamp>,
}

impl TitleRecord {
    pub fn new(imdb_id: &str) -> Self {
        Self { imdb_id: imdb_id.to_string(), ..Default::default() }
    }

    /// Director credits only appear on movie pages, so their presence wins over
    /// whatever kind label and episode counters were scraped.
    pub fn apply_director_invariant(&mut self) {
        if !self.directors.is_empty() {
            self.kind = TitleKind::Movie;
            self.seasons = 0;
            self.episodes = 0;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CastEntry {
    pub imdb_id: String,
    pub actor: PersonRef,
    pub character: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub name: String,
    pub overview: String,
    pub poster: String,
    pub air_date: String,
    pub rating: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonResult {
    pub imdb_id: String,
    pub season: u32,
    pub episodes: Vec<EpisodeRecord>,
}
