use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Arxiv,
    OpenReview,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv",
            Self::OpenReview => "openreview",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "arxiv" => Ok(Self::Arxiv),
            "openreview" => Ok(Self::OpenReview),
            other => Err(format!("unknown source '{}' (expected arxiv or openreview)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown vote direction '{}' (expected up or down)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTag {
    pub name: String,
    #[serde(rename = "isRemovable", default)]
    pub is_removable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperDto {
    pub id: i64,
    pub source: Source,
    pub source_id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    pub paper_url: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub venue_or_category: String,
    #[serde(default)]
    pub year_or_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<PaperTag>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub bleeding_edge_score: Option<f64>,
    #[serde(default)]
    pub recency_component: Option<f64>,
    #[serde(default)]
    pub reputation_component: Option<f64>,
    #[serde(default)]
    pub popularity_component: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub id: i64,
    pub source: Source,
    pub source_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub r#abstract: Option<String>,
    pub paper_url: String,
    pub pdf_url: Option<String>,
    pub venue_or_category: String,
    pub year_or_date: Option<NaiveDate>,
    pub tags: Vec<PaperTag>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub category: Option<String>,
    pub bleeding_edge_score: Option<f64>,
    pub recency_component: Option<f64>,
    pub reputation_component: Option<f64>,
    pub popularity_component: Option<f64>,
}

impl From<PaperDto> for Paper {
    fn from(dto: PaperDto) -> Self {
        Self {
            id: dto.id,
            source: dto.source,
            source_id: dto.source_id,
            title: dto.title,
            authors: dto.authors,
            r#abstract: dto.r#abstract,
            paper_url: dto.paper_url,
            pdf_url: dto.pdf_url,
            venue_or_category: dto.venue_or_category,
            year_or_date: dto.year_or_date.as_deref().and_then(parse_year_or_date),
            tags: dto.tags,
            upvotes: dto.upvotes,
            downvotes: dto.downvotes,
            category: dto.category,
            bleeding_edge_score: dto.bleeding_edge_score,
            recency_component: dto.recency_component,
            reputation_component: dto.reputation_component,
            popularity_component: dto.popularity_component,
        }
    }
}

impl From<Paper> for PaperDto {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id,
            source: paper.source,
            source_id: paper.source_id,
            title: paper.title,
            authors: paper.authors,
            r#abstract: paper.r#abstract,
            paper_url: paper.paper_url,
            pdf_url: paper.pdf_url,
            venue_or_category: paper.venue_or_category,
            year_or_date: paper
                .year_or_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            tags: paper.tags,
            upvotes: paper.upvotes,
            downvotes: paper.downvotes,
            category: paper.category,
            bleeding_edge_score: paper.bleeding_edge_score,
            recency_component: paper.recency_component,
            reputation_component: paper.reputation_component,
            popularity_component: paper.popularity_component,
        }
    }
}

// A bare year (common on OpenReview) maps to January 1st.
pub fn parse_year_or_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }

    raw.parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}
