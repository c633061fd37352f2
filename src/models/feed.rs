use super::paper::Source;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArxivFilters {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReviewFilters {
    pub tags: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    pub active_source: Source,
    pub arxiv: ArxivFilters,
    pub openreview: OpenReviewFilters,
}

impl FeedState {
    pub fn active_filter(&self) -> ActiveFilter {
        match self.active_source {
            Source::Arxiv => ActiveFilter::Arxiv(self.arxiv.clone()),
            Source::OpenReview => ActiveFilter::OpenReview(self.openreview.clone()),
        }
    }

    pub fn active_tags(&self) -> &[String] {
        match self.active_source {
            Source::Arxiv => &self.arxiv.tags,
            Source::OpenReview => &self.openreview.tags,
        }
    }

    pub(crate) fn active_tags_mut(&mut self) -> &mut Vec<String> {
        match self.active_source {
            Source::Arxiv => &mut self.arxiv.tags,
            Source::OpenReview => &mut self.openreview.tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFilter {
    Arxiv(ArxivFilters),
    OpenReview(OpenReviewFilters),
}

impl Default for ActiveFilter {
    fn default() -> Self {
        Self::Arxiv(ArxivFilters::default())
    }
}

impl ActiveFilter {
    pub fn source(&self) -> Source {
        match self {
            Self::Arxiv(_) => Source::Arxiv,
            Self::OpenReview(_) => Source::OpenReview,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Arxiv(filters) => &filters.tags,
            Self::OpenReview(filters) => &filters.tags,
        }
    }
}
