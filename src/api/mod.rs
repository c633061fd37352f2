mod error;

pub use error::ApiError;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::ClientConfig;
use crate::models::{
    Comment, CommentDto, CreateComment, Paper, PaperDto, Source, VoteDirection,
};

pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPapersParams {
    pub source: Source,
    pub limit: u32,
    pub offset: u32,
    pub tags: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

impl FetchPapersParams {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            limit: DEFAULT_LIMIT,
            offset: 0,
            tags: Vec::new(),
            venue: None,
            year: None,
            category: None,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(venue) = self.venue.as_ref().filter(|venue| !venue.is_empty()) {
            pairs.push(("venue", venue.clone()));
        }
        if let Some(year) = self.year {
            pairs.push(("year", year.to_string()));
        }
        if let Some(category) = self.category.as_ref().filter(|category| !category.is_empty()) {
            pairs.push(("category", category.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_papers(&self, params: &FetchPapersParams) -> Result<Vec<Paper>, ApiError> {
        let path = format!("/api/papers/{}", params.source);
        let request = self
            .request(Method::GET, &path)
            .query(&params.query_pairs());

        let papers: Vec<PaperDto> = self.fetch_json(request).await?;
        Ok(papers.into_iter().map(Paper::from).collect())
    }

    pub async fn fetch_paper_by_id(&self, id: i64) -> Result<Paper, ApiError> {
        let request = self.request(Method::GET, &format!("/api/papers/{}", id));
        let paper: PaperDto = self.fetch_json(request).await?;
        Ok(paper.into())
    }

    pub async fn fetch_all_tags(&self) -> Result<Vec<String>, ApiError> {
        self.fetch_json(self.request(Method::GET, "/api/tags/all"))
            .await
    }

    pub async fn vote_on_paper(&self, id: i64, direction: VoteDirection) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &format!("/api/papers/{}/vote", id))
            .json(&json!({ "direction": direction }));

        // The response body, if any, carries nothing the client needs.
        self.execute(request).await?;
        Ok(())
    }

    pub async fn fetch_comments(&self, paper_id: i64) -> Result<Vec<Comment>, ApiError> {
        let request = self.request(Method::GET, &format!("/api/papers/{}/comments", paper_id));
        let comments: Vec<CommentDto> = self.fetch_json(request).await?;

        comments
            .into_iter()
            .map(|dto| Comment::try_from(dto).map_err(ApiError::from))
            .collect()
    }

    pub async fn post_comment(&self, paper_id: i64, body: &str) -> Result<Comment, ApiError> {
        let request = self
            .request(Method::POST, &format!("/api/papers/{}/comments", paper_id))
            .json(&CreateComment {
                body: body.to_string(),
            });

        let comment: CommentDto = self.fetch_json(request).await?;
        Ok(Comment::try_from(comment)?)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path, "api request");
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ApiError::from_response(status, &body);
            tracing::warn!(status = %status, "api request failed: {}", error);
            return Err(error);
        }

        Ok(response)
    }

    // `None` for 204 responses, which have no body to parse.
    async fn read_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = self.execute(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.read_json(request).await?.ok_or(ApiError::EmptyBody)
    }
}
