use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::sync::Semaphore;

use crate::api::ApiClient;
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StubEndpoint {
    Papers,
    Tags,
    Vote,
    Comments,
    PostComment,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl RecordedRequest {
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

pub(crate) struct StubBackend {
    pub page_size: usize,
    pub total: usize,
    pub failing: Vec<StubEndpoint>,
    // Requests to these endpoints wait for `StubServer::release`.
    pub gated: Vec<StubEndpoint>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            page_size: 20,
            total: 1_000,
            failing: Vec::new(),
            gated: Vec::new(),
        }
    }
}

struct StubState {
    config: StubBackend,
    gate: Semaphore,
    requests: Mutex<Vec<RecordedRequest>>,
    comments: Mutex<Vec<Value>>,
}

impl StubState {
    fn record(&self, uri: &Uri, body: Option<String>) {
        let query = Query::<HashMap<String, String>>::try_from_uri(uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        self.requests.lock().unwrap().push(RecordedRequest {
            path: uri.path().to_string(),
            query,
            body,
        });
    }

    async fn pass(&self, endpoint: StubEndpoint) -> Result<(), Response> {
        if self.config.gated.contains(&endpoint) {
            self.gate.acquire().await.unwrap().forget();
        }
        if !self.config.failing.contains(&endpoint) {
            return Ok(());
        }

        Err(match endpoint {
            StubEndpoint::Tags => (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": format!("{:?} unavailable", other) })),
            )
                .into_response(),
        })
    }
}

pub(crate) fn paper_json(id: i64, source: &str, tags: &str) -> Value {
    json!({
        "id": id,
        "source": source,
        "source_id": format!("{}-{}", source, id),
        "title": format!("{} paper {} [{}]", source, id, tags),
        "authors": ["Ada Lovelace"],
        "abstract": "An abstract.",
        "paper_url": format!("https://example.org/{}/{}", source, id),
        "pdf_url": null,
        "venue_or_category": "cs.CL",
        "year_or_date": if source == "openreview" { "2023" } else { "2024-05-10" },
        "tags": [{ "name": "nlp", "isRemovable": false }],
        "upvotes": 5,
        "downvotes": 1,
        "category": null,
        "bleeding_edge_score": 0.42,
        "recency_component": 0.1,
        "reputation_component": 0.2,
        "popularity_component": 0.12
    })
}

type Shared = State<Arc<StubState>>;

async fn papers_or_paper(
    State(state): Shared,
    Path(source): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    state.record(&uri, None);

    if let Ok(id) = source.parse::<i64>() {
        if id == 404 {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Paper not found" })),
            )
                .into_response();
        }
        return Json(paper_json(id, "arxiv", "")).into_response();
    }

    if let Err(response) = state.pass(StubEndpoint::Papers).await {
        return response;
    }

    let offset = query
        .get("offset")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = query
        .get("limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(20)
        .min(state.config.page_size);
    let tags = query.get("tags").cloned().unwrap_or_default();
    let end = (offset + limit).min(state.config.total);

    let papers: Vec<Value> = (offset..end)
        .map(|index| paper_json(index as i64 + 1, &source, &tags))
        .collect();
    Json(papers).into_response()
}

async fn all_tags(State(state): Shared, uri: Uri) -> Response {
    state.record(&uri, None);
    if let Err(response) = state.pass(StubEndpoint::Tags).await {
        return response;
    }
    Json(json!(["cv", "nlp", "rl"])).into_response()
}

async fn vote(State(state): Shared, uri: Uri, body: String) -> Response {
    state.record(&uri, Some(body));
    if let Err(response) = state.pass(StubEndpoint::Vote).await {
        return response;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_comments(State(state): Shared, uri: Uri) -> Response {
    state.record(&uri, None);
    if let Err(response) = state.pass(StubEndpoint::Comments).await {
        return response;
    }
    Json(state.comments.lock().unwrap().clone()).into_response()
}

async fn create_comment(State(state): Shared, uri: Uri, body: String) -> Response {
    state.record(&uri, Some(body.clone()));
    if let Err(response) = state.pass(StubEndpoint::PostComment).await {
        return response;
    }

    let text = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value["body"].as_str().map(str::to_string))
        .unwrap_or_default();

    let mut comments = state.comments.lock().unwrap();
    let comment = json!({
        "id": comments.len() as i64 + 100,
        "body": text,
        "created_at": "2024-03-01T12:30:00",
        "author_name": "Anonymous"
    });
    comments.insert(0, comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

impl StubBackend {
    pub async fn spawn(self) -> StubServer {
        let state = Arc::new(StubState {
            config: self,
            gate: Semaphore::new(0),
            requests: Mutex::new(Vec::new()),
            comments: Mutex::new(vec![json!({
                "id": 1,
                "body": "First!",
                "created_at": "2024-02-29T08:00:00",
                "author_name": "Anonymous"
            })]),
        });

        let app = Router::new()
            .route("/api/papers/{source}", get(papers_or_paper))
            .route("/api/papers/{id}/vote", post(vote))
            .route(
                "/api/papers/{id}/comments",
                get(list_comments).post(create_comment),
            )
            .route("/api/tags/all", get(all_tags))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubServer {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

pub(crate) struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(ClientConfig::new(self.base_url.clone()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn paper_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.query.contains_key("offset"))
            .collect()
    }

    pub fn release(&self, count: usize) {
        self.state.gate.add_permits(count);
    }
}
