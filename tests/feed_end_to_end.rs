use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde_json::{Value, json};

use paper_feed::api::{ApiClient, FetchPapersParams};
use paper_feed::config::ClientConfig;
use paper_feed::models::Source;
use paper_feed::stores::{FeedStore, PAGE_SIZE, PapersStore};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn list_papers(
    State(seen): State<Seen>,
    Path(source): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    seen.lock().unwrap().push(query);

    let papers = (1..=20)
        .map(|id| {
            json!({
                "id": id,
                "source": source,
                "source_id": format!("2405.{:05}", id),
                "title": format!("Paper {}", id),
                "authors": ["Grace Hopper"],
                "abstract": null,
                "paper_url": format!("https://arxiv.org/abs/2405.{:05}", id),
                "pdf_url": null,
                "venue_or_category": "cs.CL",
                "year_or_date": "2024-05-10",
                "tags": [{ "name": "nlp", "isRemovable": false }],
                "upvotes": 0,
                "downvotes": 0,
                "category": null,
                "bleeding_edge_score": null,
                "recency_component": null,
                "reputation_component": null,
                "popularity_component": null
            })
        })
        .collect();
    Json(papers)
}

async fn spawn_backend() -> (ApiClient, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/papers/{source}", get(list_papers))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(ClientConfig::new(format!("http://{}/", addr)));
    (client, seen)
}

#[tokio::test]
async fn arxiv_nlp_feed_fills_the_first_page() {
    let (client, seen) = spawn_backend().await;

    let feed = FeedStore::new();
    feed.add_tag("nlp");
    let papers = PapersStore::new(client, &feed);

    let state = papers
        .subscribe()
        .wait_for(|state| !state.loading)
        .await
        .unwrap()
        .clone();

    assert!(state.has_more);
    assert_eq!(state.papers.len(), PAGE_SIZE as usize);
    assert_eq!(state.error, None);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("tags").map(String::as_str), Some("nlp"));
    assert_eq!(seen[0].get("limit").map(String::as_str), Some("20"));
    assert_eq!(seen[0].get("offset").map(String::as_str), Some("0"));
}

#[tokio::test]
async fn client_fetch_matches_the_store_request() {
    let (client, seen) = spawn_backend().await;

    let params = FetchPapersParams {
        tags: vec!["nlp".to_string()],
        ..FetchPapersParams::new(Source::Arxiv)
    };
    let papers = client.fetch_papers(&params).await.unwrap();

    assert_eq!(papers.len(), 20);
    assert_eq!(
        papers[0].year_or_date,
        chrono::NaiveDate::from_ymd_opt(2024, 5, 10)
    );
    assert_eq!(seen.lock().unwrap()[0].get("tags").map(String::as_str), Some("nlp"));
}
