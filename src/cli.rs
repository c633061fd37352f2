use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use paper_feed::api::ApiClient;
use paper_feed::models::{Comment, Paper, Source, VoteDirection};
use paper_feed::routes::Route;
use paper_feed::stores::{CommentsStore, FeedStore, PapersStore, TagsStore};

#[derive(Debug, Parser)]
#[command(name = "paper-feed", version, about = "Browse, vote on and discuss the paper feed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List papers of one source, filtered
    Feed(FeedArgs),
    /// Render the page behind an application path such as `/paper/12`
    Open { path: String },
    /// List every tag the backend knows
    Tags,
    /// Vote a paper up or down
    Vote { id: i64, direction: VoteDirection },
    /// Post an anonymous comment on a paper
    Comment { id: i64, body: String },
}

#[derive(Debug, Args, Default)]
pub struct FeedArgs {
    #[arg(long, default_value = "arxiv")]
    pub source: Source,
    /// Repeat to require several tags
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// OpenReview only
    #[arg(long)]
    pub venue: Option<String>,
    /// OpenReview only
    #[arg(long)]
    pub year: Option<i32>,
    /// OpenReview only
    #[arg(long)]
    pub category: Option<String>,
    /// Pages of 20 papers to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
}

pub async fn run(cli: Cli, client: ApiClient) -> anyhow::Result<()> {
    match cli.command {
        Command::Feed(args) => show_feed(client, args).await,
        Command::Open { path } => open(client, &path).await,
        Command::Tags => show_tags(client).await,
        Command::Vote { id, direction } => vote(client, id, direction).await,
        Command::Comment { id, body } => comment(client, id, &body).await,
    }
}

async fn open(client: ApiClient, path: &str) -> anyhow::Result<()> {
    match Route::resolve(path) {
        Route::List => show_feed(client, FeedArgs { pages: 1, ..FeedArgs::default() }).await,
        Route::PaperDetail { id } => show_paper(client, id).await,
        Route::NotFound => bail!("Page not found: {}", path),
    }
}

async fn show_feed(client: ApiClient, args: FeedArgs) -> anyhow::Result<()> {
    let feed = FeedStore::new();
    feed.set_source(args.source);
    for tag in &args.tags {
        feed.add_tag(tag);
    }
    feed.set_venue(args.venue);
    feed.set_year(args.year);
    feed.set_category(args.category);

    let papers = PapersStore::new(client, &feed);
    papers
        .subscribe()
        .wait_for(|state| !state.loading)
        .await
        .context("papers store closed")?;

    for _ in 1..args.pages {
        if !papers.snapshot().has_more {
            break;
        }
        papers.load_more().await;
    }

    let state = papers.snapshot();
    papers.dispose();
    if let Some(error) = state.error {
        bail!(error);
    }

    if state.papers.is_empty() {
        println!("No papers match these filters.");
    }
    for paper in &state.papers {
        print_paper_line(paper);
    }
    if state.has_more {
        println!("... more available (use --pages)");
    }
    Ok(())
}

async fn show_paper(client: ApiClient, id: i64) -> anyhow::Result<()> {
    let paper = client.fetch_paper_by_id(id).await?;
    print_paper_detail(&paper);

    let comments = CommentsStore::new(client);
    comments.load(id).await;
    print_comments(&comments)
}

async fn show_tags(client: ApiClient) -> anyhow::Result<()> {
    let tags = TagsStore::spawn(client);
    let state = tags
        .subscribe()
        .wait_for(|state| !state.loading)
        .await
        .context("tags store closed")?
        .clone();

    if let Some(error) = state.error {
        bail!(error);
    }
    for tag in state.tags {
        println!("{}", tag);
    }
    Ok(())
}

async fn vote(client: ApiClient, id: i64, direction: VoteDirection) -> anyhow::Result<()> {
    client.vote_on_paper(id, direction).await?;
    let paper = client.fetch_paper_by_id(id).await?;
    print_paper_line(&paper);
    Ok(())
}

async fn comment(client: ApiClient, id: i64, body: &str) -> anyhow::Result<()> {
    if body.trim().is_empty() {
        bail!("Comment body is empty");
    }

    let comments = CommentsStore::new(client);
    load_then_add(&comments, id, body).await?;
    print_comments(&comments)
}

async fn load_then_add(comments: &CommentsStore, id: i64, body: &str) -> anyhow::Result<()> {
    comments.load(id).await;
    // Adding clears the error field, so a failed load has to stop here.
    if let Some(error) = comments.snapshot().error {
        bail!(error);
    }
    comments.add(id, body).await;
    Ok(())
}

fn print_comments(comments: &CommentsStore) -> anyhow::Result<()> {
    let state = comments.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }

    println!("\n{} comment(s)", state.comments.len());
    for comment in &state.comments {
        print_comment(comment);
    }
    Ok(())
}

fn print_paper_line(paper: &Paper) {
    let date = paper
        .year_or_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "n.d.".to_string());
    println!(
        "{:>6}  +{:<4} -{:<4} {} ({}, {})",
        paper.id, paper.upvotes, paper.downvotes, paper.title, paper.venue_or_category, date
    );
}

fn print_paper_detail(paper: &Paper) {
    println!("{}", paper.title);
    println!("{}", paper.authors.join(", "));
    print_paper_line(paper);
    if !paper.tags.is_empty() {
        let tags: Vec<&str> = paper.tags.iter().map(|tag| tag.name.as_str()).collect();
        println!("tags: {}", tags.join(", "));
    }
    println!("{}", paper.paper_url);
    if let Some(pdf_url) = &paper.pdf_url {
        println!("{}", pdf_url);
    }
    if let Some(text) = &paper.r#abstract {
        println!("\n{}", text);
    }
}

fn print_comment(comment: &Comment) {
    println!(
        "- {} ({}): {}",
        comment.author_name,
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.body
    );
}
