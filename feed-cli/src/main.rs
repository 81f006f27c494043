use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feed_client::{FeedClient, FeedClientError, FeedEntry, Post, Profile};
use serde::Serialize;

const TOKEN_FILE: &str = ".feed_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "feed-cli", version, about = "Command line client for feed-server")]
struct Cli {
    /// Server address.
    #[arg(long, global = true, env = "FEED_SERVER")]
    server: Option<String>,

    /// Session token from the identity provider. Falls back to `.feed_token`.
    #[arg(long, global = true, env = "FEED_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Newest posts from everyone.
    Feed,
    /// Newest posts of one user.
    UserPosts {
        #[arg(long)]
        user_id: String,
    },
    /// One post by id.
    Post {
        #[arg(long)]
        id: i64,
    },
    /// Profile by username.
    Profile {
        #[arg(long)]
        username: String,
    },
    /// Publish a post (needs a token).
    Create {
        #[arg(long)]
        content: String,
    },
    /// Store a session token in `.feed_token` for later calls.
    SaveToken {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string()));
    let mut client = FeedClient::new(server).map_err(map_client_error)?;

    let token = match cli.token.as_deref().and_then(parse_token_content) {
        Some(token) => Some(token),
        None => load_token().context("failed to read .feed_token")?,
    };
    if let Some(token) = token {
        client.set_token(token);
    }

    match cli.command {
        Command::Feed => {
            let feed = client.list_posts().await.map_err(map_client_error)?;
            output(cli.json, &feed, || print_feed(&feed))?;
        }
        Command::UserPosts { user_id } => {
            let feed = client
                .list_user_posts(&user_id)
                .await
                .map_err(map_client_error)?;
            output(cli.json, &feed, || print_feed(&feed))?;
        }
        Command::Post { id } => {
            let entry = client.get_post(id).await.map_err(map_client_error)?;
            output(cli.json, &entry, || print_entry(&entry))?;
        }
        Command::Profile { username } => {
            let profile = client
                .get_profile(&username)
                .await
                .map_err(map_client_error)?;
            output(cli.json, &profile, || print_profile(&profile))?;
        }
        Command::Create { content } => {
            let post = client
                .create_post(&content)
                .await
                .map_err(map_client_error)?;
            output(cli.json, &post, || print_post("Post created", &post))?;
        }
        Command::SaveToken { token } => {
            let token = parse_token_content(&token).context("token must not be blank")?;
            fs::write(TOKEN_FILE, token).context("failed to write .feed_token")?;
            println!("Token saved to {TOKEN_FILE}");
        }
    }

    Ok(())
}

fn output<T: Serialize>(json: bool, value: &T, print_text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print_text();
    }
    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn map_client_error(err: FeedClientError) -> anyhow::Error {
    let message = match err {
        FeedClientError::Unauthorized => {
            "authentication required: pass --token, set FEED_TOKEN or run `feed-cli save-token`"
                .to_string()
        }
        FeedClientError::NotFound => "not found".to_string(),
        FeedClientError::RateLimited(message) => format!("slow down: {message}"),
        FeedClientError::InvalidRequest { message, fields } => {
            let details: Vec<String> = fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |msg| format!("{field}: {msg}"))
                })
                .collect();
            if details.is_empty() {
                format!("invalid request: {message}")
            } else {
                format!("invalid request: {}", details.join("; "))
            }
        }
        FeedClientError::Server(message) => format!("server error: {message}"),
        FeedClientError::InvalidUrl(url) => format!("invalid --server address: {url}"),
        FeedClientError::Http(err) => format!("http error: {err}"),
    };
    anyhow::anyhow!(message)
}

fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_entry(entry: &FeedEntry) {
    let name = display_name(
        entry.author.first_name.as_deref(),
        entry.author.last_name.as_deref(),
    );
    if name.is_empty() {
        println!("@{} · {}", entry.author.username, entry.post.created_at);
    } else {
        println!("{name} @{} · {}", entry.author.username, entry.post.created_at);
    }
    println!("  [{}] {}", entry.post.id, entry.post.content);
}

fn print_feed(feed: &[FeedEntry]) {
    println!("Posts: {}", feed.len());
    for entry in feed {
        print_entry(entry);
    }
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("content: {}", post.content);
    println!("author_id: {}", post.author_id);
    println!("created_at: {}", post.created_at);
}

fn print_profile(profile: &Profile) {
    println!("id: {}", profile.id);
    if let Some(username) = &profile.username {
        println!("username: @{username}");
    }
    let name = display_name(profile.first_name.as_deref(), profile.last_name.as_deref());
    if !name.is_empty() {
        println!("name: {name}");
    }
    if let Some(url) = &profile.profile_image_url {
        println!("image: {url}");
    }
}
