//! `productwhisper` command-line client.
//!
//! Run with: `productwhisper <command> [args]`
//!
//! Results go to stdout as pretty JSON; logs go to stderr so output stays
//! pipeable.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use productwhisper_domain::{NotificationQuery, TrendPeriod};
use productwhisper_infra::{config, ApiError, ProductWhisperClient};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_FORMAT_ENV: &str = "PRODUCTWHISPER_LOG_FORMAT";
const DEFAULT_TRENDING_LIMIT: u32 = 10;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env file loaded"),
    }

    let args: Vec<String> = env::args().skip(1).collect();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ApiError>() {
                Some(api) => eprintln!("Error: {} ({})", api.user_message(), api.code()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).init();
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let command = args.first().map(String::as_str);
    if matches!(command, Some("help" | "--help" | "-h") | None) {
        print_help();
        return Ok(());
    }

    let config = config::load().context("failed to load configuration")?;
    let client = ProductWhisperClient::from_config(&config)?;

    match (command, &args[1..]) {
        (Some("login"), [email, password]) => print_json(&client.login(email, password).await?),
        (Some("logout"), []) => {
            client.logout().await;
            println!("Logged out");
            Ok(())
        }
        (Some("me"), []) => print_json(&client.current_user().await?),
        (Some("search"), [query, ..]) if !query.is_empty() => {
            let query = args[1..].join(" ");
            print_json(&client.search_products(&query, None).await?)
        }
        (Some("product"), [id]) => print_json(&client.product_details(parse_id(id)?).await?),
        (Some("trending"), rest) if rest.len() <= 1 => {
            let limit = match rest.first() {
                Some(raw) => raw.parse().with_context(|| format!("invalid limit: {raw}"))?,
                None => DEFAULT_TRENDING_LIMIT,
            };
            print_json(&client.trending_products(limit).await?)
        }
        (Some("trends"), [id, rest @ ..]) if rest.len() <= 1 => {
            let period = match rest.first() {
                Some(raw) => raw.parse::<TrendPeriod>()?,
                None => TrendPeriod::default(),
            };
            print_json(&client.trend_analysis(parse_id(id)?, period).await?)
        }
        (Some("favorites"), []) => print_json(&client.favorites().await?),
        (Some("notifications"), []) => {
            print_json(&client.notifications(&NotificationQuery::default()).await?)
        }
        (Some("unread"), []) => print_json(&client.unread_notification_count().await?),
        (Some(unknown), _) => {
            eprintln!("Unknown or malformed command: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow!("invalid arguments"))
        }
        (None, _) => Ok(()),
    }
}

fn parse_id(raw: &str) -> anyhow::Result<i64> {
    raw.parse().with_context(|| format!("invalid id: {raw}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_help() {
    println!("ProductWhisper API client");
    println!();
    println!("USAGE:");
    println!("    productwhisper <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    login <email> <password>   Sign in and store the issued tokens");
    println!("    logout                     Sign out and forget stored tokens");
    println!("    me                         Show the current user");
    println!("    search <query>             Search products");
    println!("    product <id>               Show product details");
    println!("    trending [limit]           List trending products (default 10)");
    println!("    trends <id> [period]       Sentiment trends (day|week|month|quarter|year)");
    println!("    favorites                  List favorite products");
    println!("    notifications              List recent notifications");
    println!("    unread                     Count unread notifications");
    println!("    help                       Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    PRODUCTWHISPER_API_URL      API base URL");
    println!("    PRODUCTWHISPER_STORAGE      memory|keyring (keyring saves tokens in the OS keychain)");
    println!("    PRODUCTWHISPER_LOG_FORMAT   Set to 'json' for JSON logs");
    println!("    RUST_LOG                    Log filter (default: info)");
}
