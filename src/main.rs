use std::env;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lanzou_rs::normalize::now_local;
use lanzou_rs::{
    ClientConfig, ExtractedParams, LanzouClient, PageState, extract_params, parse_size,
    parse_time, strip_comments, strip_comments_str,
};

/// What `page` prints for one page.
#[derive(Serialize)]
struct PageReport {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cookie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<ExtractedParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <command> <arg>", program);
    eprintln!("  page <url|file>   detect challenge and extract request parameters");
    eprintln!("  time <text>       normalize a listing time (e.g. '3 小时前', 2024-05-20)");
    eprintln!("  size <text>       convert a listing size to bytes (e.g. '1.5 M')");
    eprintln!("  strip <file>      print markup with comments removed");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanzou_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("lanzou-rs");
    if args.len() < 3 {
        usage(program);
    }
    let arg = &args[2];

    match args[1].as_str() {
        "page" => {
            let html = if arg.starts_with("http://") || arg.starts_with("https://") {
                let client = LanzouClient::with_config(ClientConfig::from_env())?;
                client.fetch_page(arg).await?
            } else {
                std::fs::read_to_string(arg).with_context(|| format!("Failed to read {}", arg))?
            };
            let report = report_page(&html);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "time" => println!("{}", parse_time(arg, now_local()).to_rfc3339()),
        "size" => println!("{}", parse_size(arg)),
        "strip" => {
            let markup = std::fs::read(arg).with_context(|| format!("Failed to read {}", arg))?;
            std::io::stdout()
                .write_all(&strip_comments(&markup))
                .context("Failed to write output")?;
        }
        _ => usage(program),
    }

    Ok(())
}

fn report_page(html: &str) -> PageReport {
    match PageState::classify(html) {
        PageState::Challenge(token) => match token.solve() {
            Ok(cookie) => PageReport {
                state: "challenge",
                cookie: Some(cookie),
                params: None,
                error: None,
            },
            Err(e) => PageReport {
                state: "challenge",
                cookie: None,
                params: None,
                error: Some(e.to_string()),
            },
        },
        PageState::Normal => match extract_params(&strip_comments_str(html)) {
            Ok(params) => PageReport {
                state: "normal",
                cookie: None,
                params: Some(params),
                error: None,
            },
            Err(e) => PageReport {
                state: "normal",
                cookie: None,
                params: None,
                error: Some(e.to_string()),
            },
        },
    }
}
