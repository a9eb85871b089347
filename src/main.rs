mod actor;
mod app;
mod backend;
mod config;
mod constants;
mod dashboard;
mod input;
mod mail;
#[cfg(feature = "notifications")]
mod notification;
mod reply;
mod sync;
mod ui;

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::backend::{HttpBackend, MailBackend};
use crate::config::Config;
use crate::mail::{MailView, compute_stats, display_label, group_by_label};

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sift=debug"));

    // Log to a file so the TUI is not disturbed
    let log_file = Config::config_dir()
        .ok()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir.join("sift.log")))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"sift - Terminal dashboard for a classified inbox

Usage: sift [command]

Commands:
    (none)                          Start the dashboard
    list [inbox|sent] [--limit N]   Print one listing grouped by label
    help                            Show this help message

Configuration file: ~/.config/sift/config.toml
Environment: SIFT_BACKEND_URL overrides backend.url
"#
    );
}

/// Arguments of `sift list`
#[derive(Debug, PartialEq)]
struct ListArgs {
    view: MailView,
    limit: Option<usize>,
}

fn parse_list_args(args: &[String]) -> Result<ListArgs> {
    let mut parsed = ListArgs {
        view: MailView::Inbox,
        limit: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--limit" | "-n" => {
                let value = iter.next().context("--limit needs a value")?;
                let limit: usize = value
                    .parse()
                    .with_context(|| format!("Invalid limit: {}", value))?;
                if limit == 0 {
                    anyhow::bail!("--limit must be at least 1");
                }
                parsed.limit = Some(limit);
            }
            view => {
                parsed.view = view.parse().map_err(anyhow::Error::msg)?;
            }
        }
    }

    Ok(parsed)
}

async fn run_list(config: &Config, args: ListArgs) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let limit = args.limit.unwrap_or(config.sync.limit);

    let emails = backend
        .list(args.view, limit)
        .await
        .with_context(|| format!("Failed to list {} from {}", args.view, config.backend.url))?;
    tracing::info!("Listed {} {} emails", emails.len(), args.view);

    for group in group_by_label(&emails) {
        println!("{} ({})", display_label(&group.label), group.len());
        for email in &group.emails {
            println!(
                "  {:>3.0}%  {:<30}  {}",
                email.confidence_or_zero() * 100.0,
                email.display_from(),
                email.display_subject()
            );
        }
    }

    if args.view == MailView::Inbox {
        let stats = compute_stats(&emails);
        println!();
        println!(
            "Total {}  Spam {}  Business {}  Avg confidence {:.1}%",
            stats.total, stats.spam_count, stats.business_count, stats.avg_confidence_percent
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("list") => {
            setup_logging();
            let config = Config::load()?;
            let list_args = parse_list_args(&args[2..])?;
            run_list(&config, list_args).await
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();

            let config = Config::load()?;
            config.ensure_dirs()?;

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
