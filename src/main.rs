use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use weibo_api::config::Config;
use weibo_api::{Paginated, WeiboClient, VERSION};

/// Command-line access to Weibo profiles, posts, articles and listings
#[derive(Parser, Debug)]
#[command(name = "weibo-api", version, about, long_about = None)]
struct Args {
    /// Session cookie ("SUB=...; SUBP=..."), overrides config and WEIBO_COOKIE
    #[arg(long, global = true)]
    cookie: Option<String>,

    /// Save the given --cookie to the config file
    #[arg(long, global = true, requires = "cookie")]
    remember: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a user profile
    People { uid: i64 },
    /// Print a single post
    Status { id: String },
    /// Print a single article
    Article { id: String },
    /// List a user's posts
    Statuses {
        uid: i64,
        /// Skip reposts
        #[arg(long)]
        original: bool,
        #[command(flatten)]
        pages: PageLimit,
    },
    /// List a user's articles
    Articles {
        uid: i64,
        /// Skip reposts
        #[arg(long)]
        original: bool,
        #[command(flatten)]
        pages: PageLimit,
    },
    /// List a user's followers
    Followers {
        uid: i64,
        #[command(flatten)]
        pages: PageLimit,
    },
    /// List the users a user follows
    Follows {
        uid: i64,
        #[command(flatten)]
        pages: PageLimit,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct PageLimit {
    /// Stop after this many pages
    #[arg(long = "pages", default_value_t = 1)]
    max: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("weibo-api {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("weibo-api").join("weibo-api.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".weibo-api").join("weibo-api.log");
    }
    PathBuf::from("weibo-api.log")
}

fn print_line(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Print every item of up to `max` pages, stopping early on an empty page
async fn dump_listing(out: &mut impl Write, mut listing: Paginated<'_>, max: u32) -> Result<()> {
    for _ in 0..max {
        let Some(page) = listing.next_page().await? else {
            tracing::info!("{} {}: empty page, stopping", listing.kind().name(), listing.id());
            break;
        };
        for item in page.values() {
            let value: Value = item.into_value();
            print_line(&mut *out, &value)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    if args.remember {
        if let Some(cookie) = &args.cookie {
            config.set_cookie(cookie).context("Failed to save cookie")?;
        }
    }

    let client = WeiboClient::from_config(&config, args.cookie.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::People { uid } => {
            let snapshot = client.people(uid).snapshot_with_provenance().await?;
            print_line(&mut out, &snapshot)?;
        }
        Command::Status { id } => {
            let snapshot = client.status(id).snapshot_with_provenance().await?;
            print_line(&mut out, &snapshot)?;
        }
        Command::Article { id } => {
            let snapshot = client.article(id).snapshot_with_provenance().await?;
            print_line(&mut out, &snapshot)?;
        }
        Command::Statuses { uid, original, pages } => {
            let listing = if original {
                client.origin_statuses(uid)
            } else {
                client.statuses(uid)
            };
            dump_listing(&mut out, listing, pages.max).await?;
        }
        Command::Articles { uid, original, pages } => {
            let listing = if original {
                client.origin_articles(uid)
            } else {
                client.articles(uid)
            };
            dump_listing(&mut out, listing, pages.max).await?;
        }
        Command::Followers { uid, pages } => {
            dump_listing(&mut out, client.followers(uid), pages.max).await?;
        }
        Command::Follows { uid, pages } => {
            dump_listing(&mut out, client.follows(uid), pages.max).await?;
        }
    }

    Ok(())
}
