//! gyaodl - download GYAO! videos as mp4 files.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use gyao_rs::download::HlsDownloader;
use gyao_rs::{Gyao, Resolution};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "gyaodl", version, about = "Download GYAO! video as mp4 file.")]
struct Cli {
    /// GYAO! video url, e.g. https://gyao.yahoo.co.jp/episode/<title>/<id>
    url: String,

    /// Download all available episodes of the series the url belongs to
    #[arg(long, default_value_t = false)]
    series: bool,

    /// Directory the videos are saved to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File errors are appended to
    #[arg(long, default_value = "application.log")]
    log_file: PathBuf,

    /// ffmpeg executable to use instead of the one in PATH
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Print debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Console output respects `RUST_LOG` (or `--verbose`), the log file only receives errors.
fn init_tracing(verbose: bool, log_file: &Path) -> Result<()> {
    let console_level = if verbose { Level::DEBUG } else { Level::INFO };
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gyao_rs={0},gyaodl={0}", console_level)));

    let console_layer = fmt::layer()
        .with_target(verbose)
        .without_time()
        .with_filter(console_filter);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("cannot open log file {}", log_file.display()))?;
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, &cli.log_file)?;

    println!("Start");

    let gyao = Gyao::builder().build()?;
    gyao.parse_url(&cli.url)
        .with_context(|| format!("Unexpected URL: {}", cli.url))?;

    let downloader = match &cli.ffmpeg {
        Some(ffmpeg) => HlsDownloader::with_program(ffmpeg).await,
        None => HlsDownloader::locate().await,
    }
    .context("ffmpeg is required to save videos")?;

    let episodes = match gyao.episodes(&cli.url, cli.series).await {
        Ok(episodes) => episodes,
        Err(e) => {
            tracing::error!(kind = e.kind(), "{}", e);
            return Err(e).context("Failed to get the episode list");
        }
    };

    for episode in episodes {
        match gyao.resolve_episode(episode, Utc::now()).await {
            Resolution::Ready {
                delivery, stream, ..
            } => {
                println!("Video found (Title:{})", delivery.title);

                let path = downloader.output_path(&delivery.title, &cli.output_dir);
                if path.exists() {
                    println!("{} already exists", path.display());
                    println!("Skip");
                    continue;
                }

                match downloader
                    .download(&stream, &delivery.title, &cli.output_dir)
                    .await
                {
                    Ok(saved_at) => {
                        println!("The video has been saved. ({})", saved_at.display())
                    }
                    Err(e) => {
                        println!("Failed to save '{}': {}", delivery.title, e);
                        tracing::error!(kind = e.kind(), title = %delivery.title, "{}", e);
                    }
                }
            }
            Resolution::Unavailable(episode) => {
                println!("This episode is not available yet ({})", episode.title)
            }
            Resolution::NoDelivery(episode) => {
                println!("Failed to get the metadata with video id {}", episode.id);
                tracing::error!(kind = "no_delivery", id = %episode.id, "no delivery found");
            }
            Resolution::NoStream { delivery, .. } => {
                println!("Failed to get the playlist url ({})", delivery.title);
                tracing::error!(
                    kind = "no_stream",
                    delivery_id = %delivery.delivery_id,
                    "no downloadable playlist found"
                );
            }
            Resolution::Failed { episode, error } => {
                println!("Failed to resolve '{}': {}", episode.title, error);
                tracing::error!(kind = error.kind(), id = %episode.id, "{}", error);
            }
        }
    }

    println!("Done");

    Ok(())
}
