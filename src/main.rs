use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use teachable_dl::media::YtDlp;
use teachable_dl::pipeline::{self, RunContext};
use teachable_dl::session::Session;

#[derive(Parser)]
#[command(name = "teachable_dl", about = "Teachable course content downloader")]
struct Cli {
    /// Cookies file containing a logged-in session for the desired course(s)
    #[arg(short, long)]
    cookies: PathBuf,

    /// URLs of courses to download
    #[arg(short, long, num_args = 1..)]
    url: Vec<String>,

    /// Output directory in which to place downloaded course content
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    // Preconditions, checked before any network activity.
    if !cli.cookies.is_file() {
        anyhow::bail!("could not find cookies file: {}", cli.cookies.display());
    }
    if cli.url.is_empty() {
        anyhow::bail!("no course URLs provided");
    }
    let out_root = match cli.output {
        Some(dir) => {
            if !dir.is_dir() {
                anyhow::bail!("invalid output directory: {}", dir.display());
            }
            dir
        }
        None => std::env::current_dir().context("could not determine working directory")?,
    };

    let session = Session::with_cookies(&cli.cookies).context("error loading cookies file")?;
    let ctx = RunContext {
        session: Box::new(session),
        extractor: Box::new(YtDlp::default()),
        out_root,
    };

    let stats = tokio::select! {
        stats = pipeline::run(&ctx, &cli.url) => stats,
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("interrupted by user");
        }
    };

    println!(
        "Done: {} courses attempted ({} ok, {} failed).",
        stats.courses, stats.ok, stats.failed
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
