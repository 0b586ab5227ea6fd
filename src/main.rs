mod enrich;
mod error;
mod export;
mod parser;
mod pipeline;
mod record;
mod settings;
mod source;
mod tags;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use settings::Settings;

const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper=warn,hyper_util=warn";

#[derive(Parser)]
#[command(name = "itch_crawler", about = "Crawl an itch.io listing into a ←-delimited table")]
struct Cli {
    /// Data source (URL or HTML file)
    #[arg(value_name = "DATASOURCE")]
    data_source: String,

    /// Result CSV file (default: games.csv)
    #[arg(value_name = "CSVNAME")]
    export_csv: Option<PathBuf>,

    /// Skip tag extraction; no tag columns and no tags file
    #[arg(long)]
    no_tags: bool,

    /// Pause after each detail page, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Where to write the sorted tag list
    #[arg(long)]
    tags_file: Option<PathBuf>,

    /// Accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

/// Flags the parser knows about; any other `-x`/`--x` token is set aside.
const KNOWN_FLAGS: &[&str] = &["--no-tags", "--delay-ms", "--tags-file", "--help", "-h"];

impl Cli {
    /// Parse argv, ignoring options we don't recognise instead of rejecting them.
    fn try_parse_known<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let (known, unknown) = split_unknown_flags(args.into_iter().map(Into::into));
        let mut cli = Self::try_parse_from(known)?;
        cli.extra.extend(unknown);
        Ok(cli)
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.export_csv {
            settings.output = path.clone();
        }
        if let Some(path) = &self.tags_file {
            settings.tags_file = path.clone();
        }
        if let Some(ms) = self.delay_ms {
            settings.delay_ms = ms;
        }
        if self.no_tags {
            settings.with_tags = false;
        }
    }
}

fn split_unknown_flags(args: impl Iterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.enumerate() {
        let name = arg.split('=').next().unwrap_or_default();
        let is_flag = arg.starts_with('-') && arg != "-";
        if i == 0 || passthrough || !is_flag || KNOWN_FLAGS.contains(&name) {
            known.push(arg);
        } else if arg == "--" {
            passthrough = true;
            known.push(arg);
        } else {
            unknown.push(arg);
        }
    }
    (known, unknown)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::try_parse_known(std::env::args()).unwrap_or_else(|e| e.exit());
    if !cli.extra.is_empty() {
        debug!("Ignoring extra arguments: {:?}", cli.extra);
    }

    let mut settings = Settings::load().context("Failed to load ITCH_* settings")?;
    cli.apply(&mut settings);
    debug!(?settings, "Settings resolved");

    let progress = std::io::stderr().is_terminal();
    let summary = pipeline::run(&cli.data_source, &settings, progress).await?;

    println!(
        "Done: {} items ({} ok, {} without detail page) -> {}",
        summary.stats.total,
        summary.stats.ok,
        summary.stats.failed,
        summary.output.display()
    );
    if let Some(path) = &summary.tags_file {
        println!("{} tags -> {}", summary.tag_count, path.display());
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_output_and_ignored_extras() {
        let cli = Cli::try_parse_from(["itch_crawler", "listing.html", "top.csv", "more", "stuff"])
            .unwrap();
        assert_eq!(cli.data_source, "listing.html");
        assert_eq!(cli.export_csv, Some(PathBuf::from("top.csv")));
        assert_eq!(cli.extra, ["more", "stuff"]);

        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.output, PathBuf::from("top.csv"));
        assert!(settings.with_tags);
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "itch_crawler",
            "--no-tags",
            "--delay-ms",
            "0",
            "https://itch.io/games",
        ])
        .unwrap();
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.output, PathBuf::from("games.csv"));
        assert_eq!(settings.delay_ms, 0);
        assert!(!settings.with_tags);
    }

    #[test]
    fn unknown_flags_are_ignored_anywhere() {
        let cli = Cli::try_parse_known(["itch_crawler", "listing.html", "--verbose"]).unwrap();
        assert_eq!(cli.data_source, "listing.html");
        assert_eq!(cli.export_csv, None);
        assert_eq!(cli.extra, ["--verbose"]);

        let cli = Cli::try_parse_known([
            "itch_crawler",
            "-q",
            "listing.html",
            "--log=debug",
            "top.csv",
            "--no-tags",
        ])
        .unwrap();
        assert_eq!(cli.data_source, "listing.html");
        assert_eq!(cli.export_csv, Some(PathBuf::from("top.csv")));
        assert!(cli.no_tags);
        assert_eq!(cli.extra, ["-q", "--log=debug"]);
    }

    #[test]
    fn known_flag_values_still_parse() {
        let cli =
            Cli::try_parse_known(["itch_crawler", "--delay-ms=250", "--tags-file", "vocab", "x.html"])
                .unwrap();
        assert_eq!(cli.delay_ms, Some(250));
        assert_eq!(cli.tags_file, Some(PathBuf::from("vocab")));
        assert!(cli.extra.is_empty());
    }

    #[test]
    fn data_source_is_required() {
        assert!(Cli::try_parse_known(["itch_crawler", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["itch_crawler"]).is_err());
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
