use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use stillframe::{
    AssetReference, AssetSource, BatchOptions, ConvertOptions, FramePolicy, LocalSource, Manifest,
    OutputNaming, ProgressCallback, ProgressInfo, RemoteSource,
};

const CLI_AFTER_HELP: &str = "Examples:\n  stillframe remote --manifest assets.json --out mobile/assets/static-thumbnails\n  stillframe local --input assets/exercise-gifs/abdominals --out assets/exercise-thumbnails/abdominals\n  stillframe --json local --input gifs --out thumbs --policy 10\n  stillframe completions zsh > _stillframe";

#[derive(Debug, Parser)]
#[command(
    name = "stillframe",
    version,
    about = "Turn animated GIF exercise demos into static JPEG thumbnails",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar instead of per-item lines.
    #[arg(long, global = true)]
    progress: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (off, error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download GIFs listed in a manifest and keep their first frame.
    #[command(
        about = "Convert GIFs from an object-storage bucket",
        after_help = "Examples:\n  stillframe remote --manifest assets.json --out static-thumbnails\n  stillframe remote --manifest assets.json --out thumbs --base-url https://bucket.example/exercise-gifs --timeout 10"
    )]
    Remote {
        /// JSON manifest listing `{ "id", "locator" }` pairs.
        #[arg(long)]
        manifest: PathBuf,
        /// Output directory for thumbnails (created if absent).
        #[arg(long)]
        out: PathBuf,
        /// Bucket base URL; overrides the manifest's `base_url`.
        #[arg(long)]
        base_url: Option<String>,
        /// Request timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = stillframe::REMOTE_QUALITY)]
        quality: u8,
        /// Frame to keep: first, middle, or a frame index.
        #[arg(long, default_value = "first")]
        policy: String,
        /// Worker threads (needs the `rayon` feature to exceed 1).
        #[arg(long, default_value_t = 1)]
        workers: usize,
    },

    /// Convert the GIFs in a local directory and keep their middle frame.
    #[command(
        about = "Convert GIFs from a local directory",
        after_help = "Examples:\n  stillframe local --input gifs/abdominals --out thumbs/abdominals\n  stillframe local --input gifs --out thumbs --policy first --quality 90 --naming prefixed"
    )]
    Local {
        /// Directory containing `*.gif` files (not searched recursively).
        #[arg(long)]
        input: PathBuf,
        /// Output directory for thumbnails (created if absent).
        #[arg(long)]
        out: PathBuf,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = stillframe::LOCAL_QUALITY)]
        quality: u8,
        /// Frame to keep: first, middle, or a frame index.
        #[arg(long, default_value = "middle")]
        policy: String,
        /// Output naming: plain (`<name>.jpg`) or prefixed (`<id>-<name>.jpg`).
        #[arg(long, default_value = "plain")]
        naming: String,
        /// Worker threads (needs the `rayon` feature to exceed 1).
        #[arg(long, default_value_t = 1)]
        workers: usize,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_naming(value: &str) -> Option<OutputNaming> {
    match value.to_ascii_lowercase().as_str() {
        "plain" | "name" => Some(OutputNaming::Plain),
        "prefixed" | "id" => Some(OutputNaming::Prefixed),
        _ => None,
    }
}

fn default_log_filter(global: &GlobalOptions) -> Result<LevelFilter, Box<dyn std::error::Error>> {
    match &global.log_level {
        Some(level) => level
            .parse::<LevelFilter>()
            .map_err(|_| format!("unsupported --log-level: {level}").into()),
        None if global.verbose => Ok(LevelFilter::Debug),
        None => Ok(LevelFilter::Warn),
    }
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = default_log_filter(global)?.to_string().to_ascii_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
    Ok(())
}

/// Per-item terminal output: a line per item, or a progress bar.
struct TerminalProgress {
    bar: Option<ProgressBar>,
    to_stderr: bool,
}

impl TerminalProgress {
    fn new(total: usize, global: &GlobalOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = if global.progress && std::io::stderr().is_terminal() {
            let bar = ProgressBar::new(total as u64);
            let style =
                ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
            bar.set_style(style.progress_chars("##-"));
            Some(bar)
        } else {
            None
        };
        Ok(Self {
            bar,
            to_stderr: global.json,
        })
    }

    fn emit(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None if self.to_stderr => eprintln!("{line}"),
            None => println!("{line}"),
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_start(&self, asset: &AssetReference) {
        match &self.bar {
            Some(bar) => bar.set_message(asset.base_name()),
            None => self.emit(format!("Processing {}...", asset.base_name())),
        }
    }

    fn on_progress(&self, info: &ProgressInfo<'_>) {
        let outcome = info.outcome;
        match &outcome.result {
            Ok(thumbnail) => {
                let file_name = outcome
                    .output_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.emit(format!(
                    "{} Generated: {} ({}KB)",
                    "✅".green(),
                    file_name,
                    thumbnail.bytes.div_ceil(1024)
                ));
            }
            Err(error) => self.emit(format!(
                "{} Error processing {}: {}",
                "❌".red(),
                outcome.asset.base_name(),
                error.to_string().red()
            )),
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

fn run_and_report<S: AssetSource>(
    source: &S,
    assets: &[AssetReference],
    options: BatchOptions,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = Arc::new(TerminalProgress::new(assets.len(), global)?);
    let options = options.with_progress(progress.clone());

    let report = stillframe::run_batch(source, assets, &options)?;
    progress.finish();

    if global.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        return Ok(());
    }

    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("{}", "Static thumbnail generation complete!".bold());
    println!(
        "{} {}",
        "success:".green().bold(),
        format!("{} file(s)", report.succeeded()).green()
    );
    let errors = format!("{} file(s)", report.failed());
    if report.failed() > 0 {
        println!("{} {}", "errors:".red().bold(), errors.red());
    } else {
        println!("{} {}", "errors:".bold(), errors);
    }
    println!("{} {}", "output:".cyan().bold(), report.output_dir.display());
    println!("{rule}");
    Ok(())
}

fn run_local(
    input: &Path,
    options: BatchOptions,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets = stillframe::discover_gifs(input)?;
    if assets.is_empty() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("No GIF files found in {}", input.display()).yellow()
        );
    } else if !global.json {
        println!("Found {} GIF file(s) to process", assets.len());
    }

    run_and_report(&LocalSource::new(), &assets, options, global)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Remote {
            manifest,
            out,
            base_url,
            timeout,
            quality,
            policy,
            workers,
        } => {
            if timeout == 0 {
                return Err("--timeout must be greater than 0".into());
            }
            let convert = ConvertOptions::remote()
                .try_with_quality(quality)?
                .with_policy(policy.parse::<FramePolicy>()?);

            let manifest = Manifest::load(&manifest)?;
            let base_url = base_url
                .or_else(|| manifest.base_url.clone())
                .ok_or("no base URL: pass --base-url or set base_url in the manifest")?;
            let source = RemoteSource::with_timeout(base_url, Duration::from_secs(timeout))?;

            if !cli.global.json {
                println!("Generating static JPEG thumbnails from GIFs...\n");
            }
            let options = BatchOptions::new(out)
                .with_convert(convert)
                .with_naming(OutputNaming::Prefixed)
                .with_workers(workers);
            run_and_report(&source, &manifest.assets, options, &cli.global)?;
        }
        Commands::Local {
            input,
            out,
            quality,
            policy,
            naming,
            workers,
        } => {
            let convert = ConvertOptions::local()
                .try_with_quality(quality)?
                .with_policy(policy.parse::<FramePolicy>()?);
            let naming = parse_naming(&naming).ok_or("unsupported --naming (plain|prefixed)")?;

            let options = BatchOptions::new(out)
                .with_convert(convert)
                .with_naming(naming)
                .with_workers(workers);
            run_local(&input, options, &cli.global)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "stillframe", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
