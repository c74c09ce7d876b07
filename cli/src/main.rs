//! slidemark CLI - streaming slide markup parser
//!
//! A command-line tool for converting LLM-generated slide markup to JSON,
//! Markdown or plain text, and for replaying a markup file as a stream.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidemark::render::{JsonFormat, RenderOptions};
use slidemark::{LayoutPolicy, ParserOptions, Presentation, SlideParser};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Streaming slide markup parser
#[derive(Parser)]
#[command(
    name = "slidemark",
    version,
    about = "Convert LLM-generated slide markup",
    long_about = "slidemark - Streaming parser for LLM-generated slide markup.\n\n\
                  Converts SECTION-based presentation markup to JSON, Markdown, or plain text."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markup to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// How slide layouts are reported
        #[arg(long, default_value = "literal")]
        layout_policy: LayoutMode,
    },

    /// Convert markup to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit slide ids as comments
        #[arg(long)]
        slide_ids: bool,

        /// Character for list markers
        #[arg(long, default_value = "-")]
        list_marker: char,
    },

    /// Convert markup to plain text
    Text {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show slide statistics
    Info {
        /// Input file path
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feed a file to the parser in growing chunks, as a model would stream it
    Replay {
        /// Input file path
        input: PathBuf,

        /// Bytes added per ingest
        #[arg(long, default_value = "64")]
        chunk_size: usize,
    },

    /// Show version information
    Version,
}

/// Layout reporting mode
#[derive(Clone, Copy, ValueEnum)]
enum LayoutMode {
    /// Report the layout attribute as written
    Literal,
    /// Map layouts to left/right/vertical/title/content
    Canonical,
}

impl From<LayoutMode> for LayoutPolicy {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Literal => LayoutPolicy::Literal,
            LayoutMode::Canonical => LayoutPolicy::Canonical,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
            layout_policy,
        } => {
            let pb = create_spinner("Parsing markup...");

            let options = ParserOptions::new().with_layout_policy(layout_policy.into());
            let deck = load(&input, options)?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = slidemark::render::to_json(&deck, format)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &json)?;
            report_written("JSON", output.as_deref());
        }

        Commands::Markdown {
            input,
            output,
            slide_ids,
            list_marker,
        } => {
            let pb = create_spinner("Parsing markup...");

            let deck = load(&input, ParserOptions::default())?;
            pb.set_message("Rendering to Markdown...");

            let options = RenderOptions::new()
                .with_slide_ids(slide_ids)
                .with_list_marker(list_marker);
            let markdown = slidemark::render::to_markdown(&deck, &options)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &markdown)?;
            report_written("Markdown", output.as_deref());
        }

        Commands::Text { input, output } => {
            let pb = create_spinner("Parsing markup...");

            let deck = load(&input, ParserOptions::default())?;
            pb.set_message("Rendering to text...");

            let text = slidemark::render::to_text(&deck, &RenderOptions::default())?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &text)?;
            report_written("text", output.as_deref());
        }

        Commands::Info { input, json } => {
            let pb = create_spinner("Analyzing markup...");
            let deck = load(&input, ParserOptions::default())?;
            pb.finish_and_clear();

            print_info(&input, &deck, json)?;
        }

        Commands::Replay { input, chunk_size } => {
            let text = fs::read_to_string(&input)?;
            replay(&text, chunk_size.max(1));
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Parse a whole file, force-closing whatever is left open.
fn load(path: &Path, options: ParserOptions) -> Result<Presentation, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    let mut parser = SlideParser::with_options(options);
    parser.ingest_bytes(&data)?;
    parser.finalize();
    Ok(parser.into_presentation())
}

fn print_info(
    input: &Path,
    deck: &Presentation,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut layouts: BTreeMap<String, usize> = BTreeMap::new();
    for slide in &deck.slides {
        let name = slide
            .layout_type
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "(none)".to_string());
        *layouts.entry(name).or_default() += 1;
    }
    let root_images = deck.slides.iter().filter(|s| s.root_image.is_some()).count();
    let text = deck.plain_text();
    let word_count = text.split_whitespace().count();

    if json {
        let stats = serde_json::json!({
            "file": input.display().to_string(),
            "title": deck.title,
            "slides": deck.len(),
            "layouts": layouts,
            "rootImages": root_images,
            "nodes": deck.total_nodes(),
            "words": word_count,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Presentation Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    if let Some(ref title) = deck.title {
        println!("{}: {}", "Title".bold(), title);
    }
    println!("{}: {}", "Slides".bold(), deck.len());
    println!("{}: {}", "Root images".bold(), root_images);

    println!("\n{}", "Layouts".cyan().bold());
    println!("{}", "─".repeat(40));
    for (name, count) in &layouts {
        println!("{}: {}", name.bold(), count);
    }

    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Nodes".bold(), deck.total_nodes());
    println!("{}: {}", "Words".bold(), word_count);
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(())
}

/// Ingest growing prefixes of `text` and report slides as they close.
fn replay(text: &str, chunk_size: usize) {
    let pb = ProgressBar::new(text.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut parser = SlideParser::new();
    let mut closed = 0;
    let mut ingests = 0;
    let mut end = 0;

    while end < text.len() {
        end = (end + chunk_size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }

        parser.ingest(&text[..end]);
        ingests += 1;
        pb.set_position(end as u64);

        let slides = parser.all_slides();
        for slide in &slides[closed.min(slides.len())..] {
            let title = slide.title().unwrap_or_default();
            pb.println(format!(
                "{} {} closed at byte {} {}",
                "✓".green().bold(),
                slide.id,
                end,
                title.dimmed()
            ));
        }
        if slides.len() < closed {
            pb.println(format!(
                "{} slide count dropped from {} to {}",
                "!".yellow().bold(),
                closed,
                slides.len()
            ));
        }
        closed = slides.len();
        pb.set_message(format!("{} slides", closed));
    }
    pb.finish_and_clear();

    parser.finalize();
    let total = parser.all_slides().len();
    if total > closed {
        println!(
            "{} finalize recovered {} unterminated slide(s)",
            "!".yellow().bold(),
            total - closed
        );
    }
    println!(
        "{} {} slides from {} ingests of {} bytes",
        "✓".green().bold(),
        total,
        ingests,
        text.len()
    );
}

fn print_version() {
    println!("{} {}", "slidemark".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Streaming parser for LLM-generated slide markup");
    println!();
    println!("Outputs: JSON, Markdown, plain text");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn report_written(kind: &str, output: Option<&Path>) {
    if let Some(path) = output {
        println!(
            "{} Converted to {}: {}",
            "✓".green().bold(),
            kind,
            path.display()
        );
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
