//! mooowu CLI - read, analyze and highlight the prose of PDF documents

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use mooowu::{to_json, Color, JsonFormat, PdfTools, SplitOptions};

#[derive(Parser)]
#[command(name = "mooowu")]
#[command(version)]
#[command(about = "Read, analyze and highlight the prose of PDF documents", long_about = None)]
struct Cli {
    /// Process pages on a single thread
    #[arg(long, global = true)]
    sequential: bool,

    /// Maximum number of worker threads
    #[arg(long, global = true, value_name = "N", env = "MOOOWU_WORKERS")]
    workers: Option<usize>,

    /// Skip pages that cannot be read instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the readable text, one sentence per line
    Read {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Highlight sentences by exact text
    Highlight {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Sentences to highlight
        #[arg(value_name = "SENTENCE", required = true)]
        sentences: Vec<String>,

        /// Output PDF (default: <stem>_highlighted.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Highlight color as "r,g,b" with components in 0..1
        #[arg(long, value_name = "R,G,B")]
        color: Option<String>,
    },

    /// Show page, sentence and image statistics as JSON
    Analyze {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Highlight every text fragment containing a string
    Search {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Text to search for (case-sensitive)
        #[arg(value_name = "TEXT")]
        text: String,

        /// Output PDF (default: <stem>_highlighted.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Highlight color as "r,g,b" with components in 0..1
        #[arg(long, value_name = "R,G,B")]
        color: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let tools = build_tools(cli.sequential, cli.workers, cli.lenient);

    let result = match cli.command {
        Commands::Read { input, output } => cmd_read(&tools, &input, output.as_deref()),
        Commands::Highlight {
            input,
            sentences,
            output,
            color,
        } => cmd_highlight(&tools, &input, &sentences, output.as_deref(), color.as_deref()),
        Commands::Analyze { input, compact } => cmd_analyze(&tools, &input, compact),
        Commands::Search {
            input,
            text,
            output,
            color,
        } => cmd_search(&tools, &input, &text, output.as_deref(), color.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_tools(sequential: bool, workers: Option<usize>, lenient: bool) -> PdfTools {
    let mut split = SplitOptions::new();
    if let Some(n) = workers {
        split = split.with_max_workers(n);
    }
    if sequential {
        split = split.sequential();
    }

    let tools = PdfTools::new().with_split(split);
    if lenient {
        tools.lenient()
    } else {
        tools
    }
}

fn parse_color(color: Option<&str>) -> Result<Option<Color>, Box<dyn std::error::Error>> {
    Ok(color.map(Color::parse).transpose()?)
}

fn cmd_read(tools: &PdfTools, input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = tools.read(input)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_highlight(
    tools: &PdfTools,
    input: &Path,
    sentences: &[String],
    output: Option<&Path>,
    color: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let color = parse_color(color)?;
    let report = tools.highlight(input, sentences, output, color)?;

    for warning in &report.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }
    println!("{}", to_json(&report, JsonFormat::Pretty)?);

    if report.highlighted_count > 0 {
        eprintln!(
            "{} {} of {} sentences into {}",
            "Highlighted".green(),
            report.highlighted_count,
            report.total_requested,
            report.output_path.display()
        );
    }

    Ok(())
}

fn cmd_analyze(tools: &PdfTools, input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let analysis = tools.analyze(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", to_json(&analysis, format)?);

    Ok(())
}

fn cmd_search(
    tools: &PdfTools,
    input: &Path,
    text: &str,
    output: Option<&Path>,
    color: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let color = parse_color(color)?;
    let result = tools.search(input, text, output, color)?;

    println!(
        "{} {} matches into {}",
        "Highlighted".green(),
        result.match_count,
        result.output_path.display()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mooowu".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF prose reading and highlighting tool");
    println!();
    println!("License: MIT");
}
