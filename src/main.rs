//! cord-explorer - metadata analysis and charts for CORD-19 style datasets

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use cord_explorer::config::{Config, LOCAL_CONFIG};
use cord_explorer::data::filter::PaperFilter;
use cord_explorer::pipeline::{self, Analysis, RunOptions};
use cord_explorer::report;

#[derive(Parser)]
#[command(name = "cord-explorer")]
#[command(about = "Analyse paper metadata and render charts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file path (default: ./cord-explorer.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write charts
    Run(RunArgs),
    /// Print the summary tables without writing charts
    Summary(SummaryArgs),
    /// Show current configuration
    Config,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep papers published in or after this year
    #[arg(long)]
    from_year: Option<i32>,

    /// Keep papers published in or before this year
    #[arg(long)]
    to_year: Option<i32>,

    /// Keep only this journal (repeatable)
    #[arg(long = "journal", value_name = "NAME")]
    journals: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> PaperFilter {
        PaperFilter::new(self.from_year, self.to_year, &self.journals)
    }
}

#[derive(Args)]
struct SummaryArgs {
    /// Metadata file (.csv, .tsv, .json or .parquet)
    input: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,

    /// Number of journals to rank
    #[arg(long)]
    top_journals: Option<usize>,

    /// Number of title words to rank
    #[arg(long)]
    top_words: Option<usize>,

    /// Cleaned rows to preview (0 to skip)
    #[arg(long, default_value_t = 10, value_name = "N")]
    preview: usize,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    summary: SummaryArgs,

    /// Output directory for charts
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the cleaned table as CSV
    #[arg(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

fn init_logging(quiet: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.debug);

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Run(args) => {
            apply_overrides(&mut config, &args.summary);
            if let Some(dir) = args.output {
                config.output.dir = dir;
            }
            let options = RunOptions {
                filter: args.summary.filter.to_filter(),
                no_charts: false,
                export_csv: args.export_csv,
            };
            let summary = pipeline::run(&args.summary.input, &config, &options)?;
            print_analysis(&summary.analysis, &config, args.summary.preview);
            if let Some(render) = &summary.render {
                println!("{}", report::render_table(render));
                if !render.all_ok() {
                    log::warn!("{} chart(s) failed", render.failed.len());
                }
            }
            Ok(())
        }
        Command::Summary(args) => {
            apply_overrides(&mut config, &args);
            let options = RunOptions {
                filter: args.filter.to_filter(),
                no_charts: true,
                export_csv: None,
            };
            let summary = pipeline::run(&args.input, &config, &options)?;
            print_analysis(&summary.analysis, &config, args.preview);
            Ok(())
        }
        Command::Config => {
            print_config(&config, cli.config.as_deref());
            Ok(())
        }
    }
}

/// CLI flags take precedence over the config file.
fn apply_overrides(config: &mut Config, args: &SummaryArgs) {
    if let Some(n) = args.top_journals {
        config.analysis.top_journals = n;
    }
    if let Some(n) = args.top_words {
        config.analysis.top_words = n;
    }
}

fn print_analysis(analysis: &Analysis, config: &Config, preview: usize) {
    let prepared = &analysis.prepared;
    let aggregates = &analysis.aggregates;

    println!("{}", report::dataset_table(&prepared.clean, aggregates));
    if preview > 0 {
        println!("{}", report::preview_table(&prepared.table, preview));
    }
    println!(
        "{}",
        report::missing_table(&prepared.missing, prepared.clean.rows_in)
    );
    println!("{}", report::years_table(aggregates));
    println!(
        "{}",
        report::ranking_table("Journal", &aggregates.top_journals)
    );
    println!(
        "{}",
        report::ranking_table(
            "Title word",
            aggregates.title_words.top(config.analysis.top_words)
        )
    );
    if let Some(sources) = &aggregates.top_sources {
        println!("{}", report::ranking_table("Source", sources));
    }
}

fn print_config(config: &Config, path: Option<&std::path::Path>) {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let source = match path {
        Some(p) => p.display().to_string(),
        None if std::path::Path::new(LOCAL_CONFIG).exists() => LOCAL_CONFIG.to_string(),
        None => "defaults".to_string(),
    };
    let analysis = &config.analysis;
    table.add_row(vec!["Config source", &source]);
    table.add_row(vec![
        "Output directory",
        &config.output.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Chart size",
        &format!("{}x{}", config.output.width, config.output.height),
    ]);
    table.add_row(vec!["Top journals", &analysis.top_journals.to_string()]);
    table.add_row(vec!["Top words", &analysis.top_words.to_string()]);
    table.add_row(vec!["Top sources", &analysis.top_sources.to_string()]);
    table.add_row(vec!["Cloud words", &analysis.cloud_max_words.to_string()]);
    table.add_row(vec![
        "Histogram bins",
        &format!("abstract {}, title {}", analysis.abstract_bins, analysis.title_bins),
    ]);
    table.add_row(vec![
        "Alphabetic tokens only",
        if analysis.alphabetic_only { "yes" } else { "no" },
    ]);
    table.add_row(vec![
        "Stopwords",
        &format!(
            "{} ({} extra)",
            analysis.stopword_set().len(),
            analysis.extra_stopwords.len()
        ),
    ]);

    println!("\n{table}");
}
