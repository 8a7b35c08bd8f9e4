pub mod config;
pub mod matcher;
pub mod metrics;
pub mod render;
pub mod store;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{ConfigError, EvalConfig, TokenizerKind};
use matcher::{ContentMatcher, MatchError};
use metrics::{MetricsAggregator, MetricsError};
use render::{ContextWindow, DiffInput, render_diff_html, render_tagged_text, wrap_document};
use store::{RecordStore, StoreError};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "FIMEVAL_LOG";

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "fimeval",
    version,
    about = "Compare fill-in-middle completions from a baseline and a fine-tuned model"
)]
pub struct Cli {
    /// TOML config file (defaults to $FIMEVAL_CONFIG when set)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one example from two result files side by side
    Compare {
        /// Result file of the baseline model (JSONL)
        baseline_file: PathBuf,

        /// Result file of the fine-tuned model (JSONL)
        post_finetune_file: PathBuf,

        /// Index into the baseline file; random when omitted
        example_index: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = CompareFormat::Html)]
        format: CompareFormat,

        /// Lines of prefix/suffix context to keep (html defaults to config, 3;
        /// text keeps the full context unless this is given)
        #[arg(long, conflicts_with = "full_context")]
        context_lines: Option<usize>,

        /// Keep the entire prefix and suffix
        #[arg(long, default_value_t = false)]
        full_context: bool,

        /// Seed for random example selection
        #[arg(long)]
        seed: Option<u64>,

        /// Write the rendering to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a diff from literal texts into an HTML file
    Render {
        /// Code before the completion point
        #[arg(long, allow_hyphen_values = true)]
        prefix: String,

        /// Code after the completion point
        #[arg(long, allow_hyphen_values = true)]
        suffix: String,

        /// Expected completion
        #[arg(long, allow_hyphen_values = true)]
        expected: String,

        /// Baseline model completion
        #[arg(long, allow_hyphen_values = true)]
        baseline: String,

        /// Post-finetune model completion
        #[arg(long, allow_hyphen_values = true)]
        post_finetune: String,

        /// Output HTML file
        #[arg(long)]
        output: PathBuf,

        /// Truncate prefix/suffix to this many lines around the completion
        #[arg(long)]
        context_lines: Option<usize>,

        /// Wrap the fragment in a complete HTML page
        #[arg(long, default_value_t = false)]
        standalone: bool,
    },
    /// Exact-match accuracy and BLEU for a result file
    Metrics {
        /// Result file with generated completions (JSONL)
        generated_file: PathBuf,

        /// Emit the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Word tokenizer for BLEU (defaults to config, treebank)
        #[arg(long, value_enum)]
        tokenizer: Option<TokenizerKind>,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareFormat {
    /// Line-numbered HTML table
    Html,
    /// Full prefix and suffix with the completions inlined in tags
    Text,
}

/// Writing a rendered document failed.
#[derive(Debug, Error)]
#[error("failed to write {path}: {source}")]
pub struct OutputError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Install the stderr subscriber. `FIMEVAL_LOG`, then `RUST_LOG`, override the default level.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = dotenvy::var(LOG_ENV)
        .or_else(|_| dotenvy::var("RUST_LOG"))
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Dispatch a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compare {
            baseline_file,
            post_finetune_file,
            example_index,
            format,
            context_lines,
            full_context,
            seed,
            output,
        } => {
            let config = EvalConfig::load(cli.config.as_deref())?;
            let window = match (full_context, format, context_lines) {
                (true, _, _) => None,
                (false, _, Some(lines)) => Some(ContextWindow::new(lines)),
                (false, CompareFormat::Text, None) => None,
                (false, CompareFormat::Html, None) => {
                    Some(ContextWindow::new(config.context_lines))
                }
            };
            let opts = CompareOptions {
                example_index,
                format,
                window,
                seed: seed.or(config.seed),
            };
            run_compare(
                &baseline_file,
                &post_finetune_file,
                &opts,
                &config,
                output.as_deref(),
            )
        }
        Commands::Render {
            prefix,
            suffix,
            expected,
            baseline,
            post_finetune,
            output,
            context_lines,
            standalone,
        } => {
            let mut input = DiffInput::new(prefix, suffix, expected, baseline, post_finetune);
            if let Some(lines) = context_lines {
                input = input.with_window(ContextWindow::new(lines));
            }
            let fragment = render_diff_html(&input);
            let document = if standalone {
                wrap_document("Code Comparison", &fragment)
            } else {
                fragment
            };
            write_output(&output, &document)?;
            println!("HTML file generated: {}", output.display());
            Ok(())
        }
        Commands::Metrics {
            generated_file,
            json,
            tokenizer,
        } => {
            let mut config = EvalConfig::load(cli.config.as_deref())?;
            if let Some(kind) = tokenizer {
                config.tokenizer = kind;
            }
            run_metrics(&generated_file, &config, json)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fimeval", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

/// Resolved options for one comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub example_index: Option<usize>,
    pub format: CompareFormat,
    /// Context window; `None` keeps the full prefix and suffix.
    pub window: Option<ContextWindow>,
    pub seed: Option<u64>,
}

/// The selected example and its rendering.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub baseline_index: usize,
    pub post_finetune_index: usize,
    pub rendered: String,
}

/// Match one baseline example against the post-finetune store and render it.
pub fn compare_stores(
    baseline: &RecordStore,
    post_finetune: &RecordStore,
    opts: &CompareOptions,
    config: &EvalConfig,
) -> Result<Comparison, MatchError> {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pair = ContentMatcher::new(baseline, post_finetune).pair(opts.example_index, &mut rng)?;

    let out_of_range = |index: usize, len: usize| MatchError::IndexOutOfRange { index, len };
    let base = baseline
        .get(pair.source_index)
        .ok_or_else(|| out_of_range(pair.source_index, baseline.len()))?;
    let tuned = post_finetune
        .get(pair.target_index)
        .ok_or_else(|| out_of_range(pair.target_index, post_finetune.len()))?;

    let stripper = config.stripper();
    let mut input = DiffInput::new(
        base.prefix.as_str(),
        base.suffix.as_str(),
        base.expected.as_str(),
        stripper.strip(&base.generated),
        stripper.strip(&tuned.generated),
    );
    if let Some(window) = opts.window {
        input = input.with_window(window);
    }

    let rendered = match opts.format {
        CompareFormat::Html => render_diff_html(&input),
        CompareFormat::Text => render_tagged_text(&input),
    };

    Ok(Comparison {
        baseline_index: pair.source_index,
        post_finetune_index: pair.target_index,
        rendered,
    })
}

fn run_compare(
    baseline_file: &Path,
    post_finetune_file: &Path,
    opts: &CompareOptions,
    config: &EvalConfig,
    output: Option<&Path>,
) -> Result<()> {
    let baseline = RecordStore::load(baseline_file)?;
    let post_finetune = RecordStore::load(post_finetune_file)?;

    let comparison = compare_stores(&baseline, &post_finetune, opts, config).with_context(|| {
        format!(
            "matching {} against {}",
            baseline_file.display(),
            post_finetune_file.display()
        )
    })?;

    info!(
        component = "compare",
        baseline_index = comparison.baseline_index,
        post_finetune_index = comparison.post_finetune_index,
        baseline_line = ?baseline.line_number(comparison.baseline_index),
        post_finetune_line = ?post_finetune.line_number(comparison.post_finetune_index),
        format = ?opts.format,
        "Selected example"
    );

    println!("Example #{}", comparison.baseline_index);
    match output {
        Some(path) => {
            write_output(path, &comparison.rendered)?;
            println!("Diff written to {}", path.display());
        }
        None => println!("{}", comparison.rendered),
    }
    Ok(())
}

fn run_metrics(generated_file: &Path, config: &EvalConfig, json: bool) -> Result<()> {
    let store = RecordStore::load(generated_file)?;
    let tokenizer = config.tokenizer.build();
    let stripper = config.stripper();
    let report = MetricsAggregator::new(tokenizer.as_ref(), &stripper).aggregate(&store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<(), OutputError> {
    std::fs::write(path, content).map_err(|source| OutputError {
        path: path.to_path_buf(),
        source,
    })
}

/// Process exit code for a failed run.
///
/// 3 malformed input, 4 no matching example, 5 empty store,
/// 6 unreadable input or unwritable output, 1 anything else.
/// Usage errors exit with 2 from clap before a run starts.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return match e {
                StoreError::Parse { .. } => 3,
                StoreError::Io { .. } => 6,
            };
        }
        if cause.downcast_ref::<MatchError>().is_some() {
            return 4;
        }
        if cause.downcast_ref::<MetricsError>().is_some() {
            return 5;
        }
        if cause.downcast_ref::<OutputError>().is_some() {
            return 6;
        }
        if let Some(ConfigError::Io { .. }) = cause.downcast_ref::<ConfigError>() {
            return 6;
        }
    }
    1
}
