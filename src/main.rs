#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use repodash::{
    Collaborators, Dashboard, DefaultFsOps, DisabledIssueTracker, FsOps, GhIssueTracker,
    IssueTracker, MutationOp, MutationResult, Settings, SortOrder,
    config::{DEFAULT_CONFIG_PATH, FileConfig, load_config, load_optional},
    logging::init_logging,
    output::{TabStyle, format_mutation, format_status, mutation_to_json, snapshot_to_json},
};

const EXIT_FAILED: u8 = 1;
const EXIT_NEEDS_CONFIRMATION: u8 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Tab,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "Status and safe sync for the git repos under one directory.")]
struct Args {
    /// Config file (default: ~/.config/repodash/config.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory whose immediate children are the repos
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level or flexi_logger spec, e.g. `debug` or `info, repodash::gateway=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan every repo and print its status
    Status {
        #[arg(long, value_enum)]
        sort: Option<SortOrder>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Tab)]
        output: OutputFormat,

        /// Table style to use with --output tab
        #[arg(long, value_enum, default_value_t = TabStyle::Rounded)]
        tab_style: TabStyle,

        /// Number of repos probed at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Skip open issue counts
        #[arg(long)]
        no_issues: bool,

        /// Only list repos with changes, unsynced commits or errors
        #[arg(long)]
        hide_clean: bool,

        /// Show a progress bar on stderr while scanning
        #[arg(long)]
        progress: bool,
    },
    /// Fetch all remotes of one repo
    Fetch {
        repo: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Tab)]
        output: OutputFormat,
    },
    /// Fast-forward one repo; asks for --yes when it has uncommitted changes
    Pull {
        repo: String,

        /// Pull even though the working tree has uncommitted changes
        #[arg(long)]
        yes: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Tab)]
        output: OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match read_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let log_spec = args.log_level.as_deref().or(config.log_level.as_deref());
    // Keep the handle alive until exit.
    let _logger = match init_logging(log_spec) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: logging disabled: {err}");
            None
        }
    };

    let mut settings = match config.settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_FAILED);
        }
    };
    if let Some(root) = args.root {
        settings.root = root;
    }

    match args.command {
        Command::Status {
            sort,
            output,
            tab_style,
            concurrency,
            no_issues,
            hide_clean,
            progress,
        } => {
            if let Some(concurrency) = concurrency {
                if concurrency == 0 {
                    eprintln!("error: --concurrency must be at least 1");
                    return ExitCode::from(EXIT_FAILED);
                }
                settings.concurrency = concurrency;
            }
            settings.show_progress = progress;
            let issues = issue_tracker(&config, &settings, !no_issues);
            let dashboard = Dashboard::new(&settings, Collaborators::system(issues));
            let order = sort.unwrap_or(dashboard.default_sort());

            let outcome = dashboard.refresh(order);
            if let Some(err) = &outcome.error {
                eprintln!("warning: {err}");
            }
            let snapshot = dashboard.status(order);
            match output {
                OutputFormat::Tab => println!("{}", format_status(&snapshot, tab_style, hide_clean)),
                OutputFormat::Json => match snapshot_to_json(&snapshot) {
                    Ok(text) => println!("{text}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        return ExitCode::from(EXIT_FAILED);
                    }
                },
            }
            ExitCode::SUCCESS
        }
        Command::Fetch { repo, output } => {
            let dashboard = mutation_dashboard(&settings);
            let result = dashboard.fetch(&repo);
            report_mutation(MutationOp::Fetch, &repo, &result, output)
        }
        Command::Pull { repo, yes, output } => {
            let dashboard = mutation_dashboard(&settings);
            let result = dashboard.pull(&repo, yes);
            let code = report_mutation(MutationOp::Pull, &repo, &result, output);
            if matches!(result, MutationResult::NeedsConfirmation(_)) && output == OutputFormat::Tab {
                eprintln!("{repo} has uncommitted changes; rerun with --yes to pull anyway");
            }
            code
        }
    }
}

fn read_config(explicit: Option<&PathBuf>) -> Result<FileConfig, String> {
    let loaded = match explicit {
        Some(path) => load_config(path),
        None => load_optional(&DefaultFsOps.expand_tilde(&PathBuf::from(DEFAULT_CONFIG_PATH))),
    };
    loaded.map_err(|err| err.to_string())
}

fn issue_tracker(config: &FileConfig, settings: &Settings, wanted: bool) -> Arc<dyn IssueTracker> {
    if wanted && config.issues.enabled {
        Arc::new(GhIssueTracker::new(
            config.issues.binary.clone(),
            settings.timeouts.issues,
            config.issues.limit,
        ))
    } else {
        Arc::new(DisabledIssueTracker)
    }
}

// The gateway never looks up issues, so no tracker is wired.
fn mutation_dashboard(settings: &Settings) -> Dashboard {
    Dashboard::new(settings, Collaborators::default())
}

fn report_mutation(op: MutationOp, repo: &str, result: &MutationResult, output: OutputFormat) -> ExitCode {
    match output {
        OutputFormat::Tab => println!("{}", format_mutation(op, repo, result, TabStyle::Rounded)),
        OutputFormat::Json => match mutation_to_json(op, repo, result) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::from(EXIT_FAILED);
            }
        },
    }
    match result {
        MutationResult::Succeeded { .. } => ExitCode::SUCCESS,
        MutationResult::Failed { .. } => ExitCode::from(EXIT_FAILED),
        MutationResult::NeedsConfirmation(_) => ExitCode::from(EXIT_NEEDS_CONFIRMATION),
    }
}
