//! eng2py CLI: translate English instructions into Python.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use eng2py::config::Config;
use eng2py::pipeline::{Outcome, SUPPORTED_PATTERNS, Translator, suggest};
use eng2py::sandbox::{PythonSandbox, Sandbox};

#[derive(Parser)]
#[command(name = "eng2py", version, about = "Translate English instructions into Python")]
struct Cli {
    /// TOML config file with `[translator]` and `[sandbox]` tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate instructions and print the Python fragment.
    Translate {
        /// Instruction text. Words are joined with spaces; stdin is read when empty.
        text: Vec<String>,

        /// Read the instructions from a file instead.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Print a JSON report instead of plain code.
        #[arg(long)]
        json: bool,

        /// Also print the parsed instruction for each statement.
        #[arg(long)]
        explain: bool,
    },

    /// Translate instructions, then execute the fragment.
    Run {
        /// Instruction text. Words are joined with spaces; stdin is read when empty.
        text: Vec<String>,

        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// List the supported instruction patterns.
    Patterns {
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration to a TOML file.
    InitConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Translate {
            text,
            file,
            json,
            explain,
        } => {
            let input = read_input(&text, file.as_deref())?;
            let translator = Translator::new(config.translator)?;

            if explain {
                match translator.parse(&input) {
                    Ok(parsed) => {
                        let rendered = serde_json::to_string_pretty(&parsed).into_diagnostic()?;
                        eprintln!("{rendered}");
                    }
                    Err(e) => eprintln!("(no parse: {e})"),
                }
            }

            let outcome = translator.translate(&input);
            if json {
                let report = serde_json::to_string_pretty(&outcome.report()).into_diagnostic()?;
                println!("{report}");
                if !outcome.is_success() {
                    std::process::exit(1);
                }
                return Ok(());
            }
            print_outcome(outcome)?;
        }

        Commands::Run { text, file } => {
            let input = read_input(&text, file.as_deref())?;
            let translator = Translator::new(config.translator)?;
            let sandbox = PythonSandbox::new(config.sandbox)?;

            let outcome = translator.translate(&input);
            let Some(code) = outcome.code().map(str::to_string) else {
                return print_outcome(outcome);
            };
            println!("{code}");
            for line in outcome.warning_lines() {
                eprintln!("{line}");
            }
            println!("{}", "-".repeat(40));

            let mut prompt_user = |prompt: &str| -> std::result::Result<String, String> {
                let mut stdout = std::io::stdout().lock();
                write!(stdout, "{prompt}")
                    .and_then(|()| stdout.flush())
                    .map_err(|e| e.to_string())?;
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) => Err("end of input".to_string()),
                    Ok(_) => Ok(line.trim_end_matches(['\n', '\r']).to_string()),
                    Err(e) => Err(e.to_string()),
                }
            };
            let result = sandbox.execute(&code, Some(&mut prompt_user));
            info!(
                success = result.success,
                elapsed_ms = result.execution_time.as_millis() as u64,
                stdout_bytes = result.stdout.len(),
                "run finished"
            );
            println!("{}", result.summary());
            if !result.success {
                std::process::exit(1);
            }
        }

        Commands::Patterns { json } => {
            if json {
                let rendered = serde_json::to_string_pretty(SUPPORTED_PATTERNS).into_diagnostic()?;
                println!("{rendered}");
            } else {
                print!("{}", suggest::render_catalog());
            }
        }

        Commands::InitConfig { path } => {
            Config::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

/// Positional words, a file, or stdin, in that order of preference.
fn read_input(text: &[String], file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path).into_diagnostic();
    }
    if !text.is_empty() {
        return Ok(text.join(" "));
    }
    std::io::read_to_string(std::io::stdin()).into_diagnostic()
}

/// Code to stdout and warnings to stderr, or the failure as a diagnostic.
fn print_outcome(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Success { code, warnings } => {
            println!("{code}");
            for warning in &warnings {
                for line in warning.lines() {
                    eprintln!("{line}");
                }
            }
            info!(warnings = warnings.len(), "translation succeeded");
            Ok(())
        }
        Outcome::Failure { error } => Err(error.into()),
    }
}
