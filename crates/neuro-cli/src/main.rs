use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use neuro_cli::backend::build_backend;
use neuro_cli::config::{self, PatientConfig, ReportConfig};
use neuro_cli::run::{self, RunContext};
use neuro_core::models::usage::GenerationAttemptRecord;
use neuro_domains::{PatientType, RuleSet};
use neuro_export::NarrativeStatus;
use neuro_llm::{GenerationClient, UsageLedger};
use neuro_normalize::read_rows;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "neuroreport",
    version,
    about = "Draft neuropsychological report narratives from score exports"
)]
struct Cli {
    /// Config file. Defaults to `<config dir>/neuroreport/config.json`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Writes a starter config file.
    Init {
        #[arg(long)]
        patient_name: String,
        #[arg(long, default_value = "child")]
        patient_type: PatientType,
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },
    /// Generates narratives for every eligible domain.
    Run {
        /// Score rows as a JSON array or JSON Lines.
        input: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        patient_name: Option<String>,
        #[arg(long)]
        patient_type: Option<PatientType>,
    },
    /// Shows which domains have enough evidence for the report.
    Domains {
        input: PathBuf,
        #[arg(long)]
        patient_type: Option<PatientType>,
        /// Print the selection as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Summarises a usage journal.
    Usage {
        /// Journal to read. Defaults to `ledger_path` from the config.
        #[arg(long)]
        ledger: Option<PathBuf>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match cli.command {
        Commands::Init {
            patient_name,
            patient_type,
            force,
        } => {
            if config_path.exists() && !force {
                eyre::bail!(
                    "config already exists at {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            let config = ReportConfig::new(PatientConfig {
                name: patient_name,
                patient_type,
            });
            config::save_config(&config, &config_path)?;
            println!("wrote {}", config_path.display());
        }
        Commands::Run {
            input,
            output_dir,
            patient_name,
            patient_type,
        } => {
            let mut config = config::load_config(&config_path)?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(name) = patient_name {
                config.patient.name = name;
            }
            if let Some(patient_type) = patient_type {
                config.patient.patient_type = patient_type;
            }

            let ledger = match &config.ledger_path {
                Some(path) => UsageLedger::with_journal(path)?,
                None => UsageLedger::new(),
            };
            let rows = read_rows(&input)?;
            let backend = build_backend(&config.backend).await;
            let client = GenerationClient::new(backend, config.client_config());
            let ctx = RunContext::new(config.patient.clone(), config.output_dir.clone(), ledger);

            let manifest = run::run_report(ctx, &rows, &config, &client).await?;
            for entry in manifest.domains.iter().chain(manifest.integrated_summary.iter()) {
                println!("{:<14} {}", entry.key, describe(&entry.status));
            }
            println!(
                "{} calls, {} tokens, {:.1}s",
                manifest.usage.total_calls, manifest.usage.total_tokens, manifest.usage.total_time
            );
        }
        Commands::Domains {
            input,
            patient_type,
            json,
        } => {
            let config = if config_path.exists() {
                Some(config::load_config(&config_path)?)
            } else {
                None
            };
            let patient_type = patient_type
                .or(config.as_ref().map(|c| c.patient.patient_type))
                .ok_or_else(|| {
                    eyre::eyre!("no patient type: pass --patient-type or run `neuroreport init`")
                })?;
            let rules = match &config {
                Some(c) => c.rule_set()?,
                None => RuleSet::default(),
            };

            let rows = read_rows(&input)?;
            let selection = run::select(&rows, patient_type, &rules);
            if json {
                println!("{}", serde_json::to_string_pretty(&selection.domains)?);
            } else {
                let report = &selection.normalized.report;
                println!(
                    "{} rows, {} accepted, {} skipped",
                    report.total_rows,
                    report.accepted_rows,
                    report.skipped.len()
                );
                for domain in &selection.domains {
                    let verdict = if domain.included { "included" } else { "excluded" };
                    println!(
                        "{:<14} {:<9} {} ({} scoreable rows)",
                        domain.key,
                        verdict,
                        domain.reason,
                        domain.scoreable_row_count()
                    );
                }
            }
        }
        Commands::Usage {
            ledger,
            domain,
            model,
        } => {
            let path = match ledger {
                Some(path) => path,
                None => config::load_config(&config_path)?
                    .ledger_path
                    .ok_or_else(|| eyre::eyre!("no ledger_path in config; pass --ledger"))?,
            };
            let ledger = UsageLedger::load(&path)?;
            let keep: &dyn Fn(&GenerationAttemptRecord) -> bool = &|r| {
                domain.as_deref().is_none_or(|d| r.domain_key == d)
                    && model.as_deref().is_none_or(|m| r.model_id == m)
            };
            let stats = ledger.summary(Some(keep));
            println!("{}", serde_json::to_string_pretty(&stats)?);
            if let Some(rate) = stats.success_rate() {
                println!("success rate: {:.0}%", rate * 100.0);
            }
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn describe(status: &NarrativeStatus) -> String {
    match status {
        NarrativeStatus::Generated {
            model_id,
            tier,
            attempts,
        } => format!("generated by {model_id} ({tier}, {attempts} attempts)"),
        NarrativeStatus::NeedsManualNarrative { failures } => {
            format!("needs manual narrative ({} failed attempts)", failures.len())
        }
        NarrativeStatus::Excluded { reason } => format!("excluded: {reason}"),
    }
}
