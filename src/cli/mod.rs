//! Command-line interface for denuncias.
//!
//! Provides commands for registering a complaint, listing and clearing the
//! complaint store, classifying labels directly and showing configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::{Detector, FixedDetector, HttpDetector};
use crate::config::{self, ResolvedConfig};
use crate::core::{Classifier, ComplaintService, ComplaintStore, LegalTableCache, SubmitError};
use crate::domain::{ClassificationResult, ComplaintForm, ComplaintRecord, Role};

/// denuncias - complaint intake and legal classification
#[derive(Parser, Debug)]
#[command(name = "denuncias")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a complaint
    Submit {
        /// Complaint text
        #[arg(short, long, conflicts_with = "content_file")]
        content: Option<String>,

        /// Read complaint text from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Date of the events (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Place of the events
        #[arg(short, long, default_value = "")]
        place: String,

        /// Accused's name
        #[arg(long, default_value = "")]
        accused_name: String,

        /// Accused's identity document
        #[arg(long, default_value = "")]
        accused_doc: String,

        /// Accused's email
        #[arg(long, default_value = "")]
        accused_email: String,

        /// Role of the person filing
        #[arg(short, long, value_enum, default_value = "victim")]
        role: RoleArg,

        /// Victim's name (complainant role only)
        #[arg(long, default_value = "")]
        victim_name: String,

        /// Victim's identity document (complainant role only)
        #[arg(long, default_value = "")]
        victim_doc: String,

        /// Victim's email (complainant role only)
        #[arg(long, default_value = "")]
        victim_email: String,
    },

    /// List all registered complaints
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete all registered complaints
    Clear {
        /// Skip the confirmation check
        #[arg(short, long)]
        yes: bool,
    },

    /// Classify offense labels against the legal table
    Classify {
        /// Offense labels
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Role for CLI (maps to Role)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// The filer is the victim
    Victim,

    /// The filer reports on behalf of a victim
    Complainant,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Victim => Role::Victim,
            RoleArg::Complainant => Role::Complainant,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        match self.command {
            Commands::Submit {
                content,
                content_file,
                date,
                place,
                accused_name,
                accused_doc,
                accused_email,
                role,
                victim_name,
                victim_doc,
                victim_email,
            } => {
                let content = match (content, content_file) {
                    (Some(text), _) => text,
                    (None, Some(path)) => tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read content file: {}", path.display()))?,
                    (None, None) => anyhow::bail!("Provide --content or --content-file"),
                };

                let form = ComplaintForm {
                    date,
                    location: place,
                    content,
                    accused_name,
                    accused_doc_id: accused_doc,
                    accused_email,
                    role: role.into(),
                    victim_name,
                    victim_doc_id: victim_doc,
                    victim_email,
                };

                submit(config, form).await
            }
            Commands::List { json } => list(config, json).await,
            Commands::Clear { yes } => clear(config, yes).await,
            Commands::Classify { labels } => classify(config, &labels),
            Commands::Config => show_config(config),
        }
    }
}

/// Build the intake service from resolved configuration
pub fn build_service(config: &ResolvedConfig, cache: &LegalTableCache) -> Result<ComplaintService> {
    let table = cache
        .load(&config.legal_table)
        .context("Failed to load legal table")?;

    Ok(ComplaintService::new(
        build_detector(config)?,
        Classifier::new(table),
        ComplaintStore::new(&config.store),
    )
    .with_detection_timeout(config.detector.timeout)
    .with_max_content_chars(config.max_content_chars))
}

fn build_detector(config: &ResolvedConfig) -> Result<Arc<dyn Detector>> {
    let settings = &config.detector;

    if let Some(ref endpoint) = settings.endpoint {
        let detector = HttpDetector::new(endpoint.clone(), settings.token.clone(), settings.timeout)?;
        return Ok(Arc::new(detector));
    }

    let detector = match settings.labels {
        Some(ref labels) => FixedDetector::new(labels.iter().cloned()),
        None => FixedDetector::default(),
    };
    Ok(Arc::new(detector))
}

async fn submit(config: &ResolvedConfig, form: ComplaintForm) -> Result<()> {
    let cache = LegalTableCache::new();
    let service = build_service(config, &cache)?;

    println!("Analyzing complaint...");
    let submission = match service.submit(form).await {
        Ok(submission) => submission,
        Err(SubmitError::Store { source, submission }) => {
            eprintln!("Warning: failed to store complaint ({}), retrying once", source);
            service
                .retry_append(&submission.record)
                .await
                .context("Failed to store complaint")?;
            *submission
        }
        Err(e) => return Err(e.into()),
    };

    println!("Detected offenses: {}", submission.labels.join(", "));
    println!();
    print_classification(&submission.classification);
    println!();
    println!("Complaint registered in {}", service.store().path().display());

    Ok(())
}

async fn list(config: &ResolvedConfig, json: bool) -> Result<()> {
    let store = ComplaintStore::new(&config.store);
    let records = store.list_all().await?;

    if records.is_empty() {
        println!("No complaints registered yet.");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{} complaint(s):", records.len());
    println!();
    for record in &records {
        print_record(record);
    }

    Ok(())
}

async fn clear(config: &ResolvedConfig, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete {} without --yes", config.store.display());
    }

    ComplaintStore::new(&config.store).clear().await?;
    println!("All complaints deleted.");
    Ok(())
}

fn classify(config: &ResolvedConfig, labels: &[String]) -> Result<()> {
    let cache = LegalTableCache::new();
    let table = cache
        .load(&config.legal_table)
        .context("Failed to load legal table")?;

    let results = Classifier::new(table).classify(labels);
    print_classification(&results);
    Ok(())
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Configuration:");
    match config.config_file {
        Some(ref path) => println!("  Config file:  {}", path.display()),
        None => println!("  Config file:  (none, using defaults)"),
    }
    println!("  Home:         {}", config.home.display());
    println!("  Legal table:  {}", config.legal_table.display());
    println!("  Store:        {}", config.store.display());
    match config.detector.endpoint {
        Some(ref endpoint) => println!("  Detector:     http ({})", endpoint),
        None => println!("  Detector:     fixed"),
    }
    println!("  Timeout:      {}s", config.detector.timeout.as_secs());
    println!("  Max content:  {} chars", config.max_content_chars);
    Ok(())
}

fn print_classification(results: &[ClassificationResult]) {
    println!(
        "{:<20} {:<24} {:<16} {:<16}",
        "Delito", "Articulo", "Pena Prision", "Multa"
    );
    println!("{}", "-".repeat(79));
    for r in results {
        println!(
            "{:<20} {:<24} {:<16} {:<16}",
            r.detected_label, r.article, r.prison_penalty, r.fine
        );
    }
}

fn print_record(record: &ComplaintRecord) {
    println!("{}  {}  [{}]", record.date, record.location, record.role);
    println!("  Indiciado: {} ({})", record.accused_name, record.accused_doc_id);
    if record.role == Role::Complainant {
        println!("  Víctima:   {} ({})", record.victim_name, record.victim_doc_id);
    }
    println!("  Delitos:   {}", record.offense_labels);
    println!();
}
