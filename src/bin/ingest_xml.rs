use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use act_ledger::config::AppConfig;
use act_ledger::ingest::IngestionPipeline;

#[derive(Parser)]
#[command(name = "ingest-xml")]
#[command(about = "Build an act ledger from an XML amendment file")]
struct Cli {
    /// XML file to ingest
    input: PathBuf,

    /// Write the resulting snapshot here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of amendments
    #[arg(long)]
    max_entries: Option<usize>,

    /// Summarize with the rule table even if an API key is configured
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let mut summarizer_config = config.summarizer.clone();
    if cli.offline {
        summarizer_config.api_key = None;
    }
    let summarizer = summarizer_config.build()?;
    let max_entries = cli.max_entries.unwrap_or(config.max_ledger_size);

    let pipeline = IngestionPipeline::new(Some(summarizer), max_entries);
    let (ledger, report) = pipeline.ingest_file(&cli.input)?;

    println!("Act: {} ({})", ledger.id(), ledger.title());
    println!("Parsed:   {}", report.parsed);
    println!("Appended: {}", report.appended);
    for rejected in &report.rejected {
        println!("Rejected #{}: {}", rejected.position, rejected.reason);
    }
    if report.capacity_reached {
        println!("Stopped early: ledger capacity of {} reached", max_entries);
    }
    if let Some(head) = &report.head_hash {
        println!("Head:     {}", head);
    }
    println!("Verified: {}", if report.verified { "✓" } else { "✗" });

    if let Some(output) = &cli.output {
        ledger.snapshot().save(output)?;
        info!("Snapshot written to {:?}", output);
        println!("Snapshot: {}", output.display());
    }

    if !report.verified {
        std::process::exit(1);
    }
    Ok(())
}
