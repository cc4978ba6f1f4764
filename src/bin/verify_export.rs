use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::path::Path;
use tracing::{error, info};

use act_ledger::ledger::LedgerSnapshot;

fn main() -> Result<()> {
    let matches = Command::new("verify-export")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Verify the hash chain of an exported act ledger")
        .arg(
            Arg::new("snapshot")
                .value_name("PATH")
                .help("Path to snapshot JSON file")
                .required(true),
        )
        .arg(
            Arg::new("max-entries")
                .short('m')
                .long("max-entries")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Fail if the snapshot holds more entries than this"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print every violation, not just the first"),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let path = matches
        .get_one::<String>("snapshot")
        .ok_or_else(|| anyhow!("snapshot path is required"))?;
    let max_entries = matches.get_one::<usize>("max-entries").copied();

    if let Err(e) = verify_snapshot_file(Path::new(path), max_entries, verbose) {
        error!("Snapshot verification failed: {}", e);
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }

    println!("✓ Snapshot verification completed successfully");
    Ok(())
}

fn verify_snapshot_file(path: &Path, max_entries: Option<usize>, verbose: bool) -> Result<()> {
    info!("Verifying snapshot: {:?}", path);

    if !path.exists() {
        return Err(anyhow!("Snapshot file not found: {}", path.display()));
    }

    let snapshot = LedgerSnapshot::load(path)?;
    println!(
        "Act {} ({}), {} amendments, exported {}",
        snapshot.act_id,
        snapshot.act_title,
        snapshot.history.len(),
        snapshot.exported_at
    );

    if verbose {
        let report = snapshot.integrity_report(max_entries);
        println!("{}", report.summary());
        for violation in &report.violations {
            println!("  entry {}: {}", violation.sequence_index, violation.kind);
        }
    }

    let verified = snapshot.verify(max_entries)?;
    if verbose {
        println!("✓ {} entries verified", verified);
    }
    Ok(())
}
