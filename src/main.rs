use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use act_ledger::api::{self, AppState};
use act_ledger::audit::event::SNAPSHOT_WRITTEN;
use act_ledger::audit::{AuditEvent, AuditLogger};
use act_ledger::config::AppConfig;
use act_ledger::ingest::{self, IngestReport, IngestionPipeline};
use act_ledger::ledger::Ledger;
use act_ledger::summarizer::Summarizer;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "act_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting act ledger");

    let config = AppConfig::load()?;
    info!("Configuration loaded");

    // A remote summarizer owns a blocking HTTP client, which must be built
    // and dropped outside the async runtime
    let summarizer = config.summarizer.build()?;

    let ledger = Ledger::new(config.act_id.clone(), config.act_title.clone())?
        .with_max_entries(config.max_ledger_size);
    info!("Ledger {} ready (capacity {})", ledger.id(), ledger.max_entries());

    let startup_ingest = match &config.ingest_on_start {
        Some(path) => Some(ingest_on_start(&ledger, path, &summarizer, &config)?),
        None => None,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(serve(
        config,
        Arc::new(ledger),
        summarizer.clone(),
        startup_ingest,
    ));
    drop(runtime);
    result
}

fn ingest_on_start(
    ledger: &Ledger,
    path: &Path,
    summarizer: &Arc<dyn Summarizer>,
    config: &AppConfig,
) -> Result<IngestReport> {
    let parsed = ingest::parse_file(path)?;
    if parsed.act_id != ledger.id() {
        warn!(
            "{:?} describes act {}, ingesting into {}",
            path,
            parsed.act_id,
            ledger.id()
        );
    }

    let pipeline = IngestionPipeline::new(Some(summarizer.clone()), config.max_ledger_size);
    let report = pipeline.ingest_into(ledger, &parsed.amendments);
    info!(
        "Ingested {} of {} amendments from {:?}",
        report.appended, report.parsed, path
    );
    Ok(report)
}

async fn serve(
    config: AppConfig,
    ledger: Arc<Ledger>,
    summarizer: Arc<dyn Summarizer>,
    startup_ingest: Option<IngestReport>,
) -> Result<()> {
    let audit = if config.audit.enabled {
        Some(AuditLogger::new(config.audit.log_path.clone())?)
    } else {
        None
    };
    info!("Audit logger initialized");

    let host = config.server_host.clone();
    let port = config.server_port;
    let backup = config.backup.clone();
    let state = AppState::new(config, ledger, summarizer, audit);

    if let Some(report) = startup_ingest {
        state.audit_ingest(&report).await;
    }

    let app = api::router(state.clone());

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if backup.enabled {
        write_backup(&state, &backup.dir).await;
    }

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn write_backup(state: &AppState, dir: &Path) {
    let snapshot = state.ledger.snapshot();
    let path = dir.join(snapshot.backup_file_name());

    match snapshot.save(&path) {
        Ok(()) => {
            info!("Backup written to {:?}", path);
            state
                .audit(
                    AuditEvent::new(SNAPSHOT_WRITTEN, state.ledger.id())
                        .with("path", path.display())
                        .with("amendments", snapshot.history.len()),
                )
                .await;
        }
        Err(e) => error!("Failed to write backup {:?}: {}", path, e),
    }
}
