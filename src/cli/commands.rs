//! Analysis, export and query command handlers

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use kubegraph::config::Config;
use kubegraph::store::{RelationshipFilter, ResourceFilter, StoredRelationship};
use kubegraph::{
    Analyzer, AnalyzerOptions, BatchRunner, CancellationFlag, ClusterStore, GraphError,
    GraphResult, HealthStatus, RelationshipKind,
};

/// Run blocking analysis work under the configured timeout.
async fn run_blocking<T, F>(config: &Config, cancel: CancellationFlag, work: F) -> Result<T>
where
    F: FnOnce(CancellationFlag) -> GraphResult<T> + Send + 'static,
    T: Send + 'static,
{
    run_with_timeout(Duration::from_secs(config.timeout_seconds), cancel, work).await
}

/// Ctrl-C and the timeout both set the cancellation flag, then wait for the
/// work to stop at its next file or batch boundary. Nothing is committed
/// after this returns.
async fn run_with_timeout<T, F>(timeout: Duration, cancel: CancellationFlag, work: F) -> Result<T>
where
    F: FnOnce(CancellationFlag) -> GraphResult<T> + Send + 'static,
    T: Send + 'static,
{
    let worker_flag = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || work(worker_flag));

    let outcome = tokio::select! {
        joined = tokio::time::timeout(timeout, &mut handle) => match joined {
            Ok(joined) => joined.context("Analysis task failed")?,
            Err(_) => {
                tracing::warn!("Run timed out, waiting for the current batch to finish");
                cancel.cancel();
                match handle.await {
                    Ok(Ok(_)) => tracing::debug!("Run completed after the timeout fired"),
                    Ok(Err(e)) => tracing::debug!("Run stopped after timeout: {}", e),
                    Err(e) => tracing::error!("Analysis task failed: {}", e),
                }
                return Err(GraphError::TimedOut(timeout.as_secs()).into());
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, cancelling run");
            cancel.cancel();
            handle.await.context("Analysis task failed")?
        }
    };

    Ok(outcome?)
}

fn open_store(config: &Config, db: Option<PathBuf>) -> Result<ClusterStore> {
    let path = db.unwrap_or_else(|| config.database_path());
    ClusterStore::open(&path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// `kubegraph analyze`
pub async fn handle_analyze(
    config: &Config,
    paths: Vec<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<()> {
    let mut options = AnalyzerOptions::from(config);
    options.strict |= strict;
    let analyzer = Analyzer::new(options);

    let state = run_blocking(config, CancellationFlag::new(), move |cancel| {
        analyzer.analyze_files(&paths, &cancel)
    })
    .await?;

    let document = serde_json::to_string_pretty(&state.to_json()?)?;
    match output {
        Some(path) => {
            std::fs::write(&path, document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print!("{}", state.summary);
            println!(
                "Analysis took {:.3}s, written to {}",
                state.summary.analysis_duration_seconds,
                path.display()
            );
        }
        None => println!("{}", document),
    }
    Ok(())
}

/// `kubegraph export`
pub async fn handle_export(
    config: &Config,
    paths: Vec<PathBuf>,
    db: Option<PathBuf>,
    batch_size: Option<usize>,
    append: bool,
) -> Result<()> {
    let mut store = open_store(config, db)?.with_replace_existing(config.replace_existing && !append);
    let analyzer = Analyzer::new(AnalyzerOptions::from(config));
    let batch_size = batch_size.unwrap_or(config.batch_size);

    let report = run_blocking(config, CancellationFlag::new(), move |cancel| {
        BatchRunner::new(&analyzer, batch_size).run(&paths, &mut store, &cancel)
    })
    .await?;

    println!(
        "Run {}: {} resource(s), {} relationship(s) from {} file(s) in {} batch(es)",
        report.run_id, report.resources, report.relationships, report.files, report.batches
    );
    if report.parse_stats.skipped + report.parse_stats.errors > 0 {
        println!(
            "Skipped {} malformed record(s), {} file error(s)",
            report.parse_stats.skipped, report.parse_stats.errors
        );
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Database file (defaults to the configured databasePath)
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Resource kind (e.g., "Pod", "svc")
    #[arg(long)]
    pub kind: Option<String>,
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
    /// healthy, warning, error or unknown
    #[arg(long)]
    pub health: Option<HealthStatus>,
    /// Only resources with issues
    #[arg(long)]
    pub has_issues: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// `kubegraph query`
pub async fn handle_query(config: &Config, args: QueryArgs) -> Result<()> {
    let store = open_store(config, args.db)?;
    let filter = ResourceFilter {
        kind: args.kind.map(|kind| canonical_kind(&kind)),
        namespace: args.namespace,
        health_status: args.health,
        has_issues: args.has_issues.then_some(true),
    };
    let resources = store.resources(&filter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }
    for resource in &resources {
        println!(
            "{:<8} {:<24} {:<20} {:<40} {}",
            resource.health_status.as_str(),
            resource.kind,
            resource.namespace.as_deref().unwrap_or("-"),
            resource.name,
            resource.issues.join("; ")
        );
    }
    println!("{} resource(s)", resources.len());
    Ok(())
}

#[derive(Args, Debug)]
pub struct RelationshipArgs {
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Traverse outward from this resource UID
    #[arg(long)]
    pub from: Option<String>,
    /// Traversal depth for --from
    #[arg(long, default_value_t = 1)]
    pub depth: usize,
    #[arg(long)]
    pub source_kind: Option<String>,
    #[arg(long)]
    pub target_kind: Option<String>,
    /// owns, manages, uses, exposes, selects, binds, references or depends_on
    #[arg(long = "type")]
    pub relationship_type: Option<RelationshipKind>,
    #[arg(long)]
    pub json: bool,
}

/// `kubegraph relationships`
pub async fn handle_relationships(config: &Config, args: RelationshipArgs) -> Result<()> {
    let store = open_store(config, args.db)?;

    if let Some(uid) = args.from {
        let steps = store.traverse(&uid, args.depth)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&steps)?);
        } else {
            for step in &steps {
                println!("{}{}", "  ".repeat(step.depth - 1), format_relationship(&step.relationship));
            }
            println!("{} relationship(s)", steps.len());
        }
        return Ok(());
    }

    let filter = RelationshipFilter {
        source_kind: args.source_kind.map(|kind| canonical_kind(&kind)),
        target_kind: args.target_kind.map(|kind| canonical_kind(&kind)),
        relationship_type: args.relationship_type,
    };
    let relationships = store.relationships(&filter)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&relationships)?);
    } else {
        for relationship in &relationships {
            println!("{}", format_relationship(relationship));
        }
        println!("{} relationship(s)", relationships.len());
    }
    Ok(())
}

/// `kubegraph summary`
pub async fn handle_summary(config: &Config, db: Option<PathBuf>) -> Result<()> {
    let store = open_store(config, db)?;
    let summary = store.health_summary()?;

    println!("Resources: {}", summary.total_resources);
    println!("Relationships: {}", summary.total_relationships);
    println!("Resources with issues: {}", summary.resources_with_issues);
    for (status, count) in &summary.health_status {
        println!("  {}: {}", status, count);
    }
    if let Some(latest) = store.latest_summary()? {
        println!(
            "Last run {} at {} ({:.3}s, {} unresolved relationship(s))",
            latest.analysis_run_id,
            latest.analysis_timestamp,
            latest.analysis_duration_seconds,
            latest.unresolved_relationships
        );
    }
    Ok(())
}

/// `kubegraph history`
pub async fn handle_history(config: &Config, uid: String, db: Option<PathBuf>) -> Result<()> {
    let store = open_store(config, db)?;
    let history = store.health_history(&uid)?;
    if history.is_empty() {
        println!("No history for {}", uid);
        return Ok(());
    }
    for record in &history {
        println!(
            "{}  {:<8} {}",
            record.timestamp,
            record.health_status.as_str(),
            record.issues.join("; ")
        );
    }
    Ok(())
}

/// `kubegraph runs`
pub async fn handle_runs(config: &Config, db: Option<PathBuf>) -> Result<()> {
    let store = open_store(config, db)?;
    for run in store.runs()? {
        println!(
            "{}  {}  {} batch(es), {} resource(s), {} relationship(s)",
            run.analysis_run_id,
            run.analysis_timestamp,
            run.batches,
            run.total_resources,
            run.total_relationships
        );
    }
    Ok(())
}

fn canonical_kind(kind: &str) -> String {
    kubegraph::ResourceKind::from_str_case_insensitive(kind)
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| kind.to_string())
}

fn format_relationship(rel: &StoredRelationship) -> String {
    let endpoint = |kind: &str, namespace: Option<&str>, name: &str| match namespace {
        Some(ns) => format!("{}/{}/{}", kind, ns, name),
        None => format!("{}/{}", kind, name),
    };
    let dangling = rel.metadata.get("unresolved").and_then(|v| v.as_bool()) == Some(true);
    format!(
        "{} -{}-> {}{}",
        endpoint(&rel.source_kind, rel.source_namespace.as_deref(), &rel.source_name),
        rel.relationship_type,
        endpoint(&rel.target_kind, rel.target_namespace.as_deref(), &rel.target_name),
        if dangling { " (unresolved)" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_timeout_waits_for_cancelled_work() {
        let stopped = Arc::new(AtomicBool::new(false));
        let worker_stopped = stopped.clone();

        let result = run_with_timeout(Duration::from_millis(50), CancellationFlag::new(), move |cancel| {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
            std::thread::sleep(Duration::from_millis(50));
            worker_stopped.store(true, Ordering::SeqCst);
            Err::<(), _>(GraphError::Cancelled)
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<GraphError>(), Some(GraphError::TimedOut(_))));
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_work_finishing_in_time_returns_value() {
        let value = run_with_timeout(Duration::from_secs(5), CancellationFlag::new(), |_| Ok(7))
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
