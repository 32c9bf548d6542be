//! CLI entry point for the casetrail SAR drafting copilot.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use casetrail_core::CaseId;
use casetrail_knowledge::{ContextProvider, HashedTfIdfEmbedder, KnowledgeStore};
use casetrail_narrative::{ModelClient, PromptVariant, SarGenerator};
use casetrail_trace::store::{JsonTraceStore, TraceStore};

use casetrail_workflow::{fixtures, AppConfig, AuditStore, JsonlAuditStore, SarWorkflow};

#[derive(Parser)]
#[command(name = "casetrail")]
#[command(about = "AI-assisted Suspicious Activity Report drafting")]
struct Cli {
    /// Config file prefix (default: casetrail).
    #[arg(short, long, default_value = "casetrail")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed demo data and run the generate-SAR workflow end to end.
    Demo {
        /// Mandate the extended SAR section structure.
        #[arg(long)]
        extended: bool,
    },

    /// Print a case's audit history from the append-only log.
    History {
        #[arg(long)]
        case: Uuid,
    },

    /// Print a case's reasoning traces from the trace store.
    Traces {
        #[arg(long)]
        case: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut app_config = AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Demo { extended } => {
            if extended {
                app_config.model.prompt_variant = PromptVariant::Extended;
            }
            run_demo(app_config).await
        }
        Command::History { case } => show_history(&app_config, CaseId(case)),
        Command::Traces { case } => show_traces(&app_config, CaseId(case)),
    }
}

fn show_history(app_config: &AppConfig, case_id: CaseId) -> anyhow::Result<()> {
    let audit = JsonlAuditStore::new(&app_config.storage.audit_log)?;
    let history = audit.history(case_id)?;
    if history.is_empty() {
        println!("No audit entries for case {case_id}");
        return Ok(());
    }
    for entry in history {
        println!(
            "[{}] #{} {} {}",
            entry.created_at.to_rfc3339(),
            entry.id,
            entry.action,
            entry.details
        );
    }
    Ok(())
}

fn show_traces(app_config: &AppConfig, case_id: CaseId) -> anyhow::Result<()> {
    let traces = JsonTraceStore::new(&app_config.storage.trace_dir)?;
    let traces = traces.traces_for(case_id)?;
    if traces.is_empty() {
        println!("No reasoning traces for case {case_id}");
        return Ok(());
    }
    for trace in traces {
        println!(
            "[{}] trace {} model={} context_chars={} alert={:?}",
            trace.created_at.to_rfc3339(),
            trace.trace_id,
            trace.model_name,
            trace.retrieved_context.len(),
            trace.input_signals.alert_reason
        );
    }
    Ok(())
}

async fn run_demo(app_config: AppConfig) -> anyhow::Result<()> {
    let embedder = Arc::new(HashedTfIdfEmbedder::new(
        app_config.knowledge.embedding_dimensions,
    ));
    let store = Arc::new(KnowledgeStore::new(&app_config.knowledge, embedder)?);
    let retrieval = ContextProvider::new(store.clone());

    let client = ModelClient::from_config(&app_config.model)?;
    let generator = SarGenerator::with_config(client, &app_config.model);

    let traces = Arc::new(JsonTraceStore::new(&app_config.storage.trace_dir)?);
    let audit = Arc::new(JsonlAuditStore::new(&app_config.storage.audit_log)?);

    let workflow = SarWorkflow::new(
        retrieval,
        generator,
        traces,
        audit,
        app_config.retrieval_k,
    );

    let cases = fixtures::seed(&workflow, &store)?;
    tracing::info!(cases = cases.len(), chunks = store.len(), "Demo data seeded");

    let case = cases
        .iter()
        .max_by(|a, b| a.risk_score.total_cmp(&b.risk_score))
        .ok_or_else(|| anyhow::anyhow!("Seed produced no cases"))?;

    let outcome = workflow.generate_sar(case.id).await?;

    println!("Case {} ({})", outcome.case.id, outcome.case.customer_name);
    println!("Status: {}\n", outcome.case.status);
    println!("{}\n", outcome.narrative);

    let trace = &outcome.trace;
    println!(
        "Reasoning trace {} (model: {}, context: {} chars)",
        trace.trace_id,
        trace.model_name,
        trace.retrieved_context.len()
    );

    println!("\nAudit history:");
    for entry in workflow.history(case.id)? {
        println!("  [{}] #{} {}", entry.created_at.to_rfc3339(), entry.id, entry.action);
    }

    Ok(())
}
