//! ARBITER — governance decision gate CLI.
//!
//! Evaluates request files against policy documents, validates policies, and
//! prints per-contributor breakdowns for decision review.
//!
//! Usage:
//!   cargo run -p arbiter-cli -- eval cases/allow_order_status.json --policy customer_support.yaml
//!   cargo run -p arbiter-cli -- validate policies/customer_support.yaml
//!   cargo run -p arbiter-cli -- inspect cases/stop_fraud_attempt.json --policy customer_support.yaml

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use arbiter_audit::InMemoryDecisionLog;
use arbiter_contracts::error::{ArbiterError, ArbiterResult};
use arbiter_service::{
    DecisionResponse, FailureMode, GovernanceRequest, GovernanceService, ServiceConfig,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// ARBITER — deterministic governance gate between intent and execution.
///
/// Policies are YAML documents resolved against the policy directory
/// (`ARBITER_POLICY_DIR`, default `./policies`); the failure mode comes from
/// `ARBITER_FAILURE_MODE` unless overridden per call.
#[derive(Parser)]
#[command(
    name = "arbiter",
    about = "ARBITER governance decision gate",
    long_about = "Evaluates agent requests (intent, context, evidence) against policy rules\n\
                  and the built-in governance gates, resolving one auditable decision:\n\
                  ALLOW, RESTRICT, ESCALATE, or STOP."
)]
struct Cli {
    /// Log gate-by-gate evaluation detail (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one request file and print the decision as JSON.
    ///
    /// The exit code mirrors the resolved action: ALLOW 0, RESTRICT 1,
    /// ESCALATE 2, STOP 3. Operational failures exit 10.
    Eval {
        /// Path to the request JSON file.
        case: PathBuf,
        /// Policy document; overrides the request file's own policy_path.
        #[arg(short, long)]
        policy: Option<PathBuf>,
        /// Write the decision JSON here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the failure mode (fail_closed or fail_open).
        #[arg(long)]
        failure_mode: Option<FailureMode>,
    },
    /// Load and validate a policy document, printing a summary.
    ///
    /// Exits 0 when the document is usable, 1 when it is not.
    Validate {
        /// Policy document, resolved against the policy directory when
        /// relative.
        policy: PathBuf,
    },
    /// Evaluate one request and print a per-contributor breakdown.
    Inspect {
        /// Path to the request JSON file.
        case: PathBuf,
        /// Policy document; overrides the request file's own policy_path.
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Initialize structured logging. --verbose is shorthand for
    // RUST_LOG=debug; an explicit RUST_LOG always wins.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .compact()
        .init();

    let result = match cli.command {
        Command::Eval {
            case,
            policy,
            output,
            failure_mode,
        } => run_eval(&case, policy, output.as_deref(), failure_mode),
        Command::Validate { policy } => run_validate(&policy),
        Command::Inspect { case, policy } => run_inspect(&case, policy),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("arbiter: {e}");
            std::process::exit(10);
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_eval(
    case: &Path,
    policy: Option<PathBuf>,
    output: Option<&Path>,
    failure_mode: Option<FailureMode>,
) -> ArbiterResult<i32> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(mode) = failure_mode {
        config.failure_mode = mode;
    }

    let log = Arc::new(InMemoryDecisionLog::new("cli"));
    let service = GovernanceService::new(config).with_audit(log.clone());

    let mut request = read_request(case)?;
    if policy.is_some() {
        request.policy_path = policy;
    }

    let response = service.decide(&request)?;
    debug!(
        entries = log.len(),
        verified = log.verify_integrity(),
        "audit chain state"
    );

    let rendered = render_json(&response)?;
    match output {
        Some(path) => {
            fs::write(path, rendered).map_err(|e| ArbiterError::Internal {
                reason: format!("cannot write decision to '{}': {e}", path.display()),
            })?;
            eprintln!("decision written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(i32::from(response.decision.action.precedence()))
}

fn run_validate(policy: &Path) -> ArbiterResult<i32> {
    let service = GovernanceService::new(ServiceConfig::from_env()?);
    let summary = service.validate_policy(policy);

    println!("policy:  {}", summary.path.display());
    if let (Some(name), Some(version)) = (&summary.name, &summary.version) {
        println!("name:    {name} (version {version})");
    }
    println!(
        "rules:   {} ({} enabled)",
        summary.rule_count, summary.enabled_rule_count
    );
    if !summary.gates_configured.is_empty() {
        println!("gates:   {}", summary.gates_configured.join(", "));
    }

    if summary.valid {
        println!("result:  OK");
        Ok(0)
    } else {
        println!("result:  INVALID");
        for error in &summary.errors {
            println!("  - {error}");
        }
        Ok(1)
    }
}

fn run_inspect(case: &Path, policy: Option<PathBuf>) -> ArbiterResult<i32> {
    let log = Arc::new(InMemoryDecisionLog::new("cli"));
    let service = GovernanceService::new(ServiceConfig::from_env()?).with_audit(log.clone());

    let mut request = read_request(case)?;
    if policy.is_some() {
        request.policy_path = policy;
    }

    let response = service.decide(&request)?;
    let decision = &response.decision;

    println!("Decision:   {} ({})", decision.action, decision.decision_code);
    println!("Rationale:  {}", decision.rationale);
    if let Some(gate) = &decision.final_gate {
        println!("Final gate: {gate}");
    }
    if let (Some(name), Some(version)) = (&decision.policy_name, &decision.policy_version) {
        println!("Policy:     {name} (version {version})");
    }
    if let Some(latency) = response.latency_ms {
        println!("Latency:    {latency} ms");
    }

    println!();
    println!("Contributors:");
    for verdict in &decision.gate_decisions {
        let proposed = verdict
            .suggested_action
            .map(|action| action.as_str())
            .unwrap_or("-");
        println!(
            "  {:<20} {:<10} {}",
            verdict.gate_name, proposed, verdict.rationale
        );
    }

    if !decision.required_steps.is_empty() {
        println!();
        println!("Required steps:");
        for step in &decision.required_steps {
            println!("  - {step}");
        }
    }

    let sealed = log.export_log();
    if let Some(entry) = sealed.entries.last() {
        println!();
        println!(
            "Audit:      sequence {} hash {} (chain verified: {})",
            entry.sequence,
            entry.this_hash,
            log.verify_integrity()
        );
    }

    Ok(0)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_request(path: &Path) -> ArbiterResult<GovernanceRequest> {
    let raw = fs::read_to_string(path).map_err(|e| ArbiterError::InvalidInput {
        reason: format!("cannot read request file '{}': {e}", path.display()),
    })?;
    serde_json::from_str(&raw).map_err(|e| ArbiterError::InvalidInput {
        reason: format!("request file '{}' is not valid JSON: {e}", path.display()),
    })
}

fn render_json(response: &DecisionResponse) -> ArbiterResult<String> {
    serde_json::to_string_pretty(response).map_err(|e| ArbiterError::Internal {
        reason: format!("cannot serialize decision: {e}"),
    })
}
