//! Colored console output for configuration and sealing runs.
//!
//! Structured events go through `tracing`; this module prints the human-facing
//! progress lines and the final report.
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow skips and warnings, red failures, dimmed secondary text.

use alloy_primitives::{Address, B256, U256};
use colored::{ColoredString, Colorize};
use std::path::Path;
use uuid::Uuid;

use crate::chains::{ChainMeta, ChainSlug};
use crate::packet::PacketId;
use crate::registry::{ChainReport, ChainStatus, RunReport, StepOutcome, StepRecord};
use crate::seal::{PacketReport, SealOutcome};
use crate::signer::SignerMode;

// ── Helpers ────────────────────────────────────────────────────────

/// Shorten a transaction hash to `0x1234…abcd`.
pub fn short_hash(hash: &B256) -> String {
    let full = format!("{hash}");
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// One-word label for a step outcome.
pub fn outcome_label(outcome: &StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Applied { .. } => "APPLIED",
        StepOutcome::AlreadyRegistered => "OK",
        StepOutcome::Skipped(_) => "SKIP",
        StepOutcome::Failed(_) => "FAIL",
    }
}

fn colored_label(outcome: &StepOutcome) -> ColoredString {
    let label = outcome_label(outcome);
    match outcome {
        StepOutcome::Applied { .. } => label.green().bold(),
        StepOutcome::AlreadyRegistered => label.green(),
        StepOutcome::Skipped(_) => label.yellow(),
        StepOutcome::Failed(_) => label.red().bold(),
    }
}

fn outcome_detail(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Applied { tx } => short_hash(tx),
        StepOutcome::AlreadyRegistered => "no change".to_string(),
        StepOutcome::Skipped(reason) => reason.to_string(),
        StepOutcome::Failed(error) => error.clone(),
    }
}

// ── Banner ─────────────────────────────────────────────────────────

/// Print the run banner.
pub fn print_banner(command: &str, run_id: Uuid) {
    println!();
    println!("{}", "=== Switchboard Coordinator ===".blue().bold());
    println!("  Command:  {}", command.cyan());
    println!("  Run:      {}", run_id.to_string().dimmed());
}

/// Print the chains a configuration run will touch.
pub fn print_targets(chains: &[ChainSlug], siblings: &[ChainSlug], integrations: &[String]) {
    let join = |slugs: &[ChainSlug]| {
        slugs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("  Chains:   {}", join(chains).cyan());
    if siblings.is_empty() {
        println!("  Siblings: {}", "same as chains".dimmed());
    } else {
        println!("  Siblings: {}", join(siblings).cyan());
    }
    println!("  Types:    {}", integrations.join(", ").cyan());
}

/// Print confirmation that a signer key was loaded.
pub fn print_signer_loaded(addr: &Address) {
    println!(
        "  {} Signer key loaded: {}",
        "OK".green().bold(),
        format!("{addr}").cyan()
    );
}

/// Print a warning when multisig mode has no relay.
pub fn print_no_relay_warning() {
    println!(
        "  {} Multisig mode requested without --relay-url; chains owned by a Safe will fail.",
        "WARNING:".yellow().bold()
    );
}

// ── Configuration Progress ─────────────────────────────────────────

/// Print that a chain task opened its chain.
pub fn print_chain_started(meta: &ChainMeta, signer: Address, mode: SignerMode) {
    println!(
        "  {} {} ({}) as {} [{}]",
        "→".blue().bold(),
        meta.name.cyan(),
        meta.slug.to_string().dimmed(),
        format!("{signer}").cyan(),
        mode.to_string().dimmed()
    );
}

/// Print one step result.
pub fn print_step(chain: ChainSlug, step: &StepRecord) {
    println!(
        "    {:<8} {} {} {}",
        colored_label(&step.outcome),
        chain.to_string().dimmed(),
        step.action,
        outcome_detail(&step.outcome).dimmed()
    );
}

/// Print a finished chain: its steps, then its status.
pub fn print_chain_report(report: &ChainReport) {
    for step in &report.steps {
        print_step(report.chain, step);
    }
    let status = match &report.status {
        ChainStatus::Completed => "completed".green().bold(),
        ChainStatus::Failed(_) => "failed".red().bold(),
        ChainStatus::Incomplete => "incomplete".yellow().bold(),
        ChainStatus::Missing => "skipped".yellow(),
    };
    println!("  {} chain {}: {}", "■".dimmed(), report.chain.to_string().cyan(), status);
    if let ChainStatus::Failed(err) = &report.status {
        for failure in &err.failures {
            println!("      {}", failure.red());
        }
    }
    if matches!(report.status, ChainStatus::Missing) {
        println!("      {}", report.status.to_string().dimmed());
    }
}

// ── Summary ────────────────────────────────────────────────────────

/// Print the end-of-run summary.
pub fn print_run_summary(report: &RunReport) {
    let (applied, already, skipped, failed) = report.tally();
    println!();
    println!("{}", "Run summary:".blue().bold());
    println!("  {} {}", "Chains:     ".dimmed(), report.chains.len().to_string().cyan());
    println!("  {} {}", "Applied:    ".dimmed(), applied.to_string().green());
    println!("  {} {}", "Unchanged:  ".dimmed(), already.to_string().cyan());
    println!("  {} {}", "Skipped:    ".dimmed(), skipped.to_string().yellow());
    println!(
        "  {} {}",
        "Failed:     ".dimmed(),
        if failed == 0 {
            failed.to_string().normal()
        } else {
            failed.to_string().red().bold()
        }
    );
    for chain in report.chains.iter().filter(|c| matches!(c.status, ChainStatus::Incomplete)) {
        println!("  {} chain {} did not finish", "INCOMPLETE".yellow().bold(), chain.chain);
    }
    for error in report.failures() {
        println!("  {} {}", "FAILED".red().bold(), error);
    }
    for step in report.aggregate.iter().filter(|s| s.outcome.is_failure()) {
        println!("  {} {}: {}", "FAILED".red().bold(), step.action, step.outcome);
    }
    for failure in &report.write_failures {
        println!("  {} registry write: {}", "FAILED".red().bold(), failure);
    }
    if report.is_success() {
        println!("  {}", "All requested chains are configured.".green());
    }
}

/// Print where the registry was written.
pub fn print_registry_written(path: &Path) {
    println!("  {} Address registry: {}", "OK".green().bold(), path.display().to_string().cyan());
}

// ── Sealing ────────────────────────────────────────────────────────

/// Print one line per packet.
pub fn print_packet_reports(reports: &[PacketReport]) {
    println!();
    println!("{}", "Packets:".blue().bold());
    for report in reports {
        let (label, detail) = match &report.result {
            Ok(SealOutcome::Confirmed { tx_hash, block_number }) => (
                "SEALED".green().bold(),
                match block_number {
                    Some(block) => format!("{} in block {block}", short_hash(tx_hash)),
                    None => short_hash(tx_hash),
                },
            ),
            Ok(SealOutcome::AlreadySealed) => ("SEALED".green(), "already sealed".to_string()),
            Err(err) => ("FAIL".red().bold(), err.to_string()),
        };
        println!("  {:<8} {} {}", label, report.label().cyan(), detail.dimmed());
    }
}

/// Print a packet id in both forms.
pub fn print_packet_id(id: &PacketId, packed: U256) {
    println!("  {} {}", "Chain slug:".dimmed(), id.local_slug.to_string().cyan());
    println!("  {} {}", "Capacitor: ".dimmed(), format!("{}", id.capacitor).cyan());
    println!("  {} {}", "Counter:   ".dimmed(), id.counter.to_string().cyan());
    println!("  {} {}", "Packed:    ".dimmed(), format!("{packed:#x}").cyan());
    println!("  {} {}", "Decimal:   ".dimmed(), packed.to_string().dimmed());
}

// ── Shutdown ───────────────────────────────────────────────────────

/// Print that cancellation was requested.
pub fn print_cancel_requested(reason: &str) {
    println!(
        "  {} {reason}; finishing in-flight transactions, starting no new steps",
        "CANCEL".yellow().bold()
    );
}

// ── Tests ──────────────────────────────────────────────────────────
