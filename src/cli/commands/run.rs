//! `run`: host the coordinator and its background loops until interrupted.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::CoordinatorStack;
use crate::cli::display::{action_success, output, CommandOutput};
use crate::domain::models::{Config, HackathonPhase, Statistics};
use crate::services::BusStats;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stop after this many seconds instead of waiting for ctrl-c
    #[arg(long)]
    pub duration_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub event: String,
    pub final_phase: HackathonPhase,
    pub phase_progress: u8,
    pub statistics: Statistics,
    pub bus: BusStats,
    pub expired_requests: usize,
}

impl CommandOutput for RunSummary {
    fn to_human(&self) -> String {
        let lines = [
            action_success(&format!("Coordinator for '{}' stopped", self.event)),
            format!("Phase: {} ({}%)", self.final_phase, self.phase_progress),
            format!(
                "Tasks: {} completed, {} pending",
                self.statistics.completed_tasks, self.statistics.pending_tasks
            ),
            format!(
                "Participants: {} registered, {} teams",
                self.statistics.registered_participants, self.statistics.formed_teams
            ),
            format!(
                "Bus: {} events published, {} deliveries, {} handler failures",
                self.bus.published, self.bus.deliveries, self.bus.handler_failures
            ),
        ];
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let stack = CoordinatorStack::build(config);
    stack
        .coordinator
        .start()
        .context("Failed to start the coordinator")?;

    let cancel = CancellationToken::new();
    let sweeper = stack.bus.spawn_sweeper(cancel.clone());
    let cycle = stack.coordinator.spawn_scheduling_cycle(cancel.clone());

    tracing::info!(
        event = %config.event.name,
        phase = %stack.coordinator.current_phase(),
        "coordinator running, press ctrl-c to stop"
    );

    match args.duration_secs {
        Some(secs) => {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(secs)) => {
                    tracing::info!(secs, "run duration elapsed");
                }
                result = tokio::signal::ctrl_c() => {
                    result.context("Failed to listen for ctrl-c")?;
                }
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for ctrl-c")?,
    }

    tracing::info!("shutting down");
    cancel.cancel();
    join_background("request sweeper", sweeper).await;
    join_background("scheduling cycle", cycle).await;
    stack.coordinator.stop();

    let expired_requests = stack.bus.sweep_expired();
    let summary = RunSummary {
        event: config.event.name.clone(),
        final_phase: stack.coordinator.current_phase(),
        phase_progress: stack.coordinator.phase_progress(),
        statistics: stack.coordinator.statistics(),
        bus: stack.bus.stats(),
        expired_requests,
    };
    output(&summary, json_mode);
    Ok(())
}

async fn join_background(name: &str, handle: JoinHandle<()>) {
    if let Err(err) = handle.await {
        tracing::warn!(task = name, error = %err, "background task ended abnormally");
    }
}
