use loco_rs::prelude::*;
use loco_rs::worker::Worker;
use serde::{Deserialize, Serialize};

use crate::app_state;
use crate::services::attendance_service;

/// Arguments for an on-demand sweep run, for parity with the teacher's
/// `Worker<Args>` jobs (`reconciliation.rs`, `proof_generation.rs`); the
/// periodic run below doesn't go through the job queue at all.
#[derive(Deserialize, Debug, Serialize)]
pub struct AttendanceSweepArgs {
    pub date: chrono::NaiveDate,
}

/// Forces idle-window checkouts and marks no-shows absent (spec section
/// 4.E). `build` both registers the worker for ad-hoc enqueueing and
/// starts the periodic loop, since loco's `Processor` is a job queue with
/// no interval primitive of its own.
pub struct AttendanceSweepWorker {
    pub ctx: AppContext,
}

impl AttendanceSweepWorker {
    pub fn build(ctx: &AppContext) -> Self {
        let worker = Self { ctx: ctx.clone() };
        worker.spawn_periodic();
        worker
    }

    fn spawn_periodic(&self) {
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                if let Err(err) = run_sweep(&ctx).await {
                    tracing::error!(error = %err, "attendance sweep failed");
                }
            }
        });
    }
}

async fn run_sweep(ctx: &AppContext) -> Result<()> {
    let settings = &app_state::app_settings().attendance;
    let now = chrono::Utc::now().naive_utc();

    let checked_out = attendance_service::force_idle_checkouts(&ctx.db, now, settings)
        .await
        .map_err(|e| Error::string(&e.to_string()))?;
    if checked_out > 0 {
        tracing::info!(count = checked_out, "forced idle checkouts");
    }

    let absent = attendance_service::run_daily_sweep(&ctx.db, now.date())
        .await
        .map_err(|e| Error::string(&e.to_string()))?;
    if absent > 0 {
        tracing::info!(count = absent, "marked no-shows absent");
    }

    Ok(())
}

#[async_trait::async_trait]
impl Worker<AttendanceSweepArgs> for AttendanceSweepWorker {
    async fn perform(&self, args: AttendanceSweepArgs) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        let checked_out = attendance_service::force_idle_checkouts(&self.ctx.db, chrono::Utc::now().naive_utc(), &app_state::app_settings().attendance).await?;
        let absent = attendance_service::run_daily_sweep(&self.ctx.db, args.date).await?;
        tracing::info!(checked_out, absent, date = %args.date, "ran attendance sweep on demand");
        Ok(())
    }
}
