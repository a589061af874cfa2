use loco_rs::prelude::*;
use loco_rs::worker::Worker;
use serde::{Deserialize, Serialize};

use crate::app_state;

/// No arguments: the reaper only ever runs on its own interval, but still
/// implements `Worker` for parity with the registration pattern used by
/// [`super::attendance_sweep::AttendanceSweepWorker`].
#[derive(Deserialize, Debug, Serialize)]
pub struct ConnectionReaperArgs;

/// Drops socket connections that have stopped heartbeating past the
/// configured `socket.idle_timeout_seconds` (spec section 6), so a client
/// that vanished without a clean close doesn't linger in room membership
/// forever.
pub struct ConnectionReaperWorker {
    pub ctx: AppContext,
}

impl ConnectionReaperWorker {
    pub fn build(ctx: &AppContext) -> Self {
        let worker = Self { ctx: ctx.clone() };
        worker.spawn_periodic();
        worker
    }

    fn spawn_periodic(&self) {
        tokio::spawn(async move {
            loop {
                let idle_timeout_seconds = app_state::app_settings().socket.idle_timeout_seconds;
                tokio::time::sleep(tokio::time::Duration::from_secs(idle_timeout_seconds)).await;

                let reaped = app_state::event_bus()
                    .reap_idle(tokio::time::Duration::from_secs(idle_timeout_seconds))
                    .await;
                if reaped > 0 {
                    tracing::info!(count = reaped, "reaped idle socket connections");
                }
            }
        });
    }
}

#[async_trait::async_trait]
impl Worker<ConnectionReaperArgs> for ConnectionReaperWorker {
    async fn perform(&self, _args: ConnectionReaperArgs) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        let idle_timeout_seconds = app_state::app_settings().socket.idle_timeout_seconds;
        let reaped = app_state::event_bus()
            .reap_idle(tokio::time::Duration::from_secs(idle_timeout_seconds))
            .await;
        tracing::info!(count = reaped, "ran connection reap on demand");
        Ok(())
    }
}
