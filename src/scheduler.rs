use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::broadcast::Broadcaster;

/// Registers the daily broadcast under `schedule` (cron with a seconds field, UTC) and
/// starts the scheduler. The caller owns the returned scheduler and shuts it down.
#[tracing::instrument(name = "Starting the broadcast scheduler", skip(broadcaster))]
pub async fn start_broadcast_scheduler(
    broadcaster: Arc<Broadcaster>,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_job_id, _scheduler| {
        let broadcaster = broadcaster.clone();
        Box::pin(async move {
            tracing::info!("Sending daily weather updates");
            if let Err(err) = broadcaster.run().await {
                tracing::error!(
                    error.cause_chain = ?err,
                    error.message = %err,
                    "Daily broadcast did not run"
                );
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    Ok(scheduler)
}
