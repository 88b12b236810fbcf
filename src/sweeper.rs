use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawns the periodic expiry sweep.
///
/// `sweep` returns how many stories it removed, or `None` once the store it
/// sweeps is gone. The task ends on cancellation or on `None`.
pub(crate) fn spawn_sweeper<F>(
    period: Duration,
    cancel: CancellationToken,
    mut sweep: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Option<usize> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => match sweep() {
                    Some(0) => {}
                    Some(count) => debug!(count, "swept expired stories"),
                    None => {
                        debug!("stories store dropped, sweeper exiting");
                        break;
                    }
                },
                _ = cancel.cancelled() => {
                    info!("story sweeper shutting down");
                    break;
                }
            }
        }
    })
}
