//! Periodic task runner: a ticker plus a task function per job.
//!
//! Jobs never overlap with themselves because each tick awaits the previous
//! run before the next one is taken; missed ticks are delayed, not bunched.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, Instrument};

pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { shutdown, handles: Vec::new() }
    }

    /// Run `task` every `period`. The first run happens one full period after
    /// the job is registered.
    pub fn every<F, Fut>(&mut self, name: &'static str, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        let span = tracing::info_span!("scheduled_job", job = name);
        let handle = tokio::spawn(
            async move {
                let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                info!(period_secs = period.as_secs(), "Job scheduled");
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            debug!("Tick");
                            task().await;
                        }
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
                info!("Job stopped");
            }
            .instrument(span),
        );
        self.handles.push((name, handle));
    }

    pub fn job_count(&self) -> usize {
        self.handles.len()
    }

    /// Signal every job to stop and wait for in-flight runs to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(job = name, error = ?e, "Scheduled job failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_job_runs_each_period_until_shutdown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let counter = runs.clone();
        scheduler.every("count", Duration::from_secs(60), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(scheduler.job_count(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        scheduler.shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
