//! Process-wide sweep scheduler.
//!
//! Sweeps are registered explicitly and run on fixed intervals owned by this
//! component. Lifecycle: [`SweepScheduler::register`] every sweep, call
//! [`SweepScheduler::start`] once, and [`SweepScheduler::shutdown`] to stop
//! all loops and wait for them to finish. Each loop fires immediately on
//! start so state is consistent right after boot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::Sweep;

struct RegisteredSweep {
    sweep: Arc<dyn Sweep>,
    every: Duration,
}

/// Owns the timer loops driving the consistency sweeps.
pub struct SweepScheduler {
    registered: Vec<RegisteredSweep>,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Default for SweepScheduler {
    fn default() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            registered: Vec::new(),
            shutdown,
            handles: Vec::new(),
        }
    }
}

impl SweepScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sweep to run on the given interval. Must be called before
    /// [`Self::start`]; later registrations are ignored once started.
    pub fn register(&mut self, sweep: Arc<dyn Sweep>, every: Duration) {
        self.registered.push(RegisteredSweep { sweep, every });
    }

    /// Spawn one timer loop per registered sweep.
    pub fn start(&mut self) {
        for RegisteredSweep { sweep, every } in self.registered.drain(..) {
            let mut shutdown = self.shutdown.subscribe();
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => match sweep.run().await {
                            Ok(outcome) => debug!(
                                sweep = sweep.name(),
                                examined = outcome.examined,
                                acted = outcome.acted,
                                "sweep completed"
                            ),
                            Err(error) => warn!(sweep = sweep.name(), %error, "sweep run failed"),
                        },
                        _ = shutdown.changed() => break,
                    }
                }
            });
            self.handles.push(handle);
        }
    }

    /// Signal every loop to stop and wait for them to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::sweeps::SweepOutcome;

    #[derive(Default)]
    struct CountingSweep {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Sweep for CountingSweep {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) -> Result<SweepOutcome, DomainError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(SweepOutcome::default())
        }
    }

    #[tokio::test]
    async fn runs_registered_sweeps_until_shutdown() {
        let sweep = Arc::new(CountingSweep::default());
        let mut scheduler = SweepScheduler::new();
        scheduler.register(Arc::clone(&sweep) as Arc<dyn Sweep>, Duration::from_millis(10));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(55)).await;
        scheduler.shutdown().await;

        let runs = sweep.runs.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected repeated runs, saw {runs}");

        let after_shutdown = sweep.runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(sweep.runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[tokio::test]
    async fn a_failing_sweep_does_not_stop_the_loop() {
        struct FailingSweep {
            runs: AtomicUsize,
        }

        #[async_trait]
        impl Sweep for FailingSweep {
            fn name(&self) -> &'static str {
                "failing"
            }

            async fn run(&self) -> Result<SweepOutcome, DomainError> {
                self.runs.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::internal("listing unavailable"))
            }
        }

        let sweep = Arc::new(FailingSweep {
            runs: AtomicUsize::new(0),
        });
        let mut scheduler = SweepScheduler::new();
        scheduler.register(Arc::clone(&sweep) as Arc<dyn Sweep>, Duration::from_millis(10));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(45)).await;
        scheduler.shutdown().await;

        assert!(sweep.runs.load(Ordering::SeqCst) >= 2);
    }
}
