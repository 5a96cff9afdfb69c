//! Periodic refresh driver.
//!
//! The timer is free running: every tick spawns a refresh task and returns
//! to waiting, so a slow server never delays the schedule. A single-slot
//! [`RefreshGuard`] is checked when the timer fires; while a refresh of the
//! same scope is in flight, ticks are dropped instead of piling up behind
//! it.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::error::{ClientError, Result};

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(5000);

/// Shorter periods, zero included, are raised to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A view that can be brought up to date with the server.
pub trait Refresh {
    type Output: Send + 'static;

    fn refresh(&mut self) -> impl Future<Output = Result<Self::Output>> + Send;
}

/// Single-slot "refresh pending" flag shared by everyone who can trigger a
/// refresh of one scope.
#[derive(Clone, Debug, Default)]
pub struct RefreshGuard {
    in_flight: Arc<AtomicBool>,
}

impl RefreshGuard {
    /// Claims the slot, or returns `None` if a refresh is already running.
    pub fn try_begin(&self) -> Option<RefreshTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshTicket {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the slot when dropped.
#[derive(Debug)]
pub struct RefreshTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for RefreshTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Result of one refresh, delivered to the poller's event channel.
#[derive(Debug)]
pub enum PollEvent<T> {
    Refreshed(T),
    Failed(ClientError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    pub started: u64,
    pub skipped: u64,
}

#[derive(Debug)]
pub struct Poller {
    period: Duration,
    guard: RefreshGuard,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        if period < MIN_PERIOD {
            tracing::warn!("poll period {period:?} is too short, using {MIN_PERIOD:?}");
        }
        Self {
            period: period.max(MIN_PERIOD),
            guard: RefreshGuard::default(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks until `shutdown` turns `true` (or its sender goes away).
    ///
    /// The first refresh starts immediately.
    pub async fn run<R>(
        &self,
        target: Arc<Mutex<R>>,
        events: mpsc::Sender<PollEvent<R::Output>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> PollStats
    where
        R: Refresh + Send + 'static,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = PollStats::default();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.trigger(&target, &events).is_some() {
                        stats.started += 1;
                    } else {
                        stats.skipped += 1;
                        tracing::debug!("refresh still in flight, skipping tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(
            "poller stopped after {} refreshes ({} ticks skipped)",
            stats.started,
            stats.skipped
        );
        stats
    }

    /// Starts a refresh now unless one is already in flight.
    pub fn trigger<R>(
        &self,
        target: &Arc<Mutex<R>>,
        events: &mpsc::Sender<PollEvent<R::Output>>,
    ) -> Option<JoinHandle<()>>
    where
        R: Refresh + Send + 'static,
    {
        let ticket = self.guard.try_begin()?;
        let target = Arc::clone(target);
        let events = events.clone();

        Some(tokio::spawn(async move {
            let result = {
                let mut view = target.lock().await;
                view.refresh().await
            };
            drop(ticket);

            let event = match result {
                Ok(output) => PollEvent::Refreshed(output),
                Err(err) => {
                    tracing::warn!("refresh failed, keeping current state: {err}");
                    PollEvent::Failed(err)
                }
            };
            // Nobody listening is fine.
            let _ = events.send(event).await;
        }))
    }
}
