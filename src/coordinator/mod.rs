// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic refresh and snapshot publication.
//!
//! A [`Coordinator`] owns one [`ConsumptionTracker`] and refreshes it on a
//! fixed interval. Every successful refresh replaces the published
//! [`Snapshot`] as a whole; readers hold an `Arc<Snapshot>` and never see a
//! half-updated value. A failed refresh keeps the previous snapshot and
//! marks the coordinator unavailable until the next success. There is no
//! backoff: the next attempt happens on the next tick.
//!
//! # Examples
//!
//! ```no_run
//! use biocat_lib::Coordinator;
//! use biocat_lib::config::IntegrationConfig;
//! use biocat_lib::types::ApiKey;
//!
//! # async fn example() -> biocat_lib::Result<()> {
//! let config = IntegrationConfig::new(ApiKey::new("my-api-key")?);
//! let coordinator = Coordinator::from_config(&config)?;
//!
//! let mut snapshots = coordinator.subscribe();
//! let handle = coordinator.spawn();
//!
//! snapshots.changed().await.ok();
//! if let Some(snapshot) = coordinator.snapshot() {
//!     println!("this month: {} L", snapshot.monthly_consumption());
//! }
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::command::Command;
use crate::error::{FetchError, ProtocolError};
use crate::event::{CoordinatorEvent, EventBus};
use crate::protocol::Api;
use crate::state::Snapshot;
use crate::tracker::ConsumptionTracker;
use crate::types::{ApiKey, PollInterval};

/// Schedules refreshes and publishes snapshots.
///
/// Cheap to clone; clones drive the same tracker.
#[derive(Debug)]
pub struct Coordinator<A> {
    inner: Arc<Inner<A>>,
}

#[derive(Debug)]
struct Inner<A> {
    tracker: Mutex<ConsumptionTracker<A>>,
    api: Arc<A>,
    api_key: ApiKey,
    poll_interval: PollInterval,
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    available: AtomicBool,
    events: EventBus,
}

impl<A> Clone for Coordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Api + Send + Sync + 'static> Coordinator<A> {
    /// Creates a coordinator around `tracker`.
    ///
    /// Nothing is fetched until [`refresh`](Self::refresh) or
    /// [`spawn`](Self::spawn) is called. Until the first successful
    /// refresh the coordinator is unavailable and has no snapshot.
    #[must_use]
    pub fn new(
        tracker: ConsumptionTracker<A>,
        api_key: ApiKey,
        poll_interval: PollInterval,
    ) -> Self {
        let api = Arc::clone(tracker.api());
        let (snapshot, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                tracker: Mutex::new(tracker),
                api,
                api_key,
                poll_interval,
                snapshot,
                available: AtomicBool::new(false),
                events: EventBus::new(),
            }),
        }
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn poll_interval(&self) -> PollInterval {
        self.inner.poll_interval
    }

    /// Returns the latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot.subscribe()
    }

    /// Subscribes to coordinator events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }

    /// Returns `true` if the last refresh succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::Acquire)
    }

    /// Refreshes the tracker once and publishes the result.
    ///
    /// Concurrent calls are serialized; a call waits for any refresh already
    /// in flight before starting its own. The tracker stays locked until the
    /// outcome is published, so publications follow tracker order.
    ///
    /// # Errors
    ///
    /// Returns the tracker's `FetchError`. The previous snapshot stays
    /// published and the coordinator becomes unavailable.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, FetchError> {
        let mut tracker = self.inner.tracker.lock().await;
        let result = tracker.refresh(&self.inner.api_key).await;

        let outcome = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.inner
                    .snapshot
                    .send_replace(Some(Arc::clone(&snapshot)));
                tracing::debug!(
                    cumulative = snapshot.cumulative_consumption,
                    daily = snapshot.daily_consumption(),
                    online = snapshot.state.online,
                    "Published snapshot"
                );
                self.set_available(true);
                self.inner.events.publish(CoordinatorEvent::Refreshed {
                    snapshot: Arc::clone(&snapshot),
                });
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(endpoint = %err.endpoint, error = %err, "Refresh failed");
                self.set_available(false);
                self.inner.events.publish(CoordinatorEvent::RefreshFailed {
                    endpoint: err.endpoint,
                    error: err.cause.to_string(),
                });
                Err(err)
            }
        };

        drop(tracker);
        outcome
    }

    /// Returns the last cumulative reading seen by the tracker.
    ///
    /// Waits for any refresh in flight.
    pub async fn last_cumulative(&self) -> Option<f64> {
        self.inner.tracker.lock().await.last_cumulative()
    }

    /// Sends a device command.
    ///
    /// Commands bypass the tracker; their effect appears in the next
    /// refreshed snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the API rejects the command or cannot be
    /// reached.
    pub async fn send_command(
        &self,
        command: &(dyn Command + Sync),
    ) -> Result<(), ProtocolError> {
        let name = command.name();
        let path = command.path();
        tracing::debug!(command = name, path, "Sending command");

        match self.inner.api.post(path, &self.inner.api_key).await {
            Ok(_) => {
                tracing::info!(command = name, "Command accepted");
                self.inner
                    .events
                    .publish(CoordinatorEvent::CommandSent { command: name });
                Ok(())
            }
            Err(err) => {
                tracing::error!(command = name, error = %err, "Command failed");
                self.inner.events.publish(CoordinatorEvent::CommandFailed {
                    command: name,
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Starts the refresh loop on the current tokio runtime.
    ///
    /// The first refresh runs immediately, then once per poll interval.
    /// A tick that comes due while a refresh is still running is delayed,
    /// not bunched up.
    #[must_use = "dropping the handle stops the refresh loop"]
    pub fn spawn(&self) -> CoordinatorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let coordinator = self.clone();
        let period = self.inner.poll_interval.as_duration();

        let task = tokio::spawn(async move {
            tracing::info!(
                interval = %coordinator.inner.poll_interval,
                api_key = %coordinator.inner.api_key.redacted(),
                "Coordinator started"
            );

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // Failures are logged and published by refresh
                        let _ = coordinator.refresh().await;
                    }
                }
            }

            tracing::info!("Coordinator stopped");
        });

        CoordinatorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    fn set_available(&self, available: bool) {
        let previous = self.inner.available.swap(available, Ordering::AcqRel);
        if previous != available {
            tracing::info!(available, "Coordinator availability changed");
            self.inner
                .events
                .publish(CoordinatorEvent::AvailabilityChanged { available });
        }
    }
}

#[cfg(feature = "http")]
impl Coordinator<crate::protocol::HttpClient> {
    /// Creates an HTTP backed coordinator from an integration config.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the configured base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(
        config: &crate::config::IntegrationConfig,
    ) -> Result<Self, ProtocolError> {
        let client = config.http_config().into_client()?;
        Ok(Self::new(
            ConsumptionTracker::new(client),
            config.api_key.clone(),
            config.poll_interval,
        ))
    }
}

/// Handle to a running refresh loop.
///
/// Dropping the handle stops the loop after the refresh in progress, if any.
#[derive(Debug)]
pub struct CoordinatorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    /// Returns `true` if the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Coordinator task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::command::{MaintenanceCommand, WaterSupplyCommand};
    use crate::protocol::Endpoint;
    use crate::protocol::fake::{FakeApi, STATE_JSON};
    use crate::tracker::ManualClock;
    use crate::types::parse_utc;

    fn coordinator(api: &Arc<FakeApi>, secs: u64) -> Coordinator<FakeApi> {
        let clock = Arc::new(ManualClock::new(parse_utc("2024-03-14T06:00:00Z").unwrap()));
        let tracker = ConsumptionTracker::from_shared(Arc::clone(api)).with_clock(clock);
        Coordinator::new(
            tracker,
            ApiKey::new("test-key").unwrap(),
            PollInterval::from_secs(secs).unwrap(),
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn starts_unavailable_without_snapshot() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 60);

        assert!(!coordinator.is_available());
        assert!(coordinator.snapshot().is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn refresh_publishes_snapshot() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 60);
        let mut rx = coordinator.subscribe();

        let snapshot = coordinator.refresh().await.unwrap();

        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone().unwrap();
        assert!(Arc::ptr_eq(&snapshot, &published));
        assert!(coordinator.is_available());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_snapshot() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 60);
        let first = coordinator.refresh().await.unwrap();

        api.set_status(Endpoint::DeviceState.path(), 500);
        let err = coordinator.refresh().await.unwrap_err();

        assert_eq!(err.endpoint, Endpoint::DeviceState);
        assert!(!coordinator.is_available());
        assert!(Arc::ptr_eq(&coordinator.snapshot().unwrap(), &first));

        api.set_body(Endpoint::DeviceState.path(), STATE_JSON);
        api.set_body(Endpoint::CumulativeConsumption.path(), "104");
        let recovered = coordinator.refresh().await.unwrap();

        assert!(coordinator.is_available());
        assert!(approx(recovered.daily_consumption(), 4.0));
    }

    #[tokio::test]
    async fn events_report_refresh_and_availability() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 60);
        let mut events = coordinator.events();

        coordinator.refresh().await.unwrap();
        api.set_status(Endpoint::Measurements.path(), 502);
        let _ = coordinator.refresh().await;

        let received: Vec<CoordinatorEvent> =
            std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert_eq!(received.len(), 4);
        assert!(matches!(
            received[0],
            CoordinatorEvent::AvailabilityChanged { available: true }
        ));
        assert!(received[1].snapshot().is_some());
        assert!(matches!(
            received[2],
            CoordinatorEvent::AvailabilityChanged { available: false }
        ));
        assert!(matches!(
            received[3],
            CoordinatorEvent::RefreshFailed {
                endpoint: Endpoint::Measurements,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn send_command_posts_path() {
        let api = Arc::new(FakeApi::healthy("100"));
        api.set_body("watersupply/close", "");
        let coordinator = coordinator(&api, 60);
        let mut events = coordinator.events();

        coordinator
            .send_command(&WaterSupplyCommand::Close)
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "watersupply/close");
        assert!(matches!(
            events.try_recv().unwrap(),
            CoordinatorEvent::CommandSent {
                command: "Close Water Supply"
            }
        ));
        // Commands do not touch the tracker
        assert!(coordinator.snapshot().is_none());
    }

    #[tokio::test]
    async fn failed_command_is_reported() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 60);
        let mut events = coordinator.events();

        let err = coordinator
            .send_command(&MaintenanceCommand::SelfTest)
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::HttpStatus { status: 404, .. }));
        assert!(events.try_recv().unwrap().is_failure());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_refreshes_publish_in_tracker_order() {
        for _ in 0..200 {
            let api = Arc::new(FakeApi::healthy("0"));
            api.count_cumulative_from(0);
            let coordinator = coordinator(&api, 60);

            let tasks: Vec<_> = (0..16)
                .map(|_| {
                    let coordinator = coordinator.clone();
                    tokio::spawn(async move { coordinator.refresh().await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let published = coordinator.snapshot().unwrap();
            assert_eq!(coordinator.last_cumulative().await, Some(15.0));
            assert!(approx(published.cumulative_consumption, 15.0));
            assert!(approx(published.daily_consumption(), 15.0));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn availability_follows_last_refresh() {
        let api = Arc::new(FakeApi::healthy("10"));
        let coordinator = coordinator(&api, 60);
        coordinator.refresh().await.unwrap();

        api.set_status(Endpoint::DeviceState.path(), 500);
        let failing: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.refresh().await })
            })
            .collect();
        for task in failing {
            assert!(task.await.unwrap().is_err());
        }
        assert!(!coordinator.is_available());

        api.set_body(Endpoint::DeviceState.path(), STATE_JSON);
        coordinator.refresh().await.unwrap();
        assert!(coordinator.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_refreshes_on_interval() {
        let api = Arc::new(FakeApi::healthy("100"));
        let coordinator = coordinator(&api, 10);
        let mut rx = coordinator.subscribe();

        let handle = coordinator.spawn();

        rx.changed().await.unwrap();
        assert_eq!(api.calls().len(), 3);

        api.set_body(Endpoint::CumulativeConsumption.path(), "110");
        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone().unwrap();
        assert!(approx(snapshot.daily_consumption(), 10.0));
        assert_eq!(api.calls().len(), 6);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_running_after_failures() {
        let api = Arc::new(FakeApi::healthy("100"));
        api.set_status(Endpoint::CumulativeConsumption.path(), 503);
        let coordinator = coordinator(&api, 5);
        let mut events = coordinator.events();

        let handle = coordinator.spawn();
        tokio::time::sleep(Duration::from_millis(12_500)).await;

        // Ticks at 0 s, 5 s and 10 s
        let failures = std::iter::from_fn(|| events.try_recv().ok())
            .filter(CoordinatorEvent::is_failure)
            .count();
        assert_eq!(failures, 3);
        assert!(!coordinator.is_available());
        assert!(!handle.is_finished());

        handle.shutdown().await;
    }
}
