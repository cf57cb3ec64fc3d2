// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumption tracking over the cloud API.
//!
//! [`ConsumptionTracker`] turns the appliance's cumulative consumption
//! counter into daily, weekly and monthly totals. Each
//! [`refresh`](ConsumptionTracker::refresh) reads three endpoints
//! concurrently and only updates its state if all three succeed.
//!
//! # Examples
//!
//! ```no_run
//! use biocat_lib::ConsumptionTracker;
//! use biocat_lib::protocol::HttpClient;
//! use biocat_lib::types::ApiKey;
//!
//! # async fn example() -> biocat_lib::Result<()> {
//! let key = ApiKey::new("my-api-key")?;
//! let mut tracker = ConsumptionTracker::new(HttpClient::new()?);
//!
//! let snapshot = tracker.refresh(&key).await?;
//! println!("today: {} L", snapshot.daily_consumption());
//! # Ok(())
//! # }
//! ```

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::sync::Arc;

use crate::error::FetchError;
use crate::protocol::{Api, ApiResponse, Endpoint};
use crate::response::{DeviceState, MeasurementSnapshot, parse_cumulative};
use crate::state::{ConsumptionAccumulators, Snapshot};
use crate::types::ApiKey;

/// Derives period consumption from the cumulative counter.
///
/// The first refresh only records a baseline; totals start moving from the
/// second refresh on. Deltas are applied as reported, including negative
/// ones after a counter reset.
///
/// Refreshing takes `&mut self`, so two refreshes of the same tracker can
/// never overlap. State lives as long as the tracker and is not persisted.
#[derive(Debug)]
pub struct ConsumptionTracker<A> {
    api: Arc<A>,
    clock: Arc<dyn Clock>,
    last_cumulative: Option<f64>,
    accumulators: ConsumptionAccumulators,
}

impl<A: Api> ConsumptionTracker<A> {
    /// Creates a tracker using the system clock.
    ///
    /// Periods start at the current day, week and month.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::from_shared(Arc::new(api))
    }

    /// Creates a tracker over a transport shared with other users.
    #[must_use]
    pub fn from_shared(api: Arc<A>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            api,
            accumulators: ConsumptionAccumulators::new(clock.now()),
            clock,
            last_cumulative: None,
        }
    }

    /// Reads time from `clock` and restarts the periods at its current time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.accumulators = ConsumptionAccumulators::new(clock.now());
        self.clock = clock;
        self
    }

    /// Replaces the accumulators, e.g. to resume from saved totals.
    #[must_use]
    pub fn with_accumulators(mut self, accumulators: ConsumptionAccumulators) -> Self {
        self.accumulators = accumulators;
        self
    }

    /// Sets the baseline the next delta is computed against.
    #[must_use]
    pub fn with_baseline(mut self, cumulative: f64) -> Self {
        self.last_cumulative = Some(cumulative);
        self
    }

    /// Returns the transport shared with this tracker.
    #[must_use]
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Returns the last observed cumulative reading.
    #[must_use]
    pub fn last_cumulative(&self) -> Option<f64> {
        self.last_cumulative
    }

    /// Returns the current totals.
    #[must_use]
    pub fn accumulators(&self) -> &ConsumptionAccumulators {
        &self.accumulators
    }

    /// Fetches fresh readings and advances the totals.
    ///
    /// The three reads are issued concurrently. If any fails, nothing is
    /// mutated and the failing endpoint is reported.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, non-2xx status or an
    /// undecodable payload from any endpoint.
    pub async fn refresh(&mut self, api_key: &ApiKey) -> Result<Snapshot, FetchError> {
        let this = &*self;
        let (cumulative, state, measurements) = tokio::try_join!(
            this.fetch_cumulative(api_key),
            this.fetch_state(api_key),
            this.fetch_measurements(api_key),
        )?;

        let now = self.clock.now();

        let rolled = self.accumulators.roll_over(now);
        for period in rolled.periods() {
            tracing::info!(
                %period,
                started_at = %self.accumulators.period_start(period),
                "Consumption period rolled over"
            );
        }

        if let Some(last) = self.last_cumulative {
            let delta = cumulative - last;
            if delta < 0.0 {
                tracing::warn!(
                    previous = last,
                    current = cumulative,
                    delta,
                    "Cumulative consumption decreased"
                );
            }
            self.accumulators.add(delta);
        } else {
            tracing::debug!(cumulative, "Recorded consumption baseline");
        }
        self.last_cumulative = Some(cumulative);

        Ok(Snapshot {
            taken_at: now,
            cumulative_consumption: cumulative,
            consumption: self.accumulators,
            state,
            measurements,
        })
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        api_key: &ApiKey,
    ) -> Result<ApiResponse, FetchError> {
        self.api
            .get(endpoint.path(), api_key)
            .await
            .map_err(|e| FetchError::new(endpoint, e))
    }

    async fn fetch_cumulative(&self, api_key: &ApiKey) -> Result<f64, FetchError> {
        let endpoint = Endpoint::CumulativeConsumption;
        let response = self.fetch(endpoint, api_key).await?;
        parse_cumulative(response.body()).map_err(|e| FetchError::new(endpoint, e))
    }

    async fn fetch_state(&self, api_key: &ApiKey) -> Result<DeviceState, FetchError> {
        let endpoint = Endpoint::DeviceState;
        let response = self.fetch(endpoint, api_key).await?;
        response.parse().map_err(|e| FetchError::new(endpoint, e))
    }

    async fn fetch_measurements(
        &self,
        api_key: &ApiKey,
    ) -> Result<MeasurementSnapshot, FetchError> {
        let endpoint = Endpoint::Measurements;
        let response = self.fetch(endpoint, api_key).await?;
        response.parse().map_err(|e| FetchError::new(endpoint, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchCause, ProtocolError};
    use crate::protocol::fake::FakeApi;
    use crate::state::PeriodKind;
    use crate::types::parse_utc;
    use chrono::TimeDelta;

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn tracker_at(
        api: &Arc<FakeApi>,
        now: &str,
    ) -> (ConsumptionTracker<FakeApi>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(parse_utc(now).unwrap()));
        let tracker = ConsumptionTracker::from_shared(Arc::clone(api)).with_clock(clock.clone());
        (tracker, clock)
    }

    fn set_cumulative(api: &FakeApi, body: &str) {
        api.set_body(Endpoint::CumulativeConsumption.path(), body);
    }

    #[tokio::test]
    async fn first_refresh_sets_baseline_only() {
        let api = Arc::new(FakeApi::healthy("500.0"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T10:00:00Z");

        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(approx(snapshot.cumulative_consumption, 500.0));
        assert!(approx(snapshot.daily_consumption(), 0.0));
        assert!(approx(snapshot.weekly_consumption(), 0.0));
        assert!(approx(snapshot.monthly_consumption(), 0.0));
        assert_eq!(tracker.last_cumulative(), Some(500.0));
    }

    #[tokio::test]
    async fn second_refresh_adds_delta_everywhere() {
        let api = Arc::new(FakeApi::healthy("500.0"));
        let (mut tracker, clock) = tracker_at(&api, "2024-03-14T10:00:00Z");
        tracker.refresh(&key()).await.unwrap();

        set_cumulative(&api, "512.5");
        clock.advance(TimeDelta::minutes(1));
        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(approx(snapshot.daily_consumption(), 12.5));
        assert!(approx(snapshot.weekly_consumption(), 12.5));
        assert!(approx(snapshot.monthly_consumption(), 12.5));
        assert_eq!(tracker.last_cumulative(), Some(512.5));
    }

    #[tokio::test]
    async fn restored_baseline_counts_first_refresh() {
        let api = Arc::new(FakeApi::healthy("110"));
        let clock = Arc::new(ManualClock::new(parse_utc("2024-03-14T10:00:00Z").unwrap()));
        let mut tracker = ConsumptionTracker::from_shared(Arc::clone(&api))
            .with_clock(clock)
            .with_baseline(100.0);

        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(approx(snapshot.daily_consumption(), 10.0));
        assert!(approx(snapshot.monthly_consumption(), 10.0));
        assert_eq!(tracker.last_cumulative(), Some(110.0));
    }

    #[tokio::test]
    async fn increasing_readings_sum_to_total_delta() {
        let api = Arc::new(FakeApi::healthy("100"));
        let (mut tracker, clock) = tracker_at(&api, "2024-03-14T06:00:00Z");

        let readings = ["100", "101,5", "104.25", "110", "130,75"];
        let mut last = None;
        for reading in readings {
            set_cumulative(&api, reading);
            last = Some(tracker.refresh(&key()).await.unwrap());
            clock.advance(TimeDelta::minutes(30));
        }

        let snapshot = last.unwrap();
        for kind in PeriodKind::ALL {
            assert!(approx(snapshot.consumption.total(kind), 30.75));
        }
    }

    #[tokio::test]
    async fn unchanged_reading_is_a_no_op() {
        let api = Arc::new(FakeApi::healthy("200"));
        let (mut tracker, clock) = tracker_at(&api, "2024-03-14T06:00:00Z");
        tracker.refresh(&key()).await.unwrap();
        set_cumulative(&api, "210");
        tracker.refresh(&key()).await.unwrap();
        let before = *tracker.accumulators();

        clock.advance(TimeDelta::seconds(60));
        tracker.refresh(&key()).await.unwrap();

        assert_eq!(*tracker.accumulators(), before);
    }

    #[tokio::test]
    async fn decreasing_reading_applies_negative_delta() {
        let api = Arc::new(FakeApi::healthy("100.0"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");
        tracker.refresh(&key()).await.unwrap();

        set_cumulative(&api, "60.0");
        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(approx(snapshot.daily_consumption(), -40.0));
        assert!(approx(snapshot.weekly_consumption(), -40.0));
        assert!(approx(snapshot.monthly_consumption(), -40.0));
    }

    #[tokio::test]
    async fn daily_rollover_resets_before_adding() {
        let api = Arc::new(FakeApi::healthy("1000"));
        let t = parse_utc("2024-03-14T00:00:00Z").unwrap();
        let clock = Arc::new(ManualClock::new(t + TimeDelta::hours(20)));
        let mut tracker = ConsumptionTracker::from_shared(Arc::clone(&api))
            .with_clock(clock.clone())
            .with_accumulators(ConsumptionAccumulators::with_period_starts(t, t, t));

        tracker.refresh(&key()).await.unwrap();
        set_cumulative(&api, "1008");
        tracker.refresh(&key()).await.unwrap();
        assert!(approx(tracker.accumulators().total(PeriodKind::Daily), 8.0));

        clock.set(t + TimeDelta::hours(24) + TimeDelta::seconds(1));
        set_cumulative(&api, "1010");
        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(approx(snapshot.daily_consumption(), 2.0));
        assert!(approx(snapshot.weekly_consumption(), 10.0));
        assert!(approx(snapshot.monthly_consumption(), 10.0));
        assert_eq!(
            snapshot.consumption.period_start(PeriodKind::Daily),
            parse_utc("2024-03-15T00:00:00Z").unwrap()
        );
    }

    #[tokio::test]
    async fn failed_state_fetch_leaves_tracker_untouched() {
        let api = Arc::new(FakeApi::healthy("300"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");
        tracker.refresh(&key()).await.unwrap();
        set_cumulative(&api, "305");
        tracker.refresh(&key()).await.unwrap();
        let before = *tracker.accumulators();

        set_cumulative(&api, "320");
        api.set_status(Endpoint::DeviceState.path(), 503);
        let err = tracker.refresh(&key()).await.unwrap_err();

        assert_eq!(err.endpoint, Endpoint::DeviceState);
        assert!(matches!(
            err.cause,
            FetchCause::Transport(ProtocolError::HttpStatus { status: 503, .. })
        ));
        assert_eq!(tracker.last_cumulative(), Some(305.0));
        assert_eq!(*tracker.accumulators(), before);
    }

    #[tokio::test]
    async fn undecodable_cumulative_is_a_decode_error() {
        let api = Arc::new(FakeApi::healthy("not a number"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");

        let err = tracker.refresh(&key()).await.unwrap_err();

        assert_eq!(err.endpoint, Endpoint::CumulativeConsumption);
        assert!(err.is_decode());
        assert_eq!(tracker.last_cumulative(), None);
    }

    #[tokio::test]
    async fn malformed_measurements_fail_the_refresh() {
        let api = Arc::new(FakeApi::healthy("42"));
        api.set_body(Endpoint::Measurements.path(), r#"{"waterTemp": 10}"#);
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");

        let err = tracker.refresh(&key()).await.unwrap_err();

        assert_eq!(err.endpoint, Endpoint::Measurements);
        assert!(err.is_decode());
        assert_eq!(tracker.last_cumulative(), None);
    }

    #[tokio::test]
    async fn refresh_reads_all_endpoints_with_key() {
        let api = Arc::new(FakeApi::healthy("1"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");

        tracker.refresh(&key()).await.unwrap();

        let mut paths: Vec<String> = api.calls().into_iter().map(|c| c.path).collect();
        paths.sort();
        let mut expected: Vec<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        expected.sort_unstable();
        assert_eq!(paths, expected);
        assert!(api.calls().iter().all(|c| c.method == "GET" && c.api_key == "test-key"));
    }

    #[tokio::test]
    async fn snapshot_merges_state_and_measurements() {
        let api = Arc::new(FakeApi::healthy("1"));
        let (mut tracker, _clock) = tracker_at(&api, "2024-03-14T06:00:00Z");

        let snapshot = tracker.refresh(&key()).await.unwrap();

        assert!(snapshot.state.online);
        assert_eq!(snapshot.state.mode_name, "Water tap");
        assert!(approx(snapshot.measurements.water_temperature, 14.2));
        assert!(approx(snapshot.measurements.last_tap_duration, 18.0));
        assert_eq!(snapshot.taken_at, parse_utc("2024-03-14T06:00:00Z").unwrap());
    }
}
