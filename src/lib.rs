// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Biocat` Lib - A Rust library for Watercryst Biocat water treatment appliances.
//!
//! This library talks to the Watercryst cloud API and turns the appliance's
//! lifetime consumption counter into daily, weekly and monthly totals.
//!
//! # Supported Features
//!
//! - **Consumption tracking**: Period totals derived from the cumulative counter
//! - **Device state**: Online flag, operating mode, micro-leakage and protection state
//! - **Measurements**: Water temperature, pressure, flow rate, last tap event
//! - **Commands**: Water supply, leakage protection, absence mode, self test
//! - **Polling**: Periodic refresh with snapshot publication and events
//!
//! # Quick Start
//!
//! ## One-off Refresh
//!
//! ```no_run
//! use biocat_lib::ConsumptionTracker;
//! use biocat_lib::protocol::HttpClient;
//! use biocat_lib::types::ApiKey;
//!
//! #[tokio::main]
//! async fn main() -> biocat_lib::Result<()> {
//!     let key = ApiKey::new("my-api-key")?;
//!     let mut tracker = ConsumptionTracker::new(HttpClient::new()?);
//!
//!     // The first refresh only records a baseline
//!     let snapshot = tracker.refresh(&key).await?;
//!     println!("counter: {} L", snapshot.cumulative_consumption);
//!     Ok(())
//! }
//! ```
//!
//! ## Periodic Polling
//!
//! ```no_run
//! use biocat_lib::Coordinator;
//! use biocat_lib::command::WaterSupplyCommand;
//! use biocat_lib::config::IntegrationConfig;
//!
//! #[tokio::main]
//! async fn main() -> biocat_lib::Result<()> {
//!     let config = IntegrationConfig::load("biocat.json")?;
//!     let coordinator = Coordinator::from_config(&config)?;
//!     let handle = coordinator.spawn();
//!
//!     let mut snapshots = coordinator.subscribe();
//!     while snapshots.changed().await.is_ok() {
//!         let Some(snapshot) = snapshots.borrow_and_update().clone() else {
//!             continue;
//!         };
//!         println!("today: {} L", snapshot.daily_consumption());
//!         if snapshot.measurements.flow_rate > 30.0 {
//!             coordinator.send_command(&WaterSupplyCommand::Close).await?;
//!             break;
//!         }
//!     }
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The library emits `tracing` events and installs no subscriber. API keys
//! only ever appear redacted.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod event;
pub mod protocol;
pub mod response;
pub mod state;
pub mod tracker;
pub mod types;

pub use command::Command;
pub use config::IntegrationConfig;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use error::{
    ConfigError, Error, FetchCause, FetchError, ParseError, ProtocolError, Result, ValueError,
};
pub use event::{CoordinatorEvent, EventBus};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use protocol::{Api, ApiResponse, Endpoint};
pub use response::{DeviceState, MeasurementSnapshot, MicroLeakState};
pub use state::{ConsumptionAccumulators, PeriodKind, Snapshot};
pub use tracker::ConsumptionTracker;
pub use types::{ApiKey, PollInterval};
