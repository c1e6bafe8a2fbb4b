// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Buspro` Lib - A Rust library to control HDL Buspro modules.
//!
//! This library talks to an HDL Buspro home-automation bus through its UDP
//! gateway: it frames and parses bus telegrams, serializes outbound traffic,
//! correlates commands with the state reports modules send back, and
//! publishes device state to observers.
//!
//! # Supported Features
//!
//! - **Lights**: Dimmer and relay channels, with fade times
//! - **Covers**: Curtain open, close, stop and position
//! - **State tracking**: Optimistic values on command, replaced by module reports
//! - **Observers**: Callbacks after every state change
//! - **Bounded latency**: Every send and wait has a deadline
//!
//! # Architecture
//!
//! | Layer | Type | Role |
//! |-------|------|------|
//! | Codec | [`telegram::TelegramCodec`] | Frame bytes to [`Telegram`] and back |
//! | Transport | [`protocol::UdpTransport`] | Socket ownership, bounded sends |
//! | Network interface | [`protocol::NetworkInterface`] | Send gate, telegram fan-out |
//! | Devices | [`Light`], [`Cover`] | Cached state, commands, observers |
//! | Connection | [`Gateway`] | Device index, entity-facing surface |
//!
//! # Quick Start
//!
//! ```no_run
//! use buspro_lib::{Gateway, GatewayConfig};
//! use buspro_lib::types::{ChannelAddress, Level, RunningTime};
//!
//! #[tokio::main]
//! async fn main() -> buspro_lib::Result<()> {
//!     let config = GatewayConfig::new("192.168.1.15:6000".parse().unwrap());
//!     let gateway = Gateway::from_config(&config)?;
//!
//!     let light = gateway.add_light(ChannelAddress::new(1, 72, 3), "Kitchen")?;
//!     let cover = gateway.add_cover(ChannelAddress::new(1, 40, 1), "Curtain")?;
//!
//!     light.on_state_changed(|change| println!("{change}"));
//!
//!     // Opens the socket and reads the status of every device
//!     gateway.start().await?;
//!
//!     light.set_level(Level::new(60)?, RunningTime::from_secs(2)).await;
//!     cover.open().await;
//!
//!     gateway.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Failure Handling
//!
//! Only [`Gateway::start`] returns a transport error. Commands return a
//! `bool`: a failed or unconfirmed command keeps its optimistic value and
//! triggers one status read, which brings the cached state back in line
//! with the module.

pub mod command;
mod device;
pub mod error;
mod gateway;
pub mod protocol;
pub mod response;
pub mod state;
pub mod subscription;
pub mod telegram;
pub mod types;

pub use command::Command;
pub use device::{Cover, Light};
pub use error::{
    ConfigError, DeviceError, Error, MalformedFrame, Result, TransportError, ValueError,
};
pub use gateway::{Action, DeviceConfig, DeviceKind, Gateway, GatewayConfig};
pub use protocol::{NetworkInterface, TimeoutBudget, Transport, UdpTransport};
pub use state::{ChannelState, DeviceState, StateChange, UpdateOrigin};
pub use subscription::SubscriptionId;
pub use telegram::Telegram;
pub use types::{ChannelAddress, DeviceAddress, Level, RunningTime};
