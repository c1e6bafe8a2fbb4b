// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus devices.
//!
//! A device is one channel of a physical module: a dimmer or relay output
//! ([`Light`]) or a curtain motor ([`Cover`]). Devices share one
//! [`NetworkInterface`], cache their own state and notify their observers
//! after every mutation.
//!
//! # Command lifecycle
//!
//! 1. The device takes its command gate, so commands on one device are
//!    applied and sent in call order.
//! 2. The desired value is stored optimistically and observers are
//!    notified.
//! 3. The command telegram is sent. The method returns whether it made it
//!    onto the wire.
//! 4. In the background the device waits for the module to report its
//!    state. If nothing arrives in time, or the send failed, a single status
//!    read is issued. Commands are never resent.
//!
//! ```no_run
//! use buspro_lib::{Gateway, GatewayConfig};
//! use buspro_lib::types::{ChannelAddress, Level, RunningTime};
//!
//! # async fn example() -> buspro_lib::Result<()> {
//! let gateway = Gateway::from_config(&GatewayConfig::new("192.168.1.15:6000".parse().unwrap()))?;
//! let light = gateway.add_light(ChannelAddress::new(1, 72, 3), "Kitchen")?;
//! gateway.start().await?;
//!
//! light.set_level(Level::new(80)?, RunningTime::from_secs(2)).await;
//! assert_eq!(light.current_brightness(), Some(Level::new(80)?));
//! # Ok(())
//! # }
//! ```

mod cover;
mod light;

pub use cover::Cover;
pub use light::Light;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::command::Command;
use crate::error::DeviceError;
use crate::protocol::{NetworkInterface, Transport, as_millis};
use crate::state::StateChange;
use crate::subscription::ObserverRegistry;
use crate::telegram::Telegram;
use crate::types::ChannelAddress;

/// Plumbing shared by every device kind.
pub(crate) struct DeviceCore<T: Transport> {
    address: ChannelAddress,
    name: String,
    network: Arc<NetworkInterface<T>>,
    observers: ObserverRegistry,
    /// Bumped on every authoritative update.
    confirmations: watch::Sender<u64>,
    command_gate: tokio::sync::Mutex<()>,
    status_query: Telegram,
}

impl<T: Transport> DeviceCore<T> {
    pub(crate) fn new<Q: Command>(
        network: Arc<NetworkInterface<T>>,
        address: ChannelAddress,
        name: String,
        status_query: &Q,
    ) -> Self {
        let status_query = status_query.to_telegram(network.source_address());
        Self {
            address,
            name,
            network,
            observers: ObserverRegistry::new(),
            confirmations: watch::Sender::new(0),
            command_gate: tokio::sync::Mutex::new(()),
            status_query,
        }
    }

    pub(crate) fn address(&self) -> ChannelAddress {
        self.address
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// The telegram [`read_status`](Self::read_status) sends.
    pub(crate) fn status_query(&self) -> &Telegram {
        &self.status_query
    }

    /// Notifies observers, and pending commands when `change` is authoritative.
    pub(crate) fn publish(&self, change: &StateChange) {
        self.observers.dispatch(change);
        if change.is_authoritative() {
            self.confirmations.send_modify(|count| *count = count.wrapping_add(1));
        }
    }

    /// Runs the command lifecycle.
    ///
    /// `assume` stores the optimistic value; it runs under the command gate
    /// just before the telegram is sent.
    pub(crate) async fn send_command<C, F>(self: &Arc<Self>, command: &C, assume: F) -> bool
    where
        C: Command + Sync,
        F: FnOnce() + Send,
    {
        let _gate = self.command_gate.lock().await;
        let confirmation = self.confirmations.subscribe();

        assume();

        if !self.network.send_command(command).await {
            tracing::warn!(
                device = %self.address,
                error = %DeviceError::SendFailed(self.address),
                "Command not sent, reading status"
            );
            self.schedule_refresh();
            return false;
        }

        let core = Arc::clone(self);
        spawn_detached(async move {
            let mut confirmation = confirmation;
            if let Err(error) = core.wait_for_confirmation(&mut confirmation).await {
                tracing::warn!(
                    device = %core.address,
                    error = %error,
                    "Command not confirmed, reading status"
                );
                core.read_status().await;
            }
        });
        true
    }

    /// Sends the status query and waits for the module to report.
    pub(crate) async fn read_status(&self) -> bool {
        let mut confirmation = self.confirmations.subscribe();

        if !self.network.send_telegram(&self.status_query).await {
            return false;
        }

        match self.wait_for_confirmation(&mut confirmation).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(device = %self.address, error = %error, "Status read unanswered");
                false
            }
        }
    }

    /// Issues a status read in the background.
    pub(crate) fn schedule_refresh(self: &Arc<Self>) {
        let core = Arc::clone(self);
        spawn_detached(async move {
            core.read_status().await;
        });
    }

    async fn wait_for_confirmation(
        &self,
        confirmation: &mut watch::Receiver<u64>,
    ) -> Result<(), DeviceError> {
        let deadline = self.network.timeouts().confirmation;
        match tokio::time::timeout(deadline, confirmation.changed()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(DeviceError::ConfirmationTimeout {
                address: self.address,
                waited_ms: as_millis(deadline),
            }),
        }
    }
}

impl<T: Transport> std::fmt::Debug for DeviceCore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCore")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Spawns a task on the current runtime, if there is one.
fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => tracing::warn!("No async runtime, background task skipped"),
    }
}
