// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telegram-level interface to the bus.
//!
//! The network interface owns the transport, the frame codec and the list
//! of telegram subscribers. It knows nothing about devices: every decoded
//! telegram is handed to every subscriber, which filter by address.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::{DatagramHandler, TimeoutBudget, Transport, as_millis};
use crate::command::Command;
use crate::error::TransportError;
use crate::subscription::SubscriptionId;
use crate::telegram::{Telegram, TelegramCodec};
use crate::types::DeviceAddress;

/// Type alias for telegram subscribers.
type TelegramCallback = Arc<dyn Fn(&Telegram) + Send + Sync>;

/// Ordered list of telegram subscribers.
struct Subscribers {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, TelegramCallback)>>,
}

impl Subscribers {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    fn dispatch(&self, telegram: &Telegram) {
        // Snapshot so subscribers may (un)register from inside a callback.
        let callbacks: Vec<TelegramCallback> = self
            .entries
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(telegram);
        }
    }
}

/// Bridge between a [`Transport`] and decoded [`Telegram`]s.
///
/// Outbound telegrams are encoded and sent one at a time through a single
/// gate, so commands from different devices never race on the wire.
/// Inbound frames are decoded and dispatched synchronously to every
/// subscriber in registration order; malformed frames are dropped.
///
/// # Examples
///
/// ```no_run
/// use buspro_lib::protocol::{NetworkInterface, TimeoutBudget, UdpTransport};
/// use buspro_lib::telegram::TelegramCodec;
/// use buspro_lib::types::DeviceAddress;
///
/// # async fn example() -> Result<(), buspro_lib::error::TransportError> {
/// let timeouts = TimeoutBudget::default();
/// let transport = UdpTransport::new(
///     "192.168.1.15:6000".parse().unwrap(),
///     "0.0.0.0:6000".parse().unwrap(),
///     timeouts,
/// );
/// let network = NetworkInterface::new(
///     transport,
///     TelegramCodec::default(),
///     DeviceAddress::new(200, 200),
///     timeouts,
/// );
///
/// network.register_callback(|telegram| println!("{telegram}"));
/// network.start().await?;
/// # Ok(())
/// # }
/// ```
pub struct NetworkInterface<T: Transport> {
    transport: T,
    codec: TelegramCodec,
    source: DeviceAddress,
    timeouts: TimeoutBudget,
    subscribers: Arc<Subscribers>,
    send_gate: tokio::sync::Mutex<()>,
}

impl<T: Transport> NetworkInterface<T> {
    /// Creates a network interface over a stopped transport.
    ///
    /// `source` is the bus address written into every outbound telegram
    /// built from a [`Command`].
    #[must_use]
    pub fn new(
        transport: T,
        codec: TelegramCodec,
        source: DeviceAddress,
        timeouts: TimeoutBudget,
    ) -> Self {
        Self {
            transport,
            codec,
            source,
            timeouts,
            subscribers: Arc::new(Subscribers::new()),
            send_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the frame codec.
    #[must_use]
    pub fn codec(&self) -> &TelegramCodec {
        &self.codec
    }

    /// Returns the bus address this interface sends from.
    #[must_use]
    pub fn source_address(&self) -> DeviceAddress {
        self.source
    }

    /// Returns the timeout budget.
    #[must_use]
    pub fn timeouts(&self) -> &TimeoutBudget {
        &self.timeouts
    }

    /// Adds a subscriber that receives every decoded telegram.
    ///
    /// Subscribers run on the receive path and must return quickly.
    pub fn register_callback<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Telegram) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new(self.subscribers.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .entries
            .write()
            .push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber.
    ///
    /// Returns `true` if the subscriber was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.subscribers.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.entries.read().len()
    }

    /// Starts the transport and begins dispatching telegrams.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if its endpoints cannot be opened.
    pub async fn start(&self) -> Result<(), TransportError> {
        let subscribers = Arc::clone(&self.subscribers);
        let codec = self.codec;
        let handler: DatagramHandler =
            Arc::new(move |datagram: &[u8], peer: SocketAddr| match codec.decode(datagram, peer) {
                Ok(telegram) => subscribers.dispatch(&telegram),
                Err(error) => {
                    tracing::debug!(peer = %peer, error = %error, "Dropping malformed frame");
                }
            });

        self.transport.start(handler).await
    }

    /// Stops the transport. Idempotent.
    pub async fn stop(&self) {
        self.transport.stop().await;
    }

    /// Returns `true` while the transport is started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Encodes and sends a telegram.
    ///
    /// A single attempt bounded by [`TimeoutBudget::telegram`], including the
    /// wait for the send gate. Returns `false` on failure or timeout.
    pub async fn send_telegram(&self, telegram: &Telegram) -> bool {
        let frame = self.codec.encode(telegram);
        tracing::debug!(telegram = %telegram, "Sending telegram");

        let send = async {
            let _gate = self.send_gate.lock().await;
            self.transport.send(&frame).await
        };

        match tokio::time::timeout(self.timeouts.telegram, send).await {
            Ok(sent) => sent,
            Err(_) => {
                tracing::warn!(
                    telegram = %telegram,
                    timeout_ms = as_millis(self.timeouts.telegram),
                    "Timed out sending telegram"
                );
                false
            }
        }
    }

    /// Builds a telegram from a command and sends it.
    pub async fn send_command<C: Command + Sync>(&self, command: &C) -> bool {
        self.send_telegram(&command.to_telegram(self.source)).await
    }
}

impl<T: Transport> std::fmt::Debug for NetworkInterface<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkInterface")
            .field("source", &self.source)
            .field("running", &self.is_running())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
