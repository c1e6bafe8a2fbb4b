// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport and telegram dispatch for the Buspro UDP gateway.
//!
//! # Layers
//!
//! - [`Transport`]: moves raw datagrams. [`UdpTransport`] is the production
//!   implementation.
//! - [`NetworkInterface`]: encodes outbound telegrams, serializes sends through
//!   a single gate, decodes inbound frames and fans each telegram out to every
//!   registered subscriber in registration order.
//! - [`TimeoutBudget`]: the deadlines of every bounded operation.
//!
//! Transport and codec failures never cross the network interface as
//! errors; sends report `bool` and malformed frames are dropped. Only
//! [`Transport::start`] returns an error.

mod network_interface;
mod timeouts;
mod udp;

#[cfg(test)]
pub(crate) mod mock;

pub use network_interface::NetworkInterface;
pub use timeouts::TimeoutBudget;
pub use udp::UdpTransport;

pub(crate) use timeouts::as_millis;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::TransportError;

/// Consumer of received datagrams.
///
/// Called on the receive path with the datagram and its sender. Must return
/// quickly; a slow handler delays the datagrams behind it.
pub type DatagramHandler = Arc<dyn Fn(&[u8], SocketAddr) + Send + Sync>;

/// A datagram transport to the bus gateway.
///
/// Implementations own their endpoints exclusively. Sends must never
/// interleave on the wire and must be bounded in time.
pub trait Transport: Send + Sync + 'static {
    /// Opens the endpoints and starts delivering datagrams to `handler`.
    ///
    /// Starting an already started transport is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unavailable`] if an endpoint cannot be opened
    /// and [`TransportError::StartupTimeout`] if it is not ready in time.
    fn start(
        &self,
        handler: DatagramHandler,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends one datagram to the gateway.
    ///
    /// Returns `false` on timeout, socket error, or when not started.
    fn send(&self, frame: &[u8]) -> impl Future<Output = bool> + Send;

    /// Releases the endpoints. Idempotent.
    fn stop(&self) -> impl Future<Output = ()> + Send;

    /// Returns `true` between a successful `start` and `stop`.
    fn is_running(&self) -> bool;
}
