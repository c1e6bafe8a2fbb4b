// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP transport.
//!
//! One socket is bound on the receive address and used for both directions;
//! outbound frames go to the gateway's send address. The socket has
//! `SO_BROADCAST` set since gateways are commonly addressed through the
//! subnet broadcast address.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use super::{DatagramHandler, TimeoutBudget, Transport, as_millis};
use crate::error::TransportError;

/// Largest datagram the receive loop accepts.
const RECEIVE_BUFFER_LEN: usize = 2048;

/// Pause after a receive error, so a persistent socket error cannot spin.
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// An open endpoint and the task reading from it.
struct Endpoint {
    socket: Arc<UdpSocket>,
    local_address: Option<SocketAddr>,
    receiver: JoinHandle<()>,
}

/// UDP transport to a Buspro gateway.
///
/// # Examples
///
/// ```no_run
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use buspro_lib::protocol::{TimeoutBudget, Transport, UdpTransport};
///
/// # async fn example() -> Result<(), buspro_lib::error::TransportError> {
/// let transport = UdpTransport::new(
///     "192.168.1.15:6000".parse().unwrap(),
///     "0.0.0.0:6000".parse().unwrap(),
///     TimeoutBudget::default(),
/// );
///
/// transport
///     .start(Arc::new(|datagram: &[u8], peer: SocketAddr| {
///         println!("{} bytes from {peer}", datagram.len());
///     }))
///     .await?;
/// let sent = transport.send(&[0x00]).await;
/// transport.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct UdpTransport {
    send_address: SocketAddr,
    receive_address: SocketAddr,
    timeouts: TimeoutBudget,
    endpoint: Mutex<Option<Endpoint>>,
    send_gate: tokio::sync::Mutex<()>,
}

impl UdpTransport {
    /// Creates a stopped transport.
    #[must_use]
    pub fn new(
        send_address: SocketAddr,
        receive_address: SocketAddr,
        timeouts: TimeoutBudget,
    ) -> Self {
        Self {
            send_address,
            receive_address,
            timeouts,
            endpoint: Mutex::new(None),
            send_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the gateway address frames are sent to.
    #[must_use]
    pub fn send_address(&self) -> SocketAddr {
        self.send_address
    }

    /// Returns the configured receive address.
    #[must_use]
    pub fn receive_address(&self) -> SocketAddr {
        self.receive_address
    }

    /// Returns the address actually bound, while started.
    ///
    /// Differs from [`receive_address`](Self::receive_address) when port 0
    /// was configured.
    #[must_use]
    pub fn local_address(&self) -> Option<SocketAddr> {
        self.endpoint
            .lock()
            .as_ref()
            .and_then(|endpoint| endpoint.local_address)
    }

    async fn open(&self) -> Result<UdpSocket, TransportError> {
        let address = self.receive_address;
        let socket = tokio::time::timeout(self.timeouts.startup, UdpSocket::bind(address))
            .await
            .map_err(|_| TransportError::StartupTimeout {
                address,
                timeout_ms: as_millis(self.timeouts.startup),
            })?
            .map_err(|source| TransportError::Unavailable { address, source })?;

        socket
            .set_broadcast(true)
            .map_err(|source| TransportError::Unavailable { address, source })?;
        Ok(socket)
    }

    async fn try_send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let _gate = self.send_gate.lock().await;

        let socket = self
            .endpoint
            .lock()
            .as_ref()
            .map(|endpoint| Arc::clone(&endpoint.socket))
            .ok_or(TransportError::NotStarted)?;

        tokio::time::timeout(self.timeouts.send, socket.send_to(frame, self.send_address))
            .await
            .map_err(|_| TransportError::SendTimeout(as_millis(self.timeouts.send)))??;
        Ok(())
    }
}

impl Transport for UdpTransport {
    async fn start(&self, handler: DatagramHandler) -> Result<(), TransportError> {
        if self.is_running() {
            tracing::debug!(address = %self.receive_address, "UDP transport already started");
            return Ok(());
        }

        let socket = Arc::new(self.open().await?);
        let local_address = socket.local_addr().ok();
        let receiver = tokio::spawn(receive_loop(Arc::clone(&socket), handler));

        let mut slot = self.endpoint.lock();
        if slot.is_some() {
            // Lost a race with a concurrent start.
            receiver.abort();
            return Ok(());
        }
        *slot = Some(Endpoint {
            socket,
            local_address,
            receiver,
        });
        drop(slot);

        tracing::info!(
            local = ?local_address,
            gateway = %self.send_address,
            "UDP transport started"
        );
        Ok(())
    }

    async fn send(&self, frame: &[u8]) -> bool {
        match self.try_send(frame).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(gateway = %self.send_address, error = %error, "UDP send failed");
                false
            }
        }
    }

    async fn stop(&self) {
        let endpoint = self.endpoint.lock().take();
        if let Some(endpoint) = endpoint {
            endpoint.receiver.abort();
            tracing::info!(address = %self.receive_address, "UDP transport stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.endpoint.lock().is_some()
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        if let Some(endpoint) = self.endpoint.get_mut().take() {
            endpoint.receiver.abort();
        }
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("send_address", &self.send_address)
            .field("receive_address", &self.receive_address)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Delivers every datagram to the handler until the task is aborted.
async fn receive_loop(socket: Arc<UdpSocket>, handler: DatagramHandler) {
    let mut buffer = vec![0u8; RECEIVE_BUFFER_LEN];
    loop {
        match socket.recv_from(&mut buffer).await {
            Ok((len, peer)) => handler(&buffer[..len], peer),
            Err(error) => {
                tracing::warn!(error = %error, "UDP receive failed");
                tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
            }
        }
    }
}
