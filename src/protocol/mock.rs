// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording transport for unit tests.
//!
//! Sent frames are recorded instead of hitting the network, and inbound
//! datagrams are injected straight into the registered handler. The mock
//! does not serialize sends itself, so concurrency tests observe exactly
//! what the layers above it allow.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{DatagramHandler, Transport};
use crate::error::TransportError;

/// What `send` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendBehaviour {
    /// Record the frame and report success.
    Succeed,
    /// Record the frame and report failure.
    Fail,
    /// Never complete.
    Hang,
    /// Record the frame and succeed after a delay.
    Delay(Duration),
}

pub(crate) struct MockTransport {
    handler: Mutex<Option<DatagramHandler>>,
    sent: Mutex<Vec<Vec<u8>>>,
    behaviour: Mutex<SendBehaviour>,
    fail_start: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            handler: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            behaviour: Mutex::new(SendBehaviour::Succeed),
            fail_start: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_behaviour(self, behaviour: SendBehaviour) -> Self {
        self.set_behaviour(behaviour);
        self
    }

    pub(crate) fn set_behaviour(&self, behaviour: SendBehaviour) {
        *self.behaviour.lock() = behaviour;
    }

    /// Makes the next `start` fail as if the port were taken.
    pub(crate) fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    /// Delivers a datagram as if it arrived from `peer`.
    pub(crate) fn inject(&self, datagram: &[u8], peer: SocketAddr) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(datagram, peer);
        }
    }

    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    async fn start(&self, handler: DatagramHandler) -> Result<(), TransportError> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Unavailable {
                address: "0.0.0.0:6000".parse().unwrap(),
                source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
            });
        }
        *self.handler.lock() = Some(handler);
        Ok(())
    }

    async fn send(&self, frame: &[u8]) -> bool {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let behaviour = *self.behaviour.lock();
        let sent = match behaviour {
            SendBehaviour::Succeed => {
                self.sent.lock().push(frame.to_vec());
                true
            }
            SendBehaviour::Fail => {
                self.sent.lock().push(frame.to_vec());
                false
            }
            SendBehaviour::Hang => std::future::pending().await,
            SendBehaviour::Delay(delay) => {
                tokio::time::sleep(delay).await;
                self.sent.lock().push(frame.to_vec());
                true
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        sent
    }

    async fn stop(&self) {
        self.handler.lock().take();
    }

    fn is_running(&self) -> bool {
        self.handler.lock().is_some()
    }
}
