// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telegrams, the decoded unit of bus communication.
//!
//! A [`Telegram`] is an immutable value: it is built either from a command
//! (see [`crate::command`]) or by [`TelegramCodec::decode`] from a received
//! datagram, and is consumed once by the dispatch step.
//!
//! # Examples
//!
//! ```
//! use buspro_lib::telegram::{Telegram, TelegramCodec};
//! use buspro_lib::types::{DeviceAddress, OperateCode};
//!
//! let telegram = Telegram::new(
//!     DeviceAddress::new(200, 200),
//!     DeviceAddress::new(1, 72),
//!     OperateCode::ReadStatusOfChannels,
//!     Vec::new(),
//! )
//! .unwrap();
//!
//! let codec = TelegramCodec::default();
//! let frame = codec.encode(&telegram);
//! let peer = "192.168.1.10:6000".parse().unwrap();
//! let decoded = codec.decode(&frame, peer).unwrap();
//!
//! assert_eq!(decoded.operate_code(), OperateCode::ReadStatusOfChannels);
//! assert_eq!(decoded.target(), DeviceAddress::new(1, 72));
//! ```

mod codec;

pub use codec::{MAX_PAYLOAD_LEN, MIN_FRAME_LEN, TelegramCodec, crc16};

use std::fmt;
use std::net::SocketAddr;

use crate::error::ValueError;
use crate::types::{DeviceAddress, DeviceType, OperateCode};

/// One protocol message exchanged with the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    source: DeviceAddress,
    source_device_type: DeviceType,
    target: DeviceAddress,
    operate_code: OperateCode,
    payload: Vec<u8>,
    peer: Option<SocketAddr>,
}

impl Telegram {
    /// Creates a telegram sent by a controller.
    ///
    /// An [`OperateCode::Other`] holding the value of a named code is
    /// stored as that named code.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::PayloadTooLong` if the payload does not fit in a
    /// single frame, and `ValueError::PayloadTooShort` if it is shorter than
    /// the operate code requires.
    pub fn new(
        source: DeviceAddress,
        target: DeviceAddress,
        operate_code: OperateCode,
        payload: Vec<u8>,
    ) -> Result<Self, ValueError> {
        let operate_code = operate_code.normalized();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ValueError::PayloadTooLong(payload.len()));
        }
        let min = operate_code.min_payload_len();
        if payload.len() < min {
            return Err(ValueError::PayloadTooShort {
                operate_code,
                min,
                actual: payload.len(),
            });
        }
        Ok(Self::from_parts(source, target, operate_code, payload))
    }

    /// Builds a telegram whose payload is known to be valid for its code.
    pub(crate) fn from_parts(
        source: DeviceAddress,
        target: DeviceAddress,
        operate_code: OperateCode,
        payload: Vec<u8>,
    ) -> Self {
        let operate_code = operate_code.normalized();
        debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);
        debug_assert!(payload.len() >= operate_code.min_payload_len());
        Self {
            source,
            source_device_type: DeviceType::CONTROLLER,
            target,
            operate_code,
            payload,
            peer: None,
        }
    }

    /// Sets the device type of the sender.
    #[must_use]
    pub fn with_device_type(mut self, device_type: DeviceType) -> Self {
        self.source_device_type = device_type;
        self
    }

    /// Sets the socket address the frame arrived from or is sent to.
    #[must_use]
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Returns the address of the sending module.
    #[must_use]
    pub fn source(&self) -> DeviceAddress {
        self.source
    }

    /// Returns the device type of the sending module.
    #[must_use]
    pub fn source_device_type(&self) -> DeviceType {
        self.source_device_type
    }

    /// Returns the address of the receiving module.
    #[must_use]
    pub fn target(&self) -> DeviceAddress {
        self.target
    }

    /// Returns the operate code.
    #[must_use]
    pub fn operate_code(&self) -> OperateCode {
        self.operate_code
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the network endpoint of the frame, if known.
    #[must_use]
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} {} [",
            self.source, self.source_device_type, self.target, self.operate_code
        )?;
        for (i, byte) in self.payload.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        f.write_str("]")
    }
}
