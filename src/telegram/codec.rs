// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary frame encoding and decoding.
//!
//! ```text
//! offset  size  field
//!      0     4  sender IPv4 address
//!      4    10  "HDLMIRACLE"
//!     14     2  0xAA 0xAA
//!     16     1  length (11 + payload length)
//!     17     2  source subnet, source device
//!     19     2  source device type (big endian)
//!     21     2  operate code (big endian)
//!     23     2  target subnet, target device
//!     25     n  payload
//!   25+n     2  CRC-16/XMODEM over length..payload (big endian)
//! ```

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::MalformedFrame;
use crate::telegram::Telegram;
use crate::types::{DeviceAddress, DeviceType, OperateCode};

const MARKER: &[u8; 10] = b"HDLMIRACLE";
const LEADER: [u8; 2] = [0xAA, 0xAA];

/// Bytes before the length byte.
const PREFIX_LEN: usize = 4 + MARKER.len() + LEADER.len();

/// Length byte, addresses, device type, operate code and CRC.
const CONTENT_OVERHEAD: usize = 11;

/// Size of a frame with an empty payload.
pub const MIN_FRAME_LEN: usize = PREFIX_LEN + CONTENT_OVERHEAD;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - CONTENT_OVERHEAD;

/// Stateless encoder and decoder for Buspro frames.
///
/// The codec holds only the IPv4 address written in the frame header of
/// outbound telegrams, so one instance can be shared freely between tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramCodec {
    origin_ip: Ipv4Addr,
}

impl TelegramCodec {
    /// Creates a codec that stamps `origin_ip` in outbound frames.
    #[must_use]
    pub const fn new(origin_ip: Ipv4Addr) -> Self {
        Self { origin_ip }
    }

    /// Returns the IPv4 address written in outbound frames.
    #[must_use]
    pub const fn origin_ip(&self) -> Ipv4Addr {
        self.origin_ip
    }

    /// Encodes a telegram into a frame.
    #[must_use]
    pub fn encode(&self, telegram: &Telegram) -> Vec<u8> {
        let payload = telegram.payload();
        let content_len = CONTENT_OVERHEAD + payload.len();

        let mut frame = Vec::with_capacity(PREFIX_LEN + content_len);
        frame.extend_from_slice(&self.origin_ip.octets());
        frame.extend_from_slice(MARKER);
        frame.extend_from_slice(&LEADER);

        // Telegram construction bounds the payload to MAX_PAYLOAD_LEN.
        #[allow(clippy::cast_possible_truncation)]
        let length = content_len as u8;
        frame.push(length);
        frame.push(telegram.source().subnet());
        frame.push(telegram.source().device());
        frame.extend_from_slice(&telegram.source_device_type().value().to_be_bytes());
        frame.extend_from_slice(&telegram.operate_code().to_u16().to_be_bytes());
        frame.push(telegram.target().subnet());
        frame.push(telegram.target().device());
        frame.extend_from_slice(payload);

        let crc = crc16(&frame[PREFIX_LEN..]);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame
    }

    /// Decodes a received frame.
    ///
    /// `peer` is the socket address the datagram arrived from; it becomes the
    /// telegram's network metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFrame`] if the frame is truncated, lacks its
    /// header marker, fails the checksum, or carries a payload shorter than
    /// its operate code requires.
    pub fn decode(&self, data: &[u8], peer: SocketAddr) -> Result<Telegram, MalformedFrame> {
        if data.len() < MIN_FRAME_LEN {
            return Err(MalformedFrame::TooShort {
                min: MIN_FRAME_LEN,
                actual: data.len(),
            });
        }
        if &data[4..14] != MARKER || data[14..16] != LEADER {
            return Err(MalformedFrame::MissingMarker);
        }

        let declared = usize::from(data[PREFIX_LEN]);
        let available = data.len() - PREFIX_LEN;
        if declared < CONTENT_OVERHEAD || declared > available {
            return Err(MalformedFrame::LengthMismatch {
                declared,
                available,
            });
        }

        let content = &data[PREFIX_LEN..PREFIX_LEN + declared];
        let (body, trailer) = content.split_at(declared - 2);
        let received = u16::from_be_bytes([trailer[0], trailer[1]]);
        let computed = crc16(body);
        if received != computed {
            return Err(MalformedFrame::ChecksumMismatch { received, computed });
        }

        let source = DeviceAddress::new(body[1], body[2]);
        let device_type = DeviceType::new(u16::from_be_bytes([body[3], body[4]]));
        let operate_code = OperateCode::from_u16(u16::from_be_bytes([body[5], body[6]]));
        let target = DeviceAddress::new(body[7], body[8]);
        let payload = &body[9..];

        let min = operate_code.min_payload_len();
        if payload.len() < min {
            return Err(MalformedFrame::PayloadTooShort {
                operate_code,
                min,
                actual: payload.len(),
            });
        }

        Ok(
            Telegram::from_parts(source, target, operate_code, payload.to_vec())
                .with_device_type(device_type)
                .with_peer(peer),
        )
    }
}

impl Default for TelegramCodec {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED)
    }
}

/// CRC-16/XMODEM (polynomial 0x1021, initial value 0) used by the bus.
///
/// ```
/// assert_eq!(buspro_lib::telegram::crc16(b"123456789"), 0x31C3);
/// ```
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        let mut crc = crc ^ (u16::from(byte) << 8);
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
        crc
    })
}
