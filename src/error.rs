// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Buspro library.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, frame decoding, UDP transport, device commands and
//! configuration loading.
//!
//! Only connection establishment failures are meant to reach the application
//! as errors. Codec and transport failures are contained by the network
//! interface and device layers, which log them and report a `bool`.

use std::net::SocketAddr;

use thiserror::Error;

use crate::types::{ChannelAddress, DeviceAddress, OperateCode};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A received frame could not be decoded.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] MalformedFrame),

    /// Error occurred in the UDP transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred during a device operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No device is registered at the given address.
    #[error("no device registered at {0}")]
    DeviceNotFound(ChannelAddress),

    /// A device is already registered at the given address.
    #[error("a device is already registered at {0}")]
    DuplicateDevice(ChannelAddress),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },

    /// A telegram payload does not fit in a single frame.
    #[error("payload of {0} bytes does not fit in a frame")]
    PayloadTooLong(usize),

    /// A telegram payload is shorter than its operate code requires.
    #[error("{operate_code} needs a payload of at least {min} bytes, got {actual}")]
    PayloadTooShort {
        /// Operate code of the telegram.
        operate_code: OperateCode,
        /// Minimum payload length for the code.
        min: usize,
        /// Length that was provided.
        actual: usize,
    },

    /// An address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Structural decoding failures of a received frame.
///
/// Callers drop the frame and continue; a malformed frame is never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedFrame {
    /// The datagram is shorter than the smallest possible frame.
    #[error("frame of {actual} bytes is shorter than the {min} byte minimum")]
    TooShort {
        /// Minimum frame size.
        min: usize,
        /// Received size.
        actual: usize,
    },

    /// The fixed header marker is absent.
    #[error("frame header marker is missing")]
    MissingMarker,

    /// The length byte disagrees with the datagram size.
    #[error("length byte declares {declared} bytes but {available} are available")]
    LengthMismatch {
        /// Length declared in the frame.
        declared: usize,
        /// Bytes available after the header.
        available: usize,
    },

    /// The CRC trailer does not match the frame content.
    #[error("checksum mismatch: frame carries {received:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum carried by the frame.
        received: u16,
        /// Checksum computed over the frame content.
        computed: u16,
    },

    /// The payload is shorter than its operate code requires.
    #[error("{operate_code} needs at least {min} payload bytes, got {actual}")]
    PayloadTooShort {
        /// Operate code of the frame.
        operate_code: OperateCode,
        /// Minimum payload length for this operate code.
        min: usize,
        /// Received payload length.
        actual: usize,
    },
}

/// Errors related to the UDP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The receive endpoint could not be opened.
    #[error("could not bind {address}: {source}")]
    Unavailable {
        /// Address the transport tried to bind.
        address: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The endpoint did not become ready within the startup grace period.
    #[error("endpoint {address} not ready after {timeout_ms} ms")]
    StartupTimeout {
        /// Address the transport tried to bind.
        address: SocketAddr,
        /// Grace period in milliseconds.
        timeout_ms: u64,
    },

    /// A send was attempted before `start` or after `stop`.
    #[error("transport is not started")]
    NotStarted,

    /// A send did not complete within its deadline.
    #[error("send timed out after {0} ms")]
    SendTimeout(u64),

    /// The socket reported an error while sending.
    #[error("send failed: {0}")]
    SendFailed(#[from] std::io::Error),
}

/// Errors related to device commands.
///
/// Device command methods report these through logs and return `false`;
/// recovery is a status read, never a resend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The command telegram could not be sent.
    #[error("command to {0} could not be sent")]
    SendFailed(ChannelAddress),

    /// No matching response was observed before the deadline.
    #[error("no response from {address} within {waited_ms} ms")]
    ConfirmationTimeout {
        /// Address of the device.
        address: ChannelAddress,
        /// Time waited in milliseconds.
        waited_ms: u64,
    },

    /// The action does not apply to this kind of device.
    #[error("{action} is not supported by {address}")]
    UnsupportedAction {
        /// Address of the device.
        address: ChannelAddress,
        /// Name of the rejected action.
        action: &'static str,
    },
}

/// Errors related to loading a gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source address is not usable as a sender.
    #[error("source address {0} is a broadcast address")]
    InvalidSource(DeviceAddress),

    /// A device entry is invalid.
    #[error("invalid device entry {name:?}: {message}")]
    InvalidDevice {
        /// Name of the device entry.
        name: String,
        /// Description of the problem.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
