// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel level responses from relay and dimmer modules.

use crate::telegram::Telegram;
use crate::types::{Level, OperateCode};

/// Result flag a module sets when a channel command succeeded.
const SUCCESS_FLAG: u8 = 0xF8;

/// A module's answer to a single channel command.
///
/// # Examples
///
/// ```
/// use buspro_lib::response::ChannelResponse;
/// use buspro_lib::telegram::Telegram;
/// use buspro_lib::types::{DeviceAddress, OperateCode};
///
/// let telegram = Telegram::new(
///     DeviceAddress::new(1, 72),
///     DeviceAddress::new(200, 200),
///     OperateCode::SingleChannelControlResponse,
///     vec![3, 0xF8, 80],
/// )
/// .unwrap();
///
/// let response = ChannelResponse::parse(&telegram).unwrap();
/// assert_eq!(response.channel(), 3);
/// assert_eq!(response.level().value(), 80);
/// assert!(response.succeeded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelResponse {
    channel: u8,
    succeeded: bool,
    level: Level,
}

impl ChannelResponse {
    /// Reads a single channel control response.
    #[must_use]
    pub fn parse(telegram: &Telegram) -> Option<Self> {
        if telegram.operate_code() != OperateCode::SingleChannelControlResponse {
            return None;
        }
        match telegram.payload() {
            [channel, flag, level, ..] => Some(Self {
                channel: *channel,
                succeeded: *flag == SUCCESS_FLAG,
                level: Level::clamped(*level),
            }),
            _ => None,
        }
    }

    /// Returns the channel the response is about.
    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Returns `true` if the module accepted the command.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Returns the level the channel now has.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }
}

/// A module's report of the level of all its channels.
///
/// The payload is a channel count followed by one level byte per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatusReport {
    levels: Vec<Level>,
}

impl ChannelStatusReport {
    /// Reads a status-of-channels response.
    ///
    /// A count larger than the bytes present is truncated to what was
    /// actually received.
    #[must_use]
    pub fn parse(telegram: &Telegram) -> Option<Self> {
        if telegram.operate_code() != OperateCode::ReadStatusOfChannelsResponse {
            return None;
        }
        let (count, rest) = telegram.payload().split_first()?;
        let levels = rest
            .iter()
            .take(usize::from(*count))
            .map(|&level| Level::clamped(level))
            .collect();
        Some(Self { levels })
    }

    /// Returns the number of channels reported.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns the level of a channel (numbered from 1).
    ///
    /// Returns `None` for channel 0 or a channel beyond the reported count.
    #[must_use]
    pub fn level(&self, channel: u8) -> Option<Level> {
        let index = usize::from(channel).checked_sub(1)?;
        self.levels.get(index).copied()
    }
}
