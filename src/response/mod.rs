// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interpretation of response telegrams.
//!
//! Each type here reads the payload of one family of response telegrams.
//! Parsing returns `None` for a telegram of another operate code or with a
//! payload the type cannot interpret; devices ignore such telegrams.

mod channel;
mod curtain;

pub use channel::{ChannelResponse, ChannelStatusReport};
pub use curtain::CurtainReport;
