// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! Every device channel holds a [`ChannelState`]: `Unknown` until the first
//! value is seen, then `Known` together with the [`UpdateOrigin`] of that
//! value. A value assumed when a command is issued is *optimistic*; a value
//! reported by the module is *authoritative* and always overwrites it.
//!
//! # Examples
//!
//! ```
//! use buspro_lib::state::{ChannelState, UpdateOrigin};
//! use buspro_lib::types::Level;
//!
//! let mut state = ChannelState::Unknown;
//! assert!(!state.is_known());
//!
//! // A command was issued
//! state.update(Level::clamped(80), UpdateOrigin::Optimistic);
//! assert_eq!(state.origin(), Some(UpdateOrigin::Optimistic));
//!
//! // The module reported a different level
//! state.update(Level::clamped(60), UpdateOrigin::Authoritative);
//! assert_eq!(state.value(), Some(Level::clamped(60)));
//! assert_eq!(state.origin(), Some(UpdateOrigin::Authoritative));
//! ```

mod channel_state;
mod device_state;
mod state_change;

pub use channel_state::{ChannelState, UpdateOrigin};
pub use device_state::{CoverState, DeviceState};
pub use state_change::StateChange;
