// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device state changes.
//!
//! Every device keeps an [`ObserverRegistry`]. Observers are notified after
//! each state mutation, whether the new value was assumed when a command
//! was issued or reported by the module.
//!
//! # Usage
//!
//! ```no_run
//! use buspro_lib::{Gateway, GatewayConfig};
//! use buspro_lib::types::ChannelAddress;
//!
//! # async fn example() -> buspro_lib::Result<()> {
//! let config = GatewayConfig::new("192.168.1.15:6000".parse().unwrap());
//! let gateway = Gateway::from_config(&config)?;
//! let light = gateway.add_light(ChannelAddress::new(1, 72, 3), "Kitchen")?;
//!
//! let sub_id = light.on_state_changed(|change| {
//!     println!("{} is now {:?}", change.address(), change.state());
//! });
//!
//! // Later, unsubscribe
//! light.unsubscribe(sub_id);
//! # Ok(())
//! # }
//! ```

mod callback;

pub use callback::{ObserverRegistry, SubscriptionId};
