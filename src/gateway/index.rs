// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device lookup and telegram routing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::device::{Cover, Light};
use crate::error::Error;
use crate::protocol::Transport;
use crate::response::CurtainReport;
use crate::state::{DeviceState, StateChange};
use crate::subscription::SubscriptionId;
use crate::telegram::Telegram;
use crate::types::{ChannelAddress, DeviceAddress, OperateCode};

/// A registered device of any kind.
pub(crate) enum DeviceHandle<T: Transport> {
    Light(Arc<Light<T>>),
    Cover(Arc<Cover<T>>),
}

impl<T: Transport> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Light(light) => Self::Light(Arc::clone(light)),
            Self::Cover(cover) => Self::Cover(Arc::clone(cover)),
        }
    }
}

impl<T: Transport> DeviceHandle<T> {
    pub(crate) fn address(&self) -> ChannelAddress {
        match self {
            Self::Light(light) => light.address(),
            Self::Cover(cover) => cover.address(),
        }
    }

    pub(crate) fn current_state(&self) -> Option<DeviceState> {
        match self {
            Self::Light(light) => light.current_state(),
            Self::Cover(cover) => cover.current_state(),
        }
    }

    pub(crate) fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        match self {
            Self::Light(light) => light.on_state_changed(callback),
            Self::Cover(cover) => cover.on_state_changed(callback),
        }
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self {
            Self::Light(light) => light.unsubscribe(id),
            Self::Cover(cover) => cover.unsubscribe(id),
        }
    }

    pub(crate) async fn read_status(&self) -> bool {
        match self {
            Self::Light(light) => light.read_status().await,
            Self::Cover(cover) => cover.read_status().await,
        }
    }

    fn status_query(&self) -> &Telegram {
        match self {
            Self::Light(light) => light.status_query(),
            Self::Cover(cover) => cover.status_query(),
        }
    }

    fn schedule_refresh(&self) {
        match self {
            Self::Light(light) => light.schedule_refresh(),
            Self::Cover(cover) => cover.schedule_refresh(),
        }
    }

    fn handle_telegram(&self, telegram: &Telegram) {
        match self {
            Self::Light(light) => light.handle_telegram(telegram),
            Self::Cover(cover) => cover.handle_telegram(telegram),
        }
    }
}

/// Keeps one device per distinct status query.
///
/// Every light of a module is answered by the same channel report, so one
/// read covers them all.
fn status_readers<'a, T, I>(devices: I) -> Vec<DeviceHandle<T>>
where
    T: Transport,
    I: IntoIterator<Item = &'a DeviceHandle<T>>,
{
    let mut readers: Vec<DeviceHandle<T>> = Vec::new();
    for device in devices {
        if !readers
            .iter()
            .any(|reader| reader.status_query() == device.status_query())
        {
            readers.push(device.clone());
        }
    }
    readers
}

/// Which channels of the sending module a telegram concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// One channel.
    Channel(u8),
    /// Every channel of the module.
    Module,
    /// State changed out of band; the module must be read again.
    Refresh,
    /// No device state is carried.
    Ignore,
}

fn route(telegram: &Telegram) -> Route {
    match telegram.operate_code() {
        OperateCode::SingleChannelControlResponse => telegram
            .payload()
            .first()
            .map_or(Route::Ignore, |&channel| Route::Channel(channel)),
        OperateCode::CurtainSwitchControlResponse
        | OperateCode::ReadStatusOfCurtainSwitchResponse => CurtainReport::parse(telegram)
            .map_or(Route::Ignore, |report| Route::Channel(report.curtain())),
        OperateCode::ReadStatusOfChannelsResponse => Route::Module,
        OperateCode::SceneControlResponse => Route::Refresh,
        _ => Route::Ignore,
    }
}

/// Devices keyed by module address, then channel.
///
/// A telegram reaches only the devices of the module that sent it. A
/// channel report reaches one device; a module-wide report reaches every
/// device of the module. A scene response triggers one status read per
/// distinct query of the module. Unknown modules and channels are ignored.
pub(crate) struct DeviceIndex<T: Transport> {
    modules: RwLock<HashMap<DeviceAddress, BTreeMap<u8, DeviceHandle<T>>>>,
}

impl<T: Transport> DeviceIndex<T> {
    pub(crate) fn new() -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateDevice` if the channel is taken.
    pub(crate) fn insert(&self, device: DeviceHandle<T>) -> Result<(), Error> {
        let address = device.address();
        let mut modules = self.modules.write();
        let channels = modules.entry(address.module()).or_default();
        if channels.contains_key(&address.channel()) {
            return Err(Error::DuplicateDevice(address));
        }
        channels.insert(address.channel(), device);
        Ok(())
    }

    pub(crate) fn get(&self, address: ChannelAddress) -> Option<DeviceHandle<T>> {
        self.modules
            .read()
            .get(&address.module())
            .and_then(|channels| channels.get(&address.channel()))
            .cloned()
    }

    /// Returns every device.
    pub(crate) fn all(&self) -> Vec<DeviceHandle<T>> {
        self.modules
            .read()
            .values()
            .flat_map(|channels| channels.values().cloned())
            .collect()
    }

    /// Returns one device per distinct status query.
    pub(crate) fn status_readers(&self) -> Vec<DeviceHandle<T>> {
        self.modules
            .read()
            .values()
            .flat_map(|channels| status_readers(channels.values()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.read().values().map(BTreeMap::len).sum()
    }

    /// Hands a telegram to the devices it concerns.
    pub(crate) fn dispatch(&self, telegram: &Telegram) {
        let routing = route(telegram);
        let targets: Vec<DeviceHandle<T>> = {
            let modules = self.modules.read();
            let Some(channels) = modules.get(&telegram.source()) else {
                return;
            };
            match routing {
                Route::Channel(channel) => channels.get(&channel).cloned().into_iter().collect(),
                Route::Module => channels.values().cloned().collect(),
                Route::Refresh => status_readers(channels.values()),
                Route::Ignore => return,
            }
        };

        if targets.is_empty() {
            tracing::debug!(telegram = %telegram, "No device for telegram");
        }
        for device in targets {
            if routing == Route::Refresh {
                device.schedule_refresh();
            } else {
                device.handle_telegram(telegram);
            }
        }
    }
}
