use std::collections::BTreeMap;
use std::sync::Arc;

use upsprims_protocol::ControlCommand;

use crate::command::CommandResponse;
use crate::error::{CommandError, RegistryError};
use crate::exchange::Exchanger;
use crate::link::Link;
use crate::poller::Poller;

/// Pollers keyed by device id, owned by whoever composes the system.
///
/// Control commands are routed through [`Registry::send_command`]; the key
/// may be omitted while exactly one device is registered.
#[derive(Debug)]
pub struct Registry<L = Exchanger> {
    devices: BTreeMap<String, Arc<Poller<L>>>,
}

impl<L> Default for Registry<L> {
    fn default() -> Self {
        Self {
            devices: BTreeMap::new(),
        }
    }
}

impl<L: Link> Registry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a poller under `id`. Ids are unique.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        poller: Poller<L>,
    ) -> Result<Arc<Poller<L>>, RegistryError> {
        let id = id.into();
        if self.devices.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        let poller = Arc::new(poller);
        self.devices.insert(id, Arc::clone(&poller));
        Ok(poller)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Poller<L>>> {
        self.devices.get(id)
    }

    /// Look up a device by key, or the only device when `key` is `None`.
    pub fn resolve(&self, key: Option<&str>) -> Result<&Arc<Poller<L>>, RegistryError> {
        match key {
            Some(id) => self
                .devices
                .get(id)
                .ok_or_else(|| RegistryError::Unknown(id.to_string())),
            None => {
                let mut devices = self.devices.values();
                match (devices.next(), devices.next()) {
                    (Some(only), None) => Ok(only),
                    (None, _) => Err(RegistryError::Empty),
                    (Some(_), Some(_)) => Err(RegistryError::Ambiguous(self.devices.len())),
                }
            }
        }
    }

    /// Route a control command to the selected device.
    pub fn send_command(
        &self,
        key: Option<&str>,
        command: &ControlCommand,
    ) -> Result<CommandResponse, CommandError> {
        self.resolve(key)?.send_command(command)
    }

    /// Devices in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Poller<L>>)> {
        self.devices.iter().map(|(id, poller)| (id.as_str(), poller))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
