//! In-process publish/subscribe between the creation form and the table.
//!
//! Delivery is synchronous and in publish order. Payloads are copied through
//! JSON so a handler never holds a reference into the publisher's state.
//! Nothing is retained: a handler only sees messages published while it is
//! subscribed.

use std::{
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::{Arc, PoisonError, RwLock, Weak},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{domain::Student, protocol::STUDENT_CREATED_CHANNEL};
use thiserror::Error;
use tracing::{debug, warn};

pub const STUDENT_CREATED: Channel<Student> = Channel::new(STUDENT_CREATED_CHANNEL);

/// A named channel carrying payloads of type `T`.
pub struct Channel<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Channel<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Channel<T> {}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Channel").field(&self.name).finish()
    }
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to encode payload for channel {channel}: {source}")]
    Encode {
        channel: &'static str,
        source: serde_json::Error,
    },
}

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    channels: HashMap<&'static str, Vec<(u64, Handler)>>,
}

#[derive(Clone, Default)]
pub struct MessageBus {
    registry: Arc<RwLock<Registry>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every handler currently subscribed to `channel`
    /// and returns how many were reached.
    pub fn publish<T: Serialize>(&self, channel: &Channel<T>, payload: &T) -> Result<usize, BusError> {
        let value = serde_json::to_value(payload).map_err(|source| BusError::Encode {
            channel: channel.name,
            source,
        })?;

        // Snapshot the handlers so one of them may subscribe or unsubscribe
        // without deadlocking on the registry.
        let handlers: Vec<Handler> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .channels
                .get(channel.name)
                .map(|entries| entries.iter().map(|(_, handler)| handler.clone()).collect())
                .unwrap_or_default()
        };

        debug!(
            "bus: publish channel={} subscribers={}",
            channel.name,
            handlers.len()
        );
        for handler in &handlers {
            handler(&value);
        }
        Ok(handlers.len())
    }

    /// Registers `handler` until the returned [`Subscription`] is dropped.
    pub fn subscribe<T, F>(&self, channel: &Channel<T>, handler: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let channel_name = channel.name;
        let handler: Handler = Arc::new(move |value: &Value| {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(payload) => handler(payload),
                Err(err) => warn!("bus: dropping undecodable payload channel={channel_name}: {err}"),
            }
        });

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .channels
            .entry(channel_name)
            .or_default()
            .push((id, handler));

        Subscription {
            id,
            channel: channel_name,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count<T>(&self, channel: &Channel<T>) -> usize {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        registry.channels.get(channel.name).map_or(0, Vec::len)
    }
}

/// Keeps a handler registered. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    channel: &'static str,
    registry: Weak<RwLock<Registry>>,
}

impl Subscription {
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = registry.channels.get_mut(self.channel) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                registry.channels.remove(self.channel);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/bus_tests.rs"]
mod tests;
