use crate::channel::{ChannelRef, ClientRef};

use std::{fmt, sync::RwLock};

use tracing::{debug, error};

/// Immutable view of the shared connection state.
#[derive(Clone, Default)]
pub struct ConnectionSnapshot {
    /// Cached client connection.
    pub client: Option<ClientRef>,
    /// Direct reference to the active channel.
    pub direct_channel: Option<ChannelRef>,
    /// Active channel recorded against the cached client.
    pub client_active_channel: Option<ChannelRef>,
    /// Identifier of the authoritative active channel.
    pub active_channel_id: Option<String>,
}

impl fmt::Debug for ConnectionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSnapshot")
            .field("client", &self.client.as_ref().map(|c| c.connected_user()))
            .field("direct_channel", &self.direct_channel.as_ref().map(|c| c.id()))
            .field(
                "client_active_channel",
                &self.client_active_channel.as_ref().map(|c| c.id()),
            )
            .field("active_channel_id", &self.active_channel_id)
            .finish()
    }
}

/// Connection context shared by every component needing channel discovery.
///
/// Writes go through [`crate::SessionBootstrap`] only; readers receive
/// snapshots and must re-validate channel capabilities before use. The
/// active channel slot is last-writer-wins since a single chat screen is
/// mounted at a time.
#[derive(Default)]
pub struct ConnectionState {
    slots: RwLock<ConnectionSnapshot>,
}

impl ConnectionState {
    /// Empty state: no client, no channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of every slot.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.slots
            .read()
            .unwrap_or_else(|e| {
                error!("Connection state lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .clone()
    }

    /// Cached client connection, if any.
    pub fn client(&self) -> Option<ClientRef> {
        self.snapshot().client
    }

    /// Identifier of the active channel, if any.
    pub fn active_channel_id(&self) -> Option<String> {
        self.snapshot().active_channel_id
    }

    /// Publish a client and its active channel to both discovery slots.
    pub(crate) fn publish(&self, client: ClientRef, channel: ChannelRef) {
        let channel_id = channel.id().to_string();

        self.write(|slots| {
            slots.client = Some(client);
            slots.direct_channel = Some(channel.clone());
            slots.client_active_channel = Some(channel);
            slots.active_channel_id = Some(channel_id.clone());
        });

        debug!(channel_id = %channel_id, "Active channel published");
    }

    /// Clear the channel slots. The client connection is kept for reuse.
    pub(crate) fn clear_channel(&self) {
        self.write(|slots| {
            slots.direct_channel = None;
            slots.client_active_channel = None;
            slots.active_channel_id = None;
        });

        debug!("Active channel cleared");
    }

    pub(crate) fn write(&self, update: impl FnOnce(&mut ConnectionSnapshot)) {
        let mut slots = self.slots.write().unwrap_or_else(|e| {
            error!("Connection state lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        update(&mut slots);
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionState")
            .field(&self.snapshot())
            .finish()
    }
}
