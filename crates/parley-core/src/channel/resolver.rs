use crate::{
    channel::{
        CHAT_ROUTE_PREFIX, ChannelHandle, ChannelRef, MESSAGING_CHANNEL_KIND,
        channel_id_from_route,
    },
    session::ConnectionState,
};

use std::sync::Arc;

use tracing::{debug, instrument};

/// Where a resolution candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSource {
    /// Supplied by the caller.
    Explicit,
    /// Direct shared channel reference.
    Direct,
    /// Active channel recorded against the cached client.
    ClientScoped,
    /// Rebuilt from the current route against the cached client.
    Route,
}

/// Locates a usable channel from the caller, the shared connection state, or
/// the current route, in that order.
#[derive(Clone)]
pub struct ChannelResolver {
    state: Arc<ConnectionState>,
    route: Option<String>,
}

impl ChannelResolver {
    /// Resolver reading from `state`, with no route.
    pub fn new(state: Arc<ConnectionState>) -> Self {
        Self { state, route: None }
    }

    /// Set the current route path (e.g. `/chat/<channel-id>`).
    pub fn with_route(mut self, path: impl Into<String>) -> Self {
        self.route = Some(path.into());
        self
    }

    /// Replace the current route path.
    pub fn set_route(&mut self, path: Option<String>) {
        self.route = path;
    }

    /// Resolve a channel able to carry voice messages (message + file upload).
    ///
    /// `None` means no delivery is possible; callers must not retry.
    #[instrument(skip_all)]
    pub fn resolve(&self, explicit: Option<ChannelRef>) -> Option<ChannelHandle> {
        self.resolve_where(explicit, ChannelHandle::is_full)
    }

    /// Resolve a channel able to send text messages.
    #[instrument(skip_all)]
    pub fn resolve_for_text(&self, explicit: Option<ChannelRef>) -> Option<ChannelHandle> {
        self.resolve_where(explicit, ChannelHandle::can_send_message)
    }

    fn resolve_where(
        &self,
        explicit: Option<ChannelRef>,
        accept: fn(&ChannelHandle) -> bool,
    ) -> Option<ChannelHandle> {
        let snapshot = self.state.snapshot();

        let candidates = [
            (ChannelSource::Explicit, explicit),
            (ChannelSource::Direct, snapshot.direct_channel.clone()),
            (
                ChannelSource::ClientScoped,
                snapshot.client_active_channel.clone(),
            ),
        ];

        for (source, candidate) in candidates {
            if let Some(handle) = candidate.and_then(|channel| Self::accept(source, channel, accept))
            {
                return Some(handle);
            }
        }

        let channel_id = self
            .route
            .as_deref()
            .and_then(|path| channel_id_from_route(path, CHAT_ROUTE_PREFIX))?;
        let client = snapshot.client?;

        debug!(channel_id, "Rebuilding channel from route");
        let channel = client.channel(MESSAGING_CHANNEL_KIND, channel_id, &[]);

        Self::accept(ChannelSource::Route, channel, accept)
    }

    fn accept(
        source: ChannelSource,
        channel: ChannelRef,
        accept: fn(&ChannelHandle) -> bool,
    ) -> Option<ChannelHandle> {
        match ChannelHandle::classify(channel) {
            Some(handle) if accept(&handle) => {
                debug!(?source, channel = ?handle, "Channel resolved");
                Some(handle)
            }
            other => {
                debug!(?source, channel = ?other, "Channel candidate rejected");
                None
            }
        }
    }
}
