//! Chat session bootstrap with bounded retry.
//!
//! Establishes (or reuses) the platform connection, materializes the
//! one-to-one channel and publishes it to the shared [`ConnectionState`] so the
//! resolver can find it from any component.

use crate::{
    ChatError, CoreResult,
    channel::{
        ChannelHandle, ChannelRef, ClientProvider, ClientRef, MESSAGING_CHANNEL_KIND, SdkError,
        UserProfile,
    },
    notify::Notifier,
    session::{ConnectionState, derive_channel_id},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Connection attempts before giving up.
pub const MAX_CONNECT_ATTEMPTS: u32 = 3;

/// Delay between connection attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(1);

const CONNECT_FAILED_MESSAGE: &str = "Could not connect to chat. Please try again.";

/// Retry policy for [`SessionBootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSettings {
    /// Attempts before surfacing a connection error. At least one is made.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_CONNECT_ATTEMPTS,
            retry_delay: CONNECT_RETRY_DELAY,
        }
    }
}

/// Credentials and identity for a chat session.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    /// Platform API key.
    pub api_key: String,
    /// User to connect as.
    pub user: UserProfile,
    /// Platform token for `user`.
    pub token: String,
}

/// Establishes chat sessions and owns writes to the shared connection state.
pub struct SessionBootstrap {
    provider: Arc<dyn ClientProvider>,
    state: Arc<ConnectionState>,
    notifier: Arc<dyn Notifier>,
    settings: BootstrapSettings,
}

impl SessionBootstrap {
    /// Create a bootstrap publishing into `state`.
    pub fn new(
        provider: Arc<dyn ClientProvider>,
        state: Arc<ConnectionState>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            state,
            notifier,
            settings: BootstrapSettings::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_settings(mut self, settings: BootstrapSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shared connection state this bootstrap writes to.
    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.state
    }

    /// Connect and materialize the channel shared with `peer_id`.
    ///
    /// Reuses the cached client and never re-authenticates a connected
    /// identity. On exhaustion the user is notified and the connection state is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Connection`] once every attempt has failed.
    #[instrument(skip(self, params), fields(user_id = %params.user.id))]
    pub async fn establish(
        &self,
        params: &ConnectionParams,
        peer_id: &str,
    ) -> CoreResult<ChannelHandle> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut client = self.state.client();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.attempt(&mut client, params, peer_id).await {
                Ok((client, handle)) => {
                    self.state.publish(client, Arc::clone(handle.channel()));

                    info!(
                        channel_id = %handle.id(),
                        attempt,
                        "Chat session established"
                    );

                    return Ok(handle);
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "Connection attempt failed");

                    if attempt >= max_attempts {
                        self.notifier.error(CONNECT_FAILED_MESSAGE);

                        return Err(ChatError::Connection {
                            attempts: attempt,
                            reason: e.to_string(),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }

                    tokio::time::sleep(self.settings.retry_delay).await;
                }
            }
        }
    }

    /// Release the chat screen's channel. The connection stays cached so the
    /// next screen does not re-authenticate.
    #[instrument(skip(self))]
    pub fn unmount(&self) {
        self.state.clear_channel();
        info!("Chat session unmounted");
    }

    async fn attempt(
        &self,
        cached: &mut Option<ClientRef>,
        params: &ConnectionParams,
        peer_id: &str,
    ) -> Result<(ClientRef, ChannelHandle), SdkError> {
        let client = match cached.clone() {
            Some(client) => client,
            None => {
                let client = self.provider.instance(&params.api_key);
                *cached = Some(Arc::clone(&client));
                client
            }
        };

        match client.connected_user() {
            None => {
                client.connect_user(&params.user, &params.token).await?;
                debug!("User connected");
            }
            Some(user_id) if user_id == params.user.id => {
                debug!("Reusing connected client");
            }
            Some(user_id) => {
                return Err(SdkError::failed(format!(
                    "client already connected as {}",
                    user_id
                )));
            }
        }

        let channel_id = derive_channel_id(&params.user.id, peer_id);
        let members = [params.user.id.clone(), peer_id.to_string()];
        let channel: ChannelRef = client.channel(MESSAGING_CHANNEL_KIND, &channel_id, &members);

        channel.watch().await?;
        debug!(channel_id = %channel_id, "Channel watched");

        let handle = ChannelHandle::classify(channel)
            .ok_or_else(|| SdkError::failed("channel exposes no messaging operations"))?;

        Ok((client, handle))
    }
}
