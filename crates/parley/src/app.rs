use crate::{AppCommand, AppResult, UiCommand};

use parley_core::{
    CallKind, ChannelResolver, ConnectionParams, RecorderInput, SessionBootstrap,
    send_call_invite,
};

use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Runs on the async runtime thread. Exit is signalled back to the main
/// thread through `ui_proxy` because the event loop must stay on the UI
/// thread.
pub struct App {
    pub(crate) bootstrap: SessionBootstrap,
    pub(crate) params: ConnectionParams,
    pub(crate) peer_id: String,
    pub(crate) web_origin: String,
    pub(crate) recorder_tx: mpsc::Sender<RecorderInput>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) ui_proxy: Option<EventLoopProxy<UiCommand>>,
}

impl App {
    /// Establish the chat session, then dispatch commands until shutdown.
    #[instrument(skip(self), fields(peer_id = %self.peer_id))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Parley starting");

        // A failed bootstrap is already reported to the user; the recorder
        // keeps running and reports the missing channel on send.
        if let Err(e) = self.bootstrap.establish(&self.params, &self.peer_id).await {
            error!(error = %e, "Chat session unavailable");
        }

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AppCommand::Record(input) => {
                    if let Err(e) = self.recorder_tx.send(input).await {
                        error!(error = ?e, "Voice recorder is no longer running");
                    }
                }
                AppCommand::StartCall { kind } => {
                    if let Err(e) = self.start_call(kind).await {
                        error!(error = ?e, "Failed to start call");
                    }
                }
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        let _ = self.shutdown_tx.send(true);
        self.bootstrap.unmount();

        if let Some(proxy) = &self.ui_proxy {
            if proxy.send_event(UiCommand::Shutdown).is_err() {
                warn!("Event loop already closed");
            }
        }

        info!("Parley shut down successfully");

        Ok(())
    }

    /// Post a call invite to the active channel and open the call screen.
    ///
    /// Returns the call URL, or `None` when no channel is available.
    #[instrument(skip(self))]
    pub(crate) async fn start_call(&self, kind: CallKind) -> AppResult<Option<String>> {
        let resolver = ChannelResolver::new(self.bootstrap.state().clone());

        let Some(channel) = resolver.resolve(None) else {
            warn!("No chat channel to start a call in");
            return Ok(None);
        };

        let url = send_call_invite(&channel, &self.web_origin, kind).await?;

        if let Err(e) = open::that(&url) {
            warn!(error = %e, url = %url, "Failed to open call screen");
        }

        Ok(Some(url))
    }
}
