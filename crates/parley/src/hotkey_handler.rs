//! Global hotkey handler.
//!
//! CTRL+SHIFT+Space is the hold-to-record key: its press and release feed the
//! recorder's gesture controller the way a pointer would. CTRL+SHIFT+Enter and
//! CTRL+SHIFT+Backspace send or discard a kept preview, and CTRL+SHIFT+V
//! invites the peer to a video call.

use crate::{AppCommand, AppError, AppResult};

use parley_core::{CallKind, PointerEvent, RecorderInput};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Ids of the registered hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyIds {
    /// Hold to record.
    pub record: u32,
    /// Send the kept preview.
    pub send: u32,
    /// Discard the kept preview.
    pub discard: u32,
    /// Start a video call.
    pub call: u32,
}

/// Translates global hotkey events into application commands.
pub struct HotkeyHandler {
    ids: HotkeyIds,
    record_held: bool,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register every parley hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkeys to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkeys() -> AppResult<(GlobalHotKeyManager, HotkeyIds)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let modifiers = Some(Modifiers::CONTROL | Modifiers::SHIFT);
        let bindings = [
            ("CTRL+SHIFT+Space", HotKey::new(modifiers, Code::Space)),
            ("CTRL+SHIFT+Enter", HotKey::new(modifiers, Code::Enter)),
            ("CTRL+SHIFT+Backspace", HotKey::new(modifiers, Code::Backspace)),
            ("CTRL+SHIFT+V", HotKey::new(modifiers, Code::KeyV)),
        ];

        for (label, hotkey) in &bindings {
            manager
                .register(*hotkey)
                .map_err(|e| AppError::HotkeyRegistrationFailed {
                    reason: format!("Failed to register {}: {}", label, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            info!(hotkey = label, "Global hotkey registered");
        }

        let [record, send, discard, call] = bindings.map(|(_, hotkey)| hotkey.id());

        Ok((
            manager,
            HotkeyIds {
                record,
                send,
                discard,
                call,
            },
        ))
    }

    /// Create a handler for previously registered hotkeys.
    ///
    /// This struct is `Send` and can live on any thread; it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(ids: HotkeyIds, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            ids,
            record_held: false,
            command_tx,
        }
    }

    /// Whether the record key is currently held.
    pub fn is_record_held(&self) -> bool {
        self.record_held
    }

    /// Run the hotkey handler event loop until shutdown is signalled.
    #[instrument(skip(self))]
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking forwarder; it exits once event_rx is
        // dropped and the next blocking_send fails.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!(record_held = self.is_record_held(), "Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(event.id, event.state).await?;
                }
            }
        }

        drop(event_rx);

        // The forwarder may be parked in recv() until the next key event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Forward the command for one hotkey event.
    ///
    /// The held state only changes once the command has been delivered, so a
    /// closed channel never leaves the handler believing the key is down.
    #[instrument(skip(self))]
    pub async fn handle_event(&mut self, id: u32, state: HotKeyState) -> AppResult<()> {
        let Some((command, held)) = self.translate(id, state) else {
            return Ok(());
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.record_held = held;
        debug!(?command, "Hotkey command sent");

        Ok(())
    }

    /// Command for an event plus the record key's resulting held state.
    ///
    /// Auto-repeated presses of a held record key are ignored.
    pub fn translate(&self, id: u32, state: HotKeyState) -> Option<(AppCommand, bool)> {
        let held = self.record_held;

        if id == self.ids.record {
            return match (state, held) {
                (HotKeyState::Pressed, false) => Some((
                    AppCommand::Record(RecorderInput::Pointer(PointerEvent::Press { y: 0.0 })),
                    true,
                )),
                (HotKeyState::Released, true) => Some((
                    AppCommand::Record(RecorderInput::Pointer(PointerEvent::Release)),
                    false,
                )),
                _ => None,
            };
        }

        if state != HotKeyState::Pressed {
            return None;
        }

        let command = if id == self.ids.send {
            AppCommand::Record(RecorderInput::Send)
        } else if id == self.ids.discard {
            AppCommand::Record(RecorderInput::Discard)
        } else if id == self.ids.call {
            AppCommand::StartCall {
                kind: CallKind::Video,
            }
        } else {
            return None;
        };

        Some((command, held))
    }
}
