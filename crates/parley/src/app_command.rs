use parley_core::{CallKind, RecorderInput};

/// Commands sent from the hotkey handler to the main application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Forward input to the voice recorder.
    Record(RecorderInput),
    /// Invite the peer to a call.
    StartCall {
        /// Video or voice.
        kind: CallKind,
    },
    /// Request application shutdown.
    Shutdown,
}
