/// Commands for the main thread's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Leave the event loop and exit.
    Shutdown,
}
