//! Parley: desktop chat client with hold-to-record voice messages.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod outbox;
#[cfg(test)]
mod tests;
mod ui_command;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::{HotkeyHandler, HotkeyIds},
    outbox::{LocalOutbox, OutboxProvider},
    ui_command::UiCommand,
};

use crate::config::Config;

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use parley_core::{
    ChannelResolver, ConnectionParams, ConnectionState, CpalCapture, DeliveryPipeline,
    GestureController, LogNotifier, Notifier, RecordingStateMachine, SessionBootstrap,
    VoiceRecorder,
};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILTER: &str = "parley=debug,parley_core=debug";

/// Console plus daily rolling file logging. The guard flushes the file
/// writer and must outlive the event loop.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match Config::log_dir() {
        Ok(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, "parley.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            registry.init();
            error!(error = ?e, "File logging disabled");
            None
        }
    }
}

/// Application entry point.
fn main() {
    let log_guard = init_tracing();

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // Persists across event loop iterations; dropping it unregisters the hotkeys.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(UiCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Registered on the main thread: tao's event loop pumps the
                // Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_ids) = match HotkeyHandler::register_hotkeys() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkeys: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let ui_proxy = ui_proxy.clone();

                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(run_services(config, hotkey_ids, ui_proxy));
                });
            }
            _ => {}
        }

        // Keep hotkey_manager and the log writer alive for the app's lifetime.
        let _ = (&hotkey_manager, &log_guard);
    });
}

/// Wire the chat session, recorder and hotkeys, then run them to completion.
async fn run_services(
    config: Config,
    hotkey_ids: HotkeyIds,
    ui_proxy: tao::event_loop::EventLoopProxy<UiCommand>,
) {
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());
    let state = Arc::new(ConnectionState::new());

    let outbox = match LocalOutbox::open(config.chat.outbox_dir.clone()).await {
        Ok(outbox) => Arc::new(outbox),
        Err(e) => {
            error!(error = %e, "Cannot start without an outbox");
            let _ = ui_proxy.send_event(UiCommand::Shutdown);
            return;
        }
    };
    let bootstrap = SessionBootstrap::new(
        Arc::new(OutboxProvider::new(outbox)),
        Arc::clone(&state),
        Arc::clone(&notifier),
    )
    .with_settings(config.bootstrap.settings());

    let recorder = VoiceRecorder::new(
        GestureController::new(config.recorder.gesture_settings()),
        RecordingStateMachine::new(Arc::new(CpalCapture::new()), Arc::clone(&notifier)),
        ChannelResolver::new(Arc::clone(&state)),
        DeliveryPipeline::new(Arc::clone(&notifier)),
        notifier,
    )
    .with_auto_send(config.delivery.auto_send);

    let (command_tx, command_rx) = mpsc::channel(32);
    let (recorder_tx, recorder_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let hotkey_handler = HotkeyHandler::new(hotkey_ids, command_tx.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = command_tx.send(AppCommand::Shutdown).await;
        }
    });

    let app = App {
        bootstrap,
        params: ConnectionParams {
            api_key: config.identity.api_key.clone(),
            user: config.identity.profile(),
            token: config.identity.token.clone(),
        },
        peer_id: config.chat.peer_id.clone(),
        web_origin: config.chat.web_origin.clone(),
        recorder_tx,
        command_rx,
        shutdown_tx,
        ui_proxy: Some(ui_proxy),
    };

    let hotkey_shutdown = shutdown_rx.clone();

    tokio::join!(
        async {
            if let Err(e) = hotkey_handler.run(hotkey_shutdown).await {
                error!(error = ?e, "Hotkey handler error");
            }
        },
        recorder.run(recorder_rx, shutdown_rx),
        async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        }
    );
}
