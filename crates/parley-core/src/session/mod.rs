mod bootstrap;
mod call;
mod channel_id;
mod connection_state;

pub use {
    bootstrap::{
        BootstrapSettings, CONNECT_RETRY_DELAY, ConnectionParams, MAX_CONNECT_ATTEMPTS,
        SessionBootstrap,
    },
    call::{CallKind, call_url, send_call_invite},
    channel_id::{CHANNEL_ID_SEPARATOR, derive_channel_id},
    connection_state::{ConnectionSnapshot, ConnectionState},
};
