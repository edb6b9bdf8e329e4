mod bootstrap_config;
mod chat_config;
#[allow(clippy::module_inception)]
mod config;
mod delivery_config;
mod identity_config;
mod recorder_config;

pub(crate) use {
    bootstrap_config::BootstrapConfig, chat_config::ChatConfig, config::Config,
    delivery_config::DeliveryConfig, identity_config::IdentityConfig,
    recorder_config::RecorderConfig,
};

pub(crate) const DEFAULT_WEB_ORIGIN: &str = "http://localhost:3000";
pub(crate) const DEFAULT_AUTO_SEND: bool = true;

pub(crate) fn default_web_origin() -> String {
    DEFAULT_WEB_ORIGIN.to_string()
}

pub(crate) fn default_auto_send() -> bool {
    DEFAULT_AUTO_SEND
}

pub(crate) fn default_hold_threshold_ms() -> u64 {
    parley_core::HOLD_THRESHOLD.as_millis() as u64
}

pub(crate) fn default_swipe_cancel_distance() -> f32 {
    parley_core::SWIPE_CANCEL_DISTANCE
}

pub(crate) fn default_max_attempts() -> u32 {
    parley_core::MAX_CONNECT_ATTEMPTS
}

pub(crate) fn default_retry_delay_ms() -> u64 {
    parley_core::CONNECT_RETRY_DELAY.as_millis() as u64
}
