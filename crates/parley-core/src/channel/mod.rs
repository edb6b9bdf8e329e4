mod handle;
mod payload;
mod resolver;
mod route;

pub use {
    handle::{
        Capabilities, ChannelHandle, ChannelRef, ClientProvider, ClientRef, MessagingChannel,
        MessagingClient, SdkError, URI_SPLIT_SIGNATURES, UserProfile,
    },
    payload::{
        Attachment, FileUpload, MessagePayload, MessageReceipt, UploadResponse,
        extension_for_mime,
    },
    resolver::{ChannelResolver, ChannelSource},
    route::{CALL_ROUTE_PREFIX, CHAT_ROUTE_PREFIX, channel_id_from_route},
};

/// Channel type used for one-to-one conversations.
pub const MESSAGING_CHANNEL_KIND: &str = "messaging";
