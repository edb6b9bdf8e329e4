//! Messaging platform contract and typed channel handles.
//!
//! The platform SDK is an external collaborator: the traits here describe the
//! surface this crate depends on, and [`ChannelHandle`] turns the capability
//! set a channel reports into a typed variant once, at resolution time, so
//! call sites never probe for operations themselves.

use crate::channel::{FileUpload, MessagePayload, MessageReceipt, UploadResponse};

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error messages emitted by channels whose asset URI handling is broken.
///
/// Uploads failing with one of these are retried through the single-asset
/// upload operation instead of being degraded to text.
pub const URI_SPLIT_SIGNATURES: [&str; 3] = [
    "split is not a function",
    "uri.split is not a function",
    "e.split is not a function",
];

/// Failure reported by the messaging platform SDK.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The channel does not expose the requested operation.
    #[error("{operation} is not supported by this channel")]
    Unsupported {
        /// Name of the missing operation.
        operation: &'static str,
    },

    /// The operation was attempted and failed.
    #[error("{message}")]
    Failed {
        /// Message reported by the platform.
        message: String,
    },
}

impl SdkError {
    /// Build a [`SdkError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        SdkError::Failed {
            message: message.into(),
        }
    }

    /// Whether this failure carries the broken URI handling signature.
    pub fn has_uri_split_signature(&self) -> bool {
        match self {
            SdkError::Failed { message } => URI_SPLIT_SIGNATURES
                .iter()
                .any(|signature| message.contains(signature)),
            SdkError::Unsupported { .. } => false,
        }
    }
}

/// Operations a channel object actually exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `send_message` is callable.
    pub send_message: bool,
    /// `send_file` is callable.
    pub send_file: bool,
    /// `send_image` is callable.
    pub send_image: bool,
}

impl Capabilities {
    /// Message and file upload, without the single-asset fallback.
    pub const FULL: Capabilities = Capabilities {
        send_message: true,
        send_file: true,
        send_image: false,
    };
}

/// A messaging channel provided by the platform SDK.
///
/// Optional operations default to [`SdkError::Unsupported`]; implementors
/// must keep [`MessagingChannel::capabilities`] consistent with what they
/// override.
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Channel identifier.
    fn id(&self) -> &str;

    /// Operations this channel object exposes.
    fn capabilities(&self) -> Capabilities;

    /// Subscribe to the channel so its state is materialized.
    async fn watch(&self) -> Result<(), SdkError>;

    /// Send a message to the channel.
    async fn send_message(&self, _payload: MessagePayload) -> Result<MessageReceipt, SdkError> {
        Err(SdkError::Unsupported {
            operation: "send_message",
        })
    }

    /// Upload a file as a form payload.
    async fn send_file(&self, _upload: FileUpload) -> Result<UploadResponse, SdkError> {
        Err(SdkError::Unsupported {
            operation: "send_file",
        })
    }

    /// Upload a single asset through the image endpoint.
    async fn send_image(&self, _upload: FileUpload) -> Result<UploadResponse, SdkError> {
        Err(SdkError::Unsupported {
            operation: "send_image",
        })
    }
}

/// Shared, non-owning reference to a channel.
pub type ChannelRef = Arc<dyn MessagingChannel>;

/// Identity presented when connecting to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Realtime connection to the messaging platform.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Identifier of the user this connection is authenticated as.
    fn connected_user(&self) -> Option<String>;

    /// Authenticate the connection.
    async fn connect_user(&self, user: &UserProfile, token: &str) -> Result<(), SdkError>;

    /// Get or create a channel handle. Does not contact the server.
    fn channel(&self, kind: &str, id: &str, members: &[String]) -> ChannelRef;
}

/// Shared reference to a client connection.
pub type ClientRef = Arc<dyn MessagingClient>;

/// Source of client connections, one per API key.
pub trait ClientProvider: Send + Sync {
    /// Return the client instance for `api_key`.
    fn instance(&self, api_key: &str) -> ClientRef;
}

/// A channel classified by the operations it exposes.
#[derive(Clone)]
pub enum ChannelHandle {
    /// Can send messages and upload files.
    Full(ChannelRef),
    /// Can upload files but not send messages.
    UploadOnly(ChannelRef),
    /// Can send messages but not upload files.
    MessageOnly(ChannelRef),
}

impl ChannelHandle {
    /// Classify a channel, or `None` if it can neither send nor upload.
    pub fn classify(channel: ChannelRef) -> Option<Self> {
        let caps = channel.capabilities();

        match (caps.send_message, caps.send_file) {
            (true, true) => Some(ChannelHandle::Full(channel)),
            (false, true) => Some(ChannelHandle::UploadOnly(channel)),
            (true, false) => Some(ChannelHandle::MessageOnly(channel)),
            (false, false) => None,
        }
    }

    /// The underlying channel.
    pub fn channel(&self) -> &ChannelRef {
        match self {
            ChannelHandle::Full(channel)
            | ChannelHandle::UploadOnly(channel)
            | ChannelHandle::MessageOnly(channel) => channel,
        }
    }

    /// Channel identifier.
    pub fn id(&self) -> &str {
        self.channel().id()
    }

    /// Exposes both message send and file upload.
    pub fn is_full(&self) -> bool {
        matches!(self, ChannelHandle::Full(_))
    }

    /// Can send messages.
    pub fn can_send_message(&self) -> bool {
        matches!(self, ChannelHandle::Full(_) | ChannelHandle::MessageOnly(_))
    }

    /// Can upload through `send_file`.
    pub fn can_upload_file(&self) -> bool {
        matches!(self, ChannelHandle::Full(_) | ChannelHandle::UploadOnly(_))
    }

    /// Can upload through `send_image`.
    pub fn can_upload_image(&self) -> bool {
        self.channel().capabilities().send_image
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ChannelHandle::Full(_) => "Full",
            ChannelHandle::UploadOnly(_) => "UploadOnly",
            ChannelHandle::MessageOnly(_) => "MessageOnly",
        }
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.variant_name()).field(&self.id()).finish()
    }
}
