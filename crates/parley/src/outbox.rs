//! Filesystem-backed messaging transport.
//!
//! Lets the desktop client run without the hosted chat service. Each channel
//! is a directory under the outbox root: uploads are copied into `uploads/`
//! and every message is appended to `messages.jsonl`.

use crate::{AppError, AppResult};

use parley_core::{
    Capabilities, ChannelRef, ClientProvider, ClientRef, FileUpload, MessagePayload,
    MessageReceipt, MessagingChannel, MessagingClient, SdkError, UploadResponse, UserProfile,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// File every channel appends its messages to.
pub const MESSAGES_FILE: &str = "messages.jsonl";

/// Directory uploads are copied into.
pub const UPLOADS_DIR: &str = "uploads";

/// One line of `messages.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxRecord {
    /// Message id.
    pub id: String,
    /// Author, if the client was connected.
    pub user_id: Option<String>,
    /// When the message was written.
    pub created_at: DateTime<Utc>,
    /// Message body.
    #[serde(flatten)]
    pub message: MessagePayload,
}

/// Client whose channels live under a local directory.
#[derive(Debug)]
pub struct LocalOutbox {
    root: PathBuf,
    connected: Mutex<Option<String>>,
}

impl LocalOutbox {
    /// Create an outbox rooted at `root`. Nothing is written until connect.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            connected: Mutex::new(None),
        }
    }

    /// Create an outbox rooted at `root`, making sure the directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::OutboxUnavailable`] if `root` cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();

        if let Err(source) = tokio::fs::create_dir_all(&root).await {
            return Err(AppError::OutboxUnavailable {
                root,
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(root = ?root, "Outbox opened");

        Ok(Self::new(root))
    }

    /// Directory holding every channel.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MessagingClient for LocalOutbox {
    fn connected_user(&self) -> Option<String> {
        self.connected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    #[instrument(skip(self, _token), fields(user_id = %user.id))]
    async fn connect_user(&self, user: &UserProfile, _token: &str) -> Result<(), SdkError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SdkError::failed(format!("Failed to open outbox: {}", e)))?;

        *self.connected.lock().unwrap_or_else(|e| e.into_inner()) = Some(user.id.clone());

        info!(root = ?self.root(), "Connected to local outbox");

        Ok(())
    }

    fn channel(&self, kind: &str, id: &str, members: &[String]) -> ChannelRef {
        debug!(kind, channel_id = id, ?members, "Opening outbox channel");

        Arc::new(OutboxChannel {
            id: id.to_string(),
            dir: self.root.join(kind).join(id),
            user_id: self.connected_user(),
        })
    }
}

/// Hands out one shared [`LocalOutbox`] for every API key.
pub struct OutboxProvider {
    client: Arc<LocalOutbox>,
}

impl OutboxProvider {
    /// Provider over `client`.
    pub fn new(client: Arc<LocalOutbox>) -> Self {
        Self { client }
    }
}

impl ClientProvider for OutboxProvider {
    fn instance(&self, _api_key: &str) -> ClientRef {
        Arc::clone(&self.client) as ClientRef
    }
}

/// One conversation directory.
#[derive(Debug)]
pub struct OutboxChannel {
    id: String,
    dir: PathBuf,
    user_id: Option<String>,
}

impl OutboxChannel {
    fn uploads_dir(&self) -> PathBuf {
        self.dir.join(UPLOADS_DIR)
    }
}

#[async_trait]
impl MessagingChannel for OutboxChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    async fn watch(&self) -> Result<(), SdkError> {
        tokio::fs::create_dir_all(self.uploads_dir())
            .await
            .map_err(|e| SdkError::failed(format!("Failed to open channel directory: {}", e)))
    }

    #[instrument(skip_all, fields(channel_id = %self.id))]
    async fn send_message(&self, payload: MessagePayload) -> Result<MessageReceipt, SdkError> {
        let record = OutboxRecord {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            created_at: Utc::now(),
            message: payload,
        };

        let mut line = serde_json::to_string(&record)
            .map_err(|e| SdkError::failed(format!("Failed to encode message: {}", e)))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(MESSAGES_FILE))
            .await
            .map_err(|e| SdkError::failed(format!("Failed to open message log: {}", e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SdkError::failed(format!("Failed to append message: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| SdkError::failed(format!("Failed to flush message log: {}", e)))?;

        debug!(message_id = %record.id, "Message appended");

        Ok(MessageReceipt {
            message_id: record.id,
        })
    }

    #[instrument(skip_all, fields(channel_id = %self.id, file_name = %upload.file_name))]
    async fn send_file(&self, upload: FileUpload) -> Result<UploadResponse, SdkError> {
        let file_name = Path::new(&upload.file_name)
            .file_name()
            .ok_or_else(|| SdkError::failed("Upload has no file name"))?;
        let path = self.uploads_dir().join(file_name);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| SdkError::failed(format!("Failed to store upload: {}", e)))?;

        debug!(path = ?path, size = upload.bytes.len(), "Upload stored");

        Ok(UploadResponse {
            file: format!("file://{}", path.display()),
        })
    }
}
