// SPDX-FileCopyrightText: 2026 Adrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport adapter for deterministic testing.
//!
//! `MockTransport` implements `Transport` with captured sends, deletes, and
//! notices for assertion in tests, plus injectable per-operation failures.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use adrelay_core::traits::adapter::PluginAdapter;
use adrelay_core::traits::transport::Transport;
use adrelay_core::types::{AdapterType, HealthStatus, MediaItem, SourceRef};
use adrelay_core::RelayError;

/// A forwarded-by-reference send captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRecord {
    pub to_chat: i64,
    pub source: SourceRef,
    pub message_id: i32,
}

/// A media-group send captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaGroupRecord {
    pub to_chat: i64,
    pub media: Vec<MediaItem>,
    pub caption: Option<String>,
    pub message_ids: Vec<i32>,
}

/// A mock messaging transport for testing.
///
/// Captures every operation; `set_fail_sends(true)` makes forward and
/// media-group sends fail, `set_fail_deletes(true)` makes retractions fail.
/// An optional `on_send` hook fires before each send, letting tests flip
/// control state mid-batch.
pub struct MockTransport {
    forwards: Arc<Mutex<Vec<ForwardRecord>>>,
    media_groups: Arc<Mutex<Vec<MediaGroupRecord>>>,
    deletes: Arc<Mutex<Vec<(i64, i32)>>>,
    notices: Arc<Mutex<Vec<(i64, String)>>>,
    fail_sends: AtomicBool,
    fail_deletes: AtomicBool,
    next_message_id: AtomicI32,
    on_send: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl MockTransport {
    /// Create a new mock transport with empty capture buffers.
    pub fn new() -> Self {
        Self {
            forwards: Arc::new(Mutex::new(Vec::new())),
            media_groups: Arc::new(Mutex::new(Vec::new())),
            deletes: Arc::new(Mutex::new(Vec::new())),
            notices: Arc::new(Mutex::new(Vec::new())),
            fail_sends: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            next_message_id: AtomicI32::new(1000),
            on_send: Mutex::new(None),
        }
    }

    /// All forwarded-by-reference sends so far.
    pub async fn forwards(&self) -> Vec<ForwardRecord> {
        self.forwards.lock().await.clone()
    }

    /// All media-group sends so far.
    pub async fn media_groups(&self) -> Vec<MediaGroupRecord> {
        self.media_groups.lock().await.clone()
    }

    /// All retractions so far, as (chat_id, message_id) pairs.
    pub async fn deletes(&self) -> Vec<(i64, i32)> {
        self.deletes.lock().await.clone()
    }

    /// All operator notices so far.
    pub async fn notices(&self) -> Vec<(i64, String)> {
        self.notices.lock().await.clone()
    }

    /// Total count of send operations (forwards + media groups).
    pub async fn send_count(&self) -> usize {
        self.forwards.lock().await.len() + self.media_groups.lock().await.len()
    }

    /// Make subsequent forward/media-group sends fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent delete_message calls fail.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Install a hook fired before every send attempt.
    pub async fn set_on_send(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_send.lock().await = Some(Box::new(hook));
    }

    async fn fire_on_send(&self) {
        if let Some(hook) = self.on_send.lock().await.as_ref() {
            hook();
        }
    }

    fn next_id(&self) -> i32 {
        self.next_message_id.fetch_add(1, Ordering::SeqCst)
    }

    fn send_error(&self, what: &str) -> RelayError {
        RelayError::Transport {
            message: format!("mock {what} failure"),
            source: None,
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn forward_message(&self, to_chat: i64, source: &SourceRef) -> Result<i32, RelayError> {
        self.fire_on_send().await;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(self.send_error("forward"));
        }
        let message_id = self.next_id();
        self.forwards.lock().await.push(ForwardRecord {
            to_chat,
            source: *source,
            message_id,
        });
        Ok(message_id)
    }

    async fn send_media_group(
        &self,
        to_chat: i64,
        media: &[MediaItem],
        caption: Option<&str>,
    ) -> Result<Vec<i32>, RelayError> {
        self.fire_on_send().await;
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(self.send_error("media group"));
        }
        let message_ids: Vec<i32> = media.iter().map(|_| self.next_id()).collect();
        self.media_groups.lock().await.push(MediaGroupRecord {
            to_chat,
            media: media.to_vec(),
            caption: caption.map(|s| s.to_string()),
            message_ids: message_ids.clone(),
        });
        Ok(message_ids)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), RelayError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(self.send_error("delete"));
        }
        self.deletes.lock().await.push((chat_id, message_id));
        Ok(())
    }

    async fn send_notice(&self, chat_id: i64, text: &str) -> Result<i32, RelayError> {
        let message_id = self.next_id();
        self.notices.lock().await.push((chat_id, text.to_string()));
        Ok(message_id)
    }
}
