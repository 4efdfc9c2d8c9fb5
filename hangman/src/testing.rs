//! An in-memory [`ChatTransport`] that records every call, for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use protocol::Content;

use crate::transport::{ChannelKind, ChatTransport, TransportError, TransportResult};
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateThread { parent: ChannelId, name: String, thread: ChannelId },
    Send { channel: ChannelId, message: MessageId, content: Content },
    Edit { channel: ChannelId, message: MessageId, content: Content },
    Delete { channel: ChannelId, message: MessageId },
    DeleteThread { thread: ChannelId, reason: String },
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    calls: Vec<Call>,
    threads: HashMap<ChannelId, ChannelId>,
    deleted: HashSet<ChannelId>,
    fail_threads: bool,
    fail_edits: bool,
}

#[derive(Default)]
pub struct MemoryTransport {
    inner: Mutex<Inner>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes `create_thread` fail until switched back.
    pub fn fail_threads(&self, fail: bool) {
        self.lock().fail_threads = fail;
    }

    /// Makes `edit_message` fail until switched back.
    pub fn fail_edits(&self, fail: bool) {
        self.lock().fail_edits = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Texts posted to `channel`, oldest first.
    pub fn texts(&self, channel: ChannelId) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Send { channel: c, content, .. } if *c == channel => {
                    content.text().map(str::to_string)
                }
                _ => None,
            })
            .collect()
    }

    pub fn threads(&self) -> Vec<ChannelId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateThread { thread, .. } => Some(*thread),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_threads(&self) -> Vec<ChannelId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::DeleteThread { thread, .. } => Some(*thread),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_messages(&self) -> Vec<MessageId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Delete { message, .. } => Some(*message),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self, message: MessageId) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Edit { message: m, .. } if *m == message))
            .count()
    }
}

#[async_trait]
impl ChatTransport for MemoryTransport {
    async fn create_thread(&self, parent: ChannelId, name: &str) -> TransportResult<ChannelId> {
        let mut inner = self.lock();
        if inner.fail_threads {
            return Err(TransportError::Rejected("missing permissions".to_string()));
        }
        inner.next_id += 1;
        let thread = ChannelId(1_000 + inner.next_id);
        inner.threads.insert(thread, parent);
        inner.calls.push(Call::CreateThread {
            parent,
            name: name.to_string(),
            thread,
        });
        Ok(thread)
    }

    async fn send_message(&self, channel: ChannelId, content: Content) -> TransportResult<MessageId> {
        let mut inner = self.lock();
        if inner.deleted.contains(&channel) {
            return Err(TransportError::UnknownChannel(channel));
        }
        inner.next_id += 1;
        let message = MessageId(1_000 + inner.next_id);
        inner.calls.push(Call::Send {
            channel,
            message,
            content,
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: Content,
    ) -> TransportResult<()> {
        let mut inner = self.lock();
        if inner.fail_edits {
            return Err(TransportError::UnknownMessage { channel, message });
        }
        inner.calls.push(Call::Edit {
            channel,
            message,
            content,
        });
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> TransportResult<()> {
        self.lock().calls.push(Call::Delete { channel, message });
        Ok(())
    }

    async fn delete_thread(&self, thread: ChannelId, reason: &str) -> TransportResult<()> {
        let mut inner = self.lock();
        if !inner.threads.contains_key(&thread) || !inner.deleted.insert(thread) {
            return Err(TransportError::UnknownChannel(thread));
        }
        inner.calls.push(Call::DeleteThread {
            thread,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn fetch_channel(&self, channel: ChannelId) -> TransportResult<ChannelKind> {
        let inner = self.lock();
        if inner.deleted.contains(&channel) {
            return Err(TransportError::UnknownChannel(channel));
        }
        Ok(match inner.threads.get(&channel) {
            Some(parent) => ChannelKind::Thread { parent: *parent },
            None => ChannelKind::Text,
        })
    }
}
