//! A small websocket chat platform the bot can run against.
//!
//! Clients connect at `/login`, identify as a [`Member`], then send commands
//! and chat. Everything that happens in a channel is broadcast to every
//! connected client as a [`GatewayEvent`].

mod client;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use protocol::{Content, GatewayEvent, Member};
use tokio::net::TcpListener;
use tokio::sync::mpsc::Sender;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::game::Request;
use crate::transport::{ChannelKind, ChatTransport, TransportError, TransportResult};
use crate::types::*;

pub use client::Client;

/// Who may run the staff commands.
#[derive(Debug, Clone, Default)]
pub struct StaffPolicy {
    pub staff_role: Option<RoleId>,
}

impl StaffPolicy {
    /// Administrators, members who can kick, and holders of the staff role.
    pub fn permits(&self, member: &Member) -> bool {
        member.administrator
            || member.kick_members
            || self
                .staff_role
                .map_or(false, |role| member.roles.contains(&role))
    }
}

struct ChannelEntry {
    kind: ChannelKind,
    messages: HashSet<MessageId>,
}

pub struct Gateway {
    play_channel: ChannelId,
    channels: RwLock<HashMap<ChannelId, ChannelEntry>>,
    events: broadcast::Sender<GatewayEvent>,
    next_id: AtomicU64,
}

impl Gateway {
    pub fn new(play_channel: ChannelId) -> Self {
        let (events, _) = broadcast::channel(256);
        let mut channels = HashMap::new();
        channels.insert(
            play_channel,
            ChannelEntry {
                kind: ChannelKind::Text,
                messages: HashSet::new(),
            },
        );
        Self {
            play_channel,
            channels: RwLock::new(channels),
            events,
            next_id: AtomicU64::new(play_channel.0 + 1),
        }
    }

    pub fn play_channel(&self) -> ChannelId {
        self.play_channel
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: GatewayEvent) {
        // no listeners is fine
        let _ = self.events.send(event);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Relays a member's chat line. Only the bot's own messages are tracked,
    /// since nothing else can be edited or deleted through the gateway.
    pub async fn post(&self, author: UserId, channel: ChannelId, text: String) -> TransportResult<MessageId> {
        if !self.channels.read().await.contains_key(&channel) {
            return Err(TransportError::UnknownChannel(channel));
        }
        let message = MessageId(self.next_id());
        self.publish(GatewayEvent::MessagePosted {
            channel,
            message,
            author: Some(author),
            content: Content::Text(text),
        });
        Ok(message)
    }

    #[cfg(test)]
    async fn tracked(&self, channel: ChannelId) -> usize {
        self.channels
            .read()
            .await
            .get(&channel)
            .map_or(0, |entry| entry.messages.len())
    }
}

#[async_trait]
impl ChatTransport for Gateway {
    async fn create_thread(&self, parent: ChannelId, name: &str) -> TransportResult<ChannelId> {
        let mut channels = self.channels.write().await;
        match channels.get(&parent).map(|entry| entry.kind) {
            Some(ChannelKind::Text) => {}
            Some(ChannelKind::Thread { .. }) => {
                return Err(TransportError::Rejected("threads cannot be nested".to_string()))
            }
            None => return Err(TransportError::UnknownChannel(parent)),
        }
        let thread = ChannelId(self.next_id());
        channels.insert(
            thread,
            ChannelEntry {
                kind: ChannelKind::Thread { parent },
                messages: HashSet::new(),
            },
        );
        self.publish(GatewayEvent::ThreadCreated {
            parent,
            thread,
            name: name.to_string(),
        });
        Ok(thread)
    }

    async fn send_message(&self, channel: ChannelId, content: Content) -> TransportResult<MessageId> {
        let message = MessageId(self.next_id());
        self.channels
            .write()
            .await
            .get_mut(&channel)
            .ok_or(TransportError::UnknownChannel(channel))?
            .messages
            .insert(message);
        self.publish(GatewayEvent::MessagePosted {
            channel,
            message,
            author: None,
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
        let channels = self.channels.read().await;
        let entry = channels
            .get(&channel)
            .ok_or(TransportError::UnknownChannel(channel))?;
        if !entry.messages.contains(&message) {
            return Err(TransportError::UnknownMessage { channel, message });
        }
        self.publish(GatewayEvent::MessageEdited {
            channel,
            message,
            content,
        });
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> TransportResult<()> {
        let mut channels = self.channels.write().await;
        let entry = channels
            .get_mut(&channel)
            .ok_or(TransportError::UnknownChannel(channel))?;
        if !entry.messages.remove(&message) {
            return Err(TransportError::UnknownMessage { channel, message });
        }
        self.publish(GatewayEvent::MessageDeleted { channel, message });
        Ok(())
    }

    async fn delete_thread(&self, thread: ChannelId, reason: &str) -> TransportResult<()> {
        let mut channels = self.channels.write().await;
        match channels.get(&thread).map(|entry| entry.kind) {
            Some(ChannelKind::Thread { .. }) => {}
            Some(ChannelKind::Text) => {
                return Err(TransportError::Rejected(format!("{} is not a thread", thread)))
            }
            None => return Err(TransportError::UnknownChannel(thread)),
        }
        channels.remove(&thread);
        self.publish(GatewayEvent::ThreadDeleted {
            thread,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn fetch_channel(&self, channel: ChannelId) -> TransportResult<ChannelKind> {
        self.channels
            .read()
            .await
            .get(&channel)
            .map(|entry| entry.kind)
            .ok_or(TransportError::UnknownChannel(channel))
    }
}

/// Accepts websocket clients until the listener fails.
pub async fn serve(
    listener: TcpListener,
    gateway: Arc<Gateway>,
    game_tx: Sender<Request>,
    staff: StaffPolicy,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "gateway listening");
    loop {
        let (stream, addr) = listener.accept().await?;
        let gateway = gateway.clone();
        let game_tx = game_tx.clone();
        let staff = staff.clone();
        tokio::spawn(async move {
            if let Err(e) = client::serve_connection(stream, gateway, game_tx, staff).await {
                warn!(%addr, error = %e, "connection ended with an error");
            }
        });
    }
}
