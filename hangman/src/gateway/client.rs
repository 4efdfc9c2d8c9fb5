use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use protocol::{BinCodeMessage, ClientRequest, Command, GatewayEvent, Member};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::handshake::server::Callback as HsCallback;
use tokio_tungstenite::tungstenite::handshake::server::ErrorResponse as HsError;
use tokio_tungstenite::tungstenite::handshake::server::Request as HsReq;
use tokio_tungstenite::tungstenite::handshake::server::Response as HsResp;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, info};

use super::{Gateway, StaffPolicy};
use crate::consts::*;
use crate::game::Request;
use crate::types::*;

/// Only `/login` is served.
struct Login;

impl HsCallback for Login {
    fn on_request(self, req: &HsReq, resp: HsResp) -> Result<HsResp, HsError> {
        if req.uri().path() == "/login" {
            Ok(resp)
        } else {
            Err(HsError::new(Some("PathError".to_string())))
        }
    }
}

/// One identified connection: a writer task fed through `ws_from_gateway_tx`,
/// a heartbeat, and a feed of every gateway event.
#[derive(Debug)]
pub struct Client {
    pub(crate) member: Member,

    pub(crate) ws_from_gateway_tx: mpsc::Sender<WsMsg>,

    pub(crate) _tx_handle: JoinHandle<()>,
    pub(crate) _ping_handle: JoinHandle<()>,
    pub(crate) _feed_handle: JoinHandle<()>,
}

impl Client {
    pub(crate) fn new(
        member: Member,
        mut ws_tx: WsTx,
        mut events: broadcast::Receiver<GatewayEvent>,
    ) -> Self {
        let (ws_from_gateway_tx, mut ws_from_gateway_rx) = mpsc::channel::<WsMsg>(128);

        let tx_ping = ws_from_gateway_tx.clone();
        let _ping_handle = tokio::spawn(async move {
            loop {
                if tx_ping.send(WsMsg::Ping(Vec::new())).await.is_err() {
                    break;
                }
                time::sleep(HB_DURATION).await;
            }
        });

        let tx_feed = ws_from_gateway_tx.clone();
        let _feed_handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Ok(msg) = event.ser() {
                            if tx_feed.send(msg).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "client fell behind the event feed");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let _tx_handle = tokio::spawn(async move {
            while let Some(ws_msg) = ws_from_gateway_rx.recv().await {
                if ws_tx.send(ws_msg).await.is_err() {
                    break;
                }
            }
        });

        Self {
            member,
            ws_from_gateway_tx,
            _tx_handle,
            _ping_handle,
            _feed_handle,
        }
    }

    pub(crate) async fn send(&self, event: GatewayEvent) {
        if let Ok(msg) = event.ser() {
            self.ws_from_gateway_tx.send(msg).await.unwrap_or_default()
        }
    }

    pub(crate) fn abort(&self) {
        self._tx_handle.abort();
        self._ping_handle.abort();
        self._feed_handle.abort();
    }

    async fn handle(
        &self,
        req: ClientRequest,
        gateway: &Gateway,
        game_tx: &mpsc::Sender<Request>,
        staff: &StaffPolicy,
    ) {
        match req {
            ClientRequest::Identify(_) => {}
            ClientRequest::Command { channel, command } => {
                let text = self.command(channel, command, gateway, game_tx, staff).await;
                self.send(GatewayEvent::Reply { text }).await;
            }
            ClientRequest::Chat { channel, text } => {
                if gateway.post(self.member.id, channel, text.clone()).await.is_err() {
                    return;
                }
                if !self.member.bot {
                    let req = Request::Chat {
                        channel,
                        author: self.member.id,
                        text,
                    };
                    game_tx.send(req).await.unwrap_or_default();
                }
            }
        }
    }

    /// Checks where and by whom a command was issued before the game sees it.
    async fn command(
        &self,
        channel: ChannelId,
        command: Command,
        gateway: &Gateway,
        game_tx: &mpsc::Sender<Request>,
        staff: &StaffPolicy,
    ) -> String {
        if channel != gateway.play_channel() {
            return format!(
                "Use the command in the dedicated channel {}.",
                gateway.play_channel().mention()
            );
        }
        if !staff.permits(&self.member) {
            return "You need the staff role (Kick Members) or Administrator for this.".to_string();
        }
        let command = match command {
            Command::Add { category, word } => Command::Add {
                category,
                word: word.trim().to_lowercase(),
            },
            Command::Del { category, word } => Command::Del {
                category,
                word: word.trim().to_lowercase(),
            },
            other => other,
        };

        let (reply, reply_rx) = oneshot::channel();
        let req = Request::Command {
            channel,
            author: self.member.id,
            command,
            reply,
        };
        if game_tx.send(req).await.is_err() {
            return "The game is not running.".to_string();
        }
        match reply_rx.await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => format!("❌ {}", e),
            Err(_) => "The game is not running.".to_string(),
        }
    }
}

pub(crate) async fn serve_connection(
    stream: TcpStream,
    gateway: Arc<Gateway>,
    game_tx: mpsc::Sender<Request>,
    staff: StaffPolicy,
) -> Result<(), WsError> {
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, Login).await?;
    let (ws_tx, mut ws_rx) = ws_stream.split();

    let member = loop {
        match ws_rx.next().await {
            Some(Ok(WsMsg::Binary(bin))) => {
                if let Ok(ClientRequest::Identify(member)) = ClientRequest::deser(&bin) {
                    break member;
                }
            }
            Some(Ok(WsMsg::Close(_))) | None => return Ok(()),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e),
        }
    };
    info!(user = %member.id, name = %member.name, "member connected");

    let client = Client::new(member, ws_tx, gateway.subscribe());
    client
        .send(GatewayEvent::Welcome {
            play_channel: gateway.play_channel(),
        })
        .await;

    while let Some(ws_msg) = ws_rx.next().await {
        match ws_msg {
            Ok(WsMsg::Binary(bin)) => {
                if let Ok(req) = ClientRequest::deser(&bin) {
                    client.handle(req, &gateway, &game_tx, &staff).await;
                }
            }
            Ok(WsMsg::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                client.abort();
                return Err(e);
            }
        }
    }
    info!(user = %client.member.id, "member left");
    client.abort();
    Ok(())
}
