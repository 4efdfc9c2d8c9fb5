use futures_util::stream::SplitSink;
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;

pub use protocol::{ChannelId, MessageId, RoleId, UserId};
pub use tokio_tungstenite::tungstenite::Message as WsMsg;

pub type WsStream = WebSocketStream<TcpStream>;
/// Write half of a client socket.
pub type WsTx = SplitSink<WsStream, WsMsg>;
