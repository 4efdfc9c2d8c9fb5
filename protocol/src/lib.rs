pub mod content;
pub mod ids;
pub mod request;
pub mod response;

pub use content::{Content, Embed};
pub use ids::{ChannelId, MessageId, RoleId, UserId};
pub use request::*;
pub use response::*;

use serde::{Serialize, Deserialize};
use bincode::{serialize, deserialize, ErrorKind};
use tokio_tungstenite::tungstenite::Message;

/// Framing shared by the gateway and its clients: every request and event
/// travels as one bincode-encoded websocket binary frame.
pub trait BinCodeMessage<'a>: Serialize + Deserialize<'a>{
    fn deser(bin: &'a [u8]) -> Result<Self, Box<ErrorKind>> {
        deserialize::<Self>(&bin)
    }

    fn ser(&self) -> Result<Message, Box<ErrorKind>> {
        let bin = serialize(&self)?;
        Ok(Message::Binary(bin))
    }
}
