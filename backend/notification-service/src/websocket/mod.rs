/// WebSocket real-time notification delivery
///
/// Architecture:
/// 1. ConnectionRegistry: which live connections belong to which user
/// 2. NotificationDispatcher: encodes a payload once and fans it out
/// 3. WsSession: actix actor per socket, registers and deregisters itself
pub mod dispatcher;
pub mod messages;
pub mod registry;
pub mod session;

pub use dispatcher::{DispatchError, DispatchReport, NotificationDispatcher};
pub use messages::{DispatchPayload, NotificationData};
pub use registry::{
    ChannelConnection, Connection, ConnectionId, ConnectionRegistry, SendError, SharedConnection,
};
pub use session::{ActorConnection, PushText, WsSession};
