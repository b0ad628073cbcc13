/// WebSocket session actor
///
/// One actor per accepted socket. Registers itself in the connection
/// registry on start and removes itself on stop; the dispatcher reaches it
/// through its mailbox. Inbound frames carry no commands and are only logged.
use actix::{
    Actor, ActorContext, AsyncContext, Handler, MailboxError, Message as ActixMessage, Recipient,
    StreamHandler, WrapFuture,
};
use actix_web_actors::ws;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::registry::{Connection, ConnectionId, ConnectionRegistry, SendError, SharedConnection};
use crate::config::WebSocketConfig;
use crate::models::UserId;

/// Text frame queued for one session
#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct PushText(pub String);

/// Registry handle for a session actor
///
/// Sends fail with `SendError::Closed` once the actor has stopped.
pub struct ActorConnection {
    id: ConnectionId,
    recipient: Recipient<PushText>,
}

impl ActorConnection {
    pub fn new(id: ConnectionId, recipient: Recipient<PushText>) -> Self {
        Self { id, recipient }
    }
}

#[async_trait]
impl Connection for ActorConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<(), SendError> {
        self.recipient
            .send(PushText(text.to_owned()))
            .await
            .map_err(|e| match e {
                MailboxError::Closed => SendError::Closed,
                MailboxError::Timeout => SendError::Transport("mailbox timeout".to_string()),
            })
    }
}

pub struct WsSession {
    user_id: UserId,
    connection_id: ConnectionId,
    registry: ConnectionRegistry,
    hb: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl WsSession {
    pub fn new(user_id: UserId, registry: ConnectionRegistry, settings: &WebSocketConfig) -> Self {
        Self {
            user_id,
            connection_id: ConnectionId::new(),
            registry,
            hb: Instant::now(),
            heartbeat_interval: settings.heartbeat_interval,
            client_timeout: settings.client_timeout,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.hb) > act.client_timeout {
                warn!(
                    user_id = act.user_id,
                    connection_id = %act.connection_id,
                    "WebSocket heartbeat failed, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            user_id = self.user_id,
            connection_id = %self.connection_id,
            "WebSocket session started"
        );

        self.hb(ctx);

        let connection: SharedConnection = Arc::new(ActorConnection::new(
            self.connection_id,
            ctx.address().recipient(),
        ));
        let registry = self.registry.clone();
        let user_id = self.user_id;

        // Block the mailbox until registered so stop cannot overtake connect
        ctx.wait(async move { registry.connect(connection, user_id).await }.into_actor(self));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(
            user_id = self.user_id,
            connection_id = %self.connection_id,
            "WebSocket session stopped"
        );

        let registry = self.registry.clone();
        let user_id = self.user_id;
        let connection_id = self.connection_id;

        actix::spawn(async move {
            registry.disconnect(connection_id, user_id).await;
        });
    }
}

impl Handler<PushText> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: PushText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                debug!(
                    user_id = self.user_id,
                    connection_id = %self.connection_id,
                    frame = %text,
                    "received inbound frame"
                );
            }
            Ok(ws::Message::Binary(_)) => {
                warn!(user_id = self.user_id, "Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                info!(user_id = self.user_id, ?reason, "WebSocket close message received");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!(
                    user_id = self.user_id,
                    connection_id = %self.connection_id,
                    error = %e,
                    "WebSocket protocol error"
                );
                ctx.stop();
            }
        }
    }
}
