use std::convert::Infallible;

use actix_web::{HttpResponse, Responder, http::header, web};
use futures::stream;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::notify::{ChannelTransport, ConnectionId, PresenceRegistry, Transport, UserId};

/// Unregisters a live connection once its response stream is dropped.
struct LiveConnection {
    user_id: UserId,
    connection_id: ConnectionId,
    presence: web::Data<PresenceRegistry>,
    transport: web::Data<ChannelTransport>,
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        self.presence
            .remove_connection(self.user_id, self.connection_id);
        self.transport.close(self.connection_id);
        tracing::info!(
            user_id = self.user_id,
            connection_id = %self.connection_id,
            "Live connection closed"
        );
    }
}

fn sse_frame(message: &str) -> web::Bytes {
    web::Bytes::from(format!("data: {message}\n\n"))
}

/// Server-sent event stream of notifications for the caller
#[utoipa::path(
    get,
    path = "/api/live",
    responses(
        (status = 200, description = "text/event-stream of notification payloads"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Live"
)]
pub async fn connect(
    auth: AuthUser,
    presence: web::Data<PresenceRegistry>,
    transport: web::Data<ChannelTransport>,
) -> actix_web::Result<impl Responder> {
    let connection_id = Uuid::new_v4();
    let rx = transport.open(connection_id);
    presence.add_connection(auth.user_id, connection_id);

    let greeting = json!({
        "type": "connected",
        "payload": { "connectionId": connection_id }
    });
    if let Err(e) = transport.send(connection_id, &greeting.to_string()) {
        tracing::warn!(user_id = auth.user_id, error = %e, "Failed to greet live connection");
    }

    tracing::info!(user_id = auth.user_id, %connection_id, "Live connection opened");

    let guard = LiveConnection {
        user_id: auth.user_id,
        connection_id,
        presence,
        transport,
    };

    let body = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        Some((Ok::<_, Infallible>(sse_frame(&message)), (rx, guard)))
    });

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(body))
}
