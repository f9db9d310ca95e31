//! WebSocket 실시간 채널 핸들러.
//!
//! 연결마다 브로드캐스트를 구독하고, 수신 요청은 서비스로 넘긴다.
//! 요청 처리 실패는 해당 연결에만 `error{message}`로 돌려준다.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use chicfocus_core::models::protocol::{ClientEvent, ServerEvent};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::AppState;

/// GET /ws
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!("클라이언트 연결: {conn_id}");

    // on_connect의 브로드캐스트를 받으려면 먼저 구독해야 한다
    let mut events = state.service.subscribe();
    let (mut sink, mut stream) = socket.split();

    let direct = match state.service.on_connect() {
        Ok(direct) => direct,
        Err(e) => vec![ServerEvent::Error {
            message: format!("Connection error: {e}"),
        }],
    };
    for event in direct {
        if send_event(&mut sink, &event).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = dispatch(&state, text.as_str()) {
                        debug!("[{conn_id}] 요청 거부: {e}");
                        let reply = ServerEvent::Error { message: e.to_string() };
                        if send_event(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("[{conn_id}] 수신 에러: {e}");
                    break;
                }
            },
            outgoing = events.recv() => match outgoing {
                Ok(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("[{conn_id}] 브로드캐스트 지연, {skipped}개 건너뜀");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("클라이언트 연결 종료: {conn_id}");
}

fn dispatch(state: &AppState, text: &str) -> Result<(), ServiceError> {
    let event =
        ClientEvent::from_json(text).map_err(|e| ServiceError::InvalidMessage(e.to_string()))?;
    state.service.handle(event)
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = match event.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("{} 직렬화 실패: {e}", event.name());
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
