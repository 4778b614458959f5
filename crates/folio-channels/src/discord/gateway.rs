//! Discord Gateway WebSocket client with heartbeat and reconnect.

use std::time::Duration;

use folio_core::{Attachment, InboundMessage};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type GatewayResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// Intents: GUILD_MESSAGES (1<<9) | DIRECT_MESSAGES (1<<12) | MESSAGE_CONTENT (1<<15)
const INTENTS: u64 = (1 << 9) | (1 << 12) | (1 << 15);

#[derive(Serialize)]
struct Identify {
    op: u8,
    d: IdentifyData,
}

#[derive(Serialize)]
struct IdentifyData {
    token: String,
    intents: u64,
    properties: IdentifyProperties,
}

#[derive(Serialize)]
struct IdentifyProperties {
    os: String,
    browser: String,
    device: String,
}

#[derive(Serialize)]
struct Heartbeat {
    op: u8,
    d: Option<u64>,
}

/// Spawn the gateway connection loop, returning a receiver of human-authored messages.
#[must_use]
pub fn spawn_gateway(token: String) -> mpsc::Receiver<InboundMessage> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(gateway_loop(token, tx));
    rx
}

async fn gateway_loop(token: String, tx: mpsc::Sender<InboundMessage>) {
    while !tx.is_closed() {
        match run_session(&token, &tx).await {
            Ok(()) => {
                tracing::info!("discord gateway session ended, reconnecting...");
            }
            Err(e) => {
                tracing::warn!("discord gateway error: {e:#}, reconnecting in 5s");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
    tracing::info!("discord gateway receiver dropped, stopping");
}

async fn run_session(token: &str, tx: &mpsc::Sender<InboundMessage>) -> GatewayResult<()> {
    let (ws_stream, _): (WsStream, _) = connect_async(GATEWAY_URL).await?;
    let (mut write, mut read) = ws_stream.split();

    let hello: Value = serde_json::from_str(&read_next_text(&mut read).await?)?;
    let heartbeat_interval = parse_hello(&hello)?;

    let identify = Identify {
        op: 2,
        d: IdentifyData {
            token: token.to_owned(),
            intents: INTENTS,
            properties: IdentifyProperties {
                os: std::env::consts::OS.into(),
                browser: "folio".into(),
                device: "folio".into(),
            },
        },
    };
    write
        .send(WsMessage::Text(serde_json::to_string(&identify)?.into()))
        .await?;

    let mut sequence: Option<u64> = None;
    let mut heartbeat_timer = tokio::time::interval(Duration::from_millis(heartbeat_interval));

    loop {
        tokio::select! {
            _ = heartbeat_timer.tick() => {
                let hb = Heartbeat { op: 1, d: sequence };
                write.send(WsMessage::Text(serde_json::to_string(&hb)?.into())).await?;
            }
            msg = read.next() => {
                let Some(msg) = msg else { return Ok(()); };
                let text = match msg? {
                    WsMessage::Text(t) => t,
                    WsMessage::Close(_) => return Ok(()),
                    _ => continue,
                };
                let payload: Value = serde_json::from_str(&text)?;
                let op = payload.get("op").and_then(Value::as_u64).unwrap_or(0);
                if let Some(s) = payload.get("s").and_then(Value::as_u64) {
                    sequence = Some(s);
                }
                match op {
                    0 => match payload.get("t").and_then(Value::as_str) {
                        Some("READY") => tracing::info!("discord gateway ready"),
                        Some("MESSAGE_CREATE") => {
                            if let Some(inbound) = payload.get("d").and_then(parse_message_create)
                                && tx.send(inbound).await.is_err()
                            {
                                return Ok(());
                            }
                        }
                        _ => {}
                    },
                    7 | 9 => return Ok(()), // Reconnect / Invalid Session
                    _ => {}
                }
            }
        }
    }
}

fn parse_hello(hello: &Value) -> GatewayResult<u64> {
    let op = hello.get("op").and_then(Value::as_u64).unwrap_or(0);
    if op != 10 {
        return Err(format!("expected Hello (op 10), got op {op}").into());
    }
    Ok(hello
        .get("d")
        .and_then(|d| d.get("heartbeat_interval"))
        .and_then(Value::as_u64)
        .unwrap_or(41250))
}

/// Convert a `MESSAGE_CREATE` payload; bot-authored and malformed messages yield `None`.
fn parse_message_create(d: &Value) -> Option<InboundMessage> {
    let author = d.get("author")?;
    if author.get("bot").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }

    let author_roles = d
        .get("member")
        .and_then(|m| m.get("roles"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let attachments = d
        .get("attachments")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(parse_attachment).collect())
        .unwrap_or_default();

    Some(InboundMessage {
        id: d.get("id")?.as_str()?.to_owned(),
        channel_id: d.get("channel_id")?.as_str()?.to_owned(),
        author_id: author.get("id")?.as_str()?.to_owned(),
        author_roles,
        content: d.get("content")?.as_str()?.to_owned(),
        attachments,
    })
}

fn parse_attachment(a: &Value) -> Option<Attachment> {
    Some(Attachment {
        id: a.get("id")?.as_str()?.to_owned(),
        filename: a.get("filename")?.as_str()?.to_owned(),
        url: a.get("url")?.as_str()?.to_owned(),
        size: a.get("size").and_then(Value::as_u64).unwrap_or(0),
        content_type: a
            .get("content_type")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

async fn read_next_text<S>(read: &mut S) -> GatewayResult<String>
where
    S: futures::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let Some(msg) = read.next().await else {
            return Err("gateway connection closed".into());
        };
        match msg? {
            WsMessage::Text(t) => return Ok(t.to_string()),
            WsMessage::Close(_) => return Err("gateway closed".into()),
            _ => {}
        }
    }
}
