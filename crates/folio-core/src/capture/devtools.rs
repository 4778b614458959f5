//! Chrome DevTools Protocol client over the browser's debugging WebSocket.

use std::collections::VecDeque;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::CaptureError;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const NETWORK_IDLE: &str = "networkIdle";

/// One browser-level DevTools connection. Page commands are routed through
/// flattened target sessions.
pub struct DevTools {
    ws: WsStream,
    next_id: u64,
    events: VecDeque<Value>,
}

impl std::fmt::Debug for DevTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevTools")
            .field("next_id", &self.next_id)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl DevTools {
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails.
    pub async fn connect(ws_url: &str) -> Result<Self, CaptureError> {
        let (ws, _) = connect_async(ws_url).await.map_err(ws_error)?;
        Ok(Self {
            ws,
            next_id: 0,
            events: VecDeque::new(),
        })
    }

    /// Send one command and wait for its reply, queueing events that arrive first.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the browser rejects the command.
    pub async fn call(
        &mut self,
        method: &str,
        params: Value,
        session: Option<&str>,
    ) -> Result<Value, CaptureError> {
        self.next_id += 1;
        let id = self.next_id;
        let mut request = json!({ "id": id, "method": method, "params": params });
        if let Some(session) = session {
            request["sessionId"] = Value::from(session);
        }
        self.ws
            .send(WsMessage::Text(request.to_string().into()))
            .await
            .map_err(ws_error)?;

        loop {
            let msg = self.next_message().await?;
            if msg.get("id").and_then(Value::as_u64) == Some(id) {
                if let Some(err) = msg.get("error") {
                    let detail = err
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(CaptureError::Protocol(format!("{method}: {detail}")));
                }
                return Ok(msg.get("result").cloned().unwrap_or(Value::Null));
            }
            if msg.get("method").is_some() {
                self.events.push_back(msg);
            }
        }
    }

    /// Open `url` in a fresh tab and return a PNG of the entire document.
    ///
    /// Navigation and the network-idle wait are bounded by `timeout`; `settle` is
    /// slept afterwards before the page is measured.
    ///
    /// # Errors
    ///
    /// Returns an error on navigation failure, timeout, or a protocol failure.
    pub async fn capture_full_page(
        &mut self,
        url: &str,
        timeout: Duration,
        settle: Duration,
    ) -> Result<Vec<u8>, CaptureError> {
        let target = self
            .call("Target.createTarget", json!({ "url": "about:blank" }), None)
            .await?;
        let target_id = str_field(&target, "targetId")?;
        let attached = self
            .call(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
                None,
            )
            .await?;
        let session = str_field(&attached, "sessionId")?;

        tokio::time::timeout(timeout, self.navigate(&session, url))
            .await
            .map_err(|_| CaptureError::Timeout(timeout.as_secs()))??;
        tokio::time::sleep(settle).await;

        let metrics = self
            .call("Page.getLayoutMetrics", json!({}), Some(&session))
            .await?;
        let (width, height) = content_size(&metrics)?;
        tracing::debug!(width, height, "measured page");

        let shot = self
            .call(
                "Page.captureScreenshot",
                json!({
                    "format": "png",
                    "captureBeyondViewport": true,
                    "clip": { "x": 0, "y": 0, "width": width, "height": height, "scale": 1 }
                }),
                Some(&session),
            )
            .await?;
        let png = STANDARD
            .decode(str_field(&shot, "data")?)
            .map_err(|e| CaptureError::Protocol(format!("screenshot is not base64: {e}")))?;

        if let Err(e) = self
            .call("Target.closeTarget", json!({ "targetId": target_id }), None)
            .await
        {
            tracing::debug!("failed to close tab: {e}");
        }
        Ok(png)
    }

    /// Ask the browser to exit. The reply may never arrive, so failures are ignored.
    pub async fn close_browser(&mut self) {
        if let Err(e) = self.call("Browser.close", json!({}), None).await {
            tracing::debug!("browser close: {e}");
        }
    }

    async fn navigate(&mut self, session: &str, url: &str) -> Result<(), CaptureError> {
        self.call("Page.enable", json!({}), Some(session)).await?;
        self.call(
            "Page.setLifecycleEventsEnabled",
            json!({ "enabled": true }),
            Some(session),
        )
        .await?;

        let nav = self
            .call("Page.navigate", json!({ "url": url }), Some(session))
            .await?;
        if let Some(err) = nav.get("errorText").and_then(Value::as_str)
            && !err.is_empty()
        {
            return Err(CaptureError::Navigation(err.to_owned()));
        }
        let loader = str_field(&nav, "loaderId")?;
        self.wait_for_lifecycle(session, &loader, NETWORK_IDLE).await
    }

    async fn wait_for_lifecycle(
        &mut self,
        session: &str,
        loader: &str,
        name: &str,
    ) -> Result<(), CaptureError> {
        while let Some(event) = self.events.pop_front() {
            if is_lifecycle(&event, session, loader, name) {
                return Ok(());
            }
        }
        loop {
            let msg = self.next_message().await?;
            if is_lifecycle(&msg, session, loader, name) {
                return Ok(());
            }
        }
    }

    async fn next_message(&mut self) -> Result<Value, CaptureError> {
        loop {
            let Some(msg) = self.ws.next().await else {
                return Err(CaptureError::Protocol("devtools connection closed".into()));
            };
            match msg.map_err(ws_error)? {
                WsMessage::Text(text) => {
                    return serde_json::from_str(&text).map_err(|e| {
                        CaptureError::Protocol(format!("malformed devtools message: {e}"))
                    });
                }
                WsMessage::Close(_) => {
                    return Err(CaptureError::Protocol("devtools connection closed".into()));
                }
                _ => {}
            }
        }
    }
}

fn is_lifecycle(msg: &Value, session: &str, loader: &str, name: &str) -> bool {
    msg.get("method").and_then(Value::as_str) == Some("Page.lifecycleEvent")
        && msg.get("sessionId").and_then(Value::as_str) == Some(session)
        && msg["params"]["loaderId"].as_str() == Some(loader)
        && msg["params"]["name"].as_str() == Some(name)
}

/// CSS size of the whole document, preferring `cssContentSize` over the legacy field.
fn content_size(metrics: &Value) -> Result<(f64, f64), CaptureError> {
    let size = metrics
        .get("cssContentSize")
        .or_else(|| metrics.get("contentSize"))
        .ok_or_else(|| CaptureError::Protocol("layout metrics without content size".into()))?;
    let width = size.get("width").and_then(Value::as_f64).unwrap_or(0.0);
    let height = size.get("height").and_then(Value::as_f64).unwrap_or(0.0);
    if width <= 0.0 || height <= 0.0 {
        return Err(CaptureError::Protocol(format!(
            "page has no renderable content ({width}x{height})"
        )));
    }
    Ok((width.ceil(), height.ceil()))
}

fn str_field(value: &Value, key: &str) -> Result<String, CaptureError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| CaptureError::Protocol(format!("devtools reply is missing `{key}`")))
}

fn ws_error(e: tokio_tungstenite::tungstenite::Error) -> CaptureError {
    CaptureError::Protocol(format!("devtools connection failed: {e}"))
}
