use super::message::parse_message;
use crate::store::fleet::FleetStore;
use common::config::ViewerConfig;
use common::dashboard::DashboardMessage;
use futures_util::StreamExt;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Pause between reconnect attempts. Every close is followed by exactly one
/// delayed attempt, forever, until an explicit disconnect
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Handle for the live dashboard feed. Owns the connection task; the feed
/// stops when `disconnect` is called or the handle is dropped
pub(crate) struct DashboardChannel {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DashboardChannel {
    /// Open the feed and keep the fleet store current until disconnected
    pub(crate) fn connect(config: &ViewerConfig, store: Arc<RwLock<FleetStore>>) -> Self {
        let (shutdown, signal) = watch::channel(false);
        let task = tokio::spawn(run_channel(config.dashboard_url(), store, signal));

        DashboardChannel { shutdown, task }
    }

    /// Close the connection and cancel any pending reconnect. Once this
    /// returns no further store mutation can come from this channel
    pub(crate) async fn disconnect(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// How one open session ended
#[derive(PartialEq)]
enum SessionEnd {
    Closed,
    Disconnected,
}

/// Connection loop: connect, drain the session, pause, retry
async fn run_channel(
    url: String,
    store: Arc<RwLock<FleetStore>>,
    mut signal: watch::Receiver<bool>,
) {
    loop {
        let connect_attempt = tokio::select! {
            _ = signal.changed() => return,
            result = connect_async(&url) => result,
        };

        match connect_attempt {
            Ok((socket, _response)) => {
                info!("[viewer] Dashboard feed connected to {url}");
                if run_session(socket, &store, &mut signal).await == SessionEnd::Disconnected {
                    return;
                }
            }
            Err(err) => {
                error!("[viewer] Could not connect to dashboard feed: {err:?}");
            }
        }

        // Idle-with-retry. A disconnect lands here as a canceled timer
        tokio::select! {
            _ = signal.changed() => return,
            _ = sleep(RECONNECT_DELAY) => {}
        }
    }
}

/// Drain one open connection, applying messages to the store in delivery
/// order. Transport errors and close frames end the session; malformed
/// messages do not
async fn run_session(
    mut socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    store: &RwLock<FleetStore>,
    signal: &mut watch::Receiver<bool>,
) -> SessionEnd {
    loop {
        let inbound = tokio::select! {
            _ = signal.changed() => return SessionEnd::Disconnected,
            result = socket.next() => result,
        };

        let frame = match inbound {
            Some(Ok(result)) => result,
            Some(Err(err)) => {
                error!("[viewer] Dashboard feed transport error: {err:?}");
                return SessionEnd::Closed;
            }
            None => {
                info!("[viewer] Dashboard feed closed");
                return SessionEnd::Closed;
            }
        };

        if frame.is_close() {
            info!("[viewer] Dashboard feed closed by server");
            return SessionEnd::Closed;
        }
        if !frame.is_text() {
            continue;
        }

        let text = match frame.to_text() {
            Ok(result) => result,
            Err(err) => {
                warn!("[viewer] Feed frame was not UTF-8 text: {err:?}");
                continue;
            }
        };

        apply_message(text, store).await;
    }
}

/// Decode one frame and apply it. Malformed frames are dropped without
/// ending the session
async fn apply_message(text: &str, store: &RwLock<FleetStore>) {
    let message_result = parse_message(text);
    let message = match message_result {
        Ok(result) => result,
        Err(err) => {
            warn!("[viewer] Dropping feed message: {err}");
            return;
        }
    };

    match message {
        DashboardMessage::Init(records) => {
            let count = records.len();
            store.write().await.replace_all(records);
            info!("[viewer] Fleet snapshot installed: {count} agents");
        }
        DashboardMessage::Update(patches) => {
            store.write().await.merge_partial(&patches);
        }
        DashboardMessage::Unknown => {}
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardChannel;
    use crate::store::fleet::FleetStore;
    use common::config::{DashboardServer, ViewerConfig, ViewerSettings};
    use common::fleet::AgentStatus;
    use futures_util::{SinkExt, StreamExt};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::RwLock;
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    fn test_config(port: u16) -> ViewerConfig {
        ViewerConfig {
            viewer: ViewerSettings {
                log_path: String::from("./tmp/viewer"),
                log_level: String::from("warn"),
                summary_interval: 5,
            },
            dashboard: DashboardServer {
                address: String::from("127.0.0.1"),
                port,
                secure: false,
            },
        }
    }

    #[tokio::test]
    async fn test_channel_applies_init_and_update() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _addr) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"init","data":[{"id":"a1","name":"Agent1","status":"online"}]}"#,
                )))
                .await
                .unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"alert","data":{"message":"ignored"}}"#,
                )))
                .await
                .unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"update","data":[{"id":"a1","status":"offline"},{"id":"zz","status":"online"}]}"#,
                )))
                .await
                .unwrap();

            // Hold the connection open until the client disconnects
            while socket.next().await.is_some() {}
        });

        let store = Arc::new(RwLock::new(FleetStore::new()));
        let channel = DashboardChannel::connect(&test_config(port), store.clone());
        sleep(Duration::from_millis(500)).await;

        let fleet = store.read().await.snapshot();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].id, "a1");
        assert_eq!(fleet[0].name, "Agent1");
        assert_eq!(fleet[0].status, AgentStatus::Offline);

        channel.disconnect().await;
    }

    #[tokio::test]
    async fn test_channel_survives_malformed_messages() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (stream, _addr) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            socket
                .send(Message::Text(String::from("definitely not json")))
                .await
                .unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"init","data":[{"id":"a1","name":"Agent1","status":"online"}]}"#,
                )))
                .await
                .unwrap();

            while socket.next().await.is_some() {}
        });

        let store = Arc::new(RwLock::new(FleetStore::new()));
        let channel = DashboardChannel::connect(&test_config(port), store.clone());
        sleep(Duration::from_millis(500)).await;

        assert_eq!(store.read().await.len(), 1);

        channel.disconnect().await;
    }

    #[tokio::test]
    async fn test_channel_reconnects_and_converges_on_init() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            // First session: snapshot plus a patch, then an abrupt close
            let (stream, _addr) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"init","data":[{"id":"a1","name":"Agent1","status":"online"}]}"#,
                )))
                .await
                .unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"update","data":[{"id":"a1","status":"offline"}]}"#,
                )))
                .await
                .unwrap();
            drop(socket);

            // Second session: a fresh snapshot masks everything missed
            let (stream, _addr) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            socket
                .send(Message::Text(String::from(
                    r#"{"type":"init","data":[{"id":"b2","name":"Agent2","status":"online"}]}"#,
                )))
                .await
                .unwrap();

            while socket.next().await.is_some() {}
        });

        let store = Arc::new(RwLock::new(FleetStore::new()));
        let channel = DashboardChannel::connect(&test_config(port), store.clone());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(store.read().await.snapshot()[0].status, AgentStatus::Offline);

        // Past the fixed reconnect delay the second snapshot is authoritative
        sleep(Duration::from_secs(4)).await;
        let fleet = store.read().await.snapshot();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].id, "b2");
        assert_eq!(fleet[0].status, AgentStatus::Online);

        channel.disconnect().await;
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_reconnect() {
        // Nothing is listening on this port, so the channel sits in its
        // retry cycle until disconnected
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let store = Arc::new(RwLock::new(FleetStore::new()));
        let channel = DashboardChannel::connect(&test_config(port), store.clone());
        sleep(Duration::from_millis(200)).await;

        timeout(Duration::from_secs(1), channel.disconnect())
            .await
            .expect("disconnect should not wait out the retry timer");
        assert!(store.read().await.is_empty());
    }
}
