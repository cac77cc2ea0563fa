//! WebSocket relay forwarding tilt data between connected peers
//!
//! The same server hosts the built browser game, so a phone and a screen only
//! need one address.
//!
//! Every text or binary frame a peer sends is broadcast verbatim to all other
//! peers. The relay never parses payloads and keeps no state beyond its live
//! subscribers. Delivery is best-effort: a peer that falls behind the broadcast
//! buffer skips what it missed.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use warp::Filter;
use warp::ws::{Message, WebSocket};

/// Frames buffered per subscriber before it starts skipping
pub const BROADCAST_CAPACITY: usize = 64;

/// Default listen port when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3000;

/// Directory of the built game when `STATIC_DIR` is not set
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// A frame and the peer it came from
#[derive(Debug, Clone)]
struct Envelope {
    from: u64,
    message: Message,
}

/// Shared broadcast hub
#[derive(Debug)]
pub struct Relay {
    tx: broadcast::Sender<Envelope>,
    next_id: AtomicU64,
}

/// A peer's place in the relay, taken before its socket is upgraded
struct Subscription {
    id: u64,
    rx: broadcast::Receiver<Envelope>,
}

impl Relay {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Arc::new(Self {
            tx,
            next_id: AtomicU64::new(1),
        })
    }

    /// Number of connected peers
    pub fn peer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn subscribe(&self) -> Subscription {
        Subscription {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            rx: self.tx.subscribe(),
        }
    }

    /// Hand a frame to every other peer; returns how many were reached
    fn publish(&self, from: u64, message: Message) -> usize {
        // Err only means nobody is listening
        self.tx.send(Envelope { from, message }).unwrap_or(0)
    }
}

fn with_relay(relay: Arc<Relay>) -> impl Filter<Extract = (Arc<Relay>,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}

/// The `/ws` endpoint
pub fn routes(
    relay: Arc<Relay>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("ws")
        .and(warp::ws())
        .and(with_relay(relay))
        .map(|ws: warp::ws::Ws, relay: Arc<Relay>| {
            // Subscribe before the upgrade completes so no frame sent after the
            // handshake can be missed
            let subscription = relay.subscribe();
            ws.on_upgrade(move |socket| handle_connection(socket, relay, subscription))
        })
}

async fn handle_connection(ws: WebSocket, relay: Arc<Relay>, subscription: Subscription) {
    let Subscription { id, mut rx } = subscription;
    let (mut tx, mut incoming) = ws.split();
    log::info!("Peer {} connected ({} online)", id, relay.peer_count());

    let forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if envelope.from == id {
                        continue;
                    }
                    if let Err(e) = tx.send(envelope.message).await {
                        log::debug!("Peer {} send failed: {}", id, e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Peer {} lagging, skipped {} frames", id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(result) = incoming.next().await {
        match result {
            Ok(msg) => {
                if msg.is_text() || msg.is_binary() {
                    let reached = relay.publish(id, msg);
                    log::trace!("Peer {} frame relayed to {} subscribers", id, reached);
                } else if msg.is_close() {
                    break;
                }
            }
            Err(e) => {
                log::warn!("WebSocket error for peer {}: {}", id, e);
                break;
            }
        }
    }

    forward.abort();
    log::info!("Peer {} disconnected", id);
}

/// Listen port from the `PORT` environment variable
pub fn port_from_env() -> u16 {
    match std::env::var("PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Invalid PORT {:?}, using {}", value, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

/// `/ws` plus the game's static files
pub fn app(
    relay: Arc<Relay>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    routes(relay).or(warp::fs::dir(static_dir))
}

/// Static file directory from the `STATIC_DIR` environment variable
pub fn static_dir_from_env() -> PathBuf {
    std::env::var_os("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

/// Run the relay until the process exits
pub async fn serve(addr: SocketAddr, static_dir: PathBuf) {
    if !static_dir.is_dir() {
        log::warn!("Static directory {} not found, only /ws is served", static_dir.display());
    }
    let relay = Relay::new();
    let routes = app(relay, static_dir.clone()).with(warp::cors().allow_any_origin());

    log::info!("Serving {} at http://{}/", static_dir.display(), addr);
    log::info!("Relay listening on ws://{}/ws", addr);
    warp::serve(routes).run(addr).await;
}
