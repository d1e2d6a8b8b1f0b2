use std::collections::{HashMap, VecDeque};
use std::future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::FeedError;
use crate::feed::Feed;
use crate::query::Query;
use crate::subscription::manager::{Command, SubscriptionManager};
use crate::subscription::registry::Handle;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Frame = Option<Result<Message, tungstenite::Error>>;

enum Request<F: Feed> {
    Subscribe {
        key: F::Key,
        reply: oneshot::Sender<(Handle, watch::Receiver<Query<F::Value>>)>,
    },
    Unsubscribe(Handle),
}

/// Cheap handle to the task that owns one feed's socket.
///
/// The task exits once every clone of the client and every [`Subscription`]
/// has been dropped.
pub struct FeedClient<F: Feed> {
    requests: mpsc::UnboundedSender<Request<F>>,
}

impl<F: Feed> Clone for FeedClient<F> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
        }
    }
}

impl<F: Feed> FeedClient<F> {
    /// Spawn the feed task on the current tokio runtime. No socket is opened
    /// until the first subscription arrives.
    pub fn spawn(config: &ClientConfig) -> Self {
        Self::spawn_with(config.ws_url(F::PATH), config.resync_interval())
    }

    pub fn spawn_with(url: String, resync_interval: Duration) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();

        let worker = Worker::<F> {
            manager: SubscriptionManager::new(url),
            socket: None,
            watchers: HashMap::new(),
        };
        tokio::spawn(worker.run(receiver, resync_interval));

        Self { requests }
    }

    pub async fn subscribe(&self, key: F::Key) -> Result<Subscription<F>, FeedError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Subscribe { key, reply })
            .map_err(|_| FeedError::Closed)?;

        let (handle, updates) = response.await.map_err(|_| FeedError::Closed)?;

        Ok(Subscription {
            handle,
            updates,
            requests: self.requests.clone(),
        })
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription<F: Feed> {
    handle: Handle,
    updates: watch::Receiver<Query<F::Value>>,
    requests: mpsc::UnboundedSender<Request<F>>,
}

impl<F: Feed> Subscription<F> {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The latest value. It counts as seen, so `changed` waits for a newer one.
    pub fn current(&mut self) -> Query<F::Value> {
        self.updates.borrow_and_update().clone()
    }

    /// Wait for the next change and return it.
    pub async fn changed(&mut self) -> Result<Query<F::Value>, FeedError> {
        self.updates.changed().await.map_err(|_| FeedError::Closed)?;
        Ok(self.updates.borrow_and_update().clone())
    }

    /// Wait until the query leaves the loading state.
    pub async fn settled(&mut self) -> Result<Query<F::Value>, FeedError> {
        loop {
            let current = self.updates.borrow_and_update().clone();
            if !current.is_loading() {
                return Ok(current);
            }
            self.updates.changed().await.map_err(|_| FeedError::Closed)?;
        }
    }
}

impl<F: Feed> Drop for Subscription<F> {
    fn drop(&mut self) {
        // The task may already be gone, in which case there is nothing to release
        let _ = self.requests.send(Request::Unsubscribe(self.handle));
    }
}

struct Worker<F: Feed> {
    manager: SubscriptionManager<F>,
    socket: Option<Socket>,
    watchers: HashMap<Handle, watch::Sender<Query<F::Value>>>,
}

impl<F: Feed> Worker<F> {
    async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request<F>>, resync: Duration) {
        let mut ticker = tokio::time::interval(resync);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            let commands = tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => self.on_request(request),
                    None => break,
                },
                frame = next_frame(&mut self.socket) => self.on_frame(frame),
                _ = ticker.tick() => self.manager.tick(),
            };

            self.execute(commands).await;
            self.publish();
        }

        debug!(feed = F::NAME, "feed task shutting down");
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None).await;
        }
    }

    fn on_request(&mut self, request: Request<F>) -> Vec<Command> {
        match request {
            Request::Subscribe { key, reply } => {
                let (handle, mut commands) = self.manager.subscribe(key);
                let (sender, receiver) = watch::channel(self.manager.query(handle));

                if reply.send((handle, receiver)).is_err() {
                    // Caller went away before the subscription was handed over
                    commands.extend(self.manager.unsubscribe(handle));
                } else {
                    self.watchers.insert(handle, sender);
                }

                commands
            }
            Request::Unsubscribe(handle) => {
                self.watchers.remove(&handle);
                self.manager.unsubscribe(handle)
            }
        }
    }

    fn on_frame(&mut self, frame: Frame) -> Vec<Command> {
        match frame {
            Some(Ok(Message::Text(text))) => self.manager.on_message(text.as_str()),
            Some(Ok(Message::Close(_))) | None => {
                self.socket = None;
                self.manager.on_close()
            }
            Some(Ok(_)) => Vec::new(),
            Some(Err(source)) => {
                self.socket = None;
                let error = FeedError::Socket {
                    feed: F::NAME,
                    source,
                };
                self.manager.on_error(&error.to_string())
            }
        }
    }

    async fn execute(&mut self, commands: Vec<Command>) {
        let mut queue = VecDeque::from(commands);

        while let Some(command) = queue.pop_front() {
            let follow_up = match command {
                Command::Open(url) => self.open(&url).await,
                Command::Send(text) => self.send(text).await,
                Command::Close => {
                    if let Some(mut socket) = self.socket.take() {
                        debug!(feed = F::NAME, "closing socket");
                        if let Err(e) = socket.close(None).await {
                            debug!(feed = F::NAME, error = %e, "socket close failed");
                        }
                    }
                    Vec::new()
                }
            };

            queue.extend(follow_up);
        }
    }

    async fn open(&mut self, url: &str) -> Vec<Command> {
        debug!(feed = F::NAME, %url, "opening socket");

        match tokio_tungstenite::connect_async(url).await {
            Ok((socket, _)) => {
                self.socket = Some(socket);
                self.manager.on_open()
            }
            Err(source) => {
                let error = FeedError::Connect {
                    feed: F::NAME,
                    source,
                };
                self.manager.on_error(&error.to_string())
            }
        }
    }

    async fn send(&mut self, text: String) -> Vec<Command> {
        let Some(socket) = self.socket.as_mut() else {
            return Vec::new();
        };

        debug!(feed = F::NAME, bytes = text.len(), "sending subscription set");
        match socket.send(Message::Text(text.into())).await {
            Ok(()) => Vec::new(),
            Err(source) => {
                self.socket = None;
                let error = FeedError::Socket {
                    feed: F::NAME,
                    source,
                };
                self.manager.on_error(&error.to_string())
            }
        }
    }

    fn publish(&mut self) {
        self.watchers.retain(|handle, sender| {
            if sender.is_closed() {
                // Receiver dropped without unsubscribing, e.g. a leaked subscription
                warn!(feed = F::NAME, %handle, "dropping orphaned watcher");
                return false;
            }

            let query = self.manager.query(*handle);
            sender.send_if_modified(|current| {
                if *current == query {
                    return false;
                }
                *current = query;
                true
            });

            true
        });
    }
}

async fn next_frame(socket: &mut Option<Socket>) -> Frame {
    match socket {
        Some(socket) => socket.next().await,
        None => future::pending().await,
    }
}
