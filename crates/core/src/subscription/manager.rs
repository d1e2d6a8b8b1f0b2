use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::feed::{Feed, FeedMessage};
use crate::query::Query;
use crate::subscription::registry::{Handle, Registry};

/// Socket side effects requested by the manager. The driver executes them in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Send(String),
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketState {
    Closed,
    Connecting,
    Open,
}

/// Subscriber registry, per-subscriber cache, and socket lifecycle for one feed.
///
/// Every method is synchronous and returns the socket commands it needs run,
/// so the whole feed state can live on a single task without locks.
pub struct SubscriptionManager<F: Feed> {
    url: String,
    registry: Registry<F::Key>,
    cache: HashMap<Handle, Query<F::Value>>,
    socket: SocketState,
    _feed: PhantomData<fn() -> F>,
}

impl<F: Feed> SubscriptionManager<F> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            registry: Registry::new(),
            cache: HashMap::new(),
            socket: SocketState::Closed,
            _feed: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn socket_state(&self) -> SocketState {
        self.socket
    }

    /// Whether a socket exists, either connecting or open.
    pub fn has_socket(&self) -> bool {
        self.socket != SocketState::Closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Registry<F::Key> {
        &self.registry
    }

    /// Current query for a subscriber. Handles that aren't registered read as loading.
    pub fn query(&self, handle: Handle) -> Query<F::Value> {
        self.cache.get(&handle).cloned().unwrap_or_default()
    }

    pub fn subscribe(&mut self, key: F::Key) -> (Handle, Vec<Command>) {
        let handle = self.registry.insert(key);
        self.cache.insert(handle, Query::Loading);
        debug!(feed = F::NAME, %handle, subscribers = self.registry.len(), "subscribed");

        let commands = match self.socket {
            SocketState::Closed => {
                self.socket = SocketState::Connecting;
                vec![Command::Open(self.url.clone())]
            }
            SocketState::Connecting => Vec::new(),
            SocketState::Open => self.sync(),
        };

        (handle, commands)
    }

    pub fn unsubscribe(&mut self, handle: Handle) -> Vec<Command> {
        if self.registry.remove(handle).is_none() {
            return Vec::new();
        }
        self.cache.remove(&handle);
        debug!(feed = F::NAME, %handle, subscribers = self.registry.len(), "unsubscribed");

        if self.registry.is_empty() {
            if self.socket == SocketState::Closed {
                return Vec::new();
            }
            self.socket = SocketState::Closed;
            return vec![Command::Close];
        }

        self.sync_if_open()
    }

    pub fn on_open(&mut self) -> Vec<Command> {
        if self.socket != SocketState::Connecting {
            // Nobody is waiting on this socket anymore
            return vec![Command::Close];
        }

        debug!(feed = F::NAME, url = %self.url, "socket open");
        self.socket = SocketState::Open;
        self.sync()
    }

    /// Resend the subscription set; fired on the resync interval.
    pub fn tick(&mut self) -> Vec<Command> {
        self.sync_if_open()
    }

    pub fn on_message(&mut self, text: &str) -> Vec<Command> {
        match F::decode(text) {
            Ok(FeedMessage::Snapshot(snapshot)) => {
                for (handle, key) in self.registry.entries() {
                    self.cache.insert(handle, Query::Success(F::lookup(&snapshot, key)));
                }
            }
            Ok(FeedMessage::Error(message)) => {
                warn!(feed = F::NAME, %message, "server reported an error");
                self.fail_all(&message);
            }
            Err(e) => {
                warn!(feed = F::NAME, error = %e, "undecodable message");
                self.fail_all(&format!("Malformed {} message: {e}", F::NAME));
            }
        }

        Vec::new()
    }

    /// The socket failed. Every subscriber sees the error and the next subscribe reconnects.
    pub fn on_error(&mut self, reason: &str) -> Vec<Command> {
        warn!(feed = F::NAME, %reason, "socket error");
        self.socket = SocketState::Closed;
        self.fail_all(reason);

        Vec::new()
    }

    pub fn on_close(&mut self) -> Vec<Command> {
        if self.socket != SocketState::Closed {
            debug!(feed = F::NAME, "socket closed by server");
        }
        self.socket = SocketState::Closed;

        Vec::new()
    }

    fn fail_all(&mut self, message: &str) {
        for query in self.cache.values_mut() {
            *query = Query::Error(message.to_string());
        }
    }

    fn sync_if_open(&self) -> Vec<Command> {
        match self.socket {
            SocketState::Open => self.sync(),
            _ => Vec::new(),
        }
    }

    fn sync(&self) -> Vec<Command> {
        match F::request(self.registry.keys()) {
            Ok(request) => vec![Command::Send(request)],
            Err(e) => {
                warn!(feed = F::NAME, error = %e, "failed to encode subscription set");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use orecart_transit::{RouteId, StopId};

    use super::*;
    use crate::feed::{ArrivalFeed, ArrivalKey, VanFilter, VanLocationFeed};

    const URL: &str = "ws://test/vans/v2/arrivals/subscribe";

    fn key(stop: u32, route: u32) -> ArrivalKey {
        ArrivalKey::new(StopId::new(stop), RouteId::new(route))
    }

    fn open_manager() -> (SubscriptionManager<ArrivalFeed>, Handle) {
        let mut manager = SubscriptionManager::<ArrivalFeed>::new(URL);
        let (handle, _) = manager.subscribe(key(1, 10));
        manager.on_open();
        (manager, handle)
    }

    #[test]
    fn test_first_subscribe_opens() {
        let mut manager = SubscriptionManager::<ArrivalFeed>::new(URL);
        let (handle, commands) = manager.subscribe(key(1, 10));

        assert_eq!(commands, vec![Command::Open(URL.to_string())]);
        assert_eq!(manager.socket_state(), SocketState::Connecting);
        assert_eq!(manager.query(handle), Query::Loading);

        // A second subscriber while connecting waits for the open
        let (_, commands) = manager.subscribe(key(2, 10));
        assert!(commands.is_empty());

        let commands = manager.on_open();
        assert_eq!(commands, vec![Command::Send(r#"{"1":[10],"2":[10]}"#.into())]);
    }

    #[test]
    fn test_registry_changes_resend() {
        let (mut manager, first) = open_manager();

        let (second, commands) = manager.subscribe(key(1, 20));
        assert_eq!(commands, vec![Command::Send(r#"{"1":[10,20]}"#.into())]);

        let commands = manager.unsubscribe(first);
        assert_eq!(commands, vec![Command::Send(r#"{"1":[20]}"#.into())]);

        assert_eq!(manager.unsubscribe(second), vec![Command::Close]);
        assert!(!manager.has_socket());
    }

    #[test]
    fn test_tick_resends_only_when_open() {
        let mut manager = SubscriptionManager::<ArrivalFeed>::new(URL);
        assert!(manager.tick().is_empty());

        manager.subscribe(key(1, 10));
        assert!(manager.tick().is_empty());

        manager.on_open();
        assert_eq!(manager.tick(), vec![Command::Send(r#"{"1":[10]}"#.into())]);
    }

    #[test]
    fn test_snapshot_updates_every_subscriber() {
        let (mut manager, first) = open_manager();
        let (second, _) = manager.subscribe(key(2, 10));

        manager.on_message(r#"{"type":"arrivals","arrivals":{"1":{"10":120}}}"#);

        assert_eq!(manager.query(first), Query::Success(Some(120)));
        assert_eq!(manager.query(second), Query::Success(None));

        // Last message wins, no merging with the previous snapshot
        manager.on_message(r#"{"type":"arrivals","arrivals":{"2":{"10":30}}}"#);
        assert_eq!(manager.query(first), Query::Success(None));
        assert_eq!(manager.query(second), Query::Success(Some(30)));
    }

    #[test]
    fn test_error_envelope_and_garbage_fail_everyone() {
        let (mut manager, handle) = open_manager();

        manager.on_message(r#"{"type":"error","error":"tracker offline"}"#);
        assert_eq!(manager.query(handle), Query::Error("tracker offline".into()));

        manager.on_message("{not json");
        assert!(manager.query(handle).is_error());
        assert_eq!(manager.socket_state(), SocketState::Open);
    }

    #[test]
    fn test_socket_error_resets_and_next_subscribe_reopens() {
        let (mut manager, handle) = open_manager();

        manager.on_error("Failed to connect websocket");
        assert_eq!(manager.query(handle), Query::Error("Failed to connect websocket".into()));
        assert!(!manager.has_socket());
        assert!(manager.tick().is_empty());

        let (fresh, commands) = manager.subscribe(key(3, 10));
        assert_eq!(commands, vec![Command::Open(URL.to_string())]);
        assert_eq!(manager.query(fresh), Query::Loading);
        // Existing subscribers keep their error until data arrives
        assert!(manager.query(handle).is_error());
    }

    #[test]
    fn test_close_then_last_unsubscribe_sends_nothing() {
        let (mut manager, handle) = open_manager();

        manager.on_close();
        assert!(manager.unsubscribe(handle).is_empty());
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[test]
    fn test_server_close_then_subscribe_reopens() {
        let (mut manager, handle) = open_manager();
        manager.on_message(r#"{"type":"arrivals","arrivals":{"1":{"10":45}}}"#);

        assert!(manager.on_close().is_empty());
        assert!(!manager.has_socket());
        // A clean close keeps the last value
        assert_eq!(manager.query(handle), Query::Success(Some(45)));

        let (_, commands) = manager.subscribe(key(2, 10));
        assert_eq!(commands, vec![Command::Open(URL.to_string())]);

        let commands = manager.on_open();
        assert_eq!(commands, vec![Command::Send(r#"{"1":[10],"2":[10]}"#.into())]);
    }

    #[test]
    fn test_van_snapshot_filtered_per_subscriber() {
        let mut manager = SubscriptionManager::<VanLocationFeed>::new("ws://test/vans/v2/subscribe/");
        let (everything, _) = manager.subscribe(VanFilter::alive());
        let (gold, _) = manager.subscribe(VanFilter::on_routes([RouteId::new(2)]));

        let commands = manager.on_open();
        assert_eq!(
            commands,
            vec![Command::Send(
                r#"{"include":["color","location","routeId"],"query":{"type":"vans","alive":true}}"#.into()
            )]
        );

        manager.on_message(
            r##"{"type":"vans","vans":[
                {"guid":1,"color":"#2b5fab","location":{"latitude":39.75,"longitude":-105.22},"routeId":1},
                {"guid":2,"color":"#f0b323","location":{"latitude":39.74,"longitude":-105.21},"routeId":2}
            ]}"##,
        );

        let all = manager.query(everything).into_data().unwrap();
        assert_eq!(all.len(), 2);

        let on_gold = manager.query(gold).into_data().unwrap();
        assert_eq!(on_gold.len(), 1);
        assert_eq!(on_gold[0].route_id, Some(RouteId::new(2)));
    }

    #[test]
    fn test_open_after_everyone_left_closes() {
        let mut manager = SubscriptionManager::<ArrivalFeed>::new(URL);
        let (handle, _) = manager.subscribe(key(1, 10));

        assert_eq!(manager.unsubscribe(handle), vec![Command::Close]);
        assert_eq!(manager.on_open(), vec![Command::Close]);
        assert_eq!(manager.socket_state(), SocketState::Closed);
    }

    #[test]
    fn test_unknown_handle() {
        let (mut manager, handle) = open_manager();
        manager.unsubscribe(handle);

        assert!(manager.unsubscribe(handle).is_empty());
        assert_eq!(manager.query(handle), Query::Loading);
    }

    /// Socket exists iff there is at least one subscriber, over scripted
    /// subscribe/unsubscribe sequences with the socket opening promptly.
    #[test]
    fn test_socket_tracks_subscriber_count() {
        let scripts: [&[i32]; 5] = [
            &[1, -1],
            &[1, 1, -1, -1],
            &[1, 1, 1, -2, -1, 1, -3, -4],
            &[-1, 1, -1, -1, 1],
            &[1, -1, 1, -2, 1, 1, -3, -4, -5],
        ];

        for script in scripts {
            let mut manager = SubscriptionManager::<ArrivalFeed>::new(URL);
            let mut handles = Vec::new();

            for &step in script {
                if step > 0 {
                    let (handle, commands) = manager.subscribe(key(step as u32, 10));
                    handles.push(handle);
                    if commands.contains(&Command::Open(URL.to_string())) {
                        manager.on_open();
                    }
                } else {
                    // Negative steps unsubscribe the nth handle handed out so far
                    if let Some(&handle) = handles.get((-step - 1) as usize) {
                        manager.unsubscribe(handle);
                    }
                }

                assert_eq!(manager.has_socket(), manager.subscriber_count() > 0, "script {script:?}");
            }
        }
    }
}
