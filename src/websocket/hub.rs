use dashmap::DashMap;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;

type Outbox = mpsc::UnboundedSender<String>;

/// Live sockets per user. A user may have several tabs open.
#[derive(Clone, Default)]
pub struct NotificationHub {
    sockets: Arc<DashMap<i32, Vec<(u64, Outbox)>>>,
    next_id: Arc<AtomicU64>,
}

pub struct Subscription {
    pub id: u64,
    pub inbox: mpsc::UnboundedReceiver<String>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, user_id: i32) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, inbox) = mpsc::unbounded_channel();
        self.sockets.entry(user_id).or_default().push((id, tx));
        Subscription { id, inbox }
    }

    pub fn unsubscribe(&self, user_id: i32, id: u64) {
        self.sockets.remove_if_mut(&user_id, |_, outboxes| {
            outboxes.retain(|(conn, _)| *conn != id);
            outboxes.is_empty()
        });
    }

    /// Serialize `payload` once and fan it out to every socket of `user_id`.
    /// Closed sockets are dropped along the way.
    pub fn push<T: Serialize>(&self, user_id: i32, payload: &T) {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize push for user {}: {}", user_id, e);
                return;
            }
        };

        self.sockets.remove_if_mut(&user_id, |_, outboxes| {
            outboxes.retain(|(_, tx)| tx.send(text.clone()).is_ok());
            outboxes.is_empty()
        });
    }

    pub fn is_online(&self, user_id: i32) -> bool {
        self.sockets.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_reaches_every_socket_of_user() {
        let hub = NotificationHub::new();
        let mut a = hub.subscribe(1);
        let mut b = hub.subscribe(1);
        let mut other = hub.subscribe(2);

        hub.push(1, &serde_json::json!({ "title": "New message" }));

        assert!(a.inbox.recv().await.unwrap().contains("New message"));
        assert!(b.inbox.recv().await.unwrap().contains("New message"));
        assert!(other.inbox.try_recv().is_err());
    }

    #[test]
    fn closed_sockets_are_pruned() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe(3);
        drop(sub);
        hub.push(3, &"ping");
        assert!(!hub.is_online(3));
    }

    #[test]
    fn unsubscribe_removes_user_when_last_socket_goes() {
        let hub = NotificationHub::new();
        let first = hub.subscribe(4);
        let second = hub.subscribe(4);
        hub.unsubscribe(4, first.id);
        assert!(hub.is_online(4));
        hub.unsubscribe(4, second.id);
        assert!(!hub.is_online(4));
    }
}
