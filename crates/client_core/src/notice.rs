//! Single-slot, self-expiring error banner.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

use crate::events::GameEvent;

pub const NOTICE_TTL: Duration = Duration::from_secs(10);

#[derive(Default)]
struct NoticeSlot {
    message: Option<String>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
    closed: bool,
}

impl NoticeSlot {
    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

pub struct TransientNotice {
    ttl: Duration,
    slot: Arc<Mutex<NoticeSlot>>,
    events: broadcast::Sender<GameEvent>,
}

impl TransientNotice {
    pub fn new(ttl: Duration, events: broadcast::Sender<GameEvent>) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(NoticeSlot::default())),
            events,
        }
    }

    /// Replaces whatever is showing and restarts the expiry clock.
    pub async fn show(&self, message: impl Into<String>) {
        let message = message.into();
        let mut slot = self.slot.lock().await;
        if slot.closed {
            return;
        }
        slot.cancel_expiry();
        slot.generation += 1;
        slot.message = Some(message.clone());

        let generation = slot.generation;
        let ttl = self.ttl;
        let shared = Arc::clone(&self.slot);
        let events = self.events.clone();
        slot.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut slot = shared.lock().await;
            if slot.generation != generation {
                return;
            }
            slot.expiry = None;
            if slot.message.take().is_some() {
                let _ = events.send(GameEvent::NoticeCleared);
            }
        }));
        drop(slot);

        let _ = self.events.send(GameEvent::NoticeShown(message));
    }

    /// Dismisses the banner early (user close, or a new action starting).
    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        slot.cancel_expiry();
        if slot.message.take().is_some() {
            let _ = self.events.send(GameEvent::NoticeCleared);
        }
    }

    pub async fn current(&self) -> Option<String> {
        self.slot.lock().await.message.clone()
    }

    pub(crate) async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        slot.closed = true;
        slot.cancel_expiry();
    }
}
