//! Player notifications and the subscription seam
//! between a player and [`MediaInfoObserver`](crate::observer::MediaInfoObserver).

use bytes::Bytes;
use crossbeam::channel::Sender;
use tracing::trace;

use crate::{level::LevelId, track::TrackType};

/// Identifies a fragment being loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentRef {
    pub level: LevelId,
    /// Media sequence number.
    pub sn: u64,
    pub url: String,
}

/// Byte counts for a fragment download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: u64,
    pub total: u64,
}

impl LoadStats {
    /// `loaded / total` clamped to `[0, 1]`, `0` if the total is unknown.
    pub fn ratio(&self) -> f64 {
        match self.total {
            0 => 0.,
            total => (self.loaded as f64 / total as f64).clamp(0., 1.),
        }
    }
}

/// Notifications a player emits while streaming.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    FragLoading { frag: FragmentRef, stats: LoadStats },
    FragLoadProgress { frag: FragmentRef, stats: LoadStats },
    FragLoaded { frag: FragmentRef, stats: LoadStats },
    /// An init segment or media segment about to
    /// be appended to the source buffer of `track`.
    BufferAppending { track: TrackType, data: Bytes },
    /// Segments appended from now on belong to `level`.
    LevelSwitching { level: LevelId },
    /// `level` is now playing.
    LevelSwitched { level: LevelId },
}

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Something that delivers [`PlayerEvent`]s to subscribers.
pub trait NotificationSource {
    fn subscribe(&mut self, sender: Sender<PlayerEvent>) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Broadcasts events to every subscribed channel.
#[derive(Debug, Default)]
pub struct EventHub {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<PlayerEvent>)>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Sends a clone of `event` to every subscriber.
    /// Subscribers whose receiver is gone are dropped.
    pub fn emit(&mut self, event: PlayerEvent) {
        self.subscribers.retain(|(id, sender)| {
            let alive = sender.send(event.clone()).is_ok();
            if !alive {
                trace!("Dropping disconnected subscriber {}", id.0);
            }
            alive
        });
    }
}

impl NotificationSource for EventHub {
    fn subscribe(&mut self, sender: Sender<PlayerEvent>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, sender));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(i, _)| *i != id);
    }
}
