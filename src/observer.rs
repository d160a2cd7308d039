//! Aggregates player notifications into per level media info.
//!
//! Appended buffers are queued as they arrive and parsed on
//! [`MediaInfoObserver::tick`], which the host calls once every
//! [`Config::tick_interval_ms`]. All state lives in the observer,
//! several observers can watch separate players.
//!
//! ```ignore
//! let mut hub = EventHub::new();
//! let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), Config::default());
//!
//! hub.emit(PlayerEvent::LevelSwitching { level: 2 });
//! hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data });
//! observer.tick();
//!
//! println!("{:?}", observer.level(2).map(|l| l.bitrate_map()));
//! ```

use std::{
    collections::{HashMap, VecDeque},
    ops::Range,
    sync::Arc,
};

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, info, trace};

use crate::{
    atom::BoxParser,
    config::Config,
    events::{LoadStats, NotificationSource, PlayerEvent, SubscriptionId},
    level::{LevelId, LevelMediaInfo, MediaLedger},
    sps::SpsDecoder,
    track::TrackType,
};

/// A buffer waiting to be parsed.
#[derive(Debug, Clone)]
pub struct PendingAppend {
    pub level: LevelId,
    pub track: TrackType,
    pub data: Bytes,
}

pub struct MediaInfoObserver {
    config: Config,
    sps: Arc<dyn SpsDecoder + Send + Sync>,
    receiver: Receiver<PlayerEvent>,
    subscription: SubscriptionId,
    pending: VecDeque<PendingAppend>,
    ledger: MediaLedger,
    /// Level new appends are attributed to.
    append_level: Option<LevelId>,
    /// Level currently playing.
    current_level: Option<LevelId>,
    /// Bytes loaded since the last tick.
    loaded_since_tick: u64,
    /// Bytes of the in-flight fragment already counted.
    in_flight: u64,
    /// Bytes per second.
    download_speed: f64,
    progress: Vec<Sender<f64>>,
}

impl std::fmt::Debug for MediaInfoObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaInfoObserver")
            .field("config", &self.config)
            .field("subscription", &self.subscription)
            .field("pending", &self.pending.len())
            .field("levels", &self.ledger.len())
            .field("append_level", &self.append_level)
            .field("current_level", &self.current_level)
            .field("download_speed", &self.download_speed)
            .finish()
    }
}

impl MediaInfoObserver {
    /// Subscribes to `source`. `sps` decodes the SPS NAL units
    /// found in video init segments.
    pub fn attach(
        source: &mut dyn NotificationSource,
        sps: Box<dyn SpsDecoder + Send + Sync>,
        config: Config,
    ) -> Self {
        let (sender, receiver) = channel::unbounded();
        let subscription = source.subscribe(sender);
        debug!("Attached as subscriber {}", subscription.0);

        Self {
            config,
            sps: Arc::from(sps),
            receiver,
            subscription,
            pending: VecDeque::new(),
            ledger: MediaLedger::new(),
            append_level: None,
            current_level: None,
            loaded_since_tick: 0,
            in_flight: 0,
            download_speed: 0.,
            progress: Vec::new(),
        }
    }

    /// Unsubscribes from `source`. Queued appends are discarded.
    pub fn shutdown(self, source: &mut dyn NotificationSource) {
        source.unsubscribe(self.subscription);
        info!("Shut down with {} pending appends discarded", self.pending.len());
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receives load progress ratios in `[0, 1]`.
    pub fn subscribe_progress(&mut self) -> Receiver<f64> {
        let (sender, receiver) = channel::unbounded();
        self.progress.push(sender);
        receiver
    }

    pub fn levels(&self) -> &HashMap<LevelId, LevelMediaInfo> {
        self.ledger.levels()
    }

    pub fn level(&self, level: LevelId) -> Option<&LevelMediaInfo> {
        self.ledger.get(level)
    }

    /// Media info for the level currently playing.
    pub fn current(&self) -> Option<&LevelMediaInfo> {
        self.current_level.and_then(|l| self.ledger.get(l))
    }

    pub fn current_level(&self) -> Option<LevelId> {
        self.current_level
    }

    /// Bytes per second, as of the last tick.
    pub fn download_speed(&self) -> f64 {
        self.download_speed
    }

    /// Appends received but not yet parsed.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Handles a single notification.
    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::FragLoading { .. } => {
                self.in_flight = 0;
                self.emit_progress(0.);
            },
            PlayerEvent::FragLoadProgress { stats, .. } => {
                self.count_loaded(&stats);
                self.emit_progress(stats.ratio());
            },
            PlayerEvent::FragLoaded { stats, .. } => {
                self.count_loaded(&stats);
                self.in_flight = 0;
                self.emit_progress(0.);
            },
            PlayerEvent::BufferAppending { track, data } => match self.append_level {
                Some(level) => self.pending.push_back(PendingAppend { level, track, data }),
                None => debug!("Dropping {track} append of {} bytes before any level switch", data.len()),
            },
            PlayerEvent::LevelSwitching { level } => {
                self.append_level = Some(level);
                self.ledger.level_mut(level);
            },
            PlayerEvent::LevelSwitched { level } => {
                self.append_level = Some(level);
                self.current_level = Some(level);
                self.ledger.level_mut(level);
            },
        }
    }

    /// Handles every notification delivered so far.
    fn pump(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    trace!("Notification source gone");
                    break;
                }
            }
        }
    }

    /// Parses all queued appends in arrival order, then
    /// updates combined bitrates for the touched seconds and
    /// samples download speed. Returns the number of appends parsed.
    pub fn tick(&mut self) -> usize {
        let sps = Arc::clone(&self.sps);
        let parser = BoxParser::new(sps.as_ref());
        let mut touched: HashMap<LevelId, Vec<Range<u64>>> = HashMap::new();
        let mut drained = 0;

        loop {
            self.pump();
            let Some(entry) = self.pending.pop_front() else {
                break;
            };
            let ranges = self.ledger.ingest(entry.level, entry.track, &entry.data, &parser);
            if !ranges.is_empty() {
                touched.entry(entry.level).or_default().extend(ranges);
            }
            drained += 1;
        }

        if !touched.is_empty() {
            trace!("Merging bitrates for {} levels", touched.len());
            self.ledger.merge(&touched);
        }

        self.sample_speed();

        drained
    }

    fn count_loaded(&mut self, stats: &LoadStats) {
        let delta = stats.loaded.saturating_sub(self.in_flight);
        self.loaded_since_tick += delta;
        self.in_flight = self.in_flight.max(stats.loaded);
    }

    fn sample_speed(&mut self) {
        let seconds = self.config.tick_interval_ms as f64 / 1000.;
        self.download_speed = match seconds > 0. {
            true => self.loaded_since_tick as f64 / seconds,
            false => 0.,
        };
        self.loaded_since_tick = 0;
    }

    fn emit_progress(&mut self, ratio: f64) {
        self.progress.retain(|sender| sender.send(ratio).is_ok());
    }
}
