//! Incremental program guide builder.
//!
//! Sections are pushed through an [`EpgWriter`] into an unbounded queue. One
//! worker task drains the queue in arrival order, one event at a time, and
//! pauses briefly after every event so it does not monopolise the runtime.
//!
//! ```text
//! EpgWriter::write ──▶ mpsc queue ──▶ worker ──▶ EpgBuilder ──▶ ProgramStore
//!                                        │
//!                      EpgWriter::end ───┘ close, drain, drop index, return store
//! ```

mod builder;
mod descriptors;
mod extended;
mod state;
mod version;

use std::time::Duration;

use epg_protocol::{time, EitSection};
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use builder::EpgBuilder;
pub use extended::ExtendedText;
pub use state::{EventIndex, EventState};
pub use version::{KeyedVersionCheck, KeyedVersionDict, VersionDict};

/// Default pause after each processed event.
pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_millis(10);

/// Builder and worker settings.
#[derive(Debug, Clone)]
pub struct EpgConfig {
    /// Pause after each event. Zero only yields to the scheduler.
    pub yield_interval: Duration,
    /// Duration stored for events whose duration is undefined.
    pub unknown_duration_ms: i64,
    /// Comparison used by the audio and event group version gates.
    pub keyed_version_check: KeyedVersionCheck,
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            yield_interval: DEFAULT_YIELD_INTERVAL,
            unknown_duration_ms: time::UNKNOWN_DURATION_PLACEHOLDER_MS,
            keyed_version_check: KeyedVersionCheck::default(),
        }
    }
}

/// Counters reported when the worker shuts down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpgStats {
    pub sections: u64,
    pub events: u64,
    /// Events skipped because their start time was unknown on first sighting.
    pub dropped_events: u64,
    pub programs_created: u64,
    pub store_writes: u64,
    pub store_errors: u64,
}

#[derive(Debug)]
enum Message {
    Section(Box<EitSection>),
    End,
}

/// Handle for feeding sections to a running builder.
#[derive(Debug, Clone)]
pub struct EpgWriter {
    tx: mpsc::UnboundedSender<Message>,
}

impl EpgWriter {
    /// Queue a section. Never blocks.
    ///
    /// Returns `false` once the builder has shut down; the section is dropped.
    pub fn write(&self, section: EitSection) -> bool {
        self.tx.send(Message::Section(Box::new(section))).is_ok()
    }

    /// Signal end of stream. Sections already queued are still processed.
    pub fn end(&self) {
        let _ = self.tx.send(Message::End);
    }

    /// Whether the builder has stopped accepting sections.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Entry point for running a builder on its own task.
pub struct Epg;

impl Epg {
    /// Spawn the worker. The join handle resolves to the store after
    /// [`EpgWriter::end`] (or after every writer is dropped) once the queue
    /// has been drained.
    pub fn spawn<S: crate::store::ProgramStore>(
        store: S,
        config: EpgConfig,
    ) -> (EpgWriter, JoinHandle<S>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let builder = EpgBuilder::new(store, config);
        let handle = tokio::spawn(run(builder, rx));
        (EpgWriter { tx }, handle)
    }
}

async fn run<S: crate::store::ProgramStore>(
    mut builder: EpgBuilder<S>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) -> S {
    let interval = builder.config().yield_interval;
    debug!("EPG worker started");

    while let Some(message) = rx.recv().await {
        match message {
            Message::Section(section) => {
                builder.begin_section(&section);
                for event in &section.events {
                    builder.process_event(&section, event);
                    pause(interval).await;
                }
            }
            Message::End => {
                debug!("EPG end of stream, draining queue");
                rx.close();
            }
        }
    }

    let stats = builder.stats().clone();
    info!(
        "EPG finished: sections={} events={} dropped={} created={} writes={} errors={} tracked={}",
        stats.sections,
        stats.events,
        stats.dropped_events,
        stats.programs_created,
        stats.store_writes,
        stats.store_errors,
        builder.tracked_events()
    );
    builder.into_store()
}

async fn pause(interval: Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}
