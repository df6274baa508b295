//! VSync tick handoff
//!
//! The vsync side never runs the motion core itself. It posts a signal into
//! a queue of depth one; a single consumer drains the queue and runs one
//! core tick per accepted signal. A signal arriving while one is still
//! pending is coalesced instead of nesting a second tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::output::OutputSink;
use crate::sim::{self, MotionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VsyncMessage {
    Blank,
    Stop,
}

/// Outcome of posting a vsync signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Queued for the consumer
    Accepted,
    /// A tick was already pending; this one was folded into it
    Coalesced,
    /// The consumer is gone
    Closed,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    coalesced: AtomicU64,
    stop_requested: AtomicBool,
}

/// Snapshot of producer-side counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VsyncStats {
    pub accepted: u64,
    pub coalesced: u64,
}

impl Counters {
    fn snapshot(&self) -> VsyncStats {
        VsyncStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Producer half, owned by whatever observes the vertical blank
#[derive(Debug)]
pub struct VsyncSource {
    tx: SyncSender<VsyncMessage>,
    counters: Arc<Counters>,
}

/// Consumer half, drained by a `TickLoop`
#[derive(Debug)]
pub struct TickQueue {
    rx: Receiver<VsyncMessage>,
    counters: Arc<Counters>,
}

/// Create a connected source/queue pair
pub fn channel() -> (VsyncSource, TickQueue) {
    let (tx, rx) = mpsc::sync_channel(1);
    let counters = Arc::new(Counters::default());
    (
        VsyncSource {
            tx,
            counters: Arc::clone(&counters),
        },
        TickQueue { rx, counters },
    )
}

impl VsyncSource {
    /// Post a vertical-blank signal without blocking
    pub fn signal(&self) -> Signal {
        if self.counters.stop_requested.load(Ordering::Acquire) {
            return Signal::Closed;
        }
        match self.tx.try_send(VsyncMessage::Blank) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                Signal::Accepted
            }
            Err(TrySendError::Full(_)) => {
                let missed = self.counters.coalesced.fetch_add(1, Ordering::Relaxed) + 1;
                log::warn!("VSync signal coalesced, tick still pending ({missed} total)");
                Signal::Coalesced
            }
            Err(TrySendError::Disconnected(_)) => Signal::Closed,
        }
    }

    /// Ask the consumer to stop once pending work is drained
    ///
    /// Never blocks. When a tick is already queued the `Stop` message is
    /// dropped and the consumer sees the flag after handling that tick.
    pub fn stop(&self) {
        self.counters.stop_requested.store(true, Ordering::Release);
        let _ = self.tx.try_send(VsyncMessage::Stop);
    }

    pub fn stats(&self) -> VsyncStats {
        self.counters.snapshot()
    }
}

impl TickQueue {
    pub fn stats(&self) -> VsyncStats {
        self.counters.snapshot()
    }

    fn stop_requested(&self) -> bool {
        self.counters.stop_requested.load(Ordering::Acquire)
    }
}

/// Why a `TickLoop` run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Explicit stop request
    Requested,
    /// All producers dropped
    Disconnected,
    /// Frame limit reached
    FrameLimit,
}

/// Result of a `TickLoop` run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// VSync signals consumed during the run
    pub vsyncs: u64,
    /// Core ticks executed during the run
    pub ticks: u64,
    pub reason: StopReason,
}

/// Single consumer that owns the motion state and its output sink
#[derive(Debug)]
pub struct TickLoop<S: OutputSink> {
    state: MotionState,
    sink: S,
    /// Run the core every `cycle`-th vsync
    cycle: u32,
    vsyncs: u64,
}

impl<S: OutputSink> TickLoop<S> {
    /// Registers every slot's pattern and priority with the sink
    pub fn new(state: MotionState, mut sink: S, cycle: u32) -> Result<Self, ConfigurationError> {
        if cycle == 0 {
            return Err(ConfigurationError::ZeroCycle);
        }
        sim::register(&state, &mut sink);
        Ok(Self {
            state,
            sink,
            cycle,
            vsyncs: 0,
        })
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (MotionState, S) {
        (self.state, self.sink)
    }

    /// Handle one vertical blank; returns whether the core ticked
    pub fn on_vsync(&mut self) -> bool {
        self.vsyncs += 1;
        if self.vsyncs % self.cycle as u64 != 0 {
            return false;
        }
        sim::tick(&mut self.state, &mut self.sink);
        true
    }

    /// Process signals until stopped or every producer is gone
    pub fn run(&mut self, queue: &TickQueue) -> RunSummary {
        self.run_until(queue, None)
    }

    /// Process signals until `frames` core ticks have run, or stopped earlier
    pub fn run_for(&mut self, queue: &TickQueue, frames: u64) -> RunSummary {
        self.run_until(queue, Some(frames))
    }

    fn run_until(&mut self, queue: &TickQueue, frames: Option<u64>) -> RunSummary {
        let mut vsyncs = 0;
        let mut ticks = 0;

        let reason = loop {
            if frames.is_some_and(|limit| ticks >= limit) {
                break StopReason::FrameLimit;
            }
            if queue.stop_requested() {
                // Drain the one tick that may still be queued
                if let Ok(VsyncMessage::Blank) = queue.rx.try_recv() {
                    vsyncs += 1;
                    if self.on_vsync() {
                        ticks += 1;
                    }
                }
                break StopReason::Requested;
            }
            match queue.rx.recv() {
                Ok(VsyncMessage::Blank) => {
                    vsyncs += 1;
                    if self.on_vsync() {
                        ticks += 1;
                        log::trace!("Tick {} published", self.state.frame());
                    }
                }
                Ok(VsyncMessage::Stop) => break StopReason::Requested,
                Err(RecvError) => break StopReason::Disconnected,
            }
        };

        log::debug!(
            "Tick loop ended ({reason:?}): {vsyncs} vsyncs, {ticks} ticks, frame {}",
            self.state.frame()
        );
        RunSummary {
            vsyncs,
            ticks,
            reason,
        }
    }
}

/// Software vsync source: signals at a fixed refresh rate on its own thread
#[derive(Debug)]
pub struct Ticker {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<VsyncStats>>,
}

impl Ticker {
    pub fn spawn(source: VsyncSource, refresh_hz: u32) -> std::io::Result<Self> {
        let period = Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("sprite-motion-vsync".into())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    thread::sleep(period);
                    if source.signal() == Signal::Closed {
                        break;
                    }
                }
                source.stats()
            })?;
        log::debug!("VSync ticker started at {refresh_hz} Hz");
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop signalling and return the producer counters
    pub fn stop(mut self) -> VsyncStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> VsyncStats {
        self.running.store(false, Ordering::Release);
        match self.handle.take().map(|h| h.join()) {
            Some(Ok(stats)) => stats,
            Some(Err(_)) => {
                log::error!("VSync ticker thread panicked");
                VsyncStats::default()
            }
            None => VsyncStats::default(),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SpriteRegisterFile;
    use crate::sim::MotionConfig;

    fn test_state(count: usize) -> MotionState {
        MotionState::initialize(MotionConfig {
            count,
            seed: Some(11),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_pending_signal_is_coalesced() {
        let (source, queue) = channel();
        assert_eq!(source.signal(), Signal::Accepted);
        assert_eq!(source.signal(), Signal::Coalesced);
        assert_eq!(source.signal(), Signal::Coalesced);
        assert_eq!(
            queue.stats(),
            VsyncStats {
                accepted: 1,
                coalesced: 2
            }
        );
    }

    #[test]
    fn test_signal_after_consumer_dropped() {
        let (source, queue) = channel();
        drop(queue);
        assert_eq!(source.signal(), Signal::Closed);
    }

    #[test]
    fn test_zero_cycle_rejected() {
        let result = TickLoop::new(test_state(2), SpriteRegisterFile::new(2), 0);
        assert!(matches!(result, Err(ConfigurationError::ZeroCycle)));
    }

    #[test]
    fn test_new_registers_slots() {
        let tick_loop = TickLoop::new(test_state(2), SpriteRegisterFile::new(2), 1).unwrap();
        assert_eq!(tick_loop.sink().slot(0).unwrap().code, 0x101);
        assert_eq!(tick_loop.sink().slot(1).unwrap().code, 0x201);
        assert_eq!(tick_loop.sink().slot(0).unwrap().priority, 3);
        assert_eq!(tick_loop.sink().slot(1).unwrap().priority, 1);
    }

    #[test]
    fn test_cycle_divides_vsyncs() {
        let mut tick_loop = TickLoop::new(test_state(1), SpriteRegisterFile::new(1), 3).unwrap();
        let ticked: Vec<bool> = (0..6).map(|_| tick_loop.on_vsync()).collect();
        assert_eq!(ticked, vec![false, false, true, false, false, true]);
        assert_eq!(tick_loop.state().frame(), 2);
    }

    #[test]
    fn test_run_processes_then_stops() {
        let (source, queue) = channel();
        let initial = test_state(4);
        let mut expected = initial.clone();
        for _ in 0..4 {
            sim::step(&mut expected);
        }
        let mut tick_loop = TickLoop::new(initial, SpriteRegisterFile::new(4), 1).unwrap();

        let producer = thread::spawn(move || {
            for _ in 0..5 {
                // Blocking until the consumer has room keeps every signal
                while source.signal() == Signal::Coalesced {
                    thread::yield_now();
                }
            }
            source.stop();
        });

        let summary = tick_loop.run(&queue);
        producer.join().unwrap();

        assert_eq!(summary.reason, StopReason::Requested);
        assert_eq!(summary.ticks, 5);
        assert_eq!(tick_loop.state().frame(), 5);
        // Display holds the frame before the last step
        for (slot, entity) in expected.entities().iter().enumerate() {
            let published = tick_loop.sink().slot(slot).unwrap().position();
            assert_eq!(published, entity.position() + glam::IVec2::splat(16));
        }
    }

    #[test]
    fn test_stop_with_pending_tick_does_not_block() {
        let (source, queue) = channel();
        let mut tick_loop = TickLoop::new(test_state(2), SpriteRegisterFile::new(2), 1).unwrap();

        assert_eq!(source.signal(), Signal::Accepted);
        source.stop();
        assert_eq!(source.signal(), Signal::Closed);

        let summary = tick_loop.run(&queue);
        assert_eq!(summary.reason, StopReason::Requested);
        assert_eq!(summary.vsyncs, 1);
        assert_eq!(summary.ticks, 1);
        assert_eq!(tick_loop.state().frame(), 1);
    }

    #[test]
    fn test_stop_on_empty_queue() {
        let (source, queue) = channel();
        let mut tick_loop = TickLoop::new(test_state(1), SpriteRegisterFile::new(1), 1).unwrap();
        source.stop();
        source.stop();
        let summary = tick_loop.run(&queue);
        assert_eq!(summary.reason, StopReason::Requested);
        assert_eq!(summary.ticks, 0);
        // Source still alive; the flag alone keeps later runs from blocking
        assert_eq!(tick_loop.run(&queue).reason, StopReason::Requested);
    }

    #[test]
    fn test_run_ends_when_source_dropped() {
        let (source, queue) = channel();
        let mut tick_loop = TickLoop::new(test_state(1), SpriteRegisterFile::new(1), 1).unwrap();
        source.signal();
        drop(source);
        let summary = tick_loop.run(&queue);
        assert_eq!(summary.reason, StopReason::Disconnected);
        assert_eq!(summary.ticks, 1);
    }

    #[test]
    fn test_run_for_frame_limit_with_ticker() {
        let (source, queue) = channel();
        let mut tick_loop = TickLoop::new(test_state(3), SpriteRegisterFile::new(3), 1).unwrap();
        let ticker = Ticker::spawn(source, 1000).unwrap();

        let summary = tick_loop.run_for(&queue, 10);
        let stats = ticker.stop();

        assert_eq!(summary.reason, StopReason::FrameLimit);
        assert_eq!(summary.ticks, 10);
        assert!(stats.accepted >= 10);
    }
}
