//! The session controller: stopwatch state, event log, pallet counter, and
//! the two-phase staging workflow for annotated events.
//!
//! All session state lives in one [`Session`] and every mutation goes through
//! a controller method. Methods never read the ambient clock; the caller
//! supplies the current instant, so event timestamps always reflect the
//! moment an action was triggered.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::event::{AnnotatedKind, Event, EventKind};

/// A rejected state transition. The session is left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// `start` was called while the clock was running.
    #[error("the clock is already running")]
    AlreadyRunning,

    /// A logging action was attempted while the clock was not running.
    #[error("the clock is not running")]
    NotRunning,

    /// An action was attempted while a staged event awaits its description.
    #[error("an annotation is awaiting resolution")]
    AnnotationPending,

    /// `submit`/`cancel` was called with nothing staged.
    #[error("no annotation is awaiting resolution")]
    NoPendingAnnotation,
}

/// Stopwatch state.
///
/// `Stopped` keeps the frozen display value; `Idle` is the pre-start /
/// post-reset state with nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    Idle,
    Running { started_at: DateTime<Utc> },
    Stopped { elapsed_ms: u64 },
}

/// A staged annotated event awaiting its description.
///
/// Timestamp and duration are captured at the instant the action was
/// triggered, so time spent typing the description never leaks into the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    pub kind: AnnotatedKind,
    pub captured_at: DateTime<Utc>,
    pub captured_duration_ms: u64,
}

/// Annotation sub-state of the controller. At most one event is ever staged;
/// `submit_annotation` and `cancel_annotation` are the only exits from
/// `AwaitingAnnotation`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingAnnotation(PendingEvent),
}

/// One recording session: clock, append-only event log, and pallet counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    clock: Clock,
    phase: Phase,
    events: Vec<Event>,
    pallet_count: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session with the clock idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: Clock::Idle,
            phase: Phase::Idle,
            events: Vec::new(),
            pallet_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.clock, Clock::Running { .. })
    }

    /// Committed events, in commit order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Pallet-completion events committed so far.
    #[must_use]
    pub const fn pallet_count(&self) -> u32 {
        self.pallet_count
    }

    /// The staged event, if one awaits its description.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingEvent> {
        match &self.phase {
            Phase::AwaitingAnnotation(pending) => Some(pending),
            Phase::Idle => None,
        }
    }

    /// Elapsed display value: `now − started_at` while running, the frozen
    /// value after a stop, 0 before the first start or after a reset.
    #[must_use]
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match self.clock {
            Clock::Idle => 0,
            Clock::Running { started_at } => clamp_ms(now - started_at),
            Clock::Stopped { elapsed_ms } => elapsed_ms,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Starts the stopwatch and logs a "Process Started" event.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<&Event, SessionError> {
        self.ensure_no_pending()?;
        if self.is_running() {
            return Err(SessionError::AlreadyRunning);
        }
        self.clock = Clock::Running { started_at: now };
        let duration_ms = self.duration_since_last(now);
        Ok(self.commit(EventKind::ProcessStarted, now, duration_ms))
    }

    /// Stops the stopwatch, freezing the elapsed display, and logs a
    /// "Process Stopped" event.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<&Event, SessionError> {
        self.ensure_no_pending()?;
        let Clock::Running { started_at } = self.clock else {
            return Err(SessionError::NotRunning);
        };
        self.clock = Clock::Stopped {
            elapsed_ms: clamp_ms(now - started_at),
        };
        let duration_ms = self.duration_since_last(now);
        Ok(self.commit(EventKind::ProcessStopped, now, duration_ms))
    }

    /// Wipes the whole session: clock, event log, pallet counter, and any
    /// staged annotation. Always permitted; appends nothing.
    pub fn reset(&mut self) {
        tracing::debug!(events = self.events.len(), "session reset");
        *self = Self::new();
    }

    /// Logs the end of a downtime period.
    pub fn log_downtime_end(&mut self, now: DateTime<Utc>) -> Result<&Event, SessionError> {
        self.ensure_loggable()?;
        let duration_ms = self.duration_since_last(now);
        Ok(self.commit(EventKind::DowntimeEnd, now, duration_ms))
    }

    /// Logs a completed pallet, stamping it with the next sequence number.
    pub fn log_pallet_complete(&mut self, now: DateTime<Utc>) -> Result<&Event, SessionError> {
        self.ensure_loggable()?;
        self.pallet_count += 1;
        let kind = EventKind::PalletComplete {
            sequence: self.pallet_count,
        };
        let duration_ms = self.duration_since_last(now);
        Ok(self.commit(kind, now, duration_ms))
    }

    /// Stages an annotated event, capturing its timestamp and duration now.
    ///
    /// The event is not committed until [`Self::submit_annotation`]; the
    /// captured values guarantee the log reflects the trigger instant no
    /// matter how long the description takes to type.
    pub fn stage(&mut self, kind: AnnotatedKind, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_loggable()?;
        let pending = PendingEvent {
            kind,
            captured_at: now,
            captured_duration_ms: self.duration_since_last(now),
        };
        tracing::debug!(label = pending.kind.label(), "event staged");
        self.phase = Phase::AwaitingAnnotation(pending);
        Ok(())
    }

    /// Commits the staged event with its captured timestamp and duration.
    ///
    /// An empty description commits the event without one.
    pub fn submit_annotation(&mut self, description: &str) -> Result<&Event, SessionError> {
        let Phase::AwaitingAnnotation(pending) = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return Err(SessionError::NoPendingAnnotation);
        };
        let description = (!description.is_empty()).then(|| description.to_string());
        let kind = pending.kind.with_description(description);
        Ok(self.commit(kind, pending.captured_at, pending.captured_duration_ms))
    }

    /// Discards the staged event. The triggering action leaves no trace.
    pub fn cancel_annotation(&mut self) -> Result<(), SessionError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingAnnotation(pending) => {
                tracing::debug!(label = pending.kind.label(), "staged event discarded");
                Ok(())
            }
            Phase::Idle => Err(SessionError::NoPendingAnnotation),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The single append path. Every committed event funnels through here.
    fn commit(&mut self, kind: EventKind, timestamp: DateTime<Utc>, duration_ms: u64) -> &Event {
        tracing::debug!(label = kind.label(), duration_ms, "event committed");
        let index = self.events.len();
        self.events.push(Event {
            kind,
            timestamp,
            duration_ms,
        });
        &self.events[index]
    }

    /// Milliseconds since the previous committed event, 0 for the first.
    fn duration_since_last(&self, at: DateTime<Utc>) -> u64 {
        self.events
            .last()
            .map_or(0, |last| clamp_ms(at - last.timestamp))
    }

    fn ensure_no_pending(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::AwaitingAnnotation(_) => Err(SessionError::AnnotationPending),
        }
    }

    fn ensure_loggable(&self) -> Result<(), SessionError> {
        self.ensure_no_pending()?;
        if self.is_running() {
            Ok(())
        } else {
            Err(SessionError::NotRunning)
        }
    }
}

/// Non-negative milliseconds; a wall clock stepping backwards clamps to 0.
fn clamp_ms(delta: TimeDelta) -> u64 {
    u64::try_from(delta.num_milliseconds()).unwrap_or(0)
}
