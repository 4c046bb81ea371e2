//! # History Log
//!
//! Records snapshots of a document as a sequence of time-coalesced
//! [`Session`]s and moves a cursor over them for undo/redo.
//!
//! ## Design
//!
//! - The owner feeds every changed snapshot to [`History::observe`]
//! - A snapshot equal to the current record is ignored
//! - While the current session's window is open the snapshot replaces its
//!   data; otherwise the session is sealed, any records after the cursor are
//!   dropped, and a new open session is pushed
//! - [`History::go`] hands the target snapshot to a redoer. The log is asleep
//!   for the duration, so snapshots observed while the redoer mutates the
//!   document are not recorded
//! - A save point marks the cursor with no unsaved changes
//!
//! All methods take `&self`: the redoer usually mutates the very document
//! whose change hook calls back into `observe`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let history = History::new(&HistoryConfig::default(), Rc::new(SystemClock::new()));
//! history.observe(Some(doc.export(ExportStage::Serialize)));
//!
//! // ... edit, observe ...
//!
//! history.back(|schema| doc.import(&schema));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::rc::Rc;

use bitflags::bitflags;
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::codec::{JsonCodec, SnapshotCodec};
use crate::config::HistoryConfig;
use crate::session::Session;

bitflags! {
    /// Cursor position summary
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HistoryState: u8 {
        const UNDOABLE = 1;
        const REDOABLE = 2;
        /// The cursor sits on the save point
        const UNMODIFIED = 4;
    }
}

type CursorListener = Box<dyn Fn(usize)>;
type StateListener = Box<dyn Fn(HistoryState)>;

pub struct History<S, C = JsonCodec> {
    records: RefCell<Vec<Session>>,
    cursor: Cell<usize>,
    /// Cursor of the saved record; `None` once that record was discarded
    point: Cell<Option<usize>>,
    asleep: Cell<bool>,
    time_gap: u64,
    clock: Rc<dyn Clock>,
    codec: C,
    cursor_listeners: RefCell<Vec<CursorListener>>,
    state_listeners: RefCell<Vec<StateListener>>,
    _snapshot: PhantomData<fn() -> S>,
}

impl<S> History<S, JsonCodec>
where
    JsonCodec: SnapshotCodec<S>,
{
    pub fn new(config: &HistoryConfig, clock: Rc<dyn Clock>) -> Self {
        Self::with_codec(config, clock, JsonCodec)
    }
}

impl<S, C> History<S, C>
where
    C: SnapshotCodec<S>,
{
    /// Start with a single open, empty session at cursor 0
    pub fn with_codec(config: &HistoryConfig, clock: Rc<dyn Clock>, codec: C) -> Self {
        let session = Session::new(0, None, clock.now(), config.time_gap_ms);
        Self {
            records: RefCell::new(vec![session]),
            cursor: Cell::new(0),
            point: Cell::new(Some(0)),
            asleep: Cell::new(false),
            time_gap: config.time_gap_ms,
            clock,
            codec,
            cursor_listeners: RefCell::new(Vec::new()),
            state_listeners: RefCell::new(Vec::new()),
            _snapshot: PhantomData,
        }
    }

    /// Feed the latest snapshot. No-op while asleep or for `None`.
    pub fn observe(&self, snapshot: Option<S>) {
        if self.asleep.get() {
            return;
        }
        let Some(snapshot) = snapshot else {
            return;
        };
        let data = match self.codec.serialize(&snapshot) {
            Ok(data) => data,
            Err(err) => {
                error!(error = %err, "failed to serialize history snapshot");
                return;
            }
        };

        let now = self.clock.now();
        let last_state = self.state();
        {
            let mut records = self.records.borrow_mut();
            let cursor = self.cursor.get();
            let Some(session) = records.get_mut(cursor) else {
                return;
            };

            if session.data() == Some(data.as_str()) {
                return;
            }
            if session.log(data.clone(), now) {
                debug!(cursor, "coalesced change into open session");
                return;
            }

            session.end();
            let next = cursor + 1;
            records.truncate(next);
            if self.point.get().is_some_and(|point| point >= next) {
                self.point.set(None);
            }
            records.push(Session::new(next, Some(data), now, self.time_gap));
            self.cursor.set(next);
            debug!(cursor = next, records = records.len(), "opened history session");
        }

        self.notify_state(last_state);
    }

    /// Move to `cursor` (clamped) and apply its snapshot through `redoer`.
    ///
    /// Decode or redoer failures are logged; the cursor still moves, so the
    /// live document may then differ from the recorded snapshot. Returns
    /// whether the cursor moved.
    pub fn go<F, E>(&self, cursor: usize, redoer: F) -> bool
    where
        F: FnOnce(S) -> Result<(), E>,
        E: Display,
    {
        let current = self.cursor.get();
        let target = cursor.min(self.records_len().saturating_sub(1));
        if target == current {
            return false;
        }

        let last_state = self.state();
        let data = {
            let mut records = self.records.borrow_mut();
            if let Some(session) = records.get_mut(current) {
                session.end();
            }
            records
                .get(target)
                .and_then(|session| session.data().map(str::to_owned))
        };

        {
            let _asleep = Asleep::acquire(&self.asleep);
            match data {
                Some(data) => match self.codec.deserialize(&data) {
                    Ok(snapshot) => {
                        if let Err(err) = redoer(snapshot) {
                            error!(error = %err, cursor = target, "failed to apply history snapshot");
                        }
                    }
                    Err(err) => {
                        error!(error = %err, cursor = target, "failed to decode history snapshot");
                    }
                },
                None => warn!(cursor = target, "history record has no snapshot"),
            }
            for listener in self.cursor_listeners.borrow().iter() {
                listener(target);
            }
        }

        self.cursor.set(target);
        debug!(from = current, to = target, "moved history cursor");
        self.notify_state(last_state);
        true
    }

    pub fn back<F, E>(&self, redoer: F) -> bool
    where
        F: FnOnce(S) -> Result<(), E>,
        E: Display,
    {
        match self.cursor.get().checked_sub(1) {
            Some(cursor) => self.go(cursor, redoer),
            None => false,
        }
    }

    pub fn forward<F, E>(&self, redoer: F) -> bool
    where
        F: FnOnce(S) -> Result<(), E>,
        E: Display,
    {
        self.go(self.cursor.get() + 1, redoer)
    }

    /// Seal the current session and mark it as saved
    pub fn save_point(&self) {
        let last_state = self.state();
        self.end();
        self.point.set(Some(self.cursor.get()));
        self.notify_state(last_state);
    }

    /// Seal the current session without saving
    pub fn end(&self) {
        if let Some(session) = self.records.borrow_mut().get_mut(self.cursor.get()) {
            session.end();
        }
    }

    pub fn state(&self) -> HistoryState {
        let cursor = self.cursor.get();
        let mut state = HistoryState::empty();
        if cursor > 0 {
            state |= HistoryState::UNDOABLE;
        }
        if cursor + 1 < self.records_len() {
            state |= HistoryState::REDOABLE;
        }
        if self.point.get() == Some(cursor) {
            state |= HistoryState::UNMODIFIED;
        }
        state
    }

    pub fn is_undoable(&self) -> bool {
        self.state().contains(HistoryState::UNDOABLE)
    }

    pub fn is_redoable(&self) -> bool {
        self.state().contains(HistoryState::REDOABLE)
    }

    pub fn is_modified(&self) -> bool {
        !self.state().contains(HistoryState::UNMODIFIED)
    }

    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub fn point(&self) -> Option<usize> {
        self.point.get()
    }

    pub fn records_len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn time_gap(&self) -> u64 {
        self.time_gap
    }

    /// True while a redoer is running
    pub fn is_asleep(&self) -> bool {
        self.asleep.get()
    }

    /// Called with the new cursor after each successful `go`. Listeners must
    /// not register further listeners from inside the callback.
    pub fn on_cursor_change(&self, listener: impl Fn(usize) + 'static) {
        self.cursor_listeners.borrow_mut().push(Box::new(listener));
    }

    /// Called whenever the state mask changes
    pub fn on_state_change(&self, listener: impl Fn(HistoryState) + 'static) {
        self.state_listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify_state(&self, last_state: HistoryState) {
        let state = self.state();
        if state == last_state {
            return;
        }
        for listener in self.state_listeners.borrow().iter() {
            listener(state);
        }
    }
}

impl<S, C> fmt::Debug for History<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("cursor", &self.cursor.get())
            .field("point", &self.point.get())
            .field("records", &self.records.borrow().len())
            .field("asleep", &self.asleep.get())
            .field("time_gap", &self.time_gap)
            .finish()
    }
}

/// Holds the asleep flag for one replay; released on drop, including unwind
struct Asleep<'a>(&'a Cell<bool>);

impl<'a> Asleep<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for Asleep<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
