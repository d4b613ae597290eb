//! Per-render expansion state: lookahead event queue, binding scopes and
//! the deferred-action registry.
//!
//! The context wraps a forward-only reader over compiled template content.
//! Handlers inject synthesized events into a FIFO queue that is always
//! drained before the underlying reader, which gives them one-token
//! lookahead and lets injected content take priority over the original
//! stream.
//!
//! Deferred actions simulate suspension without suspending: registering an
//! action injects a paired start/end marker into the stream and returns
//! immediately. The deferred logic runs when the event loop reaches the
//! marker and hands its id to the event handle's `execute_action`.

use std::collections::VecDeque;
use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::render::bindings::Bindings;
use crate::render::event::EventHandle;
use crate::xml::{ATTR_ID, STDLIB_PREFIX, TAG_ACTION_END, TAG_ACTION_START, attr, create_owned_reader};

/// A one-shot deferred callback, executed with the event handle current at
/// the moment its marker is reached.
pub type Action = Box<dyn FnOnce(&mut EventHandle<'_>) -> Result<()>>;

/// Mutable per-render state shared by every event handle of one pass.
pub struct ExpansionContext {
    reader: Reader<Cursor<Vec<u8>>>,
    buf: Vec<u8>,
    queue: VecDeque<Event<'static>>,
    bindings: Bindings,
    actions: FxHashMap<u64, Action>,
    next_action_id: u64,
    at_eof: bool,
}

impl ExpansionContext {
    /// Create a context over compiled document content.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            reader: create_owned_reader(content.into()),
            buf: Vec::new(),
            queue: VecDeque::new(),
            bindings: Bindings::new(),
            actions: FxHashMap::default(),
            next_action_id: 0,
            at_eof: false,
        }
    }

    /// Whether another event is available from the queue or the reader.
    pub fn has_next_event(&mut self) -> Result<bool> {
        Ok(self.peek_event()?.is_some())
    }

    /// Look at the next event without consuming it.
    ///
    /// Injected events are seen before underlying-source events; when the
    /// queue is empty one source event is pulled in so repeated peeks stay
    /// stable.
    pub fn peek_event(&mut self) -> Result<Option<&Event<'static>>> {
        if self.queue.is_empty()
            && let Some(event) = self.pull()?
        {
            self.queue.push_back(event);
        }
        Ok(self.queue.front())
    }

    /// Consume the next event: queued events first, then the reader.
    pub fn next_event(&mut self) -> Result<Option<Event<'static>>> {
        if let Some(event) = self.queue.pop_front() {
            return Ok(Some(event));
        }
        self.pull()
    }

    /// Append a synthesized event to the injected-event queue.
    pub fn queue_event(&mut self, event: Event<'static>) {
        self.queue.push_back(event);
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    /// Open a binding scope around the element being processed.
    pub fn start_scope(&mut self, top_level: bool) {
        self.bindings.start_scope(top_level);
    }

    /// Close the innermost binding scope.
    pub fn end_scope(&mut self) -> Result<()> {
        self.bindings.end_scope()
    }

    /// Register a deferred action and inject its paired markers.
    ///
    /// Returns the generated action id; the same id is carried by both
    /// markers. Control returns immediately, and the action runs when the
    /// event loop reaches the start marker.
    pub fn queue_action(&mut self, action: Action) -> u64 {
        let id = self.next_action_id;
        self.next_action_id += 1;
        self.actions.insert(id, action);

        self.queue_event(action_marker(TAG_ACTION_START, id));
        self.queue_event(action_marker(TAG_ACTION_END, id));
        id
    }

    /// Remove the action registered under `id`. Each action can be taken
    /// exactly once; an unknown or already-consumed id is fatal.
    pub(crate) fn take_action(&mut self, id: u64) -> Result<Action> {
        self.actions.remove(&id).ok_or(Error::NoSuchAction(id))
    }

    /// Number of registered, not-yet-executed actions.
    pub fn pending_actions(&self) -> usize {
        self.actions.len()
    }

    fn pull(&mut self) -> Result<Option<Event<'static>>> {
        if self.at_eof {
            return Ok(None);
        }
        self.buf.clear();
        match self.reader.read_event_into(&mut self.buf)? {
            Event::Eof => {
                self.at_eof = true;
                Ok(None)
            }
            event => Ok(Some(event.into_owned())),
        }
    }
}

/// Build one action marker: an empty stdlib-namespace element carrying the
/// action id.
fn action_marker(local: &str, id: u64) -> Event<'static> {
    let mut elem = BytesStart::new(format!("{STDLIB_PREFIX}:{local}"));
    elem.push_attribute((format!("xmlns:{STDLIB_PREFIX}").as_str(), crate::xml::NS_STDLIB));
    elem.push_attribute((ATTR_ID, id.to_string().as_str()));
    Event::Empty(elem)
}

/// True when `elem` is an action-start marker.
pub fn is_action_start(elem: &BytesStart<'_>) -> bool {
    elem.local_name().as_ref() == TAG_ACTION_START.as_bytes()
}

/// True when `elem` is an action-end marker.
pub fn is_action_end(elem: &BytesStart<'_>) -> bool {
    elem.local_name().as_ref() == TAG_ACTION_END.as_bytes()
}

/// Action id carried by a marker element.
pub fn action_id(elem: &BytesStart<'_>) -> Option<u64> {
    attr(elem, ATTR_ID)?.parse().ok()
}
