//! Handler-facing view over the expansion context.
//!
//! An [`EventHandle`] is created per dispatched event and passed into every
//! invoked handler: it carries the current event and exposes lookahead,
//! injection, scope management and the deferred-action mechanism. The
//! free functions below are the stream-walking helpers handlers reach for
//! when they need to consume or capture an element's remaining content.

use std::collections::VecDeque;

use quick_xml::events::Event;

use crate::error::Result;
use crate::render::bindings::Bindings;
use crate::render::context::{Action, ExpansionContext};

/// The view handed to element and attribute handlers.
pub struct EventHandle<'a> {
    ctx: &'a mut ExpansionContext,
    event: Event<'static>,
}

impl<'a> EventHandle<'a> {
    pub fn new(ctx: &'a mut ExpansionContext, event: Event<'static>) -> Self {
        Self { ctx, event }
    }

    /// The event currently being dispatched.
    pub fn event(&self) -> &Event<'static> {
        &self.event
    }

    pub fn has_next_event(&mut self) -> Result<bool> {
        self.ctx.has_next_event()
    }

    pub fn peek_event(&mut self) -> Result<Option<&Event<'static>>> {
        self.ctx.peek_event()
    }

    pub fn next_event(&mut self) -> Result<Option<Event<'static>>> {
        self.ctx.next_event()
    }

    pub fn queue_event(&mut self, event: Event<'static>) {
        self.ctx.queue_event(event);
    }

    pub fn bindings(&self) -> &Bindings {
        self.ctx.bindings()
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        self.ctx.bindings_mut()
    }

    /// Open a binding scope around the element whose processing triggered
    /// this handle. Must be closed by a matching [`end_scope`](Self::end_scope).
    pub fn start_scope(&mut self, top_level: bool) {
        self.ctx.start_scope(top_level);
    }

    pub fn end_scope(&mut self) -> Result<()> {
        self.ctx.end_scope()
    }

    /// Defer `action` until its injected marker is reached. Returns the
    /// generated action id.
    pub fn queue_action(&mut self, action: Action) -> u64 {
        self.ctx.queue_action(action)
    }

    /// Run the action registered under `id`, exactly once, with this
    /// handle as its execution context.
    pub fn execute_action(&mut self, id: u64) -> Result<()> {
        let action = self.ctx.take_action(id)?;
        action(self)
    }
}

/// An action that closes the current binding scope when its marker is
/// reached.
pub fn end_scope_action() -> Action {
    Box::new(|te| te.end_scope())
}

/// Skip all events until the current element's end tag is reached.
///
/// `skip_end` controls whether the end tag itself is consumed, which is
/// what attribute-event call sites want.
pub fn skip_children(te: &mut EventHandle<'_>, skip_end: bool) -> Result<()> {
    read_elements(te, 1, skip_end, None)?;
    Ok(())
}

/// Skip all events until the parent element's end tag is encountered.
pub fn skip_siblings(te: &mut EventHandle<'_>) -> Result<()> {
    read_elements(te, 2, true, None)?;
    Ok(())
}

/// Read all events into a queue until the current element's end tag is
/// reached.
pub fn read_children(te: &mut EventHandle<'_>, read_end: bool) -> Result<VecDeque<Event<'static>>> {
    let mut queue = VecDeque::new();
    read_elements(te, 1, read_end, Some(&mut queue))?;
    Ok(queue)
}

/// Read all events into a queue until the parent element's end tag is
/// encountered.
pub fn read_siblings(te: &mut EventHandle<'_>) -> Result<VecDeque<Event<'static>>> {
    let mut queue = VecDeque::new();
    read_elements(te, 2, true, Some(&mut queue))?;
    Ok(queue)
}

// Walk events until the depth counter reaches 0. The two public entry
// points start at different depths (1 for children, 2 for siblings);
// the asymmetry is part of the contract.
fn read_elements(
    te: &mut EventHandle<'_>,
    mut level: i32,
    read_end: bool,
    mut out: Option<&mut VecDeque<Event<'static>>>,
) -> Result<()> {
    while te.has_next_event()? {
        let delta = match te.peek_event()? {
            None => break,
            Some(Event::Start(_)) => 1,
            Some(Event::End(_)) => -1,
            Some(_) => 0,
        };
        level += delta;

        if level == 0 {
            // leave the end tag in the stream unless the caller wants it
            if read_end
                && let Some(event) = te.next_event()?
                && let Some(queue) = out.as_deref_mut()
            {
                queue.push_back(event);
            }
            break;
        }

        if let Some(event) = te.next_event()?
            && let Some(queue) = out.as_deref_mut()
        {
            queue.push_back(event);
        }
    }
    Ok(())
}
