//! Serial action queue.
//!
//! At most one action is in flight. `enqueue` hands back a [`Dispatch`] when
//! the queue was idle, otherwise the action waits in FIFO order. Each
//! dispatch carries a single-use [`CompletionToken`]; giving it back through
//! `complete` releases the queue and yields the next dispatch, if any.
//!
//! Tokens are neither `Clone` nor constructible outside this module, so an
//! action can only be completed once, and only by whoever holds its dispatch.

use std::collections::VecDeque;

use crate::error::QueueError;

/// Caller-chosen id echoed back through the session callbacks.
pub type RequestId = u64;

/// Proof that an action is in flight. Consumed by [`ActionQueue::complete`].
#[derive(Debug, PartialEq, Eq)]
pub struct CompletionToken {
    ticket: u64,
}

impl CompletionToken {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

/// An action released for handling.
#[must_use = "the dispatch token has to be returned through ActionQueue::complete"]
#[derive(Debug)]
pub struct Dispatch<A> {
    pub action: A,
    pub request_id: RequestId,
    pub token: CompletionToken,
}

#[derive(Debug)]
pub struct ActionQueue<A> {
    pending: VecDeque<(A, RequestId)>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl<A> Default for ActionQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ActionQueue<A> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: None,
            next_ticket: 0,
        }
    }

    /// Queue an action. Returns its dispatch right away if nothing is in flight.
    pub fn enqueue(&mut self, action: A, request_id: RequestId) -> Option<Dispatch<A>> {
        if self.in_flight.is_some() {
            self.pending.push_back((action, request_id));
            return None;
        }
        Some(self.start(action, request_id))
    }

    /// Finish the in-flight action and release the next one.
    pub fn complete(&mut self, token: CompletionToken) -> Result<Option<Dispatch<A>>, QueueError> {
        match self.in_flight {
            None => Err(QueueError::Idle),
            Some(ticket) if ticket != token.ticket => Err(QueueError::StaleToken(token.ticket)),
            Some(_) => {
                self.in_flight = None;
                match self.pending.pop_front() {
                    Some((action, request_id)) => Ok(Some(self.start(action, request_id))),
                    None => Ok(None),
                }
            }
        }
    }

    /// Drop every action that has not been dispatched yet.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether an action is in flight.
    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of actions waiting behind the in-flight one.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn start(&mut self, action: A, request_id: RequestId) -> Dispatch<A> {
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.in_flight = Some(ticket);
        Dispatch {
            action,
            request_id,
            token: CompletionToken { ticket },
        }
    }
}
