//! Callbacks from the engine to the IME shell.
//!
//! The engine reports through a [`SessionCallbacks`] implementation it owns.
//! Per action it fires, in order: at most one `on_composition_end`, at most
//! one `on_composition_update`, at most one `on_candidates_change`, then
//! exactly one `on_action_handled`.
//!
//! `ImeContext` is a ready-made implementation that simply records what it
//! was told. Platforms (and tests) read its public fields after each call.

use crate::candidate::Candidate;
use crate::error::DictionaryError;
use crate::queue::RequestId;

/// Outputs of the engine. Every method defaults to a no-op.
pub trait SessionCallbacks {
    /// The pending symbols changed.
    fn on_composition_update(&mut self, _text: &str, _request_id: RequestId) {}

    /// A new candidate list replaces the previous one.
    fn on_candidates_change(&mut self, _candidates: &[Candidate], _request_id: RequestId) {}

    /// Text was confirmed and should be committed.
    fn on_composition_end(&mut self, _text: &str, _request_id: RequestId) {}

    /// The action submitted with `request_id` is fully processed.
    fn on_action_handled(&mut self, _request_id: RequestId) {}

    fn on_load(&mut self) {}

    fn on_load_end(&mut self) {}

    fn on_error(&mut self, _error: &DictionaryError) {}

    fn on_unload(&mut self) {}
}

impl SessionCallbacks for () {}

/// One recorded callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ImeEvent {
    CompositionUpdate { text: String, request_id: RequestId },
    CandidatesChange { candidates: Vec<Candidate>, request_id: RequestId },
    CompositionEnd { text: String, request_id: RequestId },
    ActionHandled(RequestId),
    Load,
    LoadEnd,
    Error(String),
    Unload,
}

impl ImeEvent {
    /// Request id of per-action events.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ImeEvent::CompositionUpdate { request_id, .. }
            | ImeEvent::CandidatesChange { request_id, .. }
            | ImeEvent::CompositionEnd { request_id, .. } => Some(*request_id),
            ImeEvent::ActionHandled(id) => Some(*id),
            _ => None,
        }
    }
}

/// Recording [`SessionCallbacks`] implementation.
///
/// - `preedit_text`: pending symbols as last reported
/// - `candidates`: candidate list as last reported
/// - `commit_text`: confirmed text not yet taken by the platform
/// - `handled`: request ids in the order they completed
/// - `events`: every callback, in order
#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    pub preedit_text: String,
    pub candidates: Vec<Candidate>,
    pub commit_text: String,
    pub handled: Vec<RequestId>,
    pub events: Vec<ImeEvent>,
    pub loaded: bool,
}

impl ImeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    /// Take the recorded events, leaving the log empty.
    pub fn take_events(&mut self) -> Vec<ImeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events belonging to `request_id`.
    pub fn events_for(&self, request_id: RequestId) -> Vec<&ImeEvent> {
        self.events
            .iter()
            .filter(|e| e.request_id() == Some(request_id))
            .collect()
    }

    /// Check if there's any visible state (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        !self.preedit_text.is_empty() || !self.candidates.is_empty()
    }

    pub fn candidate_texts(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.text.as_str()).collect()
    }
}

impl SessionCallbacks for ImeContext {
    fn on_composition_update(&mut self, text: &str, request_id: RequestId) {
        self.preedit_text = text.to_string();
        self.events.push(ImeEvent::CompositionUpdate {
            text: text.to_string(),
            request_id,
        });
    }

    fn on_candidates_change(&mut self, candidates: &[Candidate], request_id: RequestId) {
        self.candidates = candidates.to_vec();
        self.events.push(ImeEvent::CandidatesChange {
            candidates: candidates.to_vec(),
            request_id,
        });
    }

    fn on_composition_end(&mut self, text: &str, request_id: RequestId) {
        self.commit_text.push_str(text);
        self.events.push(ImeEvent::CompositionEnd {
            text: text.to_string(),
            request_id,
        });
    }

    fn on_action_handled(&mut self, request_id: RequestId) {
        self.handled.push(request_id);
        self.events.push(ImeEvent::ActionHandled(request_id));
    }

    fn on_load(&mut self) {
        self.loaded = true;
        self.events.push(ImeEvent::Load);
    }

    fn on_load_end(&mut self) {
        self.events.push(ImeEvent::LoadEnd);
    }

    fn on_error(&mut self, error: &DictionaryError) {
        self.events.push(ImeEvent::Error(error.to_string()));
    }

    fn on_unload(&mut self) {
        self.loaded = false;
        self.preedit_text.clear();
        self.candidates.clear();
        self.events.push(ImeEvent::Unload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_accumulates_until_taken() {
        let mut ctx = ImeContext::new();
        ctx.on_composition_end("你", 1);
        ctx.on_composition_end("好", 2);
        assert_eq!(ctx.take_commit(), "你好");
        assert!(ctx.commit_text.is_empty());
    }

    #[test]
    fn test_events_for_filters_by_request() {
        let mut ctx = ImeContext::new();
        ctx.on_load();
        ctx.on_composition_update("ㄏ", 7);
        ctx.on_action_handled(7);
        ctx.on_action_handled(8);

        assert_eq!(ctx.events_for(7).len(), 2);
        assert_eq!(ctx.handled, vec![7, 8]);
        assert!(ctx.has_visible_state());
    }
}
