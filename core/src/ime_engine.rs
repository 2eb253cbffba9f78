//! IME engine with session management and key event processing.
//!
//! `ImeEngine` owns the codec, the dictionary, the session state and the
//! action queue. Keys and candidate selections are turned into actions,
//! queued, and dispatched one at a time; every dispatch reports back through
//! the injected [`SessionCallbacks`].

use crate::candidate::Candidate;
use crate::context::SessionCallbacks;
use crate::dictionary::DictionaryLookup;
use crate::engine::{QueryEngine, QueryOutcome, SyllableCodec};
use crate::error::{DictionaryError, ImeError};
use crate::queue::{ActionQueue, CompletionToken, Dispatch, RequestId};
use crate::segment_cache::SegmentCache;
use crate::session::{self, Phase, SessionState};
use crate::Config;

/// Key input, already classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A phonetic symbol.
    Symbol(char),
    Backspace,
    Enter,
    Escape,
    /// Any other printable character.
    Literal(char),
}

impl InputEvent {
    /// Map a legacy key code: 0x08, 0x0d and 0x1b are Backspace, Enter and
    /// Escape, anything else is read as a code point.
    pub fn from_key_code(code: u32) -> Result<Self, ImeError> {
        match code {
            0x08 => Ok(InputEvent::Backspace),
            0x0d => Ok(InputEvent::Enter),
            0x1b => Ok(InputEvent::Escape),
            other => char::from_u32(other)
                .map(InputEvent::Literal)
                .ok_or(ImeError::InvalidKeyCode(other)),
        }
    }
}

/// Work item of the action queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Key(InputEvent),
    SelectCandidate(Candidate),
}

enum Lifecycle<D> {
    Unloaded,
    Loaded(D),
    Failed,
}

pub struct ImeEngine<C, D, S> {
    codec: C,
    callbacks: S,
    config: Config,
    lifecycle: Lifecycle<D>,
    cache: SegmentCache,
    state: SessionState,
    queue: ActionQueue<Action>,
    // What the shell was last told.
    shown_composition: String,
    shown_candidates: Vec<Candidate>,
}

impl<C, D, S> ImeEngine<C, D, S>
where
    C: SyllableCodec,
    D: DictionaryLookup,
    S: SessionCallbacks,
{
    pub fn new(codec: C, callbacks: S) -> Self {
        Self::with_config(codec, callbacks, Config::default())
    }

    pub fn with_config(codec: C, callbacks: S, config: Config) -> Self {
        Self {
            codec,
            callbacks,
            config,
            lifecycle: Lifecycle::Unloaded,
            cache: SegmentCache::new(),
            state: SessionState::new(),
            queue: ActionQueue::new(),
            shown_composition: String::new(),
            shown_candidates: Vec::new(),
        }
    }

    // ========== Lifecycle ==========

    /// Attach an opened dictionary.
    pub fn load(&mut self, dictionary: D) -> Result<(), ImeError> {
        self.load_with(|| Ok(dictionary))
    }

    /// Open the dictionary with `loader` and attach it.
    ///
    /// A loader error is reported through `on_error` and returned; the engine
    /// then stays unavailable until `unload()` and a new load.
    pub fn load_with<F>(&mut self, loader: F) -> Result<(), ImeError>
    where
        F: FnOnce() -> Result<D, DictionaryError>,
    {
        if !matches!(self.lifecycle, Lifecycle::Unloaded) {
            return Err(ImeError::AlreadyLoaded);
        }
        self.reset_session();

        match loader() {
            Ok(dictionary) => {
                self.lifecycle = Lifecycle::Loaded(dictionary);
                tracing::info!("dictionary loaded");
                self.callbacks.on_load();
                self.callbacks.on_load_end();
                Ok(())
            }
            Err(err) => {
                self.lifecycle = Lifecycle::Failed;
                tracing::warn!(error = %err, "dictionary failed to load");
                self.callbacks.on_error(&err);
                self.callbacks.on_load_end();
                Err(ImeError::Dictionary(err))
            }
        }
    }

    /// Drop the dictionary and all session state.
    pub fn unload(&mut self) -> Result<(), ImeError> {
        if matches!(self.lifecycle, Lifecycle::Unloaded) {
            return Err(ImeError::NotLoaded);
        }
        self.lifecycle = Lifecycle::Unloaded;
        self.reset_session();
        tracing::info!("dictionary unloaded");
        self.callbacks.on_unload();
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Loaded(_))
    }

    /// The attached dictionary, if loaded.
    pub fn dictionary(&self) -> Option<&D> {
        match &self.lifecycle {
            Lifecycle::Loaded(d) => Some(d),
            _ => None,
        }
    }

    // ========== Input ==========

    /// Submit one key. Returns whether the engine took it; when it did, the
    /// caller must not process the key itself.
    pub fn handle_key(&mut self, event: InputEvent, request_id: RequestId) -> Result<bool, ImeError> {
        let taken = self.handle_keys([(event, request_id)])?;
        Ok(taken.first().copied().unwrap_or(false))
    }

    /// Submit several keys at once, handled in order. Each key is accepted or
    /// refused against the session state the previous key left behind.
    pub fn handle_keys<I>(&mut self, events: I) -> Result<Vec<bool>, ImeError>
    where
        I: IntoIterator<Item = (InputEvent, RequestId)>,
    {
        self.ensure_loaded()?;

        let mut taken = Vec::new();
        for (event, request_id) in events {
            let event = self.classify(event);
            let accept = matches!(event, InputEvent::Symbol(_)) || self.state.absorbs_keys();
            if accept {
                let first = self.queue.enqueue(Action::Key(event), request_id);
                self.drain(first)?;
            }
            taken.push(accept);
        }
        Ok(taken)
    }

    /// Submit a raw key code (see [`InputEvent::from_key_code`]).
    pub fn handle_key_event(&mut self, code: u32, request_id: RequestId) -> Result<bool, ImeError> {
        self.ensure_loaded()?;
        let event = InputEvent::from_key_code(code)?;
        self.handle_key(event, request_id)
    }

    /// Confirm a candidate picked from the list.
    pub fn select_candidate(&mut self, candidate: Candidate, request_id: RequestId) -> Result<(), ImeError> {
        self.ensure_loaded()?;
        self.validate(&candidate)?;
        let first = self
            .queue
            .enqueue(Action::SelectCandidate(candidate), request_id);
        self.drain(first)
    }

    /// Like `select_candidate`, for candidates stored as `[text, consumed]`.
    pub fn select_candidate_pair(&mut self, pair: Vec<String>, request_id: RequestId) -> Result<(), ImeError> {
        self.ensure_loaded()?;
        let candidate = Candidate::try_from(pair)?;
        self.select_candidate(candidate, request_id)
    }

    // ========== Accessors ==========

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Candidates as last reported.
    pub fn candidates(&self) -> &[Candidate] {
        &self.shown_candidates
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn callbacks(&self) -> &S {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut S {
        &mut self.callbacks
    }

    /// Segment cache (hits, misses) since load.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    // ========== Internals ==========

    fn ensure_loaded(&self) -> Result<(), ImeError> {
        match self.lifecycle {
            Lifecycle::Loaded(_) => Ok(()),
            Lifecycle::Failed => Err(ImeError::Unavailable),
            Lifecycle::Unloaded => Err(ImeError::NotLoaded),
        }
    }

    fn reset_session(&mut self) {
        self.state.clear();
        self.cache.clear();
        self.queue.clear();
        self.shown_composition.clear();
        self.shown_candidates.clear();
    }

    // Symbols and literals are told apart by the codec, whatever the caller said.
    fn classify(&self, event: InputEvent) -> InputEvent {
        match event {
            InputEvent::Literal(ch) | InputEvent::Symbol(ch) => {
                if self.codec.is_symbol(ch) {
                    InputEvent::Symbol(ch)
                } else if self.state.syllables.is_empty() {
                    InputEvent::Literal(ch)
                } else {
                    self.codec
                        .pending_symbol(ch)
                        .map_or(InputEvent::Literal(ch), InputEvent::Symbol)
                }
            }
            other => other,
        }
    }

    fn validate(&self, candidate: &Candidate) -> Result<(), ImeError> {
        if candidate.text.is_empty() {
            return Err(ImeError::MalformedCandidate("empty text".to_string()));
        }
        let pending = self.codec.encode(self.state.syllables.as_str()).chars().count();
        if candidate.consumed_syllables() > pending {
            return Err(ImeError::MalformedCandidate(format!(
                "consumes {} syllable(s) but only {} are pending",
                candidate.consumed_syllables(),
                pending
            )));
        }
        Ok(())
    }

    fn drain(&mut self, mut next: Option<Dispatch<Action>>) -> Result<(), ImeError> {
        while let Some(dispatch) = next {
            let token = self.dispatch(dispatch);
            next = self.queue.complete(token)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, dispatch: Dispatch<Action>) -> CompletionToken {
        let Dispatch {
            action,
            request_id,
            token,
        } = dispatch;

        let mut report = ActionReport::default();
        if let Lifecycle::Loaded(dictionary) = &self.lifecycle {
            let mut step = Step {
                codec: &self.codec,
                dictionary,
                config: &self.config,
                cache: &mut self.cache,
                state: &mut self.state,
                report: &mut report,
            };
            step.apply(action);
        }
        self.flush(report, request_id);
        token
    }

    fn flush(&mut self, report: ActionReport, request_id: RequestId) {
        if let Some(text) = report.committed {
            self.callbacks.on_composition_end(&text, request_id);
        }

        if self.state.syllables.as_str() != self.shown_composition {
            self.shown_composition = self.state.syllables.as_str().to_string();
            self.callbacks
                .on_composition_update(&self.shown_composition, request_id);
        }

        if let Some(candidates) = report.candidates {
            if candidates != self.shown_candidates {
                self.shown_candidates = candidates;
                self.callbacks
                    .on_candidates_change(&self.shown_candidates, request_id);
            }
        }

        self.callbacks.on_action_handled(request_id);
    }
}

/// Outputs of one action, reported once it is done.
#[derive(Debug, Default)]
struct ActionReport {
    committed: Option<String>,
    candidates: Option<Vec<Candidate>>,
}

/// One action's view of the engine.
struct Step<'a, C, D> {
    codec: &'a C,
    dictionary: &'a D,
    config: &'a Config,
    cache: &'a mut SegmentCache,
    state: &'a mut SessionState,
    report: &'a mut ActionReport,
}

impl<'a, C: SyllableCodec, D: DictionaryLookup> Step<'a, C, D> {
    fn apply(&mut self, action: Action) {
        match action {
            Action::Key(InputEvent::Symbol(ch)) => {
                if self.config.reorder_symbols {
                    self.state.syllables.push_reordered(self.codec, ch);
                } else {
                    self.state.syllables.push(ch);
                }
                self.query();
            }
            Action::Key(InputEvent::Backspace) => {
                if self.state.syllables.pop().is_some() {
                    self.query();
                }
            }
            Action::Key(InputEvent::Escape) => {
                self.state.syllables.clear();
                self.query();
            }
            Action::Key(InputEvent::Enter) => {
                if let Some(candidate) = self.state.default_candidate.clone() {
                    self.confirm(candidate);
                }
            }
            Action::Key(InputEvent::Literal(ch)) => {
                if let Some(default) = self.state.default_candidate.clone() {
                    let mut text = default.text;
                    text.push(ch);
                    self.confirm(Candidate::new(text, default.consumed));
                }
            }
            Action::SelectCandidate(candidate) => self.confirm(candidate),
        }
    }

    fn query(&mut self) {
        let engine = QueryEngine::new(self.codec, self.dictionary);
        let outcome = engine.query(
            self.cache,
            self.state.syllables.as_str(),
            self.config.syllable_limit(),
        );

        match outcome {
            QueryOutcome::Candidates {
                candidates,
                first_matched,
            } => {
                self.state.first_matched_phrase = first_matched;
                self.show(candidates);
            }
            QueryOutcome::Overflow => {
                let pending = self.codec.encode(self.state.syllables.as_str()).chars().count();
                let forced = self
                    .state
                    .first_matched_phrase
                    .take()
                    .filter(|c| !c.consumed.is_empty() && c.consumed_syllables() <= pending)
                    .or_else(|| engine.first_syllable_typo(self.state.syllables.as_str()));
                match forced {
                    Some(candidate) => self.confirm(candidate),
                    None => self.show(Vec::new()),
                }
            }
        }
    }

    fn confirm(&mut self, candidate: Candidate) {
        tracing::debug!(text = %candidate.text, consumed = candidate.consumed_syllables(), "confirm");

        self.report
            .committed
            .get_or_insert_with(String::new)
            .push_str(&candidate.text);

        let lossless = self.codec.encode_lossless(self.state.syllables.as_str());
        let rest: String = lossless.chars().skip(candidate.consumed_syllables()).collect();
        self.state.syllables.replace(self.codec.decode(&rest));
        self.state.confirmed_characters = candidate.text;
        self.state.confirmed_encoded = candidate.consumed;

        if self.state.syllables.is_empty() {
            self.suggest();
        } else {
            self.query();
        }
    }

    fn suggest(&mut self) {
        self.state.first_matched_phrase = None;
        let candidates = if self.config.suggest_phrases {
            session::suggest(
                self.dictionary,
                &self.state.confirmed_encoded,
                &self.state.confirmed_characters,
            )
        } else {
            Vec::new()
        };
        self.show(candidates);
    }

    fn show(&mut self, candidates: Vec<Candidate>) {
        self.state.default_candidate = candidates.first().cloned();
        self.report.candidates = Some(candidates);
    }
}
