//! Gabble — synthetic chat generation from historical transcripts.
//!
//! This is the facade crate wiring together the lower-level components:
//! - [`state_core`]: state labels and walk-boundary sentinels
//! - [`weighted_graph`]: the sparse weighted transition graph
//! - [`random_walk`]: lazy bounded walks over a graph
//! - [`gabble_tokenizer`]: the pluggable message tokenizer
//! - [`gabble_models`]: sender-transition and word-transition models
//!
//! A [`Chat`] learns two coupled chains from a `(sender, message)`
//! transcript: who replies to whom, and how each sender writes. Each call to
//! [`Chat::generate`] is an independent pull-based traversal yielding
//! `(sender, text)` pairs — infinite unless the model was built with
//! `finite = true` and the walk reaches the absorbing terminal.
//!
//! # Quick start
//!
//! ```
//! use gabble::{Chat, ChatConfig};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let transcript = vec![
//!     ("alice", "hey there".to_string()),
//!     ("bob", "hey, what's up?".to_string()),
//!     ("carol", "cool story".to_string()),
//! ];
//! let mut chat = Chat::new(transcript, &ChatConfig::default(), SmallRng::seed_from_u64(42))
//!     .unwrap();
//!
//! for pair in chat.generate(Some("alice")).take(2) {
//!     let (sender, text) = pair.unwrap();
//!     println!("{sender}: {text}");
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use thiserror::Error;

pub use gabble_models::{ConversationModel, MessageModel, ModelError};
pub use gabble_tokenizer::{SpaceTokenizer, Tokenizer, WhitespaceTokenizer};
pub use state_core::{Framed, State};
pub use weighted_graph::{GraphError, WeightedGraph};

/// Errors surfaced through the generation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The `head` passed to [`Chat::generate`] never appears in the
    /// transcript. Raised on the first pull; the models stay valid for a
    /// fresh `generate` call.
    #[error("head sender {sender} does not appear in the transcript")]
    UnknownHead { sender: String },

    /// An error from the underlying models.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<GraphError> for ChatError {
    fn from(err: GraphError) -> Self {
        ChatError::Model(ModelError::Graph(err))
    }
}

/// Generation configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Absorbing dead-sender policy: `true` makes generation terminate at
    /// the last transcript sender, `false` wraps it back to the first.
    pub finite: bool,
    /// Hard cap on tokens per generated message.
    pub max_walk_length: usize,
    /// Cache per-sender word models, trading memory for repeated-generation
    /// speed. Entries are created lazily and never evicted.
    pub enhance: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            finite: false,
            max_walk_length: 100,
            enhance: true,
        }
    }
}

/// A shareable cache of per-sender word models.
///
/// Get-or-build runs as a single critical section under one mutex, so two
/// generators sharing a cache can never race each other into redundant
/// builds. The cache grows monotonically with distinct senders seen.
#[derive(Debug, Default)]
pub struct ModelCache<U: State> {
    models: Mutex<HashMap<U, Arc<MessageModel>>>,
}

impl<U: State> ModelCache<U> {
    /// Create an empty cache.
    pub fn new() -> Self {
        ModelCache {
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached model for `sender`, building and storing it with
    /// `build` on first need.
    pub fn get_or_build(
        &self,
        sender: &U,
        build: impl FnOnce() -> Result<MessageModel, ModelError>,
    ) -> Result<Arc<MessageModel>, ModelError> {
        let mut models = self.models.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = models.get(sender) {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(build()?);
        models.insert(sender.clone(), Arc::clone(&model));
        Ok(model)
    }

    /// Whether a model for `sender` is already cached.
    pub fn contains(&self, sender: &U) -> bool {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(sender)
    }

    /// Number of cached sender models.
    pub fn len(&self) -> usize {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no models.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The chat generator.
///
/// Owns the sender-transition model (built once at construction), the
/// transcript it was learned from, the tokenizer collaborator, and a PRNG.
/// Generic over the PRNG type `R` for seedable, reproducible output.
#[derive(Debug)]
pub struct Chat<U: State, R: Rng, T: Tokenizer = SpaceTokenizer> {
    transcript: Vec<(U, String)>,
    conversation: ConversationModel<U>,
    cache: Option<Arc<ModelCache<U>>>,
    tokenizer: T,
    max_walk_length: usize,
    rng: R,
}

impl<U: State, R: Rng> Chat<U, R> {
    /// Build a generator from a chronological transcript with the default
    /// single-space tokenizer.
    ///
    /// Fails with [`ModelError::EmptyTranscript`] when the transcript has
    /// fewer than two entries.
    pub fn new(
        transcript: Vec<(U, String)>,
        config: &ChatConfig,
        rng: R,
    ) -> Result<Self, ModelError> {
        Chat::with_tokenizer(transcript, config, SpaceTokenizer, rng)
    }
}

impl<U: State, R: Rng, T: Tokenizer> Chat<U, R, T> {
    /// Build a generator with a custom tokenizer collaborator.
    pub fn with_tokenizer(
        transcript: Vec<(U, String)>,
        config: &ChatConfig,
        tokenizer: T,
        rng: R,
    ) -> Result<Self, ModelError> {
        let senders: Vec<U> = transcript.iter().map(|(sender, _)| sender.clone()).collect();
        let conversation = ConversationModel::new(&senders, config.finite)?;
        let cache = config.enhance.then(|| Arc::new(ModelCache::new()));

        Ok(Chat {
            transcript,
            conversation,
            cache,
            tokenizer,
            max_walk_length: config.max_walk_length,
            rng,
        })
    }

    /// The shared word-model cache, if caching is enabled. Attach the
    /// returned handle to another generator to share builds across them.
    pub fn shared_cache(&self) -> Option<Arc<ModelCache<U>>> {
        self.cache.clone()
    }

    /// Replace this generator's cache with an explicitly shared one.
    pub fn attach_cache(&mut self, cache: Arc<ModelCache<U>>) {
        self.cache = Some(cache);
    }

    /// The read-only sender-transition model.
    #[inline]
    pub fn conversation(&self) -> &ConversationModel<U> {
        &self.conversation
    }

    /// Start a lazy message sequence.
    ///
    /// The walk begins at `head` if given, else at the first transcript
    /// sender; that sender receives the first generated reply but never
    /// speaks itself. Each pull samples the next sender and generates one
    /// message in that sender's voice. A `head` unseen in the transcript
    /// yields [`ChatError::UnknownHead`] on the first pull and ends the
    /// sequence; the models remain usable.
    pub fn generate(&mut self, head: Option<U>) -> Conversation<'_, U, R, T> {
        let current = head.unwrap_or_else(|| self.conversation.first_sender().clone());
        Conversation {
            chat: self,
            current,
            done: false,
        }
    }

    /// Fetch or lazily build the word model for `sender`.
    fn message_model(&self, sender: &U) -> Result<Arc<MessageModel>, ModelError> {
        let build = || {
            MessageModel::build(
                sender,
                self.transcript
                    .iter()
                    .filter(|(who, _)| who == sender)
                    .map(|(_, message)| message.as_str()),
                &self.tokenizer,
            )
        };
        match &self.cache {
            Some(cache) => cache.get_or_build(sender, build),
            None => Ok(Arc::new(build()?)),
        }
    }
}

/// One lazy traversal created by [`Chat::generate`].
///
/// Pull-based: all work for a pair — sampling the sender, building its word
/// model on first visit, walking the word graph — happens on the pull that
/// yields it. The sequence ends cleanly (no error) when a finite sender
/// model reaches the absorbing terminal.
pub struct Conversation<'a, U: State, R: Rng, T: Tokenizer> {
    chat: &'a mut Chat<U, R, T>,
    current: U,
    done: bool,
}

impl<'a, U: State, R: Rng, T: Tokenizer> Iterator for Conversation<'a, U, R, T> {
    type Item = Result<(U, String), ChatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = match self
            .chat
            .conversation
            .sample_next(&self.current, &mut self.chat.rng)
        {
            Ok(Some(sender)) => sender,
            // Absorbed: the conversation terminated.
            Ok(None) => {
                self.done = true;
                return None;
            }
            // Only a bad head can make the current sender unknown.
            Err(GraphError::UnknownState { state }) => {
                self.done = true;
                return Some(Err(ChatError::UnknownHead { sender: state }));
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };
        self.current = next.clone();

        let model = match self.chat.message_model(&next) {
            Ok(model) => model,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };
        let text = match model.generate(self.chat.max_walk_length, &mut self.chat.rng) {
            Ok(text) => text,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };

        Some(Ok((next, text)))
    }
}
