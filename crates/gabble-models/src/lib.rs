//! The two chain models behind chat generation.
//!
//! [`ConversationModel`] learns "who replies to whom" from the ordered
//! transcript: one [`WeightedGraph`] over sender identities, built once at
//! construction and immutable afterwards. [`MessageModel`] learns "how one
//! sender writes": one graph over that sender's words, framed by the
//! [`Framed::Start`] and [`Framed::End`] sentinels, built lazily per sender.
//!
//! Both models are instances of the same generic graph/walk machinery and
//! differ only in state space and sentinel conventions — the sender chain
//! uses `End` as the absorbing terminal of a finite conversation, the word
//! chain uses `Start`/`End` as message boundaries.

use rand::Rng;
use random_walk::RandomWalk;
use serde::{Deserialize, Serialize};
use state_core::{Framed, State};
use thiserror::Error;
use weighted_graph::{GraphError, WeightedGraph};

use gabble_tokenizer::Tokenizer;

/// Errors raised while building or driving the chain models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The transcript has fewer than two entries, so no sender transition
    /// can be observed.
    #[error("transcript needs at least two entries to observe a sender transition")]
    EmptyTranscript,

    /// A sender has no messages to build a word model from.
    #[error("sender {sender} has no messages to build a word model from")]
    EmptyMessageModel { sender: String },

    /// Invariant violation surfaced by the underlying graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// The sender-transition chain: who replies to whom.
///
/// Built once from the transcript's sender sequence. Every consecutive
/// entry pair records one observed reply adjacency; repeated pairs
/// strengthen that transition. The dead-state policy is fixed at
/// construction:
///
/// - `finite = true`: the last transcript sender gets an absorbing edge to
///   [`Framed::End`], so generation is expected to terminate.
/// - `finite = false`: if the last sender was never observed replying to
///   anyone, it gets a wraparound edge back to the *first* transcript
///   sender. The first sender as wrap target is a preserved policy choice,
///   nothing more principled than that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationModel<U: State> {
    graph: WeightedGraph<Framed<U>>,
    first: U,
    finite: bool,
}

impl<U: State> ConversationModel<U> {
    /// Learn the sender chain from the transcript's sender sequence.
    ///
    /// Fails with [`ModelError::EmptyTranscript`] when fewer than two
    /// entries are present.
    pub fn new(senders: &[U], finite: bool) -> Result<Self, ModelError> {
        if senders.len() < 2 {
            return Err(ModelError::EmptyTranscript);
        }

        let mut graph = WeightedGraph::new();
        for pair in senders.windows(2) {
            graph.add(Framed::Item(pair[0].clone()), Framed::Item(pair[1].clone()));
        }

        let first = senders[0].clone();
        let last = Framed::Item(senders[senders.len() - 1].clone());
        if finite {
            graph.add(last, Framed::End);
        } else if graph.out_weight(&last) == 0.0 {
            graph.add(last, Framed::Item(first.clone()));
        }
        graph.stochastic()?;

        Ok(ConversationModel {
            graph,
            first,
            finite,
        })
    }

    /// Draw the sender replying to `current`.
    ///
    /// `Ok(None)` means the conversation is absorbed (finite models only).
    /// A `current` never seen in the transcript fails with
    /// [`GraphError::UnknownState`].
    pub fn sample_next<R: Rng + ?Sized>(
        &self,
        current: &U,
        rng: &mut R,
    ) -> Result<Option<U>, GraphError> {
        let next = self
            .graph
            .sample_next(&Framed::Item(current.clone()), rng)
            .map_err(|err| match err {
                // Report the bare sender, not its sentinel framing.
                GraphError::UnknownState { .. } => GraphError::UnknownState {
                    state: format!("{current:?}"),
                },
                other => other,
            })?;
        Ok(match next {
            Some(Framed::Item(sender)) => Some(sender.clone()),
            _ => None,
        })
    }

    /// The sender of the earliest transcript entry, the default walk head.
    #[inline]
    pub fn first_sender(&self) -> &U {
        &self.first
    }

    /// Whether this model was built with the absorbing terminal policy.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.finite
    }

    /// Whether `sender` appears anywhere in the transcript.
    pub fn contains_sender(&self, sender: &U) -> bool {
        self.graph.contains(&Framed::Item(sender.clone()))
    }

    /// The underlying normalized sender graph.
    #[inline]
    pub fn graph(&self) -> &WeightedGraph<Framed<U>> {
        &self.graph
    }
}

/// One sender's word-transition chain.
///
/// Each of the sender's messages independently contributes edges
/// `Start -> t1`, `ti -> ti+1`, `tn -> End` over its token sequence. Every
/// non-`End` state that appears was followed by something, so no dead state
/// can exist and the graph normalizes directly after building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageModel {
    graph: WeightedGraph<Framed<String>>,
}

impl MessageModel {
    /// Build the word chain from one sender's message history.
    ///
    /// `sender` only labels the error when the history is empty. Messages
    /// that tokenize to nothing contribute nothing; if none contributes,
    /// the build fails with [`ModelError::EmptyMessageModel`].
    pub fn build<U, I, T>(sender: &U, messages: I, tokenizer: &T) -> Result<Self, ModelError>
    where
        U: State,
        I: IntoIterator,
        I::Item: AsRef<str>,
        T: Tokenizer,
    {
        let mut graph = WeightedGraph::new();
        let mut contributed = 0usize;

        for message in messages {
            let tokens = tokenizer.tokenize(message.as_ref());
            let Some(head) = tokens.first() else {
                continue;
            };
            graph.add(Framed::Start, Framed::Item(head.clone()));
            for pair in tokens.windows(2) {
                graph.add(
                    Framed::Item(pair[0].clone()),
                    Framed::Item(pair[1].clone()),
                );
            }
            // tokens is non-empty here, so last() always yields.
            if let Some(tail) = tokens.last() {
                graph.add(Framed::Item(tail.clone()), Framed::End);
            }
            contributed += 1;
        }

        if contributed == 0 {
            return Err(ModelError::EmptyMessageModel {
                sender: format!("{sender:?}"),
            });
        }
        graph.stochastic()?;

        Ok(MessageModel { graph })
    }

    /// Generate one message: walk from `Start` until `End` or until
    /// `max_walk_length` tokens, strip the trailing terminal, and rejoin
    /// with single spaces.
    ///
    /// Exhausting the cap before reaching `End` yields a truncated message;
    /// that is a defined outcome, not an error.
    pub fn generate<R: Rng>(
        &self,
        max_walk_length: usize,
        rng: &mut R,
    ) -> Result<String, GraphError> {
        let walk = RandomWalk::new(
            &self.graph,
            Framed::Start,
            max_walk_length,
            Framed::is_end,
            rng,
        )?;

        let mut tokens: Vec<Framed<String>> = walk.collect();
        if tokens.last().is_some_and(Framed::is_end) {
            tokens.pop();
        }
        let words: Vec<String> = tokens.into_iter().filter_map(Framed::into_item).collect();
        Ok(words.join(" "))
    }

    /// The underlying normalized word graph.
    #[inline]
    pub fn graph(&self) -> &WeightedGraph<Framed<String>> {
        &self.graph
    }
}
