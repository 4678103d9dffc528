//! Lazy bounded random walks over a [`WeightedGraph`].
//!
//! A [`RandomWalk`] repeatedly samples successors starting from a given
//! state and yields each visited state as a pull-based iterator. The walk
//! never touches the graph mutably and does no work beyond the pulls the
//! caller makes — O(steps) time, O(1) memory beyond the yielded states.
//!
//! Termination, in order of precedence at each step:
//! 1. the sampled state matches the caller's stop predicate — the terminal
//!    state is yielded, then the walk ends;
//! 2. the current state is absorbing (no outgoing weight) — the walk ends
//!    without yielding anything further;
//! 3. `max_steps` states have been yielded.
//!
//! The synthetic start state itself is never yielded; callers that seed a
//! walk with a sentinel (for example `Framed::Start`) only ever see real
//! successor states plus, possibly, the terminal sentinel, which they trim
//! themselves.

use rand::Rng;
use state_core::State;
use weighted_graph::{GraphError, WeightedGraph};

/// A lazy random walk over a weighted graph. Created by [`RandomWalk::new`].
pub struct RandomWalk<'a, S: State, R: Rng, F: FnMut(&S) -> bool> {
    graph: &'a WeightedGraph<S>,
    rng: &'a mut R,
    stop: F,
    current: S,
    remaining: usize,
    done: bool,
}

impl<S: State, R: Rng, F: FnMut(&S) -> bool> std::fmt::Debug for RandomWalk<'_, S, R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomWalk")
            .field("current", &self.current)
            .field("remaining", &self.remaining)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<'a, S: State, R: Rng, F: FnMut(&S) -> bool> RandomWalk<'a, S, R, F> {
    /// Begin a walk at `start`, yielding at most `max_steps` states and
    /// stopping early at any state matching `stop`.
    ///
    /// Fails with [`GraphError::UnknownState`] if `start` was never
    /// inserted into the graph.
    pub fn new(
        graph: &'a WeightedGraph<S>,
        start: S,
        max_steps: usize,
        stop: F,
        rng: &'a mut R,
    ) -> Result<Self, GraphError> {
        if !graph.contains(&start) {
            return Err(GraphError::UnknownState {
                state: format!("{start:?}"),
            });
        }
        Ok(RandomWalk {
            graph,
            rng,
            stop,
            current: start,
            remaining: max_steps,
            done: false,
        })
    }
}

impl<'a, S: State, R: Rng, F: FnMut(&S) -> bool> Iterator for RandomWalk<'a, S, R, F> {
    type Item = S;

    fn next(&mut self) -> Option<S> {
        if self.done || self.remaining == 0 {
            return None;
        }

        match self.graph.sample_next(&self.current, self.rng) {
            Ok(Some(next)) => {
                let next = next.clone();
                self.remaining -= 1;
                if (self.stop)(&next) {
                    self.done = true;
                } else {
                    self.current = next.clone();
                }
                Some(next)
            }
            // Absorbing state: the walk has nowhere to go.
            Ok(None) => {
                self.done = true;
                None
            }
            // Unreachable once the walk has started: every sampled state
            // was inserted into the graph as a to-state.
            Err(_) => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use state_core::Framed;

    fn make_rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn line_graph() -> WeightedGraph<&'static str> {
        // a -> b -> c, with c absorbing.
        let mut graph = WeightedGraph::new();
        graph.add("a", "b");
        graph.add("b", "c");
        graph.stochastic().unwrap();
        graph
    }

    #[test]
    fn walk_excludes_start_state() {
        let graph = line_graph();
        let mut rng = make_rng(42);
        let walk = RandomWalk::new(&graph, "a", 10, |_| false, &mut rng).unwrap();
        let visited: Vec<&str> = walk.collect();
        assert_eq!(visited, vec!["b", "c"]);
    }

    #[test]
    fn walk_stops_at_absorbing_state() {
        let graph = line_graph();
        let mut rng = make_rng(42);
        let walk = RandomWalk::new(&graph, "a", 100, |_| false, &mut rng).unwrap();
        // "c" has no successors; nothing is yielded past it.
        assert_eq!(walk.count(), 2);
    }

    #[test]
    fn walk_includes_predicate_terminal() {
        let graph = line_graph();
        let mut rng = make_rng(42);
        let walk = RandomWalk::new(&graph, "a", 100, |s| *s == "c", &mut rng).unwrap();
        let visited: Vec<&str> = walk.collect();
        assert_eq!(visited, vec!["b", "c"], "terminal must be yielded");
    }

    #[test]
    fn walk_respects_max_steps() {
        // Tight cycle, never terminates on its own.
        let mut graph = WeightedGraph::new();
        graph.add("x", "y");
        graph.add("y", "x");
        graph.stochastic().unwrap();

        let mut rng = make_rng(42);
        let walk = RandomWalk::new(&graph, "x", 7, |_| false, &mut rng).unwrap();
        assert_eq!(walk.count(), 7);
    }

    #[test]
    fn walk_of_zero_steps_is_empty() {
        let graph = line_graph();
        let mut rng = make_rng(42);
        let walk = RandomWalk::new(&graph, "a", 0, |_| false, &mut rng).unwrap();
        assert_eq!(walk.count(), 0);
    }

    #[test]
    fn walk_from_unknown_state_errors() {
        let graph = line_graph();
        let mut rng = make_rng(42);
        let err = RandomWalk::new(&graph, "nope", 10, |_| false, &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::UnknownState { .. }));
    }

    #[test]
    fn walk_is_deterministic_under_fixed_seed() {
        let mut graph = WeightedGraph::new();
        graph.add("a", "b");
        graph.add("a", "c");
        graph.add("b", "a");
        graph.add("c", "a");
        graph.stochastic().unwrap();

        let run = || {
            let mut rng = make_rng(777);
            RandomWalk::new(&graph, "a", 30, |_| false, &mut rng)
                .unwrap()
                .collect::<Vec<&str>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn walk_over_framed_states_stops_at_end() {
        // Start -> hello -> End, the word-chain shape.
        let mut graph = WeightedGraph::new();
        graph.add(Framed::Start, Framed::Item("hello"));
        graph.add(Framed::Item("hello"), Framed::End);
        graph.stochastic().unwrap();

        let mut rng = make_rng(1);
        let walk =
            RandomWalk::new(&graph, Framed::Start, 100, Framed::is_end, &mut rng).unwrap();
        let visited: Vec<Framed<&str>> = walk.collect();
        assert_eq!(visited, vec![Framed::Item("hello"), Framed::End]);
    }
}
