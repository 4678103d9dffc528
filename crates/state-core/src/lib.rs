//! Core state types for generic weighted-chain models.
//!
//! This crate defines the foundational abstraction for states in a weighted
//! transition graph. A state can be any hashable, ordered label — strings,
//! integers, enums, or any other value a chain might visit. The [`Framed`]
//! wrapper augments an arbitrary state space with the two walk-boundary
//! sentinels every chain of this kind needs: a synthetic start and a
//! terminal.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A label usable as a graph state.
///
/// This trait is intentionally minimal — no string assumptions, no sentinel
/// methods. The `Ord` bound gives every row of a graph a stable entry order,
/// which is what makes weighted sampling reproducible under a fixed seed.
/// The `Hash` bound enables O(1) row lookup.
pub trait State: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> State for T {}

/// A state space framed by walk-boundary sentinels.
///
/// `Start` seeds a walk and only ever appears as a from-state; `End` marks a
/// terminus and only ever appears as a to-state. Word chains use both; sender
/// chains use `End` alone, as the absorbing terminal of a finite
/// conversation. Variant order gives `Start < Item(_) < End`, so sentinels
/// sort away from the payload states.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Framed<S> {
    /// Synthetic walk origin. Never emitted by a walk.
    Start,
    /// An ordinary state of the underlying space.
    Item(S),
    /// Terminal sentinel / absorbing state.
    End,
}

impl<S> Framed<S> {
    /// Whether this is the terminal sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self, Framed::End)
    }

    /// The underlying state, if this is not a sentinel.
    #[inline]
    pub fn item(&self) -> Option<&S> {
        match self {
            Framed::Item(s) => Some(s),
            _ => None,
        }
    }

    /// Consume the frame, returning the underlying state if present.
    #[inline]
    pub fn into_item(self) -> Option<S> {
        match self {
            Framed::Item(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_sort_around_items() {
        assert!(Framed::Start < Framed::Item("a"));
        assert!(Framed::Item("z") < Framed::<&str>::End);
        assert!(Framed::<&str>::Start < Framed::End);
    }

    #[test]
    fn items_sort_by_payload() {
        assert!(Framed::Item("apple") < Framed::Item("banana"));
        assert_eq!(Framed::Item(3), Framed::Item(3));
    }

    #[test]
    fn is_end_only_on_end() {
        assert!(Framed::<u32>::End.is_end());
        assert!(!Framed::<u32>::Start.is_end());
        assert!(!Framed::Item(1).is_end());
    }

    #[test]
    fn item_accessors() {
        let framed = Framed::Item("word".to_string());
        assert_eq!(framed.item().map(String::as_str), Some("word"));
        assert_eq!(framed.into_item().as_deref(), Some("word"));
        assert_eq!(Framed::<String>::Start.item(), None);
        assert_eq!(Framed::<String>::End.into_item(), None);
    }

    #[test]
    fn framed_serde_roundtrip() {
        let states = vec![
            Framed::Start,
            Framed::Item("hey".to_string()),
            Framed::End,
        ];
        let json = serde_json::to_string(&states).unwrap();
        let back: Vec<Framed<String>> = serde_json::from_str(&json).unwrap();
        assert_eq!(states, back);
    }

    #[test]
    fn framed_usable_as_hash_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Framed::Item(7u32), 1.0f64);
        map.insert(Framed::End, 2.0);
        assert_eq!(map.get(&Framed::Item(7)), Some(&1.0));
        assert_eq!(map.get(&Framed::End), Some(&2.0));
    }
}
