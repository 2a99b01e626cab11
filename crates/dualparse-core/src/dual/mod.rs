//! # Dual Node Family
//!
//! Paired wrappers holding one node from each backend.
//!
//! - `DualComment`, `DualDirective`, `DualBlock` mirror the backend variants
//! - `DualNode` is the shared base: pair access, `save`, `unsaved_files`, file fields
//! - `Pair` stores the explicit (primary, secondary) handles
//!
//! Invariant: both sides are equivalent after construction and after every
//! mutating call. A violation aborts the operation with `DualError::Equivalence`.

mod block;
mod comment;
mod directive;

pub use block::{DualBlock, DualChild};
pub use comment::DualComment;
pub use directive::DualDirective;

use crate::node::ParserNode;
use crate::oracle::assert_simple;
use crate::proxy;
use crate::types::{BackendError, DualError, Found, Observed};
use std::path::PathBuf;

// =============================================================================
// PAIR
// =============================================================================

/// The two backend handles wrapped by a dual node.
///
/// The pair is kept as stored so that each backend can later identify "this
/// node" with its own handle (e.g. in `delete_child`).
#[derive(Debug, Clone)]
pub struct Pair<P, S> {
    primary: Found<P>,
    secondary: Found<S>,
}

impl<P, S> Pair<P, S> {
    pub(crate) fn new(primary: Found<P>, secondary: Found<S>) -> Self {
        Self { primary, secondary }
    }

    /// The primary backend's handle.
    #[must_use]
    pub fn primary(&self) -> &Found<P> {
        &self.primary
    }

    /// The secondary backend's handle.
    #[must_use]
    pub fn secondary(&self) -> &Found<S> {
        &self.secondary
    }

    /// Run a mutating backend call on both sides, primary first.
    ///
    /// A pass side is skipped and yields a pass result.
    pub(crate) fn forward_mut<U, V>(
        &mut self,
        on_primary: impl FnOnce(&mut P) -> Result<U, BackendError>,
        on_secondary: impl FnOnce(&mut S) -> Result<V, BackendError>,
    ) -> Result<(Found<U>, Found<V>), DualError> {
        let first = match &mut self.primary {
            Found::Node(node) => Found::Node(on_primary(node).map_err(DualError::primary)?),
            Found::Pass => Found::Pass,
        };
        let second = match &mut self.secondary {
            Found::Node(node) => Found::Node(on_secondary(node).map_err(DualError::secondary)?),
            Found::Pass => Found::Pass,
        };
        Ok((first, second))
    }

    /// Run a search on both sides, primary first.
    ///
    /// A pass side answers with the sentinel list.
    pub(crate) fn search<U, V>(
        &self,
        on_primary: impl FnOnce(&P) -> Result<Vec<Found<U>>, BackendError>,
        on_secondary: impl FnOnce(&S) -> Result<Vec<Found<V>>, BackendError>,
    ) -> Result<(Vec<Found<U>>, Vec<Found<V>>), DualError> {
        let first = match &self.primary {
            Found::Node(node) => on_primary(node).map_err(DualError::primary)?,
            Found::Pass => vec![Found::Pass],
        };
        let second = match &self.secondary {
            Found::Node(node) => on_secondary(node).map_err(DualError::secondary)?,
            Found::Pass => vec![Found::Pass],
        };
        Ok((first, second))
    }
}

impl<P: ParserNode, S: ParserNode> Pair<P, S> {
    fn save(&mut self, msg: &str) -> Result<(), DualError> {
        self.forward_mut(|node| node.save(msg), |node| node.save(msg))
            .map(|_| ())
    }

    fn unsaved_files(&self) -> Result<Vec<PathBuf>, DualError> {
        let first = match &self.primary {
            Found::Node(node) => node.unsaved_files().map_err(DualError::primary)?,
            Found::Pass => Observed::Pass,
        };
        let second = match &self.secondary {
            Found::Node(node) => node.unsaved_files().map_err(DualError::secondary)?,
            Found::Pass => Observed::Pass,
        };

        match (first, second) {
            (Observed::Value(first), Observed::Value(second)) => {
                assert_simple("unsaved_files", &first, &second)?;
                Ok(first)
            }
            (Observed::Value(files), Observed::Pass) | (Observed::Pass, Observed::Value(files)) => {
                Ok(files)
            }
            (Observed::Pass, Observed::Pass) => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// DUALNODE TRAIT
// =============================================================================

/// Operations shared by every dual node variant.
pub trait DualNode {
    type Primary: ParserNode;
    type Secondary: ParserNode;

    fn pair(&self) -> &Pair<Self::Primary, Self::Secondary>;

    fn pair_mut(&mut self) -> &mut Pair<Self::Primary, Self::Secondary>;

    /// The primary backend's handle.
    fn primary(&self) -> &Found<Self::Primary> {
        self.pair().primary()
    }

    /// The secondary backend's handle.
    fn secondary(&self) -> &Found<Self::Secondary> {
        self.pair().secondary()
    }

    /// Save both backends. There is no post-condition check.
    fn save(&mut self, msg: &str) -> Result<(), DualError> {
        self.pair_mut().save(msg)
    }

    /// Unsaved file paths; both backends must report the same list.
    ///
    /// A pass side contributes nothing; with two pass sides the list is empty.
    fn unsaved_files(&self) -> Result<Vec<PathBuf>, DualError> {
        self.pair().unsaved_files()
    }

    fn filepath(&self) -> Result<Observed<Option<PathBuf>>, DualError> {
        proxy::read(
            "filepath",
            self.pair(),
            |node| node.filepath(),
            |node| node.filepath(),
        )
    }

    fn dirty(&self) -> Result<Observed<bool>, DualError> {
        proxy::read("dirty", self.pair(), |node| node.dirty(), |node| node.dirty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ArenaDirective, PassDirective};
    use crate::node::DirectiveNode;
    use crate::types::DirectiveParams;

    fn listen<D: DirectiveNode>() -> Found<D> {
        let params = DirectiveParams::new("Listen").with_filepath("/etc/apache2/ports.conf");
        Found::Node(D::create(&params).expect("create"))
    }

    #[test]
    fn forward_skips_pass_side() {
        let mut pair: Pair<ArenaDirective, PassDirective> = Pair::new(listen(), Found::Pass);
        let (first, second) = pair
            .forward_mut(|_| Ok(1u8), |_| Ok(2u8))
            .expect("forward");
        assert_eq!(first, Found::Node(1));
        assert_eq!(second, Found::Pass);
    }

    #[test]
    fn pass_side_answers_sentinel_search() {
        let pair: Pair<PassDirective, ArenaDirective> = Pair::new(Found::Pass, listen());
        let (first, second) = pair
            .search(|_| Ok(Vec::<Found<u8>>::new()), |_| Ok(vec![Found::Node(5u8)]))
            .expect("search");
        assert_eq!(first, vec![Found::Pass]);
        assert_eq!(second, vec![Found::Node(5)]);
    }

    #[test]
    fn unsaved_files_of_two_pass_sides_is_empty() {
        let pair: Pair<PassDirective, PassDirective> = Pair::new(Found::Pass, Found::Pass);
        assert!(pair.unsaved_files().expect("unsaved").is_empty());
    }

    #[test]
    fn backend_failure_names_the_side() {
        let mut pair: Pair<ArenaDirective, ArenaDirective> = Pair::new(listen(), listen());
        let err = pair
            .forward_mut(|_| Ok(()), |_| Err::<(), _>(BackendError::NotAChild))
            .expect_err("secondary failed");
        assert!(!err.is_divergence());
    }
}
