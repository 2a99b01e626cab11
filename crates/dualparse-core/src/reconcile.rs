//! # Reconciliation Engine
//!
//! Pairs the unordered search results of two backends.
//!
//! Backends share no node identity and may return results in any order, so
//! each primary result is paired with an equivalent secondary result. A
//! backend that does not implement targeted search answers with the sentinel
//! list (`[Found::Pass]`), which acts as a wildcard for every result of the
//! other backend.

use crate::node::ParserNode;
use crate::oracle::{describe, is_sentinel_list, nodes_equivalent};
use crate::types::{DualError, Found, MatchPolicy};

/// Resolved pairs, in output order.
pub type Matched<P, S> = Vec<(Found<P>, Found<S>)>;

/// How two result lists are to be resolved.
#[derive(Debug)]
pub enum Resolution<P, S> {
    /// Neither backend implements the search.
    BothPass,
    /// Only the primary passed; the secondary results drive cardinality.
    PrimaryPass(Vec<Found<S>>),
    /// Only the secondary passed; the primary results drive cardinality.
    SecondaryPass(Vec<Found<P>>),
    /// Both backends returned real results.
    Pairwise(Vec<Found<P>>, Vec<Found<S>>),
}

impl<P, S> Resolution<P, S> {
    /// Classify two result lists by their sentinel status.
    #[must_use]
    pub fn classify(primary: Vec<Found<P>>, secondary: Vec<Found<S>>) -> Self {
        match (is_sentinel_list(&primary), is_sentinel_list(&secondary)) {
            (true, true) => Self::BothPass,
            (true, false) => Self::PrimaryPass(secondary),
            (false, true) => Self::SecondaryPass(primary),
            (false, false) => Self::Pairwise(primary, secondary),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BothPass => "both_pass",
            Self::PrimaryPass(_) => "primary_pass",
            Self::SecondaryPass(_) => "secondary_pass",
            Self::Pairwise(..) => "pairwise",
        }
    }
}

/// Pair the search results of both backends.
///
/// Fails with `DualError::LengthMismatch` when neither side passed and the
/// lists differ in size, and with `DualError::NoMatch` when a primary result
/// has no equivalent secondary result. Output follows primary order, or
/// secondary order when the primary passed.
pub fn reconcile<P, S>(
    operation: &'static str,
    primary: Vec<Found<P>>,
    secondary: Vec<Found<S>>,
    policy: MatchPolicy,
) -> Result<Matched<P, S>, DualError>
where
    P: ParserNode,
    S: ParserNode<Fields = P::Fields>,
{
    let resolution = Resolution::classify(primary, secondary);
    tracing::debug!(operation, case = resolution.label(), "reconciling search results");

    match resolution {
        Resolution::BothPass => Ok(vec![(Found::Pass, Found::Pass)]),
        Resolution::PrimaryPass(secondary) => Ok(secondary
            .into_iter()
            .map(|node| (Found::Pass, node))
            .collect()),
        Resolution::SecondaryPass(primary) => Ok(primary
            .into_iter()
            .map(|node| (node, Found::Pass))
            .collect()),
        Resolution::Pairwise(primary, secondary) => {
            match_pairwise(operation, primary, secondary, policy)
        }
    }
}

fn match_pairwise<P, S>(
    operation: &'static str,
    primary: Vec<Found<P>>,
    secondary: Vec<Found<S>>,
    policy: MatchPolicy,
) -> Result<Matched<P, S>, DualError>
where
    P: ParserNode,
    S: ParserNode<Fields = P::Fields>,
{
    if primary.len() != secondary.len() {
        return Err(DualError::LengthMismatch {
            operation,
            primary: primary.len(),
            secondary: secondary.len(),
        });
    }

    let no_match = |node: &Found<P>| DualError::NoMatch {
        operation,
        node: describe(node),
    };

    match policy {
        MatchPolicy::Permissive => primary
            .into_iter()
            .map(|p| {
                let s = secondary
                    .iter()
                    .find(|s| nodes_equivalent(&p, *s))
                    .cloned()
                    .ok_or_else(|| no_match(&p))?;
                Ok((p, s))
            })
            .collect(),
        MatchPolicy::Exclusive => {
            let mut pool: Vec<Option<Found<S>>> = secondary.into_iter().map(Some).collect();
            primary
                .into_iter()
                .map(|p| {
                    let s = pool
                        .iter_mut()
                        .find(|slot| slot.as_ref().is_some_and(|s| nodes_equivalent(&p, s)))
                        .and_then(Option::take)
                        .ok_or_else(|| no_match(&p))?;
                    Ok((p, s))
                })
                .collect()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
