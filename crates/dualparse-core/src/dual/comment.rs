//! Dual comment node.

use super::{DualNode, Pair};
use crate::node::CommentNode;
use crate::oracle::require_nodes_equivalent;
use crate::proxy::proxied_fields;
use crate::types::{CommentParams, DualError, Found};

/// A comment present in both backends.
#[derive(Debug, Clone)]
pub struct DualComment<P, S> {
    pair: Pair<P, S>,
}

impl<P: CommentNode, S: CommentNode> DualComment<P, S> {
    /// Create a fresh comment in both backends from the same arguments.
    pub fn new(params: &CommentParams) -> Result<Self, DualError> {
        let primary = P::create(params).map_err(DualError::primary)?;
        let secondary = S::create(params).map_err(DualError::secondary)?;
        Self::wrap("comment", Found::Node(primary), Found::Node(secondary))
    }

    /// Wrap two already created comments.
    pub fn from_pair(primary: Found<P>, secondary: Found<S>) -> Result<Self, DualError> {
        Self::wrap("comment", primary, secondary)
    }

    pub(crate) fn wrap(
        context: &str,
        primary: Found<P>,
        secondary: Found<S>,
    ) -> Result<Self, DualError> {
        require_nodes_equivalent(context, &primary, &secondary)?;
        Ok(Self {
            pair: Pair::new(primary, secondary),
        })
    }

    proxied_fields! {
        /// Comment text.
        comment -> String;
    }
}

impl<P: CommentNode, S: CommentNode> DualNode for DualComment<P, S> {
    type Primary = P;
    type Secondary = S;

    fn pair(&self) -> &Pair<P, S> {
        &self.pair
    }

    fn pair_mut(&mut self) -> &mut Pair<P, S> {
        &mut self.pair
    }
}
