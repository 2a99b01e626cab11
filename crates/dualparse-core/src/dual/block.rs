//! Dual block node.

use super::{DualComment, DualDirective, DualNode, Pair};
use crate::node::{BlockNode, ChildRef};
use crate::oracle::require_nodes_equivalent;
use crate::proxy::proxied_fields;
use crate::reconcile::reconcile;
use crate::types::{DirectiveParams, DualError, Found, MatchPolicy};

/// A block present in both backends.
///
/// The block carries the `MatchPolicy` its searches reconcile with; child
/// blocks created or found through it inherit the policy.
#[derive(Debug, Clone)]
pub struct DualBlock<P, S> {
    pair: Pair<P, S>,
    policy: MatchPolicy,
}

impl<P: BlockNode, S: BlockNode> DualBlock<P, S> {
    /// Create a fresh root block in both backends from the same arguments.
    pub fn new(params: &DirectiveParams) -> Result<Self, DualError> {
        let primary = P::create(params).map_err(DualError::primary)?;
        let secondary = S::create(params).map_err(DualError::secondary)?;
        Self::wrap(
            "block",
            Found::Node(primary),
            Found::Node(secondary),
            MatchPolicy::default(),
        )
    }

    /// Wrap two already created blocks.
    pub fn from_pair(primary: Found<P>, secondary: Found<S>) -> Result<Self, DualError> {
        Self::wrap("block", primary, secondary, MatchPolicy::default())
    }

    fn wrap(
        context: &str,
        primary: Found<P>,
        secondary: Found<S>,
        policy: MatchPolicy,
    ) -> Result<Self, DualError> {
        require_nodes_equivalent(context, &primary, &secondary)?;
        Ok(Self {
            pair: Pair::new(primary, secondary),
            policy,
        })
    }

    /// Use `policy` for this block's searches and for blocks derived from it.
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Set the parameter list in both backends and require they still agree.
    pub fn set_parameters<I, T>(&mut self, parameters: I) -> Result<(), DualError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let parameters = collect(parameters);
        self.pair.set_parameters(&parameters)
    }

    proxied_fields! {
        name -> String;
        parameters -> Vec<String>;
        enabled -> bool;
    }

    // =========================================================================
    // CHILD CREATION
    // =========================================================================

    /// Create a child block in both backends.
    pub fn add_child_block<I, T>(
        &mut self,
        name: &str,
        parameters: I,
        position: Option<usize>,
    ) -> Result<DualBlock<P, S>, DualError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let parameters = collect(parameters);
        let (primary, secondary) = self.pair.forward_mut(
            |node| node.add_child_block(name, &parameters, position),
            |node| node.add_child_block(name, &parameters, position),
        )?;
        Self::wrap("add_child_block", primary, secondary, self.policy)
    }

    /// Create a child directive in both backends.
    pub fn add_child_directive<I, T>(
        &mut self,
        name: &str,
        parameters: I,
        position: Option<usize>,
    ) -> Result<DualDirective<P::Directive, S::Directive>, DualError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let parameters = collect(parameters);
        let (primary, secondary) = self.pair.forward_mut(
            |node| node.add_child_directive(name, &parameters, position),
            |node| node.add_child_directive(name, &parameters, position),
        )?;
        DualDirective::wrap("add_child_directive", primary, secondary)
    }

    /// Create a child comment in both backends.
    pub fn add_child_comment(
        &mut self,
        comment: &str,
        position: Option<usize>,
    ) -> Result<DualComment<P::Comment, S::Comment>, DualError> {
        let (primary, secondary) = self.pair.forward_mut(
            |node| node.add_child_comment(comment, position),
            |node| node.add_child_comment(comment, position),
        )?;
        DualComment::wrap("add_child_comment", primary, secondary)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Find descendant blocks in both backends and pair up the results.
    pub fn find_blocks(&self, name: &str, exclude: bool) -> Result<Vec<DualBlock<P, S>>, DualError> {
        let (primary, secondary) = self.pair.search(
            |node| node.find_blocks(name, exclude),
            |node| node.find_blocks(name, exclude),
        )?;
        reconcile("find_blocks", primary, secondary, self.policy)?
            .into_iter()
            .map(|(p, s)| Self::wrap("find_blocks", p, s, self.policy))
            .collect()
    }

    /// Find descendant directives in both backends and pair up the results.
    pub fn find_directives(
        &self,
        name: &str,
        exclude: bool,
    ) -> Result<Vec<DualDirective<P::Directive, S::Directive>>, DualError> {
        let (primary, secondary) = self.pair.search(
            |node| node.find_directives(name, exclude),
            |node| node.find_directives(name, exclude),
        )?;
        reconcile("find_directives", primary, secondary, self.policy)?
            .into_iter()
            .map(|(p, s)| DualDirective::wrap("find_directives", p, s))
            .collect()
    }

    /// Find descendant comments in both backends and pair up the results.
    pub fn find_comments(
        &self,
        comment: &str,
        exact: bool,
    ) -> Result<Vec<DualComment<P::Comment, S::Comment>>, DualError> {
        let (primary, secondary) = self.pair.search(
            |node| node.find_comments(comment, exact),
            |node| node.find_comments(comment, exact),
        )?;
        reconcile("find_comments", primary, secondary, self.policy)?
            .into_iter()
            .map(|(p, s)| DualComment::wrap("find_comments", p, s))
            .collect()
    }

    // =========================================================================
    // DELETION
    // =========================================================================

    /// Delete a child from both backends.
    ///
    /// Each backend receives its own stored handle of the child. A pass side,
    /// on the parent or on the child, is skipped for that backend.
    pub fn delete_child(&mut self, child: impl Into<DualChild<P, S>>) -> Result<(), DualError> {
        let child = child.into();

        if let (Found::Node(parent), Some(node)) = (&mut self.pair.primary, child.primary_ref()) {
            parent.delete_child(node).map_err(DualError::primary)?;
        }
        if let (Found::Node(parent), Some(node)) =
            (&mut self.pair.secondary, child.secondary_ref())
        {
            parent.delete_child(node).map_err(DualError::secondary)?;
        }
        Ok(())
    }
}

impl<P: BlockNode, S: BlockNode> DualNode for DualBlock<P, S> {
    type Primary = P;
    type Secondary = S;

    fn pair(&self) -> &Pair<P, S> {
        &self.pair
    }

    fn pair_mut(&mut self) -> &mut Pair<P, S> {
        &mut self.pair
    }
}

fn collect<I, T>(parameters: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    parameters.into_iter().map(Into::into).collect()
}

// =============================================================================
// DUAL CHILD
// =============================================================================

/// A dual child of any variant, as accepted by `DualBlock::delete_child`.
///
/// Cloning yields another handle pair to the same backend nodes.
#[derive(Debug, Clone)]
pub enum DualChild<P: BlockNode, S: BlockNode> {
    Block(DualBlock<P, S>),
    Directive(DualDirective<P::Directive, S::Directive>),
    Comment(DualComment<P::Comment, S::Comment>),
}

impl<P: BlockNode, S: BlockNode> DualChild<P, S> {
    fn primary_ref(&self) -> Option<ChildRef<'_, P>> {
        match self {
            Self::Block(node) => node.primary().as_node().map(ChildRef::Block),
            Self::Directive(node) => node.primary().as_node().map(ChildRef::Directive),
            Self::Comment(node) => node.primary().as_node().map(ChildRef::Comment),
        }
    }

    fn secondary_ref(&self) -> Option<ChildRef<'_, S>> {
        match self {
            Self::Block(node) => node.secondary().as_node().map(ChildRef::Block),
            Self::Directive(node) => node.secondary().as_node().map(ChildRef::Directive),
            Self::Comment(node) => node.secondary().as_node().map(ChildRef::Comment),
        }
    }
}

impl<P: BlockNode, S: BlockNode> From<DualBlock<P, S>> for DualChild<P, S> {
    fn from(node: DualBlock<P, S>) -> Self {
        Self::Block(node)
    }
}

impl<P: BlockNode, S: BlockNode> From<DualDirective<P::Directive, S::Directive>>
    for DualChild<P, S>
{
    fn from(node: DualDirective<P::Directive, S::Directive>) -> Self {
        Self::Directive(node)
    }
}

impl<P: BlockNode, S: BlockNode> From<DualComment<P::Comment, S::Comment>> for DualChild<P, S> {
    fn from(node: DualComment<P::Comment, S::Comment>) -> Self {
        Self::Comment(node)
    }
}
