//! Dual directive node.

use super::{DualNode, Pair};
use crate::node::DirectiveNode;
use crate::oracle::require_nodes_equivalent;
use crate::proxy::proxied_fields;
use crate::types::{DirectiveParams, DualError, Found};

/// A directive present in both backends.
#[derive(Debug, Clone)]
pub struct DualDirective<P, S> {
    pair: Pair<P, S>,
}

impl<P: DirectiveNode, S: DirectiveNode> DualDirective<P, S> {
    /// Create a fresh directive in both backends from the same arguments.
    pub fn new(params: &DirectiveParams) -> Result<Self, DualError> {
        let primary = P::create(params).map_err(DualError::primary)?;
        let secondary = S::create(params).map_err(DualError::secondary)?;
        Self::wrap("directive", Found::Node(primary), Found::Node(secondary))
    }

    /// Wrap two already created directives.
    pub fn from_pair(primary: Found<P>, secondary: Found<S>) -> Result<Self, DualError> {
        Self::wrap("directive", primary, secondary)
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

    /// Set the parameter list in both backends and require they still agree.
    pub fn set_parameters<I, T>(&mut self, parameters: I) -> Result<(), DualError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let parameters: Vec<String> = parameters.into_iter().map(Into::into).collect();
        self.pair.set_parameters(&parameters)
    }

    proxied_fields! {
        name -> String;
        parameters -> Vec<String>;
        /// Not part of node equivalence, but still checked on read.
        enabled -> bool;
    }
}

impl<P: DirectiveNode, S: DirectiveNode> DualNode for DualDirective<P, S> {
    type Primary = P;
    type Secondary = S;

    fn pair(&self) -> &Pair<P, S> {
        &self.pair
    }

    fn pair_mut(&mut self) -> &mut Pair<P, S> {
        &mut self.pair
    }
}

impl<P: DirectiveNode, S: DirectiveNode> Pair<P, S> {
    /// Shared by directives and blocks.
    pub(crate) fn set_parameters(&mut self, parameters: &[String]) -> Result<(), DualError> {
        self.forward_mut(
            |node| node.set_parameters(parameters),
            |node| node.set_parameters(parameters),
        )?;
        require_nodes_equivalent("set_parameters", &self.primary, &self.secondary)
    }
}
