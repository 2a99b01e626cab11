//! A backend that implements nothing.
//!
//! Every field reads as `Observed::Pass` and every search answers with the
//! sentinel list. Pairing it with a real backend exercises the wildcard
//! paths of the oracle and the reconciliation engine.

use crate::node::{BlockNode, ChildRef, CommentNode, DirectiveNode, ParserNode};
use crate::types::{
    BackendError, CommentFields, CommentParams, DirectiveFields, DirectiveParams, FileFields,
    Found, Observed,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassComment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassDirective;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassBlock;

const fn unknown_file() -> FileFields {
    FileFields {
        filepath: Observed::Pass,
        dirty: Observed::Pass,
    }
}

const fn unknown_directive() -> DirectiveFields {
    DirectiveFields {
        name: Observed::Pass,
        parameters: Observed::Pass,
        enabled: Observed::Pass,
        file: unknown_file(),
    }
}

macro_rules! pass_node {
    ($name:ident, $fields:ty, $unknown:expr) => {
        impl ParserNode for $name {
            type Fields = $fields;

            fn fields(&self) -> $fields {
                $unknown
            }

            fn filepath(&self) -> Observed<Option<PathBuf>> {
                Observed::Pass
            }

            fn dirty(&self) -> Observed<bool> {
                Observed::Pass
            }

            fn save(&mut self, _msg: &str) -> Result<(), BackendError> {
                Ok(())
            }

            fn unsaved_files(&self) -> Result<Observed<Vec<PathBuf>>, BackendError> {
                Ok(Observed::Pass)
            }
        }
    };
}

pass_node!(
    PassComment,
    CommentFields,
    CommentFields {
        comment: Observed::Pass,
        file: unknown_file(),
    }
);
pass_node!(PassDirective, DirectiveFields, unknown_directive());
pass_node!(PassBlock, DirectiveFields, unknown_directive());

impl CommentNode for PassComment {
    fn create(_params: &CommentParams) -> Result<Self, BackendError> {
        Ok(Self)
    }

    fn comment(&self) -> Observed<String> {
        Observed::Pass
    }
}

macro_rules! pass_directive {
    ($name:ident) => {
        impl DirectiveNode for $name {
            fn create(_params: &DirectiveParams) -> Result<Self, BackendError> {
                Ok(Self)
            }

            fn name(&self) -> Observed<String> {
                Observed::Pass
            }

            fn parameters(&self) -> Observed<Vec<String>> {
                Observed::Pass
            }

            fn enabled(&self) -> Observed<bool> {
                Observed::Pass
            }

            fn set_parameters(&mut self, _parameters: &[String]) -> Result<(), BackendError> {
                Ok(())
            }
        }
    };
}

pass_directive!(PassDirective);
pass_directive!(PassBlock);

impl BlockNode for PassBlock {
    type Comment = PassComment;
    type Directive = PassDirective;

    fn add_child_block(
        &mut self,
        _name: &str,
        _parameters: &[String],
        _position: Option<usize>,
    ) -> Result<Self, BackendError> {
        Ok(Self)
    }

    fn add_child_directive(
        &mut self,
        _name: &str,
        _parameters: &[String],
        _position: Option<usize>,
    ) -> Result<PassDirective, BackendError> {
        Ok(PassDirective)
    }

    fn add_child_comment(
        &mut self,
        _comment: &str,
        _position: Option<usize>,
    ) -> Result<PassComment, BackendError> {
        Ok(PassComment)
    }

    fn find_blocks(&self, _name: &str, _exclude: bool) -> Result<Vec<Found<Self>>, BackendError> {
        Ok(vec![Found::Pass])
    }

    fn find_directives(
        &self,
        _name: &str,
        _exclude: bool,
    ) -> Result<Vec<Found<PassDirective>>, BackendError> {
        Ok(vec![Found::Pass])
    }

    fn find_comments(
        &self,
        _comment: &str,
        _exact: bool,
    ) -> Result<Vec<Found<PassComment>>, BackendError> {
        Ok(vec![Found::Pass])
    }

    fn delete_child(&mut self, _child: ChildRef<'_, Self>) -> Result<(), BackendError> {
        Ok(())
    }
}
