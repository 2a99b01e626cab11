//! # Attribute Proxy
//!
//! Checked read access to backend fields through a dual node.
//!
//! Each dual type enumerates the fields it proxies with `proxied_fields!`.
//! A proxied read queries the primary, then the secondary, requires the two
//! answers to be equivalent and returns the primary's answer (the secondary's
//! when the primary passed). Reads can therefore fail: every read is two
//! backend calls plus an equivalence check.

use crate::dual::Pair;
use crate::oracle::require_equivalent;
use crate::types::{DualError, Observed};
use std::fmt;

/// Read one field from both sides of `pair`.
///
/// A pass side contributes `Observed::Pass`.
pub fn read<P, S, T>(
    field: &str,
    pair: &Pair<P, S>,
    read_primary: impl FnOnce(&P) -> Observed<T>,
    read_secondary: impl FnOnce(&S) -> Observed<T>,
) -> Result<Observed<T>, DualError>
where
    T: PartialEq + fmt::Debug,
{
    let first = pair
        .primary()
        .as_node()
        .map_or(Observed::Pass, read_primary);
    let second = pair
        .secondary()
        .as_node()
        .map_or(Observed::Pass, read_secondary);

    require_equivalent(field, &first, &second)?;
    Ok(first.or(second))
}

/// Generate one checked getter per listed field.
///
/// Expands inside an `impl` block of a type with a `pair: Pair<P, S>` field;
/// both backend types must expose a method of the same name returning `Observed<T>`.
macro_rules! proxied_fields {
    ($($(#[$meta:meta])* $field:ident -> $ty:ty;)+) => {
        $(
            $(#[$meta])*
            pub fn $field(&self) -> Result<$crate::types::Observed<$ty>, $crate::types::DualError> {
                $crate::proxy::read(
                    stringify!($field),
                    &self.pair,
                    |node| node.$field(),
                    |node| node.$field(),
                )
            }
        )+
    };
}

pub(crate) use proxied_fields;
