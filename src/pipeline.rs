//! Pipeline composition.
//!
//! [`Pipe`] is implemented for every classified container. `pipe` applies one
//! operation descriptor and returns a freshly allocated `Vec`; since a `Vec`
//! is itself a Sequential container, calls chain left to right:
//!
//! ```
//! use adapters_rs::{Filter, Map, Pipe, Reverse, Take};
//! use std::collections::BTreeMap;
//!
//! let stock: BTreeMap<&str, u32> = [("apples", 3), ("kiwis", 0), ("pears", 7)]
//!     .into_iter()
//!     .collect();
//!
//! let restock: Vec<u32> = stock
//!     .pipe(Filter(|n: &u32| *n < 5))
//!     .pipe(Map(|n: &u32| 10 - n))
//!     .pipe(Reverse)
//!     .pipe(Take(1));
//!
//! assert_eq!(restock, vec![10]);
//! ```

use crate::classify::{Container, KindTag};
use crate::stage::Operation;

/// Left-to-right application of operation descriptors.
pub trait Pipe: Container {
    /// Apply `op` to this container.
    ///
    /// The operation's capability requirements (for example
    /// [`crate::ReversibleView`] for [`crate::Reverse`]) are checked at
    /// compile time.
    fn pipe<O>(&self, op: O) -> O::Output
    where
        O: Operation<Self>,
    {
        let kind = <Self::Kind as KindTag>::KIND;
        tracing::trace!(
            kind = %kind,
            operation = op.name(),
            entries = self.entry_count(),
            "applying operation"
        );
        op.apply(self)
    }
}

impl<C: Container + ?Sized> Pipe for C {}
