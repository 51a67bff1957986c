//! Container kind classification.
//!
//! A container's kind is decided from its static shape, never from a runtime
//! check. The shape is described by a small set of capability traits:
//!
//! - [`SequenceView`] - forward iteration over entries (the minimum shape)
//! - [`ElementView`] - each entry is a bare element
//! - [`KeyedView`] - each entry has a key and a mapped value
//! - [`ReversibleView`] - entries can be walked in reverse native order
//!
//! [`Container`] ties a type to exactly one kind marker ([`Sequential`],
//! [`SetLike`] or [`MapLike`]). Because `Kind` is a single associated type, a
//! container can never be classified twice. Types that expose both a key and a
//! distinct mapped value are classified [`MapLike`] even though they also have
//! a key, which is what a set looks like.
//!
//! A type that does not implement [`Container`] is rejected when it reaches
//! the pipeline:
//!
//! ```compile_fail
//! use adapters_rs::{Pipe, Take};
//!
//! struct Opaque;
//! let _ = Opaque.pipe(Take(1));
//! ```

use std::fmt;

use crate::extract::Extract;

/// The three container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Plain sequence, no notion of keys.
    Sequential,
    /// Each element is its own key.
    SetLike,
    /// Entries are key/value pairs with distinct key and mapped types.
    MapLike,
}

impl ContainerKind {
    /// Short display name, used in debug output.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Sequential => "SEQUENTIAL",
            ContainerKind::SetLike => "SET",
            ContainerKind::MapLike => "MAP",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Sequential {}
    impl Sealed for super::SetLike {}
    impl Sealed for super::MapLike {}
}

/// Type-level kind tag. Implemented only by the three marker types.
pub trait KindTag: sealed::Sealed + 'static {
    const KIND: ContainerKind;
}

/// Marker for [`ContainerKind::Sequential`].
#[derive(Debug)]
pub enum Sequential {}

/// Marker for [`ContainerKind::SetLike`].
#[derive(Debug)]
pub enum SetLike {}

/// Marker for [`ContainerKind::MapLike`].
#[derive(Debug)]
pub enum MapLike {}

impl KindTag for Sequential {
    const KIND: ContainerKind = ContainerKind::Sequential;
}

impl KindTag for SetLike {
    const KIND: ContainerKind = ContainerKind::SetLike;
}

impl KindTag for MapLike {
    const KIND: ContainerKind = ContainerKind::MapLike;
}

/// Forward iteration over a container's entries, in native order.
pub trait SequenceView {
    /// One unit of native iteration: `&T` for elements, `(&K, &V)` for pairs.
    type Entry<'a>
    where
        Self: 'a;

    type Entries<'a>: Iterator<Item = Self::Entry<'a>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_>;

    /// Number of entries. Used to size result sequences.
    fn entry_count(&self) -> usize;
}

/// Containers whose entries are bare elements.
pub trait ElementView: SequenceView {
    type Element;

    fn element<'a>(entry: Self::Entry<'a>) -> &'a Self::Element
    where
        Self: 'a;
}

/// Containers whose entries carry a key and a mapped value.
///
/// Sets implement this with `Key = Mapped = Element`.
pub trait KeyedView: SequenceView {
    type Key;
    type Mapped;

    fn key<'a>(entry: Self::Entry<'a>) -> &'a Self::Key
    where
        Self: 'a;

    fn mapped<'a>(entry: Self::Entry<'a>) -> &'a Self::Mapped
    where
        Self: 'a;
}

/// Containers that can be walked in reverse native order.
pub trait ReversibleView: SequenceView {
    type EntriesRev<'a>: Iterator<Item = Self::Entry<'a>>
    where
        Self: 'a;

    fn entries_rev(&self) -> Self::EntriesRev<'_>;
}

/// A classified container.
///
/// `Kind` selects the extraction strategy every operation uses.
pub trait Container: SequenceView {
    type Kind: KindTag + Extract<Self>;
}

/// The kind of a container type, resolved at compile time.
pub const fn kind_of<C: Container + ?Sized>() -> ContainerKind {
    <C::Kind as KindTag>::KIND
}
