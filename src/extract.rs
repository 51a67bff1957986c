//! Element extraction strategies.
//!
//! Every operation consumes a stream of *logical values*. What a logical
//! value is depends on the container kind:
//!
//! | Kind | value extraction | key extraction |
//! |------|------------------|----------------|
//! | Sequential | the element | the element |
//! | SetLike | the element | the element (its own key) |
//! | MapLike | the mapped value | the key |
//!
//! The strategy is chosen by the kind marker, so the choice is made once at
//! compile time and the kernels in [`crate::stage`] are written only once.

use crate::classify::{
    Container, ElementView, KeyedView, KindTag, MapLike, ReversibleView, SequenceView, Sequential,
    SetLike,
};

/// Projection from a container entry to its logical key and value.
///
/// Implemented by the kind markers; `C` is the container being read.
pub trait Extract<C: SequenceView + ?Sized>: KindTag {
    type Key;
    type Value;

    fn key<'a>(entry: C::Entry<'a>) -> &'a Self::Key
    where
        C: 'a;

    fn value<'a>(entry: C::Entry<'a>) -> &'a Self::Value
    where
        C: 'a;
}

/// The logical key type of container `C`.
pub type KeyOf<C> = <<C as Container>::Kind as Extract<C>>::Key;

/// The logical value type of container `C`.
pub type ValueOf<C> = <<C as Container>::Kind as Extract<C>>::Value;

impl<C> Extract<C> for Sequential
where
    C: ElementView + ?Sized,
{
    type Key = C::Element;
    type Value = C::Element;

    fn key<'a>(entry: C::Entry<'a>) -> &'a C::Element
    where
        C: 'a,
    {
        C::element(entry)
    }

    fn value<'a>(entry: C::Entry<'a>) -> &'a C::Element
    where
        C: 'a,
    {
        C::element(entry)
    }
}

impl<C> Extract<C> for SetLike
where
    C: ElementView + KeyedView<Key = <C as ElementView>::Element> + ?Sized,
{
    type Key = <C as KeyedView>::Key;
    type Value = <C as ElementView>::Element;

    fn key<'a>(entry: C::Entry<'a>) -> &'a Self::Key
    where
        C: 'a,
    {
        <C as KeyedView>::key(entry)
    }

    fn value<'a>(entry: C::Entry<'a>) -> &'a Self::Value
    where
        C: 'a,
    {
        C::element(entry)
    }
}

impl<C> Extract<C> for MapLike
where
    C: KeyedView + ?Sized,
{
    type Key = C::Key;
    type Value = C::Mapped;

    fn key<'a>(entry: C::Entry<'a>) -> &'a C::Key
    where
        C: 'a,
    {
        C::key(entry)
    }

    fn value<'a>(entry: C::Entry<'a>) -> &'a C::Mapped
    where
        C: 'a,
    {
        C::mapped(entry)
    }
}

/// Logical values of `container`, in native order.
pub fn values<C>(container: &C) -> impl Iterator<Item = &ValueOf<C>>
where
    C: Container + ?Sized,
{
    container
        .entries()
        .map(|entry| <C::Kind as Extract<C>>::value(entry))
}

/// Logical keys of `container`, in native order.
pub fn keys<C>(container: &C) -> impl Iterator<Item = &KeyOf<C>>
where
    C: Container + ?Sized,
{
    container
        .entries()
        .map(|entry| <C::Kind as Extract<C>>::key(entry))
}

/// Logical values of `container`, in reverse native order.
pub fn values_rev<C>(container: &C) -> impl Iterator<Item = &ValueOf<C>>
where
    C: Container + ReversibleView + ?Sized,
{
    container
        .entries_rev()
        .map(|entry| <C::Kind as Extract<C>>::value(entry))
}
