//! Classification of the standard collections.
//!
//! | Type | Kind | Reversible |
//! |------|------|------------|
//! | `Vec`, `VecDeque`, `LinkedList`, `[T; N]`, `[T]` | Sequential | yes |
//! | `BTreeSet` | SetLike | yes |
//! | `HashSet` | SetLike | no |
//! | `BTreeMap` | MapLike | yes |
//! | `HashMap` | MapLike | no |

use std::collections::{
    BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque, btree_map, btree_set, hash_map,
    hash_set, linked_list, vec_deque,
};
use std::iter::Rev;
use std::slice;

use crate::classify::{
    Container, ElementView, KeyedView, MapLike, ReversibleView, SequenceView, Sequential, SetLike,
};

/// Implements the element-shaped views for a collection whose entries are
/// `&T` and whose iterator is double-ended.
macro_rules! element_views {
    ([$($gen:tt)*] $ty:ty, $($iter:ident)::+, $kind:ty) => {
        impl<$($gen)*> SequenceView for $ty {
            type Entry<'a> = &'a T
            where
                Self: 'a;
            type Entries<'a> = $($iter)::+<'a, T>
            where
                Self: 'a;

            fn entries(&self) -> Self::Entries<'_> {
                self.iter()
            }

            fn entry_count(&self) -> usize {
                self.len()
            }
        }

        impl<$($gen)*> ElementView for $ty {
            type Element = T;

            fn element<'a>(entry: &'a T) -> &'a T
            where
                Self: 'a,
            {
                entry
            }
        }

        impl<$($gen)*> Container for $ty {
            type Kind = $kind;
        }
    };
}

/// Implements [`ReversibleView`] by reversing the forward iterator.
macro_rules! reversible {
    ([$($gen:tt)*] $ty:ty, $($iter:ident)::+ <$($arg:ident),+>) => {
        impl<$($gen)*> ReversibleView for $ty {
            type EntriesRev<'a> = Rev<$($iter)::+<'a, $($arg),+>>
            where
                Self: 'a;

            fn entries_rev(&self) -> Self::EntriesRev<'_> {
                self.iter().rev()
            }
        }
    };
}

/// Sets are keyed by their own elements.
macro_rules! self_keyed {
    ([$($gen:tt)*] $ty:ty) => {
        impl<$($gen)*> KeyedView for $ty {
            type Key = T;
            type Mapped = T;

            fn key<'a>(entry: &'a T) -> &'a T
            where
                Self: 'a,
            {
                entry
            }

            fn mapped<'a>(entry: &'a T) -> &'a T
            where
                Self: 'a,
            {
                entry
            }
        }
    };
}

/// Implements the pair-shaped views for a map whose entries are `(&K, &V)`.
macro_rules! pair_views {
    ([$($gen:tt)*] $ty:ty, $($iter:ident)::+) => {
        impl<$($gen)*> SequenceView for $ty {
            type Entry<'a> = (&'a K, &'a V)
            where
                Self: 'a;
            type Entries<'a> = $($iter)::+<'a, K, V>
            where
                Self: 'a;

            fn entries(&self) -> Self::Entries<'_> {
                self.iter()
            }

            fn entry_count(&self) -> usize {
                self.len()
            }
        }

        impl<$($gen)*> KeyedView for $ty {
            type Key = K;
            type Mapped = V;

            fn key<'a>((key, _): (&'a K, &'a V)) -> &'a K
            where
                Self: 'a,
            {
                key
            }

            fn mapped<'a>((_, value): (&'a K, &'a V)) -> &'a V
            where
                Self: 'a,
            {
                value
            }
        }

        impl<$($gen)*> Container for $ty {
            type Kind = MapLike;
        }
    };
}

// Sequential
element_views!([T] Vec<T>, slice::Iter, Sequential);
reversible!([T] Vec<T>, slice::Iter<T>);

element_views!([T] [T], slice::Iter, Sequential);
reversible!([T] [T], slice::Iter<T>);

element_views!([T, const N: usize] [T; N], slice::Iter, Sequential);
reversible!([T, const N: usize] [T; N], slice::Iter<T>);

element_views!([T] VecDeque<T>, vec_deque::Iter, Sequential);
reversible!([T] VecDeque<T>, vec_deque::Iter<T>);

element_views!([T] LinkedList<T>, linked_list::Iter, Sequential);
reversible!([T] LinkedList<T>, linked_list::Iter<T>);

// SetLike
element_views!([T] BTreeSet<T>, btree_set::Iter, SetLike);
self_keyed!([T] BTreeSet<T>);
reversible!([T] BTreeSet<T>, btree_set::Iter<T>);

element_views!([T, S] HashSet<T, S>, hash_set::Iter, SetLike);
self_keyed!([T, S] HashSet<T, S>);

// MapLike
pair_views!([K, V] BTreeMap<K, V>, btree_map::Iter);
reversible!([K, V] BTreeMap<K, V>, btree_map::Iter<K, V>);

pair_views!([K, V, S] HashMap<K, V, S>, hash_map::Iter);
