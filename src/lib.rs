//! # adapters-rs
//!
//! Uniform sequence adapters over heterogeneous containers.
//!
//! The same seven operations work on plain sequences, sets and maps without
//! the caller ever naming which one it holds. A container's *kind* is decided
//! from its static shape:
//!
//! - **Sequential** (`Vec`, `VecDeque`, `LinkedList`, arrays, slices): values
//!   are the elements
//! - **SetLike** (`BTreeSet`, `HashSet`): values are the elements, and each
//!   element is its own key
//! - **MapLike** (`BTreeMap`, `HashMap`): values are the mapped values, keys
//!   are the keys
//!
//! Every operation eagerly builds a new `Vec`, which is Sequential, so
//! stages chain left to right.
//!
//! ## Example
//!
//! ```
//! use adapters_rs::{Keys, Map, Pipe, Skip, Take, Values};
//! use std::collections::BTreeMap;
//!
//! let m: BTreeMap<&str, i32> = [
//!     ("first", 0),
//!     ("second", 1),
//!     ("third", 2),
//!     ("fourth", 3),
//!     ("fifth", 5),
//! ]
//! .into_iter()
//! .collect();
//!
//! // Map values are visited in key order: fifth, first, fourth, second, third.
//! assert_eq!(m.pipe(Map(|x: &i32| x * 2)), vec![10, 0, 6, 2, 4]);
//! assert_eq!(m.pipe(Take(3)), vec![5, 0, 3]);
//! assert_eq!(m.pipe(Skip(3)), vec![1, 2]);
//! assert_eq!(m.pipe(Keys), vec!["fifth", "first", "fourth", "second", "third"]);
//! assert_eq!(m.pipe(Values), vec![5, 0, 3, 1, 2]);
//! ```
//!
//! The [`dsl`] module runs the same adapters from pipeline text.

pub mod classify;
pub mod containers;
pub mod dsl;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod stage;
pub mod value;

pub use classify::{
    Container, ContainerKind, ElementView, KeyedView, KindTag, MapLike, ReversibleView,
    SequenceView, Sequential, SetLike, kind_of,
};
pub use dsl::{
    Command, DebugCallbacks, DebugInfo, Source, execute_pipeline, execute_pipeline_debug,
    parse_commands,
};
pub use error::PipelineError;
pub use extract::{Extract, KeyOf, ValueOf, keys, values, values_rev};
pub use pipeline::Pipe;
pub use stage::{Filter, Keys, Map, Operation, Reverse, Skip, Take, Values};
pub use value::{ArithOp, CmpOp, Scalar};
