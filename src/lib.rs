//! Portable fixed-width SIMD vectors.
//!
//! A [`Species`] names an element type and a lane count; it hands out
//! [`Vector`]s, [`Mask`]s and [`Shuffle`]s of that shape. Operations come
//! from a closed catalog ([`operators`]) and run lane by lane through the
//! templates in [`engine`]; every (element type, lane count) pair is its own
//! monomorphic instantiation.
//!
//! ```
//! use lanevec::{Binary, Mask, Species};
//!
//! let species = Species::<f32, 4>::of();
//! let a = species.from_array([2.0, 4.0, 6.0, 8.0]);
//! let m = Mask::from_array([true, false, true, false]);
//! let sum = a.lanewise_masked(Binary::Add, &species.broadcast(1.0), &m).unwrap();
//! assert_eq!(sum.to_array(), [3.0, 4.0, 7.0, 8.0]);
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod inline;
pub mod lanes;
pub mod mask;
pub mod memory;
pub mod operators;
mod permute;
mod reinterpret;
pub mod shape;
pub mod shuffle;
pub mod species;
pub mod traits;
pub mod vector;

pub use error::{Result, VectorError};
pub use lanes::builder::LaneBuilder;
pub use mask::Mask;
pub use memory::{ByteOrder, HeapSegment, MemorySegment};
pub use operators::{Associative, Binary, Category, Comparison, OpFlags, Operator, Ternary, Test, Unary};
pub use shape::{ElementKind, Shape, SpeciesDescriptor};
pub use shuffle::{LaneSource, Shuffle};
pub use species::Species;
pub use traits::{FloatingView, IntegralLane, LaneType};
pub use vector::Vector;

// Alignment of heap segments and lane buffers; covers a 1024-bit register
pub const ALIGNMENT: usize = 128;
