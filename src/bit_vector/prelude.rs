//! The prelude for bit vectors.
//!
//! The purpose of this module is to alleviate imports of the common traits
//! for bit vectors.
//!
//! ```
//! # #![allow(unused_imports)]
//! use wavix::bit_vector::prelude::*;
//! ```
pub use crate::bit_vector::{Access, BitVectorIndex, NumBits, Rank, Select};
