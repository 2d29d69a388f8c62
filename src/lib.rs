//! # Wavelet matrix indexing in Rust
//!
//! Wavix is a static, in-memory [wavelet matrix](https://en.wikipedia.org/wiki/Wavelet_Tree):
//! a succinct index over an immutable sequence of non-negative integers that
//! answers a family of rank, select, quantile, and top-k queries, each in
//! time proportional to the bit width of the alphabet.
//!
//! ## Design policy
//!
//! - **Static by construction:**
//!   A matrix is built once from a complete sequence and never mutated; all
//!   queries borrow it read-only, so it can be shared freely across threads.
//!
//! - **Non-exceptional domains:**
//!   Out-of-domain arguments answer [`None`] rather than panicking or
//!   erroring. Only two failures are reported as errors: building from an
//!   empty sequence and decoding a malformed byte image.
//!
//! - **Ensure safety:**
//!   The implementation is pure safe Rust; word-level tricks are confined to
//!   [`broadword`].
//!
//! ## Data structures
//!
//! - [Bit vectors](crate::bit_vector) with constant-time rank and select,
//!   the building block the index descends through.
//! - The [wavelet matrix](crate::wavelet_matrix) itself, with its builder
//!   and its little-endian byte codec.
//!
//! Throughout this document, we write $`\log_2`$ with $`\lg`$.
//!
//! ## Limitation
//!
//! This library is designed to run on 64-bit machines.
#![deny(missing_docs)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("`target_pointer_width` must be 64");

pub mod bit_vector;
pub mod broadword;
pub mod error;
pub mod utils;
pub mod wavelet_matrix;

pub use error::{Error, Result};
pub use wavelet_matrix::{ListEntry, RankCounts, WaveletMatrix, WaveletMatrixBuilder};
