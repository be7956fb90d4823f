//! # Compressed Bitmaps
//!
//! *Sorted integer sets that pick their own representation, chunk by chunk.*
//!
//! ## Intuition First
//!
//! Picture a very long street of mailboxes, numbered from zero up to four
//! billion. Some stretches have a letter in every box, some have one letter
//! per mile, and most are empty. Writing down "which boxes have mail" as a
//! single list, or as a single row of bits, wastes space on one kind of
//! stretch or the other.
//!
//! A roaring bitmap cuts the street into blocks of 65536 boxes and lets each
//! block choose how to describe itself: a short list of box numbers, a row
//! of bits, or a few "from here to there" ranges. Empty blocks are not
//! written down at all.
//!
//! ## The Problem
//!
//! - **Plain bit vectors** answer membership in $O(1)$ but cost $2^{32}$ bits
//!   whatever the set holds.
//! - **Sorted arrays** are compact for sparse sets but spend 32 bits per value
//!   on dense ones and make intersections branchy.
//! - **Run-length encodings** are tiny for contiguous data and terrible for
//!   scattered data.
//!
//! No single encoding wins everywhere, so the choice is made locally.
//!
//! ## Historical Context
//!
//! ```text
//! 1985  Bitmap indexes in databases (uncompressed)
//! 1999  WAH / BBC: word-aligned run-length compressed bitmaps
//! 2010  Concise: compressed bitmaps with mixed literal/fill words
//! 2014  Chambi et al.: array and bitmap containers ("Roaring")
//! 2016  Lemire et al.: run containers added to Roaring
//! ```
//!
//! ## Mathematical Formulation
//!
//! A value $v$ in a 32-bit domain splits into a key $k = \lfloor v / 2^{16}
//! \rfloor$ and a low part $\ell = v \bmod 2^{16}$. The set $S$ becomes a
//! sorted map $k \mapsto C_k$ with $C_k = \{\ell : (k, \ell) \in S\} \ne
//! \emptyset$. Each $C_k$ is stored as whichever of
//!
//! - an array: $2|C_k|$ bytes, used while $|C_k| \le 4096$;
//! - a bitmap: 8192 bytes;
//! - runs: $4r$ bytes for $r$ maximal intervals;
//!
//! is smallest, with runs only chosen by an explicit [`Bitmap32::optimize`].
//! A 64-bit domain applies the same split once more: the high 32 bits key a
//! [`Bitmap32`].
//!
//! ## Complexity Analysis
//!
//! - **Membership**: $O(\log n_c)$ to find the container, then $O(\log |C|)$
//!   (array, runs) or $O(1)$ (bitmap).
//! - **Set algebra**: linear in the number of containers, each pair combined
//!   by a specialized routine for its representation pair.
//! - **Rank / select**: linear in containers, then popcount or binary search.
//!
//! ## What Could Go Wrong
//!
//! 1. **Pathological alternation**: a container whose cardinality hovers
//!    around 4096 flips between array and bitmap on every insert/remove.
//! 2. **Runs on scattered data**: run encoding is only kept while it is no
//!    larger than the plain form; without `optimize` it is never created.
//! 3. **Untrusted input**: the decoder validates every length, order and
//!    count before allocating, and never returns a partially built bitmap.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - **[`Bitmap32`]** and **[`Bitmap64`]**: statically typed sets.
//! - **[`Bitmap`]**: a domain-tagged set for loosely typed callers, checked
//!   through [`Domain::check`].
//! - A versioned little-endian binary encoding (`to_bytes` / `from_bytes`),
//!   and `serde` support behind the `serde` feature.
//!
//! ```
//! use rbits::Bitmap32;
//!
//! let evens: Bitmap32 = (0..100).step_by(2).collect();
//! let small: Bitmap32 = (0..10).collect();
//! assert_eq!((&evens & &small).len(), 5);
//! assert!(small.intersects(&evens));
//!
//! let bytes = evens.to_bytes();
//! assert_eq!(Bitmap32::from_bytes(&bytes).unwrap(), evens);
//! ```
//!
//! ## References
//!
//! - Chambi, S., Lemire, D., et al. (2016). "Better bitmap performance with
//!   Roaring bitmaps."
//! - Lemire, D., et al. (2016). "Consistently faster and smaller compressed
//!   bitmaps with Roaring."
//! - Lemire, D., et al. (2018). "Roaring Bitmaps: Implementation of an
//!   Optimized Software Library."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitmap;
pub mod bitmap32;
pub mod bitmap64;
mod codec;
mod container;
pub mod domain;
pub mod error;
mod index;
mod ops;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod stats;

pub use bitmap::Bitmap;
pub use bitmap32::Bitmap32;
pub use bitmap64::Bitmap64;
pub use domain::{Domain, Integer, Scalar};
pub use error::{Error, Result};
pub use stats::Statistics;
