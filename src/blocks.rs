//! # Signature Blocks
//!
//! A proof value is a flat buffer of equally sized signature blocks. Blocks
//! are addressed by position; the block count is never stored, it is derived
//! from the container's form and payloads.

use crate::{Error, Result};

/// Bounds-checked view over the signature blocks of a proof value.
#[derive(Clone, Copy, Debug)]
pub struct SignatureBlocks<'a> {
    proof: &'a [u8],
    size: usize,
    count: usize,
}

impl<'a> SignatureBlocks<'a> {
    /// Split `proof` into `count` equally sized blocks.
    ///
    /// # Errors
    ///
    /// Returns a format error if `count` is zero or the proof length is not an
    /// exact multiple of `count`.
    pub fn new(proof: &'a [u8], count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::Format("signature count must be at least 1".into()));
        }
        if proof.len() % count != 0 {
            return Err(Error::Format(format!(
                "proof length {} is not evenly divisible by {count}",
                proof.len()
            )));
        }

        Ok(Self {
            proof,
            size: proof.len() / count,
            count,
        })
    }

    /// Size of each block in bytes.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.size
    }

    /// Number of blocks.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// The block at `index`.
    ///
    /// # Errors
    ///
    /// Returns a format error if `index` is not less than the block count.
    pub fn block(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.count {
            return Err(Error::Format(format!(
                "signature block {index} out of range (count {})",
                self.count
            )));
        }
        let start = index * self.size;
        Ok(&self.proof[start..start + self.size])
    }
}
