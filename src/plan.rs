use crate::error::{Error, Result};

/// Cartesian-product size of all dimensions plus the mixed-radix rule for
/// turning one linear job index into one index per dimension.
///
/// The first-defined dimension is the fastest-varying digit. The script
/// emitter reproduces exactly this order and arithmetic in shell;
/// reordering would silently change which parameter varies fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationPlan {
    sizes: Vec<usize>,
    total: u64,
}

impl EnumerationPlan {
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Result<Self> {
        let sizes: Vec<usize> = sizes.into_iter().collect();
        let mut total: u64 = 1;
        for (index, &len) in sizes.iter().enumerate() {
            if len == 0 {
                return Err(Error::EmptyDimension(index));
            }
            total = total
                .checked_mul(len as u64)
                .ok_or(Error::JobCountOverflow)?;
        }
        Ok(Self { sizes, total })
    }

    /// Total number of jobs; at least 1 (the empty product).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Per-dimension sequence lengths, in definition order.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Decompose a linear job index into one index per dimension.
    pub fn decompose(&self, r: u64) -> Vec<usize> {
        let mut r = r;
        let mut indices = Vec::with_capacity(self.sizes.len());
        for &len in &self.sizes {
            let len = len as u64;
            indices.push((r % len) as usize);
            r /= len;
        }
        indices
    }
}
