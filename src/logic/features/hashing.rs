//! Feature Hashing
//!
//! Hashing trick cho Source/Destination address strings.
//! Bucket và sign giống batch pipeline: signed MurmurHash3 (x86, 32-bit, seed 0).

use serde::{Deserialize, Serialize};

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3 x86 32-bit
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut chunks = data.chunks_exact(4);

    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
        h ^= k;
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k |= (*byte as u32) << (8 * i);
        }
        k = k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
        h ^= k;
    }

    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Fitted hasher parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureHasher {
    pub n_features: usize,
    #[serde(default = "default_alternate_sign")]
    pub alternate_sign: bool,
}

fn default_alternate_sign() -> bool {
    true
}

impl FeatureHasher {
    pub fn new(n_features: usize) -> Self {
        Self { n_features, alternate_sign: true }
    }

    pub fn width(&self) -> usize {
        self.n_features
    }

    /// (bucket, signed value) for one string token
    pub fn bucket(&self, value: &str) -> (usize, f32) {
        let h = murmur3_32(value.as_bytes(), 0) as i32;
        let index = ((h as i64).unsigned_abs() % self.n_features as u64) as usize;
        let sign = if self.alternate_sign && h < 0 { -1.0 } else { 1.0 };
        (index, sign)
    }

    /// Accumulate the hashed token into `out` (len == n_features)
    pub fn transform_into(&self, value: &str, out: &mut [f32]) {
        let (index, sign) = self.bucket(value);
        out[index] += sign;
    }

    pub fn column_names(&self, prefix: &str) -> Vec<String> {
        (0..self.n_features).map(|i| format!("{}_{}", prefix, i)).collect()
    }
}
