//! One-Hot Encoding cho Protocol column.
//!
//! Protocol chưa thấy lúc fit → block toàn 0 (không raise).

use std::collections::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fitted protocol encoder
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl OneHotEncoder {
    pub fn new(categories: Vec<String>) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { categories, index }
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Write the one-hot block; unseen values leave it all-zero
    pub fn transform_into(&self, value: &str, out: &mut [f32]) {
        if let Some(&i) = self.index.get(value) {
            out[i] = 1.0;
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| format!("protocol={}", c)).collect()
    }

    /// Duplicate categories would make two columns fire for one value
    pub fn has_duplicates(&self) -> bool {
        self.index.len() != self.categories.len()
    }
}

#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    categories: Vec<String>,
}

impl Serialize for OneHotEncoder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EncoderRepr { categories: self.categories.clone() }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OneHotEncoder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = EncoderRepr::deserialize(deserializer)?;
        Ok(OneHotEncoder::new(repr.categories))
    }
}
