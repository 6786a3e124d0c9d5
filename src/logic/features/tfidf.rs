//! TF-IDF Vectorization cho Info column.
//!
//! Tokenize giống batch pipeline: lowercase, token = `\b\w\w+\b`.
//! Token ngoài vocabulary bị bỏ qua.

use std::collections::{BTreeMap, HashMap};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"));

/// Row normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub norm: Norm,
    #[serde(default)]
    pub sublinear_tf: bool,
}

fn default_lowercase() -> bool {
    true
}

impl TfidfVectorizer {
    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Vocabulary indices must be unique and cover `idf` exactly
    pub fn validate(&self) -> Result<(), String> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &index) in &self.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(format!("duplicate vocabulary index {} ('{}')", index, term)),
                None => return Err(format!("vocabulary index {} ('{}') out of range", index, term)),
            }
        }
        if let Some(bad) = self.idf.iter().position(|w| !w.is_finite()) {
            return Err(format!("idf weight {} is not finite", bad));
        }
        Ok(())
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        TOKEN_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Write the weighted, normalised term block into `out` (len == width)
    pub fn transform_into(&self, text: &str, out: &mut [f32]) {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for token in self.tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, count) in &counts {
            let tf = if self.sublinear_tf { 1.0 + count.ln() } else { *count };
            out[*index] = tf * self.idf[*index];
        }

        let norm = match self.norm {
            Norm::L2 => counts.keys().map(|&i| out[i] * out[i]).sum::<f32>().sqrt(),
            Norm::L1 => counts.keys().map(|&i| out[i].abs()).sum::<f32>(),
            Norm::None => 1.0,
        };
        if norm > 0.0 && norm != 1.0 {
            for &i in counts.keys() {
                out[i] /= norm;
            }
        }
    }

    /// Column names ordered by vocabulary index
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.idf.len()];
        for (term, &index) in &self.vocabulary {
            if let Some(slot) = names.get_mut(index) {
                *slot = format!("info:{}", term);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer() -> TfidfVectorizer {
        let vocabulary = [("syn".to_string(), 0), ("ack".to_string(), 1), ("len".to_string(), 2)]
            .into_iter()
            .collect();
        TfidfVectorizer {
            vocabulary,
            idf: vec![1.0, 2.0, 1.5],
            lowercase: true,
            norm: Norm::L2,
            sublinear_tf: false,
        }
    }

    #[test]
    fn test_tokenize_matches_batch_pattern() {
        let tokens = vectorizer().tokenize("[SYN, ACK] Seq=0 Len=0 a");
        assert_eq!(tokens, vec!["syn", "ack", "seq", "len"]);
    }

    #[test]
    fn test_l2_normalised_weights() {
        let v = vectorizer();
        let mut out = vec![0.0; 3];
        v.transform_into("SYN ACK", &mut out);
        let norm = (1.0f32 + 4.0).sqrt();
        assert!((out[0] - 1.0 / norm).abs() < 1e-6);
        assert!((out[1] - 2.0 / norm).abs() < 1e-6);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero() {
        let mut out = vec![0.0; 3];
        vectorizer().transform_into("who has 10.0.0.1? Tell 10.0.0.2", &mut out);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut v = vectorizer();
        v.vocabulary.insert("fin".into(), 7);
        v.idf.push(1.0);
        assert!(v.validate().is_err());
        assert!(vectorizer().validate().is_ok());
    }

    #[test]
    fn test_column_names_follow_index() {
        assert_eq!(vectorizer().column_names(), vec!["info:syn", "info:ack", "info:len"]);
    }
}
