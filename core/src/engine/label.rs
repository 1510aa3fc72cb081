//! Category label encoding

use std::collections::HashMap;

/// Maps category names to dense keys in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    labels: Vec<String>,
    keys: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder from every category in `categories`
    pub fn fit<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut encoder = Self::default();
        for category in categories {
            if !encoder.keys.contains_key(category) {
                encoder.keys.insert(category.to_string(), encoder.labels.len());
                encoder.labels.push(category.to_string());
            }
        }
        encoder
    }

    pub fn encode(&self, category: &str) -> Option<usize> {
        self.keys.get(category).copied()
    }

    pub fn decode(&self, key: usize) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_first_appearance() {
        let encoder = LabelEncoder::fit(["B", "A", "B", "C", "A"]);

        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.encode("B"), Some(0));
        assert_eq!(encoder.encode("A"), Some(1));
        assert_eq!(encoder.encode("C"), Some(2));
        assert_eq!(encoder.decode(2), Some("C"));
    }

    #[test]
    fn test_unknown_values() {
        let encoder = LabelEncoder::fit(["A"]);

        assert_eq!(encoder.encode("Z"), None);
        assert_eq!(encoder.decode(5), None);
        assert!(LabelEncoder::fit(Vec::<&str>::new()).is_empty());
    }
}
