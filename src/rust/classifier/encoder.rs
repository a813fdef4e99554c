use ndarray::Array2;

use super::metadata::Metadata;

/// Characters removed before splitting. Other punctuation (quotes, `?`, `:`)
/// stays attached to its word, matching how the vocabulary was built.
const STRIPPED_PUNCTUATION: [char; 5] = ['.', ',', '!', '_', ';'];

/// A fixed-length sequence of vocabulary indices, zero-padded at the end.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedInput {
    slots: Vec<u32>,
}

impl EncodedInput {
    pub fn as_slice(&self) -> &[u32] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a word, i.e. the length of the filled prefix.
    pub fn filled(&self) -> usize {
        self.slots.iter().rposition(|&slot| slot != 0).map_or(0, |pos| pos + 1)
    }

    /// Single-row batch of shape `(1, len)` as the model consumes it.
    ///
    /// Slots are bounded by the metadata's vocabulary size, which is at most
    /// [`MAX_VOCABULARY_SIZE`](crate::MAX_VOCABULARY_SIZE), so the
    /// conversion to `f32` (and back to `i64` for int64 models) is exact.
    pub fn to_batch(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, self.slots.len()), |(_, col)| self.slots[col] as f32)
    }
}

/// Splits text into tokens the way the vocabulary expects.
///
/// The text is trimmed, lowercased, stripped of `. , ! _ ;` and split on
/// single spaces. Empty input yields one empty token and runs of spaces yield
/// empty tokens in between; neither matches a vocabulary entry.
pub fn normalize(text: &str) -> Vec<String> {
    text.trim()
        .to_lowercase()
        .replace(&STRIPPED_PUNCTUATION[..], "")
        .split(' ')
        .map(str::to_owned)
        .collect()
}

/// Encodes text into the model's fixed-length input.
///
/// Only the last `max_len` tokens are considered. Tokens missing from the
/// vocabulary, or whose index exceeds `vocabulary_size`, are skipped without
/// taking a slot. Encoding never fails: anything unusable degrades to zeros.
pub fn encode(text: &str, metadata: &Metadata) -> EncodedInput {
    let tokens = normalize(text);
    let window = &tokens[tokens.len().saturating_sub(metadata.max_len)..];

    let mut slots = vec![0u32; metadata.max_len];
    let mut next = 0;
    for token in window {
        match metadata.index_of(token) {
            Some(index) if index <= metadata.vocabulary_size => {
                slots[next] = index;
                next += 1;
            }
            _ => {}
        }
    }

    EncodedInput { slots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn metadata(vocabulary_size: u32, max_len: usize, words: &[(&str, u32)]) -> Metadata {
        let word_index: HashMap<String, u32> = words.iter()
            .map(|(word, index)| (word.to_string(), *index))
            .collect();
        Metadata::new(vocabulary_size, max_len, word_index).unwrap()
    }

    #[test]
    fn test_normalize_strips_only_listed_punctuation() {
        assert_eq!(normalize("  Hello, World!  "), vec!["hello", "world"]);
        assert_eq!(normalize("_That_ is; it."), vec!["that", "is", "it"]);
        assert_eq!(normalize("what? “no”"), vec!["what?", "“no”"]);
    }

    #[test]
    fn test_normalize_empty_and_repeated_spaces() {
        assert_eq!(normalize(""), vec![""]);
        assert_eq!(normalize("   "), vec![""]);
        assert_eq!(normalize("a  b"), vec!["a", "", "b"]);
        // trimming happens before punctuation is removed
        assert_eq!(normalize("a ."), vec!["a", ""]);
    }

    #[test]
    fn test_good_breeding() {
        let meta = metadata(50, 10, &[("good", 3), ("breeding", 12)]);
        let encoded = encode("good breeding.", &meta);
        assert_eq!(encoded.as_slice(), &[3, 12, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encoded.filled(), 2);
    }

    #[test]
    fn test_unknown_and_out_of_range_words_take_no_slot() {
        let meta = metadata(10, 5, &[("a", 1), ("rare", 11), ("b", 2)]);
        let encoded = encode("a mystery rare b", &meta);
        assert_eq!(encoded.as_slice(), &[1, 2, 0, 0, 0]);
    }

    #[test]
    fn test_index_equal_to_vocabulary_size_is_kept() {
        let meta = metadata(7, 3, &[("edge", 7)]);
        assert_eq!(encode("edge", &meta).as_slice(), &[7, 0, 0]);
    }

    #[test]
    fn test_truncation_keeps_tail_before_filtering() {
        let meta = metadata(50, 3, &[("one", 1), ("two", 2), ("three", 3), ("four", 4)]);
        // window is [unknown, three, four]; "one" and "two" never appear
        let encoded = encode("one two unknown three four", &meta);
        assert_eq!(encoded.as_slice(), &[3, 4, 0]);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let meta = metadata(50, 4, &[("good", 3)]);
        let encoded = encode("", &meta);
        assert_eq!(encoded.as_slice(), &[0, 0, 0, 0]);
        assert_eq!(encoded.filled(), 0);
    }

    #[test]
    fn test_largest_index_round_trips_through_batch() {
        let top = crate::classifier::metadata::MAX_VOCABULARY_SIZE;
        let meta = metadata(top, 2, &[("rare", top), ("common", top - 1)]);
        let batch = encode("rare common", &meta).to_batch();
        assert_eq!(batch.mapv(|v| v as i64).row(0).to_vec(), vec![top as i64, top as i64 - 1]);
    }

    #[test]
    fn test_to_batch_shape() {
        let meta = metadata(50, 4, &[("good", 3)]);
        let batch = encode("good", &meta).to_batch();
        assert_eq!(batch.shape(), &[1, 4]);
        assert_eq!(batch[[0, 0]], 3.0);
        assert_eq!(batch[[0, 3]], 0.0);
    }
}
