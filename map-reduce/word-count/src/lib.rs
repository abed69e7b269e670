// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::KeyValue;

/// Emits `(word, "1")` for every maximal run of letters in `contents`
pub fn map_words(_input: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(|word| KeyValue::new(word, "1"))
        .collect()
}

/// Sums decimal counts. Unparseable values count as zero.
pub fn sum_counts(_key: &str, values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.parse::<u64>().unwrap_or(0))
        .sum::<u64>()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_splits_on_non_letters() {
        let records = map_words("in", "It's a dog-eat-dog world, 42 times");
        let words: Vec<&str> = records.iter().map(|kv| kv.key.as_str()).collect();

        assert_eq!(
            words,
            vec!["It", "s", "a", "dog", "eat", "dog", "world", "times"]
        );
        assert!(records.iter().all(|kv| kv.value == "1"));
    }

    #[test]
    fn test_sum_counts() {
        let values = vec!["1".to_string(), "2".to_string(), "40".to_string()];
        assert_eq!(sum_counts("k", &values), "43");
        assert_eq!(sum_counts("k", &[]), "0");
    }
}
