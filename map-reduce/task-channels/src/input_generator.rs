// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Random;
use std::fs;
use std::io;
use std::path::Path;

pub fn generate_word(random: &impl Random, max_length: usize) -> String {
    let length = 1 + random.usize(0..max_length.max(1));
    (0..length)
        .map(|_| (b'a' + random.usize(0..26) as u8) as char)
        .collect()
}

pub fn generate_vocabulary(random: &impl Random, size: usize, max_length: usize) -> Vec<String> {
    (0..size)
        .map(|_| generate_word(random, max_length))
        .collect()
}

/// Writes `files` input files of random words drawn from `vocabulary` and
/// returns their paths
pub fn generate_inputs(
    dir: &Path,
    files: usize,
    words_per_file: usize,
    vocabulary: &[String],
    random: &impl Random,
) -> io::Result<Vec<String>> {
    if vocabulary.is_empty() && words_per_file > 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot generate words from an empty vocabulary",
        ));
    }
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(files);
    for i in 0..files {
        let words: Vec<&str> = (0..words_per_file)
            .map(|_| vocabulary[random.usize(0..vocabulary.len())].as_str())
            .collect();
        let path = dir.join(format!("input-{}.txt", i));
        fs::write(&path, words.join(" "))?;
        paths.push(path.to_string_lossy().into_owned());
    }
    Ok(paths)
}
