#![allow(dead_code)]
use std::fs::File;
use std::io::prelude::*;

use compcorpus::*;

const CARGO_MANIFEST_DIR: &'static str = env!("CARGO_MANIFEST_DIR");

/// Path of a file in the test data directory
pub fn datafile(name: &str) -> String {
    format!("{}/tests/data/{}", CARGO_MANIFEST_DIR, name)
}

/// Path of a scratch file for output, unique per test
pub fn tmpfile(name: &str) -> String {
    format!("{}/compcorpus-{}", std::env::temp_dir().display(), name)
}

pub fn read_lines(filename: &str) -> Vec<String> {
    let mut f = File::open(filename).expect("opening output file");
    let mut buffer = String::new();
    f.read_to_string(&mut buffer).expect("reading output file");
    buffer.lines().map(|line| line.to_string()).collect()
}

/// Converts the USAGE test tables and writes them as a corpus, returns the sentence and annotation file names
pub fn write_usage_corpus(prefix: &str, config: &Config) -> Result<(String, String), CorpusError> {
    let mut stats = Statistics::new();
    let inputs = [
        datafile("usage/reviews.tsv"),
        datafile("usage/phrases.tsv"),
        datafile("usage/relations.tsv"),
    ];
    let annotations = Format::Usage.adapter(config.clone()).convert_files(&inputs, &mut stats)?;
    let sentencefile = tmpfile(&format!("{}.sentences.txt", prefix));
    let annotationfile = tmpfile(&format!("{}.annotations.txt", prefix));
    let mut writer = CorpusWriter::create(&sentencefile, Some(annotationfile.as_str()), config)?;
    writer.write_all(&annotations, &mut stats)?;
    Ok((sentencefile, annotationfile))
}
