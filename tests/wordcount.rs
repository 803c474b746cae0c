use anyhow::Result;
use ironreduce::io::{read_lines, read_lines_from, render_frequencies, sorted_entries};
use ironreduce::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn tokenizer_lowercases_and_splits_on_non_letters() {
    let m = WordCountMapper::new();
    assert_eq!(
        m.tokenize("The Fox's den, 2nd-floor!"),
        vec!["the", "fox", "s", "den", "nd", "floor"]
    );
    assert!(m.tokenize("").is_empty());
    assert!(m.tokenize("  42 \t 7 ").is_empty());
    assert_eq!(m.tokenize("ÜBER alles"), vec!["ber", "alles"]);
}

#[test]
fn mapper_emits_one_per_word() {
    let kvs = WordCountMapper::new().map(&"a b a");
    assert_eq!(kvs.len(), 3);
    assert!(kvs.iter().all(|kv| kv.value == 1));
}

#[test]
fn loader_skips_blank_lines() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "Begin the morning")?;
    writeln!(file)?;
    writeln!(file, "the end")?;
    writeln!(file)?;

    let lines = read_lines(file.path())?;
    assert_eq!(lines, vec!["Begin the morning", "the end"]);

    let counts = word_count(&lines)?;
    assert_eq!(counts.get(&"the".to_string()), Some(&2));
    Ok(())
}

#[test]
fn loader_reports_missing_file() {
    let err = read_lines("/no/such/input.txt").unwrap_err();
    assert!(err.to_string().contains("could not open"));
}

#[test]
fn loader_handles_crlf() -> Result<()> {
    let lines = read_lines_from("one\r\n\r\ntwo\r\n".as_bytes())?;
    assert_eq!(lines, vec!["one", "two"]);
    Ok(())
}

#[test]
fn presentation_sorts_by_key() -> Result<()> {
    let counts = word_count(&["b a c", "a"])?;
    let entries: Vec<(String, u64)> = sorted_entries(&counts)
        .into_iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    assert_eq!(
        entries,
        vec![("a".to_string(), 2), ("b".to_string(), 1), ("c".to_string(), 1)]
    );

    assert_eq!(
        render_frequencies(&counts),
        "Word frequencies:\na: 2\nb: 1\nc: 1\n\nTotal unique words: 3\n"
    );
    assert_eq!(counts.into_sorted_vec()[0], ("a".to_string(), 2));
    Ok(())
}
