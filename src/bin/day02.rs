use std::collections::HashMap;

use tracing::{event, Level};

fn letter_counts(id: &str) -> HashMap<char, usize> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for ch in id.chars() {
        *counts.entry(ch).or_insert(0) += 1;
    }
    counts
}

fn checksum(ids: &[&str]) -> usize {
    let mut twos: usize = 0;
    let mut threes: usize = 0;
    for id in ids {
        let counts = letter_counts(id);
        // Each ID counts at most once towards each total.
        if counts.values().any(|n| *n == 2) {
            twos += 1;
        }
        if counts.values().any(|n| *n == 3) {
            threes += 1;
        }
    }
    event!(Level::DEBUG, "{} IDs have a pair, {} have a triple", twos, threes);
    twos * threes
}

#[test]
fn test_checksum() {
    let ids = [
        "abcdef", "bababc", "abbcde", "abcccd", "aabcdd", "abcdee", "ababab",
    ];
    assert_eq!(checksum(&ids), 12);
}

/// If `a` and `b` differ in exactly one position, return the letters
/// they have in common.
fn common_letters(a: &str, b: &str) -> Option<String> {
    if a.len() != b.len() {
        return None;
    }
    let mut differences = 0;
    let mut common = String::with_capacity(a.len());
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            common.push(x);
        } else {
            differences += 1;
            if differences > 1 {
                return None;
            }
        }
    }
    if differences == 1 {
        Some(common)
    } else {
        None
    }
}

fn find_prototype_boxes(ids: &[&str]) -> Option<String> {
    for (i, first) in ids.iter().enumerate() {
        for second in ids[i + 1..].iter() {
            if let Some(common) = common_letters(first, second) {
                event!(Level::DEBUG, "boxes {} and {} are the prototype boxes", first, second);
                return Some(common);
            }
        }
    }
    None
}

#[test]
fn test_find_prototype_boxes() {
    let ids = [
        "abcde", "fghij", "klmno", "pqrst", "fguij", "axcye", "wvxyz",
    ];
    assert_eq!(find_prototype_boxes(&ids), Some("fgij".to_string()));
    assert_eq!(find_prototype_boxes(&["abc", "abc", "xyz"]), None);
}

#[test]
fn test_common_letters_needs_equal_lengths() {
    assert_eq!(common_letters("abcd", "abc"), None);
    assert_eq!(common_letters("abcd", "abcx"), Some("abc".to_string()));
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let ids: Vec<&str> = input.split_whitespace().collect();
    event!(Level::INFO, "read {} box IDs", ids.len());

    println!("Day 02 part 1: {}", checksum(&ids));
    match find_prototype_boxes(&ids) {
        Some(common) => {
            println!("Day 02 part 2: {}", common);
            Ok(())
        }
        None => Err("no two box IDs differ by exactly one letter".to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
