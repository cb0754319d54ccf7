use tracing::{event, Level};

fn reacts(a: u8, b: u8) -> bool {
    a != b && a.eq_ignore_ascii_case(&b)
}

/// Fully react the polymer, returning the units which remain.
fn react<I>(units: I) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut stack: Vec<u8> = Vec::new();
    for unit in units {
        match stack.last() {
            Some(top) if reacts(*top, unit) => {
                stack.pop();
            }
            _ => {
                stack.push(unit);
            }
        }
    }
    stack
}

#[test]
fn test_react() {
    assert_eq!(react(b"aA".iter().copied()), b"");
    assert_eq!(react(b"abBA".iter().copied()), b"");
    assert_eq!(react(b"abAB".iter().copied()), b"abAB");
    assert_eq!(react(b"aabAAB".iter().copied()), b"aabAAB");
    assert_eq!(
        react(b"dabAcCaCBAcCcaDA".iter().copied()),
        b"dabCBAcaDA"
    );
}

fn parse_polymer(input: &str) -> Result<Vec<u8>, String> {
    let polymer = input.trim();
    match polymer.chars().find(|ch| !ch.is_ascii_alphabetic()) {
        Some(ch) => Err(format!("polymer contains a non-letter unit '{}'", ch)),
        None => Ok(polymer.as_bytes().to_vec()),
    }
}

/// The shortest polymer obtainable by removing every unit of a single
/// type before reacting.
fn shortest_improved(polymer: &[u8]) -> usize {
    // Removing a unit type commutes with reacting, so start from the
    // reacted polymer.
    let reacted = react(polymer.iter().copied());
    let mut shortest = reacted.len();
    for unit_type in b'a'..=b'z' {
        if !reacted.iter().any(|u| u.eq_ignore_ascii_case(&unit_type)) {
            continue;
        }
        let len = react(
            reacted
                .iter()
                .copied()
                .filter(|u| !u.eq_ignore_ascii_case(&unit_type)),
        )
        .len();
        event!(
            Level::DEBUG,
            "without {}/{} the polymer reacts down to {} units",
            unit_type as char,
            unit_type.to_ascii_uppercase() as char,
            len
        );
        shortest = shortest.min(len);
    }
    shortest
}

#[test]
fn test_shortest_improved() {
    assert_eq!(shortest_improved(b"dabAcCaCBAcCcaDA"), 4);
    assert_eq!(shortest_improved(b""), 0);
}

#[test]
fn test_parse_polymer() {
    assert_eq!(parse_polymer("aBc\n"), Ok(b"aBc".to_vec()));
    assert!(parse_polymer("ab1c").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let polymer = parse_polymer(&input)?;
    event!(Level::INFO, "polymer has {} units", polymer.len());

    println!("Day 05 part 1: {}", react(polymer.iter().copied()).len());
    println!("Day 05 part 2: {}", shortest_improved(&polymer));
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
