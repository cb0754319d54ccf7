use tracing::{event, Level};

struct Scoreboard {
    scores: Vec<u8>,
    elves: [usize; 2],
}

impl Scoreboard {
    fn new() -> Scoreboard {
        Scoreboard {
            scores: vec![3, 7],
            elves: [0, 1],
        }
    }

    /// Combine the elves' current recipes, returning how many new
    /// recipes were added (one or two).
    fn step(&mut self) -> usize {
        let sum = self.scores[self.elves[0]] + self.scores[self.elves[1]];
        let added = if sum >= 10 {
            self.scores.push(sum / 10);
            self.scores.push(sum % 10);
            2
        } else {
            self.scores.push(sum);
            1
        };
        let len = self.scores.len();
        for elf in self.elves.iter_mut() {
            *elf = (*elf + 1 + self.scores[*elf] as usize) % len;
        }
        added
    }
}

fn digits(scores: &[u8]) -> String {
    scores.iter().map(|d| char::from(b'0' + d)).collect()
}

/// The ten scores after the first `count` recipes.
fn next_ten(count: usize) -> String {
    let mut board = Scoreboard::new();
    while board.scores.len() < count + 10 {
        board.step();
    }
    digits(&board.scores[count..count + 10])
}

#[test]
fn test_next_ten() {
    assert_eq!(next_ten(5), "0124515891");
    assert_eq!(next_ten(9), "5158916779");
    assert_eq!(next_ten(18), "9251071085");
    assert_eq!(next_ten(2018), "5941429882");
}

/// How many recipes appear before `wanted` first shows up.
fn recipes_before(wanted: &[u8]) -> usize {
    let mut board = Scoreboard::new();
    let n = wanted.len();
    if n == 0 {
        return 0;
    }
    // The initial scoreboard may already hold the sequence.
    if let Some(pos) = board.scores.windows(n).position(|w| w == wanted) {
        return pos;
    }
    loop {
        let added = board.step();
        let len = board.scores.len();
        // A two-digit sum could complete the sequence one recipe
        // before the end.
        for back in (0..added).rev() {
            if len >= n + back && &board.scores[len - n - back..len - back] == wanted {
                return len - n - back;
            }
        }
    }
}

#[test]
fn test_recipes_before() {
    assert_eq!(recipes_before(&[5, 1, 5, 8, 9]), 9);
    assert_eq!(recipes_before(&[0, 1, 2, 4, 5]), 5);
    assert_eq!(recipes_before(&[9, 2, 5, 1, 0]), 18);
    assert_eq!(recipes_before(&[5, 9, 4, 1, 4]), 2018);
    assert_eq!(recipes_before(&[3, 7]), 0);
}

fn parse_digits(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("expected a number of recipes".to_string());
    }
    trimmed
        .chars()
        .map(|ch| match ch.to_digit(10) {
            Some(d) => Ok(d as u8),
            None => Err(format!("not a digit: '{}'", ch)),
        })
        .collect()
}

#[test]
fn test_parse_digits() {
    assert_eq!(parse_digits("01245\n"), Ok(vec![0, 1, 2, 4, 5]));
    assert!(parse_digits("12a").is_err());
    assert!(parse_digits("\n").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let wanted = parse_digits(&input)?;
    let count: usize = input
        .trim()
        .parse()
        .map_err(|e| format!("bad recipe count '{}': {}", input.trim(), e))?;
    event!(Level::INFO, "looking after {} recipes", count);

    println!("Day 14 part 1: {}", next_ten(count));
    println!("Day 14 part 2: {}", recipes_before(&wanted));
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
