use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

const SHORT_RUN: u64 = 20;
const LONG_RUN: u64 = 50_000_000_000;
const SETTLING_LIMIT: u64 = 100_000;

/// Indexed by the five-pot neighbourhood read as a binary number, most
/// significant bit leftmost.
type Rules = [bool; 32];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pots {
    planted: BTreeSet<i64>,
}

fn pot_has_plant(ch: char) -> Result<bool, String> {
    match ch {
        '#' => Ok(true),
        '.' => Ok(false),
        _ => Err(format!("unexpected pot state '{}'", ch)),
    }
}

fn pattern_index(pattern: &str) -> Result<usize, String> {
    if pattern.chars().count() != 5 {
        return Err(format!("expected a five-pot pattern, got '{}'", pattern));
    }
    pattern.chars().try_fold(0, |acc, ch| {
        pot_has_plant(ch).map(|plant| (acc << 1) | usize::from(plant))
    })
}

fn parse(input: &str) -> Result<(Pots, Rules), String> {
    let mut lines = aoc2018::nonblank_lines(input);
    let first = lines.next().ok_or_else(|| "empty input".to_string())?;
    let initial = first
        .trim()
        .strip_prefix("initial state: ")
        .ok_or_else(|| format!("expected the initial state, got '{}'", first))?;
    let mut planted = BTreeSet::new();
    for (i, ch) in initial.chars().enumerate() {
        if pot_has_plant(ch)? {
            planted.insert(i as i64);
        }
    }

    let mut rules: Rules = [false; 32];
    for line in lines {
        match line.trim().split_once(" => ") {
            Some((pattern, result)) => {
                let result = match result.chars().collect::<Vec<_>>().as_slice() {
                    [ch] => pot_has_plant(*ch)?,
                    _ => {
                        return Err(format!("bad rule result in '{}'", line));
                    }
                };
                rules[pattern_index(pattern)?] = result;
            }
            None => {
                return Err(format!("not a rule: '{}'", line));
            }
        }
    }
    if rules[0] {
        return Err("a rule plants every empty pot, so the row would be infinite".to_string());
    }
    Ok((Pots { planted }, rules))
}

impl Pots {
    fn next_generation(&self, rules: &Rules) -> Pots {
        let (first, last) = match (self.planted.first(), self.planted.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => {
                return self.clone();
            }
        };
        let mut planted = BTreeSet::new();
        for pot in (first - 2)..=(last + 2) {
            let neighbourhood = ((pot - 2)..=(pot + 2)).fold(0, |acc, p| {
                (acc << 1) | usize::from(self.planted.contains(&p))
            });
            if rules[neighbourhood] {
                planted.insert(pot);
            }
        }
        Pots { planted }
    }

    fn index_sum(&self) -> i64 {
        self.planted.iter().sum()
    }

    /// The arrangement of plants relative to the leftmost one, and
    /// where that leftmost plant is.
    fn shape(&self) -> (Vec<i64>, i64) {
        let origin = self.planted.first().copied().unwrap_or(0);
        (self.planted.iter().map(|p| p - origin).collect(), origin)
    }
}

impl Display for Pots {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let (Some(first), Some(last)) = (self.planted.first(), self.planted.last()) {
            for pot in *first..=*last {
                f.write_str(if self.planted.contains(&pot) { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

fn simulate(pots: &Pots, rules: &Rules, generations: u64) -> Pots {
    let mut current = pots.clone();
    for generation in 1..=generations {
        current = current.next_generation(rules);
        event!(Level::TRACE, "{:>3}: {}", generation, current);
    }
    current
}

/// Sum of planted pot indices after `generations` generations.  Once
/// the pattern only slides along the row, each further generation
/// adds the same amount, so we extrapolate from there.  We give up if
/// that has not happened within `settling_limit` generations.
fn index_sum_after(
    pots: &Pots,
    rules: &Rules,
    generations: u64,
    settling_limit: u64,
) -> Result<i64, String> {
    let mut current = pots.clone();
    let (mut shape, mut origin) = current.shape();
    for generation in 1..=generations.min(settling_limit) {
        let next = current.next_generation(rules);
        let (next_shape, next_origin) = next.shape();
        if next_shape == shape {
            let shift = next_origin - origin;
            let remaining = (generations - generation) as i64;
            event!(
                Level::DEBUG,
                "pattern settled at generation {}, moving {} per generation",
                generation,
                shift
            );
            return Ok(next.index_sum() + remaining * shift * next.planted.len() as i64);
        }
        current = next;
        shape = next_shape;
        origin = next_origin;
    }
    if generations <= settling_limit {
        Ok(current.index_sum())
    } else {
        Err(format!(
            "the pattern had not settled after {} generations",
            settling_limit
        ))
    }
}

#[cfg(test)]
const EXAMPLE: &str = "initial state: #..#.#..##......###...###

...## => #
..#.. => #
.#... => #
.#.#. => #
.#.## => #
.##.. => #
.#### => #
#.#.# => #
#.### => #
##.#. => #
##.## => #
###.. => #
###.# => #
####. => #
";

#[test]
fn test_example() {
    let (pots, rules) = parse(EXAMPLE).expect("valid example");
    let after = simulate(&pots, &rules, 1);
    assert_eq!(after.to_string(), "#...#....#.....#..#..#..#");
    let after = simulate(&pots, &rules, 20);
    assert_eq!(after.to_string(), "#....##....#####...#######....#.#..##");
    assert_eq!(after.index_sum(), 325);
    assert_eq!(index_sum_after(&pots, &rules, 20, SETTLING_LIMIT), Ok(325));
}

#[test]
fn test_extrapolation() {
    let (pots, rules) = parse(EXAMPLE).expect("valid example");
    assert_eq!(
        index_sum_after(&pots, &rules, 200, SETTLING_LIMIT),
        Ok(simulate(&pots, &rules, 200).index_sum())
    );
    assert_eq!(
        index_sum_after(&pots, &rules, LONG_RUN, SETTLING_LIMIT),
        Ok(999_999_999_374)
    );
}

#[test]
fn test_pattern_never_settles() {
    // A pot is planted when exactly one of its immediate neighbours
    // was, so a single plant grows into an ever wider triangle.
    let mut input = String::from("initial state: #\n\n");
    for index in 0..32 {
        let left = (index >> 3) & 1;
        let right = (index >> 1) & 1;
        if left != right {
            let pattern: String = (0..5)
                .map(|bit| if index & (16 >> bit) != 0 { '#' } else { '.' })
                .collect();
            input.push_str(&format!("{} => #\n", pattern));
        }
    }
    let (pots, rules) = parse(&input).expect("valid rules");
    assert_eq!(simulate(&pots, &rules, 1).to_string(), "#.#");
    assert_eq!(simulate(&pots, &rules, 2).to_string(), "#...#");
    assert!(index_sum_after(&pots, &rules, LONG_RUN, 50).is_err());
    // Within the limit we simply simulate.
    assert_eq!(index_sum_after(&pots, &rules, 2, 50), Ok(0));
}

#[test]
fn test_bad_rules() {
    assert!(parse("initial state: #.#\n\n..... => #\n").is_err());
    assert!(parse("initial state: #.#\n\n.... => #\n").is_err());
    assert!(parse("initial state: #x#\n").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let (pots, rules) = parse(&input)?;
    event!(
        Level::INFO,
        "{} pots planted initially, {} rules produce a plant",
        pots.planted.len(),
        rules.iter().filter(|r| **r).count()
    );

    println!(
        "Day 12 part 1: {}",
        index_sum_after(&pots, &rules, SHORT_RUN, SETTLING_LIMIT)?
    );
    println!(
        "Day 12 part 2: {}",
        index_sum_after(&pots, &rules, LONG_RUN, SETTLING_LIMIT)?
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
