use std::fmt::{self, Display, Formatter};

use ndarray::prelude::*;
use regex::Regex;
use tracing::{event, Level};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct Claim {
    id: u32,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl Claim {
    fn right(&self) -> usize {
        self.left + self.width
    }

    fn bottom(&self) -> usize {
        self.top + self.height
    }

    fn area(&self) -> usize {
        self.width * self.height
    }
}

impl Display for Claim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} @ {},{}: {}x{}",
            self.id, self.left, self.top, self.width, self.height
        )
    }
}

struct ClaimParser {
    rx: Regex,
}

impl ClaimParser {
    fn new() -> Result<ClaimParser, String> {
        Regex::new(r"^#(\d+) @ (\d+),(\d+): (\d+)x(\d+)$")
            .map(|rx| ClaimParser { rx })
            .map_err(|e| e.to_string())
    }

    fn parse(&self, s: &str) -> Result<Claim, String> {
        let caps = match self.rx.captures(s.trim()) {
            Some(caps) => caps,
            None => {
                return Err(format!("not a claim: '{}'", s));
            }
        };
        let field = |n: usize| -> Result<usize, String> {
            caps[n]
                .parse::<usize>()
                .map_err(|e| format!("bad number '{}' in '{}': {}", &caps[n], s, e))
        };
        let id = caps[1]
            .parse::<u32>()
            .map_err(|e| format!("bad claim ID in '{}': {}", s, e))?;
        Ok(Claim {
            id,
            left: field(2)?,
            top: field(3)?,
            width: field(4)?,
            height: field(5)?,
        })
    }
}

#[test]
fn test_parse_claim() {
    let parser = ClaimParser::new().expect("valid regex");
    assert_eq!(
        parser.parse("#123 @ 3,2: 5x4"),
        Ok(Claim {
            id: 123,
            left: 3,
            top: 2,
            width: 5,
            height: 4
        })
    );
    assert!(parser.parse("#123 @ 3,2: 5by4").is_err());
}

fn parse_claims(input: &str) -> Result<Vec<Claim>, String> {
    let parser = ClaimParser::new()?;
    aoc2018::nonblank_lines(input)
        .map(|line| parser.parse(line))
        .collect()
}

/// Count how many claims cover each square inch.
fn lay_out(claims: &[Claim]) -> Array2<u32> {
    let width = claims.iter().map(Claim::right).max().unwrap_or(0);
    let height = claims.iter().map(Claim::bottom).max().unwrap_or(0);
    let mut fabric: Array2<u32> = Array2::zeros((width, height));
    for claim in claims {
        fabric
            .slice_mut(s![claim.left..claim.right(), claim.top..claim.bottom()])
            .map_inplace(|n| *n += 1);
    }
    fabric
}

fn count_overlaps(fabric: &Array2<u32>) -> usize {
    fabric.iter().filter(|n| **n > 1).count()
}

fn intact_claims<'a>(claims: &'a [Claim], fabric: &Array2<u32>) -> Vec<&'a Claim> {
    claims
        .iter()
        .filter(|claim| {
            let patch = fabric.slice(s![claim.left..claim.right(), claim.top..claim.bottom()]);
            patch.iter().filter(|n| **n == 1).count() == claim.area()
        })
        .collect()
}

fn the_intact_claim(claims: &[Claim], fabric: &Array2<u32>) -> Result<u32, String> {
    let intact = intact_claims(claims, fabric);
    match intact.as_slice() {
        [only] => Ok(only.id),
        [] => Err("every claim overlaps some other claim".to_string()),
        several => Err(format!(
            "expected one non-overlapping claim, found {}: {}",
            several.len(),
            several
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

#[test]
fn test_example() {
    let claims = parse_claims("#1 @ 1,3: 4x4\n#2 @ 3,1: 4x4\n#3 @ 5,5: 2x2\n")
        .expect("valid claims");
    let fabric = lay_out(&claims);
    assert_eq!(count_overlaps(&fabric), 4);
    assert_eq!(the_intact_claim(&claims, &fabric), Ok(3));
}

#[test]
fn test_no_intact_claim() {
    let claims = parse_claims("#1 @ 0,0: 2x2\n#2 @ 1,1: 2x2\n").expect("valid claims");
    let fabric = lay_out(&claims);
    assert_eq!(count_overlaps(&fabric), 1);
    assert!(the_intact_claim(&claims, &fabric).is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let claims = parse_claims(&input)?;
    let fabric = lay_out(&claims);
    event!(
        Level::INFO,
        "{} claims on a {}x{} piece of fabric",
        claims.len(),
        fabric.nrows(),
        fabric.ncols()
    );

    println!("Day 03 part 1: {}", count_overlaps(&fabric));
    println!("Day 03 part 2: {}", the_intact_claim(&claims, &fabric)?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
