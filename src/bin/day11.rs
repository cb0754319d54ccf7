use std::fmt::{self, Display, Formatter};

use ndarray::prelude::*;
use tracing::{event, Level};

const GRID_SIZE: usize = 300;

fn power_level(x: usize, y: usize, serial: i64) -> i64 {
    let rack_id = x as i64 + 10;
    let power = (rack_id * y as i64 + serial) * rack_id;
    (power / 100) % 10 - 5
}

#[test]
fn test_power_level() {
    assert_eq!(power_level(3, 5, 8), 4);
    assert_eq!(power_level(122, 79, 57), -5);
    assert_eq!(power_level(217, 196, 39), 0);
    assert_eq!(power_level(101, 153, 71), 4);
}

/// Summed-area table: `sums[(x, y)]` is the total power of every cell
/// with coordinates at most (x, y).  Row and column 0 are zero, which
/// keeps the 1-based puzzle coordinates.
struct PowerGrid {
    sums: Array2<i64>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct Square {
    x: usize,
    y: usize,
    size: usize,
    power: i64,
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl PowerGrid {
    fn new(serial: i64) -> PowerGrid {
        let mut sums: Array2<i64> = Array2::zeros((GRID_SIZE + 1, GRID_SIZE + 1));
        for x in 1..=GRID_SIZE {
            for y in 1..=GRID_SIZE {
                sums[(x, y)] = power_level(x, y, serial) + sums[(x - 1, y)] + sums[(x, y - 1)]
                    - sums[(x - 1, y - 1)];
            }
        }
        PowerGrid { sums }
    }

    /// Total power of the square whose top-left cell is (x, y).
    fn square_power(&self, x: usize, y: usize, size: usize) -> i64 {
        let (x0, y0) = (x - 1, y - 1);
        let (x1, y1) = (x0 + size, y0 + size);
        self.sums[(x1, y1)] - self.sums[(x0, y1)] - self.sums[(x1, y0)] + self.sums[(x0, y0)]
    }

    fn best_square_of_size(&self, size: usize) -> Square {
        let mut best = Square {
            x: 1,
            y: 1,
            size,
            power: i64::MIN,
        };
        for x in 1..=(GRID_SIZE + 1 - size) {
            for y in 1..=(GRID_SIZE + 1 - size) {
                let power = self.square_power(x, y, size);
                if power > best.power {
                    best = Square { x, y, size, power };
                }
            }
        }
        best
    }

    fn best_square(&self) -> Square {
        let mut best = self.best_square_of_size(1);
        for size in 2..=GRID_SIZE {
            let candidate = self.best_square_of_size(size);
            event!(
                Level::TRACE,
                "best {}x{} square is at {} with power {}",
                size,
                size,
                candidate,
                candidate.power
            );
            if candidate.power > best.power {
                best = candidate;
            }
        }
        best
    }
}

#[test]
fn test_square_power() {
    let grid = PowerGrid::new(18);
    assert_eq!(grid.square_power(33, 45, 3), 29);
    let grid = PowerGrid::new(42);
    assert_eq!(grid.square_power(21, 61, 3), 30);
    assert_eq!(grid.square_power(1, 1, 1), power_level(1, 1, 42));
}

#[test]
fn test_best_3x3() {
    let best = PowerGrid::new(18).best_square_of_size(3);
    assert_eq!(best.to_string(), "33,45");
    assert_eq!(best.power, 29);
    let best = PowerGrid::new(42).best_square_of_size(3);
    assert_eq!(best.to_string(), "21,61");
    assert_eq!(best.power, 30);
}

#[test]
fn test_best_square() {
    let best = PowerGrid::new(18).best_square();
    assert_eq!((best.x, best.y, best.size, best.power), (90, 269, 16, 113));
    let best = PowerGrid::new(42).best_square();
    assert_eq!((best.x, best.y, best.size, best.power), (232, 251, 12, 119));
}

/// Serial numbers are non-negative, so the hundreds digit in
/// `power_level` is never taken from a negative number.
fn parse_serial(input: &str) -> Result<i64, String> {
    input
        .trim()
        .parse::<u32>()
        .map(i64::from)
        .map_err(|e| format!("expected a grid serial number, got '{}': {}", input.trim(), e))
}

#[test]
fn test_parse_serial() {
    assert_eq!(parse_serial("18\n"), Ok(18));
    assert!(parse_serial("-5").is_err());
    assert!(parse_serial("eighteen").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let serial = parse_serial(&input)?;
    event!(Level::INFO, "grid serial number is {}", serial);

    let grid = PowerGrid::new(serial);
    println!("Day 11 part 1: {}", grid.best_square_of_size(3));
    let best = grid.best_square();
    println!("Day 11 part 2: {},{}", best, best.size);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
