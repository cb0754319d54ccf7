use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;

use ndarray::prelude::*;
use tracing::{event, Level};

const SAFE_DISTANCE: i64 = 10000;

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    fn manhattan(&self, other: &Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

fn str_to_i64(s: &str) -> Result<i64, String> {
    s.trim().parse().map_err(|e: ParseIntError| e.to_string())
}

impl TryFrom<&str> for Point {
    type Error = String;
    fn try_from(s: &str) -> Result<Point, String> {
        let parts = s.split(',').collect::<Vec<_>>();
        match parts.as_slice() {
            [x, y] => Ok(Point {
                x: str_to_i64(x)?,
                y: str_to_i64(y)?,
            }),
            _ => Err(format!("expected x, y: '{}'", s)),
        }
    }
}

/// The rectangle of grid cells under consideration.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    top_left: Point,
    bot_right: Point,
}

impl Bounds {
    fn enclosing(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let mut bounds = Bounds {
            top_left: *first,
            bot_right: *first,
        };
        for p in points {
            bounds.top_left.x = bounds.top_left.x.min(p.x);
            bounds.top_left.y = bounds.top_left.y.min(p.y);
            bounds.bot_right.x = bounds.bot_right.x.max(p.x);
            bounds.bot_right.y = bounds.bot_right.y.max(p.y);
        }
        Some(bounds)
    }

    fn widened(&self, margin: i64) -> Bounds {
        Bounds {
            top_left: Point {
                x: self.top_left.x - margin,
                y: self.top_left.y - margin,
            },
            bot_right: Point {
                x: self.bot_right.x + margin,
                y: self.bot_right.y + margin,
            },
        }
    }

    fn width(&self) -> usize {
        (self.bot_right.x - self.top_left.x + 1) as usize
    }

    fn height(&self) -> usize {
        (self.bot_right.y - self.top_left.y + 1) as usize
    }

    fn point_at(&self, (col, row): (usize, usize)) -> Point {
        Point {
            x: self.top_left.x + col as i64,
            y: self.top_left.y + row as i64,
        }
    }
}

/// Index of the coordinate uniquely closest to `p`, if any.
fn nearest(p: &Point, coords: &[Point]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    let mut tied = false;
    for (i, c) in coords.iter().enumerate() {
        let d = p.manhattan(c);
        match best {
            Some((_, closest)) if d > closest => (),
            Some((_, closest)) if d == closest => {
                tied = true;
            }
            _ => {
                best = Some((i, d));
                tied = false;
            }
        }
    }
    if tied {
        None
    } else {
        best.map(|(i, _)| i)
    }
}

fn largest_finite_area(coords: &[Point]) -> Option<usize> {
    let bounds = Bounds::enclosing(coords)?;
    let owners: Array2<Option<usize>> = Array::from_shape_fn(
        (bounds.width(), bounds.height()),
        |cell| nearest(&bounds.point_at(cell), coords),
    );

    // Any region reaching the edge of the bounding box carries on
    // forever.
    let mut infinite: HashSet<usize> = HashSet::new();
    let (w, h) = owners.dim();
    for ((col, row), owner) in owners.indexed_iter() {
        if col == 0 || row == 0 || col + 1 == w || row + 1 == h {
            if let Some(i) = owner {
                infinite.insert(*i);
            }
        }
    }

    let mut areas: Vec<usize> = vec![0; coords.len()];
    for i in owners.iter().flatten() {
        areas[*i] += 1;
    }
    event!(
        Level::DEBUG,
        "{} of {} regions are infinite",
        infinite.len(),
        coords.len()
    );
    areas
        .iter()
        .enumerate()
        .filter(|(i, _)| !infinite.contains(i))
        .map(|(_, area)| *area)
        .max()
}

fn safe_region_size(coords: &[Point], threshold: i64) -> usize {
    let bounds = match Bounds::enclosing(coords) {
        Some(b) => b,
        None => {
            return 0;
        }
    };
    // A cell d steps outside the bounding box is at least d from every
    // coordinate, so nothing beyond threshold/n can qualify.
    let bounds = bounds.widened(threshold / coords.len() as i64);
    let mut count = 0;
    for col in 0..bounds.width() {
        for row in 0..bounds.height() {
            let p = bounds.point_at((col, row));
            let total: i64 = coords.iter().map(|c| p.manhattan(c)).sum();
            if total < threshold {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
fn example() -> Vec<Point> {
    ["1, 1", "1, 6", "8, 3", "3, 4", "5, 5", "8, 9"]
        .iter()
        .map(|s| Point::try_from(*s).expect("valid point"))
        .collect()
}

#[test]
fn test_nearest() {
    let coords = example();
    assert_eq!(nearest(&Point { x: 0, y: 0 }, &coords), Some(0));
    // (0,4) is 3 from both (3,4) and (1,6).
    assert_eq!(nearest(&Point { x: 0, y: 4 }, &coords), None);
    assert_eq!(nearest(&Point { x: 5, y: 2 }, &coords), Some(4));
}

#[test]
fn test_largest_finite_area() {
    assert_eq!(largest_finite_area(&example()), Some(17));
}

#[test]
fn test_safe_region_size() {
    assert_eq!(safe_region_size(&example(), 32), 16);
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let coords: Vec<Point> = aoc2018::nonblank_lines(&input)
        .map(|line| Point::try_from(line))
        .collect::<Result<Vec<Point>, String>>()?;
    event!(Level::INFO, "{} coordinates", coords.len());

    match largest_finite_area(&coords) {
        Some(area) => {
            println!("Day 06 part 1: {}", area);
        }
        None => {
            return Err("every region is infinite".to_string());
        }
    }
    println!(
        "Day 06 part 2: {}",
        safe_region_size(&coords, SAFE_DISTANCE)
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
