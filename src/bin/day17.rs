use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;

use ndarray::prelude::*;
use regex::Regex;
use tracing::{event, Level};

const SPRING_X: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ground {
    Sand,
    Clay,
    Flowing,
    Still,
}

impl Ground {
    fn symbol(&self) -> char {
        match self {
            Ground::Sand => '.',
            Ground::Clay => '#',
            Ground::Flowing => '|',
            Ground::Still => '~',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Vein {
    x: RangeInclusive<usize>,
    y: RangeInclusive<usize>,
}

struct VeinParser {
    rx: Regex,
}

impl VeinParser {
    fn new() -> Result<VeinParser, String> {
        Regex::new(r"^([xy])=(\d+), ([xy])=(\d+)\.\.(\d+)$")
            .map(|rx| VeinParser { rx })
            .map_err(|e| e.to_string())
    }

    fn parse(&self, s: &str) -> Result<Vein, String> {
        let caps = match self.rx.captures(s.trim()) {
            Some(caps) => caps,
            None => {
                return Err(format!("not a clay vein: '{}'", s));
            }
        };
        let field = |n: usize| -> Result<usize, String> {
            caps[n]
                .parse::<usize>()
                .map_err(|e| format!("bad number '{}' in '{}': {}", &caps[n], s, e))
        };
        let fixed = field(2)?;
        let (from, to) = (field(4)?, field(5)?);
        if from > to {
            return Err(format!("vein '{}' has a backwards range", s));
        }
        match (&caps[1], &caps[3]) {
            ("x", "y") => Ok(Vein {
                x: fixed..=fixed,
                y: from..=to,
            }),
            ("y", "x") => Ok(Vein {
                x: from..=to,
                y: fixed..=fixed,
            }),
            _ => Err(format!("vein '{}' must give one x and one y", s)),
        }
    }
}

#[test]
fn test_parse_vein() {
    let parser = VeinParser::new().expect("valid regex");
    assert_eq!(
        parser.parse("x=495, y=2..7"),
        Ok(Vein {
            x: 495..=495,
            y: 2..=7
        })
    );
    assert_eq!(
        parser.parse("y=13, x=498..504"),
        Ok(Vein {
            x: 498..=504,
            y: 13..=13
        })
    );
    assert!(parser.parse("x=495, x=2..7").is_err());
    assert!(parser.parse("y=13, x=504..498").is_err());
    assert!(parser.parse("y=13, x=498").is_err());
}

enum Edge {
    Wall(usize),
    Drop(usize),
}

impl Edge {
    fn column(&self) -> usize {
        match self {
            Edge::Wall(col) | Edge::Drop(col) => *col,
        }
    }
}

/// A vertical slice of the ground.  Row 0 is y=0; column 0 is one to
/// the left of the leftmost clay, so water can always pour past the
/// outermost veins.
struct Scan {
    grid: Array2<Ground>,
    x_offset: usize,
    min_y: usize,
}

impl Scan {
    fn new(veins: &[Vein]) -> Result<Scan, String> {
        let min_x = veins.iter().map(|v| *v.x.start()).min();
        let max_x = veins.iter().map(|v| *v.x.end()).max();
        let min_y = veins.iter().map(|v| *v.y.start()).min();
        let max_y = veins.iter().map(|v| *v.y.end()).max();
        let (min_x, max_x, min_y, max_y) = match (min_x, max_x, min_y, max_y) {
            (Some(a), Some(b), Some(c), Some(d)) => (a.min(SPRING_X), b.max(SPRING_X), c, d),
            _ => {
                return Err("there is no clay in the scan".to_string());
            }
        };
        let x_offset = min_x.saturating_sub(1);
        let width = max_x + 2 - x_offset;
        let mut grid = Array2::from_elem((max_y + 1, width), Ground::Sand);
        for vein in veins {
            for y in vein.y.clone() {
                for x in vein.x.clone() {
                    grid[[y, x - x_offset]] = Ground::Clay;
                }
            }
        }
        Ok(Scan {
            grid,
            x_offset,
            min_y,
        })
    }

    fn bottom(&self) -> usize {
        self.grid.nrows() - 1
    }

    fn is_free(&self, row: usize, col: usize) -> bool {
        matches!(self.grid[[row, col]], Ground::Sand | Ground::Flowing)
    }

    /// Scan sideways along `row` from `col` until the water either
    /// meets clay or finds nothing beneath it.
    fn spread(&self, row: usize, col: usize, leftward: bool) -> Edge {
        let mut col = col;
        loop {
            if self.is_free(row + 1, col) {
                return Edge::Drop(col);
            }
            let next = if leftward {
                col.checked_sub(1)
            } else {
                Some(col + 1).filter(|c| *c < self.grid.ncols())
            };
            match next {
                Some(next) if self.grid[[row, next]] != Ground::Clay => {
                    col = next;
                }
                _ => {
                    return Edge::Wall(col);
                }
            }
        }
    }

    fn fill(&mut self, row: usize, left: usize, right: usize, ground: Ground) {
        self.grid
            .slice_mut(s![row, left..=right])
            .map_inplace(|cell| *cell = ground);
    }

    /// Let water fall from (`top`, `col`) and settle wherever it can.
    fn fall(&mut self, col: usize, top: usize) {
        let bottom = self.bottom();
        if top > bottom || !self.is_free(top, col) {
            return;
        }
        let mut row = top;
        loop {
            self.grid[[row, col]] = Ground::Flowing;
            if row == bottom {
                return;
            }
            match self.grid[[row + 1, col]] {
                Ground::Sand => {
                    row += 1;
                }
                Ground::Flowing => {
                    return;
                }
                Ground::Clay | Ground::Still => {
                    break;
                }
            }
        }

        loop {
            let left = self.spread(row, col, true);
            let right = self.spread(row, col, false);
            match (left, right) {
                (Edge::Wall(l), Edge::Wall(r)) => {
                    self.fill(row, l, r, Ground::Still);
                    if row == top {
                        return;
                    }
                    row -= 1;
                }
                (left, right) => {
                    self.fill(row, left.column(), right.column(), Ground::Flowing);
                    let drops: Vec<usize> = [left, right]
                        .iter()
                        .filter_map(|edge| match edge {
                            Edge::Drop(c) => Some(*c),
                            Edge::Wall(_) => None,
                        })
                        .collect();
                    for c in drops.iter() {
                        self.fall(*c, row + 1);
                    }
                    // A drop may have landed in a basin which then
                    // filled right up to this row.
                    if !drops
                        .iter()
                        .any(|c| self.grid[[row + 1, *c]] == Ground::Still)
                    {
                        return;
                    }
                }
            }
        }
    }

    fn pour(&mut self) {
        self.fall(SPRING_X - self.x_offset, 1);
    }

    fn count(&self, wanted: &[Ground]) -> usize {
        self.grid
            .slice(s![self.min_y.., ..])
            .iter()
            .filter(|cell| wanted.contains(*cell))
            .count()
    }

    fn wet_tiles(&self) -> usize {
        self.count(&[Ground::Flowing, Ground::Still])
    }

    fn retained_tiles(&self) -> usize {
        self.count(&[Ground::Still])
    }
}

impl Display for Scan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.grid.rows() {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn parse(input: &str) -> Result<Vec<Vein>, String> {
    let parser = VeinParser::new()?;
    aoc2018::nonblank_lines(input)
        .map(|line| parser.parse(line))
        .collect()
}

#[cfg(test)]
const EXAMPLE: &str = "x=495, y=2..7
y=7, x=495..501
x=501, y=3..7
x=498, y=2..4
x=506, y=1..2
x=498, y=10..13
x=504, y=10..13
y=13, x=498..504
";

#[test]
fn test_example() {
    let veins = parse(EXAMPLE).expect("valid example");
    let mut scan = Scan::new(&veins).expect("there is clay");
    scan.pour();
    assert_eq!(scan.wet_tiles(), 57);
    assert_eq!(scan.retained_tiles(), 29);
}

#[test]
fn test_overflowing_basin() {
    // Water fills the basin and spills over both rims.
    let veins = parse("x=498, y=2..4\nx=502, y=2..4\ny=4, x=499..501\n").expect("valid input");
    let mut scan = Scan::new(&veins).expect("there is clay");
    scan.pour();
    let picture = scan.to_string();
    let rows: Vec<&str> = picture.lines().collect();
    assert_eq!(rows[0], ".......");
    assert_eq!(rows[1], "|||||||");
    assert_eq!(rows[2], "|#~~~#|");
    assert_eq!(rows[3], "|#~~~#|");
    assert_eq!(rows[4], "|#####|");
    assert_eq!(scan.retained_tiles(), 6);
    // Row 1 lies above the highest clay, so it is not counted.
    assert_eq!(scan.wet_tiles(), 12);
}

#[test]
fn test_no_clay() {
    assert!(Scan::new(&[]).is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let veins = parse(&input)?;
    let mut scan = Scan::new(&veins)?;
    event!(
        Level::INFO,
        "{} veins of clay in a {}x{} scan",
        veins.len(),
        scan.grid.ncols(),
        scan.grid.nrows()
    );
    scan.pour();
    event!(Level::TRACE, "final state:\n{}", scan);

    println!("Day 17 part 1: {}", scan.wet_tiles());
    println!("Day 17 part 2: {}", scan.retained_tiles());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
