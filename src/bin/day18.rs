use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use ndarray::prelude::*;
use tracing::{event, Level};

const SHORT_RUN: usize = 10;
const LONG_RUN: usize = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Acre {
    Open,
    Trees,
    Lumberyard,
}

impl TryFrom<char> for Acre {
    type Error = String;
    fn try_from(ch: char) -> Result<Acre, String> {
        match ch {
            '.' => Ok(Acre::Open),
            '|' => Ok(Acre::Trees),
            '#' => Ok(Acre::Lumberyard),
            _ => Err(format!("unexpected acre '{}'", ch)),
        }
    }
}

impl Acre {
    fn symbol(&self) -> char {
        match self {
            Acre::Open => '.',
            Acre::Trees => '|',
            Acre::Lumberyard => '#',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Area {
    acres: Array2<Acre>,
}

#[derive(Debug, Default)]
struct Census {
    trees: usize,
    lumberyards: usize,
}

impl TryFrom<&str> for Area {
    type Error = String;
    fn try_from(s: &str) -> Result<Area, String> {
        let mut rows: Vec<Vec<Acre>> = Vec::new();
        for line in aoc2018::nonblank_lines(s) {
            let row = line
                .trim()
                .chars()
                .map(Acre::try_from)
                .collect::<Result<Vec<Acre>, String>>()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(format!(
                        "row {} has {} acres but the first has {}",
                        rows.len(),
                        row.len(),
                        first.len()
                    ));
                }
            }
            rows.push(row);
        }
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if width == 0 {
            return Err("the area is empty".to_string());
        }
        let height = rows.len();
        let acres = Array2::from_shape_vec((height, width), rows.into_iter().flatten().collect())
            .map_err(|e| e.to_string())?;
        Ok(Area { acres })
    }
}

impl Area {
    /// Count what grows in the (up to) eight acres around (`r`, `c`).
    fn census(&self, r: usize, c: usize) -> Census {
        let (height, width) = self.acres.dim();
        let rows = r.saturating_sub(1)..(r + 2).min(height);
        let cols = c.saturating_sub(1)..(c + 2).min(width);
        let mut result = Census::default();
        for (pos, acre) in self.acres.slice(s![rows.clone(), cols.clone()]).indexed_iter() {
            if (pos.0 + rows.start, pos.1 + cols.start) == (r, c) {
                continue;
            }
            match acre {
                Acre::Trees => result.trees += 1,
                Acre::Lumberyard => result.lumberyards += 1,
                Acre::Open => (),
            }
        }
        result
    }

    fn step(&self) -> Area {
        let acres = Array2::from_shape_fn(self.acres.dim(), |(r, c)| {
            let around = self.census(r, c);
            match self.acres[[r, c]] {
                Acre::Open if around.trees >= 3 => Acre::Trees,
                Acre::Trees if around.lumberyards >= 3 => Acre::Lumberyard,
                Acre::Lumberyard if around.lumberyards == 0 || around.trees == 0 => Acre::Open,
                unchanged => unchanged,
            }
        });
        Area { acres }
    }

    fn resource_value(&self) -> usize {
        let count = |kind: Acre| self.acres.iter().filter(|acre| **acre == kind).count();
        count(Acre::Trees) * count(Acre::Lumberyard)
    }
}

impl Display for Area {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.acres.rows() {
            let line: String = row.iter().map(|acre| acre.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cycle {
    start: usize,
    length: usize,
}

/// Successive states of the area, stopping after `minutes` minutes or
/// as soon as a state repeats, whichever comes first.
struct History {
    states: Vec<Area>,
    cycle: Option<Cycle>,
}

fn explore(area: &Area, minutes: usize) -> History {
    let mut seen: HashMap<Area, usize> = HashMap::new();
    let mut states: Vec<Area> = Vec::new();
    let mut current = area.clone();
    for minute in 0..minutes {
        if let Some(start) = seen.get(&current) {
            let cycle = Cycle {
                start: *start,
                length: minute - start,
            };
            event!(
                Level::DEBUG,
                "minute {} repeats minute {} (cycle length {})",
                minute,
                cycle.start,
                cycle.length
            );
            return History {
                states,
                cycle: Some(cycle),
            };
        }
        seen.insert(current.clone(), minute);
        states.push(current.clone());
        current = current.step();
    }
    states.push(current);
    History {
        states,
        cycle: None,
    }
}

/// The area after `minutes` minutes.  The landscape eventually
/// repeats itself, so once we see a state for the second time we can
/// skip ahead by whole cycles.
fn after(area: &Area, minutes: usize) -> Area {
    let mut history = explore(area, minutes);
    let index = match history.cycle {
        Some(Cycle { start, length }) => start + (minutes - start) % length,
        None => history.states.len() - 1,
    };
    history.states.swap_remove(index)
}

#[cfg(test)]
const EXAMPLE: &str = "\
.#.#...|#.
.....#|##|
.|..|...#.
..|#.....#
#.#|||#|#|
...#.||...
.|....|...
||...#|.#|
|.||||..|.
...#.|..|.
";

#[test]
fn test_parse() {
    let area = Area::try_from(EXAMPLE).expect("valid example");
    assert_eq!(area.acres.dim(), (10, 10));
    assert_eq!(area.to_string(), EXAMPLE);
    assert!(Area::try_from(".#\n.\n").is_err());
    assert!(Area::try_from(".x\n").is_err());
    assert!(Area::try_from("\n").is_err());
}

#[test]
fn test_census() {
    let area = Area::try_from(EXAMPLE).expect("valid example");
    let corner = area.census(0, 0);
    assert_eq!((corner.trees, corner.lumberyards), (0, 1));
    let middle = area.census(4, 4);
    assert_eq!((middle.trees, middle.lumberyards), (3, 2));
}

#[test]
fn test_example() {
    let area = Area::try_from(EXAMPLE).expect("valid example");
    let first = area.step();
    assert_eq!(
        first.to_string(),
        concat!(
            ".......##.\n",
            "......|###\n",
            ".|..|...#.\n",
            "..|#||...#\n",
            "..##||.|#|\n",
            "...#||||..\n",
            "||...|||..\n",
            "|||||.||.|\n",
            "||||||||||\n",
            "....||..|.\n",
        )
    );
    let ten = after(&area, SHORT_RUN);
    assert_eq!(ten.resource_value(), 1147);
}

#[test]
fn test_example_settles() {
    let area = Area::try_from(EXAMPLE).expect("valid example");
    let history = explore(&area, 100);
    assert_eq!(history.cycle, Some(Cycle { start: 18, length: 1 }));
    assert_eq!(after(&area, 1000).resource_value(), 0);
}

#[test]
fn test_cycle_skipping() {
    let area = Area::try_from(
        "||||....\n...#|..#\n#....#.|\n||...|||\n#...|#..\n....|##.\n.###.|.|\n#......#\n",
    )
    .expect("valid area");
    let history = explore(&area, 1000);
    assert_eq!(history.cycle, Some(Cycle { start: 22, length: 28 }));

    let mut slow = area.clone();
    for minute in 1..=1000 {
        slow = slow.step();
        if minute == 35 || minute == 1000 {
            assert_eq!(after(&area, minute), slow);
        }
    }
    // Fewer minutes than it takes to reach the cycle.
    assert_eq!(explore(&area, 10).cycle, None);
    assert_eq!(after(&area, 0), area);
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let area = Area::try_from(input.as_str())?;
    event!(Level::INFO, "lumber collection area is {:?}", area.acres.dim());

    println!("Day 18 part 1: {}", after(&area, SHORT_RUN).resource_value());
    println!("Day 18 part 2: {}", after(&area, LONG_RUN).resource_value());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
