use std::collections::HashSet;

use regex::Regex;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Light {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
}

impl Light {
    fn at(&self, t: i64) -> (i64, i64) {
        (self.x + self.dx * t, self.y + self.dy * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundingBox {
    xmin: i64,
    xmax: i64,
    ymin: i64,
    ymax: i64,
}

impl BoundingBox {
    fn area(&self) -> i64 {
        (self.xmax - self.xmin + 1) * (self.ymax - self.ymin + 1)
    }
}

fn bounding_box(lights: &[Light], t: i64) -> Option<BoundingBox> {
    let mut positions = lights.iter().map(|light| light.at(t));
    let (x, y) = positions.next()?;
    let mut result = BoundingBox {
        xmin: x,
        xmax: x,
        ymin: y,
        ymax: y,
    };
    for (x, y) in positions {
        result.xmin = result.xmin.min(x);
        result.xmax = result.xmax.max(x);
        result.ymin = result.ymin.min(y);
        result.ymax = result.ymax.max(y);
    }
    Some(result)
}

fn parse_lights(input: &str) -> Result<Vec<Light>, String> {
    let rx = Regex::new(
        r"^position=<\s*(-?\d+),\s*(-?\d+)>\s*velocity=<\s*(-?\d+),\s*(-?\d+)>$",
    )
    .map_err(|e| e.to_string())?;
    aoc2018::nonblank_lines(input)
        .map(|line| -> Result<Light, String> {
            let caps = rx
                .captures(line.trim())
                .ok_or_else(|| format!("not a point of light: '{}'", line))?;
            let field = |n: usize| -> Result<i64, String> {
                caps[n]
                    .parse()
                    .map_err(|e| format!("bad number in '{}': {}", line, e))
            };
            Ok(Light {
                x: field(1)?,
                y: field(2)?,
                dx: field(3)?,
                dy: field(4)?,
            })
        })
        .collect()
}

/// The time at which the lights are most tightly clustered: we move
/// forward while the bounding box keeps shrinking.
fn convergence_time(lights: &[Light]) -> Option<i64> {
    let mut t: i64 = 0;
    let mut area = bounding_box(lights, t)?.area();
    loop {
        let next_area = bounding_box(lights, t + 1)?.area();
        if next_area >= area {
            event!(Level::DEBUG, "bounding box is smallest at t={}: area {}", t, area);
            return Some(t);
        }
        event!(Level::TRACE, "t={}: area {}", t + 1, next_area);
        area = next_area;
        t += 1;
    }
}

fn render(lights: &[Light], t: i64) -> String {
    let bbox = match bounding_box(lights, t) {
        Some(b) => b,
        None => {
            return String::new();
        }
    };
    let lit: HashSet<(i64, i64)> = lights.iter().map(|light| light.at(t)).collect();
    let mut result = String::new();
    for y in bbox.ymin..=bbox.ymax {
        for x in bbox.xmin..=bbox.xmax {
            result.push(if lit.contains(&(x, y)) { '#' } else { '.' });
        }
        result.push('\n');
    }
    result
}

#[cfg(test)]
const EXAMPLE: &str = "position=< 9,  1> velocity=< 0,  2>
position=< 7,  0> velocity=<-1,  0>
position=< 3, -2> velocity=<-1,  1>
position=< 6, 10> velocity=<-2, -1>
position=< 2, -4> velocity=< 2,  2>
position=<-6, 10> velocity=< 2, -2>
position=< 1,  8> velocity=< 1, -1>
position=< 1,  7> velocity=< 1,  0>
position=<-3, 11> velocity=< 1, -2>
position=< 7,  6> velocity=<-1, -1>
position=<-2,  3> velocity=< 1,  0>
position=<-4,  3> velocity=< 2,  0>
position=<10, -3> velocity=<-1,  1>
position=< 5, 11> velocity=< 1, -2>
position=< 4,  7> velocity=< 0, -1>
position=< 8, -2> velocity=< 0,  1>
position=<15,  0> velocity=<-2,  0>
position=< 1,  6> velocity=< 1,  0>
position=< 8,  9> velocity=< 0, -1>
position=< 3,  3> velocity=<-1,  1>
position=< 0,  5> velocity=< 0, -1>
position=<-2,  2> velocity=< 2,  0>
position=< 5, -2> velocity=< 1,  2>
position=< 1,  4> velocity=< 2,  1>
position=<-2,  7> velocity=< 2, -2>
position=< 3,  6> velocity=<-1, -1>
position=< 5,  0> velocity=< 1,  0>
position=<-6,  0> velocity=< 2,  0>
position=< 5,  9> velocity=< 1, -2>
position=<14,  7> velocity=<-2,  0>
position=<-3,  6> velocity=< 2, -1>
";

#[test]
fn test_parse_lights() {
    let lights = parse_lights(EXAMPLE).expect("valid example");
    assert_eq!(lights.len(), 31);
    assert_eq!(
        lights[1],
        Light {
            x: 7,
            y: 0,
            dx: -1,
            dy: 0
        }
    );
    assert!(parse_lights("position=<1, 2>").is_err());
}

#[test]
fn test_message() {
    let lights = parse_lights(EXAMPLE).expect("valid example");
    assert_eq!(convergence_time(&lights), Some(3));
    assert_eq!(
        render(&lights, 3),
        concat!(
            "#...#..###\n",
            "#...#...#.\n",
            "#...#...#.\n",
            "#####...#.\n",
            "#...#...#.\n",
            "#...#...#.\n",
            "#...#...#.\n",
            "#...#..###\n",
        )
    );
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let lights = parse_lights(&input)?;
    event!(Level::INFO, "{} points of light", lights.len());

    let t = convergence_time(&lights).ok_or_else(|| "there are no lights".to_string())?;
    println!("Day 10 part 1:\n{}", render(&lights, t));
    println!("Day 10 part 2: {}", t);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
