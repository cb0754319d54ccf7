use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

const TICK_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Position {
    // Field order gives the order in which carts move.
    row: usize,
    col: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn turn_left(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    fn turn_right(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cart {
    pos: Position,
    heading: Direction,
    // How many intersections the cart has crossed, mod 3.
    turns: u8,
    crashed: bool,
}

impl Cart {
    fn advance(&mut self, tracks: &Tracks) -> Result<(), String> {
        let Position { row, col } = self.pos;
        let next = match self.heading {
            Direction::Up => row.checked_sub(1).map(|row| Position { row, col }),
            Direction::Down => Some(Position { row: row + 1, col }),
            Direction::Left => col.checked_sub(1).map(|col| Position { row, col }),
            Direction::Right => Some(Position { row, col: col + 1 }),
        };
        let next = next.ok_or_else(|| format!("cart at {} ran off the map", self.pos))?;
        self.heading = match (tracks.at(next), self.heading) {
            (b'/', Direction::Up) | (b'/', Direction::Down) => self.heading.turn_right(),
            (b'/', _) => self.heading.turn_left(),
            (b'\\', Direction::Up) | (b'\\', Direction::Down) => self.heading.turn_left(),
            (b'\\', _) => self.heading.turn_right(),
            (b'+', heading) => {
                let turned = match self.turns {
                    0 => heading.turn_left(),
                    1 => heading,
                    _ => heading.turn_right(),
                };
                self.turns = (self.turns + 1) % 3;
                turned
            }
            (b'|', Direction::Up) | (b'|', Direction::Down) => self.heading,
            (b'-', Direction::Left) | (b'-', Direction::Right) => self.heading,
            (other, _) => {
                return Err(format!(
                    "cart left the track at {} (found '{}')",
                    next, other as char
                ));
            }
        };
        self.pos = next;
        Ok(())
    }
}

struct Tracks {
    rows: Vec<Vec<u8>>,
}

impl Tracks {
    fn at(&self, pos: Position) -> u8 {
        self.rows
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(b' ')
    }
}

fn parse(input: &str) -> Result<(Tracks, Vec<Cart>), String> {
    let mut rows: Vec<Vec<u8>> = Vec::new();
    let mut carts: Vec<Cart> = Vec::new();
    for (row, line) in input.lines().enumerate() {
        let mut cells: Vec<u8> = line.trim_end_matches('\r').bytes().collect();
        for (col, cell) in cells.iter_mut().enumerate() {
            let (heading, track) = match *cell {
                b'^' => (Direction::Up, b'|'),
                b'v' => (Direction::Down, b'|'),
                b'<' => (Direction::Left, b'-'),
                b'>' => (Direction::Right, b'-'),
                b' ' | b'|' | b'-' | b'/' | b'\\' | b'+' => {
                    continue;
                }
                other => {
                    return Err(format!(
                        "unexpected '{}' at {}",
                        other as char,
                        Position { row, col }
                    ));
                }
            };
            *cell = track;
            carts.push(Cart {
                pos: Position { row, col },
                heading,
                turns: 0,
                crashed: false,
            });
        }
        rows.push(cells);
    }
    Ok((Tracks { rows }, carts))
}

#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    first_crash: Position,
    last_cart: Option<Position>,
}

/// Run the carts until at most one remains, for no more than
/// `tick_limit` ticks.  Crashed carts are removed as soon as they
/// collide.
fn simulate(
    tracks: &Tracks,
    mut carts: Vec<Cart>,
    tick_limit: usize,
) -> Result<Outcome, String> {
    let mut first_crash: Option<Position> = None;
    for tick in 0..tick_limit {
        carts.sort_by_key(|cart| cart.pos);
        for i in 0..carts.len() {
            if carts[i].crashed {
                continue;
            }
            carts[i].advance(tracks)?;
            let pos = carts[i].pos;
            let mut collided = false;
            for (j, other) in carts.iter_mut().enumerate() {
                if j != i && !other.crashed && other.pos == pos {
                    other.crashed = true;
                    collided = true;
                }
            }
            if collided {
                carts[i].crashed = true;
                event!(Level::DEBUG, "tick {}: crash at {}", tick, pos);
                if first_crash.is_none() {
                    first_crash = Some(pos);
                }
            }
        }
        carts.retain(|cart| !cart.crashed);
        if carts.len() <= 1 {
            if let Some(first_crash) = first_crash {
                event!(Level::DEBUG, "{} cart(s) left after tick {}", carts.len(), tick);
                return Ok(Outcome {
                    first_crash,
                    last_cart: carts.first().map(|cart| cart.pos),
                });
            }
            if carts.is_empty() {
                return Err("there are no carts".to_string());
            }
        }
    }
    Err(format!("carts were still running after {} ticks", tick_limit))
}

#[test]
fn test_first_crash() {
    let example = concat!(
        "/->-\\        \n",
        "|   |  /----\\\n",
        "| /-+--+-\\  |\n",
        "| | |  | v  |\n",
        "\\-+-/  \\-+--/\n",
        "  \\------/   \n",
    );
    let (tracks, carts) = parse(example).expect("valid example");
    assert_eq!(carts.len(), 2);
    let outcome = simulate(&tracks, carts, TICK_LIMIT).expect("carts should crash");
    assert_eq!(outcome.first_crash.to_string(), "7,3");
    assert_eq!(outcome.last_cart, None);
}

#[test]
fn test_last_cart() {
    let example = concat!(
        "/>-<\\  \n",
        "|   |  \n",
        "| /<+-\\\n",
        "| | | v\n",
        "\\>+</ |\n",
        "  |   ^\n",
        "  \\<->/\n",
    );
    let (tracks, carts) = parse(example).expect("valid example");
    assert_eq!(carts.len(), 9);
    let outcome = simulate(&tracks, carts, TICK_LIMIT).expect("carts should crash");
    assert_eq!(outcome.first_crash.to_string(), "2,0");
    assert_eq!(outcome.last_cart, Some(Position { row: 4, col: 6 }));
}

#[test]
fn test_carts_that_never_crash() {
    // A lone cart circles for ever.
    let (tracks, carts) = parse("/->-\\\n|   |\n\\---/\n").expect("valid map");
    assert_eq!(carts.len(), 1);
    assert!(simulate(&tracks, carts, 1000).is_err());

    // No carts at all.
    let (tracks, carts) = parse("/---\\\n|   |\n\\---/\n").expect("valid map");
    assert!(simulate(&tracks, carts, 1000).is_err());
}

#[test]
fn test_intersection_turns() {
    let (tracks, mut carts) = parse("  |  \n--+--\n  ^  \n").expect("valid map");
    carts[0].advance(&tracks).expect("on track");
    assert_eq!(carts[0].heading, Direction::Left);
    assert_eq!(carts[0].turns, 1);
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let (tracks, carts) = parse(&input)?;
    event!(Level::INFO, "{} carts on the tracks", carts.len());

    let outcome = simulate(&tracks, carts, TICK_LIMIT)?;
    println!("Day 13 part 1: {}", outcome.first_crash);
    match outcome.last_cart {
        Some(pos) => {
            println!("Day 13 part 2: {}", pos);
            Ok(())
        }
        None => Err("every cart crashed".to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
