use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use ndarray::prelude::*;
use pathfinding::directed::dijkstra::dijkstra_all;
use tracing::{event, span, Level};

const HIT_POINTS: i32 = 200;
const GOBLIN_ATTACK: i32 = 3;
const MAX_ELF_ATTACK: i32 = HIT_POINTS;

/// Field order gives reading order (top to bottom, then left to right).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
struct Point {
    y: usize,
    x: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Point {
        Point { x, y }
    }

    /// Orthogonal neighbours, in reading order.
    fn neighbours(&self) -> Vec<Point> {
        let mut result = Vec::with_capacity(4);
        if let Some(y) = self.y.checked_sub(1) {
            result.push(Point::new(self.x, y));
        }
        if let Some(x) = self.x.checked_sub(1) {
            result.push(Point::new(x, self.y));
        }
        result.push(Point::new(self.x + 1, self.y));
        result.push(Point::new(self.x, self.y + 1));
        result
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Race {
    Elf,
    Goblin,
}

impl Race {
    fn symbol(&self) -> char {
        match self {
            Race::Elf => 'E',
            Race::Goblin => 'G',
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    race: Race,
    pos: Point,
    hp: i32,
    attack: i32,
}

impl Unit {
    fn alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Debug, Clone)]
struct Cave {
    // true for open floor, false for wall.
    open: Array2<bool>,
}

impl Cave {
    fn is_open(&self, p: &Point) -> bool {
        self.open.get((p.y, p.x)).copied().unwrap_or(false)
    }

    fn free_neighbours(&self, p: &Point, occupied: &HashSet<Point>) -> Vec<Point> {
        p.neighbours()
            .into_iter()
            .filter(|n| self.is_open(n) && !occupied.contains(n))
            .collect()
    }

    /// Number of steps from `from` to every free square reachable from
    /// it, including `from` itself.
    fn distances(&self, from: Point, occupied: &HashSet<Point>) -> HashMap<Point, usize> {
        let successors = |p: &Point| -> Vec<(Point, usize)> {
            self.free_neighbours(p, occupied)
                .into_iter()
                .map(|n| (n, 1))
                .collect()
        };
        let mut result: HashMap<Point, usize> = dijkstra_all(&from, successors)
            .into_iter()
            .map(|(p, (_parent, steps))| (p, steps))
            .collect();
        result.insert(from, 0);
        result
    }
}

fn parse(input: &str) -> Result<(Cave, Vec<Unit>), String> {
    let lines: Vec<&str> = aoc2018::nonblank_lines(input).collect();
    let height = lines.len();
    let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let mut open: Array2<bool> = Array2::from_elem((height, width), false);
    let mut units: Vec<Unit> = Vec::new();
    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let race = match ch {
                '#' => {
                    continue;
                }
                '.' => None,
                'E' => Some(Race::Elf),
                'G' => Some(Race::Goblin),
                _ => {
                    return Err(format!("unexpected '{}' at {}", ch, Point::new(x, y)));
                }
            };
            open[(y, x)] = true;
            if let Some(race) = race {
                units.push(Unit {
                    race,
                    pos: Point::new(x, y),
                    hp: HIT_POINTS,
                    attack: GOBLIN_ATTACK,
                });
            }
        }
    }
    Ok((Cave { open }, units))
}

#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    rounds: usize,
    hp_left: i32,
    winner: Race,
}

impl Outcome {
    fn score(&self) -> i64 {
        self.rounds as i64 * self.hp_left as i64
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Turn {
    Done,
    // Neither moved nor attacked.
    Idle,
    NoEnemies,
    ElfDied,
}

struct Battle<'a> {
    cave: &'a Cave,
    units: Vec<Unit>,
    rounds: usize,
}

impl<'a> Battle<'a> {
    fn new(cave: &'a Cave, units: &[Unit], elf_attack: i32) -> Battle<'a> {
        let units = units
            .iter()
            .map(|unit| match unit.race {
                Race::Elf => Unit {
                    attack: elf_attack,
                    ..*unit
                },
                Race::Goblin => *unit,
            })
            .collect();
        Battle {
            cave,
            units,
            rounds: 0,
        }
    }

    fn occupied_except(&self, me: usize) -> HashSet<Point> {
        self.units
            .iter()
            .enumerate()
            .filter(|(i, unit)| *i != me && unit.alive())
            .map(|(_, unit)| unit.pos)
            .collect()
    }

    /// The first step `me` should take towards the nearest square in
    /// range of an enemy, if any such square can be reached.
    fn choose_step(&self, me: usize, enemies: &[usize]) -> Option<Point> {
        let start = self.units[me].pos;
        let occupied = self.occupied_except(me);
        let from_me = self.cave.distances(start, &occupied);
        let (steps, destination) = enemies
            .iter()
            .flat_map(|e| self.cave.free_neighbours(&self.units[*e].pos, &occupied))
            .filter_map(|p| from_me.get(&p).map(|steps| (*steps, p)))
            .min()?;
        event!(
            Level::TRACE,
            "unit at {} heads for {}, {} steps away",
            start,
            destination,
            steps
        );
        let from_destination = self.cave.distances(destination, &occupied);
        self.cave
            .free_neighbours(&start, &occupied)
            .into_iter()
            .filter_map(|n| from_destination.get(&n).map(|steps| (*steps, n)))
            .min()
            .map(|(_, step)| step)
    }

    fn take_turn(&mut self, me: usize, elves_must_survive: bool) -> Turn {
        let race = self.units[me].race;
        let enemies: Vec<usize> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, unit)| unit.alive() && unit.race != race)
            .map(|(i, _)| i)
            .collect();
        if enemies.is_empty() {
            return Turn::NoEnemies;
        }

        let in_range = |units: &[Unit], pos: Point| -> Vec<usize> {
            let adjacent = pos.neighbours();
            enemies
                .iter()
                .copied()
                .filter(|e| adjacent.contains(&units[*e].pos))
                .collect()
        };

        let mut moved = false;
        if in_range(&self.units, self.units[me].pos).is_empty() {
            if let Some(step) = self.choose_step(me, &enemies) {
                self.units[me].pos = step;
                moved = true;
            }
        }

        let victim = in_range(&self.units, self.units[me].pos)
            .into_iter()
            .min_by_key(|e| (self.units[*e].hp, self.units[*e].pos));
        if let Some(victim) = victim {
            let attack = self.units[me].attack;
            let target = &mut self.units[victim];
            target.hp -= attack;
            if !target.alive() {
                event!(
                    Level::DEBUG,
                    "round {}: {:?} at {} dies",
                    self.rounds + 1,
                    target.race,
                    target.pos
                );
                if target.race == Race::Elf && elves_must_survive {
                    return Turn::ElfDied;
                }
            }
            Turn::Done
        } else if moved {
            Turn::Done
        } else {
            Turn::Idle
        }
    }

    /// Fight to the finish.  Returns None if an elf dies while
    /// `elves_must_survive` is set, or if the armies cannot reach each
    /// other.
    fn fight(mut self, elves_must_survive: bool) -> Option<Outcome> {
        loop {
            self.units.sort_by_key(|unit| unit.pos);
            let mut anything_happened = false;
            for me in 0..self.units.len() {
                if !self.units[me].alive() {
                    continue;
                }
                match self.take_turn(me, elves_must_survive) {
                    Turn::Done => {
                        anything_happened = true;
                    }
                    Turn::Idle => (),
                    Turn::ElfDied => {
                        return None;
                    }
                    Turn::NoEnemies => {
                        return Some(Outcome {
                            rounds: self.rounds,
                            hp_left: self
                                .units
                                .iter()
                                .filter(|unit| unit.alive())
                                .map(|unit| unit.hp)
                                .sum(),
                            winner: self.units[me].race,
                        });
                    }
                }
            }
            if !anything_happened {
                event!(
                    Level::DEBUG,
                    "stalemate in round {}: nobody can move or attack",
                    self.rounds + 1
                );
                return None;
            }
            self.units.retain(|unit| unit.alive());
            self.rounds += 1;
            event!(Level::TRACE, "after round {}:\n{}", self.rounds, self);
        }
    }
}

impl Display for Battle<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cave.open.outer_iter().enumerate() {
            let mut here: Vec<&Unit> = Vec::new();
            for (x, open) in row.iter().enumerate() {
                let p = Point::new(x, y);
                match self.units.iter().find(|u| u.alive() && u.pos == p) {
                    Some(unit) => {
                        here.push(unit);
                        write!(f, "{}", unit.race.symbol())?;
                    }
                    None => {
                        f.write_str(if *open { "." } else { "#" })?;
                    }
                }
            }
            for (i, unit) in here.iter().enumerate() {
                let sep = if i == 0 { "   " } else { ", " };
                write!(f, "{}{}({})", sep, unit.race.symbol(), unit.hp)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn part1(cave: &Cave, units: &[Unit]) -> Option<Outcome> {
    Battle::new(cave, units, GOBLIN_ATTACK).fight(false)
}

/// The outcome of the fight with the weakest elves that all survive.
fn part2(cave: &Cave, units: &[Unit]) -> Option<(i32, Outcome)> {
    for elf_attack in (GOBLIN_ATTACK + 1)..=MAX_ELF_ATTACK {
        let span = span!(Level::DEBUG, "fight", elf_attack);
        let _enter = span.enter();
        if let Some(outcome) = Battle::new(cave, units, elf_attack).fight(true) {
            return Some((elf_attack, outcome));
        }
    }
    None
}

#[cfg(test)]
fn run_example(lines: &[&str]) -> (Option<Outcome>, Option<(i32, Outcome)>) {
    let (cave, units) = parse(&lines.join("\n")).expect("valid example");
    (part1(&cave, &units), part2(&cave, &units))
}

#[test]
fn test_movement() {
    let (cave, units) = parse(
        &[
            "#########",
            "#G..G..G#",
            "#.......#",
            "#.......#",
            "#G..E..G#",
            "#.......#",
            "#.......#",
            "#G..G..G#",
            "#########",
        ]
        .join("\n"),
    )
    .expect("valid example");
    let mut battle = Battle::new(&cave, &units, GOBLIN_ATTACK);
    battle.units.sort_by_key(|unit| unit.pos);
    for me in 0..battle.units.len() {
        assert_eq!(battle.take_turn(me, false), Turn::Done);
    }
    let positions: Vec<Point> = battle.units.iter().map(|u| u.pos).collect();
    assert_eq!(
        positions,
        vec![
            Point::new(2, 1),
            Point::new(4, 2),
            Point::new(6, 1),
            Point::new(2, 4),
            Point::new(4, 3),
            Point::new(7, 3),
            Point::new(1, 6),
            Point::new(4, 6),
            Point::new(7, 6),
        ]
    );
}

#[test]
fn test_first_example() {
    let (outcome, boosted) = run_example(&[
        "#######", "#.G...#", "#...EG#", "#.#.#G#", "#..G#E#", "#.....#", "#######",
    ]);
    assert_eq!(
        outcome,
        Some(Outcome {
            rounds: 47,
            hp_left: 590,
            winner: Race::Goblin
        })
    );
    let (attack, boosted) = boosted.expect("elves can win");
    assert_eq!(attack, 15);
    assert_eq!(boosted.score(), 4988);
    assert_eq!(boosted.winner, Race::Elf);
}

#[test]
fn test_more_examples() {
    let (outcome, boosted) = run_example(&[
        "#######", "#G..#E#", "#E#E.E#", "#G.##.#", "#...#E#", "#...E.#", "#######",
    ]);
    assert_eq!(outcome.map(|o| o.score()), Some(36334));
    assert_eq!(boosted.map(|(_, o)| o.score()), Some(29064));

    let (outcome, boosted) = run_example(&[
        "#######", "#E..EG#", "#.#G.E#", "#E.##E#", "#G..#.#", "#..E#.#", "#######",
    ]);
    assert_eq!(outcome.map(|o| o.score()), Some(39514));
    assert_eq!(boosted.map(|(_, o)| o.score()), Some(31284));
}

#[test]
fn test_armies_cannot_meet() {
    let (outcome, boosted) = run_example(&["#######", "#E.#.G#", "#######"]);
    assert_eq!(outcome, None);
    assert!(boosted.is_none());
}

#[test]
fn test_parse_rejects_junk() {
    assert!(parse("#####\n#.X.#\n#####\n").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let (cave, units) = parse(&input)?;
    event!(
        Level::INFO,
        "{} elves and {} goblins",
        units.iter().filter(|u| u.race == Race::Elf).count(),
        units.iter().filter(|u| u.race == Race::Goblin).count()
    );

    let outcome = part1(&cave, &units).ok_or_else(|| "the armies cannot reach each other".to_string())?;
    event!(
        Level::INFO,
        "{:?}s win after {} full rounds with {} HP left",
        outcome.winner,
        outcome.rounds,
        outcome.hp_left
    );
    println!("Day 15 part 1: {}", outcome.score());

    let (attack, outcome) = part2(&cave, &units)
        .ok_or_else(|| "the elves cannot win without losses".to_string())?;
    event!(Level::INFO, "elves need attack power {}", attack);
    println!("Day 15 part 2: {}", outcome.score());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
