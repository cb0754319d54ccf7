use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::{event, span, Level};

const WORKERS: usize = 5;
const BASE_DURATION: u32 = 60;

/// Maps each step to the steps which must finish before it.
#[derive(Debug, Clone, Default)]
struct Dependencies {
    prerequisites: BTreeMap<char, BTreeSet<char>>,
}

impl Dependencies {
    fn add(&mut self, before: char, after: char) {
        self.prerequisites.entry(before).or_default();
        self.prerequisites.entry(after).or_default().insert(before);
    }

    fn steps(&self) -> usize {
        self.prerequisites.len()
    }

    /// Steps not yet done or started whose prerequisites are all done,
    /// in alphabetical order.
    fn available<'a>(
        &'a self,
        done: &'a BTreeSet<char>,
        started: &'a BTreeSet<char>,
    ) -> impl Iterator<Item = char> + 'a {
        self.prerequisites
            .iter()
            .filter(move |(step, _)| !done.contains(*step) && !started.contains(*step))
            .filter(move |(_, needs)| needs.is_subset(done))
            .map(|(step, _)| *step)
    }
}

impl TryFrom<&str> for Dependencies {
    type Error = String;
    fn try_from(input: &str) -> Result<Dependencies, String> {
        let rx = Regex::new(r"^Step (\S) must be finished before step (\S) can begin\.$")
            .map_err(|e| e.to_string())?;
        let mut deps = Dependencies::default();
        for line in aoc2018::nonblank_lines(input) {
            match rx.captures(line.trim()) {
                Some(caps) => {
                    let before = caps[1].chars().next();
                    let after = caps[2].chars().next();
                    match (before, after) {
                        (Some(b), Some(a)) if b.is_ascii_uppercase() && a.is_ascii_uppercase() => {
                            deps.add(b, a);
                        }
                        _ => {
                            return Err(format!("steps must be named A to Z: '{}'", line));
                        }
                    }
                }
                None => {
                    return Err(format!("not a step ordering instruction: '{}'", line));
                }
            }
        }
        Ok(deps)
    }
}

fn step_order(deps: &Dependencies) -> Result<String, String> {
    let mut done: BTreeSet<char> = BTreeSet::new();
    let mut order = String::with_capacity(deps.steps());
    let nothing_started = BTreeSet::new();
    while done.len() < deps.steps() {
        let next = deps.available(&done, &nothing_started).next();
        match next {
            Some(step) => {
                order.push(step);
                done.insert(step);
            }
            None => {
                return Err(format!("dependency cycle after completing {}", order));
            }
        }
    }
    Ok(order)
}

fn duration(step: char, base: u32) -> u32 {
    base + (step as u32 - 'A' as u32 + 1)
}

/// Total time to complete every step with `workers` workers.
fn assembly_time(deps: &Dependencies, workers: usize, base: u32) -> Result<u32, String> {
    let span = span!(Level::DEBUG, "assembly", workers, base);
    let _enter = span.enter();

    let mut done: BTreeSet<char> = BTreeSet::new();
    let mut started: BTreeSet<char> = BTreeSet::new();
    // (finish time, step) for each busy worker.
    let mut in_progress: Vec<(u32, char)> = Vec::with_capacity(workers);
    let mut now: u32 = 0;
    while done.len() < deps.steps() {
        let idle = workers - in_progress.len();
        let starting: Vec<char> = deps.available(&done, &started).take(idle).collect();
        for step in starting {
            event!(Level::TRACE, "t={}: starting step {}", now, step);
            started.insert(step);
            in_progress.push((now + duration(step, base), step));
        }
        match in_progress.iter().map(|(finish, _)| *finish).min() {
            Some(next) => {
                now = next;
            }
            None => {
                return Err(format!("dependency cycle at t={}", now));
            }
        }
        in_progress.retain(|(finish, step)| {
            if *finish == now {
                event!(Level::TRACE, "t={}: finished step {}", now, step);
                done.insert(*step);
                false
            } else {
                true
            }
        });
    }
    Ok(now)
}

#[cfg(test)]
const EXAMPLE: &str = "Step C must be finished before step A can begin.
Step C must be finished before step F can begin.
Step A must be finished before step B can begin.
Step A must be finished before step D can begin.
Step B must be finished before step E can begin.
Step D must be finished before step E can begin.
Step F must be finished before step E can begin.
";

#[test]
fn test_step_order() {
    let deps = Dependencies::try_from(EXAMPLE).expect("valid example");
    assert_eq!(deps.steps(), 6);
    assert_eq!(step_order(&deps), Ok("CABDFE".to_string()));
}

#[test]
fn test_assembly_time() {
    let deps = Dependencies::try_from(EXAMPLE).expect("valid example");
    assert_eq!(assembly_time(&deps, 2, 0), Ok(15));
    // One worker does everything in sequence.
    assert_eq!(assembly_time(&deps, 1, 0), Ok(1 + 2 + 3 + 4 + 5 + 6));
}

#[test]
fn test_duration() {
    assert_eq!(duration('A', 60), 61);
    assert_eq!(duration('Z', 60), 86);
}

#[test]
fn test_cycle() {
    let deps = Dependencies::try_from(
        "Step A must be finished before step B can begin.\nStep B must be finished before step A can begin.\n",
    )
    .expect("valid instructions");
    assert!(step_order(&deps).is_err());
    assert!(assembly_time(&deps, 2, 0).is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let deps = Dependencies::try_from(input.as_str())?;
    event!(Level::INFO, "{} steps", deps.steps());

    println!("Day 07 part 1: {}", step_order(&deps)?);
    println!(
        "Day 07 part 2: {}",
        assembly_time(&deps, WORKERS, BASE_DURATION)?
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
