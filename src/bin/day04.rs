use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;

use regex::Regex;
use tracing::{event, Level};

const MINUTES: usize = 60;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Event {
    BeginsShift(u32),
    FallsAsleep,
    WakesUp,
}

#[derive(Debug, Clone)]
struct Record {
    // "YYYY-MM-DD hh:mm" sorts chronologically as a string.
    timestamp: String,
    minute: usize,
    event: Event,
}

#[derive(Debug, PartialEq, Eq)]
enum LogError {
    Unrecognised(String),
    BadInt(String, ParseIntError),
    NobodyOnDuty(String),
    WokeWithoutSleeping(String),
}

impl Display for LogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Unrecognised(s) => {
                write!(f, "does not look like a guard record: {}", s)
            }
            LogError::BadInt(s, e) => {
                write!(f, "failed to parse {} as an integer: {}", s, e)
            }
            LogError::NobodyOnDuty(s) => {
                write!(f, "no guard is on duty at {}", s)
            }
            LogError::WokeWithoutSleeping(s) => {
                write!(f, "guard wakes up at {} without having fallen asleep", s)
            }
        }
    }
}

struct RecordParser {
    rx: Regex,
}

impl RecordParser {
    fn new() -> Result<RecordParser, String> {
        Regex::new(r"^\[(\d{4}-\d\d-\d\d \d\d:(\d\d))\] (.+)$")
            .map(|rx| RecordParser { rx })
            .map_err(|e| e.to_string())
    }

    fn parse(&self, s: &str) -> Result<Record, LogError> {
        let caps = self
            .rx
            .captures(s.trim())
            .ok_or_else(|| LogError::Unrecognised(s.to_string()))?;
        let minute: usize = caps[2]
            .parse()
            .map_err(|e| LogError::BadInt(caps[2].to_string(), e))?;
        let what = &caps[3];
        let event = match what {
            "falls asleep" => Event::FallsAsleep,
            "wakes up" => Event::WakesUp,
            _ => match what
                .strip_prefix("Guard #")
                .and_then(|tail| tail.strip_suffix(" begins shift"))
            {
                Some(id) => Event::BeginsShift(
                    id.parse()
                        .map_err(|e| LogError::BadInt(id.to_string(), e))?,
                ),
                None => {
                    return Err(LogError::Unrecognised(s.to_string()));
                }
            },
        };
        Ok(Record {
            timestamp: caps[1].to_string(),
            minute,
            event,
        })
    }
}

#[test]
fn test_parse_record() {
    let parser = RecordParser::new().expect("valid regex");
    let r = parser
        .parse("[1518-11-01 23:58] Guard #99 begins shift")
        .expect("valid record");
    assert_eq!(r.timestamp, "1518-11-01 23:58");
    assert_eq!(r.minute, 58);
    assert_eq!(r.event, Event::BeginsShift(99));
    let r = parser
        .parse("[1518-11-02 00:40] falls asleep")
        .expect("valid record");
    assert_eq!(r.event, Event::FallsAsleep);
    assert!(matches!(
        parser.parse("[1518-11-02 00:40] sings a song"),
        Err(LogError::Unrecognised(_))
    ));
}

/// Parse the records and put them into chronological order.
fn parse_records(input: &str) -> Result<Vec<Record>, String> {
    let parser = RecordParser::new()?;
    let mut records: Vec<Record> = aoc2018::nonblank_lines(input)
        .map(|line| parser.parse(line).map_err(|e| e.to_string()))
        .collect::<Result<Vec<Record>, String>>()?;
    records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(records)
}

/// For each guard, how many times they were asleep during each
/// minute of the midnight hour.
type SleepTable = BTreeMap<u32, [u32; MINUTES]>;

fn tabulate(records: &[Record]) -> Result<SleepTable, LogError> {
    let mut table: SleepTable = BTreeMap::new();
    let mut on_duty: Option<u32> = None;
    let mut asleep_since: Option<usize> = None;
    for record in records {
        match record.event {
            Event::BeginsShift(id) => {
                table.entry(id).or_insert([0; MINUTES]);
                on_duty = Some(id);
                asleep_since = None;
            }
            Event::FallsAsleep => {
                if on_duty.is_none() {
                    return Err(LogError::NobodyOnDuty(record.timestamp.clone()));
                }
                asleep_since = Some(record.minute);
            }
            Event::WakesUp => {
                let guard = on_duty.ok_or_else(|| LogError::NobodyOnDuty(record.timestamp.clone()))?;
                let from = asleep_since
                    .take()
                    .ok_or_else(|| LogError::WokeWithoutSleeping(record.timestamp.clone()))?;
                let minutes = table.entry(guard).or_insert([0; MINUTES]);
                for m in from..record.minute.min(MINUTES) {
                    minutes[m] += 1;
                }
            }
        }
    }
    Ok(table)
}

/// The minute slept most often, and how often; ties go to the
/// earliest minute.
fn favourite_minute(minutes: &[u32; MINUTES]) -> (usize, u32) {
    let mut best: (usize, u32) = (0, 0);
    for (minute, count) in minutes.iter().enumerate() {
        if *count > best.1 {
            best = (minute, *count);
        }
    }
    best
}

/// Strategy 1: the guard with the most minutes asleep, times their
/// favourite minute.
fn strategy1(table: &SleepTable) -> Option<usize> {
    let mut sleepiest: Option<(u32, u32)> = None;
    for (guard, minutes) in table.iter() {
        let total: u32 = minutes.iter().sum();
        match sleepiest {
            Some((_, most)) if most >= total => (),
            _ => {
                sleepiest = Some((*guard, total));
            }
        }
    }
    let (guard, total) = sleepiest?;
    let (minute, _) = favourite_minute(&table[&guard]);
    event!(
        Level::DEBUG,
        "guard #{} slept for {} minutes, most often at 00:{:02}",
        guard,
        total,
        minute
    );
    Some(guard as usize * minute)
}

/// Strategy 2: the guard most frequently asleep on the same minute,
/// times that minute.
fn strategy2(table: &SleepTable) -> Option<usize> {
    let mut best: Option<(u32, usize, u32)> = None;
    for (guard, minutes) in table.iter() {
        let (minute, count) = favourite_minute(minutes);
        match best {
            Some((_, _, most)) if most >= count => (),
            _ => {
                best = Some((*guard, minute, count));
            }
        }
    }
    let (guard, minute, count) = best?;
    event!(
        Level::DEBUG,
        "guard #{} was asleep at 00:{:02} on {} occasions",
        guard,
        minute,
        count
    );
    Some(guard as usize * minute)
}

#[cfg(test)]
const EXAMPLE: &str = "[1518-11-01 00:00] Guard #10 begins shift
[1518-11-01 00:05] falls asleep
[1518-11-01 00:25] wakes up
[1518-11-01 00:30] falls asleep
[1518-11-01 00:55] wakes up
[1518-11-01 23:58] Guard #99 begins shift
[1518-11-02 00:40] falls asleep
[1518-11-02 00:50] wakes up
[1518-11-03 00:05] Guard #10 begins shift
[1518-11-03 00:24] falls asleep
[1518-11-03 00:29] wakes up
[1518-11-04 00:02] Guard #99 begins shift
[1518-11-04 00:36] falls asleep
[1518-11-04 00:46] wakes up
[1518-11-05 00:03] Guard #99 begins shift
[1518-11-05 00:45] falls asleep
[1518-11-05 00:55] wakes up
";

#[test]
fn test_strategies() {
    let records = parse_records(EXAMPLE).expect("valid example");
    let table = tabulate(&records).expect("consistent example");
    assert_eq!(strategy1(&table), Some(240));
    assert_eq!(strategy2(&table), Some(4455));
}

#[test]
fn test_records_are_sorted() {
    let mut lines: Vec<&str> = EXAMPLE.lines().collect();
    lines.reverse();
    let shuffled = lines.join("\n");
    let records = parse_records(&shuffled).expect("valid example");
    assert_eq!(records[0].event, Event::BeginsShift(10));
    let table = tabulate(&records).expect("consistent example");
    assert_eq!(strategy1(&table), Some(240));
}

#[test]
fn test_inconsistent_log() {
    let records = parse_records("[1518-11-01 00:05] falls asleep\n").expect("valid record");
    assert!(matches!(tabulate(&records), Err(LogError::NobodyOnDuty(_))));
    let records = parse_records(
        "[1518-11-01 00:00] Guard #10 begins shift\n[1518-11-01 00:25] wakes up\n",
    )
    .expect("valid records");
    assert!(matches!(
        tabulate(&records),
        Err(LogError::WokeWithoutSleeping(_))
    ));
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let records = parse_records(&input)?;
    let table = tabulate(&records).map_err(|e| e.to_string())?;
    event!(
        Level::INFO,
        "{} records covering {} guards",
        records.len(),
        table.len()
    );

    match (strategy1(&table), strategy2(&table)) {
        (Some(answer1), Some(answer2)) => {
            println!("Day 04 part 1: {}", answer1);
            println!("Day 04 part 2: {}", answer2);
            Ok(())
        }
        _ => Err("the log mentions no guards".to_string()),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
