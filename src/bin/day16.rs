use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    IResult, Parser,
};
use tracing::{event, Level};

type Registers = [usize; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Opcode {
    Addr,
    Addi,
    Mulr,
    Muli,
    Banr,
    Bani,
    Borr,
    Bori,
    Setr,
    Seti,
    Gtir,
    Gtri,
    Gtrr,
    Eqir,
    Eqri,
    Eqrr,
}

const ALL_OPCODES: [Opcode; 16] = [
    Opcode::Addr,
    Opcode::Addi,
    Opcode::Mulr,
    Opcode::Muli,
    Opcode::Banr,
    Opcode::Bani,
    Opcode::Borr,
    Opcode::Bori,
    Opcode::Setr,
    Opcode::Seti,
    Opcode::Gtir,
    Opcode::Gtri,
    Opcode::Gtrr,
    Opcode::Eqir,
    Opcode::Eqri,
    Opcode::Eqrr,
];

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Addr => "addr",
            Opcode::Addi => "addi",
            Opcode::Mulr => "mulr",
            Opcode::Muli => "muli",
            Opcode::Banr => "banr",
            Opcode::Bani => "bani",
            Opcode::Borr => "borr",
            Opcode::Bori => "bori",
            Opcode::Setr => "setr",
            Opcode::Seti => "seti",
            Opcode::Gtir => "gtir",
            Opcode::Gtri => "gtri",
            Opcode::Gtrr => "gtrr",
            Opcode::Eqir => "eqir",
            Opcode::Eqri => "eqri",
            Opcode::Eqrr => "eqrr",
        };
        f.write_str(name)
    }
}

impl Opcode {
    /// Execute the instruction, returning the new register contents.
    /// Returns None if an operand names a register which does not
    /// exist, or on arithmetic overflow.
    fn apply(&self, regs: &Registers, a: usize, b: usize, c: usize) -> Option<Registers> {
        let reg = |i: usize| regs.get(i).copied();
        let value = match self {
            Opcode::Addr => reg(a)?.checked_add(reg(b)?)?,
            Opcode::Addi => reg(a)?.checked_add(b)?,
            Opcode::Mulr => reg(a)?.checked_mul(reg(b)?)?,
            Opcode::Muli => reg(a)?.checked_mul(b)?,
            Opcode::Banr => reg(a)? & reg(b)?,
            Opcode::Bani => reg(a)? & b,
            Opcode::Borr => reg(a)? | reg(b)?,
            Opcode::Bori => reg(a)? | b,
            Opcode::Setr => reg(a)?,
            Opcode::Seti => a,
            Opcode::Gtir => usize::from(a > reg(b)?),
            Opcode::Gtri => usize::from(reg(a)? > b),
            Opcode::Gtrr => usize::from(reg(a)? > reg(b)?),
            Opcode::Eqir => usize::from(a == reg(b)?),
            Opcode::Eqri => usize::from(reg(a)? == b),
            Opcode::Eqrr => usize::from(reg(a)? == reg(b)?),
        };
        let mut result = *regs;
        *result.get_mut(c)? = value;
        Some(result)
    }
}

#[test]
fn test_apply() {
    let regs: Registers = [3, 2, 1, 1];
    assert_eq!(Opcode::Addi.apply(&regs, 0, 7, 3), Some([3, 2, 1, 10]));
    assert_eq!(Opcode::Mulr.apply(&regs, 0, 1, 2), Some([3, 2, 6, 1]));
    assert_eq!(Opcode::Banr.apply(&regs, 0, 1, 0), Some([2, 2, 1, 1]));
    assert_eq!(Opcode::Bori.apply(&regs, 1, 5, 0), Some([7, 2, 1, 1]));
    assert_eq!(Opcode::Seti.apply(&regs, 9, 99, 1), Some([3, 9, 1, 1]));
    assert_eq!(Opcode::Gtir.apply(&regs, 5, 0, 3), Some([3, 2, 1, 1]));
    assert_eq!(Opcode::Eqrr.apply(&regs, 2, 3, 0), Some([1, 2, 1, 1]));
    // Register operands must exist; immediate ones need not.
    assert_eq!(Opcode::Addr.apply(&regs, 0, 4, 0), None);
    assert_eq!(Opcode::Addi.apply(&regs, 0, 4, 0), Some([7, 2, 1, 1]));
    assert_eq!(Opcode::Seti.apply(&regs, 0, 0, 4), None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Instruction {
    opcode: usize,
    a: usize,
    b: usize,
    c: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Sample {
    before: Registers,
    instruction: Instruction,
    after: Registers,
}

impl Sample {
    fn matching_opcodes(&self) -> BTreeSet<Opcode> {
        let Instruction { a, b, c, .. } = self.instruction;
        ALL_OPCODES
            .iter()
            .copied()
            .filter(|op| op.apply(&self.before, a, b, c) == Some(self.after))
            .collect()
    }
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

fn registers(input: &str) -> IResult<&str, Registers> {
    map_res(
        delimited(
            char('['),
            separated_list1(tuple((char(','), space0)), number),
            char(']'),
        ),
        |values: Vec<usize>| <Registers>::try_from(values.as_slice()),
    )(input)
}

fn before_line(input: &str) -> IResult<&str, Registers> {
    preceded(tuple((tag("Before:"), space0)), registers)(input)
}

fn after_line(input: &str) -> IResult<&str, Registers> {
    preceded(tuple((tag("After:"), space0)), registers)(input)
}

fn instruction(input: &str) -> IResult<&str, Instruction> {
    map(
        tuple((
            number,
            preceded(space1, number),
            preceded(space1, number),
            preceded(space1, number),
        )),
        |(opcode, a, b, c)| Instruction { opcode, a, b, c },
    )(input)
}

fn parse_line<'a, O, P>(parser: P, line: &'a str) -> Result<O, String>
where
    P: Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    all_consuming(parser)(line.trim())
        .map(|(_, parsed)| parsed)
        .map_err(|e| format!("failed to parse '{}': {}", line, e))
}

#[test]
fn test_parsers() {
    assert_eq!(parse_line(before_line, "Before: [3, 2, 1, 1]"), Ok([3, 2, 1, 1]));
    assert_eq!(parse_line(after_line, "After:  [3, 2, 2, 1]"), Ok([3, 2, 2, 1]));
    assert_eq!(
        parse_line(instruction, "9 2 1 2"),
        Ok(Instruction {
            opcode: 9,
            a: 2,
            b: 1,
            c: 2
        })
    );
    assert!(parse_line(before_line, "Before: [3, 2, 1]").is_err());
    assert!(parse_line(instruction, "9 2 1 2 7").is_err());
}

fn parse(input: &str) -> Result<(Vec<Sample>, Vec<Instruction>), String> {
    let mut samples: Vec<Sample> = Vec::new();
    let mut program: Vec<Instruction> = Vec::new();
    let mut lines = aoc2018::nonblank_lines(input);
    while let Some(line) = lines.next() {
        if line.trim_start().starts_with("Before:") {
            let before = parse_line(before_line, line)?;
            let ins = lines
                .next()
                .ok_or_else(|| format!("sample '{}' has no instruction", line))?;
            let after = lines
                .next()
                .ok_or_else(|| format!("sample '{}' has no final state", line))?;
            samples.push(Sample {
                before,
                instruction: parse_line(instruction, ins)?,
                after: parse_line(after_line, after)?,
            });
        } else {
            program.push(parse_line(instruction, line)?);
        }
    }
    Ok((samples, program))
}

fn ambiguous_sample_count(samples: &[Sample]) -> usize {
    samples
        .iter()
        .filter(|sample| sample.matching_opcodes().len() >= 3)
        .count()
}

/// Work out which opcode each number stands for: narrow the
/// candidates using the samples, then repeatedly pin down any number
/// with a single candidate and strike that opcode from the others.
fn deduce_opcodes(samples: &[Sample]) -> Result<BTreeMap<usize, Opcode>, String> {
    let mut candidates: BTreeMap<usize, BTreeSet<Opcode>> = BTreeMap::new();
    for sample in samples {
        let matching = sample.matching_opcodes();
        candidates
            .entry(sample.instruction.opcode)
            .or_insert_with(|| ALL_OPCODES.iter().copied().collect())
            .retain(|op| matching.contains(op));
    }

    let mut known: BTreeMap<usize, Opcode> = BTreeMap::new();
    while !candidates.is_empty() {
        if let Some((number, _)) = candidates.iter().find(|(_, ops)| ops.is_empty()) {
            return Err(format!("no opcode is consistent with the samples for {}", number));
        }
        let settled: Vec<(usize, Opcode)> = candidates
            .iter()
            .filter(|(_, ops)| ops.len() == 1)
            .filter_map(|(number, ops)| ops.iter().next().map(|op| (*number, *op)))
            .collect();
        if settled.is_empty() {
            return Err(format!(
                "cannot tell apart the opcodes for {}",
                candidates
                    .keys()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        for (number, op) in settled {
            if let Some((other, _)) = known.iter().find(|(_, known_op)| **known_op == op) {
                return Err(format!(
                    "opcodes {} and {} would both have to be {}",
                    other, number, op
                ));
            }
            event!(Level::DEBUG, "opcode {} is {}", number, op);
            candidates.remove(&number);
            for ops in candidates.values_mut() {
                ops.remove(&op);
            }
            known.insert(number, op);
        }
    }
    Ok(known)
}

fn execute(program: &[Instruction], opcodes: &BTreeMap<usize, Opcode>) -> Result<Registers, String> {
    let mut regs: Registers = [0; 4];
    for (pc, ins) in program.iter().enumerate() {
        let op = opcodes
            .get(&ins.opcode)
            .ok_or_else(|| format!("instruction {}: unknown opcode {}", pc, ins.opcode))?;
        regs = op.apply(&regs, ins.a, ins.b, ins.c).ok_or_else(|| {
            format!(
                "instruction {} ({} {} {} {}) failed with registers {:?}",
                pc, op, ins.a, ins.b, ins.c, regs
            )
        })?;
        event!(Level::TRACE, "{:>4}: {} {} {} {} -> {:?}", pc, op, ins.a, ins.b, ins.c, regs);
    }
    Ok(regs)
}

#[test]
fn test_example_sample() {
    let (samples, program) =
        parse("Before: [3, 2, 1, 1]\n9 2 1 2\nAfter:  [3, 2, 2, 1]\n\n\n\n").expect("valid sample");
    assert!(program.is_empty());
    let matching: Vec<Opcode> = samples[0].matching_opcodes().into_iter().collect();
    assert_eq!(matching, vec![Opcode::Addi, Opcode::Mulr, Opcode::Seti]);
    assert_eq!(ambiguous_sample_count(&samples), 1);
}

#[cfg(test)]
fn synthetic_samples() -> Vec<Sample> {
    // A fixed pseudo-random sequence, so the test is repeatable.
    let mut state: u64 = 12345;
    let mut rnd = |n: u64| -> usize {
        state = (state * 1103515245 + 12345) % (1 << 31);
        ((state >> 16) % n) as usize
    };
    let mut samples = Vec::new();
    for i in 0..256 {
        let opcode = i % 16;
        let before: Registers = [rnd(4), rnd(4), rnd(4), rnd(4)];
        let a = rnd(4);
        let b = rnd(4);
        let c = rnd(4);
        let after = ALL_OPCODES[15 - opcode]
            .apply(&before, a, b, c)
            .expect("operands are in range");
        samples.push(Sample {
            before,
            instruction: Instruction { opcode, a, b, c },
            after,
        });
    }
    samples
}

#[test]
fn test_deduce_opcodes() {
    let opcodes = deduce_opcodes(&synthetic_samples()).expect("samples suffice");
    assert_eq!(opcodes.len(), 16);
    for (number, op) in opcodes.iter() {
        assert_eq!(*op, ALL_OPCODES[15 - number]);
    }

    let program = [
        Instruction { opcode: 15 - 9, a: 6, b: 0, c: 0 },  // seti 6 _ 0
        Instruction { opcode: 15 - 3, a: 0, b: 7, c: 1 },  // muli 0 7 1
        Instruction { opcode: 15 - 0, a: 0, b: 1, c: 0 },  // addr 0 1 0
    ];
    assert_eq!(execute(&program, &opcodes), Ok([48, 42, 0, 0]));
}

#[test]
fn test_two_numbers_for_one_opcode() {
    // Only addr turns [3, 2, 1, 1] into [5, 2, 1, 1] with operands 0 1 0.
    let (samples, _) = parse(concat!(
        "Before: [3, 2, 1, 1]\n0 0 1 0\nAfter:  [5, 2, 1, 1]\n\n",
        "Before: [3, 2, 1, 1]\n1 0 1 0\nAfter:  [5, 2, 1, 1]\n",
    ))
    .expect("valid samples");
    let matching: Vec<Opcode> = samples[0].matching_opcodes().into_iter().collect();
    assert_eq!(matching, vec![Opcode::Addr]);
    assert!(deduce_opcodes(&samples).is_err());
}

#[test]
fn test_undeducible() {
    let (samples, _) =
        parse("Before: [3, 2, 1, 1]\n9 2 1 2\nAfter:  [3, 2, 2, 1]\n").expect("valid sample");
    assert!(deduce_opcodes(&samples).is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let (samples, program) = parse(&input)?;
    event!(
        Level::INFO,
        "{} samples, {} program instructions",
        samples.len(),
        program.len()
    );

    println!("Day 16 part 1: {}", ambiguous_sample_count(&samples));
    let opcodes = deduce_opcodes(&samples)?;
    let regs = execute(&program, &opcodes)?;
    println!("Day 16 part 2: {}", regs[0]);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
