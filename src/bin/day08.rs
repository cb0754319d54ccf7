use nom::{
    character::complete::{digit1, multispace0},
    combinator::map_res,
    multi::count,
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{event, Level};

#[derive(Debug, PartialEq, Eq)]
struct Node {
    children: Vec<Node>,
    metadata: Vec<usize>,
}

impl Node {
    fn metadata_sum(&self) -> usize {
        self.metadata.iter().sum::<usize>()
            + self
                .children
                .iter()
                .map(|child| child.metadata_sum())
                .sum::<usize>()
    }

    fn value(&self) -> usize {
        if self.children.is_empty() {
            self.metadata.iter().sum()
        } else {
            // Metadata entries are 1-based child references; entries
            // that refer to no child are skipped.
            self.metadata
                .iter()
                .filter_map(|entry| entry.checked_sub(1))
                .filter_map(|i| self.children.get(i))
                .map(|child| child.value())
                .sum()
        }
    }

    fn size(&self) -> usize {
        1 + self.children.iter().map(|child| child.size()).sum::<usize>()
    }
}

fn number(input: &str) -> IResult<&str, usize> {
    preceded(multispace0, map_res(digit1, |s: &str| s.parse::<usize>()))(input)
}

fn node(input: &str) -> IResult<&str, Node> {
    let (input, (child_count, metadata_count)) = tuple((number, number))(input)?;
    let (input, children) = count(node, child_count)(input)?;
    let (input, metadata) = count(number, metadata_count)(input)?;
    Ok((input, Node { children, metadata }))
}

impl TryFrom<&str> for Node {
    type Error = String;
    fn try_from(s: &str) -> Result<Node, String> {
        match node(s) {
            Ok((unparsed, root)) => {
                if unparsed.trim().is_empty() {
                    Ok(root)
                } else {
                    Err(format!("unexpected trailing junk: '{}'", unparsed.trim()))
                }
            }
            Err(e) => Err(format!("failed to parse tree: {}", e)),
        }
    }
}

#[cfg(test)]
const EXAMPLE: &str = "2 3 0 3 10 11 12 1 1 0 1 99 2 1 1 2\n";

#[test]
fn test_parse_tree() {
    let root = Node::try_from(EXAMPLE).expect("valid example");
    assert_eq!(root.size(), 4);
    assert_eq!(root.metadata, vec![1, 1, 2]);
    assert_eq!(
        root.children[1].children[0],
        Node {
            children: vec![],
            metadata: vec![99]
        }
    );
}

#[test]
fn test_metadata_sum() {
    let root = Node::try_from(EXAMPLE).expect("valid example");
    assert_eq!(root.metadata_sum(), 138);
}

#[test]
fn test_value() {
    let root = Node::try_from(EXAMPLE).expect("valid example");
    assert_eq!(root.value(), 66);
    // Node C refers to child 2, which it does not have.
    assert_eq!(root.children[1].value(), 0);
    // A zero entry refers to no child either.
    assert_eq!(Node::try_from("1 1 0 1 7 0").map(|n| n.value()), Ok(0));
}

#[test]
fn test_malformed_tree() {
    assert!(Node::try_from("2 3 0 3 10 11").is_err());
    assert!(Node::try_from("0 1 5 6").is_err());
    assert!(Node::try_from("").is_err());
}

fn run() -> Result<(), String> {
    aoc2018::init_tracing("info")?;
    let input = aoc2018::read_input()?;
    let root = Node::try_from(input.as_str())?;
    event!(Level::INFO, "the tree has {} nodes", root.size());

    println!("Day 08 part 1: {}", root.metadata_sum());
    println!("Day 08 part 2: {}", root.value());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
