//! Strings that match a JSON Schema `pattern`.
//!
//! Patterns are parsed into a small AST covering literals, classes, `.`,
//! groups, alternation and quantifiers, and a random walk of the AST produces
//! a candidate. Every candidate is confirmed with `regress`, an ECMAScript
//! regex engine, because JSON Schema patterns use ECMA 262 syntax.
//! Lookaround and backreferences are not supported.

use crate::error::FabricationError;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Candidates tried before giving up on a pattern.
const ATTEMPTS: usize = 64;

/// Repetitions added above the minimum for open quantifiers (`*`, `+`, `{n,}`).
const OPEN_REPEAT: u32 = 3;

/// Largest `{n}` accepted in a quantifier.
const REPEAT_LIMIT: u32 = 1000;

const WORD_RANGES: &[(char, char)] = &[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')];
const DIGIT_RANGES: &[(char, char)] = &[('0', '9')];
const SPACE_RANGES: &[(char, char)] = &[(' ', ' '), ('\t', '\t'), ('\n', '\n')];

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(char),
    Class { ranges: Vec<(char, char)>, negated: bool },
    Any,
    Group(Vec<Vec<Node>>),
    Repeat { node: Box<Node>, min: u32, max: Option<u32> },
    Empty,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn parse(pattern: &str) -> Result<Vec<Vec<Node>>, String> {
        let mut parser = Self {
            chars: pattern.chars().collect(),
            pos: 0,
        };
        let alternatives: Vec<Vec<Node>> = parser.alternation()?;
        if parser.pos < parser.chars.len() {
            return Err(format!("unbalanced `)` at offset {}", parser.pos));
        }
        Ok(alternatives)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c: Option<char> = self.peek();
        self.pos += 1;
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn alternation(&mut self) -> Result<Vec<Vec<Node>>, String> {
        let mut alternatives: Vec<Vec<Node>> = vec![self.sequence()?];
        while self.eat('|') {
            alternatives.push(self.sequence()?);
        }
        Ok(alternatives)
    }

    fn sequence(&mut self) -> Result<Vec<Node>, String> {
        let mut nodes: Vec<Node> = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom: Node = self.atom()?;
            nodes.push(self.quantified(atom)?);
        }
        Ok(nodes)
    }

    fn atom(&mut self) -> Result<Node, String> {
        let Some(c) = self.bump() else {
            return Err("unexpected end of pattern".to_string());
        };
        match c {
            '^' | '$' => Ok(Node::Empty),
            '.' => Ok(Node::Any),
            '(' => {
                if self.eat('?') && !self.eat(':') {
                    return Err("lookaround and named groups are not supported".to_string());
                }
                let alternatives: Vec<Vec<Node>> = self.alternation()?;
                if !self.eat(')') {
                    return Err("unterminated group".to_string());
                }
                Ok(Node::Group(alternatives))
            }
            '[' => self.class(),
            '\\' => self.escape(false),
            '*' | '+' | '?' => Err(format!("nothing to repeat before `{c}`")),
            other => Ok(Node::Literal(other)),
        }
    }

    fn quantified(&mut self, atom: Node) -> Result<Node, String> {
        let (min, max) = match self.peek() {
            Some('{') => match self.braces() {
                Some(bounds) => bounds,
                None => return Ok(atom),
            },
            Some(c @ ('*' | '+' | '?')) => {
                self.pos += 1;
                match c {
                    '*' => (0, None),
                    '+' => (1, None),
                    _ => (0, Some(1)),
                }
            }
            _ => return Ok(atom),
        };
        if let Some(max) = max
            && min > max
        {
            return Err(format!("quantifier {{{min},{max}}} is out of order"));
        }
        if min > REPEAT_LIMIT {
            return Err(format!("quantifier minimum {min} is above the supported {REPEAT_LIMIT}"));
        }
        // Lazy quantifiers generate the same strings.
        self.eat('?');
        Ok(Node::Repeat {
            node: Box::new(atom),
            min,
            max,
        })
    }

    /// Parses `{n}`, `{n,}` or `{n,m}` at the cursor, consuming it on success.
    /// Anything else leaves the cursor alone so `{` reads as a literal.
    fn braces(&mut self) -> Option<(u32, Option<u32>)> {
        let rest: String = self.chars[self.pos..].iter().collect();
        let close: usize = rest.find('}')?;
        let body: &str = &rest[1..close];
        let bounds: (u32, Option<u32>) = match body.split_once(',') {
            None => {
                let n: u32 = body.parse().ok()?;
                (n, Some(n))
            }
            Some((low, "")) => (low.parse().ok()?, None),
            Some((low, high)) => (low.parse().ok()?, Some(high.parse().ok()?)),
        };
        self.pos += rest[..=close].chars().count();
        Some(bounds)
    }

    fn escape(&mut self, in_class: bool) -> Result<Node, String> {
        let Some(c) = self.bump() else {
            return Err("pattern ends with `\\`".to_string());
        };
        let class = |ranges: &[(char, char)], negated: bool| Node::Class {
            ranges: ranges.to_vec(),
            negated,
        };
        let node: Node = match c {
            'd' => class(DIGIT_RANGES, false),
            'D' => class(DIGIT_RANGES, true),
            'w' => class(WORD_RANGES, false),
            'W' => class(WORD_RANGES, true),
            's' => class(SPACE_RANGES, false),
            'S' => class(SPACE_RANGES, true),
            'b' if in_class => Node::Literal('\u{8}'),
            'b' | 'B' => Node::Empty,
            'n' => Node::Literal('\n'),
            't' => Node::Literal('\t'),
            'r' => Node::Literal('\r'),
            'f' => Node::Literal('\u{c}'),
            'v' => Node::Literal('\u{b}'),
            '0' => Node::Literal('\0'),
            'x' => Node::Literal(self.hex(2)?),
            'u' => Node::Literal(self.hex(4)?),
            '1'..='9' => return Err("backreferences are not supported".to_string()),
            other => Node::Literal(other),
        };
        Ok(node)
    }

    fn hex(&mut self, digits: usize) -> Result<char, String> {
        let end: usize = self.pos + digits;
        let text: String = self
            .chars
            .get(self.pos..end)
            .ok_or("truncated hex escape")?
            .iter()
            .collect();
        self.pos = end;
        u32::from_str_radix(&text, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| format!("invalid hex escape `{text}`"))
    }

    fn class(&mut self) -> Result<Node, String> {
        let negated: bool = self.eat('^');
        let mut ranges: Vec<(char, char)> = Vec::new();
        loop {
            let start: char = match self.bump() {
                None => return Err("unterminated character class".to_string()),
                Some(']') => break,
                Some('\\') => match self.escape(true)? {
                    Node::Literal(c) => c,
                    Node::Class {
                        ranges: shorthand,
                        negated: false,
                    } => {
                        ranges.extend(shorthand);
                        continue;
                    }
                    _ => return Err("negated shorthand inside a class is not supported".to_string()),
                },
                Some(c) => c,
            };
            let is_range: bool = self.peek() == Some('-')
                && self.chars.get(self.pos + 1).is_some_and(|next| *next != ']');
            if !is_range {
                ranges.push((start, start));
                continue;
            }
            self.pos += 1;
            let end: char = match self.bump() {
                Some('\\') => match self.escape(true)? {
                    Node::Literal(c) => c,
                    _ => return Err("class shorthand cannot end a range".to_string()),
                },
                Some(c) => c,
                None => return Err("unterminated character class".to_string()),
            };
            if start > end {
                return Err(format!("range `{start}-{end}` is out of order"));
            }
            ranges.push((start, end));
        }
        Ok(Node::Class { ranges, negated })
    }
}

fn random_in_range(rng: &mut StdRng, (low, high): (char, char)) -> char {
    let code: u32 = rng.gen_range(u32::from(low)..=u32::from(high));
    char::from_u32(code).unwrap_or(low)
}

fn emit(rng: &mut StdRng, node: &Node, out: &mut String) -> Result<(), String> {
    match node {
        Node::Literal(c) => out.push(*c),
        Node::Empty => {}
        Node::Any => {
            let range: (char, char) = *WORD_RANGES.choose(rng).unwrap_or(&('a', 'z'));
            out.push(random_in_range(rng, range));
        }
        Node::Class {
            ranges,
            negated: false,
        } => {
            let range: (char, char) = *ranges.choose(rng).ok_or("empty character class")?;
            out.push(random_in_range(rng, range));
        }
        Node::Class {
            ranges,
            negated: true,
        } => {
            let allowed: Vec<char> = (' '..='~')
                .filter(|c| !ranges.iter().any(|(low, high)| (low..=high).contains(&c)))
                .collect();
            out.push(*allowed.choose(rng).ok_or("negated class excludes every printable character")?);
        }
        Node::Group(alternatives) => {
            if let Some(sequence) = alternatives.choose(rng) {
                for child in sequence {
                    emit(rng, child, out)?;
                }
            }
        }
        Node::Repeat { node, min, max } => {
            let upper: u32 = max
                .unwrap_or(u32::MAX)
                .min(min.saturating_add(OPEN_REPEAT));
            for _ in 0..rng.gen_range(*min..=upper) {
                emit(rng, node, out)?;
            }
        }
    }
    Ok(())
}

/// Whether `text` contains a match of `pattern` (JSON Schema patterns are unanchored).
///
/// # Errors
///
/// Returns `FabricationError` if `pattern` is not a valid ECMAScript regex.
pub(super) fn is_match(pattern: &str, text: &str, path: &str) -> Result<bool, FabricationError> {
    let regex = regress::Regex::new(pattern)
        .map_err(|e| FabricationError::new(path, format!("invalid pattern `{pattern}`: {e}")))?;
    Ok(regex.find(text).is_some())
}

/// Produces a string matching `pattern` whose length lies within the bounds.
///
/// # Errors
///
/// Returns `FabricationError` if the pattern is invalid, uses unsupported
/// syntax, or no candidate both matches and fits the bounds.
pub(super) fn fabricate_matching(
    rng: &mut StdRng,
    pattern: &str,
    min_length: usize,
    max_length: Option<usize>,
    path: &str,
) -> Result<String, FabricationError> {
    let regex = regress::Regex::new(pattern)
        .map_err(|e| FabricationError::new(path, format!("invalid pattern `{pattern}`: {e}")))?;
    let tree: Vec<Vec<Node>> = Parser::parse(pattern)
        .map_err(|e| FabricationError::new(path, format!("unsupported pattern `{pattern}`: {e}")))?;
    let root = Node::Group(tree);

    for _ in 0..ATTEMPTS {
        let mut candidate: String = String::new();
        emit(rng, &root, &mut candidate)
            .map_err(|e| FabricationError::new(path, format!("pattern `{pattern}`: {e}")))?;
        let length: usize = candidate.chars().count();
        let fits: bool = length >= min_length && max_length.is_none_or(|max| length <= max);
        if fits && regex.find(&candidate).is_some() {
            return Ok(candidate);
        }
    }
    Err(FabricationError::new(
        path,
        format!("no string matching `{pattern}` found within the length bounds"),
    ))
}
