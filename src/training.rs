//! Training sequences: ordered (input, target) patterns grouped into trials.
//!
//! Text format, one sequence per `#` header line:
//!
//! ```text
//! # make coffee, sugar from packet
//! 0 1 0 ... 1 > 0 0 1 ... 0
//! 0 0 1 ... 1 > 1 0 0 ... 0
//! ```
//!
//! A pattern line holds `in_width` numbers, a `>` token, then `out_width`
//! numbers. A malformed line ends its sequence; the rest of that sequence's
//! lines are skipped.

use crate::error::TrainingDataError;
use core::fmt;
use rand::{seq::SliceRandom, RngCore};
use std::{fs, path::Path};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Pattern {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    /// Text of the `#` line that introduced this sequence
    pub label: String,
    pub patterns: Vec<Pattern>,
}

impl Sequence {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            patterns: Vec::new(),
        }
    }

    pub fn push(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub in_width: usize,
    pub out_width: usize,
    pub sequences: Vec<Sequence>,
}

impl TrainingSet {
    pub fn new(in_width: usize, out_width: usize) -> Self {
        Self {
            in_width,
            out_width,
            sequences: Vec::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(
        path: P,
        in_width: usize,
        out_width: usize,
    ) -> Result<Self, TrainingDataError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TrainingDataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text, in_width, out_width))
    }

    pub fn parse(text: &str, in_width: usize, out_width: usize) -> Self {
        let mut set = Self::new(in_width, out_width);
        // false while skipping the tail of a truncated sequence
        let mut open = false;

        for (n, line) in text.lines().enumerate() {
            if let Some(label) = line.strip_prefix('#') {
                set.sequences.push(Sequence::new(label.trim()));
                open = true;
                continue;
            }
            if !open || line.trim().is_empty() {
                continue;
            }
            match parse_pattern(line, in_width, out_width) {
                Some(pattern) => {
                    if let Some(seq) = set.sequences.last_mut() {
                        seq.push(pattern)
                    }
                }
                None => {
                    debug!("truncating sequence at malformed line {}", n + 1);
                    open = false;
                }
            }
        }
        set
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(path, self.to_string())
    }

    pub fn push(&mut self, sequence: Sequence) -> Result<(), TrainingDataError> {
        for p in sequence.iter() {
            if p.input.len() != self.in_width {
                return Err(TrainingDataError::WidthMismatch {
                    what: "input",
                    expected: self.in_width,
                    actual: p.input.len(),
                });
            }
            if p.target.len() != self.out_width {
                return Err(TrainingDataError::WidthMismatch {
                    what: "target",
                    expected: self.out_width,
                    actual: p.target.len(),
                });
            }
        }
        self.sequences.push(sequence);
        Ok(())
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Total patterns over every sequence
    pub fn pattern_count(&self) -> usize {
        self.sequences.iter().map(Sequence::len).sum()
    }

    /// Permute sequence order. Patterns inside a sequence keep their order.
    pub fn shuffle(&mut self, rng: &mut impl RngCore) {
        self.sequences.shuffle(rng);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }
}

fn parse_pattern(line: &str, in_width: usize, out_width: usize) -> Option<Pattern> {
    let mut tokens = line.split_whitespace();
    let input = tokens
        .by_ref()
        .take(in_width)
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if input.len() != in_width || tokens.next() != Some(">") {
        return None;
    }
    let target = tokens
        .by_ref()
        .take(out_width)
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if target.len() != out_width {
        return None;
    }
    Some(Pattern::new(input, target))
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for TrainingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seq in self.iter() {
            writeln!(f, "# {}", seq.label)?;
            for p in seq.iter() {
                write_values(f, &p.input)?;
                f.write_str(" > ")?;
                write_values(f, &p.target)?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
