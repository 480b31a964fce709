//! Plain-text weight files.
//!
//! ```text
//! % 39I > 50H
//! <40 rows of 50 tab-separated values>
//!
//! % 50H > 50H
//! <50 rows of 50 values>
//!
//! % 50H > 19O
//! <51 rows of 19 values>
//! ```
//!
//! Lines starting with `%` that are not followed by a digit are comments.
//! Values are written with 8 decimal places, so a dump is not bit-exact; use
//! the JSON snapshot of [Weights] for that.

use super::{Network, Weights};
use crate::error::{Stage, WeightsError};
use rulinalg::matrix::{BaseMatrix, Matrix};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Lines, Write},
    path::Path,
};
use tracing::debug;

fn write_matrix<W: Write>(
    writer: &mut W,
    header: String,
    matrix: &Matrix<f64>,
) -> io::Result<()> {
    writeln!(writer, "% {header}")?;
    for row in matrix.data().chunks(matrix.cols()) {
        let cells: Vec<String> = row.iter().map(|w| format!("{w:+10.8}")).collect();
        writeln!(writer, "{}", cells.join("\t"))?;
    }
    writeln!(writer)
}

fn next_line<R: BufRead>(lines: &mut Lines<R>) -> io::Result<Option<String>> {
    lines.next().transpose()
}

/// Parse `<n><from> > <m><to>`
fn parse_header(text: &str, from: char, to: char) -> Option<(usize, usize)> {
    let (left, right) = text.split_once('>')?;
    let rows = left.trim().strip_suffix(from)?.parse().ok()?;
    let cols = right.trim().strip_suffix(to)?.parse().ok()?;
    Some((rows, cols))
}

fn read_header<R: BufRead>(
    lines: &mut Lines<R>,
    stage: Stage,
    from: char,
    to: char,
) -> Result<(usize, usize), WeightsError> {
    loop {
        let line = next_line(lines)?.ok_or(WeightsError::Header { stage })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix('%') else {
            return Err(WeightsError::Header { stage });
        };
        let rest = rest.trim_start();
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            debug!(comment = rest, "skipping weight file comment");
            continue;
        }
        return match parse_header(rest, from, to) {
            Some((rows, cols)) if rows > 0 && cols > 0 => Ok((rows, cols)),
            _ => Err(WeightsError::Header { stage }),
        };
    }
}

fn read_matrix<R: BufRead>(
    lines: &mut Lines<R>,
    stage: Stage,
    rows: usize,
    cols: usize,
) -> Result<Matrix<f64>, WeightsError> {
    let alloc = WeightsError::Alloc { stage, rows, cols };
    let len = rows.checked_mul(cols).ok_or(alloc)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| WeightsError::Alloc { stage, rows, cols })?;

    for row in 0..rows {
        let line = next_line(lines)?.ok_or(WeightsError::Read { stage, row })?;
        let start = data.len();
        for cell in line.split_whitespace() {
            let value = cell.parse().map_err(|_| WeightsError::Read { stage, row })?;
            data.push(value);
        }
        if data.len() - start != cols {
            return Err(WeightsError::Read { stage, row });
        }
    }
    Ok(Matrix::new(rows, cols, data))
}

impl Network {
    pub fn dump_weights<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let (i, h, o) = self.dimensions();
        write_matrix(&mut writer, format!("{i}I > {h}H"), &self.weights.ih)?;
        write_matrix(&mut writer, format!("{h}H > {h}H"), &self.weights.hh)?;
        write_matrix(&mut writer, format!("{h}H > {o}O"), &self.weights.ho)?;
        writer.flush()
    }

    /// Replace the weights with those read from `reader`. When the file's
    /// dimensions differ from the network's, every buffer is rebuilt to the new
    /// shape. On error the network is left as it was.
    pub fn restore_weights<R: BufRead>(&mut self, reader: R) -> Result<(), WeightsError> {
        let mut lines = reader.lines();

        let (in_width, hidden_width) = read_header(&mut lines, Stage::InputHidden, 'I', 'H')?;
        let ih = read_matrix(&mut lines, Stage::InputHidden, in_width + 1, hidden_width)?;

        let stage = Stage::HiddenHidden;
        let (rows, cols) = read_header(&mut lines, stage, 'H', 'H')?;
        if rows != hidden_width || cols != hidden_width {
            return Err(WeightsError::Header { stage });
        }
        let hh = read_matrix(&mut lines, stage, hidden_width, hidden_width)?;

        let stage = Stage::HiddenOutput;
        let (rows, out_width) = read_header(&mut lines, stage, 'H', 'O')?;
        if rows != hidden_width {
            return Err(WeightsError::Header { stage });
        }
        let ho = read_matrix(&mut lines, stage, hidden_width + 1, out_width)?;

        let weights = Weights { ih, hh, ho };
        if self.dimensions() == (in_width, hidden_width, out_width) {
            self.weights = weights;
            self.clear_deltas();
        } else {
            debug!(
                from = ?self.dimensions(),
                to = ?(in_width, hidden_width, out_width),
                "reshaping network to restored weights"
            );
            *self = Network::from_parts(weights);
        }
        Ok(())
    }

    pub fn save_weights<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.dump_weights(BufWriter::new(File::create(path)?))
    }

    pub fn load_weights<P: AsRef<Path>>(&mut self, path: P) -> Result<(), WeightsError> {
        self.restore_weights(BufReader::new(File::open(path)?))
    }
}
