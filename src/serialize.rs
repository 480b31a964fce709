//! JSON snapshots of weight matrices.
//!
//! Matrices are stored as their shape plus the raw bit pattern of every
//! value, so a snapshot round-trips exactly (unlike the text weight format,
//! which keeps 8 decimal places).

use core::error::Error;
use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use std::{fs, path::Path};

#[derive(Serialize, Deserialize)]
struct MatrixBits {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

pub fn serialize_matrix<S: Serializer>(
    matrix: &Matrix<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    MatrixBits {
        rows: matrix.rows(),
        cols: matrix.cols(),
        bits: matrix.data().iter().map(|&f| f64::to_bits(f)).collect(),
    }
    .serialize(serializer)
}

pub fn deserialize_matrix<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Matrix<f64>, D::Error> {
    let MatrixBits { rows, cols, bits } = MatrixBits::deserialize(deserializer)?;
    if rows.checked_mul(cols) != Some(bits.len()) {
        return Err(serde::de::Error::custom(format!(
            "{rows}x{cols} matrix with {} values",
            bits.len()
        )));
    }
    let data: Vec<f64> = bits.into_iter().map(f64::from_bits).collect();
    Ok(Matrix::new(rows, cols, data))
}

/// Types that can be written as JSON to strings and files.
pub trait Save: Serialize {
    fn to_json(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string(self)?)
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Types that can be read back from JSON strings and files.
pub trait Load: DeserializeOwned {
    fn from_json(s: &str) -> Result<Self, Box<dyn Error>> {
        serde_json::from_str(s).map_err(|op| op.into())
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl<T: Serialize> Save for T {}

impl<T: DeserializeOwned> Load for T {}
