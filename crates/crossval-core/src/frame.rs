use std::path::Path;

use crate::error::{EvalError, EvalResult};

/// An immutable column-oriented numeric table.
///
/// The engine never copies rows out of a `Frame`: partitions are plain
/// index sets over `[0, n_rows)`, and model/metric collaborators receive a
/// shared `&Frame` together with the row indices they should read.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Frame {
    /// Build a frame from named columns. All columns must have equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> EvalResult<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        let mut n_rows = None;

        for (name, col) in columns {
            let name = name.into();
            match n_rows {
                None => n_rows = Some(col.len()),
                Some(expected) if expected != col.len() => {
                    return Err(EvalError::ColumnLengthMismatch {
                        name,
                        expected,
                        got: col.len(),
                    });
                }
                Some(_) => {}
            }
            names.push(name);
            data.push(col);
        }

        Ok(Frame {
            names,
            columns: data,
        })
    }

    /// Read a CSV file with a header row into a frame.
    /// Fields that fail to parse as numbers become `NaN`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())?;
        let names: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

        for record in rdr.records() {
            let record = record?;
            for (j, field) in record.iter().enumerate() {
                if j < columns.len() {
                    columns[j].push(field.trim().parse().unwrap_or(f64::NAN));
                }
            }
        }

        Ok(Frame { names, columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> EvalResult<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| EvalError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Column by position.
    pub fn column_at(&self, idx: usize) -> Option<&[f64]> {
        self.columns.get(idx).map(|c| c.as_slice())
    }
}
