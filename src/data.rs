use crate::constants::MISSING_TOKENS;
use crate::errors::CancelGuardError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value of the booking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw CSV field. Empty fields and the usual null tokens
    /// are missing, anything that parses as a float is a number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Missing,
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Cell::Missing
        } else {
            Cell::Number(v)
        }
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::parse(v)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, ""),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Contiguous Column Major Matrix data container.
///
/// Holds the numeric training features in a single borrowed block, one
/// column after another, so a feature can be scanned as a slice.
pub struct Matrix<'a, T> {
    /// The raw data stored in a single slice.
    pub data: &'a [T],
    /// Indices into the data row-wise.
    pub index: Vec<usize>,
    /// Number of rows in the matrix.
    pub rows: usize,
    /// Number of columns in the matrix.
    pub cols: usize,
}

impl<'a, T> Matrix<'a, T> {
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        Matrix {
            data,
            index: (0..rows).collect(),
            rows,
            cols,
        }
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[j * self.rows + i]
    }

    /// Get an entire column in the matrix.
    ///
    /// * `col` - The index of the column to get.
    pub fn get_col(&self, col: usize) -> &[T] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }
}

impl<'a, T> Matrix<'a, T>
where
    T: Copy,
{
    /// Get a row of the data as a vector.
    pub fn get_row(&self, row: usize) -> Vec<T> {
        (0..self.cols).map(|j| *self.get(row, j)).collect()
    }
}

/// A named column of the booking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

/// Column major, in-memory booking table.
///
/// Columns keep the order of the source header. Every column holds
/// exactly `rows` cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingTable {
    columns: Vec<Column>,
    rows: usize,
}

impl BookingTable {
    /// Build a table from a header and row major records.
    ///
    /// * `headers` - Column names, in order.
    /// * `records` - Rows, each one with exactly `headers.len()` cells.
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<Cell>>) -> Result<Self, CancelGuardError> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(records.len()),
            })
            .collect();
        let rows = records.len();
        for (i, record) in records.into_iter().enumerate() {
            if record.len() != columns.len() {
                return Err(CancelGuardError::MalformedCsv(format!(
                    "record {} has {} fields, expected {}",
                    i,
                    record.len(),
                    columns.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(record) {
                column.values.push(cell);
            }
        }
        Ok(BookingTable { columns, rows })
    }

    /// Build a table of numeric columns, NaN values become missing cells.
    pub fn from_numeric_columns(columns: &[(&str, Vec<f64>)]) -> Result<Self, CancelGuardError> {
        let mut table = BookingTable::default();
        for (name, values) in columns {
            table.push_column(name, values.iter().map(|v| Cell::from(*v)).collect())?;
        }
        Ok(table)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get an entire column by name.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.values.as_slice())
    }

    /// Get a single cell.
    ///
    /// * `row` - The index of the row.
    /// * `name` - The name of the column.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        self.column(name).and_then(|c| c.get(row))
    }

    /// Read a column as numbers, text cells are an error.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, CancelGuardError> {
        let column = self
            .column(name)
            .ok_or_else(|| CancelGuardError::MissingColumns(vec![name.to_string()]))?;
        column
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                Cell::Missing => Ok(None),
                Cell::Number(v) => Ok(Some(*v)),
                Cell::Text(s) => Err(CancelGuardError::MalformedData {
                    row,
                    column: name.to_string(),
                    value: s.clone(),
                }),
            })
            .collect()
    }

    /// Append a column. The first column sets the number of rows.
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) -> Result<(), CancelGuardError> {
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(CancelGuardError::MalformedCsv(format!(
                "column {} has {} values, expected {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.columns.push(Column {
            name: name.to_string(),
            values,
        });
        Ok(())
    }

    /// Derive a column as the sum of two numeric columns. A missing or
    /// non-numeric addend makes the derived cell missing.
    ///
    /// Returns `false` without touching the table when `name` already
    /// exists or either addend column is absent.
    pub fn derive_sum(&mut self, name: &str, first: &str, second: &str) -> bool {
        if self.has_column(name) {
            return false;
        }
        let values: Vec<Cell> = match (self.column(first), self.column(second)) {
            (Some(a), Some(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => Cell::Number(x + y),
                    _ => Cell::Missing,
                })
                .collect(),
            _ => return false,
        };
        self.columns.push(Column {
            name: name.to_string(),
            values,
        });
        true
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: Fn(&[&Cell]) -> bool,
    {
        let mask: Vec<bool> = (0..self.rows)
            .map(|i| {
                let row: Vec<&Cell> = self.columns.iter().map(|c| &c.values[i]).collect();
                keep(&row)
            })
            .collect();
        for column in self.columns.iter_mut() {
            let mut it = mask.iter();
            column.values.retain(|_| *it.next().unwrap_or(&false));
        }
        self.rows = mask.iter().filter(|m| **m).count();
    }
}
