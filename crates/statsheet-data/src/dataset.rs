use crate::normalize::{format_label, is_missing, normalize_headers, parse_number};
use statsheet_core::{AppError, AppResult};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Types a raw text column: numeric only when every present cell parses.
    pub fn infer(name: impl Into<String>, cells: &[String]) -> Self {
        let present: Vec<Option<&str>> = cells
            .iter()
            .map(|cell| {
                if is_missing(cell) {
                    None
                } else {
                    Some(cell.trim())
                }
            })
            .collect();

        let any_present = present.iter().any(Option::is_some);
        let numbers: Option<Vec<Option<f64>>> = present
            .iter()
            .map(|cell| match cell {
                None => Some(None),
                Some(text) => parse_number(text).map(Some),
            })
            .collect();

        match numbers {
            Some(values) if any_present => Self::numeric(name, values),
            _ => Self::categorical(
                name,
                present
                    .into_iter()
                    .map(|cell| cell.map(str::to_string))
                    .collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn valid_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().flatten().count(),
            ColumnData::Categorical(values) => values.iter().flatten().count(),
        }
    }

    /// Cell values as group labels; numeric codes become their decimal text.
    pub fn labels(&self) -> Vec<Option<String>> {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().map(|v| v.map(format_label)).collect(),
            ColumnData::Categorical(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> AppResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut names = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(AppError::internal(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    column.name(),
                    column.len()
                )));
            }
            if !names.insert(column.name()) {
                return Err(AppError::internal(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a dataset from a header row and text rows. Short rows are padded
    /// as missing and extra cells are dropped.
    pub fn from_text_rows(headers: &[String], rows: &[Vec<String>]) -> AppResult<Self> {
        if headers.is_empty() {
            return Err(AppError::load("no header row found"));
        }
        if rows.is_empty() {
            return Err(AppError::load("no data rows found"));
        }

        let names = normalize_headers(headers);
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<String> = rows
                    .iter()
                    .map(|row| row.get(idx).cloned().unwrap_or_default())
                    .collect();
                Column::infer(name, &cells)
            })
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> AppResult<&Column> {
        self.columns
            .iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "column '{name}' not found; available columns: {}",
                    self.column_names().join(", ")
                ))
            })
    }

    pub fn numeric(&self, name: &str) -> AppResult<&[Option<f64>]> {
        match self.column(name)?.data() {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(AppError::validation(format!(
                "column '{name}' is not numeric"
            ))),
        }
    }

    pub fn labels(&self, name: &str) -> AppResult<Vec<Option<String>>> {
        Ok(self.column(name)?.labels())
    }
}
