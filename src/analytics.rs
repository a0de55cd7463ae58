use std::fs;
use std::path::Path;

use crate::error::AppError;

pub const DATE_COLUMN: &str = "Date";
pub const BLOOD_PRESSURE_COLUMN: &str = "BloodPressure";

#[derive(Debug, Clone, PartialEq)]
pub struct PatientData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PatientData {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Analytics(format!("{}: {}", path.display(), e)))?;
        let data = Self::parse(&content)?;
        tracing::info!(path = %path.display(), rows = data.rows.len(), "loaded patient data");
        Ok(data)
    }

    pub fn parse(content: &str) -> Result<Self, AppError> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| AppError::Analytics("file is empty".to_string()))?;
        let headers = split_record(header_line, 1)?;

        let mut rows = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            let fields = split_record(line, line_no)?;
            if fields.len() != headers.len() {
                return Err(AppError::Analytics(format!(
                    "line {}: expected {} fields, found {}",
                    line_no,
                    headers.len(),
                    fields.len()
                )));
            }
            rows.push(fields);
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn series(&self, x_column: &str, y_column: &str) -> Result<Vec<(String, f64)>, AppError> {
        let x = self
            .column_index(x_column)
            .ok_or_else(|| AppError::Analytics(format!("missing column '{x_column}'")))?;
        let y = self
            .column_index(y_column)
            .ok_or_else(|| AppError::Analytics(format!("missing column '{y_column}'")))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let value = row[y].parse::<f64>().map_err(|_| {
                    AppError::Analytics(format!(
                        "row {}: '{}' in column '{}' is not a number",
                        i + 1,
                        row[y],
                        y_column
                    ))
                })?;
                Ok((row[x].clone(), value))
            })
            .collect()
    }
}

// `""` inside a quoted field is a literal quote.
fn split_record(line: &str, line_no: usize) -> Result<Vec<String>, AppError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(AppError::Analytics(format!("line {line_no}: unterminated quote")));
    }
    fields.push(current.trim().to_string());
    Ok(fields)
}
