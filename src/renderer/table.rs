use crate::analytics::PatientData;

const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Debug)]
pub struct TableCell {
    pub content: String,
    pub alignment: Alignment,
}

#[derive(Debug)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug)]
pub struct Table {
    headers: TableRow,
    rows: Vec<TableRow>,
    column_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: Vec<(String, Alignment)>) -> Self {
        let header_row = TableRow {
            cells: headers
                .into_iter()
                .map(|(content, alignment)| TableCell { content, alignment })
                .collect(),
        };
        let num_columns = header_row.cells.len();
        Table {
            headers: header_row,
            rows: Vec::new(),
            column_widths: vec![0; num_columns],
        }
    }

    /// Numeric columns are right aligned, everything else left aligned.
    pub fn from_patient_data(data: &PatientData) -> Self {
        let headers = data
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let numeric = !data.rows.is_empty()
                    && data.rows.iter().all(|row| row[i].parse::<f64>().is_ok());
                let alignment = if numeric { Alignment::Right } else { Alignment::Left };
                (name.clone(), alignment)
            })
            .collect();

        let mut table = Table::new(headers);
        for row in &data.rows {
            table.add_row(row.clone());
        }
        table
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        let row = TableRow {
            cells: cells
                .into_iter()
                .enumerate()
                .map(|(i, content)| {
                    let alignment = self
                        .headers
                        .cells
                        .get(i)
                        .map(|header| header.alignment)
                        .unwrap_or(Alignment::Left);
                    TableCell { content, alignment }
                })
                .collect(),
        };
        self.rows.push(row);
    }

    pub fn column_widths(&self) -> &[usize] {
        &self.column_widths
    }

    /// Fits columns to their content, shrinking proportionally to stay within `max_width`.
    pub fn calculate_column_widths(&mut self, max_width: usize) {
        let num_columns = self.headers.cells.len();
        if num_columns == 0 {
            return;
        }
        let borders = 1 + num_columns + 1;
        let padding = 2 * num_columns;
        let indent = 2;
        let available_width = max_width.saturating_sub(borders + padding + indent);

        self.column_widths = vec![MIN_COLUMN_WIDTH; num_columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.cells.iter().enumerate().take(num_columns) {
                let content_width = cell.content.chars().count();
                self.column_widths[i] = self.column_widths[i].max(content_width);
            }
        }

        let total: usize = self.column_widths.iter().sum();
        if total > available_width {
            let scale = available_width as f64 / total as f64;
            for width in self.column_widths.iter_mut() {
                *width = ((*width as f64 * scale) as usize).max(MIN_COLUMN_WIDTH);
            }
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.border('┌', '┬', '┐'));
        self.render_row(&mut output, &self.headers);
        output.push_str(&self.border('├', '┼', '┤'));
        for row in &self.rows {
            self.render_row(&mut output, row);
        }
        output.push_str(&self.border('└', '┴', '┘'));

        output
    }

    fn border(&self, left: char, join: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|&width| "─".repeat(width + 2))
            .collect();
        format!("  {}{}{}\n", left, segments.join(join.to_string().as_str()), right)
    }

    fn render_row(&self, output: &mut String, row: &TableRow) {
        output.push_str("  │ ");
        for (i, &width) in self.column_widths.iter().enumerate() {
            let (content, alignment) = match row.cells.get(i) {
                Some(cell) => (fit(&cell.content, width), cell.alignment),
                None => (String::new(), Alignment::Left),
            };
            let formatted = match alignment {
                Alignment::Left => format!("{:<width$}", content, width = width),
                Alignment::Right => format!("{:>width$}", content, width = width),
            };
            output.push_str(&formatted);
            if i < self.column_widths.len() - 1 {
                output.push_str(" │ ");
            }
        }
        output.push_str(" │\n");
    }
}

fn fit(content: &str, width: usize) -> String {
    if content.chars().count() <= width {
        return content.to_string();
    }
    let mut truncated: String = content.chars().take(width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
