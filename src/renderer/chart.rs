const DEFAULT_HEIGHT: usize = 8;
const MAX_POINT_SPACING: usize = 6;

#[derive(Debug)]
pub struct LineChart {
    title: String,
    points: Vec<(String, f64)>,
    height: usize,
}

impl LineChart {
    pub fn new(title: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        Self {
            title: title.into(),
            points,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn render(&self, max_width: usize) -> String {
        let mut output = format!("  {}\n", self.title);
        if self.points.is_empty() {
            output.push_str("  (no data)\n");
            return output;
        }

        let min = self.points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let max_label = format_value(max);
        let min_label = format_value(min);
        let label_width = max_label.chars().count().max(min_label.chars().count());

        let n = self.points.len();
        let plot_width = max_width.saturating_sub(label_width + 5);
        let spacing = (plot_width / n).clamp(1, MAX_POINT_SPACING);
        let columns = (n - 1) * spacing + 1;

        let mut grid = vec![vec![' '; columns]; self.height];
        let mut previous: Option<usize> = None;
        for (i, (_, value)) in self.points.iter().enumerate() {
            let level = if range == 0.0 {
                self.height / 2
            } else {
                ((value - min) / range * (self.height - 1) as f64).round() as usize
            };
            let col = i * spacing;

            if let Some(prev) = previous {
                let (lo, hi) = (prev.min(level), prev.max(level));
                for k in lo + 1..hi {
                    grid[self.height - 1 - k][col] = '│';
                }
                for c in (col + 1 - spacing)..col {
                    if grid[self.height - 1 - prev][c] == ' ' {
                        grid[self.height - 1 - prev][c] = '─';
                    }
                }
            }
            grid[self.height - 1 - level][col] = '●';
            previous = Some(level);
        }

        for (r, row) in grid.iter().enumerate() {
            let line: String = row.iter().collect();
            let (label, tick) = if r == 0 {
                (max_label.as_str(), '┤')
            } else if r == self.height - 1 {
                (min_label.as_str(), '┤')
            } else {
                ("", '│')
            };
            output.push_str(&format!(
                "  {:>width$} {}{}\n",
                label,
                tick,
                line.trim_end(),
                width = label_width
            ));
        }

        let pad = " ".repeat(label_width + 1);
        output.push_str(&format!("  {}└{}\n", pad, "─".repeat(columns)));
        output.push_str(&format!("  {} {}\n", pad, self.x_labels(columns).trim_end()));
        output
    }

    fn x_labels(&self, columns: usize) -> String {
        let first = &self.points[0].0;
        let last = &self.points[self.points.len() - 1].0;
        if self.points.len() == 1 {
            return first.clone();
        }
        let used = first.chars().count() + last.chars().count();
        if used < columns {
            format!("{}{}{}", first, " ".repeat(columns - used), last)
        } else {
            format!("{} .. {}", first, last)
        }
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
