mod chart;
mod table;

pub use chart::LineChart;
pub use table::{Alignment, Table};

use textwrap::{wrap, Options};

/// Wraps model output for the terminal, keeping the model's own line breaks.
pub fn wrap_text(text: &str, width: usize) -> String {
    let options = Options::new(width.max(20))
        .initial_indent("  ")
        .subsequent_indent("  ");

    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                wrap(line, &options)
                    .into_iter()
                    .map(|l| l.into_owned())
                    .collect()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
