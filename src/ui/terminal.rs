use crate::analytics::{PatientData, BLOOD_PRESSURE_COLUMN, DATE_COLUMN};
use crate::client::InferenceClient;
use crate::error::{AppError, InferenceError, Result};
use crate::prediction::{self, SIMULATED_WARNING};
use crate::renderer::{wrap_text, LineChart, Table};
use super::commands::{Command, COMMAND_BOX};
use colored::*;
use rustyline::{config::Configurer, DefaultEditor, error::ReadlineError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use terminal_size::{terminal_size, Width};

const WELCOME_MESSAGE: &str = "AI Medical Assistant\n\n\
Ask a health-related question, get a treatment plan for a diagnosis,\n\
or look at patient health analytics. Answers come from a hosted model\n\
and are not medical advice.";

const HISTORY_FILE: &str = ".medassist_history";

/// A prompt that was sent to the model, kept for `again`.
#[derive(Debug, Clone)]
enum LastRequest {
    Chat(String),
    Plan(String),
}

pub struct TerminalUI {
    client: InferenceClient,
    editor: DefaultEditor,
    history_file: PathBuf,
    width: usize,
    last_request: Option<LastRequest>,
}

impl TerminalUI {
    pub fn new(client: InferenceClient) -> Result<Self> {
        let width = match terminal_size() {
            Some((Width(w), _)) => (w as usize).saturating_sub(2),
            None => 80,
        };

        let mut editor = DefaultEditor::new()?;
        editor.set_max_history_size(100)?;

        let history_file = dirs::home_dir()
            .map(|mut path| {
                path.push(HISTORY_FILE);
                path
            })
            .unwrap_or_else(|| HISTORY_FILE.into());

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self {
            client,
            editor,
            history_file,
            width,
            last_request: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.show_welcome_message()?;

        loop {
            let prompt = format!("{}", "> ".blue().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.trim())?;
                    }
                    let command = line.parse::<Command>().unwrap_or_else(|_| Command::Chat(line));
                    match command {
                        Command::Exit => {
                            let _ = self.editor.save_history(&self.history_file);
                            break;
                        }
                        Command::Clear => {
                            clearscreen::clear()?;
                            self.show_command_box();
                        }
                        Command::Help => self.show_command_box(),
                        Command::New => {
                            self.last_request = None;
                            self.client.invalidate_token().await;
                            clearscreen::clear()?;
                            self.show_command_box();
                            println!("{}", "Starting a fresh session...".green());
                        }
                        Command::Again => match self.last_request.clone() {
                            Some(LastRequest::Chat(question)) => self.handle_chat(&question).await?,
                            Some(LastRequest::Plan(diagnosis)) => self.handle_plan(&diagnosis).await?,
                            None => self.show_warning("Nothing to ask again yet."),
                        },
                        Command::Chat(question) => {
                            if !question.trim().is_empty() {
                                self.handle_chat(&question).await?;
                            }
                        }
                        Command::Predict(symptoms) => self.handle_predict(&symptoms),
                        Command::Plan(diagnosis) => {
                            if diagnosis.trim().is_empty() {
                                self.show_warning("Enter a disease name, e.g. `plan migraine`.");
                            } else {
                                self.handle_plan(&diagnosis).await?;
                            }
                        }
                        Command::Analytics(path) => {
                            let path = path.unwrap_or_else(|| self.client.config().analytics_csv.clone());
                            self.handle_analytics(&path);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use 'exit' to quit");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn show_welcome_message(&self) -> Result<()> {
        clearscreen::clear()?;
        println!("{}", wrap_text(WELCOME_MESSAGE, self.width).cyan());
        println!();
        self.show_command_box();
        Ok(())
    }

    fn show_command_box(&self) {
        println!("{}", COMMAND_BOX.green());
        println!();
    }

    fn show_warning(&self, message: &str) {
        println!("{}", message.yellow());
        println!();
    }

    async fn handle_chat(&mut self, question: &str) -> Result<()> {
        self.last_request = Some(LastRequest::Chat(question.to_string()));
        self.show_spinner("Thinking...")?;
        let outcome = self.client.generate(question).await;
        self.show_outcome(outcome);
        Ok(())
    }

    async fn handle_plan(&mut self, diagnosis: &str) -> Result<()> {
        self.last_request = Some(LastRequest::Plan(diagnosis.to_string()));
        self.show_spinner("Generating...")?;
        let outcome = self.client.treatment_plan(diagnosis).await;
        self.show_outcome(outcome);
        Ok(())
    }

    fn handle_predict(&self, symptoms: &str) {
        match prediction::predict(symptoms) {
            Some(result) => {
                self.show_warning(SIMULATED_WARNING);
                println!("{}", format!("  {}", result.summary()).green());
                println!();
            }
            None => self.show_warning("Enter symptoms, comma-separated, e.g. `predict fever, cough`."),
        }
    }

    fn handle_analytics(&self, path: &Path) {
        match self.render_analytics(path) {
            Ok(output) => {
                println!("{}", output);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "analytics failed");
                println!("{}", e.to_string().red());
                println!();
            }
        }
    }

    fn render_analytics(&self, path: &Path) -> std::result::Result<String, AppError> {
        let data = PatientData::load(path)?;

        let mut table = Table::from_patient_data(&data);
        table.calculate_column_widths(self.width);

        let mut output = format!("{}\n", "  Patient Data".bold());
        output.push_str(&table.render());
        output.push('\n');

        let series = data.series(DATE_COLUMN, BLOOD_PRESSURE_COLUMN)?;
        let chart = LineChart::new("Blood Pressure Over Time", series);
        output.push_str(&chart.render(self.width));
        Ok(output)
    }

    fn show_spinner(&self, message: &str) -> Result<()> {
        print!("{}", message.yellow());
        io::stdout().flush()?;
        Ok(())
    }

    fn show_outcome(&self, outcome: std::result::Result<String, InferenceError>) {
        print!("\r{}\r", " ".repeat(self.width));
        match outcome {
            Ok(text) => {
                println!("{}", wrap_text(&text, self.width).cyan());
                println!();
            }
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "request failed");
                println!("{}", format!("Error: {}", e).red());
                if e.is_retryable() {
                    println!("{}", "Type `again` to retry.".yellow());
                }
                println!();
            }
        }
    }
}
