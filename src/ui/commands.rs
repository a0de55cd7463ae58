use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Exit,
    Clear,
    New,
    Help,
    Again,
    Chat(String),
    Predict(String),
    Plan(String),
    Analytics(Option<PathBuf>),
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, rest) = match s.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (s, ""),
        };

        Ok(match head.to_lowercase().as_str() {
            "exit" | "quit" if rest.is_empty() => Command::Exit,
            "clear" if rest.is_empty() => Command::Clear,
            "new" if rest.is_empty() => Command::New,
            "help" if rest.is_empty() => Command::Help,
            "again" if rest.is_empty() => Command::Again,
            "ask" => Command::Chat(rest.to_string()),
            "predict" => Command::Predict(rest.to_string()),
            "plan" => Command::Plan(rest.to_string()),
            "analytics" => Command::Analytics((!rest.is_empty()).then(|| PathBuf::from(rest))),
            _ => Command::Chat(s.to_string()),
        })
    }
}

pub const COMMAND_BOX: &str = "\
┌────────────────────────────────────────────────────┐\n\
│                 Available Commands                 │\n\
├────────────────────────────────────────────────────┤\n\
│  <question>           - Ask the assistant          │\n\
│  `predict` <symptoms> - Disease prediction (sim)   │\n\
│  `plan` <disease>     - Get a treatment plan       │\n\
│  `analytics` [file]   - Patient health analytics   │\n\
│  `again`              - Repeat the last question   │\n\
├────────────────────────────────────────────────────┤\n\
│  `help`  `clear`  `new`  `exit`                    │\n\
└────────────────────────────────────────────────────┘";
