use std::path::PathBuf;

pub const HELP: &str = "\
Type a question to ask about your documents, or one of:
  /upload <path>        upload a document and follow its ingestion
  /transcribe <path>    transcribe an audio file and ask it as a question
  /note <text>          add a short text to the knowledge base
  /departments          list departments
  /department [name]    scope questions to a department, or clear it
  /documents            count indexed documents
  /health               check the backend
  /stats                show backend statistics
  /clear                clear the conversation
  /help                 show this help
  /quit                 exit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Upload(PathBuf),
    Transcribe(PathBuf),
    Note(String),
    Departments,
    Department(Option<String>),
    Documents,
    Health,
    Stats,
    Clear,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let arg = (!arg.is_empty()).then(|| arg.to_string());

    match (name, arg) {
        ("upload", Some(path)) => Command::Upload(PathBuf::from(path)),
        ("transcribe", Some(path)) => Command::Transcribe(PathBuf::from(path)),
        ("note", Some(text)) => Command::Note(text),
        ("upload" | "transcribe", None) => Command::Invalid(format!("/{name} needs a file path")),
        ("note", None) => Command::Invalid("/note needs some text".to_string()),
        ("departments", _) => Command::Departments,
        ("department", arg) => Command::Department(arg),
        ("documents", _) => Command::Documents,
        ("health", _) => Command::Health,
        ("stats", _) => Command::Stats,
        ("clear", _) => Command::Clear,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => Command::Invalid(format!("Unknown command /{other}; try /help")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse("  what changed in Q3?  "),
            Command::Ask("what changed in Q3?".to_string())
        );
        assert_eq!(parse("   "), Command::Empty);
    }

    #[test]
    fn commands_take_the_rest_of_the_line() {
        assert_eq!(
            parse("/upload  reports/q3 summary.pdf "),
            Command::Upload(PathBuf::from("reports/q3 summary.pdf"))
        );
        assert_eq!(
            parse("/note Office closes at 5pm."),
            Command::Note("Office closes at 5pm.".to_string())
        );
        assert_eq!(
            parse("/department hr"),
            Command::Department(Some("hr".to_string()))
        );
        assert_eq!(parse("/department"), Command::Department(None));
        assert_eq!(parse("/quit"), Command::Quit);
    }

    #[test]
    fn missing_arguments_and_unknown_commands_are_invalid() {
        assert!(matches!(parse("/upload"), Command::Invalid(_)));
        assert!(matches!(parse("/note   "), Command::Invalid(_)));
        assert!(matches!(parse("/frobnicate"), Command::Invalid(_)));
    }
}
