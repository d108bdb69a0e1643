//! Line commands read from stdin.
use chrono::NaiveDate;
use dashboard_core::{Country, SourceId, UnknownCountry};
use thiserror::Error;

pub(crate) const HELP: &str = "\
commands:
  search <text>            free-text filter (empty clears)
  country <any|chile|peru>
  source <id...> | all     filter on catalog sources
  from <YYYY-MM-DD|->      start date (- clears)
  to <YYYY-MM-DD|->        end date (- clears)
  page <n>
  scrape                   start a scraping job
  cleanup                  remove duplicate records
  kw add <word> | kw rm <word> | kw toggle
  show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceSelection {
    All,
    Ids(Vec<SourceId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Search(String),
    Country(Country),
    Sources(SourceSelection),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Page(u32),
    Scrape,
    Cleanup,
    KeywordAdd(String),
    KeywordRemove(String),
    KeywordToggle,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
    #[error("not a date (YYYY-MM-DD): {0:?}")]
    InvalidDate(String),
    #[error(transparent)]
    Country(#[from] UnknownCountry),
}

pub(crate) fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "search" => Ok(Command::Search(rest.to_string())),
        "country" => Ok(Command::Country(rest.parse()?)),
        "source" | "sources" => parse_sources(rest),
        "from" => Ok(Command::From(parse_day(rest, "from")?)),
        "to" => Ok(Command::To(parse_day(rest, "to")?)),
        "page" => {
            let raw = required(rest, "page")?;
            raw.parse()
                .map(Command::Page)
                .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
        }
        "scrape" => Ok(Command::Scrape),
        "cleanup" => Ok(Command::Cleanup),
        "kw" => parse_keyword(rest),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn parse_sources(rest: &str) -> Result<Command, CommandError> {
    let rest = required(rest, "source")?;
    if rest.eq_ignore_ascii_case("all") {
        return Ok(Command::Sources(SourceSelection::All));
    }
    rest.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<SourceId>()
                .map_err(|_| CommandError::InvalidNumber(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|ids| Command::Sources(SourceSelection::Ids(ids)))
}

fn parse_day(rest: &str, command: &'static str) -> Result<Option<NaiveDate>, CommandError> {
    match required(rest, command)? {
        "-" => Ok(None),
        raw => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CommandError::InvalidDate(raw.to_string())),
    }
}

fn parse_keyword(rest: &str) -> Result<Command, CommandError> {
    let (action, word) = match rest.split_once(char::is_whitespace) {
        Some((action, word)) => (action, word.trim()),
        None => (rest, ""),
    };
    match action {
        "add" => Ok(Command::KeywordAdd(word.to_string())),
        "rm" | "remove" => Ok(Command::KeywordRemove(required(word, "kw rm")?.to_string())),
        "toggle" => Ok(Command::KeywordToggle),
        "" => Err(CommandError::MissingArgument("kw")),
        other => Err(CommandError::Unknown(format!("kw {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filters_parse() {
        assert_eq!(
            parse("search  norma minera ").unwrap(),
            Command::Search("norma minera".into())
        );
        assert_eq!(parse("search").unwrap(), Command::Search(String::new()));
        assert_eq!(parse("country Perú").unwrap(), Command::Country(Country::Peru));
        assert_eq!(parse("country todos").unwrap(), Command::Country(Country::Any));
        assert_eq!(
            parse("source 1, 3 4").unwrap(),
            Command::Sources(SourceSelection::Ids(vec![1, 3, 4]))
        );
        assert_eq!(parse("source ALL").unwrap(), Command::Sources(SourceSelection::All));
        assert_eq!(
            parse("from 2024-01-31").unwrap(),
            Command::From(NaiveDate::from_ymd_opt(2024, 1, 31))
        );
        assert_eq!(parse("to -").unwrap(), Command::To(None));
    }

    #[test]
    fn actions_parse() {
        assert_eq!(parse("page 3").unwrap(), Command::Page(3));
        assert_eq!(parse("SCRAPE").unwrap(), Command::Scrape);
        assert_eq!(parse("kw add  litio").unwrap(), Command::KeywordAdd("litio".into()));
        // Blank words reach the keyword book, which rejects them.
        assert_eq!(parse("kw add").unwrap(), Command::KeywordAdd(String::new()));
        assert_eq!(parse("kw rm litio").unwrap(), Command::KeywordRemove("litio".into()));
        assert_eq!(parse("kw toggle").unwrap(), Command::KeywordToggle);
        assert_eq!(parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(parse("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(parse("page two").unwrap_err(), CommandError::InvalidNumber("two".into()));
        assert_eq!(parse("page").unwrap_err(), CommandError::MissingArgument("page"));
        assert_eq!(parse("from 31/01/2024").unwrap_err(), CommandError::InvalidDate("31/01/2024".into()));
        assert!(matches!(parse("country mars").unwrap_err(), CommandError::Country(_)));
        assert_eq!(parse("kw rm").unwrap_err(), CommandError::MissingArgument("kw rm"));
        assert!(matches!(parse("dance").unwrap_err(), CommandError::Unknown(_)));
    }
}
