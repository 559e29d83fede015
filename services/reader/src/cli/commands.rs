//! services/reader/src/cli/commands.rs
//!
//! The line protocol between the terminal and the reader shell.
//! Every line the user types parses into exactly one `Command`.

use std::str::FromStr;

use library_reader_core::catalog::CategoryFilter;

/// Commands the user can type. Numbers are one-based, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the translated documents served by the library API.
    Documents,
    /// Show the built-in novel catalog, filtered by the current query.
    Novels,
    /// Set the free-text novel query. Empty text clears it.
    Search(String),
    /// Set the novel category filter.
    Genre(CategoryFilter),
    Users,
    /// Switch the active profile.
    User(String),
    /// Show details of the n-th entry of the listing currently shown.
    Info(usize),
    /// Open the n-th entry of the listing currently shown.
    Open(usize),
    Next,
    Previous,
    /// Jump to the n-th chapter of the open novel.
    Chapter(usize),
    /// Jump to the n-th translation of the open document.
    Go(usize),
    /// Close the open reader, or abandon a load in progress.
    Close,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Type a command, or 'help'.")]
    Empty,
    #[error("Unknown command '{0}'. Type 'help'.")]
    Unknown(String),
    #[error("'{0}' needs {1}.")]
    MissingArgument(&'static str, &'static str),
    #[error("'{0}' is not a number from 1 up.")]
    NotANumber(String),
}

fn number(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CommandError::NotANumber(raw.to_string())),
    }
}

fn required<'a>(
    arg: &'a str,
    command: &'static str,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(command, what))
    } else {
        Ok(arg)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "docs" | "documents" => Ok(Command::Documents),
            "novels" => Ok(Command::Novels),
            "search" | "s" => Ok(Command::Search(arg.to_string())),
            "genre" | "g" => Ok(Command::Genre(CategoryFilter::parse(arg))),
            "users" => Ok(Command::Users),
            "user" | "u" => Ok(Command::User(required(arg, "user", "a profile id")?.to_string())),
            "info" | "i" => number(required(arg, "info", "an entry number")?).map(Command::Info),
            "open" | "o" => number(required(arg, "open", "an entry number")?).map(Command::Open),
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "p" => Ok(Command::Previous),
            "chapter" | "ch" => {
                number(required(arg, "chapter", "a chapter number")?).map(Command::Chapter)
            }
            "go" => number(required(arg, "go", "a translation number")?).map(Command::Go),
            "close" | "c" => Ok(Command::Close),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

pub const HELP: &str = "\
docs                 list translated documents
novels               list demo novels (uses search/genre)
search <text>        filter novels by title, author or description
genre <name|all>     filter novels by genre
users                list reader profiles
user <id>            switch profile
info <n>             show details of entry n of the current list
open <n>             open entry n of the current list
next | n, prev | p   turn the page
chapter <n>          jump to chapter n (novels)
go <n>               jump to translation n (documents)
close                close the reader
quit                 save progress and exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_aliases() {
        assert_eq!("n".parse::<Command>(), Ok(Command::Next));
        assert_eq!("  PREV ".parse::<Command>(), Ok(Command::Previous));
        assert_eq!("open 3".parse::<Command>(), Ok(Command::Open(3)));
        assert_eq!("info 2".parse::<Command>(), Ok(Command::Info(2)));
        assert_eq!(
            "i".parse::<Command>(),
            Err(CommandError::MissingArgument("info", "an entry number"))
        );
        assert_eq!("ch 2".parse::<Command>(), Ok(Command::Chapter(2)));
        assert_eq!("go 10".parse::<Command>(), Ok(Command::Go(10)));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn keeps_free_text_arguments() {
        assert_eq!(
            "search the   manor".parse::<Command>(),
            Ok(Command::Search("the   manor".to_string()))
        );
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
        assert_eq!(
            "genre Gothic Horror".parse::<Command>(),
            Ok(Command::Genre(CategoryFilter::Named("Gothic Horror".to_string())))
        );
        assert_eq!("genre all".parse::<Command>(), Ok(Command::Genre(CategoryFilter::All)));
        assert_eq!("user user_2".parse::<Command>(), Ok(Command::User("user_2".to_string())));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!(
            "open".parse::<Command>(),
            Err(CommandError::MissingArgument("open", "an entry number"))
        );
        assert_eq!(
            "go 0".parse::<Command>(),
            Err(CommandError::NotANumber("0".to_string()))
        );
        assert_eq!(
            "chapter two".parse::<Command>(),
            Err(CommandError::NotANumber("two".to_string()))
        );
    }
}
