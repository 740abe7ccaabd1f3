//! Interactive session commands.

use std::str::FromStr;

use fxconv_common::Currency;
use fxconv_converter::Action;
use thiserror::Error;

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands:
  base <CODE>      select the base currency
  target <CODE>    select the target currency
  amount <TEXT>    set the amount (amount with no text clears it)
  convert          convert the current amount
  swap             swap base and target
  clear-error      dismiss the error banner
  clear-result     clear the last result
  currencies       list known currency codes
  show             print the current state
  help             print this help
  quit             leave the session";

/// Command parse errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Base(Currency),
    Target(Currency),
    Amount(String),
    Convert,
    Swap,
    ClearError,
    ClearResult,
    Currencies,
    Show,
    Help,
    Quit,
}

impl Command {
    /// The converter action this command dispatches, if any.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Command::Base(code) => Some(Action::SetBase(code)),
            Command::Target(code) => Some(Action::SetTarget(code)),
            Command::Amount(text) => Some(Action::SetAmount(text)),
            Command::Convert => Some(Action::Convert),
            Command::Swap => Some(Action::Swap),
            Command::ClearError => Some(Action::ClearError),
            Command::ClearResult => Some(Action::ClearResult),
            Command::Currencies | Command::Show | Command::Help | Command::Quit => None,
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "base" | "from" => currency_arg(rest, "base").map(Command::Base),
            "target" | "to" => currency_arg(rest, "target").map(Command::Target),
            // Amount text is passed through untouched; the keystroke filter decides
            "amount" | "a" => Ok(Command::Amount(rest.to_string())),
            "convert" | "c" => Ok(Command::Convert),
            "swap" | "s" => Ok(Command::Swap),
            "clear-error" | "clear" => Ok(Command::ClearError),
            "clear-result" | "reset" => Ok(Command::ClearResult),
            "currencies" | "list" => Ok(Command::Currencies),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn currency_arg(rest: &str, name: &'static str) -> Result<Currency, CommandError> {
    let code = Currency::new(rest);
    if code.is_empty() {
        return Err(CommandError::MissingArgument(name));
    }
    Ok(code)
}
