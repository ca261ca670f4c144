use thiserror::Error;

use crate::value::ValueError;

/// The strategy a command applies when parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller.
    Continue,
    /// Terminate the process with the conventional usage-error status (`2`).
    Exit,
    /// Panic with the error message.
    Panic,
}

/// An error produced while parsing an argument vector.
#[derive(Debug, Error)]
pub enum Error {
    /// A token began with a dash but could not be read as a flag.
    #[error("bad flag syntax: {0}")]
    BadFlagSyntax(String),

    /// A flag token named a flag that was never declared.
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    /// A flag appeared as the final token, with no value to consume.
    #[error("flag needs an argument: -{0}")]
    MissingFlagValue(String),

    /// A flag value failed conversion or a check.
    #[error("invalid value {value:?} for flag -{flag}: {source}")]
    InvalidFlagValue {
        /// The flag name as declared.
        flag: String,
        /// The raw token supplied for the flag.
        value: String,
        /// The underlying conversion or check failure.
        source: ValueError,
    },

    /// A command with subcommands was parsed without a subcommand token.
    #[error("missing command")]
    MissingCommand,

    /// The subcommand token did not name a declared subcommand.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required positional parameter had no corresponding token.
    #[error("missing argument for <{0}>")]
    MissingPositional(String),

    /// A positional token failed conversion or a check.
    #[error("invalid value {value:?} for argument {name}: {source}")]
    InvalidPositional {
        /// The positional parameter name as declared.
        name: String,
        /// The raw token supplied at the parameter's position.
        value: String,
        /// The underlying conversion or check failure.
        source: ValueError,
    },

    /// Help was requested via an undeclared `-h` or `-help` flag.
    #[error("help requested")]
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::BadFlagSyntax("---f".to_string()).to_string(),
            "bad flag syntax: ---f"
        );
        assert_eq!(
            Error::UnknownFlag("f".to_string()).to_string(),
            "flag provided but not defined: -f"
        );
        assert_eq!(
            Error::MissingFlagValue("f".to_string()).to_string(),
            "flag needs an argument: -f"
        );
        assert_eq!(
            Error::InvalidFlagValue {
                flag: "f".to_string(),
                value: "ancy".to_string(),
                source: ValueError::Syntax,
            }
            .to_string(),
            "invalid value \"ancy\" for flag -f: parse error"
        );
        assert_eq!(Error::MissingCommand.to_string(), "missing command");
        assert_eq!(
            Error::UnknownCommand("impound".to_string()).to_string(),
            "unknown command: impound"
        );
        assert_eq!(
            Error::MissingPositional("f".to_string()).to_string(),
            "missing argument for <f>"
        );
        assert_eq!(
            Error::InvalidPositional {
                name: "f".to_string(),
                value: "50".to_string(),
                source: ValueError::Range,
            }
            .to_string(),
            "invalid value \"50\" for argument f: value out of range"
        );
    }
}
