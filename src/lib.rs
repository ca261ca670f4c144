//! A command line parser that extends simple flag parsing with subcommands,
//! positional parameters, and checked values.
//!
//! A [`Command`] owns a set of flags plus either subcommands or positional
//! parameters, never both. Flags and positional parameters bind scalar
//! destinations through [`Checked`] values, which convert raw text and then
//! run declared checks in order.
//!
//! ### Example
//! ```
//! use cmdtree::{check, Command, ErrorHandling};
//!
//! let mut cmd = Command::new("trucker", "make a ford truck", ErrorHandling::Continue);
//! let model = cmd.int64("f", 150, "model num", vec![check::at_least(150)]);
//! let cab = cmd.string("cab", "", "cab feature", vec![check::one_of(vec!["extended", "super"])]);
//!
//! cmd.parse(["-f", "250", "-cab", "super"]).unwrap();
//!
//! assert_eq!(model.get(), 250);
//! assert_eq!(cab.get(), "super");
//! ```
//!
//! Subcommands dispatch to handlers, each receiving a fresh [`Bound`] child
//! command to declare and parse on its own:
//! ```
//! use cmdtree::{Command, ErrorHandling};
//!
//! let mut cmd = Command::new("trucker", "truck utility", ErrorHandling::Continue);
//! cmd.subcommand("buy", "buy a stock truck", |mut cmd| {
//!     let model = cmd.positional_string("model", None, "truck model", vec![]);
//!     cmd.parse().unwrap();
//!     assert_eq!(model.get(), "f150");
//! });
//!
//! cmd.parse(["buy", "f150"]).unwrap();
//! ```
//!
//! For the common case, [`program`] builds the top-level command from the
//! process invocation with exit-on-error handling.
#![deny(missing_docs)]

pub mod check;
mod command;
mod flag;
mod interface;
mod model;
mod value;

pub use command::{program, Bound, Command};
pub use flag::FlagSet;
pub use interface::{ConsoleInterface, UserInterface};
pub use model::{Error, ErrorHandling};
pub use value::{CheckError, CheckFn, Checked, Scalar, Value, ValueError, ValueRef};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
