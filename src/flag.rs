use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::interface::{ConsoleInterface, UserInterface};
use crate::model::{Error, ErrorHandling};
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

mod vars;

/// A registry of named flags with single-dash token scanning.
///
/// Flag tokens take the forms `-name value`, `-name=value`, and `--name`
/// equivalents. Scanning stops at the first token that is not a flag, at a
/// lone `-`, or at a `--` terminator (which is consumed); everything after is
/// retrievable through [`FlagSet::args`].
///
/// Each [`Command`](crate::Command) owns one of these; standalone use is
/// possible but note that `parse` here only reports errors, leaving output
/// and error-handling policy to the owner.
pub struct FlagSet<'a> {
    name: String,
    error_handling: ErrorHandling,
    interface: Rc<dyn UserInterface + 'a>,
    formal: BTreeMap<String, Flag<'a>>,
    leftover: Vec<String>,
    parsed: bool,
}

struct Flag<'a> {
    usage: String,
    def_value: String,
    show_default: bool,
    value: Box<dyn Value + 'a>,
}

impl<'a> FlagSet<'a> {
    /// Create a flag set with the given name and error handling.
    pub fn new(name: impl Into<String>, error_handling: ErrorHandling) -> Self {
        Self {
            name: name.into(),
            error_handling,
            interface: Rc::new(ConsoleInterface::default()),
            formal: BTreeMap::default(),
            leftover: Vec::default(),
            parsed: false,
        }
    }

    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The error handling strategy given at construction.
    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    /// The output sink for usage and error text.
    pub fn output(&self) -> Rc<dyn UserInterface + 'a> {
        Rc::clone(&self.interface)
    }

    /// Replace the output sink.
    pub fn set_output(&mut self, interface: Rc<dyn UserInterface + 'a>) {
        self.interface = interface;
    }

    /// Whether `parse` has been called.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Whether any flags have been declared.
    pub fn has_flags(&self) -> bool {
        !self.formal.is_empty()
    }

    /// Register a flag backed by any [`Value`] implementation.
    ///
    /// The value's rendering at registration time is captured as the
    /// displayed default.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared on this flag set.
    pub fn var(&mut self, value: Box<dyn Value + 'a>, name: impl Into<String>, usage: impl Into<String>) {
        let show_default = !value.required();
        self.register(value, name, usage, show_default);
    }

    pub(crate) fn register(
        &mut self,
        value: Box<dyn Value + 'a>,
        name: impl Into<String>,
        usage: impl Into<String>,
        show_default: bool,
    ) {
        let name = name.into();
        let def_value = value.render();
        let previous = self.formal.insert(
            name.clone(),
            Flag {
                usage: usage.into(),
                def_value,
                show_default,
                value,
            },
        );

        if previous.is_some() {
            panic!("flag redefined: {name}");
        }
    }

    /// Scan leading flag tokens from the given arguments, converting and
    /// checking each flag's value as it is matched.
    ///
    /// The tokens remaining after the scan are retrievable through
    /// [`FlagSet::args`]. An undeclared `-h` or `-help` reports
    /// [`Error::Help`].
    pub fn parse(&mut self, args: Vec<String>) -> Result<(), Error> {
        self.parsed = true;
        let mut queue: VecDeque<String> = args.into();

        while let Some(first) = queue.front() {
            if !first.starts_with('-') || first == "-" {
                break;
            }

            let token = queue
                .pop_front()
                .expect("internal error - front was just inspected");
            if token == "--" {
                break;
            }

            let stripped = &token[1..];
            let stripped = stripped.strip_prefix('-').unwrap_or(stripped);
            if stripped.is_empty() || stripped.starts_with('-') || stripped.starts_with('=') {
                return Err(Error::BadFlagSyntax(token));
            }

            let (name, inline) = match stripped.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (stripped.to_string(), None),
            };

            let flag = match self.formal.get_mut(&name) {
                Some(flag) => flag,
                None if name == "help" || name == "h" => return Err(Error::Help),
                None => return Err(Error::UnknownFlag(name)),
            };

            let value = match inline {
                Some(value) => value,
                None => match queue.pop_front() {
                    Some(value) => value,
                    None => return Err(Error::MissingFlagValue(name)),
                },
            };

            #[cfg(feature = "tracing_debug")]
            {
                debug!("matched flag '{name}' with value '{value}'");
            }

            flag.value
                .set(&value)
                .map_err(|source| Error::InvalidFlagValue {
                    flag: name,
                    value,
                    source,
                })?;
        }

        self.leftover = queue.into_iter().collect();
        Ok(())
    }

    /// The number of remaining arguments after flag scanning.
    pub fn n_arg(&self) -> usize {
        self.leftover.len()
    }

    /// Indexed access to the remaining arguments after flag scanning.
    pub fn arg(&self, position: usize) -> Option<&str> {
        self.leftover.get(position).map(String::as_str)
    }

    /// The remaining arguments after flag scanning.
    pub fn args(&self) -> &[String] {
        &self.leftover
    }

    /// Render the declared flags in name-sorted order, each with its usage
    /// text and, when it differs from the kind's zero value, its default.
    pub fn defaults_text(&self) -> String {
        let mut rendered = String::new();

        for (name, flag) in &self.formal {
            rendered.push_str(&format!("  -{name} value\n    \t{usage}", usage = flag.usage));
            if flag.show_default {
                rendered.push_str(&format!(" (default {})", flag.def_value));
            }
            rendered.push('\n');
        }

        rendered
    }

    /// Print the declared flags to the output sink.
    pub fn print_defaults(&self) {
        self.interface.print(self.defaults_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{at_least, one_of};
    use rstest::rstest;

    fn build() -> (FlagSet<'static>, crate::ValueRef<i64>, crate::ValueRef<String>) {
        let mut flags = FlagSet::new("trucker", ErrorHandling::Continue);
        let f = flags.int64("f", 150, "model num", vec![at_least(150)]);
        let cab = flags.string("cab", "", "cab feature", vec![one_of(vec!["extended", "super"])]);
        (flags, f, cab)
    }

    #[rstest]
    #[case(vec!["-f", "250"], 250, "")]
    #[case(vec!["-f=250"], 250, "")]
    #[case(vec!["--f", "250"], 250, "")]
    #[case(vec!["--f=250"], 250, "")]
    #[case(vec!["-f", "250", "-cab", "super"], 250, "super")]
    #[case(vec!["-cab=super", "-f=250"], 250, "super")]
    fn parse_flags(#[case] tokens: Vec<&str>, #[case] expected_f: i64, #[case] expected_cab: &str) {
        // Setup
        let (mut flags, f, cab) = build();

        // Execute
        flags
            .parse(tokens.into_iter().map(str::to_string).collect())
            .unwrap();

        // Verify
        assert!(flags.parsed());
        assert_eq!(f.get(), expected_f);
        assert_eq!(cab.get(), expected_cab);
        assert_eq!(flags.n_arg(), 0);
    }

    #[rstest]
    #[case(vec!["wut?"], vec!["wut?"])]
    #[case(vec!["-f", "250", "wut?"], vec!["wut?"])]
    #[case(vec!["-", "-f", "250"], vec!["-", "-f", "250"])]
    #[case(vec!["--", "-f", "250"], vec!["-f", "250"])]
    #[case(vec!["-f", "250", "--", "stop"], vec!["stop"])]
    fn parse_leftover(#[case] tokens: Vec<&str>, #[case] expected: Vec<&str>) {
        // Setup
        let (mut flags, _f, _cab) = build();

        // Execute
        flags
            .parse(tokens.into_iter().map(str::to_string).collect())
            .unwrap();

        // Verify
        assert_eq!(flags.args(), expected.as_slice());
        assert_eq!(flags.n_arg(), expected.len());
        assert_eq!(flags.arg(0), expected.first().copied());
        assert_eq!(flags.arg(expected.len()), None);
    }

    #[rstest]
    #[case(vec!["-x", "1"], "flag provided but not defined: -x")]
    #[case(vec!["-f"], "flag needs an argument: -f")]
    #[case(vec!["---f", "1"], "bad flag syntax: ---f")]
    #[case(vec!["-=1"], "bad flag syntax: -=1")]
    #[case(vec!["-f", "ancy"], "invalid value \"ancy\" for flag -f: parse error")]
    #[case(vec!["-f", "50"], "invalid value \"50\" for flag -f: must be at least 150")]
    #[case(
        vec!["-cab", "brown"],
        "invalid value \"brown\" for flag -cab: must be one of [extended super]"
    )]
    fn parse_errors(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let (mut flags, _f, _cab) = build();

        // Execute
        let error = flags
            .parse(tokens.into_iter().map(str::to_string).collect())
            .unwrap_err();

        // Verify
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case(vec!["-h"])]
    #[case(vec!["-help"])]
    #[case(vec!["--help"])]
    fn parse_help(#[case] tokens: Vec<&str>) {
        // Setup
        let (mut flags, _f, _cab) = build();

        // Execute
        let error = flags
            .parse(tokens.into_iter().map(str::to_string).collect())
            .unwrap_err();

        // Verify
        assert_matches!(error, Error::Help);
    }

    #[test]
    fn declared_help_flag_wins() {
        // Setup
        let mut flags = FlagSet::new("program", ErrorHandling::Continue);
        let h = flags.string("h", "", "not the built-in", vec![]);

        // Execute
        flags.parse(vec!["-h".to_string(), "hello".to_string()]).unwrap();

        // Verify
        assert_eq!(h.get(), "hello");
    }

    #[test]
    fn defaults_text_sorted_with_defaults() {
        // Setup
        let (flags, _f, _cab) = build();

        // Execute
        let rendered = flags.defaults_text();

        // Verify
        assert_eq!(
            rendered,
            "  -cab value\n    \tcab feature\n  -f value\n    \tmodel num (default 150)\n"
        );
    }

    #[test]
    fn defaults_text_quotes_strings() {
        // Setup
        let mut flags = FlagSet::new("trucker", ErrorHandling::Continue);
        flags.string("make", "FORD", "truck manufacturer", vec![]);

        // Execute
        let rendered = flags.defaults_text();

        // Verify
        assert_eq!(
            rendered,
            "  -make value\n    \ttruck manufacturer (default \"FORD\")\n"
        );
    }

    #[test]
    fn defaults_unset_until_parse() {
        // Setup
        let (flags, f, cab) = build();

        // Verify
        assert!(!flags.parsed());
        assert!(flags.has_flags());
        assert_eq!(f.get(), 150);
        assert_eq!(cab.get(), "");
    }

    #[test]
    #[should_panic(expected = "flag redefined: f")]
    fn flag_redefined() {
        let mut flags = FlagSet::new("trucker", ErrorHandling::Continue);
        flags.int64("f", 150, "model num", vec![]);
        flags.int64("f", 250, "model num again", vec![]);
    }

    #[test]
    fn flag_value_may_start_with_dash() {
        // Setup
        let mut flags = FlagSet::new("program", ErrorHandling::Continue);
        let offset = flags.int64("offset", 0, "signed offset", vec![]);

        // Execute
        flags
            .parse(vec!["-offset".to_string(), "-5".to_string()])
            .unwrap();

        // Verify
        assert_eq!(offset.get(), -5);
    }
}
