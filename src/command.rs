use std::collections::BTreeMap;
use std::env;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::process;
use std::rc::Rc;

use crate::flag::FlagSet;
use crate::interface::UserInterface;
use crate::model::{Error, ErrorHandling};
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

mod vars;

/// A single command in a command tree, which may contain flags, subcommands,
/// and positional parameters.
///
/// Subcommands and positional parameters are mutually exclusive: a command
/// may declare one kind or neither, never both.
///
/// ### Example
/// ```
/// use cmdtree::{check, Command, ErrorHandling};
///
/// let mut cmd = Command::new("trucker", "make a ford truck", ErrorHandling::Continue);
/// let f = cmd.int64("f", 150, "model num", vec![check::at_least(150)]);
/// let cab = cmd.string("cab", "", "cab feature", vec![check::one_of(vec!["extended", "super"])]);
///
/// cmd.parse(["-f", "250", "-cab", "super"]).unwrap();
///
/// assert_eq!(f.get(), 250);
/// assert_eq!(cab.get(), "super");
/// ```
pub struct Command<'a> {
    flags: FlagSet<'a>,
    usage: String,
    subcommands: BTreeMap<String, Subcommand<'a>>,
    positional: Vec<Positional<'a>>,
    usage_fn: Option<Box<dyn Fn(&Command<'a>) -> String + 'a>>,
}

struct Subcommand<'a> {
    usage: String,
    handler: Box<dyn FnMut(Bound<'a>) + 'a>,
}

struct Positional<'a> {
    name: String,
    usage: String,
    value: Box<dyn Value + 'a>,
    def_value: String,
}

/// A [`Command`] paired with a specific argument vector awaiting parse.
///
/// Returned from [`Command::bind`] and [`program`], and received by
/// subcommand handlers. A `Bound` dereferences to its command, so
/// declarations happen directly on it before [`Bound::parse`] consumes the
/// pairing.
pub struct Bound<'a> {
    command: Command<'a>,
    args: Vec<String>,
}

impl<'a> Command<'a> {
    /// Create a command with the given name, usage description, and error
    /// handling.
    pub fn new(
        name: impl Into<String>,
        usage: impl Into<String>,
        error_handling: ErrorHandling,
    ) -> Self {
        Self {
            flags: FlagSet::new(name, error_handling),
            usage: usage.into(),
            subcommands: BTreeMap::default(),
            positional: Vec::default(),
            usage_fn: None,
        }
    }

    /// The command name.
    pub fn name(&self) -> &str {
        self.flags.name()
    }

    /// The error handling strategy applied when parsing fails.
    pub fn error_handling(&self) -> ErrorHandling {
        self.flags.error_handling()
    }

    /// The output sink for usage and error text.
    pub fn output(&self) -> Rc<dyn UserInterface + 'a> {
        self.flags.output()
    }

    /// Replace the output sink.
    pub fn set_output(&mut self, interface: Rc<dyn UserInterface + 'a>) {
        self.flags.set_output(interface);
    }

    /// Whether [`Command::parse`] has been called.
    pub fn parsed(&self) -> bool {
        self.flags.parsed()
    }

    /// Register a flag backed by any [`Value`] implementation.
    ///
    /// # Panics
    ///
    /// Panics if the name is already declared on this command.
    pub fn var(&mut self, value: Box<dyn Value + 'a>, name: impl Into<String>, usage: impl Into<String>) {
        self.flags.var(value, name, usage);
    }

    /// Print the declared flags to the output sink.
    pub fn print_defaults(&self) {
        self.flags.print_defaults();
    }

    /// Whether flags have been declared on this command.
    pub fn has_flags(&self) -> bool {
        self.flags.has_flags()
    }

    /// Whether subcommands have been declared on this command.
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Whether positional parameters have been declared on this command.
    pub fn has_positional(&self) -> bool {
        !self.positional.is_empty()
    }

    /// Define a subcommand with the given name, usage, and handler.
    ///
    /// The handler is called only when the subcommand name has been parsed by
    /// this command. It receives a fresh child command named
    /// `<name> <subcommand>` (inheriting this command's error handling and
    /// output sink) bound to the remaining arguments, and is responsible for
    /// declaring and parsing the child itself.
    ///
    /// # Panics
    ///
    /// Panics if positional parameters have been defined on the same command,
    /// as they are mutually exclusive.
    pub fn subcommand(
        &mut self,
        name: impl Into<String>,
        usage: impl Into<String>,
        handler: impl FnMut(Bound<'a>) + 'a,
    ) {
        if self.has_positional() {
            panic!("subcommands and positional parameters are mutually exclusive");
        }

        self.subcommands.insert(
            name.into(),
            Subcommand {
                usage: usage.into(),
                handler: Box::new(handler),
            },
        );
    }

    /// Define a positional parameter backed by any [`Value`] implementation.
    ///
    /// The value's rendering at declaration time is captured as the displayed
    /// default.
    ///
    /// # Panics
    ///
    /// Panics if subcommands have been defined on the same command, as they
    /// are mutually exclusive.
    ///
    /// Panics if the value is required and optional positional parameters
    /// have already been defined on the same command.
    pub fn positional_var(
        &mut self,
        value: Box<dyn Value + 'a>,
        name: impl Into<String>,
        usage: impl Into<String>,
    ) {
        if self.has_subcommands() {
            panic!("subcommands and positional parameters are mutually exclusive");
        }
        if let Some(previous) = self.positional.last() {
            if value.required() && !previous.value.required() {
                panic!("required positional parameters must precede optional");
            }
        }

        let def_value = value.render();
        self.positional.push(Positional {
            name: name.into(),
            usage: usage.into(),
            value,
            def_value,
        });
    }

    /// Parse the given arguments according to the definition of the command.
    ///
    /// Leading flag tokens are scanned first. A command with subcommands then
    /// dispatches the next token to its handler; a command with positional
    /// parameters fills them from the remaining tokens; otherwise the
    /// remaining tokens are exposed through [`Command::args`] verbatim.
    ///
    /// On failure the error and usage text are written to the output sink,
    /// and then exactly one of the [`ErrorHandling`] outcomes applies.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        match self.resolve(args) {
            Ok(()) => Ok(()),
            Err(error) => self.fail(error),
        }
    }

    fn resolve(&mut self, args: Vec<String>) -> Result<(), Error> {
        self.flags.parse(args)?;

        if self.has_subcommands() {
            let remaining = self.flags.args().to_vec();
            self.dispatch(remaining)
        } else if self.has_positional() {
            let remaining = self.flags.args().to_vec();
            self.fill_positional(&remaining)
        } else {
            Ok(())
        }
    }

    fn fail(&mut self, error: Error) -> Result<(), Error> {
        let interface = self.output();

        if !matches!(error, Error::Help) {
            interface.print_error(error.to_string());
        }
        self.usage();

        match self.error_handling() {
            ErrorHandling::Continue => Err(error),
            ErrorHandling::Exit => {
                let status = if matches!(error, Error::Help) { 0 } else { 2 };
                process::exit(status);
            }
            ErrorHandling::Panic => panic!("{error}"),
        }
    }

    fn dispatch(&mut self, remaining: Vec<String>) -> Result<(), Error> {
        let first = match remaining.first() {
            Some(first) => first,
            None => return Err(Error::MissingCommand),
        };
        let name = first.trim().to_string();

        if !self.subcommands.contains_key(&name) {
            return Err(Error::UnknownCommand(name));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("dispatching to subcommand '{name}'");
        }

        let child_name = format!("{parent} {name}", parent = self.name());
        let error_handling = self.error_handling();
        let interface = self.output();
        let subcommand = self
            .subcommands
            .get_mut(&name)
            .expect("internal error - subcommand presence was just checked");

        let mut child = Command::new(child_name, subcommand.usage.clone(), error_handling);
        child.set_output(interface);
        (subcommand.handler)(child.bind(remaining[1..].to_vec()));

        Ok(())
    }

    fn fill_positional(&mut self, remaining: &[String]) -> Result<(), Error> {
        for (position, parameter) in self.positional.iter_mut().enumerate() {
            match remaining.get(position) {
                Some(raw) => {
                    parameter
                        .value
                        .set(raw)
                        .map_err(|source| Error::InvalidPositional {
                            name: parameter.name.clone(),
                            value: raw.clone(),
                            source,
                        })?;
                }
                None if parameter.value.required() => {
                    return Err(Error::MissingPositional(parameter.name.clone()));
                }
                None => break,
            }
        }

        Ok(())
    }

    /// The number of remaining arguments after parsing.
    ///
    /// Tokens consumed by declared positional parameters are not counted;
    /// with subcommands declared, all tokens belong to the subcommand and
    /// this reports zero.
    pub fn n_arg(&self) -> usize {
        if self.has_subcommands() {
            return 0;
        }
        if self.has_positional() {
            return self.flags.n_arg().saturating_sub(self.positional.len());
        }
        self.flags.n_arg()
    }

    /// Indexed access to the remaining arguments after parsing.
    pub fn arg(&self, position: usize) -> Option<&str> {
        if self.has_subcommands() {
            return None;
        }
        if self.has_positional() {
            return self.flags.arg(position + self.positional.len());
        }
        self.flags.arg(position)
    }

    /// The remaining arguments after parsing.
    pub fn args(&self) -> &[String] {
        if self.has_subcommands() {
            return &[];
        }
        if self.has_positional() {
            let consumed = self.positional.len().min(self.flags.args().len());
            return &self.flags.args()[consumed..];
        }
        self.flags.args()
    }

    /// Render the default usage text for this command.
    ///
    /// Rendering is pure: repeated calls produce identical text for unchanged
    /// declarations.
    pub fn usage_text(&self) -> String {
        let mut rendered = format!("Usage: {name}", name = self.name());

        if self.has_flags() {
            rendered.push_str(" [options]");
        }

        if self.has_subcommands() {
            rendered.push_str(" <command>");
        } else {
            for parameter in &self.positional {
                if parameter.value.required() {
                    rendered.push_str(&format!(" <{name}>", name = parameter.name));
                } else {
                    rendered.push_str(&format!(" [{name}]", name = parameter.name));
                }
            }
        }

        rendered.push_str("\n\n");

        for line in self.usage.split('\n') {
            rendered.push_str(&format!("  {line}\n"));
        }

        if self.has_flags() {
            rendered.push_str("\nOptions:\n");
            rendered.push_str(&self.flags.defaults_text());
        }

        if self.has_subcommands() {
            rendered.push_str("\nCommands:\n");
            rendered.push_str(&self.subcommands_text());
        } else if self.has_positional() {
            rendered.push_str("\nArguments:\n");
            rendered.push_str(&self.positional_text());
        }

        rendered
    }

    /// Write usage text to the output sink.
    ///
    /// The default rendering may be replaced via [`Command::set_usage`].
    pub fn usage(&self) {
        let rendered = match &self.usage_fn {
            Some(render) => render(self),
            None => self.usage_text(),
        };

        self.output().print(rendered);
    }

    /// Replace the usage renderer for this command.
    pub fn set_usage(&mut self, render: impl Fn(&Command<'a>) -> String + 'a) {
        self.usage_fn = Some(Box::new(render));
    }

    fn subcommands_text(&self) -> String {
        let longest = column_width(self.subcommands.keys().map(String::len));
        let mut rendered = String::new();

        for (name, subcommand) in &self.subcommands {
            rendered.push_str(&format!("  {name:<longest$}  {usage}\n", usage = subcommand.usage));
        }

        rendered
    }

    fn positional_text(&self) -> String {
        let longest = column_width(self.positional.iter().map(|parameter| parameter.name.len()));
        let mut rendered = String::new();

        for parameter in &self.positional {
            rendered.push_str(&format!(
                "  {name:<longest$}  {usage}",
                name = parameter.name,
                usage = parameter.usage
            ));
            if !parameter.value.required() {
                rendered.push_str(&format!(" (default {})", parameter.def_value));
            }
            rendered.push('\n');
        }

        rendered
    }

    /// Print the list of all defined subcommands and their usage strings to
    /// the output sink.
    pub fn print_subcommands(&self) {
        self.output().print(self.subcommands_text());
    }

    /// Print the list of all defined positional parameters and their usage
    /// strings to the output sink.
    pub fn print_positional(&self) {
        self.output().print(self.positional_text());
    }

    /// Pair this command with a specific set of arguments to be parsed.
    pub fn bind(self, args: Vec<String>) -> Bound<'a> {
        Bound {
            command: self,
            args,
        }
    }
}

// Name columns pad to the longest entry, but never less than four.
fn column_width(lengths: impl Iterator<Item = usize>) -> usize {
    lengths.fold(4, usize::max)
}

impl<'a> Bound<'a> {
    /// Parse the bound arguments according to the definition of the command.
    pub fn parse(mut self) -> Result<(), Error> {
        let args = std::mem::take(&mut self.args);
        self.command.parse(args)
    }
}

impl<'a> Deref for Bound<'a> {
    type Target = Command<'a>;

    fn deref(&self) -> &Self::Target {
        &self.command
    }
}

impl<'a> DerefMut for Bound<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.command
    }
}

/// Create a top-level [`Bound`] command from the process invocation.
///
/// The command is named after the invoked program (base name, without
/// extension), described by the given usage, handles errors by exiting, and
/// is bound to the remaining invocation arguments. This is the typical
/// starting point for command line processing.
pub fn program(usage: impl Into<String>) -> Bound<'static> {
    let mut invocation = env::args();
    let name = match invocation.next() {
        Some(arg0) => {
            let stem = Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
            stem.unwrap_or(arg0)
        }
        None => String::default(),
    };

    Command::new(name, usage, ErrorHandling::Exit).bind(invocation.collect())
}
