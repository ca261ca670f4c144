/// Behaviour for writing parser output to the user.
///
/// Commands route all usage and error text through their output sink, so an
/// implementation of this trait can redirect or capture everything a parse
/// produces. The default is [`ConsoleInterface`].
pub trait UserInterface {
    /// Write a block of preformatted text (ex: usage), verbatim.
    fn print(&self, message: String);

    /// Write a single error line.
    fn print_error(&self, message: String);
}

/// The default [`UserInterface`], writing to standard error.
#[derive(Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        eprint!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}


#[cfg(test)]
mod tests {
    use super::util::InMemoryInterface;
    use super::*;

    #[test]
    fn in_memory_empty() {
        let interface = InMemoryInterface::default();

        assert_eq!(interface.message(), None);
        assert_eq!(interface.error(), None);
    }

    #[test]
    fn in_memory_collects() {
        let interface = InMemoryInterface::default();

        interface.print("Usage: program\n".to_string());
        interface.print("more\n".to_string());
        interface.print_error("missing command".to_string());

        assert_eq!(interface.message(), Some("Usage: program\nmore\n".to_string()));
        assert_eq!(interface.error(), Some("missing command".to_string()));
    }
}
