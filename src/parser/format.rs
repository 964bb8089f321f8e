//! parser::format
//!
//! Help output settings applied when a parser is rendered.

/// How generated help text is laid out.
///
/// The default reflows descriptions and option help onto single lines,
/// appends `(default: X)` to options that have a default and uses clap's
/// own `Commands` heading.
///
/// ```
/// use begins::HelpFormat;
///
/// let format = HelpFormat::new()
///     .raw_description(true)
///     .argument_defaults(false)
///     .subcommand_heading("Available subcommands");
/// assert!(format.is_raw_description());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpFormat {
    raw_description: bool,
    raw_arguments: bool,
    argument_defaults: bool,
    next_line_help: bool,
    subcommand_heading: Option<String>,
}

impl Default for HelpFormat {
    fn default() -> Self {
        Self {
            raw_description: false,
            raw_arguments: false,
            argument_defaults: true,
            next_line_help: false,
            subcommand_heading: None,
        }
    }
}

impl HelpFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the command description's line breaks and indentation.
    pub fn raw_description(mut self, raw: bool) -> Self {
        self.raw_description = raw;
        self
    }

    /// Keep option help line breaks and indentation.
    pub fn raw_arguments(mut self, raw: bool) -> Self {
        self.raw_arguments = raw;
        self
    }

    /// Append `(default: X)` to option help.
    pub fn argument_defaults(mut self, show: bool) -> Self {
        self.argument_defaults = show;
        self
    }

    /// Print option help below the flags instead of beside them.
    pub fn next_line_help(mut self, enabled: bool) -> Self {
        self.next_line_help = enabled;
        self
    }

    /// Title of the subcommand listing.
    pub fn subcommand_heading(mut self, heading: impl Into<String>) -> Self {
        self.subcommand_heading = Some(heading.into());
        self
    }

    pub fn is_raw_description(&self) -> bool {
        self.raw_description
    }

    pub fn is_raw_arguments(&self) -> bool {
        self.raw_arguments
    }

    pub fn shows_argument_defaults(&self) -> bool {
        self.argument_defaults
    }

    pub fn is_next_line_help(&self) -> bool {
        self.next_line_help
    }

    pub fn heading(&self) -> Option<&str> {
        self.subcommand_heading.as_deref()
    }

    pub(crate) fn description(&self, text: &str) -> String {
        if self.raw_description {
            text.to_string()
        } else {
            reflow(text)
        }
    }

    pub(crate) fn argument(&self, text: &str) -> String {
        if self.raw_arguments {
            text.to_string()
        } else {
            reflow(text)
        }
    }
}

/// Collapse every run of whitespace into one space.
fn reflow(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
