use console::style;
use std::fmt;
use std::path::Path;

use alongtrack_core::AlongTrackError;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Track file missing on disk
pub fn track_not_found(path: &Path) -> CliError {
    CliError::new("Track file not found")
        .with_context(format!("The specified track does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use an absolute path or a path relative to the current directory")
        .with_help("Run: alongtrack run --help")
}

/// Track file with an extension no decoder handles
pub fn unsupported_track(path: &Path) -> CliError {
    CliError::new("Unsupported track format")
        .with_context(format!("Only GPX tracks can be processed.\n\nPath: {}", path.display()))
        .with_suggestion("Export the track as .gpx from your route planner")
        .with_help("Run: alongtrack run --help")
}

/// No inclusion rule after merging config, presets and arguments
pub fn no_include_filters() -> CliError {
    CliError::new("No inclusion filters")
        .with_context("At least one key=value inclusion filter is needed to search for points of interest.")
        .with_suggestion("Apply a preset: --preset camping")
        .with_suggestion("Or add a filter: --include amenity=drinking_water")
        .with_help("Run: alongtrack presets")
}

/// Invalid preset name or malformed filter rule
pub fn invalid_filter(err: &AlongTrackError) -> CliError {
    CliError::new("Invalid filter")
        .with_context(err.to_string())
        .with_suggestion("Filters use the form key=value, e.g. tourism=camp_site")
        .with_suggestion("List known presets with: alongtrack presets")
        .with_help("Run: alongtrack run --help")
}

/// Settings that failed validation
pub fn invalid_settings(err: &AlongTrackError) -> CliError {
    CliError::new("Invalid settings")
        .with_context(err.to_string())
        .with_suggestion("Radius, step and batch span must be positive numbers")
        .with_suggestion("Inspect the effective values and their sources: alongtrack config")
        .with_help("Run: alongtrack config")
}

/// Map a library error to a CLI error where a fix can be suggested
pub fn from_core(err: AlongTrackError) -> anyhow::Error {
    match &err {
        AlongTrackError::InvalidFilterSyntax { .. } => invalid_filter(&err).into(),
        AlongTrackError::InvalidParameters { .. }
        | AlongTrackError::ConfigInvalid { .. }
        | AlongTrackError::ConfigMissing { .. } => invalid_settings(&err).into(),
        _ => err.into(),
    }
}
