//! Line-oriented template files with a closed placeholder set. Every
//! generated LOADEST input file is a sequence of literal and templated lines
//! followed by an appended block of raw data rows; the external program only
//! tolerates `#` comments, so the banner layout here is a compatibility
//! contract, not decoration.

use crate::domain::{LoadestError, LoadestResult};
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const BANNER_WIDTH: usize = 70;
pub const COMMENT_CHAR: char = '#';

/// The recognized substitution names. The set is closed on purpose: a typo
/// in a template is a bug in this crate, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Base name of the file currently being written.
    ThisFile,
    /// Creation timestamp of the run.
    Created,
    /// Path of the source specification document.
    Source,
    /// Output base name used as the filename prefix.
    Base,
    /// Human-readable run label.
    Run,
}

impl Placeholder {
    pub const fn token(self) -> &'static str {
        match self {
            Self::ThisFile => "thisfile",
            Self::Created => "created",
            Self::Source => "source",
            Self::Base => "base",
            Self::Run => "run",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "thisfile" => Some(Self::ThisFile),
            "created" => Some(Self::Created),
            "source" => Some(Self::Source),
            "base" => Some(Self::Base),
            "run" => Some(Self::Run),
            _ => None,
        }
    }
}

/// Values substituted into templates. `thisfile` is derived per file at
/// write time and so is not part of this record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderValues {
    pub created: String,
    pub source: String,
    pub base: String,
    pub run: String,
}

impl PlaceholderValues {
    fn resolve<'a>(&'a self, placeholder: Placeholder, thisfile: &'a str) -> &'a str {
        match placeholder {
            Placeholder::ThisFile => thisfile,
            Placeholder::Created => &self.created,
            Placeholder::Source => &self.source,
            Placeholder::Base => &self.base,
            Placeholder::Run => &self.run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// One output line, an ordered sequence of literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLine {
    segments: Vec<Segment>,
}

impl TemplateLine {
    /// A line emitted verbatim, no placeholder scanning.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Literal(text.into())],
        }
    }

    /// A line holding a single value needing string conversion (counts,
    /// option codes).
    pub fn value(value: impl Display) -> Self {
        Self::literal(value.to_string())
    }

    /// Parse a pattern with `{name}` placeholder markers. Unknown names are
    /// rejected when the template is built rather than at render time.
    pub fn parse(pattern: &str) -> LoadestResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let close = after_open.find('}').ok_or_else(|| {
                LoadestError::internal(
                    "SYS.TEMPLATE_SYNTAX",
                    format!("unterminated placeholder in template line '{}'", pattern),
                )
            })?;
            let token = &after_open[..close];
            let placeholder = Placeholder::from_token(token).ok_or_else(|| {
                LoadestError::internal(
                    "SYS.TEMPLATE_PLACEHOLDER",
                    format!("unrecognized placeholder '{{{}}}' in template line '{}'", token, pattern),
                )
            })?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(placeholder));
            rest = &after_open[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() || segments.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, values: &PlaceholderValues, thisfile: &str) -> String {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(placeholder) => {
                    rendered.push_str(values.resolve(*placeholder, thisfile));
                }
            }
        }
        rendered
    }
}

/// An ordered sequence of template lines destined for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFile {
    lines: Vec<TemplateLine>,
}

impl TemplateFile {
    pub fn new(lines: Vec<TemplateLine>) -> Self {
        Self { lines }
    }

    pub fn push(&mut self, line: TemplateLine) {
        self.lines.push(line);
    }

    pub fn extend(&mut self, lines: Vec<TemplateLine>) {
        self.lines.extend(lines);
    }

    pub fn render(&self, values: &PlaceholderValues, thisfile: &str) -> String {
        let mut rendered = self
            .lines
            .iter()
            .map(|line| line.render(values, thisfile))
            .collect::<Vec<_>>()
            .join("\n");
        rendered.push('\n');
        rendered
    }

    /// Render and write, creating or truncating the target. `thisfile` is
    /// taken from the target's base name.
    pub fn write_to(&self, path: &Path, values: &PlaceholderValues) -> LoadestResult<()> {
        let thisfile = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        fs::write(path, self.render(values, thisfile)).map_err(|source| {
            LoadestError::io_system(
                "IO.TEMPLATE_WRITE",
                format!("failed to write '{}': {}", path.display(), source),
            )
        })
    }
}

/// Append raw, unsubstituted data rows after a templated header. Each row is
/// written with its own trailing newline.
pub fn append_data_rows<I>(path: &Path, rows: I) -> LoadestResult<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut file = OpenOptions::new().append(true).open(path).map_err(|source| {
        LoadestError::io_system(
            "IO.TEMPLATE_APPEND",
            format!("failed to open '{}' for append: {}", path.display(), source),
        )
    })?;
    for row in rows {
        writeln!(file, "{}", row.as_ref()).map_err(|source| {
            LoadestError::io_system(
                "IO.TEMPLATE_APPEND",
                format!("failed to append to '{}': {}", path.display(), source),
            )
        })?;
    }
    Ok(())
}

/// The fixed six-line comment banner every produced file starts with.
pub fn banner_lines() -> LoadestResult<Vec<TemplateLine>> {
    let rule = COMMENT_CHAR.to_string().repeat(BANNER_WIDTH);
    Ok(vec![
        TemplateLine::literal(rule.clone()),
        TemplateLine::parse("# {thisfile} created {created}")?,
        TemplateLine::literal("# for LOADEST by loadest-rs"),
        TemplateLine::parse("# from {source}")?,
        TemplateLine::parse("# for run \"{run}\".")?,
        TemplateLine::literal(rule),
    ])
}
