//! Loader template parsing and rendering.
//!
//! Templates are plain text with named parameters:
//!
//! - `{{ name }}` - replaced by the value of parameter `name`
//! - `\{{` - a literal `{{`
//!
//! Parameter names are ASCII identifiers. Rendering is pure: the same template
//! text and the same parameters always produce byte-identical output.
//!
//! # Example
//!
//! ```
//! use binder_core::template::{LoaderParams, LoaderTemplate};
//!
//! let template = LoaderTemplate::parse("include_bytes!(\"{{ prog_a }}\")").unwrap();
//! let rendered = template.render(&LoaderParams::new("a.bin", "b.bin")).unwrap();
//! assert_eq!(rendered.as_str(), "include_bytes!(\"a.bin\")");
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::payload::PayloadId;

/// Filename of the loader template inside the loader directory.
pub const TEMPLATE_FILE_NAME: &str = "main.rs.tpl";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Errors raised while locating, parsing, or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Loader template not found at {}: {source}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unclosed template parameter at byte {offset}")]
    Unclosed { offset: usize },

    #[error("Empty template parameter at byte {offset}")]
    EmptyParameter { offset: usize },

    #[error("Malformed template parameter '{name}' at byte {offset}")]
    Malformed { offset: usize, name: String },

    #[error("Unresolved template parameter '{name}'")]
    Unresolved { name: String },
}

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Parameter(String),
}

/// The two parameters a loader template is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderParams {
    /// Workspace filename of payload A.
    pub prog_a: String,
    /// Workspace filename of payload B.
    pub prog_b: String,
}

impl LoaderParams {
    pub const PROG_A: &'static str = "prog_a";
    pub const PROG_B: &'static str = "prog_b";

    pub fn new(prog_a: impl Into<String>, prog_b: impl Into<String>) -> Self {
        Self { prog_a: prog_a.into(), prog_b: prog_b.into() }
    }

    /// Parameters bound to the fixed workspace payload filenames.
    pub fn for_workspace() -> Self {
        Self::new(PayloadId::A.file_name(), PayloadId::B.file_name())
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            Self::PROG_A => Some(&self.prog_a),
            Self::PROG_B => Some(&self.prog_b),
            _ => None,
        }
    }
}

/// Rendered loader source. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSource(String);

impl RenderedSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed loader template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderTemplate {
    origin: Option<PathBuf>,
    segments: Vec<Segment>,
}

impl LoaderTemplate {
    /// Read and parse the template stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| TemplateError::Missing { path: path.to_path_buf(), source })?;
        let mut template = Self::parse(&text)?;
        template.origin = Some(path.to_path_buf());
        Ok(template)
    }

    /// Parse template text held in memory.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        Ok(Self { origin: None, segments: parse_segments(text)? })
    }

    /// Path the template was loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct parameter names referenced by the template, in first-use order.
    pub fn parameters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Parameter(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every parameter from `params`.
    pub fn render(&self, params: &LoaderParams) -> Result<RenderedSource, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Parameter(name) => {
                    let value = params
                        .lookup(name)
                        .ok_or_else(|| TemplateError::Unresolved { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(RenderedSource(out))
    }
}

fn parse_segments(input: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < input.len() {
        let tail = &input[pos..];
        let Some(idx) = tail.find(OPEN) else {
            literal.push_str(tail);
            break;
        };
        let open = pos + idx;

        // `\{{` is an escaped literal.
        if tail[..idx].ends_with('\\') {
            literal.push_str(&tail[..idx - 1]);
            literal.push_str(OPEN);
            pos = open + OPEN.len();
            continue;
        }

        literal.push_str(&tail[..idx]);
        let body_start = open + OPEN.len();
        let close = input[body_start..]
            .find(CLOSE)
            .ok_or(TemplateError::Unclosed { offset: open })?;
        let name = input[body_start..body_start + close].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyParameter { offset: open });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TemplateError::Malformed { offset: open, name: name.to_string() });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Parameter(name.to_string()));
        pos = body_start + close + CLOSE.len();
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
