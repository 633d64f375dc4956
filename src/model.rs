//! Document model for the block canvas.
//!
//! A [`Block`] is a positioned, typed unit of content. Blocks are owned by the
//! [`BlockStore`](crate::store::BlockStore); everything else reads and mutates
//! them through the store using their [`BlockId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LanguageParseError;

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

/// Unique, immutable identity of a block. Also the join key of the plot map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BlockId)
    }
}

/// A point in canvas (or pointer) coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block kind
// ────────────────────────────────────────────────────────────────────────────

/// Content kind of a block. The set is open: unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    #[default]
    Code,
    Html,
    Css,
    Other(String),
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Code => "code",
            BlockKind::Html => "html",
            BlockKind::Css => "css",
            BlockKind::Other(s) => s,
        }
    }

    /// Only code blocks are sent by single-execute.
    pub fn is_executable(&self) -> bool {
        matches!(self, BlockKind::Code)
    }
}

impl From<&str> for BlockKind {
    fn from(s: &str) -> Self {
        match s {
            "code" => BlockKind::Code,
            "html" => BlockKind::Html,
            "css" => BlockKind::Css,
            other => BlockKind::Other(other.to_string()),
        }
    }
}

impl From<String> for BlockKind {
    fn from(s: String) -> Self {
        BlockKind::from(s.as_str())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language
// ────────────────────────────────────────────────────────────────────────────

/// Execution language tag. Closed set understood by the execution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    R,
    Cpp,
    C,
    Html,
    Css,
    Java,
}

impl Language {
    /// All languages, in the order the language picker lists them.
    pub const ALL: [Language; 8] = [
        Language::JavaScript,
        Language::Python,
        Language::R,
        Language::Cpp,
        Language::C,
        Language::Html,
        Language::Css,
        Language::Java,
    ];

    /// Wire tag sent to the execution service.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::R => "r",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Html => "html",
            Language::Css => "css",
            Language::Java => "java",
        }
    }

    /// Human-readable label for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::R => "R",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Java => "Java",
        }
    }
}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| LanguageParseError(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Last execution result of a block: plain text or a structured JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockOutput {
    Text(String),
    Structured(serde_json::Value),
}

impl Default for BlockOutput {
    fn default() -> Self {
        BlockOutput::Text(String::new())
    }
}

impl BlockOutput {
    pub fn text(s: impl Into<String>) -> Self {
        BlockOutput::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BlockOutput::Text(s) => s.is_empty(),
            BlockOutput::Structured(v) => v.is_null(),
        }
    }

    /// Text shown in the output pane. Structured results are pretty-printed.
    pub fn render(&self) -> String {
        match self {
            BlockOutput::Text(s) => s.clone(),
            BlockOutput::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
        }
    }
}

impl From<&str> for BlockOutput {
    fn from(s: &str) -> Self {
        BlockOutput::Text(s.to_string())
    }
}

impl From<String> for BlockOutput {
    fn from(s: String) -> Self {
        BlockOutput::Text(s)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block
// ────────────────────────────────────────────────────────────────────────────

/// A positioned unit of content on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique within the store; never changes after creation.
    pub id: BlockId,
    /// Block type, serialized as `type` (`code`, `html`, `css`, ...).
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Language tag sent with execution requests.
    pub language: Language,
    /// Source text shown in the editor.
    pub content: String,
    /// Canvas x in whole units after a drag.
    pub x: f64,
    /// Canvas y in whole units after a drag.
    pub y: f64,
    /// Last execution result, or the failure text of the last attempt.
    #[serde(default)]
    pub output: BlockOutput,
}

impl Block {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Shallow field replacement. `id` is never touched.
    pub(crate) fn apply(&mut self, patch: BlockPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(output) = patch.output {
            self.output = output;
        }
    }
}

/// Partial block used for creation defaults and updates.
///
/// Every `None` field is left alone by `update` and filled with a default by
/// `create`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    /// Defaults to `code`.
    pub kind: Option<BlockKind>,
    /// Defaults to JavaScript.
    pub language: Option<Language>,
    /// Defaults to empty.
    pub content: Option<String>,
    /// Defaults to a random coordinate in the placement range.
    pub x: Option<f64>,
    /// Defaults to a random coordinate in the placement range.
    pub y: Option<f64>,
    /// Defaults to empty text.
    pub output: Option<BlockOutput>,
}

impl BlockPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<BlockKind>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn output(mut self, output: impl Into<BlockOutput>) -> Self {
        self.output = Some(output.into());
        self
    }
}
