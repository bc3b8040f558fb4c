//! Source location information for document nodes.

use serde::{Deserialize, Serialize};

/// Where a node was read from.
///
/// Lines and columns are 1-based; `offset` and `len` are byte positions in the
/// original text and are what snippet renderers use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Byte offset from start of source (0-based)
    pub offset: usize,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters not bytes)
    pub col: usize,

    /// Length in bytes
    pub len: usize,
}

impl SourceInfo {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize, len: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
            len,
        }
    }

    /// Create a SourceInfo from a yaml-rust2 marker.
    ///
    /// yaml-rust2 markers are 0-based for line and column.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker, len: usize) -> Self {
        Self {
            file: None,
            offset: marker.index(),
            line: marker.line() + 1,
            col: marker.col() + 1,
            len,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// End offset (exclusive).
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
            len: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info_creation() {
        let info = SourceInfo::new(Some("agent.yml".into()), 10, 2, 5, 8);
        assert_eq!(info.file.as_deref(), Some("agent.yml"));
        assert_eq!(info.line, 2);
        assert_eq!(info.col, 5);
        assert_eq!(info.end_offset(), 18);
    }

    #[test]
    fn test_default_points_at_start() {
        let info = SourceInfo::default().with_file("agent.yml");
        assert_eq!(info.file.as_deref(), Some("agent.yml"));
        assert_eq!((info.offset, info.line, info.col, info.len), (0, 1, 1, 0));
    }
}
