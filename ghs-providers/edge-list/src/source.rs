//! Parsing of the whitespace edge-list format.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ghs_core::{GraphError, GraphSource, WeightedEdge};
use tracing::debug;

use crate::EdgeListError;

/// Graph read from `node node weight` lines.
///
/// Lines that are not exactly three integer tokens, including lines that are
/// not valid UTF-8, are skipped and counted.
#[derive(Clone, Debug)]
pub struct EdgeListSource {
    name: String,
    edges: Vec<WeightedEdge>,
    skipped: usize,
}

impl EdgeListSource {
    /// Parses an edge list from `reader`.
    ///
    /// # Errors
    /// Returns [`EdgeListError::Io`] when reading fails and
    /// [`EdgeListError::EmptyInput`] when no line describes an edge.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    ///
    /// use ghs_providers_edge_list::EdgeListSource;
    ///
    /// let source = EdgeListSource::try_from_reader(
    ///     "demo",
    ///     Cursor::new("1 2 1\n# comment\n2 3 2\n"),
    /// )?;
    /// assert_eq!(source.edge_list().len(), 2);
    /// assert_eq!(source.skipped_lines(), 1);
    /// # Ok::<(), ghs_providers_edge_list::EdgeListError>(())
    /// ```
    pub fn try_from_reader<R: BufRead>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, EdgeListError> {
        let mut edges = Vec::new();
        let mut skipped = 0;
        for (number, read) in reader.split(b'\n').enumerate() {
            let bytes = read?;
            let text = std::str::from_utf8(&bytes).ok();
            match text.and_then(parse_line) {
                Some(edge) => edges.push(edge),
                None => {
                    if text.is_none_or(|line| !line.trim().is_empty()) {
                        debug!(line = number + 1, "skipping malformed edge line");
                    }
                    skipped += 1;
                }
            }
        }
        if edges.is_empty() {
            return Err(EdgeListError::EmptyInput);
        }
        Ok(Self {
            name: name.into(),
            edges,
            skipped,
        })
    }

    /// Opens `path` and parses it as an edge list.
    ///
    /// # Errors
    /// Fails when the file cannot be opened or under the same conditions as
    /// [`Self::try_from_reader`].
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, EdgeListError> {
        let file = File::open(path)?;
        Self::try_from_reader(name, BufReader::new(file))
    }

    /// Returns the parsed edges in input order.
    #[must_use]
    pub fn edge_list(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// Returns how many lines did not describe an edge.
    #[must_use]
    pub const fn skipped_lines(&self) -> usize {
        self.skipped
    }
}

impl GraphSource for EdgeListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn edges(&self) -> Result<Vec<WeightedEdge>, GraphError> {
        Ok(self.edges.clone())
    }
}

fn parse_line(line: &str) -> Option<WeightedEdge> {
    let mut tokens = line.split_whitespace().map(str::parse::<i64>);
    let (Some(Ok(a)), Some(Ok(b)), Some(Ok(weight)), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return None;
    };
    Some(WeightedEdge::new(a, b, weight))
}
