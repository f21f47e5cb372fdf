// src/engine/cluster.rs

use log::warn;

use crate::geometry::CoordType;

/// One drawable unit: the text of a cell and the number of columns the
/// engine advances by after drawing it.
///
/// Clusters borrow their text from the buffer and only live for the
/// duration of one `paint_buffer_line` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster<'a> {
    text: &'a str,
    columns: CoordType,
}

impl<'a> Cluster<'a> {
    pub fn new(text: &'a str, columns: CoordType) -> Self {
        Self { text, columns }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn columns(&self) -> CoordType {
        self.columns
    }

    /// The text as a single UTF-16 code unit.
    ///
    /// Text that is not exactly one code unit (empty, a surrogate pair, or
    /// a combining sequence) yields U+FFFD.
    pub fn text_as_single(&self) -> char {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.len_utf16() == 1 => c,
            _ => {
                warn!(
                    "Cluster: {:?} is not a single UTF-16 code unit; substituting U+FFFD",
                    self.text
                );
                char::REPLACEMENT_CHARACTER
            }
        }
    }
}

/// Empties `clusters` and hands back its allocation for clusters of a
/// different lifetime.
pub(crate) fn recycle<'b>(mut clusters: Vec<Cluster<'_>>) -> Vec<Cluster<'b>> {
    clusters.clear();
    // In-place collection: the element layouts match, so the allocation is kept.
    clusters.into_iter().filter_map(|_| None).collect()
}
