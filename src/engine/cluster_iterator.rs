// src/engine/cluster_iterator.rs

//! Walks a line of cells as clusters, stopping at the end of an
//! attribute run.

use crate::buffer::TextBufferCellIterator;
use crate::geometry::CoordType;
use crate::glyph::TextAttribute;

use super::cluster::Cluster;

/// Iterates the cells of one attribute run as [`Cluster`]s.
///
/// The run's attribute is taken from the cell the iterator starts on. A
/// move that crosses a cell with a different attribute, or leaves the
/// underlying iterator's bounds, marks the iterator as *exceeded*; it then
/// stays exceeded until [`continue_run`](Self::continue_run) re-arms it.
/// Movement never fails, so callers check [`is_valid`](Self::is_valid)
/// after moving.
#[derive(Debug, Clone, Copy)]
pub struct RenderClusterIterator<'a> {
    cells: TextBufferCellIterator<'a>,
    attr: Option<TextAttribute>,
    exceeded: bool,
    cluster: Cluster<'a>,
}

impl<'a> RenderClusterIterator<'a> {
    pub fn new(cells: TextBufferCellIterator<'a>) -> Self {
        let attr = cells.text_attr();
        let mut it = Self {
            cells,
            attr,
            exceeded: !cells.is_valid(),
            cluster: Cluster::new("", 0),
        };
        it.regenerate();
        it
    }

    /// True while the iterator is inside the run and inside the bounds.
    pub fn is_valid(&self) -> bool {
        !self.exceeded && self.cells.is_valid()
    }

    pub fn cluster(&self) -> Cluster<'a> {
        self.cluster
    }

    /// The attribute of the run being walked.
    pub fn run_attr(&self) -> Option<TextAttribute> {
        self.attr
    }

    /// The underlying cell iterator at the current position.
    pub fn cells(&self) -> &TextBufferCellIterator<'a> {
        &self.cells
    }

    /// Accepts the current cell into the run despite its attribute and
    /// clears the exceeded state. Used to merge runs of blank cells that
    /// look identical.
    pub fn continue_run(&mut self) {
        self.exceeded = !self.cells.is_valid();
    }

    /// Moves by `delta` cells.
    pub fn move_by(&mut self, delta: isize) {
        let step = delta.signum();
        let mut ahead = self.cells;
        for _ in 0..delta.unsigned_abs() {
            ahead.advance(step);
            if !ahead.is_valid() || ahead.text_attr() != self.attr {
                self.exceeded = true;
                break;
            }
        }
        self.cells.advance(delta);
        self.regenerate();
    }

    pub fn increment(&mut self) {
        self.move_by(1);
    }

    pub fn decrement(&mut self) {
        self.move_by(-1);
    }

    /// A copy moved by `delta`.
    pub fn offset(&self, delta: isize) -> Self {
        let mut it = *self;
        it.move_by(delta);
        it
    }

    fn regenerate(&mut self) {
        let columns: CoordType = self.cells.columns();
        self.cluster = Cluster::new(self.cells.chars(), columns);
    }
}

/// Two iterators are equal when they sit on the same cell of the same run
/// in the same exceeded state.
impl PartialEq for RenderClusterIterator<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cells.pos() == other.cells.pos() && self.attr == other.attr && self.exceeded == other.exceeded
    }
}

impl Eq for RenderClusterIterator<'_> {}

impl<'a> Iterator for RenderClusterIterator<'a> {
    type Item = Cluster<'a>;

    /// Yields the current cluster and steps past it (at least one cell).
    fn next(&mut self) -> Option<Cluster<'a>> {
        if !self.is_valid() {
            return None;
        }
        let cluster = self.cluster;
        self.move_by(cluster.columns().max(1) as isize);
        Some(cluster)
    }
}

/// Splits a line into its attribute runs, each as the list of clusters
/// the run consists of.
pub fn cluster_runs<'a>(cells: TextBufferCellIterator<'a>) -> Vec<(TextAttribute, Vec<Cluster<'a>>)> {
    let mut runs = Vec::new();
    let mut cells = cells;
    while cells.is_valid() {
        let mut it = RenderClusterIterator::new(cells);
        let Some(attr) = it.run_attr() else {
            break;
        };
        let clusters: Vec<Cluster<'a>> = it.by_ref().collect();
        runs.push((attr, clusters));
        cells = *it.cells();
    }
    runs
}
