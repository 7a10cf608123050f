//! Link operators: compound edge mutations anchored at a vertex frame.
//!
//! Every public operator runs as one unit of work, so a failure part way through
//! leaves nothing behind once the adapter rolls back. Inside a caller's unit the
//! operator gets its own savepoint, so the caller can handle the error and carry on.
//! Labels are validated before anything is written.
//!
//! Label lists are read differently here than in traversals: an empty list
//! selects no labels, so `link_*` creates nothing and `unlink_*` removes nothing.

use ahash::AHashSet;
use tracing::debug;

use crate::{
    adapter::validate_label,
    errors::FrameGraphError,
    frame::{ElementFrame, FramedVertex, VertexType},
    resolver::CastMode,
    types::{Direction, EdgeId, VertexId},
};

impl<'g> FramedVertex<'g> {
    /// Creates one `self -> target` edge per label. Existing edges are left alone.
    pub fn link_out(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.link(Direction::Out, target, labels)
    }

    /// Creates one `target -> self` edge per label.
    pub fn link_in(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.link(Direction::In, target, labels)
    }

    /// Creates two edges per label, one in each direction.
    pub fn link_both(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.link(Direction::Both, target, labels)
    }

    /// Removes outgoing edges with any of `labels`, restricted to edges whose head
    /// is `target` when one is given. Matching nothing is not an error.
    pub fn unlink_out(
        &self,
        target: Option<&FramedVertex<'g>>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.unlink(Direction::Out, target, labels)
    }

    pub fn unlink_in(
        &self,
        target: Option<&FramedVertex<'g>>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.unlink(Direction::In, target, labels)
    }

    /// Removes matching edges in both directions. Each direction is handled on its
    /// own, so a target connected one way only loses just that edge.
    pub fn unlink_both(
        &self,
        target: Option<&FramedVertex<'g>>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.unlink(Direction::Both, target, labels)
    }

    /// Drops every outgoing edge with the given labels, whatever its head, then
    /// creates exactly one edge per label to `target`.
    pub fn set_link_out(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.set_link(Direction::Out, target, labels)
    }

    pub fn set_link_in(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.set_link(Direction::In, target, labels)
    }

    pub fn set_link_both(
        &self,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.set_link(Direction::Both, target, labels)
    }

    /// Creates a new `K` vertex and [`set_link_out`](Self::set_link_out)s to it.
    pub fn set_link_out_new<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::Out, labels, CastMode::Checked)
    }

    /// Like [`set_link_out_new`](Self::set_link_out_new) without stamping a
    /// discriminator on the new vertex.
    pub fn set_link_out_new_explicit<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::Out, labels, CastMode::Explicit)
    }

    pub fn set_link_in_new<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::In, labels, CastMode::Checked)
    }

    pub fn set_link_in_new_explicit<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::In, labels, CastMode::Explicit)
    }

    pub fn set_link_both_new<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::Both, labels, CastMode::Checked)
    }

    pub fn set_link_both_new_explicit<K: VertexType<'g>>(
        &self,
        labels: &[&str],
    ) -> Result<K, FrameGraphError> {
        self.set_link_new(Direction::Both, labels, CastMode::Explicit)
    }

    fn link(
        &self,
        direction: Direction,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        self.graph()
            .unit_of_work(|| self.create_links(direction, target.id(), labels))
    }

    fn unlink(
        &self,
        direction: Direction,
        target: Option<&FramedVertex<'g>>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        if labels.is_empty() {
            return Ok(());
        }
        let target = target.map(FramedVertex::id);
        self.graph()
            .unit_of_work(|| self.remove_links(direction, target, labels))
            .map(|_| ())
    }

    fn set_link(
        &self,
        direction: Direction,
        target: &FramedVertex<'g>,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        validate_labels(labels)?;
        self.graph().unit_of_work(|| {
            self.remove_links(direction, None, labels)?;
            self.create_links(direction, target.id(), labels)
        })
    }

    fn set_link_new<K: VertexType<'g>>(
        &self,
        direction: Direction,
        labels: &[&str],
        mode: CastMode,
    ) -> Result<K, FrameGraphError> {
        validate_labels(labels)?;
        let graph = self.graph();
        graph.unit_of_work(|| {
            let created: K = graph.add_vertex_as(mode)?;
            self.remove_links(direction, None, labels)?;
            self.create_links(direction, created.as_vertex().id(), labels)?;
            Ok(created)
        })
    }

    fn create_links(
        &self,
        direction: Direction,
        target: VertexId,
        labels: &[&str],
    ) -> Result<(), FrameGraphError> {
        validate_labels(labels)?;
        let adapter = self.graph().adapter();
        for label in labels {
            if matches!(direction, Direction::Out | Direction::Both) {
                adapter.create_edge(label, self.id(), target)?;
            }
            if matches!(direction, Direction::In | Direction::Both) {
                adapter.create_edge(label, target, self.id())?;
            }
        }
        debug!(
            vertex = self.id().0,
            target = target.0,
            ?direction,
            ?labels,
            "linked"
        );
        Ok(())
    }

    fn remove_links(
        &self,
        direction: Direction,
        target: Option<VertexId>,
        labels: &[&str],
    ) -> Result<usize, FrameGraphError> {
        if labels.is_empty() {
            return Ok(0);
        }
        let mut seen = AHashSet::new();
        let doomed: Vec<EdgeId> = self
            .adjacent(direction, labels)?
            .into_iter()
            .filter(|edge| target.is_none_or(|target| edge.opposite(self.id()) == target))
            .filter(|edge| seen.insert(edge.id))
            .map(|edge| edge.id)
            .collect();
        let adapter = self.graph().adapter();
        for edge in &doomed {
            adapter.remove_edge(*edge)?;
        }
        debug!(
            vertex = self.id().0,
            ?target,
            ?direction,
            ?labels,
            removed = doomed.len(),
            "unlinked"
        );
        Ok(doomed.len())
    }
}

fn validate_labels(labels: &[&str]) -> Result<(), FrameGraphError> {
    labels.iter().try_for_each(|label| validate_label(label))
}
