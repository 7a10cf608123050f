use std::{rc::Rc, sync::Arc};

use ahash::AHashSet;
use serde_json::Value;

use crate::{
    errors::FrameGraphError,
    frame::{FramedVertex, VertexType, cast_vertex},
    resolver::CastMode,
    traversal::{EdgeTraversal, Pipeline, Step, owned_labels},
    types::{Direction, Element, ElementKind},
};

/// Vertex-centric traversal. Every step returns a new blueprint; terminals
/// evaluate it against the adapter.
#[derive(Clone)]
pub struct VertexTraversal<'g> {
    pipeline: Pipeline<'g>,
}

impl<'g> VertexTraversal<'g> {
    pub(crate) fn from_pipeline(pipeline: Pipeline<'g>) -> Self {
        Self { pipeline }
    }

    fn step(self, step: Step<'g>) -> Self {
        Self::from_pipeline(self.pipeline.with_step(step))
    }

    fn expand(
        self,
        direction: Direction,
        branch_factor: Option<usize>,
        labels: &[&str],
        emit: ElementKind,
    ) -> Pipeline<'g> {
        self.pipeline.with_step(Step::Expand {
            direction,
            labels: owned_labels(labels),
            branch_factor,
            emit,
        })
    }

    fn expand_v(self, direction: Direction, branch_factor: Option<usize>, labels: &[&str]) -> Self {
        Self::from_pipeline(self.expand(direction, branch_factor, labels, ElementKind::Vertex))
    }

    fn expand_e(
        self,
        direction: Direction,
        branch_factor: Option<usize>,
        labels: &[&str],
    ) -> EdgeTraversal<'g> {
        EdgeTraversal::from_pipeline(self.expand(
            direction,
            branch_factor,
            labels,
            ElementKind::Edge,
        ))
    }

    /// Heads of outgoing edges. An empty label list follows every label.
    pub fn out(self, labels: &[&str]) -> Self {
        self.expand_v(Direction::Out, None, labels)
    }

    /// Like [`out`](Self::out), following at most `branch_factor` edges per vertex.
    pub fn out_bounded(self, branch_factor: usize, labels: &[&str]) -> Self {
        self.expand_v(Direction::Out, Some(branch_factor), labels)
    }

    pub fn in_(self, labels: &[&str]) -> Self {
        self.expand_v(Direction::In, None, labels)
    }

    pub fn in_bounded(self, branch_factor: usize, labels: &[&str]) -> Self {
        self.expand_v(Direction::In, Some(branch_factor), labels)
    }

    /// Vertices across outgoing then incoming edges. A vertex connected both ways
    /// is emitted once per edge.
    pub fn both(self, labels: &[&str]) -> Self {
        self.expand_v(Direction::Both, None, labels)
    }

    pub fn both_bounded(self, branch_factor: usize, labels: &[&str]) -> Self {
        self.expand_v(Direction::Both, Some(branch_factor), labels)
    }

    pub fn out_e(self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::Out, None, labels)
    }

    pub fn out_e_bounded(self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::Out, Some(branch_factor), labels)
    }

    pub fn in_e(self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::In, None, labels)
    }

    pub fn in_e_bounded(self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::In, Some(branch_factor), labels)
    }

    pub fn both_e(self, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::Both, None, labels)
    }

    pub fn both_e_bounded(self, branch_factor: usize, labels: &[&str]) -> EdgeTraversal<'g> {
        self.expand_e(Direction::Both, Some(branch_factor), labels)
    }

    /// Keeps vertices whose property `key` equals `value`.
    pub fn has<V: Into<Value>>(self, key: &str, value: V) -> Self {
        self.step(Step::Has {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn has_not(self, key: &str) -> Self {
        self.step(Step::HasNot(key.into()))
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&FramedVertex<'g>) -> Result<bool, FrameGraphError> + 'g,
    {
        let graph = self.pipeline.graph();
        self.step(Step::Filter(Rc::new(move |element: Element| {
            match element.as_vertex() {
                Some(id) => predicate(&FramedVertex::new(graph, id)),
                None => Ok(false),
            }
        })))
    }

    /// Keeps only vertices in `elements`. The set is fixed when the step is built.
    pub fn retain<I>(self, elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        self.step(Step::Retain(Arc::new(collect_set(elements))))
    }

    /// Drops vertices in `elements`.
    pub fn except<I>(self, elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        self.step(Step::Except(Arc::new(collect_set(elements))))
    }

    pub fn dedup(self) -> Self {
        self.step(Step::Dedup)
    }

    pub fn limit(self, limit: usize) -> Self {
        self.step(Step::Limit(limit))
    }

    /// Names this point of the pipeline for a later [`back`](Self::back).
    pub fn mark(self, name: &str) -> Self {
        self.step(Step::Mark(name.into()))
    }

    /// Replaces each element with the vertex it was at when it passed the step
    /// marked `name`.
    pub fn back(self, name: &str) -> Self {
        self.step(Step::Back {
            name: name.into(),
            kind: ElementKind::Vertex,
        })
    }

    /// Like [`back`](Self::back) for a mark placed on an edge step.
    pub fn back_e(self, name: &str) -> EdgeTraversal<'g> {
        EdgeTraversal::from_pipeline(self.pipeline.with_step(Step::Back {
            name: name.into(),
            kind: ElementKind::Edge,
        }))
    }

    pub fn count(&self) -> Result<usize, FrameGraphError> {
        self.pipeline.count()
    }

    /// First vertex as `T`. Fails with `NoSuchElement` when nothing is emitted.
    pub fn next<T: VertexType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.next_as(CastMode::Checked)
    }

    pub fn next_explicit<T: VertexType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.next_as(CastMode::Explicit)
    }

    pub fn next_as<T: VertexType<'g>>(&self, mode: CastMode) -> Result<T, FrameGraphError> {
        self.try_next_as(mode)?
            .ok_or_else(|| FrameGraphError::no_such_element("vertex traversal is empty"))
    }

    pub fn try_next<T: VertexType<'g>>(&self) -> Result<Option<T>, FrameGraphError> {
        self.try_next_as(CastMode::Checked)
    }

    pub fn try_next_as<T: VertexType<'g>>(
        &self,
        mode: CastMode,
    ) -> Result<Option<T>, FrameGraphError> {
        let graph = self.pipeline.graph();
        self.pipeline
            .first()?
            .map(|element| cast_vertex(graph, element, mode))
            .transpose()
    }

    pub fn to_list<T: VertexType<'g>>(&self) -> Result<Vec<T>, FrameGraphError> {
        self.frames_as(CastMode::Checked).collect()
    }

    pub fn to_list_explicit<T: VertexType<'g>>(&self) -> Result<Vec<T>, FrameGraphError> {
        self.frames_as(CastMode::Explicit).collect()
    }

    /// Lazily materialized, type-checked frames.
    pub fn frames<T: VertexType<'g>>(
        &self,
    ) -> impl Iterator<Item = Result<T, FrameGraphError>> + use<'g, T> {
        self.frames_as(CastMode::Checked)
    }

    pub fn frames_as<T: VertexType<'g>>(
        &self,
        mode: CastMode,
    ) -> impl Iterator<Item = Result<T, FrameGraphError>> + use<'g, T> {
        let graph = self.pipeline.graph();
        self.pipeline
            .elements()
            .map(move |element| cast_vertex(graph, element?, mode))
    }

    pub fn elements(&self) -> impl Iterator<Item = Result<Element, FrameGraphError>> + use<'g> {
        self.pipeline.elements()
    }
}

pub(crate) fn collect_set<I>(elements: I) -> AHashSet<Element>
where
    I: IntoIterator,
    I::Item: Into<Element>,
{
    elements.into_iter().map(Into::into).collect()
}
