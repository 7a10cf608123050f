use std::{rc::Rc, sync::Arc};

use serde_json::Value;

use crate::{
    errors::FrameGraphError,
    frame::{EdgeType, FramedEdge, cast_edge},
    resolver::CastMode,
    traversal::{Endpoint, Pipeline, Step, VertexTraversal, owned_labels, vertex::collect_set},
    types::{Element, ElementKind},
};

/// Edge-centric traversal.
#[derive(Clone)]
pub struct EdgeTraversal<'g> {
    pipeline: Pipeline<'g>,
}

impl<'g> EdgeTraversal<'g> {
    pub(crate) fn from_pipeline(pipeline: Pipeline<'g>) -> Self {
        Self { pipeline }
    }

    fn step(self, step: Step<'g>) -> Self {
        Self::from_pipeline(self.pipeline.with_step(step))
    }

    fn endpoint(self, endpoint: Endpoint) -> VertexTraversal<'g> {
        VertexTraversal::from_pipeline(self.pipeline.with_step(Step::Endpoint(endpoint)))
    }

    /// Tail vertex of each edge.
    pub fn tail(self) -> VertexTraversal<'g> {
        self.endpoint(Endpoint::Tail)
    }

    /// Head vertex of each edge.
    pub fn head(self) -> VertexTraversal<'g> {
        self.endpoint(Endpoint::Head)
    }

    /// Tail then head of each edge.
    pub fn both_v(self) -> VertexTraversal<'g> {
        self.endpoint(Endpoint::Both)
    }

    pub fn has<V: Into<Value>>(self, key: &str, value: V) -> Self {
        self.step(Step::Has {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn has_not(self, key: &str) -> Self {
        self.step(Step::HasNot(key.into()))
    }

    /// Keeps edges carrying any of `labels`.
    pub fn has_label(self, labels: &[&str]) -> Self {
        self.step(Step::HasLabel(owned_labels(labels)))
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&FramedEdge<'g>) -> Result<bool, FrameGraphError> + 'g,
    {
        let graph = self.pipeline.graph();
        self.step(Step::Filter(Rc::new(move |element: Element| {
            match element.as_edge() {
                Some(id) => predicate(&FramedEdge::new(graph, id)),
                None => Ok(false),
            }
        })))
    }

    pub fn retain<I>(self, elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        self.step(Step::Retain(Arc::new(collect_set(elements))))
    }

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

    pub fn mark(self, name: &str) -> Self {
        self.step(Step::Mark(name.into()))
    }

    /// Returns to the edge recorded by the step marked `name`.
    pub fn back(self, name: &str) -> Self {
        self.step(Step::Back {
            name: name.into(),
            kind: ElementKind::Edge,
        })
    }

    /// Returns to the vertex recorded by the step marked `name`.
    pub fn back_v(self, name: &str) -> VertexTraversal<'g> {
        VertexTraversal::from_pipeline(self.pipeline.with_step(Step::Back {
            name: name.into(),
            kind: ElementKind::Vertex,
        }))
    }

    pub fn count(&self) -> Result<usize, FrameGraphError> {
        self.pipeline.count()
    }

    pub fn next<T: EdgeType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.next_as(CastMode::Checked)
    }

    pub fn next_explicit<T: EdgeType<'g>>(&self) -> Result<T, FrameGraphError> {
        self.next_as(CastMode::Explicit)
    }

    pub fn next_as<T: EdgeType<'g>>(&self, mode: CastMode) -> Result<T, FrameGraphError> {
        self.try_next_as(mode)?
            .ok_or_else(|| FrameGraphError::no_such_element("edge traversal is empty"))
    }

    pub fn try_next<T: EdgeType<'g>>(&self) -> Result<Option<T>, FrameGraphError> {
        self.try_next_as(CastMode::Checked)
    }

    pub fn try_next_as<T: EdgeType<'g>>(
        &self,
        mode: CastMode,
    ) -> Result<Option<T>, FrameGraphError> {
        let graph = self.pipeline.graph();
        self.pipeline
            .first()?
            .map(|element| cast_edge(graph, element, mode))
            .transpose()
    }

    pub fn to_list<T: EdgeType<'g>>(&self) -> Result<Vec<T>, FrameGraphError> {
        self.frames_as(CastMode::Checked).collect()
    }

    pub fn to_list_explicit<T: EdgeType<'g>>(&self) -> Result<Vec<T>, FrameGraphError> {
        self.frames_as(CastMode::Explicit).collect()
    }

    pub fn frames<T: EdgeType<'g>>(
        &self,
    ) -> impl Iterator<Item = Result<T, FrameGraphError>> + use<'g, T> {
        self.frames_as(CastMode::Checked)
    }

    pub fn frames_as<T: EdgeType<'g>>(
        &self,
        mode: CastMode,
    ) -> impl Iterator<Item = Result<T, FrameGraphError>> + use<'g, T> {
        let graph = self.pipeline.graph();
        self.pipeline
            .elements()
            .map(move |element| cast_edge(graph, element?, mode))
    }

    pub fn elements(&self) -> impl Iterator<Item = Result<Element, FrameGraphError>> + use<'g> {
        self.pipeline.elements()
    }
}
