//! Lazy traversal pipelines.
//!
//! A [`Pipeline`] is a source plus an ordered list of [`Step`]s. Nothing touches
//! the adapter until a terminal pulls from it; every terminal re-runs the
//! pipeline from its source, so a pipeline can be cloned and evaluated any
//! number of times. [`VertexTraversal`] and [`EdgeTraversal`] are the typed
//! faces callers see.
//!
//! Expansion from a multi-element upstream is a concatenation: all results of
//! the first upstream element come before any result of the second.

mod edge;
mod steps;
mod vertex;

pub use edge::EdgeTraversal;
pub use vertex::VertexTraversal;

pub(crate) use steps::{Endpoint, Step};

use std::{iter, sync::Arc};

use crate::{
    errors::FrameGraphError,
    graph::FramedGraph,
    types::{EdgeId, Element, VertexId},
};

/// Where a pipeline starts.
#[derive(Clone, Debug)]
pub(crate) enum Source {
    Vertex(VertexId),
    Edge(EdgeId),
    Vertices(Vec<VertexId>),
    Edges(Vec<EdgeId>),
    AllVertices,
    AllEdges,
}

/// One element moving through the pipeline, with the elements it was at when it
/// passed each marked step.
#[derive(Clone, Debug)]
pub(crate) struct Traverser {
    pub(crate) element: Element,
    marks: Vec<(Arc<str>, Element)>,
}

impl Traverser {
    fn new(element: Element) -> Self {
        Self {
            element,
            marks: Vec::new(),
        }
    }

    pub(crate) fn moved_to(&self, element: Element) -> Self {
        Self {
            element,
            marks: self.marks.clone(),
        }
    }

    pub(crate) fn mark(&mut self, name: Arc<str>) {
        self.marks.push((name, self.element));
    }

    /// Latest element recorded under `name`.
    pub(crate) fn marked(&self, name: &str) -> Option<Element> {
        self.marks
            .iter()
            .rev()
            .find(|(mark, _)| mark.as_ref() == name)
            .map(|(_, element)| *element)
    }
}

pub(crate) type Traversers<'g> = Box<dyn Iterator<Item = Result<Traverser, FrameGraphError>> + 'g>;

#[derive(Clone)]
pub(crate) struct Pipeline<'g> {
    graph: &'g FramedGraph,
    source: Source,
    steps: Vec<Step<'g>>,
}

impl<'g> Pipeline<'g> {
    pub(crate) fn new(graph: &'g FramedGraph, source: Source) -> Self {
        Self {
            graph,
            source,
            steps: Vec::new(),
        }
    }

    pub(crate) fn graph(&self) -> &'g FramedGraph {
        self.graph
    }

    pub(crate) fn with_step(mut self, step: Step<'g>) -> Self {
        self.steps.push(step);
        self
    }

    /// Starts one evaluation. Elements are produced as the iterator is pulled.
    pub(crate) fn evaluate(&self) -> Traversers<'g> {
        let mut current = self.source_iter();
        for step in &self.steps {
            current = step.clone().apply(self.graph, current);
        }
        current
    }

    pub(crate) fn elements(
        &self,
    ) -> impl Iterator<Item = Result<Element, FrameGraphError>> + use<'g> {
        self.evaluate()
            .map(|traverser| traverser.map(|traverser| traverser.element))
    }

    pub(crate) fn count(&self) -> Result<usize, FrameGraphError> {
        self.evaluate().try_fold(0, |count, traverser| {
            traverser?;
            Ok(count + 1)
        })
    }

    pub(crate) fn first(&self) -> Result<Option<Element>, FrameGraphError> {
        self.elements().next().transpose()
    }

    fn source_iter(&self) -> Traversers<'g> {
        let graph = self.graph;
        match &self.source {
            Source::Vertex(id) => Box::new(iter::once(Ok(Traverser::new(Element::Vertex(*id))))),
            Source::Edge(id) => Box::new(iter::once(Ok(Traverser::new(Element::Edge(*id))))),
            Source::Vertices(ids) => Box::new(
                ids.clone()
                    .into_iter()
                    .map(|id| Ok(Traverser::new(Element::Vertex(id)))),
            ),
            Source::Edges(ids) => Box::new(
                ids.clone()
                    .into_iter()
                    .map(|id| Ok(Traverser::new(Element::Edge(id)))),
            ),
            Source::AllVertices => deferred(move || {
                let ids = graph.adapter().vertex_ids()?;
                Ok(ids.into_iter().map(Element::Vertex).collect())
            }),
            Source::AllEdges => deferred(move || {
                let ids = graph.adapter().edge_ids()?;
                Ok(ids.into_iter().map(Element::Edge).collect())
            }),
        }
    }
}

/// Loads a batch of elements on first pull rather than at construction.
fn deferred<'g, F>(load: F) -> Traversers<'g>
where
    F: FnOnce() -> Result<Vec<Element>, FrameGraphError> + 'g,
{
    Box::new(iter::once_with(load).flat_map(|loaded| -> Traversers<'g> {
        match loaded {
            Ok(elements) => Box::new(elements.into_iter().map(|e| Ok(Traverser::new(e)))),
            Err(err) => Box::new(iter::once(Err(err))),
        }
    }))
}

/// Owned label list for a step; an empty list selects every label.
pub(crate) fn owned_labels(labels: &[&str]) -> Arc<[String]> {
    labels.iter().map(|label| label.to_string()).collect()
}
