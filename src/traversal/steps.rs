use std::{iter, rc::Rc, sync::Arc};

use ahash::AHashSet;
use serde_json::Value;

use crate::{
    errors::FrameGraphError,
    graph::FramedGraph,
    traversal::{Traverser, Traversers},
    types::{Direction, EdgeRecord, Element, ElementKind},
};

/// Element-level predicate built by the typed `filter` steps.
pub(crate) type Predicate<'g> = Rc<dyn Fn(Element) -> Result<bool, FrameGraphError> + 'g>;

/// Vertex reached when stepping from an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Tail,
    Head,
    Both,
}

#[derive(Clone)]
pub(crate) enum Step<'g> {
    /// Follow adjacent edges of each vertex, emitting the edges or the vertices
    /// across them. `branch_factor` caps the edges taken per upstream vertex.
    Expand {
        direction: Direction,
        labels: Arc<[String]>,
        branch_factor: Option<usize>,
        emit: ElementKind,
    },
    Endpoint(Endpoint),
    Has { key: Arc<str>, value: Value },
    HasNot(Arc<str>),
    HasLabel(Arc<[String]>),
    Filter(Predicate<'g>),
    Retain(Arc<AHashSet<Element>>),
    Except(Arc<AHashSet<Element>>),
    Dedup,
    Limit(usize),
    Mark(Arc<str>),
    Back { name: Arc<str>, kind: ElementKind },
}

impl<'g> Step<'g> {
    pub(crate) fn apply(self, graph: &'g FramedGraph, upstream: Traversers<'g>) -> Traversers<'g> {
        match self {
            Step::Expand {
                direction,
                labels,
                branch_factor,
                emit,
            } => Box::new(upstream.flat_map(move |item| {
                expand(graph, item, direction, &labels, branch_factor, emit)
            })),
            Step::Endpoint(endpoint) => {
                Box::new(upstream.flat_map(move |item| endpoints(graph, item, endpoint)))
            }
            Step::Has { key, value } => keep_if(upstream, move |traverser| {
                let stored = graph.adapter().get_property(traverser.element, &key)?;
                Ok(stored.as_ref() == Some(&value))
            }),
            Step::HasNot(key) => keep_if(upstream, move |traverser| {
                Ok(graph
                    .adapter()
                    .get_property(traverser.element, &key)?
                    .is_none())
            }),
            Step::HasLabel(labels) => keep_if(upstream, move |traverser| {
                let record = edge_record(graph, traverser.element)?;
                Ok(labels.iter().any(|label| *label == record.label))
            }),
            Step::Filter(predicate) => {
                keep_if(upstream, move |traverser| predicate(traverser.element))
            }
            Step::Retain(elements) => {
                keep_if(upstream, move |traverser| Ok(elements.contains(&traverser.element)))
            }
            Step::Except(elements) => {
                keep_if(upstream, move |traverser| Ok(!elements.contains(&traverser.element)))
            }
            Step::Dedup => {
                let mut seen = AHashSet::new();
                keep_if(upstream, move |traverser| Ok(seen.insert(traverser.element)))
            }
            Step::Limit(limit) => Box::new(upstream.take(limit)),
            Step::Mark(name) => Box::new(upstream.map(move |item| {
                let mut traverser = item?;
                traverser.mark(name.clone());
                Ok(traverser)
            })),
            Step::Back { name, kind } => Box::new(upstream.map(move |item| {
                let traverser = item?;
                let marked = traverser.marked(&name).ok_or_else(|| {
                    FrameGraphError::invalid_input(format!("no step marked {name}"))
                })?;
                if marked.kind() != kind {
                    return Err(FrameGraphError::type_mismatch(
                        kind.to_string(),
                        marked.to_string(),
                    ));
                }
                Ok(traverser.moved_to(marked))
            })),
        }
    }
}

fn keep_if<'g, F>(upstream: Traversers<'g>, mut keep: F) -> Traversers<'g>
where
    F: FnMut(&Traverser) -> Result<bool, FrameGraphError> + 'g,
{
    Box::new(upstream.filter_map(move |item| match item {
        Err(err) => Some(Err(err)),
        Ok(traverser) => match keep(&traverser) {
            Ok(true) => Some(Ok(traverser)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        },
    }))
}

fn expand<'g>(
    graph: &'g FramedGraph,
    item: Result<Traverser, FrameGraphError>,
    direction: Direction,
    labels: &[String],
    branch_factor: Option<usize>,
    emit: ElementKind,
) -> Traversers<'g> {
    let traverser = match item {
        Ok(traverser) => traverser,
        Err(err) => return Box::new(iter::once(Err(err))),
    };
    let Some(vertex) = traverser.element.as_vertex() else {
        return Box::new(iter::once(Err(FrameGraphError::type_mismatch(
            ElementKind::Vertex.to_string(),
            traverser.element.to_string(),
        ))));
    };
    let selected: Vec<&str> = labels.iter().map(String::as_str).collect();
    let edges = match graph.adapter().adjacent_edges(vertex, direction, &selected) {
        Ok(edges) => edges,
        Err(err) => return Box::new(iter::once(Err(err))),
    };
    let limit = branch_factor.unwrap_or(usize::MAX);
    Box::new(edges.into_iter().take(limit).map(move |edge| {
        let next = match emit {
            ElementKind::Edge => Element::Edge(edge.id),
            ElementKind::Vertex => Element::Vertex(match direction {
                Direction::Out => edge.head,
                Direction::In => edge.tail,
                Direction::Both => edge.opposite(vertex),
            }),
        };
        Ok(traverser.moved_to(next))
    }))
}

fn endpoints<'g>(
    graph: &'g FramedGraph,
    item: Result<Traverser, FrameGraphError>,
    endpoint: Endpoint,
) -> Traversers<'g> {
    let result = item.and_then(|traverser| {
        let record = edge_record(graph, traverser.element)?;
        let vertices = match endpoint {
            Endpoint::Tail => vec![record.tail],
            Endpoint::Head => vec![record.head],
            Endpoint::Both => vec![record.tail, record.head],
        };
        Ok(vertices
            .into_iter()
            .map(|vertex| Ok(traverser.moved_to(Element::Vertex(vertex))))
            .collect::<Vec<_>>())
    });
    match result {
        Ok(traversers) => Box::new(traversers.into_iter()),
        Err(err) => Box::new(iter::once(Err(err))),
    }
}

fn edge_record(graph: &FramedGraph, element: Element) -> Result<EdgeRecord, FrameGraphError> {
    let id = element.as_edge().ok_or_else(|| {
        FrameGraphError::type_mismatch(ElementKind::Edge.to_string(), element.to_string())
    })?;
    graph.adapter().edge(id)
}
