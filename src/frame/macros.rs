/// Declares a vertex frame type: a newtype over [`FramedVertex`](crate::FramedVertex)
/// bound to a static [`TypeDescriptor`](crate::TypeDescriptor).
///
/// ```
/// use framegraph::{ElementFrame, FrameGraphError, TypeDescriptor, vertex_frame};
///
/// static PERSON: TypeDescriptor = TypeDescriptor::vertex("Person").with_properties(&["name"]);
///
/// vertex_frame! {
///     /// A person in the social graph.
///     pub struct Person => PERSON;
/// }
///
/// impl Person<'_> {
///     pub fn name(&self) -> Result<Option<String>, FrameGraphError> {
///         self.property("name")
///     }
/// }
/// ```
#[macro_export]
macro_rules! vertex_frame {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $descriptor:path;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $name<'g>($crate::FramedVertex<'g>);

        impl<'g> $crate::VertexType<'g> for $name<'g> {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                &$descriptor
            }

            fn from_vertex(vertex: $crate::FramedVertex<'g>) -> Self {
                Self(vertex)
            }

            fn as_vertex(&self) -> &$crate::FramedVertex<'g> {
                &self.0
            }
        }

        impl<'g> $crate::ElementFrame<'g> for $name<'g> {
            fn graph(&self) -> &'g $crate::FramedGraph {
                $crate::ElementFrame::graph(&self.0)
            }

            fn element(&self) -> $crate::Element {
                $crate::ElementFrame::element(&self.0)
            }
        }

        impl<'g> ::std::ops::Deref for $name<'g> {
            type Target = $crate::FramedVertex<'g>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<'g> ::std::cmp::PartialEq<$crate::FramedVertex<'g>> for $name<'g> {
            fn eq(&self, other: &$crate::FramedVertex<'g>) -> bool {
                self.0 == *other
            }
        }

        impl<'g> ::std::cmp::PartialEq<$name<'g>> for $crate::FramedVertex<'g> {
            fn eq(&self, other: &$name<'g>) -> bool {
                *self == other.0
            }
        }

        impl<'g> ::std::convert::From<$name<'g>> for $crate::Element {
            fn from(frame: $name<'g>) -> Self {
                $crate::ElementFrame::element(&frame)
            }
        }
    };
}

/// Declares an edge frame type: a newtype over [`FramedEdge`](crate::FramedEdge)
/// bound to a static [`TypeDescriptor`](crate::TypeDescriptor).
#[macro_export]
macro_rules! edge_frame {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $descriptor:path;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $name<'g>($crate::FramedEdge<'g>);

        impl<'g> $crate::EdgeType<'g> for $name<'g> {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                &$descriptor
            }

            fn from_edge(edge: $crate::FramedEdge<'g>) -> Self {
                Self(edge)
            }

            fn as_edge(&self) -> &$crate::FramedEdge<'g> {
                &self.0
            }
        }

        impl<'g> $crate::ElementFrame<'g> for $name<'g> {
            fn graph(&self) -> &'g $crate::FramedGraph {
                $crate::ElementFrame::graph(&self.0)
            }

            fn element(&self) -> $crate::Element {
                $crate::ElementFrame::element(&self.0)
            }
        }

        impl<'g> ::std::ops::Deref for $name<'g> {
            type Target = $crate::FramedEdge<'g>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<'g> ::std::cmp::PartialEq<$crate::FramedEdge<'g>> for $name<'g> {
            fn eq(&self, other: &$crate::FramedEdge<'g>) -> bool {
                self.0 == *other
            }
        }

        impl<'g> ::std::cmp::PartialEq<$name<'g>> for $crate::FramedEdge<'g> {
            fn eq(&self, other: &$name<'g>) -> bool {
                *self == other.0
            }
        }

        impl<'g> ::std::convert::From<$name<'g>> for $crate::Element {
            fn from(frame: $name<'g>) -> Self {
                $crate::ElementFrame::element(&frame)
            }
        }
    };
}
