use serde_json::json;

use framegraph::{
    Direction, EdgeId, Element, FrameGraphError, FramedGraph, GraphAdapter, MemoryAdapter,
    SqliteAdapter, TypeRegistry, VertexId,
};

fn adapters() -> Vec<(&'static str, Box<dyn GraphAdapter>)> {
    vec![
        ("memory", Box::new(MemoryAdapter::new())),
        ("sqlite", Box::new(SqliteAdapter::open_in_memory().expect("sqlite"))),
    ]
}

fn ids(edges: &[framegraph::EdgeRecord]) -> Vec<EdgeId> {
    edges.iter().map(|edge| edge.id).collect()
}

#[test]
fn test_adjacency_follows_creation_order() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        let b = adapter.create_vertex().unwrap();
        let c = adapter.create_vertex().unwrap();
        let ab = adapter.create_edge("knows", a, b).unwrap();
        let ca = adapter.create_edge("knows", c, a).unwrap();
        let ac = adapter.create_edge("likes", a, c).unwrap();

        let out = adapter.adjacent_edges(a, Direction::Out, &[]).unwrap();
        assert_eq!(ids(&out), vec![ab, ac], "{name}");
        let knows = adapter.adjacent_edges(a, Direction::Out, &["knows"]).unwrap();
        assert_eq!(ids(&knows), vec![ab], "{name}");
        let both = adapter.adjacent_edges(a, Direction::Both, &[]).unwrap();
        assert_eq!(ids(&both), vec![ab, ac, ca], "{name}");
        let incoming = adapter.adjacent_edges(a, Direction::In, &["knows"]).unwrap();
        assert_eq!(incoming[0].tail, c, "{name}");
        assert_eq!(incoming[0].head, a, "{name}");

        assert_eq!(adapter.vertex_ids().unwrap(), vec![a, b, c], "{name}");
        assert_eq!(adapter.edge_ids().unwrap(), vec![ab, ca, ac], "{name}");
    }
}

#[test]
fn test_self_loop_is_listed_once_per_direction() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        let aa = adapter.create_edge("self", a, a).unwrap();
        let both = adapter.adjacent_edges(a, Direction::Both, &[]).unwrap();
        assert_eq!(ids(&both), vec![aa, aa], "{name}");
        assert_eq!(both[0].opposite(a), a, "{name}");
    }
}

#[test]
fn test_property_values_keep_their_types() {
    for (name, adapter) in adapters() {
        let v = Element::Vertex(adapter.create_vertex().unwrap());
        adapter.set_property(v, "name", json!("Bryn")).unwrap();
        adapter.set_property(v, "age", json!(37)).unwrap();
        adapter.set_property(v, "score", json!(2.5)).unwrap();
        adapter.set_property(v, "active", json!(false)).unwrap();

        assert_eq!(adapter.get_property(v, "age").unwrap(), Some(json!(37)), "{name}");
        assert_eq!(adapter.get_property(v, "score").unwrap(), Some(json!(2.5)), "{name}");
        assert_eq!(adapter.get_property(v, "active").unwrap(), Some(json!(false)), "{name}");
        assert_eq!(adapter.get_property(v, "missing").unwrap(), None, "{name}");

        let keys: Vec<String> = adapter.properties(v).unwrap().into_keys().collect();
        assert_eq!(keys, vec!["active", "age", "name", "score"], "{name}");

        adapter.set_property(v, "age", json!(38)).unwrap();
        assert_eq!(adapter.remove_property(v, "age").unwrap(), Some(json!(38)), "{name}");
        assert_eq!(adapter.remove_property(v, "age").unwrap(), None, "{name}");
    }
}

#[test]
fn test_invalid_input_is_rejected() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        assert!(
            matches!(
                adapter.create_edge("", a, a),
                Err(FrameGraphError::InvalidInput(_))
            ),
            "{name}"
        );
        assert!(
            matches!(
                adapter.set_property(Element::Vertex(a), "", json!(1)),
                Err(FrameGraphError::InvalidInput(_))
            ),
            "{name}"
        );
        assert!(
            matches!(
                adapter.set_property(Element::Vertex(a), "nested", json!({"a": 1})),
                Err(FrameGraphError::InvalidInput(_))
            ),
            "{name}"
        );
    }
}

#[test]
fn test_missing_elements_are_stale() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        let ghost = VertexId(a.0 + 100);
        assert!(
            matches!(
                adapter.create_edge("knows", a, ghost),
                Err(FrameGraphError::StaleFrame(_))
            ),
            "{name}"
        );
        assert!(
            matches!(adapter.edge(EdgeId(42)), Err(FrameGraphError::StaleFrame(_))),
            "{name}"
        );
        assert!(
            matches!(
                adapter.adjacent_edges(ghost, Direction::Out, &[]),
                Err(FrameGraphError::StaleFrame(_))
            ),
            "{name}"
        );
        assert!(!adapter.contains(Element::Vertex(ghost)).unwrap(), "{name}");
    }
}

#[test]
fn test_remove_vertex_cascades_to_incident_edges() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        let b = adapter.create_vertex().unwrap();
        let c = adapter.create_vertex().unwrap();
        let ab = adapter.create_edge("knows", a, b).unwrap();
        let cb = adapter.create_edge("knows", c, b).unwrap();
        let ac = adapter.create_edge("knows", a, c).unwrap();
        adapter
            .set_property(Element::Edge(ab), "years", json!(15))
            .unwrap();

        adapter.remove_vertex(b).unwrap();

        assert!(!adapter.contains(Element::Vertex(b)).unwrap(), "{name}");
        assert!(!adapter.contains(Element::Edge(ab)).unwrap(), "{name}");
        assert!(!adapter.contains(Element::Edge(cb)).unwrap(), "{name}");
        assert_eq!(adapter.edge_ids().unwrap(), vec![ac], "{name}");
        let out = adapter.adjacent_edges(a, Direction::Out, &[]).unwrap();
        assert_eq!(ids(&out), vec![ac], "{name}");
        assert!(adapter.remove_vertex(b).is_err(), "{name}");
    }
}

#[test]
fn test_remove_element_dispatches_on_kind() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();
        let b = adapter.create_vertex().unwrap();
        let ab = adapter.create_edge("knows", a, b).unwrap();

        adapter.remove_element(Element::Edge(ab)).unwrap();
        assert!(adapter.contains(Element::Vertex(b)).unwrap(), "{name}");
        adapter.remove_element(Element::Vertex(b)).unwrap();
        assert_eq!(adapter.vertex_ids().unwrap(), vec![a], "{name}");
    }
}

#[test]
fn test_begin_commit_and_rollback() {
    for (name, adapter) in adapters() {
        let a = adapter.create_vertex().unwrap();

        adapter.begin().unwrap();
        let b = adapter.create_vertex().unwrap();
        adapter.create_edge("knows", a, b).unwrap();
        adapter.commit().unwrap();

        adapter.begin().unwrap();
        adapter.remove_vertex(b).unwrap();
        adapter
            .set_property(Element::Vertex(a), "name", json!("gone"))
            .unwrap();
        adapter.rollback().unwrap();

        assert!(adapter.contains(Element::Vertex(b)).unwrap(), "{name}");
        assert_eq!(adapter.adjacent_edges(a, Direction::Out, &[]).unwrap().len(), 1, "{name}");
        assert_eq!(adapter.get_property(Element::Vertex(a), "name").unwrap(), None, "{name}");
    }
}

#[test]
fn test_borrowed_adapter_backs_generic_code() {
    fn count_out<A: GraphAdapter>(adapter: A, vertex: VertexId) -> usize {
        adapter
            .adjacent_edges(vertex, Direction::Out, &[])
            .map(|edges| edges.len())
            .unwrap_or_default()
    }

    let adapter = MemoryAdapter::new();
    let a = adapter.create_vertex().unwrap();
    let b = adapter.create_vertex().unwrap();
    adapter.create_edge("knows", a, b).unwrap();
    assert_eq!(count_out(&adapter, a), 1);
    assert_eq!(adapter.edge_count(), 1);
}

#[test]
fn test_sqlite_graph_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("graph.db");

    let (a, b) = {
        let adapter = SqliteAdapter::open(&path).expect("open");
        let a = adapter.create_vertex().unwrap();
        let b = adapter.create_vertex().unwrap();
        let ab = adapter.create_edge("knows", a, b).unwrap();
        adapter
            .set_property(Element::Edge(ab), "years", json!(15))
            .unwrap();
        adapter
            .set_property(Element::Vertex(a), "name", json!("Bryn"))
            .unwrap();
        (a, b)
    };

    let graph = FramedGraph::new(SqliteAdapter::open(&path).expect("reopen"), TypeRegistry::new());
    let adapter = graph.adapter();
    assert_eq!(adapter.vertex_ids().unwrap(), vec![a, b]);
    let out = adapter.adjacent_edges(a, Direction::Out, &["knows"]).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].head, b);
    assert_eq!(
        adapter.get_property(Element::Edge(out[0].id), "years").unwrap(),
        Some(json!(15))
    );
    assert_eq!(
        adapter.get_property(Element::Vertex(a), "name").unwrap(),
        Some(json!("Bryn"))
    );
}

#[test]
fn test_sqlite_ids_are_not_reused_after_removal() {
    let adapter = SqliteAdapter::open_in_memory().expect("sqlite");
    let a = adapter.create_vertex().unwrap();
    adapter.remove_vertex(a).unwrap();
    let b = adapter.create_vertex().unwrap();
    assert_ne!(a, b);

    let memory = MemoryAdapter::new();
    let a = memory.create_vertex().unwrap();
    memory.remove_vertex(a).unwrap();
    assert_ne!(memory.create_vertex().unwrap(), a);
}

#[test]
fn test_graph_context_moves_to_a_worker_thread() {
    for graph in [
        FramedGraph::in_memory(TypeRegistry::new()),
        FramedGraph::sqlite_in_memory(TypeRegistry::new()).expect("sqlite"),
    ] {
        let a = graph.adapter().create_vertex().unwrap();
        let b = graph.adapter().create_vertex().unwrap();
        graph.adapter().create_edge("knows", a, b).unwrap();

        let worker = std::thread::spawn(move || {
            let reached = graph.v([a]).out(&["knows"]).count().unwrap();
            (reached, graph)
        });
        let (reached, graph) = worker.join().expect("worker");

        assert_eq!(reached, 1);
        assert_eq!(graph.vertices().count().unwrap(), 2);
    }
}
