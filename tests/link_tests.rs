use framegraph::{
    ElementFrame, FrameGraphError, FramedGraph, FramedVertex, TypeDescriptor, TypeRegistry,
    VertexType, vertex_frame,
};

static PERSON: TypeDescriptor = TypeDescriptor::vertex("Person").with_labels(&["knows", "likes"]);

vertex_frame! {
    struct Person => PERSON;
}

const KNOWS: &str = "knows";

fn registry() -> TypeRegistry {
    TypeRegistry::new().with(&PERSON)
}

/// Every link scenario runs once per adapter.
fn graphs() -> Vec<(&'static str, FramedGraph)> {
    init_tracing();
    vec![
        ("memory", FramedGraph::in_memory(registry())),
        ("sqlite", FramedGraph::sqlite_in_memory(registry()).unwrap()),
    ]
}

/// p3 has outgoing knows edges to p4 and p5 and incoming ones from p4 and p5,
/// two each way for p4.
struct People<'g> {
    p3: Person<'g>,
    p4: Person<'g>,
    p5: Person<'g>,
}

fn people(graph: &FramedGraph) -> People<'_> {
    let p3: Person = graph.add_vertex().unwrap();
    let p4: Person = graph.add_vertex().unwrap();
    let p5: Person = graph.add_vertex().unwrap();
    for _ in 0..2 {
        p3.add_edge(KNOWS, &p4).unwrap();
        p4.add_edge(KNOWS, &p3).unwrap();
    }
    p3.add_edge(KNOWS, &p5).unwrap();
    p5.add_edge(KNOWS, &p3).unwrap();
    People { p3, p4, p5 }
}

fn out_to(from: &Person<'_>, to: &Person<'_>, label: &str) -> usize {
    from.out(&[label]).retain([to.element()]).count().unwrap()
}

fn in_from(to: &Person<'_>, from: &Person<'_>, label: &str) -> usize {
    to.in_(&[label]).retain([from.element()]).count().unwrap()
}

#[test]
fn test_link_out_single_label() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        let edges_before = p3.out_e(&[KNOWS]).count().unwrap();
        let to_p4_before = out_to(&p3, &p4, KNOWS);

        p3.link_out(&p4, &[KNOWS]).unwrap();

        assert_eq!(p3.out_e(&[KNOWS]).count().unwrap(), edges_before + 1, "{name}");
        assert_eq!(out_to(&p3, &p4, KNOWS), to_p4_before + 1, "{name}");
    }
}

#[test]
fn test_link_out_multi_label() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        let labels = [KNOWS, "likes", "admires"];
        let before: Vec<usize> = labels
            .iter()
            .map(|label| p3.out_e(&[*label]).count().unwrap())
            .collect();

        p3.link_out(&p4, &labels).unwrap();

        for (label, count) in labels.iter().zip(before) {
            assert_eq!(p3.out_e(&[*label]).count().unwrap(), count + 1, "{name} {label}");
        }
        assert_eq!(out_to(&p3, &p4, "admires"), 1, "{name}");
    }
}

#[test]
fn test_link_in_single_and_multi_label() {
    for (name, graph) in graphs() {
        let People { p3, p5, .. } = people(&graph);
        let from_p5 = in_from(&p3, &p5, KNOWS);

        p3.link_in(&p5, &[KNOWS]).unwrap();
        p3.link_in(&p5, &["likes", "admires"]).unwrap();

        assert_eq!(in_from(&p3, &p5, KNOWS), from_p5 + 1, "{name}");
        assert_eq!(in_from(&p3, &p5, "likes"), 1, "{name}");
        assert_eq!(p5.out_e(&["admires"]).count().unwrap(), 1, "{name}");
        assert_eq!(p3.out_e(&["likes"]).count().unwrap(), 0, "{name}");
    }
}

#[test]
fn test_link_both_creates_an_edge_each_way() {
    for (name, graph) in graphs() {
        let People { p3, p5, .. } = people(&graph);
        let both_before = p3.both_e(&[KNOWS]).count().unwrap();
        let out_before = out_to(&p3, &p5, KNOWS);
        let in_before = in_from(&p3, &p5, KNOWS);

        p3.link_both(&p5, &[KNOWS, "likes"]).unwrap();

        assert_eq!(p3.both_e(&[KNOWS]).count().unwrap(), both_before + 2, "{name}");
        assert_eq!(out_to(&p3, &p5, KNOWS), out_before + 1, "{name}");
        assert_eq!(in_from(&p3, &p5, KNOWS), in_before + 1, "{name}");
        assert_eq!(p3.both_e(&["likes"]).count().unwrap(), 2, "{name}");
    }
}

#[test]
fn test_link_with_no_labels_is_a_no_op() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        let edges = graph.edges().count().unwrap();

        p3.link_out(&p4, &[]).unwrap();
        p3.link_both(&p4, &[]).unwrap();
        p3.unlink_out(None, &[]).unwrap();
        p3.unlink_both(Some(&p4), &[]).unwrap();

        assert_eq!(graph.edges().count().unwrap(), edges, "{name}");
    }
}

#[test]
fn test_unlink_without_target_removes_every_matching_edge() {
    for (name, graph) in graphs() {
        let People { p3, .. } = people(&graph);
        p3.link_out(&p3, &["likes"]).unwrap();
        assert!(p3.in_(&[KNOWS]).count().unwrap() > 1);
        assert!(p3.out(&[KNOWS]).count().unwrap() > 1);

        p3.unlink_in(None, &[KNOWS]).unwrap();
        assert_eq!(p3.in_(&[KNOWS]).count().unwrap(), 0, "{name}");
        assert_eq!(p3.out(&[KNOWS]).count().unwrap(), 3, "{name}");

        p3.unlink_out(None, &[KNOWS]).unwrap();
        assert_eq!(p3.out(&[KNOWS]).count().unwrap(), 0, "{name}");
        assert_eq!(p3.out(&["likes"]).count().unwrap(), 1, "{name}");
    }
}

#[test]
fn test_unlink_both_without_target() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);

        p3.unlink_both(None, &[KNOWS]).unwrap();

        assert_eq!(p3.both(&[KNOWS]).count().unwrap(), 0, "{name}");
        assert_eq!(p4.both(&[KNOWS]).count().unwrap(), 0, "{name}");
    }
}

#[test]
fn test_unlink_with_target_keeps_other_edges() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);

        p3.unlink_in(Some(&p4), &[KNOWS]).unwrap();
        assert_eq!(in_from(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(in_from(&p3, &p5, KNOWS), 1, "{name}");
        assert_eq!(out_to(&p3, &p4, KNOWS), 2, "{name}");

        p3.unlink_out(Some(&p4), &[KNOWS]).unwrap();
        assert_eq!(out_to(&p3, &p4, KNOWS), 0, "{name}");
        assert!(p3.out_e(&[KNOWS]).count().unwrap() > 0, "{name}");
    }
}

#[test]
fn test_unlink_both_with_target() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);

        p3.unlink_both(Some(&p4), &[KNOWS]).unwrap();

        assert_eq!(p3.both(&[KNOWS]).retain([p4.element()]).count().unwrap(), 0, "{name}");
        assert_eq!(p3.both_e(&[KNOWS]).count().unwrap(), 2, "{name}");
        assert_eq!(p3.both(&[KNOWS]).dedup().next::<Person>().unwrap(), p5, "{name}");
    }
}

#[test]
fn test_unlink_both_when_only_one_direction_exists() {
    for (name, graph) in graphs() {
        let a: Person = graph.add_vertex().unwrap();
        let b: Person = graph.add_vertex().unwrap();
        let c: Person = graph.add_vertex().unwrap();
        a.link_out(&b, &[KNOWS]).unwrap();
        c.link_out(&a, &[KNOWS]).unwrap();

        a.unlink_both(Some(&b), &[KNOWS]).unwrap();

        assert_eq!(a.out(&[KNOWS]).count().unwrap(), 0, "{name}");
        assert_eq!(a.in_(&[KNOWS]).next::<Person>().unwrap(), c, "{name}");
    }
}

#[test]
fn test_unlink_self_loop_removes_it_once() {
    for (name, graph) in graphs() {
        let a: Person = graph.add_vertex().unwrap();
        a.link_out(&a, &[KNOWS]).unwrap();

        a.unlink_both(Some(&a), &[KNOWS]).unwrap();

        assert_eq!(graph.edges().count().unwrap(), 0, "{name}");
    }
}

#[test]
fn test_unlink_matching_nothing_is_not_an_error() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        let stranger: Person = graph.add_vertex().unwrap();
        let edges = graph.edges().count().unwrap();

        p3.unlink_out(Some(&stranger), &[KNOWS]).unwrap();
        p4.unlink_in(None, &["missing"]).unwrap();

        assert_eq!(graph.edges().count().unwrap(), edges, "{name}");
    }
}

#[test]
fn test_set_link_in() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);
        assert!(in_from(&p3, &p4, KNOWS) > 0);

        p3.set_link_in(&p5, &[KNOWS]).unwrap();

        assert_eq!(in_from(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(in_from(&p3, &p5, KNOWS), 1, "{name}");
        assert_eq!(p3.in_e(&[KNOWS]).count().unwrap(), 1, "{name}");
        assert_eq!(out_to(&p3, &p4, KNOWS), 2, "{name}");
    }
}

#[test]
fn test_set_link_out() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);
        assert!(out_to(&p3, &p4, KNOWS) > 0);

        p3.set_link_out(&p5, &[KNOWS]).unwrap();

        assert_eq!(out_to(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(out_to(&p3, &p5, KNOWS), 1, "{name}");
        assert_eq!(p3.out_e(&[KNOWS]).count().unwrap(), 1, "{name}");
    }
}

#[test]
fn test_set_link_both() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);

        p3.set_link_both(&p5, &[KNOWS]).unwrap();

        assert_eq!(in_from(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(out_to(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(in_from(&p3, &p5, KNOWS), 1, "{name}");
        assert_eq!(out_to(&p3, &p5, KNOWS), 1, "{name}");
    }
}

#[test]
fn test_set_link_collapses_duplicates_to_one_edge() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        p3.link_out(&p4, &[KNOWS]).unwrap();
        assert_eq!(out_to(&p3, &p4, KNOWS), 3);

        p3.set_link_out(&p4, &[KNOWS]).unwrap();
        p3.set_link_out(&p4, &[KNOWS]).unwrap();

        assert_eq!(out_to(&p3, &p4, KNOWS), 1, "{name}");
        assert_eq!(p3.out_e(&[KNOWS]).count().unwrap(), 1, "{name}");
    }
}

#[test]
fn test_set_link_leaves_other_labels_alone() {
    for (name, graph) in graphs() {
        let People { p3, p4, p5 } = people(&graph);
        p3.link_out(&p4, &["likes"]).unwrap();

        p3.set_link_out(&p5, &[KNOWS]).unwrap();

        assert_eq!(out_to(&p3, &p4, "likes"), 1, "{name}");
    }
}

#[test]
fn test_set_new_link_in() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);

        let p6: Person = p3.set_link_in_new(&[KNOWS]).unwrap();

        assert_eq!(in_from(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(in_from(&p3, &p6, KNOWS), 1, "{name}");
        assert_eq!(p6.resolved_type().unwrap(), Some(Person::descriptor()), "{name}");
    }
}

#[test]
fn test_set_new_link_out() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);
        let vertices = graph.vertices().count().unwrap();

        let p6: Person = p3.set_link_out_new(&[KNOWS]).unwrap();

        assert_eq!(out_to(&p3, &p4, KNOWS), 0, "{name}");
        assert_eq!(out_to(&p3, &p6, KNOWS), 1, "{name}");
        assert_eq!(graph.vertices().count().unwrap(), vertices + 1, "{name}");
    }
}

#[test]
fn test_set_new_link_both() {
    for (name, graph) in graphs() {
        let People { p3, p4, .. } = people(&graph);

        let p6: Person = p3.set_link_both_new(&[KNOWS]).unwrap();

        assert_eq!(p3.both(&[KNOWS]).retain([p4.element()]).count().unwrap(), 0, "{name}");
        assert_eq!(out_to(&p3, &p6, KNOWS), 1, "{name}");
        assert_eq!(in_from(&p3, &p6, KNOWS), 1, "{name}");
    }
}

#[test]
fn test_set_new_link_explicit_does_not_stamp() {
    for (name, graph) in graphs() {
        let p3: Person = graph.add_vertex().unwrap();

        let created: FramedVertex = p3.set_link_out_new_explicit(&[KNOWS]).unwrap();

        assert_eq!(created.resolved_type().unwrap(), None, "{name}");
        assert_eq!(p3.out(&[KNOWS]).next::<FramedVertex>().unwrap(), created, "{name}");
    }
}

#[test]
fn test_link_from_typed_and_untyped_frames() {
    for (name, graph) in graphs() {
        let typed: Person = graph.add_vertex().unwrap();
        let plain: FramedVertex = graph.add_vertex_explicit().unwrap();

        typed.link_out(&plain, &[KNOWS]).unwrap();
        plain.link_out(&typed, &[KNOWS]).unwrap();

        assert_eq!(typed.both(&[KNOWS]).count().unwrap(), 2, "{name}");
        assert_eq!(plain.out(&[KNOWS]).next::<Person>().unwrap(), typed, "{name}");
    }
}

#[test]
fn test_link_rejects_blank_label() {
    for (name, graph) in graphs() {
        let a: Person = graph.add_vertex().unwrap();
        let b: Person = graph.add_vertex().unwrap();

        let result = a.link_out(&b, &[KNOWS, ""]);

        assert!(matches!(result, Err(FrameGraphError::InvalidInput(_))), "{name}");
        assert_eq!(graph.edges().count().unwrap(), 0, "{name}");
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
