use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use framegraph::{FramedGraph, FramedVertex, TypeDescriptor, TypeRegistry, vertex_frame};
use rand::{Rng, SeedableRng, rngs::StdRng};

const GRAPH_SEED: u64 = 0xF7A3;
const NODES: usize = 2_000;
const OUT_DEGREE: usize = 5;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

static PERSON: TypeDescriptor = TypeDescriptor::vertex("Person");

vertex_frame! {
    struct Person => PERSON;
}

struct PreparedGraph {
    graph: FramedGraph,
    label: &'static str,
}

fn registry() -> TypeRegistry {
    TypeRegistry::new().with(&PERSON)
}

fn prepared_graphs() -> Vec<PreparedGraph> {
    let sqlite = FramedGraph::sqlite_in_memory(registry()).expect("sqlite graph");
    vec![
        populate(FramedGraph::in_memory(registry()), "memory"),
        populate(sqlite, "sqlite"),
    ]
}

/// Random digraph with a fixed out degree, built in one unit of work.
fn populate(graph: FramedGraph, label: &'static str) -> PreparedGraph {
    let mut rng = StdRng::seed_from_u64(GRAPH_SEED);
    graph
        .unit_of_work(|| {
            let people: Vec<Person> = (0..NODES)
                .map(|_| graph.add_vertex())
                .collect::<Result<_, _>>()?;
            for person in &people {
                for _ in 0..OUT_DEGREE {
                    let friend = &people[rng.gen_range(0..NODES)];
                    person.link_out(friend, &["knows"])?;
                }
            }
            Ok(())
        })
        .expect("populate graph");
    PreparedGraph { graph, label }
}

fn start(prepared: &PreparedGraph) -> FramedVertex<'_> {
    prepared
        .graph
        .vertices()
        .next::<FramedVertex>()
        .expect("start vertex")
}

fn bench_expansion(c: &mut Criterion) {
    let graphs = prepared_graphs();
    let mut group = c.benchmark_group("expansion");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for prepared in &graphs {
        let root = start(prepared);
        group.bench_function(format!("{}/two_hop", prepared.label), |b| {
            b.iter(|| root.out(&["knows"]).out(&["knows"]).count().expect("count"));
        });
        group.bench_function(format!("{}/two_hop_dedup", prepared.label), |b| {
            b.iter(|| {
                root.out(&["knows"])
                    .out(&["knows"])
                    .dedup()
                    .count()
                    .expect("count")
            });
        });
        group.bench_function(format!("{}/three_hop_bounded", prepared.label), |b| {
            b.iter(|| {
                root.out_bounded(2, &["knows"])
                    .out_bounded(2, &["knows"])
                    .out_bounded(2, &["knows"])
                    .to_list::<Person>()
                    .expect("frames")
            });
        });
        group.bench_function(format!("{}/mark_back", prepared.label), |b| {
            b.iter(|| {
                root.out(&["knows"])
                    .mark("friend")
                    .out(&["knows"])
                    .retain([root])
                    .back("friend")
                    .count()
                    .expect("count")
            });
        });
    }
    group.finish();
}

fn bench_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("links");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for prepared in prepared_graphs() {
        let graph = &prepared.graph;
        let root = start(&prepared);
        group.bench_function(format!("{}/link_unlink", prepared.label), |b| {
            let other: Person = graph.add_vertex().expect("vertex");
            b.iter(|| {
                root.link_both(&other, &["likes"]).expect("link");
                root.unlink_both(Some(&other), &["likes"]).expect("unlink");
            });
        });
        group.bench_function(format!("{}/set_link_new", prepared.label), |b| {
            b.iter(|| root.set_link_out_new::<Person>(&["mentor"]).expect("set link"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_expansion, bench_links);
criterion_main!(benches);
