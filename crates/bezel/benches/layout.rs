//! Layout and render benchmarks for bezel.

use std::hint::black_box;

use bezel::{
    Capability, Content, Grid, Node, NodeId, Renderer, Stack, Style, Tree,
    geom::{Insets, Size},
};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

/// A grid of cards, each a column of labels. Returns the tree and one label
/// to edit.
fn build(cards: usize) -> (Tree, NodeId) {
    let mut tree = Tree::new(Node::new("root").policy(Grid::new(4).gap(1)));
    let root = tree.root();
    let mut label = root;
    for c in 0..cards {
        let card = tree
            .push(
                root,
                Node::new(&format!("card{c}"))
                    .policy(Stack::column().gap(1))
                    .with_cap(Capability::Drawable)
                    .style(Style::new().padding(Insets::all(2))),
            )
            .expect("Failed to add card");
        for l in 0..4 {
            label = tree
                .push(
                    card,
                    Node::new(&format!("label{l}"))
                        .text("12:34")
                        .with_cap(Capability::Drawable)
                        .weight(0),
                )
                .expect("Failed to add label");
        }
    }
    (tree, label)
}

/// Benchmark a layout from scratch against one after a single edit.
fn benchmark_layout(c: &mut Criterion) {
    let screen = Size::new(480, 480);
    c.bench_function("layout_cold", |b| {
        b.iter_batched(
            || build(64).0,
            |mut tree| black_box(tree.layout(screen).expect("Failed to lay out")),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("layout_cached", |b| {
        let (mut tree, label) = build(64);
        tree.layout(screen).expect("Failed to lay out");
        let mut tick = 0u32;
        b.iter(|| {
            tick = tick.wrapping_add(1);
            let text = format!("{:02}:{:02}", tick / 60 % 24, tick % 60);
            tree.set_content(label, Content::Text(text))
                .expect("Failed to edit label");
            black_box(tree.layout(screen).expect("Failed to lay out"))
        });
    });
}

/// Benchmark command generation with and without pruning.
fn benchmark_render(c: &mut Criterion) {
    let (mut tree, _) = build(256);
    tree.layout(Size::new(240, 240)).expect("Failed to lay out");
    for prune in [false, true] {
        let renderer = Renderer::new(prune);
        c.bench_function(&format!("render_prune_{prune}"), |b| {
            b.iter(|| black_box(renderer.render(&tree)));
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_layout, benchmark_render
}
criterion_main!(benches);
