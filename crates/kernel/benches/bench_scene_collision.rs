use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::Instant;

use campus_assets::TextureRegistry;
use campus_common::Category;
use campus_kernel::{creature_node, CreatureKind, SceneNode, World, WorldConfig};
use glam::Vec2;

fn make_graph(node_count: usize, spacing: f32) -> SceneNode {
    let textures = TextureRegistry::campus();
    let mut root = SceneNode::new(Category::empty());
    let side = (node_count as f32).sqrt().ceil() as usize;
    for i in 0..node_count {
        let x = (i % side) as f32 * spacing;
        let y = (i / side) as f32 * spacing;
        root.attach_child(creature_node(CreatureKind::Bunny, &textures, Vec2::new(x, y)));
    }
    root
}

fn bench_collision(node_count: usize, iterations: usize) {
    // 20px spacing with 24px bunnies: every node overlaps its neighbours
    let root = make_graph(node_count, 20.0);

    let start = Instant::now();
    let mut found = 0;
    for _ in 0..iterations {
        let mut pairs = BTreeSet::new();
        black_box(&root).check_scene_collision(black_box(&root), &mut pairs);
        found = pairs.len();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  all pairs ({node_count} nodes, {found} pairs, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_world_update(npc_count: usize, iterations: usize) {
    let mut world = match World::new(WorldConfig::default(), TextureRegistry::campus()) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("failed to build world: {e}");
            return;
        }
    };
    world.add_campus_map_assets();
    let side = (npc_count as f32).sqrt().ceil() as usize;
    for i in 0..npc_count {
        let offset = Vec2::new((i % side) as f32 * 40.0 + 200.0, (i / side) as f32 * 40.0);
        world.add_npc(CreatureKind::Bunny, offset);
    }
    world.spawn_pending();

    let start = Instant::now();
    for _ in 0..iterations {
        world.update(black_box(1.0 / 60.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  world update ({} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        world.node_count()
    );
}

fn main() {
    println!("=== Scene Collision Benchmarks ===\n");

    println!("Collision detection:");
    bench_collision(50, 1000);
    bench_collision(200, 100);
    bench_collision(1000, 10);

    println!("\nWorld update (campus map + NPCs):");
    bench_world_update(10, 1000);
    bench_world_update(100, 100);

    println!("\n=== Done ===");
}
