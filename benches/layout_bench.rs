//! Layout benchmark suite
//!
//! Measures the two hot paths of the SOA core:
//! - planning (dry-run offset arithmetic) for growing field counts
//! - binding (carving live sub-views out of an allocated chunk)
//!
//! Run with: `cargo bench --bench layout_bench`

use std::hint::black_box;
use std::time::Instant;

use soaforge::backend::{DeviceBackend, HostBackend};
use soaforge::layout::{FieldSpec, LayoutPlanner};

const FIELD_COUNTS: [usize; 4] = [16, 64, 256, 1024];
const ITERATIONS: usize = 10_000;

fn make_planner(fields: usize) -> LayoutPlanner {
    let mut planner = LayoutPlanner::new();
    for i in 0..fields {
        // Cycle element sizes and alignments so the walk is not a single
        // degenerate pattern.
        let elem_size = [1usize, 2, 4, 8][i % 4];
        let align = [16usize, 32, 64, 128][i % 4];
        planner.push(FieldSpec::new("bench", elem_size, 64 + i % 64, align));
    }
    planner
}

fn benchmark_planning() {
    println!("\nPlanning (required_size):");
    for &fields in &FIELD_COUNTS {
        let planner = make_planner(fields);

        let start = Instant::now();
        for _ in 0..ITERATIONS {
            black_box(planner.required_size().unwrap());
        }
        let elapsed = start.elapsed();

        let per_iter = elapsed.as_nanos() / ITERATIONS as u128;
        println!(
            "  {:>5} fields: {:>8} ns/plan ({} bytes planned)",
            fields,
            per_iter,
            planner.required_size().unwrap()
        );
    }
}

fn benchmark_binding() {
    println!("\nBinding (carve over a live chunk):");
    let backend = HostBackend::with_chunk_align(128);

    for &fields in &FIELD_COUNTS {
        let planner = make_planner(fields);
        let required = planner.required_size().unwrap();
        let chunk = backend.allocate_chunk(required).unwrap();

        let start = Instant::now();
        for _ in 0..ITERATIONS {
            let mut cursor = chunk.cursor();
            for spec in planner.fields() {
                black_box(cursor.carve_field(spec).unwrap());
            }
        }
        let elapsed = start.elapsed();

        let per_iter = elapsed.as_nanos() / ITERATIONS as u128;
        println!(
            "  {:>5} fields: {:>8} ns/bind ({} byte chunk)",
            fields, per_iter, required
        );
    }
}

fn main() {
    println!("====================================");
    println!("SoaForge Layout Benchmark Suite");
    println!("====================================");

    benchmark_planning();
    benchmark_binding();

    println!("\n====================================");
    println!("Benchmark Complete");
    println!("====================================");
}
