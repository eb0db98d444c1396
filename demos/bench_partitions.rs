use std::fs::File;
use std::io::Write;

use sssp_partitioned::{random_graph, run_benchmark, CoordinatorConfig, GeneratorParams, RelaxMode, WorkerBackend};
use tracing_subscriber::EnvFilter;

// Sweeps worker counts and local-pass modes over one seeded graph.
// usage: bench_partitions [--vertices N] [--edges M] [--seed S] [--backend local|thread] [--out path]
fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let mut params = GeneratorParams { vertices: 2000, edges: 10_000, max_weight: 100, seed: 42 };
    let mut backend = WorkerBackend::Local;
    let mut out_path = String::from("bench_partitions.json");
    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let val = args.next().unwrap_or_else(|| { eprintln!("missing value for {flag}"); std::process::exit(1) });
        match flag.as_str() {
            "--vertices" => params.vertices = val.parse().expect("vertices"),
            "--edges" => params.edges = val.parse().expect("edges"),
            "--seed" => params.seed = val.parse().expect("seed"),
            "--backend" => backend = if val == "thread" { WorkerBackend::Thread } else { WorkerBackend::Local },
            "--out" => out_path = val,
            _ => { eprintln!("unknown flag {flag}"); std::process::exit(1); }
        }
    }
    let graph = random_graph(params).unwrap_or_else(|e| { eprintln!("{e}"); std::process::exit(2) });

    let modes = [("single", RelaxMode::SinglePass), ("multi4", RelaxMode::multi_pass(4)), ("fixpoint", RelaxMode::until_fixpoint())];
    let mut rows = Vec::new();
    for workers in [1usize, 2, 4, 7, 16, 64] {
        for (name, mode) in modes {
            let cfg = CoordinatorConfig::new(workers).with_mode(mode).with_backend(backend);
            let (report, validation) = run_benchmark(&graph, &cfg).unwrap_or_else(|e| { eprintln!("workers={workers} mode={name}: {e}"); std::process::exit(2) });
            assert!(validation.is_match(), "workers={workers} mode={name}: {} mismatches", validation.mismatch_count());
            println!(
                "workers={:<3} mode={:<8} rounds={:<5} total_ms={:>9.3} ref_ms={:>9.3} speedup={:>6.2} relax={}",
                workers, name, report.status.rounds(), report.distributed.total_ms, report.reference_ms, report.speedup, report.distributed.relaxations
            );
            let mut row = report.to_json();
            if let serde_json::Value::Object(ref mut map) = row { map.insert("mode_label".to_string(), serde_json::json!(name)); }
            rows.push(row);
        }
    }
    let doc = serde_json::json!({ "graph": params, "runs": rows });
    let mut f = File::create(&out_path).expect("create output");
    f.write_all(serde_json::to_string_pretty(&doc).expect("serialize").as_bytes()).expect("write output");
    eprintln!("wrote {out_path}");
}
