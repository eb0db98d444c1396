use sssp_partitioned::{random_graph, save_graph, write_graph, GeneratorParams};

// usage: gen_graph <vertices> <edges> <max_weight> <seed> [out-file]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 { eprintln!("usage: gen_graph <vertices> <edges> <max_weight> <seed> [out-file]"); std::process::exit(1); }
    let p = GeneratorParams {
        vertices: args[1].parse().expect("vertices"),
        edges: args[2].parse().expect("edges"),
        max_weight: args[3].parse().expect("max_weight"),
        seed: args[4].parse().expect("seed"),
    };
    let g = random_graph(p).unwrap_or_else(|e| { eprintln!("{e}"); std::process::exit(2) });
    let res = match args.get(5) {
        Some(path) => save_graph(&g, path),
        None => write_graph(&g, std::io::stdout().lock()),
    };
    if let Err(e) = res { eprintln!("{e}"); std::process::exit(2); }
}
