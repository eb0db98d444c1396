use sssp_partitioned::{load_graph, random_graph, run_benchmark, CoordinatorConfig, GeneratorParams};
use tracing_subscriber::EnvFilter;

// usage: run_one [graph-file]            (config from SSSP_* env vars)
//        run_one --random <V> <E> <seed>
fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args: Vec<String> = std::env::args().collect();
    let graph = match args.get(1).map(String::as_str) {
        Some("--random") => {
            if args.len() < 5 { eprintln!("usage: run_one --random <vertices> <edges> <seed>"); std::process::exit(1); }
            let vertices: usize = args[2].parse().expect("vertices");
            let edges: usize = args[3].parse().expect("edges");
            let seed: u64 = args[4].parse().expect("seed");
            random_graph(GeneratorParams { vertices, edges, seed, ..GeneratorParams::default() })
        }
        Some(path) => load_graph(path),
        None => random_graph(GeneratorParams::default()),
    };
    let graph = match graph { Ok(g) => g, Err(e) => { eprintln!("error {}: {e}", e.code()); std::process::exit(2); } };
    let config = CoordinatorConfig::from_env();
    let (report, validation) = match run_benchmark(&graph, &config) {
        Ok(r) => r,
        Err(e) => { eprintln!("error {}: {e}", e.code()); std::process::exit(2); }
    };
    println!("{}", report.to_json_pretty());
    if let Err(e) = validation.ensure_match() {
        eprintln!("{e}");
        std::process::exit(3);
    }
}
