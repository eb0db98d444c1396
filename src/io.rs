//! Text graph format: a `V E` header followed by `E` records `u v w`.
//!
//! Tokens are whitespace separated; records may share or span lines, but the
//! reported line number always points at the token that failed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::trace;

use crate::error::{Result, SsspError};
use crate::graph::{Edge, Graph, VertexId, Weight};

struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: Option<(usize, std::str::SplitWhitespace<'a>)>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self { Self { lines: s.lines().enumerate(), current: None, last_line: 1 } }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        loop {
            if let Some((line, words)) = self.current.as_mut() {
                if let Some(tok) = words.next() {
                    return Some((*line, tok));
                }
            }
            let (i, l) = self.lines.next()?;
            self.last_line = i + 1;
            self.current = Some((i + 1, l.split_whitespace()));
        }
    }

    fn expect<T: std::str::FromStr>(&mut self, what: &str) -> Result<(usize, T)> {
        let (line, tok) = self.next_token().ok_or_else(|| SsspError::Parse {
            line: self.last_line,
            message: format!("unexpected end of input, expected {what}"),
        })?;
        tok.parse::<T>()
            .map(|v| (line, v))
            .map_err(|_| SsspError::Parse { line, message: format!("expected {what}, found `{tok}`") })
    }
}

pub fn parse_graph(input: &str) -> Result<Graph> {
    let mut toks = Tokens::new(input);
    let (_, vertex_count) = toks.expect::<usize>("vertex count")?;
    let (_, edge_count) = toks.expect::<usize>("edge count")?;
    let mut edges = Vec::with_capacity(edge_count.min(1 << 24));
    for i in 0..edge_count {
        let (line, source) = toks.expect::<VertexId>("source vertex")?;
        let (_, target) = toks.expect::<VertexId>("target vertex")?;
        let (_, weight) = toks.expect::<Weight>("weight")?;
        if source as usize >= vertex_count || target as usize >= vertex_count {
            return Err(SsspError::InvalidGraph(format!(
                "line {line}: edge {i} ({source} -> {target}) outside 0..{vertex_count}"
            )));
        }
        edges.push(Edge::new(source, target, weight));
    }
    if let Some((line, tok)) = toks.next_token() {
        return Err(SsspError::Parse { line, message: format!("trailing data after {edge_count} edges: `{tok}`") });
    }
    trace!(vertex_count, edge_count, "graph parsed");
    Graph::new(vertex_count, edges)
}

pub fn read_graph<R: Read>(mut reader: R) -> Result<Graph> {
    let mut s = String::new();
    reader.read_to_string(&mut s)?;
    parse_graph(&s)
}

pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph> {
    read_graph(BufReader::new(File::open(path)?))
}

pub fn write_graph<W: Write>(graph: &Graph, writer: W) -> Result<()> {
    let mut w = BufWriter::new(writer);
    writeln!(w, "{} {}", graph.vertex_count(), graph.edge_count())?;
    for e in graph.edges() {
        writeln!(w, "{} {} {}", e.source, e.target, e.weight)?;
    }
    w.flush()?;
    Ok(())
}

pub fn save_graph<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    write_graph(graph, File::create(path)?)
}
