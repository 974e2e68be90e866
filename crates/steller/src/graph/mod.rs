use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Diagram family a graph should be laid out as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramType {
    Flow,
    Tree,
    Timeline,
    Network,
    Comparison,
    ConceptGrid,
    /// Choose from the graph's structure.
    #[default]
    Auto,
}

impl DiagramType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Tree => "tree",
            Self::Timeline => "timeline",
            Self::Network => "network",
            Self::Comparison => "comparison",
            Self::ConceptGrid => "concept-grid",
            Self::Auto => "auto",
        }
    }
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagramType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let ty = match normalized.as_str() {
            "flow" | "flowchart" | "process" | "sequence" => Self::Flow,
            "tree" | "hierarchy" | "hierarchical" | "mindmap" | "org-chart" => Self::Tree,
            "timeline" | "chronology" => Self::Timeline,
            "network" | "graph" | "web" | "force" => Self::Network,
            "comparison" | "compare" | "versus" | "vs" => Self::Comparison,
            "concept-grid" | "conceptgrid" | "grid" | "concepts" => Self::ConceptGrid,
            "auto" | "" => Self::Auto,
            _ => {
                return Err(Error::UnsupportedDiagram {
                    diagram_type: s.to_string(),
                });
            }
        };
        Ok(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Explicit size; falls back to the config's default node size.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            width: None,
            height: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn size(&self, config: &LayoutConfig) -> (f64, f64) {
        (
            self.width.unwrap_or(config.default_node_width),
            self.height.unwrap_or(config.default_node_height),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }
}

/// Input graph. JSON keys are camelCase, matching [`LayoutConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(default)]
    pub diagram_type: DiagramType,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            diagram_type,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    /// Checks the structural invariants and the node sizes against `config`.
    pub fn validate(&self, config: &LayoutConfig) -> Result<()> {
        config.validate()?;

        if self.nodes.is_empty() && !self.edges.is_empty() {
            return Err(Error::EdgesWithoutNodes {
                edge_count: self.edges.len(),
            });
        }

        let mut seen: rustc_hash::FxHashSet<&str> = rustc_hash::FxHashSet::default();
        for n in &self.nodes {
            if !seen.insert(n.id.as_str()) {
                return Err(Error::DuplicateNode {
                    node_id: n.id.clone(),
                });
            }
            let (width, height) = n.size(config);
            if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
                return Err(Error::InvalidNodeSize {
                    node_id: n.id.clone(),
                    width,
                    height,
                });
            }
            if width > config.canvas_width || height > config.canvas_height {
                return Err(Error::NodeExceedsCanvas {
                    node_id: n.id.clone(),
                    width,
                    height,
                    canvas_width: config.canvas_width,
                    canvas_height: config.canvas_height,
                });
            }
        }

        for (edge_index, e) in self.edges.iter().enumerate() {
            for endpoint in [&e.source, &e.target] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(Error::MissingEndpoint {
                        edge_index,
                        source_id: e.source.clone(),
                        target_id: e.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Index-based view of a validated graph: node ids map to arena slots, edges are index pairs.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) edges: Vec<(usize, usize)>,
    pub(crate) out_adj: Vec<Vec<usize>>,
    pub(crate) in_adj: Vec<Vec<usize>>,
}

impl Topology {
    pub(crate) fn new(graph: &Graph) -> Self {
        let index: IndexMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let n = graph.nodes.len();
        let mut out_adj = vec![Vec::new(); n];
        let mut in_adj = vec![Vec::new(); n];
        let mut edges = Vec::with_capacity(graph.edges.len());
        for e in &graph.edges {
            let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
            else {
                continue;
            };
            edges.push((s, t));
            if s != t {
                out_adj[s].push(t);
                in_adj[t].push(s);
            }
        }
        Self {
            edges,
            out_adj,
            in_adj,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.out_adj.len()
    }

    pub(crate) fn degree(&self, v: usize) -> usize {
        self.out_adj[v].len() + self.in_adj[v].len()
    }

    /// Undirected neighbors, deduplicated, in first-seen order.
    pub(crate) fn neighbors(&self, v: usize) -> Vec<usize> {
        let mut out: indexmap::IndexSet<usize> = indexmap::IndexSet::new();
        out.extend(self.out_adj[v].iter().copied());
        out.extend(self.in_adj[v].iter().copied());
        out.into_iter().collect()
    }

    /// Highest-degree node among `candidates`, first one wins ties.
    pub(crate) fn highest_degree<I: IntoIterator<Item = usize>>(&self, candidates: I) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for v in candidates {
            let d = self.degree(v);
            if best.is_none_or(|(_, bd)| d > bd) {
                best = Some((v, d));
            }
        }
        best.map(|(v, _)| v)
    }

    pub(crate) fn has_cycle(&self) -> bool {
        self.topological_order().len() < self.len()
            || self.edges.iter().any(|&(s, t)| s == t)
    }

    /// Kahn's algorithm with input-order tie-breaking. Nodes on cycles are left out.
    pub(crate) fn topological_order(&self) -> Vec<usize> {
        let n = self.len();
        let mut indeg: Vec<usize> = self.in_adj.iter().map(Vec::len).collect();
        let mut ready: std::collections::BTreeSet<usize> =
            (0..n).filter(|&v| indeg[v] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(v) = ready.pop_first() {
            order.push(v);
            for &w in &self.out_adj[v] {
                indeg[w] -= 1;
                if indeg[w] == 0 {
                    ready.insert(w);
                }
            }
        }
        order
    }
}
