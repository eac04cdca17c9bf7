use std::collections::BTreeMap;

use serde::Deserialize;

/// A single note in the graph, as supplied by the host page.
#[derive(Clone, Debug)]
pub struct NoteNode {
	pub id: String,
	pub label: Option<String>,
	pub bg_color: Option<String>,
	pub link: Option<String>,
}

/// A weighted connection between two notes.
#[derive(Clone, Debug)]
pub struct NoteEdge {
	pub source: String,
	pub target: String,
	pub weight: f32,
}

/// Flattened node/edge lists ready to seed the simulation.
#[derive(Clone, Debug, Default)]
pub struct NoteGraphData {
	pub nodes: Vec<NoteNode>,
	pub edges: Vec<NoteEdge>,
}

#[derive(Deserialize)]
struct NodePayload {
	label: Option<String>,
	bg_color: Option<String>,
	link: Option<String>,
}

#[derive(Deserialize)]
struct EdgePayload {
	#[serde(default)]
	weight: f32,
}

// The host emits `nodes` as a map keyed by note id and `edges` as a
// source id -> target id -> attributes nesting.
#[derive(Deserialize)]
struct GraphPayload {
	#[serde(default)]
	nodes: BTreeMap<String, NodePayload>,
	#[serde(default)]
	edges: BTreeMap<String, BTreeMap<String, EdgePayload>>,
}

impl NoteGraphData {
	/// Parse the JSON payload the host page embeds as `main_data_block`.
	///
	/// The BTreeMap keys give a stable id order, so the same payload
	/// always seeds the simulation identically.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		let payload: GraphPayload = serde_json::from_str(raw)?;

		let nodes = payload
			.nodes
			.into_iter()
			.map(|(id, node)| NoteNode {
				id,
				label: node.label,
				bg_color: node.bg_color,
				link: node.link,
			})
			.collect();

		let mut edges = Vec::new();
		for (source, targets) in payload.edges {
			for (target, edge) in targets {
				edges.push(NoteEdge {
					source: source.clone(),
					target,
					weight: edge.weight,
				});
			}
		}

		Ok(Self { nodes, edges })
	}
}
