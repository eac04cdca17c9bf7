use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::types::NoteGraphData;

/// Screen-space radius within which a node counts as "under the pointer".
pub const SELECT_RADIUS: f64 = 50.0;
/// Press/release gestures that travel at most this far are clicks, not drags.
pub const CLICK_SLOP: f64 = 2.0;
/// Margin kept between the graph and the canvas edges when fitting the view.
pub const SCREEN_PADDING: f64 = 100.0;

const NODE_MASS: f32 = 10.0;
const RELEASE_MASS: f32 = 1000.0;
const RELEASE_DECAY: f32 = 4.0;

/// Per-node payload carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub label: Option<String>,
	pub bg_color: Option<String>,
	pub link: Option<String>,
}

/// Per-edge payload carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct EdgeInfo {
	pub weight: f32,
}

/// Affine screen <-> world mapping: screen = world * k + (x, y).
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
}

/// The simulation plus everything the canvas needs to present it: the
/// view transform, interaction bookkeeping, and canvas dimensions.
pub struct NoteGraphState {
	pub graph: ForceGraph<NodeInfo, EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	settling: Vec<(DefaultNodeIdx, f32)>,
}

impl NoteGraphState {
	pub fn new(data: &NoteGraphData, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();

		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / data.nodes.len().max(1) as f64;
			let (x, y) = (
				(width / 2.0 + 100.0 * angle.cos()) as f32,
				(height / 2.0 + 100.0 * angle.sin()) as f32,
			);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: NodeInfo {
					label: node.label.clone(),
					bg_color: node.bg_color.clone(),
					link: node.link.clone(),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let mut edge_count = 0;
		for edge in &data.edges {
			match (id_to_idx.get(&edge.source), id_to_idx.get(&edge.target)) {
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(
						src,
						tgt,
						EdgeData {
							user_data: EdgeInfo { weight: edge.weight },
						},
					);
					edge_count += 1;
				}
				_ => warn!(
					"dropping edge with unknown endpoint: {} -> {}",
					edge.source, edge.target
				),
			}
		}
		debug!(
			"simulation built: {} nodes, {} edges",
			data.nodes.len(),
			edge_count
		);

		let mut state = Self {
			graph,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			settling: Vec::new(),
		};
		state.fit_to_view();
		state
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Closest simulation node to a screen point, with its screen distance.
	pub fn nearest(&self, sx: f64, sy: f64) -> Option<(DefaultNodeIdx, f64)> {
		let mut found: Option<(DefaultNodeIdx, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (nx, ny) = self.graph_to_screen(node.x() as f64, node.y() as f64);
			let (dx, dy) = (nx - sx, ny - sy);
			let dist = (dx * dx + dy * dy).sqrt();
			if found.is_none_or(|(_, best)| dist < best) {
				found = Some((node.index(), dist));
			}
		});
		found
	}

	/// The node under the pointer, if any is within [`SELECT_RADIUS`].
	pub fn node_under_pointer(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		self.nearest(sx, sy)
			.filter(|&(_, dist)| dist < SELECT_RADIUS)
			.map(|(idx, _)| idx)
	}

	pub fn node_link(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut link = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				link = node.data.user_data.link.clone();
			}
		});
		link
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		// Keep the outgoing node around so its outline can fade out
		if self.hover.node.is_some() && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
		} else {
			self.hover.prev_node = None;
		}
		self.hover.node = node;
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	/// Anchor a node and start dragging it from a screen-space press point.
	pub fn begin_drag(&mut self, idx: DefaultNodeIdx, sx: f64, sy: f64) {
		self.drag.active = true;
		self.drag.node_idx = Some(idx);
		self.drag.start_x = sx;
		self.drag.start_y = sy;
		let drag = &mut self.drag;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				drag.node_start_x = node.data.x;
				drag.node_start_y = node.data.y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Move the dragged node so it tracks the pointer in world space.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		let (nx, ny) = (
			self.drag.node_start_x + dx as f32,
			self.drag.node_start_y + dy as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
			}
		});
	}

	/// Release the dragged node. Returns true when the whole gesture stayed
	/// within [`CLICK_SLOP`], i.e. it was a click rather than a drag.
	pub fn release_drag(&mut self, sx: f64, sy: f64) -> bool {
		if !self.drag.active {
			return false;
		}
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		self.finish_drag();
		(dx * dx + dy * dy).sqrt() <= CLICK_SLOP
	}

	/// Abort an in-flight drag or pan without click semantics.
	pub fn cancel_interaction(&mut self) {
		if self.drag.active {
			self.finish_drag();
		}
		self.pan.active = false;
		self.set_hover(None);
	}

	fn finish_drag(&mut self) {
		if let Some(idx) = self.drag.node_idx {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
					node.data.mass = RELEASE_MASS;
				}
			});
			self.settling.retain(|&(i, _)| i != idx);
			self.settling.push((idx, RELEASE_MASS - NODE_MASS));
		}
		self.drag = DragState::default();
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan.active = true;
		self.pan.start_x = sx;
		self.pan.start_y = sy;
		self.pan.transform_start_x = self.transform.x;
		self.pan.transform_start_y = self.transform.y;
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	/// Zoom about a screen point, keeping it fixed under the cursor.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);

		// Let recently released nodes settle back to their normal mass
		for (_, boost) in &mut self.settling {
			*boost *= (-RELEASE_DECAY * dt).exp();
		}
		if !self.settling.is_empty() {
			let settling = &self.settling;
			self.graph.visit_nodes_mut(|node| {
				if let Some(&(_, boost)) = settling.iter().find(|&&(i, _)| i == node.index()) {
					node.data.mass = if boost > 0.5 { NODE_MASS + boost } else { NODE_MASS };
				}
			});
		}
		self.settling.retain(|&(_, boost)| boost > 0.5);

		let (target, speed) = if self.hover.node.is_some() {
			(1.0, 1.8)
		} else {
			(0.0, 1.26)
		};
		self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
		if self.hover.node.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
			self.hover.prev_node = None;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit_to_view();
	}

	/// Frame the graph's bounding box inside the canvas, keeping
	/// [`SCREEN_PADDING`] clear on every side and never zooming past 1:1.
	pub fn fit_to_view(&mut self) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((min_x, min_y, max_x, max_y)) => {
					(min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
				}
			});
		});
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			return;
		};

		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let avail_w = (self.width - 2.0 * SCREEN_PADDING).max(1.0);
		let avail_h = (self.height - 2.0 * SCREEN_PADDING).max(1.0);
		let k = if bw < 1.0 && bh < 1.0 {
			1.0
		} else {
			(avail_w / bw.max(1.0)).min(avail_h / bh.max(1.0)).min(1.0)
		};

		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - k * cx,
			y: self.height / 2.0 - k * cy,
			k,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::note_graph::types::{NoteEdge, NoteNode};

	fn node(id: &str) -> NoteNode {
		NoteNode {
			id: id.to_string(),
			label: Some(id.to_string()),
			bg_color: None,
			link: Some(format!("{id}.html")),
		}
	}

	fn edge(source: &str, target: &str) -> NoteEdge {
		NoteEdge {
			source: source.to_string(),
			target: target.to_string(),
			weight: 0.1,
		}
	}

	fn two_node_state() -> NoteGraphState {
		let data = NoteGraphData {
			nodes: vec![node("a"), node("b")],
			edges: vec![edge("a", "b")],
		};
		NoteGraphState::new(&data, 800.0, 600.0)
	}

	fn node_count(state: &NoteGraphState) -> usize {
		let mut n = 0;
		state.graph.visit_nodes(|_| n += 1);
		n
	}

	#[test]
	fn builds_nodes_and_drops_dangling_edges() {
		let data = NoteGraphData {
			nodes: vec![node("a"), node("b")],
			edges: vec![edge("a", "b"), edge("a", "missing")],
		};
		let state = NoteGraphState::new(&data, 800.0, 600.0);
		assert_eq!(node_count(&state), 2);

		let mut edges = 0;
		state.graph.visit_edges(|_, _, _| edges += 1);
		assert_eq!(edges, 1);
	}

	#[test]
	fn transform_round_trips() {
		let state = two_node_state();
		let (gx, gy) = state.screen_to_graph(123.0, 456.0);
		let (sx, sy) = state.graph_to_screen(gx, gy);
		assert!((sx - 123.0).abs() < 1e-9);
		assert!((sy - 456.0).abs() < 1e-9);
	}

	#[test]
	fn empty_graph_has_no_nearest_and_keeps_transform() {
		let mut state = NoteGraphState::new(&NoteGraphData::default(), 800.0, 600.0);
		assert!(state.nearest(100.0, 100.0).is_none());
		state.fit_to_view();
		assert_eq!(state.transform.k, 1.0);
	}

	#[test]
	fn nearest_picks_the_closer_node() {
		let state = two_node_state();
		let mut positions = Vec::new();
		state
			.graph
			.visit_nodes(|n| positions.push((n.index(), n.x() as f64, n.y() as f64)));

		let (idx, wx, wy) = positions[0];
		let (sx, sy) = state.graph_to_screen(wx, wy);
		let (found, dist) = state.nearest(sx + 3.0, sy).unwrap();
		assert_eq!(found, idx);
		assert!((dist - 3.0).abs() < 1e-6);
		assert_eq!(state.node_under_pointer(sx, sy), Some(idx));
	}

	#[test]
	fn pointer_outside_select_radius_hits_nothing() {
		let state = two_node_state();
		// All seed positions lie on a radius-100 circle around the canvas
		// center, so a far corner is well outside SELECT_RADIUS.
		assert_eq!(state.node_under_pointer(-10_000.0, -10_000.0), None);
	}

	#[test]
	fn drag_anchors_moves_and_releases() {
		let mut state = two_node_state();
		let (idx, _) = state.nearest(400.0, 300.0).unwrap();
		let mut pos = (0.0, 0.0);
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				pos = (n.x() as f64, n.y() as f64);
			}
		});
		let (sx, sy) = state.graph_to_screen(pos.0, pos.1);
		assert_eq!(state.node_under_pointer(sx, sy), Some(idx));

		state.begin_drag(idx, sx, sy);
		assert!(state.drag.active);
		let mut anchored = false;
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				anchored = n.data.is_anchor;
			}
		});
		assert!(anchored);

		state.drag_to(sx + 40.0, sy);
		let mut moved = (0.0f32, 0.0f32);
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				moved = (n.data.x, n.data.y);
			}
		});
		let expected_dx = (40.0 / state.transform.k) as f32;
		assert!((moved.0 - (state.drag.node_start_x + expected_dx)).abs() < 1e-3);

		let was_click = state.release_drag(sx + 40.0, sy);
		assert!(!was_click);
		assert!(!state.drag.active);
		let mut released = (true, 0.0f32);
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				released = (n.data.is_anchor, n.data.mass);
			}
		});
		assert!(!released.0);
		assert!(released.1 > 100.0);
	}

	#[test]
	fn release_within_slop_is_a_click() {
		let mut state = two_node_state();
		let idx = state.nearest(0.0, 0.0).unwrap().0;
		state.begin_drag(idx, 100.0, 100.0);
		assert!(state.release_drag(101.0, 101.0));

		state.begin_drag(idx, 100.0, 100.0);
		assert!(!state.release_drag(104.0, 100.0));
	}

	#[test]
	fn released_mass_settles_back() {
		let mut state = two_node_state();
		let idx = state.nearest(0.0, 0.0).unwrap().0;
		state.begin_drag(idx, 100.0, 100.0);
		state.release_drag(100.0, 100.0);

		for _ in 0..500 {
			state.tick(0.016);
		}
		let mut mass = 0.0f32;
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				mass = n.data.mass;
			}
		});
		assert!((mass - 10.0).abs() < 0.6, "mass still boosted: {mass}");
	}

	#[test]
	fn hover_highlight_eases_in_and_out() {
		let mut state = two_node_state();
		let idx = state.nearest(0.0, 0.0).unwrap().0;

		state.set_hover(Some(idx));
		for _ in 0..120 {
			state.tick(0.016);
		}
		assert!(state.hover.highlight_t > 0.9);
		assert!(state.is_hovered(idx));

		state.set_hover(None);
		assert_eq!(state.hover.prev_node, Some(idx));
		for _ in 0..500 {
			state.tick(0.016);
		}
		assert_eq!(state.hover.highlight_t, 0.0);
		assert_eq!(state.hover.prev_node, None);
	}

	#[test]
	fn fit_to_view_respects_padding() {
		let mut nodes = Vec::new();
		for i in 0..4 {
			nodes.push(node(&format!("n{i}")));
		}
		let data = NoteGraphData { nodes, edges: vec![] };
		let mut state = NoteGraphState::new(&data, 800.0, 600.0);

		// Spread the nodes over a wide box, then refit
		let mut i = 0;
		state.graph.visit_nodes_mut(|n| {
			n.data.x = (i % 2) as f32 * 2000.0;
			n.data.y = (i / 2) as f32 * 2000.0;
			i += 1;
		});
		state.fit_to_view();

		assert!(state.transform.k < 1.0);
		state.graph.visit_nodes(|n| {
			let (sx, sy) = state.graph_to_screen(n.x() as f64, n.y() as f64);
			assert!(sx >= SCREEN_PADDING - 1e-6 && sx <= 800.0 - SCREEN_PADDING + 1e-6);
			assert!(sy >= SCREEN_PADDING - 1e-6 && sy <= 600.0 - SCREEN_PADDING + 1e-6);
		});
	}

	#[test]
	fn fit_to_view_never_zooms_in() {
		let data = NoteGraphData {
			nodes: vec![node("a")],
			edges: vec![],
		};
		let mut state = NoteGraphState::new(&data, 800.0, 600.0);
		state.fit_to_view();
		// A single node has no extent; it is centered at 1:1 scale
		assert_eq!(state.transform.k, 1.0);
		let mut pos = (0.0, 0.0);
		state.graph.visit_nodes(|n| pos = (n.x() as f64, n.y() as f64));
		let (sx, sy) = state.graph_to_screen(pos.0, pos.1);
		assert!((sx - 400.0).abs() < 1e-6);
		assert!((sy - 300.0).abs() < 1e-6);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut state = two_node_state();
		let (gx, gy) = state.screen_to_graph(200.0, 150.0);
		state.zoom_at(200.0, 150.0, -1.0);
		let (gx2, gy2) = state.screen_to_graph(200.0, 150.0);
		assert!((gx - gx2).abs() < 1e-9);
		assert!((gy - gy2).abs() < 1e-9);

		for _ in 0..200 {
			state.zoom_at(200.0, 150.0, 1.0);
		}
		assert!(state.transform.k >= 0.1);
	}

	#[test]
	fn pan_offsets_the_transform() {
		let mut state = two_node_state();
		let (tx, ty) = (state.transform.x, state.transform.y);
		state.begin_pan(10.0, 10.0);
		state.pan_to(35.0, -5.0);
		assert!((state.transform.x - (tx + 25.0)).abs() < 1e-9);
		assert!((state.transform.y - (ty - 15.0)).abs() < 1e-9);
	}

	#[test]
	fn cancel_interaction_unanchors() {
		let mut state = two_node_state();
		let idx = state.nearest(0.0, 0.0).unwrap().0;
		state.begin_drag(idx, 50.0, 50.0);
		state.begin_pan(0.0, 0.0);
		state.set_hover(Some(idx));

		state.cancel_interaction();
		assert!(!state.drag.active);
		assert!(!state.pan.active);
		assert_eq!(state.hover.node, None);
		let mut anchored = true;
		state.graph.visit_nodes(|n| {
			if n.index() == idx {
				anchored = n.data.is_anchor;
			}
		});
		assert!(!anchored);
	}
}
