use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::JsValue;

use crate::components::note_graph::{NoteEdge, NoteGraphCanvas, NoteGraphData, NoteNode};

const TAG_BG: &str = "#04266c";
const TAGS: &[&str] = &["rust", "wasm", "canvas", "graphs", "notes"];

/// Graph data for the page: the payload embedded by the host when present,
/// otherwise a deterministic sample collection of notes and tags.
fn page_graph_data() -> NoteGraphData {
	match embedded_graph_data() {
		Some(Ok(data)) => data,
		Some(Err(err)) => {
			warn!("embedded main_data_block did not parse: {err}");
			sample_data(30)
		}
		None => sample_data(30),
	}
}

/// The host page hands the graph over as a `main_data_block` global.
fn embedded_graph_data() -> Option<Result<NoteGraphData, serde_json::Error>> {
	let window = web_sys::window()?;
	let value = js_sys::Reflect::get(&window, &JsValue::from_str("main_data_block")).ok()?;
	if value.is_undefined() || value.is_null() {
		return None;
	}
	let raw: String = js_sys::JSON::stringify(&value).ok()?.into();
	Some(NoteGraphData::from_json(&raw))
}

/// Generate a sample note collection: every note links to a tag hub, and
/// later notes reference earlier ones.
fn sample_data(n: usize) -> NoteGraphData {
	let mut nodes: Vec<NoteNode> = (0..n)
		.map(|i| NoteNode {
			id: format!("note-{i}.html"),
			label: Some(format!("Note {i}")),
			bg_color: None,
			link: Some(format!("note-{i}.html")),
		})
		.collect();
	for tag in TAGS {
		nodes.push(NoteNode {
			id: format!("tag-{tag}"),
			label: Some(tag.to_string()),
			bg_color: Some(TAG_BG.to_string()),
			link: Some(format!("#{tag}")),
		});
	}

	let mut edges: Vec<NoteEdge> = (0..n)
		.map(|i| NoteEdge {
			source: format!("note-{i}.html"),
			target: format!("tag-{}", TAGS[i % TAGS.len()]),
			weight: 0.1,
		})
		.collect();
	for i in 1..n {
		let target = (rand_simple(i) * (i as f64)) as usize;
		edges.push(NoteEdge {
			source: format!("note-{i}.html"),
			target: format!("note-{target}.html"),
			weight: 1.0,
		});
	}

	NoteGraphData { nodes, edges }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(page_graph_data);

	let on_navigate = Callback::new(move |path: String| {
		info!("in-page navigation to {path}");
		if let Some(window) = web_sys::window() {
			let _ = window.location().set_hash(&path);
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<NoteGraphCanvas data=graph_data fullscreen=true on_navigate=on_navigate />
				<div class="graph-overlay">
					<h1>"Note Graph"</h1>
					<p class="subtitle">
						"Click a note to open it. Drag nodes to reposition. Scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
