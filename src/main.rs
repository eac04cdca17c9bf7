//! Client-side entry point: mount the app onto the host page.

use leptos::prelude::*;
use note_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(|| view! { <App /> })
}
