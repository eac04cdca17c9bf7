use web_sys::CanvasRenderingContext2d;

use super::state::NoteGraphState;

const NODE_FONT: &str = "bold 16px Arial";
const LABEL_COLOR: &str = "#d7d7d7";
const EDGE_COLOR: &str = "rgba(0,0,0, 1.0)";
const DEFAULT_BG: &str = "#5a0000";

const CORNER_RADIUS: f64 = 5.0;
const BOX_PADDING: f64 = 10.0;
const SINGLE_LINE_HEIGHT: f64 = 25.0;
const LINE_HEIGHT: f64 = 15.0;
const SPLIT_THRESHOLD: usize = 20;

/// Labels longer than [`SPLIT_THRESHOLD`] wrap at commas, one trimmed
/// segment per line. Everything else stays a single line.
fn label_lines(label: &str) -> Vec<String> {
	if label.chars().count() > SPLIT_THRESHOLD {
		label.split(',').map(|line| line.trim().to_string()).collect()
	} else {
		vec![label.to_string()]
	}
}

/// Box size for a node label, given a text measurement function.
fn node_box<F: Fn(&str) -> f64>(lines: &[String], measure: F) -> (f64, f64) {
	if lines.len() > 1 {
		let widest = lines.iter().map(|line| measure(line)).fold(0.0, f64::max);
		(
			widest + BOX_PADDING,
			lines.len() as f64 * LINE_HEIGHT + BOX_PADDING,
		)
	} else {
		let text = lines.first().map(String::as_str).unwrap_or("");
		(measure(text) + BOX_PADDING, SINGLE_LINE_HEIGHT)
	}
}

/// Trace a rounded-rectangle path; the caller fills and/or strokes it.
fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}

pub fn render(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	state.graph.visit_edges(|n1, n2, edge| {
		ctx.set_line_width(1.0 + 4.0 * edge.user_data.weight as f64);
		ctx.begin_path();
		ctx.move_to(n1.x() as f64, n1.y() as f64);
		ctx.line_to(n2.x() as f64, n2.y() as f64);
		ctx.stroke();
	});
}

fn draw_nodes(state: &NoteGraphState, ctx: &CanvasRenderingContext2d) {
	// Font set before measuring so box widths match the drawn text
	ctx.set_font(NODE_FONT);
	ctx.set_text_align("center");
	let highlight = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		let label = node.data.user_data.label.clone().unwrap_or_default();
		let lines = label_lines(&label);
		let (w, h) = node_box(&lines, |text| {
			ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
		});

		let bg = node.data.user_data.bg_color.as_deref().unwrap_or(DEFAULT_BG);
		ctx.set_fill_style_str(bg);
		rounded_rect(ctx, x - w / 2.0, y - h / 2.0, w, h, CORNER_RADIUS);
		ctx.fill();
		ctx.set_line_width(1.0);
		ctx.set_stroke_style_str(EDGE_COLOR);
		ctx.stroke();

		if state.is_hovered(node.index()) && highlight > 0.01 {
			rounded_rect(
				ctx,
				x - w / 2.0 - 2.0,
				y - h / 2.0 - 2.0,
				w + 4.0,
				h + 4.0,
				CORNER_RADIUS,
			);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * highlight));
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		if label.is_empty() {
			return;
		}
		ctx.set_fill_style_str(LABEL_COLOR);
		if lines.len() > 1 {
			for (i, line) in lines.iter().enumerate() {
				let _ = ctx.fill_text(line, x, y - 5.0 + i as f64 * LINE_HEIGHT);
			}
		} else {
			let _ = ctx.fill_text(&label, x, y + 5.0);
		}
	});
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_labels_stay_single_line() {
		assert_eq!(label_lines("short note"), vec!["short note"]);
		assert_eq!(label_lines(""), vec![""]);
	}

	#[test]
	fn long_labels_split_on_commas() {
		let lines = label_lines("first segment, second segment, third");
		assert_eq!(lines, vec!["first segment", "second segment", "third"]);
	}

	#[test]
	fn long_labels_without_commas_do_not_split() {
		let label = "a rather long label without separators";
		assert_eq!(label_lines(label), vec![label]);
	}

	#[test]
	fn single_line_box_is_measured_width_plus_padding() {
		let lines = label_lines("note");
		let (w, h) = node_box(&lines, |text| text.len() as f64 * 8.0);
		assert_eq!(w, 4.0 * 8.0 + BOX_PADDING);
		assert_eq!(h, SINGLE_LINE_HEIGHT);
	}

	#[test]
	fn multi_line_box_uses_widest_line() {
		let lines = label_lines("aaaa, bbbbbbbbbbbbbbbbbbbbbbbb, cc");
		assert_eq!(lines.len(), 3);
		let (w, h) = node_box(&lines, |text| text.len() as f64 * 8.0);
		assert_eq!(w, 24.0 * 8.0 + BOX_PADDING);
		assert_eq!(h, 3.0 * LINE_HEIGHT + BOX_PADDING);
	}

	#[test]
	fn empty_label_box_is_just_padding() {
		let lines = label_lines("");
		let (w, h) = node_box(&lines, |_| 0.0);
		assert_eq!(w, BOX_PADDING);
		assert_eq!(h, SINGLE_LINE_HEIGHT);
	}

	#[test]
	fn ease_out_cubic_endpoints() {
		assert_eq!(ease_out_cubic(0.0), 0.0);
		assert_eq!(ease_out_cubic(1.0), 1.0);
		assert!(ease_out_cubic(0.5) > 0.5);
	}
}
