mod component;
mod render;
mod state;
mod types;

pub use component::NoteGraphCanvas;
pub use types::{NoteEdge, NoteGraphData, NoteNode};
