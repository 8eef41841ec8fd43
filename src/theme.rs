//! Color and stroke constants for the sketchpad.
//!
//! The canvas and the side panel both draw from here so the two halves
//! of the window stay visually consistent.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Canvas behind the sketch - darkest layer
    pub const CANVAS: Color32 = Color32::from_rgb(14, 17, 23);

    /// Panel backgrounds - slightly lighter than the canvas
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Tooltip card background, translucent over the sketch
    pub fn tooltip() -> Color32 {
        Color32::from_rgba_unmultiplied(24, 26, 34, 235)
    }
}

/// Sketch element colors
pub mod sketch {
    use super::*;

    /// Vertex disc fill
    pub const VERTEX: Color32 = Color32::from_rgb(97, 175, 239);

    /// Edge stroke
    pub const EDGE: Color32 = Color32::from_rgb(150, 150, 160);

    /// Edge under the pointer; clicking it deletes the edge
    pub const EDGE_HOVER: Color32 = Color32::from_rgb(239, 68, 68);

    /// Vertex label text
    pub const LABEL: Color32 = Color32::from_rgb(235, 240, 245);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    /// Primary text - high contrast
    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    /// Muted text - low contrast for hints
    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// State colors for interactive elements
pub mod state {
    use super::*;

    /// Hover state outline
    pub const HOVER: Color32 = Color32::WHITE;

    /// Selected vertex outline
    pub const SELECTED: Color32 = Color32::from_rgb(255, 220, 80);

    /// Advisory messages (rejected edits)
    pub const WARNING: Color32 = Color32::from_rgb(245, 158, 11);
}

/// Vertex outline stroke widths
pub mod stroke_width {
    /// Resting vertex outline
    pub const NORMAL: f32 = 1.5;

    /// Hovered vertex outline
    pub const HOVER: f32 = 2.0;

    /// Selected vertex outline
    pub const SELECTED: f32 = 3.0;
}
