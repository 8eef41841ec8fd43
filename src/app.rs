//! Main application state and UI.

use crate::graph::{ClickOutcome, ForceLayout, Graph, MAX_POLYGON_SIDES, MIN_POLYGON_SIDES};
use crate::settings::Settings;
use crate::theme;
use eframe::egui::{self, Color32, Pos2, Rect, Stroke, Vec2};
use std::time::Instant;
use tracing::info;

/// Radius of the circle new polygons are spawned on.
const POLYGON_RADIUS: f32 = 150.0;

/// Extra slack around a vertex disc that still counts as hitting it.
const VERTEX_HIT_SLACK: f32 = 4.0;

/// How close to an edge a click must land to delete it.
const EDGE_HIT_DISTANCE: f32 = 6.0;

/// Scatter radius for the seed graph around the canvas center.
const SEED_SCATTER: f32 = 120.0;

/// What a pointer position on the canvas lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanvasHit {
    Vertex(usize),
    Edge(usize),
    Empty,
}

/// Main sketchpad application
pub struct SketchpadApp {
    // Graph state
    graph: Graph,
    layout: ForceLayout,

    // Interaction state
    selection: Option<usize>,
    hovered: CanvasHit,
    drag_offset: Vec2,
    canvas_rect: Rect,

    // UI state
    vertex_radius: f32,
    show_labels: bool,
    physics_enabled: bool,
    polygon_sides: u32,
    status: Option<String>,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl SketchpadApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        // Load saved settings
        let settings = Settings::load();

        // Create layout with saved physics settings
        let mut layout = ForceLayout::default();
        layout.repulsion = settings.repulsion;
        layout.attraction = settings.attraction;
        layout.centering = settings.centering;
        layout.link_distance = settings.link_distance;

        // The real rect arrives with the first frame; until then assume a
        // plain window so the seed graph lands somewhere sensible
        let canvas_rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(850.0, 575.0));
        let mut graph = Graph::seed(canvas_rect.center(), SEED_SCATTER);
        layout.reheat(&mut graph);
        info!(
            "starting with {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        Self {
            graph,
            layout,
            selection: None,
            hovered: CanvasHit::Empty,
            drag_offset: Vec2::ZERO,
            canvas_rect,
            vertex_radius: settings.vertex_radius,
            show_labels: settings.show_labels,
            physics_enabled: settings.physics_enabled,
            polygon_sides: settings.polygon_sides,
            status: None,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        }
    }

    /// Mark settings as needing save
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Copy current UI state into the settings struct
    fn sync_settings_from_ui(&mut self) {
        self.settings.vertex_radius = self.vertex_radius;
        self.settings.show_labels = self.show_labels;
        self.settings.polygon_sides = self.polygon_sides;
        self.settings.physics_enabled = self.physics_enabled;
        self.settings.repulsion = self.layout.repulsion;
        self.settings.attraction = self.layout.attraction;
        self.settings.centering = self.layout.centering;
        self.settings.link_distance = self.layout.link_distance;
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.sync_settings_from_ui();
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    /// Every successful edit ends the same way: selection and advisory
    /// cleared, simulation reheated.
    fn after_mutation(&mut self) {
        self.selection = None;
        self.status = None;
        self.layout.reheat(&mut self.graph);
    }

    /// Delete the selected vertex. With nothing selected this is a silent
    /// no-op, matching the key being an opportunistic shortcut.
    fn delete_selected(&mut self) {
        if let Some(v) = self.selection.take() {
            let label = self
                .graph
                .vertices()
                .get(v)
                .map(|vert| vert.label.clone())
                .unwrap_or_default();
            if self.graph.delete_vertex(v) {
                self.layout.forget(v);
                info!("deleted {}", label);
                self.after_mutation();
            }
        }
    }

    /// Attach a loop to the selected vertex, or explain why not.
    fn add_loop_to_selection(&mut self) {
        let Some(v) = self.selection else {
            self.status = Some("Select a vertex to add a loop".to_string());
            return;
        };
        if self.graph.add_loop(v) {
            self.after_mutation();
        } else if let Some(vertex) = self.graph.vertices().get(v) {
            self.status = Some(format!("{} already has a loop", vertex.label));
        }
    }

    /// Spawn a polygon in the middle of the canvas, or explain why not.
    fn spawn_polygon(&mut self) {
        let k = self.polygon_sides;
        if self.graph.add_polygon(k, self.canvas_rect.center(), POLYGON_RADIUS) {
            info!("added a {}-gon", k);
            self.after_mutation();
        } else {
            self.status = Some(format!(
                "Polygon size must be between {} and {}",
                MIN_POLYGON_SIDES, MAX_POLYGON_SIDES
            ));
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading(egui::RichText::new("Graph Sketchpad").color(theme::text::PRIMARY));
        ui.add_space(10.0);

        // Info section (always visible)
        ui.label(format!("Vertices: {}", self.graph.vertex_count()));
        ui.label(format!("Edges: {}", self.graph.edge_count()));
        ui.label(format!("Degrees: {}", self.graph.degree_summary()));

        let selected_label = self
            .selection
            .and_then(|v| self.graph.vertices().get(v))
            .map(|v| v.label.clone());
        match selected_label {
            Some(label) => ui.label(format!("Selected: {}", label)),
            None => ui.label("Selected: none"),
        };

        if let Some(status) = self.status.clone() {
            ui.add_space(5.0);
            ui.colored_label(theme::state::WARNING, status);
        }

        ui.add_space(10.0);
        ui.separator();

        egui::CollapsingHeader::new("Edit")
            .default_open(true)
            .show(ui, |ui| {
                if ui.button("Add loop").clicked() {
                    self.add_loop_to_selection();
                }

                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.label("Sides:");
                    // deliberately unclamped; out-of-range values get the
                    // advisory instead of silently snapping
                    if ui
                        .add(egui::DragValue::new(&mut self.polygon_sides).speed(0.1))
                        .changed()
                    {
                        self.mark_settings_dirty();
                    }
                    if ui.button("Add polygon").clicked() {
                        self.spawn_polygon();
                    }
                });

                ui.add_space(5.0);
                ui.label(
                    egui::RichText::new(
                        "Click empty canvas to add a vertex. Click two vertices \
                         to connect them, an edge to remove it. Delete removes \
                         the selected vertex.",
                    )
                    .small()
                    .color(theme::text::MUTED),
                );
            });

        egui::CollapsingHeader::new("Display")
            .default_open(true)
            .show(ui, |ui| {
                if ui
                    .add(
                        egui::Slider::new(&mut self.vertex_radius, 6.0..=30.0)
                            .text("Vertex radius"),
                    )
                    .changed()
                {
                    self.mark_settings_dirty();
                }
                if ui.checkbox(&mut self.show_labels, "Show labels").changed() {
                    self.mark_settings_dirty();
                }
            });

        egui::CollapsingHeader::new("Physics")
            .default_open(false)
            .show(ui, |ui| {
                if ui
                    .checkbox(&mut self.physics_enabled, "Physics enabled")
                    .changed()
                {
                    self.mark_settings_dirty();
                }

                let mut params_changed = false;
                params_changed |= ui
                    .add(
                        egui::Slider::new(&mut self.layout.repulsion, 10.0..=100_000.0)
                            .logarithmic(true)
                            .text("Repulsion"),
                    )
                    .changed();
                params_changed |= ui
                    .add(
                        egui::Slider::new(&mut self.layout.attraction, 0.001..=1.0)
                            .logarithmic(true)
                            .text("Attraction"),
                    )
                    .changed();
                params_changed |= ui
                    .add(
                        egui::Slider::new(&mut self.layout.centering, 0.0001..=0.1)
                            .logarithmic(true)
                            .text("Centering"),
                    )
                    .changed();
                params_changed |= ui
                    .add(
                        egui::Slider::new(&mut self.layout.link_distance, 30.0..=400.0)
                            .fixed_decimals(0)
                            .text("Link distance"),
                    )
                    .changed();
                if params_changed {
                    // new parameters move the equilibrium; wake the sim up
                    self.layout.reheat(&mut self.graph);
                    self.mark_settings_dirty();
                }

                ui.add_space(5.0);
                if self.layout.is_settled() {
                    ui.label(egui::RichText::new("Simulation: settled").color(theme::text::MUTED));
                } else {
                    ui.label(format!(
                        "Simulation: running ({:.2})",
                        self.layout.kinetic_energy()
                    ));
                }

                if ui.button("Reset physics").clicked() {
                    let defaults = ForceLayout::default();
                    self.layout.repulsion = defaults.repulsion;
                    self.layout.attraction = defaults.attraction;
                    self.layout.centering = defaults.centering;
                    self.layout.link_distance = defaults.link_distance;
                    self.layout.reheat(&mut self.graph);
                    self.mark_settings_dirty();
                }
            });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        self.canvas_rect = rect;

        painter.rect_filled(rect, 0.0, theme::bg::CANVAS);

        // Physics tick; the live rect keeps the bounds clamp honest when
        // the window is resized
        if self.physics_enabled {
            self.layout.step(&mut self.graph, rect, self.vertex_radius);
        }

        // Hover hit test, recomputed every frame because edits shift indices
        self.hovered = match response.hover_pos() {
            Some(pointer) => classify_hit(&self.graph, pointer, self.vertex_radius),
            None => CanvasHit::Empty,
        };

        // Drag: pin the grabbed vertex and carry it with the pointer
        if response.drag_started() {
            if let Some(pointer) = response.interact_pointer_pos() {
                if let CanvasHit::Vertex(v) = classify_hit(&self.graph, pointer, self.vertex_radius)
                {
                    self.layout.pin(v);
                    self.drag_offset = self.graph.vertices()[v].pos - pointer;
                }
            }
        }
        if response.dragged() {
            if let (Some(v), Some(pointer)) = (self.layout.pinned(), response.interact_pointer_pos())
            {
                let min = rect.min + Vec2::splat(self.vertex_radius);
                let max = (rect.max - Vec2::splat(self.vertex_radius)).max(min);
                let target = (pointer + self.drag_offset).clamp(min, max);
                self.graph.move_vertex(v, target);
                // keep the neighborhood responding while the vertex moves
                self.layout.reheat(&mut self.graph);
            }
        }
        if response.drag_stopped() && self.layout.pinned().is_some() {
            self.layout.unpin();
            self.layout.reheat(&mut self.graph);
        }

        // Click: vertex selection machine, edge deletion, or a new vertex
        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.handle_canvas_click(pointer);
            }
        }

        self.draw_graph(&painter);

        if self.graph.vertex_count() == 0 {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Click anywhere to add a vertex",
                egui::FontId::proportional(16.0),
                theme::text::MUTED,
            );
        }
    }

    fn handle_canvas_click(&mut self, pointer: Pos2) {
        match classify_hit(&self.graph, pointer, self.vertex_radius) {
            CanvasHit::Vertex(v) => {
                let prev = self.selection;
                let (selection, outcome) = self.graph.handle_vertex_click(self.selection, v);
                self.selection = selection;
                match outcome {
                    ClickOutcome::EdgeAdded => {
                        self.status = None;
                        self.layout.reheat(&mut self.graph);
                    }
                    ClickOutcome::DuplicateEdge => {
                        if let (Some(a), Some(b)) = (
                            prev.and_then(|p| self.graph.vertices().get(p)),
                            self.graph.vertices().get(v),
                        ) {
                            self.status =
                                Some(format!("{} and {} are already connected", a.label, b.label));
                        }
                    }
                    ClickOutcome::Selected | ClickOutcome::Deselected => {
                        self.status = None;
                    }
                }
            }
            CanvasHit::Edge(slot) => {
                if self.graph.delete_edge(slot) {
                    self.after_mutation();
                }
            }
            CanvasHit::Empty => {
                self.graph.add_vertex(pointer);
                self.after_mutation();
            }
        }
    }

    fn draw_graph(&self, painter: &egui::Painter) {
        // Draw edges first (behind vertices)
        for (slot, edge) in self.graph.edges().iter().enumerate() {
            let color = if self.hovered == CanvasHit::Edge(slot) {
                theme::sketch::EDGE_HOVER
            } else {
                theme::sketch::EDGE
            };
            let stroke = Stroke::new(1.5, color);

            if edge.is_loop() {
                let anchor = self.graph.vertices()[edge.source].pos;
                let (center, radius) = loop_circle(anchor, self.vertex_radius);
                painter.circle_stroke(center, radius, stroke);
            } else {
                painter.line_segment(
                    [
                        self.graph.vertices()[edge.source].pos,
                        self.graph.vertices()[edge.target].pos,
                    ],
                    stroke,
                );
            }
        }

        // Draw vertices
        for vertex in self.graph.vertices() {
            let is_selected = self.selection == Some(vertex.index);
            let is_hovered = self.hovered == CanvasHit::Vertex(vertex.index);

            painter.circle_filled(vertex.pos, self.vertex_radius, theme::sketch::VERTEX);

            let (width, color) = if is_selected {
                (theme::stroke_width::SELECTED, theme::state::SELECTED)
            } else if is_hovered {
                (theme::stroke_width::HOVER, theme::state::HOVER)
            } else {
                (
                    theme::stroke_width::NORMAL,
                    theme::sketch::VERTEX.gamma_multiply(0.6),
                )
            };
            painter.circle_stroke(vertex.pos, self.vertex_radius, Stroke::new(width, color));

            if self.show_labels {
                painter.text(
                    vertex.pos,
                    egui::Align2::CENTER_CENTER,
                    &vertex.label,
                    egui::FontId::proportional(12.0),
                    theme::sketch::LABEL,
                );
            }
        }

        // Degree tooltip for the hovered vertex
        if let CanvasHit::Vertex(v) = self.hovered {
            if let Some(vertex) = self.graph.vertices().get(v) {
                let tooltip_pos = vertex.pos + Vec2::new(self.vertex_radius + 10.0, 0.0);
                let galley = painter.layout_no_wrap(
                    format!("{} (degree {})", vertex.label, vertex.degree),
                    egui::FontId::default(),
                    Color32::WHITE,
                );
                let tooltip_rect =
                    Rect::from_min_size(tooltip_pos, galley.size() + Vec2::splat(12.0));
                painter.rect_filled(tooltip_rect, 4.0, theme::bg::tooltip());
                painter.galley(tooltip_pos + Vec2::splat(6.0), galley, Color32::WHITE);
            }
        }
    }
}

impl eframe::App for SketchpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_save_settings();

        // Delete the selection unless a widget owns the keyboard
        if !ctx.wants_keyboard_input()
            && ctx.input(|i| {
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
            })
        {
            self.delete_selected();
        }

        // Request continuous repaint while the simulation is in motion
        if self.physics_enabled && !self.layout.is_settled() {
            ctx.request_repaint();
        }

        // Dark theme
        ctx.set_visuals(egui::Visuals::dark());

        // Sidebar
        egui::SidePanel::left("sidebar")
            .min_width(220.0)
            .frame(
                egui::Frame::none()
                    .fill(theme::bg::PANEL)
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_sidebar(ui);
                });
            });

        // Canvas
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme::bg::CANVAS))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Force save settings on exit
        if self.settings_dirty {
            self.sync_settings_from_ui();
            self.settings.save();
        }
    }
}

/// Classify what a pointer position lands on. Vertices win over edges so
/// a busy junction still selects rather than deletes.
fn classify_hit(graph: &Graph, pointer: Pos2, vertex_radius: f32) -> CanvasHit {
    if let Some(v) = vertex_at(graph, pointer, vertex_radius) {
        return CanvasHit::Vertex(v);
    }
    if let Some(slot) = edge_at(graph, pointer, vertex_radius) {
        return CanvasHit::Edge(slot);
    }
    CanvasHit::Empty
}

/// Closest vertex whose disc (plus slack) covers `pointer`.
fn vertex_at(graph: &Graph, pointer: Pos2, vertex_radius: f32) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;
    for vertex in graph.vertices() {
        let distance = vertex.pos.distance(pointer);
        if distance <= vertex_radius + VERTEX_HIT_SLACK
            && closest.map_or(true, |(_, best)| distance < best)
        {
            closest = Some((vertex.index, distance));
        }
    }
    closest.map(|(v, _)| v)
}

/// Closest edge within the hit distance. Loops test against their drawn
/// circle, regular edges against the segment between their endpoints.
fn edge_at(graph: &Graph, pointer: Pos2, vertex_radius: f32) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;
    for (slot, edge) in graph.edges().iter().enumerate() {
        let distance = if edge.is_loop() {
            let (center, radius) = loop_circle(graph.vertices()[edge.source].pos, vertex_radius);
            (center.distance(pointer) - radius).abs()
        } else {
            dist_to_segment(
                pointer,
                graph.vertices()[edge.source].pos,
                graph.vertices()[edge.target].pos,
            )
        };
        if distance <= EDGE_HIT_DISTANCE && closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((slot, distance));
        }
    }
    closest.map(|(slot, _)| slot)
}

/// Where a vertex's self-loop is drawn: a small circle overlapping the top
/// of the disc.
fn loop_circle(pos: Pos2, vertex_radius: f32) -> (Pos2, f32) {
    let radius = vertex_radius * 0.75;
    (Pos2::new(pos.x, pos.y - vertex_radius - radius * 0.6), radius)
}

/// Distance from `p` to the segment `a`-`b`.
fn dist_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq < 1e-6 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
