use eframe::egui;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardflow::drilldown::{Activation, DrillNavigator};
use cardflow::entry::{self, Entry, EntryKind};
use cardflow::input::{Command, InputFrame, InputNormalizer};
use cardflow::layout::{self, CardTransform};
use cardflow::navigation::NavController;
use cardflow::source::{self, DirectorySource, Listing, ListingError};
use cardflow::transition::{self, CardVisual, TransitionTimeline};
use cardflow::zoom::ZoomState;

/// Drill-down fetches past this budget are failed and the old listing kept.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Advisory toasts auto-dismiss after this long.
const TOAST_SECONDS: f64 = 6.0;
const LABEL_MAX_CHARS: usize = 18;

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Cardflow - Folder Browser"),
        ..Default::default()
    };

    eframe::run_native(
        "Cardflow",
        options,
        Box::new(|cc| {
            configure_custom_style(&cc.egui_ctx);
            Box::new(CardFlowApp::new())
        }),
    )
}

fn configure_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    // Dark theme with deep slate background
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(30, 41, 59, 240);
    visuals.window_fill = egui::Color32::from_rgba_unmultiplied(30, 41, 59, 230);

    // Glass morphism - subtle borders
    visuals.window_stroke = egui::Stroke::new(
        1.0,
        egui::Color32::from_rgba_unmultiplied(255, 255, 255, 26),
    );
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(
        1.0,
        egui::Color32::from_rgba_unmultiplied(255, 255, 255, 13),
    );

    visuals.window_rounding = egui::Rounding::same(12.0);
    visuals.widgets.noninteractive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.inactive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.hovered.rounding = egui::Rounding::same(8.0);
    visuals.widgets.active.rounding = egui::Rounding::same(8.0);
    visuals.window_shadow = egui::epaint::Shadow::NONE;

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(12.0, 8.0);
    style.spacing.button_padding = egui::vec2(16.0, 8.0);

    ctx.set_style(style);
}

enum FetchKind {
    Drill { selected: usize },
    Back,
}

struct PendingFetch {
    receiver: mpsc::Receiver<Result<Listing, ListingError>>,
    started: Instant,
    kind: FetchKind,
}

struct Toast {
    message: String,
    solution: Option<String>,
    born: Option<f64>,
}

struct CardFlowApp {
    source: Option<Arc<dyn DirectorySource>>,
    listing: Listing,
    nav: NavController,
    zoom: ZoomState,
    input: InputNormalizer,
    drill: DrillNavigator,
    transition: Option<TransitionTimeline>,
    /// Child listing waiting for the drill transition to resolve before it
    /// replaces the live one.
    incoming: Option<Listing>,
    pending_fetch: Option<PendingFetch>,
    toasts: Vec<Toast>,
    error_dialog: Option<String>,
}

impl CardFlowApp {
    fn new() -> Self {
        let selection = source::select_source();
        let start_path = std::env::args()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or(selection.start_path);

        let listing = match &selection.source {
            Some(src) => source::resolve_listing(src.as_ref(), &start_path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "initial listing failed, using sample data");
                source::placeholder_listing()
            }),
            None => source::placeholder_listing(),
        };

        let mut app = Self {
            source: selection.source,
            listing: Listing::new(PathBuf::new(), Vec::new()),
            nav: NavController::new(0),
            zoom: ZoomState::default(),
            input: InputNormalizer::new(),
            drill: DrillNavigator::new(),
            transition: None,
            incoming: None,
            pending_fetch: None,
            toasts: Vec::new(),
            error_dialog: None,
        };
        app.install_listing(listing);
        app
    }

    /// Replace the live listing: fresh cards, scroll back to the first card,
    /// zoom back to unity, advisory (if any) surfaced as a toast.
    fn install_listing(&mut self, listing: Listing) {
        if let Some(advisory) = &listing.advisory {
            self.toasts.push(Toast {
                message: advisory.message.clone(),
                solution: advisory.solution.clone(),
                born: None,
            });
        }
        self.nav.reset(listing.entries.len());
        self.zoom.reset();
        self.listing = listing;
    }

    /// A running transition or an uninstalled child listing means the card
    /// set is not in steady state; scroll and activation commands wait it out.
    fn cards_locked(&self) -> bool {
        self.transition.is_some() || self.incoming.is_some()
    }

    fn spawn_fetch(&mut self, path: PathBuf, kind: FetchKind) {
        let Some(src) = self.source.clone() else {
            self.drill.abort(matches!(kind, FetchKind::Drill { .. }));
            self.error_dialog = Some("No folder access is available.".to_string());
            return;
        };

        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let result = source::resolve_listing(src.as_ref(), &path);
            let _ = sender.send(result);
        });
        self.pending_fetch = Some(PendingFetch {
            receiver,
            started: Instant::now(),
            kind,
        });
    }

    fn poll_fetch(&mut self) {
        let Some(pending) = self.pending_fetch.take() else {
            return;
        };

        match pending.receiver.try_recv() {
            Ok(Ok(listing)) => self.fetch_arrived(pending.kind, listing),
            Ok(Err(e)) => self.fetch_failed(pending.kind, e.to_string()),
            Err(mpsc::TryRecvError::Empty) => {
                if pending.started.elapsed() > FETCH_TIMEOUT {
                    self.fetch_failed(pending.kind, "the listing request timed out".to_string());
                } else {
                    self.pending_fetch = Some(pending);
                }
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                self.fetch_failed(pending.kind, "the listing request was dropped".to_string());
            }
        }
    }

    fn fetch_arrived(&mut self, kind: FetchKind, listing: Listing) {
        match kind {
            FetchKind::Drill { selected } => {
                // Halt any stray timeline in the same tick before the new one
                // takes over the card transforms.
                if let Some(stale) = self.transition.as_mut() {
                    stale.cancel();
                }
                let scroll = self.nav.scroll_position();
                let old: Vec<CardTransform> = (0..self.listing.entries.len())
                    .map(|i| layout::card_transform(i, scroll))
                    .collect();
                let selected_transform = layout::card_transform(selected, scroll);
                self.transition = Some(TransitionTimeline::start(
                    &old,
                    listing.entries.len(),
                    selected_transform,
                ));
                self.incoming = Some(self.drill.commit_drill(listing));
            }
            FetchKind::Back => {
                let advisory = listing.advisory.clone();
                match self.drill.commit_back_fetch(listing) {
                    Some(parent) => self.install_listing(parent),
                    // Unreachable parent: the current listing stays live and
                    // the advisory explains why.
                    None => {
                        if let Some(advisory) = advisory {
                            self.toasts.push(Toast {
                                message: advisory.message,
                                solution: advisory.solution,
                                born: None,
                            });
                        }
                    }
                }
            }
        }
    }

    fn fetch_failed(&mut self, kind: FetchKind, message: String) {
        tracing::warn!(%message, "listing fetch failed, keeping current listing");
        self.drill.abort(matches!(kind, FetchKind::Drill { .. }));
        self.error_dialog = Some(format!("Could not open the folder: {message}."));
    }

    fn handle_activate(&mut self, index: usize) {
        if self.cards_locked() {
            return;
        }
        match self.drill.activate(&self.listing, index) {
            Activation::Back(previous) => self.install_listing(previous),
            Activation::FetchParent(path) => self.spawn_fetch(path, FetchKind::Back),
            Activation::Drill(path) => self.spawn_fetch(path, FetchKind::Drill { selected: index }),
            Activation::Ignored => {}
        }
    }

    fn apply_commands(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Advance(direction) => {
                    if !self.cards_locked() {
                        self.nav.advance(direction);
                    }
                }
                Command::DragTo(position) => {
                    if !self.cards_locked() {
                        self.nav.drag_to(position);
                    }
                }
                Command::ReleaseDrag { velocity } => {
                    if !self.cards_locked() {
                        self.nav.release_drag_with_velocity(velocity);
                    }
                }
                Command::CenterOn(index) => {
                    if !self.cards_locked() {
                        self.nav.center_on(index);
                    }
                }
                Command::Activate(index) => self.handle_activate(index),
                Command::ZoomBy(factor) => self.zoom.zoom_by(factor),
                Command::NudgeZoom(steps) => self.zoom.nudge(steps),
                Command::ResetZoom => self.zoom.reset(),
            }
        }
    }

    fn gather_input(&self, ctx: &egui::Context, canvas: egui::Rect) -> InputFrame {
        ctx.input(|i| {
            let pointer_pos = i
                .pointer
                .interact_pos()
                .filter(|p| canvas.contains(*p))
                .map(|p| Vec2::new(p.x, p.y));
            let (row_axis, step_len) = layout::row_axis_px();
            InputFrame {
                time: i.time,
                wheel_delta: Vec2::new(i.raw_scroll_delta.x, i.raw_scroll_delta.y),
                zoom_modifier: i.modifiers.command || i.modifiers.ctrl,
                pinch_factor: i.multi_touch().map_or(1.0, |mt| mt.zoom_delta),
                pointer_pos,
                pointer_pressed: i.pointer.primary_pressed(),
                pointer_down: i.pointer.primary_down(),
                pointer_released: i.pointer.primary_released(),
                zoom_in_key: i.key_pressed(egui::Key::Plus),
                zoom_out_key: i.key_pressed(egui::Key::Minus),
                zoom_reset_key: i.key_pressed(egui::Key::Num0),
                current_scroll: self.nav.scroll_position(),
                row_axis,
                px_per_step: step_len * self.zoom.current(),
            }
        })
    }

    fn kind_color(kind: EntryKind, highlight: bool) -> egui::Color32 {
        let (r, g, b) = match kind {
            EntryKind::Folder => (245.0_f32, 158.0_f32, 11.0_f32),
            EntryKind::File => (59.0, 130.0, 246.0),
        };
        let boost = if highlight { 1.15 } else { 1.0 };
        egui::Color32::from_rgb(
            (r * boost).min(255.0) as u8,
            (g * boost).min(255.0) as u8,
            (b * boost).min(255.0) as u8,
        )
    }

    fn paint_card(
        painter: &egui::Painter,
        entry: &Entry,
        visual: &CardVisual,
        viewport_center: Vec2,
        zoom: f32,
        highlight: bool,
    ) {
        if visual.scale <= 0.01 || visual.opacity <= 0.01 {
            return;
        }
        let transform = CardTransform {
            position: visual.position,
            scale: visual.scale,
        };
        let (min, size) = layout::screen_rect(&transform, viewport_center, zoom);
        let rect = egui::Rect::from_min_size(egui::pos2(min.x, min.y), egui::vec2(size.x, size.y));

        let opacity = visual.opacity.clamp(0.0, 1.0);
        let corner_radius = (size.x.min(size.y) * 0.08).min(12.0);

        // Drop shadow under each card for depth
        let shadow_rect = rect.translate(egui::vec2(0.0, 3.0));
        painter.rect(
            shadow_rect,
            corner_radius,
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 40).gamma_multiply(opacity),
            egui::Stroke::NONE,
        );

        painter.rect(
            rect,
            corner_radius,
            Self::kind_color(entry.kind, highlight).gamma_multiply(opacity),
            egui::Stroke::NONE,
        );
        painter.rect_stroke(
            rect,
            corner_radius,
            egui::Stroke::new(
                1.0,
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 30).gamma_multiply(opacity),
            ),
        );

        let glyph = if entry.is_folder() { "📁" } else { "📄" };
        painter.text(
            egui::pos2(rect.center().x, rect.center().y - 22.0 * zoom),
            egui::Align2::CENTER_CENTER,
            glyph,
            egui::FontId::proportional(30.0 * visual.scale * zoom),
            egui::Color32::WHITE.gamma_multiply(opacity),
        );

        let label = entry::truncate_label(&entry.name, LABEL_MAX_CHARS);
        painter.text(
            egui::pos2(rect.center().x, rect.center().y + 14.0 * zoom),
            egui::Align2::CENTER_CENTER,
            label,
            egui::FontId::proportional(14.0 * visual.scale * zoom),
            egui::Color32::WHITE.gamma_multiply(opacity),
        );

        if let Some(size_bytes) = entry.size_bytes {
            painter.text(
                egui::pos2(rect.center().x, rect.center().y + 34.0 * zoom),
                egui::Align2::CENTER_CENTER,
                entry::format_size(size_bytes),
                egui::FontId::proportional(11.0 * visual.scale * zoom),
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, 153).gamma_multiply(opacity),
            );
        }
    }

    fn paint_steady_cards(&self, painter: &egui::Painter, viewport_center: Vec2) {
        let scroll = self.nav.scroll_position();
        let zoom = self.zoom.current();
        for index in layout::paint_order(self.listing.entries.len(), scroll) {
            let transform = layout::card_transform(index, scroll);
            let visual = CardVisual {
                position: transform.position,
                scale: transform.scale,
                opacity: 1.0,
            };
            let highlight = (index as f32 - scroll).abs() < 0.5;
            Self::paint_card(
                painter,
                &self.listing.entries[index],
                &visual,
                viewport_center,
                zoom,
                highlight,
            );
        }
    }

    fn paint_transition(&self, painter: &egui::Painter, viewport_center: Vec2) {
        let (Some(timeline), Some(incoming)) = (&self.transition, &self.incoming) else {
            return;
        };
        let zoom = self.zoom.current();
        let old_visuals = timeline.old_visuals();
        for index in transition::depth_order(old_visuals) {
            if let Some(entry) = self.listing.entries.get(index) {
                Self::paint_card(painter, entry, &old_visuals[index], viewport_center, zoom, false);
            }
        }
        let new_visuals = timeline.new_visuals();
        for index in transition::depth_order(new_visuals) {
            if let Some(entry) = incoming.entries.get(index) {
                Self::paint_card(painter, entry, &new_visuals[index], viewport_center, zoom, false);
            }
        }
    }

    /// Aurora gradient that deepens with drill depth.
    fn draw_background(&self, painter: &egui::Painter, rect: egui::Rect) {
        let depth_factor = (self.drill.depth() as f32 * 0.1).min(0.3);

        let top_color = egui::Color32::from_rgb(
            (30.0 - depth_factor * 10.0) as u8,
            (41.0 + depth_factor * 35.0) as u8,
            (59.0 + depth_factor * 59.0) as u8,
        );
        let bottom_color = egui::Color32::from_rgb(
            (15.0 - depth_factor * 5.0) as u8,
            (118.0 - depth_factor * 20.0) as u8,
            (110.0 + depth_factor * 8.0) as u8,
        );

        let mut mesh = egui::Mesh::default();
        mesh.vertices.push(egui::epaint::Vertex {
            pos: rect.left_top(),
            uv: egui::pos2(0.0, 0.0),
            color: top_color,
        });
        mesh.vertices.push(egui::epaint::Vertex {
            pos: rect.right_top(),
            uv: egui::pos2(1.0, 0.0),
            color: top_color,
        });
        mesh.vertices.push(egui::epaint::Vertex {
            pos: rect.right_bottom(),
            uv: egui::pos2(1.0, 1.0),
            color: bottom_color,
        });
        mesh.vertices.push(egui::epaint::Vertex {
            pos: rect.left_bottom(),
            uv: egui::pos2(0.0, 1.0),
            color: bottom_color,
        });
        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        painter.add(egui::Shape::Mesh(mesh));
    }

    fn draw_toasts(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        for toast in &mut self.toasts {
            if toast.born.is_none() {
                toast.born = Some(now);
            }
        }
        self.toasts
            .retain(|t| now - t.born.unwrap_or(now) < TOAST_SECONDS);

        for (index, toast) in self.toasts.iter().enumerate() {
            egui::Area::new(egui::Id::new(("cardflow-toast", index)))
                .anchor(
                    egui::Align2::RIGHT_BOTTOM,
                    egui::vec2(-16.0, -16.0 - index as f32 * 72.0),
                )
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.label(&toast.message);
                        if let Some(solution) = &toast.solution {
                            ui.weak(solution);
                        }
                    });
                });
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_dialog.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Navigation failed")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error_dialog = None;
        }
    }
}

impl eframe::App for CardFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt).min(0.1);

        self.poll_fetch();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Cardflow");
                ui.separator();

                let back_enabled = self.drill.can_go_back() && !self.cards_locked();
                if ui
                    .add_enabled(back_enabled, egui::Button::new("⬅ Back"))
                    .clicked()
                {
                    if let Some(previous) = self.drill.go_back() {
                        self.install_listing(previous);
                    }
                }

                ui.label("📁");
                ui.label(format!("{}", self.listing.path.display()));

                if self.pending_fetch.is_some() {
                    ui.spinner();
                    ui.label("Opening…");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let provider = self
                        .source
                        .as_ref()
                        .map_or("sample", |src| src.describe());
                    ui.weak(format!(
                        "{provider} · {} items",
                        self.listing.entries.len()
                    ));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let canvas = ui.available_rect_before_wrap();
            let viewport_center = Vec2::new(canvas.center().x, canvas.center().y);

            self.draw_background(ui.painter(), canvas);

            // The modal error window swallows canvas input until dismissed.
            if self.error_dialog.is_none() {
                let frame_input = self.gather_input(ctx, canvas);
                let count = self.listing.entries.len();
                let scroll = self.nav.scroll_position();
                let zoom = self.zoom.current();
                let locked = self.cards_locked();
                let commands = self.input.process(&frame_input, |pos| {
                    if locked {
                        None
                    } else {
                        layout::pick_topmost(count, scroll, viewport_center, zoom, pos)
                    }
                });
                self.apply_commands(commands);
            }

            let nav_running = if self.cards_locked() {
                false
            } else {
                self.nav.tick(dt)
            };

            let mut transition_running = false;
            if let Some(timeline) = self.transition.as_mut() {
                transition_running = timeline.update(dt);
                if !transition_running {
                    let finished = timeline.is_finished();
                    self.transition = None;
                    if finished {
                        if let Some(child) = self.incoming.take() {
                            self.install_listing(child);
                        }
                        self.drill.finish_transition();
                    } else {
                        // Cancelled timeline: the child listing never lands.
                        self.incoming = None;
                        self.drill.abort(true);
                    }
                }
            }

            if self.transition.is_some() {
                self.paint_transition(ui.painter(), viewport_center);
            } else {
                self.paint_steady_cards(ui.painter(), viewport_center);
            }

            if self.listing.entries.is_empty() && self.transition.is_none() {
                ui.painter().text(
                    canvas.center(),
                    egui::Align2::CENTER_CENTER,
                    "This folder has nothing to show",
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_rgba_unmultiplied(255, 255, 255, 140),
                );
            }

            if nav_running
                || transition_running
                || self.pending_fetch.is_some()
                || !self.toasts.is_empty()
            {
                ctx.request_repaint();
            }
        });

        self.draw_toasts(ctx);
        self.draw_error_dialog(ctx);
    }
}
