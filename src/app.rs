use std::{ops::RangeInclusive, time::Duration};

use eframe::egui;
use nalgebra::Matrix2;

use crate::animation::{Easing, OverlapPolicy, TransitionOptions};
use crate::config::VizConfig;
use crate::format;
use crate::math::{determinant, AreaOrientation};
use crate::render::{Canvas, SceneStyle};
use crate::scenario::{
    Action, CompositionScenario, DeterminantExplorer, ExplorerAction, ReadoutId, Readouts,
    StaticPanel,
};

const DURATION_RANGE_MS: RangeInclusive<u64> = 100..=3000;


/// Slider bounds, widened so a configured duration is never clamped.
fn duration_range(configured_ms: u64) -> RangeInclusive<u64> {
    let (start, end) = DURATION_RANGE_MS.into_inner();
    start.min(configured_ms)..=end.max(configured_ms)
}


pub struct TransformApp {
    canvas_size: egui::Vec2,
    base_style: SceneStyle,

    // Panels, top to bottom
    recap: StaticPanel,
    explorer: DeterminantExplorer,
    composition: CompositionScenario,
    order: CompositionScenario,
    associativity: StaticPanel,

    // Side panel options
    show_unit_square: bool,
    smooth: bool,
    race: bool,
    duration_ms: u64,
    duration_range: RangeInclusive<u64>,
    grid_alpha: u8,
}

impl TransformApp {
    pub fn new(config: &VizConfig) -> Self {
        let policy = config.overlap_policy;
        let options = config.transition_options();
        Self {
            canvas_size: egui::vec2(config.canvas_width, config.canvas_height),
            base_style: config.scene_style(),
            recap: StaticPanel::recap(),
            explorer: DeterminantExplorer::new(policy),
            composition: CompositionScenario::shear_after_rotation(policy),
            order: CompositionScenario::rotation_after_shear(policy),
            associativity: StaticPanel::associativity(),
            show_unit_square: options.show_unit_square,
            smooth: options.easing == Easing::Smoothstep,
            race: policy == OverlapPolicy::Race,
            duration_ms: config.transition_duration_ms,
            duration_range: duration_range(config.transition_duration_ms),
            grid_alpha: config.grid_alpha,
        }
    }

    fn options(&self) -> TransitionOptions {
        TransitionOptions {
            duration: Duration::from_millis(self.duration_ms),
            show_unit_square: self.show_unit_square,
            easing: if self.smooth { Easing::Smoothstep } else { Easing::Linear },
        }
    }

    fn style(&self) -> SceneStyle {
        self.base_style.clone().with_grid_alpha(self.grid_alpha)
    }

    fn policy(&self) -> OverlapPolicy {
        if self.race { OverlapPolicy::Race } else { OverlapPolicy::Supersede }
    }

    fn is_animating(&self) -> bool {
        self.explorer.is_animating() || self.composition.is_animating() || self.order.is_animating()
    }


    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() { return; }
        let (toggle_square, reset) = ctx.input(|i| (i.key_pressed(egui::Key::U), i.key_pressed(egui::Key::Escape)));

        if toggle_square { self.show_unit_square = !self.show_unit_square; }
        if reset {
            self.reset_all(ctx.input(|i| i.time));
        }
    }

    fn reset_all(&mut self, now: f64) {
        let options = self.options();
        self.explorer.handle(ExplorerAction::Reset, &options, &mut rand::thread_rng(), now);
        self.composition.handle(Action::Reset, &options, now);
        self.order.handle(Action::Reset, &options, now);
    }


    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Linear Transformations");
        ui.add_space(4.0);

        ui.collapsing("⌨ Hotkeys", |ui| {
            ui.label("U: Unit square | Esc: Reset all panels");
        });

        ui.separator();
        ui.checkbox(&mut self.show_unit_square, "▱ Unit square [U]");
        ui.checkbox(&mut self.smooth, "〰 Smooth easing");

        let was_racing = self.race;
        ui.checkbox(&mut self.race, "Let overlapping animations race")
            .on_hover_text("Off: a new click cancels the running animation.");
        if self.race != was_racing {
            let policy = self.policy();
            log::info!("Overlap policy set to {policy:?}");
            self.explorer.set_policy(policy);
            self.composition.set_policy(policy);
            self.order.set_policy(policy);
        }

        ui.add_space(6.0);
        ui.add(egui::Slider::new(&mut self.grid_alpha, 0..=255).text("Grid Alpha"));
        ui.add(
            egui::Slider::new(&mut self.duration_ms, self.duration_range.clone())
                .text("Duration (ms)")
        );
    }


    fn draw_matrix(ui: &mut egui::Ui, panel: &str, name: &str, m: &Matrix2<f64>, with_det: bool) {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(name).strong());
            egui::Grid::new(("matrix", panel, name)).spacing([10.0, 2.0]).show(ui, |ui| {
                for r in 0..2 {
                    for c in 0..2 {
                        let val = m[(r, c)];
                        let color = if val.abs() < 0.001 {
                            egui::Color32::DARK_GRAY
                        } else if val > 0.0 {
                            egui::Color32::LIGHT_GREEN
                        } else {
                            egui::Color32::LIGHT_RED
                        };
                        ui.colored_label(color, format::matrix_cell(val));
                    }
                    ui.end_row();
                }
            });
            if with_det {
                ui.label(format!("det = {}", format::determinant(determinant(m))));
            }
        });
    }


    fn draw_orientation(ui: &mut egui::Ui, m: &Matrix2<f64>) {
        let (text, color) = match AreaOrientation::classify(m) {
            AreaOrientation::Collapsed => ("Collapsed: area squashed to zero", egui::Color32::GRAY),
            AreaOrientation::Flipped => ("Flipped: orientation reversed", egui::Color32::LIGHT_RED),
            AreaOrientation::Preserved => ("Orientation preserved", egui::Color32::YELLOW),
        };
        ui.colored_label(color, text);
    }


    fn draw_readouts(ui: &mut egui::Ui, id: &str, rows: &[(String, ReadoutId)], readouts: &Readouts) {
        egui::Grid::new(id).num_columns(2).spacing([12.0, 4.0]).show(ui, |ui| {
            for (label, readout) in rows {
                ui.label(label.as_str());
                ui.monospace(readouts.get(*readout).unwrap_or_default());
                ui.end_row();
            }
        });
    }


    fn canvas(&self, ui: &mut egui::Ui) -> Canvas {
        let (rect, _) = ui.allocate_exact_size(self.canvas_size, egui::Sense::hover());
        Canvas::new(ui, rect)
    }


    fn draw_static(&self, ui: &mut egui::Ui, panel: &StaticPanel, style: &SceneStyle) {
        ui.heading(panel.title);
        ui.horizontal(|ui| {
            Self::draw_matrix(ui, panel.title, "M", &panel.matrix, false);
        });
        let mut canvas = self.canvas(ui);
        panel.tick(&mut canvas, style, self.show_unit_square);
        Self::draw_readouts(
            ui,
            panel.title,
            &[("det(M)".to_owned(), ReadoutId::Determinant)],
            &panel.readouts,
        );
    }


    fn draw_explorer(&mut self, ui: &mut egui::Ui, style: &SceneStyle, now: f64) {
        let options = self.options();
        ui.heading(self.explorer.title);

        ui.horizontal(|ui| {
            Self::draw_matrix(ui, self.explorer.title, "M", self.explorer.matrix(), false);
            ui.separator();
            Self::draw_orientation(ui, self.explorer.matrix());
        });

        let mut canvas = self.canvas(ui);
        self.explorer.tick(&mut canvas, style, now, self.show_unit_square);

        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("🎲 Random").clicked() { action = Some(ExplorerAction::Random); }
            if ui.button("⬈ Transpose").clicked() { action = Some(ExplorerAction::Transpose); }
            if ui.button("⟲ Reset").clicked() { action = Some(ExplorerAction::Reset); }
        });
        if let Some(action) = action {
            let mut rng = rand::thread_rng();
            self.explorer.handle(action, &options, &mut rng, now);
        }

        Self::draw_readouts(
            ui,
            "explorer_readouts",
            &[("det(M)".to_owned(), ReadoutId::Determinant)],
            self.explorer.readouts(),
        );
    }


    fn draw_composition(ui: &mut egui::Ui, scenario: &mut CompositionScenario, canvas: &mut Canvas, style: &SceneStyle, options: &TransitionOptions, now: f64) {
        let composition = scenario.state().composition.clone();
        let (first, second) = (composition.first_name, composition.second_name);
        let composed = composition.composed_name();

        scenario.tick(canvas, style, now, options.show_unit_square);

        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("⟲ Reset").clicked() { action = Some(Action::Reset); }
            if ui.button(format!("Apply {first}")).clicked() { action = Some(Action::ApplyFirst); }
            if ui.button(format!("Apply {second} after {first}")).clicked() { action = Some(Action::ApplySecond); }
            if ui.button(format!("Show {composed} directly")).clicked() { action = Some(Action::ShowComposition); }
        });
        if let Some(action) = action {
            scenario.handle(action, options, now);
        }

        let rows = [
            (format!("î after {first}"), ReadoutId::FirstI),
            (format!("ĵ after {first}"), ReadoutId::FirstJ),
            (format!("î after {composed}"), ReadoutId::ComposedI),
            (format!("ĵ after {composed}"), ReadoutId::ComposedJ),
            ("det".to_owned(), ReadoutId::Determinant),
            (format!("M = {composed}"), ReadoutId::Composition),
        ];
        Self::draw_readouts(ui, scenario.title, &rows, &scenario.state().readouts);
    }


    fn draw_composition_section(&mut self, ui: &mut egui::Ui, order: bool, style: &SceneStyle, now: f64) {
        let options = self.options();
        let mut canvas = {
            let scenario = if order { &self.order } else { &self.composition };
            let composition = &scenario.state().composition;
            ui.heading(scenario.title);
            ui.horizontal(|ui| {
                Self::draw_matrix(ui, scenario.title, composition.first_name, &composition.first, true);
                ui.separator();
                Self::draw_matrix(ui, scenario.title, composition.second_name, &composition.second, true);
            });
            self.canvas(ui)
        };
        let scenario = if order { &mut self.order } else { &mut self.composition };
        Self::draw_composition(ui, scenario, &mut canvas, style, &options, now);
    }
}


impl eframe::App for TransformApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_hotkeys(ctx);
        let now = ctx.input(|i| i.time);
        let style = self.style();

        // --- SIDEBAR ---
        egui::SidePanel::left("controls")
            .width_range(220.0..=300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        // --- PANELS ---
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    self.draw_static(ui, &self.recap, &style);
                    ui.separator();
                    self.draw_explorer(ui, &style, now);
                    ui.separator();
                    self.draw_composition_section(ui, false, &style, now);
                    ui.separator();
                    self.draw_composition_section(ui, true, &style, now);
                    ui.separator();
                    self.draw_static(ui, &self.associativity, &style);
                });
        });

        if self.is_animating() {
            ctx.request_repaint();
        }
    }
}
