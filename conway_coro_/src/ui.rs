// ui.rs - egui front end: controls, grid drawing and population stats
// Draws only `GameOfLife::snapshot`, never the engine's buffers directly.

use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};
use std::time::{Duration, Instant};
use crate::{GameOfLife, GRID_SIZE, STRATEGIES};

impl eframe::App for GameOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Auto-update if running
        if self.is_running && self.last_update.elapsed() >= self.update_interval {
            self.update_generation();
            self.last_update = Instant::now();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");

            // Controls
            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    self.is_running = !self.is_running;
                    if self.is_running {
                        self.last_update = Instant::now();
                    }
                }

                if ui.add_enabled(!self.is_running, egui::Button::new("⏭ Step")).clicked() {
                    self.update_generation();
                }

                if ui.button("⏹ Clear").clicked() {
                    self.is_running = false;
                    self.clear_grid();
                }

                if ui.button("🎲 Random").clicked() {
                    self.is_running = false;
                    self.random_grid();
                }

                ui.separator();

                // Pattern dropdown
                ui.label("Pattern:");
                egui::ComboBox::from_id_source("pattern_selector")
                    .selected_text(conway::PATTERNS[self.selected_pattern].name)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in conway::PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                        }
                    });

                if ui.button("Apply Pattern").clicked() {
                    self.is_running = false;
                    self.apply_selected_pattern();
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                // Strategies can be swapped between generations
                ui.label("Strategy:");
                egui::ComboBox::from_id_source("strategy_selector")
                    .selected_text(STRATEGIES[self.selected_strategy].to_string())
                    .show_ui(ui, |ui| {
                        for (i, strategy) in STRATEGIES.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_strategy, i, strategy.to_string());
                        }
                    });

                ui.separator();

                ui.label("Speed:");
                let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
                if ui.add(egui::Slider::new(&mut speed, 0.5..=60.0).suffix(" gen/sec")).changed() {
                    self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                }

                ui.separator();

                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
            });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label(format!("Generation: {}", self.snapshot.generation()));
                ui.separator();
                ui.label(format!("Last step: {:.2} ms", self.last_step.as_secs_f64() * 1000.0));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(Color32::from_rgb(230, 160, 0), status.as_str());
                }
            });

            ui.label("Click cells to toggle them while paused.");

            ui.separator();

            // Draw the interior only; the border is always dead
            let box_size = 7.0;
            let spacing = 0.5;

            let start_pos = ui.cursor().min;
            let total_size = Vec2::splat((box_size + spacing) * GRID_SIZE as f32 - spacing);

            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

            painter.rect_filled(
                Rect::from_min_size(start_pos, total_size),
                0.0,
                Color32::BLACK,
            );

            let clicked_at = if !self.is_running && response.clicked() {
                response.interact_pointer_pos()
            } else {
                None
            };
            let mut toggled = None;

            for display_y in 0..GRID_SIZE {
                for display_x in 0..GRID_SIZE {
                    let (x, y) = (display_x + 1, display_y + 1);

                    let rect = Rect::from_min_size(
                        egui::pos2(
                            start_pos.x + display_x as f32 * (box_size + spacing),
                            start_pos.y + display_y as f32 * (box_size + spacing),
                        ),
                        Vec2::splat(box_size),
                    );

                    let cell_color = if self.snapshot.get(x, y) {
                        self.live_color
                    } else {
                        self.dead_color
                    };

                    painter.rect_filled(rect, 1.0, cell_color);
                    painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));

                    if clicked_at.is_some_and(|pos| rect.contains(pos)) {
                        toggled = Some((x, y));
                    }
                }
            }

            if let Some((x, y)) = toggled {
                self.toggle_cell(x, y);
            }

            ui.separator();

            let live_cells = self.snapshot.population();
            let area = GRID_SIZE * GRID_SIZE;
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {}", live_cells));
                ui.label(format!("Dead cells: {}", area - live_cells));
                ui.label(format!("Population: {:.1}%", (live_cells as f32 / area as f32) * 100.0));
            });
        });

        // Keep generations flowing while running
        if self.is_running {
            ctx.request_repaint();
        }
    }
}
