use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2};
use treemap_core::loader::Source;
use treemap_core::session::Scene;
use treemap_core::tooltip::Tooltip;
use treemap_core::{Color, Dataset};

use crate::state::{AppState, ExportKind};

fn color32(c: Color) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    if app.poll() {
        ctx.request_repaint();
    }

    // Keep polling while a load is in flight
    if app.session.is_loading() {
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        status_bar(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::both().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                let Some(scene) = app.session.scene() else {
                    ui.heading(app.session.selected().label());
                    match app.session.error() {
                        Some(err) => {
                            ui.colored_label(Color32::LIGHT_RED, err);
                        }
                        None => {
                            ui.spinner();
                        }
                    }
                    return;
                };
                ui.heading(&scene.title);
                ui.label(&scene.description);
                ui.add_space(8.0);
                let hovered = treemap_canvas(ui, scene, &app.matches);
                ui.add_space(8.0);
                legend_canvas(ui, scene);
                app.hovered = hovered;
            });
        });
    });
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        for dataset in Dataset::ALL {
            let selected = app.session.selected().dataset() == Some(dataset);
            if ui.selectable_label(selected, dataset.button_label()).clicked() {
                app.select(Source::Dataset(dataset));
            }
        }
        if ui.button("Open file…").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
                app.open_file(path);
            }
        }
        ui.separator();
        let mut padding = app.session.layout.padding_inner;
        let gap = egui::DragValue::new(&mut padding)
            .range(0.0..=8.0)
            .speed(0.1)
            .prefix("gap ");
        if ui.add(gap).changed() {
            app.set_padding(padding);
        }
        ui.separator();
        ui.label("Search:");
        if ui.text_edit_singleline(&mut app.search).changed() {
            app.refresh_matches();
        }
        ui.separator();
        ui.menu_button("Export", |ui| {
            for (kind, label) in [
                (ExportKind::Svg, "SVG…"),
                (ExportKind::Html, "HTML page…"),
                (ExportKind::Pdf, "PDF…"),
            ] {
                if ui.button(label).clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter(label.trim_end_matches('…'), &[kind.extension()])
                        .save_file()
                    {
                        app.export(kind, &path);
                    }
                }
            }
            ui.checkbox(&mut app.open_after_export, "Open after export");
        });
    });
}

fn status_bar(ui: &mut Ui, app: &AppState) {
    ui.horizontal(|ui| {
        if let Some(scene) = app.session.scene() {
            ui.label(format!(
                "{} tiles · {} categories",
                scene.treemap.tiles.len(),
                scene.legend.entries.len()
            ));
            if !app.search.trim().is_empty() {
                ui.separator();
                ui.label(format!("{} matches", app.matches.len()));
            }
            if let Some(tile) = app.hovered.and_then(|i| scene.treemap.tiles.get(i)) {
                ui.separator();
                ui.label(&tile.key);
            }
        }
        if let Some(status) = &app.status {
            ui.separator();
            ui.label(status);
        }
    });
}

/// Paints the tiles and returns the index of the hovered one.
fn treemap_canvas(ui: &mut Ui, scene: &Scene, matches: &[usize]) -> Option<usize> {
    let map = &scene.treemap;
    let size = Vec2::new(map.width as f32, map.height as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let to_screen = |r: &treemap_core::Rect| {
        Rect::from_min_max(
            origin + Vec2::new(r.x0 as f32, r.y0 as f32),
            origin + Vec2::new(r.x1 as f32, r.y1 as f32),
        )
    };

    let hovered = response.hover_pos().and_then(|pos| {
        let local = pos - origin;
        map.tile_at(f64::from(local.x), f64::from(local.y)).map(|(i, _)| i)
    });
    let dimmed = !matches.is_empty();

    for (i, tile) in map.tiles.iter().enumerate() {
        let rect = to_screen(&tile.rect);
        let mut fill = color32(tile.color);
        if dimmed && !matches.contains(&i) {
            fill = fill.gamma_multiply(0.35);
        }
        painter.rect_filled(rect, 0.0, fill);
        if hovered == Some(i) {
            painter.rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::WHITE));
        }
        if rect.width() > 24.0 && rect.height() > 14.0 {
            painter.with_clip_rect(rect.shrink(1.0)).text(
                rect.min + Vec2::new(5.0, 4.0),
                Align2::LEFT_TOP,
                &tile.name,
                FontId::proportional(10.0),
                color32(tile.color.text_color()),
            );
        }
    }

    if let Some(i) = hovered {
        let tip = Tooltip::for_tile(&map.tiles[i]);
        response.on_hover_ui_at_pointer(|ui| {
            for line in tip.lines() {
                ui.label(line);
            }
        });
    }
    hovered
}

fn legend_canvas(ui: &mut Ui, scene: &Scene) {
    let legend = &scene.legend;
    let layout = &legend.layout;
    let height = legend.canvas_height();
    let (response, painter) =
        ui.allocate_painter(Vec2::new(layout.width as f32, height as f32), Sense::hover());
    let origin = response.rect.min;
    for entry in &legend.entries {
        let min = origin + Vec2::new(entry.x as f32, entry.y as f32);
        let swatch = Rect::from_min_size(
            min,
            Vec2::new(layout.swatch_width as f32, layout.swatch_height as f32),
        );
        painter.rect_filled(swatch, 0.0, color32(entry.color));
        let (lx, ly) = legend.label_anchor(entry);
        painter.text(
            origin + Vec2::new(lx as f32, ly as f32),
            Align2::CENTER_BOTTOM,
            &entry.category,
            FontId::proportional(12.0),
            color32(entry.color.text_color()),
        );
    }
}
