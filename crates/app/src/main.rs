mod state;
mod ui;

use eframe::egui;
use state::AppState;

struct TreemapApp {
    state: AppState,
}

impl TreemapApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            state: AppState::new(),
        }
    }
}

impl eframe::App for TreemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }
}

fn main() -> eframe::Result<()> {
    treemap_core::logging::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Treemap")
            .with_inner_size([1020.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Treemap",
        options,
        Box::new(|cc| Ok(Box::new(TreemapApp::new(cc)))),
    )
}
