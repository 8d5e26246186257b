use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use treemap_core::export;
use treemap_core::loader::{LoadMsg, Loader, Source};
use treemap_core::search::search_tiles;
use treemap_core::session::Session;
use treemap_core::TreemapLayout;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Svg,
    Html,
    Pdf,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Svg => "svg",
            ExportKind::Html => "html",
            ExportKind::Pdf => "pdf",
        }
    }
}

pub struct AppState {
    pub session: Session,
    pub loader: Loader,
    pub load_tx: Sender<LoadMsg>,
    pub load_rx: Receiver<LoadMsg>,
    pub search: String,
    pub matches: Vec<usize>,
    pub hovered: Option<usize>,
    pub open_after_export: bool,
    pub status: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        let (load_tx, load_rx) = unbounded();
        let mut state = Self {
            session: Session::default(),
            loader: Loader::new(),
            load_tx,
            load_rx,
            search: String::new(),
            matches: Vec::new(),
            hovered: None,
            open_after_export: false,
            status: None,
        };
        let initial = state.session.selected().clone();
        state.select(initial);
        state
    }

    /// Switches dataset. The old scene is dropped right away; a load that is
    /// still running for it will be ignored when it reports back.
    pub fn select(&mut self, source: Source) {
        let request = self.session.select(source);
        self.hovered = None;
        self.matches.clear();
        self.status = None;

        let loader = self.loader.clone();
        let tx = self.load_tx.clone();
        std::thread::spawn(move || loader.run(request, tx));
    }

    pub fn open_file(&mut self, path: PathBuf) {
        self.select(Source::File(path));
    }

    /// Drains finished loads. Returns true when anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.load_rx.try_recv() {
            match self.session.accept(msg) {
                Ok(true) => {
                    changed = true;
                    self.refresh_matches();
                }
                Ok(false) => changed |= self.session.error().is_some(),
                Err(e) => {
                    tracing::warn!(error = %e, "could not build scene");
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn refresh_matches(&mut self) {
        self.matches = match self.session.scene() {
            Some(scene) => search_tiles(&scene.treemap, &self.search)
                .into_iter()
                .map(|(idx, _)| idx)
                .collect(),
            None => Vec::new(),
        };
    }

    /// Lays the shown scene out again with a different gap between tiles.
    pub fn set_padding(&mut self, padding: f64) {
        let layout = TreemapLayout {
            padding_inner: padding,
            ..self.session.layout
        };
        match self.session.relayout(layout) {
            Ok(true) => {
                self.hovered = None;
                self.refresh_matches();
            }
            Ok(false) => {}
            Err(e) => self.status = Some(format!("Layout failed: {e}")),
        }
    }

    pub fn export(&mut self, kind: ExportKind, path: &Path) {
        match self.write_export(kind, path) {
            Ok(()) => {
                self.status = Some(format!("Saved {}", path.display()));
                if self.open_after_export {
                    if let Err(e) = open::that(path) {
                        self.status = Some(format!("Saved, but could not open it: {e}"));
                    }
                }
            }
            Err(e) => self.status = Some(format!("Export failed: {e:#}")),
        }
    }

    fn write_export(&self, kind: ExportKind, path: &Path) -> anyhow::Result<()> {
        let scene = self
            .session
            .scene()
            .ok_or_else(|| anyhow::anyhow!("nothing to export yet"))?;
        match kind {
            ExportKind::Svg => std::fs::write(path, export::to_svg(&scene.treemap))?,
            ExportKind::Html => std::fs::write(path, export::to_html(scene))?,
            ExportKind::Pdf => {
                export::to_pdf(&scene.treemap, &scene.legend, &scene.title, path)?
            }
        }
        tracing::info!(path = %path.display(), "exported");
        Ok(())
    }
}
