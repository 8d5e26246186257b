use crate::dataset::Dataset;
use crate::error::Result;
use crate::legend::{Legend, LegendLayout};
use crate::loader::{LoadMsg, LoadRequest, Source};
use crate::model::HierarchyNode;
use crate::treemap::{Treemap, TreemapLayout};

/// Everything drawn for one loaded document. The parsed document is kept so
/// the scene can be laid out again without reloading.
#[derive(Debug, Clone)]
pub struct Scene {
    pub source: Source,
    pub title: String,
    pub description: String,
    pub root: HierarchyNode,
    pub treemap: Treemap,
    pub legend: Legend,
}

impl Scene {
    pub fn build(
        source: Source,
        root: HierarchyNode,
        layout: &TreemapLayout,
        legend_layout: &LegendLayout,
    ) -> Result<Self> {
        let treemap = Treemap::build_with(&root, layout)?;
        let legend = treemap.legend(legend_layout);
        let (title, description) = match source.dataset() {
            Some(d) => (d.title().to_string(), d.description().to_string()),
            None => (source.label(), root.name.clone()),
        };
        Ok(Self {
            source,
            title,
            description,
            root,
            treemap,
            legend,
        })
    }
}

/// Current selection and the scene built for it. Each selection bumps the
/// generation; results for an older generation are dropped, so the last
/// selection wins even when loads finish out of order.
#[derive(Debug, Clone)]
pub struct Session {
    pub layout: TreemapLayout,
    pub legend_layout: LegendLayout,
    selected: Source,
    generation: u64,
    scene: Option<Scene>,
    error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TreemapLayout::default(), LegendLayout::default())
    }
}

impl Session {
    pub fn new(layout: TreemapLayout, legend_layout: LegendLayout) -> Self {
        Self {
            layout,
            legend_layout,
            selected: Source::Dataset(Dataset::default()),
            generation: 0,
            scene: None,
            error: None,
        }
    }

    /// Switches the selection and clears the current scene.
    pub fn select(&mut self, source: Source) -> LoadRequest {
        self.generation += 1;
        self.selected = source.clone();
        self.scene = None;
        self.error = None;
        tracing::debug!(generation = self.generation, source = %source, "selection changed");
        LoadRequest {
            generation: self.generation,
            source,
        }
    }

    /// Feeds a loader result in. Returns `Ok(true)` when the scene was
    /// replaced, `Ok(false)` when the message was stale or an error.
    pub fn accept(&mut self, msg: LoadMsg) -> Result<bool> {
        if msg.generation() != self.generation {
            tracing::debug!(
                stale = msg.generation(),
                current = self.generation,
                "dropping stale load result"
            );
            return Ok(false);
        }
        match msg {
            LoadMsg::Done { source, root, .. } => {
                let scene = Scene::build(source, root, &self.layout, &self.legend_layout)
                    .inspect_err(|e| self.error = Some(e.to_string()))?;
                tracing::info!(
                    title = %scene.title,
                    tiles = scene.treemap.tiles.len(),
                    categories = scene.legend.entries.len(),
                    "scene rebuilt"
                );
                self.scene = Some(scene);
                Ok(true)
            }
            LoadMsg::Error { message, .. } => {
                self.error = Some(message);
                Ok(false)
            }
        }
    }

    /// Lays the current scene out again with `layout`. Returns `Ok(false)`
    /// when nothing is shown yet; the layout then applies to the next scene.
    /// A failed rebuild keeps both the old layout and the old scene.
    pub fn relayout(&mut self, layout: TreemapLayout) -> Result<bool> {
        layout.validate()?;
        let Some(current) = &self.scene else {
            self.layout = layout;
            return Ok(false);
        };
        let scene = Scene::build(
            current.source.clone(),
            current.root.clone(),
            &layout,
            &self.legend_layout,
        )?;
        self.layout = layout;
        self.scene = Some(scene);
        Ok(true)
    }

    pub fn selected(&self) -> &Source {
        &self.selected
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.scene.is_none() && self.error.is_none()
    }
}
