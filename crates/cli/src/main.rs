use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use treemap_core::export;
use treemap_core::loader::{LoadMsg, Loader, Source};
use treemap_core::search::search_tiles;
use treemap_core::session::Session;
use treemap_core::{Dataset, TreemapLayout};

#[derive(Parser, Debug)]
#[command(name = "treemap-cli", about = "Treemap report generator")]
struct Args {
    /// Published dataset to load
    #[arg(short, long, default_value_t = Dataset::default(), conflicts_with_all = ["url", "file"])]
    dataset: Dataset,
    /// Load a hierarchy document from a URL instead
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,
    /// Load a hierarchy document from disk instead
    #[arg(long)]
    file: Option<PathBuf>,
    /// Canvas width
    #[arg(long, default_value_t = 960.0)]
    width: f64,
    /// Canvas height
    #[arg(long, default_value_t = 570.0)]
    height: f64,
    /// Gap between sibling tiles
    #[arg(long, default_value_t = 1.0)]
    padding: f64,
    /// Output SVG path (treemap only)
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Output HTML page with title, treemap and legend
    #[arg(long)]
    html: Option<PathBuf>,
    /// Output JSON report path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Output CSV tile list
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Output PDF page
    #[arg(long)]
    pdf: Option<PathBuf>,
    /// Persistent download cache directory
    #[cfg(feature = "cache")]
    #[arg(long, env = "TREEMAP_CACHE_DIR")]
    cache: Option<PathBuf>,
    /// Print the tiles best matching this text
    #[arg(long)]
    search: Option<String>,
}

impl Args {
    fn source(&self) -> Source {
        match (&self.url, &self.file) {
            (Some(url), _) => Source::Url(url.clone()),
            (None, Some(path)) => Source::File(path.clone()),
            (None, None) => Source::Dataset(self.dataset),
        }
    }

    #[cfg(feature = "cache")]
    fn loader(&self) -> anyhow::Result<Loader> {
        match &self.cache {
            Some(dir) => Ok(Loader::new().with_cache(dir)?),
            None => Ok(Loader::new()),
        }
    }

    #[cfg(not(feature = "cache"))]
    fn loader(&self) -> anyhow::Result<Loader> {
        Ok(Loader::new())
    }
}

fn main() -> anyhow::Result<()> {
    treemap_core::logging::init();
    let args = Args::parse();
    let layout = TreemapLayout {
        width: args.width,
        height: args.height,
        padding_inner: args.padding,
        ..TreemapLayout::default()
    };
    layout.validate()?;
    let mut session = Session::new(layout, Default::default());
    let request = session.select(args.source());

    let (tx, rx) = crossbeam_channel::unbounded::<LoadMsg>();
    let loader = args.loader()?;
    std::thread::spawn(move || loader.run(request, tx));

    let msg = rx.recv().context("loader thread exited without a result")?;
    if let LoadMsg::Error { source, message, .. } = &msg {
        bail!("could not load {source}: {message}");
    }
    session.accept(msg)?;
    let Some(scene) = session.scene() else {
        bail!("no scene was built");
    };

    if let Some(path) = &args.svg {
        write_text(path, &export::to_svg(&scene.treemap))?;
    }
    if let Some(path) = &args.html {
        write_text(path, &export::to_html(scene))?;
    }
    if let Some(path) = &args.json {
        let json = export::to_json(&scene.treemap);
        write_text(path, &serde_json::to_string_pretty(&json)?)?;
    }
    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        export::to_csv(&scene.treemap, file)?;
        tracing::info!(path = %path.display(), "wrote csv");
    }
    if let Some(path) = &args.pdf {
        export::to_pdf(&scene.treemap, &scene.legend, &scene.title, path)?;
        tracing::info!(path = %path.display(), "wrote pdf");
    }

    if let Some(needle) = &args.search {
        for (idx, score) in search_tiles(&scene.treemap, needle).into_iter().take(10) {
            let t = &scene.treemap.tiles[idx];
            println!("{:>5}  {} [{}] {}", score, t.name, t.category, t.value);
        }
    }

    println!(
        "{}: {} tiles, {} categories, total value {}",
        scene.title,
        scene.treemap.tiles.len(),
        scene.legend.entries.len(),
        scene.treemap.total_value()
    );
    Ok(())
}

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote report");
    Ok(())
}
