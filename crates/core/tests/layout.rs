use treemap_core::export;
use treemap_core::legend::LegendLayout;
use treemap_core::loader::{LoadMsg, Loader, Source};
use treemap_core::session::Session;
use treemap_core::tooltip::Tooltip;
use treemap_core::{Dataset, Rect};

fn fixture() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/video-game-sample.json")
}

fn loaded_session() -> Session {
    let mut session = Session::default();
    let request = session.select(Source::File(fixture()));
    let (tx, rx) = crossbeam_channel::unbounded();
    Loader::new().run(request, tx);
    let msg = rx.recv().unwrap();
    assert!(matches!(msg, LoadMsg::Done { .. }));
    assert!(session.accept(msg).unwrap());
    session
}

#[test]
fn fixture_builds_full_canvas_layout() {
    let session = loaded_session();
    let scene = session.scene().unwrap();
    let map = &scene.treemap;

    assert_eq!(map.tiles.len(), 11);
    assert_eq!(map.categories(), ["Wii", "NES", "GB", "DS", "X360", "PS3", "PS2"]);
    assert_eq!(map.tiles[0].key, "Video Game Sales Data Top 100.Wii.Wii Sports");

    let canvas = Rect::new(0.0, 0.0, 960.0, 570.0);
    for t in &map.tiles {
        assert!(canvas.encloses(&t.rect, 1e-6), "{} escapes the canvas", t.name);
        assert!(t.rect.area() > 0.0);
    }
    for (i, a) in map.tiles.iter().enumerate() {
        for b in &map.tiles[i + 1..] {
            assert!(!a.rect.overlaps(&b.rect, 1e-6), "{} overlaps {}", a.name, b.name);
        }
    }
}

#[test]
fn legend_matches_tile_colors() {
    let session = loaded_session();
    let scene = session.scene().unwrap();
    assert_eq!(scene.legend.entries.len(), 7);
    assert_eq!(scene.legend.entries[6].column, 0);
    assert_eq!(scene.legend.entries[6].row, 1);
    for e in &scene.legend.entries {
        let tile = scene.treemap.tiles.iter().find(|t| t.category == e.category).unwrap();
        assert_eq!(tile.color, e.color);
    }
}

#[test]
fn hovering_a_tile_produces_its_tooltip() {
    let session = loaded_session();
    let map = &session.scene().unwrap().treemap;
    let target = map.tiles.iter().find(|t| t.name == "Tetris").unwrap();
    let (x, y) = target.rect.center();
    let (_, hit) = map.tile_at(x, y).unwrap();
    let tip = Tooltip::for_tile(hit);
    assert_eq!(tip.lines()[0], "Name: Tetris");
    assert_eq!(tip.lines()[1], "Category: GB");
    assert_eq!(tip.lines()[2], "Value: 30.26");
}

#[test]
fn exports_write_every_format() {
    let session = loaded_session();
    let scene = session.scene().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let html = export::to_html(scene);
    assert!(html.contains(r#"<h1 id="title">video-game-sample.json</h1>"#));
    assert_eq!(html.matches(r#"class="tile""#).count(), 11);
    assert_eq!(html.matches(r#"<g class="legend-item">"#).count(), 7);

    let pdf = dir.path().join("games.pdf");
    export::to_pdf(&scene.treemap, &scene.legend, &scene.title, &pdf).unwrap();
    assert!(std::fs::metadata(&pdf).unwrap().len() > 0);

    let csv = dir.path().join("games.csv");
    export::to_csv(&scene.treemap, std::fs::File::create(&csv).unwrap()).unwrap();
    assert_eq!(std::fs::read_to_string(&csv).unwrap().lines().count(), 12);
}

#[test]
fn dataset_selection_carries_page_text() {
    let mut session = Session::new(Default::default(), LegendLayout::default());
    let request = session.select(Source::Dataset(Dataset::KickstarterPledges));
    let root = treemap_core::loader::parse(&std::fs::read_to_string(fixture()).unwrap()).unwrap();
    session
        .accept(LoadMsg::Done {
            generation: request.generation,
            source: request.source,
            root,
        })
        .unwrap();
    let scene = session.scene().unwrap();
    assert_eq!(scene.title, "Kickstarter Pledges");
    assert_eq!(
        scene.description,
        "Top 100 Most Funded Kickstarter Campaigns Grouped by Category"
    );
}
