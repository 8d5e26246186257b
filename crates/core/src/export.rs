use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::legend::Legend;
use crate::session::Scene;
use crate::tooltip::Tooltip;
use crate::treemap::Treemap;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_svg(treemap: &Treemap) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="treemap" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = treemap.width,
        h = treemap.height
    );
    let _ = writeln!(svg, "<defs>");
    for (i, t) in treemap.tiles.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<clipPath id="clip-{i}"><rect width="{}" height="{}"/></clipPath>"#,
            t.rect.width(),
            t.rect.height()
        );
    }
    let _ = writeln!(svg, "</defs>");
    for (i, t) in treemap.tiles.iter().enumerate() {
        let tip = Tooltip::for_tile(t).lines().join("\n");
        let _ = writeln!(
            svg,
            r#"<g transform="translate({},{})"><title>{}</title><rect class="tile" width="{}" height="{}" data-name="{}" data-category="{}" data-value="{}" fill="{}"/><text x="5" y="20" font-size="10" fill="{}" clip-path="url(#clip-{i})">{}</text></g>"#,
            t.rect.x0,
            t.rect.y0,
            escape(&tip),
            t.rect.width(),
            t.rect.height(),
            escape(&t.name),
            escape(&t.category),
            t.value,
            t.color,
            t.color.text_color(),
            escape(&t.name),
        );
    }
    svg.push_str("</svg>\n");
    svg
}

pub fn legend_svg(legend: &Legend) -> String {
    let l = &legend.layout;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="legend" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = l.width,
        h = legend.canvas_height()
    );
    for e in &legend.entries {
        let (lx, ly) = legend.label_anchor(e);
        let _ = writeln!(
            svg,
            r#"<g class="legend-item"><rect class="legend-item" x="{}" y="{}" width="{}" height="{}" fill="{}"/><text x="{lx}" y="{ly}" text-anchor="middle" font-size="12" fill="{}">{}</text></g>"#,
            e.x,
            e.y,
            l.swatch_width,
            l.swatch_height,
            e.color,
            e.color.text_color(),
            escape(&e.category),
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// A standalone page with title, description, treemap and legend.
pub fn to_html(scene: &Scene) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, r#"<html lang="en"><head><meta charset="utf-8">"#);
    let _ = writeln!(html, "<title>{}</title>", escape(&scene.title));
    let _ = writeln!(
        html,
        "<style>body{{font-family:sans-serif;text-align:center}}svg{{display:block;margin:0 auto}}</style>"
    );
    let _ = writeln!(html, "</head><body>");
    let _ = writeln!(html, r#"<h1 id="title">{}</h1>"#, escape(&scene.title));
    let _ = writeln!(
        html,
        r#"<p id="description">{}</p>"#,
        escape(&scene.description)
    );
    html.push_str(&to_svg(&scene.treemap));
    html.push_str(&legend_svg(&scene.legend));
    html.push_str("</body></html>\n");
    html
}

pub fn to_json(treemap: &Treemap) -> serde_json::Value {
    serde_json::json!({
        "width": treemap.width,
        "height": treemap.height,
        "categories": treemap.categories(),
        "tiles": treemap.tiles.iter().map(|t| serde_json::json!({
            "id": t.key,
            "name": t.name,
            "category": t.category,
            "value": t.value,
            "x0": t.rect.x0,
            "y0": t.rect.y0,
            "x1": t.rect.x1,
            "y1": t.rect.y1,
            "color": t.color.to_hex(),
        })).collect::<Vec<_>>()
    })
}

pub fn to_csv(treemap: &Treemap, mut w: impl std::io::Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "id", "name", "category", "value", "x0", "y0", "x1", "y1", "color",
    ])?;
    for t in &treemap.tiles {
        writer.write_record([
            t.key.clone(),
            t.name.clone(),
            t.category.clone(),
            t.value.to_string(),
            t.rect.x0.to_string(),
            t.rect.y0.to_string(),
            t.rect.x1.to_string(),
            t.rect.y1.to_string(),
            t.color.to_hex(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// CSS pixel to millimetre.
const PX_TO_MM: f32 = 25.4 / 96.0;

/// One landscape page: title, treemap, legend beneath it.
pub fn to_pdf(treemap: &Treemap, legend: &Legend, title: &str, out: &std::path::Path) -> Result<()> {
    use printpdf::{BuiltinFont, Color as PdfColor, Mm, PdfDocument, Rect, Rgb};

    let margin = 10.0_f32;
    let header = 14.0_f32;
    let map_w = treemap.width as f32 * PX_TO_MM;
    let map_h = treemap.height as f32 * PX_TO_MM;
    let legend_h = legend.canvas_height() as f32 * PX_TO_MM;
    let page_w = map_w.max(legend.layout.width as f32 * PX_TO_MM) + 2.0 * margin;
    let page_h = map_h + legend_h + header + 3.0 * margin;

    let (doc, page1, layer1) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Treemap");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Pdf(e.to_string()))?;

    let fill = |c: crate::color::Color| {
        let (r, g, b) = c.as_unit_rgb();
        PdfColor::Rgb(Rgb::new(r, g, b, None))
    };
    // PDF space grows upwards; `top` is the page-space y of canvas y = 0.
    let place = |x0: f64, y0: f64, x1: f64, y1: f64, top: f32| {
        Rect::new(
            Mm(margin + x0 as f32 * PX_TO_MM),
            Mm(top - y1 as f32 * PX_TO_MM),
            Mm(margin + x1 as f32 * PX_TO_MM),
            Mm(top - y0 as f32 * PX_TO_MM),
        )
    };

    layer.set_fill_color(fill(crate::color::Color::BLACK));
    layer.use_text(title, 14.0, Mm(margin), Mm(page_h - margin - 6.0), &font);

    let map_top = page_h - margin - header;
    for t in &treemap.tiles {
        if t.rect.area() <= 0.0 {
            continue;
        }
        layer.set_fill_color(fill(t.color));
        layer.add_rect(place(t.rect.x0, t.rect.y0, t.rect.x1, t.rect.y1, map_top));
        // Skip labels that cannot fit a 6pt line.
        if t.rect.height() >= 14.0 && t.rect.width() >= 30.0 {
            layer.set_fill_color(fill(t.color.text_color()));
            layer.use_text(
                t.name.as_str(),
                6.0,
                Mm(margin + (t.rect.x0 as f32 + 3.0) * PX_TO_MM),
                Mm(map_top - (t.rect.y0 as f32 + 10.0) * PX_TO_MM),
                &font,
            );
        }
    }

    let legend_top = map_top - map_h - margin;
    let l = &legend.layout;
    for e in &legend.entries {
        layer.set_fill_color(fill(e.color));
        layer.add_rect(place(e.x, e.y, e.x + l.swatch_width, e.y + l.swatch_height, legend_top));
        layer.set_fill_color(fill(e.color.text_color()));
        layer.use_text(
            e.category.as_str(),
            7.0,
            Mm(margin + (e.x as f32 + 4.0) * PX_TO_MM),
            Mm(legend_top - (e.y as f32 + 14.0) * PX_TO_MM),
            &font,
        );
    }

    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(|e| Error::Pdf(e.to_string()))?;
    Ok(())
}
