use exan_rs::models::{Column, Table};
use exan_rs::report::{self, JSMOL_FILES, PAGE_FILE, ReportOptions};
use exan_rs::{ExplorerOptions, prepare};
use std::fs;
use tempfile::tempdir;

fn prepared(images: Option<Vec<String>>) -> exan_rs::PreparedData {
    let t = Table::new(vec![
        Column::numeric("a", vec![1.0, 2.0, 3.0]),
        Column::numeric("b", vec![3.0, 1.0, 2.0]),
        Column::categorical("label", vec!["x", "</script>", "y"]),
    ])
    .unwrap();
    let opts = ExplorerOptions {
        images,
        ..ExplorerOptions::default()
    };
    prepare(&t, &opts).unwrap()
}

#[test]
fn payload_carries_every_frame() {
    let data = prepared(None);
    let p = report::payload(&data, &ReportOptions::default());
    for key in [
        "columns", "numeric", "colors", "sizes", "originals", "plot", "palette", "palettes",
        "xIndex", "yIndex", "colorColumn", "sizeColumn", "colorBar", "view", "log", "jsmol",
        "structurePattern", "constants",
    ] {
        assert!(p.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(p["colorColumn"], "label");
    assert_eq!(p["sizeColumn"], "None");
    assert_eq!(p["palettes"].as_object().unwrap().len(), 8);
    assert_eq!(p["palettes"]["Viridis256"].as_array().unwrap().len(), 256);
    assert_eq!(p["structurePattern"], "structures/set{}.xyz");
    assert_eq!(p["constants"]["plotRatio"], 2.5);
    assert!(p["plot"].get("imgs").is_none());
}

#[test]
fn image_urls_are_escaped() {
    let data = prepared(Some(vec![
        "img/a b.png".into(),
        "img/b.png".into(),
        "img/\"c\".png".into(),
    ]));
    let p = report::payload(&data, &ReportOptions::default());
    assert_eq!(p["plot"]["imgs"][0], "img/a%20b.png");
    assert_eq!(p["plot"]["imgs"][1], "img/b.png");
    assert_eq!(p["plot"]["imgs"][2], "img/%22c%22.png");
}

#[test]
fn writes_page_without_jsmol() {
    let dir = tempdir().unwrap();
    let data = prepared(None);
    let opts = ReportOptions {
        title: "Band gaps & more".into(),
        jsmol: false,
    };
    let page = report::write_report(dir.path(), &data, &opts).unwrap();
    assert_eq!(page, dir.path().join(PAGE_FILE));

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("<title>Band gaps &amp; more</title>"));
    assert!(html.contains(report::D3_URL));
    assert!(!html.contains("JSmol.min.js"));
    // only the closing tags of the real script blocks remain
    assert_eq!(html.matches("</script>").count(), 3);
    for (name, _) in JSMOL_FILES {
        assert!(!dir.path().join(name).exists());
    }
}

#[test]
fn jsmol_pages_ship_companion_files() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("site");
    let data = prepared(None);
    let opts = ReportOptions {
        jsmol: true,
        ..ReportOptions::default()
    };
    let page = report::write_report(&out, &data, &opts).unwrap();
    let html = fs::read_to_string(page).unwrap();
    assert!(html.contains("JSmol.min.js"));
    assert!(html.contains("id=\"appdiv\""));
    for (name, body) in JSMOL_FILES {
        let written = fs::read_to_string(out.join(name)).unwrap();
        assert_eq!(written, body);
    }
}

#[test]
fn hostile_labels_never_reach_markup() {
    let t = Table::new(vec![
        Column::numeric("a", vec![1.0, 2.0]),
        Column::numeric("b", vec![2.0, 1.0]),
        Column::categorical("<b onmouseover=x>", vec!["<img src=x onerror=alert(1)>", "ok"]),
    ])
    .unwrap();
    let data = prepare(&t, &ExplorerOptions::default()).unwrap();
    let html = report::render_page(&data, &ReportOptions::default()).unwrap();

    // labels only live inside the JSON payload, with `<` escaped
    assert!(!html.contains("<img src=x"));
    assert!(!html.contains("<b onmouseover"));
    assert!(html.contains("\\u003cimg src=x onerror=alert(1)>"));
    // the explorer script builds tooltips from text nodes, never from markup strings
    assert!(!html.contains(".html("));
    assert!(!html.contains("innerHTML"));
    assert!(html.contains(r#"row.append("span").attr("class", "tip-key").text(c)"#));

    let (_, pop) = JSMOL_FILES
        .iter()
        .find(|(name, _)| *name == "pop.html")
        .unwrap();
    assert!(pop.contains("escapeHtml(attributes[i])"));
    assert!(pop.contains("escapeHtml(localStorage.getItem(attributes[i]))"));
}

#[test]
fn rows_without_a_position_are_not_drawn() {
    let t = Table::new(vec![
        Column::numeric("a", vec![1.0, f64::NAN, 3.0]),
        Column::numeric("b", vec![2.0, 1.0, f64::NAN]),
    ])
    .unwrap();
    let data = prepare(&t, &ExplorerOptions::default()).unwrap();
    let p = report::payload(&data, &ReportOptions::default());
    // missing cells reach the page as null
    assert_eq!(p["plot"]["x"][1], serde_json::Value::Null);
    assert_eq!(p["plot"]["y"][2], serde_json::Value::Null);

    let html = report::render_page(&data, &ReportOptions::default()).unwrap();
    assert!(html.contains("Number.isFinite(xs[i]) && Number.isFinite(ys[i])"));
    assert_eq!(html.matches("data(plottable(xs, ys), (d) => d)").count(), 2);
}
