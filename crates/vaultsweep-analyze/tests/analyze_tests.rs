use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;
use vaultsweep_analyze::{
    LinkKind, ReferenceCollector, ReferenceConfig, UnusedFinder, extract_links, resolve_link,
};
use vaultsweep_core::{
    Frontmatter, MemoryVault, ResolvedLinks, ScanMode, Vault, VaultConfig, WarningKind,
};
use vaultsweep_scan::FsVault;

const TRICKY_TEXT: &str = "\
[[]] [[#Heading]] [[ |alias]] [top](#intro) [x](https://example.com/x.png)
[[http://host/y.png]] [ok](HTTPS://host/z.png) [[a [[b.png]] c]] ![[c.png#r]]
[d](<d d.png>) [e](e.png \"title\") [[图片.png|别名]] [f](httpd.png)";

fn unused_paths(vault: &dyn Vault, mode: ScanMode) -> Vec<String> {
    UnusedFinder::new()
        .find_unused(vault, mode)
        .unused
        .into_iter()
        .map(|f| f.path)
        .collect()
}

#[test]
fn test_extract_never_yields_empty_or_external_targets() {
    let targets: Vec<&str> = extract_links(TRICKY_TEXT, "n.md").map(|l| l.target).collect();

    assert!(!targets.is_empty());
    for target in &targets {
        assert!(!target.is_empty());
        assert!(!target.to_ascii_lowercase().starts_with("http://"));
        assert!(!target.to_ascii_lowercase().starts_with("https://"));
    }
    assert!(targets.contains(&"httpd.png"));
    assert!(targets.contains(&"图片.png"));
}

#[test]
fn test_extract_is_restartable() {
    let first: Vec<_> = extract_links(TRICKY_TEXT, "n.md").collect();
    let second: Vec<_> = extract_links(TRICKY_TEXT, "n.md").collect();
    assert_eq!(first, second);
}

#[test]
fn test_resolver_is_total() {
    let vault = MemoryVault::new().with_file("img/a.png", "");
    for target in ["a.png", "nothing.png", "deep/path/x.jpg", "名前.png"] {
        let resolved = resolve_link(target, "n.md", &vault);
        assert!(!resolved.path.is_empty());
    }
    assert_eq!(resolve_link("a.png", "n.md", &vault).path, "img/a.png");
}

#[test]
fn test_scenario_a_block_transclusion() {
    let vault = MemoryVault::new()
        .with_file("notes/a.md", "Look: ![[diagram.png#region]]")
        .with_file("assets/diagram.png", "png");

    let link = extract_links("Look: ![[diagram.png#region]]", "notes/a.md")
        .next()
        .unwrap();
    assert_eq!(link.kind, LinkKind::WikiTransclusion);
    assert_eq!(link.target, "diagram.png");

    let paths = ReferenceCollector::new().collect(&vault).paths;
    assert!(paths.contains("assets/diagram.png"));
}

#[test]
fn test_scenario_b_markdown_links() {
    let vault = MemoryVault::new()
        .with_file("notes/a.md", "[caption](../img/photo.jpg)")
        .with_file("img/photo.jpg", "jpg");

    let link = extract_links("[caption](../img/photo.jpg)", "notes/a.md")
        .next()
        .unwrap();
    assert_eq!(link.kind, LinkKind::Markdown);

    assert!(
        ReferenceCollector::new()
            .collect(&vault)
            .paths
            .contains("img/photo.jpg")
    );
    assert_eq!(
        extract_links("[caption](https://example.com/x.png)", "notes/a.md").count(),
        0
    );
}

#[test]
fn test_scenario_c_unused_images() {
    let vault = MemoryVault::new()
        .with_file("note.md", "![[a.png]]")
        .with_file("a.png", "a")
        .with_file("b.png", "b");

    assert_eq!(unused_paths(&vault, ScanMode::Image), vec!["b.png"]);
}

#[test]
fn test_scenario_e_canvas_nodes() {
    let canvas = r#"{
        "nodes": [
            {"id": "1", "type": "file", "file": "x.png", "x": 0, "y": 0},
            {"id": "2", "type": "text", "text": "[[y.png]]"},
            {"id": "3", "type": "group", "label": "ignored.png"}
        ],
        "edges": []
    }"#;
    let vault = MemoryVault::new()
        .with_file("board.canvas", canvas)
        .with_file("pics/y.png", "");

    let report = ReferenceCollector::new().collect(&vault);
    assert!(report.paths.contains("x.png"));
    assert!(report.paths.contains("pics/y.png"));
    assert!(!report.paths.contains("ignored.png"));
    assert_eq!(report.paths.len(), 2);
}

#[test]
fn test_invalid_canvas_is_a_warning() {
    let vault = MemoryVault::new()
        .with_file("broken.canvas", "{ not json")
        .with_file("ok.md", "[[kept.png]]")
        .with_file("kept.png", "");

    let report = ReferenceCollector::new().collect(&vault);
    assert!(report.paths.contains("kept.png"));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, "broken.canvas");
    assert_eq!(report.warnings[0].kind, WarningKind::InvalidCanvas);
    assert_eq!(report.documents_scanned, 2);
}

#[test]
fn test_frontmatter_banner_and_image_fields() {
    let mut fm = Frontmatter::new();
    fm.insert("banner".into(), "![[cover.jpg#center]]".into());
    fm.insert("image".into(), "thumbs/small.webp".into());
    fm.insert("tags".into(), serde_json::json!(["x", "inline.gif"]));
    let vault = MemoryVault::new()
        .with_note("n.md", fm, "no links here")
        .with_file("media/cover.jpg", "")
        .with_file("thumbs/small.webp", "")
        .with_file("inline.gif", "")
        .with_file("orphan.bmp", "");

    assert_eq!(unused_paths(&vault, ScanMode::Image), vec!["orphan.bmp"]);
}

#[test]
fn test_pre_resolved_index_is_a_fast_path_only() {
    let mut index = ResolvedLinks::new();
    index.insert(
        "a.md".to_string(),
        HashMap::from([("from-index.png".to_string(), 1), ("b.md".to_string(), 1)]),
    );
    let vault = MemoryVault::new()
        .with_resolved_links(index)
        .with_file("a.md", "[[b]]")
        .with_file("b.md", "")
        .with_file("board.canvas", r#"{"nodes":[{"type":"file","file":"canvas-only.png"}]}"#)
        .with_file("from-index.png", "")
        .with_file("canvas-only.png", "")
        .with_file("loose.png", "");

    assert_eq!(unused_paths(&vault, ScanMode::Image), vec!["loose.png"]);
}

#[test]
fn test_collection_is_idempotent() {
    let vault = MemoryVault::new()
        .with_file("a.md", "![[x.png]] [y](sub/y.jpg) [[missing.svg]]")
        .with_file("sub/b.md", "[[x.png|alias]]")
        .with_file("x.png", "")
        .with_file("sub/y.jpg", "");

    let collector = ReferenceCollector::new();
    assert_eq!(collector.collect(&vault).paths, collector.collect(&vault).paths);

    let sequential = ReferenceCollector::with_config(
        ReferenceConfig::builder().parallel(false).build().unwrap(),
    );
    assert_eq!(collector.collect(&vault).paths, sequential.collect(&vault).paths);
}

#[test]
fn test_adding_a_reference_only_grows_the_set() {
    let vault = MemoryVault::new()
        .with_file("a.md", "![[one.png]]")
        .with_file("one.png", "")
        .with_file("two.png", "");
    let before = ReferenceCollector::new().collect(&vault).paths;

    vault.insert("a.md", "![[one.png]] ![[two.png]]");
    let after = ReferenceCollector::new().collect(&vault).paths;

    assert!(before.iter().all(|p| after.contains(p)));
    assert!(after.contains("two.png"));
    assert!(after.len() > before.len());
}

#[test]
fn test_unresolved_reference_counts_under_its_raw_name() {
    let vault = MemoryVault::new()
        .with_file("a.md", "![[gone.png]] [pic](Shots/renamed.png)")
        .with_file("Shots/cat one.png", "");

    let paths = ReferenceCollector::new().collect(&vault).paths;
    assert!(paths.contains("gone.png"));
    assert!(paths.contains("Shots/renamed.png"));
    assert_eq!(
        unused_paths(&vault, ScanMode::Image),
        vec!["Shots/cat one.png"]
    );
}

#[test]
fn test_filesystem_vault_decodes_escaped_markdown_links() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("Shots")).unwrap();
    fs::write(temp.path().join("a.md"), "[pic](Shots/cat%20one.png)").unwrap();
    fs::write(temp.path().join("Shots/cat one.png"), "c").unwrap();

    let vault = FsVault::open(&VaultConfig::new(temp.path())).unwrap();
    assert!(unused_paths(&vault, ScanMode::Image).is_empty());
}

#[test]
fn test_filesystem_vault_end_to_end() {
    let temp = TempDir::new().unwrap();
    let write = |path: &str, content: &str| {
        let abs = temp.path().join(path);
        fs::create_dir_all(abs.parent().unwrap()).unwrap();
        fs::write(abs, content).unwrap();
    };
    write(
        "Daily/2024-01-01.md",
        "---\nbanner: \"![[header.png#top]]\"\ncover: Covers/c.jpg\n---\n![[chart.png]]\n[pdf](../Docs/My%20Report.pdf)\n",
    );
    write("Boards/plan.canvas", r#"{"nodes":[{"type":"file","file":"Boards/sketch.svg"}]}"#);
    write("Assets/header.png", "h");
    write("Assets/chart.png", "c");
    write("Covers/c.jpg", "j");
    write("Boards/sketch.svg", "<svg/>");
    write("Docs/My Report.pdf", "pdf");
    write("Docs/unused.pdf", "pdf");
    write("Assets/stale.gif", "gif");
    write(".obsidian/icon.png", "hidden");

    let vault = FsVault::open(&VaultConfig::new(temp.path())).unwrap();

    assert_eq!(unused_paths(&vault, ScanMode::Image), vec!["Assets/stale.gif"]);
    assert_eq!(
        unused_paths(&vault, ScanMode::All),
        vec!["Assets/stale.gif", "Docs/unused.pdf"]
    );
}

#[test]
fn test_filesystem_vault_bad_frontmatter_still_scans_body() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("n.md"),
        "---\nkey: [unclosed\n---\n![[kept.png]]\n",
    )
    .unwrap();
    fs::write(temp.path().join("kept.png"), "k").unwrap();

    let vault = FsVault::open(&VaultConfig::new(temp.path())).unwrap();
    let report = UnusedFinder::new().find_unused(&vault, ScanMode::Image);

    assert!(report.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::InvalidFrontmatter);
}

#[test]
fn test_filesystem_vault_table_embed_with_escaped_pipe() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("assets")).unwrap();
    fs::write(
        temp.path().join("n.md"),
        "| pic | note |\n| --- | --- |\n| ![[img.png\\|300]] | x |\n",
    )
    .unwrap();
    fs::write(temp.path().join("assets/img.png"), "i").unwrap();
    fs::write(temp.path().join("assets/other.png"), "o").unwrap();

    let vault = FsVault::open(&VaultConfig::new(temp.path())).unwrap();
    assert_eq!(
        unused_paths(&vault, ScanMode::Image),
        vec!["assets/other.png"]
    );
}
