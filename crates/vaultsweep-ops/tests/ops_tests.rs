use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use vaultsweep_core::{
    DeleteOption, DisposalConfig, ExclusionConfig, MemoryVault, ScanMode, Vault, VaultConfig,
    VaultFile,
};
use vaultsweep_ops::{
    DisposalEvent, LogLevel, SweepOutcome, dispose, scan_and_dispose, start_disposal,
};
use vaultsweep_scan::FsVault;

fn config(option: DeleteOption, excluded: &str, subfolders: bool) -> DisposalConfig {
    DisposalConfig::new(option, ExclusionConfig::from_setting(excluded, subfolders))
}

#[test]
fn test_scenario_d_exclusion_without_subfolders() {
    let vault = MemoryVault::new()
        .with_file("Archive/b.png", "b")
        .with_file("Archive/Old/c.png", "c");

    let outcome = scan_and_dispose(
        &vault,
        ScanMode::Image,
        &config(DeleteOption::VaultTrash, "Archive", false),
    );

    let SweepOutcome::Completed(report) = outcome else {
        panic!("expected a completed sweep");
    };
    assert_eq!(report.disposal.skipped, 1);
    assert_eq!(report.removed(), 1);
    assert!(vault.contains("Archive/b.png"));
    assert!(!vault.contains("Archive/Old/c.png"));
}

#[test]
fn test_exclusion_with_subfolders_is_segment_anchored() {
    let vault = MemoryVault::new()
        .with_file("A/B/x.png", "")
        .with_file("A/B/deep/y.png", "")
        .with_file("A/Bx/z.png", "");

    let report = dispose(
        &vault,
        &vault.files(),
        &config(DeleteOption::Permanent, " A/B , ", true),
    );

    assert_eq!(report.skipped, 2);
    assert_eq!(report.removed, 1);
    assert!(!vault.contains("A/Bx/z.png"));
}

#[test]
fn test_scenario_f_permanent_delete() {
    let vault = MemoryVault::new()
        .with_file("note.md", "nothing here")
        .with_file("img/unused.jpg", "12345");

    let outcome = scan_and_dispose(
        &vault,
        ScanMode::Image,
        &config(DeleteOption::Permanent, "", false),
    );

    assert_eq!(outcome.removed(), 1);
    let SweepOutcome::Completed(report) = outcome else {
        panic!("expected a completed sweep");
    };
    assert_eq!(report.disposal.bytes_freed, 5);
    assert!(
        report
            .log()
            .iter()
            .any(|line| line.message == "Deleted permanently: img/unused.jpg")
    );
    assert_eq!(
        vault.disposals(),
        vec![("img/unused.jpg".to_string(), DeleteOption::Permanent)]
    );
}

#[test]
fn test_failed_disposal_is_logged_and_not_counted() {
    let vault = MemoryVault::new()
        .with_file("a.png", "")
        .with_file("b.png", "")
        .with_locked("a.png");

    let outcome = scan_and_dispose(
        &vault,
        ScanMode::Image,
        &config(DeleteOption::SystemTrash, "", false),
    );

    let SweepOutcome::Completed(report) = outcome else {
        panic!("expected a completed sweep");
    };
    assert_eq!(report.removed(), 1);
    assert_eq!(report.disposal.failed, 1);
    let errors: Vec<_> = report
        .log()
        .into_iter()
        .filter(|l| l.level == LogLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("a.png"));
}

#[test]
fn test_nothing_to_do_differs_from_empty_after_filtering() {
    let used = MemoryVault::new()
        .with_file("n.md", "![[a.png]]")
        .with_file("a.png", "");
    let outcome = scan_and_dispose(&used, ScanMode::Image, &DisposalConfig::default());
    assert!(matches!(
        outcome,
        SweepOutcome::NothingToDo {
            mode: ScanMode::Image,
            ..
        }
    ));

    let all_excluded = MemoryVault::new().with_file("Keep/a.png", "");
    let outcome = scan_and_dispose(
        &all_excluded,
        ScanMode::Image,
        &config(DeleteOption::Permanent, "Keep", false),
    );
    let SweepOutcome::Completed(report) = outcome else {
        panic!("expected a completed sweep");
    };
    assert_eq!(report.candidates, 1);
    assert_eq!(report.removed(), 0);
    assert!(all_excluded.contains("Keep/a.png"));
}

#[test]
fn test_all_mode_covers_other_attachments() {
    let vault = MemoryVault::new()
        .with_file("n.md", "")
        .with_file("board.canvas", "")
        .with_file("doc.pdf", "")
        .with_file("pic.png", "");

    let image_only = scan_and_dispose(&vault, ScanMode::Image, &DisposalConfig::default());
    assert_eq!(image_only.removed(), 1);
    assert!(vault.contains("doc.pdf"));

    let all = scan_and_dispose(&vault, ScanMode::All, &DisposalConfig::default());
    assert_eq!(all.removed(), 1);
    assert!(!vault.contains("doc.pdf"));
    assert!(vault.contains("n.md"));
    assert!(vault.contains("board.canvas"));
}

#[test]
fn test_filesystem_sweep_moves_to_vault_trash() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("img")).unwrap();
    fs::write(temp.path().join("note.md"), "![[kept.png]]").unwrap();
    fs::write(temp.path().join("img/kept.png"), "k").unwrap();
    fs::write(temp.path().join("img/stale.png"), "s").unwrap();

    let vault = FsVault::open(&VaultConfig::new(temp.path())).unwrap();
    let outcome = scan_and_dispose(&vault, ScanMode::Image, &DisposalConfig::default());

    assert_eq!(outcome.removed(), 1);
    assert!(temp.path().join("img/kept.png").exists());
    assert!(!temp.path().join("img/stale.png").exists());
    assert!(temp.path().join(".trash/stale.png").exists());

    // The trashed file is out of the vault, so a second sweep has nothing to do.
    let again = scan_and_dispose(&vault, ScanMode::Image, &DisposalConfig::default());
    assert!(matches!(again, SweepOutcome::NothingToDo { .. }));
}

#[tokio::test]
async fn test_start_disposal_streams_progress() {
    let memory = Arc::new(
        MemoryVault::new()
            .with_file("a.png", "1")
            .with_file("Skip/b.png", "22")
            .with_file("c.png", "333")
            .with_locked("c.png"),
    );
    let files: Vec<VaultFile> = memory.files();
    let vault: Arc<dyn Vault> = memory.clone();

    let mut rx = start_disposal(
        vault,
        files,
        config(DeleteOption::Permanent, "Skip", false),
    );

    let mut progress_events = 0;
    let mut complete = None;
    while let Some(event) = rx.recv().await {
        match event {
            DisposalEvent::Progress(p) => {
                assert_eq!(p.total, 3);
                progress_events += 1;
            }
            DisposalEvent::Complete(report) => complete = Some(report),
        }
    }

    let report = complete.expect("disposal should complete");
    assert_eq!(progress_events, 4);
    assert_eq!(report.removed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.bytes_freed, 1);
    assert_eq!(
        memory.disposals(),
        vec![("a.png".to_string(), DeleteOption::Permanent)]
    );
}

#[tokio::test]
async fn test_start_disposal_with_no_files_completes() {
    let vault: Arc<dyn Vault> = Arc::new(MemoryVault::new());
    let mut rx = start_disposal(vault, Vec::new(), DisposalConfig::default());

    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    match last {
        Some(DisposalEvent::Complete(report)) => assert_eq!(report.removed, 0),
        other => panic!("expected completion, got {other:?}"),
    }
}
