// SPDX-License-Identifier: MPL-2.0
mod common;

use common::{dicom, png, slice, viewer, zip, MemoryFetcher};
use scanlens::config::{self, Config};
use scanlens::domain::frame::FrameKind;
use scanlens::domain::viewer::{Point, Tool, ToolSelection, Translation};
use scanlens::interaction::{InputEvent, Key, Modifiers};
use scanlens::media::classifier::classify_name;
use scanlens::media::{self, FrameClass};
use scanlens::notify::Severity;
use scanlens::render::{FrameStatus, PixmapSurface};
use scanlens::{Dispatch, Reference, Viewer};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::tempdir;

const STUDY: &str = "https://pacs.example/studies/42/series.zip";

fn drag(viewer: &mut Viewer<PixmapSurface>, dy: f32, modifiers: Modifiers, now: Instant) {
    viewer.handle_input(
        InputEvent::PointerDown {
            position: Point::new(50.0, 50.0),
            modifiers,
        },
        now,
    );
    viewer.handle_input(
        InputEvent::PointerMove {
            position: Point::new(50.0, 50.0 + dy),
            modifiers,
        },
        now,
    );
    viewer.handle_input(
        InputEvent::PointerUp {
            position: Point::new(50.0, 50.0 + dy),
        },
        now,
    );
}

fn current(viewer: &Viewer<PixmapSurface>) -> usize {
    viewer.state().expect("loaded").current_index
}

#[tokio::test]
async fn end_to_end_archive_scenario() {
    let pixels: Vec<u16> = (0..200u32 * 300).map(|i| (i % 4096) as u16).collect();
    let a_1 = dicom(200, 300, &pixels, Some((2048.0, 4096.0)));
    let a_2 = png(100, 100, [30, 60, 90, 255]);
    let archive = zip(&[
        ("readme.txt", b"study notes"),
        ("a_2.png", &a_2),
        ("a_1.dcm", &a_1),
    ]);

    let (mut viewer, notifier) = viewer(MemoryFetcher::default().with(STUDY, archive), Config::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    viewer.on_progress(move |progress| {
        sink.lock()
            .expect("lock")
            .push((progress.percent, progress.completed, progress.total));
    });

    let summary = viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;

    assert_eq!(summary.total_frames, 2);
    assert!(summary.is_archive);
    let manifest = viewer.manifest().expect("manifest");
    let names: Vec<&str> = manifest.entries().iter().map(|e| e.filename()).collect();
    assert_eq!(names, ["a_1.dcm", "a_2.png"]);
    assert!(manifest.entries()[0].size_bytes() > 120_000);

    assert_eq!(*seen.lock().expect("lock"), vec![(50, 1, 2), (100, 2, 2)]);

    assert!(viewer.select_frame(1).await);
    let overlay = viewer.overlay().expect("overlay");
    assert_eq!(overlay.kind, Some(FrameKind::RasterImage));
    assert_eq!(overlay.status, FrameStatus::Ready);
    assert_eq!(overlay.window, None);

    viewer.set_tool(ToolSelection::Activate(Tool::WindowLevel));
    let before = viewer.state().expect("state").transform;
    drag(&mut viewer, 40.0, Modifiers::NONE, Instant::now());
    let after = viewer.state().expect("state");
    assert_eq!(after.transform, before);
    assert_eq!(after.current_index, 1);

    let notes = notifier.drain();
    assert!(notes
        .iter()
        .all(|n| n.severity() == Severity::Info));
    assert!(notes
        .iter()
        .any(|n| n.message_key() == "notification-window-level-unsupported"));
}

#[test]
fn extraction_orders_naturally_and_classifies() {
    let frame = slice(0);
    let archive = zip(&[
        ("scan_2.dcm", &frame),
        ("scan_10.dcm", &frame),
        ("scan_1.dcm", &frame),
        ("__MACOSX/._scan_1.dcm", b"junk"),
    ]);

    let manifest = media::extract(&archive).expect("extract");
    let names: Vec<&str> = manifest.entries().iter().map(|e| e.filename()).collect();
    assert_eq!(names, ["scan_1.dcm", "scan_2.dcm", "scan_10.dcm"]);
    assert!(manifest.entries().iter().enumerate().all(|(i, e)| e.order() == i));

    assert_eq!(classify_name("IMG00231"), FrameClass::StructuredImage);
    assert_eq!(classify_name("photo.png"), FrameClass::RasterImage);
    assert_eq!(classify_name("readme.txt"), FrameClass::Unknown);
}

#[tokio::test]
async fn preload_survives_a_malformed_frame() {
    let archive = zip(&[
        ("f_1.dcm", &slice(0)),
        ("f_2.dcm", b"DICM but not really"),
        ("f_3.dcm", &slice(50)),
    ]);
    let (mut viewer, notifier) = viewer(MemoryFetcher::default().with(STUDY, archive), Config::default());

    viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;

    assert!(viewer.cache_entry(0).expect("entry 0").is_loaded());
    let failed = viewer.cache_entry(1).expect("entry 1");
    assert!(!failed.is_loaded());
    assert!(!failed.error().unwrap_or_default().is_empty());
    assert!(viewer.cache_entry(2).expect("entry 2").is_loaded());

    let stats = viewer.preload_stats().expect("stats");
    assert_eq!((stats.loaded, stats.failed, stats.pending), (2, 1, 0));

    let notes = notifier.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity(), Severity::Warning);
    assert_eq!(notes[0].message_key(), "notification-frames-failed");

    // Selecting the failed frame retries on demand and shows it as unavailable.
    assert!(viewer.select_frame(1).await);
    assert_eq!(current(&viewer), 1);
    assert!(matches!(
        viewer.overlay().expect("overlay").status,
        FrameStatus::Unavailable(_)
    ));
    let notes = notifier.drain();
    assert_eq!(notes[0].message_key(), "notification-frame-unavailable");
}

#[tokio::test]
async fn navigation_wraps_around() {
    let frames: Vec<Vec<u8>> = (0..5).map(|i| slice(i * 100)).collect();
    let names: Vec<String> = (1..=5).map(|i| format!("slice_{i}.dcm")).collect();
    let entries: Vec<(&str, &[u8])> = names
        .iter()
        .zip(&frames)
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();
    let (mut viewer, _) = viewer(MemoryFetcher::default().with(STUDY, zip(&entries)), Config::default());
    viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;
    let now = Instant::now();

    viewer.handle_input(InputEvent::Key(Key::End), now);
    assert_eq!(current(&viewer), 4);
    viewer.handle_input(InputEvent::Key(Key::ArrowDown), now);
    assert_eq!(current(&viewer), 0);
    viewer.handle_input(InputEvent::Key(Key::ArrowUp), now);
    assert_eq!(current(&viewer), 4);
    viewer.handle_input(InputEvent::Key(Key::Home), now);
    assert_eq!(current(&viewer), 0);
}

#[tokio::test]
async fn wheel_steps_are_throttled() {
    let archive = zip(&[("s_1.dcm", &slice(0)), ("s_2.dcm", &slice(1)), ("s_3.dcm", &slice(2))]);
    let (mut viewer, _) = viewer(MemoryFetcher::default().with(STUDY, archive), Config::default());
    viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;

    let wheel = InputEvent::Wheel {
        delta_y: 3.0,
        modifiers: Modifiers::NONE,
    };
    let start = Instant::now();
    assert!(viewer.handle_input(wheel, start).is_handled());
    assert!(matches!(
        viewer.handle_input(wheel, start + Duration::from_millis(10)),
        Dispatch::Ignored
    ));
    assert_eq!(current(&viewer), 1);

    assert!(viewer
        .handle_input(wheel, start + Duration::from_millis(80))
        .is_handled());
    assert_eq!(current(&viewer), 2);
}

#[tokio::test]
async fn single_frame_ignores_navigation() {
    let location = "https://pacs.example/photo.png";
    let (mut viewer, _) = viewer(
        MemoryFetcher::default().with(location, png(8, 8, [1, 2, 3, 255])),
        Config::default(),
    );
    let summary = viewer.load(Reference::parse(location)).await.expect("load");
    viewer.wait_for_preload().await;
    assert!(!summary.is_archive);
    assert_eq!(summary.total_frames, 1);

    let now = Instant::now();
    viewer.handle_input(
        InputEvent::Wheel {
            delta_y: 1.0,
            modifiers: Modifiers::NONE,
        },
        now,
    );
    drag(&mut viewer, 100.0, Modifiers::NONE, now);
    for key in [Key::ArrowDown, Key::ArrowUp, Key::End, Key::PageDown] {
        viewer.handle_input(InputEvent::Key(key), now);
    }
    assert_eq!(current(&viewer), 0);
    assert!(viewer.select_frame(0).await);
}

#[tokio::test]
async fn tool_switch_leaves_no_pan_handler() {
    let archive = zip(&[("s_1.dcm", &slice(0)), ("s_2.dcm", &slice(1))]);
    let (mut viewer, _) = viewer(MemoryFetcher::default().with(STUDY, archive), Config::default());
    viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;

    viewer.set_tool(ToolSelection::Activate(Tool::Pan));
    viewer.set_tool(ToolSelection::Activate(Tool::Zoom));
    assert_eq!(viewer.state().expect("state").active_tool, Some(Tool::Zoom));
    assert_eq!(viewer.tools().bindings().bound_count(), 1);

    drag(&mut viewer, 30.0, Modifiers::NONE, Instant::now());
    let state = viewer.state().expect("state");
    assert_eq!(state.transform.translation, Translation::default());
    // Zoom leaves drags to navigation.
    assert_eq!(state.current_index, 1);
}

#[tokio::test]
async fn pan_owns_drags_unless_modifier_held() {
    let archive = zip(&[("s_1.dcm", &slice(0)), ("s_2.dcm", &slice(1))]);
    let (mut viewer, _) = viewer(MemoryFetcher::default().with(STUDY, archive), Config::default());
    viewer.load(Reference::parse(STUDY)).await.expect("load");
    viewer.wait_for_preload().await;
    viewer.set_tool(ToolSelection::Activate(Tool::Pan));

    drag(&mut viewer, 64.0, Modifiers::NONE, Instant::now());
    let state = viewer.state().expect("state");
    assert_eq!(state.current_index, 0);
    assert!(state.transform.translation.y > 0.0);

    drag(
        &mut viewer,
        64.0,
        Modifiers {
            shift: true,
            ..Modifiers::NONE
        },
        Instant::now(),
    );
    assert_eq!(current(&viewer), 1);
}

#[tokio::test]
async fn new_load_replaces_previous_session() {
    let first = zip(&[("a_1.dcm", &slice(0)), ("a_2.dcm", &slice(1)), ("a_3.dcm", &slice(2))]);
    let second = zip(&[("b_1.png", &png(4, 4, [0, 0, 0, 255])), ("b_2.png", &png(4, 4, [9, 9, 9, 255]))]);
    let other = "https://pacs.example/other.zip";
    let (mut viewer, _) = viewer(
        MemoryFetcher::default().with(STUDY, first).with(other, second),
        Config::default(),
    );

    let a = viewer.load(Reference::parse(STUDY)).await.expect("first load");
    let b = viewer.load(Reference::parse(other)).await.expect("second load");
    assert_ne!(a.session, b.session);

    viewer.wait_for_preload().await;
    viewer.pump();

    let stats = viewer.preload_stats().expect("stats");
    assert_eq!(stats.loaded, 2);
    assert_eq!(viewer.manifest().map(|m| m.total_frames()), Some(2));
    assert_eq!(viewer.progress().map(|p| p.percent), Some(100));
    assert_eq!(
        viewer.displayed_frame().map(|f| f.kind()),
        Some(FrameKind::RasterImage)
    );
}

#[tokio::test]
async fn corrupt_and_empty_archives_fail_the_load() {
    let empty = zip(&[("notes.txt", b"nothing to see")]);
    let corrupt = b"PK\x03\x04 definitely not a zip".to_vec();
    let (mut viewer, notifier) = viewer(
        MemoryFetcher::default()
            .with("https://pacs.example/empty.zip", empty)
            .with("https://pacs.example/corrupt.zip", corrupt),
        Config::default(),
    );

    let err = viewer
        .load(Reference::parse("https://pacs.example/empty.zip"))
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), "error-load-archive-empty");

    let err = viewer
        .load(Reference::parse("https://pacs.example/corrupt.zip"))
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), "error-load-archive-corrupt");

    assert!(viewer.state().is_none());
    let notes = notifier.drain();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.severity() == Severity::Error));
}

#[tokio::test]
async fn opens_local_archive_and_writes_png() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("series.zip");
    std::fs::write(&path, zip(&[("1.dcm", &slice(0)), ("2.dcm", &slice(9))])).expect("write");

    let mut viewer = Viewer::new(Config::default(), PixmapSurface::new(32, 32)).expect("viewer");
    let summary = viewer
        .load(Reference::parse(path.to_str().expect("utf-8 path")))
        .await
        .expect("load");
    viewer.wait_for_preload().await;
    assert_eq!(summary.total_frames, 2);

    let out = dir.path().join("frame.png");
    viewer.surface().save_png(&out).expect("save");
    let written = image_rs::open(&out).expect("decode output");
    assert_eq!((written.width(), written.height()), (32, 32));

    let missing = viewer
        .load(Reference::parse(dir.path().join("nope.zip").to_str().expect("utf-8")))
        .await;
    assert!(missing.is_err());
}

#[test]
fn config_round_trips_through_settings_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");

    let mut config = Config::default();
    config.navigation.wheel_throttle_ms = Some(120);
    config.tools.zoom_factor = Some(1.25);
    config.preload.enabled = Some(false);
    config::save_to_path(&config, &path).expect("save");

    let loaded = config::load_from_path(&path).expect("load");
    assert_eq!(loaded, config);
    assert_eq!(loaded.navigation.wheel_throttle(), Duration::from_millis(120));
    assert!(!loaded.preload.is_enabled());

    std::fs::write(&path, "[tools\nbroken").expect("write");
    let (fallback, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert_eq!(fallback, Config::default());
    assert!(warning.is_some());
}
