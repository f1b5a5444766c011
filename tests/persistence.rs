use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use colorfe::palette::Palette;
use colorfe::session::ColoringSession;
use colorfe::store::{FileStore, PixelStore};
use image::{Rgba, RgbaImage};

static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Fresh scratch directory per test, under the OS temp dir.
fn scratch_dir(tag: &str) -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "colorfe-test-{}-{}-{}",
        tag,
        std::process::id(),
        n
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn white_page(size: u32) -> RgbaImage {
    let mut page = RgbaImage::new(size, size);
    for px in page.pixels_mut() {
        *px = Rgba([255, 255, 255, 255]);
    }
    page
}

#[test]
fn file_store_round_trips_entry_lists() {
    let dir = scratch_dir("roundtrip");
    let mut store = FileStore::new(&dir);
    let entries = vec![
        ((0, 0), [220, 35, 35, 204]),
        ((1, 0), [42, 75, 215, 204]),
        ((7, 3), [29, 105, 20, 204]),
    ];
    store.save("/drawing/eagle.png", &entries).unwrap();

    // A fresh store over the same root sees the same pairs
    let reopened = FileStore::new(&dir);
    assert_eq!(reopened.load("/drawing/eagle.png"), entries);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn distinct_image_ids_do_not_collide() {
    let dir = scratch_dir("ids");
    let mut store = FileStore::new(&dir);
    store.save("a.png", &[((1, 1), [1, 1, 1, 204])]).unwrap();
    store.save("b.png", &[((2, 2), [2, 2, 2, 204])]).unwrap();
    assert_eq!(store.load("a.png").len(), 1);
    assert_eq!(store.load("b.png")[0].0, (2, 2));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_state_file_loads_as_empty() {
    let dir = scratch_dir("malformed");
    let mut store = FileStore::new(&dir);
    store.save("page.png", &[((3, 3), [9, 9, 9, 204])]).unwrap();

    // Corrupt the stored file in place
    let stored: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(stored.len(), 1);
    fs::write(&stored[0], b"definitely not bincode").unwrap();

    assert!(store.load("page.png").is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn clear_removes_stored_state_and_tolerates_absence() {
    let dir = scratch_dir("clear");
    let mut store = FileStore::new(&dir);
    store.save("page.png", &[((3, 3), [9, 9, 9, 204])]).unwrap();
    store.clear("page.png").unwrap();
    assert!(store.load("page.png").is_empty());
    // Clearing again is fine
    store.clear("page.png").unwrap();
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn a_session_restores_its_own_committed_state() {
    let dir = scratch_dir("session");
    let image_id = "/drawing/astronaut.png";

    {
        let store = FileStore::new(&dir);
        let mut session =
            ColoringSession::open(image_id, white_page(8), Palette::default(), Box::new(store));
        session.set_color(2);
        session.set_brush_size(3);
        session.pointer_down(1, 4.0, 4.0);
        session.pointer_move(1, 5.0, 4.0);
        session.pointer_up();
        assert!(!session.colored().is_empty());
    }

    // Re-open: same map, and the final surface is redrawn from it
    let store = FileStore::new(&dir);
    let session =
        ColoringSession::open(image_id, white_page(8), Palette::default(), Box::new(store));
    assert!(!session.colored().is_empty());
    let expected = session.palette().color(2).0;
    assert_eq!(session.colored().get((4, 4)), Some(expected));
    assert_eq!(session.final_layer().get_pixel(4, 4).0, expected);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn erased_pixels_stay_gone_after_restore() {
    let dir = scratch_dir("erase");
    let image_id = "page.png";

    {
        let store = FileStore::new(&dir);
        let mut session =
            ColoringSession::open(image_id, white_page(8), Palette::default(), Box::new(store));
        session.set_brush_size(3);
        session.pointer_down(1, 4.0, 4.0);
        session.pointer_up();

        let eraser = session.palette().eraser_index();
        session.set_color(eraser);
        session.pointer_down(1, 4.0, 4.0);
        session.pointer_up();
        assert!(session.colored().is_empty());
    }

    let store = FileStore::new(&dir);
    let session =
        ColoringSession::open(image_id, white_page(8), Palette::default(), Box::new(store));
    assert!(session.colored().is_empty());
    assert!(session.final_layer().pixels().all(|p| p[3] == 0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn persisted_entries_are_ordered() {
    let dir = scratch_dir("ordered");
    let image_id = "page.png";

    let store = FileStore::new(&dir);
    let mut session =
        ColoringSession::open(image_id, white_page(8), Palette::default(), Box::new(store));
    session.set_brush_size(4);
    session.pointer_down(1, 5.0, 5.0);
    session.pointer_move(1, 2.0, 2.0);
    session.pointer_up();

    let reopened = FileStore::new(&dir);
    let entries = reopened.load(image_id);
    assert!(!entries.is_empty());
    let mut sorted = entries.clone();
    sorted.sort_unstable_by_key(|(k, _)| *k);
    assert_eq!(entries, sorted);

    let _ = fs::remove_dir_all(&dir);
}
