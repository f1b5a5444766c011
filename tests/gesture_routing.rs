use colorfe::palette::Palette;
use colorfe::session::ColoringSession;
use colorfe::store::MemoryStore;
use colorfe::stroke::GestureState;
use image::{Rgba, RgbaImage};

fn white_session(size: u32) -> ColoringSession {
    let mut page = RgbaImage::new(size, size);
    for px in page.pixels_mut() {
        *px = Rgba([255, 255, 255, 255]);
    }
    ColoringSession::open("gesture-page", page, Palette::default(), Box::new(MemoryStore::new()))
}

#[test]
fn two_contacts_pan_and_never_paint() {
    let mut session = white_session(16);
    session.pointer_down(2, 4.0, 4.0);
    assert_eq!(session.gesture(), GestureState::Panning);

    // Move events with perfectly valid coordinates still must not paint
    session.pointer_move(2, 5.0, 5.0);
    session.pointer_move(2, 10.0, 10.0);
    session.pointer_up();

    assert!(session.colored().is_empty());
    assert!(session.final_layer().pixels().all(|p| p[3] == 0));
    assert_eq!(session.gesture(), GestureState::Idle);
}

#[test]
fn three_contacts_are_completely_inert() {
    let mut session = white_session(16);
    session.pointer_down(3, 4.0, 4.0);
    assert_eq!(session.gesture(), GestureState::Idle);
    session.pointer_move(3, 8.0, 8.0);
    assert!(session.colored().is_empty());

    // A third finger during a pan leaves the pan state alone too
    session.pointer_down(2, 4.0, 4.0);
    session.pointer_down(3, 6.0, 6.0);
    assert_eq!(session.gesture(), GestureState::Panning);
    session.pointer_move(3, 12.0, 12.0);
    assert!(session.colored().is_empty());
}

#[test]
fn second_contact_mid_stroke_discards_the_stroke() {
    let mut session = white_session(16);
    session.pointer_down(1, 4.0, 4.0);
    session.pointer_move(1, 6.0, 6.0);
    assert_eq!(session.gesture(), GestureState::Drawing);

    session.pointer_down(2, 6.0, 6.0);
    assert_eq!(session.gesture(), GestureState::Panning);
    session.pointer_up();

    // Nothing was committed
    assert!(session.colored().is_empty());
    assert!(session.final_layer().pixels().all(|p| p[3] == 0));
}

#[test]
fn a_stroke_cannot_begin_while_panning() {
    let mut session = white_session(16);
    session.pointer_down(2, 4.0, 4.0);
    session.pointer_down(1, 5.0, 5.0);
    assert_eq!(session.gesture(), GestureState::Panning);
    session.pointer_up();

    // Panning has ended; the next gesture draws normally
    session.pointer_down(1, 5.0, 5.0);
    assert_eq!(session.gesture(), GestureState::Drawing);
    session.pointer_up();
    assert!(session.colored().contains((5, 5)));
}

#[test]
fn a_second_stroke_cannot_begin_mid_stroke() {
    let mut session = white_session(16);
    session.set_brush_size(1);
    session.pointer_down(1, 2.0, 2.0);
    // Re-entrant down is ignored; the original stroke continues
    session.pointer_down(1, 10.0, 10.0);
    session.pointer_move(1, 3.0, 2.0);
    session.pointer_up();

    assert!(session.colored().contains((2, 2)));
    assert!(session.colored().contains((3, 2)));
    assert!(!session.colored().contains((10, 10)));
}

#[test]
fn pointer_leave_commits_like_pointer_up() {
    let mut session = white_session(16);
    session.set_brush_size(1);
    session.pointer_down(1, 4.0, 4.0);
    session.pointer_move(1, 6.0, 4.0);
    session.pointer_leave();

    assert_eq!(session.gesture(), GestureState::Idle);
    assert!(session.colored().contains((4, 4)));
    assert!(session.colored().contains((6, 4)));
}

#[test]
fn live_preview_renders_on_scratch_and_clears_after_commit() {
    let mut session = white_session(16);
    session.pointer_down(1, 4.0, 4.0);
    session.pointer_move(1, 8.0, 8.0);
    assert!(session.scratch().pixels().any(|p| p[3] > 0));

    session.pointer_up();
    assert!(session.scratch().pixels().all(|p| p[3] == 0));
    assert!(!session.colored().is_empty());
}

#[test]
fn resize_mid_stroke_is_deferred_to_gesture_end() {
    let mut session = white_session(16);
    session.set_brush_size(1);
    session.pointer_down(1, 4.0, 4.0);
    // Layout change arrives while dragging: the in-flight stroke keeps the
    // old scale, so native positions are still 1:1
    session.set_displayed_size(32.0, 32.0);
    session.pointer_move(1, 6.0, 4.0);
    session.pointer_up();
    assert!(session.colored().contains((6, 4)));

    // After the gesture the new scale applies: displayed (8, 8) is native (4, 4)
    session.pointer_down(1, 8.0, 8.0);
    session.pointer_up();
    assert!(session.colored().contains((4, 4)));
}
