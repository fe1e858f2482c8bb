mod common;

use brisk_engine::backend::Command;
use brisk_engine::error::RenderError;
use brisk_engine::paint::Color;
use brisk_engine::render::Renderer;

use common::{begin, draws, renderer, tri};

#[test]
fn draws_go_to_the_bound_target() {
    let mut r = renderer();
    let target = r.create_render_target(64, 32).unwrap();
    begin(&mut r);

    tri(&mut r, 0);
    r.set_render_target(Some(&target));
    tri(&mut r, 1);
    r.set_render_target(None);
    r.draw_render_target(&target, 5.0, 5.0);
    r.end_frame();

    let d = draws(&r);
    assert_eq!(d.len(), 3);
    assert_eq!(d[0].target, None);
    assert_eq!(d[1].target, Some(target.id()));
    assert_eq!(d[1].globals.resolution(), [64.0, 32.0]);
    assert_eq!(d[2].target, None);
    assert_eq!(d[2].texture, Some(target.texture().id()));
    assert_eq!(d[2].vertices[4].position, [69.0, 37.0]);
}

#[test]
fn rebinding_the_same_target_does_not_flush() {
    let mut r = renderer();
    let target = r.create_render_target(8, 8).unwrap();
    begin(&mut r);
    r.set_render_target(Some(&target));
    tri(&mut r, 0);
    r.set_render_target(Some(&target));
    assert!(draws(&r).is_empty());
    r.end_frame();
    assert_eq!(r.metrics().draw_calls, 1);
}

#[test]
fn clear_flushes_pending_vertices_first() {
    let mut r = renderer();
    let target = r.create_render_target(8, 8).unwrap();
    begin(&mut r);
    r.set_render_target(Some(&target));
    tri(&mut r, 0);
    r.clear_render_target(None);
    r.end_frame();

    let tail: Vec<_> = r
        .backend()
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::Draw(_) | Command::Clear { .. }))
        .cloned()
        .collect();
    assert!(matches!(tail[0], Command::Draw(_)));
    assert_eq!(
        tail[1],
        Command::Clear {
            target: Some(target.id()),
            color: Color::transparent()
        }
    );
}

#[test]
fn clear_without_a_target_is_ignored() {
    let mut r = renderer();
    begin(&mut r);
    r.clear_render_target(Some(Color::white()));
    assert!(r.backend().commands().is_empty());
    r.end_frame();
}

#[test]
fn zero_sized_targets_are_incomplete() {
    let mut r = renderer();
    assert!(matches!(
        r.create_render_target(0, 10),
        Err(RenderError::IncompleteTarget { width: 0, max: 4096, .. })
    ));
    assert!(r.create_render_target(4096, 1).is_ok());
}

#[test]
#[should_panic(expected = "larger than the maximum size")]
fn oversized_target_panics_like_an_oversized_texture() {
    let mut r = renderer();
    let _ = r.create_render_target(10, 5000);
}

#[test]
#[should_panic(expected = "cannot be drawn into itself")]
fn drawing_a_target_into_itself_panics() {
    let mut r = renderer();
    let target = r.create_render_target(8, 8).unwrap();
    begin(&mut r);
    r.set_render_target(Some(&target));
    r.draw_render_target(&target, 0.0, 0.0);
}

#[test]
fn destroying_the_bound_target_restores_the_default() {
    let mut r = renderer();
    let target = r.create_render_target(8, 8).unwrap();
    let id = target.id();
    begin(&mut r);
    r.set_render_target(Some(&target));
    tri(&mut r, 0);
    r.destroy_render_target(target);

    assert_eq!(draws(&r).len(), 1);
    assert_eq!(r.backend().bound_target(), None);
    assert!(!r.backend().has_target(id));
    tri(&mut r, 1);
    r.end_frame();
    assert_eq!(draws(&r)[1].target, None);
}

#[test]
fn begin_frame_binds_the_default_target() {
    let mut r = renderer();
    let target = r.create_render_target(8, 8).unwrap();
    begin(&mut r);
    r.set_render_target(Some(&target));
    r.end_frame();

    r.begin_frame(Color::black());
    assert_eq!(r.backend().bound_target(), None);
    assert!(r.backend().commands().iter().any(|c| matches!(c, Command::Clear { target: None, .. })));
    r.end_frame();
}
