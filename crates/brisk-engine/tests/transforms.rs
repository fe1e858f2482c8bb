mod common;

use approx::assert_relative_eq;
use brisk_engine::coords::{Transform, Vec2};
use brisk_engine::render::Renderer;

use common::{begin, draws, renderer, tri};

#[test]
fn push_pop_restores_transform() {
    let mut r = renderer();
    begin(&mut r);

    r.translate(10.0, 20.0);
    let before = r.transform();
    r.push();
    r.rotate(1.0);
    r.scale(3.0, 3.0);
    r.translate(-4.0, 7.0);
    r.pop();

    assert_eq!(r.transform(), before);
    r.end_frame();
}

#[test]
fn pop_on_empty_stack_is_ignored() {
    let mut r = renderer();
    begin(&mut r);
    r.translate(1.0, 2.0);
    r.pop();
    assert_eq!(r.transform(), Transform::translation(1.0, 2.0));
    r.end_frame();
}

#[test]
fn origin_resets_to_identity() {
    let mut r = renderer();
    begin(&mut r);
    r.scale(2.0, 2.0);
    r.origin();
    assert_eq!(r.transform(), Transform::IDENTITY);
    r.end_frame();
}

#[test]
fn later_calls_apply_in_local_space() {
    let mut r = renderer();
    begin(&mut r);
    r.translate(100.0, 0.0);
    r.scale(2.0, 2.0);

    let p = r.transform().transform_point(Vec2::new(1.0, 1.0));
    assert_relative_eq!(p.x, 102.0);
    assert_relative_eq!(p.y, 2.0);
    r.end_frame();
}

#[test]
fn transform_is_sampled_when_the_batch_flushes() {
    let mut r = renderer();
    begin(&mut r);

    r.translate(10.0, 0.0);
    tri(&mut r, 0);
    r.translate(5.0, 0.0);
    r.end_frame();

    let d = draws(&r);
    assert_eq!(d.len(), 1);
    let m = d[0].globals.transform();
    assert_relative_eq!(m[6], 15.0);
    assert_relative_eq!(m[7], 0.0);
    // positions stay untransformed on the CPU
    assert_eq!(d[0].vertices[0].position, [0.0, 0.0]);
}

#[test]
fn transform_changes_do_not_flush() {
    let mut r = renderer();
    begin(&mut r);
    tri(&mut r, 0);
    r.push();
    r.translate(3.0, 3.0);
    tri(&mut r, 1);
    r.pop();
    r.end_frame();
    assert_eq!(r.metrics().draw_calls, 1);
}

#[test]
fn zoom_follows_uniform_scale() {
    let mut r = renderer();
    begin(&mut r);
    r.scale(0.25, 0.25);
    tri(&mut r, 0);
    r.end_frame();
    assert_relative_eq!(draws(&r)[0].globals.zoom(), 0.25);
}

#[test]
fn apply_transform_composes_locally() {
    let mut r = renderer();
    begin(&mut r);
    r.scale(2.0, 2.0);
    r.apply_transform(Transform::translation(5.0, 0.0));
    let p = r.transform().transform_point(Vec2::zero());
    assert_relative_eq!(p.x, 10.0);
    r.end_frame();
}

#[test]
#[should_panic(expected = "transform stack overflow")]
fn pushing_past_the_configured_depth_panics() {
    let mut r = common::renderer_with(brisk_engine::render::RendererConfig {
        max_transform_depth: 2,
        ..Default::default()
    });
    begin(&mut r);
    r.push();
    r.push();
    r.push();
}

#[test]
fn resolution_tracks_the_default_target() {
    let mut r = renderer();
    begin(&mut r);
    tri(&mut r, 0);
    r.end_frame();
    assert_eq!(
        draws(&r)[0].globals.resolution(),
        [common::WIDTH as f32, common::HEIGHT as f32]
    );

    r.backend_mut().resize(800, 600);
    begin(&mut r);
    tri(&mut r, 0);
    r.end_frame();
    assert_eq!(draws(&r)[0].globals.resolution(), [800.0, 600.0]);
}
