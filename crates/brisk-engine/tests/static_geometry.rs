mod common;

use brisk_engine::backend::BufferUsage;
use brisk_engine::coords::StrokedRect;
use brisk_engine::render::{Renderer, VERTICES_PER_RECT};

use common::{begin, draws, renderer, tri};

fn rects(n: usize) -> Vec<StrokedRect> {
    (0..n)
        .map(|i| StrokedRect::new(i as f32 * 10.0, 0.0, 8.0, 8.0, if i % 2 == 0 { 0.0 } else { 1.5 }))
        .collect()
}

#[test]
fn static_buffer_holds_six_vertices_per_rect() {
    let mut r = renderer();
    r.set_color(0.5, 0.5, 0.8, 1.0);
    r.build_static_geometry(&rects(1000));

    let geometry = r.static_geometry().unwrap();
    assert_eq!(geometry.vertex_count() as usize, 1000 * VERTICES_PER_RECT);
    assert_eq!(
        r.backend().buffer_usage(geometry.buffer_id()),
        Some(BufferUsage::Static)
    );
}

#[test]
fn static_geometry_is_one_draw_call() {
    let mut r = renderer();
    r.build_static_geometry(&rects(500));
    begin(&mut r);
    r.draw_static_geometry();
    r.end_frame();

    let d = draws(&r);
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].vertex_count, 3000);
    assert_eq!(d[0].texture, Some(r.fallback_texture().id()));
    assert_eq!(r.metrics().draw_calls, 1);
    assert_eq!(r.metrics().triangle_count, 1000);
}

#[test]
fn pending_dynamic_vertices_flush_before_static_draw() {
    let mut r = renderer();
    r.build_static_geometry(&rects(4));
    begin(&mut r);
    tri(&mut r, 0);
    r.draw_static_geometry();
    r.end_frame();

    let counts: Vec<_> = draws(&r).iter().map(|d| d.vertex_count).collect();
    assert_eq!(counts, [3, 24]);
}

#[test]
fn static_vertices_carry_shape_and_fill_color() {
    let mut r = renderer();
    r.set_color(1.0, 1.0, 1.0, 0.5);
    r.build_static_geometry(&rects(2));
    begin(&mut r);
    r.draw_static_geometry();
    r.end_frame();

    let d = &draws(&r)[0];
    assert!(d.vertices.iter().all(|v| v.color == [0.5, 0.5, 0.5, 0.5]));
    assert!(d.vertices.iter().all(|v| v.size == [8.0, 8.0]));
    assert_eq!(d.vertices[0].stroke_width, 0.0);
    assert_eq!(d.vertices[6].stroke_width, 1.5);
}

#[test]
fn rebuilding_replaces_the_previous_buffer() {
    let mut r = renderer();
    let baseline = r.backend().live_buffers();

    r.build_static_geometry(&rects(3));
    r.build_static_geometry(&rects(7));
    assert_eq!(r.backend().live_buffers(), baseline + 1);
    assert_eq!(r.static_geometry().unwrap().vertex_count(), 42);

    r.build_static_geometry(&[]);
    assert!(r.static_geometry().is_none());
    assert_eq!(r.backend().live_buffers(), baseline);
}

#[test]
fn drawing_without_static_geometry_does_nothing() {
    let mut r = renderer();
    begin(&mut r);
    r.draw_static_geometry();
    r.end_frame();
    assert_eq!(r.metrics().draw_calls, 0);
}

#[test]
fn static_draw_uses_the_current_transform() {
    let mut r = renderer();
    r.build_static_geometry(&rects(1));
    begin(&mut r);
    r.scale(0.5, 0.5);
    r.draw_static_geometry();
    r.end_frame();

    let d = &draws(&r)[0];
    assert_eq!(d.globals.zoom(), 0.5);
}
