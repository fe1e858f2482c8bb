mod common;

use approx::assert_relative_eq;
use brisk_engine::backend::HeadlessBackend;
use brisk_engine::paint::Color;
use brisk_engine::render::{BatchRenderer, Renderer, RendererConfig};

use common::{tri, HEIGHT, WIDTH};

fn frame(r: &mut BatchRenderer<HeadlessBackend>) {
    r.begin_frame(Color::black());
    tri(r, 0);
    r.end_frame();
}

#[test]
fn gpu_time_is_unset_until_a_query_resolves() {
    let mut r = common::renderer();
    frame(&mut r);
    assert_eq!(r.metrics().gpu_frame_time_ms, None);
    frame(&mut r);
    assert_eq!(r.metrics().gpu_frame_time_ms, None, "reading never blocks");
}

#[test]
fn gpu_time_reports_the_previous_frame() {
    let mut r = common::renderer();
    frame(&mut r);
    r.backend_mut().resolve_pending_queries(4_500_000);

    frame(&mut r);
    let ms = r.metrics().gpu_frame_time_ms.unwrap();
    assert_relative_eq!(ms, 4.5);

    // Later frames keep the last sample until a newer one arrives.
    frame(&mut r);
    assert_relative_eq!(r.metrics().gpu_frame_time_ms.unwrap(), 4.5);

    r.backend_mut().resolve_pending_queries(2_000_000);
    frame(&mut r);
    assert_relative_eq!(r.metrics().gpu_frame_time_ms.unwrap(), 2.0);
}

#[test]
fn unread_queries_do_not_accumulate() {
    let mut r = common::renderer();
    for _ in 0..20 {
        frame(&mut r);
        assert!(r.backend().live_queries() <= 2);
    }
}

#[test]
fn missing_timer_support_leaves_gpu_time_unset() {
    let gpu = HeadlessBackend::new(WIDTH, HEIGHT).with_timer_queries(false);
    let mut r = BatchRenderer::new(gpu, RendererConfig::default()).unwrap();
    for _ in 0..3 {
        frame(&mut r);
    }
    assert_eq!(r.metrics().gpu_frame_time_ms, None);
    assert_eq!(r.backend().live_queries(), 0);
    assert_eq!(r.metrics().draw_calls, 1);
}

#[test]
fn cpu_time_is_measured_per_frame() {
    let mut r = common::renderer();
    frame(&mut r);
    let ms = r.metrics().cpu_frame_time_ms;
    assert!(ms >= 0.0 && ms.is_finite());
}

#[test]
fn releasing_the_renderer_frees_queries() {
    let mut r = common::renderer();
    frame(&mut r);
    frame(&mut r);
    let gpu = r.into_backend();
    assert_eq!(gpu.live_queries(), 0);
}
