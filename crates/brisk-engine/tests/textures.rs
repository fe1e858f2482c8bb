mod common;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use brisk_engine::backend::{HeadlessBackend, TextureFilter};
use brisk_engine::coords::Rect;
use brisk_engine::error::TextureLoadError;
use brisk_engine::paint::Color;
use brisk_engine::render::{BatchRenderer, PendingTexture, Renderer, Texture};

use common::{begin, draws, renderer};

fn fixture(name: &str, width: u32, height: u32) -> PathBuf {
    let path = std::env::temp_dir().join(format!("brisk-{}-{name}", std::process::id()));
    let image = image::RgbaImage::from_fn(width, height, |x, y| image::Rgba([x as u8 * 40, y as u8 * 40, 200, 128]));
    image.save(&path).unwrap();
    path
}

/// Runs frames until the load resolves.
fn pump(r: &mut BatchRenderer<HeadlessBackend>, pending: &PendingTexture) {
    for _ in 0..500 {
        r.begin_frame(Color::black());
        r.end_frame();
        if pending.is_finished() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("texture load did not finish");
}

#[test]
fn loaded_texture_resolves_after_a_frame() {
    let path = fixture("ok.png", 3, 2);
    let mut r = renderer();
    let live = r.backend().live_textures();

    let pending = r.load_texture(&path);
    pump(&mut r, &pending);

    let texture: Texture = pollster::block_on(pending).unwrap();
    assert_eq!((texture.width(), texture.height()), (3, 2));
    assert_eq!(r.backend().live_textures(), live + 1);
    assert_eq!(
        r.backend().texture_desc(texture.id()).map(|d| d.filter),
        Some(TextureFilter::Linear)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn upload_waits_for_begin_frame() {
    let path = fixture("deferred.png", 1, 1);
    let mut r = renderer();
    let live = r.backend().live_textures();
    let pending = r.load_texture(&path);

    thread::sleep(Duration::from_millis(200));
    assert!(!pending.is_finished(), "decoded images are uploaded by the render thread");
    assert_eq!(r.backend().live_textures(), live);

    pump(&mut r, &pending);
    assert!(pending.try_take().unwrap().is_ok());
    std::fs::remove_file(path).ok();
}

#[test]
fn missing_file_fails_without_aborting() {
    let mut r = renderer();
    let pending = r.load_texture(std::path::Path::new("/no/such/image.png"));
    pump(&mut r, &pending);

    let err = pending.try_take().unwrap().unwrap_err();
    assert!(matches!(err, TextureLoadError::Io { .. }));

    // The renderer keeps working.
    begin(&mut r);
    r.draw_rect(0.0, 0.0, 1.0, 1.0);
    r.end_frame();
    assert_eq!(r.metrics().draw_calls, 1);
}

#[test]
fn undecodable_file_reports_decode_error() {
    let path = std::env::temp_dir().join(format!("brisk-{}-garbage.png", std::process::id()));
    std::fs::write(&path, b"definitely not an image").unwrap();

    let mut r = renderer();
    let pending = r.load_texture(&path);
    pump(&mut r, &pending);
    assert!(matches!(
        pending.try_take().unwrap(),
        Err(TextureLoadError::Decode { .. })
    ));
    std::fs::remove_file(path).ok();
}

#[test]
fn dropping_the_renderer_abandons_finished_loads() {
    let path = fixture("abandoned.png", 1, 1);
    let mut r = renderer();
    let pending = r.load_texture(&path);
    thread::sleep(Duration::from_millis(200));
    drop(r);

    assert!(matches!(
        pending.try_take(),
        Some(Err(TextureLoadError::Abandoned { .. }))
    ));
    std::fs::remove_file(path).ok();
}

#[test]
fn created_textures_are_uploaded_immediately() {
    let mut r = renderer();
    let texture = r.create_texture_rgba(4, 4, &[255; 64]);
    assert_eq!(r.backend().texture_desc(texture.id()).map(|d| (d.width, d.height)), Some((4, 4)));
}

#[test]
#[should_panic(expected = "larger than the maximum size")]
fn oversized_texture_is_fatal() {
    let mut r = renderer();
    r.create_texture_rgba(4097, 1, &vec![0u8; 4097 * 4]);
}

#[test]
fn texture_at_the_limit_is_accepted() {
    let mut r = common::renderer_with(brisk_engine::render::RendererConfig {
        max_texture_size: 16,
        ..Default::default()
    });
    let texture = r.create_texture_rgba(16, 1, &[0; 64]);
    assert_eq!(texture.width(), 16);
}

#[test]
fn texture_quad_covers_full_uv_range() {
    let mut r = renderer();
    let texture = r.create_texture_rgba(8, 4, &[255; 128]);
    begin(&mut r);
    r.draw_texture(texture, 10.0, 20.0);
    r.end_frame();

    let d = &draws(&r)[0];
    let corners: Vec<_> = d.vertices.iter().map(|v| (v.position, v.uv)).collect();
    assert_eq!(
        corners,
        [
            ([10.0, 20.0], [0.0, 0.0]),
            ([18.0, 20.0], [1.0, 0.0]),
            ([10.0, 24.0], [0.0, 1.0]),
            ([18.0, 20.0], [1.0, 0.0]),
            ([18.0, 24.0], [1.0, 1.0]),
            ([10.0, 24.0], [0.0, 1.0]),
        ]
    );
}

#[test]
fn texture_rect_maps_source_region_to_uvs() {
    let mut r = renderer();
    let texture = r.create_texture_rgba(8, 4, &[255; 128]);
    begin(&mut r);
    r.draw_texture_rect(texture, 0.0, 0.0, Rect::new(2.0, 1.0, 4.0, 2.0));
    r.draw_texture_rect(texture, 0.0, 0.0, Rect::new(20.0, 20.0, 4.0, 2.0));
    r.end_frame();

    let d = &draws(&r)[0];
    assert_eq!(d.vertex_count, 6, "a region outside the texture draws nothing");
    assert_eq!(d.vertices[0].uv, [0.25, 0.25]);
    assert_eq!(d.vertices[2].uv, [0.75, 0.75]);
    assert_eq!(d.vertices[2].position, [4.0, 2.0]);
}

#[test]
fn texture_rect_with_nan_source_draws_nothing() {
    let mut r = renderer();
    let texture = r.create_texture_rgba(8, 8, &[255; 256]);
    begin(&mut r);
    r.draw_texture_rect(texture, 0.0, 0.0, Rect::new(f32::NAN, 1.0, 4.0, 2.0));
    r.draw_texture_rect(texture, 0.0, 0.0, Rect::new(1.0, 1.0, f32::NAN, 2.0));
    assert_eq!(r.pending_vertices(), 0);
    r.end_frame();
    assert!(draws(&r).is_empty());
}

#[test]
fn destroying_the_bound_texture_rebinds_the_fallback() {
    let mut r = renderer();
    let texture = r.create_texture_rgba(1, 1, &[255; 4]);
    begin(&mut r);
    r.draw_texture(texture, 0.0, 0.0);
    r.destroy_texture(texture);

    assert_eq!(draws(&r).len(), 1, "pending vertices are drawn before the texture goes away");
    assert_eq!(r.backend().bound_texture(), Some(r.fallback_texture().id()));
    assert!(r.backend().texture_desc(texture.id()).is_none());
    r.end_frame();
}

#[test]
fn fallback_texture_cannot_be_destroyed() {
    let mut r = renderer();
    let fallback = r.fallback_texture();
    r.destroy_texture(fallback);
    assert!(r.backend().texture_desc(fallback.id()).is_some());
}
