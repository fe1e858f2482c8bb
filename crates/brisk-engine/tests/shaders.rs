mod common;

use brisk_engine::error::RenderError;
use brisk_engine::render::{Renderer, DEFAULT_SHADER};

use common::{begin, draws, renderer, tri};

const RED_FRAGMENT: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

const WRONG_LOCATION: &str = r#"
@vertex
fn vs_main(@location(7) p: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 0.0, 1.0);
}
"#;

#[test]
fn custom_fragment_stage_links_with_default_vertex() {
    let mut r = renderer();
    let shader = r.create_fragment_shader(RED_FRAGMENT).unwrap();
    assert!(r.backend().has_shader(shader.id()));

    begin(&mut r);
    r.set_shader(Some(shader));
    tri(&mut r, 0);
    r.end_frame();

    let d = &draws(&r)[0];
    assert_eq!(d.shader, Some(shader.id()));
    assert_eq!(d.globals.resolution(), [common::WIDTH as f32, common::HEIGHT as f32]);
}

#[test]
fn syntax_errors_are_reported() {
    let mut r = renderer();
    let err = r.create_fragment_shader("fn fs_main( {").unwrap_err();
    assert!(matches!(err, RenderError::ShaderCompile { stage: "fragment", .. }));
}

#[test]
fn missing_entry_point_is_reported() {
    let mut r = renderer();
    let err = r.create_vertex_shader(RED_FRAGMENT).unwrap_err();
    assert!(matches!(
        err,
        RenderError::MissingEntryPoint { entry: "vs_main", .. }
    ));
}

#[test]
fn vertex_inputs_must_match_the_layout() {
    let mut r = renderer();
    let err = r.create_vertex_shader(WRONG_LOCATION).unwrap_err();
    assert!(matches!(err, RenderError::UnknownVertexInput { location: 7 }));
}

#[test]
fn full_program_from_both_stages() {
    let mut r = renderer();
    assert!(r.create_shader(DEFAULT_SHADER, DEFAULT_SHADER).is_ok());
}

#[test]
fn destroying_the_active_shader_restores_the_default() {
    let mut r = renderer();
    let shader = r.create_fragment_shader(RED_FRAGMENT).unwrap();
    begin(&mut r);
    r.set_shader(Some(shader));
    tri(&mut r, 0);
    r.destroy_shader(shader);

    assert_eq!(draws(&r).len(), 1);
    assert_eq!(r.backend().bound_shader(), Some(r.default_shader().id()));
    assert!(!r.backend().has_shader(shader.id()));
    r.end_frame();
}

#[test]
fn default_shader_cannot_be_destroyed() {
    let mut r = renderer();
    let default = r.default_shader();
    r.destroy_shader(default);
    assert!(r.backend().has_shader(default.id()));
}
