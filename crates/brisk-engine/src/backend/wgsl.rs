//! Front-end checks run on every shader module before a backend accepts it.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::RenderError;
use crate::render::Vertex;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

fn parse_and_validate(source: &str, stage: &'static str) -> Result<naga::Module, RenderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| RenderError::ShaderCompile {
        stage,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| RenderError::ShaderCompile {
            stage,
            message: e.emit_to_string(source),
        })?;

    Ok(module)
}

fn entry_point<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &'static str,
    label: &'static str,
) -> Result<&'m naga::EntryPoint, RenderError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .ok_or(RenderError::MissingEntryPoint { stage: label, entry: name })
}

/// Validates a vertex module: `vs_main` must exist and read only locations of [`Vertex`].
pub fn validate_vertex(source: &str) -> Result<(), RenderError> {
    let module = parse_and_validate(source, "vertex")?;
    let ep = entry_point(&module, naga::ShaderStage::Vertex, VERTEX_ENTRY, "vertex")?;

    let mut locations = Vec::new();
    for arg in &ep.function.arguments {
        match &arg.binding {
            Some(binding) => locations.extend(location_of(binding)),
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    locations.extend(members.iter().filter_map(|m| m.binding.as_ref().and_then(location_of)));
                }
            }
        }
    }

    match locations.into_iter().find(|&l| l > Vertex::MAX_LOCATION) {
        Some(location) => Err(RenderError::UnknownVertexInput { location }),
        None => Ok(()),
    }
}

/// Validates a fragment module: `fs_main` must exist.
pub fn validate_fragment(source: &str) -> Result<(), RenderError> {
    let module = parse_and_validate(source, "fragment")?;
    entry_point(&module, naga::ShaderStage::Fragment, FRAGMENT_ENTRY, "fragment")?;
    Ok(())
}

fn location_of(binding: &naga::Binding) -> Option<u32> {
    match binding {
        naga::Binding::Location { location, .. } => Some(*location),
        naga::Binding::BuiltIn(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DEFAULT_SHADER;

    #[test]
    fn default_shader_passes_both_stages() {
        validate_vertex(DEFAULT_SHADER).unwrap();
        validate_fragment(DEFAULT_SHADER).unwrap();
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = validate_fragment("fn fs_main( -> {").unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { stage: "fragment", .. }));
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let src = "@vertex fn main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
        let err = validate_vertex(src).unwrap_err();
        assert!(matches!(err, RenderError::MissingEntryPoint { entry: "vs_main", .. }));
    }

    #[test]
    fn foreign_vertex_location_is_reported() {
        let src = r#"
            @vertex
            fn vs_main(@location(0) p: vec2<f32>, @location(7) extra: f32) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p, extra, 1.0);
            }
        "#;
        let err = validate_vertex(src).unwrap_err();
        assert!(matches!(err, RenderError::UnknownVertexInput { location: 7 }));
    }
}
