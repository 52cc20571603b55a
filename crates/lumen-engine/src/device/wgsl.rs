//! WGSL front end shared by every device.
//!
//! Sources are parsed and validated with naga before a backend sees them, so
//! diagnostics do not depend on which device compiled the stage.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::StageKind;

/// Which half of stage compilation rejected the source.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiagnosticKind {
    /// The source did not parse.
    Compile,
    /// The module parsed but cannot be used for the requested stage.
    Link,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageDiagnostic {
    pub kind: DiagnosticKind,
    pub text: String,
}

impl StageDiagnostic {
    fn compile(text: String) -> Self {
        Self { kind: DiagnosticKind::Compile, text }
    }

    fn link(text: String) -> Self {
        Self { kind: DiagnosticKind::Link, text }
    }
}

/// Parses and validates `source`, returning the entry point to use for `stage`.
///
/// An entry point named `main` wins when the module has several for the stage.
pub fn compile_stage(stage: StageKind, source: &str) -> Result<String, StageDiagnostic> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| StageDiagnostic::compile(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| StageDiagnostic::link(e.emit_to_string(source)))?;

    let wanted = naga_stage(stage);
    let mut candidates = module.entry_points.iter().filter(|ep| ep.stage == wanted);

    let first = candidates
        .next()
        .ok_or_else(|| StageDiagnostic::link(format!("no {stage} entry point found in module")))?;

    let chosen = std::iter::once(first)
        .chain(candidates)
        .find(|ep| ep.name == "main")
        .unwrap_or(first);

    Ok(chosen.name.clone())
}

fn naga_stage(stage: StageKind) -> naga::ShaderStage {
    match stage {
        StageKind::Vertex => naga::ShaderStage::Vertex,
        StageKind::Fragment => naga::ShaderStage::Fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
@vertex
fn main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

    const FS: &str = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn valid_stages_yield_entry_point() {
        assert_eq!(compile_stage(StageKind::Vertex, VS).unwrap(), "main");
        assert_eq!(compile_stage(StageKind::Fragment, FS).unwrap(), "main");
    }

    #[test]
    fn syntax_errors_are_compile_failures() {
        let err = compile_stage(StageKind::Vertex, "@vertex fn main( {").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::Compile);
        assert!(!err.text.is_empty());
    }

    #[test]
    fn wrong_stage_is_a_link_failure() {
        let err = compile_stage(StageKind::Vertex, FS).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::Link);
        assert!(err.text.contains("vertex"), "{}", err.text);
    }

    #[test]
    fn type_errors_are_link_failures() {
        let src = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    let x: f32 = 1.0;
    return x;
}
"#;
        let err = compile_stage(StageKind::Fragment, src).unwrap_err();
        assert!(!err.text.is_empty());
    }

    #[test]
    fn prefers_main_among_several_entry_points() {
        let src = r#"
@fragment
fn other() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0);
}

@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        assert_eq!(compile_stage(StageKind::Fragment, src).unwrap(), "main");
    }
}
