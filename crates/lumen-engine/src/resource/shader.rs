use std::fmt;
use std::rc::Rc;

use crate::device::wgsl::DiagnosticKind;
use crate::device::{GraphicsDevice, ProgramId, StageKind};
use crate::error::CompileError;

/// A compiled, separable single-stage program.
///
/// The device object is released when the handle is dropped. A pipeline that
/// takes the program owns it from then on.
pub struct StageProgram {
    device: Rc<dyn GraphicsDevice>,
    id: ProgramId,
    stage: StageKind,
    label: String,
}

impl StageProgram {
    /// Compiles `source` for `stage`.
    ///
    /// Failures carry the translator diagnostic verbatim and leave no device
    /// object behind. Nothing is logged here.
    pub fn compile(
        device: &Rc<dyn GraphicsDevice>,
        stage: StageKind,
        source: &str,
        label: impl Into<String>,
    ) -> Result<Self, CompileError> {
        let label = label.into();

        match device.create_stage_program(stage, source, &label) {
            Ok(id) => Ok(Self {
                device: Rc::clone(device),
                id,
                stage,
                label,
            }),
            Err(diag) => Err(match diag.kind {
                DiagnosticKind::Compile => CompileError::Compile {
                    stage,
                    label,
                    diagnostic: diag.text,
                },
                DiagnosticKind::Link => CompileError::Link {
                    stage,
                    label,
                    diagnostic: diag.text,
                },
            }),
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for StageProgram {
    fn drop(&mut self) {
        self.device.destroy_stage_program(self.id);
    }
}

impl fmt::Debug for StageProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageProgram")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("label", &self.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DeviceCall, HeadlessDevice};

    const FRAGMENT: &str = "@fragment\nfn main() -> @location(0) vec4<f32> {\n    return vec4<f32>(1.0);\n}\n";

    #[test]
    fn compiled_program_is_released_on_drop() {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();

        let program = StageProgram::compile(&device, StageKind::Fragment, FRAGMENT, "FS_flat").unwrap();
        assert_eq!(headless.live_programs()[&program.id()].label, "FS_flat");

        let id = program.id();
        drop(program);
        assert!(headless.live_programs().is_empty());
        assert_eq!(headless.calls().last(), Some(&DeviceCall::DestroyStageProgram(id)));
    }

    #[test]
    fn parse_failure_is_a_compile_error_with_the_diagnostic() {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();

        let err = StageProgram::compile(&device, StageKind::Vertex, "fn main( {", "VS_broken").unwrap_err();

        assert!(matches!(err, CompileError::Compile { .. }));
        assert_eq!(err.label(), "VS_broken");
        assert!(!err.diagnostic().is_empty());
        assert!(headless.live_programs().is_empty());
    }

    #[test]
    fn missing_entry_point_is_a_link_error() {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();

        let err = StageProgram::compile(&device, StageKind::Vertex, FRAGMENT, "VS_wrong").unwrap_err();

        assert!(matches!(err, CompileError::Link { stage: StageKind::Vertex, .. }));
    }
}
