use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::device::{GraphicsDevice, PipelineId, StageKind};
use crate::error::BuildError;

use super::io::read_text_file;
use super::shader::StageProgram;

/// A bindable pipeline made of one stage program per stage kind.
///
/// Dropping it releases the pipeline object first, then its stage programs.
pub struct ProgramPipeline {
    device: Rc<dyn GraphicsDevice>,
    id: PipelineId,
    label: String,
    stages: BTreeMap<StageKind, StageProgram>,
}

impl ProgramPipeline {
    /// Reads, compiles and combines a vertex and a fragment stage.
    ///
    /// Both files are read before anything is compiled, so an I/O failure never
    /// reaches the compiler. Stage programs are labelled `VS_<label>` and
    /// `FS_<label>`. Any stage compiled before a failure is released; the
    /// caller only ever receives a complete pipeline.
    pub fn build(
        device: &Rc<dyn GraphicsDevice>,
        label: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, BuildError> {
        let vertex_source = read_text_file(vertex_path)?;
        let fragment_source = read_text_file(fragment_path)?;

        Self::from_sources(device, label, &vertex_source, &fragment_source)
    }

    /// Like [`build`](Self::build), with the sources already in memory.
    pub fn from_sources(
        device: &Rc<dyn GraphicsDevice>,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, BuildError> {
        let vertex = compile_labelled(device, StageKind::Vertex, vertex_source, label)?;
        let fragment = compile_labelled(device, StageKind::Fragment, fragment_source, label)?;

        Self::builder(device, label)
            .stage(vertex)
            .stage(fragment)
            .build()
    }

    /// Starts a pipeline from already compiled stage programs.
    pub fn builder(device: &Rc<dyn GraphicsDevice>, label: impl Into<String>) -> ProgramPipelineBuilder {
        ProgramPipelineBuilder {
            device: Rc::clone(device),
            label: label.into(),
            stages: Vec::new(),
        }
    }

    /// Makes this the active pipeline for subsequent draws.
    pub fn bind(&self) {
        self.device.bind_pipeline(self.id);
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stage(&self, kind: StageKind) -> Option<&StageProgram> {
        self.stages.get(&kind)
    }

    pub fn stages(&self) -> impl Iterator<Item = &StageProgram> {
        self.stages.values()
    }
}

fn compile_labelled(
    device: &Rc<dyn GraphicsDevice>,
    stage: StageKind,
    source: &str,
    label: &str,
) -> Result<StageProgram, BuildError> {
    let stage_label = format!("{}{label}", stage.label_prefix());
    Ok(StageProgram::compile(device, stage, source, stage_label)?)
}

impl Drop for ProgramPipeline {
    fn drop(&mut self) {
        // Stage programs are dropped with `stages` right after this.
        self.device.destroy_pipeline(self.id);
    }
}

impl fmt::Debug for ProgramPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramPipeline")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("stages", &self.stages)
            .finish()
    }
}

/// Collects stage programs and creates the pipeline object once they form a
/// complete set.
pub struct ProgramPipelineBuilder {
    device: Rc<dyn GraphicsDevice>,
    label: String,
    stages: Vec<StageProgram>,
}

impl ProgramPipelineBuilder {
    pub fn stage(mut self, program: StageProgram) -> Self {
        self.stages.push(program);
        self
    }

    /// Validates the stage set, then creates the pipeline and attaches every stage.
    ///
    /// On error no pipeline object is created and the collected programs are
    /// released.
    pub fn build(self) -> Result<ProgramPipeline, BuildError> {
        let Self {
            device,
            label,
            stages,
        } = self;

        let mut by_kind = BTreeMap::new();
        for program in stages {
            let kind = program.stage();
            if by_kind.insert(kind, program).is_some() {
                return Err(BuildError::DuplicateStage { label, stage: kind });
            }
        }

        for required in StageKind::ALL {
            if !by_kind.contains_key(&required) {
                return Err(BuildError::MissingStage {
                    label,
                    stage: required,
                });
            }
        }

        let id = device.create_pipeline(&label);
        for (kind, program) in &by_kind {
            device.attach_stage(id, *kind, program.id());
        }

        Ok(ProgramPipeline {
            device,
            id,
            label,
            stages: by_kind,
        })
    }
}
