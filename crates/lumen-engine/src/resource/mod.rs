//! GPU resource construction: stage programs, program pipelines, input layouts
//! and immutable buffers.
//!
//! Every type here is an owning handle that releases its device object on drop.

mod buffer;
mod io;
mod layout;
mod program;
mod shader;

pub use buffer::{Buffer, IndexElement};
pub use io::read_text_file;
pub use layout::{InputLayout, InputLayoutElement, VertexBinding};
pub use program::{ProgramPipeline, ProgramPipelineBuilder};
pub use shader::StageProgram;
