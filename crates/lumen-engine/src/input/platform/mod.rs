//! Native key translation, one module per windowing backend.

pub(crate) mod winit;
