//! # Shader stages, programs and uniforms
//!
//! shady wraps the part of a graphics API that turns GLSL sources into something you can draw
//! with: compiling stages, linking them into programs, activating programs and feeding them
//! uniforms. It doesn’t open windows, upload geometry nor issue draw calls; those are left to the
//! windowing crates and to your render loop.
//!
//! The crate is backend-agnostic. A backend implements the traits in [`backend`] and a
//! [`GraphicsContext`] gives access to it; `shady-gl` provides an OpenGL 3.3 backend and
//! `shady-glfw` a context living in a GLFW window.
//!
//! # What you get over the raw API
//!
//! - Compilation and link failures are values ([`StageError`], [`ProgramError`]) carrying the
//!   stage type, the source name and a bounded backend log. Nothing is printed, nothing panics.
//! - Compiled stages are reference-counted, so a vertex stage shared by several programs is
//!   released once the last of them is gone.
//! - Uniforms are registered by name once the program is linked, then set through the
//!   [`ActiveProgram`] returned by [`Program::activate`]. Setting a uniform that was never
//!   registered, or with a value of the wrong type, is an error and never reaches the backend.
//!
//! ```ignore
//! let mut program = Program::from_strings(&mut ctx, VS, FS)?;
//! program.register_uniform("uni_color")?;
//!
//! // every frame
//! let mut active = program.activate(&mut ctx)?;
//! active.set("uni_color", Vec4::new(0.8, 0.4, 0.3, 1.))?;
//! ```
//!
//! [`GraphicsContext`]: crate::context::GraphicsContext
//! [`StageError`]: crate::shader::StageError
//! [`ProgramError`]: crate::shader::ProgramError
//! [`ActiveProgram`]: crate::shader::ActiveProgram
//! [`Program::activate`]: crate::shader::Program::activate

#![deny(missing_docs)]

pub mod backend;
pub mod context;
pub mod shader;

#[cfg(test)]
mod mock;
