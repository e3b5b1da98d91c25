//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for shady. Pick a
//! backend type, hand it to a graphics context (`shady-glfw` does that for you) and the
//! `shady` stage and program types will run on top of it.

pub mod gl33;

pub use gl33::GL33;
