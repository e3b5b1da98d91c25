//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device (it can be a GPU or a software implementation, for instance).
//!
//! This crate doesn’t provide you with creating such contexts. Instead, you must do it yourself
//! or rely on crates doing it for you, such as `shady-glfw`.
//!
//! # On context and threads
//!
//!   - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. This enforces
//!     that it cannot be moved nor shared between threads.
//!   - You can only create a single context per thread.
//!   - The context is also what remembers which program is currently active. Activating a
//!     program requires a mutable borrow of the context, so that activation is always explicit.

use crate::backend::shader::Shader;
use crate::shader::{Program, ProgramError, Stage, StageError, StageType};

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext: Sized {
  /// Backend the context runs on.
  type Backend: ?Sized;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;

  /// Compile a new shader stage.
  fn new_stage<R>(&mut self, ty: StageType, src: R) -> Result<Stage<Self::Backend>, StageError>
  where
    Self::Backend: Shader,
    R: AsRef<str>,
  {
    Stage::new(self, ty, src)
  }

  /// Create a new, unlinked shader program.
  fn new_program(&mut self) -> Result<Program<Self::Backend>, ProgramError>
  where
    Self::Backend: Shader,
  {
    Program::new(self)
  }
}
