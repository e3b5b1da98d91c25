//! Shader backend.

use crate::shader::{ProgramError, StageError, StageType, Uniform, UniformType};

/// Shader stages and programs.
///
/// Handles are owned by the safe wrappers in [`crate::shader`], which guarantee that every
/// `destroy_*` function is called exactly once per representation.
pub unsafe trait Shader {
  /// Backend representation of a compiled stage.
  type StageRepr;

  /// Backend representation of a program (pipeline object).
  type ProgramRepr;

  /// Create and compile a new stage.
  ///
  /// On failure, the backend must release any object it allocated before returning. The log
  /// carried by the error doesn’t need to be bounded; the caller takes care of it.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Release a stage.
  unsafe fn destroy_stage(stage: &mut Self::StageRepr);

  /// Allocate a new, empty program.
  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError>;

  /// Release a program.
  unsafe fn destroy_program(program: &mut Self::ProgramRepr);

  /// Attach a stage to a program, for the next link.
  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr);

  /// Detach a stage from a program. The last linked executable is not affected.
  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr);

  /// Link all the attached stages into an executable.
  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError>;

  /// Make a program the current one.
  unsafe fn use_program(&mut self, program: &Self::ProgramRepr);

  /// Whether the given program is the current one.
  unsafe fn is_current_program(&self, program: &Self::ProgramRepr) -> bool;

  /// Resolve an active uniform of a linked program.
  ///
  /// `None` means the program has no active uniform with that name.
  unsafe fn ask_uniform(program: &mut Self::ProgramRepr, name: &str) -> Option<Uniform>;
}

/// Types that can be sent to a uniform with a given backend.
pub unsafe trait Uniformable<T>: Shader {
  /// Type of the uniform this value can be sent to.
  fn ty() -> UniformType;

  /// Send a value to a uniform of the current program.
  unsafe fn update(program: &mut Self::ProgramRepr, uniform: &Uniform, value: T);
}
