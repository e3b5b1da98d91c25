//! Shader stages and programs.
//!
//! A shader program is built in a few steps:
//!
//! 1. Compile each stage from its source with [`Stage::new`] or [`Stage::from_named_source`].
//! 2. Create a [`Program`] and attach the stages with [`Program::add_stage`]. Stages are passed as
//!    [`Rc`], so the same compiled stage can be shared by several programs.
//! 3. Link with [`Program::link`].
//! 4. Register the uniforms you want to drive from the outside with
//!    [`Program::register_uniform`].
//!
//! Then, every frame, activate the program with [`Program::activate`] and set uniforms on the
//! returned [`ActiveProgram`]. Because the active program borrows the graphics context, you
//! cannot activate another program (and thus write uniforms into the wrong pipeline) while you
//! hold it.
//!
//! [`Program::from_strings`] covers the common vertex + fragment case in a single call.

pub mod types;

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::backend::shader::{Shader, Uniformable};
use crate::context::GraphicsContext;

/// Maximum length, in bytes, of the diagnostic logs carried by errors.
pub const INFO_LOG_CAPACITY: usize = 512;

/// Name given to sources that don’t come with one.
pub const INLINE_SOURCE_NAME: &str = "inline";

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  CompilationFailed {
    /// Type of the stage that failed.
    ty: StageType,
    /// Name of the source that was compiled.
    name: String,
    /// Compilation log, bounded to [`INFO_LOG_CAPACITY`].
    log: String,
  },
  /// The backend couldn’t allocate a stage object.
  CreationFailed(StageType),
}

impl StageError {
  /// Create a compilation error.
  ///
  /// Backends don’t know the name of the source; it gets filled by [`Stage`].
  pub fn compilation_failed<L>(ty: StageType, log: L) -> Self
  where
    L: Into<String>,
  {
    StageError::CompilationFailed {
      ty,
      name: INLINE_SOURCE_NAME.to_owned(),
      log: log.into(),
    }
  }

  fn with_source_name(self, source_name: &str) -> Self {
    match self {
      StageError::CompilationFailed { ty, log, .. } => StageError::CompilationFailed {
        ty,
        name: source_name.to_owned(),
        log: bounded_log(log),
      },

      e => e,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageError::CompilationFailed {
        ref ty,
        ref name,
        ref log,
      } => write!(f, "{} compilation error in {}: {}", ty, name, log),

      StageError::CreationFailed(ty) => write!(f, "cannot create {}", ty),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// The backend couldn’t allocate a program object.
  CreationFailed(String),
  /// A shader stage failed to compile.
  StageError(StageError),
  /// Link was requested while no stage is attached.
  NoStage,
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// The program must be linked before being used.
  NotLinked,
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ProgramError::CreationFailed(ref e) => write!(f, "cannot create shader program: {}", e),
      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),
      ProgramError::NoStage => f.write_str("shader program has no stage to link"),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::NotLinked => f.write_str("shader program is not linked"),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::StageError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// Errors related to uniforms.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformError {
  /// Uniforms can only be registered on a linked program.
  NotLinked(String),
  /// The linked program has no active uniform with that name.
  NotFound(String),
  /// The uniform was never (successfully) registered on this program.
  NotRegistered(String),
  /// The value sent doesn’t have the type declared in the shader.
  TypeMismatch {
    /// Name of the uniform.
    name: String,
    /// Type declared in the shader, if it’s one that can be set.
    declared: Option<UniformType>,
    /// Type of the value that was sent.
    sent: UniformType,
  },
}

impl UniformError {
  /// Create a [`UniformError::NotFound`].
  pub fn not_found<N>(name: N) -> Self
  where
    N: Into<String>,
  {
    UniformError::NotFound(name.into())
  }

  /// Create a [`UniformError::NotRegistered`].
  pub fn not_registered<N>(name: N) -> Self
  where
    N: Into<String>,
  {
    UniformError::NotRegistered(name.into())
  }
}

impl fmt::Display for UniformError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      UniformError::NotLinked(ref n) => {
        write!(f, "cannot register uniform {}: program not linked", n)
      }

      UniformError::NotFound(ref n) => write!(f, "uniform not found: {}", n),

      UniformError::NotRegistered(ref n) => write!(f, "uniform not registered: {}", n),

      UniformError::TypeMismatch {
        ref name,
        declared: Some(declared),
        sent,
      } => write!(
        f,
        "type mismatch for uniform {}: declared {}, got {}",
        name, declared, sent
      ),

      UniformError::TypeMismatch {
        ref name,
        declared: None,
        sent,
      } => write!(
        f,
        "type mismatch for uniform {}: its type cannot be set, got {}",
        name, sent
      ),
    }
  }
}

impl error::Error for UniformError {}

/// Type of a uniform, as declared in a shader.
///
/// Only the types that can be set from the outside are listed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  /// Boolean.
  Bool,
  /// 32-bit signed integer.
  Int,
  /// 32-bit floating-point number.
  Float,
  /// 2D signed integral vector.
  IVec2,
  /// 3D signed integral vector.
  IVec3,
  /// 4D signed integral vector.
  IVec4,
  /// 2D floating-point vector.
  Vec2,
  /// 3D floating-point vector.
  Vec3,
  /// 4D floating-point vector.
  Vec4,
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      UniformType::Bool => f.write_str("bool"),
      UniformType::Int => f.write_str("int"),
      UniformType::Float => f.write_str("float"),
      UniformType::IVec2 => f.write_str("ivec2"),
      UniformType::IVec3 => f.write_str("ivec3"),
      UniformType::IVec4 => f.write_str("ivec4"),
      UniformType::Vec2 => f.write_str("vec2"),
      UniformType::Vec3 => f.write_str("vec3"),
      UniformType::Vec4 => f.write_str("vec4"),
    }
  }
}

/// A resolved uniform.
///
/// This is the location token handed out by the backend along with the type of the uniform in
/// the shader. It is only meaningful for the program that resolved it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Uniform {
  location: i32,
  ty: Option<UniformType>,
}

impl Uniform {
  /// Create a uniform from a backend location.
  ///
  /// # Unsafety
  ///
  /// `location` must be a valid location for the program this uniform is going to be used with.
  pub unsafe fn new(location: i32, ty: Option<UniformType>) -> Self {
    Uniform { location, ty }
  }

  /// Backend location.
  pub fn location(&self) -> i32 {
    self.location
  }

  /// Type declared in the shader; `None` if it cannot be set with any supported value type.
  pub fn ty(&self) -> Option<UniformType> {
    self.ty
  }
}

/// A compiled shader stage.
///
/// The backend object is released when the stage is dropped. Wrap it in an [`Rc`] to attach it
/// to several programs; it will then live as long as the last program using it.
pub struct Stage<S>
where
  S: ?Sized + Shader,
{
  repr: S::StageRepr,
  ty: StageType,
  name: String,
}

impl<S> Stage<S>
where
  S: ?Sized + Shader,
{
  /// Compile a stage from an anonymous source.
  pub fn new<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, StageError>
  where
    C: GraphicsContext<Backend = S>,
    R: AsRef<str>,
  {
    Self::from_named_source(ctx, ty, INLINE_SOURCE_NAME, src)
  }

  /// Compile a stage from a source identified by `name` (typically a file path).
  ///
  /// The name only appears in diagnostics.
  pub fn from_named_source<C, N, R>(
    ctx: &mut C,
    ty: StageType,
    name: N,
    src: R,
  ) -> Result<Self, StageError>
  where
    C: GraphicsContext<Backend = S>,
    N: Into<String>,
    R: AsRef<str>,
  {
    let name = name.into();
    let repr = unsafe { ctx.backend().new_stage(ty, src.as_ref()) }
      .map_err(|e| e.with_source_name(&name))?;

    log::debug!("compiled {} from {}", ty, name);

    Ok(Stage { repr, ty, name })
  }

  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }

  /// Name of the source the stage was compiled from.
  pub fn name(&self) -> &str {
    &self.name
  }
}

impl<S> Drop for Stage<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_stage(&mut self.repr) }
  }
}

impl<S> fmt::Debug for Stage<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Stage")
      .field("ty", &self.ty)
      .field("name", &self.name)
      .finish()
  }
}

/// A shader program.
///
/// A program starts unlinked. Attach stages, link, then activate it to draw with it.
pub struct Program<S>
where
  S: ?Sized + Shader,
{
  repr: S::ProgramRepr,
  // attached, waiting for the next link
  pending: Vec<Rc<Stage<S>>>,
  // what the current executable was linked from
  linked_stages: Vec<Rc<Stage<S>>>,
  uniforms: HashMap<String, Uniform>,
  linked: bool,
}

impl<S> Program<S>
where
  S: ?Sized + Shader,
{
  /// Create a new, empty program.
  pub fn new<C>(ctx: &mut C) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let repr = unsafe { ctx.backend().new_program()? };

    Ok(Program {
      repr,
      pending: Vec::new(),
      linked_stages: Vec::new(),
      uniforms: HashMap::new(),
      linked: false,
    })
  }

  /// Compile a vertex and a fragment stage and link them into a new program.
  pub fn from_strings<C, V, F>(ctx: &mut C, vertex: V, fragment: F) -> Result<Self, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
    V: AsRef<str>,
    F: AsRef<str>,
  {
    let vs = Stage::new(ctx, StageType::VertexShader, vertex)?;
    let fs = Stage::new(ctx, StageType::FragmentShader, fragment)?;

    let mut program = Program::new(ctx)?;
    program.add_stage(Rc::new(vs));
    program.add_stage(Rc::new(fs));
    program.link()?;

    Ok(program)
  }

  /// Attach a stage for the next link.
  ///
  /// Nothing prevents you from attaching two stages of the same type; the link will fail and
  /// report it.
  pub fn add_stage(&mut self, stage: Rc<Stage<S>>) {
    unsafe { S::attach_stage(&mut self.repr, &stage.repr) };
    self.pending.push(stage);
  }

  /// Link the stages attached since the last link.
  ///
  /// Whatever the outcome, the attached stages are consumed: the next link only sees stages
  /// attached after this call. On success, the registered uniforms are resolved again against the
  /// new executable and the ones that don’t exist anymore are dropped. On failure, the program
  /// goes back to the unlinked state and forgets its uniforms.
  pub fn link(&mut self) -> Result<(), ProgramError> {
    if self.pending.is_empty() {
      return Err(ProgramError::NoStage);
    }

    let result = unsafe { S::link_program(&mut self.repr) };

    let stages = mem::take(&mut self.pending);
    for stage in &stages {
      unsafe { S::detach_stage(&mut self.repr, &stage.repr) };
    }

    match result {
      Ok(()) => {
        log::debug!("linked program from {} stage(s)", stages.len());

        self.linked = true;
        self.linked_stages = stages;
        self.resolve_uniforms_again();
        Ok(())
      }

      Err(e) => {
        self.linked = false;
        self.linked_stages.clear();
        self.uniforms.clear();

        match e {
          ProgramError::LinkFailed(log) => Err(ProgramError::LinkFailed(bounded_log(log))),
          e => Err(e),
        }
      }
    }
  }

  fn resolve_uniforms_again(&mut self) {
    let repr = &mut self.repr;

    self
      .uniforms
      .retain(|name, uniform| match unsafe { S::ask_uniform(repr, name) } {
        Some(resolved) => {
          *uniform = resolved;
          true
        }

        None => {
          log::warn!("uniform {} is not active anymore after re-link; dropped", name);
          false
        }
      });
  }

  /// Whether the program has a linked executable.
  pub fn is_linked(&self) -> bool {
    self.linked
  }

  /// Stages the current executable was linked from.
  pub fn linked_stages(&self) -> &[Rc<Stage<S>>] {
    &self.linked_stages
  }

  /// Resolve a uniform and cache it under its name.
  ///
  /// Registering the same name twice is harmless: the entry is resolved again and overwritten.
  pub fn register_uniform<N>(&mut self, name: N) -> Result<Uniform, UniformError>
  where
    N: AsRef<str>,
  {
    let name = name.as_ref();

    if !self.linked {
      return Err(UniformError::NotLinked(name.to_owned()));
    }

    match unsafe { S::ask_uniform(&mut self.repr, name) } {
      Some(uniform) => {
        self.uniforms.insert(name.to_owned(), uniform);
        Ok(uniform)
      }

      None => {
        log::warn!("uniform {} not found", name);
        Err(UniformError::not_found(name))
      }
    }
  }

  /// Look up a registered uniform.
  pub fn uniform(&self, name: &str) -> Option<Uniform> {
    self.uniforms.get(name).copied()
  }

  /// Make this program the active one of the context.
  ///
  /// The returned value is the only way to set uniforms. It mutably borrows the context, so no
  /// other program can be activated while it is alive.
  pub fn activate<'a, C>(&'a mut self, ctx: &'a mut C) -> Result<ActiveProgram<'a, S>, ProgramError>
  where
    C: GraphicsContext<Backend = S>,
  {
    if !self.linked {
      return Err(ProgramError::NotLinked);
    }

    let backend = ctx.backend();
    unsafe { backend.use_program(&self.repr) };

    Ok(ActiveProgram {
      backend,
      program: self,
    })
  }
}

impl<S> Drop for Program<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_program(&mut self.repr) }
  }
}

impl<S> fmt::Debug for Program<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Program")
      .field("linked", &self.linked)
      .field("pending", &self.pending)
      .field("linked_stages", &self.linked_stages)
      .field("uniforms", &self.uniforms)
      .finish()
  }
}

/// A program currently in use.
///
/// Obtained with [`Program::activate`].
pub struct ActiveProgram<'a, S>
where
  S: ?Sized + Shader,
{
  backend: &'a mut S,
  program: &'a mut Program<S>,
}

impl<'a, S> ActiveProgram<'a, S>
where
  S: ?Sized + Shader,
{
  /// The underlying program.
  pub fn program(&self) -> &Program<S> {
    self.program
  }

  /// Whether the backend still reports this program as the current one.
  pub fn is_current(&self) -> bool {
    unsafe { self.backend.is_current_program(&self.program.repr) }
  }

  /// See [`Program::register_uniform`].
  pub fn register_uniform<N>(&mut self, name: N) -> Result<Uniform, UniformError>
  where
    N: AsRef<str>,
  {
    self.program.register_uniform(name)
  }

  /// Set a registered uniform.
  ///
  /// Nothing is sent to the backend if the uniform isn’t registered or if `value` doesn’t have
  /// the type declared in the shader.
  pub fn set<N, T>(&mut self, name: N, value: T) -> Result<(), UniformError>
  where
    N: AsRef<str>,
    S: Uniformable<T>,
  {
    let name = name.as_ref();
    let uniform = self
      .program
      .uniform(name)
      .ok_or_else(|| UniformError::not_registered(name))?;

    let sent = <S as Uniformable<T>>::ty();
    if uniform.ty() != Some(sent) {
      return Err(UniformError::TypeMismatch {
        name: name.to_owned(),
        declared: uniform.ty(),
        sent,
      });
    }

    unsafe { <S as Uniformable<T>>::update(&mut self.program.repr, &uniform, value) };
    Ok(())
  }
}

impl<'a, S> fmt::Debug for ActiveProgram<'a, S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("ActiveProgram")
      .field("program", &self.program)
      .finish()
  }
}

// Trim a backend log and cut it to INFO_LOG_CAPACITY bytes, on a char boundary.
fn bounded_log(log: String) -> String {
  let log = log.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());

  if log.len() <= INFO_LOG_CAPACITY {
    return log.to_owned();
  }

  let mut end = INFO_LOG_CAPACITY;
  while !log.is_char_boundary(end) {
    end -= 1;
  }

  log[..end].to_owned()
}
