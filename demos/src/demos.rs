//! shady demos.
//!
//! Each demo is a module exposing a `LocalDemo` type implementing [`Demo`]. Demos only know about
//! the OpenGL 3.3 backend and the abstract [`InputAction`]s; the window and its events belong to
//! the runner in `main.rs`.
//!
//! # Error handling
//!
//! Unlike a tutorial, demos don’t print and bail out when a shader doesn’t compile: every failure
//! is a [`DemoError`] that goes all the way up to `main`, which logs it and exits.

use shady::{
  context::GraphicsContext,
  shader::{ProgramError, Stage, StageError, StageType, UniformError},
};
use shady_gl::GL33;
use shady_glfw::GlfwSurfaceError;
use std::{error, fmt, fs, io, path::PathBuf};

pub mod hello_quad;
mod mesh;
pub mod shader_files;
pub mod two_programs;
pub mod uniform_color;
pub mod vertex_colors;

/// Color the back buffer is cleared with before each frame.
pub const CLEAR_COLOR: [f32; 4] = [0.3, 0.6, 0.7, 1.];

/// Demo interface.
pub trait Demo: Sized {
  /// Bootstrap the demo.
  fn bootstrap(
    services: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError>;

  /// Render a frame of the demo.
  fn render_frame(
    &mut self,
    time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<LoopFeedback, DemoError>;
}

/// A type used to pass “inputs” to demos.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off.
  MainToggle,

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback {
  Continue,
  Exit,
}

/// Services the runner offers to demos.
#[derive(Debug)]
pub struct DemoServices {
  shaders: PathBuf,
}

impl DemoServices {
  pub fn new(shaders: impl Into<PathBuf>) -> Self {
    DemoServices {
      shaders: shaders.into(),
    }
  }

  /// Read the shader source `file` from the shader directory.
  pub fn fetch_source(&self, file: &str) -> Result<(PathBuf, String), DemoError> {
    let path = self.shaders.join(file);
    let src = fs::read_to_string(&path).map_err(|source| DemoError::Io {
      path: path.clone(),
      source,
    })?;

    Ok((path, src))
  }

  /// Read and compile the stage in `file`.
  pub fn load_stage(
    &self,
    context: &mut impl GraphicsContext<Backend = GL33>,
    ty: StageType,
    file: &str,
  ) -> Result<Stage<GL33>, DemoError> {
    let (path, src) = self.fetch_source(file)?;
    let stage = Stage::from_named_source(context, ty, path.display().to_string(), src)?;

    Ok(stage)
  }
}

/// Start a frame: react to the actions every demo shares and clear the back buffer.
///
/// The actions that are not handled here are returned, or `None` if the demo must quit.
pub fn begin_frame(
  actions: impl Iterator<Item = InputAction>,
  context: &mut impl GraphicsContext<Backend = GL33>,
) -> Option<Vec<InputAction>> {
  let mut rest = Vec::new();

  for action in actions {
    match action {
      InputAction::Quit => return None,

      InputAction::Resized { width, height } => {
        log::debug!("new framebuffer size: {}x{}", width, height);
        context
          .backend()
          .set_viewport([0, 0, width as i32, height as i32]);
      }

      action => rest.push(action),
    }
  }

  context.backend().clear(CLEAR_COLOR);
  Some(rest)
}

/// Errors a demo can fail with.
#[derive(Debug)]
pub enum DemoError {
  /// The window or its OpenGL context couldn’t be created.
  Surface(GlfwSurfaceError),
  /// A shader source couldn’t be read.
  Io { path: PathBuf, source: io::Error },
  /// A stage failed to compile.
  Stage(StageError),
  /// A program couldn’t be created, linked or activated.
  Program(ProgramError),
  /// A uniform couldn’t be registered or set.
  Uniform(UniformError),
  /// No demo has this name.
  UnknownDemo(String),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DemoError::Surface(ref e) => write!(f, "cannot create surface: {}", e),
      DemoError::Io { ref path, ref source } => {
        write!(f, "cannot read {}: {}", path.display(), source)
      }
      DemoError::Stage(ref e) => write!(f, "{}", e),
      DemoError::Program(ref e) => write!(f, "{}", e),
      DemoError::Uniform(ref e) => write!(f, "{}", e),
      DemoError::UnknownDemo(ref name) => write!(f, "no demo named {}", name),
    }
  }
}

impl error::Error for DemoError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      DemoError::Surface(e) => Some(e),
      DemoError::Io { source, .. } => Some(source),
      DemoError::Stage(e) => Some(e),
      DemoError::Program(e) => Some(e),
      DemoError::Uniform(e) => Some(e),
      DemoError::UnknownDemo(_) => None,
    }
  }
}

impl From<GlfwSurfaceError> for DemoError {
  fn from(e: GlfwSurfaceError) -> Self {
    DemoError::Surface(e)
  }
}

impl From<StageError> for DemoError {
  fn from(e: StageError) -> Self {
    DemoError::Stage(e)
  }
}

impl From<ProgramError> for DemoError {
  fn from(e: ProgramError) -> Self {
    DemoError::Program(e)
  }
}

impl From<UniformError> for DemoError {
  fn from(e: UniformError) -> Self {
    DemoError::Uniform(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;

  #[test]
  fn missing_shader_file_is_an_error() {
    let services = DemoServices::new("/nonexistent/shady/shaders");
    let err = services.fetch_source("nope.glsl").unwrap_err();

    match err {
      DemoError::Io { ref path, ref source } => {
        assert!(path.ends_with("nope.glsl"));
        assert_eq!(source.kind(), io::ErrorKind::NotFound);
      }
      ref e => panic!("unexpected error: {}", e),
    }

    assert!(err.source().is_some());
    assert!(err.to_string().contains("nope.glsl"));
  }

  #[test]
  fn bundled_shaders_are_found() {
    let services = DemoServices::new(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders"));
    let (_, src) = services.fetch_source("shader-files-vs.glsl").unwrap();

    assert!(src.starts_with("#version 330 core"));
  }

  #[test]
  fn unknown_demo_message() {
    let err = DemoError::UnknownDemo("teapot".to_owned());
    assert_eq!(err.to_string(), "no demo named teapot");
  }
}
