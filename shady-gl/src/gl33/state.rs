//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// A value mirrored from the GL context.
///
/// An empty cache never matches, which forces the next call through.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  fn is_invalid(&self, value: &T) -> bool {
    self.0.as_ref().map_or(true, |cached| cached != value)
  }
}

/// The graphics state.
///
/// Mirrors the few pieces of the OpenGL context this crate drives, so that redundant calls are
/// skipped (activating the program that is already active, for instance).
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  viewport: Cached<[GLint; 4]>,
  clear_color: Cached<[GLfloat; 4]>,

  // shader program
  current_program: Cached<GLuint>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match inner.take() {
        Some(_) => Self::get_from_context(),
        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport());
      let clear_color = Cached::new(get_ctx_clear_color());
      let current_program = Cached::new(get_ctx_current_program()?);

      Ok(GLState {
        _a: PhantomData,
        viewport,
        clear_color,
        current_program,
      })
    }
  }

  /// Forget the current program, so that the next activation always reaches OpenGL.
  ///
  /// Call this if you changed the current program behind this state’s back.
  pub fn invalidate_shader_program(&mut self) {
    self.current_program.invalidate();
  }

  /// Forget the viewport.
  pub fn invalidate_viewport(&mut self) {
    self.viewport.invalidate();
  }

  /// Forget the clear color.
  pub fn invalidate_clear_color(&mut self) {
    self.clear_color.invalidate();
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  pub(crate) fn is_current_program(&self, handle: GLuint) -> bool {
    !self.current_program.is_invalid(&handle)
  }

  // A deleted program stays in use until something else replaces it, but its handle can be
  // reused by OpenGL, so we must not trust the cache anymore.
  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    if self.is_current_program(handle) {
      self.current_program.invalidate();
    }
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      let [x, y, w, h] = viewport;
      gl::Viewport(x, y, w, h);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&color) {
      let [r, g, b, a] = color;
      gl::ClearColor(r, g, b, a);
      self.clear_color.set(color);
    }
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted current program.
  UnknownShaderProgram(GLint),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownShaderProgram(p) => write!(f, "unknown shader program: {}", p),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> [GLint; 4] {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_clear_color() -> [GLfloat; 4] {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_current_program() -> Result<GLuint, StateQueryError> {
  let mut used: GLint = 0;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);

  if used < 0 {
    Err(StateQueryError::UnknownShaderProgram(used))
  } else {
    Ok(used as GLuint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_value_matches_only_what_was_set() {
    let mut cached = Cached::new(3u32);
    assert!(!cached.is_invalid(&3));
    assert!(cached.is_invalid(&4));

    cached.set(4);
    assert!(!cached.is_invalid(&4));
  }

  #[test]
  fn invalidated_cache_never_matches() {
    let mut cached = Cached::new(0u32);
    cached.invalidate();

    assert!(cached.is_invalid(&0));
  }
}
