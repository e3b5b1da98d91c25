//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for shady. The backend type is [`GL33`].

mod shader;
mod state;

pub use self::shader::{Program, Stage};
pub use self::state::GLState;
pub use self::state::StateQueryError;
use gl::types::*;
use std::cell::RefCell;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a shady backend type. Besides the shader traits, it exposes the
/// little render-loop state the demos need (viewport and clear color).
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| {
      log::debug!("acquired OpenGL 3.3 graphics state");

      GL33 {
        state: Rc::new(RefCell::new(state)),
      }
    })
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// This method is **highly unsafe** as it exposes the internals of the backend. Playing with it should be done with
  /// extreme caution.
  pub unsafe fn state(&self) -> &Rc<RefCell<GLState>> {
    &self.state
  }

  /// Set the viewport to `[x, y, width, height]`.
  pub fn set_viewport(&mut self, viewport: [i32; 4]) {
    unsafe { self.state.borrow_mut().set_viewport(viewport) }
  }

  /// Clear the color buffer of the currently bound framebuffer with `color`.
  pub fn clear(&mut self, color: [f32; 4]) {
    unsafe {
      self.state.borrow_mut().set_clear_color(color);
      gl::Clear(gl::COLOR_BUFFER_BIT as GLbitfield);
    }
  }
}
