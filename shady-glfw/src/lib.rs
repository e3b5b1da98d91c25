//! [GLFW](https://crates.io/crates/glfw) backend for shady.

#![deny(missing_docs)]

use gl;
use glfw::{self, Context as _, Glfw, InitError, Window, WindowEvent, WindowMode};
use shady::context::GraphicsContext;
pub use shady_gl::gl33::StateQueryError;
use shady_gl::GL33;
use shady_windowing::{CursorMode, WindowDim, WindowOpt};
use std::{error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor detected.
  NoPrimaryMonitor,

  /// No available video mode.
  NoVideoMode,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can use it with to
/// poll events and the [`GL33Context`], which allows you to compile shaders and render.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped shady context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Open a window described by `win_opt` and create an OpenGL 3.3 context in it.
  pub fn new_gl33(title: impl AsRef<str>, win_opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    let title = title.as_ref();

    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    for hint in gl33_hints(&win_opt) {
      glfw.window_hint(hint);
    }

    let (mut window, events_rx) = open_window(&mut glfw, title, *win_opt.dim())?;

    window.make_current();
    window.set_all_polling(true);
    window.set_cursor_mode(glfw_cursor_mode(win_opt.cursor_mode()));
    glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;

    let (w, h) = window.get_framebuffer_size();
    log::info!("opened window “{}” ({}x{} framebuffer)", title, w, h);

    let context = GL33Context { window, gl };
    Ok(GlfwSurface { events_rx, context })
  }
}

// Core, forward-compatible OpenGL 3.3 context, plus the multisampling asked for in the options.
fn gl33_hints(win_opt: &WindowOpt) -> [glfw::WindowHint; 5] {
  [
    glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core),
    glfw::WindowHint::OpenGlForwardCompat(true),
    glfw::WindowHint::ContextVersionMajor(3),
    glfw::WindowHint::ContextVersionMinor(3),
    glfw::WindowHint::Samples(win_opt.num_samples()),
  ]
}

fn open_window(
  glfw: &mut Glfw,
  title: &str,
  dim: WindowDim,
) -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError> {
  match dim {
    WindowDim::Windowed { width, height } => glfw
      .create_window(width, height, title, WindowMode::Windowed)
      .ok_or(GlfwSurfaceError::WindowCreationFailed),

    WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
      let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
      let vmode = monitor
        .get_video_mode()
        .ok_or(GlfwSurfaceError::NoVideoMode)?;

      glfw
        .create_window(
          vmode.width,
          vmode.height,
          title,
          WindowMode::FullScreen(monitor),
        )
        .ok_or(GlfwSurfaceError::WindowCreationFailed)
    }),

    WindowDim::FullscreenRestricted { width, height } => {
      glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

        glfw
          .create_window(width, height, title, WindowMode::FullScreen(monitor))
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      })
    }
  }
}

fn glfw_cursor_mode(mode: CursorMode) -> glfw::CursorMode {
  match mode {
    CursorMode::Visible => glfw::CursorMode::Normal,
    CursorMode::Invisible => glfw::CursorMode::Hidden,
    CursorMode::Disabled => glfw::CursorMode::Disabled,
  }
}

/// shady OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the back buffer, in pixels.
  pub fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Make the viewport cover the whole back buffer.
  pub fn fit_viewport(&mut self) {
    let (w, h) = self.window.get_framebuffer_size();
    self.gl.set_viewport([0, 0, w, h]);
  }

  /// Swap the back and front buffers.
  pub fn swap_buffers(&mut self) {
    self.window.swap_buffers();
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}
