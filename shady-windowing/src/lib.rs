//! # shady windowing
//!
//! Common windowing types for shady. `shady` compiles and links shaders but has no idea how an
//! OpenGL context comes to life; that is the job of the `shady-*` windowing crates (only
//! `shady-glfw` for now). They all accept the options defined here, so that application code
//! describing its window doesn’t depend on a particular windowing system.
//!
//! - [`WindowDim`]: the dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`WindowOpt`]: hints to customize the window integration, such as its dimension or whether
//!   the cursor should be hidden.

#![deny(missing_docs)]

/// Dimension metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },

  /// Fullscreen mode (adapt to your screen).
  Fullscreen,

  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

impl WindowDim {
  /// Requested size, if any.
  ///
  /// `Fullscreen` has none: the size is whatever the primary monitor uses.
  pub fn size(&self) -> Option<[u32; 2]> {
    match *self {
      WindowDim::Windowed { width, height } | WindowDim::FullscreenRestricted { width, height } => {
        Some([width, height])
      }
      WindowDim::Fullscreen => None,
    }
  }
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor exists yet has been disabled.
  Invisible,
  /// The cursor is disabled.
  Disabled,
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed { width: 800, height: 600 }`.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - `num_samples` set to `None`.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 800,
        height: 600,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> &WindowDim {
    &self.dim
  }

  /// Hide, unhide or disable the cursor. Default to `CursorMode::Visible`.
  #[inline]
  pub fn set_cursor_mode(self, mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode: mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_options() {
    let opt = WindowOpt::default();

    assert_eq!(opt.dim().size(), Some([800, 600]));
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
    assert_eq!(opt.num_samples(), None);
  }

  #[test]
  fn setters_only_touch_their_option() {
    let opt = WindowOpt::default()
      .set_dim(WindowDim::Fullscreen)
      .set_num_samples(4);

    assert_eq!(*opt.dim(), WindowDim::Fullscreen);
    assert_eq!(opt.num_samples(), Some(4));
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);

    let opt = opt.set_num_samples(None);
    assert_eq!(opt.num_samples(), None);
  }

  #[test]
  fn fullscreen_has_no_size() {
    assert_eq!(WindowDim::Fullscreen.size(), None);
    assert_eq!(
      WindowDim::FullscreenRestricted {
        width: 1024,
        height: 768
      }
      .size(),
      Some([1024, 768])
    );
  }
}
