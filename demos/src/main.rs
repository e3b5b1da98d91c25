mod demos;

use crate::demos::{Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use glfw::{Action, Key, WindowEvent};
use shady_glfw::GlfwSurface;
use shady_windowing::{WindowDim, WindowOpt};
use std::{path::PathBuf, process, time::Instant};
use structopt::StructOpt;

const DEFAULT_SHADERS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(short, long)]
  /// Directory where to pick shader files from. Defaults to the shaders shipped with the demos.
  shaders: Option<PathBuf>,

  #[structopt(short, long)]
  /// List available demos.
  list_demos: bool,

  #[structopt(long, default_value = "800")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "600")]
  /// Height of the window.
  height: u32,

  #[structopt(long)]
  /// Open the window in fullscreen mode, using the primary monitor resolution.
  fullscreen: bool,

  /// Demo to run.
  demo: Option<String>,
}

impl CLIOpts {
  fn shader_dir(&self) -> PathBuf {
    self
      .shaders
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_SHADERS))
  }

  fn window_dim(&self) -> WindowDim {
    if self.fullscreen {
      WindowDim::Fullscreen
    } else {
      WindowDim::Windowed {
        width: self.width,
        height: self.height,
      }
    }
  }
}

/// Macro to declaratively add demos.
macro_rules! demos {
  ($($name:literal, $module:ident),* $(,)?) => {
    const DEMO_NAMES: &[&str] = &[$($name),*];

    fn show_available_demos() {
      println!("available demos:");
      for name in DEMO_NAMES {
        println!("  - {}", name);
      }
    }

    // create a function that will run a demo based on its name
    fn pick_and_run_demo(cli_opts: &CLIOpts) -> Result<(), DemoError> {
      match cli_opts.demo.as_deref() {
        $(
          Some($name) => run_demo::<demos::$module::LocalDemo>(cli_opts, $name),
        )*

        Some(name) => {
          show_available_demos();
          Err(DemoError::UnknownDemo(name.to_owned()))
        }

        None => {
          log::error!("no demo selected");
          show_available_demos();
          Ok(())
        }
      }
    }
  }
}

// Run a demo.
fn run_demo<D>(cli_opts: &CLIOpts, name: &str) -> Result<(), DemoError>
where
  D: Demo,
{
  log::info!("running demo {}", name);

  let services = DemoServices::new(cli_opts.shader_dir());

  let surface = GlfwSurface::new_gl33(name, WindowOpt::default().set_dim(cli_opts.window_dim()))?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let mut demo = D::bootstrap(&services, &mut context)?;
  let start_t = Instant::now();

  // the first frame gets the actual framebuffer size, which can differ from the requested one
  let [fb_w, fb_h] = context.framebuffer_size();
  let mut pending = Some(InputAction::Resized {
    width: fb_w,
    height: fb_h,
  });

  loop {
    // handle events
    context.window.glfw.poll_events();
    let actions = pending
      .take()
      .into_iter()
      .chain(glfw::flush_messages(&events).flat_map(|(_, event)| adapt_events(event)));

    let elapsed = start_t.elapsed();
    let t = elapsed.as_secs_f32();

    match demo.render_frame(t, actions, &mut context)? {
      LoopFeedback::Continue => context.swap_buffers(),
      LoopFeedback::Exit => break,
    }

    if context.window.should_close() {
      break;
    }
  }

  Ok(())
}

fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, mods) if mods.is_empty() => {
      Some(InputAction::MainToggle)
    }

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    _ => None,
  }
}

demos! {
  "hello-quad", hello_quad,
  "shader-files", shader_files,
  "two-programs", two_programs,
  "vertex-colors", vertex_colors,
  "uniform-color", uniform_color,
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_demos {
    show_available_demos();
    return;
  }

  if let Err(e) = pick_and_run_demo(&cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glfw::Modifiers;
  use std::iter;

  fn parse(args: &[&str]) -> CLIOpts {
    CLIOpts::from_iter(iter::once("shady-demos").chain(args.iter().copied()))
  }

  #[test]
  fn defaults() {
    let opts = parse(&["hello-quad"]);

    assert_eq!(opts.demo.as_deref(), Some("hello-quad"));
    assert!(!opts.list_demos);
    assert_eq!(opts.shader_dir(), PathBuf::from(DEFAULT_SHADERS));
    assert_eq!(
      opts.window_dim(),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
  }

  #[test]
  fn window_options() {
    let opts = parse(&["--width", "1024", "--height", "768", "two-programs"]);
    assert_eq!(
      opts.window_dim(),
      WindowDim::Windowed {
        width: 1024,
        height: 768
      }
    );

    let opts = parse(&["--fullscreen", "--width", "1024", "two-programs"]);
    assert_eq!(opts.window_dim(), WindowDim::Fullscreen);
  }

  #[test]
  fn shader_directory_and_listing() {
    let opts = parse(&["-l", "-s", "/tmp/glsl"]);

    assert!(opts.list_demos);
    assert_eq!(opts.shader_dir(), PathBuf::from("/tmp/glsl"));
    assert_eq!(opts.demo, None);
  }

  #[test]
  fn demo_names() {
    assert_eq!(
      DEMO_NAMES,
      &[
        "hello-quad",
        "shader-files",
        "two-programs",
        "vertex-colors",
        "uniform-color"
      ]
    );
  }

  #[test]
  fn escape_and_close_quit() {
    assert_eq!(adapt_events(WindowEvent::Close), Some(InputAction::Quit));
    assert_eq!(
      adapt_events(WindowEvent::Key(
        Key::Escape,
        0,
        Action::Press,
        Modifiers::empty()
      )),
      Some(InputAction::Quit)
    );
  }

  #[test]
  fn resize_and_toggle() {
    assert_eq!(
      adapt_events(WindowEvent::FramebufferSize(640, 480)),
      Some(InputAction::Resized {
        width: 640,
        height: 480
      })
    );
    assert_eq!(
      adapt_events(WindowEvent::Key(
        Key::Space,
        0,
        Action::Release,
        Modifiers::Shift
      )),
      None
    );
    assert_eq!(adapt_events(WindowEvent::Focus(true)), None);
  }
}
