//! A triangle whose color comes from a uniform, updated every frame so that its green channel
//! pulses with time.
//!
//! Press the <main action> to freeze and unfreeze the color.

use crate::demos::{begin_frame, mesh::Mesh, Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use shady::{
  context::GraphicsContext,
  shader::{types::Vec4, Program},
};
use shady_gl::GL33;

const VS: &str = include_str!("vertex-colors-vs.glsl");
const FS: &str = include_str!("uniform-color-fs.glsl");

const UNI_COLOR: &str = "uni_color";

// the vertex stage also reads a color attribute, which the fragment stage ignores
#[rustfmt::skip]
const TRI_VERTICES: [f32; 18] = [
   0.5, -0.5, 0.,  0., 0., 0.,
  -0.5, -0.5, 0.,  0., 0., 0.,
   0.,   0.5, 0.,  0., 0., 0.,
];

pub struct LocalDemo {
  program: Program<GL33>,
  triangle: Mesh,
  frozen_at: Option<f32>,
}

impl Demo for LocalDemo {
  fn bootstrap(
    _: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let mut program = Program::from_strings(context, VS, FS)?;
    program.register_uniform(UNI_COLOR)?;

    let triangle = Mesh::new(context, &TRI_VERTICES, &[3, 3], None);

    Ok(LocalDemo {
      program,
      triangle,
      frozen_at: None,
    })
  }

  fn render_frame(
    &mut self,
    t: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<LoopFeedback, DemoError> {
    let actions = match begin_frame(actions, context) {
      Some(actions) => actions,
      None => return Ok(LoopFeedback::Exit),
    };

    for action in actions {
      if action == InputAction::MainToggle {
        self.frozen_at = match self.frozen_at {
          Some(_) => None,
          None => Some(t),
        };
      }
    }

    let color = pulse(self.frozen_at.unwrap_or(t));

    let mut active = self.program.activate(context)?;
    active.set(UNI_COLOR, color)?;
    self.triangle.draw();

    Ok(LoopFeedback::Continue)
  }
}

fn pulse(t: f32) -> Vec4<f32> {
  let green = t.sin() * 0.5 + 0.5;
  Vec4::new(0., green, 0., 1.)
}
