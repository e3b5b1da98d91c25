//! A triangle with a color per vertex, interpolated across its surface by the fragment stage.

use crate::demos::{begin_frame, mesh::Mesh, Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use shady::{context::GraphicsContext, shader::Program};
use shady_gl::GL33;

const VS: &str = include_str!("vertex-colors-vs.glsl");
const FS: &str = include_str!("vertex-colors-fs.glsl");

// position, then color
#[rustfmt::skip]
const TRI_VERTICES: [f32; 18] = [
   0.5, -0.5, 0.,  1., 0., 0.,
  -0.5, -0.5, 0.,  0., 1., 0.,
   0.,   0.5, 0.,  0., 0., 1.,
];

pub struct LocalDemo {
  program: Program<GL33>,
  triangle: Mesh,
}

impl Demo for LocalDemo {
  fn bootstrap(
    _: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let program = Program::from_strings(context, VS, FS)?;
    let triangle = Mesh::new(context, &TRI_VERTICES, &[3, 3], None);

    Ok(LocalDemo { program, triangle })
  }

  fn render_frame(
    &mut self,
    _: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<LoopFeedback, DemoError> {
    if begin_frame(actions, context).is_none() {
      return Ok(LoopFeedback::Exit);
    }

    let _active = self.program.activate(context)?;
    self.triangle.draw();

    Ok(LoopFeedback::Continue)
  }
}
