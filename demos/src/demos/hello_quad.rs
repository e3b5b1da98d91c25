//! An orange quad made of two indexed triangles, with both stages compiled from sources embedded
//! in the binary.

use crate::demos::{begin_frame, mesh::Mesh, Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use shady::{context::GraphicsContext, shader::Program};
use shady_gl::GL33;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;

void main() {
  gl_Position = vec4(aPos.xyz, 1.0);
}
";

const FS: &str = "#version 330 core
out vec4 FragColor;

void main() {
  FragColor = vec4(0.8, 0.4, 0.3, 1.0);
}
";

#[rustfmt::skip]
const QUAD_VERTICES: [f32; 12] = [
  -0.5, -0.5, 0.,
   0.5, -0.5, 0.,
   0.5,  0.5, 0.,
  -0.5,  0.5, 0.,
];

const QUAD_INDICES: [u32; 6] = [0, 2, 1, 0, 3, 2];

pub struct LocalDemo {
  program: Program<GL33>,
  quad: Mesh,
}

impl Demo for LocalDemo {
  fn bootstrap(
    _: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let program = Program::from_strings(context, VS, FS)?;
    let quad = Mesh::new(context, &QUAD_VERTICES, &[3], Some(&QUAD_INDICES));

    Ok(LocalDemo { program, quad })
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
    self.quad.draw();

    Ok(LoopFeedback::Continue)
  }
}
