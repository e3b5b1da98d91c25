//! Two triangles side by side, each drawn with its own program. Both programs link the very same
//! compiled vertex stage; only their fragment stages differ.

use crate::demos::{begin_frame, mesh::Mesh, Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use shady::{
  context::GraphicsContext,
  shader::{Program, Stage, StageType},
};
use shady_gl::GL33;
use std::rc::Rc;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;

void main() {
  gl_Position = vec4(aPos, 1.0);
}
";

const ORANGE_FS: &str = "#version 330 core
out vec4 FragColor;

void main() {
  FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
";

const YELLOW_FS: &str = "#version 330 core
out vec4 FragColor;

void main() {
  FragColor = vec4(1.0, 1.0, 0.0, 1.0);
}
";

#[rustfmt::skip]
const LEFT_VERTICES: [f32; 9] = [
  -0.9, -0.5, 0.,
  -0.1, -0.5, 0.,
  -0.5,  0.5, 0.,
];

#[rustfmt::skip]
const RIGHT_VERTICES: [f32; 9] = [
  0.1, -0.5, 0.,
  0.9, -0.5, 0.,
  0.5,  0.5, 0.,
];

pub struct LocalDemo {
  orange: Program<GL33>,
  yellow: Program<GL33>,
  left: Mesh,
  right: Mesh,
}

fn link_with(
  context: &mut impl GraphicsContext<Backend = GL33>,
  vs: &Rc<Stage<GL33>>,
  fs: &str,
) -> Result<Program<GL33>, DemoError> {
  let fs = Stage::new(context, StageType::FragmentShader, fs)?;

  let mut program = Program::new(context)?;
  program.add_stage(vs.clone());
  program.add_stage(Rc::new(fs));
  program.link()?;

  Ok(program)
}

impl Demo for LocalDemo {
  fn bootstrap(
    _: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let vs = Rc::new(context.new_stage(StageType::VertexShader, VS)?);
    let orange = link_with(context, &vs, ORANGE_FS)?;
    let yellow = link_with(context, &vs, YELLOW_FS)?;

    // the programs keep the stage alive from now on
    drop(vs);

    let left = Mesh::new(context, &LEFT_VERTICES, &[3], None);
    let right = Mesh::new(context, &RIGHT_VERTICES, &[3], None);

    Ok(LocalDemo {
      orange,
      yellow,
      left,
      right,
    })
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

    {
      let _active = self.orange.activate(context)?;
      self.left.draw();
    }

    let _active = self.yellow.activate(context)?;
    self.right.draw();

    Ok(LoopFeedback::Continue)
  }
}
