//! Same triangle as ever, but the stages are read from the shader directory at startup, so they
//! can be edited without rebuilding.

use crate::demos::{begin_frame, mesh::Mesh, Demo, DemoError, DemoServices, InputAction, LoopFeedback};
use shady::{
  context::GraphicsContext,
  shader::{Program, StageType},
};
use shady_gl::GL33;
use std::rc::Rc;

const VS_FILE: &str = "shader-files-vs.glsl";
const FS_FILE: &str = "shader-files-fs.glsl";

#[rustfmt::skip]
const TRI_VERTICES: [f32; 9] = [
  -0.5, -0.5, 0.,
   0.5, -0.5, 0.,
   0.,   0.5, 0.,
];

pub struct LocalDemo {
  program: Program<GL33>,
  triangle: Mesh,
}

impl Demo for LocalDemo {
  fn bootstrap(
    services: &DemoServices,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, DemoError> {
    let vs = services.load_stage(context, StageType::VertexShader, VS_FILE)?;
    let fs = services.load_stage(context, StageType::FragmentShader, FS_FILE)?;

    let mut program = context.new_program()?;
    program.add_stage(Rc::new(vs));
    program.add_stage(Rc::new(fs));
    program.link()?;

    let triangle = Mesh::new(context, &TRI_VERTICES, &[3], None);

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
