use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::{self, types::*};
use shady::{
  backend::shader::{Shader, Uniformable},
  shader::{
    types::{Vec2, Vec3, Vec4},
    ProgramError, StageError, StageType, Uniform, UniformType,
  },
};
use std::{
  cell::RefCell,
  ffi::CString,
  ptr::{null, null_mut},
  rc::Rc,
};

/// A compiled OpenGL shader object.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
}

/// An OpenGL program object.
///
/// It keeps a handle on the graphics state so that its destruction can invalidate the cached
/// current program.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Program {
  fn info_log(&self) -> String {
    unsafe {
      let mut log_len: GLint = 0;
      gl::GetProgramiv(self.handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log = vec![0u8; log_len.max(0) as usize];
      gl::GetProgramInfoLog(
        self.handle,
        log_len,
        null_mut(),
        log.as_mut_ptr() as *mut GLchar,
      );

      info_log_to_string(log)
    }
  }
}

unsafe fn stage_info_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log = vec![0u8; log_len.max(0) as usize];
  gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

  info_log_to_string(log)
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::CreationFailed(ty));
    }

    let c_src = match CString::new(src.as_bytes()) {
      Ok(c_src) => c_src,
      Err(e) => {
        gl::DeleteShader(handle);
        return Err(StageError::compilation_failed(
          ty,
          format!("source contains a nul byte at {}", e.nul_position()),
        ));
      }
    };

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(Stage { handle })
    } else {
      let log = stage_info_log(handle);
      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, log))
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    gl::DeleteShader(stage.handle);
  }

  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::CreationFailed(
        "glCreateProgram returned no handle".to_owned(),
      ));
    }

    Ok(Program {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program.state.borrow_mut().forget_program(program.handle);
    gl::DeleteProgram(program.handle);
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    gl::AttachShader(program.handle, stage.handle);
  }

  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    gl::DetachShader(program.handle, stage.handle);
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError> {
    gl::LinkProgram(program.handle);

    let mut linked: GLint = gl::FALSE.into();
    gl::GetProgramiv(program.handle, gl::LINK_STATUS, &mut linked);

    if linked == gl::TRUE.into() {
      Ok(())
    } else {
      Err(ProgramError::LinkFailed(program.info_log()))
    }
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    self.state.borrow_mut().use_program(program.handle);
  }

  unsafe fn is_current_program(&self, program: &Self::ProgramRepr) -> bool {
    self.state.borrow().is_current_program(program.handle)
  }

  unsafe fn ask_uniform(program: &mut Self::ProgramRepr, name: &str) -> Option<Uniform> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar);

    // inactive or unknown
    if location < 0 {
      return None;
    }

    let ty = reflect_uniform_type(program.handle, &c_name).and_then(glsl_uniform_type);
    Some(Uniform::new(location, ty))
  }
}

// Ask OpenGL the type a uniform was declared with.
unsafe fn reflect_uniform_type(program: GLuint, c_name: &CString) -> Option<GLenum> {
  let mut index = gl::INVALID_INDEX;
  gl::GetUniformIndices(
    program,
    1,
    [c_name.as_ptr() as *const GLchar].as_ptr(),
    &mut index,
  );

  if index == gl::INVALID_INDEX {
    return None;
  }

  let mut size: GLint = 0;
  let mut glty: GLenum = 0;
  gl::GetActiveUniform(
    program,
    index,
    0,
    null_mut(),
    &mut size,
    &mut glty,
    null_mut(),
  );

  Some(glty)
}

fn glsl_uniform_type(glty: GLenum) -> Option<UniformType> {
  match glty {
    gl::BOOL => Some(UniformType::Bool),
    gl::INT => Some(UniformType::Int),
    gl::FLOAT => Some(UniformType::Float),
    gl::INT_VEC2 => Some(UniformType::IVec2),
    gl::INT_VEC3 => Some(UniformType::IVec3),
    gl::INT_VEC4 => Some(UniformType::IVec4),
    gl::FLOAT_VEC2 => Some(UniformType::Vec2),
    gl::FLOAT_VEC3 => Some(UniformType::Vec3),
    gl::FLOAT_VEC4 => Some(UniformType::Vec4),
    _ => None,
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

// OpenGL logs are nul-terminated and not guaranteed to be valid UTF-8.
fn info_log_to_string(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).into_owned()
}

macro_rules! impl_Uniformable {
  (vec $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(_: &mut Program, uniform: &Uniform, value: $t) {
        gl::$f(uniform.location(), 1, value.as_ptr());
      }
    }
  };

  ($t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(_: &mut Program, uniform: &Uniform, value: $t) {
        gl::$f(uniform.location(), value);
      }
    }
  };
}

impl_Uniformable!(i32, Int, Uniform1i);
impl_Uniformable!(vec Vec2<i32>, IVec2, Uniform2iv);
impl_Uniformable!(vec Vec3<i32>, IVec3, Uniform3iv);
impl_Uniformable!(vec Vec4<i32>, IVec4, Uniform4iv);

impl_Uniformable!(f32, Float, Uniform1f);
impl_Uniformable!(vec Vec2<f32>, Vec2, Uniform2fv);
impl_Uniformable!(vec Vec3<f32>, Vec3, Uniform3fv);
impl_Uniformable!(vec Vec4<f32>, Vec4, Uniform4fv);

unsafe impl Uniformable<bool> for GL33 {
  fn ty() -> UniformType {
    UniformType::Bool
  }

  unsafe fn update(_: &mut Program, uniform: &Uniform, value: bool) {
    gl::Uniform1i(uniform.location(), value as GLint);
  }
}
