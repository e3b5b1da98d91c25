//! Recording backend for tests.
//!
//! `Mock` records every call it receives and runs a small structural check over GLSL sources:
//! the `#version 330` line, balanced braces, statements missing their `;`, declarations of
//! stage inputs, outputs and uniforms. Linking matches fragment inputs against vertex outputs and
//! collects the uniforms used by the stages.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::shader::{Shader, Uniformable};
use crate::context::GraphicsContext;
use crate::shader::types::{Vec2, Vec3, Vec4};
use crate::shader::{ProgramError, StageError, StageType, Uniform, UniformType};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Bool(bool),
  Int(i32),
  Float(f32),
  IVec2([i32; 2]),
  IVec3([i32; 3]),
  IVec4([i32; 4]),
  Vec2([f32; 2]),
  Vec3([f32; 3]),
  Vec4([f32; 4]),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  CompileStage { handle: u32, ty: StageType },
  DeleteStage(u32),
  CreateProgram(u32),
  DeleteProgram(u32),
  Attach { program: u32, stage: u32 },
  Detach { program: u32, stage: u32 },
  Link(u32),
  UseProgram(u32),
  AskUniform { program: u32, name: String },
  SetUniform { current: Option<u32>, location: i32, value: Value },
}

#[derive(Debug, Default)]
struct MockState {
  last_handle: u32,
  current_program: Option<u32>,
  calls: Vec<Call>,
}

impl MockState {
  fn next_handle(&mut self) -> u32 {
    self.last_handle += 1;
    self.last_handle
  }
}

#[derive(Debug, Default)]
pub struct Mock {
  state: Rc<RefCell<MockState>>,
}

impl Mock {
  pub fn calls(&self) -> Vec<Call> {
    self.state.borrow().calls.clone()
  }

  pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
    self.state.borrow().calls.iter().filter(|c| pred(c)).count()
  }

  pub fn current_program(&self) -> Option<u32> {
    self.state.borrow().current_program
  }

  fn record(&self, call: Call) {
    self.state.borrow_mut().calls.push(call);
  }
}

unsafe impl GraphicsContext for Mock {
  type Backend = Mock;

  fn backend(&mut self) -> &mut Self::Backend {
    self
  }
}

#[derive(Clone, Debug, Default)]
struct Decl {
  ty: String,
  name: String,
}

#[derive(Clone, Debug, Default)]
struct Interface {
  inputs: Vec<Decl>,
  outputs: Vec<Decl>,
  // only the uniforms actually used in the source
  uniforms: Vec<Decl>,
  has_main: bool,
}

#[derive(Debug)]
pub struct MockStage {
  handle: u32,
  ty: StageType,
  interface: Interface,
  state: Rc<RefCell<MockState>>,
}

impl MockStage {
  pub fn handle(&self) -> u32 {
    self.handle
  }
}

#[derive(Debug)]
pub struct MockProgram {
  handle: u32,
  attached: Vec<(u32, StageType, Interface)>,
  active_uniforms: Option<Vec<(String, Option<UniformType>)>>,
  state: Rc<RefCell<MockState>>,
}

impl MockProgram {
  pub fn handle(&self) -> u32 {
    self.handle
  }

  fn record_set(&self, location: i32, value: Value) {
    let mut state = self.state.borrow_mut();
    let current = state.current_program;
    state.calls.push(Call::SetUniform {
      current,
      location,
      value,
    });
  }
}

unsafe impl Shader for Mock {
  type StageRepr = MockStage;

  type ProgramRepr = MockProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let handle = self.state.borrow_mut().next_handle();
    self.record(Call::CompileStage { handle, ty });

    match parse(src) {
      Ok(interface) => Ok(MockStage {
        handle,
        ty,
        interface,
        state: self.state.clone(),
      }),

      Err(log) => {
        self.record(Call::DeleteStage(handle));
        Err(StageError::compilation_failed(ty, log))
      }
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    stage
      .state
      .borrow_mut()
      .calls
      .push(Call::DeleteStage(stage.handle));
  }

  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = self.state.borrow_mut().next_handle();
    self.record(Call::CreateProgram(handle));

    Ok(MockProgram {
      handle,
      attached: Vec::new(),
      active_uniforms: None,
      state: self.state.clone(),
    })
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program
      .state
      .borrow_mut()
      .calls
      .push(Call::DeleteProgram(program.handle));
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    program.state.borrow_mut().calls.push(Call::Attach {
      program: program.handle,
      stage: stage.handle,
    });
    program
      .attached
      .push((stage.handle, stage.ty, stage.interface.clone()));
  }

  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    program.state.borrow_mut().calls.push(Call::Detach {
      program: program.handle,
      stage: stage.handle,
    });

    if let Some(i) = program.attached.iter().position(|a| a.0 == stage.handle) {
      program.attached.remove(i);
    }
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError> {
    program
      .state
      .borrow_mut()
      .calls
      .push(Call::Link(program.handle));

    match link(&program.attached) {
      Ok(uniforms) => {
        program.active_uniforms = Some(uniforms);
        Ok(())
      }

      Err(log) => {
        program.active_uniforms = None;
        Err(ProgramError::LinkFailed(log))
      }
    }
  }

  unsafe fn use_program(&mut self, program: &Self::ProgramRepr) {
    let mut state = self.state.borrow_mut();
    state.current_program = Some(program.handle);
    state.calls.push(Call::UseProgram(program.handle));
  }

  unsafe fn is_current_program(&self, program: &Self::ProgramRepr) -> bool {
    self.state.borrow().current_program == Some(program.handle)
  }

  unsafe fn ask_uniform(program: &mut Self::ProgramRepr, name: &str) -> Option<Uniform> {
    program.state.borrow_mut().calls.push(Call::AskUniform {
      program: program.handle,
      name: name.to_owned(),
    });

    let uniforms = program.active_uniforms.as_ref()?;
    let location = uniforms.iter().position(|(n, _)| n == name)?;

    Some(Uniform::new(location as i32, uniforms[location].1))
  }
}

macro_rules! impl_Uniformable {
  ($t:ty, $uty:ident, |$v:ident| $value:expr) => {
    unsafe impl Uniformable<$t> for Mock {
      fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(program: &mut MockProgram, uniform: &Uniform, $v: $t) {
        program.record_set(uniform.location(), $value);
      }
    }
  };
}

impl_Uniformable!(bool, Bool, |v| Value::Bool(v));
impl_Uniformable!(i32, Int, |v| Value::Int(v));
impl_Uniformable!(f32, Float, |v| Value::Float(v));
impl_Uniformable!(Vec2<i32>, IVec2, |v| Value::IVec2(v.0));
impl_Uniformable!(Vec3<i32>, IVec3, |v| Value::IVec3(v.0));
impl_Uniformable!(Vec4<i32>, IVec4, |v| Value::IVec4(v.0));
impl_Uniformable!(Vec2<f32>, Vec2, |v| Value::Vec2(v.0));
impl_Uniformable!(Vec3<f32>, Vec3, |v| Value::Vec3(v.0));
impl_Uniformable!(Vec4<f32>, Vec4, |v| Value::Vec4(v.0));

fn glsl_type(ty: &str) -> Option<UniformType> {
  match ty {
    "bool" => Some(UniformType::Bool),
    "int" => Some(UniformType::Int),
    "float" => Some(UniformType::Float),
    "ivec2" => Some(UniformType::IVec2),
    "ivec3" => Some(UniformType::IVec3),
    "ivec4" => Some(UniformType::IVec4),
    "vec2" => Some(UniformType::Vec2),
    "vec3" => Some(UniformType::Vec3),
    "vec4" => Some(UniformType::Vec4),
    _ => None,
  }
}

fn parse(src: &str) -> Result<Interface, String> {
  let mut lines = src.lines().map(|line| line.split("//").next().unwrap_or(""));

  match lines.by_ref().find(|line| !line.trim().is_empty()) {
    Some(line) if line.trim().starts_with("#version 330") => (),
    Some(line) => {
      return Err(format!(
        "0:1(1): error: unsupported or missing version directive: {}",
        line.trim()
      ))
    }
    None => return Err("0:1(1): error: empty source".to_owned()),
  }

  let body: String = lines
    .filter(|line| !line.trim_start().starts_with('#'))
    .flat_map(|line| line.chars().chain(Some('\n')))
    .collect();

  let mut interface = Interface::default();
  let mut declared_uniforms = Vec::new();
  let mut depth = 0usize;
  let mut segment = String::new();

  for c in body.chars() {
    match c {
      ';' => {
        check_statement(&segment)?;

        if depth == 0 {
          if let Some((qualifier, decl)) = parse_declaration(&segment)? {
            match qualifier {
              "in" => interface.inputs.push(decl),
              "out" => interface.outputs.push(decl),
              _ => declared_uniforms.push(decl),
            }
          }
        }

        segment.clear();
      }

      '{' => {
        let header = segment.trim();

        if starts_with_qualifier(header) && header.contains('(') {
          return Err(format!("error: syntax error, expected ';' in '{}'", header));
        }

        if depth == 0 && header.split_whitespace().collect::<String>().starts_with("voidmain(") {
          interface.has_main = true;
        }

        depth += 1;
        segment.clear();
      }

      '}' => {
        if !segment.trim().is_empty() {
          return Err(format!(
            "error: syntax error, expected ';' before '}}' after '{}'",
            segment.trim()
          ));
        }

        depth = depth
          .checked_sub(1)
          .ok_or_else(|| "error: syntax error, unexpected '}'".to_owned())?;
        segment.clear();
      }

      c => segment.push(c),
    }
  }

  if depth != 0 {
    return Err("error: syntax error, unexpected end of file, expected '}'".to_owned());
  }

  if !segment.trim().is_empty() {
    return Err(format!(
      "error: syntax error, unexpected end of file after '{}'",
      segment.trim()
    ));
  }

  interface.uniforms = declared_uniforms
    .into_iter()
    .filter(|decl| occurrences(&body, &decl.name) > 1)
    .collect();

  Ok(interface)
}

// A statement with two assignments is most likely two statements glued by a missing ';'.
fn check_statement(stmt: &str) -> Result<(), String> {
  let chars: Vec<char> = stmt.chars().collect();
  let assignments = chars
    .iter()
    .enumerate()
    .filter(|&(i, &c)| {
      let prev = if i > 0 { Some(chars[i - 1]) } else { None };
      let next = chars.get(i + 1).copied();
      c == '=' && !matches!(prev, Some('=' | '<' | '>' | '!')) && next != Some('=')
    })
    .count();

  if assignments > 1 {
    Err(format!(
      "error: syntax error, expected ';' in '{}'",
      stmt.trim()
    ))
  } else {
    Ok(())
  }
}

fn starts_with_qualifier(stmt: &str) -> bool {
  matches!(
    stmt.split_whitespace().next(),
    Some("in" | "out" | "uniform" | "layout")
  ) || stmt.starts_with("layout(")
}

fn parse_declaration(stmt: &str) -> Result<Option<(&'static str, Decl)>, String> {
  let mut rest = stmt.trim();

  if let Some(layout) = rest.strip_prefix("layout") {
    let close = layout
      .find(')')
      .ok_or_else(|| format!("error: syntax error in layout qualifier '{}'", stmt.trim()))?;
    rest = layout[close + 1..].trim();
  }

  let tokens: Vec<&str> = rest.split_whitespace().collect();
  let qualifier = match tokens.first() {
    Some(&"in") => "in",
    Some(&"out") => "out",
    Some(&"uniform") => "uniform",
    _ => return Ok(None),
  };

  if tokens[1..]
    .iter()
    .any(|t| matches!(*t, "in" | "out" | "uniform" | "layout"))
  {
    return Err(format!("error: syntax error, expected ';' in '{}'", stmt.trim()));
  }

  match tokens.len() {
    0..=2 => Err(format!("error: incomplete declaration '{}'", stmt.trim())),
    n => Ok(Some((
      qualifier,
      Decl {
        ty: tokens[n - 2].to_owned(),
        name: tokens[n - 1].to_owned(),
      },
    ))),
  }
}

fn occurrences(body: &str, name: &str) -> usize {
  body
    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
    .filter(|word| *word == name)
    .count()
}

fn link(stages: &[(u32, StageType, Interface)]) -> Result<Vec<(String, Option<UniformType>)>, String> {
  let of_type = |ty: StageType| {
    stages
      .iter()
      .filter(move |s| s.1 == ty)
      .map(|s| &s.2)
      .collect::<Vec<_>>()
  };
  let vertex = of_type(StageType::VertexShader);
  let fragment = of_type(StageType::FragmentShader);

  for (ty, group) in [
    (StageType::VertexShader, &vertex),
    (StageType::FragmentShader, &fragment),
  ] {
    match group.iter().filter(|i| i.has_main).count() {
      0 => return Err(format!("error: {} has no main function", ty)),
      1 => (),
      _ => return Err(format!("error: main function defined multiple times in {}", ty)),
    }
  }

  for input in fragment.iter().flat_map(|i| &i.inputs) {
    let matched = vertex
      .iter()
      .flat_map(|i| &i.outputs)
      .any(|output| output.name == input.name && output.ty == input.ty);

    if !matched {
      return Err(format!(
        "error: fragment shader input `{}` has no matching vertex shader output",
        input.name
      ));
    }
  }

  let mut uniforms: Vec<&Decl> = Vec::new();
  for decl in stages.iter().flat_map(|s| &s.2.uniforms) {
    match uniforms.iter().find(|u| u.name == decl.name) {
      Some(u) if u.ty != decl.ty => {
        return Err(format!(
          "error: uniform `{}` declared as both {} and {}",
          decl.name, u.ty, decl.ty
        ))
      }
      Some(_) => (),
      None => uniforms.push(decl),
    }
  }

  Ok(
    uniforms
      .into_iter()
      .map(|u| (u.name.clone(), glsl_type(&u.ty)))
      .collect(),
  )
}
