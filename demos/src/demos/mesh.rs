//! Minimal geometry: a vertex array with one interleaved `f32` vertex buffer and an optional index
//! buffer.

use gl::types::*;
use shady::context::GraphicsContext;
use shady_gl::GL33;
use std::{mem, os::raw::c_void, ptr};

/// GPU-side geometry drawn as triangles.
#[derive(Debug)]
pub struct Mesh {
  vao: GLuint,
  vbo: GLuint,
  ebo: Option<GLuint>,
  vert_nb: GLsizei,
}

impl Mesh {
  /// Upload interleaved `vertices`.
  ///
  /// `attribs` lists the number of components of each attribute, in order; attribute `i` is bound
  /// to `layout (location = i)`. With `indices`, the mesh is drawn with `glDrawElements`.
  pub fn new(
    _: &mut impl GraphicsContext<Backend = GL33>,
    vertices: &[f32],
    attribs: &[GLint],
    indices: Option<&[u32]>,
  ) -> Self {
    let (stride, offsets) = interleaved_layout(attribs);
    let mut vao: GLuint = 0;
    let mut vbo: GLuint = 0;

    unsafe {
      gl::GenVertexArrays(1, &mut vao);
      gl::BindVertexArray(vao);

      gl::GenBuffers(1, &mut vbo);
      gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
      gl::BufferData(
        gl::ARRAY_BUFFER,
        mem::size_of_val(vertices) as GLsizeiptr,
        vertices.as_ptr() as *const c_void,
        gl::STATIC_DRAW,
      );

      // the element buffer binding is recorded in the vertex array
      let ebo = indices.map(|indices| {
        let mut ebo: GLuint = 0;
        gl::GenBuffers(1, &mut ebo);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        gl::BufferData(
          gl::ELEMENT_ARRAY_BUFFER,
          mem::size_of_val(indices) as GLsizeiptr,
          indices.as_ptr() as *const c_void,
          gl::STATIC_DRAW,
        );
        ebo
      });

      for (index, (&size, &off)) in attribs.iter().zip(&offsets).enumerate() {
        gl::VertexAttribPointer(
          index as GLuint,
          size,
          gl::FLOAT,
          gl::FALSE,
          stride,
          ptr::null::<c_void>().add(off),
        );
        gl::EnableVertexAttribArray(index as GLuint);
      }

      gl::BindVertexArray(0);

      let vert_nb = match indices {
        Some(indices) => indices.len(),
        None => vertex_count(vertices.len(), attribs),
      };

      Mesh {
        vao,
        vbo,
        ebo,
        vert_nb: vert_nb as GLsizei,
      }
    }
  }

  /// Draw with whatever program is currently active.
  pub fn draw(&self) {
    unsafe {
      gl::BindVertexArray(self.vao);

      if self.ebo.is_some() {
        gl::DrawElements(gl::TRIANGLES, self.vert_nb, gl::UNSIGNED_INT, ptr::null());
      } else {
        gl::DrawArrays(gl::TRIANGLES, 0, self.vert_nb);
      }
    }
  }
}

impl Drop for Mesh {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteVertexArrays(1, &self.vao);
      gl::DeleteBuffers(1, &self.vbo);

      if let Some(ebo) = self.ebo {
        gl::DeleteBuffers(1, &ebo);
      }
    }
  }
}

// Stride and byte offset of each attribute of an interleaved f32 vertex.
fn interleaved_layout(attribs: &[GLint]) -> (GLsizei, Vec<usize>) {
  let float_size = mem::size_of::<f32>();
  let mut offsets = Vec::with_capacity(attribs.len());
  let mut off = 0;

  for &size in attribs {
    offsets.push(off);
    off += size as usize * float_size;
  }

  (off as GLsizei, offsets)
}

fn vertex_count(floats: usize, attribs: &[GLint]) -> usize {
  let components: usize = attribs.iter().map(|&size| size as usize).sum();

  if components == 0 {
    0
  } else {
    floats / components
  }
}
