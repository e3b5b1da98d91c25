//! Vector types that can be sent to uniforms.
//!
//! They are thin wrappers over arrays so that a `[f32; 3]` coming from a math crate converts with
//! a simple `.into()`.

use std::ops::{Deref, DerefMut};

macro_rules! vector {
  ($(#[$doc:meta])* $name:ident, $n:literal, $($field:ident),+) => {
    $(#[$doc])*
    #[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
    pub struct $name<T>(pub [T; $n]);

    impl<T> $name<T> {
      /// Create a new vector from its components.
      pub const fn new($($field: T),+) -> Self {
        $name([$($field),+])
      }
    }

    impl<T> From<[T; $n]> for $name<T> {
      fn from(a: [T; $n]) -> Self {
        $name(a)
      }
    }

    impl<T> From<$name<T>> for [T; $n] {
      fn from(v: $name<T>) -> Self {
        v.0
      }
    }

    impl<T> Deref for $name<T> {
      type Target = [T; $n];

      fn deref(&self) -> &Self::Target {
        &self.0
      }
    }

    impl<T> DerefMut for $name<T> {
      fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
      }
    }
  };
}

vector!(
  /// A 2D vector, mapped to `vec2` / `ivec2`.
  Vec2, 2, x, y
);

vector!(
  /// A 3D vector, mapped to `vec3` / `ivec3`.
  Vec3, 3, x, y, z
);

vector!(
  /// A 4D vector, mapped to `vec4` / `ivec4`.
  Vec4, 4, x, y, z, w
);
