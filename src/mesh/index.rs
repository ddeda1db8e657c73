//! Typed indices for mesh elements.
//!
//! Vertices, half-edges and faces live in dense arenas inside
//! [`HalfEdgeMesh`](super::HalfEdgeMesh) and are addressed by these wrappers.
//! The wrappers keep the three index spaces apart at compile time, and the
//! underlying integer width is chosen through [`MeshIndex`].

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as the storage of a mesh index.
///
/// The all-ones value of each type is reserved as the "no element" sentinel.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The reserved sentinel value.
    const INVALID: Self;

    /// Number of elements an arena addressed by this type can hold.
    const MAX_ELEMENTS: usize;

    /// Convert from `usize`, or `None` if the value collides with the
    /// sentinel or does not fit.
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert from `usize`.
    ///
    /// # Panics
    /// Panics if `v >= MAX_ELEMENTS`. Mesh operations check
    /// [`HalfEdgeMesh::has_room_for`](super::HalfEdgeMesh::has_room_for)
    /// before growing, so this never wraps silently.
    #[inline]
    fn from_usize(v: usize) -> Self {
        match Self::try_from_usize(v) {
            Some(index) => index,
            None => panic!("index {} does not fit in {}", v, std::any::type_name::<Self>()),
        }
    }

    /// Convert to `usize`.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {
        $(
            impl MeshIndex for $ty {
                const INVALID: Self = <$ty>::MAX;

                const MAX_ELEMENTS: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                    <$ty>::MAX as usize
                } else {
                    usize::MAX
                };

                #[inline]
                fn try_from_usize(v: usize) -> Option<Self> {
                    <$ty>::try_from(v).ok().filter(|&index| index != Self::INVALID)
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Index of a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Index of a directed half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Index of a face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Wrap a raw arena position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "no element" sentinel.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Arena position of this element.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this index refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::INVALID
            }

            /// `Some(self)` unless this is the sentinel.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                self.is_valid().then_some(self)
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
