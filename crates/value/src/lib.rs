//! Generic value model and uniform read adapters over heterogeneous
//! target object representations.
//!
//! The condition engine and the object path resolver are written against
//! [`TargetNode`], which provides member/index/sequence access uniformly
//! over native value trees, JSON token trees, markup trees and dynamic
//! objects.

pub mod dynamic;
pub mod markup;
pub mod node;
pub mod value;

pub use dynamic::{DynamicObject, PropertyView};
pub use markup::{Element, MarkupNode};
pub use node::TargetNode;
pub use value::{Scalar, Value, wrap_index};
