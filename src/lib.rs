//! # mdxtree
//!
//! In-memory parse trees for MDX, the multidimensional query language.
//!
//! Drivers and tools use this crate to construct query descriptions
//! programmatically, introspect and rewrite existing ones, validate them
//! against catalog metadata, and regenerate query text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              External parser (out of scope)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [ast]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Parse tree (SELECT, axes, calls, literals)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validate]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Resolved tree (typed metadata leaves, typed calls)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [visitor] transforms (in place)
//!                          │
//!                          ▼ [token] unparse
//! ┌─────────────────────────────────────────────────────────┐
//! │                       MDX text                           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use mdxtree::prelude::*;
//!
//! let select = SelectNode::new()
//!     .axis(AxisNode::new(
//!         Axis::Columns,
//!         Some(braces(vec![ident("[Gender]")])),
//!     ))
//!     .axis(AxisNode::new(
//!         Axis::Rows,
//!         Some(braces(vec![property(ident("[Store]"), "Children")])),
//!     ))
//!     .from_ident(IdentifierNode::new("[sales]".parse().unwrap()))
//!     .where_expr(ident("[Time].[1997].[Q4]"));
//!
//! assert_eq!(
//!     select.to_mdx(),
//!     "SELECT\n\
//!      {[Gender]} ON COLUMNS,\n\
//!      {[Store].Children} ON ROWS\n\
//!      FROM [sales]\n\
//!      WHERE [Time].[1997].[Q4]"
//! );
//! ```

pub mod ast;
pub mod ident;
pub mod metadata;
pub mod region;
pub mod syntax;
pub mod token;
pub mod types;
pub mod validate;
pub mod visitor;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::ast::expr::{
        braces, cast, func, ident, infix, member_expr, method, parens, postfix, prefix, property,
        CallNode, CubeNode, DimensionNode, Expr, HierarchyNode, IdentifierNode, LevelNode, Literal,
        LiteralNode, MemberNode, ParameterNode,
    };
    pub use crate::ast::select::{
        Axis, AxisNode, DrillThroughNode, FromClause, PropertyValueNode, SelectNode, WithClause,
        WithMemberNode, WithSetNode,
    };
    pub use crate::ident::{Identifier, KeySegment, NameSegment, Quoting, Segment};
    pub use crate::metadata::{Catalog, Cube, Dimension, Hierarchy, Level, Member, StaticCatalog};
    pub use crate::region::ParseRegion;
    pub use crate::syntax::Syntax;
    pub use crate::token::{Token, TokenStream, Unparse};
    pub use crate::types::{MemberType, Type};
    pub use crate::validate::{OperatorTable, ValidationError, Validator};
    pub use crate::visitor::Visitor;
}

// Also export the core types at the crate root for convenience
pub use ast::expr::{Expr, LiteralNode};
pub use ast::select::{Axis, AxisNode, SelectNode};
pub use ident::Identifier;
pub use region::ParseRegion;
pub use syntax::Syntax;
pub use token::{Token, TokenStream, Unparse};
pub use types::Type;
pub use validate::Validator;
pub use visitor::Visitor;
