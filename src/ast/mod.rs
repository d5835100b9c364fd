//! The parse tree node hierarchy.
//!
//! - [`expr`] - expression nodes: calls, literals, identifiers, typed
//!   metadata leaves, parameters
//! - [`select`] - statements and clauses: SELECT, axes, WITH
//!   definitions, DRILLTHROUGH

pub mod expr;
pub mod select;

pub use expr::{
    braces, cast, func, infix, member_expr, method, parens, postfix, prefix, property, CallNode,
    CubeNode, DimensionNode, Expr, HierarchyNode, IdentifierNode, LevelNode, Literal, LiteralNode,
    MemberNode, ParameterNode,
};
pub use select::{
    Axis, AxisNode, DrillThroughNode, FromClause, PropertyValueNode, SelectNode, WithClause,
    WithMemberNode, WithSetNode,
};
