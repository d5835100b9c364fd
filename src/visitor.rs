//! Visitor dispatch - traversal without touching the node hierarchy.
//!
//! [`Visitor`] carries one method per concrete node kind. The set is
//! closed on purpose: adding a node kind breaks every visitor at compile
//! time, the same guarantee exhaustive matching gives the unparse code.
//!
//! `accept` order is part of the contract, not an implementation detail:
//! the visitor's method for the node itself runs first and its result is
//! what `accept` returns; children are then visited in declaration
//! order, their results evaluated for side effect. Visitors receive
//! `&mut` nodes, so a rewriting visitor swaps sub-expressions in place
//! through the declared-mutable slots (an axis's expression, a WITH
//! definition's expression, a parameter's default) during a single
//! traversal.

use crate::ast::expr::{
    CallNode, CubeNode, DimensionNode, Expr, HierarchyNode, IdentifierNode, LevelNode, LiteralNode,
    MemberNode, ParameterNode,
};
use crate::ast::select::{
    AxisNode, DrillThroughNode, FromClause, PropertyValueNode, SelectNode, WithClause,
    WithMemberNode, WithSetNode,
};

/// A traversal over the parse tree. One method per concrete node kind.
pub trait Visitor {
    type Output;

    fn visit_select(&mut self, node: &mut SelectNode) -> Self::Output;
    fn visit_axis(&mut self, node: &mut AxisNode) -> Self::Output;
    fn visit_with_member(&mut self, node: &mut WithMemberNode) -> Self::Output;
    fn visit_with_set(&mut self, node: &mut WithSetNode) -> Self::Output;
    fn visit_property_value(&mut self, node: &mut PropertyValueNode) -> Self::Output;
    fn visit_drill_through(&mut self, node: &mut DrillThroughNode) -> Self::Output;
    fn visit_call(&mut self, node: &mut CallNode) -> Self::Output;
    fn visit_literal(&mut self, node: &mut LiteralNode) -> Self::Output;
    fn visit_identifier(&mut self, node: &mut IdentifierNode) -> Self::Output;
    fn visit_parameter(&mut self, node: &mut ParameterNode) -> Self::Output;
    fn visit_cube(&mut self, node: &mut CubeNode) -> Self::Output;
    fn visit_dimension(&mut self, node: &mut DimensionNode) -> Self::Output;
    fn visit_hierarchy(&mut self, node: &mut HierarchyNode) -> Self::Output;
    fn visit_level(&mut self, node: &mut LevelNode) -> Self::Output;
    fn visit_member(&mut self, node: &mut MemberNode) -> Self::Output;
}

impl Expr {
    /// Dispatch to the visitor method for this expression's kind, then
    /// visit children. Returns the visitor's result for this node.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Call(node) => {
                let out = visitor.visit_call(node);
                for arg in node.args_mut() {
                    arg.accept(visitor);
                }
                out
            }
            Expr::Literal(node) => visitor.visit_literal(node),
            Expr::Identifier(node) => visitor.visit_identifier(node),
            Expr::Cube(node) => visitor.visit_cube(node),
            Expr::Dimension(node) => visitor.visit_dimension(node),
            Expr::Hierarchy(node) => visitor.visit_hierarchy(node),
            Expr::Level(node) => visitor.visit_level(node),
            Expr::Member(node) => visitor.visit_member(node),
            Expr::Parameter(node) => {
                let out = visitor.visit_parameter(node);
                if let Some(default) = node.default_mut() {
                    default.accept(visitor);
                }
                out
            }
        }
    }
}

impl SelectNode {
    /// Visit this statement, then its WITH definitions, axes, FROM
    /// target, and filter axis, in that order.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_select(self);
        for clause in self.with_list_mut() {
            clause.accept(visitor);
        }
        for axis in self.axis_list_mut() {
            axis.accept(visitor);
        }
        match self.from_mut() {
            Some(FromClause::Ident(node)) => {
                visitor.visit_identifier(node);
            }
            Some(FromClause::Cube(node)) => {
                visitor.visit_cube(node);
            }
            Some(FromClause::Select(node)) => {
                node.accept(visitor);
            }
            None => {}
        }
        self.filter_axis_mut().accept(visitor);
        out
    }
}

impl AxisNode {
    /// Visit this axis, then its expression.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_axis(self);
        if let Some(expr) = self.expression_mut() {
            expr.accept(visitor);
        }
        out
    }
}

impl WithClause {
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        match self {
            WithClause::Member(node) => node.accept(visitor),
            WithClause::Set(node) => node.accept(visitor),
        }
    }
}

impl WithMemberNode {
    /// Visit this definition, then its expression, then its property
    /// values.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_with_member(self);
        self.expression_mut().accept(visitor);
        for property in self.properties_mut() {
            property.accept(visitor);
        }
        out
    }
}

impl WithSetNode {
    /// Visit this definition, then its expression.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_with_set(self);
        self.expression_mut().accept(visitor);
        out
    }
}

impl PropertyValueNode {
    /// Visit this property, then its expression.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_property_value(self);
        self.expression_mut().accept(visitor);
        out
    }
}

impl DrillThroughNode {
    /// Visit this statement, then its SELECT, then its RETURN columns.
    pub fn accept<V: Visitor>(&mut self, visitor: &mut V) -> V::Output {
        let out = visitor.visit_drill_through(self);
        self.select_mut().accept(visitor);
        for expr in self.return_list_mut() {
            expr.accept(visitor);
        }
        out
    }
}
