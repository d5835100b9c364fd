//! Statement nodes: SELECT, axes, WITH definitions, DRILLTHROUGH.
//!
//! Statements and axes are typeless. A [`SelectNode`]'s with-list and
//! axis list are live - transform code appends, reorders, and swaps them
//! in place - while each node's structural identity stays fixed.

use crate::ast::expr::{Expr, IdentifierNode};
use crate::region::ParseRegion;
use crate::token::{unparse_comma_list, Token, TokenStream, Unparse};
use std::fmt;

// =============================================================================
// Axis
// =============================================================================

/// A named axis ordinal.
///
/// `Filter` is the WHERE-clause (slicer) axis; `Ordinal(n)` covers axes
/// past the five named ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Filter,
    Columns,
    Rows,
    Pages,
    Chapters,
    Sections,
    Ordinal(u16),
}

impl Axis {
    /// The axis ordinal; the filter axis is -1.
    pub fn ordinal(&self) -> i32 {
        match self {
            Axis::Filter => -1,
            Axis::Columns => 0,
            Axis::Rows => 1,
            Axis::Pages => 2,
            Axis::Chapters => 3,
            Axis::Sections => 4,
            Axis::Ordinal(n) => *n as i32,
        }
    }

    /// The axis by ordinal, preferring the named variants.
    pub fn from_ordinal(ordinal: i32) -> Option<Axis> {
        match ordinal {
            -1 => Some(Axis::Filter),
            0 => Some(Axis::Columns),
            1 => Some(Axis::Rows),
            2 => Some(Axis::Pages),
            3 => Some(Axis::Chapters),
            4 => Some(Axis::Sections),
            n if n >= 0 => Some(Axis::Ordinal(n as u16)),
            _ => None,
        }
    }

    pub fn is_filter(&self) -> bool {
        self.ordinal() == -1
    }

    /// The name used after `ON`.
    pub fn name(&self) -> String {
        match self {
            Axis::Filter => "FILTER".into(),
            Axis::Columns => "COLUMNS".into(),
            Axis::Rows => "ROWS".into(),
            Axis::Pages => "PAGES".into(),
            Axis::Chapters => "CHAPTERS".into(),
            Axis::Sections => "SECTIONS".into(),
            Axis::Ordinal(n) => format!("AXIS({})", n),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// =============================================================================
// AxisNode
// =============================================================================

/// One axis of a SELECT statement. Typeless.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisNode {
    region: Option<ParseRegion>,
    axis: Axis,
    non_empty: bool,
    expression: Option<Expr>,
    dimension_properties: Vec<IdentifierNode>,
}

impl AxisNode {
    pub fn new(axis: Axis, expression: Option<Expr>) -> Self {
        Self {
            region: None,
            axis,
            non_empty: false,
            expression,
            dimension_properties: vec![],
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn non_empty(mut self, non_empty: bool) -> Self {
        self.non_empty = non_empty;
        self
    }

    pub fn with_dimension_properties(mut self, properties: Vec<IdentifierNode>) -> Self {
        self.dimension_properties = properties;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn is_non_empty(&self) -> bool {
        self.non_empty
    }

    pub fn set_non_empty(&mut self, non_empty: bool) {
        self.non_empty = non_empty;
    }

    pub fn expression(&self) -> Option<&Expr> {
        self.expression.as_ref()
    }

    pub fn expression_mut(&mut self) -> Option<&mut Expr> {
        self.expression.as_mut()
    }

    /// Swap the axis expression. Setting the filter axis's expression to
    /// `None` removes the statement's WHERE clause.
    pub fn set_expression(&mut self, expression: Option<Expr>) {
        self.expression = expression;
    }

    pub fn dimension_properties(&self) -> &[IdentifierNode] {
        &self.dimension_properties
    }
}

impl Unparse for AxisNode {
    fn unparse(&self, ts: &mut TokenStream) {
        if self.non_empty {
            ts.push(Token::NonEmpty).space();
        }
        if let Some(expr) = &self.expression {
            expr.unparse(ts);
        }
        if !self.dimension_properties.is_empty() {
            ts.space().push(Token::DimensionProperties).space();
            unparse_comma_list(&self.dimension_properties, ts);
        }
        if !self.axis.is_filter() {
            ts.space()
                .push(Token::On)
                .space()
                .push(Token::Raw(self.axis.name()));
        }
    }
}

// =============================================================================
// WITH clause
// =============================================================================

/// A property assignment in a calculated member definition:
/// `FORMAT_STRING = "..."`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValueNode {
    region: Option<ParseRegion>,
    name: String,
    expression: Expr,
}

impl PropertyValueNode {
    pub fn new(name: impl Into<String>, expression: Expr) -> Self {
        Self {
            region: None,
            name: name.into(),
            expression,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn expression_mut(&mut self) -> &mut Expr {
        &mut self.expression
    }

    pub fn set_expression(&mut self, expression: Expr) {
        self.expression = expression;
    }
}

impl Unparse for PropertyValueNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Name(self.name.clone()))
            .space()
            .push(Token::Eq)
            .space();
        self.expression.unparse(ts);
    }
}

/// A `WITH MEMBER` definition: a named calculated member, its defining
/// expression, and its property assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct WithMemberNode {
    region: Option<ParseRegion>,
    name: IdentifierNode,
    expression: Expr,
    properties: Vec<PropertyValueNode>,
}

impl WithMemberNode {
    pub fn new(name: IdentifierNode, expression: Expr, properties: Vec<PropertyValueNode>) -> Self {
        Self {
            region: None,
            name,
            expression,
            properties,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn name(&self) -> &IdentifierNode {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn expression_mut(&mut self) -> &mut Expr {
        &mut self.expression
    }

    pub fn set_expression(&mut self, expression: Expr) {
        self.expression = expression;
    }

    pub fn properties(&self) -> &[PropertyValueNode] {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [PropertyValueNode] {
        &mut self.properties
    }
}

impl Unparse for WithMemberNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Member).space();
        self.name.unparse(ts);
        ts.space().push(Token::As).newline().indent(1);
        self.expression.unparse(ts);
        for property in &self.properties {
            ts.comma().space();
            property.unparse(ts);
        }
    }
}

/// A `WITH SET` definition: a named set and its defining expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WithSetNode {
    region: Option<ParseRegion>,
    name: IdentifierNode,
    expression: Expr,
}

impl WithSetNode {
    pub fn new(name: IdentifierNode, expression: Expr) -> Self {
        Self {
            region: None,
            name,
            expression,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn name(&self) -> &IdentifierNode {
        &self.name
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn expression_mut(&mut self) -> &mut Expr {
        &mut self.expression
    }

    pub fn set_expression(&mut self, expression: Expr) {
        self.expression = expression;
    }
}

impl Unparse for WithSetNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Set).space();
        self.name.unparse(ts);
        ts.space().push(Token::As).newline().indent(1);
        self.expression.unparse(ts);
    }
}

/// One entry of a SELECT statement's WITH list.
#[derive(Debug, Clone, PartialEq)]
pub enum WithClause {
    Member(WithMemberNode),
    Set(WithSetNode),
}

impl Unparse for WithClause {
    fn unparse(&self, ts: &mut TokenStream) {
        match self {
            WithClause::Member(m) => m.unparse(ts),
            WithClause::Set(s) => s.unparse(ts),
        }
    }
}

impl From<WithMemberNode> for WithClause {
    fn from(n: WithMemberNode) -> Self {
        WithClause::Member(n)
    }
}

impl From<WithSetNode> for WithClause {
    fn from(n: WithSetNode) -> Self {
        WithClause::Set(n)
    }
}

// =============================================================================
// FROM target
// =============================================================================

/// The FROM target of a SELECT: a cube name, a resolved cube, or a
/// nested subselect.
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    Ident(IdentifierNode),
    Cube(crate::ast::expr::CubeNode),
    Select(Box<SelectNode>),
}

impl Unparse for FromClause {
    fn unparse(&self, ts: &mut TokenStream) {
        match self {
            FromClause::Ident(i) => i.unparse(ts),
            FromClause::Cube(c) => c.unparse(ts),
            FromClause::Select(s) => {
                ts.lparen();
                s.unparse(ts);
                ts.rparen();
            }
        }
    }
}

// =============================================================================
// SelectNode
// =============================================================================

/// A SELECT statement. Typeless.
///
/// The filter (slicer) axis is always structurally present; a `None`
/// filter expression means the statement has no WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectNode {
    region: Option<ParseRegion>,
    with_list: Vec<WithClause>,
    axis_list: Vec<AxisNode>,
    from: Option<FromClause>,
    filter_axis: AxisNode,
    cell_properties: Vec<IdentifierNode>,
}

impl SelectNode {
    /// An empty SELECT: no axes, no FROM, an empty filter axis.
    pub fn new() -> Self {
        Self {
            region: None,
            with_list: vec![],
            axis_list: vec![],
            from: None,
            filter_axis: AxisNode::new(Axis::Filter, None),
            cell_properties: vec![],
        }
    }

    /// Assemble a SELECT from parsed parts.
    ///
    /// # Panics
    ///
    /// Panics if the supplied filter axis is not tagged [`Axis::Filter`].
    /// The tag is a contract, not a hint; a mis-tagged slicer is a bug in
    /// the caller and is never silently corrected.
    pub fn from_parts(
        region: Option<ParseRegion>,
        with_list: Vec<WithClause>,
        axis_list: Vec<AxisNode>,
        from: Option<FromClause>,
        filter_axis: AxisNode,
        cell_properties: Vec<IdentifierNode>,
    ) -> Self {
        check_filter_axis(&filter_axis);
        Self {
            region,
            with_list,
            axis_list,
            from,
            filter_axis,
            cell_properties,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    /// Append a WITH definition.
    pub fn with(mut self, clause: impl Into<WithClause>) -> Self {
        self.with_list.push(clause.into());
        self
    }

    /// Append an axis.
    pub fn axis(mut self, axis: AxisNode) -> Self {
        self.axis_list.push(axis);
        self
    }

    /// Set the FROM target.
    pub fn from_clause(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the FROM target to a cube identifier.
    pub fn from_ident(self, ident: IdentifierNode) -> Self {
        self.from_clause(FromClause::Ident(ident))
    }

    /// Replace the filter axis.
    ///
    /// # Panics
    ///
    /// Panics if `filter_axis` is not tagged [`Axis::Filter`].
    pub fn filter(mut self, filter_axis: AxisNode) -> Self {
        check_filter_axis(&filter_axis);
        self.filter_axis = filter_axis;
        self
    }

    /// Set the WHERE expression on the filter axis.
    pub fn where_expr(mut self, expression: Expr) -> Self {
        self.filter_axis.set_expression(Some(expression));
        self
    }

    /// Append a cell property.
    pub fn cell_property(mut self, property: IdentifierNode) -> Self {
        self.cell_properties.push(property);
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn with_list(&self) -> &[WithClause] {
        &self.with_list
    }

    /// The live WITH list; transform code edits it in place.
    pub fn with_list_mut(&mut self) -> &mut Vec<WithClause> {
        &mut self.with_list
    }

    pub fn axis_list(&self) -> &[AxisNode] {
        &self.axis_list
    }

    /// The live axis list; transform code edits it in place.
    pub fn axis_list_mut(&mut self) -> &mut Vec<AxisNode> {
        &mut self.axis_list
    }

    pub fn from(&self) -> Option<&FromClause> {
        self.from.as_ref()
    }

    pub fn from_mut(&mut self) -> Option<&mut FromClause> {
        self.from.as_mut()
    }

    pub fn set_from(&mut self, from: Option<FromClause>) {
        self.from = from;
    }

    pub fn filter_axis(&self) -> &AxisNode {
        &self.filter_axis
    }

    pub fn filter_axis_mut(&mut self) -> &mut AxisNode {
        &mut self.filter_axis
    }

    pub fn cell_properties(&self) -> &[IdentifierNode] {
        &self.cell_properties
    }
}

impl Default for SelectNode {
    fn default() -> Self {
        Self::new()
    }
}

fn check_filter_axis(filter_axis: &AxisNode) {
    if !filter_axis.axis().is_filter() {
        panic!(
            "Filter axis must have type FILTER, got {}",
            filter_axis.axis()
        );
    }
}

impl Unparse for SelectNode {
    fn unparse(&self, ts: &mut TokenStream) {
        if !self.with_list.is_empty() {
            ts.push(Token::With).newline();
            for clause in &self.with_list {
                clause.unparse(ts);
                ts.newline();
            }
        }
        ts.push(Token::Select);
        for (i, axis) in self.axis_list.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.newline();
            axis.unparse(ts);
        }
        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            from.unparse(ts);
        }
        if self.filter_axis.expression().is_some() {
            ts.newline().push(Token::Where).space();
            self.filter_axis.unparse(ts);
        }
        if !self.cell_properties.is_empty() {
            ts.newline().push(Token::CellProperties).space();
            unparse_comma_list(&self.cell_properties, ts);
        }
    }
}

impl fmt::Display for SelectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mdx())
    }
}

// =============================================================================
// DrillThroughNode
// =============================================================================

/// A DRILLTHROUGH statement wrapping a SELECT. Typeless.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillThroughNode {
    region: Option<ParseRegion>,
    select: SelectNode,
    max_rows: Option<u64>,
    first_row_set: Option<u64>,
    return_list: Vec<Expr>,
}

impl DrillThroughNode {
    pub fn new(select: SelectNode) -> Self {
        Self {
            region: None,
            select,
            max_rows: None,
            first_row_set: None,
            return_list: vec![],
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn first_row_set(mut self, first_row_set: u64) -> Self {
        self.first_row_set = Some(first_row_set);
        self
    }

    pub fn returning(mut self, return_list: Vec<Expr>) -> Self {
        self.return_list = return_list;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn select(&self) -> &SelectNode {
        &self.select
    }

    pub fn select_mut(&mut self) -> &mut SelectNode {
        &mut self.select
    }

    pub fn max_row_count(&self) -> Option<u64> {
        self.max_rows
    }

    pub fn first_row_ordinal(&self) -> Option<u64> {
        self.first_row_set
    }

    pub fn return_list(&self) -> &[Expr] {
        &self.return_list
    }

    pub(crate) fn return_list_mut(&mut self) -> &mut [Expr] {
        &mut self.return_list
    }
}

impl Unparse for DrillThroughNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::DrillThrough);
        if let Some(n) = self.max_rows {
            ts.space()
                .push(Token::MaxRows)
                .space()
                .push(Token::Raw(n.to_string()));
        }
        if let Some(n) = self.first_row_set {
            ts.space()
                .push(Token::FirstRowSet)
                .space()
                .push(Token::Raw(n.to_string()));
        }
        ts.space();
        self.select.unparse(ts);
        if !self.return_list.is_empty() {
            ts.space().push(Token::Return).space();
            unparse_comma_list(&self.return_list, ts);
        }
    }
}

impl fmt::Display for DrillThroughNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mdx())
    }
}
