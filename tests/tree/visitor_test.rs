//! Traversal protocol: self before children, declaration order, and
//! in-place rewriting through the mutable slots during a single pass.

use mdxtree::prelude::*;

fn ident_node(text: &str) -> IdentifierNode {
    IdentifierNode::new(text.parse().unwrap())
}

/// Counts nodes by kind; output is the count so far.
#[derive(Default)]
struct Counter {
    labels: Vec<String>,
}

impl Counter {
    fn tick(&mut self, label: impl Into<String>) -> usize {
        self.labels.push(label.into());
        self.labels.len()
    }
}

impl Visitor for Counter {
    type Output = usize;

    fn visit_select(&mut self, _: &mut SelectNode) -> usize {
        self.tick("select")
    }
    fn visit_axis(&mut self, node: &mut AxisNode) -> usize {
        let label = format!("axis {}", node.axis());
        self.tick(label)
    }
    fn visit_with_member(&mut self, _: &mut WithMemberNode) -> usize {
        self.tick("with member")
    }
    fn visit_with_set(&mut self, _: &mut WithSetNode) -> usize {
        self.tick("with set")
    }
    fn visit_property_value(&mut self, node: &mut PropertyValueNode) -> usize {
        let label = format!("property {}", node.name());
        self.tick(label)
    }
    fn visit_drill_through(&mut self, _: &mut DrillThroughNode) -> usize {
        self.tick("drillthrough")
    }
    fn visit_call(&mut self, node: &mut CallNode) -> usize {
        let label = format!("call {}", node.name());
        self.tick(label)
    }
    fn visit_literal(&mut self, _: &mut LiteralNode) -> usize {
        self.tick("literal")
    }
    fn visit_identifier(&mut self, node: &mut IdentifierNode) -> usize {
        let label = format!("id {}", node.ident());
        self.tick(label)
    }
    fn visit_parameter(&mut self, _: &mut ParameterNode) -> usize {
        self.tick("parameter")
    }
    fn visit_cube(&mut self, _: &mut CubeNode) -> usize {
        self.tick("cube")
    }
    fn visit_dimension(&mut self, _: &mut DimensionNode) -> usize {
        self.tick("dimension")
    }
    fn visit_hierarchy(&mut self, _: &mut HierarchyNode) -> usize {
        self.tick("hierarchy")
    }
    fn visit_level(&mut self, _: &mut LevelNode) -> usize {
        self.tick("level")
    }
    fn visit_member(&mut self, _: &mut MemberNode) -> usize {
        self.tick("member")
    }
}

#[test]
fn test_full_statement_traversal_order() {
    let mut select = SelectNode::new()
        .with(WithMemberNode::new(
            ident_node("[Measures].[Foo]"),
            ident("[Measures].[Bar]"),
            vec![PropertyValueNode::new(
                "FORMAT_STRING",
                LiteralNode::string("xxx").into(),
            )],
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .axis(AxisNode::new(
            Axis::Rows,
            Some(braces(vec![property(ident("[Store]"), "Children")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(ident("[Time].[1997].[Q4]"));

    let mut counter = Counter::default();
    let result = select.accept(&mut counter);
    // accept returns the visitor's result for the statement itself
    assert_eq!(result, 1);
    assert_eq!(
        counter.labels,
        vec![
            "select",
            "with member",
            "id [Measures].[Bar]",
            "property FORMAT_STRING",
            "literal",
            "axis COLUMNS",
            "call {}",
            "id [Gender]",
            "axis ROWS",
            "call {}",
            "call Children",
            "id [Store]",
            "id [sales]",
            "axis FILTER",
            "id [Time].[1997].[Q4]",
        ]
    );
}

#[test]
fn test_drill_through_traversal() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let mut drill = DrillThroughNode::new(select).returning(vec![ident("[Measures].[Unit Sales]")]);

    let mut counter = Counter::default();
    drill.accept(&mut counter);
    assert_eq!(
        counter.labels,
        vec![
            "drillthrough",
            "select",
            "axis COLUMNS",
            "call {}",
            "id [Gender]",
            "id [sales]",
            "axis FILTER",
            "id [Measures].[Unit Sales]",
        ]
    );
}

/// Swaps every WITH MEMBER definition's expression and every bound
/// parameter default during one traversal.
struct Rebinder;

impl Visitor for Rebinder {
    type Output = ();

    fn visit_select(&mut self, _: &mut SelectNode) {}
    fn visit_axis(&mut self, node: &mut AxisNode) {
        // Rewriting visitors use the declared-mutable slots.
        if node.axis() == Axis::Filter && node.expression().is_some() {
            node.set_expression(Some(ident("[Time].[1998]")));
        }
    }
    fn visit_with_member(&mut self, node: &mut WithMemberNode) {
        node.set_expression(LiteralNode::numeric(0).into());
    }
    fn visit_with_set(&mut self, _: &mut WithSetNode) {}
    fn visit_property_value(&mut self, _: &mut PropertyValueNode) {}
    fn visit_drill_through(&mut self, _: &mut DrillThroughNode) {}
    fn visit_call(&mut self, _: &mut CallNode) {}
    fn visit_literal(&mut self, _: &mut LiteralNode) {}
    fn visit_identifier(&mut self, _: &mut IdentifierNode) {}
    fn visit_parameter(&mut self, node: &mut ParameterNode) {
        node.set_default(Some(LiteralNode::numeric(2000).into()));
    }
    fn visit_cube(&mut self, _: &mut CubeNode) {}
    fn visit_dimension(&mut self, _: &mut DimensionNode) {}
    fn visit_hierarchy(&mut self, _: &mut HierarchyNode) {}
    fn visit_level(&mut self, _: &mut LevelNode) {}
    fn visit_member(&mut self, _: &mut MemberNode) {}
}

#[test]
fn test_rewrite_in_place_during_single_traversal() {
    let mut select = SelectNode::new()
        .with(WithMemberNode::new(
            ident_node("[Measures].[Foo]"),
            ident("[Measures].[Bar]"),
            vec![],
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ParameterNode::new(
                "Year",
                Type::Numeric,
                Some(LiteralNode::numeric(1997).into()),
            )
            .into()])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(ident("[Time].[1997]"));

    select.accept(&mut Rebinder);

    let mdx = select.to_mdx();
    assert!(mdx.contains("[Measures].[Foo] AS\n    0"), "mdx: {}", mdx);
    assert!(mdx.contains("Parameter(\"Year\", NUMERIC, 2000)"), "mdx: {}", mdx);
    assert!(mdx.ends_with("WHERE [Time].[1998]"), "mdx: {}", mdx);
    assert!(!mdx.contains("[Measures].[Bar]"));
}
