use mdxtree::prelude::*;

fn ident_node(text: &str) -> IdentifierNode {
    IdentifierNode::new(text.parse().unwrap())
}

/// The canonical calculated-member query: WITH on its own line, one
/// definition per line with the expression indented, one axis per line,
/// FROM, WHERE.
#[test]
fn test_with_member_select_layout() {
    let select = SelectNode::new()
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

    assert_eq!(
        select.to_mdx(),
        "WITH\n\
         MEMBER [Measures].[Foo] AS\n\
         \x20   [Measures].[Bar], FORMAT_STRING = \"xxx\"\n\
         SELECT\n\
         {[Gender]} ON COLUMNS,\n\
         {[Store].Children} ON ROWS\n\
         FROM [sales]\n\
         WHERE [Time].[1997].[Q4]"
    );
}

#[test]
fn test_with_set_layout() {
    let select = SelectNode::new()
        .with(WithSetNode::new(
            ident_node("[Top Stores]"),
            func(
                "TopCount",
                vec![
                    property(ident("[Store]"), "Members"),
                    LiteralNode::numeric(5).into(),
                    ident("[Measures].[Unit Sales]"),
                ],
            ),
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(ident("[Top Stores]")),
        ))
        .from_ident(ident_node("[sales]"));

    assert_eq!(
        select.to_mdx(),
        "WITH\n\
         SET [Top Stores] AS\n\
         \x20   TopCount([Store].Members, 5, [Measures].[Unit Sales])\n\
         SELECT\n\
         [Top Stores] ON COLUMNS\n\
         FROM [sales]"
    );
}

#[test]
fn test_no_with_list_renders_no_with_line() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    assert!(!select.to_mdx().contains("WITH"));
}

#[test]
fn test_empty_filter_renders_no_where_line() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    assert_eq!(select.to_mdx(), "SELECT\n{[Gender]} ON COLUMNS\nFROM [sales]");
}

#[test]
fn test_non_empty_and_cell_properties() {
    let select = SelectNode::new()
        .axis(
            AxisNode::new(
                Axis::Rows,
                Some(braces(vec![property(ident("[Store]"), "Children")])),
            )
            .non_empty(true),
        )
        .from_ident(ident_node("[sales]"))
        .cell_property(ident_node("VALUE"))
        .cell_property(ident_node("FORMATTED_VALUE"));

    assert_eq!(
        select.to_mdx(),
        "SELECT\n\
         NON EMPTY {[Store].Children} ON ROWS\n\
         FROM [sales]\n\
         CELL PROPERTIES VALUE, FORMATTED_VALUE"
    );
}

#[test]
fn test_higher_axis_ordinals() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Pages,
            Some(braces(vec![ident("[Time].[1997]")])),
        ))
        .axis(AxisNode::new(
            Axis::Ordinal(5),
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let mdx = select.to_mdx();
    assert!(mdx.contains("ON PAGES"));
    assert!(mdx.contains("ON AXIS(5)"));
}

#[test]
fn test_subquery_from_is_parenthesized() {
    let inner = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Time].[1997]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let outer = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_clause(FromClause::Select(Box::new(inner)));

    assert_eq!(
        outer.to_mdx(),
        "SELECT\n\
         {[Gender]} ON COLUMNS\n\
         FROM (SELECT\n\
         {[Time].[1997]} ON COLUMNS\n\
         FROM [sales])"
    );
}

#[test]
fn test_drill_through() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(ident("[Time].[1997].[Q4]"));
    let drill = DrillThroughNode::new(select)
        .max_rows(100)
        .returning(vec![ident("[Measures].[Unit Sales]"), ident("[Gender]")]);

    insta::assert_snapshot!(
        drill.to_mdx().replace('\n', " / "),
        @"DRILLTHROUGH MAXROWS 100 SELECT / {[Gender]} ON COLUMNS / FROM [sales] / WHERE [Time].[1997].[Q4] RETURN [Measures].[Unit Sales], [Gender]"
    );
}

#[test]
fn test_drill_through_bare() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let drill = DrillThroughNode::new(select);
    assert_eq!(
        drill.to_mdx(),
        "DRILLTHROUGH SELECT\n{[Gender]} ON COLUMNS\nFROM [sales]"
    );
}

#[test]
fn test_display_matches_to_mdx() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    assert_eq!(select.to_string(), select.to_mdx());
}

#[test]
fn test_string_literal_quote_doubling_in_statement() {
    let select = SelectNode::new()
        .with(WithMemberNode::new(
            ident_node("[Measures].[Label]"),
            LiteralNode::string("say \"cheese\"").into(),
            vec![],
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Measures].[Label]")])),
        ))
        .from_ident(ident_node("[sales]"));
    assert!(select.to_mdx().contains("\"say \"\"cheese\"\"\""));
}

#[test]
fn test_parameter_rendering_in_where() {
    let select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(
            ParameterNode::new(
                "CurrentPeriod",
                Type::String,
                Some(LiteralNode::string("Q4").into()),
            )
            .into(),
        );
    assert!(select
        .to_mdx()
        .ends_with("WHERE Parameter(\"CurrentPeriod\", STRING, \"Q4\")"));
}
