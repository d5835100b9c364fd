//! Validator behavior against a small in-memory catalog: identifier
//! resolution and leaf replacement, type assignment, and the statement
//! consistency checks.

use std::sync::Arc;

use mdxtree::prelude::*;

struct Fixture {
    catalog: StaticCatalog,
}

/// A miniature sales cube: Gender and Store hierarchies, a Time
/// hierarchy with 1997/Q4, and two measures.
fn fixture() -> Fixture {
    let cube = Arc::new(Cube::new("sales"));
    let mut catalog = StaticCatalog::new();
    catalog.add_cube(Arc::clone(&cube));

    let gender_dim = Arc::new(Dimension::new("Gender"));
    let gender = Arc::new(Hierarchy::new(&gender_dim, "Gender"));
    let gender_level = Arc::new(Level::new(&gender, "Gender"));
    catalog.add_hierarchy(&cube, Arc::clone(&gender));
    for name in ["M", "F"] {
        catalog.add_member(&cube, Arc::new(Member::new(&gender_level, name)));
    }

    let store_dim = Arc::new(Dimension::new("Store"));
    let store = Arc::new(Hierarchy::new(&store_dim, "Store"));
    let country = Arc::new(Level::new(&store, "Store Country"));
    catalog.add_hierarchy(&cube, Arc::clone(&store));
    catalog.add_level(&cube, Arc::clone(&country));
    catalog.add_member(&cube, Arc::new(Member::new(&country, "USA")));

    let time_dim = Arc::new(Dimension::new("Time"));
    let time = Arc::new(Hierarchy::new(&time_dim, "Time"));
    let year = Arc::new(Level::new(&time, "Year"));
    let quarter = Arc::new(Level::new(&time, "Quarter"));
    let y1997 = Arc::new(Member::new(&year, "1997"));
    let q4 = Arc::new(Member::child_of(&y1997, &quarter, "Q4"));
    catalog.add_hierarchy(&cube, Arc::clone(&time));
    catalog.add_member(&cube, Arc::clone(&y1997));
    catalog.add_member(&cube, q4);

    let measures_dim = Arc::new(Dimension::new("Measures"));
    let measures = Arc::new(Hierarchy::new(&measures_dim, "Measures"));
    let measures_level = Arc::new(Level::new(&measures, "MeasuresLevel"));
    catalog.add_hierarchy(&cube, Arc::clone(&measures));
    for name in ["Unit Sales", "Store Sales"] {
        catalog.add_member(&cube, Arc::new(Member::new(&measures_level, name)));
    }

    Fixture { catalog }
}

fn ident_node(text: &str) -> IdentifierNode {
    IdentifierNode::new(text.parse().unwrap())
}

fn base_select() -> SelectNode {
    SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .axis(AxisNode::new(
            Axis::Rows,
            Some(property(ident("[Store]"), "Children")),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(ident("[Time].[1997].[Q4]"))
}

#[test]
fn test_valid_statement_passes() {
    let fx = fixture();
    let mut select = base_select();
    Validator::new(&fx.catalog).validate(&mut select).unwrap();
}

#[test]
fn test_identifiers_replaced_by_typed_leaves() {
    let fx = fixture();
    let mut select = base_select();
    Validator::new(&fx.catalog).validate(&mut select).unwrap();

    // The WHERE identifier is now a resolved member leaf...
    match select.filter_axis().expression() {
        Some(Expr::Member(node)) => {
            assert_eq!(node.member().unique_name(), "[Time].[1997].[Q4]");
        }
        other => panic!("expected resolved member, got {:?}", other),
    }
    // ...and the statement renders the same text as before.
    assert!(select.to_mdx().ends_with("WHERE [Time].[1997].[Q4]"));

    // Calls carry validator-assigned types.
    match select.axis_list()[0].expression() {
        Some(Expr::Call(call)) => match call.ty() {
            Some(Type::Set(_)) => {}
            other => panic!("expected set type on braces call, got {:?}", other),
        },
        other => panic!("expected braces call, got {:?}", other),
    }
}

#[test]
fn test_missing_from_is_an_error() {
    let fx = fixture();
    let mut select = SelectNode::new().axis(AxisNode::new(
        Axis::Columns,
        Some(braces(vec![ident("[Gender]")])),
    ));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    assert_eq!(err, ValidationError::MissingFrom);
}

#[test]
fn test_unknown_cube() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[warehouse]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::UnknownCube { name, .. } => assert_eq!(name, "[warehouse]"),
        other => panic!("expected UnknownCube, got {}", other),
    }
}

#[test]
fn test_unresolved_identifier_names_fragment() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[No Such Thing]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match &err {
        ValidationError::Unresolved { text, .. } => assert_eq!(text, "[No Such Thing]"),
        other => panic!("expected Unresolved, got {}", other),
    }
    assert!(err.to_string().contains("[No Such Thing]"));
}

#[test]
fn test_duplicate_axis_rejected() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Store]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateAxis { axis: Axis::Columns });
}

#[test]
fn test_axis_requires_set_convertible_expression() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(LiteralNode::numeric(5).into()),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::AxisNotASet { axis, found, .. } => {
            assert_eq!(axis, Axis::Columns);
            assert_eq!(found, "NUMERIC");
        }
        other => panic!("expected AxisNotASet, got {}", other),
    }
}

#[test]
fn test_bare_member_axis_converts_implicitly() {
    let fx = fixture();
    // A single member expression on an axis is accepted via the implicit
    // member-to-set conversion.
    let mut select = SelectNode::new()
        .axis(AxisNode::new(Axis::Columns, Some(ident("[Gender].[M]"))))
        .from_ident(ident_node("[sales]"));
    Validator::new(&fx.catalog).validate(&mut select).unwrap();
}

#[test]
fn test_axis_without_expression_rejected() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(Axis::Columns, None))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    assert_eq!(err, ValidationError::EmptyAxis { axis: Axis::Columns });
}

#[test]
fn test_hierarchy_on_two_axes_rejected() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .axis(AxisNode::new(
            Axis::Rows,
            Some(braces(vec![ident("[Gender].[M]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::HierarchyOnMultipleAxes {
            hierarchy,
            first,
            second,
        } => {
            assert_eq!(hierarchy, "[Gender]");
            assert_eq!(first, Axis::Columns);
            assert_eq!(second, Axis::Rows);
        }
        other => panic!("expected HierarchyOnMultipleAxes, got {}", other),
    }
}

#[test]
fn test_with_member_must_not_be_a_set() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .with(WithMemberNode::new(
            ident_node("[Measures].[Foo]"),
            braces(vec![ident("[Gender]")]),
            vec![],
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::SetValuedMember { name, found, .. } => {
            assert_eq!(name, "[Measures].[Foo]");
            assert!(found.starts_with("SET<"));
        }
        other => panic!("expected SetValuedMember, got {}", other),
    }
}

#[test]
fn test_with_set_must_be_a_set() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .with(WithSetNode::new(
            ident_node("[Top]"),
            ident("[Measures].[Unit Sales]"),
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::NonSetValuedSet { name, .. } => assert_eq!(name, "[Top]"),
        other => panic!("expected NonSetValuedSet, got {}", other),
    }
}

#[test]
fn test_with_member_reference_resolves_through_scope() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .with(WithMemberNode::new(
            ident_node("[Measures].[Profit]"),
            infix(
                "-",
                ident("[Measures].[Store Sales]"),
                ident("[Measures].[Unit Sales]"),
            ),
            vec![],
        ))
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Measures].[Profit]")])),
        ))
        .from_ident(ident_node("[sales]"));
    Validator::new(&fx.catalog).validate(&mut select).unwrap();

    // The reference stayed an identifier: calculated members have no
    // catalog object to resolve to. With-clause names shadow the catalog.
    match select.axis_list()[0].expression() {
        Some(Expr::Call(call)) => match &call.args()[0] {
            Expr::Identifier(node) => {
                assert_eq!(node.ident().to_string(), "[Measures].[Profit]");
            }
            other => panic!("expected identifier reference, got {:?}", other),
        },
        other => panic!("expected braces call, got {:?}", other),
    }
}

#[test]
fn test_named_set_reference_is_set_typed() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .with(WithSetNode::new(
            ident_node("[My Stores]"),
            property(ident("[Store]"), "Children"),
        ))
        .axis(AxisNode::new(Axis::Columns, Some(ident("[My Stores]"))))
        .from_ident(ident_node("[sales]"));
    Validator::new(&fx.catalog).validate(&mut select).unwrap();
}

#[test]
fn test_unknown_operator_reports_rendered_text() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(func("NoSuchFunction", vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match &err {
        ValidationError::UnknownOperator { name, text, .. } => {
            assert_eq!(name, "NoSuchFunction");
            assert_eq!(text, "NoSuchFunction([Gender])");
        }
        other => panic!("expected UnknownOperator, got {}", other),
    }
}

#[test]
fn test_cast_designator_is_not_resolved() {
    let fx = fixture();
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(cast(ident("[Measures].[Unit Sales]"), ident("NUMERIC")));
    Validator::new(&fx.catalog).validate(&mut select).unwrap();

    let mut bad = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(cast(ident("[Measures].[Unit Sales]"), ident("NOPE")));
    let err = Validator::new(&fx.catalog).validate(&mut bad).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidCast { .. }));
}

#[test]
fn test_subselect_from_is_validated() {
    let fx = fixture();
    let inner = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Time].[1997]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_clause(FromClause::Select(Box::new(inner)));
    Validator::new(&fx.catalog).validate(&mut select).unwrap();

    // A broken subselect fails the outer statement.
    let bad_inner = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Time].[1997]")])),
        ))
        .from_ident(ident_node("[warehouse]"));
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_clause(FromClause::Select(Box::new(bad_inner)));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownCube { .. }));
}

#[test]
fn test_fail_fast_stops_at_first_violation() {
    let fx = fixture();
    // Both axes are invalid; only the first is reported.
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Nope A]")])),
        ))
        .axis(AxisNode::new(
            Axis::Rows,
            Some(braces(vec![ident("[Nope B]")])),
        ))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    match err {
        ValidationError::Unresolved { text, .. } => assert_eq!(text, "[Nope A]"),
        other => panic!("expected Unresolved, got {}", other),
    }
}

#[test]
fn test_error_annotation_uses_region() {
    let fx = fixture();
    // Simulate a parsed tree: the axis expression carries a region.
    let source = "{[No Such Thing]}";
    let expr = IdentifierNode::new("[No Such Thing]".parse().unwrap())
        .with_region(Some(ParseRegion::new(1, 2, 1, 16)));
    let mut select = SelectNode::new()
        .axis(AxisNode::new(Axis::Columns, Some(braces(vec![expr.into()]))))
        .from_ident(ident_node("[sales]"));
    let err = Validator::new(&fx.catalog).validate(&mut select).unwrap_err();
    assert_eq!(err.region(), Some(ParseRegion::new(1, 2, 1, 16)));
    let annotated = err.annotate(source);
    assert!(annotated.contains("cannot resolve identifier"));
    assert!(annotated.contains("{^[No Such Thing]^}"));
}

#[test]
fn test_custom_operator_table() {
    let fx = fixture();
    let mut table = OperatorTable::standard();
    table.add(
        "MyFunc",
        Syntax::Function,
        mdxtree::validate::TypeRule::Fixed(Type::Numeric),
    );
    let mut select = SelectNode::new()
        .axis(AxisNode::new(
            Axis::Columns,
            Some(braces(vec![ident("[Gender]")])),
        ))
        .from_ident(ident_node("[sales]"))
        .where_expr(func("MyFunc", vec![LiteralNode::numeric(1).into()]));
    Validator::new(&fx.catalog)
        .with_operators(table)
        .validate(&mut select)
        .unwrap();
}
