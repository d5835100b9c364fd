//! Validation: identifier resolution, type assignment, and statement
//! consistency checks.
//!
//! The validator walks an unresolved tree, replaces identifier
//! placeholders with typed metadata leaves resolved through a
//! [`Catalog`], assigns a [`Type`] to every expression, and then checks
//! statement-level consistency. Validation is fail-fast: the first
//! violation aborts the statement.
//!
//! Name resolution order: the enclosing SELECT's WITH MEMBER names, then
//! its WITH SET names, then the catalog scoped to the cube resolved from
//! the FROM target. With-clause names shadow catalog names.
//!
//! Operator result types come from an [`OperatorTable`] constructed
//! explicitly and passed in - there is no process-wide operator
//! registry, so independent validations cannot interfere.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::expr::{CallNode, DimensionNode, Expr, HierarchyNode, LevelNode, MemberNode};
use crate::ast::select::{Axis, FromClause, SelectNode, WithClause};
use crate::metadata::{Catalog, Cube, ResolvedRef};
use crate::region::ParseRegion;
use crate::syntax::Syntax;
use crate::token::Unparse;
use crate::types::{MemberType, Type};

// =============================================================================
// Errors
// =============================================================================

/// A statement-level validation failure.
///
/// Every variant names the offending fragment; [`ValidationError::region`]
/// recovers its source region when the tree was parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("SELECT statement has no FROM clause to resolve against")]
    MissingFrom,

    #[error("unknown cube '{name}'")]
    UnknownCube {
        name: String,
        region: Option<ParseRegion>,
    },

    #[error("cannot resolve identifier '{text}'")]
    Unresolved {
        text: String,
        region: Option<ParseRegion>,
    },

    #[error("unknown operator '{name}' in '{text}'")]
    UnknownOperator {
        name: String,
        text: String,
        region: Option<ParseRegion>,
    },

    #[error("axis {axis} has no expression")]
    EmptyAxis { axis: Axis },

    #[error("axis {axis} expression '{text}' is not a set (found {found})")]
    AxisNotASet {
        axis: Axis,
        found: String,
        text: String,
        region: Option<ParseRegion>,
    },

    #[error("calculated member '{name}' must not be a set (found {found})")]
    SetValuedMember {
        name: String,
        found: String,
        region: Option<ParseRegion>,
    },

    #[error("named set '{name}' must be a set (found {found})")]
    NonSetValuedSet {
        name: String,
        found: String,
        region: Option<ParseRegion>,
    },

    #[error("duplicate axis {axis}")]
    DuplicateAxis { axis: Axis },

    #[error("hierarchy '{hierarchy}' appears on both axis {first} and axis {second}")]
    HierarchyOnMultipleAxes {
        hierarchy: String,
        first: Axis,
        second: Axis,
    },

    #[error("invalid CAST '{text}'")]
    InvalidCast {
        text: String,
        region: Option<ParseRegion>,
    },
}

impl ValidationError {
    /// The source region of the offending fragment, when known.
    pub fn region(&self) -> Option<ParseRegion> {
        match self {
            ValidationError::UnknownCube { region, .. }
            | ValidationError::Unresolved { region, .. }
            | ValidationError::UnknownOperator { region, .. }
            | ValidationError::AxisNotASet { region, .. }
            | ValidationError::SetValuedMember { region, .. }
            | ValidationError::NonSetValuedSet { region, .. }
            | ValidationError::InvalidCast { region, .. } => *region,
            _ => None,
        }
    }

    /// The error message plus the caret-annotated source fragment, when a
    /// region is known.
    pub fn annotate(&self, source: &str) -> String {
        match self.region() {
            Some(region) => format!("{}\n{}", self, region.annotate(source)),
            None => self.to_string(),
        }
    }
}

// =============================================================================
// Operator result types
// =============================================================================

/// How an operator's result type derives from its argument types.
#[derive(Debug, Clone)]
pub enum TypeRule {
    /// A fixed result type.
    Fixed(Type),
    /// The type of the i-th argument.
    ArgType(usize),
    /// The i-th argument coerced to a set.
    SetOfArg(usize),
    /// The element type of the i-th argument used as a set.
    ElementOfArg(usize),
    /// A member of the hierarchy the i-th argument touches.
    MemberOfArg(usize),
    /// A set of members of the hierarchy the i-th argument touches.
    MemberSetOfArg(usize),
    /// A set of tuples combining every argument's element type.
    CrossJoin,
    /// The type of the first THEN branch of a CASE operator.
    CaseResult,
}

impl TypeRule {
    fn apply(&self, name: &str, args: &[Type]) -> Type {
        match self {
            TypeRule::Fixed(t) => t.clone(),
            TypeRule::ArgType(i) => args.get(*i).cloned().unwrap_or(Type::Scalar),
            TypeRule::SetOfArg(i) => match args.get(*i) {
                Some(t) if t.is_set() => t.clone(),
                Some(t) => match t.set_element() {
                    Some(elem) => Type::Set(Box::new(elem)),
                    None => Type::Set(Box::new(Type::Member(MemberType::unknown()))),
                },
                None => Type::Set(Box::new(Type::Member(MemberType::unknown()))),
            },
            TypeRule::ElementOfArg(i) => args
                .get(*i)
                .and_then(Type::set_element)
                .unwrap_or(Type::Scalar),
            TypeRule::MemberOfArg(i) => Type::Member(member_of(args.get(*i))),
            TypeRule::MemberSetOfArg(i) => {
                Type::Set(Box::new(Type::Member(member_of(args.get(*i)))))
            }
            TypeRule::CrossJoin => {
                let elems = args
                    .iter()
                    .map(|t| t.set_element().unwrap_or(Type::Member(MemberType::unknown())))
                    .collect();
                Type::Set(Box::new(Type::Tuple(elems)))
            }
            TypeRule::CaseResult => {
                let then = if name.eq_ignore_ascii_case("_CaseTest") {
                    args.get(1)
                } else {
                    args.get(2)
                };
                then.cloned().unwrap_or(Type::Scalar)
            }
        }
    }
}

fn member_of(ty: Option<&Type>) -> MemberType {
    match ty {
        Some(Type::Hierarchy(h)) => MemberType::of_hierarchy(h),
        Some(Type::Level(l)) => MemberType::of_level(l),
        Some(Type::Member(m)) => m.clone(),
        Some(Type::Set(inner)) => member_of(Some(inner)),
        _ => MemberType::unknown(),
    }
}

/// The operator registry: `(name, syntax)` to result-type rule.
///
/// Lookups are case-insensitive on the name. Braces and parentheses are
/// structural and handled by the validator directly.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    rules: HashMap<(String, Syntax), TypeRule>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator.
    pub fn add(&mut self, name: &str, syntax: Syntax, rule: TypeRule) -> &mut Self {
        self.rules.insert((name.to_uppercase(), syntax), rule);
        self
    }

    pub fn lookup(&self, name: &str, syntax: Syntax) -> Option<&TypeRule> {
        self.rules.get(&(name.to_uppercase(), syntax))
    }

    /// The standard MDX operators.
    pub fn standard() -> Self {
        use Syntax::*;
        use TypeRule::*;
        let mut table = Self::new();

        // Member navigation properties
        for name in ["CurrentMember", "DefaultMember", "FirstChild", "LastChild", "Parent", "PrevMember", "NextMember"] {
            table.add(name, Property, MemberOfArg(0));
        }
        // Set-producing properties
        for name in ["Children", "Members", "AllMembers", "Siblings"] {
            table.add(name, Property, MemberSetOfArg(0));
        }
        // Scalar properties
        table.add("Name", Property, Fixed(Type::String));
        table.add("UniqueName", Property, Fixed(Type::String));
        table.add("Ordinal", Property, Fixed(Type::Numeric));
        table.add("Value", Property, Fixed(Type::Scalar));

        // Set functions
        table.add("CrossJoin", Function, CrossJoin);
        for name in ["Filter", "Order", "Head", "Tail", "TopCount", "BottomCount", "Hierarchize", "Distinct", "Union", "Except", "Intersect"] {
            table.add(name, Function, SetOfArg(0));
        }
        table.add("Descendants", Function, MemberSetOfArg(0));
        table.add("Ancestors", Function, MemberSetOfArg(0));
        table.add("StrToSet", Function, Fixed(Type::Set(Box::new(Type::Member(MemberType::unknown())))));

        // Member functions and methods
        table.add("StrToMember", Function, Fixed(Type::Member(MemberType::unknown())));
        table.add("Item", Method, ElementOfArg(0));
        table.add("Lag", Method, MemberOfArg(0));
        table.add("Lead", Method, MemberOfArg(0));

        // Numeric aggregation
        for name in ["Sum", "Avg", "Min", "Max", "Count", "Aggregate", "Median", "Stdev", "Var"] {
            table.add(name, Function, Fixed(Type::Numeric));
        }

        // Scalar functions
        table.add("IIf", Function, ArgType(1));
        table.add("CoalesceEmpty", Function, ArgType(0));
        table.add("IsEmpty", Function, Fixed(Type::Boolean));
        table.add("TupleToStr", Function, Fixed(Type::String));
        table.add("SetToStr", Function, Fixed(Type::String));

        // Operators
        for name in ["+", "-", "*", "/"] {
            table.add(name, Infix, Fixed(Type::Numeric));
        }
        table.add("||", Infix, Fixed(Type::String));
        for name in ["=", "<>", "<", ">", "<=", ">="] {
            table.add(name, Infix, Fixed(Type::Boolean));
        }
        for name in ["AND", "OR", "XOR"] {
            table.add(name, Infix, Fixed(Type::Boolean));
        }
        table.add("NOT", Prefix, Fixed(Type::Boolean));
        table.add("-", Prefix, Fixed(Type::Numeric));
        table.add("IS EMPTY", Postfix, Fixed(Type::Boolean));
        table.add(":", Infix, MemberSetOfArg(0));

        // CASE operators
        table.add("_CaseTest", Case, CaseResult);
        table.add("_CaseMatch", Case, CaseResult);

        table
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Per-statement resolution scope.
struct Scope {
    cube: Arc<Cube>,
    members: HashMap<String, Type>,
    sets: HashMap<String, Type>,
}

/// Validates SELECT statements against a catalog.
pub struct Validator<'a> {
    catalog: &'a dyn Catalog,
    operators: OperatorTable,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self {
            catalog,
            operators: OperatorTable::standard(),
        }
    }

    /// Use a custom operator table instead of [`OperatorTable::standard`].
    pub fn with_operators(mut self, operators: OperatorTable) -> Self {
        self.operators = operators;
        self
    }

    /// Validate a SELECT statement in place.
    ///
    /// On success every identifier placeholder reachable from the
    /// statement has been replaced by a typed metadata leaf (with-clause
    /// references keep their identifier form) and every call carries its
    /// result type.
    pub fn validate(&self, select: &mut SelectNode) -> Result<(), ValidationError> {
        self.validate_select(select).map(|_cube| ())
    }

    fn validate_select(&self, select: &mut SelectNode) -> Result<Arc<Cube>, ValidationError> {
        let cube = self.resolve_cube(select)?;
        let mut scope = Scope {
            cube: Arc::clone(&cube),
            members: HashMap::new(),
            sets: HashMap::new(),
        };

        // WITH definitions, in order; each sees the ones before it.
        for clause in select.with_list_mut() {
            match clause {
                WithClause::Member(member) => {
                    let name = member.name().ident().to_string();
                    let region = member.region().or_else(|| member.expression().region());
                    let ty = self.validate_expr(member.expression_mut(), &scope)?;
                    if ty.is_set() {
                        return Err(ValidationError::SetValuedMember {
                            name,
                            found: ty.to_string(),
                            region,
                        });
                    }
                    for property in member.properties_mut() {
                        self.validate_expr(property.expression_mut(), &scope)?;
                    }
                    scope
                        .members
                        .insert(name, Type::Member(MemberType::unknown()));
                }
                WithClause::Set(set) => {
                    let name = set.name().ident().to_string();
                    let region = set.region().or_else(|| set.expression().region());
                    let ty = self.validate_expr(set.expression_mut(), &scope)?;
                    if !ty.is_set() {
                        return Err(ValidationError::NonSetValuedSet {
                            name,
                            found: ty.to_string(),
                            region,
                        });
                    }
                    scope.sets.insert(name, ty);
                }
            }
        }

        // Axes: each expression must be a set, no ordinal repeats, and no
        // hierarchy may appear on two independent axes.
        let mut seen_ordinals: HashMap<i32, Axis> = HashMap::new();
        let mut hierarchy_axes: HashMap<String, Axis> = HashMap::new();
        for axis in select.axis_list_mut() {
            let tag = axis.axis();
            if seen_ordinals.insert(tag.ordinal(), tag).is_some() {
                return Err(ValidationError::DuplicateAxis { axis: tag });
            }
            let expr = axis
                .expression_mut()
                .ok_or(ValidationError::EmptyAxis { axis: tag })?;
            let ty = self.validate_expr(&mut *expr, &scope)?;
            if !ty.can_convert_to_set() {
                return Err(ValidationError::AxisNotASet {
                    axis: tag,
                    found: ty.to_string(),
                    text: expr.to_mdx(),
                    region: expr.region(),
                });
            }
            let mut hierarchies = vec![];
            ty.hierarchies(&mut hierarchies);
            for hierarchy in hierarchies {
                let key = hierarchy.unique_name().to_string();
                match hierarchy_axes.get(&key) {
                    Some(first) if *first != tag => {
                        return Err(ValidationError::HierarchyOnMultipleAxes {
                            hierarchy: key,
                            first: *first,
                            second: tag,
                        });
                    }
                    Some(_) => {}
                    None => {
                        hierarchy_axes.insert(key, tag);
                    }
                }
            }
        }

        // The filter axis is exempt from the set requirement: a bare
        // member or tuple slices fine.
        if let Some(expr) = select.filter_axis_mut().expression_mut() {
            self.validate_expr(expr, &scope)?;
        }

        Ok(cube)
    }

    fn resolve_cube(&self, select: &mut SelectNode) -> Result<Arc<Cube>, ValidationError> {
        match select.from_mut() {
            None => Err(ValidationError::MissingFrom),
            Some(FromClause::Cube(node)) => Ok(Arc::clone(node.cube())),
            Some(FromClause::Ident(node)) => {
                let text = node.ident().to_string();
                let found = self.catalog.cube(&text).or_else(|| {
                    // A single-segment identifier also matches by bare name.
                    match node.ident().segments() {
                        [segment] => segment.name().and_then(|n| self.catalog.cube(n)),
                        _ => None,
                    }
                });
                found.ok_or(ValidationError::UnknownCube {
                    name: text,
                    region: node.region(),
                })
            }
            Some(FromClause::Select(subselect)) => self.validate_select(subselect),
        }
    }

    fn validate_expr(&self, expr: &mut Expr, scope: &Scope) -> Result<Type, ValidationError> {
        match expr {
            Expr::Literal(node) => Ok(node.ty()),
            Expr::Cube(node) => Ok(Type::Cube(Arc::clone(node.cube()))),
            Expr::Dimension(node) => Ok(Type::Dimension(Arc::clone(node.dimension()))),
            Expr::Hierarchy(node) => Ok(Type::Hierarchy(Arc::clone(node.hierarchy()))),
            Expr::Level(node) => Ok(Type::Level(Arc::clone(node.level()))),
            Expr::Member(node) => Ok(Type::Member(MemberType::of_member(node.member()))),
            Expr::Parameter(node) => {
                let declared = node.ty().clone();
                if let Some(default) = node.default_mut() {
                    self.validate_expr(default, scope)?;
                }
                Ok(declared)
            }
            Expr::Call(node) => self.validate_call(node, scope),
            Expr::Identifier(node) => {
                let text = node.ident().to_string();
                // With-clause names shadow the catalog; a calculated
                // member or named set reference keeps its identifier form.
                if let Some(ty) = scope.members.get(&text) {
                    return Ok(ty.clone());
                }
                if let Some(ty) = scope.sets.get(&text) {
                    return Ok(ty.clone());
                }
                let region = node.region();
                let resolved = self.catalog.resolve(&scope.cube, node.ident());
                let (replacement, ty) = match resolved {
                    Some(ResolvedRef::Member(m)) => (
                        Expr::Member(MemberNode::new(Arc::clone(&m)).with_region(region)),
                        Type::Member(MemberType::of_member(&m)),
                    ),
                    Some(ResolvedRef::Level(l)) => (
                        Expr::Level(LevelNode::new(Arc::clone(&l)).with_region(region)),
                        Type::Level(l),
                    ),
                    Some(ResolvedRef::Hierarchy(h)) => (
                        Expr::Hierarchy(HierarchyNode::new(Arc::clone(&h)).with_region(region)),
                        Type::Hierarchy(h),
                    ),
                    Some(ResolvedRef::Dimension(d)) => (
                        Expr::Dimension(DimensionNode::new(Arc::clone(&d)).with_region(region)),
                        Type::Dimension(d),
                    ),
                    None => return Err(ValidationError::Unresolved { text, region }),
                };
                *expr = replacement;
                Ok(ty)
            }
        }
    }

    fn validate_call(&self, node: &mut CallNode, scope: &Scope) -> Result<Type, ValidationError> {
        let syntax = node.syntax();
        let name = node.name().to_string();
        let ty = match syntax {
            Syntax::Braces => {
                let mut element: Option<Type> = None;
                for arg in node.args_mut() {
                    let t = self.validate_expr(arg, scope)?;
                    if element.is_none() {
                        element = t.set_element();
                    }
                }
                Type::Set(Box::new(
                    element.unwrap_or(Type::Member(MemberType::unknown())),
                ))
            }
            Syntax::Parentheses => {
                let mut types = vec![];
                for arg in node.args_mut() {
                    types.push(self.validate_expr(arg, scope)?);
                }
                if types.len() == 1 {
                    types.remove(0)
                } else {
                    Type::Tuple(types)
                }
            }
            Syntax::Cast => self.validate_cast(node, scope)?,
            _ => {
                let mut types = vec![];
                for arg in node.args_mut() {
                    types.push(self.validate_expr(arg, scope)?);
                }
                let rule = match self.operators.lookup(&name, syntax) {
                    Some(rule) => rule,
                    None => {
                        let text = if syntax == Syntax::Internal {
                            // Internal calls have no surface rendering.
                            name.clone()
                        } else {
                            node.to_mdx()
                        };
                        return Err(ValidationError::UnknownOperator {
                            name,
                            text,
                            region: node.region(),
                        });
                    }
                };
                rule.apply(&name, &types)
            }
        };
        node.set_ty(Some(ty.clone()));
        Ok(ty)
    }

    /// `CAST(expr AS designator)`: the target is a type designator, not a
    /// name to resolve.
    fn validate_cast(&self, node: &mut CallNode, scope: &Scope) -> Result<Type, ValidationError> {
        let region = node.region();
        if node.args().len() != 2 {
            return Err(ValidationError::InvalidCast {
                text: node.to_mdx(),
                region,
            });
        }
        let designator = cast_designator(&node.args()[1]);
        let target = match designator.as_deref() {
            Some(d) => match d.to_uppercase().as_str() {
                "NUMERIC" | "INTEGER" | "DECIMAL" | "DOUBLE" => Type::Numeric,
                "STRING" | "CHAR" | "VARCHAR" => Type::String,
                "BOOLEAN" | "LOGICAL" => Type::Boolean,
                _ => {
                    return Err(ValidationError::InvalidCast {
                        text: node.to_mdx(),
                        region,
                    })
                }
            },
            None => {
                return Err(ValidationError::InvalidCast {
                    text: node.to_mdx(),
                    region,
                })
            }
        };
        self.validate_expr(&mut node.args_mut()[0], scope)?;
        Ok(target)
    }
}

fn cast_designator(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(node) => Some(node.ident().to_string()),
        Expr::Literal(node) => match node.value() {
            crate::ast::expr::Literal::Symbol(s) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}
