//! Expression nodes.
//!
//! [`Expr`] is a closed sum over every kind of MDX expression; every
//! variant must be handled in dispatch sites - the compiler enforces
//! this. Trees are strict single-owner: a node owns its children by
//! value, so cycles cannot be constructed and `Clone` is a deep copy
//! (the only shared pieces are `Arc` metadata objects, regions, and
//! literal values, all immutable).

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::ident::Identifier;
use crate::metadata::{Cube, Dimension, Hierarchy, Level, Member};
use crate::region::ParseRegion;
use crate::syntax::Syntax;
use crate::token::{Token, TokenStream, Unparse};
use crate::types::{MemberType, Type};

// =============================================================================
// Expression sum
// =============================================================================

/// An MDX expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Operator or function application.
    Call(CallNode),
    /// Literal value.
    Literal(LiteralNode),
    /// Unresolved identifier - a placeholder pending resolution into a
    /// typed metadata leaf.
    Identifier(IdentifierNode),
    Cube(CubeNode),
    Dimension(DimensionNode),
    Hierarchy(HierarchyNode),
    Level(LevelNode),
    Member(MemberNode),
    /// Query parameter.
    Parameter(ParameterNode),
}

impl Expr {
    /// The source region this expression came from, if it was parsed.
    pub fn region(&self) -> Option<ParseRegion> {
        match self {
            Expr::Call(n) => n.region(),
            Expr::Literal(n) => n.region(),
            Expr::Identifier(n) => n.region(),
            Expr::Cube(n) => n.region(),
            Expr::Dimension(n) => n.region(),
            Expr::Hierarchy(n) => n.region(),
            Expr::Level(n) => n.region(),
            Expr::Member(n) => n.region(),
            Expr::Parameter(n) => n.region(),
        }
    }

    /// The expression's type.
    ///
    /// `None` for identifier placeholders and for calls a validator has
    /// not typed yet.
    pub fn ty(&self) -> Option<Type> {
        match self {
            Expr::Call(n) => n.ty().cloned(),
            Expr::Literal(n) => Some(n.ty()),
            Expr::Identifier(_) => None,
            Expr::Cube(n) => Some(Type::Cube(Arc::clone(n.cube()))),
            Expr::Dimension(n) => Some(Type::Dimension(Arc::clone(n.dimension()))),
            Expr::Hierarchy(n) => Some(Type::Hierarchy(Arc::clone(n.hierarchy()))),
            Expr::Level(n) => Some(Type::Level(Arc::clone(n.level()))),
            Expr::Member(n) => Some(Type::Member(MemberType::of_member(n.member()))),
            Expr::Parameter(n) => Some(n.ty().clone()),
        }
    }
}

impl Unparse for Expr {
    fn unparse(&self, ts: &mut TokenStream) {
        match self {
            Expr::Call(n) => n.unparse(ts),
            Expr::Literal(n) => n.unparse(ts),
            Expr::Identifier(n) => n.unparse(ts),
            Expr::Cube(n) => n.unparse(ts),
            Expr::Dimension(n) => n.unparse(ts),
            Expr::Hierarchy(n) => n.unparse(ts),
            Expr::Level(n) => n.unparse(ts),
            Expr::Member(n) => n.unparse(ts),
            Expr::Parameter(n) => n.unparse(ts),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mdx())
    }
}

// =============================================================================
// CallNode
// =============================================================================

/// An operator or function application.
///
/// The argument list is mandatory (possibly empty) and structurally
/// immutable after construction; the validator-assigned type is the only
/// mutable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CallNode {
    region: Option<ParseRegion>,
    name: String,
    syntax: Syntax,
    args: Vec<Expr>,
    ty: Option<Type>,
}

impl CallNode {
    /// Create a call.
    ///
    /// # Panics
    ///
    /// Panics when the operator name is inconsistent with the syntax:
    /// `"{}"` pairs only with [`Syntax::Braces`], `"()"` only with
    /// [`Syntax::Parentheses`], `$`-prefixed names only with
    /// [`Syntax::Internal`], and no ordinary name may collide with those
    /// reserved forms.
    pub fn new(name: impl Into<String>, syntax: Syntax, args: Vec<Expr>) -> Self {
        let name = name.into();
        match syntax {
            Syntax::Braces => {
                if name != "{}" {
                    panic!("Braces syntax requires operator name \"{{}}\", got '{}'", name);
                }
            }
            Syntax::Parentheses => {
                if name != "()" {
                    panic!(
                        "Parentheses syntax requires operator name \"()\", got '{}'",
                        name
                    );
                }
            }
            Syntax::Internal => {
                if !name.starts_with('$') {
                    panic!(
                        "Internal syntax requires a '$'-prefixed operator name, got '{}'",
                        name
                    );
                }
            }
            _ => {
                if name == "{}" {
                    panic!("operator \"{{}}\" requires Braces syntax, got {:?}", syntax);
                }
                if name == "()" {
                    panic!("operator \"()\" requires Parentheses syntax, got {:?}", syntax);
                }
                if name.starts_with('$') {
                    panic!(
                        "'$'-prefixed operator '{}' requires Internal syntax, got {:?}",
                        name, syntax
                    );
                }
            }
        }
        Self {
            region: None,
            name,
            syntax,
            args,
            ty: None,
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

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [Expr] {
        &mut self.args
    }

    /// The validator-assigned type, if any.
    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Assign the call's type. Normally done by a validator; transform
    /// code building typed trees by hand may also use it.
    pub fn set_ty(&mut self, ty: Option<Type>) {
        self.ty = ty;
    }
}

impl Unparse for CallNode {
    fn unparse(&self, ts: &mut TokenStream) {
        self.syntax.unparse_call(&self.name, &self.args, ts);
    }
}

impl From<CallNode> for Expr {
    fn from(n: CallNode) -> Self {
        Expr::Call(n)
    }
}

// =============================================================================
// LiteralNode
// =============================================================================

/// A literal value. The value/type pairing is carried by the sum itself:
/// no invalid combination is representable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Null,
    /// Exact numeric.
    Numeric(Decimal),
    /// Quoted string; embedded `"` doubles on output.
    String(String),
    /// Keyword used as a value (`ASC`, `DESC`, ...), rendered bare.
    Symbol(String),
}

/// A literal expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralNode {
    region: Option<ParseRegion>,
    value: Literal,
}

impl LiteralNode {
    pub fn new(value: Literal) -> Self {
        Self {
            region: None,
            value,
        }
    }

    pub fn null() -> Self {
        Self::new(Literal::Null)
    }

    pub fn numeric(value: impl Into<Decimal>) -> Self {
        Self::new(Literal::Numeric(value.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Literal::String(value.into()))
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        Self::new(Literal::Symbol(value.into()))
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }

    pub fn ty(&self) -> Type {
        match self.value {
            Literal::Null => Type::Null,
            Literal::Numeric(_) => Type::Numeric,
            Literal::String(_) => Type::String,
            Literal::Symbol(_) => Type::Symbol,
        }
    }
}

impl Unparse for LiteralNode {
    fn unparse(&self, ts: &mut TokenStream) {
        match &self.value {
            Literal::Null => ts.push(Token::Null),
            Literal::Numeric(n) => ts.push(Token::LitNumber(*n)),
            Literal::String(s) => ts.push(Token::LitString(s.clone())),
            Literal::Symbol(s) => ts.push(Token::Symbol(s.clone())),
        };
    }
}

impl From<LiteralNode> for Expr {
    fn from(n: LiteralNode) -> Self {
        Expr::Literal(n)
    }
}

// =============================================================================
// IdentifierNode
// =============================================================================

/// An unresolved compound identifier.
///
/// Typeless: validation resolves it against the enclosing scope and
/// catalog and replaces it with a typed leaf node.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierNode {
    region: Option<ParseRegion>,
    ident: Identifier,
}

impl IdentifierNode {
    pub fn new(ident: Identifier) -> Self {
        Self {
            region: None,
            ident,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn ident(&self) -> &Identifier {
        &self.ident
    }
}

impl Unparse for IdentifierNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Ident(self.ident.clone()));
    }
}

impl From<IdentifierNode> for Expr {
    fn from(n: IdentifierNode) -> Self {
        Expr::Identifier(n)
    }
}

// =============================================================================
// Typed metadata leaves
// =============================================================================

/// A resolved cube reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeNode {
    region: Option<ParseRegion>,
    cube: Arc<Cube>,
}

impl CubeNode {
    pub fn new(cube: Arc<Cube>) -> Self {
        Self { region: None, cube }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn cube(&self) -> &Arc<Cube> {
        &self.cube
    }
}

impl Unparse for CubeNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Raw(self.cube.unique_name().to_string()));
    }
}

impl From<CubeNode> for Expr {
    fn from(n: CubeNode) -> Self {
        Expr::Cube(n)
    }
}

/// A resolved dimension reference.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionNode {
    region: Option<ParseRegion>,
    dimension: Arc<Dimension>,
}

impl DimensionNode {
    pub fn new(dimension: Arc<Dimension>) -> Self {
        Self {
            region: None,
            dimension,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn dimension(&self) -> &Arc<Dimension> {
        &self.dimension
    }
}

impl Unparse for DimensionNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Raw(self.dimension.unique_name().to_string()));
    }
}

impl From<DimensionNode> for Expr {
    fn from(n: DimensionNode) -> Self {
        Expr::Dimension(n)
    }
}

/// A resolved hierarchy reference.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    region: Option<ParseRegion>,
    hierarchy: Arc<Hierarchy>,
}

impl HierarchyNode {
    pub fn new(hierarchy: Arc<Hierarchy>) -> Self {
        Self {
            region: None,
            hierarchy,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        &self.hierarchy
    }
}

impl Unparse for HierarchyNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Raw(self.hierarchy.unique_name().to_string()));
    }
}

impl From<HierarchyNode> for Expr {
    fn from(n: HierarchyNode) -> Self {
        Expr::Hierarchy(n)
    }
}

/// A resolved level reference.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelNode {
    region: Option<ParseRegion>,
    level: Arc<Level>,
}

impl LevelNode {
    pub fn new(level: Arc<Level>) -> Self {
        Self {
            region: None,
            level,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }
}

impl Unparse for LevelNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Raw(self.level.unique_name().to_string()));
    }
}

impl From<LevelNode> for Expr {
    fn from(n: LevelNode) -> Self {
        Expr::Level(n)
    }
}

/// A resolved member reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberNode {
    region: Option<ParseRegion>,
    member: Arc<Member>,
}

impl MemberNode {
    pub fn new(member: Arc<Member>) -> Self {
        Self {
            region: None,
            member,
        }
    }

    pub fn with_region(mut self, region: Option<ParseRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn region(&self) -> Option<ParseRegion> {
        self.region
    }

    pub fn member(&self) -> &Arc<Member> {
        &self.member
    }
}

impl Unparse for MemberNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Raw(self.member.unique_name().to_string()));
    }
}

impl From<MemberNode> for Expr {
    fn from(n: MemberNode) -> Self {
        Expr::Member(n)
    }
}

// =============================================================================
// ParameterNode
// =============================================================================

/// A query parameter: a mutable name/type/default triple.
///
/// Unbound parameters carry no default; transform code binds them by
/// swapping the default expression in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    region: Option<ParseRegion>,
    name: String,
    ty: Type,
    default: Option<Box<Expr>>,
}

impl ParameterNode {
    pub fn new(name: impl Into<String>, ty: Type, default: Option<Expr>) -> Self {
        Self {
            region: None,
            name: name.into(),
            ty,
            default: default.map(Box::new),
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

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn set_ty(&mut self, ty: Type) {
        self.ty = ty;
    }

    pub fn default(&self) -> Option<&Expr> {
        self.default.as_deref()
    }

    pub fn default_mut(&mut self) -> Option<&mut Expr> {
        self.default.as_deref_mut()
    }

    pub fn set_default(&mut self, default: Option<Expr>) {
        self.default = default.map(Box::new);
    }
}

impl Unparse for ParameterNode {
    fn unparse(&self, ts: &mut TokenStream) {
        ts.push(Token::Name("Parameter".into())).lparen();
        ts.push(Token::LitString(self.name.clone()));
        ts.comma().space().push(Token::Raw(self.ty.designator()));
        if let Some(default) = &self.default {
            ts.comma().space();
            default.unparse(ts);
        }
        ts.rparen();
    }
}

impl From<ParameterNode> for Expr {
    fn from(n: ParameterNode) -> Self {
        Expr::Parameter(n)
    }
}

// =============================================================================
// Expression constructors
// =============================================================================

/// Parse an identifier expression from literal text.
///
/// # Panics
///
/// Panics on malformed identifier text; intended for identifiers written
/// in source. Use [`crate::ident::parse_identifier`] for user input.
pub fn ident(text: &str) -> Expr {
    match crate::ident::parse_identifier(text) {
        Ok(id) => IdentifierNode::new(id).into(),
        Err(e) => panic!("bad identifier literal '{}': {}", text, e),
    }
}

/// `name(args...)`
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    CallNode::new(name, Syntax::Function, args).into()
}

/// `this.name`
pub fn property(this: Expr, name: &str) -> Expr {
    CallNode::new(name, Syntax::Property, vec![this]).into()
}

/// `this.name(args...)`
pub fn method(this: Expr, name: &str, mut args: Vec<Expr>) -> Expr {
    let mut all = vec![this];
    all.append(&mut args);
    CallNode::new(name, Syntax::Method, all).into()
}

/// `left name right`
pub fn infix(name: &str, left: Expr, right: Expr) -> Expr {
    CallNode::new(name, Syntax::Infix, vec![left, right]).into()
}

/// `name arg`
pub fn prefix(name: &str, arg: Expr) -> Expr {
    CallNode::new(name, Syntax::Prefix, vec![arg]).into()
}

/// `arg name`
pub fn postfix(name: &str, arg: Expr) -> Expr {
    CallNode::new(name, Syntax::Postfix, vec![arg]).into()
}

/// `{args...}` - set construction.
pub fn braces(args: Vec<Expr>) -> Expr {
    CallNode::new("{}", Syntax::Braces, args).into()
}

/// `(args...)` - grouping or tuple construction.
pub fn parens(args: Vec<Expr>) -> Expr {
    CallNode::new("()", Syntax::Parentheses, args).into()
}

/// `CAST(expr AS target)`
pub fn cast(expr: Expr, target: Expr) -> Expr {
    CallNode::new("CAST", Syntax::Cast, vec![expr, target]).into()
}

/// A member leaf expression.
pub fn member_expr(member: Arc<Member>) -> Expr {
    MemberNode::new(member).into()
}
