//! Call syntaxes - how an operator name and argument list become text.
//!
//! Each MDX call carries a [`Syntax`] tag owning the rendering strategy
//! for that call shape. The set is closed: every variant is handled in
//! [`Syntax::unparse_call`] and the compiler enforces exhaustiveness.

use crate::ast::expr::Expr;
use crate::token::{unparse_comma_list, Token, TokenStream, Unparse};

/// The syntactic category of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Syntax {
    /// `name(arg1, arg2, ...)`
    Function,
    /// `arg0.name` - exactly one argument, the "this".
    Property,
    /// `arg0.name(arg1, ...)` - at least one argument.
    Method,
    /// `arg0 name arg1`
    Infix,
    /// `name arg0`
    Prefix,
    /// `arg0 name`
    Postfix,
    /// `{arg1, ...}` - set construction; the operator name is `"{}"`.
    Braces,
    /// `(arg1, ...)` - grouping/tuple construction; the name is `"()"`.
    Parentheses,
    /// `CASE ... WHEN ... THEN ... END` - the reserved operators
    /// `"_CaseTest"` (searched) and `"_CaseMatch"` (matched).
    Case,
    /// `CAST(arg0 AS arg1)` - exactly two arguments.
    Cast,
    /// System-generated calls (`$`-prefixed names) with no surface syntax.
    /// Unparsing one is an error: the tree was not resolved or rewritten
    /// before output.
    Internal,
}

impl Syntax {
    /// Render `name` applied to `args` under this syntax.
    ///
    /// # Panics
    ///
    /// Panics on argument-count violations (Property, Method, Prefix,
    /// Postfix, Cast) and on any attempt to render an Internal call -
    /// these indicate an invariant was broken upstream and the output
    /// would not be meaningful MDX.
    pub fn unparse_call(&self, name: &str, args: &[Expr], ts: &mut TokenStream) {
        match self {
            Syntax::Function => {
                ts.push(Token::Name(name.into())).lparen();
                unparse_comma_list(args, ts);
                ts.rparen();
            }
            Syntax::Property => {
                if args.len() != 1 {
                    panic!(
                        "property '{}' requires exactly one argument, got {}",
                        name,
                        args.len()
                    );
                }
                args[0].unparse(ts);
                ts.push(Token::Dot).push(Token::Name(name.into()));
            }
            Syntax::Method => {
                let (this, rest) = match args.split_first() {
                    Some(split) => split,
                    None => panic!("method '{}' requires at least one argument", name),
                };
                this.unparse(ts);
                ts.push(Token::Dot).push(Token::Name(name.into())).lparen();
                unparse_comma_list(rest, ts);
                ts.rparen();
            }
            Syntax::Infix => {
                let paren = need_paren(args);
                if paren {
                    ts.lparen();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.space().push(Token::Name(name.into())).space();
                    }
                    arg.unparse(ts);
                }
                if paren {
                    ts.rparen();
                }
            }
            Syntax::Prefix => {
                if args.len() != 1 {
                    panic!(
                        "prefix operator '{}' requires exactly one argument, got {}",
                        name,
                        args.len()
                    );
                }
                let paren = need_paren(args);
                if paren {
                    ts.lparen();
                }
                ts.push(Token::Name(name.into())).space();
                args[0].unparse(ts);
                if paren {
                    ts.rparen();
                }
            }
            Syntax::Postfix => {
                if args.len() != 1 {
                    panic!(
                        "postfix operator '{}' requires exactly one argument, got {}",
                        name,
                        args.len()
                    );
                }
                let paren = need_paren(args);
                if paren {
                    ts.lparen();
                }
                args[0].unparse(ts);
                ts.space().push(Token::Name(name.into()));
                if paren {
                    ts.rparen();
                }
            }
            Syntax::Braces => {
                ts.lbrace();
                unparse_comma_list(args, ts);
                ts.rbrace();
            }
            Syntax::Parentheses => {
                ts.lparen();
                unparse_comma_list(args, ts);
                ts.rparen();
            }
            Syntax::Case => {
                ts.push(Token::Case);
                let mut j = 0;
                // The matched form carries its operand as the first
                // argument; the searched form ("_CaseTest") does not.
                if name != "_CaseTest" && !args.is_empty() {
                    ts.space();
                    args[j].unparse(ts);
                    j += 1;
                }
                let clauses = (args.len() - j) / 2;
                for _ in 0..clauses {
                    ts.space().push(Token::When).space();
                    args[j].unparse(ts);
                    j += 1;
                    ts.space().push(Token::Then).space();
                    args[j].unparse(ts);
                    j += 1;
                }
                if j < args.len() {
                    ts.space().push(Token::Else).space();
                    args[j].unparse(ts);
                }
                ts.space().push(Token::End);
            }
            Syntax::Cast => {
                if args.len() != 2 {
                    panic!("CAST requires exactly two arguments, got {}", args.len());
                }
                ts.push(Token::Cast).lparen();
                args[0].unparse(ts);
                ts.space().push(Token::As).space();
                args[1].unparse(ts);
                ts.rparen();
            }
            Syntax::Internal => {
                panic!(
                    "cannot unparse internal operator '{}': \
                     the tree was not resolved before rendering",
                    name
                );
            }
        }
    }
}

/// Whether an Infix/Prefix/Postfix application must be parenthesized.
///
/// Parentheses are omitted only when the argument list is a single
/// argument which is itself a Parentheses-syntax call - an
/// already-grouped sub-expression. Every other case, including a single
/// bare identifier, is wrapped. Round-trip fidelity depends on this
/// exact rule.
fn need_paren(args: &[Expr]) -> bool {
    match args {
        [Expr::Call(call)] => call.syntax() != Syntax::Parentheses,
        _ => true,
    }
}
