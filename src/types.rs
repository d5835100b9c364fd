//! Expression types.
//!
//! Every expression node either carries a [`Type`] or is a placeholder
//! awaiting resolution. Statements and axes are typeless. The validator
//! assigns types bottom-up; the set/scalar predicates here drive its
//! consistency checks.

use std::fmt;
use std::sync::Arc;

use crate::metadata::{Dimension, Hierarchy, Level, Member};

/// The type of an MDX expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Boolean,
    Numeric,
    String,
    Symbol,
    Null,
    /// A scalar of unknown shape.
    Scalar,
    Cube(Arc<crate::metadata::Cube>),
    Dimension(Arc<Dimension>),
    Hierarchy(Arc<Hierarchy>),
    Level(Arc<Level>),
    Member(MemberType),
    Tuple(Vec<Type>),
    Set(Box<Type>),
}

/// What is known about a member-typed expression: the
/// dimension/hierarchy/level/member quadruple, each part optional.
///
/// A catalog member fills all four; a calculated member defined in a WITH
/// clause may fill none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberType {
    pub dimension: Option<Arc<Dimension>>,
    pub hierarchy: Option<Arc<Hierarchy>>,
    pub level: Option<Arc<Level>>,
    pub member: Option<Arc<Member>>,
}

impl MemberType {
    /// Member type with nothing known (a calculated member).
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Member type derived from a resolved member.
    pub fn of_member(member: &Arc<Member>) -> Self {
        Self {
            dimension: Some(Arc::clone(member.hierarchy().dimension())),
            hierarchy: Some(Arc::clone(member.hierarchy())),
            level: Some(Arc::clone(member.level())),
            member: Some(Arc::clone(member)),
        }
    }

    /// Member type known only down to a hierarchy (e.g. `CurrentMember`).
    pub fn of_hierarchy(hierarchy: &Arc<Hierarchy>) -> Self {
        Self {
            dimension: Some(Arc::clone(hierarchy.dimension())),
            hierarchy: Some(Arc::clone(hierarchy)),
            level: None,
            member: None,
        }
    }

    /// Member type known down to a level (e.g. `Level.Members` elements).
    pub fn of_level(level: &Arc<Level>) -> Self {
        Self {
            dimension: Some(Arc::clone(level.hierarchy().dimension())),
            hierarchy: Some(Arc::clone(level.hierarchy())),
            level: Some(Arc::clone(level)),
            member: None,
        }
    }
}

impl Type {
    /// A set of members of the given hierarchy.
    pub fn member_set(hierarchy: &Arc<Hierarchy>) -> Type {
        Type::Set(Box::new(Type::Member(MemberType::of_hierarchy(hierarchy))))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Type::Set(_))
    }

    /// Scalar types: the ones a calculated member definition may have.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Type::Boolean | Type::Numeric | Type::String | Type::Symbol | Type::Null | Type::Scalar
        )
    }

    /// True if the type is a set or implicitly converts to one (member,
    /// tuple, hierarchy, level, dimension).
    pub fn can_convert_to_set(&self) -> bool {
        matches!(
            self,
            Type::Set(_)
                | Type::Member(_)
                | Type::Tuple(_)
                | Type::Hierarchy(_)
                | Type::Level(_)
                | Type::Dimension(_)
        )
    }

    /// The element type obtained when this type is used as a set.
    pub fn set_element(&self) -> Option<Type> {
        match self {
            Type::Set(inner) => Some((**inner).clone()),
            Type::Member(m) => Some(Type::Member(m.clone())),
            Type::Tuple(ts) => Some(Type::Tuple(ts.clone())),
            Type::Hierarchy(h) => Some(Type::Member(MemberType::of_hierarchy(h))),
            Type::Level(l) => Some(Type::Member(MemberType::of_level(l))),
            Type::Dimension(_) => Some(Type::Member(MemberType::unknown())),
            _ => None,
        }
    }

    /// Collect every hierarchy this type touches, for the axis
    /// consistency check.
    pub fn hierarchies(&self, out: &mut Vec<Arc<Hierarchy>>) {
        match self {
            Type::Set(inner) => inner.hierarchies(out),
            Type::Tuple(ts) => {
                for t in ts {
                    t.hierarchies(out);
                }
            }
            Type::Member(m) => {
                if let Some(h) = &m.hierarchy {
                    out.push(Arc::clone(h));
                }
            }
            Type::Hierarchy(h) => out.push(Arc::clone(h)),
            Type::Level(l) => out.push(Arc::clone(l.hierarchy())),
            _ => {}
        }
    }

    /// The MDX designator used when rendering a parameter of this type.
    pub fn designator(&self) -> String {
        match self {
            Type::Boolean => "LOGICAL".into(),
            Type::Numeric => "NUMERIC".into(),
            Type::String => "STRING".into(),
            Type::Symbol => "SYMBOL".into(),
            Type::Null => "NULL".into(),
            Type::Scalar => "VALUE".into(),
            Type::Cube(c) => c.unique_name().into(),
            Type::Dimension(d) => d.unique_name().into(),
            Type::Hierarchy(h) => h.unique_name().into(),
            Type::Level(l) => l.unique_name().into(),
            Type::Member(m) => match &m.hierarchy {
                Some(h) => h.unique_name().into(),
                None => "MEMBER".into(),
            },
            Type::Tuple(_) => "TUPLE".into(),
            Type::Set(_) => "SET".into(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("BOOLEAN"),
            Type::Numeric => f.write_str("NUMERIC"),
            Type::String => f.write_str("STRING"),
            Type::Symbol => f.write_str("SYMBOL"),
            Type::Null => f.write_str("NULL"),
            Type::Scalar => f.write_str("SCALAR"),
            Type::Cube(c) => write!(f, "CUBE<{}>", c.unique_name()),
            Type::Dimension(d) => write!(f, "DIMENSION<{}>", d.unique_name()),
            Type::Hierarchy(h) => write!(f, "HIERARCHY<{}>", h.unique_name()),
            Type::Level(l) => write!(f, "LEVEL<{}>", l.unique_name()),
            Type::Member(m) => match &m.hierarchy {
                Some(h) => write!(f, "MEMBER<{}>", h.unique_name()),
                None => f.write_str("MEMBER"),
            },
            Type::Tuple(ts) => {
                f.write_str("TUPLE<")?;
                for (i, t) in ts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(">")
            }
            Type::Set(inner) => write!(f, "SET<{}>", inner),
        }
    }
}
