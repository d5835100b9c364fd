//! Resolved metadata entities and the catalog seam.
//!
//! Cubes, dimensions, hierarchies, levels, and members are owned by an
//! external catalog and treated as opaque here: the tree only needs their
//! stable `unique_name` strings and enough linkage to derive expression
//! types. They are shared immutably via `Arc` - a deep copy of a tree
//! shares them by design.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ident::{quote_mdx_name, Identifier};

/// A cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    name: String,
    unique_name: String,
}

impl Cube {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = quote_mdx_name(&name);
        Self { name, unique_name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }
}

/// A dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    unique_name: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = quote_mdx_name(&name);
        Self { name, unique_name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }
}

/// A hierarchy within a dimension.
///
/// A hierarchy named like its dimension shares the dimension's unique
/// name (the common single-hierarchy case); otherwise the unique name is
/// `[dim].[hierarchy]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    name: String,
    unique_name: String,
    dimension: Arc<Dimension>,
}

impl Hierarchy {
    pub fn new(dimension: &Arc<Dimension>, name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = if name == dimension.name() {
            dimension.unique_name().to_string()
        } else {
            format!("{}.{}", dimension.unique_name(), quote_mdx_name(&name))
        };
        Self {
            name,
            unique_name,
            dimension: Arc::clone(dimension),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn dimension(&self) -> &Arc<Dimension> {
        &self.dimension
    }
}

/// A level within a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    name: String,
    unique_name: String,
    hierarchy: Arc<Hierarchy>,
}

impl Level {
    pub fn new(hierarchy: &Arc<Hierarchy>, name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = format!("{}.{}", hierarchy.unique_name(), quote_mdx_name(&name));
        Self {
            name,
            unique_name,
            hierarchy: Arc::clone(hierarchy),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        &self.hierarchy
    }
}

/// A member of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    name: String,
    unique_name: String,
    level: Arc<Level>,
}

impl Member {
    /// A member directly under its hierarchy: `[hierarchy].[name]`.
    pub fn new(level: &Arc<Level>, name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = format!(
            "{}.{}",
            level.hierarchy().unique_name(),
            quote_mdx_name(&name)
        );
        Self {
            name,
            unique_name,
            level: Arc::clone(level),
        }
    }

    /// A member below another member: `[parent unique].[name]`.
    pub fn child_of(parent: &Arc<Member>, level: &Arc<Level>, name: impl Into<String>) -> Self {
        let name = name.into();
        let unique_name = format!("{}.{}", parent.unique_name(), quote_mdx_name(&name));
        Self {
            name,
            unique_name,
            level: Arc::clone(level),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        self.level.hierarchy()
    }
}

/// A resolved metadata object, as returned by a [`Catalog`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRef {
    Dimension(Arc<Dimension>),
    Hierarchy(Arc<Hierarchy>),
    Level(Arc<Level>),
    Member(Arc<Member>),
}

impl ResolvedRef {
    pub fn unique_name(&self) -> &str {
        match self {
            ResolvedRef::Dimension(d) => d.unique_name(),
            ResolvedRef::Hierarchy(h) => h.unique_name(),
            ResolvedRef::Level(l) => l.unique_name(),
            ResolvedRef::Member(m) => m.unique_name(),
        }
    }
}

/// The name-resolution seam to an external metadata provider.
///
/// Validation resolves identifier placeholders through this trait; the
/// catalog owns the actual resolution logic. Lookups are by the rendered
/// identifier text, matched against stable unique names.
pub trait Catalog {
    /// Look up a cube by name or unique name.
    fn cube(&self, name: &str) -> Option<Arc<Cube>>;

    /// Resolve an identifier against a cube's metadata.
    fn resolve(&self, cube: &Cube, ident: &Identifier) -> Option<ResolvedRef>;
}

/// A catalog over pre-registered objects, keyed by unique name.
///
/// The registry is constructed explicitly and passed in wherever
/// resolution is needed; there is no process-wide catalog state.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    cubes: HashMap<String, Arc<Cube>>,
    objects: HashMap<(String, String), ResolvedRef>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cube, addressable by both name and unique name.
    pub fn add_cube(&mut self, cube: Arc<Cube>) -> &mut Self {
        self.cubes.insert(cube.name().to_string(), Arc::clone(&cube));
        self.cubes
            .insert(cube.unique_name().to_string(), Arc::clone(&cube));
        self
    }

    /// Register a resolved object under a cube, keyed by its unique name.
    pub fn add(&mut self, cube: &Cube, object: ResolvedRef) -> &mut Self {
        self.objects.insert(
            (cube.name().to_string(), object.unique_name().to_string()),
            object,
        );
        self
    }

    pub fn add_dimension(&mut self, cube: &Cube, d: Arc<Dimension>) -> &mut Self {
        self.add(cube, ResolvedRef::Dimension(d))
    }

    pub fn add_hierarchy(&mut self, cube: &Cube, h: Arc<Hierarchy>) -> &mut Self {
        self.add(cube, ResolvedRef::Hierarchy(h))
    }

    pub fn add_level(&mut self, cube: &Cube, l: Arc<Level>) -> &mut Self {
        self.add(cube, ResolvedRef::Level(l))
    }

    pub fn add_member(&mut self, cube: &Cube, m: Arc<Member>) -> &mut Self {
        self.add(cube, ResolvedRef::Member(m))
    }
}

impl Catalog for StaticCatalog {
    fn cube(&self, name: &str) -> Option<Arc<Cube>> {
        self.cubes.get(name).cloned()
    }

    fn resolve(&self, cube: &Cube, ident: &Identifier) -> Option<ResolvedRef> {
        self.objects
            .get(&(cube.name().to_string(), ident.to_string()))
            .cloned()
    }
}
