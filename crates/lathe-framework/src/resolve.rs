//! Type resolution as seen by handlers.
//!
//! Resolution belongs to the host compiler; handlers only ask for the
//! constructor set of a supertype. [`SourceResolver`] answers from types
//! declared in the tree itself, [`MemoryResolver`] from a fixed table (library
//! types), and a pair of resolvers tries the first, then the second.

use std::collections::{BTreeMap, HashMap};

use lathe_core::{Name, NodeId};
use lathe_tree::{Ast, TypeDecl, TypeRef, Visibility};

/// One constructor parameter type as the resolver sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    Denotable(TypeRef),
    /// A type that cannot be written in source (captures, intersections).
    NonDenotable { description: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConstructor {
    pub visibility: Visibility,
    pub is_synthetic: bool,
    pub params: Vec<ParamType>,
}

impl ResolvedConstructor {
    pub fn new(visibility: Visibility, params: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            visibility,
            is_synthetic: false,
            params: params.into_iter().map(ParamType::Denotable).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedType {
    pub name: Name,
    pub constructors: Vec<ResolvedConstructor>,
}

pub trait TypeResolver {
    /// Resolves `ty` as written at `context`. `None` when the type is unknown.
    fn resolve(&self, ast: &Ast, context: NodeId, ty: &TypeRef) -> Option<ResolvedType>;
}

/// Resolves nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl TypeResolver for NoResolver {
    fn resolve(&self, _ast: &Ast, _context: NodeId, _ty: &TypeRef) -> Option<ResolvedType> {
        None
    }
}

impl<A: TypeResolver, B: TypeResolver> TypeResolver for (A, B) {
    fn resolve(&self, ast: &Ast, context: NodeId, ty: &TypeRef) -> Option<ResolvedType> {
        self.0
            .resolve(ast, context, ty)
            .or_else(|| self.1.resolve(ast, context, ty))
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Box<R> {
    fn resolve(&self, ast: &Ast, context: NodeId, ty: &TypeRef) -> Option<ResolvedType> {
        (**self).resolve(ast, context, ty)
    }
}

/// A fixed table of known types, keyed by qualified or simple name.
///
/// A simple name shared by several entries resolves to the first of them in
/// qualified-name order.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    types: BTreeMap<Name, ResolvedType>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ty: ResolvedType) {
        self.types.insert(ty.name.clone(), ty);
    }

    #[must_use]
    pub fn with(mut self, ty: ResolvedType) -> Self {
        self.insert(ty);
        self
    }
}

impl TypeResolver for MemoryResolver {
    fn resolve(&self, _ast: &Ast, _context: NodeId, ty: &TypeRef) -> Option<ResolvedType> {
        if let Some(found) = self.types.get(&ty.name) {
            return Some(found.clone());
        }
        let simple = ty.simple_name();
        self.types
            .values()
            .find(|known| known.name.rsplit('.').next() == Some(simple))
            .cloned()
    }
}

/// Resolves against named types declared anywhere in the tree.
///
/// Type arguments on the reference are substituted into constructor parameter
/// types, so `extends Box<String>` sees `Box(T value)` as `Box(String value)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceResolver;

impl SourceResolver {
    fn find<'a>(ast: &'a Ast, simple: &str) -> Option<(NodeId, &'a TypeDecl)> {
        ast.roots().iter().find_map(|&root| {
            ast.descendants(root).into_iter().find_map(|node| {
                let decl = ast.as_type(node)?;
                (!decl.is_anonymous() && decl.name == simple).then_some((node, decl))
            })
        })
    }
}

impl TypeResolver for SourceResolver {
    fn resolve(&self, ast: &Ast, _context: NodeId, ty: &TypeRef) -> Option<ResolvedType> {
        let (node, decl) = Self::find(ast, ty.simple_name())?;

        let substitutions: HashMap<&str, &TypeRef> = decl
            .type_params
            .iter()
            .map(|p| p.name.as_str())
            .zip(ty.args.iter())
            .collect();

        let mut constructors: Vec<ResolvedConstructor> = ast
            .methods_of(node)
            .into_iter()
            .filter_map(|m| ast.as_method(m))
            .filter(|m| m.is_constructor())
            .map(|ctor| ResolvedConstructor {
                visibility: ctor.modifiers.visibility,
                is_synthetic: false,
                params: ctor
                    .params
                    .iter()
                    .filter_map(|&p| ast.as_param(p))
                    .map(|p| ParamType::Denotable(substitute(&p.ty, &substitutions)))
                    .collect(),
            })
            .collect();

        if constructors.is_empty() {
            // The implicit default constructor takes the type's own access.
            constructors.push(ResolvedConstructor::new(decl.modifiers.visibility, []));
        }

        Some(ResolvedType {
            name: decl.name.clone(),
            constructors,
        })
    }
}

fn substitute(ty: &TypeRef, substitutions: &HashMap<&str, &TypeRef>) -> TypeRef {
    if ty.args.is_empty() {
        if let Some(&replacement) = substitutions.get(ty.name.as_str()) {
            let mut out = replacement.clone();
            out.dims += ty.dims;
            return out;
        }
    }
    TypeRef {
        name: ty.name.clone(),
        args: ty.args.iter().map(|a| substitute(a, substitutions)).collect(),
        dims: ty.dims,
    }
}
