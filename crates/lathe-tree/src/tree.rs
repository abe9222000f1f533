use std::collections::{HashMap, HashSet};

use lathe_core::{Name, NodeId, Span};

use crate::ast::{
    AnnotationDecl, Element, FieldDecl, LocalDecl, MethodDecl, NodeKind, ParamDecl, Stmt,
    TypeDecl,
};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("{node:?} ({kind:?}) has no replaceable child sequence")]
    NoChildSequence { node: NodeId, kind: NodeKind },
    #[error("expected {expected:?} at {node:?}, found {found:?}")]
    WrongKind {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
}

/// Provenance of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Written by the programmer (lowered from a host tree).
    User,
    /// Synthesized while handling the annotation (or declaration) `by`.
    Generated { by: NodeId },
}

/// Host callback invoked after [`Ast::rebuild`]; hosts drop binding caches and
/// symbol tables derived from the rebuilt subtree here.
pub trait RebuildHook {
    fn invalidated(&mut self, node: NodeId);
}

#[derive(Clone, Debug)]
pub struct NodeData {
    pub parent: Option<NodeId>,
    pub span: Span,
    pub origin: Origin,
    pub element: Element,
}

#[derive(Clone, Debug, Default)]
struct MemberIndex {
    fields: HashSet<Name>,
    methods: HashMap<Name, usize>,
}

impl MemberIndex {
    fn scan(ast: &Ast, ty: &TypeDecl) -> Self {
        let mut index = MemberIndex::default();
        for &member in &ty.members {
            match ast.element(member) {
                Some(Element::Field(field)) => {
                    index.fields.insert(field.name.clone());
                }
                Some(Element::Method(method)) => {
                    *index.methods.entry(method.name.clone()).or_default() += 1;
                }
                _ => {}
            }
        }
        index
    }
}

/// An arena of nodes forming one or more compilation units.
///
/// Children are allocated before their parents; allocating a container links
/// the parent pointers of everything it references.
#[derive(Default)]
pub struct Ast {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    member_index: HashMap<NodeId, MemberIndex>,
    revision: u64,
    hook: Option<Box<dyn RebuildHook>>,
}

impl std::fmt::Debug for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ast")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rebuild_hook(&mut self, hook: Box<dyn RebuildHook>) {
        self.hook = Some(hook);
    }

    pub fn alloc(&mut self, element: Element, span: Span, origin: Origin) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        let children = element.children();
        let is_root = matches!(element, Element::CompilationUnit(_));
        self.nodes.push(NodeData {
            parent: None,
            span,
            origin,
            element,
        });
        for child in children {
            if let Some(data) = self.nodes.get_mut(child.idx()) {
                data.parent = Some(id);
            }
        }
        if is_root {
            self.roots.push(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compilation units in allocation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.idx())
    }

    fn data_or_err(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.data(id).ok_or(TreeError::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(id.idx())
            .ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.idx())
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.data(id).map(|d| &d.element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.idx()).map(|d| &mut d.element)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.element(id).map(Element::kind)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.data(id).map(|d| d.span).unwrap_or_default()
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) -> Result<(), TreeError> {
        self.data_mut(id)?.span = span;
        Ok(())
    }

    pub fn origin(&self, id: NodeId) -> Option<Origin> {
        self.data(id).map(|d| d.origin)
    }

    pub fn is_generated(&self, id: NodeId) -> bool {
        matches!(self.origin(id), Some(Origin::Generated { .. }))
    }

    /// Raw parent, including statement wrappers.
    pub fn direct_up(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    /// Nearest declaration-level ancestor (statements are skipped).
    pub fn up(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.direct_up(id)?;
        while self.kind(current) == Some(NodeKind::Statement) {
            current = self.direct_up(current)?;
        }
        Some(current)
    }

    /// Direct children in source order. The returned vector is a snapshot, so
    /// the tree may be mutated while iterating it.
    pub fn down(&self, id: NodeId) -> Vec<NodeId> {
        self.element(id).map(Element::children).unwrap_or_default()
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = self.down(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Ancestors from the direct parent up to the compilation unit.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.direct_up(id), move |&n| self.direct_up(n))
    }

    /// Nearest strict ancestor of kind `Type`.
    pub fn enclosing_type(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&n| self.kind(n) == Some(NodeKind::Type))
    }

    /// A type declared inside an executable body or a field initializer
    /// (anonymous classes included) rather than directly in a compilation
    /// unit or another type's member list.
    pub fn is_local_type(&self, id: NodeId) -> bool {
        for ancestor in self.ancestors(id) {
            match self.kind(ancestor) {
                Some(NodeKind::Type | NodeKind::CompilationUnit) => return false,
                Some(NodeKind::Method | NodeKind::Field | NodeKind::LocalVariable) => {
                    return true
                }
                _ => {}
            }
        }
        false
    }

    /// Index of `child` within its parent's replaceable child sequence.
    pub fn position_in_parent(&self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.direct_up(child)?;
        let seq = self.element(parent)?.sequence()?;
        seq.iter().position(|&n| n == child).map(|i| (parent, i))
    }

    pub fn sequence(&self, parent: NodeId) -> Result<&[NodeId], TreeError> {
        let data = self.data_or_err(parent)?;
        data.element
            .sequence()
            .ok_or(TreeError::NoChildSequence {
                node: parent,
                kind: data.element.kind(),
            })
    }

    pub fn as_type(&self, id: NodeId) -> Option<&TypeDecl> {
        match self.element(id)? {
            Element::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_field(&self, id: NodeId) -> Option<&FieldDecl> {
        match self.element(id)? {
            Element::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_method(&self, id: NodeId) -> Option<&MethodDecl> {
        match self.element(id)? {
            Element::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_param(&self, id: NodeId) -> Option<&ParamDecl> {
        match self.element(id)? {
            Element::Argument(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_local(&self, id: NodeId) -> Option<&LocalDecl> {
        match self.element(id)? {
            Element::Local(local) => Some(local),
            _ => None,
        }
    }

    pub fn as_annotation(&self, id: NodeId) -> Option<&AnnotationDecl> {
        match self.element(id)? {
            Element::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    pub fn as_stmt(&self, id: NodeId) -> Option<&Stmt> {
        match self.element(id)? {
            Element::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn type_decl(&self, id: NodeId) -> Result<&TypeDecl, TreeError> {
        let data = self.data_or_err(id)?;
        match &data.element {
            Element::Type(ty) => Ok(ty),
            other => Err(TreeError::WrongKind {
                node: id,
                expected: NodeKind::Type,
                found: other.kind(),
            }),
        }
    }

    /// Fields declared directly in type `ty`, in declaration order.
    pub fn fields_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.as_type(ty)
            .map(|decl| {
                decl.members
                    .iter()
                    .copied()
                    .filter(|&m| self.kind(m) == Some(NodeKind::Field))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Methods and constructors declared directly in type `ty`.
    pub fn methods_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.as_type(ty)
            .map(|decl| {
                decl.members
                    .iter()
                    .copied()
                    .filter(|&m| self.kind(m) == Some(NodeKind::Method))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn field_exists(&self, ty: NodeId, name: &str) -> bool {
        match self.member_index.get(&ty) {
            Some(index) => index.fields.contains(name),
            None => self
                .fields_of(ty)
                .into_iter()
                .any(|f| self.as_field(f).is_some_and(|f| f.name == name)),
        }
    }

    pub fn method_exists(&self, ty: NodeId, name: &str) -> bool {
        match self.member_index.get(&ty) {
            Some(index) => index.methods.contains_key(name),
            None => self
                .methods_of(ty)
                .into_iter()
                .any(|m| self.as_method(m).is_some_and(|m| m.name == name)),
        }
    }

    /// Replaces the whole ordered child sequence of `parent` in one step.
    ///
    /// New children are re-parented immediately; derived indices stay stale
    /// until [`Ast::rebuild`].
    pub fn replace_children(&mut self, parent: NodeId, seq: Vec<NodeId>) -> Result<(), TreeError> {
        for &child in &seq {
            self.data_or_err(child)?;
        }
        let data = self.data_mut(parent)?;
        let kind = data.element.kind();
        let slot = data
            .element
            .sequence_mut()
            .ok_or(TreeError::NoChildSequence { node: parent, kind })?;
        *slot = seq.clone();
        for child in seq {
            self.data_mut(child)?.parent = Some(parent);
        }
        self.member_index.remove(&parent);
        Ok(())
    }

    /// Appends `annotation` to the annotation list of declaration `target`.
    pub fn attach_annotation(&mut self, target: NodeId, annotation: NodeId) -> Result<(), TreeError> {
        self.data_or_err(annotation)?;
        let data = self.data_mut(target)?;
        let kind = data.element.kind();
        let list = data
            .element
            .annotations_mut()
            .ok_or(TreeError::NoChildSequence { node: target, kind })?;
        list.push(annotation);
        self.data_mut(annotation)?.parent = Some(target);
        Ok(())
    }

    /// Re-derives parent links and member indices for the subtree at `node`,
    /// then notifies the host. Calling it twice in a row is harmless.
    pub fn rebuild(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.data_or_err(node)?;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let children = self.down(current);
            for &child in &children {
                self.data_mut(child)?.parent = Some(current);
            }
            if let Some(ty) = self.as_type(current) {
                let index = MemberIndex::scan(self, ty);
                self.member_index.insert(current, index);
            }
            stack.extend(children);
        }
        self.revision += 1;
        tracing::trace!(?node, revision = self.revision, "rebuilt subtree");
        if let Some(hook) = self.hook.as_mut() {
            hook.invalidated(node);
        }
        Ok(())
    }
}
