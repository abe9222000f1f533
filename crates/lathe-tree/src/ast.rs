//! Payloads carried by tree nodes.
//!
//! Declarations and statements live in the arena and are addressed by
//! [`NodeId`]; expressions and type references are plain owned values inside
//! those payloads. The only arena nodes reachable from an expression are the
//! bodies of anonymous classes.

use lathe_core::{Name, NodeId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_transient: bool,
}

impl Modifiers {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Self::default()
        }
    }

    /// `final`, package visibility. The shape of every generated parameter.
    pub fn final_() -> Self {
        Self {
            is_final: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    #[must_use]
    pub fn with_transient(mut self) -> Self {
        self.is_transient = true;
        self
    }
}

const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

/// A (possibly qualified, possibly parameterized) type as written in source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: Name,
    pub args: Vec<TypeRef>,
    pub dims: u8,
}

impl TypeRef {
    pub fn named(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            dims: 0,
        }
    }

    pub fn generic(name: impl Into<Name>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
            dims: 0,
        }
    }

    #[must_use]
    pub fn array(mut self) -> Self {
        self.dims += 1;
        self
    }

    pub fn is_primitive(&self) -> bool {
        self.dims == 0 && PRIMITIVES.contains(&self.name.as_str())
    }

    /// Last segment of a qualified name: `java.util.List` -> `List`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    pub name: Name,
    pub bounds: Vec<TypeRef>,
}

impl TypeParam {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Lt,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Name(Name),
    This,
    Literal(Literal),
    Field {
        receiver: Box<Expr>,
        name: Name,
    },
    /// Method invocation. `super(...)` is a call without receiver named `super`.
    Call {
        receiver: Option<Box<Expr>>,
        name: Name,
        args: Vec<Expr>,
    },
    /// Instance creation; `body` is the `Type` node of an anonymous class.
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<NodeId>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    ArrayInit(Vec<Expr>),
}

impl Expr {
    pub fn name(name: impl Into<Name>) -> Self {
        Expr::Name(name.into())
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(value.into()))
    }

    /// `receiver.name`
    pub fn field(receiver: Expr, name: impl Into<Name>) -> Self {
        Expr::Field {
            receiver: Box::new(receiver),
            name: name.into(),
        }
    }

    /// `this.name`
    pub fn this_field(name: impl Into<Name>) -> Self {
        Expr::field(Expr::This, name)
    }

    /// `receiver.name(args)`
    pub fn call(receiver: Expr, name: impl Into<Name>, args: Vec<Expr>) -> Self {
        Expr::Call {
            receiver: Some(Box::new(receiver)),
            name: name.into(),
            args,
        }
    }

    /// Unqualified call, e.g. `super(a, b)`.
    pub fn bare_call(name: impl Into<Name>, args: Vec<Expr>) -> Self {
        Expr::Call {
            receiver: None,
            name: name.into(),
            args,
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn new_instance(ty: TypeRef, args: Vec<Expr>) -> Self {
        Expr::New {
            ty,
            args,
            body: None,
        }
    }

    pub fn instance_of(expr: Expr, ty: TypeRef) -> Self {
        Expr::InstanceOf {
            expr: Box::new(expr),
            ty,
        }
    }

    pub fn cast(ty: TypeRef, expr: Expr) -> Self {
        Expr::Cast {
            ty,
            expr: Box::new(expr),
        }
    }

    /// Arena nodes nested inside this expression (anonymous class bodies),
    /// in source order.
    pub fn nested_nodes(&self, out: &mut Vec<NodeId>) {
        match self {
            Expr::Name(_) | Expr::This | Expr::Literal(_) => {}
            Expr::Field { receiver, .. } => receiver.nested_nodes(out),
            Expr::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    receiver.nested_nodes(out);
                }
                for arg in args {
                    arg.nested_nodes(out);
                }
            }
            Expr::New { args, body, .. } => {
                for arg in args {
                    arg.nested_nodes(out);
                }
                out.extend(body.iter().copied());
            }
            Expr::Assign { target, value } => {
                target.nested_nodes(out);
                value.nested_nodes(out);
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.nested_nodes(out);
                rhs.nested_nodes(out);
            }
            Expr::InstanceOf { expr, .. } | Expr::Cast { expr, .. } => expr.nested_nodes(out),
            Expr::ArrayInit(items) => {
                for item in items {
                    item.nested_nodes(out);
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchClause {
    /// `Argument` node holding the caught exception variable.
    pub param: NodeId,
    /// `Statement` node holding a block.
    pub body: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    Throw(Expr),
    If {
        cond: Expr,
        then: NodeId,
        otherwise: Option<NodeId>,
    },
    Block(Vec<NodeId>),
    /// The body mixes `Case` labels and the statements of each arm.
    Switch {
        selector: Expr,
        body: Vec<NodeId>,
    },
    /// `case <expr>:`, or `default:` when `None`.
    Case(Option<Expr>),
    Try {
        body: NodeId,
        catches: Vec<CatchClause>,
        finally: Option<NodeId>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    Class,
    Enum,
    Interface,
    Annotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<Name>,
    pub imports: Vec<Name>,
    pub types: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    /// Empty for anonymous classes.
    pub name: Name,
    pub flavor: TypeFlavor,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<NodeId>,
}

impl TypeDecl {
    pub fn new(name: impl Into<Name>, flavor: TypeFlavor) -> Self {
        Self {
            name: name.into(),
            flavor,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn class(name: impl Into<Name>) -> Self {
        Self::new(name, TypeFlavor::Class)
    }

    #[must_use]
    pub fn extending(mut self, ty: TypeRef) -> Self {
        self.extends = Some(ty);
        self
    }

    #[must_use]
    pub fn with_type_params(mut self, params: Vec<TypeParam>) -> Self {
        self.type_params = params;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// The type as a reference from inside its own body: `Foo<T, U>`.
    pub fn self_type(&self) -> TypeRef {
        TypeRef::generic(
            self.name.clone(),
            self.type_params
                .iter()
                .map(|p| TypeRef::named(p.name.clone())),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
    pub init: Option<Expr>,
}

impl FieldDecl {
    #[must_use]
    pub fn annotated(mut self, annotations: Vec<NodeId>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::new(Visibility::Private),
            annotations: Vec::new(),
            init: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: Name,
    pub kind: MethodKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub params: Vec<NodeId>,
    /// `None` for abstract and native methods.
    pub body: Option<Vec<NodeId>>,
}

impl MethodDecl {
    pub fn method(name: impl Into<Name>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Method,
            modifiers: Modifiers::new(Visibility::Public),
            annotations: Vec::new(),
            type_params: Vec::new(),
            return_type: Some(return_type),
            params: Vec::new(),
            body: Some(Vec::new()),
        }
    }

    pub fn constructor(type_name: impl Into<Name>) -> Self {
        Self {
            name: type_name.into(),
            kind: MethodKind::Constructor,
            modifiers: Modifiers::new(Visibility::Public),
            annotations: Vec::new(),
            type_params: Vec::new(),
            return_type: None,
            params: Vec::new(),
            body: Some(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
}

impl ParamDecl {
    #[must_use]
    pub fn annotated(mut self, annotations: Vec<NodeId>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<NodeId>,
    pub init: Option<Expr>,
}

impl LocalDecl {
    #[must_use]
    pub fn annotated(mut self, annotations: Vec<NodeId>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn new(name: impl Into<Name>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            init: None,
        }
    }

    #[must_use]
    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    Literal(Literal),
    /// An enum constant or other name, e.g. `AccessLevel.PRIVATE`.
    Name(Name),
    Array(Vec<AnnotationValue>),
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::Literal(Literal::Str(value.to_string()))
    }
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        AnnotationValue::Literal(Literal::Bool(value))
    }
}

impl<const N: usize> From<[&str; N]> for AnnotationValue {
    fn from(values: [&str; N]) -> Self {
        AnnotationValue::Array(values.iter().map(|v| AnnotationValue::from(*v)).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationArg {
    pub name: Name,
    pub value: AnnotationValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationDecl {
    /// As written: simple (`Cleanup`) or qualified (`lombok.Cleanup`).
    pub name: Name,
    pub args: Vec<AnnotationArg>,
}

impl AnnotationDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, name: impl Into<Name>, value: impl Into<AnnotationValue>) -> Self {
        self.args.push(AnnotationArg {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Whether this occurrence refers to the annotation type `qualified`:
    /// a qualified occurrence must match exactly, a simple one by simple name.
    pub fn matches(&self, qualified: &str) -> bool {
        if self.name.contains('.') {
            return self.name == qualified;
        }
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);
        self.name == simple
    }

    pub fn value_of(&self, name: &str) -> Option<&AnnotationValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    CompilationUnit(CompilationUnit),
    Type(TypeDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Argument(ParamDecl),
    Local(LocalDecl),
    Annotation(AnnotationDecl),
    Statement(Stmt),
}

impl Element {
    pub fn kind(&self) -> NodeKind {
        match self {
            Element::CompilationUnit(_) => NodeKind::CompilationUnit,
            Element::Type(_) => NodeKind::Type,
            Element::Field(_) => NodeKind::Field,
            Element::Method(_) => NodeKind::Method,
            Element::Argument(_) => NodeKind::Argument,
            Element::Local(_) => NodeKind::LocalVariable,
            Element::Annotation(_) => NodeKind::Annotation,
            Element::Statement(_) => NodeKind::Statement,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            Element::CompilationUnit(cu) => out.extend(&cu.types),
            Element::Type(ty) => {
                out.extend(&ty.annotations);
                out.extend(&ty.members);
            }
            Element::Field(field) => {
                out.extend(&field.annotations);
                if let Some(init) = &field.init {
                    init.nested_nodes(&mut out);
                }
            }
            Element::Method(method) => {
                out.extend(&method.annotations);
                out.extend(&method.params);
                if let Some(body) = &method.body {
                    out.extend(body);
                }
            }
            Element::Argument(param) => out.extend(&param.annotations),
            Element::Local(local) => {
                out.extend(&local.annotations);
                if let Some(init) = &local.init {
                    init.nested_nodes(&mut out);
                }
            }
            Element::Annotation(_) => {}
            Element::Statement(stmt) => match stmt {
                Stmt::Expr(expr) | Stmt::Throw(expr) => expr.nested_nodes(&mut out),
                Stmt::Return(expr) => {
                    if let Some(expr) = expr {
                        expr.nested_nodes(&mut out);
                    }
                }
                Stmt::If {
                    cond,
                    then,
                    otherwise,
                } => {
                    cond.nested_nodes(&mut out);
                    out.push(*then);
                    out.extend(otherwise.iter().copied());
                }
                Stmt::Block(stmts) => out.extend(stmts),
                Stmt::Switch { selector, body } => {
                    selector.nested_nodes(&mut out);
                    out.extend(body);
                }
                Stmt::Case(_) => {}
                Stmt::Try {
                    body,
                    catches,
                    finally,
                } => {
                    out.push(*body);
                    for catch in catches {
                        out.push(catch.param);
                        out.push(catch.body);
                    }
                    out.extend(finally.iter().copied());
                }
            },
        }
        out
    }

    /// Annotations attached to a declaration; empty for other elements.
    pub fn annotations(&self) -> &[NodeId] {
        match self {
            Element::Type(ty) => &ty.annotations,
            Element::Field(field) => &field.annotations,
            Element::Method(method) => &method.annotations,
            Element::Argument(param) => &param.annotations,
            Element::Local(local) => &local.annotations,
            _ => &[],
        }
    }

    pub(crate) fn annotations_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Element::Type(ty) => Some(&mut ty.annotations),
            Element::Field(field) => Some(&mut field.annotations),
            Element::Method(method) => Some(&mut method.annotations),
            Element::Argument(param) => Some(&mut param.annotations),
            Element::Local(local) => Some(&mut local.annotations),
            _ => None,
        }
    }

    /// The single ordered child sequence `replace_children` operates on.
    pub fn sequence(&self) -> Option<&[NodeId]> {
        match self {
            Element::CompilationUnit(cu) => Some(&cu.types),
            Element::Type(ty) => Some(&ty.members),
            Element::Method(method) => method.body.as_deref(),
            Element::Statement(Stmt::Block(stmts)) => Some(stmts),
            Element::Statement(Stmt::Switch { body, .. }) => Some(body),
            _ => None,
        }
    }

    pub(crate) fn sequence_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Element::CompilationUnit(cu) => Some(&mut cu.types),
            Element::Type(ty) => Some(&mut ty.members),
            Element::Method(method) => Some(method.body.get_or_insert_with(Vec::new)),
            Element::Statement(Stmt::Block(stmts)) => Some(stmts),
            Element::Statement(Stmt::Switch { body, .. }) => Some(body),
            _ => None,
        }
    }

    /// Declared name of named declarations.
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Type(ty) => Some(&ty.name),
            Element::Field(field) => Some(&field.name),
            Element::Method(method) => Some(&method.name),
            Element::Argument(param) => Some(&param.name),
            Element::Local(local) => Some(&local.name),
            Element::Annotation(annotation) => Some(&annotation.name),
            Element::CompilationUnit(_) | Element::Statement(_) => None,
        }
    }
}

/// The node kinds exposed by the Node Model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompilationUnit,
    Type,
    Field,
    Method,
    Argument,
    LocalVariable,
    Annotation,
    /// Any non-declaration statement: blocks, switch, try, if, case labels, ...
    Statement,
}
