use lathe_core::{Name, NodeId};
use lathe_tree::{AnnotationArg, AnnotationValue, Ast, Literal, Visibility};

/// Access level requested for generated members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Public,
    /// Treated as package-private; the host language has no module modifier
    /// on members.
    Module,
    Protected,
    Package,
    Private,
    /// Do not generate anything.
    None,
}

impl AccessLevel {
    /// Parses `PUBLIC`, `AccessLevel.PUBLIC` or any qualified form.
    pub fn parse(text: &str) -> Option<Self> {
        let last = text.rsplit('.').next().unwrap_or(text);
        Some(match last {
            "PUBLIC" => AccessLevel::Public,
            "MODULE" => AccessLevel::Module,
            "PROTECTED" => AccessLevel::Protected,
            "PACKAGE" => AccessLevel::Package,
            "PRIVATE" => AccessLevel::Private,
            "NONE" => AccessLevel::None,
            _ => return None,
        })
    }

    /// `None` for [`AccessLevel::None`].
    pub fn visibility(self) -> Option<Visibility> {
        match self {
            AccessLevel::Public => Some(Visibility::Public),
            AccessLevel::Protected => Some(Visibility::Protected),
            AccessLevel::Module | AccessLevel::Package => Some(Visibility::Package),
            AccessLevel::Private => Some(Visibility::Private),
            AccessLevel::None => None,
        }
    }
}

/// Read-only typed view over the parameters written on one annotation.
///
/// Accessors fall back to the supplied default when a parameter is absent or
/// written with a value of the wrong shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationValues {
    node: NodeId,
    name: Name,
    args: Vec<AnnotationArg>,
}

impl AnnotationValues {
    pub fn new(ast: &Ast, node: NodeId) -> Option<Self> {
        let decl = ast.as_annotation(node)?;
        Some(Self {
            node,
            name: decl.name.clone(),
            args: decl.args.clone(),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The annotation name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Whether the user wrote `param` rather than relying on its default.
    pub fn is_explicit(&self, param: &str) -> bool {
        self.args.iter().any(|a| a.name == param)
    }

    pub fn raw(&self, param: &str) -> Option<&AnnotationValue> {
        self.args.iter().find(|a| a.name == param).map(|a| &a.value)
    }

    pub fn string(&self, param: &str, default: &str) -> String {
        match self.raw(param) {
            Some(AnnotationValue::Literal(Literal::Str(value))) => value.clone(),
            _ => default.to_owned(),
        }
    }

    pub fn bool(&self, param: &str, default: bool) -> bool {
        match self.raw(param) {
            Some(AnnotationValue::Literal(Literal::Bool(value))) => *value,
            _ => default,
        }
    }

    /// An array of strings; a single string counts as a one-element array.
    pub fn string_list(&self, param: &str) -> Vec<String> {
        fn as_str(value: &AnnotationValue) -> Option<String> {
            match value {
                AnnotationValue::Literal(Literal::Str(s)) => Some(s.clone()),
                _ => None,
            }
        }

        match self.raw(param) {
            Some(AnnotationValue::Array(items)) => items.iter().filter_map(as_str).collect(),
            Some(value) => as_str(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn access_level(&self, param: &str, default: AccessLevel) -> AccessLevel {
        match self.raw(param) {
            Some(AnnotationValue::Name(name)) => AccessLevel::parse(name).unwrap_or(default),
            Some(AnnotationValue::Literal(Literal::Str(name))) => {
                AccessLevel::parse(name).unwrap_or(default)
            }
            _ => default,
        }
    }
}
