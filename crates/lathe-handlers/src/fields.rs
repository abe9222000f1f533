use lathe_core::NodeId;
use lathe_tree::{Ast, FieldDecl};

use crate::util::{is_non_null, is_reserved};

/// Which fields a generated constructor takes as parameters.
///
/// Static fields and fields with a reserved (`$`) name are never selected.
/// Selection preserves declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every instance field that is not both `final` and initialized.
    All,
    /// Uninitialized fields that are `final` or marked non-null.
    Required,
    None,
    /// `of` lists the fields to take; otherwise every field not named in
    /// `exclude` (and not `transient`) is taken. `of` wins when both are set.
    Custom {
        of: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    },
}

impl FieldSelection {
    pub fn select(&self, ast: &Ast, ty: NodeId) -> Vec<NodeId> {
        ast.fields_of(ty)
            .into_iter()
            .filter(|&node| {
                ast.as_field(node)
                    .is_some_and(|field| self.accepts(ast, node, field))
            })
            .collect()
    }

    fn accepts(&self, ast: &Ast, node: NodeId, field: &FieldDecl) -> bool {
        if field.modifiers.is_static || is_reserved(&field.name) {
            return false;
        }
        let initialized = field.init.is_some();
        match self {
            FieldSelection::All => !(field.modifiers.is_final && initialized),
            FieldSelection::Required => {
                (field.modifiers.is_final || is_non_null(ast, node)) && !initialized
            }
            FieldSelection::None => false,
            FieldSelection::Custom { of: Some(of), .. } => {
                of.iter().any(|n| n.as_str() == field.name.as_str())
            }
            FieldSelection::Custom { of: None, exclude } => {
                !field.modifiers.is_transient
                    && !exclude
                        .iter()
                        .flatten()
                        .any(|n| n.as_str() == field.name.as_str())
            }
        }
    }
}

/// Indices into `names` of entries that match no field of `ty`.
///
/// With `skip_standard`, static and reserved fields count as missing too,
/// since no selection would ever take them.
pub fn nonexistent_fields(
    ast: &Ast,
    ty: NodeId,
    names: &[String],
    skip_standard: bool,
) -> Vec<usize> {
    let fields: Vec<&FieldDecl> = ast
        .fields_of(ty)
        .into_iter()
        .filter_map(|f| ast.as_field(f))
        .filter(|f| !skip_standard || !(f.modifiers.is_static || is_reserved(&f.name)))
        .collect();
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| !fields.iter().any(|f| f.name.as_str() == name.as_str()))
        .map(|(i, _)| i)
        .collect()
}
