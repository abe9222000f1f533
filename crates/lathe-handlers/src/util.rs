//! Small tree helpers shared by the handlers.

use lathe_core::NodeId;
use lathe_tree::{Ast, Origin, TreeError, TreeMaker};

const NON_NULL: [&str; 2] = ["nonnull", "notnull"];
const NULLABLE: [&str; 2] = ["nullable", "checkfornull"];

/// Compiler-internal names (`$outer`, `$ex`, ...) are never touched by
/// generated code.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with('$')
}

fn annotations_matching(ast: &Ast, node: NodeId, simple_names: &[&str]) -> Vec<NodeId> {
    let Some(element) = ast.element(node) else {
        return Vec::new();
    };
    element
        .annotations()
        .iter()
        .copied()
        .filter(|&a| {
            ast.as_annotation(a).is_some_and(|decl| {
                let simple = decl.simple_name().to_ascii_lowercase();
                simple_names.contains(&simple.as_str())
            })
        })
        .collect()
}

/// `@NonNull`, `@NotNull` and friends, matched case-insensitively by simple
/// name so every vendor's flavour counts.
pub fn non_null_annotations(ast: &Ast, node: NodeId) -> Vec<NodeId> {
    annotations_matching(ast, node, &NON_NULL)
}

/// `@Nullable`, `@CheckForNull` and friends.
pub fn nullable_annotations(ast: &Ast, node: NodeId) -> Vec<NodeId> {
    annotations_matching(ast, node, &NULLABLE)
}

pub fn is_non_null(ast: &Ast, node: NodeId) -> bool {
    !non_null_annotations(ast, node).is_empty()
}

/// Generated copies of `annotations`, for carrying field markers over to
/// parameters.
pub(crate) fn copy_annotations(maker: &mut TreeMaker<'_>, annotations: &[NodeId]) -> Vec<NodeId> {
    let decls: Vec<_> = annotations
        .iter()
        .filter_map(|&a| maker.ast().as_annotation(a).cloned())
        .collect();
    decls.into_iter().map(|decl| maker.annotation(decl)).collect()
}

/// Splices `member` into the member list of type `ty`, first or last.
///
/// The caller commits with [`Ast::rebuild`] once all members are in.
pub(crate) fn inject_member(
    ast: &mut Ast,
    ty: NodeId,
    member: NodeId,
    at_start: bool,
) -> Result<(), TreeError> {
    let mut members = ast.type_decl(ty)?.members.clone();
    if at_start {
        members.insert(0, member);
    } else {
        members.push(member);
    }
    ast.replace_children(ty, members)
}

/// Whether a member of `ty` was already generated while handling `source`.
pub(crate) fn generated_by(ast: &Ast, ty: NodeId, source: NodeId) -> bool {
    ast.as_type(ty).is_some_and(|decl| {
        decl.members
            .iter()
            .any(|&m| ast.origin(m) == Some(Origin::Generated { by: source }))
    })
}
