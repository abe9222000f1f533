//! Arena-backed syntax tree for Lathe.
//!
//! A host front-end lowers its native tree into an [`Ast`]; handlers navigate
//! it through the node model on [`Ast`] (`kind`, `up`, `down`, ...), build new
//! subtrees with [`TreeMaker`] and commit them with
//! [`Ast::replace_children`] followed by [`Ast::rebuild`].

pub mod ast;
mod builder;
mod make;
mod render;
mod tree;

pub use ast::{
    AnnotationArg, AnnotationDecl, AnnotationValue, BinaryOp, CatchClause, CompilationUnit,
    Element, Expr, FieldDecl, Literal, LocalDecl, MethodDecl, MethodKind, Modifiers, NodeKind,
    ParamDecl, Stmt, TypeDecl, TypeFlavor, TypeParam, TypeRef, Visibility,
};
pub use builder::AstBuilder;
pub use make::TreeMaker;
pub use render::{render, render_expr};
pub use tree::{Ast, NodeData, Origin, RebuildHook, TreeError};
