//! Factory for synthesized subtrees.
//!
//! Every node made through [`TreeMaker`] is tagged [`Origin::Generated`] and
//! positioned at the span of the node that caused it, so diagnostics on
//! generated code point at the triggering source.

use lathe_core::{NodeId, Span};

use crate::ast::{
    AnnotationDecl, CatchClause, Element, Expr, FieldDecl, LocalDecl, MethodDecl, Modifiers,
    ParamDecl, Stmt, TypeDecl, TypeRef,
};
use crate::tree::{Ast, Origin};

pub struct TreeMaker<'a> {
    ast: &'a mut Ast,
    by: NodeId,
    span: Span,
}

impl<'a> TreeMaker<'a> {
    /// Positions new nodes at the span of `source`.
    pub fn new(ast: &'a mut Ast, source: NodeId) -> Self {
        let span = ast.span(source);
        Self {
            ast,
            by: source,
            span,
        }
    }

    /// Positions subsequent nodes at `span` instead.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.span = span;
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn ast(&self) -> &Ast {
        self.ast
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        self.ast
            .alloc(element, self.span, Origin::Generated { by: self.by })
    }

    pub fn annotation(&mut self, decl: AnnotationDecl) -> NodeId {
        self.alloc(Element::Annotation(decl))
    }

    pub fn marker(&mut self, name: &str) -> NodeId {
        self.annotation(AnnotationDecl::new(name))
    }

    pub fn field(&mut self, decl: FieldDecl) -> NodeId {
        self.alloc(Element::Field(decl))
    }

    pub fn method(&mut self, decl: MethodDecl) -> NodeId {
        self.alloc(Element::Method(decl))
    }

    pub fn type_decl(&mut self, decl: TypeDecl) -> NodeId {
        self.alloc(Element::Type(decl))
    }

    /// A `final` parameter.
    pub fn param(&mut self, name: &str, ty: TypeRef, annotations: Vec<NodeId>) -> NodeId {
        self.alloc(Element::Argument(ParamDecl {
            name: name.into(),
            ty,
            modifiers: Modifiers::final_(),
            annotations,
        }))
    }

    pub fn local(&mut self, decl: LocalDecl) -> NodeId {
        self.alloc(Element::Local(decl))
    }

    pub fn stmt(&mut self, stmt: Stmt) -> NodeId {
        self.alloc(Element::Statement(stmt))
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> NodeId {
        self.stmt(Stmt::Expr(expr))
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.stmt(Stmt::Block(stmts))
    }

    pub fn ret(&mut self, expr: Expr) -> NodeId {
        self.stmt(Stmt::Return(Some(expr)))
    }

    pub fn throw(&mut self, expr: Expr) -> NodeId {
        self.stmt(Stmt::Throw(expr))
    }

    pub fn if_then(&mut self, cond: Expr, then: NodeId) -> NodeId {
        self.stmt(Stmt::If {
            cond,
            then,
            otherwise: None,
        })
    }

    pub fn try_stmt(&mut self, body: NodeId, catches: Vec<CatchClause>, finally: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::Try {
            body,
            catches,
            finally,
        })
    }
}
