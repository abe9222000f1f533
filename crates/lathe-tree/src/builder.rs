use lathe_core::{Name, NodeId, Span};

use crate::ast::{
    AnnotationDecl, CompilationUnit, Element, Expr, FieldDecl, LocalDecl, MethodDecl, ParamDecl,
    Stmt, TypeDecl,
};
use crate::tree::{Ast, Origin};

const NODE_WIDTH: u32 = 8;

/// Builds user-written trees the way a host adapter lowers its native tree.
///
/// Each node receives a fresh span at an increasing offset; [`AstBuilder::finish`]
/// widens container spans to cover their children so spans nest the way
/// source ranges do.
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
    cursor: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        let span = Span::new(self.cursor, self.cursor + NODE_WIDTH);
        self.cursor += NODE_WIDTH + 2;
        self.ast.alloc(element, span, Origin::User)
    }

    pub fn annotation(&mut self, decl: AnnotationDecl) -> NodeId {
        self.alloc(Element::Annotation(decl))
    }

    pub fn field(&mut self, decl: FieldDecl) -> NodeId {
        self.alloc(Element::Field(decl))
    }

    pub fn param(&mut self, decl: ParamDecl) -> NodeId {
        self.alloc(Element::Argument(decl))
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

    pub fn case(&mut self, label: Option<Expr>) -> NodeId {
        self.stmt(Stmt::Case(label))
    }

    pub fn switch(&mut self, selector: Expr, body: Vec<NodeId>) -> NodeId {
        self.stmt(Stmt::Switch { selector, body })
    }

    pub fn class(&mut self, mut decl: TypeDecl, annotations: Vec<NodeId>, members: Vec<NodeId>) -> NodeId {
        decl.annotations = annotations;
        decl.members = members;
        self.alloc(Element::Type(decl))
    }

    pub fn method(&mut self, mut decl: MethodDecl, params: Vec<NodeId>, body: Vec<NodeId>) -> NodeId {
        decl.params = params;
        decl.body = Some(body);
        self.alloc(Element::Method(decl))
    }

    pub fn compilation_unit(&mut self, package: Option<&str>, types: Vec<NodeId>) -> NodeId {
        self.alloc(Element::CompilationUnit(CompilationUnit {
            package: package.map(Name::from),
            imports: Vec::new(),
            types,
        }))
    }

    /// Direct access for shapes the helpers above do not cover.
    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    pub fn finish(mut self) -> Ast {
        let roots = self.ast.roots().to_vec();
        for root in roots {
            for node in self.ast.descendants(root).into_iter().rev() {
                let covered = self
                    .ast
                    .down(node)
                    .into_iter()
                    .fold(self.ast.span(node), |acc, child| acc.cover(self.ast.span(child)));
                if let Some(data) = self.ast.node_mut(node) {
                    data.span = covered;
                }
            }
        }
        self.ast
    }
}
