//! Deterministic source rendering of subtrees.

use std::fmt::Write as _;

use lathe_core::NodeId;

use crate::ast::{
    AnnotationDecl, AnnotationValue, Element, Expr, Literal, MethodDecl, Modifiers, Stmt,
    TypeDecl, TypeFlavor, TypeParam, Visibility,
};
use crate::tree::Ast;

const INDENT: &str = "    ";

/// Renders `node` and everything below it as source text.
pub fn render(ast: &Ast, node: NodeId) -> String {
    let mut printer = Printer {
        ast,
        out: String::new(),
        indent: 0,
    };
    printer.print_node(node);
    printer.out
}

/// Renders a single expression.
pub fn render_expr(ast: &Ast, expr: &Expr) -> String {
    let mut printer = Printer {
        ast,
        out: String::new(),
        indent: 0,
    };
    printer.print_expr(expr);
    printer.out
}

struct Printer<'a> {
    ast: &'a Ast,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn print_node(&mut self, node: NodeId) {
        let Some(element) = self.ast.element(node) else {
            return;
        };
        match element {
            Element::CompilationUnit(cu) => {
                if let Some(package) = &cu.package {
                    let _ = writeln!(self.out, "package {package};");
                    self.newline();
                }
                for import in &cu.imports {
                    let _ = writeln!(self.out, "import {import};");
                }
                if !cu.imports.is_empty() {
                    self.newline();
                }
                for (i, &ty) in cu.types.iter().enumerate() {
                    if i > 0 {
                        self.newline();
                    }
                    self.print_node(ty);
                    self.newline();
                }
            }
            Element::Type(ty) => self.print_type(ty),
            Element::Field(field) => {
                self.print_annotation_lines(&field.annotations);
                self.line_start();
                self.print_modifiers(&field.modifiers);
                let _ = write!(self.out, "{} {}", field.ty, field.name);
                if let Some(init) = &field.init {
                    self.out.push_str(" = ");
                    self.print_expr(init);
                }
                self.out.push(';');
            }
            Element::Method(method) => self.print_method(method),
            Element::Argument(param) => {
                self.print_annotations_inline(&param.annotations);
                self.print_modifiers(&param.modifiers);
                let _ = write!(self.out, "{} {}", param.ty, param.name);
            }
            Element::Local(local) => {
                self.line_start();
                self.print_local(node);
            }
            Element::Annotation(annotation) => self.print_annotation(annotation),
            Element::Statement(stmt) => {
                self.line_start();
                self.print_stmt(stmt);
            }
        }
    }

    fn print_local(&mut self, node: NodeId) {
        let Some(local) = self.ast.as_local(node) else {
            return;
        };
        self.print_annotations_inline(&local.annotations);
        self.print_modifiers(&local.modifiers);
        let _ = write!(self.out, "{} {}", local.ty, local.name);
        if let Some(init) = &local.init {
            self.out.push_str(" = ");
            self.print_expr(init);
        }
        self.out.push(';');
    }

    fn print_type(&mut self, ty: &TypeDecl) {
        self.print_annotation_lines(&ty.annotations);
        self.line_start();
        self.print_modifiers(&ty.modifiers);
        let keyword = match ty.flavor {
            TypeFlavor::Class => "class",
            TypeFlavor::Enum => "enum",
            TypeFlavor::Interface => "interface",
            TypeFlavor::Annotation => "@interface",
        };
        let _ = write!(self.out, "{keyword} {}", ty.name);
        self.print_type_params(&ty.type_params, false);
        if let Some(extends) = &ty.extends {
            let _ = write!(self.out, " extends {extends}");
        }
        if !ty.implements.is_empty() {
            self.out.push_str(" implements ");
            self.print_comma_separated(ty.implements.iter().map(ToString::to_string));
        }
        self.out.push(' ');
        self.print_type_body(&ty.members);
    }

    fn print_type_body(&mut self, members: &[NodeId]) {
        if members.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.newline();
        self.indent += 1;
        for &member in members {
            self.print_node(member);
            self.newline();
        }
        self.indent -= 1;
        self.line_start();
        self.out.push('}');
    }

    fn print_method(&mut self, method: &MethodDecl) {
        self.print_annotation_lines(&method.annotations);
        self.line_start();
        self.print_modifiers(&method.modifiers);
        if !method.type_params.is_empty() {
            self.print_type_params(&method.type_params, true);
        }
        if let Some(ret) = &method.return_type {
            let _ = write!(self.out, "{ret} ");
        }
        let _ = write!(self.out, "{}(", method.name);
        for (i, &param) in method.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_node(param);
        }
        self.out.push(')');
        match &method.body {
            Some(body) => {
                self.out.push(' ');
                self.print_block(body);
            }
            None => self.out.push(';'),
        }
    }

    fn print_block(&mut self, stmts: &[NodeId]) {
        if stmts.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.newline();
        self.indent += 1;
        for &stmt in stmts {
            self.print_node(stmt);
            self.newline();
        }
        self.indent -= 1;
        self.line_start();
        self.out.push('}');
    }

    /// Prints a nested statement (if/try branch) without its own indentation.
    fn print_inline(&mut self, node: NodeId) {
        match self.ast.element(node) {
            Some(Element::Statement(stmt)) => self.print_stmt(stmt),
            Some(Element::Local(_)) => self.print_local(node),
            _ => self.print_node(node),
        }
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.print_expr(expr);
                self.out.push(';');
            }
            Stmt::Return(expr) => {
                self.out.push_str("return");
                if let Some(expr) = expr {
                    self.out.push(' ');
                    self.print_expr(expr);
                }
                self.out.push(';');
            }
            Stmt::Throw(expr) => {
                self.out.push_str("throw ");
                self.print_expr(expr);
                self.out.push(';');
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.out.push_str("if (");
                self.print_expr(cond);
                self.out.push_str(") ");
                self.print_inline(*then);
                if let Some(otherwise) = otherwise {
                    self.out.push_str(" else ");
                    self.print_inline(*otherwise);
                }
            }
            Stmt::Block(stmts) => self.print_block(stmts),
            Stmt::Switch { selector, body } => {
                self.out.push_str("switch (");
                self.print_expr(selector);
                self.out.push_str(") {");
                self.newline();
                self.indent += 1;
                for &item in body {
                    let is_label = matches!(self.ast.as_stmt(item), Some(Stmt::Case(_)));
                    if !is_label {
                        self.indent += 1;
                    }
                    self.print_node(item);
                    self.newline();
                    if !is_label {
                        self.indent -= 1;
                    }
                }
                self.indent -= 1;
                self.line_start();
                self.out.push('}');
            }
            Stmt::Case(label) => match label {
                Some(expr) => {
                    self.out.push_str("case ");
                    self.print_expr(expr);
                    self.out.push(':');
                }
                None => self.out.push_str("default:"),
            },
            Stmt::Try {
                body,
                catches,
                finally,
            } => {
                self.out.push_str("try ");
                self.print_inline(*body);
                for catch in catches {
                    self.out.push_str(" catch (");
                    self.print_node(catch.param);
                    self.out.push_str(") ");
                    self.print_inline(catch.body);
                }
                if let Some(finally) = finally {
                    self.out.push_str(" finally ");
                    self.print_inline(*finally);
                }
            }
        }
    }

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => self.out.push_str(name),
            Expr::This => self.out.push_str("this"),
            Expr::Literal(literal) => self.print_literal(literal),
            Expr::Field { receiver, name } => {
                self.print_receiver(receiver);
                let _ = write!(self.out, ".{name}");
            }
            Expr::Call {
                receiver,
                name,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.print_receiver(receiver);
                    self.out.push('.');
                }
                let _ = write!(self.out, "{name}(");
                self.print_args(args);
                self.out.push(')');
            }
            Expr::New { ty, args, body } => {
                let _ = write!(self.out, "new {ty}(");
                self.print_args(args);
                self.out.push(')');
                if let Some(body) = body {
                    let members = self
                        .ast
                        .as_type(*body)
                        .map(|ty| ty.members.clone())
                        .unwrap_or_default();
                    self.out.push(' ');
                    self.print_type_body(&members);
                }
            }
            Expr::Assign { target, value } => {
                self.print_expr(target);
                self.out.push_str(" = ");
                self.print_expr(value);
            }
            Expr::Binary { op, lhs, rhs } => {
                self.print_expr(lhs);
                let _ = write!(self.out, " {} ", op.as_str());
                self.print_expr(rhs);
            }
            Expr::InstanceOf { expr, ty } => {
                self.print_expr(expr);
                let _ = write!(self.out, " instanceof {ty}");
            }
            Expr::Cast { ty, expr } => {
                let _ = write!(self.out, "({ty}) ");
                self.print_expr(expr);
            }
            Expr::ArrayInit(items) => {
                self.out.push('{');
                self.print_args(items);
                self.out.push('}');
            }
        }
    }

    fn print_receiver(&mut self, receiver: &Expr) {
        let wrap = matches!(
            receiver,
            Expr::Cast { .. } | Expr::Assign { .. } | Expr::Binary { .. } | Expr::InstanceOf { .. }
        );
        if wrap {
            self.out.push('(');
        }
        self.print_expr(receiver);
        if wrap {
            self.out.push(')');
        }
    }

    fn print_args(&mut self, args: &[Expr]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_expr(arg);
        }
    }

    fn print_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Null => self.out.push_str("null"),
            Literal::Bool(value) => {
                let _ = write!(self.out, "{value}");
            }
            Literal::Int(value) => {
                let _ = write!(self.out, "{value}");
            }
            Literal::Str(value) => {
                self.out.push('"');
                for ch in value.chars() {
                    match ch {
                        '"' => self.out.push_str("\\\""),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        other => self.out.push(other),
                    }
                }
                self.out.push('"');
            }
        }
    }

    fn print_annotation(&mut self, annotation: &AnnotationDecl) {
        let _ = write!(self.out, "@{}", annotation.name);
        match annotation.args.as_slice() {
            [] => {}
            [only] if only.name == "value" => {
                self.out.push('(');
                self.print_annotation_value(&only.value);
                self.out.push(')');
            }
            args => {
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = write!(self.out, "{} = ", arg.name);
                    self.print_annotation_value(&arg.value);
                }
                self.out.push(')');
            }
        }
    }

    fn print_annotation_value(&mut self, value: &AnnotationValue) {
        match value {
            AnnotationValue::Literal(literal) => self.print_literal(literal),
            AnnotationValue::Name(name) => self.out.push_str(name),
            AnnotationValue::Array(items) => {
                self.out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_annotation_value(item);
                }
                self.out.push('}');
            }
        }
    }

    fn print_annotation_lines(&mut self, annotations: &[NodeId]) {
        for &annotation in annotations {
            if let Some(decl) = self.ast.as_annotation(annotation) {
                self.line_start();
                self.print_annotation(decl);
                self.newline();
            }
        }
    }

    fn print_annotations_inline(&mut self, annotations: &[NodeId]) {
        for &annotation in annotations {
            if let Some(decl) = self.ast.as_annotation(annotation) {
                self.print_annotation(decl);
                self.out.push(' ');
            }
        }
    }

    fn print_modifiers(&mut self, modifiers: &Modifiers) {
        match modifiers.visibility {
            Visibility::Public => self.out.push_str("public "),
            Visibility::Protected => self.out.push_str("protected "),
            Visibility::Private => self.out.push_str("private "),
            Visibility::Package => {}
        }
        if modifiers.is_abstract {
            self.out.push_str("abstract ");
        }
        if modifiers.is_static {
            self.out.push_str("static ");
        }
        if modifiers.is_final {
            self.out.push_str("final ");
        }
        if modifiers.is_transient {
            self.out.push_str("transient ");
        }
    }

    fn print_type_params(&mut self, params: &[TypeParam], trailing_space: bool) {
        if params.is_empty() {
            return;
        }
        self.out.push('<');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name);
            if !param.bounds.is_empty() {
                self.out.push_str(" extends ");
                for (j, bound) in param.bounds.iter().enumerate() {
                    if j > 0 {
                        self.out.push_str(" & ");
                    }
                    let _ = write!(self.out, "{bound}");
                }
            }
        }
        self.out.push('>');
        if trailing_space {
            self.out.push(' ');
        }
    }

    fn print_comma_separated(&mut self, items: impl Iterator<Item = String>) {
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&item);
        }
    }
}
