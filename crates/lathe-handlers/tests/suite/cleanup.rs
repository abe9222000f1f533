use lathe_core::{NodeId, Severity, Span, LATHE_SUSPICIOUS_ASSIGNMENT, LATHE_USAGE};
use lathe_tree::{
    render, AnnotationDecl, Ast, AstBuilder, Expr, LocalDecl, MethodDecl, ParamDecl, Stmt,
    TypeDecl, TypeRef,
};
use pretty_assertions::assert_eq;

use crate::suite::support::transform;

fn call(name: &str, var: &str) -> Expr {
    Expr::bare_call(name, vec![Expr::name(var)])
}

/// `@<annotation> <ty> <var> = open();`
fn resource(b: &mut AstBuilder, annotation: AnnotationDecl, ty: &str, var: &str) -> NodeId {
    let ann = b.annotation(annotation);
    b.local(
        LocalDecl::new(var, TypeRef::named(ty))
            .annotated(vec![ann])
            .with_init(Expr::bare_call("open", vec![])),
    )
}

/// Wraps `body` in `void run() { ... }` inside `class Job`.
fn in_method(mut b: AstBuilder, body: Vec<NodeId>) -> (Ast, NodeId) {
    let method = b.method(MethodDecl::method("run", TypeRef::named("void")), vec![], body);
    let ty = b.class(TypeDecl::class("Job"), vec![], vec![method]);
    b.compilation_unit(None, vec![ty]);
    (b.finish(), method)
}

#[test]
fn default_close_is_guarded_by_a_closeable_check() {
    let mut b = AstBuilder::new();
    let local = resource(&mut b, AnnotationDecl::new("Cleanup"), "InputStream", "in");
    let read = b.expr_stmt(call("read", "in"));
    let more = b.expr_stmt(call("more", "in"));
    let (mut ast, method) = in_method(b, vec![local, read, more]);

    let diagnostics = transform(&mut ast);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let expected = "public void run() {
    @Cleanup InputStream in = open();
    try {
        read(in);
        more(in);
    } finally {
        if (in instanceof java.io.Closeable) {
            ((java.io.Closeable) in).close();
        }
    }
}";
    assert_eq!(render(&ast, method), expected);
}

#[test]
fn named_release_method_is_null_guarded() {
    let mut b = AstBuilder::new();
    let local = resource(
        &mut b,
        AnnotationDecl::new("lathe.Cleanup").arg("value", "dispose"),
        "Canvas",
        "canvas",
    );
    let draw = b.expr_stmt(call("draw", "canvas"));
    let (mut ast, method) = in_method(b, vec![local, draw]);

    assert!(transform(&mut ast).is_empty());

    let expected = r#"public void run() {
    @lathe.Cleanup("dispose") Canvas canvas = open();
    try {
        draw(canvas);
    } finally {
        if (java.util.Collections.singletonList(canvas).get(0) != null) {
            canvas.dispose();
        }
    }
}"#;
    assert_eq!(render(&ast, method), expected);
}

#[test]
fn explicit_close_uses_the_null_guard_too() {
    let mut b = AstBuilder::new();
    let local = resource(
        &mut b,
        AnnotationDecl::new("Cleanup").arg("value", "close"),
        "Channel",
        "ch",
    );
    let (mut ast, method) = in_method(b, vec![local]);

    assert!(transform(&mut ast).is_empty());
    let rendered = render(&ast, method);
    assert!(rendered.contains("if (java.util.Collections.singletonList(ch).get(0) != null) {"));
    assert!(!rendered.contains("instanceof"));
    // An empty tail still gets a try.
    assert!(rendered.contains("    try {} finally {"));
}

#[test]
fn quiet_release_swallows_io_exceptions() {
    let mut b = AstBuilder::new();
    let local = resource(
        &mut b,
        AnnotationDecl::new("Cleanup").arg("quietly", true),
        "InputStream",
        "in",
    );
    let read = b.expr_stmt(call("read", "in"));
    let (mut ast, method) = in_method(b, vec![local, read]);

    assert!(transform(&mut ast).is_empty());

    let expected = "public void run() {
    @Cleanup(quietly = true) InputStream in = open();
    try {
        read(in);
    } finally {
        if (in instanceof java.io.Closeable) {
            try {
                ((java.io.Closeable) in).close();
            } catch (final java.io.IOException $ex) {}
        }
    }
}";
    assert_eq!(render(&ast, method), expected);
}

#[test]
fn switch_scope_ends_at_the_next_case_label() {
    let mut b = AstBuilder::new();
    let first = b.case(Some(Expr::int(1)));
    let local = resource(&mut b, AnnotationDecl::new("Cleanup"), "Res", "r");
    let use_it = b.expr_stmt(call("use", "r"));
    let second = b.case(Some(Expr::int(2)));
    let other = b.expr_stmt(Expr::bare_call("other", vec![]));
    let switch = b.switch(Expr::name("k"), vec![first, local, use_it, second, other]);
    let (mut ast, _) = in_method(b, vec![switch]);

    assert!(transform(&mut ast).is_empty());

    let expected = "switch (k) {
    case 1:
        @Cleanup Res r = open();
        try {
            use(r);
        } finally {
            if (r instanceof java.io.Closeable) {
                ((java.io.Closeable) r).close();
            }
        }
    case 2:
        other();
}";
    assert_eq!(render(&ast, switch), expected);

    let Some(Stmt::Switch { body, .. }) = ast.as_stmt(switch) else {
        panic!("switch vanished");
    };
    assert_eq!(body.len(), 5);
    assert_eq!(body[3], second);
    assert_eq!(body[4], other);
}

#[test]
fn generated_try_spans_the_wrapped_statements() {
    let mut b = AstBuilder::new();
    let local = resource(&mut b, AnnotationDecl::new("Cleanup"), "Res", "r");
    let a = b.expr_stmt(call("a", "r"));
    let last = b.expr_stmt(call("b", "r"));
    let (mut ast, method) = in_method(b, vec![local, a, last]);
    let (decl_end, last_end, method_end) = (
        ast.span(local).end,
        ast.span(last).end,
        ast.span(method).end,
    );

    transform(&mut ast);

    let body = ast.as_method(method).unwrap().body.clone().unwrap();
    assert_eq!(body.len(), 2);
    let try_stmt = body[1];
    assert_eq!(ast.span(try_stmt), Span::new(decl_end, last_end));
    let Some(Stmt::Try {
        body: block,
        finally: Some(finally),
        ..
    }) = ast.as_stmt(try_stmt)
    else {
        panic!("expected try/finally");
    };
    assert_eq!(ast.sequence(*block).unwrap(), &[a, last]);
    assert_eq!(ast.direct_up(a), Some(*block));
    assert_eq!(ast.span(*finally), Span::point(method_end));
}

#[test]
fn aliasing_and_reassignment_warn_but_still_generate() {
    let mut b = AstBuilder::new();
    let local = resource(&mut b, AnnotationDecl::new("Cleanup"), "Res", "r");
    let alias = b.local(
        LocalDecl::new("copy", TypeRef::named("Object"))
            .with_init(Expr::cast(TypeRef::named("Object"), Expr::name("r"))),
    );
    let reassign = b.expr_stmt(Expr::assign(Expr::name("r"), Expr::bare_call("open", vec![])));
    let (mut ast, method) = in_method(b, vec![local, alias, reassign]);

    let diagnostics = transform(&mut ast);
    let warnings: Vec<(Severity, &str, Option<NodeId>)> = diagnostics
        .with_code(LATHE_SUSPICIOUS_ASSIGNMENT)
        .map(|d| (d.severity, d.message.as_str(), d.node))
        .collect();
    assert_eq!(
        warnings,
        vec![
            (
                Severity::Warning,
                "You're assigning an auto-cleanup variable to something else. This is a bad idea.",
                Some(alias)
            ),
            (
                Severity::Warning,
                "You're reassigning an auto-cleanup variable. \
                 The value it was initialized with will not be cleaned up.",
                Some(reassign)
            ),
        ]
    );
    assert!(!diagnostics.has_errors());
    assert_eq!(ast.as_method(method).unwrap().body.as_ref().unwrap().len(), 2);
}

#[test]
fn misuse_is_reported_and_leaves_the_tree_alone() {
    let mut b = AstBuilder::new();

    let on_param = b.annotation(AnnotationDecl::new("Cleanup"));
    let param = b.param(ParamDecl::new("in", TypeRef::named("InputStream")).annotated(vec![on_param]));
    let with_param = b.method(
        MethodDecl::method("consume", TypeRef::named("void")),
        vec![param],
        vec![],
    );

    let uninit = b.annotation(AnnotationDecl::new("Cleanup"));
    let bare = b.local(LocalDecl::new("in", TypeRef::named("InputStream")).annotated(vec![uninit]));
    let with_bare = b.method(MethodDecl::method("open", TypeRef::named("void")), vec![], vec![bare]);

    let empty = b.annotation(AnnotationDecl::new("Cleanup").arg("value", ""));
    let named = b.local(
        LocalDecl::new("in", TypeRef::named("InputStream"))
            .annotated(vec![empty])
            .with_init(Expr::bare_call("open", vec![])),
    );
    let with_named = b.method(MethodDecl::method("name", TypeRef::named("void")), vec![], vec![named]);

    let branch_ann = b.annotation(AnnotationDecl::new("Cleanup"));
    let branch_local = b.local(
        LocalDecl::new("in", TypeRef::named("InputStream"))
            .annotated(vec![branch_ann])
            .with_init(Expr::bare_call("open", vec![])),
    );
    let branch = b.stmt(Stmt::If {
        cond: Expr::name("ready"),
        then: branch_local,
        otherwise: None,
    });
    let with_branch = b.method(MethodDecl::method("maybe", TypeRef::named("void")), vec![], vec![branch]);

    let ty = b.class(
        TypeDecl::class("Job"),
        vec![],
        vec![with_param, with_bare, with_named, with_branch],
    );
    b.compilation_unit(None, vec![ty]);
    let mut ast = b.finish();
    let before = render(&ast, ty);

    let diagnostics = transform(&mut ast);
    let errors: Vec<(&str, &str, Option<NodeId>)> = diagnostics
        .errors()
        .map(|d| (d.code, d.message.as_str(), d.node))
        .collect();
    assert_eq!(
        errors,
        vec![
            (
                LATHE_USAGE,
                "@Cleanup is legal only on local variable declarations.",
                Some(on_param)
            ),
            (
                LATHE_USAGE,
                "@Cleanup variable declarations need to be initialized.",
                Some(uninit)
            ),
            (LATHE_USAGE, "cleanupName cannot be the empty string.", Some(empty)),
            (
                LATHE_USAGE,
                "@Cleanup is legal only on a local variable declaration inside a block.",
                Some(branch_ann)
            ),
        ]
    );
    assert_eq!(render(&ast, ty), before);
}
