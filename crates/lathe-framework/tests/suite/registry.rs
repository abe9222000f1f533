use std::sync::{Arc, Mutex};

use lathe_config::TransformConfig;
use lathe_core::{NodeId, LATHE_INTERNAL, LATHE_USAGE};
use lathe_framework::{
    AnnotationHandler, AnnotationValues, Diagnostics, HandlerContext, HandlerError,
    HandlerRegistry, Phase, Transformer,
};
use lathe_tree::{AnnotationDecl, Ast, AstBuilder, FieldDecl, NodeKind, TreeMaker, TypeDecl, TypeRef};
use pretty_assertions::assert_eq;

type Log = Arc<Mutex<Vec<(Phase, String, NodeId)>>>;

struct Recording {
    names: &'static [&'static str],
    phase: Phase,
    log: Log,
}

impl AnnotationHandler for Recording {
    fn annotation_names(&self) -> &'static [&'static str] {
        self.names
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        self.log
            .lock()
            .unwrap()
            .push((self.phase, values.name().to_string(), ctx.annotation()));
        Ok(())
    }
}

/// Adds a copy of its own annotation to the target every time it runs.
struct Duplicating;

impl AnnotationHandler for Duplicating {
    fn annotation_names(&self) -> &'static [&'static str] {
        &["test.Echo"]
    }

    fn phase(&self) -> Phase {
        Phase::Parse
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        _values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        let target = ctx
            .target()
            .ok_or_else(|| HandlerError::internal("annotation without target"))?;
        let annotation = ctx.annotation();
        let copy = TreeMaker::new(ctx.ast, annotation).marker("Echo");
        ctx.ast.attach_annotation(target, copy)?;
        Ok(())
    }
}

struct Failing;

impl AnnotationHandler for Failing {
    fn annotation_names(&self) -> &'static [&'static str] {
        &["test.Broken", "test.Misplaced"]
    }

    fn phase(&self) -> Phase {
        Phase::Bodies
    }

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError> {
        if values.simple_name() == "Misplaced" {
            ctx.add_warning(LATHE_USAGE, "about to fail");
            return Err(HandlerError::usage("@Misplaced is legal only on fields."));
        }
        Err(HandlerError::internal("statement list vanished"))
    }
}

fn tree(annotations: &[&str]) -> (Ast, Vec<NodeId>) {
    let mut b = AstBuilder::new();
    let nodes: Vec<NodeId> = annotations
        .iter()
        .map(|name| b.annotation(AnnotationDecl::new(*name)))
        .collect();
    let field = b.field(FieldDecl::new("x", TypeRef::named("int")));
    let ty = b.class(TypeDecl::class("A"), nodes.clone(), vec![field]);
    b.compilation_unit(None, vec![ty]);
    (b.finish(), nodes)
}

#[test]
fn handlers_run_only_in_their_phase_for_matching_names() {
    let log: Log = Arc::default();
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(Recording {
        names: &["test.Late"],
        phase: Phase::Members,
        log: log.clone(),
    }));
    registry.register(Box::new(Recording {
        names: &["test.Early"],
        phase: Phase::Parse,
        log: log.clone(),
    }));

    let (mut ast, nodes) = tree(&["Late", "test.Early", "Unrelated", "other.Early"]);
    let transformer = Transformer::new(registry, TransformConfig::default());
    let diagnostics = transformer.run(&mut ast);

    assert!(diagnostics.is_empty());
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            (Phase::Parse, "test.Early".to_string(), nodes[1]),
            (Phase::Members, "Late".to_string(), nodes[0]),
        ]
    );
}

#[test]
fn supertypes_are_dispatched_before_their_subtypes() {
    let log: Log = Arc::default();
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(Recording {
        names: &["test.Mark"],
        phase: Phase::Members,
        log: log.clone(),
    }));

    // Declared leaf first: C extends B extends A.
    let mut b = AstBuilder::new();
    let on_c = b.annotation(AnnotationDecl::new("Mark"));
    let c = b.class(
        TypeDecl::class("C").extending(TypeRef::named("pkg.B")),
        vec![on_c],
        vec![],
    );
    let on_b = b.annotation(AnnotationDecl::new("Mark"));
    let inner_b = b.annotation(AnnotationDecl::new("Mark"));
    let field = b.field(FieldDecl::new("x", TypeRef::named("int")).annotated(vec![inner_b]));
    let bb = b.class(
        TypeDecl::class("B").extending(TypeRef::named("A")),
        vec![on_b],
        vec![field],
    );
    let on_a = b.annotation(AnnotationDecl::new("Mark"));
    let a = b.class(TypeDecl::class("A"), vec![on_a], vec![]);
    b.compilation_unit(None, vec![c, bb, a]);
    let mut ast = b.finish();

    let diagnostics = Transformer::new(registry, TransformConfig::default()).run(&mut ast);
    assert!(diagnostics.is_empty());
    let order: Vec<NodeId> = log.lock().unwrap().iter().map(|(_, _, n)| *n).collect();
    assert_eq!(order, vec![on_a, on_b, inner_b, on_c]);
}

#[test]
fn generated_annotations_are_not_redispatched() {
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(Duplicating));
    let transformer = Transformer::new(registry, TransformConfig::default());

    let (mut ast, nodes) = tree(&["Echo"]);
    let ty = ast.up(nodes[0]).unwrap();

    transformer.run(&mut ast);
    let annotations = |ast: &Ast| {
        ast.down(ty)
            .into_iter()
            .filter(|&n| ast.kind(n) == Some(NodeKind::Annotation))
            .count()
    };
    assert_eq!(annotations(&ast), 2);

    // A second run only sees the user-written occurrence again.
    transformer.run(&mut ast);
    assert_eq!(annotations(&ast), 3);
}

#[test]
fn handler_errors_become_diagnostics_on_the_annotation() {
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(Failing));
    let transformer = Transformer::new(registry, TransformConfig::default());

    let (mut ast, nodes) = tree(&["Misplaced", "Broken"]);
    let diagnostics: Diagnostics = transformer.run(&mut ast);
    let items = diagnostics.into_vec();

    assert_eq!(items.len(), 3);
    assert!(!items[0].is_error());
    assert_eq!(items[1].code, LATHE_USAGE);
    assert_eq!(items[1].message, "@Misplaced is legal only on fields.");
    assert_eq!(items[1].node, Some(nodes[0]));
    assert_eq!(items[1].span, Some(ast.span(nodes[0])));
    assert_eq!(items[2].code, LATHE_INTERNAL);
    assert_eq!(items[2].message, "internal bug: statement list vanished");
    assert_eq!(items[2].node, Some(nodes[1]));
}
