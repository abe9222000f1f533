//! Executes generated relation accessors over a toy object model.
//!
//! Only the statement and expression shapes relation synthesis emits are
//! understood: returns, expression statements, `if` without `else`, field
//! assignment, bean-style getter/setter calls and `size()`/`get(i)` on lists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lathe_core::NodeId;
use lathe_handlers::contract::{OneToManyRelation, OneToOneRelation, ReferencedBy};
use lathe_tree::{Ast, BinaryOp, Expr, Literal, Stmt};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Long(i64),
    Object(Rc<RefCell<Object>>),
    List(Vec<Value>),
}

#[derive(Debug, Default, PartialEq)]
pub struct Object {
    pub fields: HashMap<String, Value>,
}

impl Value {
    pub fn object(fields: &[(&str, Value)]) -> Self {
        Value::Object(Rc::new(RefCell::new(Object {
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        })))
    }

    pub fn get(&self, field: &str) -> Value {
        match self {
            Value::Object(object) => object
                .borrow()
                .fields
                .get(field)
                .cloned()
                .unwrap_or(Value::Null),
            other => panic!("field `{field}` read from {other:?}"),
        }
    }

    fn set(&self, field: &str, value: Value) {
        match self {
            Value::Object(object) => {
                object.borrow_mut().fields.insert(field.to_string(), value);
            }
            other => panic!("field `{field}` written on {other:?}"),
        }
    }

    fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            Value::Null => None,
            other => panic!("expected a key, got {other:?}"),
        }
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The anonymous class held by a generated relation accessor field.
pub struct Accessor<'a> {
    ast: &'a Ast,
    methods: HashMap<String, NodeId>,
}

impl<'a> Accessor<'a> {
    /// Finds the accessor field `name` on type `ty`.
    pub fn find(ast: &'a Ast, ty: NodeId, name: &str) -> Self {
        let field = ast
            .fields_of(ty)
            .into_iter()
            .filter_map(|f| ast.as_field(f))
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no accessor field `{name}`"));
        let Some(Expr::New {
            body: Some(body), ..
        }) = &field.init
        else {
            panic!("accessor `{name}` is not an anonymous class");
        };
        let methods = ast
            .methods_of(*body)
            .into_iter()
            .filter_map(|m| Some((ast.as_method(m)?.name.to_string(), m)))
            .collect();
        Self { ast, methods }
    }

    pub fn call(&self, method: &str, args: Vec<Value>) -> Value {
        let node = self.methods[method];
        let decl = self.ast.as_method(node).expect("method");
        let mut env: HashMap<String, Value> = decl
            .params
            .iter()
            .map(|&p| self.ast.as_param(p).expect("param").name.to_string())
            .zip(args)
            .collect();
        let body = decl.body.clone().unwrap_or_default();
        for stmt in body {
            if let Some(value) = self.exec(stmt, &mut env) {
                return value;
            }
        }
        Value::Null
    }

    fn exec(&self, stmt: NodeId, env: &mut HashMap<String, Value>) -> Option<Value> {
        match self.ast.as_stmt(stmt).expect("statement") {
            Stmt::Return(expr) => Some(expr.as_ref().map_or(Value::Null, |e| self.eval(e, env))),
            Stmt::Expr(expr) => {
                self.eval(expr, env);
                None
            }
            Stmt::If { cond, then, .. } => match self.eval(cond, env) {
                Value::Bool(true) => self.exec(*then, env),
                _ => None,
            },
            Stmt::Block(stmts) => stmts.iter().find_map(|&s| self.exec(s, env)),
            other => panic!("unsupported statement {other:?}"),
        }
    }

    fn eval(&self, expr: &Expr, env: &mut HashMap<String, Value>) -> Value {
        match expr {
            Expr::Name(name) => env.get(name.as_str()).cloned().unwrap_or(Value::Null),
            Expr::Literal(Literal::Int(v)) => Value::Long(*v),
            Expr::Literal(Literal::Null) => Value::Null,
            Expr::Field { receiver, name } => self.eval(receiver, env).get(name),
            Expr::Assign { target, value } => {
                let value = self.eval(value, env);
                match &**target {
                    Expr::Field { receiver, name } => self.eval(receiver, env).set(name, value.clone()),
                    Expr::Name(name) => {
                        env.insert(name.to_string(), value.clone());
                    }
                    other => panic!("unsupported assignment target {other:?}"),
                }
                value
            }
            Expr::Binary { op, lhs, rhs } => {
                let (lhs, rhs) = (self.eval(lhs, env), self.eval(rhs, env));
                match (op, lhs, rhs) {
                    (BinaryOp::Gt, Value::Long(a), Value::Long(b)) => Value::Bool(a > b),
                    (BinaryOp::Eq, a, b) => Value::Bool(a == b),
                    (BinaryOp::Ne, a, b) => Value::Bool(a != b),
                    (op, a, b) => panic!("unsupported {op:?} on {a:?}, {b:?}"),
                }
            }
            Expr::Call {
                receiver: Some(receiver),
                name,
                args,
            } => {
                let receiver = self.eval(receiver, env);
                let args: Vec<Value> = args.iter().map(|a| self.eval(a, env)).collect();
                match (&receiver, name.as_str()) {
                    (Value::List(items), "size") => Value::Long(items.len() as i64),
                    (Value::List(items), "get") => match args.as_slice() {
                        [Value::Long(i)] => items[*i as usize].clone(),
                        other => panic!("bad index {other:?}"),
                    },
                    (Value::Object(_), getter) if getter.starts_with("get") => {
                        receiver.get(&decapitalize(&getter[3..]))
                    }
                    (Value::Object(_), setter) if setter.starts_with("set") => {
                        let value = args.into_iter().next().unwrap_or(Value::Null);
                        receiver.set(&decapitalize(&setter[3..]), value);
                        Value::Null
                    }
                    _ => panic!("unsupported call {name} on {receiver:?}"),
                }
            }
            other => panic!("unsupported expression {other:?}"),
        }
    }
}

fn key(id: Option<i64>) -> Value {
    id.map_or(Value::Null, Value::Long)
}

impl ReferencedBy<Value> for Accessor<'_> {
    fn set_related_id(&self, item: &mut Value, id: Option<i64>) {
        self.call("setRelatedId", vec![item.clone(), key(id)]);
    }
}

impl OneToOneRelation<Value, Value> for Accessor<'_> {
    fn referenced_key(&self, base: &Value) -> Option<i64> {
        self.call("getReferencedKey", vec![base.clone()]).as_long()
    }

    fn set_referenced_object(&self, base: &mut Value, related: Value) {
        self.call("setReferencedObject", vec![base.clone(), related]);
    }
}

impl OneToManyRelation<Value, Value> for Accessor<'_> {
    fn referenced_key(&self, related: &Value) -> Option<i64> {
        self.call("getReferencedKey", vec![related.clone()]).as_long()
    }

    fn set_referenced_object(&self, base: &mut Value, related: Vec<Value>) {
        self.call("setReferencedObject", vec![base.clone(), Value::List(related)]);
    }
}
