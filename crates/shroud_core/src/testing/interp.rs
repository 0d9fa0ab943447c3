//! A small tree-walking evaluator for the script subset the tests build.
//!
//! It exists to compare a program's observable results before and after a
//! transform. Classes, generators, `new`, modules and accessors are not
//! supported and fail with [`InterpError::Unsupported`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::syntax::ast::*;
use crate::transform::edit::function_length;

#[derive(Debug, Error)]
pub enum InterpError {
    #[error("uncaught exception: {0:?}")]
    Thrown(Value),
    #[error("type error: {0}")]
    Type(String),
    #[error("reference error: {0} is not defined")]
    Reference(String),
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

pub type InterpResult<T> = Result<T, InterpError>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(Rc<RefCell<Object>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(o) => match o.borrow().kind {
                ObjectKind::Plain => f.write_str("[object Object]"),
                ObjectKind::Array(len) => write!(f, "[array; {len}]"),
                ObjectKind::Function(_) => f.write_str("[function]"),
            },
        }
    }
}

pub struct Object {
    props: BTreeMap<String, Value>,
    kind: ObjectKind,
}

enum ObjectKind {
    Plain,
    Array(usize),
    Function(Callable),
}

#[derive(Clone)]
enum Callable {
    Function(Rc<Function>, Env),
    Arrow(Rc<ArrowExpr>, Env),
    DefineProperty,
}

impl Callable {
    fn length(&self) -> usize {
        match self {
            Callable::Function(f, _) => function_length(&f.params),
            Callable::Arrow(a, _) => function_length(&a.params),
            Callable::DefineProperty => 3,
        }
    }
}

type Env = Rc<RefCell<Scope>>;

struct Scope {
    vars: HashMap<String, Value>,
    /// `None` for arrow and block scopes.
    this: Option<Value>,
    /// Receives `var` declarations.
    is_function: bool,
    parent: Option<Env>,
}

fn scope(parent: Option<&Env>, this: Option<Value>, is_function: bool) -> Env {
    Rc::new(RefCell::new(Scope {
        vars: HashMap::new(),
        this,
        is_function,
        parent: parent.cloned(),
    }))
}

fn new_object(kind: ObjectKind, props: BTreeMap<String, Value>) -> Value {
    Value::Object(Rc::new(RefCell::new(Object { props, kind })))
}

fn new_array(items: Vec<Value>) -> Value {
    let len = items.len();
    let props = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect();
    new_object(ObjectKind::Array(len), props)
}

enum Completion {
    Normal,
    Return(Value),
    Break(Option<String>),
    Continue(Option<String>),
}

enum Loop {
    Next,
    Exit,
    Leave(Completion),
}

fn loop_step(c: Completion, label: Option<&str>) -> Loop {
    match c {
        Completion::Normal | Completion::Continue(None) => Loop::Next,
        Completion::Continue(Some(l)) if label == Some(l.as_str()) => Loop::Next,
        Completion::Break(None) => Loop::Exit,
        Completion::Break(Some(l)) if label == Some(l.as_str()) => Loop::Exit,
        other => Loop::Leave(other),
    }
}

#[derive(Clone, Copy)]
enum Bind {
    Var,
    Lexical,
    Assign,
}

/// The evaluator and its global scope.
pub struct Interpreter {
    global: Env,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let global = scope(None, Some(Value::Undefined), true);
        let define = new_object(ObjectKind::Function(Callable::DefineProperty), BTreeMap::new());
        let object = new_object(
            ObjectKind::Plain,
            BTreeMap::from([("defineProperty".to_string(), define)]),
        );
        {
            let mut g = global.borrow_mut();
            g.vars.insert("Object".into(), object);
            g.vars.insert("undefined".into(), Value::Undefined);
            g.vars.insert("NaN".into(), Value::Number(f64::NAN));
            g.vars.insert("Infinity".into(), Value::Number(f64::INFINITY));
        }
        Self { global }
    }

    /// Runs a script's top-level statements.
    pub fn run(&mut self, program: &Program) -> InterpResult<()> {
        let mut stmts = Vec::new();
        for item in &program.body {
            match item {
                ProgramItem::Stmt(s) => stmts.push(s),
                ProgramItem::ModuleDecl(_) => return Err(InterpError::Unsupported("modules")),
            }
        }
        let env = self.global.clone();
        hoist_vars(stmts.iter().copied(), &env);
        declare_functions(stmts.iter().copied(), &env);
        for s in stmts {
            match self.exec(s, &env, None)? {
                Completion::Normal => {}
                _ => return Err(InterpError::Type("illegal top-level completion".into())),
            }
        }
        Ok(())
    }

    /// A global binding, if defined.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.global.borrow().vars.get(name).cloned()
    }

    /// Calls the global function `name` with an undefined receiver.
    pub fn call_global(&mut self, name: &str, args: Vec<Value>) -> InterpResult<Value> {
        let f = self
            .global(name)
            .ok_or_else(|| InterpError::Reference(name.to_string()))?;
        self.call(&f, args)
    }

    pub fn call(&mut self, f: &Value, args: Vec<Value>) -> InterpResult<Value> {
        self.call_value(f, Value::Undefined, args)
    }

    /// `target[key]`
    pub fn get_member(&self, target: &Value, key: &str) -> InterpResult<Value> {
        get_member(target, key)
    }

    // ── statements ──────────────────────────────────────────────────────────

    fn exec_block(&mut self, stmts: &[Stmt], env: &Env) -> InterpResult<Completion> {
        declare_functions(stmts.iter(), env);
        for s in stmts {
            let c = self.exec(s, env, None)?;
            if !matches!(c, Completion::Normal) {
                return Ok(c);
            }
        }
        Ok(Completion::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, env: &Env, label: Option<&str>) -> InterpResult<Completion> {
        match stmt {
            Stmt::Block(b) => {
                let inner = scope(Some(env), None, false);
                self.exec_block(&b.body, &inner)
            }
            Stmt::VarDecl(d) => {
                self.var_decl(d, env)?;
                Ok(Completion::Normal)
            }
            Stmt::FnDecl(_) | Stmt::Empty(_) | Stmt::Debugger(_) => Ok(Completion::Normal),
            Stmt::ClassDecl(_) => Err(InterpError::Unsupported("classes")),
            Stmt::With(_) => Err(InterpError::Unsupported("with")),
            Stmt::Expr(e) => {
                self.eval(&e.expr, env)?;
                Ok(Completion::Normal)
            }
            Stmt::If(s) => {
                if truthy(&self.eval(&s.test, env)?) {
                    self.exec(&s.consequent, env, None)
                } else if let Some(alt) = &s.alternate {
                    self.exec(alt, env, None)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Stmt::While(s) => {
                while truthy(&self.eval(&s.test, env)?) {
                    match loop_step(self.exec(&s.body, env, None)?, label) {
                        Loop::Next => {}
                        Loop::Exit => break,
                        Loop::Leave(c) => return Ok(c),
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::DoWhile(s) => {
                loop {
                    match loop_step(self.exec(&s.body, env, None)?, label) {
                        Loop::Next => {}
                        Loop::Exit => break,
                        Loop::Leave(c) => return Ok(c),
                    }
                    if !truthy(&self.eval(&s.test, env)?) {
                        break;
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::For(s) => {
                let inner = scope(Some(env), None, false);
                match &s.init {
                    Some(ForInit::VarDecl(d)) => self.var_decl(d, &inner)?,
                    Some(ForInit::Expr(e)) => {
                        self.eval(e, &inner)?;
                    }
                    None => {}
                }
                loop {
                    if let Some(test) = &s.test
                        && !truthy(&self.eval(test, &inner)?)
                    {
                        break;
                    }
                    match loop_step(self.exec(&s.body, &inner, None)?, label) {
                        Loop::Next => {}
                        Loop::Exit => break,
                        Loop::Leave(c) => return Ok(c),
                    }
                    if let Some(update) = &s.update {
                        self.eval(update, &inner)?;
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::ForIn(s) => {
                let keys = match self.eval(&s.right, env)? {
                    Value::Object(o) => o.borrow().props.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                let items = keys.into_iter().map(Value::String).collect();
                self.for_each(&s.left, items, &s.body, env, label)
            }
            Stmt::ForOf(s) => {
                let items = match self.eval(&s.right, env)? {
                    Value::String(st) => st.chars().map(|c| Value::String(c.to_string())).collect(),
                    v @ Value::Object(_) => array_items(&v)?,
                    _ => return Err(InterpError::Type("not iterable".into())),
                };
                self.for_each(&s.left, items, &s.body, env, label)
            }
            Stmt::Switch(s) => {
                let d = self.eval(&s.discriminant, env)?;
                let inner = scope(Some(env), None, false);
                let mut start = None;
                for (i, case) in s.cases.iter().enumerate() {
                    if let Some(test) = &case.test
                        && strict_equals(&d, &self.eval(test, &inner)?)
                    {
                        start = Some(i);
                        break;
                    }
                }
                let start = start.or_else(|| s.cases.iter().position(|c| c.test.is_none()));
                if let Some(start) = start {
                    for case in &s.cases[start..] {
                        match self.exec_block(&case.consequent, &inner)? {
                            Completion::Normal => {}
                            Completion::Break(None) => break,
                            other => return Ok(other),
                        }
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::Try(t) => {
                let result = self.exec(&Stmt::Block(t.block.clone()), env, None);
                let result = match (result, &t.handler) {
                    (Err(InterpError::Thrown(v)), Some(h)) => {
                        let inner = scope(Some(env), None, false);
                        if let Some(p) = &h.param {
                            self.bind(p, v, &inner, Bind::Lexical)?;
                        }
                        self.exec_block(&h.body.body, &inner)
                    }
                    (other, _) => other,
                };
                if let Some(f) = &t.finalizer {
                    let inner = scope(Some(env), None, false);
                    match self.exec_block(&f.body, &inner)? {
                        Completion::Normal => {}
                        other => return Ok(other),
                    }
                }
                result
            }
            Stmt::Return(r) => {
                let v = match &r.argument {
                    Some(e) => self.eval(e, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(v))
            }
            Stmt::Throw(t) => Err(InterpError::Thrown(self.eval(&t.argument, env)?)),
            Stmt::Break(b) => Ok(Completion::Break(b.label.as_ref().map(|l| l.name.clone()))),
            Stmt::Continue(c) => Ok(Completion::Continue(c.label.as_ref().map(|l| l.name.clone()))),
            Stmt::Labeled(l) => match self.exec(&l.body, env, Some(&l.label.name))? {
                Completion::Break(Some(name)) if name == l.label.name => Ok(Completion::Normal),
                other => Ok(other),
            },
        }
    }

    fn for_each(
        &mut self,
        left: &ForInOfLeft,
        items: Vec<Value>,
        body: &Stmt,
        env: &Env,
        label: Option<&str>,
    ) -> InterpResult<Completion> {
        for item in items {
            let inner = scope(Some(env), None, false);
            match left {
                ForInOfLeft::VarDecl(d) => {
                    let mode = if d.kind == VarKind::Var { Bind::Var } else { Bind::Lexical };
                    if let Some(decl) = d.declarators.first() {
                        self.bind(&decl.id, item, &inner, mode)?;
                    }
                }
                ForInOfLeft::Pat(p) => self.bind(p, item, &inner, Bind::Assign)?,
            }
            match loop_step(self.exec(body, &inner, None)?, label) {
                Loop::Next => {}
                Loop::Exit => break,
                Loop::Leave(c) => return Ok(c),
            }
        }
        Ok(Completion::Normal)
    }

    fn var_decl(&mut self, d: &VarDecl, env: &Env) -> InterpResult<()> {
        for decl in &d.declarators {
            let value = match &decl.init {
                Some(init) => self.eval(init, env)?,
                // `var x;` keeps the hoisted value.
                None if d.kind == VarKind::Var => continue,
                None => Value::Undefined,
            };
            let mode = if d.kind == VarKind::Var { Bind::Var } else { Bind::Lexical };
            self.bind(&decl.id, value, env, mode)?;
        }
        Ok(())
    }

    // ── patterns ────────────────────────────────────────────────────────────

    fn bind(&mut self, pat: &Pat, value: Value, env: &Env, mode: Bind) -> InterpResult<()> {
        match pat {
            Pat::Ident(i) => {
                match mode {
                    Bind::Var => declare_var(&i.name, value, env),
                    Bind::Lexical => {
                        env.borrow_mut().vars.insert(i.name.clone(), value);
                    }
                    Bind::Assign => assign_var(&i.name, value, env),
                }
                Ok(())
            }
            Pat::Expr(e) => match &**e {
                Expr::Ident(i) => {
                    assign_var(&i.name, value, env);
                    Ok(())
                }
                Expr::Member(m) => {
                    let target = self.eval(&m.object, env)?;
                    let key = self.member_key(&m.property, env)?;
                    set_member(&target, &key, value)
                }
                _ => Err(InterpError::Type("invalid assignment target".into())),
            },
            Pat::Array(a) => {
                let items = array_items(&value)?;
                for (i, el) in a.elements.iter().enumerate() {
                    match el {
                        Some(Pat::Rest(r)) => {
                            let rest = new_array(items.iter().skip(i).cloned().collect());
                            self.bind(&r.argument, rest, env, mode)?;
                        }
                        Some(p) => {
                            let v = items.get(i).cloned().unwrap_or(Value::Undefined);
                            self.bind(p, v, env, mode)?;
                        }
                        None => {}
                    }
                }
                Ok(())
            }
            Pat::Object(o) => {
                let mut used = Vec::new();
                for prop in &o.properties {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            let key = self.prop_key(&kv.key, env)?;
                            let v = get_member(&value, &key)?;
                            used.push(key);
                            self.bind(&kv.value, v, env, mode)?;
                        }
                        ObjectPatProp::Assign(ap) => {
                            let mut v = get_member(&value, &ap.key.name)?;
                            if v == Value::Undefined
                                && let Some(d) = &ap.value
                            {
                                v = self.eval(d, env)?;
                            }
                            used.push(ap.key.name.clone());
                            self.bind(&Pat::Ident(ap.key.clone()), v, env, mode)?;
                        }
                        ObjectPatProp::Rest(r) => {
                            let rest = match &value {
                                Value::Object(obj) => obj
                                    .borrow()
                                    .props
                                    .iter()
                                    .filter(|(k, _)| !used.contains(k))
                                    .map(|(k, v)| (k.clone(), v.clone()))
                                    .collect(),
                                _ => BTreeMap::new(),
                            };
                            self.bind(&r.argument, new_object(ObjectKind::Plain, rest), env, mode)?;
                        }
                    }
                }
                Ok(())
            }
            Pat::Assign(a) => {
                let v = if value == Value::Undefined {
                    self.eval(&a.right, env)?
                } else {
                    value
                };
                self.bind(&a.left, v, env, mode)
            }
            Pat::Rest(r) => self.bind(&r.argument, value, env, mode),
        }
    }

    // ── expressions ─────────────────────────────────────────────────────────

    fn eval(&mut self, expr: &Expr, env: &Env) -> InterpResult<Value> {
        Ok(match expr {
            Expr::Null(_) => Value::Null,
            Expr::Bool(b) => Value::Bool(b.value),
            Expr::Num(n) => Value::Number(n.value),
            Expr::Str(s) => Value::String(s.value.clone()),
            Expr::Template(t) => {
                let mut out = String::new();
                for (i, q) in t.quasis.iter().enumerate() {
                    out.push_str(q.cooked.as_deref().unwrap_or(&q.raw));
                    if let Some(e) = t.expressions.get(i) {
                        out.push_str(&to_string(&self.eval(e, env)?));
                    }
                }
                Value::String(out)
            }
            Expr::Ident(i) => lookup(&i.name, env)?,
            Expr::This(_) => lookup_this(env),
            Expr::Array(a) => {
                let mut items = Vec::new();
                for el in &a.elements {
                    match el {
                        Some(Expr::Spread(s)) => items.extend(array_items(&self.eval(&s.argument, env)?)?),
                        Some(e) => items.push(self.eval(e, env)?),
                        None => items.push(Value::Undefined),
                    }
                }
                new_array(items)
            }
            Expr::Object(o) => {
                let mut props = BTreeMap::new();
                for prop in &o.properties {
                    match prop {
                        ObjectProp::Prop(p) => {
                            let key = self.prop_key(&p.key, env)?;
                            let value = match &p.value {
                                PropValue::Value(e) => self.eval(e, env)?,
                                PropValue::Shorthand => lookup(&key, env)?,
                                PropValue::Method(f) => closure(f, env),
                                PropValue::Get(_) | PropValue::Set(_) => {
                                    return Err(InterpError::Unsupported("accessors"));
                                }
                            };
                            props.insert(key, value);
                        }
                        ObjectProp::Spread(s) => {
                            if let Value::Object(src) = self.eval(&s.argument, env)? {
                                for (k, v) in &src.borrow().props {
                                    props.insert(k.clone(), v.clone());
                                }
                            }
                        }
                    }
                }
                new_object(ObjectKind::Plain, props)
            }
            Expr::Fn(f) => {
                let Some(id) = &f.id else {
                    return Ok(closure(f, env));
                };
                let named = scope(Some(env), None, false);
                let value = closure(f, &named);
                named.borrow_mut().vars.insert(id.name.clone(), value.clone());
                value
            }
            Expr::Arrow(a) => new_object(
                ObjectKind::Function(Callable::Arrow(Rc::new((**a).clone()), env.clone())),
                BTreeMap::new(),
            ),
            Expr::Unary(u) => self.unary(u, env)?,
            Expr::Update(u) => {
                let old = to_number(&self.eval(&u.argument, env)?);
                let new = match u.op {
                    UpdateOp::Increment => old + 1.0,
                    UpdateOp::Decrement => old - 1.0,
                };
                self.write(&u.argument, Value::Number(new), env)?;
                Value::Number(if u.prefix { new } else { old })
            }
            Expr::Binary(b) => {
                let l = self.eval(&b.left, env)?;
                let r = self.eval(&b.right, env)?;
                binary_op(b.op, &l, &r)?
            }
            Expr::Logical(l) => {
                let left = self.eval(&l.left, env)?;
                let short = match l.op {
                    LogicalOp::And => !truthy(&left),
                    LogicalOp::Or => truthy(&left),
                    LogicalOp::NullishCoalesce => !matches!(left, Value::Undefined | Value::Null),
                };
                if short { left } else { self.eval(&l.right, env)? }
            }
            Expr::Conditional(c) => {
                if truthy(&self.eval(&c.test, env)?) {
                    self.eval(&c.consequent, env)?
                } else {
                    self.eval(&c.alternate, env)?
                }
            }
            Expr::Assign(a) => self.assign(a, env)?,
            Expr::Sequence(s) => {
                let mut last = Value::Undefined;
                for e in &s.expressions {
                    last = self.eval(e, env)?;
                }
                last
            }
            Expr::Member(m) => {
                let target = self.eval(&m.object, env)?;
                let key = self.member_key(&m.property, env)?;
                get_member(&target, &key)?
            }
            Expr::Call(c) => {
                let (f, this) = match &*c.callee {
                    Expr::Member(m) => {
                        let target = self.eval(&m.object, env)?;
                        let key = self.member_key(&m.property, env)?;
                        (get_member(&target, &key)?, target)
                    }
                    callee => (self.eval(callee, env)?, Value::Undefined),
                };
                let mut args = Vec::new();
                for a in &c.arguments {
                    match a {
                        Expr::Spread(s) => args.extend(array_items(&self.eval(&s.argument, env)?)?),
                        e => args.push(self.eval(e, env)?),
                    }
                }
                self.call_value(&f, this, args)?
            }
            Expr::Class(_) => return Err(InterpError::Unsupported("classes")),
            Expr::New(_) => return Err(InterpError::Unsupported("new")),
            _ => return Err(InterpError::Unsupported("expression")),
        })
    }

    fn unary(&mut self, u: &UnaryExpr, env: &Env) -> InterpResult<Value> {
        if u.op == UnaryOp::Typeof
            && let Expr::Ident(i) = &*u.argument
            && lookup(&i.name, env).is_err()
        {
            return Ok(Value::String("undefined".into()));
        }
        if u.op == UnaryOp::Delete {
            return match &*u.argument {
                Expr::Member(m) => {
                    let target = self.eval(&m.object, env)?;
                    let key = self.member_key(&m.property, env)?;
                    if let Value::Object(o) = target {
                        o.borrow_mut().props.remove(&key);
                    }
                    Ok(Value::Bool(true))
                }
                _ => Ok(Value::Bool(false)),
            };
        }
        let v = self.eval(&u.argument, env)?;
        Ok(match u.op {
            UnaryOp::Minus => Value::Number(-to_number(&v)),
            UnaryOp::Plus => Value::Number(to_number(&v)),
            UnaryOp::Not => Value::Bool(!truthy(&v)),
            UnaryOp::BitNot => Value::Number(f64::from(!to_int32(&v))),
            UnaryOp::Typeof => Value::String(type_of(&v).into()),
            UnaryOp::Void => Value::Undefined,
            UnaryOp::Delete => Value::Bool(false),
        })
    }

    fn assign(&mut self, a: &AssignExpr, env: &Env) -> InterpResult<Value> {
        if a.op == AssignOp::Assign {
            let v = self.eval(&a.right, env)?;
            self.bind(&a.left, v.clone(), env, Bind::Assign)?;
            return Ok(v);
        }
        let target = match &a.left {
            Pat::Ident(i) => Expr::Ident(i.clone()),
            Pat::Expr(e) => (**e).clone(),
            _ => return Err(InterpError::Type("invalid compound target".into())),
        };
        let current = self.eval(&target, env)?;
        let new = match a.op {
            AssignOp::LogicalAndAssign if !truthy(&current) => return Ok(current),
            AssignOp::LogicalOrAssign if truthy(&current) => return Ok(current),
            AssignOp::NullishAssign if !matches!(current, Value::Undefined | Value::Null) => {
                return Ok(current);
            }
            AssignOp::LogicalAndAssign | AssignOp::LogicalOrAssign | AssignOp::NullishAssign => {
                self.eval(&a.right, env)?
            }
            op => {
                let r = self.eval(&a.right, env)?;
                binary_op(compound_op(op), &current, &r)?
            }
        };
        self.write(&target, new.clone(), env)?;
        Ok(new)
    }

    fn write(&mut self, target: &Expr, value: Value, env: &Env) -> InterpResult<()> {
        match target {
            Expr::Ident(i) => {
                assign_var(&i.name, value, env);
                Ok(())
            }
            Expr::Member(m) => {
                let object = self.eval(&m.object, env)?;
                let key = self.member_key(&m.property, env)?;
                set_member(&object, &key, value)
            }
            _ => Err(InterpError::Type("invalid update target".into())),
        }
    }

    fn member_key(&mut self, prop: &MemberProp, env: &Env) -> InterpResult<String> {
        match prop {
            MemberProp::Ident(i) => Ok(i.name.clone()),
            MemberProp::Private(_) => Err(InterpError::Unsupported("private names")),
            MemberProp::Computed(e) => Ok(to_string(&self.eval(e, env)?)),
        }
    }

    fn prop_key(&mut self, key: &PropKey, env: &Env) -> InterpResult<String> {
        match key {
            PropKey::Ident(i) => Ok(i.name.clone()),
            PropKey::Str(s) => Ok(s.value.clone()),
            PropKey::Num(n) => Ok(number_to_string(n.value)),
            PropKey::Computed(e) => Ok(to_string(&self.eval(e, env)?)),
            PropKey::Private(_) => Err(InterpError::Unsupported("private names")),
        }
    }

    // ── calls ───────────────────────────────────────────────────────────────

    fn call_value(&mut self, f: &Value, this: Value, args: Vec<Value>) -> InterpResult<Value> {
        let callable = match f {
            Value::Object(o) => match &o.borrow().kind {
                ObjectKind::Function(c) => c.clone(),
                _ => return Err(InterpError::Type("not a function".into())),
            },
            other => return Err(InterpError::Type(format!("{other:?} is not a function"))),
        };
        match callable {
            Callable::DefineProperty => {
                let target = args.first().cloned().unwrap_or(Value::Undefined);
                let key = args.get(1).map(to_string).unwrap_or_default();
                let descriptor = args.get(2).cloned().unwrap_or(Value::Undefined);
                let value = get_member(&descriptor, "value")?;
                match &target {
                    Value::Object(o) => {
                        o.borrow_mut().props.insert(key, value);
                    }
                    _ => return Err(InterpError::Type("defineProperty on non-object".into())),
                }
                Ok(target)
            }
            Callable::Function(func, captured) => {
                let env = scope(Some(&captured), Some(this), true);
                self.bind_params(&func.params, args, &env)?;
                hoist_vars(func.body.body.iter(), &env);
                let c = self.exec_block(&func.body.body, &env)?;
                finish(c)
            }
            Callable::Arrow(arrow, captured) => {
                let env = scope(Some(&captured), None, true);
                self.bind_params(&arrow.params, args, &env)?;
                match &arrow.body {
                    ArrowBody::Block(b) => {
                        hoist_vars(b.body.iter(), &env);
                        let c = self.exec_block(&b.body, &env)?;
                        finish(c)
                    }
                    ArrowBody::Expr(e) => self.eval(e, &env),
                }
            }
        }
    }

    fn bind_params(&mut self, params: &[Param], args: Vec<Value>, env: &Env) -> InterpResult<()> {
        for (i, p) in params.iter().enumerate() {
            if let Pat::Rest(r) = &p.pat {
                let rest = new_array(args.iter().skip(i).cloned().collect());
                self.bind(&r.argument, rest, env, Bind::Var)?;
                break;
            }
            let mut v = args.get(i).cloned().unwrap_or(Value::Undefined);
            if v == Value::Undefined
                && let Some(d) = &p.default
            {
                v = self.eval(d, env)?;
            }
            self.bind(&p.pat, v, env, Bind::Var)?;
        }
        Ok(())
    }
}

// ── scopes ──────────────────────────────────────────────────────────────────

fn finish(c: Completion) -> InterpResult<Value> {
    match c {
        Completion::Return(v) => Ok(v),
        Completion::Normal => Ok(Value::Undefined),
        _ => Err(InterpError::Type("break or continue outside a loop".into())),
    }
}

fn closure(f: &Function, env: &Env) -> Value {
    new_object(
        ObjectKind::Function(Callable::Function(Rc::new(f.clone()), env.clone())),
        BTreeMap::new(),
    )
}

fn lookup(name: &str, env: &Env) -> InterpResult<Value> {
    let mut current = Some(env.clone());
    while let Some(s) = current {
        if let Some(v) = s.borrow().vars.get(name) {
            return Ok(v.clone());
        }
        current = s.borrow().parent.clone();
    }
    Err(InterpError::Reference(name.to_string()))
}

fn lookup_this(env: &Env) -> Value {
    let mut current = Some(env.clone());
    while let Some(s) = current {
        if let Some(this) = &s.borrow().this {
            return this.clone();
        }
        current = s.borrow().parent.clone();
    }
    Value::Undefined
}

fn assign_var(name: &str, value: Value, env: &Env) {
    let mut current = env.clone();
    loop {
        if let Some(slot) = current.borrow_mut().vars.get_mut(name) {
            *slot = value;
            return;
        }
        let parent = current.borrow().parent.clone();
        match parent {
            Some(p) => current = p,
            None => {
                current.borrow_mut().vars.insert(name.to_string(), value);
                return;
            }
        }
    }
}

fn function_scope(env: &Env) -> Env {
    let mut current = env.clone();
    loop {
        if current.borrow().is_function {
            return current;
        }
        let parent = current.borrow().parent.clone();
        match parent {
            Some(p) => current = p,
            None => return current,
        }
    }
}

fn declare_var(name: &str, value: Value, env: &Env) {
    function_scope(env).borrow_mut().vars.insert(name.to_string(), value);
}

fn declare_functions<'s>(stmts: impl IntoIterator<Item = &'s Stmt>, env: &Env) {
    for s in stmts {
        if let Stmt::FnDecl(f) = s
            && let Some(id) = &f.id
        {
            let value = closure(f, env);
            env.borrow_mut().vars.insert(id.name.clone(), value);
        }
    }
}

/// Declares every `var` under `stmts` (not inside nested functions) as
/// undefined unless already bound.
fn hoist_vars<'s>(stmts: impl IntoIterator<Item = &'s Stmt>, env: &Env) {
    fn names(pat: &Pat, out: &mut Vec<String>) {
        match pat {
            Pat::Ident(i) => out.push(i.name.clone()),
            Pat::Array(a) => a.elements.iter().flatten().for_each(|p| names(p, out)),
            Pat::Object(o) => {
                for p in &o.properties {
                    match p {
                        ObjectPatProp::KeyValue(kv) => names(&kv.value, out),
                        ObjectPatProp::Assign(ap) => out.push(ap.key.name.clone()),
                        ObjectPatProp::Rest(r) => names(&r.argument, out),
                    }
                }
            }
            Pat::Rest(r) => names(&r.argument, out),
            Pat::Assign(a) => names(&a.left, out),
            Pat::Expr(_) => {}
        }
    }
    fn visit(s: &Stmt, out: &mut Vec<String>) {
        let var_names = |d: &VarDecl, out: &mut Vec<String>| {
            if d.kind == VarKind::Var {
                d.declarators.iter().for_each(|decl| names(&decl.id, out));
            }
        };
        match s {
            Stmt::VarDecl(d) => var_names(d, out),
            Stmt::Block(b) => b.body.iter().for_each(|s| visit(s, out)),
            Stmt::If(i) => {
                visit(&i.consequent, out);
                if let Some(a) = &i.alternate {
                    visit(a, out);
                }
            }
            Stmt::For(f) => {
                if let Some(ForInit::VarDecl(d)) = &f.init {
                    var_names(d, out);
                }
                visit(&f.body, out);
            }
            Stmt::ForIn(f) => {
                if let ForInOfLeft::VarDecl(d) = &f.left {
                    var_names(d, out);
                }
                visit(&f.body, out);
            }
            Stmt::ForOf(f) => {
                if let ForInOfLeft::VarDecl(d) = &f.left {
                    var_names(d, out);
                }
                visit(&f.body, out);
            }
            Stmt::While(w) => visit(&w.body, out),
            Stmt::DoWhile(w) => visit(&w.body, out),
            Stmt::Labeled(l) => visit(&l.body, out),
            Stmt::Switch(s) => s.cases.iter().flat_map(|c| &c.consequent).for_each(|s| visit(s, out)),
            Stmt::Try(t) => {
                t.block.body.iter().for_each(|s| visit(s, out));
                if let Some(h) = &t.handler {
                    h.body.body.iter().for_each(|s| visit(s, out));
                }
                if let Some(f) = &t.finalizer {
                    f.body.iter().for_each(|s| visit(s, out));
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    for s in stmts {
        visit(s, &mut out);
    }
    let target = function_scope(env);
    let mut scope = target.borrow_mut();
    for name in out {
        scope.vars.entry(name).or_insert(Value::Undefined);
    }
}

// ── objects ─────────────────────────────────────────────────────────────────

fn array_index(key: &str) -> Option<usize> {
    let i: usize = key.parse().ok()?;
    (i.to_string() == key).then_some(i)
}

fn get_member(target: &Value, key: &str) -> InterpResult<Value> {
    match target {
        Value::Object(o) => {
            let o = o.borrow();
            if let Some(v) = o.props.get(key) {
                return Ok(v.clone());
            }
            Ok(match (&o.kind, key) {
                (ObjectKind::Array(len), "length") => Value::Number(*len as f64),
                (ObjectKind::Function(c), "length") => Value::Number(c.length() as f64),
                _ => Value::Undefined,
            })
        }
        Value::String(s) => Ok(match key {
            "length" => Value::Number(s.chars().count() as f64),
            _ => array_index(key)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::String(c.to_string())),
        }),
        Value::Undefined | Value::Null => {
            Err(InterpError::Type(format!("cannot read `{key}` of {target:?}")))
        }
        _ => Ok(Value::Undefined),
    }
}

fn set_member(target: &Value, key: &str, value: Value) -> InterpResult<()> {
    let Value::Object(o) = target else {
        return Err(InterpError::Type(format!("cannot set `{key}` on {target:?}")));
    };
    let mut o = o.borrow_mut();
    let Object { props, kind } = &mut *o;
    if let ObjectKind::Array(len) = kind {
        if key == "length" {
            let new_len = to_number(&value);
            if new_len < 0.0 || new_len.fract() != 0.0 {
                return Err(InterpError::Type("invalid array length".into()));
            }
            let new_len = new_len as usize;
            props.retain(|k, _| array_index(k).is_none_or(|i| i < new_len));
            *len = new_len;
            return Ok(());
        }
        if let Some(i) = array_index(key) {
            *len = (*len).max(i + 1);
        }
    }
    props.insert(key.to_string(), value);
    Ok(())
}

fn array_items(v: &Value) -> InterpResult<Vec<Value>> {
    let Value::Object(o) = v else {
        return Err(InterpError::Type(format!("{v:?} is not iterable")));
    };
    let o = o.borrow();
    let ObjectKind::Array(len) = o.kind else {
        return Err(InterpError::Type("not an array".into()));
    };
    Ok((0..len)
        .map(|i| o.props.get(&i.to_string()).cloned().unwrap_or(Value::Undefined))
        .collect())
}

// ── conversions ─────────────────────────────────────────────────────────────

fn truthy(v: &Value) -> bool {
    match v {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

fn to_number(v: &Value) -> f64 {
    match v {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() { 0.0 } else { t.parse().unwrap_or(f64::NAN) }
        }
        Value::Object(_) => f64::NAN,
    }
}

fn to_int32(v: &Value) -> i32 {
    let n = to_number(v);
    if !n.is_finite() {
        return 0;
    }
    (n.trunc() as i64 as u32) as i32
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn to_string(v: &Value) -> String {
    match v {
        Value::Undefined => "undefined".into(),
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.clone(),
        Value::Object(o) => match o.borrow().kind {
            ObjectKind::Array(_) => array_items(v)
                .unwrap_or_default()
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => to_string(other),
                })
                .collect::<Vec<_>>()
                .join(","),
            ObjectKind::Function(_) => "function".into(),
            ObjectKind::Plain => "[object Object]".into(),
        },
    }
}

fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(o) => match o.borrow().kind {
            ObjectKind::Function(_) => "function",
            _ => "object",
        },
    }
}

fn strict_equals(a: &Value, b: &Value) -> bool {
    a == b
}

fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Object(_), Value::Object(_)) => a == b,
        (Value::String(x), Value::String(y)) => x == y,
        _ => to_number(a) == to_number(b),
    }
}

fn compound_op(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::AddAssign => BinaryOp::Add,
        AssignOp::SubAssign => BinaryOp::Sub,
        AssignOp::MulAssign => BinaryOp::Mul,
        AssignOp::DivAssign => BinaryOp::Div,
        AssignOp::RemAssign => BinaryOp::Rem,
        AssignOp::ExpAssign => BinaryOp::Exp,
        AssignOp::ShlAssign => BinaryOp::Shl,
        AssignOp::ShrAssign => BinaryOp::Shr,
        AssignOp::UShrAssign => BinaryOp::UShr,
        AssignOp::BitOrAssign => BinaryOp::BitOr,
        AssignOp::BitXorAssign => BinaryOp::BitXor,
        AssignOp::BitAndAssign => BinaryOp::BitAnd,
        AssignOp::Assign
        | AssignOp::LogicalAndAssign
        | AssignOp::LogicalOrAssign
        | AssignOp::NullishAssign => BinaryOp::Add,
    }
}

fn compare(l: &Value, r: &Value, test: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(l).partial_cmp(&to_number(r)),
    };
    Value::Bool(ordering.is_some_and(test))
}

fn binary_op(op: BinaryOp, l: &Value, r: &Value) -> InterpResult<Value> {
    use std::cmp::Ordering;
    let num = |f: fn(f64, f64) -> f64| Value::Number(f(to_number(l), to_number(r)));
    let int = |f: fn(i32, i32) -> i32| Value::Number(f64::from(f(to_int32(l), to_int32(r))));
    Ok(match op {
        BinaryOp::Add => match (l, r) {
            (Value::String(_), _) | (_, Value::String(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
                Value::String(to_string(l) + &to_string(r))
            }
            _ => num(|a, b| a + b),
        },
        BinaryOp::Sub => num(|a, b| a - b),
        BinaryOp::Mul => num(|a, b| a * b),
        BinaryOp::Div => num(|a, b| a / b),
        BinaryOp::Rem => num(|a, b| a % b),
        BinaryOp::Exp => num(f64::powf),
        BinaryOp::Lt => compare(l, r, |o| o == Ordering::Less),
        BinaryOp::LtEq => compare(l, r, |o| o != Ordering::Greater),
        BinaryOp::Gt => compare(l, r, |o| o == Ordering::Greater),
        BinaryOp::GtEq => compare(l, r, |o| o != Ordering::Less),
        BinaryOp::StrictEq => Value::Bool(strict_equals(l, r)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_equals(l, r)),
        BinaryOp::Eq => Value::Bool(loose_equals(l, r)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(l, r)),
        BinaryOp::BitAnd => int(|a, b| a & b),
        BinaryOp::BitOr => int(|a, b| a | b),
        BinaryOp::BitXor => int(|a, b| a ^ b),
        BinaryOp::Shl => int(|a, b| a.wrapping_shl(b as u32 & 31)),
        BinaryOp::Shr => int(|a, b| a.wrapping_shr(b as u32 & 31)),
        BinaryOp::UShr => Value::Number(f64::from(
            (to_int32(l) as u32).wrapping_shr(to_int32(r) as u32 & 31),
        )),
        BinaryOp::In => match r {
            Value::Object(o) => {
                let key = to_string(l);
                let o = o.borrow();
                Value::Bool(
                    o.props.contains_key(&key)
                        || (key == "length" && !matches!(o.kind, ObjectKind::Plain)),
                )
            }
            _ => return Err(InterpError::Type("`in` on a non-object".into())),
        },
        BinaryOp::Instanceof => return Err(InterpError::Unsupported("instanceof")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::build::*;

    fn eval_program(stmts: Vec<Stmt>, name: &str, args: Vec<Value>) -> Value {
        let mut vm = Interpreter::new();
        vm.run(&program(stmts)).unwrap();
        vm.call_global(name, args).unwrap()
    }

    #[test]
    fn test_calls_and_arithmetic() {
        let add = function_decl(
            "add",
            vec![param("a"), param("b")],
            vec![return_stmt(Some(binary(BinaryOp::Add, ident_expr("a"), ident_expr("b"))))],
        );
        let v = eval_program(vec![add], "add", vec![Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(v, Value::Number(5.0));
    }

    #[test]
    fn test_rest_frame_with_sparse_and_negative_keys() {
        // function f(...s) { s["length"] = 1; s[300] = s[0]; s.k = 4; return s[300] + s.k + (s[-5] === undefined ? 1 : 0); }
        let body = vec![
            expr_stmt(assign(
                Pat::Expr(Box::new(member(ident_expr("s"), string("length")))),
                number(1.0),
            )),
            expr_stmt(assign(
                Pat::Expr(Box::new(member(ident_expr("s"), number(300.0)))),
                member(ident_expr("s"), number(0.0)),
            )),
            expr_stmt(assign(
                Pat::Expr(Box::new(member(ident_expr("s"), string("k")))),
                number(4.0),
            )),
            return_stmt(Some(binary(
                BinaryOp::Add,
                binary(
                    BinaryOp::Add,
                    member(ident_expr("s"), number(300.0)),
                    member(ident_expr("s"), string("k")),
                ),
                Expr::Conditional(Box::new(ConditionalExpr {
                    meta: NodeMeta::default(),
                    test: Box::new(binary(
                        BinaryOp::StrictEq,
                        member(ident_expr("s"), number(-5.0)),
                        undefined(),
                    )),
                    consequent: Box::new(number(1.0)),
                    alternate: Box::new(number(0.0)),
                })),
            ))),
        ];
        let f = function_decl("f", vec![rest_param("s")], body);
        let v = eval_program(vec![f], "f", vec![Value::Number(10.0), Value::Number(99.0)]);
        assert_eq!(v, Value::Number(15.0));
    }

    #[test]
    fn test_array_length_truncates() {
        let arr = new_array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        set_member(&arr, "length", Value::Number(1.0)).unwrap();
        assert_eq!(get_member(&arr, "length").unwrap(), Value::Number(1.0));
        assert_eq!(get_member(&arr, "1").unwrap(), Value::Undefined);
        set_member(&arr, "5", Value::Bool(true)).unwrap();
        assert_eq!(get_member(&arr, "length").unwrap(), Value::Number(6.0));
    }

    #[test]
    fn test_define_property_overrides_length() {
        let f = function_decl("f", vec![rest_param("s")], vec![]);
        let fix = expr_stmt(call(
            member(ident_expr("Object"), string("defineProperty")),
            vec![
                ident_expr("f"),
                string("length"),
                object(vec![("value".into(), number(2.0))]),
            ],
        ));
        let mut vm = Interpreter::new();
        vm.run(&program(vec![f, fix])).unwrap();
        let f = vm.global("f").unwrap();
        assert_eq!(vm.get_member(&f, "length").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_closures_and_loops() {
        // function count(n) { var c = 0; var inc = () => { c += 2; }; for (var i = 0; i < n; i++) inc(); return c; }
        let body = vec![
            var_decl(VarKind::Var, "c", Some(number(0.0))),
            var_decl(
                VarKind::Var,
                "inc",
                Some(arrow(
                    vec![],
                    vec![expr_stmt(assign_op(AssignOp::AddAssign, ident_pat("c"), number(2.0)))],
                )),
            ),
            Stmt::For(ForStmt {
                meta: NodeMeta::default(),
                init: Some(ForInit::VarDecl(VarDecl {
                    meta: NodeMeta::default(),
                    kind: VarKind::Var,
                    declarators: vec![VarDeclarator {
                        meta: NodeMeta::default(),
                        id: ident_pat("i"),
                        init: Some(Box::new(number(0.0))),
                    }],
                })),
                test: Some(Box::new(binary(BinaryOp::Lt, ident_expr("i"), ident_expr("n")))),
                update: Some(Box::new(update(UpdateOp::Increment, false, ident_expr("i")))),
                body: Box::new(expr_stmt(call(ident_expr("inc"), vec![]))),
            }),
            return_stmt(Some(ident_expr("c"))),
        ];
        let f = function_decl("count", vec![param("n")], body);
        assert_eq!(eval_program(vec![f], "count", vec![Value::Number(4.0)]), Value::Number(8.0));
    }

    #[test]
    fn test_unknown_name_is_a_reference_error() {
        let f = function_decl("f", vec![], vec![return_stmt(Some(ident_expr("missing")))]);
        let mut vm = Interpreter::new();
        vm.run(&program(vec![f])).unwrap();
        assert!(matches!(vm.call_global("f", vec![]), Err(InterpError::Reference(_))));
    }
}
