//! Constructors for synthesized nodes.
//!
//! Synthesized nodes carry the default span and no comments.

use super::ast::*;

/// An identifier node.
pub fn ident(name: impl Into<String>) -> Ident {
    Ident {
        meta: NodeMeta::default(),
        name: name.into(),
    }
}

/// An identifier reference expression.
pub fn ident_expr(name: impl Into<String>) -> Expr {
    Expr::Ident(ident(name))
}

/// An identifier binding pattern.
pub fn ident_pat(name: impl Into<String>) -> Pat {
    Pat::Ident(ident(name))
}

/// A string literal node.
pub fn string_lit(value: impl Into<String>) -> StringLit {
    StringLit {
        meta: NodeMeta::default(),
        value: value.into(),
    }
}

/// A string literal expression.
pub fn string(value: impl Into<String>) -> Expr {
    Expr::Str(string_lit(value))
}

/// A numeric expression; negative values become a unary minus over the
/// magnitude.
pub fn number(value: f64) -> Expr {
    if value < 0.0 {
        return unary(UnaryOp::Minus, number(-value));
    }
    Expr::Num(NumLit {
        meta: NodeMeta::default(),
        value,
    })
}

/// A boolean literal expression.
pub fn boolean(value: bool) -> Expr {
    Expr::Bool(BoolLit {
        meta: NodeMeta::default(),
        value,
    })
}

/// The `undefined` identifier.
pub fn undefined() -> Expr {
    ident_expr("undefined")
}

/// `this`
pub fn this() -> Expr {
    Expr::This(ThisExpr {
        meta: NodeMeta::default(),
    })
}

/// Computed member access `object[property]`.
pub fn member(object: Expr, property: Expr) -> Expr {
    Expr::Member(Box::new(MemberExpr {
        meta: NodeMeta::default(),
        object: Box::new(object),
        property: MemberProp::Computed(Box::new(property)),
        optional: false,
    }))
}

/// Static member access `object.name`.
pub fn static_member(object: Expr, name: impl Into<String>) -> Expr {
    Expr::Member(Box::new(MemberExpr {
        meta: NodeMeta::default(),
        object: Box::new(object),
        property: MemberProp::Ident(ident(name)),
        optional: false,
    }))
}

/// `callee(arguments)`
pub fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::Call(Box::new(CallExpr {
        meta: NodeMeta::default(),
        callee: Box::new(callee),
        arguments,
        optional: false,
    }))
}

/// `left op right`
pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(Box::new(BinaryExpr {
        meta: NodeMeta::default(),
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

/// `left op right` for `&&`, `||`, `??`.
pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr::Logical(Box::new(LogicalExpr {
        meta: NodeMeta::default(),
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

/// `op argument`
pub fn unary(op: UnaryOp, argument: Expr) -> Expr {
    Expr::Unary(Box::new(UnaryExpr {
        meta: NodeMeta::default(),
        op,
        argument: Box::new(argument),
    }))
}

/// `++argument`, `argument--`, …
pub fn update(op: UpdateOp, prefix: bool, argument: Expr) -> Expr {
    Expr::Update(Box::new(UpdateExpr {
        meta: NodeMeta::default(),
        op,
        prefix,
        argument: Box::new(argument),
    }))
}

/// `left = right`
pub fn assign(left: Pat, right: Expr) -> Expr {
    assign_op(AssignOp::Assign, left, right)
}

/// `left op= right`
pub fn assign_op(op: AssignOp, left: Pat, right: Expr) -> Expr {
    Expr::Assign(Box::new(AssignExpr {
        meta: NodeMeta::default(),
        op,
        left,
        right: Box::new(right),
    }))
}

/// `(a, b, c)`; a single expression is returned as is.
pub fn sequence(mut expressions: Vec<Expr>) -> Expr {
    if expressions.len() == 1
        && let Some(only) = expressions.pop()
    {
        return only;
    }
    Expr::Sequence(Box::new(SequenceExpr {
        meta: NodeMeta::default(),
        expressions,
    }))
}

/// `[elements]`
pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::Array(Box::new(ArrayExpr {
        meta: NodeMeta::default(),
        elements: elements.into_iter().map(Some).collect(),
    }))
}

/// `{ "key": value, … }` with string-literal keys.
pub fn object(properties: Vec<(String, Expr)>) -> Expr {
    Expr::Object(Box::new(ObjectExpr {
        meta: NodeMeta::default(),
        properties: properties
            .into_iter()
            .map(|(key, value)| {
                ObjectProp::Prop(Box::new(Prop {
                    meta: NodeMeta::default(),
                    key: PropKey::Str(string_lit(key)),
                    is_computed: false,
                    value: PropValue::Value(Box::new(value)),
                }))
            })
            .collect(),
    }))
}

/// `expr;`
pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        meta: NodeMeta::default(),
        expr: Box::new(expr),
    })
}

/// `kind name [= init];`
pub fn var_decl(kind: VarKind, name: impl Into<String>, init: Option<Expr>) -> Stmt {
    Stmt::VarDecl(VarDecl {
        meta: NodeMeta::default(),
        kind,
        declarators: vec![VarDeclarator {
            meta: NodeMeta::default(),
            id: ident_pat(name),
            init: init.map(Box::new),
        }],
    })
}

/// `return [argument];`
pub fn return_stmt(argument: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        meta: NodeMeta::default(),
        argument: argument.map(Box::new),
    })
}

/// `if (test) { consequent } [else { alternate }]`
pub fn if_stmt(test: Expr, consequent: Vec<Stmt>, alternate: Option<Vec<Stmt>>) -> Stmt {
    Stmt::If(IfStmt {
        meta: NodeMeta::default(),
        test: Box::new(test),
        consequent: Box::new(Stmt::Block(block(consequent))),
        alternate: alternate.map(|body| Box::new(Stmt::Block(block(body)))),
    })
}

/// `while (test) { body }`
pub fn while_stmt(test: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileStmt {
        meta: NodeMeta::default(),
        test: Box::new(test),
        body: Box::new(Stmt::Block(block(body))),
    })
}

/// `{ body }`
pub fn block(body: Vec<Stmt>) -> BlockStmt {
    BlockStmt {
        meta: NodeMeta::default(),
        body,
    }
}

/// A simple `name` parameter.
pub fn param(name: impl Into<String>) -> Param {
    Param {
        meta: NodeMeta::default(),
        pat: ident_pat(name),
        default: None,
    }
}

/// A `...name` rest parameter.
pub fn rest_param(name: impl Into<String>) -> Param {
    Param {
        meta: NodeMeta::default(),
        pat: Pat::Rest(Box::new(RestElement {
            meta: NodeMeta::default(),
            argument: Box::new(ident_pat(name)),
        })),
        default: None,
    }
}

/// A plain (non-async, non-generator) function value.
pub fn function(id: Option<&str>, params: Vec<Param>, body: Vec<Stmt>) -> Function {
    Function {
        meta: NodeMeta::default(),
        id: id.map(ident),
        is_async: false,
        is_generator: false,
        params,
        body: block(body),
    }
}

/// `function name(params) { body }`
pub fn function_decl(name: &str, params: Vec<Param>, body: Vec<Stmt>) -> Stmt {
    Stmt::FnDecl(Box::new(function(Some(name), params, body)))
}

/// `function [id](params) { body }` in expression position.
pub fn function_expr(id: Option<&str>, params: Vec<Param>, body: Vec<Stmt>) -> Expr {
    Expr::Fn(Box::new(function(id, params, body)))
}

/// `(params) => { body }`
pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Expr {
    Expr::Arrow(Box::new(ArrowExpr {
        meta: NodeMeta::default(),
        is_async: false,
        params,
        body: ArrowBody::Block(block(body)),
    }))
}

/// A script program.
pub fn program(body: Vec<Stmt>) -> Program {
    Program {
        meta: NodeMeta::default(),
        source_type: SourceType::Script,
        body: body.into_iter().map(ProgramItem::Stmt).collect(),
    }
}
