#![no_main]

use libfuzzer_sys::fuzz_target;
use shroud_core::config::{Options, Probability};
use shroud_core::syntax::ast::{AssignOp, BinaryOp, Expr, Stmt, VarKind};
use shroud_core::syntax::build::*;
use shroud_core::transform::{Pipeline, VariableAnalysis, Virtualize};

// Build a function from the input bytes and run virtualization over it.
// The pipeline must never fail fatally and the rewritten tree must still
// analyse cleanly.
//
// Byte 0 seeds the run. Every following byte is one statement:
//   bits [2:0] – statement shape
//   bits [5:3] – local name index l0–l7
//   bits [7:6] – operand selector
const NAMES: [&str; 8] = ["l0", "l1", "l2", "l3", "l4", "l5", "l6", "l7"];
const MAX_STMTS: usize = 64;

fn operand(sel: u8, name: &str) -> Expr {
    match sel {
        0 => number(7.0),
        1 => ident_expr("p"),
        2 => ident_expr(name),
        _ => function_expr(None, vec![], vec![return_stmt(Some(number(1.0)))]),
    }
}

fn statement(byte: u8) -> Stmt {
    let name = NAMES[usize::from((byte >> 3) & 0x7)];
    let sel = byte >> 6;
    match byte & 0x7 {
        0 => var_decl(VarKind::Var, name, Some(operand(sel, name))),
        1 => var_decl(VarKind::Let, name, None),
        2 => expr_stmt(assign(ident_pat(name), operand(sel, name))),
        3 => expr_stmt(assign_op(AssignOp::AddAssign, ident_pat(name), number(1.0))),
        4 => if_stmt(
            binary(BinaryOp::Lt, ident_expr(name), number(3.0)),
            vec![return_stmt(Some(ident_expr(name)))],
            None,
        ),
        5 => function_decl(name, vec![], vec![return_stmt(Some(ident_expr("p")))]),
        6 => expr_stmt(call(ident_expr(name), vec![operand(sel, name)])),
        _ => return_stmt(Some(binary(BinaryOp::Add, ident_expr("p"), operand(sel, name)))),
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let body = rest.iter().take(MAX_STMTS).map(|&b| statement(b)).collect();
    let mut p = program(vec![function_decl("target", vec![param("p")], body)]);

    let options = Options {
        virtualize: Probability::Flag(true),
        seed: Some(u64::from(seed)),
        ..Options::default()
    };
    Pipeline::new()
        .with(Virtualize::new())
        .run(&mut p, options.clone())
        .expect("virtualization must not fail fatally");
    Pipeline::new()
        .with(VariableAnalysis::new())
        .run(&mut p, options)
        .expect("rewritten tree must analyse");
});
