use proptest::prelude::*;

use owscript::ast::*;
use owscript::span::Spanned;
use owscript::{compile_with_options, CompileOptions};

fn options() -> CompileOptions {
    CompileOptions {
        indent_size: 3,
        preamble: false,
    }
}

fn actions(stmts: Vec<Spanned<Stmt>>) -> Vec<String> {
    let script = Script {
        items: vec![rule("p", vec![ruleblock("actions", stmts)])],
    };
    compile_with_options(&script, &options())
        .unwrap()
        .lines()
        .filter_map(|l| l.trim().strip_suffix(';'))
        .map(str::to_string)
        .collect()
}

/// Value assigned by the single statement `x = <expr>`.
fn assigned_value(expr: Spanned<Expr>) -> String {
    let lines = actions(vec![assign(gvar("x"), expr)]);
    lines[0]
        .strip_prefix("Set Global Variable At Index(A, 0, ")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap()
        .to_string()
}

proptest! {
    #[test]
    fn prop_integer_arithmetic_folds(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Add, num(b))), (a + b).to_string());
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Sub, num(b))), (a - b).to_string());
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Mul, num(b))), (a * b).to_string());
    }

    #[test]
    fn prop_modulo_takes_sign_of_divisor(a in -10_000i64..10_000, b in 1i64..100) {
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Mod, num(b))), a.rem_euclid(b).to_string());
    }

    #[test]
    fn prop_division_by_zero_folds_to_zero(a in any::<i32>()) {
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Div, num(0))), "0");
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Mod, num(0))), "0");
    }

    #[test]
    fn prop_small_powers_fold(a in -20i64..20, e in 0u32..5) {
        prop_assert_eq!(assigned_value(binary(num(a), BinOp::Pow, num(e))), a.pow(e).to_string());
    }

    #[test]
    fn prop_range_unrolls_in_order(start in -20i64..20, len in 0i64..12) {
        let lines = actions(vec![for_stmt(
            "i",
            call("range", vec![num(start), num(start + len)]),
            vec![assign(gvar("x"), gvar("i"))],
        )]);
        let expected: Vec<String> = (start..start + len)
            .map(|i| format!("Set Global Variable At Index(A, 0, {})", i))
            .collect();
        prop_assert_eq!(lines, expected);
    }

    #[test]
    fn prop_item_write_reads_back(
        values in proptest::collection::vec(-100i64..100, 1..6),
        pick in 0usize..6,
        value in -100i64..100,
    ) {
        let pick = pick % values.len();
        let lines = actions(vec![
            assign(gvar("arr"), array(values.iter().map(|n| num(*n)).collect())),
            assign_op(item(gvar("arr"), num(pick)), AssignOp::Add, num(value)),
            assign(gvar("x"), item(gvar("arr"), num(pick))),
        ]);
        let expected = format!("Set Global Variable At Index(A, 1, {})", values[pick] + value);
        prop_assert_eq!(lines.last().unwrap(), &expected);
    }

    #[test]
    fn prop_globals_get_dense_slots(names in proptest::collection::vec("[a-e]", 1..20)) {
        let stmts = names.iter().map(|n| assign(gvar(n), num(1))).collect();
        let lines = actions(stmts);

        let mut order: Vec<&String> = Vec::new();
        for (name, line) in names.iter().zip(&lines) {
            let slot = match order.iter().position(|n| *n == name) {
                Some(slot) => slot,
                None => {
                    order.push(name);
                    order.len() - 1
                }
            };
            prop_assert_eq!(line, &format!("Set Global Variable At Index(A, {}, 1)", slot));
        }
    }

    #[test]
    fn prop_if_skip_matches_branch_length(then_len in 0usize..6, else_len in 0usize..6) {
        let branch = |n: usize| (0..n).map(|i| assign(gvar("v"), num(i))).collect::<Vec<_>>();
        let lines = actions(vec![if_stmt(
            constant("c"),
            branch(then_len),
            Some(ElseBranch::Block(block(branch(else_len)))),
        )]);
        prop_assert_eq!(lines.len(), then_len + else_len + 2);
        prop_assert_eq!(&lines[0], &format!("Skip If(Not(C), {})", then_len + 1));
        prop_assert_eq!(&lines[then_len + 1], &format!("Skip({})", else_len));
    }

    #[test]
    fn prop_compiles_are_deterministic(names in proptest::collection::vec("[a-c]", 1..8)) {
        let stmts: Vec<_> = names
            .iter()
            .flat_map(|n| {
                vec![
                    assign(gvar(n), array(vec![num(1), num(2)])),
                    assign(pvar(n, None), item(gvar(n), num(1))),
                ]
            })
            .collect();
        prop_assert_eq!(actions(stmts.clone()), actions(stmts));
    }
}
