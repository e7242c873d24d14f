//! Serializer from the script tree to ExtendScript source. All escaping lives here.

use std::fmt::Write as _;

use super::{BinOp, Expr, Script, Stmt};

const INDENT: &str = "    ";

pub fn emit(script: &Script) -> String {
    let mut out = String::new();
    write_block(&mut out, script.statements(), 0);
    out
}

/// Quote `text` as a double-quoted ECMAScript string literal.
///
/// Every character that could end the literal, break the line, or be rewritten
/// by the engine's lexer is escaped, so evaluating the literal yields `text`.
/// Non-ASCII is written as UTF-16 `\uXXXX` escapes, which keeps templated
/// payloads ASCII regardless of how InDesign decodes the script file.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0B}' => out.push_str("\\v"),
            c if c.is_ascii_control() || !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units).iter() {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn number_literal(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", value)
    }
}

fn write_block(out: &mut String, stmts: &[Stmt], depth: usize) {
    for stmt in stmts {
        write_stmt(out, stmt, depth);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        // Caller text keeps its own layout; re-indenting could alter string continuations.
        Stmt::Raw(source) => {
            out.push_str(source);
            if !source.ends_with('\n') {
                out.push('\n');
            }
        }
        Stmt::Let(name, value) => {
            indent(out, depth);
            let _ = writeln!(out, "var {} = {};", name, expr(value));
        }
        Stmt::Assign(target, value) => {
            indent(out, depth);
            let _ = writeln!(out, "{} = {};", expr(target), expr(value));
        }
        Stmt::Expr(value) => {
            indent(out, depth);
            let _ = writeln!(out, "{};", expr(value));
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            indent(out, depth);
            let _ = writeln!(out, "if ({}) {{", expr(cond));
            write_block(out, then, depth + 1);
            indent(out, depth);
            if otherwise.is_empty() {
                out.push_str("}\n");
            } else {
                out.push_str("} else {\n");
                write_block(out, otherwise, depth + 1);
                indent(out, depth);
                out.push_str("}\n");
            }
        }
        Stmt::For {
            var,
            from,
            until,
            body,
        } => {
            indent(out, depth);
            let _ = writeln!(
                out,
                "for (var {v} = {}; {v} < {}; {v}++) {{",
                expr(from),
                expr(until),
                v = var
            );
            write_block(out, body, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::Ne => 3,
        BinOp::Lt | BinOp::Le | BinOp::Gt => 4,
        BinOp::Add | BinOp::Sub => 5,
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::Str(text) => string_literal(text),
        Expr::Int(v) => v.to_string(),
        Expr::Num(v) => number_literal(*v),
        Expr::Bool(v) => v.to_string(),
        Expr::Measure(v, unit) => string_literal(&format!("{}{}", number_literal(*v), unit.suffix())),
        Expr::Var(name) => (*name).to_string(),
        Expr::Member(base, field) => format!("{}.{}", operand(base), field),
        Expr::Index(base, index) => format!("{}[{}]", operand(base), expr(index)),
        Expr::Call(callee, args) => format!("{}({})", operand(callee), list(args)),
        Expr::New(ctor, args) => format!("new {}({})", ctor, list(args)),
        Expr::Array(items) => format!("[{}]", list(items)),
        Expr::Object(fields) => {
            let body = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, expr(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{}}}", body)
        }
        Expr::Binary(lhs, op, rhs) => {
            let p = precedence(*op);
            let left = match lhs.as_ref() {
                Expr::Binary(_, inner, _) if precedence(*inner) < p => format!("({})", expr(lhs)),
                _ => expr(lhs),
            };
            let right = match rhs.as_ref() {
                Expr::Binary(_, inner, _) if precedence(*inner) <= p => format!("({})", expr(rhs)),
                _ => expr(rhs),
            };
            format!("{} {} {}", left, op.token(), right)
        }
        Expr::Not(inner) => format!("!{}", operand(inner)),
    }
}

/// Render an expression used as the base of `.`, `[]`, `()` or `!`.
fn operand(e: &Expr) -> String {
    match e {
        Expr::Binary(..) | Expr::Not(_) | Expr::New(..) | Expr::Int(_) | Expr::Num(_) => {
            format!("({})", expr(e))
        }
        _ => expr(e),
    }
}

fn list(items: &[Expr]) -> String {
    items.iter().map(expr).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{app, concat, for_each, if_else, int, let_, result, str, var, Unit};

    #[test]
    fn escapes_quotes_and_line_breaks() {
        assert_eq!(
            string_literal("say \"hi\"\nit's\\done"),
            r#""say \"hi\"\nit\'s\\done""#
        );
        assert_eq!(string_literal("a\u{2028}b\u{0}"), r#""a\u2028b\u0000""#);
        assert_eq!(string_literal("caf\u{e9} \u{1F600}"), r#""caf\u00e9 \ud83d\ude00""#);
    }

    #[test]
    fn lengths_carry_their_unit() {
        assert_eq!(expr(&Expr::Measure(72.0, Unit::Pt)), r#""72pt""#);
        assert_eq!(expr(&Expr::Measure(12.5, Unit::Mm)), r#""12.5mm""#);
        assert_eq!(expr(&Expr::Measure(3.0, Unit::Pica)), r#""3p""#);
    }

    #[test]
    fn binary_parentheses_follow_precedence() {
        let e = concat([str("a"), var("x").bin(BinOp::Add, int(1)), str("b")]);
        assert_eq!(expr(&e), r#""a" + (x + 1) + "b""#);
        let e = var("a").equals(int(0)).bin(BinOp::Or, var("b").bin(BinOp::Gt, int(2)));
        assert_eq!(expr(&e), "a === 0 || b > 2");
        let e = var("a").bin(BinOp::Sub, var("b").bin(BinOp::Sub, var("c")));
        assert_eq!(expr(&e), "a - (b - c)");
    }

    #[test]
    fn blocks_are_indented() {
        let script = Script::from_statements(vec![
            let_("names", Expr::Array(vec![])),
            for_each(
                "i",
                app().dot("documents").len(),
                vec![exec_push()],
            ),
            if_else(
                var("names").len().equals(int(0)),
                vec![result(str("none"))],
                vec![result(var("names").call("join", vec![str(", ")]))],
            ),
        ]);
        let expected = "var names = [];\n\
for (var i = 0; i < app.documents.length; i++) {\n    names.push(app.documents[i].name);\n}\n\
if (names.length === 0) {\n    \"none\";\n} else {\n    names.join(\", \");\n}\n";
        assert_eq!(emit(&script), expected);
    }

    fn exec_push() -> Stmt {
        Stmt::Expr(var("names").call(
            "push",
            vec![app().dot("documents").at(var("i")).dot("name")],
        ))
    }

    #[test]
    fn raw_statements_are_verbatim() {
        let script = Script::from_statements(vec![Stmt::Raw("var s = 'a\\\n  b';".into())]);
        assert_eq!(emit(&script), "var s = 'a\\\n  b';\n");
    }
}
