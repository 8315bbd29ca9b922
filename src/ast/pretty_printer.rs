//! Pretty prints the AST in parenthesized prefix notation
//!
//! Only used by the `--debug` flag; runtime values print via `Display` in
//! `runtime::obj`.

use crate::ast::expr::*;
use crate::ast::stmt::*;

pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

// Implemented for operators
trait PrettyPrintHelper {
    fn pretty_print_help(&self) -> &str;
}

impl PrettyPrintHelper for UnaryOper {
    fn pretty_print_help(&self) -> &str {
        use UnaryOper::*;
        match *self {
            Not => "!",
            Minus => "-",
        }
    }
}

impl PrettyPrintHelper for BinaryOper {
    fn pretty_print_help(&self) -> &str {
        use BinaryOper::*;
        match *self {
            Minus => "-",
            Plus => "+",
            Mul => "*",
            Div => "/",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
        }
    }
}

impl PrettyPrintHelper for LogicOper {
    fn pretty_print_help(&self) -> &str {
        use LogicOper::*;
        match *self {
            Or => "or",
            And => "and",
        }
    }
}

impl PrettyPrint for LiteralData {
    fn pretty_print(&self) -> String {
        use LiteralData::*;
        match *self {
            Nil => "nil".into(),
            Bool(b) => b.to_string(),
            StringLit(ref s) => format!("\"{}\"", s),
            Number(n) => n.to_string(),
        }
    }
}

impl PrettyPrint for Expr {
    fn pretty_print(&self) -> String {
        use Expr::*;
        match *self {
            Literal(ref l) => l.pretty_print(),
            Unary(ref u) => format!("({} {})", u.oper.pretty_print_help(), u.expr.pretty_print()),
            Binary(ref b) => format!(
                "({} {} {})",
                b.oper.pretty_print_help(),
                b.left.pretty_print(),
                b.right.pretty_print()
            ),
            Logic(ref l) => format!(
                "({} {} {})",
                l.oper.pretty_print_help(),
                l.left.pretty_print(),
                l.right.pretty_print()
            ),
            Grouping(ref g) => format!("(group {})", g.expr.pretty_print()),
            Variable(ref var) => var.name.clone(),
            Assign(ref a) => format!("(= {} {})", a.assigned.name, a.expr.pretty_print()),
            Call(ref call) => {
                let mut s = format!("(call {}", call.callee.pretty_print());
                for arg in call.args.iter() {
                    s.push_str(&format!(" {}", arg.pretty_print()));
                }
                s.push(')');
                s
            }
            Get(ref get) => format!("(.{} {})", get.name, get.body.pretty_print()),
            Set(ref set) => format!(
                "(.{}= {} {})",
                set.name,
                set.body.pretty_print(),
                set.value.pretty_print()
            ),
            This(_) => "this".into(),
            Super(ref sup) => format!("(super {})", sup.method),
        }
    }
}

fn pretty_print_stmts(stmts: &[Stmt]) -> String {
    stmts
        .iter()
        .map(|s| s.pretty_print())
        .collect::<Vec<_>>()
        .join(" ")
}

impl PrettyPrint for FnDeclArgs {
    fn pretty_print(&self) -> String {
        format!(
            "(fun {} ({}) {})",
            self.name,
            self.params.join(" "),
            self::pretty_print_stmts(&self.body)
        )
    }
}

impl PrettyPrint for Stmt {
    fn pretty_print(&self) -> String {
        use Stmt::*;
        match *self {
            Expr(ref expr) => format!("(expr {})", expr.pretty_print()),
            Print(ref print) => format!("(print {})", print.expr.pretty_print()),
            Var(ref var) => format!("(var {} {})", var.name, var.init.pretty_print()),
            If(ref if_) => match if_.if_false {
                Some(ref else_) => format!(
                    "(if {} {} {})",
                    if_.condition.pretty_print(),
                    if_.if_true.pretty_print(),
                    else_.pretty_print()
                ),
                None => format!(
                    "(if {} {})",
                    if_.condition.pretty_print(),
                    if_.if_true.pretty_print()
                ),
            },
            Return(ref ret) => format!("(return {})", ret.expr.pretty_print()),
            While(ref while_) => format!(
                "(while {} {})",
                while_.condition.pretty_print(),
                while_.body.pretty_print()
            ),
            Block(ref block) => format!("(block {})", self::pretty_print_stmts(&block.stmts)),
            Fn(ref f) => f.pretty_print(),
            Class(ref c) => {
                let mut s = format!("(class {}", c.name);
                if let Some(ref sup) = c.superclass {
                    s.push_str(&format!(" (< {})", sup.name));
                }
                for method in c.methods.iter() {
                    s.push_str(&format!(" {}", method.pretty_print()));
                }
                s.push(')');
                s
            }
        }
    }
}

/// Tests expression printing
#[cfg(test)]
mod test {
    use crate::ast::expr::*;
    use crate::ast::pretty_printer::*;

    /// Prints this: (* (- 123) (group 45.67))
    #[test]
    fn nested_expression() {
        assert_eq!(
            Expr::binary(
                Expr::unary(UnaryOper::Minus, Expr::literal(123.0.into())),
                BinaryOper::Mul,
                Expr::group(Expr::literal(45.67.into())),
            )
            .pretty_print(),
            "(* (- 123) (group 45.67))"
        );
    }

    #[test]
    fn property_chain() {
        let mut counter = VarUseIdCounter::new();
        let expr = Expr::set(
            Expr::get(Expr::var("a", counter.next()), "b"),
            "c",
            Expr::literal(LiteralData::Nil),
        );
        assert_eq!(expr.pretty_print(), "(.c= (.b a) nil)");
    }
}
