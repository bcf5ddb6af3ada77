//! Reserved function names for boolean, comparison and arithmetic operators

pub const AND: &str = "op_and";
pub const OR: &str = "op_or";
pub const NOT: &str = "op_not";

pub const EQ: &str = "op_=";
pub const NOT_EQ: &str = "op_<>";
pub const LT: &str = "op_<";
pub const LTE: &str = "op_<=";
pub const GT: &str = "op_>";
pub const GTE: &str = "op_>=";

pub const ADD: &str = "add";
pub const SUBTRACT: &str = "subtract";
pub const MULTIPLY: &str = "multiply";

/// Infix token used when rendering a binary operator, if `name` is one
pub fn infix_token(name: &str) -> Option<&'static str> {
    match name {
        AND => Some("AND"),
        OR => Some("OR"),
        EQ => Some("="),
        NOT_EQ => Some("<>"),
        LT => Some("<"),
        LTE => Some("<="),
        GT => Some(">"),
        GTE => Some(">="),
        ADD => Some("+"),
        SUBTRACT => Some("-"),
        MULTIPLY => Some("*"),
        _ => None,
    }
}
