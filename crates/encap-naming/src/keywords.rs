//! Reserved words and built-in names
//!
//! All tables hold lowercase entries; lookups lowercase their input since
//! identifiers are case-insensitive.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "addressof", "and", "any", "as", "attribute", "boolean", "byref", "byte", "byval",
        "call", "case", "cbool", "cbyte", "ccur", "cdate", "cdbl", "cdec", "cint", "clng",
        "clnglng", "clngptr", "const", "csng", "cstr", "currency", "cvar", "date", "declare",
        "defbool", "defbyte", "defcur", "defdate", "defdbl", "defint", "deflng", "defobj",
        "defsng", "defstr", "defvar", "dim", "do", "double", "each", "else", "elseif", "empty",
        "end", "endif", "enum", "eqv", "erase", "event", "exit", "false", "for", "friend",
        "function", "get", "global", "gosub", "goto", "if", "imp", "implements", "in",
        "integer", "is", "let", "lib", "like", "long", "longlong", "longptr", "loop", "lset",
        "me", "mod", "new", "next", "not", "nothing", "null", "object", "on", "optional",
        "or", "paramarray", "preserve", "private", "property", "ptrsafe", "public",
        "raiseevent", "redim", "rem", "resume", "return", "rset", "select", "set", "single",
        "static", "step", "stop", "string", "sub", "then", "to", "true", "type", "typeof",
        "until", "variant", "wend", "while", "with", "withevents", "xor",
    ]
    .into_iter()
    .collect()
});

static BUILT_IN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "boolean", "byte", "collection", "currency", "date", "decimal", "double", "integer",
        "long", "longlong", "longptr", "object", "single", "string", "variant", "error",
    ]
    .into_iter()
    .collect()
});

static BUILT_IN_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "array", "asc", "chr", "command", "cos", "curdir", "cverr", "dateadd",
        "datediff", "datepart", "dateserial", "datevalue", "day", "dir", "environ", "eof",
        "err", "error", "exp", "filelen", "filter", "fix", "format", "freefile", "hex",
        "hour", "iif", "input", "inputbox", "instr", "instrrev", "int", "isarray", "isdate",
        "isempty", "iserror", "ismissing", "isnull", "isnumeric", "isobject", "join",
        "lbound", "lcase", "left", "len", "loc", "lof", "log", "ltrim", "mid", "minute",
        "month", "msgbox", "now", "oct", "replace", "rgb", "right", "rnd", "round", "rtrim",
        "second", "sgn", "shell", "sin", "space", "split", "sqr", "str", "strcomp", "strconv",
        "string", "strreverse", "switch", "tab", "tan", "time", "timer", "trim", "typename",
        "ubound", "ucase", "val", "vartype", "weekday", "year",
    ]
    .into_iter()
    .collect()
});

/// True for reserved keywords
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name.to_ascii_lowercase().as_str())
}

/// True for built-in type names
#[must_use]
pub fn is_built_in_type(name: &str) -> bool {
    BUILT_IN_TYPES.contains(name.to_ascii_lowercase().as_str())
}

/// True for built-in function names
#[must_use]
pub fn is_built_in_function(name: &str) -> bool {
    BUILT_IN_FUNCTIONS.contains(name.to_ascii_lowercase().as_str())
}
