//! Block indentation for generated code

/// Formats generated code to a module's indentation convention
pub trait Indenter {
    /// Indent `code` (lines separated by `\n`); returns the indented lines
    fn indent(&self, code: &str) -> Vec<String>;
}

/// Indents the bodies of `Property`/`Sub`/`Function`/`Type`/`If`/`With`
/// blocks by a fixed number of spaces. Lines are expected to arrive unindented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndenter {
    width: usize,
}

impl BlockIndenter {
    /// Create indenter with `width` spaces per level
    #[inline]
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Spaces per level
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for BlockIndenter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Indenter for BlockIndenter {
    fn indent(&self, code: &str) -> Vec<String> {
        let mut level: usize = 0;
        let mut out = Vec::new();
        for raw in code.lines() {
            let line = raw.trim();
            if line.is_empty() {
                out.push(String::new());
                continue;
            }
            let shape = LineShape::of(line);
            if shape.closes {
                level = level.saturating_sub(1);
            }
            out.push(format!("{}{line}", " ".repeat(level * self.width)));
            if shape.opens {
                level += 1;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
struct LineShape {
    closes: bool,
    opens: bool,
}

impl LineShape {
    fn of(line: &str) -> Self {
        let words: Vec<String> = line
            .split_whitespace()
            .take(3)
            .map(str::to_ascii_lowercase)
            .collect();
        let first = words.first().map_or("", String::as_str);
        let decl = match first {
            "public" | "private" | "friend" | "static" => words.get(1).map_or("", String::as_str),
            other => other,
        };

        if first == "end" {
            return Self { closes: true, opens: false };
        }
        if first == "else" || first == "elseif" {
            return Self { closes: true, opens: true };
        }
        let opens = match decl {
            "property" | "sub" | "function" | "type" | "with" | "for" | "do" | "select" => true,
            "if" => line.to_ascii_lowercase().trim_end().ends_with("then"),
            _ => false,
        };
        Self { closes: false, opens }
    }
}
