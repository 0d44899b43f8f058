//! Text scanning primitives for Go source.
//!
//! Generated loaders are never type-checked; these helpers only look at the
//! lexical shape of a file: where comments and literals are, whether the
//! brackets close, and whether a word can be an identifier.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").unwrap());

pub const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Identifiers of the universe block. An import name shadows them for the whole file.
pub const GO_PREDECLARED: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "true", "false", "iota", "nil", "append", "cap",
    "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max", "min", "new",
    "panic", "print", "println", "real", "recover",
];

/// 1-based line and column of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source with comments and literal contents blanked out.
#[derive(Debug, Clone)]
pub struct MaskedSource {
    /// Same line structure as the input; comment and literal characters are spaces.
    pub code: String,
    /// Start of a comment or literal that never closes.
    pub unterminated: Option<Position>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Interpreted,
    Raw,
    Rune,
}

/// Blank out comments and string/rune literals, keeping newlines so positions still line up.
pub fn mask_non_code(source: &str) -> MaskedSource {
    let mut code = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut opened_at = Position { line: 1, column: 1 };
    let mut pos = Position { line: 1, column: 1 };
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        let here = pos;
        if c == '\n' {
            pos.line += 1;
            pos.column = 1;
        } else {
            pos.column += 1;
        }

        let masked = match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    state = State::LineComment;
                    opened_at = here;
                    ' '
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    pos.column += 1;
                    code.push(' ');
                    state = State::BlockComment;
                    opened_at = here;
                    ' '
                }
                '"' => {
                    state = State::Interpreted;
                    opened_at = here;
                    c
                }
                '`' => {
                    state = State::Raw;
                    opened_at = here;
                    c
                }
                '\'' => {
                    state = State::Rune;
                    opened_at = here;
                    c
                }
                _ => c,
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    c
                } else {
                    ' '
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    pos.column += 1;
                    code.push(' ');
                    state = State::Code;
                }
                if c == '\n' {
                    c
                } else {
                    ' '
                }
            }
            State::Interpreted | State::Rune => {
                let close = if state == State::Interpreted { '"' } else { '\'' };
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        if next == '\n' {
                            pos.line += 1;
                            pos.column = 1;
                        } else {
                            pos.column += 1;
                        }
                        code.push(' ');
                    }
                    ' '
                } else if c == close {
                    state = State::Code;
                    c
                } else if c == '\n' {
                    // Interpreted and rune literals cannot span lines
                    return MaskedSource {
                        code,
                        unterminated: Some(opened_at),
                    };
                } else {
                    ' '
                }
            }
            State::Raw => {
                if c == '`' {
                    state = State::Code;
                    c
                } else if c == '\n' {
                    c
                } else {
                    ' '
                }
            }
        };
        code.push(masked);
    }

    let unterminated = match state {
        State::Code | State::LineComment => None,
        _ => Some(opened_at),
    };

    MaskedSource { code, unterminated }
}

/// First bracket problem in already-masked code, as a `line:col: message` diagnostic.
pub fn check_brackets(code: &str) -> Option<String> {
    let mut stack: Vec<(char, Position)> = Vec::new();
    let mut pos = Position { line: 1, column: 1 };

    for c in code.chars() {
        let here = pos;
        if c == '\n' {
            pos.line += 1;
            pos.column = 1;
        } else {
            pos.column += 1;
        }

        match c {
            '(' | '[' | '{' => stack.push((c, here)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, at)) => {
                        return Some(format!(
                            "{}: unexpected '{}', expected a match for '{}' opened at {}",
                            here, c, open, at
                        ))
                    }
                    None => return Some(format!("{}: unexpected '{}'", here, c)),
                }
            }
            _ => {}
        }
    }

    stack
        .pop()
        .map(|(open, at)| format!("{}: '{}' is never closed", at, open))
}

/// True if `word` can name a Go package or variable.
pub fn is_identifier(word: &str) -> bool {
    IDENTIFIER.is_match(word) && !GO_KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(String),
    Literal,
    Punct(&'static str),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(text) | Token::Number(text) => write!(f, "'{}'", text),
            Token::Literal => f.write_str("string literal"),
            Token::Punct(p) => write!(f, "'{}'", p),
        }
    }
}

const PUNCTUATION: &[&str] = &[
    "...", "<-", "*", "[", "]", "(", ")", "{", "}", ".", ",", ";", "~", "|",
];

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        } else if c.is_alphabetic() || c == '_' || c.is_ascii_digit() {
            let end = rest
                .char_indices()
                .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
                .map_or(rest.len(), |(i, _)| i);
            let word = rest[..end].to_string();
            tokens.push(if c.is_ascii_digit() {
                Token::Number(word)
            } else {
                Token::Ident(word)
            });
            rest = &rest[end..];
        } else if c == '"' || c == '`' {
            // struct tags
            let close = rest[1..]
                .find(c)
                .ok_or_else(|| "string literal not terminated".to_string())?;
            tokens.push(Token::Literal);
            rest = &rest[close + 2..];
        } else if let Some(p) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            tokens.push(Token::Punct(p));
            rest = &rest[p.len()..];
        } else {
            return Err(format!("unexpected character '{}'", c));
        }
    }

    Ok(tokens)
}

/// Recursive-descent reader for the type grammar of Go declarations.
struct TypeReader {
    tokens: Vec<Token>,
    pos: usize,
}

impl TypeReader {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn found(token: Option<&Token>) -> String {
        token.map_or_else(|| "end of input".to_string(), |t| t.to_string())
    }

    fn expect(&mut self, punct: &str) -> std::result::Result<(), String> {
        if self.at(punct) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!("expected '{}', found {}", punct, Self::found(self.peek())))
        }
    }

    fn expect_name(&mut self) -> std::result::Result<(), String> {
        match self.next() {
            Some(Token::Ident(name)) if is_identifier(&name) => Ok(()),
            other => Err(format!("expected name, found {}", Self::found(other.as_ref()))),
        }
    }

    fn starts_type(token: Option<&Token>) -> bool {
        match token {
            Some(Token::Ident(name)) => !GO_KEYWORDS.contains(&name.as_str()) || is_type_keyword(name),
            Some(Token::Punct(p)) => matches!(*p, "*" | "[" | "(" | "<-"),
            _ => false,
        }
    }

    fn read_type(&mut self) -> std::result::Result<(), String> {
        match self.next() {
            Some(Token::Ident(word)) => match word.as_str() {
                "map" => {
                    self.expect("[")?;
                    self.read_type()?;
                    self.expect("]")?;
                    self.read_type()
                }
                "chan" => {
                    if self.at("<-") {
                        self.pos += 1;
                    }
                    self.read_type()
                }
                "func" => self.read_signature(),
                "struct" | "interface" => self.read_body(),
                _ if GO_KEYWORDS.contains(&word.as_str()) => {
                    Err(format!("expected type, found '{}'", word))
                }
                _ => {
                    if self.at(".") {
                        self.pos += 1;
                        self.expect_name()?;
                    }
                    if self.at("[") {
                        self.pos += 1;
                        self.read_type_list("]")?;
                    }
                    Ok(())
                }
            },
            Some(Token::Punct("*")) => self.read_type(),
            Some(Token::Punct("[")) => {
                if !self.at("]") {
                    match self.next() {
                        Some(Token::Number(_)) | Some(Token::Punct("...")) => {}
                        Some(Token::Ident(name)) if is_identifier(&name) => {
                            if self.at(".") {
                                self.pos += 1;
                                self.expect_name()?;
                            }
                        }
                        other => {
                            return Err(format!(
                                "expected array length, found {}",
                                Self::found(other.as_ref())
                            ))
                        }
                    }
                }
                self.expect("]")?;
                self.read_type()
            }
            Some(Token::Punct("<-")) => match self.next() {
                Some(Token::Ident(word)) if word == "chan" => self.read_type(),
                other => Err(format!("expected 'chan', found {}", Self::found(other.as_ref()))),
            },
            Some(Token::Punct("(")) => {
                self.read_type()?;
                self.expect(")")
            }
            other => Err(format!("expected type, found {}", Self::found(other.as_ref()))),
        }
    }

    /// Comma-separated types up to `close`, trailing comma allowed.
    fn read_type_list(&mut self, close: &str) -> std::result::Result<(), String> {
        loop {
            self.read_type()?;
            if self.at(",") {
                self.pos += 1;
                if self.at(close) {
                    break;
                }
            } else {
                break;
            }
        }
        self.expect(close)
    }

    fn read_signature(&mut self) -> std::result::Result<(), String> {
        self.expect("(")?;
        self.read_parameters()?;
        if self.at("(") {
            self.pos += 1;
            self.read_parameters()
        } else if Self::starts_type(self.peek()) {
            self.read_type()
        } else {
            Ok(())
        }
    }

    fn read_parameters(&mut self) -> std::result::Result<(), String> {
        if self.at(")") {
            self.pos += 1;
            return Ok(());
        }
        loop {
            self.read_parameter()?;
            if !self.at(",") {
                break;
            }
            self.pos += 1;
            if self.at(")") {
                break;
            }
        }
        self.expect(")")
    }

    fn read_parameter(&mut self) -> std::result::Result<(), String> {
        if self.at("...") {
            self.pos += 1;
            return self.read_type();
        }

        // `name T`, `name ...T` or `name []T`; otherwise the parameter is a bare type
        let named = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(name)), Some(next)) if is_identifier(name) => match next {
                Token::Punct("...") => true,
                Token::Punct("[") => matches!(self.peek_at(2), Some(Token::Punct("]"))),
                Token::Punct(".") => false,
                _ => Self::starts_type(Some(next)),
            },
            _ => false,
        };
        if named {
            self.pos += 1;
            if self.at("...") {
                self.pos += 1;
            }
        }
        self.read_type()
    }

    fn read_body(&mut self) -> std::result::Result<(), String> {
        self.expect("{")?;
        let mut depth = 1;
        while depth > 0 {
            match self.next() {
                Some(Token::Punct("{")) => depth += 1,
                Some(Token::Punct("}")) => depth -= 1,
                Some(_) => {}
                None => return Err("'{' is never closed".to_string()),
            }
        }
        Ok(())
    }
}

fn is_type_keyword(word: &str) -> bool {
    matches!(word, "map" | "chan" | "func" | "struct" | "interface")
}

/// Problem with `text` as a single Go type expression, if any.
pub fn check_type_expression(text: &str) -> Option<String> {
    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(problem) => return Some(problem),
    };

    let mut reader = TypeReader { tokens, pos: 0 };
    if let Err(problem) = reader.read_type() {
        return Some(problem);
    }
    reader
        .peek()
        .map(|extra| format!("unexpected {} after type", extra))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_comments_and_literals() {
        let masked = mask_non_code("a := \"x(\" // (\nb := `{` /* [ */ c");
        assert_eq!(masked.code, "a := \"  \"     \nb := ` `         c");
        assert!(masked.unterminated.is_none());
    }

    #[test]
    fn masking_keeps_line_structure() {
        let src = "/* one\ntwo */\npackage x\n";
        let masked = mask_non_code(src);
        assert_eq!(masked.code.lines().count(), src.lines().count());
        assert!(masked.code.contains("package x"));
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        let masked = mask_non_code(r#"s := "a\"(" + x"#);
        assert!(masked.unterminated.is_none());
        assert!(check_brackets(&masked.code).is_none());
    }

    #[test]
    fn reports_unterminated_literal() {
        let masked = mask_non_code("x := \"open\ny := 1\n");
        assert_eq!(masked.unterminated, Some(Position { line: 1, column: 6 }));

        let masked = mask_non_code("/* never closed");
        assert_eq!(masked.unterminated, Some(Position { line: 1, column: 1 }));
    }

    #[test]
    fn balanced_brackets_pass() {
        assert!(check_brackets("func f() { m := map[int][]string{} }").is_none());
    }

    #[test]
    fn mismatched_bracket_is_reported() {
        let diag = check_brackets("cache map[string)int").unwrap();
        assert!(diag.starts_with("1:17: unexpected ')'"), "{}", diag);
    }

    #[test]
    fn unclosed_bracket_is_reported_at_opening() {
        let diag = check_brackets("a\nfunc(keys []map[string) {").unwrap();
        assert!(diag.contains("unexpected ')'"), "{}", diag);

        let diag = check_brackets("x := [\n").unwrap();
        assert_eq!(diag, "1:6: '[' is never closed");
    }

    #[test]
    fn accepts_go_type_expressions() {
        for ty in [
            "int",
            "*models.User",
            "[]models.User",
            "[16]byte",
            "[N]int",
            "map[string][]*User",
            "map[string]struct{ A int `json:\"a\"` }",
            "chan<- int",
            "<-chan error",
            "func(ctx context.Context, ids ...int) (string, error)",
            "func(int, string) error",
            "func(a, b []int)",
            "interface{ ~int | ~string }",
            "store.Page[models.User, int]",
            "(int)",
        ] {
            assert_eq!(check_type_expression(ty), None, "{}", ty);
        }
    }

    #[test]
    fn rejects_what_cannot_be_a_type() {
        assert_eq!(
            check_type_expression("a b").as_deref(),
            Some("unexpected 'b' after type")
        );
        assert_eq!(
            check_type_expression("1").as_deref(),
            Some("expected type, found '1'")
        );
        assert_eq!(
            check_type_expression("func").as_deref(),
            Some("expected '(', found end of input")
        );
        assert!(check_type_expression("").is_some());
        assert!(check_type_expression("map[string").is_some());
        assert!(check_type_expression("type").is_some());
        assert!(check_type_expression("models.").is_some());
        assert!(check_type_expression("int;").is_some());
        assert!(check_type_expression("a-b").is_some());
        assert!(check_type_expression("struct{").is_some());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("loaders"));
        assert!(is_identifier("_v2"));
        assert!(is_identifier("donn\u{e9}es"));
        assert!(!is_identifier("my-pkg"));
        assert!(!is_identifier("2fa"));
        assert!(!is_identifier("type"));
        assert!(!is_identifier(""));
    }
}
