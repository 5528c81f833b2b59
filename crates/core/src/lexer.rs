use crate::error::{LexError, RecError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords; the parser tells them apart
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Float literal, kept as written
    Float(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,
    Question,
    At,
    Hash,
    // End of input
    Eof,
}

impl Token {
    /// Human-readable rendering used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Int(n) => format!("integer {}", n),
            Token::Float(f) => format!("float {}", f),
            Token::LBrace => "'{'".to_owned(),
            Token::RBrace => "'}'".to_owned(),
            Token::LBracket => "'['".to_owned(),
            Token::RBracket => "']'".to_owned(),
            Token::LParen => "'('".to_owned(),
            Token::RParen => "')'".to_owned(),
            Token::Colon => "':'".to_owned(),
            Token::Comma => "','".to_owned(),
            Token::Dot => "'.'".to_owned(),
            Token::Question => "'?'".to_owned(),
            Token::At => "'@'".to_owned(),
            Token::Hash => "'#'".to_owned(),
            Token::Eof => "end of input".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

struct Cursor<'s> {
    chars: Vec<char>,
    pos: usize,
    offset: usize,
    line: u32,
    column: u32,
    filename: &'s str,
}

impl<'s> Cursor<'s> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn err(&self, line: u32, column: u32, e: LexError) -> RecError {
        RecError::new(e, Span::new(self.filename, line, column))
    }
}

/// Turn source text into a token vector terminated by [`Token::Eof`].
pub fn tokenize(src: &str, filename: &str) -> Result<Vec<Spanned>, RecError> {
    let mut cur = Cursor {
        chars: src.chars().collect(),
        pos: 0,
        offset: 0,
        line: 1,
        column: 1,
        filename,
    };
    let mut tokens = Vec::new();

    while let Some(c) = cur.peek() {
        let (line, column, offset) = (cur.line, cur.column, cur.offset);

        // Line comment
        if c == '/' && cur.peek_at(1) == Some('/') {
            while let Some(ch) = cur.peek() {
                if ch == '\n' {
                    break;
                }
                cur.bump();
            }
            continue;
        }

        // Block comment; the first `*/` closes it
        if c == '/' && cur.peek_at(1) == Some('*') {
            cur.bump();
            cur.bump();
            loop {
                match cur.peek() {
                    None => return Err(cur.err(line, column, LexError::UnterminatedComment)),
                    Some('*') if cur.peek_at(1) == Some('/') => {
                        cur.bump();
                        cur.bump();
                        break;
                    }
                    Some(_) => {
                        cur.bump();
                    }
                }
            }
            continue;
        }

        if c.is_whitespace() {
            cur.bump();
            continue;
        }

        let push = |tokens: &mut Vec<Spanned>, token: Token| {
            tokens.push(Spanned {
                token,
                line,
                column,
                offset,
            })
        };

        // String literal
        if c == '"' {
            cur.bump();
            let mut s = String::new();
            loop {
                match cur.peek() {
                    None | Some('\n') => {
                        return Err(cur.err(line, column, LexError::UnterminatedString))
                    }
                    Some('"') => {
                        cur.bump();
                        break;
                    }
                    Some('\\') => {
                        cur.bump();
                        match cur.bump() {
                            None | Some('\n') => {
                                return Err(cur.err(line, column, LexError::UnterminatedString))
                            }
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some('r') => s.push('\r'),
                            Some('0') => s.push('\0'),
                            Some(other) => {
                                s.push('\\');
                                s.push(other);
                            }
                        }
                    }
                    Some(ch) => {
                        s.push(ch);
                        cur.bump();
                    }
                }
            }
            push(&mut tokens, Token::Str(s));
            continue;
        }

        // Number
        if c.is_ascii_digit() || (c == '-' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            let mut text = String::new();
            if c == '-' {
                text.push('-');
                cur.bump();
            }
            while let Some(d) = cur.peek().filter(char::is_ascii_digit) {
                text.push(d);
                cur.bump();
            }
            if cur.peek() == Some('.') && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                text.push('.');
                cur.bump();
                while let Some(d) = cur.peek().filter(char::is_ascii_digit) {
                    text.push(d);
                    cur.bump();
                }
                // Too many integer digits overflow to infinity.
                if !text.parse::<f64>().is_ok_and(f64::is_finite) {
                    return Err(cur.err(line, column, LexError::InvalidNumber(text)));
                }
                push(&mut tokens, Token::Float(text));
            } else {
                let n: i64 = text
                    .parse()
                    .map_err(|_| cur.err(line, column, LexError::InvalidNumber(text.clone())))?;
                push(&mut tokens, Token::Int(n));
            }
            continue;
        }

        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '?' => Some(Token::Question),
            '@' => Some(Token::At),
            '#' => Some(Token::Hash),
            _ => None,
        };
        if let Some(token) = punct {
            cur.bump();
            push(&mut tokens, token);
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(ch) = cur.peek().filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_') {
                word.push(ch);
                cur.bump();
            }
            push(&mut tokens, Token::Word(word));
            continue;
        }

        return Err(cur.err(line, column, LexError::InvalidCharacter(c)));
    }

    tracing::trace!(file = filename, count = tokens.len(), "tokenized");
    tokens.push(Spanned {
        token: Token::Eof,
        line: cur.line,
        column: cur.column,
        offset: cur.offset,
    });
    Ok(tokens)
}
