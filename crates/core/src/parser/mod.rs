//! Recursive-descent parser from tokens to [`Document`].
//!
//! Type names and variants are not resolved here; the validator does that.
use crate::ast::{Document, Include};
use crate::error::{ParseError, RecError, Span};
use crate::lexer::{Spanned, Token};

mod decls;
mod values;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

/// Deepest nesting of values or type references a document may use.
pub const MAX_NESTING: usize = 128;

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
            depth: 0,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        &self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)].token
    }

    fn span(&self) -> Span {
        let cur = self.cur();
        Span::new(self.filename.as_str(), cur.line, cur.column)
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err_at(&self, span: Span, e: ParseError) -> RecError {
        RecError::new(e, span)
    }

    fn unexpected(&self, expected: &str) -> RecError {
        self.err_at(
            self.span(),
            ParseError::UnexpectedToken {
                expected: expected.to_owned(),
                found: self.peek().describe(),
            },
        )
    }

    fn expect(&mut self, token: Token) -> Result<(), RecError> {
        if self.peek() == &token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.describe()))
        }
    }

    fn take_word(&mut self) -> Result<String, RecError> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn take_str(&mut self) -> Result<String, RecError> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.unexpected("string literal"))
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RecError>,
    ) -> Result<T, RecError> {
        if self.depth >= MAX_NESTING {
            return Err(self.err_at(
                self.span(),
                ParseError::UnexpectedToken {
                    expected: format!("at most {} levels of nesting", MAX_NESTING),
                    found: "nesting too deep".to_owned(),
                },
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn skip_comma(&mut self) {
        if self.peek() == &Token::Comma {
            self.advance();
        }
    }

    /// Whether the block opened at `open` ends at the current token.
    ///
    /// End of input or a closing bracket of the wrong kind inside a block is
    /// reported as unbalanced rather than as an unexpected token.
    fn at_close(&self, close: &Token, open: &Span) -> Result<bool, RecError> {
        match self.peek() {
            t if t == close => Ok(true),
            Token::Eof => Err(self.err_at(
                self.span(),
                ParseError::UnbalancedBraces(format!(
                    "block opened at {} is never closed with {}",
                    open,
                    close.describe()
                )),
            )),
            t @ (Token::RBrace | Token::RBracket | Token::RParen) => Err(self.err_at(
                self.span(),
                ParseError::UnbalancedBraces(format!(
                    "found {} where {} closes the block opened at {}",
                    t.describe(),
                    close.describe(),
                    open
                )),
            )),
            _ => Ok(false),
        }
    }

    // -- Top level ------------------------------------------------

    fn parse_document(&mut self) -> Result<Document, RecError> {
        let mut includes = Vec::new();
        while self.peek() == &Token::Hash {
            includes.push(self.parse_include()?);
        }

        let mut decls = Vec::new();
        while self.peek() == &Token::At {
            decls.push(self.parse_decl()?);
        }

        match self.peek() {
            Token::LBrace => {}
            Token::Hash => {
                return Err(self.unexpected("declaration or root object (#include must come first)"))
            }
            _ => return Err(self.unexpected("root object '{'")),
        }
        let root = self.parse_object(None)?;

        match self.peek() {
            Token::Eof => {}
            t @ (Token::RBrace | Token::RBracket | Token::RParen) => {
                return Err(self.err_at(
                    self.span(),
                    ParseError::UnbalancedBraces(format!("unmatched {}", t.describe())),
                ))
            }
            _ => return Err(self.unexpected("end of input after the root object")),
        }

        Ok(Document {
            includes,
            decls,
            root,
        })
    }

    fn parse_include(&mut self) -> Result<Include, RecError> {
        let span = self.span();
        self.expect(Token::Hash)?;
        match self.peek() {
            Token::Word(w) if w == "include" => {
                self.advance();
            }
            _ => return Err(self.unexpected("'include' after '#'")),
        }
        let path = self.take_str()?;
        Ok(Include { path, span })
    }
}

/// Parse a token stream produced by [`crate::lexer::tokenize`], which ends
/// with [`Token::Eof`].
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<Document, RecError> {
    if tokens.is_empty() {
        return Err(RecError::new(
            ParseError::UnexpectedToken {
                expected: "root object '{'".to_owned(),
                found: Token::Eof.describe(),
            },
            Span::file_start(filename),
        ));
    }
    let mut p = Parser::new(tokens, filename);
    p.parse_document()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
