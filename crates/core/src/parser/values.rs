use super::Parser;
use crate::ast::{
    Entry, ExtendedKind, ObjectNode, PayloadNode, ValueKind, ValueNode, VariantLiteral,
};
use crate::error::{ParseError, RecError};
use crate::lexer::Token;
use indexmap::IndexMap;

impl<'a> Parser<'a> {
    // -- Values ---------------------------------------------------

    pub(super) fn parse_value(&mut self) -> Result<ValueNode, RecError> {
        self.nested(Self::parse_value_here)
    }

    fn parse_value_here(&mut self) -> Result<ValueNode, RecError> {
        let span = self.span();
        let kind = match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                ValueKind::String(s)
            }
            Token::Int(n) => {
                self.advance();
                ValueKind::Int(n)
            }
            Token::Float(text) => {
                let f: f64 = text.parse().map_err(|_| self.unexpected("float literal"))?;
                self.advance();
                ValueKind::Float(f)
            }
            Token::LBracket => ValueKind::Array(self.parse_array()?),
            Token::LBrace => ValueKind::Object(self.parse_object(None)?),
            Token::Word(w) => match (w.as_str(), self.peek_at(1).clone()) {
                ("true", _) => {
                    self.advance();
                    ValueKind::Bool(true)
                }
                ("false", _) => {
                    self.advance();
                    ValueKind::Bool(false)
                }
                ("null", _) => {
                    self.advance();
                    ValueKind::Null
                }
                (_, Token::LParen) if ExtendedKind::from_keyword(&w).is_some() => {
                    self.parse_extended()?
                }
                (_, Token::Dot) => ValueKind::Variant(self.parse_variant_literal()?),
                (_, Token::LBrace) => {
                    self.advance();
                    ValueKind::Object(self.parse_object(Some(w))?)
                }
                _ => return Err(self.unexpected("value")),
            },
            _ => return Err(self.unexpected("value")),
        };
        Ok(ValueNode { kind, span })
    }

    /// `{ key: value ... }`. The caller has already consumed any annotation.
    pub(super) fn parse_object(
        &mut self,
        annotation: Option<String>,
    ) -> Result<ObjectNode, RecError> {
        let span = self.span();
        let entries = self.parse_entries()?;
        Ok(ObjectNode {
            annotation,
            entries,
            span,
        })
    }

    fn parse_entries(&mut self) -> Result<IndexMap<String, Entry>, RecError> {
        let open = self.span();
        self.expect(Token::LBrace)?;
        let mut entries: IndexMap<String, Entry> = IndexMap::new();
        while !self.at_close(&Token::RBrace, &open)? {
            let key_span = self.span();
            let key = match self.peek() {
                Token::Word(_) => self.take_word()?,
                _ => return Err(self.unexpected("key")),
            };
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            if entries.contains_key(&key) {
                return Err(self.err_at(key_span, ParseError::DuplicateKey(key)));
            }
            entries.insert(key, Entry { key_span, value });
            self.skip_comma();
        }
        self.advance();
        Ok(entries)
    }

    fn parse_array(&mut self) -> Result<Vec<ValueNode>, RecError> {
        let open = self.span();
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        while !self.at_close(&Token::RBracket, &open)? {
            items.push(self.parse_value()?);
            self.skip_comma();
        }
        self.advance();
        Ok(items)
    }

    /// `url("...")`, `socket("...")`, `pubkey("...")`
    fn parse_extended(&mut self) -> Result<ValueKind, RecError> {
        let word = self.take_word()?;
        let kind = ExtendedKind::from_keyword(&word)
            .ok_or_else(|| self.unexpected("url, socket or pubkey"))?;
        self.expect(Token::LParen)?;
        let arg_span = self.span();
        let raw = match (self.peek().clone(), self.peek_at(1)) {
            (Token::Str(s), Token::RParen) => s,
            _ => {
                return Err(self.err_at(
                    arg_span,
                    ParseError::InvalidLiteralArgument(kind.keyword().to_owned()),
                ))
            }
        };
        self.advance();
        self.advance();
        Ok(ValueKind::Extended { kind, raw })
    }

    /// `Enum.Variant` with an optional `( ... )` or `{ ... }` payload.
    fn parse_variant_literal(&mut self) -> Result<VariantLiteral, RecError> {
        let enum_name = self.take_word()?;
        self.expect(Token::Dot)?;
        let variant = self.take_word()?;
        let payload = match self.peek() {
            Token::LBrace => PayloadNode::Struct(self.parse_entries()?),
            Token::LParen => PayloadNode::Tuple(self.parse_tuple_values()?),
            _ => PayloadNode::Unit,
        };
        Ok(VariantLiteral {
            enum_name,
            variant,
            payload,
        })
    }

    fn parse_tuple_values(&mut self) -> Result<Vec<ValueNode>, RecError> {
        let open = self.span();
        self.expect(Token::LParen)?;
        let mut items = Vec::new();
        loop {
            items.push(self.parse_value()?);
            if self.peek() == &Token::Comma {
                self.advance();
                continue;
            }
            if self.at_close(&Token::RParen, &open)? {
                self.advance();
                return Ok(items);
            }
            return Err(self.unexpected("',' or ')'"));
        }
    }
}
