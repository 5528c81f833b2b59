use super::Parser;
use crate::ast::{Decl, EnumDecl, FieldDecl, TypeDecl, TypeRef, TypeSlot, VariantDecl, VariantShape};
use crate::error::{ParseError, RecError};
use crate::lexer::Token;
use std::collections::HashSet;

impl<'a> Parser<'a> {
    // -- Declarations ---------------------------------------------

    pub(super) fn parse_decl(&mut self) -> Result<Decl, RecError> {
        let span = self.span();
        self.expect(Token::At)?;
        let keyword = match self.peek() {
            Token::Word(w) if w == "enum" || w == "type" => w.clone(),
            _ => return Err(self.unexpected("'enum' or 'type' after '@'")),
        };
        self.advance();
        let name = self.take_word()?;
        if keyword == "enum" {
            let variants = self.parse_enum_body()?;
            Ok(Decl::Enum(EnumDecl {
                name,
                variants,
                span,
            }))
        } else {
            let fields = self.parse_field_block()?;
            Ok(Decl::Type(TypeDecl { name, fields, span }))
        }
    }

    fn parse_enum_body(&mut self) -> Result<Vec<VariantDecl>, RecError> {
        let open = self.span();
        self.expect(Token::LBrace)?;
        let mut variants: Vec<VariantDecl> = Vec::new();
        let mut seen = HashSet::new();
        while !self.at_close(&Token::RBrace, &open)? {
            let span = self.span();
            let name = self.take_word()?;
            let shape = match self.peek() {
                Token::LParen => VariantShape::Tuple(self.parse_tuple_types()?),
                Token::LBrace => VariantShape::Struct(self.parse_field_block()?),
                _ => VariantShape::Unit,
            };
            if !seen.insert(name.clone()) {
                return Err(self.err_at(span, ParseError::DuplicateVariant(name)));
            }
            variants.push(VariantDecl { name, shape, span });
            self.skip_comma();
        }
        if variants.is_empty() {
            return Err(self.unexpected("at least one enum variant"));
        }
        self.advance();
        Ok(variants)
    }

    fn parse_tuple_types(&mut self) -> Result<Vec<TypeSlot>, RecError> {
        let open = self.span();
        self.expect(Token::LParen)?;
        let mut items = Vec::new();
        loop {
            let span = self.span();
            let ty = self.parse_type()?;
            items.push(TypeSlot { ty, span });
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

    /// `{ name: type  name?: type ... }`, shared by `@type` bodies and
    /// struct variants.
    pub(super) fn parse_field_block(&mut self) -> Result<Vec<FieldDecl>, RecError> {
        let open = self.span();
        self.expect(Token::LBrace)?;
        let mut fields: Vec<FieldDecl> = Vec::new();
        let mut seen = HashSet::new();
        while !self.at_close(&Token::RBrace, &open)? {
            let span = self.span();
            let name = self.take_word()?;
            let optional = if self.peek() == &Token::Question {
                self.advance();
                true
            } else {
                false
            };
            self.expect(Token::Colon)?;
            let ty = self.parse_type()?;
            if !seen.insert(name.clone()) {
                return Err(self.err_at(span, ParseError::DuplicateField(name)));
            }
            fields.push(FieldDecl {
                name,
                ty,
                optional,
                span,
            });
            self.skip_comma();
        }
        self.advance();
        Ok(fields)
    }

    // -- Type references ------------------------------------------

    pub(super) fn parse_type(&mut self) -> Result<TypeRef, RecError> {
        self.nested(Self::parse_type_here)
    }

    fn parse_type_here(&mut self) -> Result<TypeRef, RecError> {
        match self.peek().clone() {
            Token::LBracket => {
                let open = self.span();
                self.advance();
                let inner = self.parse_type()?;
                if !self.at_close(&Token::RBracket, &open)? {
                    return Err(self.unexpected("']'"));
                }
                self.advance();
                Ok(TypeRef::Array(Box::new(inner)))
            }
            Token::Word(w) => {
                self.advance();
                Ok(TypeRef::primitive(&w).unwrap_or(TypeRef::Named(w)))
            }
            _ => Err(self.unexpected("type")),
        }
    }
}
