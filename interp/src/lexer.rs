//! Tokenizer of content streams, and object parsing on top of a token source.
use crate::object::{name, Array, Dictionary, Name, Object, ObjectId};
use memchr::memmem;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    combinator::value,
    multi::many0_count,
    sequence::pair,
    IResult,
};
use std::{borrow::Cow, str::from_utf8};

type ParseError<'a> = nom::error::Error<&'a [u8]>;
type ParseResult<'a, O> = IResult<&'a [u8], O, ParseError<'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i32),
    Real(f32),
    Name(Name),
    String(Vec<u8>),
    Keyword(Name),
    OpenArray,
    CloseArray,
    OpenDict,
    CloseDict,
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("unexpected character {0:#x} at offset {1}")]
    UnexpectedChar(u8, usize),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated hex string")]
    UnterminatedHexString,
    #[error("unterminated array")]
    UnterminatedArray,
    #[error("unterminated dictionary")]
    UnterminatedDict,
    #[error("dictionary key is not a name")]
    DictKeyNotName,
    #[error("cannot find EI after inline image data")]
    MissingEndOfInlineImage,
}

/// Supplies tokens of one content stream to the interpreter.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, SyntaxError>;

    /// Read raw bytes of an inline image, the source is positioned right after
    /// the `ID` keyword. Consumes the `EI` keyword.
    fn read_inline_image_data(&mut self) -> Result<Vec<u8>, SyntaxError>;
}

fn is_white_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'\0')
}

fn is_delimiter(c: u8) -> bool {
    matches!(
        c,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(c: u8) -> bool {
    !is_white_space(c) && !is_delimiter(c)
}

fn comment(input: &[u8]) -> ParseResult<'_, ()> {
    value((), pair(tag(b"%"), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

fn whitespace_or_comment(input: &[u8]) -> ParseResult<'_, ()> {
    value(
        (),
        many0_count(alt((value((), take_while1(is_white_space)), comment))),
    )(input)
}

fn regular_chars(input: &[u8]) -> ParseResult<'_, &[u8]> {
    take_while1(is_regular)(input)
}

fn name_chars(input: &[u8]) -> ParseResult<'_, &[u8]> {
    take_while(is_regular)(input)
}

fn number_chars(input: &[u8]) -> ParseResult<'_, &[u8]> {
    take_while1(|c: u8| c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.'))(input)
}

/// Parse number leniently: repeated signs and a second decimal point are
/// tolerated, garbage becomes zero.
fn parse_number(s: &[u8]) -> Token {
    let s = from_utf8(s).unwrap_or_default();
    let neg = s.starts_with('-');
    let digits = s.trim_start_matches(['+', '-']);
    let digits = match digits.char_indices().filter(|(_, c)| *c == '.').nth(1) {
        Some((second_dot, _)) => &digits[..second_dot],
        None => digits,
    };
    if digits.is_empty() {
        return Token::Integer(0);
    }
    let sign = if neg { -1.0 } else { 1.0 };
    if digits.contains('.') {
        Token::Real(sign * digits.parse::<f32>().unwrap_or(0.0))
    } else {
        match digits.parse::<i32>() {
            Ok(v) => Token::Integer(if neg { -v } else { v }),
            Err(_) => Token::Real(sign * digits.parse::<f32>().unwrap_or(0.0)),
        }
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode `#xx` escapes of name, bytes not followed by two hex digits are kept.
fn normalize_name(buf: &[u8]) -> Cow<'_, [u8]> {
    if !buf.contains(&b'#') {
        return Cow::Borrowed(buf);
    }

    let mut result = Vec::with_capacity(buf.len());
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'#' {
            if let (Some(h), Some(l)) = (
                buf.get(i + 1).copied().and_then(hex_value),
                buf.get(i + 2).copied().and_then(hex_value),
            ) {
                result.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        result.push(buf[i]);
        i += 1;
    }
    Cow::Owned(result)
}

/// Decode literal string, `input` starts right after the opening `(`.
/// Returns decoded bytes and the count of consumed bytes, including the closing `)`.
fn literal_string(input: &[u8]) -> Result<(Vec<u8>, usize), SyntaxError> {
    let mut r = Vec::new();
    let mut depth = 1;
    let mut i = 0;
    while i < input.len() {
        let c = input[i];
        i += 1;
        match c {
            b'(' => {
                depth += 1;
                r.push(c);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((r, i));
                }
                r.push(c);
            }
            b'\r' => {
                if input.get(i) == Some(&b'\n') {
                    i += 1;
                }
                r.push(b'\n');
            }
            b'\\' => {
                let Some(&e) = input.get(i) else {
                    break;
                };
                i += 1;
                match e {
                    b'n' => r.push(b'\n'),
                    b'r' => r.push(b'\r'),
                    b't' => r.push(b'\t'),
                    b'b' => r.push(b'\x08'),
                    b'f' => r.push(b'\x0C'),
                    b'\r' => {
                        if input.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    b'\n' => {}
                    b'0'..=b'7' => {
                        let mut v = u32::from(e - b'0');
                        for _ in 0..2 {
                            match input.get(i) {
                                Some(&d @ b'0'..=b'7') => {
                                    v = v * 8 + u32::from(d - b'0');
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        r.push((v & 0xff) as u8);
                    }
                    _ => r.push(e),
                }
            }
            _ => r.push(c),
        }
    }
    Err(SyntaxError::UnterminatedString)
}

/// Decode hex string, `input` starts right after the opening `<`.
fn hex_string(input: &[u8]) -> Result<(Vec<u8>, usize), SyntaxError> {
    let end = memchr::memchr(b'>', input).ok_or(SyntaxError::UnterminatedHexString)?;
    let mut r = Vec::with_capacity(end / 2 + 1);
    let mut high = None;
    for v in input[..end].iter().copied().filter_map(hex_value) {
        match high.take() {
            None => high = Some(v),
            Some(h) => r.push(h << 4 | v),
        }
    }
    if let Some(h) = high {
        r.push(h << 4);
    }
    Ok((r, end + 1))
}

/// Content stream lexer over decoded stream bytes.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn remains(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn advance_to(&mut self, remains: &'a [u8]) {
        self.pos = self.buf.len() - remains.len();
    }

    fn skip_white_space(&mut self) {
        // whitespace_or_comment never fails, it matches empty input
        if let Ok((remains, _)) = whitespace_or_comment(self.remains()) {
            self.advance_to(remains);
        }
    }

    fn take_regular(&mut self) -> &'a [u8] {
        match regular_chars(self.remains()) {
            Ok((remains, r)) => {
                self.advance_to(remains);
                r
            }
            Err(_) => &[],
        }
    }
}

impl<'a> TokenSource for Lexer<'a> {
    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_white_space();
        let input = self.remains();
        let Some(&c) = input.first() else {
            return Ok(Token::EndOfStream);
        };

        let token = match c {
            b'/' => {
                self.pos += 1;
                let raw = match name_chars(self.remains()) {
                    Ok((remains, raw)) => {
                        self.advance_to(remains);
                        raw
                    }
                    Err(_) => &[],
                };
                Token::Name(name(&String::from_utf8_lossy(&normalize_name(raw))))
            }
            b'(' => {
                let (s, n) = literal_string(&input[1..])?;
                self.pos += 1 + n;
                Token::String(s)
            }
            b'<' if input.get(1) == Some(&b'<') => {
                self.pos += 2;
                Token::OpenDict
            }
            b'<' => {
                let (s, n) = hex_string(&input[1..])?;
                self.pos += 1 + n;
                Token::String(s)
            }
            b'>' if input.get(1) == Some(&b'>') => {
                self.pos += 2;
                Token::CloseDict
            }
            b'[' => {
                self.pos += 1;
                Token::OpenArray
            }
            b']' => {
                self.pos += 1;
                Token::CloseArray
            }
            b'{' | b'}' => {
                self.pos += 1;
                Token::Keyword(name(if c == b'{' { "{" } else { "}" }))
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => match number_chars(input) {
                Ok((remains, s)) => {
                    self.advance_to(remains);
                    parse_number(s)
                }
                Err(_) => return Err(SyntaxError::UnexpectedChar(c, self.pos)),
            },
            c if is_regular(c) => {
                let kw = self.take_regular();
                if kw == b"endstream" {
                    Token::EndOfStream
                } else {
                    Token::Keyword(name(&String::from_utf8_lossy(kw)))
                }
            }
            _ => {
                let pos = self.pos;
                self.pos += 1;
                return Err(SyntaxError::UnexpectedChar(c, pos));
            }
        };
        Ok(token)
    }

    fn read_inline_image_data(&mut self) -> Result<Vec<u8>, SyntaxError> {
        let mut input = self.remains();
        // single white space after ID
        match input {
            [b'\r', b'\n', ..] => input = &input[2..],
            [c, ..] if is_white_space(*c) => input = &input[1..],
            _ => {}
        }
        let start = self.buf.len() - input.len();

        for idx in memmem::find_iter(input, b"EI") {
            let before_ok = idx == 0 || is_white_space(input[idx - 1]);
            let after_ok = input
                .get(idx + 2)
                .map_or(true, |c| is_white_space(*c) || is_delimiter(*c));
            if before_ok && after_ok {
                let data_end = idx.saturating_sub(1);
                let data = input[..data_end].to_vec();
                self.pos = start + idx + 2;
                return Ok(data);
            }
        }
        Err(SyntaxError::MissingEndOfInlineImage)
    }
}

fn keyword_object(kw: &Name) -> Option<Object> {
    match kw.as_str() {
        "true" => Some(Object::Bool(true)),
        "false" => Some(Object::Bool(false)),
        "null" => Some(Object::Null),
        _ => None,
    }
}

/// Collect objects until `end`, folds `num gen R` into reference.
/// Returns true if stopped by `ID` keyword.
fn parse_items(
    src: &mut dyn TokenSource,
    items: &mut Vec<Object>,
    end: &Token,
    stop_at_id: bool,
) -> Result<(), SyntaxError> {
    loop {
        let token = src.next_token()?;
        if &token == end {
            return Ok(());
        }
        match token {
            Token::EndOfStream => {
                return Err(if *end == Token::CloseArray {
                    SyntaxError::UnterminatedArray
                } else {
                    SyntaxError::UnterminatedDict
                });
            }
            Token::Keyword(kw) if stop_at_id && kw.as_str() == "ID" => return Ok(()),
            Token::Keyword(kw) if kw.as_str() == "R" => {
                let n = items.len();
                match (n >= 2).then(|| (&items[n - 2], &items[n - 1])) {
                    Some((Object::Integer(id), Object::Integer(gen))) => {
                        let r = u32::try_from(*id)
                            .ok()
                            .zip(u16::try_from(*gen).ok())
                            .and_then(|(id, gen)| ObjectId::new_u32(id, gen))
                            .map_or(Object::Null, Object::Reference);
                        items.truncate(n - 2);
                        items.push(r);
                    }
                    _ => return Err(SyntaxError::UnexpectedToken("R".to_owned())),
                }
            }
            token => items.push(token_to_object(token, src)?),
        }
    }
}

fn token_to_object(token: Token, src: &mut dyn TokenSource) -> Result<Object, SyntaxError> {
    Ok(match token {
        Token::Integer(v) => Object::Integer(v),
        Token::Real(v) => Object::Number(v),
        Token::Name(n) => Object::Name(n),
        Token::String(s) => Object::String(s),
        Token::OpenArray => Object::Array(parse_array(src)?),
        Token::OpenDict => Object::Dictionary(parse_dict(src)?),
        Token::Keyword(kw) => {
            return keyword_object(&kw).ok_or(SyntaxError::UnexpectedToken(kw.to_string()))
        }
        t => return Err(SyntaxError::UnexpectedToken(format!("{:?}", t))),
    })
}

/// Parse array, `[` already consumed.
pub fn parse_array(src: &mut dyn TokenSource) -> Result<Array, SyntaxError> {
    let mut items = Array::new();
    parse_items(src, &mut items, &Token::CloseArray, false)?;
    Ok(items)
}

fn into_dict(items: Vec<Object>) -> Result<Dictionary, SyntaxError> {
    let mut d = Dictionary::new();
    let mut iter = items.into_iter();
    while let Some(key) = iter.next() {
        let Object::Name(key) = key else {
            return Err(SyntaxError::DictKeyNotName);
        };
        d.insert(key, iter.next().unwrap_or_default());
    }
    Ok(d)
}

/// Parse dictionary, `<<` already consumed.
pub fn parse_dict(src: &mut dyn TokenSource) -> Result<Dictionary, SyntaxError> {
    let mut items = vec![];
    parse_items(src, &mut items, &Token::CloseDict, false)?;
    into_dict(items)
}

/// Parse inline image dictionary, `BI` already consumed, stops after `ID` keyword.
pub fn parse_inline_image_dict(src: &mut dyn TokenSource) -> Result<Dictionary, SyntaxError> {
    let mut items = vec![];
    parse_items(src, &mut items, &Token::CloseDict, true)?;
    into_dict(items)
}
