use crate::keys::Key;
use std::borrow::Cow;
use crate::{Error, Token, TokenKind};

/// Forward reader over a token array and the text it was produced from.
///
/// Every `read_*` consumes exactly one token. Containers are entered with
/// [`enter_object`](Self::enter_object)/[`enter_array`](Self::enter_array), which consume
/// the container token and hand back its child count; the caller then reads the children.
#[derive(Clone, Debug)]
pub(crate) struct TokenCursor<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub(crate) fn new(text: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn peek(&self) -> Result<&'a Token, Error> {
        self.tokens
            .get(self.pos)
            .ok_or_else(|| Error::UnexpectedToken {
                expected: "value",
                offset: self.text.len(),
            })
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<&'a Token, Error> {
        let token = self.peek()?;
        if token.kind != kind {
            return Err(Error::UnexpectedToken {
                expected,
                offset: token.start,
            });
        }
        self.pos += 1;
        Ok(token)
    }

    fn slice(&self, token: &Token) -> Result<&'a str, Error> {
        self.text
            .get(token.start..token.end)
            .ok_or(Error::UnexpectedToken {
                expected: "token inside the document",
                offset: token.start,
            })
    }

    /// Raw string contents, escapes included.
    pub(crate) fn read_str(&mut self) -> Result<&'a str, Error> {
        let token = self.expect(TokenKind::String, "string")?;
        self.slice(token)
    }

    /// String contents with JSON escapes resolved. Borrows when there is nothing to resolve.
    pub(crate) fn read_string(&mut self) -> Result<Cow<'a, str>, Error> {
        let token = self.expect(TokenKind::String, "string")?;
        let raw = self.slice(token)?;
        if !raw.contains('\\') {
            return Ok(Cow::Borrowed(raw));
        }
        unescape(raw)
            .map(Cow::Owned)
            .ok_or(Error::UnexpectedToken {
                expected: "valid string escape",
                offset: token.start,
            })
    }

    pub(crate) fn read_key(&mut self) -> Result<Key, Error> {
        let name = self.read_str()?;
        let key = Key::lookup(name);
        if key == Key::Unknown {
            log::trace!("skipping unknown member '{name}'");
        }
        Ok(key)
    }

    fn read_number_text(&mut self) -> Result<(&'a str, usize), Error> {
        let token = self.expect(TokenKind::Primitive, "number")?;
        Ok((self.slice(token)?, token.start))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64, Error> {
        let (text, offset) = self.read_number_text()?;
        if let Ok(v) = text.parse::<i64>() {
            return Ok(v);
        }
        // Exporters occasionally write integral members as `3.0`.
        match text.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
            _ => Err(Error::InvalidNumber {
                text: text.to_string(),
                offset,
            }),
        }
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, Error> {
        let offset = self.peek()?.start;
        let v = self.read_i64()?;
        u32::try_from(v).map_err(|_| Error::InvalidNumber {
            text: v.to_string(),
            offset,
        })
    }

    pub(crate) fn read_usize(&mut self) -> Result<usize, Error> {
        Ok(self.read_u32()? as usize)
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, Error> {
        let (text, offset) = self.read_number_text()?;
        text.parse::<f32>().map_err(|_| Error::InvalidNumber {
            text: text.to_string(),
            offset,
        })
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool, Error> {
        let (text, offset) = self.read_number_text()?;
        match text {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::UnexpectedToken {
                expected: "boolean",
                offset,
            }),
        }
    }

    /// Consumes an object token and returns its key count.
    pub(crate) fn enter_object(&mut self) -> Result<usize, Error> {
        Ok(self.expect(TokenKind::Object, "object")?.size)
    }

    /// Consumes an array token and returns its element count.
    pub(crate) fn enter_array(&mut self) -> Result<usize, Error> {
        Ok(self.expect(TokenKind::Array, "array")?.size)
    }

    /// Reads a float array into `out`, returning the element count found.
    ///
    /// The array is consumed in full either way; callers decide whether a short or long
    /// array is an error. Elements past `out.len()` are skipped.
    pub(crate) fn read_f32_into(&mut self, out: &mut [f32]) -> Result<usize, Error> {
        let count = self.enter_array()?;
        for i in 0..count {
            if i < out.len() {
                out[i] = self.read_f32()?;
            } else {
                self.skip_value()?;
            }
        }
        Ok(count)
    }

    /// Skips one complete value and returns the number of tokens it spanned.
    pub(crate) fn skip_value(&mut self) -> Result<usize, Error> {
        let span = value_span(self.tokens, self.pos).ok_or(Error::UnexpectedToken {
            expected: "complete value",
            offset: self.text.len(),
        })?;
        self.pos += span;
        Ok(span)
    }
}

/// Number of tokens occupied by the value starting at `pos`, descendants included.
///
/// Each object contributes two slots per key (key and value), each array one per element.
/// Returns `None` when the token array ends before the value does, or when a container
/// claims more children than can be counted.
pub(crate) fn value_span(tokens: &[Token], pos: usize) -> Option<usize> {
    let mut remaining = 1usize;
    let mut cursor = pos;
    while remaining > 0 {
        let token = tokens.get(cursor)?;
        remaining -= 1;
        let slots = match token.kind {
            TokenKind::Object => token.size.checked_mul(2)?,
            TokenKind::Array => token.size,
            TokenKind::String | TokenKind::Primitive => 0,
        };
        remaining = remaining.checked_add(slots)?;
        cursor += 1;
    }
    Some(cursor - pos)
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let resolved = match chars.next()? {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let high = hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                char::from_u32(code)?
            }
            _ => return None,
        };
        out.push(resolved);
    }
    Some(out)
}
