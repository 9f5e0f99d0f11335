use sparql_parts_model::QueryParseError;

/// Bytes that may occur in a bare name (keywords, variable names, prefix
/// labels and local parts).
pub(crate) fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// A short prefix of `text` for error messages.
pub(crate) fn snippet(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.char_indices().nth(24) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

/// Byte cursor over query text.
///
/// The supported grammar is ASCII-structured: every delimiter and keyword is
/// ASCII, so the cursor walks bytes and only slices at ASCII boundaries.
/// Multi-byte content inside string literals and IRIs passes through intact.
pub(crate) struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Scanner { text, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Skips whitespace and `#` line comments. Only called at token
    /// boundaries, where a `#` cannot belong to an IRI.
    pub(crate) fn skip_trivia(&mut self) {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else if byte == b'#' {
                while let Some(inner) = self.bump() {
                    if inner == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Consumes `keyword` case-insensitively if it starts here and ends at a
    /// word boundary. A trailing `:` counts as a non-boundary so that a
    /// prefixed name like `where:x` is not mistaken for the keyword.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        let bytes = self.text.as_bytes();
        let end = self.pos + keyword.len();
        if end > bytes.len() || !bytes[self.pos..end].eq_ignore_ascii_case(keyword.as_bytes()) {
            return false;
        }
        if bytes.get(end).is_some_and(|b| is_name_byte(*b) || *b == b':') {
            return false;
        }
        self.pos = end;
        true
    }

    pub(crate) fn eat_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Reads an `<...>` IRI reference and returns the text between the
    /// angle brackets. The content is taken verbatim; no RFC 3987
    /// validation happens here.
    pub(crate) fn read_iri_ref(&mut self) -> Result<&'a str, QueryParseError> {
        if !self.eat_byte(b'<') {
            return Err(QueryParseError::malformed(format!(
                "expected an IRI reference near {:?}",
                snippet(self.rest())
            )));
        }
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b'>' {
                let iri = &self.text[start..self.pos];
                self.pos += 1;
                return Ok(iri);
            }
            if byte.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        Err(QueryParseError::malformed("unterminated IRI reference"))
    }

    /// Reads a `{ ... }` block and returns the text between the outer
    /// braces. Braces inside string literals do not count; IRIs cannot
    /// contain braces, so only quotes need tracking.
    pub(crate) fn read_braced_block(&mut self) -> Result<&'a str, QueryParseError> {
        self.read_delimited_block(b'{', b'}')
    }

    /// Reads a `( ... )` group and returns the text between the outer
    /// parentheses.
    pub(crate) fn read_parenthesized(&mut self) -> Result<&'a str, QueryParseError> {
        self.read_delimited_block(b'(', b')')
    }

    fn read_delimited_block(&mut self, open: u8, close: u8) -> Result<&'a str, QueryParseError> {
        if !self.eat_byte(open) {
            return Err(QueryParseError::malformed(format!(
                "expected {:?} near {:?}",
                char::from(open),
                snippet(self.rest())
            )));
        }
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(byte) = self.peek() {
            if byte == b'"' || byte == b'\'' {
                self.skip_string()?;
            } else if byte == open {
                depth += 1;
                self.pos += 1;
            } else if byte == close {
                depth -= 1;
                if depth == 0 {
                    let inner = &self.text[start..self.pos];
                    self.pos += 1;
                    return Ok(inner);
                }
                self.pos += 1;
            } else {
                self.pos += 1;
            }
        }
        Err(QueryParseError::malformed("unterminated block"))
    }

    /// Skips a quoted string, honoring backslash escapes. The cursor must
    /// sit on the opening quote.
    pub(crate) fn skip_string(&mut self) -> Result<(), QueryParseError> {
        let Some(quote) = self.bump() else {
            return Err(QueryParseError::malformed("expected a string literal"));
        };
        while let Some(byte) = self.bump() {
            if byte == b'\\' {
                self.bump();
            } else if byte == quote {
                return Ok(());
            }
        }
        Err(QueryParseError::malformed("unterminated string literal"))
    }

    /// Skips `<...>` when it reads as an IRI reference, i.e. a `>` appears
    /// before any whitespace. Otherwise the `<` is an operator and only it
    /// is consumed. The cursor must sit on the `<`.
    pub(crate) fn skip_iri_if_any(&mut self) -> bool {
        let bytes = self.text.as_bytes();
        let mut idx = self.pos + 1;
        while let Some(byte) = bytes.get(idx) {
            if *byte == b'>' {
                self.pos = idx + 1;
                return true;
            }
            if byte.is_ascii_whitespace() {
                break;
            }
            idx += 1;
        }
        self.pos += 1;
        false
    }

    /// Skips one lexical atom: a string literal, an IRI reference, a word
    /// (with an attached prefixed-name tail), a balanced `{}` block, or a
    /// single byte.
    pub(crate) fn skip_atom(&mut self) -> Result<(), QueryParseError> {
        match self.peek() {
            None => Ok(()),
            Some(b'"' | b'\'') => self.skip_string(),
            Some(b'<') => {
                self.skip_iri_if_any();
                Ok(())
            }
            Some(b'{') => self.read_braced_block().map(|_| ()),
            Some(b'?' | b'$' | b':') => {
                self.pos += 1;
                self.skip_word();
                Ok(())
            }
            Some(byte) if is_name_byte(byte) => {
                self.skip_word();
                Ok(())
            }
            Some(_) => {
                self.pos += 1;
                Ok(())
            }
        }
    }

    fn skip_word(&mut self) {
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        // a prefixed name is one atom: name:local
        if self.peek() == Some(b':') {
            self.pos += 1;
            while self.peek().is_some_and(is_name_byte) {
                self.pos += 1;
            }
        }
    }

    /// Advances to just past the next top-level occurrence of `keyword`,
    /// skipping string literals, IRI references, comments, prefixed names
    /// and balanced `{}` blocks. Returns false when the text is exhausted.
    pub(crate) fn find_keyword(&mut self, keyword: &str) -> bool {
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                return false;
            }
            if self.peek().is_some_and(is_name_byte) && self.eat_keyword(keyword) {
                return true;
            }
            if self.skip_atom().is_err() {
                return false;
            }
        }
    }

    /// Reads the label of a `PREFIX` declaration up to and including the
    /// `:` separator. The label may be empty (`PREFIX : <...>`).
    pub(crate) fn read_prefix_label(&mut self) -> Result<&'a str, QueryParseError> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        let label = &self.text[start..self.pos];
        if self.eat_byte(b':') {
            Ok(label)
        } else {
            Err(QueryParseError::malformed(format!(
                "expected ':' after the prefix label near {:?}",
                snippet(self.rest())
            )))
        }
    }

    /// Reads a variable name. The cursor must sit on the `?` or `$` sigil.
    pub(crate) fn read_variable(&mut self) -> Result<&'a str, QueryParseError> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(QueryParseError::malformed("empty variable name"));
        }
        Ok(&self.text[start..self.pos])
    }
}

/// Consumes `keyword` or fails with a [`QueryParseError::MalformedQuery`].
pub(crate) fn expect_keyword(scanner: &mut Scanner<'_>, keyword: &str) -> Result<(), QueryParseError> {
    if scanner.eat_keyword(keyword) {
        Ok(())
    } else {
        Err(QueryParseError::malformed(format!(
            "expected {} near {:?}",
            keyword,
            snippet(scanner.rest())
        )))
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn keyword_matching_is_case_insensitive_and_bounded() {
        let mut scanner = Scanner::new("Graph <http://g/>");
        assert!(scanner.eat_keyword("GRAPH"));

        let mut scanner = Scanner::new("GRAPHS <http://g/>");
        assert!(!scanner.eat_keyword("GRAPH"));

        // a prefixed name must not match the keyword
        let mut scanner = Scanner::new("where:x");
        assert!(!scanner.eat_keyword("WHERE"));
    }

    #[test]
    fn braced_block_respects_nesting_and_strings() -> Result<(), QueryParseError> {
        let mut scanner = Scanner::new("{ a { b } \"}\" c } tail");
        assert_eq!(scanner.read_braced_block()?, " a { b } \"}\" c ");
        assert_eq!(scanner.rest(), " tail");
        Ok(())
    }

    #[test]
    fn unterminated_block_fails() {
        let mut scanner = Scanner::new("{ ?s ?p ?o ");
        scanner.read_braced_block().unwrap_err();
    }

    #[test]
    fn iri_lookahead_distinguishes_operators() {
        let mut scanner = Scanner::new("<http://foo/> rest");
        assert!(scanner.skip_iri_if_any());
        assert_eq!(scanner.rest(), " rest");

        let mut scanner = Scanner::new("< 40");
        assert!(!scanner.skip_iri_if_any());
        assert_eq!(scanner.rest(), " 40");
    }

    #[test]
    fn find_keyword_skips_strings_and_blocks() {
        let mut scanner = Scanner::new("\"FROM\" { FROM } FROM <http://g/>");
        assert!(scanner.find_keyword("FROM"));
        scanner.skip_trivia();
        assert!(scanner.rest().starts_with("<http://g/>"));
    }

    #[test]
    fn comments_are_trivia() {
        let mut scanner = Scanner::new("# comment\n  ASK");
        scanner.skip_trivia();
        assert!(scanner.eat_keyword("ASK"));
    }
}
