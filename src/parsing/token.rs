/// Receives the content between a matched token pair and returns the text
/// that replaces the whole span.
pub trait TokenHandler {
    fn handle_token(&mut self, content: &str) -> String;
}

impl<F> TokenHandler for F
where
    F: FnMut(&str) -> String,
{
    fn handle_token(&mut self, content: &str) -> String {
        self(content)
    }
}

/// Single-pass scanner for `open...close` token spans with backslash escapes.
///
/// A `\` directly before the open token suppresses the span: the literal open
/// token is emitted and the backslash dropped. A `\` directly before a close
/// token inside a span escapes it into the captured content and the scan keeps
/// looking for the real close token. An open token whose close token never
/// arrives is emitted literally, including everything after it.
#[derive(Debug, Clone)]
pub struct TokenScanner {
    open_token: String,
    close_token: String,
}

impl TokenScanner {
    pub fn new(open_token: impl Into<String>, close_token: impl Into<String>) -> Self {
        Self {
            open_token: open_token.into(),
            close_token: close_token.into(),
        }
    }

    pub fn scan<H: TokenHandler + ?Sized>(&self, text: &str, handler: &mut H) -> String {
        if text.is_empty() {
            return String::new();
        }
        let Some(mut start) = text.find(&self.open_token) else {
            return text.to_string();
        };

        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut content = String::new();
        let mut offset = 0;
        loop {
            if start > 0 && bytes[start - 1] == b'\\' {
                // Escaped open token: drop the backslash, keep the token text.
                out.push_str(&text[offset..start - 1]);
                out.push_str(&self.open_token);
                offset = start + self.open_token.len();
            } else {
                content.clear();
                out.push_str(&text[offset..start]);
                offset = start + self.open_token.len();
                let mut end = find_from(text, &self.close_token, offset);
                while let Some(e) = end {
                    if e > offset && bytes[e - 1] == b'\\' {
                        // Escaped close token: unescape it into the content.
                        content.push_str(&text[offset..e - 1]);
                        content.push_str(&self.close_token);
                        offset = e + self.close_token.len();
                        end = find_from(text, &self.close_token, offset);
                    } else {
                        content.push_str(&text[offset..e]);
                        break;
                    }
                }
                match end {
                    None => {
                        // Unterminated span degrades to literal text.
                        out.push_str(&text[start..]);
                        offset = text.len();
                    }
                    Some(e) => {
                        out.push_str(&handler.handle_token(&content));
                        offset = e + self.close_token.len();
                    }
                }
            }
            match find_from(text, &self.open_token, offset) {
                Some(next) => start = next,
                None => break,
            }
        }
        out.push_str(&text[offset..]);
        out
    }
}

fn find_from(text: &str, pattern: &str, from: usize) -> Option<usize> {
    if from >= text.len() {
        return None;
    }
    text[from..].find(pattern).map(|i| i + from)
}
