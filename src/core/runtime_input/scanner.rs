use super::MarkerError;

/// A `.name(args)` suffix as it appears in the marker text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawQualifier<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

/// Reads chained qualifiers from the text that follows `<+input>`.
///
/// `base` is the byte offset of `text` inside the full marker and is only used
/// for error positions.
pub(crate) struct QualifierScanner<'a> {
    text: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> QualifierScanner<'a> {
    pub(crate) fn new(text: &'a str, base: usize) -> Self {
        Self { text, pos: 0, base }
    }

    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub(crate) fn next_qualifier(&mut self) -> Result<Option<RawQualifier<'a>>, MarkerError> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return Ok(None);
        }
        let Some(after_dot) = rest.strip_prefix('.') else {
            return Err(MarkerError::ExpectedQualifier {
                offset: self.offset(),
            });
        };

        let Some(name_len) = qualifier_name_len(after_dot) else {
            return Err(MarkerError::ExpectedQualifier {
                offset: self.offset(),
            });
        };
        let name = &after_dot[..name_len];

        let open = self.pos + 1 + name_len;
        let args_start = open + 1;
        let body = &self.text[args_start..];
        let close = find_closing_paren(body, true)
            .or_else(|| find_closing_paren(body, false))
            .ok_or(MarkerError::UnterminatedArguments {
                offset: self.base + open,
            })?;

        self.pos = args_start + close + 1;
        Ok(Some(RawQualifier {
            name,
            args: &body[..close],
        }))
    }

    /// Skip past a malformed qualifier to the next `.name(` at parenthesis
    /// depth zero. Returns `false` when no further qualifier can start.
    pub(crate) fn recover(&mut self) -> bool {
        let rest = &self.text[self.pos..];
        let mut depth = 0usize;
        for (index, c) in rest.char_indices().skip(1) {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '.' if depth == 0 && qualifier_name_len(&rest[index + 1..]).is_some() => {
                    self.pos += index;
                    return true;
                }
                _ => {}
            }
        }
        self.pos = self.text.len();
        false
    }
}

/// Length of the qualifier name at the start of `text`, provided it is
/// directly followed by `(`.
fn qualifier_name_len(text: &str) -> Option<usize> {
    let name_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    (name_len > 0 && text[name_len..].starts_with('(')).then_some(name_len)
}

/// Byte index of the `)` that closes an already-opened argument list.
/// With `honor_quotes`, parentheses inside ASCII quoted spans are ignored; an
/// unbalanced quote makes the caller retry without quote handling.
fn find_closing_paren(body: &str, honor_quotes: bool) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for (index, c) in body.char_indices() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' if honor_quotes => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an argument list on commas that are not nested in parentheses or
/// quotes. Items are trimmed; empty items are dropped.
pub(crate) fn split_top_level(args: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, c) in args.char_indices() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_item(&mut items, &args[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    push_item(&mut items, &args[start..]);
    items
}

fn push_item(items: &mut Vec<String>, item: &str) {
    let trimmed = item.trim();
    if !trimmed.is_empty() {
        items.push(trimmed.to_string());
    }
}
