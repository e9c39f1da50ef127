use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    Prefix { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to the part on the left.
    pub(crate) combinator: Option<Combinator>,
}

/// Parsed selector list: a comma separated group of compound chains.
///
/// Supports type, universal, `#id`, `.class`, `[attr]`, `[attr=value]`,
/// `[attr^=prefix]`, and descendant / child combinators. That covers every hook the site uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub(crate) groups: Vec<Vec<SelectorPart>>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(SelectorError::Empty);
        }
        let groups = split_outside_brackets(selector, ',')
            .into_iter()
            .map(|group| parse_chain(group, selector))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { groups })
    }
}

fn split_outside_brackets(input: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                out.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out
}

fn tokenize(chain: &str, full: &str) -> Result<Vec<String>, SelectorError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in chain.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                if depth == 0 {
                    return Err(SelectorError::Unsupported(full.into()));
                }
                depth -= 1;
                current.push(ch);
            }
            '>' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(">".into());
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(SelectorError::Unsupported(full.into()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_chain(chain: &str, full: &str) -> Result<Vec<SelectorPart>, SelectorError> {
    let tokens = tokenize(chain.trim(), full)?;
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokens {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(SelectorError::Unsupported(full.into()));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let step = parse_step(&token, full)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(SelectorError::Unsupported(full.into()));
    }
    Ok(parts)
}

fn parse_step(part: &str, full: &str) -> Result<SelectorStep, SelectorError> {
    let unsupported = || SelectorError::Unsupported(full.into());
    let bytes = part.as_bytes();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() {
                    return Err(unsupported());
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported());
                }
                i = next;
            }
            b'.' => {
                let (class, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class);
                i = next;
            }
            b'[' => {
                let close = part[i..].find(']').map(|off| i + off).ok_or_else(unsupported)?;
                step.attrs.push(parse_attr(&part[i + 1..close]).ok_or_else(unsupported)?);
                i = close + 1;
            }
            _ => {
                if i != 0 {
                    return Err(unsupported());
                }
                let (tag, next) = parse_ident(part, i).ok_or_else(unsupported)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step == SelectorStep::default() {
        return Err(unsupported());
    }
    Ok(step)
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let rest = src.get(start..)?;
    let len = rest
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map_or(rest.len(), |(idx, _)| idx);
    if len == 0 {
        return None;
    }
    Some((rest[..len].to_string(), start + len))
}

fn parse_attr(inner: &str) -> Option<AttrCondition> {
    let inner = inner.trim();
    match inner.split_once('=') {
        None => {
            let (key, next) = parse_ident(inner, 0)?;
            (next == inner.len()).then_some(AttrCondition::Exists { key })
        }
        Some((key, value)) => {
            let key = key.trim();
            let (key, prefix) = match key.strip_suffix('^') {
                Some(key) => (key.trim_end(), true),
                None => (key, false),
            };
            let (parsed, next) = parse_ident(key, 0)?;
            if next != key.len() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value)
                .to_string();
            Some(if prefix {
                AttrCondition::Prefix { key: parsed, value }
            } else {
                AttrCondition::Eq { key: parsed, value }
            })
        }
    }
}
