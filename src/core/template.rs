//! Template-rendered cells.
//!
//! A deliberately small language, enough for badges and record links:
//!
//! ```text
//! <a href="{% url 'dcim:device' pk %}">{{ record.name|default:'<i>Unnamed</i>' }}</a>
//! <span class="label label-{{ status.bootstrap_class|lower }}">{{ status.name }}</span>
//! ```
//!
//! Resolved values are HTML-escaped. Literal text in the template, including
//! `default:` arguments, is trusted markup and emitted as is.

use crate::core::accessor::Accessor;
use crate::domain::model::{display_value, Record};
use crate::domain::ports::UrlResolver;
use crate::domain::schema::SchemaRegistry;
use crate::utils::error::{Result, TableError};
use regex::Regex;

const TAG_PATTERN: &str = r"(?s)\{\{(.*?)\}\}|\{%(.*?)%\}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Lower,
    Upper,
    /// Drops the prefix length from CIDR notation (`10.0.0.1/24` -> `10.0.0.1`).
    Host,
    Default(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Value {
        accessor: Accessor,
        filters: Vec<Filter>,
    },
    Url {
        route: String,
        args: Vec<Accessor>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CellTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let re = Regex::new(TAG_PATTERN).map_err(|e| template_error(source, e.to_string()))?;
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in re.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            push_text(&mut segments, source, &source[last..whole.start()])?;
            last = whole.end();

            if let Some(expr) = caps.get(1) {
                segments.push(parse_value(source, expr.as_str())?);
            } else if let Some(tag) = caps.get(2) {
                segments.push(parse_tag(source, tag.as_str())?);
            }
        }
        push_text(&mut segments, source, &source[last..])?;

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Accessors used by the template, in order of appearance.
    pub fn accessors(&self) -> Vec<&Accessor> {
        self.segments
            .iter()
            .flat_map(|segment| match segment {
                Segment::Text(_) => Vec::new(),
                Segment::Value { accessor, .. } => vec![accessor],
                Segment::Url { args, .. } => args.iter().collect(),
            })
            .collect()
    }

    /// `(route, number of arguments)` for every `{% url %}` tag.
    pub fn routes(&self) -> Vec<(&str, usize)> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Url { route, args } => Some((route.as_str(), args.len())),
                _ => None,
            })
            .collect()
    }

    pub fn validate(&self, registry: &SchemaRegistry, model: &str) -> Result<()> {
        for accessor in self.accessors() {
            accessor.validate(registry, model)?;
        }
        Ok(())
    }

    pub fn render(&self, record: &Record, resolver: &dyn UrlResolver) -> String {
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Value { accessor, filters } => {
                    let value = accessor.resolve(record).and_then(display_value);
                    out.push_str(&apply_filters(value, filters));
                }
                Segment::Url { route, args } => {
                    let values: Option<Vec<String>> = args
                        .iter()
                        .map(|arg| accessor_text(arg, record))
                        .collect();
                    match values.map(|values| resolver.reverse(route, &values)) {
                        Some(Ok(url)) => out.push_str(&escape_html(&url)),
                        Some(Err(e)) => {
                            tracing::warn!("Could not reverse '{}' in template: {}", route, e);
                            out.push('#');
                        }
                        None => out.push('#'),
                    }
                }
            }
        }

        out
    }
}

fn template_error(source: &str, reason: impl Into<String>) -> TableError {
    TableError::TemplateError {
        template: source.trim().to_string(),
        reason: reason.into(),
    }
}

fn push_text(segments: &mut Vec<Segment>, source: &str, text: &str) -> Result<()> {
    if text.contains("{{") || text.contains("{%") {
        return Err(template_error(source, "unclosed tag"));
    }
    if text.contains("}}") || text.contains("%}") {
        return Err(template_error(source, "closing tag without opening tag"));
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(())
}

fn parse_value(source: &str, expr: &str) -> Result<Segment> {
    let mut parts = split_outside_quotes(expr, '|').into_iter();
    let path = parts.next().unwrap_or_default();
    let accessor = Accessor::parse(&path)?;

    let filters = parts
        .map(|raw| parse_filter(source, &raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(Segment::Value { accessor, filters })
}

fn parse_filter(source: &str, raw: &str) -> Result<Filter> {
    let (name, arg) = match raw.split_once(':') {
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (raw.trim(), None),
    };

    match (name, arg) {
        ("lower", None) => Ok(Filter::Lower),
        ("upper", None) => Ok(Filter::Upper),
        ("host", None) => Ok(Filter::Host),
        ("default", Some(arg)) => Ok(Filter::Default(unquote(source, arg)?)),
        ("default", None) => Err(template_error(source, "filter 'default' requires an argument")),
        (other, _) => Err(template_error(source, format!("unknown filter '{}'", other))),
    }
}

fn parse_tag(source: &str, tag: &str) -> Result<Segment> {
    let words = split_outside_quotes(tag, ' ');
    let mut words = words.into_iter().filter(|w| !w.is_empty());

    match words.next().as_deref() {
        Some("url") => {
            let route = words
                .next()
                .ok_or_else(|| template_error(source, "url tag requires a route name"))?;
            let route = unquote(source, &route)?;
            let args = words
                .map(|word| {
                    // `pk=record.pk` style keyword arguments are positional here
                    let path = word.split_once('=').map(|(_, v)| v.to_string()).unwrap_or(word);
                    Accessor::parse(&path)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Segment::Url { route, args })
        }
        Some(other) => Err(template_error(source, format!("unknown tag '{}'", other))),
        None => Err(template_error(source, "empty tag")),
    }
}

fn unquote(source: &str, raw: &str) -> Result<String> {
    let raw = raw.trim();
    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Ok(raw[1..raw.len() - 1].to_string());
        }
    }
    Err(template_error(source, format!("expected a quoted string, got {}", raw)))
}

fn split_outside_quotes(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == sep => parts.push(std::mem::take(&mut current).trim().to_string()),
            None => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

fn accessor_text(accessor: &Accessor, record: &Record) -> Option<String> {
    accessor.resolve(record).and_then(display_value)
}

fn apply_filters(value: Option<String>, filters: &[Filter]) -> String {
    // (文字, 是否已是安全的 HTML)
    let mut current: Option<(String, bool)> = value.map(|v| (v, false));

    for filter in filters {
        current = match (filter, current) {
            (Filter::Default(literal), None) => Some((literal.clone(), true)),
            (Filter::Default(literal), Some((text, _))) if text.is_empty() => Some((literal.clone(), true)),
            (Filter::Lower, Some((text, safe))) => Some((text.to_lowercase(), safe)),
            (Filter::Upper, Some((text, safe))) => Some((text.to_uppercase(), safe)),
            (Filter::Host, Some((text, safe))) => {
                let host = text.split_once('/').map(|(h, _)| h.to_string()).unwrap_or(text);
                Some((host, safe))
            }
            (_, other) => other,
        };
    }

    match current {
        Some((text, true)) => text,
        Some((text, false)) => escape_html(&text),
        None => String::new(),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
