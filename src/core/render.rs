use crate::core::accessor::Accessor;
use crate::core::column::{Column, ColumnKind};
use crate::core::ordering::{sort_records, OrderBy};
use crate::core::paginate::{Page, Paginator};
use crate::core::table::TableSpec;
use crate::core::template::escape_html;
use crate::domain::model::{display_value, Record};
use crate::domain::ports::UrlResolver;
use crate::utils::error::{Result, TableError};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::sync::LazyLock;

type ComputeFn = Box<dyn Fn(&Record) -> Value + Send + Sync>;

/// Per-row value merged into each record before binding, e.g. the number of
/// devices in a site.
pub struct ComputedField {
    name: String,
    compute: ComputeFn,
}

impl ComputedField {
    pub fn new<F>(name: &str, compute: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            compute: Box::new(compute),
        }
    }

    /// Number of elements of the array at `path`; missing arrays count 0.
    pub fn count(name: &str, path: &str) -> Result<Self> {
        let accessor = Accessor::parse(path)?;
        Ok(Self::new(name, move |record| {
            let count = accessor
                .resolve(record)
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            Value::from(count)
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, record: &mut Record) {
        let value = (self.compute)(record);
        record.insert(self.name.clone(), value);
    }
}

impl fmt::Debug for ComputedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedField").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Literal value, escaped on output.
    Text(String),
    Link { href: String, text: String },
    /// Pre-rendered markup.
    Html(String),
    Checkbox { value: String },
    /// Column placeholder for a missing value.
    Empty(String),
}

impl Cell {
    pub fn to_html(&self) -> String {
        match self {
            Cell::Text(text) | Cell::Empty(text) => escape_html(text),
            Cell::Link { href, text } => {
                format!("<a href=\"{}\">{}</a>", escape_html(href), escape_html(text))
            }
            Cell::Html(html) => html.clone(),
            Cell::Checkbox { value } => format!(
                "<input type=\"checkbox\" name=\"pk\" value=\"{}\" />",
                escape_html(value)
            ),
        }
    }

    /// Text without markup, used for exports.
    pub fn plain_text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Link { text, .. } => text.clone(),
            Cell::Html(html) => strip_tags(html),
            Cell::Checkbox { value } => value.clone(),
            Cell::Empty(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub label: String,
    pub orderable: bool,
    pub selection: bool,
    /// `Some(descending)` when the table is currently ordered by this column.
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub pk: Option<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub order_by: Option<OrderBy>,
    pub paginator: Option<Paginator>,
    pub page: usize,
}

impl RenderOptions {
    pub fn ordered(order_by: OrderBy) -> Self {
        Self {
            order_by: Some(order_by),
            ..Self::default()
        }
    }

    pub fn paginated(mut self, paginator: Paginator, page: usize) -> Self {
        self.paginator = Some(paginator);
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
    /// Present only when there were no records at all.
    pub empty_text: Option<String>,
    pub order_by: Option<OrderBy>,
    pub page: Option<Page>,
}

impl RenderedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.name == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column_cells(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().map(|row| &row.cells[index]).collect(),
            None => Vec::new(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();

        out.push_str("<table");
        for (key, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", key, escape_html(value));
        }
        out.push_str(">\n<thead>\n<tr>\n");
        for header in &self.headers {
            out.push_str(&self.header_html(header));
            out.push('\n');
        }
        out.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &self.rows {
            out.push_str("<tr>\n");
            for (header, cell) in self.headers.iter().zip(&row.cells) {
                if header.selection {
                    let _ = writeln!(out, "<td class=\"pk\">{}</td>", cell.to_html());
                } else {
                    let _ = writeln!(out, "<td>{}</td>", cell.to_html());
                }
            }
            out.push_str("</tr>\n");
        }

        if let Some(text) = &self.empty_text {
            let _ = writeln!(
                out,
                "<tr><td colspan=\"{}\">{}</td></tr>",
                self.headers.len(),
                escape_html(text)
            );
        }

        out.push_str("</tbody>\n</table>\n");
        out
    }

    fn header_html(&self, header: &Header) -> String {
        if header.selection {
            return "<th class=\"pk\"><input type=\"checkbox\" class=\"toggle\" title=\"Toggle all\" /></th>"
                .to_string();
        }
        if !header.orderable {
            return format!("<th>{}</th>", escape_html(&header.label));
        }

        let (class, next) = match header.active {
            Some(false) => ("orderable asc", OrderBy::desc(&header.name)),
            Some(true) => ("orderable desc", OrderBy::asc(&header.name)),
            None => ("orderable", OrderBy::asc(&header.name)),
        };
        format!(
            "<th class=\"{}\"><a href=\"?sort={}\">{}</a></th>",
            class,
            escape_html(&next.as_param()),
            escape_html(&header.label)
        )
    }

    /// CSV export of the visible rows. The selection column is left out.
    pub fn to_csv(&self) -> Result<String> {
        let keep: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.selection)
            .map(|(i, _)| i)
            .collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(keep.iter().map(|&i| self.headers[i].label.as_str()))?;
        for row in &self.rows {
            writer.write_record(keep.iter().map(|&i| row.cells[i].plain_text()))?;
        }

        let bytes = writer.into_inner().map_err(|e| TableError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| TableError::SourceError {
            message: format!("CSV output is not valid UTF-8: {}", e),
        })
    }
}

/// Binds records to a table definition. Rendering never fails: everything
/// that could go wrong was rejected when the table was built.
pub struct TableRenderer<'a> {
    resolver: &'a dyn UrlResolver,
}

impl<'a> TableRenderer<'a> {
    pub fn new(resolver: &'a dyn UrlResolver) -> Self {
        Self { resolver }
    }

    pub fn render(
        &self,
        spec: &TableSpec,
        mut records: Vec<Record>,
        computed: &[ComputedField],
        options: &RenderOptions,
    ) -> RenderedTable {
        let total = records.len();

        for record in records.iter_mut() {
            for field in computed {
                field.apply(record);
            }
        }

        let order_by = options
            .order_by
            .as_ref()
            .and_then(|order| self.effective_order(spec, order));
        if let Some(order) = &order_by {
            if let Some(column) = spec.column(&order.column) {
                sort_records(&mut records, column.order_accessor(), order.descending);
            }
        }

        let page = options.paginator.map(|p| p.page(total, options.page));
        let visible: &[Record] = match &page {
            Some(page) => &records[page.start..page.end],
            None => &records,
        };

        let headers = spec
            .columns()
            .iter()
            .map(|column| Header {
                name: column.name.clone(),
                label: column.verbose_name.clone(),
                orderable: column.orderable,
                selection: column.is_selection(),
                active: order_by
                    .as_ref()
                    .filter(|o| o.column == column.name)
                    .map(|o| o.descending),
            })
            .collect();

        let rows = visible
            .iter()
            .map(|record| Row {
                pk: record.pk().and_then(display_value),
                cells: spec
                    .columns()
                    .iter()
                    .map(|column| self.cell(column, record))
                    .collect(),
            })
            .collect();

        tracing::debug!(
            "Rendered {} with {} of {} records",
            spec.name(),
            visible.len(),
            total
        );

        RenderedTable {
            name: spec.name().to_string(),
            attrs: spec.attrs().clone(),
            headers,
            rows,
            empty_text: if total == 0 {
                spec.empty_text().map(str::to_string)
            } else {
                None
            },
            order_by,
            page,
        }
    }

    fn effective_order(&self, spec: &TableSpec, order: &OrderBy) -> Option<OrderBy> {
        match spec.column(&order.column) {
            Some(column) if column.orderable => Some(order.clone()),
            Some(_) => {
                tracing::debug!("{}: column '{}' is not orderable, ignoring", spec.name(), order.column);
                None
            }
            None => {
                tracing::debug!("{}: unknown order column '{}', ignoring", spec.name(), order.column);
                None
            }
        }
    }

    pub fn cell(&self, column: &Column, record: &Record) -> Cell {
        let empty = || Cell::Empty(column.empty_value.clone());

        match &column.kind {
            ColumnKind::CheckBox => match record.pk().and_then(display_value) {
                Some(value) => Cell::Checkbox { value },
                None => empty(),
            },
            ColumnKind::Plain => match column.accessor.resolve(record).and_then(display_value) {
                Some(text) => Cell::Text(text),
                None => empty(),
            },
            ColumnKind::Link { route, args } => {
                let Some(text) = column.accessor.resolve(record).and_then(display_value) else {
                    return empty();
                };
                match self.link(route, args, record) {
                    Some(href) => Cell::Link { href, text },
                    None => Cell::Text(text),
                }
            }
            ColumnKind::Template(template) => Cell::Html(template.render(record, self.resolver)),
            ColumnKind::LinkList { route, arg } => {
                let items = column
                    .accessor
                    .resolve(record)
                    .and_then(Value::as_array)
                    .map(|items| self.link_list(route, arg, items))
                    .unwrap_or_default();
                if items.is_empty() {
                    empty()
                } else {
                    Cell::Html(items.join("<br />"))
                }
            }
        }
    }

    fn link(&self, route: &str, args: &[Accessor], record: &Record) -> Option<String> {
        let values = args
            .iter()
            .map(|arg| arg.resolve(record).and_then(display_value))
            .collect::<Option<Vec<_>>>()?;

        match self.resolver.reverse(route, &values) {
            Ok(href) => Some(href),
            Err(e) => {
                tracing::warn!("Could not reverse '{}': {}", route, e);
                None
            }
        }
    }

    fn link_list(&self, route: &str, arg: &Accessor, items: &[Value]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| {
                let text = display_value(item)?;
                let element = Record::from_value(item.clone()).ok();
                let href = element.and_then(|e| self.link(route, std::slice::from_ref(arg), &e));
                Some(match href {
                    Some(href) => format!("<a href=\"{}\">{}</a>", escape_html(&href), escape_html(&text)),
                    None => escape_html(&text),
                })
            })
            .collect()
    }
}

static TAG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

fn strip_tags(html: &str) -> String {
    let text = match TAG_PATTERN.as_ref() {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_string(),
    };
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
