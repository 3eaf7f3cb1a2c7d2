use crate::core::accessor::Accessor;
use crate::core::template::CellTemplate;
use crate::domain::ports::UrlResolver;
use crate::domain::schema::{FieldKind, SchemaRegistry};
use crate::utils::error::{Result, TableError};

pub const DEFAULT_EMPTY_VALUE: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Literal field value.
    Plain,
    /// Field value wrapped in a link to `route`, reversed with `args`.
    Link { route: String, args: Vec<Accessor> },
    /// Template-rendered fragment.
    Template(CellTemplate),
    /// One link per element of an array field, `arg` is relative to the element.
    LinkList { route: String, arg: Accessor },
    /// Row selection bound to the record's primary key.
    CheckBox,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub accessor: Accessor,
    pub verbose_name: String,
    pub kind: ColumnKind,
    pub orderable: bool,
    pub order_by: Option<Accessor>,
    pub empty_value: String,
}

impl Column {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            accessor: Accessor::parse(name)?,
            verbose_name: default_verbose_name(name),
            kind: ColumnKind::Plain,
            orderable: true,
            order_by: None,
            empty_value: DEFAULT_EMPTY_VALUE.to_string(),
        })
    }

    pub fn link(name: &str, route: &str, args: &[&str]) -> Result<Self> {
        let args = args
            .iter()
            .map(|arg| Accessor::parse(arg))
            .collect::<Result<Vec<_>>>()?;
        let mut column = Self::new(name)?;
        column.kind = ColumnKind::Link {
            route: route.to_string(),
            args,
        };
        Ok(column)
    }

    pub fn template(name: &str, source: &str) -> Result<Self> {
        let mut column = Self::new(name)?;
        column.kind = ColumnKind::Template(CellTemplate::parse(source)?);
        Ok(column)
    }

    pub fn link_list(name: &str, route: &str, arg: &str) -> Result<Self> {
        let mut column = Self::new(name)?;
        column.kind = ColumnKind::LinkList {
            route: route.to_string(),
            arg: Accessor::parse(arg)?,
        };
        column.orderable = false;
        Ok(column)
    }

    /// Selection column bound to `pk`.
    pub fn checkbox() -> Result<Self> {
        Self::selection("pk")
    }

    /// Selection column named `name`, still bound to `pk`.
    pub fn selection(name: &str) -> Result<Self> {
        let mut column = Self::new(name)?.accessor("pk")?;
        column.kind = ColumnKind::CheckBox;
        column.verbose_name = String::new();
        column.orderable = false;
        Ok(column)
    }

    pub fn accessor(mut self, path: &str) -> Result<Self> {
        self.accessor = Accessor::parse(path)?;
        Ok(self)
    }

    pub fn verbose(mut self, label: &str) -> Self {
        self.verbose_name = label.to_string();
        self
    }

    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    pub fn order_by(mut self, path: &str) -> Result<Self> {
        self.order_by = Some(Accessor::parse(path)?);
        Ok(self)
    }

    pub fn empty_value(mut self, value: &str) -> Self {
        self.empty_value = value.to_string();
        self
    }

    pub fn is_selection(&self) -> bool {
        matches!(self.kind, ColumnKind::CheckBox)
    }

    /// Accessor used when rows are ordered by this column.
    pub fn order_accessor(&self) -> &Accessor {
        self.order_by.as_ref().unwrap_or(&self.accessor)
    }

    /// Checks every path the column uses against `model`.
    pub fn validate(&self, table: &str, registry: &SchemaRegistry, model: &str) -> Result<()> {
        let conflict = |reason: &str| TableError::ColumnConflict {
            table: table.to_string(),
            column: self.name.clone(),
            reason: reason.to_string(),
        };

        match &self.kind {
            ColumnKind::Plain | ColumnKind::CheckBox => {
                self.accessor.validate(registry, model)?;
            }
            ColumnKind::Link { args, .. } => {
                self.accessor.validate(registry, model)?;
                for arg in args {
                    arg.validate(registry, model)?;
                }
            }
            ColumnKind::Template(template) => {
                template.validate(registry, model)?;
                // 模板欄位的 accessor 只用於排序
                if self.orderable {
                    self.accessor.validate(registry, model)?;
                }
            }
            ColumnKind::LinkList { arg, .. } => {
                let resolved = self.accessor.validate(registry, model)?;
                match resolved.kind {
                    FieldKind::Many(target) => {
                        arg.validate(registry, &target)?;
                    }
                    _ => return Err(conflict("link lists must be bound to a to-many relation")),
                }
            }
        }

        if self.orderable {
            let resolved = self.order_accessor().validate(registry, model)?;
            match resolved.kind {
                FieldKind::Computed => {
                    return Err(conflict("computed fields are not orderable, mark the column orderable = false"))
                }
                FieldKind::Many(_) => return Err(conflict("to-many relations are not orderable")),
                FieldKind::Value | FieldKind::Relation(_) => {}
            }
        }

        Ok(())
    }

    /// Checks that every route the column links to exists with the right arity.
    pub fn validate_routes(&self, resolver: &dyn UrlResolver) -> Result<()> {
        let mut used: Vec<(&str, usize)> = Vec::new();
        match &self.kind {
            ColumnKind::Link { route, args } => used.push((route.as_str(), args.len())),
            ColumnKind::LinkList { route, .. } => used.push((route.as_str(), 1)),
            ColumnKind::Template(template) => used.extend(template.routes()),
            ColumnKind::Plain | ColumnKind::CheckBox => {}
        }

        for (route, actual) in used {
            match resolver.arity(route) {
                None => {
                    return Err(TableError::UnknownRoute {
                        route: route.to_string(),
                    })
                }
                Some(expected) if expected != actual => {
                    return Err(TableError::RouteArity {
                        route: route.to_string(),
                        expected,
                        actual,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// `facility_id` -> `Facility id`
fn default_verbose_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
