use crate::adapters::routes::RouteTable;
use crate::app::tables::TableSet;
use crate::core::column::Column;
use crate::core::table::TableSpec;
use crate::domain::schema::{ModelSchema, SchemaRegistry};
use crate::utils::error::{Result, TableError};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_route_name, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const COLUMN_KINDS: [&str; 5] = ["plain", "link", "template", "link_list", "checkbox"];

/// 額外的表格、模型與路由定義
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesConfig {
    pub routes: Option<RoutesConfig>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub relations: HashMap<String, String>,
    #[serde(default)]
    pub many: HashMap<String, String>,
    #[serde(default)]
    pub computed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Lookup key, e.g. `site_summary`.
    pub key: String,
    /// Display name, defaults to the key.
    pub name: Option<String>,
    pub model: Option<String>,
    /// Key of an already defined table to inherit from.
    pub extends: Option<String>,
    pub bulk_edit: Option<bool>,
    pub empty_text: Option<String>,
    pub sequence: Option<Vec<String>>,
    pub class: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    pub kind: Option<String>,
    pub accessor: Option<String>,
    pub verbose_name: Option<String>,
    pub route: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub template: Option<String>,
    pub orderable: Option<bool>,
    pub order_by: Option<String>,
    pub empty_value: Option<String>,
}

impl TablesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TableError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TableError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NETBOX_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TableError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 把自訂模型加進 schema
    pub fn extend_schema(&self, schema: &mut SchemaRegistry) {
        for model in &self.models {
            let mut definition = ModelSchema::new(&model.name);
            for field in &model.fields {
                definition = definition.value(field);
            }
            for (field, target) in &model.relations {
                definition = definition.relation(field, target);
            }
            for (field, target) in &model.many {
                definition = definition.many(field, target);
            }
            for field in &model.computed {
                definition = definition.computed(field);
            }
            tracing::debug!("Registered model {} from config", model.name);
            schema.register(definition);
        }
    }

    /// Routes from the config layered over `defaults`.
    pub fn route_table(&self, defaults: RouteTable) -> Result<RouteTable> {
        let Some(routes) = &self.routes else {
            return Ok(defaults);
        };

        let mut table = defaults;
        if let Some(base) = &routes.base_url {
            table = table.with_base(base);
        }
        for (name, pattern) in &routes.patterns {
            table.insert(name, pattern)?;
        }
        Ok(table)
    }

    /// Builds every configured table into `set`, in file order, so later
    /// tables may extend earlier ones.
    pub fn build_tables(&self, schema: &SchemaRegistry, set: &mut TableSet) -> Result<()> {
        for table in &self.tables {
            let spec = table.build(schema, set)?;
            tracing::info!("🧩 Loaded table '{}' ({} columns)", table.key, spec.columns().len());
            set.insert(&table.key, spec);
        }
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(routes) = &self.routes {
            if let Some(base) = &routes.base_url {
                validate_url("routes.base_url", base)?;
            }
            for name in routes.patterns.keys() {
                validate_route_name("routes.patterns", name)?;
            }
        }

        for model in &self.models {
            validate_non_empty_string("models.name", &model.name)?;
        }

        for table in &self.tables {
            validate_non_empty_string("tables.key", &table.key)?;
            for column in &table.columns {
                validate_non_empty_string(&format!("tables.{}.columns.name", table.key), &column.name)?;
                if let Some(kind) = &column.kind {
                    validate_one_of(&format!("tables.{}.columns.{}.kind", table.key, column.name), kind, &COLUMN_KINDS)?;
                }
                if let Some(route) = &column.route {
                    validate_route_name(&format!("tables.{}.columns.{}.route", table.key, column.name), route)?;
                }
            }
        }

        Ok(())
    }
}

impl Validate for TablesConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl TableConfig {
    fn build(&self, schema: &SchemaRegistry, existing: &TableSet) -> Result<TableSpec> {
        let name = self.name.clone().unwrap_or_else(|| self.key.clone());

        let mut builder = match &self.extends {
            Some(base) => existing.get(base)?.extend(&name),
            None => TableSpec::builder(&name),
        };
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        for column in &self.columns {
            let column = column.build(&self.key)?;
            // 繼承時同名欄位覆寫父表；否則重複名稱交給 build 報錯
            builder = if self.extends.is_some() {
                builder.override_column(column)
            } else {
                builder.column(column)
            };
        }
        if let Some(sequence) = &self.sequence {
            let names: Vec<&str> = sequence.iter().map(String::as_str).collect();
            builder = builder.sequence(&names);
        }
        if let Some(text) = &self.empty_text {
            builder = builder.empty_text(text);
        }
        if let Some(class) = &self.class {
            builder = builder.attr("class", class);
        }

        let spec = builder.build(schema)?;
        if self.bulk_edit.unwrap_or(false) {
            spec.bulk_edit(&name)
        } else {
            Ok(spec)
        }
    }
}

impl ColumnConfig {
    fn build(&self, table: &str) -> Result<Column> {
        let missing = |what: &str| TableError::MissingConfigError {
            field: format!("tables.{}.columns.{}.{}", table, self.name, what),
        };

        let mut column = match self.kind.as_deref().unwrap_or("plain") {
            "plain" => Column::new(&self.name)?,
            "link" => {
                let route = self.route.as_deref().ok_or_else(|| missing("route"))?;
                let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
                Column::link(&self.name, route, &args)?
            }
            "template" => {
                let template = self.template.as_deref().ok_or_else(|| missing("template"))?;
                Column::template(&self.name, template)?
            }
            "link_list" => {
                let route = self.route.as_deref().ok_or_else(|| missing("route"))?;
                let arg = self.args.first().ok_or_else(|| missing("args"))?;
                Column::link_list(&self.name, route, arg)?
            }
            "checkbox" => Column::selection(&self.name)?,
            other => {
                return Err(TableError::InvalidConfigValueError {
                    field: format!("tables.{}.columns.{}.kind", table, self.name),
                    value: other.to_string(),
                    reason: format!("Valid kinds: {}", COLUMN_KINDS.join(", ")),
                })
            }
        };

        if let Some(accessor) = &self.accessor {
            column = column.accessor(accessor)?;
        }
        if let Some(label) = &self.verbose_name {
            column = column.verbose(label);
        }
        if let Some(orderable) = self.orderable {
            column = column.orderable(orderable);
        }
        if let Some(order_by) = &self.order_by {
            column = column.order_by(order_by)?;
        }
        if let Some(empty) = &self.empty_value {
            column = column.empty_value(empty);
        }
        Ok(column)
    }
}
