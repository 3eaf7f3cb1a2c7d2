use crate::core::ordering::OrderBy;
use crate::core::paginate::{Paginator, DEFAULT_PER_PAGE};
use crate::core::render::RenderOptions;
use crate::core::view::OutputFormat;
use crate::utils::error::{Result, TableError};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_number, validate_url,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dcim-tables")]
#[command(about = "Render DCIM inventory tables to HTML or CSV")]
pub struct CliConfig {
    #[arg(long, short = 't', default_value = "site", help = "Table to render (see --list)")]
    pub table: String,

    #[arg(long, short = 'i', help = "JSON file or http(s) API endpoint with the records")]
    pub input: Option<String>,

    #[arg(long, short = 'c', help = "TOML file with extra tables, models and routes")]
    pub config: Option<String>,

    #[arg(long, help = "Order by column, prefix with '-' for descending")]
    pub sort: Option<String>,

    #[arg(long, default_value = "1")]
    pub page: usize,

    #[arg(long, help = "Rows per page; pagination is off when omitted")]
    pub per_page: Option<usize>,

    #[arg(long, help = "Render the bulk-edit variant with a selection column")]
    pub bulk_edit: bool,

    #[arg(long, default_value = "html")]
    pub format: String,

    #[arg(long, short = 'o', help = "Output file name, defaults to <table>.<format>")]
    pub output: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_dir: String,

    #[arg(long, env = "NETBOX_TOKEN", help = "API token sent as 'Authorization: Token <token>'")]
    pub token: Option<String>,

    #[arg(long, help = "Prefix for generated links, e.g. https://netbox.example.com")]
    pub base_url: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, help = "List the available tables and exit")]
    pub list: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }

    /// `--output`, or `<table>.<ext>`.
    pub fn output_file(&self) -> Result<String> {
        match &self.output {
            Some(name) => Ok(name.clone()),
            None => Ok(format!("{}.{}", self.table, self.output_format()?.extension())),
        }
    }

    pub fn is_remote_input(&self) -> bool {
        self.input
            .as_deref()
            .is_some_and(|input| input.starts_with("http://") || input.starts_with("https://"))
    }

    pub fn render_options(&self) -> Result<RenderOptions> {
        let mut options = RenderOptions {
            order_by: self.sort.as_deref().and_then(OrderBy::parse),
            ..RenderOptions::default()
        };
        if let Some(per_page) = self.per_page {
            options = options.paginated(Paginator::new(per_page)?, self.page);
        } else if self.page > 1 {
            options = options.paginated(Paginator::new(DEFAULT_PER_PAGE)?, self.page);
        }
        Ok(options)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("table", &self.table)?;
        validate_one_of("format", &self.format.to_ascii_lowercase(), &["html", "csv"])?;
        validate_path("output_dir", &self.output_dir)?;
        validate_positive_number("page", self.page, 1)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;

        if let Some(per_page) = self.per_page {
            validate_positive_number("per_page", per_page, 1)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(base_url) = &self.base_url {
            validate_url("base_url", base_url)?;
        }
        match &self.input {
            Some(input) if self.is_remote_input() => validate_url("input", input)?,
            Some(input) => validate_path("input", input)?,
            None if !self.list => {
                return Err(TableError::MissingConfigError {
                    field: "input".to_string(),
                })
            }
            None => {}
        }

        Ok(())
    }
}
