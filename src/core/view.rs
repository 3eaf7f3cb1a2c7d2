use crate::core::render::{ComputedField, RenderOptions, RenderedTable, TableRenderer};
use crate::core::table::TableSpec;
use crate::domain::ports::{RecordSource, Storage, UrlResolver};
use crate::utils::error::{Result, TableError};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(TableError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: html, csv".to_string(),
            }),
        }
    }
}

/// One table request: fetch the records, bind them and hand the markup to
/// storage.
pub struct TableView<R: RecordSource, S: Storage> {
    spec: TableSpec,
    source: R,
    storage: S,
    resolver: Arc<dyn UrlResolver>,
    computed: Vec<ComputedField>,
}

impl<R: RecordSource, S: Storage> TableView<R, S> {
    /// Fails if the table links to routes the resolver does not know.
    pub fn new(spec: TableSpec, source: R, storage: S, resolver: Arc<dyn UrlResolver>) -> Result<Self> {
        spec.validate_routes(resolver.as_ref())?;
        Ok(Self {
            spec,
            source,
            storage,
            resolver,
            computed: Vec::new(),
        })
    }

    pub fn with_computed(mut self, field: ComputedField) -> Self {
        self.computed.push(field);
        self
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub async fn render(&self, options: &RenderOptions) -> Result<RenderedTable> {
        tracing::info!("📥 {}: Fetching records from {}", self.spec.name(), self.source.describe());
        let records = self.source.fetch().await?;
        tracing::info!("📥 {}: Fetched {} records", self.spec.name(), records.len());

        let renderer = TableRenderer::new(self.resolver.as_ref());
        Ok(renderer.render(&self.spec, records, &self.computed, options))
    }

    /// Renders and writes `<filename>` in the requested format. Returns the
    /// file name written.
    pub async fn run(&self, options: &RenderOptions, format: OutputFormat, filename: &str) -> Result<String> {
        let table = self.render(options).await?;

        let output = match format {
            OutputFormat::Html => table.to_html(),
            OutputFormat::Csv => table.to_csv()?,
        };

        tracing::debug!("Writing {} bytes to {}", output.len(), filename);
        self.storage.write_file(filename, output.as_bytes()).await?;
        tracing::info!("📁 {}: {} rows written to {}", self.spec.name(), table.rows.len(), filename);

        Ok(filename.to_string())
    }
}
