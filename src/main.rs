use clap::Parser;
use dcim_tables::domain::ports::RecordSource;
use dcim_tables::utils::error::{ErrorSeverity, Result, TableError};
use dcim_tables::utils::{logger, validation::Validate};
use dcim_tables::{
    dcim_routes, dcim_schema, dcim_tables as build_dcim_tables, CliConfig, HttpSource, JsonFileSource,
    LocalStorage, RouteTable, TableSet, TableSpec, TableView, TablesConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting dcim-tables CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config).await {
        Ok(Some(output_path)) => {
            tracing::info!("✅ Table rendered successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Table rendered successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Ok(None) => {}
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

/// 建立表格定義並輸出; `--list` 時只列出表格名稱
async fn run(config: &CliConfig) -> Result<Option<String>> {
    let (tables, routes) = load_definitions(config)?;

    if config.list {
        for (key, spec) in tables.iter() {
            println!("{:<24} {}", key, spec.name());
        }
        return Ok(None);
    }

    let spec = select_table(config, &tables)?;
    let routes: Arc<RouteTable> = Arc::new(routes);
    let input = config.input.as_deref().ok_or_else(|| TableError::MissingConfigError {
        field: "input".to_string(),
    })?;

    let output = if config.is_remote_input() {
        let mut source = HttpSource::new(input)?.timeout_seconds(config.timeout_seconds);
        if let Some(token) = &config.token {
            source = source.token(token);
        }
        render(config, spec, source, routes).await?
    } else {
        render(config, spec, JsonFileSource::new(input)?, routes).await?
    };

    Ok(Some(output))
}

fn load_definitions(config: &CliConfig) -> Result<(TableSet, RouteTable)> {
    let mut schema = dcim_schema();
    let mut routes = dcim_routes()?;
    if let Some(base_url) = &config.base_url {
        routes = routes.with_base(base_url);
    }

    let extra = match &config.config {
        Some(path) => {
            tracing::info!("📋 Loading table definitions from {}", path);
            let extra = TablesConfig::from_file(path)?;
            extra.validate()?;
            Some(extra)
        }
        None => None,
    };

    if let Some(extra) = &extra {
        extra.extend_schema(&mut schema);
    }
    let mut tables = build_dcim_tables(&schema)?;
    if let Some(extra) = &extra {
        extra.build_tables(&schema, &mut tables)?;
        routes = extra.route_table(routes)?;
    }

    tracing::debug!("{} tables, {} routes available", tables.len(), routes.len());
    Ok((tables, routes))
}

fn select_table(config: &CliConfig, tables: &TableSet) -> Result<TableSpec> {
    if !config.bulk_edit {
        return Ok(tables.get(&config.table)?.clone());
    }

    let bulk_key = format!("{}_bulk_edit", config.table);
    match tables.get(&bulk_key) {
        Ok(spec) => Ok(spec.clone()),
        Err(_) => {
            let base = tables.get(&config.table)?;
            base.bulk_edit(&format!("{}BulkEdit", base.name()))
        }
    }
}

async fn render<R: RecordSource>(
    config: &CliConfig,
    spec: TableSpec,
    source: R,
    routes: Arc<RouteTable>,
) -> Result<String> {
    let storage = LocalStorage::new(config.output_dir.clone());
    let output_file = config.output_file()?;
    let full_path = storage.full_path(&output_file);

    let view = TableView::new(spec, source, storage, routes)?;
    view.run(&config.render_options()?, config.output_format()?, &output_file)
        .await?;

    Ok(full_path.display().to_string())
}
