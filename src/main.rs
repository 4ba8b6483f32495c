// ==========================================
// EnerjiOS 导入管道 - 命令行入口
// ==========================================
// 用途: 非交互地运行完整管道（自动映射）
// 输出: 记录写入 JSON 文件,问题清单可导出为 CSV
// ==========================================

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use enerjios_import::config::{get_default_config_path, ConfigManager, ImportSettings};
use enerjios_import::domain::schema::{load_fields_from_json, product_fields};
use enerjios_import::importer::export_errors_csv_to_path;
use enerjios_import::{i18n, logging, ImportOrchestrator, ImportRecord, ImportSink, JsonFileSink};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "enerjios-import", version, about = "EnerjiOS Excel ürün içe aktarma")]
struct Cli {
    /// İçe aktarılacak dosya (.xlsx / .xlsm / .xls)
    file: PathBuf,

    /// Alan şeması (JSON); verilmezse ürün alanları kullanılır
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Sayfa sırası (0 tabanlı)
    #[arg(long)]
    sheet: Option<usize>,

    /// Başlık satırı (Excel satır numarası, 1 tabanlı)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    header_row: Option<u32>,

    /// İlk veri satırı (1 tabanlı)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    start_row: Option<u32>,

    /// Son veri satırı (1 tabanlı, dahil)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    end_row: Option<u32>,

    /// Kayıtların yazılacağı JSON dosyası
    #[arg(long)]
    output: Option<PathBuf>,

    /// Hata listesinin yazılacağı CSV dosyası
    #[arg(long)]
    errors_csv: Option<PathBuf>,

    /// Mesaj dili (tr / en)
    #[arg(long)]
    locale: Option<String>,

    /// Ayar dosyası (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Doğrula ama içe aktarma
    #[arg(long)]
    dry_run: bool,

    /// Günlükleri JSON satırları olarak yaz
    #[arg(long)]
    json_logs: bool,
}

/// --dry-run 时的空提交端
struct DryRunSink;

#[async_trait]
impl ImportSink for DryRunSink {
    async fn on_import(&self, rows: Vec<ImportRecord>) -> anyhow::Result<()> {
        tracing::info!(rows = rows.len(), "dry-run: 跳过提交");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", enerjios_import::APP_NAME, enerjios_import::VERSION);
    tracing::info!("==================================================");

    // 配置
    let config_path = cli.config.clone().unwrap_or_else(get_default_config_path);
    let config = ConfigManager::from_path(&config_path)?;
    let mut settings = ImportSettings::load(&config).await?;
    if let Some(locale) = &cli.locale {
        settings.locale = locale.trim().to_lowercase();
    }
    i18n::set_locale(&settings.locale);

    // 字段 schema
    let schema = match &cli.schema {
        Some(path) => load_fields_from_json(path)?,
        None => product_fields(),
    };

    let sink: Arc<dyn ImportSink> = if cli.dry_run {
        Arc::new(DryRunSink)
    } else {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| cli.file.with_extension("json"));
        Arc::new(JsonFileSink::new(output))
    };
    let mut orchestrator = ImportOrchestrator::new(schema, sink, settings);

    // 上传
    let file_name = cli
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.file.display().to_string());
    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| {
            i18n::t_with_args(
                "import.file_not_found",
                &[("path", cli.file.display().to_string().as_str())],
            )
        })?;
    orchestrator.upload(&file_name, bytes).await?;

    // 预览设置（命令行行号为 1 基）
    if let Some(sheet) = cli.sheet {
        orchestrator.select_sheet(sheet)?;
    }
    if let Some(header_row) = cli.header_row {
        orchestrator.set_header_row(header_row as usize - 1)?;
    }
    if cli.start_row.is_some() || cli.end_row.is_some() {
        let (start, end) = orchestrator
            .active_sheet()
            .map(|s| (s.start_row, s.end_row))
            .unwrap_or((0, 0));
        let start = cli.start_row.map(|r| r as usize - 1).unwrap_or(start);
        let end = cli.end_row.map(|r| r as usize - 1).unwrap_or(end);
        orchestrator.set_range(start, end)?;
    }

    // 映射
    orchestrator.proceed_to_mapping()?;
    for m in orchestrator.mappings() {
        tracing::info!(field = %m.system_field, column = %m.excel_column, "映射");
    }

    // 校验
    let preview = orchestrator.run_validation()?.clone();
    eprintln!(
        "toplam={} geçerli={} geçersiz={} uyarı={}",
        preview.total_rows, preview.valid_rows, preview.invalid_rows, preview.warnings
    );
    for e in preview.errors.iter().take(20) {
        eprintln!("  [{}] satır {} / {}: {}", e.severity, e.display_row(), e.column, e.message);
    }
    if let Some(path) = &cli.errors_csv {
        export_errors_csv_to_path(path, &preview.errors)?;
    }

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    // 提交
    let outcome = orchestrator.commit().await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    eprintln!(
        "{}",
        i18n::t_with_args(
            "import.completed",
            &[("count", outcome.imported_rows.to_string().as_str())]
        )
    );
    Ok(())
}
