use clap::Parser;
use invoice_extract::{cli, clipboard, config, error, interactive, preview, render, scanner};
use invoice_extract::app::App;
use invoice_extract::client::HttpExtractionClient;
use cli::{Cli, Commands};
use config::Config;
use error::{InvoiceExtractError, Result};
use invoice_extract_common::{
    field_label, parse_results, Action, IntakeMode, PreviewStatus, PreviewTarget, ResultsView,
    Session, FIELD_CATALOG,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "invoice_extract=debug,invoice_extract_common=debug"
    } else {
        "invoice_extract=info,invoice_extract_common=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_app(config: &Config, endpoint: Option<String>) -> Result<App<HttpExtractionClient>> {
    let endpoint = endpoint.unwrap_or_else(|| config.endpoint());
    tracing::debug!(%endpoint, "using extraction endpoint");

    // セッション終了時にプレビューを破棄
    let previewer = preview::Previewer::for_session(
        preview::rasterizer_for(config.rasterizer),
        config.preview_dir(),
        config.modal_max_size,
    )?;

    Ok(App::new(
        Session::new(&config.extra_fields),
        HttpExtractionClient::new(endpoint),
        Arc::new(previewer),
        Arc::new(clipboard::SystemClipboard),
        config.download_dir(),
        Duration::from_secs(config.timeout_seconds),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Extract { paths, fields, all_fields, endpoint, tab, download, output, no_preview } => {
            println!("🧾 invoice-extract - Extract Fields\n");

            let mut config = config;
            if let Some(dir) = output {
                config.download_dir = Some(dir);
            }
            let mut app = build_app(&config, endpoint)?
                .with_previews(!no_preview)
                .with_result_tab(tab);

            // 1. 取り込み
            println!("[1/3] Loading files...");
            let candidates = scanner::collect_candidates(&paths)?;
            app.dispatch(Action::AddFiles { candidates, mode: IntakeMode::Append }).await;
            if app.session().files().is_empty() {
                return Err(InvoiceExtractError::NoFilesAccepted(
                    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "),
                ));
            }

            // 2. フィールド選択
            println!("[2/3] Selecting fields...");
            if all_fields {
                app.dispatch(Action::SelectAllFields).await;
            }
            for field in fields {
                if !app.session().fields().is_available(&field) {
                    eprintln!("⚠ Unknown field ignored: {}", field);
                    continue;
                }
                app.dispatch(Action::SetField { field, checked: true }).await;
            }
            if !app.session().fields().any_selected() {
                return Err(InvoiceExtractError::NoFieldsSelected);
            }
            render::print_session(app.session());

            // 3. 送信
            println!("\n[3/3] Extracting...");
            app.dispatch(Action::Submit).await;

            let Some(count) = app.session().results().map(|r| r.len()) else {
                return Err(InvoiceExtractError::ApiCall("extraction did not complete".into()));
            };

            if download {
                for card in 0..count {
                    app.dispatch(Action::Download { card }).await;
                }
            }

            println!("\n✅ Done");
        }

        Commands::Interactive { paths, endpoint } => {
            println!("🧾 invoice-extract - Interactive\n");
            let mut app = build_app(&config, endpoint)?;
            interactive::run(&mut app, &paths).await?;
        }

        Commands::Fields => {
            println!("Available fields:");
            for field in FIELD_CATALOG {
                println!("  {:<20} {}", field, field_label(field));
            }
            for field in &config.extra_fields {
                println!("  {:<20} {}", field, field_label(field));
            }
        }

        Commands::Preview { path, large } => {
            let file = scanner::load_file(&path)?;
            let previewer = preview::Previewer::new(
                preview::rasterizer_for(config.rasterizer),
                config.preview_dir(),
                config.modal_max_size,
            );
            let target = if large { PreviewTarget::Modal } else { PreviewTarget::Thumbnail };

            let outcome = tokio::task::spawn_blocking(move || previewer.render(&file, target))
                .await
                .map_err(|e| InvoiceExtractError::Preview(e.to_string()))?;
            println!("{}", render::format_preview_status(&PreviewStatus::Ready(outcome)));
        }

        Commands::Render { input, tab } => {
            let content = std::fs::read_to_string(&input)?;
            let results = parse_results(&content)?;
            let mut view = ResultsView::from_results(&results);
            for index in 0..view.len() {
                if let Some(card) = view.card_mut(index) {
                    card.select_tab(tab);
                }
            }
            render::print_results(&view);
        }

        Commands::Config { set_endpoint, set_timeout, show } => {
            let mut config = config;

            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                println!("✔ Endpoint saved");
            }

            if let Some(seconds) = set_timeout {
                config.set_timeout(seconds)?;
                println!("✔ Timeout saved");
            }

            if show {
                println!("Config ({}):", Config::config_path()?.display());
                println!("  Endpoint: {}", config.endpoint());
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Preview dir: {}", config.preview_dir().display());
                println!("  Download dir: {}", config.download_dir().display());
                println!("  Modal max size: {}px", config.modal_max_size);
                println!("  Rasterizer: {:?}", config.rasterizer);
                if !config.extra_fields.is_empty() {
                    println!("  Extra fields: {}", config.extra_fields.join(", "));
                }
            }
        }
    }

    Ok(())
}
