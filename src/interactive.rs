//! 対話モード
//!
//! メニュー選択をそのまま `Action` に変換してディスパッチする。

use crate::app::App;
use crate::client::ExtractionService;
use crate::error::{InvoiceExtractError, Result};
use crate::render;
use crate::scanner;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use invoice_extract_common::fields::is_line_item_option;
use invoice_extract_common::{field_label, Action, IntakeMode, Tab, LINE_ITEMS_FIELD};
use std::path::PathBuf;

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddFiles,
    ReplaceFiles,
    RemoveFile,
    ChooseFields,
    SelectAllFields,
    OpenPreview,
    Extract,
    SwitchTab,
    CopyJson,
    Download,
    Quit,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::AddFiles => "Add files",
            MenuItem::ReplaceFiles => "Replace files",
            MenuItem::RemoveFile => "Remove a file",
            MenuItem::ChooseFields => "Choose fields",
            MenuItem::SelectAllFields => "Select all known fields",
            MenuItem::OpenPreview => "Open preview",
            MenuItem::Extract => "Extract Fields",
            MenuItem::SwitchTab => "Switch result tab",
            MenuItem::CopyJson => "Copy JSON",
            MenuItem::Download => "Download JSON",
            MenuItem::Quit => "Quit",
        }
    }
}

/// 現在の状態で選べるメニュー
pub fn available_items(has_files: bool, submit_enabled: bool, has_results: bool) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::AddFiles, MenuItem::ReplaceFiles];
    if has_files {
        items.push(MenuItem::RemoveFile);
    }
    items.push(MenuItem::ChooseFields);
    items.push(MenuItem::SelectAllFields);
    if has_files {
        items.push(MenuItem::OpenPreview);
    }
    if submit_enabled {
        items.push(MenuItem::Extract);
    }
    if has_results {
        items.extend([MenuItem::SwitchTab, MenuItem::CopyJson, MenuItem::Download]);
    }
    items.push(MenuItem::Quit);
    items
}

fn prompt_error(e: dialoguer::Error) -> InvoiceExtractError {
    InvoiceExtractError::CliExecution(e.to_string())
}

pub async fn run<S: ExtractionService>(app: &mut App<S>, initial: &[PathBuf]) -> Result<()> {
    if !initial.is_empty() {
        add_paths(app, initial, IntakeMode::Append).await;
    }

    loop {
        println!();
        render::print_session(app.session());

        let session = app.session();
        let has_results = session.results().map(|r| !r.is_empty()).unwrap_or(false);
        let items = available_items(!session.files().is_empty(), session.submit_enabled(), has_results);
        let labels: Vec<&str> = items.iter().map(|i| i.label()).collect();

        let choice = Select::new()
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match items[choice] {
            MenuItem::AddFiles => {
                let paths = prompt_paths()?;
                add_paths(app, &paths, IntakeMode::Append).await;
            }
            MenuItem::ReplaceFiles => {
                let paths = prompt_paths()?;
                add_paths(app, &paths, IntakeMode::Replace).await;
            }
            MenuItem::RemoveFile => {
                if let Some(name) = pick_file(app)? {
                    app.dispatch(Action::RemoveFile(name)).await;
                }
            }
            MenuItem::ChooseFields => choose_fields(app).await?,
            MenuItem::SelectAllFields => app.dispatch(Action::SelectAllFields).await,
            MenuItem::OpenPreview => {
                if let Some(name) = pick_file(app)? {
                    app.dispatch(Action::OpenPreview(name)).await;
                    if let Some(modal) = app.session().modal() {
                        println!("{}", render::format_modal(modal));
                    }
                    Confirm::new()
                        .with_prompt("Close preview?")
                        .default(true)
                        .interact()
                        .map_err(prompt_error)?;
                    app.dispatch(Action::ClosePreview).await;
                }
            }
            MenuItem::Extract => app.dispatch(Action::Submit).await,
            MenuItem::SwitchTab => {
                if let Some(card) = pick_card(app)? {
                    let tabs: Vec<&str> = Tab::ALL.iter().map(|t| t.label()).collect();
                    let tab = Select::new()
                        .with_prompt("Tab")
                        .items(&tabs)
                        .default(0)
                        .interact()
                        .map_err(prompt_error)?;
                    app.dispatch(Action::SelectTab { card, tab: Tab::ALL[tab] }).await;
                    if let Some(results) = app.session().results() {
                        render::print_results(results);
                    }
                }
            }
            MenuItem::CopyJson => {
                if let Some(card) = pick_card(app)? {
                    app.dispatch(Action::Copy { card }).await;
                    if let Some(card) = app.session().results().and_then(|r| r.card(card)) {
                        println!("{}", card.copy_label(std::time::Instant::now()));
                    }
                }
            }
            MenuItem::Download => {
                if let Some(card) = pick_card(app)? {
                    app.dispatch(Action::Download { card }).await;
                }
            }
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

async fn add_paths<S: ExtractionService>(app: &mut App<S>, paths: &[PathBuf], mode: IntakeMode) {
    match scanner::collect_candidates(paths) {
        Ok(candidates) => app.dispatch(Action::AddFiles { candidates, mode }).await,
        Err(e) => {
            tracing::error!(error = %e, "Error handling files");
            eprintln!("✖ Error processing files. Please try again. ({})", e);
        }
    }
}

fn prompt_paths() -> Result<Vec<PathBuf>> {
    let input: String = Input::new()
        .with_prompt("Paths (space separated)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;

    Ok(input.split_whitespace().map(PathBuf::from).collect())
}

fn pick_file<S: ExtractionService>(app: &App<S>) -> Result<Option<String>> {
    let names: Vec<String> = app.session().files().files().iter().map(|f| f.name.clone()).collect();
    if names.is_empty() {
        return Ok(None);
    }
    let index = Select::new()
        .with_prompt("File")
        .items(&names)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;
    Ok(index.map(|i| names[i].clone()))
}

fn pick_card<S: ExtractionService>(app: &App<S>) -> Result<Option<usize>> {
    let Some(results) = app.session().results() else {
        return Ok(None);
    };
    let names: Vec<String> = results
        .cards()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("#{} {}{}", i + 1, c.file_name, if c.is_error() { " (error)" } else { "" }))
        .collect();
    if names.is_empty() {
        return Ok(None);
    }
    Select::new()
        .with_prompt("Result")
        .items(&names)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)
}

/// チェックボックス編集。明細サブオプションは line_items がチェック中のみ表示
async fn choose_fields<S: ExtractionService>(app: &mut App<S>) -> Result<()> {
    let selector = app.session().fields().clone();
    let main: Vec<String> = selector
        .available()
        .iter()
        .filter(|f| !is_line_item_option(f))
        .cloned()
        .collect();
    let labels: Vec<String> = main.iter().map(|f| field_label(f)).collect();
    let defaults: Vec<bool> = main.iter().map(|f| selector.is_checked(f)).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Fields (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_error)?;

    for (i, field) in main.iter().enumerate() {
        let checked = chosen.contains(&i);
        if checked != defaults[i] {
            app.dispatch(Action::SetField { field: field.clone(), checked }).await;
        }
    }

    if app.session().fields().is_checked(LINE_ITEMS_FIELD) {
        let selector = app.session().fields().clone();
        let options: Vec<String> = selector
            .available()
            .iter()
            .filter(|f| is_line_item_option(f))
            .cloned()
            .collect();
        let labels: Vec<String> = options.iter().map(|f| field_label(f)).collect();
        let defaults: Vec<bool> = options.iter().map(|f| selector.is_checked(f)).collect();

        let chosen = MultiSelect::new()
            .with_prompt("Line item details")
            .items(&labels)
            .defaults(&defaults)
            .interact()
            .map_err(prompt_error)?;

        for (i, field) in options.iter().enumerate() {
            let checked = chosen.contains(&i);
            if checked != defaults[i] {
                app.dispatch(Action::SetField { field: field.clone(), checked }).await;
            }
        }
    }

    Ok(())
}
