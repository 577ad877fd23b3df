//! Bulk action command

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use tracing::debug;

use super::ask_on_terminal;
use crate::bulk::{
    ActionStatus, BulkAction, BulkActionCoordinator, BulkActionKind, BulkActionRequest,
    BulkActionResult, ConfirmationPrompt,
};
use crate::client::{BulkActionBackend, JsonRecord, PageFetcher, RestClient};
use crate::config::get_config;
use crate::errors::PanelError;
use crate::filter::FilterState;
use crate::interfaces::cli::CliError;
use crate::selection::{SelectionMode, SelectionSet};
use crate::view::{ListView, PanelEvents, ResourceKind};

/// Parsed `bulk` arguments
#[derive(Debug, Clone, Default)]
pub struct BulkArgs {
    pub resource: String,
    pub action: String,
    pub ids: Vec<String>,
    pub all: bool,
    pub search: Option<String>,
    pub facets: Vec<(String, String)>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub yes: bool,
}

/// Asks on the terminal before a destructive action
pub struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt<String> for StdinPrompt {
    async fn confirm(&self, request: &BulkActionRequest<String>) -> bool {
        let scope = match request.target() {
            SelectionMode::Explicit { included } => format!("{} selected records", included.len()),
            SelectionMode::AllMatching { excluded, .. } if excluded.is_empty() => {
                "all matching records".to_string()
            }
            SelectionMode::AllMatching { excluded, .. } => {
                format!("all matching records except {}", excluded.len())
            }
        };
        let question = format!(
            "{} {} {} {}",
            request.action().kind().to_string().red().bold(),
            scope.blue(),
            format!("(reason: {})", request.action().reason().unwrap_or_default()).dimmed(),
            "Proceed? [y/N] ".yellow()
        );
        // 读不到输入按拒绝处理
        ask_on_terminal(question).await.unwrap_or(false)
    }
}

/// `--yes`: confirmation already given on the command line
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPrompt<String> for AutoConfirm {
    async fn confirm(&self, _request: &BulkActionRequest<String>) -> bool {
        true
    }
}

/// Prints per-row outcomes
pub struct TerminalEvents;

impl PanelEvents<String> for TerminalEvents {
    fn on_selection_changed(&self, selection: &SelectionSet<String>) {
        debug!("Selection changed: {:?}", selection.count(None));
    }

    fn on_action_completed(&self, result: &BulkActionResult<String>) {
        if let Some(err) = &result.request_error {
            println!("  {} {}", "Request failed:".red().bold(), err.white());
        }
        for item in &result.failed {
            println!("  {} {} {}", "✗".red(), item.id.cyan(), item.reason.dimmed());
        }
    }
}

/// Trimmed, non-empty IDs in first-seen order, each once
fn unique_ids(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

fn build_filter(resource: ResourceKind, args: &BulkArgs, page_size: u32) -> Result<FilterState, PanelError> {
    let mut filter = FilterState::new(page_size);
    if let Some(search) = &args.search {
        filter = filter.with_search(search.as_str());
    }
    for (name, value) in &args.facets {
        if !resource.facet_names().contains(&name.as_str()) {
            return Err(PanelError::validation(format!(
                "{} has no facet '{}'. Valid: {}",
                resource,
                name,
                resource.facet_names().join(", ")
            )));
        }
        filter = filter.with_facet(name.as_str(), value.as_str());
    }
    Ok(filter)
}

pub async fn run_bulk(args: BulkArgs) -> Result<(), CliError> {
    let resource = ResourceKind::parse(&args.resource)?;
    let kind: BulkActionKind = args.action.parse()?;
    resource.check_action(kind)?;
    let action = BulkAction::from_parts(kind, args.reason.clone(), args.message.clone());
    // 本地校验先于任何网络请求
    action.validate()?;

    let ids = unique_ids(&args.ids);
    if !args.all && ids.is_empty() {
        return Err(PanelError::empty_selection("Pass --ids or --all").into());
    }

    let config = get_config();
    let filter = build_filter(resource, &args, config.bulk.default_page_size)?;

    let client = Arc::new(RestClient::from_config(&config.api)?);
    let rest = Arc::new(client.resource::<JsonRecord>(resource.path()));
    let fetcher: Arc<dyn PageFetcher<JsonRecord>> = rest.clone();
    let backend: Arc<dyn BulkActionBackend<String>> = rest;
    let prompt: Arc<dyn ConfirmationPrompt<String>> = if args.yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(StdinPrompt)
    };
    let coordinator = Arc::new(BulkActionCoordinator::new(
        backend,
        prompt,
        config.bulk.max_explicit_ids,
    ));

    let mut view = ListView::new(resource, filter, fetcher, coordinator)
        .with_events(Arc::new(TerminalEvents));

    if args.all {
        view.refresh().await?;
        view.select_all_matching();
        println!(
            "{} {} {} {}",
            "ℹ".bold().blue(),
            "Targeting all".bold(),
            view.total_matching().unwrap_or_default().to_string().green(),
            format!("matching {}", resource).bold()
        );
    } else {
        for id in ids {
            view.toggle(id);
        }
    }

    let result = match view.run(action).await {
        Ok(result) => result,
        Err(PanelError::Cancelled(_)) => {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match result.status() {
        ActionStatus::Succeeded => {
            println!(
                "{} {} {} {}",
                "✓".bold().green(),
                kind.to_string().green(),
                "succeeded for".green(),
                result.succeeded.len().to_string().cyan()
            );
            Ok(())
        }
        ActionStatus::PartiallyFailed => {
            println!(
                "{} {} {}, {} {}",
                "⚠".bold().yellow(),
                result.succeeded.len().to_string().green(),
                "succeeded".green(),
                result.failed.len().to_string().red(),
                "failed".red()
            );
            Err(CliError::CommandError(format!(
                "{} of the selected records failed",
                result.failed.len()
            )))
        }
        ActionStatus::Failed => Err(CliError::CommandError(format!(
            "{} failed{}",
            kind,
            result
                .request_error
                .as_deref()
                .map(|e| format!(": {}", e))
                .unwrap_or_default()
        ))),
    }
}
