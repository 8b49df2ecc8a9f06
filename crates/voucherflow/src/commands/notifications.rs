//! Notification command handlers: list, browse, get, set-status.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use voucherflow_core::{
    Notification, NotificationId, NotificationPage, NotificationStatus, NotificationsResult,
    PaginationInfo, Session, ViewQuery, collect_all, fetch_page, fetch_page_cancellable,
    format_amount, format_timestamp, get_notification, resolve, set_status, update_status_checked,
};

use crate::cli::{BrowseArgs, GlobalOpts, ListArgs, OutputFormat, SetStatusArgs, StatusFilter};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl NotificationRow {
    fn new(position: usize, n: &Notification, color: bool) -> Self {
        Self {
            key: n.display_key(position),
            code: n.code.clone(),
            name: n.name.clone(),
            status: output::paint_status(n.status, color),
            amount: format_amount(n.amount),
            device: n.device_id.clone().unwrap_or_else(|| "-".into()),
            date: format_timestamp(n.timestamp),
        }
    }
}

fn rows(data: &[Notification], color: bool) -> Vec<NotificationRow> {
    data.iter()
        .enumerate()
        .map(|(i, n)| NotificationRow::new(i + 1, n, color))
        .collect()
}

fn detail(n: &Notification) -> String {
    let moves: Vec<&str> = n
        .status
        .transitions()
        .into_iter()
        .map(NotificationStatus::label)
        .collect();
    [
        format!("ID:       {}", n.id.as_ref().map_or("-", NotificationId::as_str)),
        format!("Code:     {}", n.code),
        format!("Name:     {}", n.name),
        format!("Status:   {}", n.status.label()),
        format!("Amount:   {}", format_amount(n.amount)),
        format!("Device:   {}", n.device_id.as_deref().unwrap_or("-")),
        format!("Date:     {}", format_timestamp(n.timestamp)),
        format!("Moves to: {}", moves.join(", ")),
    ]
    .join("\n")
}

fn plain_id(n: &Notification) -> String {
    n.id.as_ref().map_or_else(|| n.code.clone(), NotificationId::to_string)
}

/// Keep only records matching `--search`, when given.
fn quick_search(records: Vec<Notification>, search: Option<&str>) -> Vec<Notification> {
    match search {
        Some(q) => records.into_iter().filter(|n| n.matches_search(q)).collect(),
        None => records,
    }
}

/// One-line page summary for table mode.
fn footer(page: &NotificationPage, shown: usize, color: bool) -> String {
    let state = &page.state;
    let total = if state.total_exact {
        format!("{} records", state.total)
    } else {
        format!("about {} records", state.total)
    };
    let counts = page.counts();
    let mut line = format!(
        "Page {} of {} · {total} · this page: {} pending, {} validated, {} rejected",
        state.page,
        state.total_pages().max(1),
        counts.pending,
        counts.validated,
        counts.rejected,
    );
    if shown != page.notifications.len() {
        let _ = write!(line, " · {shown} match search");
    }
    output::dim(&line, color)
}

/// Structured output of `list --all`.
#[derive(Serialize)]
struct Collected<'a> {
    data: &'a [Notification],
    pages_fetched: u32,
    complete: bool,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(session: &Session, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.all {
        return list_all(session, args, global).await;
    }

    let mut view = util::view_from_args(&args.filters);
    if let Some(page) = args.page {
        view.page = Some(page);
    }
    if args.last_key.is_some() {
        view.filters.last_key = args.last_key;
    }
    let (view, page_size) = sized_view(session, &view, args.page_size, global.quiet);

    let query = resolve(view.page(), page_size, &view.filters);
    let page = fetch_page(session, &query).await?;

    let data = quick_search(page.notifications.clone(), args.filters.search.as_deref());
    let envelope = NotificationsResult {
        success: true,
        data: data.clone(),
        pagination: PaginationInfo::from(&page.state),
        error: None,
    };

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &data,
        &envelope,
        |data| rows(data, color),
        plain_id,
    );
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) {
        output::print_note(&footer(&page, data.len(), color), global.quiet);
        if page.state.has_next() {
            let next = view.navigate(&page.state, page.state.page.saturating_add(1));
            output::print_note(
                &format!("Next: voucherflow list --view '{}'", next.to_query_string()),
                global.quiet,
            );
        }
    }
    Ok(())
}

async fn list_all(session: &Session, args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let view = util::view_from_args(&args.filters);

    let spinner = (!global.quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("fetching notifications");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let collected = collect_all(session, &view.filters, args.page_size.or(view.page_size), args.max_pages).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let collected = collected?;

    let data = quick_search(collected.notifications, args.filters.search.as_deref());
    let envelope = Collected {
        data: &data,
        pages_fetched: collected.pages_fetched,
        complete: collected.complete,
    };

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &data,
        &envelope,
        |data| rows(data, color),
        plain_id,
    );
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !collected.complete {
        output::print_note(
            &format!(
                "Stopped after {} pages; raise --max-pages to fetch more.",
                collected.pages_fetched
            ),
            global.quiet,
        );
    }
    Ok(())
}

pub async fn get(session: &Session, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let notification = get_notification(session, id).await?;
    let out = output::render_single(&global.output, &notification, detail, plain_id);
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn set_status_cmd(
    session: &Session,
    args: SetStatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let status = util::status_value(args.status);
    let id = NotificationId::parse(&args.id).ok_or_else(|| CliError::Validation {
        field: "id".into(),
        reason: "notification id must not be empty".into(),
    })?;

    if status == NotificationStatus::Rejected
        && !util::confirm(&format!("Reject notification {id}?"), global.yes)?
    {
        return Ok(());
    }

    let updated = match args.expect {
        Some(expected) => {
            update_status_checked(session, id.as_str(), status, util::status_value(expected))
                .await?
        }
        None => set_status(session, &id, status).await?,
    };

    if matches!(global.output, OutputFormat::Table) {
        output::print_note(&format!("✓ {id} is now {}", updated.status.label()), global.quiet);
    } else {
        let out = output::render_single(&global.output, &updated, detail, plain_id);
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

// ── Browse ──────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Action {
    Next,
    Previous,
    Status,
    Refresh,
    Quit,
}

pub async fn browse(session: &Session, args: BrowseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NotInteractive {
            command: "browse".into(),
        });
    }

    let color = output::should_color(&global.color);
    let (mut view, page_size) =
        sized_view(session, &util::view_from_args(&args.filters), args.page_size, global.quiet);

    loop {
        let query = resolve(view.page(), page_size, &view.filters);
        let page = fetch_interruptible(session, &query).await?;

        let data = quick_search(page.notifications.clone(), args.filters.search.as_deref());
        println!("{}", output::render_table(&rows(&data, color)));
        eprintln!("{}", footer(&page, data.len(), color));
        eprintln!("{}", output::dim(&format!("View: ?{}", view.to_query_string()), color));

        let mut actions = Vec::new();
        if page.state.has_next() {
            actions.push(("Next page", Action::Next));
        }
        if page.state.has_previous() {
            actions.push(("Previous page (restarts at page 1)", Action::Previous));
        }
        actions.push(("Filter by status", Action::Status));
        actions.push(("Refresh", Action::Refresh));
        actions.push(("Quit", Action::Quit));

        let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();
        let choice = Select::new()
            .with_prompt("Navigate")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(util::prompt_err)?;

        view = match actions.get(choice).map(|(_, action)| *action) {
            Some(Action::Next) => view.navigate(&page.state, page.state.page.saturating_add(1)),
            Some(Action::Previous) => view.navigate(&page.state, page.state.page.saturating_sub(1)),
            Some(Action::Status) => with_status_tab(view)?,
            Some(Action::Refresh) => view,
            Some(Action::Quit) | None => return Ok(()),
        };
    }
}

/// Settle the page size for `view`: `--page-size`, else the view's own,
/// else the configured default. A size the cursor was not issued under
/// restarts at page 1.
fn sized_view(
    session: &Session,
    view: &ViewQuery,
    requested: Option<u32>,
    quiet: bool,
) -> (ViewQuery, u32) {
    let page_size = session.page_size(requested.or(view.page_size));
    let sized = view.resized(page_size, session.page_size(None));
    if view.last_key().is_some() && sized.last_key().is_none() {
        output::print_note(
            &format!("Page size is now {page_size}; restarting at page 1."),
            quiet,
        );
    }
    (sized, page_size)
}

/// Fetch a page, abandoning it if Ctrl-C arrives first.
async fn fetch_interruptible(
    session: &Session,
    query: &voucherflow_core::ResolvedQuery,
) -> Result<NotificationPage, CliError> {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let result = fetch_page_cancellable(session, query, &cancel).await;
    watcher.abort();
    result.map_err(CliError::from)
}

fn with_status_tab(mut view: ViewQuery) -> Result<ViewQuery, CliError> {
    let tabs = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Validated,
        StatusFilter::Rejected,
    ];
    let labels: Vec<&str> = tabs.iter().copied().map(StatusFilter::as_str).collect();
    let choice = Select::new()
        .with_prompt("Status")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    if let Some(tab) = tabs.get(choice) {
        view.set_status(util::status_filter(*tab));
    }
    Ok(view)
}
