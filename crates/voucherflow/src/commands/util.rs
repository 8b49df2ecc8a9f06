//! Shared helpers for command handlers.

use std::io::IsTerminal;

use voucherflow_core::{FilterInput, NotificationStatus, ViewQuery};

use crate::cli::{FilterArgs, StatusFilter, StatusValue};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer failure; Ctrl-C at a prompt counts as an interrupt.
pub fn prompt_err(err: dialoguer::Error) -> CliError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            CliError::Interrupted
        }
        dialoguer::Error::IO(e) => CliError::Io(e),
    }
}

pub fn status_value(value: StatusValue) -> NotificationStatus {
    match value {
        StatusValue::Pending => NotificationStatus::Pending,
        StatusValue::Validated => NotificationStatus::Validated,
        StatusValue::Rejected => NotificationStatus::Rejected,
    }
}

/// `None` is the "all" tab.
pub fn status_filter(filter: StatusFilter) -> Option<NotificationStatus> {
    match filter {
        StatusFilter::All => None,
        StatusFilter::Pending => Some(NotificationStatus::Pending),
        StatusFilter::Validated => Some(NotificationStatus::Validated),
        StatusFilter::Rejected => Some(NotificationStatus::Rejected),
    }
}

/// Build the starting view from `--view` plus individual filter flags.
///
/// Flags override the matching fields of `--view`. Any filter flag
/// resets the page position, as changing filters in the dashboard does.
pub fn view_from_args(args: &FilterArgs) -> ViewQuery {
    let mut view = args.view.as_deref().map(ViewQuery::parse).unwrap_or_default();

    let flags = FilterInput {
        code: args.code.clone(),
        device_id: args.device.clone(),
        amount_min: args.amount_min.clone(),
        amount_max: args.amount_max.clone(),
        date_from: args.from.clone(),
        date_to: args.to.clone(),
        ..FilterInput::default()
    };
    if !flags.is_empty() {
        let current = view.filters.clone();
        view.apply_filters(FilterInput {
            code: flags.code.or(current.code),
            device_id: flags.device_id.or(current.device_id),
            amount_min: flags.amount_min.or(current.amount_min),
            amount_max: flags.amount_max.or(current.amount_max),
            date_from: flags.date_from.or(current.date_from),
            date_to: flags.date_to.or(current.date_to),
            ..FilterInput::default()
        });
    }
    if let Some(status) = args.status {
        view.set_status(status_filter(status));
    }
    view
}
