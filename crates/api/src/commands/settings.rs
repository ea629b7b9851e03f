//! Settings and filter commands

use std::time::Instant;

use autojoin_domain::{Result, Settings, SettingsPatch};

use crate::utils::logging::log_command_result;
use crate::AppContext;

pub async fn get_settings(ctx: &AppContext) -> Result<Settings> {
    let command_name = "settings::get_settings";
    let start = Instant::now();

    let result = ctx.actions.settings().await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn set_paused(ctx: &AppContext, paused: bool) -> Result<()> {
    let command_name = "settings::set_paused";
    let start = Instant::now();

    let result = ctx.actions.set_paused(paused).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn update_settings(ctx: &AppContext, patch: &SettingsPatch) -> Result<Settings> {
    let command_name = "settings::update_settings";
    let start = Instant::now();

    let result = ctx.actions.update_settings(patch).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

/// Set or clear (`None`) the lead time for one event.
pub async fn set_event_override(
    ctx: &AppContext,
    event_id: &str,
    minutes: Option<u32>,
) -> Result<()> {
    let command_name = "settings::set_event_override";
    let start = Instant::now();

    let result = ctx.actions.set_event_override(event_id, minutes).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn add_filter(ctx: &AppContext, pattern: &str) -> Result<Settings> {
    let command_name = "settings::add_filter";
    let start = Instant::now();

    let result = ctx.actions.add_filter(pattern).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}

pub async fn remove_filter(ctx: &AppContext, pattern: &str) -> Result<Settings> {
    let command_name = "settings::remove_filter";
    let start = Instant::now();

    let result = ctx.actions.remove_filter(pattern).await;

    log_command_result(command_name, start.elapsed(), &result);
    result
}
