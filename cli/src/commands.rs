use countdown_core::{CountdownConfig, CountdownKey, LifecycleEvent, TimerKey};
use std::io::Write;

use crate::CliContext;

/// Tick printer standing in for a countdown label
fn label(key: TimerKey) -> impl Fn(i64, bool) + Send + Sync + 'static {
    move |remaining, finished| {
        if finished {
            println!("\r[{key}] finished");
        } else {
            println!("\r[{key}] {remaining}");
        }
    }
}

pub fn start(ctx: &CliContext, key: TimerKey, secs: Option<i64>) {
    let secs = secs.unwrap_or(ctx.config.default_duration_secs);
    ctx.registry.start(key, secs, label(key));
    println!("started {key} for {secs}s");
}

pub fn stop(ctx: &CliContext, key: TimerKey) {
    if !ctx.registry.active_keys().contains(&key) {
        println!("{key} is not running");
        return;
    }
    ctx.registry.stop(key);
}

pub fn continue_countdown(ctx: &CliContext, key: TimerKey) {
    ctx.registry.continue_countdown(key, label(key));
}

pub fn status(ctx: &CliContext) {
    println!("{:<12} {:<10} {}", "Key", "State", "Remaining");
    println!("{}", "-".repeat(32));

    for &key in TimerKey::all() {
        let state = if ctx.registry.is_finished(key) {
            "finished"
        } else {
            "running"
        };
        let remaining = ctx
            .registry
            .remaining(key)
            .map(|secs| format!("{secs}s"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12} {:<10} {}", key, state, remaining);
    }
}

pub async fn notify(ctx: &CliContext, event: LifecycleEvent) {
    if ctx.lifecycle.send(event).await.is_err() {
        println!("lifecycle listener is not running");
    }
}

pub fn show_config(ctx: &CliContext) {
    let config = &ctx.config;
    println!("stop_invokes_callback: {}", config.stop_invokes_callback);
    println!("delivery_capacity:     {}", config.delivery_capacity);
    println!("default_duration_secs: {}", config.default_duration_secs);
}

/// Apply the given settings and persist them. With none given, show the
/// current configuration. The stop policy is read when the registry is built,
/// so a change only reaches countdowns after the next launch.
pub fn configure(
    ctx: &mut CliContext,
    stop_invokes_callback: Option<bool>,
    default_duration_secs: Option<i64>,
) -> Result<(), String> {
    if !apply_settings(&mut ctx.config, stop_invokes_callback, default_duration_secs) {
        show_config(ctx);
        return Ok(());
    }
    ctx.config.save().map_err(|e| format!("error: {e}\n"))?;
    println!("configuration saved");
    if stop_invokes_callback.is_some() {
        println!("stop_invokes_callback applies after restart");
    }
    Ok(())
}

/// Returns whether anything was given.
fn apply_settings(
    config: &mut CountdownConfig,
    stop_invokes_callback: Option<bool>,
    default_duration_secs: Option<i64>,
) -> bool {
    if let Some(value) = stop_invokes_callback {
        config.stop_invokes_callback = value;
    }
    if let Some(secs) = default_duration_secs {
        config.default_duration_secs = secs;
    }
    stop_invokes_callback.is_some() || default_duration_secs.is_some()
}

pub fn exit(ctx: &mut CliContext) -> Result<(), String> {
    ctx.shutdown();
    writeln!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
