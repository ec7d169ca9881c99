use std::time::{Duration, Instant};

use crate::cli::output::{brain_to_json, format_brain};
use crate::io::watcher::StateWatcher;
use crate::store::{Debouncer, Store};

use super::Context;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Print the selected post's brain dump, then again each time another
/// process rewrites the state file. Bursts of writes are coalesced with the
/// recompute delay. Runs until interrupted.
pub fn cmd_watch(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(&ctx.state_path, ctx.settings())?;
    let mut shown = store.brain_dump().to_vec();
    print_brain(ctx, &shown)?;

    // The directory must exist before it can be watched
    std::fs::create_dir_all(ctx.state_dir())?;
    let watcher = StateWatcher::start(&ctx.state_path)?;
    let mut reload = Debouncer::new(ctx.settings().recompute_delay);
    log::info!(
        "event=watch status=start path={}",
        ctx.state_path.display()
    );
    eprintln!("watching {} (ctrl-c to stop)", ctx.state_path.display());

    loop {
        let now = Instant::now();
        if !watcher.poll().is_empty() {
            reload.arm(now);
        }

        if reload.fire_if_due(now) {
            match Store::open(&ctx.state_path, ctx.settings()) {
                Ok(store) if store.brain_dump() != shown.as_slice() => {
                    shown = store.brain_dump().to_vec();
                    print_brain(ctx, &shown)?;
                }
                Ok(_) => {}
                Err(e) => log::warn!("event=watch status=reload_error error={}", e),
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn print_brain(ctx: &Context, items: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.json {
        // One document per line so consumers can stream it
        println!("{}", serde_json::to_string(&brain_to_json(items))?);
        return Ok(());
    }
    println!("--");
    for line in format_brain(items) {
        println!("{}", line);
    }
    Ok(())
}
