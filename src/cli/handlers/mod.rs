mod watch;
pub use watch::cmd_watch;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::state as state_io;
use crate::logging;
use crate::model::config::Config;
use crate::ops::brain_ops::BrainError;
use crate::ops::post_ops;
use crate::ops::reducer::Action;
use crate::ops::search;
use crate::store::{Store, StoreError, StoreSettings};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved configuration for one invocation
pub struct Context {
    pub config: Config,
    pub state_path: PathBuf,
    pub json: bool,
}

impl Context {
    fn settings(&self) -> StoreSettings {
        StoreSettings::from(&self.config.debounce)
    }

    fn state_dir(&self) -> &Path {
        state_io::state_dir(&self.state_path)
    }

    fn label_width(&self) -> usize {
        self.config.display.max_label_width
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = load_context(cli.state_file.as_deref(), cli.json)?;

    match cli.command {
        None => cmd_overview(&ctx),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List => cmd_list(&ctx),
            Commands::Show(args) => cmd_show(&ctx, args),
            Commands::Search(args) => cmd_search(&ctx, args),
            Commands::Watch => cmd_watch(&ctx),
            Commands::Recovery(args) => cmd_recovery(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Select(args) => cmd_select(&ctx, args),
            Commands::Delete(args) => cmd_delete(&ctx, args),
            Commands::Write(args) => cmd_write(&ctx, args),
            Commands::NoDisturb(args) => cmd_no_disturb(&ctx, args),

            Commands::Brain(args) => match args.action {
                None | Some(BrainAction::List) => cmd_brain_list(&ctx),
                Some(BrainAction::Add(args)) => cmd_brain_add(&ctx, args),
                Some(BrainAction::Mv(args)) => cmd_brain_mv(&ctx, args),
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_context(state_file: Option<&Path>, json: bool) -> Result<Context, Box<dyn std::error::Error>> {
    let mut config = config_io::read_config()?;
    config_io::apply_overrides(&mut config, state_file);

    let state_path = std::path::absolute(config_io::resolve_state_path(&config))
        .map_err(|e| format!("cannot resolve state file path: {}", e))?;
    config.storage.state_file = Some(state_path.clone());

    let log_dir = config_io::resolve_log_dir(&config);
    if let Err(e) = logging::init_logging(&config.log.level, &log_dir) {
        eprintln!("warning: file logging disabled: {}", e);
    }

    Ok(Context {
        config,
        state_path,
        json,
    })
}

fn open_store(ctx: &Context) -> Result<Store, Box<dyn std::error::Error>> {
    Ok(Store::open(&ctx.state_path, ctx.settings())?)
}

/// Run `edit` against a locked store and write the result before returning.
fn with_store<F>(ctx: &Context, edit: F) -> CmdResult
where
    F: FnOnce(&mut Store, Instant) -> CmdResult,
{
    let _lock = FileLock::acquire_default(ctx.state_dir())?;
    let mut store = open_store(ctx)?;
    edit(&mut store, Instant::now())?;
    store.flush()?;
    Ok(())
}

/// Brain dump positions are 1-based on the command line.
fn brain_error_message(err: StoreError) -> Box<dyn std::error::Error> {
    match err {
        StoreError::Brain(BrainError::IndexOutOfRange { index, len }) => format!(
            "no brain dump item at position {} (have {})",
            index + 1,
            len
        )
        .into(),
        other => other.into(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_overview(ctx: &Context) -> CmdResult {
    let store = open_store(ctx)?;
    let state = store.state();
    if ctx.json {
        return print_json(&OverviewJson {
            posts: posts_to_json(state),
            selected: state.selected_post().map(|p| p.id.to_string()),
            brain: store.brain_dump().to_vec(),
            no_disturb: state.no_disturb,
        });
    }
    for line in format_overview(state, store.brain_dump(), ctx.label_width()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_list(ctx: &Context) -> CmdResult {
    let store = open_store(ctx)?;
    if ctx.json {
        return print_json(&posts_to_json(store.state()));
    }
    for line in format_post_list(store.state(), ctx.label_width()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    let store = open_store(ctx)?;
    let state = store.state();
    let post = match args.post.as_deref() {
        Some(key) => post_ops::resolve_post(state, key)?,
        None => post_ops::require_selection(state)?,
    };

    if ctx.json {
        return print_json(&PostDetailJson {
            id: post.id.to_string(),
            label: post.label.clone(),
            body: post.body.clone(),
            brain: crate::ops::brain_ops::extract(&post.body),
        });
    }
    print!("{}", post.body);
    if !post.body.is_empty() && !post.body.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn cmd_search(ctx: &Context, args: SearchArgs) -> CmdResult {
    let store = open_store(ctx)?;
    let state = store.state();
    let re = Regex::new(&args.pattern)?;
    let hits = search::search_posts(state, &re);

    let label_of = |hit: &search::SearchHit| {
        state
            .find_post(&hit.post_id)
            .map(|p| p.label.clone())
            .unwrap_or_default()
    };

    if ctx.json {
        let out: Vec<SearchHitJson> = hits
            .iter()
            .map(|h| search_hit_to_json(h, &label_of(h)))
            .collect();
        return print_json(&out);
    }
    for hit in &hits {
        println!(
            "{}",
            format_search_hit(hit, &label_of(hit), ctx.label_width())
        );
    }
    Ok(())
}

fn cmd_brain_list(ctx: &Context) -> CmdResult {
    let store = open_store(ctx)?;
    post_ops::require_selection(store.state())?;
    if ctx.json {
        return print_json(&brain_to_json(store.brain_dump()));
    }
    for line in format_brain(store.brain_dump()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_recovery(ctx: &Context, args: RecoveryCmd) -> CmdResult {
    if let Some(RecoveryAction::Path) = args.action {
        println!(
            "{}",
            recovery::recovery_log_path(ctx.state_dir()).display()
        );
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(ctx.state_dir(), Some(args.limit.unwrap_or(10)));
    if ctx.json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        return print_json(&out);
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_recovery_entry(entry) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let label = post_ops::validate_label(&args.label)?.to_string();
    with_store(ctx, |store, now| {
        store.dispatch(Action::AddPost { label }, now);
        if let Some(post) = store.state().selected_post() {
            println!("{}", post.id);
        }
        Ok(())
    })
}

fn cmd_select(ctx: &Context, args: PostArg) -> CmdResult {
    with_store(ctx, |store, now| {
        let post = post_ops::resolve_post(store.state(), &args.post)?;
        let (id, label) = (post.id.clone(), post.label.clone());
        store.dispatch(
            Action::SelectPost {
                id,
                immediate: true,
            },
            now,
        );
        println!("selected {}", label);
        Ok(())
    })
}

fn cmd_delete(ctx: &Context, args: PostArg) -> CmdResult {
    let state_dir = ctx.state_dir().to_path_buf();
    with_store(ctx, |store, now| {
        let post = post_ops::resolve_post(store.state(), &args.post)?.clone();

        if !post.body.is_empty() {
            recovery::log_recovery(
                &state_dir,
                RecoveryEntry {
                    timestamp: Utc::now(),
                    category: RecoveryCategory::Delete,
                    description: format!("post \"{}\" deleted", post.label),
                    fields: vec![("Post".to_string(), post.id.to_string())],
                    body: post.body.clone(),
                },
            );
        }

        store.dispatch(Action::DeletePost { id: post.id }, now);
        println!("deleted {}", post.label);
        Ok(())
    })
}

fn cmd_write(ctx: &Context, args: WriteArgs) -> CmdResult {
    // Read before locking: stdin may be a user typing
    let body = read_body(args.file.as_deref(), std::io::stdin().lock())?;

    with_store(ctx, |store, now| {
        post_ops::require_selection(store.state())?;
        store.dispatch(
            Action::UpdateBody {
                body,
                immediate: true,
            },
            now,
        );
        Ok(())
    })
}

/// Body text from `file`, or from `input` when no file is given.
fn read_body(file: Option<&Path>, mut input: impl Read) -> Result<String, Box<dyn std::error::Error>> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {}", path.display(), e))?),
        None => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn cmd_no_disturb(ctx: &Context, args: NoDisturbArgs) -> CmdResult {
    with_store(ctx, |store, now| {
        store.dispatch(
            Action::NoDisturb {
                value: args.value.map(bool::from),
            },
            now,
        );
        let state = if store.state().no_disturb { "on" } else { "off" };
        println!("no-disturb: {}", state);
        Ok(())
    })
}

fn cmd_brain_add(ctx: &Context, args: BrainAddArgs) -> CmdResult {
    with_store(ctx, |store, now| {
        store.add_brain(&args.label, now)?;
        println!("{}", store.brain_dump().len());
        Ok(())
    })
}

fn cmd_brain_mv(ctx: &Context, args: BrainMvArgs) -> CmdResult {
    if args.from == 0 || args.to == 0 {
        return Err("brain dump positions start at 1".into());
    }
    with_store(ctx, |store, now| {
        store
            .move_brain_item(args.from - 1, Some(args.to - 1), now)
            .map_err(brain_error_message)?;
        for line in format_brain(store.brain_dump()) {
            println!("{}", line);
        }
        Ok(())
    })
}
