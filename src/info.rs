use serde::Serialize;

use crate::commands::Context;
use crate::indexfile::IndexFile;

/// Output the comprehensive navdex reference document.
pub fn run(ctx: &Context, json: bool) {
    let state = gather_state(ctx);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    config_path: String,
    index: Option<IndexCounts>,
    index_path: String,
    sources: Vec<String>,
}

#[derive(Serialize, Clone, Copy)]
struct IndexCounts {
    entries: usize,
    scopes: usize,
}

fn gather_state(ctx: &Context) -> CurrentState {
    let index = IndexFile::read(&ctx.index_path()).ok().map(|file| {
        return IndexCounts {
            entries: file.entry_count(),
            scopes: file.scopes.len(),
        };
    });

    return CurrentState {
        config_found: ctx.config_path.exists(),
        config_path: ctx.config_path.display().to_string(),
        index,
        index_path: ctx.config.index.display().to_string(),
        sources: ctx.config.sources.clone(),
    };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# navdex {version}

Symbol index for generated documentation. Load Doxygen navtree tables and
resolve `scope + member` names to the anchors that document them.

## Input

    var group__general =
    [
        [ \"TgBot::Bot\", \"class_tg_bot_1_1_bot.html\", [
          [ \"getApi\", \"class_tg_bot_1_1_bot.html#a2432...\", null ]
        ] ]
    ];

Nodes with children are scopes; leaves are entries. Overloads share a
name and differ by anchor.

## Workflow

    navdex build                      Load navtrees, write the index file
    navdex check                      Verify sources are unchanged (exit 0/1/2)
    navdex status                     Show freshness and totals
    navdex lookup <scope> <name>      Anchors for a member (scope may be short: Api)
    navdex find <name>                Every scope documenting <name>
    navdex scopes                     Scopes in declaration order
    navdex entries <scope>            Members of a scope in declaration order
    navdex export --format json       Print the index
    navdex source add <path>          Add a navtree file or directory
    navdex watch                      Rebuild when sources change

## Configuration (.navdex.toml)

    sources = [\"docs/html\"]             # navtree files or directories
    include = [\"docs/html/group__\"]     # only load these paths
    exclude = [\"docs/html/search/\"]     # skip these paths
    index = \".navdex.index\"             # index file location

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:  {} (found)", state.config_path);
    } else {
        println!("Config:  {} (not found, using defaults)", state.config_path);
    }

    match state.index {
        Some(counts) => println!(
            "Index:   {} ({} entries, {} scopes)",
            state.index_path, counts.entries, counts.scopes
        ),
        None => println!("Index:   {} (not found)", state.index_path),
    }

    if state.sources.is_empty() {
        println!("Sources: (none)");
    } else {
        println!("Sources: {}", state.sources.join(", "));
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success / all sources fresh (a lookup miss is still 0) |
| 1    | Stale sources found |
| 2    | Missing sources found |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    exit_codes: Vec<ExitCodeInfo>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    config_path: String,
    index: Option<IndexCounts>,
    index_path: String,
    sources: Vec<String>,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success / all sources fresh".to_string() },
            ExitCodeInfo { code: 1, meaning: "Stale sources found".to_string() },
            ExitCodeInfo { code: 2, meaning: "Missing sources found".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        current_state: StateJson {
            config_found: state.config_found,
            config_path: state.config_path.clone(),
            index: state.index,
            index_path: state.index_path.clone(),
            sources: state.sources.clone(),
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
