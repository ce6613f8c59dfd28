//! csged CLI - line-oriented CSG tree editor.
//!
//! Plain input lines go to the natural-language command parser
//! (`add box at 1 2 3`, `subtract ball radius 0.5`); `:`-prefixed meta
//! commands cover selection, boolean buttons, history, playback, and
//! import/export.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csged_editor::{CommandOutcome, Editor, EditorConfig};
use csged_ir::{format_node_id, parse_node_id, wire, Node, NodeId, NodeKind, Primitive};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory.
const CONFIG_FILE: &str = "csged.toml";

#[derive(Parser)]
#[command(name = "csged")]
#[command(about = "CSG tree editor with natural-language commands", long_about = None)]
struct Cli {
    /// Path to a configuration file (defaults to ./csged.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive editing session
    Repl {
        /// JSON document to load at startup
        file: Option<PathBuf>,
    },
    /// Display information about a saved document
    Info {
        /// Path to the JSON document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Repl { file }) => run_repl(config, file.as_deref()),
        Some(Commands::Info { file }) => show_info(&file),
        None => run_repl(config, None),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    match explicit {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None if Path::new(CONFIG_FILE).exists() => {
            EditorConfig::load(CONFIG_FILE).context("loading ./csged.toml")
        }
        None => Ok(EditorConfig::default()),
    }
}

fn run_repl(config: EditorConfig, file: Option<&Path>) -> Result<()> {
    let mut editor = Editor::with_config(config);

    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        editor
            .load_json(&text)
            .with_context(|| format!("importing {}", path.display()))?;
        println!("loaded {} ({} nodes)", path.display(), editor.document().len());
    }

    println!("csged - type a command (\"add box at 1 2 3\") or :help");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(meta) = line.strip_prefix(':') {
            if !run_meta(&mut editor, meta) {
                break;
            }
        } else {
            match editor.run_command(line) {
                Ok(CommandOutcome::Created(id)) => {
                    println!("created {}", describe(&editor, id));
                }
                Ok(CommandOutcome::Combined(id)) => {
                    println!("combined into {}", describe(&editor, id));
                }
                Err(err) => println!("error: {err}"),
            }
        }
    }

    Ok(())
}

/// Execute one `:` meta command. Returns false to quit the session.
fn run_meta(editor: &mut Editor, meta: &str) -> bool {
    let parts: Vec<&str> = meta.split_whitespace().collect();
    let (cmd, args) = match parts.split_first() {
        Some((cmd, args)) => (*cmd, args),
        None => return true,
    };

    let outcome: Result<(), String> = match cmd {
        "help" | "h" => {
            print_help();
            Ok(())
        }
        "box" => editor
            .add_box()
            .map(|id| println!("added {}", describe(editor, id)))
            .map_err(|e| e.to_string()),
        "sphere" => editor
            .add_sphere()
            .map(|id| println!("added {}", describe(editor, id)))
            .map_err(|e| e.to_string()),
        "union" | "subtract" | "intersect" => {
            let op = match cmd {
                "union" => csged_ir::BoolOp::Union,
                "subtract" => csged_ir::BoolOp::Subtract,
                _ => csged_ir::BoolOp::Intersect,
            };
            editor
                .boolean_selected(op)
                .map(|id| println!("applied {}", describe(editor, id)))
                .map_err(|e| e.to_string())
        }
        "select" | "toggle" => match args.first().and_then(|s| node_arg(s)) {
            Some(id) => {
                let result = if cmd == "select" {
                    editor.select_node(id)
                } else {
                    editor.toggle_selection(id)
                };
                result
                    .map(|()| print_selection(editor))
                    .map_err(|e| e.to_string())
            }
            None => Err(format!("usage: :{cmd} <node id>")),
        },
        "clear" => {
            editor.clear_selection();
            Ok(())
        }
        "tree" => {
            print_tree(editor);
            Ok(())
        }
        "history" => {
            let last = editor.history().len().saturating_sub(1);
            println!(
                "step {}/{}",
                editor.history().cursor().unwrap_or(0),
                last
            );
            Ok(())
        }
        "undo" => {
            if editor.undo() {
                Ok(())
            } else {
                Err("nothing to undo".to_string())
            }
        }
        "redo" => {
            if editor.redo() {
                Ok(())
            } else {
                Err("nothing to redo".to_string())
            }
        }
        "goto" => match args.first().and_then(|s| s.parse::<usize>().ok()) {
            Some(index) => {
                if editor.restore(index) {
                    Ok(())
                } else {
                    Err(format!("no history step {index}"))
                }
            }
            None => Err("usage: :goto <step>".to_string()),
        },
        "play" => {
            run_playback(editor);
            Ok(())
        }
        "save" => match args.first() {
            Some(path) => save_document(editor, Path::new(path)),
            None => Err("usage: :save <path>".to_string()),
        },
        "load" => match args.first() {
            Some(path) => load_document(editor, Path::new(path)),
            None => Err("usage: :load <path>".to_string()),
        },
        "new" => editor
            .new_document()
            .map(|()| println!("new document"))
            .map_err(|e| e.to_string()),
        "quit" | "q" | "exit" => return false,
        other => Err(format!("unknown meta command :{other} (try :help)")),
    };

    if let Err(message) = outcome {
        println!("error: {message}");
    }
    true
}

/// Cooperative playback: sleep the configured interval between ticks. Input
/// is not read while the replay runs, so edits cannot interleave with it.
fn run_playback(editor: &mut Editor) {
    if !editor.start_playback() {
        println!("nothing to replay");
        return;
    }
    let interval = Duration::from_millis(editor.config().playback_interval_ms);
    let last = editor.history().len().saturating_sub(1);
    while editor.is_playing() {
        std::thread::sleep(interval);
        if !editor.playback_tick() {
            break;
        }
        println!("step {}/{last}", editor.history().cursor().unwrap_or(0));
    }
    println!("playback finished");
}

fn save_document(editor: &Editor, path: &Path) -> Result<(), String> {
    let json = editor.to_json().map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| e.to_string())?;
    println!("saved {}", path.display());
    Ok(())
}

fn load_document(editor: &mut Editor, path: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    editor.load_json(&text).map_err(|e| e.to_string())?;
    println!("loaded {} ({} nodes)", path.display(), editor.document().len());
    Ok(())
}

/// Accept both `node_3` and bare `3`.
fn node_arg(s: &str) -> Option<NodeId> {
    parse_node_id(s).or_else(|| s.parse().ok())
}

fn describe(editor: &Editor, id: NodeId) -> String {
    match editor.document().get(id) {
        Some(node) => format!("{} [{}]", node.name, format_node_id(id)),
        None => format_node_id(id),
    }
}

fn print_selection(editor: &Editor) {
    let names: Vec<&str> = editor
        .selected_nodes()
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    if names.is_empty() {
        println!("no selection");
    } else {
        println!("selected: {}", names.join(", "));
    }
}

fn print_tree(editor: &Editor) {
    if editor.document().is_empty() {
        println!("(empty document)");
        return;
    }
    for root in editor.document().roots() {
        print_node(editor, root, 0);
    }
}

fn print_node(editor: &Editor, node: &Node, depth: usize) {
    let marker = if editor.selection().contains(node.id) {
        "*"
    } else {
        " "
    };
    println!(
        "{}{} {} [{}] {}",
        "  ".repeat(depth),
        marker,
        node.name,
        format_node_id(node.id),
        node_summary(node),
    );
    if let NodeKind::Operation { left, right, .. } = node.kind {
        for child in [left, right] {
            if let Some(child_node) = editor.document().get(child) {
                print_node(editor, child_node, depth + 1);
            }
        }
    }
}

fn node_summary(node: &Node) -> String {
    match &node.kind {
        NodeKind::Primitive(Primitive::Box {
            width,
            height,
            depth,
        }) => format!("box {width}x{height}x{depth}"),
        NodeKind::Primitive(Primitive::Sphere { radius }) => format!("sphere r={radius}"),
        NodeKind::Operation { op, .. } => format!("{op}"),
    }
}

fn show_info(file: &Path) -> Result<()> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let doc = wire::from_json(&text).with_context(|| format!("parsing {}", file.display()))?;

    println!("csged document: {}", file.display());
    println!("  nodes:   {}", doc.len());
    println!("  roots:   {}", doc.roots().count());
    println!("  next id: {}", format_node_id(doc.next_id()));
    for root in doc.roots() {
        println!("  - {} [{}]", root.name, format_node_id(root.id));
    }
    Ok(())
}

fn print_help() {
    println!("natural-language commands:");
    println!("  add box [size w h d | size s] [at x y z]");
    println!("  create sphere [radius r] [at x y z]");
    println!("  subtract|cut|remove|union|combine|intersect <shape> ...");
    println!("    (boolean verbs combine a new shape with the selected node)");
    println!("meta commands:");
    println!("  :box :sphere                add with default params");
    println!("  :union :subtract :intersect combine the two selected nodes");
    println!("  :select <id> :toggle <id> :clear");
    println!("  :tree :history :undo :redo :goto <step> :play");
    println!("  :save <path> :load <path> :new :quit");
}
