//! Terminal host for the Shavian dictionary.
//!
//! Usage:
//!   shavian --root notes list
//!   shavian --root notes define 𐑓𐑮𐑧𐑯𐑛 friend
//!   shavian --root notes translate "Hello friend."
//!   shavian --root notes render chapter.md --caret 120
//!   shavian --root notes interactive

use anyhow::Context;
use clap::{Parser, Subcommand};
use shavian_core::{
    BackgroundStorage, Command, CommandResult, Dictionary, Engine, FileStorage, HostEditor,
    HostUi, KeyEvent, KeyResult, PasteResult, RefreshTrigger, Settings, TextBuffer,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod terminal;
use terminal::TerminalUi;

/// Settings location relative to the collection root.
const SETTINGS_FILE: &str = ".shavian/settings.toml";

#[derive(Parser, Debug)]
#[command(name = "shavian")]
#[command(about = "Personal Shavian dictionary and live reader")]
struct Cli {
    /// Document collection root (the dictionary lives under it)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Settings file (defaults to .shavian/settings.toml under the root)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Disable ANSI styling of rendered translations
    #[arg(long)]
    plain: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show the dictionary sorted by translation
    List,
    /// Define or redefine a word
    Define { script: String, translation: String },
    /// Remove a word
    Remove { script: String },
    /// Translate Latin text into Shavian (reads stdin when no text is given)
    Translate { text: Vec<String> },
    /// Print a file with learned words rendered as their translations
    Render {
        file: PathBuf,
        /// Caret offset in bytes (defaults to the end of the file)
        #[arg(long)]
        caret: Option<usize>,
    },
    /// Toggle rendering of learned words and save the setting
    Toggle,
    /// Print the effective settings
    Settings,
    /// Type lines of text; completed unknown words prompt for a translation
    Interactive,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| cli.root.join(SETTINGS_FILE));
    let settings = Settings::load_toml_or_default(&settings_path)
        .with_context(|| format!("failed to read settings {}", settings_path.display()))?;

    let storage = BackgroundStorage::new(FileStorage::in_root(&cli.root));
    let dictionary = Dictionary::load(storage);
    tracing::debug!(
        root = %cli.root.display(),
        entries = dictionary.len(),
        origin = ?dictionary.load_origin(),
        "dictionary ready"
    );
    let mut engine = Engine::new(dictionary, settings);
    let mut ui = TerminalUi;

    let result = run(&cli, &settings_path, &mut engine, &mut ui);
    engine.deactivate();
    result
}

fn run(cli: &Cli, settings_path: &Path, engine: &mut Engine, ui: &mut TerminalUi) -> anyhow::Result<()> {
    let ansi = !cli.plain;
    match &cli.command {
        Cmd::List => {
            let mut buffer = TextBuffer::new();
            if let CommandResult::Listing(entries) =
                engine.run_command(Command::ShowDictionary, &mut buffer, ui)
            {
                print!("{}", terminal::format_listing(&entries));
            }
        }
        Cmd::Define {
            script,
            translation,
        } => {
            let outcome = engine
                .dictionary_mut()
                .define(script, translation)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            ui.notify(&format!("{outcome:?}: {script} → {}", translation.trim()));
        }
        Cmd::Remove { script } => {
            let mut buffer = TextBuffer::new();
            engine.run_command(Command::RemoveWord(script.clone()), &mut buffer, ui);
        }
        Cmd::Translate { text } => {
            let text = if text.is_empty() {
                io::read_to_string(io::stdin()).context("failed to read stdin")?
            } else {
                text.join(" ")
            };
            let mut buffer = TextBuffer::from_text(&text);
            buffer.select_all();
            if let CommandResult::Rejected(e) =
                engine.run_command(Command::TranslateSelection, &mut buffer, ui)
            {
                anyhow::bail!("{}", e);
            }
            println!("{}", buffer.text());
        }
        Cmd::Render { file, caret } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mut buffer = TextBuffer::from_text(&content);
            if let Some(caret) = caret {
                if !buffer.set_caret(*caret) {
                    anyhow::bail!("caret {} is not a character boundary in {}", caret, file.display());
                }
            }
            let decorations = engine.refresh(RefreshTrigger::DocumentChanged, &buffer);
            print!("{}", terminal::styled(buffer.text(), decorations, ansi));
        }
        Cmd::Toggle => {
            let mut buffer = TextBuffer::new();
            engine.run_command(Command::ToggleAutoTranslate, &mut buffer, ui);
            if let Some(parent) = settings_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            engine
                .settings()
                .save_toml(settings_path)
                .with_context(|| format!("failed to save settings {}", settings_path.display()))?;
        }
        Cmd::Settings => {
            print!("{}", engine.settings().to_toml_string()?);
        }
        Cmd::Interactive => interactive(engine, ui, ansi)?,
    }
    Ok(())
}

/// Line-oriented editing session.
///
/// Plain lines are typed into the document one character at a time.
/// Lines starting with `:` are commands: `:list`, `:toggle`,
/// `:paste <text>`, `:translate <text>`, `:add <text>`, `:remove <word>`,
/// `:show`, `:quit`.
fn interactive(engine: &mut Engine, ui: &mut TerminalUi, ansi: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut buffer = TextBuffer::new();

    println!("Type Shavian text. Finish a word with a space to define it. :quit to exit.");
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(command) = line.strip_prefix(':') {
            let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
            match name {
                "quit" | "q" => break,
                "show" => {}
                "list" => {
                    if let CommandResult::Listing(entries) =
                        engine.run_command(Command::ShowDictionary, &mut buffer, ui)
                    {
                        print!("{}", terminal::format_listing(&entries));
                    }
                    continue;
                }
                "toggle" => {
                    engine.run_command(Command::ToggleAutoTranslate, &mut buffer, ui);
                }
                "paste" => {
                    buffer.move_to_end();
                    if engine.handle_paste(arg, &mut buffer, ui) == PasteResult::Default {
                        buffer.insert_str(arg);
                    }
                }
                "translate" | "add" => {
                    let start = buffer.len();
                    buffer.move_to_end();
                    buffer.insert_str(arg);
                    buffer.select(start..buffer.len());
                    let command = if name == "translate" {
                        Command::TranslateSelection
                    } else {
                        Command::AddSelectionToDictionary
                    };
                    if let CommandResult::RequestDefinition(request) =
                        engine.run_command(command, &mut buffer, ui)
                    {
                        let response = terminal::prompt(&request, &mut input, &mut stdout)?;
                        engine.resolve_definition(response, &buffer, ui);
                    }
                    buffer.move_to_end();
                }
                "remove" => {
                    engine.run_command(Command::RemoveWord(arg.trim().to_string()), &mut buffer, ui);
                }
                other => {
                    ui.notify(&format!("Unknown command :{other}"));
                    continue;
                }
            }
        } else {
            buffer.move_to_end();
            for ch in line.chars() {
                if ch == ' ' {
                    if let KeyResult::RequestDefinition(request) =
                        engine.process_key(KeyEvent::Space, &buffer)
                    {
                        let response = terminal::prompt(&request, &mut input, &mut stdout)?;
                        engine.resolve_definition(response, &buffer, ui);
                    }
                } else {
                    engine.process_key(KeyEvent::Char(ch), &buffer);
                }
                buffer.insert_char(ch);
            }
            buffer.insert_char('\n');
        }

        let decorations = engine.refresh(RefreshTrigger::DocumentChanged, &buffer);
        println!("{}", terminal::styled(buffer.text(), decorations, ansi).trim_end());
        stdout.flush()?;
    }
    Ok(())
}
