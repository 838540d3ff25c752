use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tdiary::application::startup::{init_tracing, Session};
use tdiary::application::{init::init, manage_config::ConfigService, transfer};
use tdiary::cli::{format_entry, format_entry_list, format_settings, Cli, Commands, PhotoCommand};
use tdiary::domain::{photo, resolve_date, EntryDate, Theme};
use tdiary::error::TdiaryError;
use tdiary::infrastructure::{EditorSession, FileKeyValueArea, FileSystemRepository, SqliteBackend};

type JournalSession = Session<SqliteBackend, FileKeyValueArea>;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<(), TdiaryError> {
    match cli.command {
        Some(Commands::Init { path }) => {
            init(&path).await?;
            println!("Initialized tdiary journal at {}", path.display());
            Ok(())
        }
        Some(Commands::Config { key, value, list }) => run_config(key, value, list),
        command => {
            let repo = FileSystemRepository::discover()?;
            let today = EntryDate::from(Local::now().date_naive());
            let mut session = Session::open(&repo, today).await?;

            // Close even when the command failed so staged edits are written.
            let result = execute(&mut session, command, cli.time_ref, today).await;
            let closed = session.close().await;
            result.and(closed)
        }
    }
}

fn run_config(key: Option<String>, value: Option<String>, list: bool) -> Result<(), TdiaryError> {
    let repo = FileSystemRepository::discover()?;
    let service = ConfigService::new(repo);

    if list {
        let config = service.list()?;
        println!("editor = {}", config.editor);
        println!("autosave_ms = {}", config.autosave_ms);
        println!("legacy_key = {}", config.legacy_key);
        println!("created = {}", config.created.to_rfc3339());
    } else if let Some(k) = key {
        if let Some(v) = value {
            service.set(&k, &v)?;
            println!("Set {} = {}", k, v);
        } else {
            println!("{}", service.get(&k)?);
        }
    } else {
        println!("Usage: tdiary config [--list | <key> [<value>]]");
        println!("Valid keys: editor, autosave_ms, legacy_key, created");
    }
    Ok(())
}

async fn execute(
    session: &mut JournalSession,
    command: Option<Commands>,
    time_ref: Option<String>,
    today: EntryDate,
) -> Result<(), TdiaryError> {
    let resolve = |input: Option<&str>| resolve_date(input, today.date());

    match command {
        None => {
            let date = resolve(time_ref.as_deref())?;
            let entry = session.journal.open_day(date);
            print!("{}", format_entry(date, entry));
        }
        Some(Commands::Write {
            time_ref,
            text,
            append,
        }) => {
            let date = resolve(Some(time_ref.as_str()))?;
            let text = text.join(" ");
            if append {
                session.journal.append_text(date, &text);
            } else {
                session.journal.set_text(date, &text);
            }
            session.journal.save_now().await?;
            println!("Saved entry for {}", date);
        }
        Some(Commands::Edit { time_ref }) => {
            let date = resolve(time_ref.as_deref())?;
            let current = session.journal.open_day(date).text.clone();
            let editor = EditorSession::new(session.config.get_editor());
            let edited = editor.edit_text(&current).await?;
            let edited = edited.trim_end_matches(['\n', '\r']);
            if edited != current {
                session.journal.set_text(date, edited);
                session.journal.save_now().await?;
                println!("Saved entry for {}", date);
            }
        }
        Some(Commands::Mood { time_ref, mood }) => {
            let date = resolve(Some(time_ref.as_str()))?;
            let entry = session.journal.set_mood(date, &mood);
            println!("Mood for {}: {}", date, entry.mood);
        }
        Some(Commands::Photo { action }) => match action {
            PhotoCommand::Add { time_ref, files } => {
                let date = resolve(Some(time_ref.as_str()))?;
                let mut urls = Vec::with_capacity(files.len());
                for file in &files {
                    urls.push(read_photo(file).await?);
                }
                let entry = session.journal.add_photos(date, urls);
                println!(
                    "Added {} photo(s) to {} ({} total)",
                    files.len(),
                    date,
                    entry.photos.len()
                );
            }
            PhotoCommand::Remove { time_ref, number } => {
                let date = resolve(Some(time_ref.as_str()))?;
                let entry = session.journal.remove_photo(date, number)?;
                println!(
                    "Removed photo {} from {} ({} left)",
                    number,
                    date,
                    entry.photos.len()
                );
            }
        },
        Some(Commands::Delete { time_ref }) => {
            let date = resolve(Some(time_ref.as_str()))?;
            session.journal.delete_day(date, today).await?;
            println!("Deleted entry for {}", date);
        }
        Some(Commands::List { query }) => {
            let hits = session.journal.search(query.as_deref().unwrap_or(""));
            print!("{}", format_entry_list(&hits));
            if hits.is_empty() {
                println!();
            }
        }
        Some(Commands::Export { output }) => {
            let json = session.journal.export()?;
            match output {
                Some(path) if path == Path::new("-") => println!("{}", json),
                output => {
                    let path = output.unwrap_or_else(|| {
                        PathBuf::from(transfer::export_file_name(today.date()))
                    });
                    tokio::fs::write(&path, json).await?;
                    println!(
                        "Exported {} entries to {}",
                        session.journal.state().entries.len(),
                        path.display()
                    );
                }
            }
        }
        Some(Commands::Import { file }) => {
            let state = transfer::read_import_file(&file).await?;
            let count = state.entries.len();
            session.journal.import(state).await?;
            println!("Imported {} entries from {}", count, file.display());
        }
        Some(Commands::Theme { value }) => {
            match value.as_deref() {
                None => {}
                Some("toggle") => {
                    session.journal.toggle_theme();
                }
                Some(name) => {
                    let theme = Theme::from_str(name).map_err(TdiaryError::Config)?;
                    session.journal.set_theme(theme);
                }
            }
            println!("Theme: {}", session.journal.settings().theme);
        }
        Some(Commands::Font { value }) => {
            match value.as_deref() {
                None => {}
                Some("up") => {
                    session.journal.increase_font();
                }
                Some("down") => {
                    session.journal.decrease_font();
                }
                Some(raw) => {
                    let size = raw.trim().parse::<i64>().map_err(|_| {
                        TdiaryError::Config(format!("Invalid font size: '{}'", raw))
                    })?;
                    session.journal.set_font_size(size);
                }
            }
            print!("{}", format_settings(&session.journal.settings()));
        }
        Some(Commands::Migrate) => {
            println!("{}", session.migration().await);
        }
        Some(Commands::Init { .. }) | Some(Commands::Config { .. }) => {}
    }

    Ok(())
}

async fn read_photo(path: &Path) -> Result<String, TdiaryError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(TdiaryError::InvalidPhoto(path.to_path_buf()));
    }
    let bytes = tokio::fs::read(path).await?;
    Ok(photo::to_data_url(mime.essence_str(), &bytes))
}
