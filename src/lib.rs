// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use application::{ImageUploader, NoteStore, ProfileService, Route, SessionGate};
use cli::args::{Args, Command, ConfigAction, ProfileAction};
use cli::prompt;
use domain::{Credentials, DomainError, Note, ProfileChanges, Session};
use infrastructure::{
    BackendClient, Config, FileSessionStore, RestNoteRepository, RestProfileRepository,
    StorageBuckets,
};
use ports::TerminalPresenter;
use std::path::Path;
use tracing::{debug, info};

pub fn run(args: Args) -> Result<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    debug!(?config_path, "Starting pnote");

    let command = match args.command {
        Command::Config { action } => return config_command(&config_path, &action),
        command => command,
    };

    // Initialize infrastructure
    let config = Config::resolve(&config_path)?;
    config.ensure_backend()?;
    let client = BackendClient::new(&config.backend)?;
    let sessions = FileSessionStore::new(config.session_path()?);
    let mut gate = SessionGate::new(client.clone(), sessions);

    match command {
        Command::Signup { email, password } => {
            let credentials = Credentials::new(email, prompt::resolve_password(password)?);
            match gate.sign_up(&credentials)? {
                Some(session) => println!("Registered and signed in as {}", display_user(&session)),
                None => println!(
                    "Registered. Confirm the link sent to {}, then run `pnote login`.",
                    credentials.email
                ),
            }
        }
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, prompt::resolve_password(password)?);
            let session = gate.sign_in(&credentials)?;
            println!("Signed in as {}", display_user(&session));
        }
        Command::Logout => {
            if gate.sign_out()? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Command::Status => match gate.resolve()? {
            Route::Notes(session) => println!("Signed in as {}", display_user(&session)),
            Route::Welcome => {
                println!("Welcome to PNOTE. Run `pnote login` or `pnote signup` to start.")
            }
        },
        command => {
            let session = gate.require_session()?;
            let client = client.with_session(&session);
            match command {
                Command::Profile { action } => profile_command(&config, client, &session, action)?,
                command => note_command(&config, client, command)?,
            }
        }
    }

    Ok(())
}

fn note_command(config: &Config, client: BackendClient, command: Command) -> Result<()> {
    let presenter = TerminalPresenter::new();
    let mut uploader = ImageUploader::new(StorageBuckets::new(client.clone()));
    let mut store = NoteStore::new(RestNoteRepository::new(client, &config.tables.notes));
    store.load()?;

    match command {
        Command::List { search, json } => {
            let notes = filter_notes(store.notes(), search.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                let owned: Vec<Note> = notes.into_iter().cloned().collect();
                print!("{}", presenter.render_list(&owned));
            }
        }
        Command::Show { note_id, json } => {
            let note = store.get(note_id).ok_or(DomainError::NoteNotFound(note_id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(note)?);
            } else {
                print!("{}", presenter.render_note(note));
            }
        }
        Command::Add { text, image } => {
            let image_url = match image {
                Some(path) => Some(upload_note_image(&mut uploader, config, &path)?),
                None => None,
            };
            // No cleanup of the uploaded object if the insert fails
            let note = store
                .create(&text, image_url.clone())
                .inspect_err(|_| log_orphaned_image(image_url.as_deref()))?;
            println!("Created note {}", note.id);
        }
        Command::Toggle { note_id } => match store.toggle_done(note_id)? {
            Some(note) => println!(
                "Note {} is {}",
                note.id,
                if note.done { "done" } else { "not done" }
            ),
            None => println!("Note {} not found, nothing changed.", note_id),
        },
        Command::Delete { note_ids, yes } => {
            let question = format!("Delete {} note(s)?", note_ids.len());
            if !yes && !prompt::confirm(&question)? {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = store.delete_many(&note_ids)?;
            println!("Deleted {} note(s).", removed);
        }
        Command::Edit {
            note_id,
            text,
            image,
            clear_image,
        } => {
            if text.is_none() && image.is_none() && !clear_image {
                bail!("Nothing to change. Pass --text, --image or --clear-image.");
            }
            let mut note = store
                .get(note_id)
                .cloned()
                .ok_or(DomainError::NoteNotFound(note_id))?;
            if let Some(text) = text {
                note.text = text;
            }
            let mut uploaded = None;
            if let Some(path) = image {
                uploaded = Some(upload_note_image(&mut uploader, config, &path)?);
                note.image = uploaded.clone();
            } else if clear_image {
                note.image = None;
            }
            let note = store
                .update(&note)
                .inspect_err(|_| log_orphaned_image(uploaded.as_deref()))?;
            println!("Updated note {}", note.id);
        }
        _ => bail!("Not a note command"),
    }

    Ok(())
}

fn profile_command(
    config: &Config,
    client: BackendClient,
    session: &Session,
    action: ProfileAction,
) -> Result<()> {
    let mut service = ProfileService::new(
        RestProfileRepository::new(client.clone(), &config.tables.profiles),
        StorageBuckets::new(client),
        config.storage.avatar_bucket.clone(),
    );

    match action {
        ProfileAction::Show { json } => {
            let view = service.view(session)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", TerminalPresenter::new().render_profile(&view));
            }
        }
        ProfileAction::Set { name, phone } => {
            service.update(
                session,
                &ProfileChanges {
                    display_name: name,
                    avatar_url: None,
                    phone,
                },
            )?;
            println!("Profile updated.");
        }
        ProfileAction::Avatar { path } => {
            let profile = service.set_avatar(session, &path)?;
            println!(
                "Avatar set to {}",
                profile.avatar_url.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

fn config_command(path: &Path, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Config::create_default(path)?;
            info!(?path, "Wrote default config");
            println!("Wrote {}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::resolve(path)?;
            let toml = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{}", toml);
        }
    }
    Ok(())
}

fn upload_note_image(
    uploader: &mut ImageUploader<StorageBuckets>,
    config: &Config,
    path: &Path,
) -> Result<String> {
    let url = uploader.upload_file(&config.storage.note_bucket, constants::NOTE_IMAGE_PREFIX, path)?;
    Ok(url)
}

fn log_orphaned_image(url: Option<&str>) {
    if let Some(url) = url {
        debug!(%url, "Uploaded image is not referenced by any note");
    }
}

/// Case-insensitive substring match on note text.
pub fn filter_notes<'a>(notes: &'a [Note], search: Option<&str>) -> Vec<&'a Note> {
    match search {
        None => notes.iter().collect(),
        Some(query) => {
            let query = query.to_lowercase();
            notes
                .iter()
                .filter(|n| n.text.to_lowercase().contains(&query))
                .collect()
        }
    }
}

fn display_user(session: &Session) -> &str {
    session.user.email.as_deref().unwrap_or(&session.user.id)
}
