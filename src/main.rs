use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info, warn, LevelFilter};
use rand::seq::SliceRandom;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tui_input::backend::crossterm::EventHandler;

mod ui;

use crate::ui::{ChatUI, CrosstermBackend, Tab, Terminal};
use parley::composer::MessageComposer;
use parley::config;
use parley::convo::{ConversationEvent, ConversationStore, TypingIndicatorTimer};
use parley::media::{InMemoryPreviews, MediaCaptureController, SimulatedMicrophone};
use parley::models::{self, DeliveryStatus, FileInput, Message, Sender};
use parley::utils;

/// Command line arguments for parley
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "parley: a two-pane terminal messaging console."
)]
struct Args {
    /// Log file path
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Roster config file override
    #[arg(long, value_name = "PATH")]
    roster: Option<PathBuf>,

    /// Disable the simulated peer that replies to sent messages
    #[arg(long)]
    no_peer_sim: bool,
}

/// Canned texts for the simulated peer behind the send boundary.
const CANNED_REPLIES: &[&str] = &[
    "Sounds good!",
    "Ha, nice one.",
    "Let me check and get back to you.",
    "On my way.",
    "Can we talk later tonight?",
    "Got it, thanks.",
];

// A 1x1 PNG so Ctrl+A can exercise image staging without a file picker.
const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
    0xCF, 0xC0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x73, 0x75, 0x01, 0x18, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("parley.log"));
    utils::setup_logging(log_path.to_str(), parse_level(&args.log_level))?;

    // Load the roster, seeding a default one on first run
    let roster_path = match &args.roster {
        Some(path) => path.clone(),
        None => config::default_roster_path()?,
    };
    let roster = match config::load_roster(&roster_path)? {
        Some(roster) => roster,
        None => {
            let roster = config::default_roster();
            if let Err(e) = config::save_roster(&roster_path, &roster) {
                warn!("Could not write default roster: {}", e);
            }
            roster
        }
    };

    // Wire the engine: one store, one composer session sharing its event
    // channel
    let (store, events_rx) = ConversationStore::new();
    store.seed_contacts(roster.contacts.clone()).await;
    if let Some(first) = roster.contacts.first() {
        store.select_contact(&first.id).await;
    }
    let previews = Arc::new(InMemoryPreviews::new());
    let media = MediaCaptureController::new(
        Arc::new(SimulatedMicrophone::new()),
        previews,
        store.event_sender(),
    );
    let composer = MessageComposer::new(store.event_sender());
    let typing = TypingIndicatorTimer::new(store.event_sender());

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_console(
        &mut terminal,
        store,
        composer,
        media,
        typing,
        events_rx,
        &roster.profile.display_name,
        !args.no_peer_sim,
    )
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[allow(clippy::too_many_arguments)]
async fn run_console(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: ConversationStore,
    mut composer: MessageComposer,
    media: MediaCaptureController,
    mut typing: TypingIndicatorTimer,
    mut events_rx: mpsc::Receiver<ConversationEvent>,
    my_name: &str,
    peer_sim: bool,
) -> Result<()> {
    let mut chat_ui = ChatUI::new();

    // Simulated peer replies arrive over their own channel so the deferred
    // task never touches the store directly
    let (reply_tx, mut reply_rx) = mpsc::channel::<(String, String)>(16);

    info!("Console started as '{}'", my_name);

    loop {
        chat_ui.clean_typing_states(6);

        // Pure reads drive every frame
        let query = chat_ui.filter.value().to_string();
        let contacts = store.find_contacts(&query, chat_ui.tag_filter()).await;
        if !contacts.is_empty() && chat_ui.contact_index >= contacts.len() {
            chat_ui.contact_index = contacts.len() - 1;
        }
        let active = store.active_contact().await;
        let thread = match &active {
            Some(id) => store.get_thread(id).await,
            None => Vec::new(),
        };
        chat_ui.staged_labels = media.staged_labels().await;
        chat_ui.reply_label = composer
            .reply_target()
            .map(|r| r.sender_label.clone());
        if !media.is_recording().await {
            chat_ui.recording_secs = None;
        }

        terminal.draw(|f| chat_ui.draw(f, &contacts, active.as_deref(), &thread, my_name))?;

        // Drain engine events
        while let Ok(event) = events_rx.try_recv() {
            match event {
                ConversationEvent::MessageSent {
                    contact_id,
                    message,
                    raw_attachments,
                } => {
                    info!(
                        "Send boundary took {} with {} raw payloads",
                        message.id,
                        raw_attachments.len()
                    );
                    if peer_sim {
                        chat_ui.set_peer_typing(&contact_id);
                        spawn_peer_reply(&reply_tx, &contact_id);
                    }
                }
                ConversationEvent::StatusChanged {
                    contact_id,
                    message_id,
                    status,
                } => {
                    debug!(
                        "Status of {} in {} is now {:?}",
                        message_id, contact_id, status
                    );
                }
                ConversationEvent::TypingStarted => debug!("Local typing started"),
                ConversationEvent::TypingStopped => debug!("Local typing stopped"),
                ConversationEvent::RecordingTick { seconds } => {
                    chat_ui.recording_secs = Some(seconds);
                }
            }
        }

        // Simulated peer replies that have come due
        while let Ok((contact_id, text)) = reply_rx.try_recv() {
            let stamp = models::now_millis();
            let message = Message {
                id: models::message_id(&contact_id, stamp),
                sender: Sender::Peer,
                content: text,
                timestamp: stamp,
                status: DeliveryStatus::Sent,
                attachments: Vec::new(),
                reply_to: None,
                is_starred: false,
            };
            store.append_message(&contact_id, message).await;
            chat_ui.clear_peer_typing(&contact_id);
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, chat_ui.active_tab()) {
            (KeyCode::Esc, Tab::Filter) => chat_ui.set_tab(Tab::Contacts),
            (KeyCode::Esc, _) => break,
            (KeyCode::Tab, _) => chat_ui.toggle_pane(),
            (KeyCode::Char('t'), _) if ctrl => chat_ui.cycle_tag_filter(),

            // Contact pane
            (KeyCode::Char('/'), Tab::Contacts) => chat_ui.set_tab(Tab::Filter),
            (KeyCode::Up, Tab::Contacts) => chat_ui.prev_contact(),
            (KeyCode::Down, Tab::Contacts) => chat_ui.next_contact(contacts.len()),
            (KeyCode::Enter, Tab::Contacts) => {
                if let Some(contact) = contacts.get(chat_ui.contact_index) {
                    store.select_contact(&contact.id).await;
                    chat_ui.set_tab(Tab::Messages);
                }
            }

            // Filter editing
            (KeyCode::Enter, Tab::Filter) => chat_ui.set_tab(Tab::Contacts),
            (_, Tab::Filter) => {
                chat_ui.filter.handle_event(&Event::Key(key));
            }

            // Composer pane
            (KeyCode::Enter, Tab::Messages) => {
                if let Some(active_id) = &active {
                    composer.set_text(chat_ui.input.value());
                    if let Some(outgoing) = composer.send(active_id, &media).await {
                        store.append_message(active_id, outgoing.message).await;
                        chat_ui.input.reset();
                        chat_ui.status_line.clear();
                    }
                }
            }
            (KeyCode::Char('r'), Tab::Messages) if ctrl => {
                if media.is_recording().await {
                    media.end_recording().await;
                } else {
                    match media.begin_recording().await {
                        Ok(()) => chat_ui.status_line.clear(),
                        Err(e) => {
                            warn!("Recording unavailable: {}", e);
                            chat_ui.status_line = e.to_string();
                        }
                    }
                }
            }
            (KeyCode::Char('d'), Tab::Messages) if ctrl => {
                media.discard_recording().await;
            }
            (KeyCode::Char('a'), Tab::Messages) if ctrl => {
                media
                    .stage_files(vec![FileInput {
                        name: format!("snapshot-{}.png", models::now_millis()),
                        media_type: "image/png".to_string(),
                        bytes: SAMPLE_PNG.to_vec(),
                    }])
                    .await;
            }
            (KeyCode::Char('g'), Tab::Messages) if ctrl => {
                media.stage_location(48.8584, 2.2945).await;
            }
            (KeyCode::Char('u'), Tab::Messages) if ctrl => {
                let staged = media.staged_len().await;
                if staged > 0 {
                    media.unstage(staged - 1).await;
                }
            }
            (KeyCode::Char('e'), Tab::Messages) if ctrl => {
                if let Some(last) = thread.last() {
                    let label = match last.sender {
                        Sender::Me => my_name.to_string(),
                        Sender::Peer => contacts
                            .iter()
                            .find(|c| Some(c.id.as_str()) == active.as_deref())
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| "peer".to_string()),
                    };
                    composer.set_reply_target(last, &label);
                } else {
                    composer.clear_reply_target();
                }
            }
            (KeyCode::Char('s'), Tab::Messages) if ctrl => {
                if let (Some(active_id), Some(last)) = (&active, thread.last()) {
                    store.toggle_star(active_id, &last.id).await;
                }
            }
            (KeyCode::Char('x'), Tab::Messages) if ctrl => {
                if let (Some(active_id), Some(last)) = (&active, thread.last()) {
                    store.delete_message(active_id, &last.id).await;
                }
            }
            (_, Tab::Messages) => {
                // Every edit keystroke counts as typing activity
                if chat_ui.input.handle_event(&Event::Key(key)).is_some() {
                    typing.on_activity();
                }
            }
            _ => {}
        }
    }

    // Composer teardown: quiet timer cancelled, recording aborted, staged
    // previews released
    typing.dispose();
    media.dispose().await;
    info!("Console shut down");

    Ok(())
}

fn spawn_peer_reply(reply_tx: &mpsc::Sender<(String, String)>, contact_id: &str) {
    let text = CANNED_REPLIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Ok")
        .to_string();
    let reply_tx = reply_tx.clone();
    let contact_id = contact_id.to_string();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        let _ = reply_tx.send((contact_id, text)).await;
    });
}
