use clap::Parser;
use iced::keyboard::{self, Key};
use iced::widget::{canvas, column, stack, text, Image};
use iced::{ContentFit, Element, Length, Subscription, Task, Theme};
use log::{error, info};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use wallcrop::cli::Cli;
use wallcrop::error::SessionError;
use wallcrop::io::decoder::{HandleRenderer, ImageDecoder};
use wallcrop::io::export::Exporter;
use wallcrop::io::scan;
use wallcrop::state::config::Config;
use wallcrop::state::session::{Commit, Session, SessionConfig};
use wallcrop::ui::keys::{Intent, KeyMap};
use wallcrop::ui::overlay::SelectionOverlay;
use wallcrop::ui::title;

type LiveSession = Session<ImageDecoder, HandleRenderer, Exporter>;

/// Main application state
struct Wallcrop {
    /// Ring, current entry and collaborators
    session: LiveSession,
    /// Key name to intent lookup
    keys: KeyMap,
    /// Status line shown under the image
    status: String,
    /// Fatal error that ended the event loop, reported after the window closes
    failure: Arc<Mutex<Option<SessionError>>>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A key was pressed
    KeyPressed(Key),
    /// Background save finished
    Saved(Commit),
}

impl Wallcrop {
    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::KeyPressed(key) => match self.keys.intent_for(&key) {
                Some(intent) => self.dispatch(intent),
                None => Task::none(),
            },
            Message::Saved(commit) => {
                self.status = match self.session.finish_commit(commit) {
                    Ok(path) => format!("✅ Saved {}", path.display()),
                    Err(e) => format!("⚠️  Save failed: {}", e),
                };
                Task::none()
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) -> Task<Message> {
        match intent {
            Intent::Next | Intent::Previous => {
                let stepped = if intent == Intent::Next {
                    self.session.next().map(|_| ())
                } else {
                    self.session.previous().map(|_| ())
                };
                if let Err(e) = stepped {
                    return self.fail(e);
                }
                self.status.clear();
            }
            Intent::Grow => {
                self.session.grow_selection();
            }
            Intent::Shrink => {
                self.session.shrink_selection();
            }
            Intent::Move(direction) => {
                self.session.move_selection(direction);
            }
            Intent::Reset => {
                self.session.reset_selection();
            }
            Intent::ToggleOutline => {
                self.session.toggle_outline_color();
            }
            Intent::Save => {
                self.status = format!("Saving {}...", self.session.filename());
                return Task::perform(self.session.commit_async(), Message::Saved);
            }
            Intent::Undo => {
                self.status = match self.session.undo_last_crop() {
                    Ok(path) => format!("🗑️  Deleted {}", path.display()),
                    Err(e) => format!("⚠️  Undo failed: {}", e),
                };
            }
            Intent::Help => {
                MessageDialog::new()
                    .set_level(MessageLevel::Info)
                    .set_title("wallcrop keys")
                    .set_description(self.keys.help())
                    .set_buttons(MessageButtons::Ok)
                    .show();
            }
            Intent::Quit => {
                self.session.quit();
                return iced::exit();
            }
        }
        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let entry = self.session.current();

        let picture: Element<Message> = match self.session.handle() {
            Some(handle) => Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("No image").into(),
        };

        let overlay = canvas(SelectionOverlay::new(
            entry.dimensions,
            entry.selection,
            entry.outline,
        ))
        .width(Length::Fill)
        .height(Length::Fill);

        column![
            stack![picture, overlay],
            text(&self.status).size(14),
        ]
        .spacing(4)
        .padding(4)
        .into()
    }

    fn title(&self) -> String {
        title::window_title(
            self.session.current_id(),
            self.session.dimensions(),
            self.session.selection(),
            self.session.path(),
        )
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| Some(Message::KeyPressed(key)))
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Navigation evicted every image: nothing left to show
    fn fail(&mut self, e: SessionError) -> Task<Message> {
        error!("❌ {}", e);
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(e);
        }
        iced::exit()
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Everything that can fail before the window opens
fn build() -> Result<(LiveSession, KeyMap), SessionError> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    init_logging(config.debug);
    config.validate()?;

    if let Some(path) = &config_path {
        info!("📁 Config: {}", path.display());
    }

    let files = scan::collect_files(&cli.source)?;
    info!("🔍 {} files in {}", files.len(), cli.source.display());

    let session = Session::new(
        files,
        SessionConfig {
            aspect: cli.aspect,
            steps: config.steps(),
            debug: config.debug,
        },
        ImageDecoder,
        HandleRenderer,
        Exporter::new(cli.destination.clone(), cli.archive.clone()),
    )?;

    Ok((session, KeyMap::new(&config.keys)))
}

fn main() -> ExitCode {
    let (session, keys) = match build() {
        Ok(built) => built,
        Err(e) => {
            // Logging may not be up yet if the config failed to load
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let failure = Arc::new(Mutex::new(None));
    let app_failure = Arc::clone(&failure);

    let result = iced::application(Wallcrop::title, Wallcrop::update, Wallcrop::view)
        .subscription(Wallcrop::subscription)
        .theme(Wallcrop::theme)
        .centered()
        .run_with(move || {
            (
                Wallcrop {
                    session,
                    keys,
                    status: String::new(),
                    failure: app_failure,
                },
                Task::none(),
            )
        });

    if let Err(e) = result {
        error!("❌ {}", e);
        return ExitCode::FAILURE;
    }

    let failed = failure.lock().map(|f| f.is_some()).unwrap_or(true);
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
