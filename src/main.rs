use color_eyre::{eyre::eyre, Result};
use kartinput::binding::KeyBindingDialog;
use kartinput::config::InputConfig;
use kartinput::controller::{GilrsPlatform, HostLink};
use kartinput::driver::{
    DriverContext, DriverMode, HandlerStack, InputDriver, InputHandler, Running,
};
use kartinput::mapping::{GameAction, KartAction, PlayerId};
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Surface height used until the host reports a real one
const SURFACE_HEIGHT: i32 = 600;
const TICK: Duration = Duration::from_millis(16);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    let config_path = InputConfig::default_path();
    let config = InputConfig::load_or_create(&config_path)?;

    let (platform, mut host) = GilrsPlatform::new(SURFACE_HEIGHT)?;
    let mut driver = InputDriver::create(Box::new(platform), config)?
        .init()
        .map_err(|e| eyre!("Failed to start input driver: {}", e))?;

    let mut shell = ConsoleShell::default();
    let mut interval = tokio::time::interval(TICK);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Input loop running, Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Ctrl-C received");
                break;
            }
            _ = interval.tick() => {
                let report = driver.poll_and_dispatch(&mut shell);
                if report.events > 0 {
                    debug!("Tick handled {} events", report.events);
                }
                shell.settle(&mut driver);
                log_host_requests(&mut host);
                if report.quit_requested {
                    break;
                }
            }
        }
    }

    let config = driver.shutdown().into_config();
    if let Err(e) = config.save(&config_path) {
        error!("Failed to save bindings: {}", e);
    }
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn log_host_requests(host: &mut HostLink) {
    if host.has_changed() {
        let requests = host.requests();
        info!(
            "Host requests: pointer visible {}, text input {}",
            requests.pointer_visible, requests.text_input
        );
    }
}

/// Console stand-in for the game screens: a menu that selects a kart action
/// to rebind, and a race view that logs kart actions.
#[derive(Default)]
struct ConsoleShell {
    screen: ConsoleScreen,
    dialog: Option<KeyBindingDialog>,
}

impl ConsoleShell {
    /// Opens requested dialogs and drops finished ones, between ticks
    fn settle(&mut self, driver: &mut InputDriver<Running>) {
        if let Some(dialog) = self.dialog.take() {
            if dialog.outcome().is_finished() {
                info!("Rebinding finished: {:?}", dialog.outcome());
            } else {
                self.dialog = Some(dialog);
            }
        }

        if let Some((player, action)) = self.screen.rebind_request.take() {
            match KeyBindingDialog::open(&mut driver.context(), player, action) {
                Ok(dialog) => self.dialog = Some(dialog),
                Err(e) => warn!("Cannot rebind {} {:?}: {}", player, action, e),
            }
        }
    }
}

impl HandlerStack for ConsoleShell {
    fn current_handler(&mut self) -> Option<&mut dyn InputHandler> {
        match self.dialog.as_mut() {
            Some(dialog) if !dialog.outcome().is_finished() => Some(dialog),
            _ => Some(&mut self.screen),
        }
    }
}

#[derive(Default)]
struct ConsoleScreen {
    player: usize,
    selected: usize,
    rebind_request: Option<(PlayerId, KartAction)>,
}

impl ConsoleScreen {
    fn selection(&self) -> Option<(PlayerId, KartAction)> {
        let player = PlayerId::new(self.player).ok()?;
        Some((player, KartAction::ALL[self.selected]))
    }

    fn menu_action(&mut self, action: GameAction, driver: &mut DriverContext<'_>) {
        let players = driver.config().players.len().max(1);
        let actions = KartAction::ALL.len();
        match action {
            GameAction::CursorUp => self.selected = (self.selected + actions - 1) % actions,
            GameAction::CursorDown => self.selected = (self.selected + 1) % actions,
            GameAction::CursorLeft => self.player = (self.player + players - 1) % players,
            GameAction::CursorRight => self.player = (self.player + 1) % players,
            GameAction::Enter => {
                if let Err(e) = driver.set_mode(DriverMode::InGame) {
                    error!("Cannot start race: {}", e);
                }
                return;
            }
            other => {
                debug!("Menu ignores {:?}", other);
                return;
            }
        }
        if let Some((player, action)) = self.selection() {
            let bound = driver.config().kart_binding(player, action);
            match bound {
                Some(input) => info!("{} {:?}: {}", player, action, input),
                None => info!("{} {:?}: unbound", player, action),
            }
        }
    }

    fn race_action(&mut self, action: GameAction, value: i32, driver: &mut DriverContext<'_>) {
        match action {
            GameAction::Leave if value > 0 => {
                if let Err(e) = driver.set_mode(DriverMode::Menu) {
                    error!("Cannot leave race: {}", e);
                }
            }
            GameAction::Kart { player, action } => info!("{} {:?} {}", player, action, value),
            GameAction::ToggleFullscreen if value > 0 => info!("Fullscreen toggle requested"),
            _ => {}
        }
    }
}

impl InputHandler for ConsoleScreen {
    fn handle(&mut self, action: GameAction, value: i32, driver: &mut DriverContext<'_>) {
        if driver.is_in_mode(DriverMode::InGame) {
            self.race_action(action, value, driver);
        } else if action == GameAction::ClearMapping {
            // Sensing starts after the release, or it would record this key
            if value == 0 {
                self.rebind_request = self.selection();
            }
        } else if value > 0 {
            self.menu_action(action, driver);
        }
    }

    fn input_pointer(&mut self, x: i32, y: i32) {
        debug!("Pointer at {}, {}", x, y);
    }

    fn countdown(&mut self) {
        debug!("Countdown tick");
    }
}
