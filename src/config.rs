//! Input configuration: sensitivity, binding tables and fixed inputs
//!
//! The configuration is the source of every action map the driver installs.
//! It is stored as TOML in the user's home directory and falls back to
//! built-in defaults when no file exists yet.

use crate::controller::filter::{
    DEADZONE_JOYSTICK, DEADZONE_MOUSE, DEADZONE_MOUSE_SENSE, MULTIPLIER_MOUSE,
};
use crate::error::{ConfigError, DriverError};
use crate::mapping::action::{GameAction, KartAction, PlayerId, MAX_PLAYERS};
use crate::mapping::action_map::ActionMap;
use crate::mapping::input::{keys, mouse_buttons, AxisDirection, Input};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".kartinput";
const CONFIG_FILE: &str = "input.toml";

/// Deadzones and scaling of analog inputs
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Sensitivity {
    pub mouse_deadzone: i32,
    pub mouse_sense_deadzone: i32,
    pub joystick_deadzone: i32,
    pub mouse_multiplier: i32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            mouse_deadzone: DEADZONE_MOUSE,
            mouse_sense_deadzone: DEADZONE_MOUSE_SENSE,
            joystick_deadzone: DEADZONE_JOYSTICK,
            mouse_multiplier: MULTIPLIER_MOUSE,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Binding<A> {
    pub action: A,
    pub input: Input,
}

impl<A> Binding<A> {
    pub fn new(action: A, input: Input) -> Self {
        Self { action, input }
    }
}

/// Kart controls of one local player
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerBindings {
    pub name: String,
    #[serde(default)]
    pub kart: Vec<Binding<KartAction>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// Bindings of the menu-mode map
    #[serde(default)]
    pub menu: Vec<Binding<GameAction>>,
    /// Global bindings of the in-game map, next to the players' kart bindings
    #[serde(default)]
    pub ingame: Vec<Binding<GameAction>>,
    #[serde(default)]
    pub players: Vec<PlayerBindings>,
    /// Inputs input sensing never records
    #[serde(default)]
    pub fixed: Vec<Input>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn key(key: i32) -> Input {
    Input::Keyboard { key }
}

fn stick_axis(stick: u32, axis: u32, direction: AxisDirection) -> Input {
    Input::StickMotion {
        stick,
        axis,
        direction,
    }
}

fn stick_button(stick: u32, button: u32) -> Input {
    Input::StickButton { stick, button }
}

fn keyboard_player(name: &str, controls: [i32; 9]) -> PlayerBindings {
    PlayerBindings {
        name: name.to_string(),
        kart: KartAction::ALL
            .iter()
            .zip(controls)
            .map(|(action, code)| Binding::new(*action, key(code)))
            .collect(),
    }
}

fn stick_player(name: &str, stick: u32) -> PlayerBindings {
    use AxisDirection::{Negative, Positive};

    let mut kart = vec![
        Binding::new(KartAction::Left, stick_axis(stick, 0, Negative)),
        Binding::new(KartAction::Right, stick_axis(stick, 0, Positive)),
    ];
    let buttons = [
        KartAction::Accel,
        KartAction::Brake,
        KartAction::Fire,
        KartAction::Jump,
        KartAction::Wheelie,
        KartAction::Rescue,
        KartAction::LookBack,
    ];
    kart.extend(
        buttons
            .iter()
            .zip(0u32..)
            .map(|(action, button)| Binding::new(*action, stick_button(stick, button))),
    );
    PlayerBindings {
        name: name.to_string(),
        kart,
    }
}

impl InputConfig {
    /// Built-in bindings: two keyboard players and two joystick players
    pub fn default_config() -> Self {
        use AxisDirection::{Negative, Positive};

        let menu = vec![
            Binding::new(GameAction::Enter, key(keys::RETURN)),
            Binding::new(GameAction::Leave, key(keys::ESCAPE)),
            Binding::new(GameAction::CursorUp, key(keys::UP)),
            Binding::new(GameAction::CursorDown, key(keys::DOWN)),
            Binding::new(GameAction::CursorLeft, key(keys::LEFT)),
            Binding::new(GameAction::CursorRight, key(keys::RIGHT)),
            Binding::new(GameAction::ClearMapping, key(keys::BACKSPACE)),
            Binding::new(
                GameAction::Enter,
                Input::MouseButton {
                    button: mouse_buttons::LEFT,
                },
            ),
            Binding::new(
                GameAction::Leave,
                Input::MouseButton {
                    button: mouse_buttons::RIGHT,
                },
            ),
            Binding::new(
                GameAction::CursorUp,
                Input::MouseButton {
                    button: mouse_buttons::WHEEL_UP,
                },
            ),
            Binding::new(
                GameAction::CursorDown,
                Input::MouseButton {
                    button: mouse_buttons::WHEEL_DOWN,
                },
            ),
            // In menu mode every stick reports as stick 0.
            Binding::new(GameAction::CursorLeft, stick_axis(0, 0, Negative)),
            Binding::new(GameAction::CursorRight, stick_axis(0, 0, Positive)),
            Binding::new(GameAction::CursorUp, stick_axis(0, 1, Negative)),
            Binding::new(GameAction::CursorDown, stick_axis(0, 1, Positive)),
            Binding::new(GameAction::Enter, stick_button(0, 0)),
            Binding::new(GameAction::Leave, stick_button(0, 1)),
        ];

        let ingame = vec![
            Binding::new(GameAction::Leave, key(keys::ESCAPE)),
            Binding::new(GameAction::ToggleFullscreen, key(keys::F11)),
        ];

        // Order follows KartAction::ALL
        let players = vec![
            keyboard_player(
                "Player 1",
                [
                    keys::LEFT,
                    keys::RIGHT,
                    keys::UP,
                    keys::DOWN,
                    keys::RIGHT_SHIFT,
                    keys::RIGHT_CTRL,
                    keys::BACKSPACE,
                    keys::SPACE,
                    keys::END,
                ],
            ),
            keyboard_player(
                "Player 2",
                [
                    keys::A,
                    keys::D,
                    keys::W,
                    keys::S,
                    keys::LEFT_SHIFT,
                    keys::LEFT_CTRL,
                    keys::Q,
                    keys::TAB,
                    keys::E,
                ],
            ),
            stick_player("Player 3", 0),
            stick_player("Player 4", 1),
        ];

        Self {
            sensitivity: Sensitivity::default(),
            menu,
            ingame,
            players,
            fixed: vec![key(keys::RETURN), key(keys::ESCAPE), key(keys::F11)],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.len() > MAX_PLAYERS {
            return Err(ConfigError::Invalid(format!(
                "{} players configured, at most {} supported",
                self.players.len(),
                MAX_PLAYERS
            )));
        }

        let s = &self.sensitivity;
        for (name, value) in [
            ("mouse_deadzone", s.mouse_deadzone),
            ("mouse_sense_deadzone", s.mouse_sense_deadzone),
            ("joystick_deadzone", s.joystick_deadzone),
            ("mouse_multiplier", s.mouse_multiplier),
        ] {
            if value <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if let Some(binding) = self.menu.iter().find(|b| !b.action.is_menu()) {
            return Err(ConfigError::Invalid(format!(
                "{:?} cannot be bound in the menu map ({})",
                binding.action, binding.input
            )));
        }
        if let Some(binding) = self
            .ingame
            .iter()
            .find(|b| !b.action.is_ingame() || matches!(b.action, GameAction::Kart { .. }))
        {
            return Err(ConfigError::Invalid(format!(
                "{:?} cannot be bound as a global in-game action ({})",
                binding.action, binding.input
            )));
        }

        Ok(())
    }

    pub fn menu_action_map(&self) -> ActionMap {
        let mut map = ActionMap::new("menu");
        for binding in &self.menu {
            map.insert(binding.input, binding.action);
        }
        debug!("Built menu action map with {} entries", map.len());
        map
    }

    pub fn ingame_action_map(&self) -> ActionMap {
        let mut map = ActionMap::new("ingame");
        for binding in &self.ingame {
            map.insert(binding.input, binding.action);
        }
        for (index, player) in self.players.iter().enumerate() {
            let player_id = match PlayerId::new(index) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping bindings of {}: {}", player.name, e);
                    continue;
                }
            };
            for binding in &player.kart {
                map.insert(
                    binding.input,
                    GameAction::Kart {
                        player: player_id,
                        action: binding.action,
                    },
                );
            }
        }
        debug!("Built ingame action map with {} entries", map.len());
        map
    }

    pub fn is_fixed_input(&self, input: &Input) -> bool {
        self.fixed.contains(input)
    }

    pub fn kart_binding(&self, player: PlayerId, action: KartAction) -> Option<Input> {
        self.players
            .get(player.index())?
            .kart
            .iter()
            .find(|binding| binding.action == action)
            .map(|binding| binding.input)
    }

    /// Binds `input` to a player's kart action.
    ///
    /// The input is removed from every other kart binding first, so one
    /// control never drives two kart actions. Returns the input previously
    /// bound to the action.
    pub fn rebind(
        &mut self,
        player: PlayerId,
        action: KartAction,
        input: Input,
    ) -> Result<Option<Input>, DriverError> {
        let index = player.index();
        if index >= self.players.len() {
            return Err(DriverError::PlayerOutOfRange {
                index,
                limit: self.players.len(),
            });
        }

        for (other_index, other) in self.players.iter_mut().enumerate() {
            other.kart.retain(|binding| {
                let keep = binding.input != input
                    || (other_index == index && binding.action == action);
                if !keep {
                    info!(
                        "{} no longer drives {} {:?}",
                        input, other.name, binding.action
                    );
                }
                keep
            });
        }

        let bindings = &mut self.players[index];
        let previous = match bindings.kart.iter_mut().find(|b| b.action == action) {
            Some(binding) => Some(std::mem::replace(&mut binding.input, input)),
            None => {
                bindings.kart.push(Binding::new(action, input));
                None
            }
        };
        info!("{} {:?} bound to {}", bindings.name, action, input);
        Ok(previous)
    }

    /// `~/.kartinput/input.toml`
    pub fn default_path() -> PathBuf {
        get_home_dir().join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: InputConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded input config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved input config to {}", path.display());
        Ok(())
    }

    /// Loads the config at `path`, writing the defaults there first if absent
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        info!("No input config at {}, writing defaults", path.display());
        let config = Self::default_config();
        config.save(path)?;
        Ok(config)
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(index: usize) -> PlayerId {
        PlayerId::new(index).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let config = InputConfig::default_config();
        config.validate().unwrap();
        assert_eq!(config.players.len(), MAX_PLAYERS);
        assert!(config.is_fixed_input(&key(keys::ESCAPE)));
        assert!(!config.is_fixed_input(&key(keys::SPACE)));
    }

    #[test]
    fn menu_map_has_only_menu_actions() {
        let map = InputConfig::default_config().menu_action_map();
        assert_eq!(map.resolve(&key(keys::RETURN)), Some(GameAction::Enter));
        assert_eq!(map.resolve(&key(keys::SPACE)), None);
        assert_eq!(
            map.resolve(&stick_axis(0, 1, AxisDirection::Negative)),
            Some(GameAction::CursorUp)
        );
    }

    #[test]
    fn ingame_map_combines_globals_and_players() {
        let map = InputConfig::default_config().ingame_action_map();
        assert_eq!(map.resolve(&key(keys::ESCAPE)), Some(GameAction::Leave));
        assert_eq!(
            map.resolve(&key(keys::SPACE)),
            Some(GameAction::Kart {
                player: p(0),
                action: KartAction::Fire
            })
        );
        assert_eq!(
            map.resolve(&stick_button(1, 0)),
            Some(GameAction::Kart {
                player: p(3),
                action: KartAction::Accel
            })
        );
        assert_eq!(map.resolve(&key(keys::RETURN)), None);
    }

    #[test]
    fn rebind_displaces_conflicting_binding() {
        let mut config = InputConfig::default_config();
        // Player 2 takes player 1's fire key.
        let previous = config
            .rebind(p(1), KartAction::Fire, key(keys::SPACE))
            .unwrap();
        assert_eq!(previous, Some(key(keys::TAB)));
        assert_eq!(
            config.kart_binding(p(1), KartAction::Fire),
            Some(key(keys::SPACE))
        );
        assert_eq!(config.kart_binding(p(0), KartAction::Fire), None);
    }

    #[test]
    fn rebind_to_same_input_keeps_binding() {
        let mut config = InputConfig::default_config();
        let previous = config
            .rebind(p(0), KartAction::Left, key(keys::LEFT))
            .unwrap();
        assert_eq!(previous, Some(key(keys::LEFT)));
        assert_eq!(
            config.kart_binding(p(0), KartAction::Left),
            Some(key(keys::LEFT))
        );
    }

    #[test]
    fn rebind_rejects_unconfigured_player() {
        let mut config = InputConfig::default_config();
        config.players.truncate(1);
        let err = config
            .rebind(p(2), KartAction::Jump, key(keys::W))
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::PlayerOutOfRange { index: 2, limit: 1 }
        ));
    }

    #[test]
    fn validate_rejects_misplaced_actions() {
        let mut config = InputConfig::default_config();
        config
            .menu
            .push(Binding::new(GameAction::ToggleFullscreen, key(keys::W)));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = InputConfig::default_config();
        config.ingame.push(Binding::new(
            GameAction::Kart {
                player: p(0),
                action: KartAction::Jump,
            },
            key(keys::W),
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_many_players_and_bad_deadzones() {
        let mut config = InputConfig::default_config();
        config.players.push(PlayerBindings::default());
        assert!(config.validate().is_err());

        let mut config = InputConfig::default_config();
        config.sensitivity.joystick_deadzone = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let content = r#"
            fixed = [{ type = "keyboard", key = 27 }]

            [sensitivity]
            joystick_deadzone = 4000

            [[menu]]
            action = "enter"
            input = { type = "stick_button", stick = 0, button = 2 }

            [[players]]
            name = "Solo"
            kart = [
                { action = "left", input = { type = "stick_motion", stick = 0, axis = 0, direction = "negative" } },
            ]
        "#;
        let config: InputConfig = toml::from_str(content).unwrap();
        config.validate().unwrap();
        assert_eq!(config.sensitivity.joystick_deadzone, 4000);
        assert_eq!(config.sensitivity.mouse_deadzone, DEADZONE_MOUSE);
        assert_eq!(
            config.menu_action_map().resolve(&stick_button(0, 2)),
            Some(GameAction::Enter)
        );
        assert_eq!(
            config.kart_binding(p(0), KartAction::Left),
            Some(stick_axis(0, 0, AxisDirection::Negative))
        );
        assert!(config.ingame.is_empty());
    }

    #[test]
    fn load_or_create_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let created = InputConfig::load_or_create(&path).unwrap();
        assert!(path.exists());

        let mut edited = created.clone();
        edited
            .rebind(p(0), KartAction::Jump, key(keys::W))
            .unwrap();
        edited.save(&path).unwrap();

        let loaded = InputConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded, edited);
    }

    #[test]
    fn load_reports_missing_file_and_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            InputConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "players = 3").unwrap();
        assert!(matches!(
            InputConfig::load(&broken),
            Err(ConfigError::Parse(_))
        ));
    }
}
