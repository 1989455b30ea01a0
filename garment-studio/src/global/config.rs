use crate::actions::{
    self,
    hotkeys::{ActionsToKeys, KeyboardHotkey, KeysToActions},
};
use garment_core::engine::Mount;

const DOCUMENTATION: &str = r#"# Garment studio settings. You may edit this file, but be aware that formatting and comments will
# not be preserved, and all keys and values are case sensitive.

# history_capacity: undo steps kept per side.
# preview_size: [width, height] of the flat preview and the 3D texture, in pixels.
# resize_quiet_ms: how long the window must stop resizing before surfaces are refit.
# notice_ms: how long notices stay on screen.
# model: path to a .glb or .gltf garment model for the 3D mockup.
# storage_dir: where saved colors, stickers, cart and designs live.

# Hotkeys are listed per action under [hotkeys.<Action>], written `[ctrl+][alt+][shift+]<key>`.
# Examples:
# [hotkeys.Undo]
# keyboard = ["ctrl+KeyZ"]
# [hotkeys.Redo]
# keyboard = ["ctrl+KeyY", "ctrl+shift+KeyZ"]

"#;

fn default_mounts() -> [Mount; 2] {
    ["frontCanvas", "backCanvas"].map(|id| Mount {
        id: id.to_owned(),
        container_width: 500.0,
        padding: [12.0, 12.0],
    })
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub history_capacity: usize,
    pub preview_size: [u32; 2],
    pub resize_quiet_ms: u64,
    pub notice_ms: u64,
    pub device_pixel_ratio: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<std::path::PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<std::path::PathBuf>,
    /// Drawing targets for the front and back surfaces, in that order.
    /// An empty id leaves that side without a surface.
    pub mounts: [Mount; 2],
    pub hotkeys: ActionsToKeys,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: garment_core::history::HISTORY_CAPACITY,
            preview_size: garment_core::sync::PREVIEW_SIZE,
            resize_quiet_ms: 120,
            notice_ms: 3000,
            device_pixel_ratio: 1.0,
            model: None,
            storage_dir: None,
            mounts: default_mounts(),
            hotkeys: ActionsToKeys::default(),
        }
    }
}
impl Settings {
    #[must_use]
    pub fn resize_quiet(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.resize_quiet_ms)
    }
    #[must_use]
    pub fn notice_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.notice_ms)
    }
}

pub struct Config {
    failed_to_load: bool,
    pub settings: Settings,
    pub keys_to_actions: KeysToActions,
}
impl Config {
    const FILENAME: &'static str = "garment-studio.toml";
    /// Settings from the user's preferences, or defaults if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        match super::preferences_dir() {
            None => Self::no_path(),
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        }
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("Settings weren't available, defaulting.");
        let mut this = Self::from_settings(Settings::default());
        this.failed_to_load = true;
        this
    }
    fn from_settings(settings: Settings) -> Self {
        let keys_to_actions = match KeysToActions::try_from(&settings.hotkeys) {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("{e}, using default hotkeys");
                (&ActionsToKeys::default()).try_into().unwrap_or_default()
            }
        };
        Self {
            failed_to_load: false,
            settings,
            keys_to_actions,
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let settings: anyhow::Result<(Settings, KeysToActions)> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings: Settings = toml::from_str(&string)?;
            let keys_to_actions: KeysToActions = (&settings.hotkeys).try_into()?;

            Ok((settings, keys_to_actions))
        };

        match settings {
            Ok((settings, keys_to_actions)) => Self {
                failed_to_load: false,
                settings,
                keys_to_actions,
            },
            Err(e) => {
                log::debug!("{path:?}: {e:#}");
                Self::no_path()
            }
        }
    }
    /// Return true if loading user's settings failed. This can be useful for
    /// displaying a warning.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    #[must_use]
    pub fn action_for_key(&self, key: &str) -> Option<actions::Action> {
        let hotkey: KeyboardHotkey = key.parse().ok()?;
        self.keys_to_actions.action_for(&hotkey)
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences = super::preferences_dir()
            .ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let mut string = toml::ser::to_string_pretty(&self.settings)?;
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(path, string)?;
        Ok(())
    }
}
