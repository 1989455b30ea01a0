//! Keyboard hotkeys.
//!
//! An action may have many hotkeys, and a hotkey triggers at most one action. On disk the one-to-many
//! mapping of actions to keys is kept, as it's the easier one to edit by hand. The reverse mapping is
//! built from it when loading.

use super::Action;

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct KeyboardHotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Key name, as in `KeyZ`, `Delete`, `Tab`, `Equal`.
    pub key: String,
}
impl KeyboardHotkey {
    fn new(ctrl: bool, shift: bool, key: &str) -> Self {
        Self {
            ctrl,
            alt: false,
            shift,
            key: key.to_owned(),
        }
    }
}
impl std::fmt::Display for KeyboardHotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut components = smallvec::SmallVec::<[&str; 4]>::new();
        if self.ctrl {
            components.push("ctrl");
        }
        if self.alt {
            components.push("alt");
        }
        if self.shift {
            components.push("shift");
        }
        components.push(&self.key);
        f.write_str(&components.join("+"))
    }
}
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyboardHotkeyFromStrError {
    #[error("no key named")]
    MissingKey,
    #[error("unrecognized modifier `{0}`")]
    UnknownModifier(String),
    #[error("modifier `{0}` given twice")]
    RepeatedModifier(String),
}
impl std::str::FromStr for KeyboardHotkey {
    type Err = KeyboardHotkeyFromStrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: smallvec::SmallVec<[&str; 4]> = s.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(key) if !key.is_empty() => key.to_owned(),
            _ => return Err(KeyboardHotkeyFromStrError::MissingKey),
        };
        let mut hotkey = Self {
            ctrl: false,
            alt: false,
            shift: false,
            key,
        };
        for modifier in parts {
            let flag = match modifier {
                "ctrl" => &mut hotkey.ctrl,
                "alt" => &mut hotkey.alt,
                "shift" => &mut hotkey.shift,
                other => return Err(KeyboardHotkeyFromStrError::UnknownModifier(other.to_owned())),
            };
            if std::mem::replace(flag, true) {
                return Err(KeyboardHotkeyFromStrError::RepeatedModifier(
                    modifier.to_owned(),
                ));
            }
        }
        Ok(hotkey)
    }
}
impl serde::Serialize for KeyboardHotkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for KeyboardHotkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ActionHotkeys {
    #[serde(default)]
    pub keyboard: Vec<KeyboardHotkey>,
}

/// Action to its hotkeys, as saved in the config file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ActionsToKeys(pub std::collections::BTreeMap<Action, ActionHotkeys>);
impl Default for ActionsToKeys {
    fn default() -> Self {
        let keys = |list: &[KeyboardHotkey]| ActionHotkeys {
            keyboard: list.to_vec(),
        };
        Self(
            [
                (Action::Undo, keys(&[KeyboardHotkey::new(true, false, "KeyZ")])),
                (
                    Action::Redo,
                    keys(&[
                        KeyboardHotkey::new(true, false, "KeyY"),
                        KeyboardHotkey::new(true, true, "KeyZ"),
                    ]),
                ),
                (
                    Action::Delete,
                    keys(&[
                        KeyboardHotkey::new(false, false, "Delete"),
                        KeyboardHotkey::new(false, false, "Backspace"),
                    ]),
                ),
                (Action::Duplicate, keys(&[KeyboardHotkey::new(true, false, "KeyD")])),
                (Action::SwitchSide, keys(&[KeyboardHotkey::new(false, false, "Tab")])),
                (Action::ZoomIn, keys(&[KeyboardHotkey::new(true, false, "Equal")])),
                (Action::ZoomOut, keys(&[KeyboardHotkey::new(true, false, "Minus")])),
                (Action::SaveDesign, keys(&[KeyboardHotkey::new(true, false, "KeyS")])),
            ]
            .into_iter()
            .collect(),
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("hotkey `{hotkey}` bound to both {first} and {second}")]
pub struct HotkeyConflict {
    pub hotkey: KeyboardHotkey,
    pub first: Action,
    pub second: Action,
}

/// Hotkey to the action it triggers.
#[derive(Clone, Debug, Default)]
pub struct KeysToActions(hashbrown::HashMap<KeyboardHotkey, Action>);
impl KeysToActions {
    #[must_use]
    pub fn action_for(&self, hotkey: &KeyboardHotkey) -> Option<Action> {
        self.0.get(hotkey).copied()
    }
}
impl TryFrom<&ActionsToKeys> for KeysToActions {
    type Error = HotkeyConflict;
    fn try_from(value: &ActionsToKeys) -> Result<Self, Self::Error> {
        let mut map = hashbrown::HashMap::new();
        for (&action, hotkeys) in &value.0 {
            for hotkey in &hotkeys.keyboard {
                if let Some(first) = map.insert(hotkey.clone(), action) {
                    return Err(HotkeyConflict {
                        hotkey: hotkey.clone(),
                        first,
                        second: action,
                    });
                }
            }
        }
        Ok(Self(map))
    }
}
