//! Inbound messages delivered by the transport.

use glam::Vec2;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{PlayerId, Weapon};

/// Flags a player currently holds.
///
/// `craft` and `swap_weapon` are pulses: the tick that honours them clears them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Intent {
    /// Move toward decreasing rows.
    pub up: bool,
    /// Move toward increasing rows.
    pub down: bool,
    /// Move toward decreasing columns.
    pub left: bool,
    /// Move toward increasing columns.
    pub right: bool,
    /// Craft once.
    pub craft: bool,
    /// Attack whenever the cooldown allows.
    pub attack: bool,
    /// Toggle the selected weapon once.
    pub swap_weapon: bool,
}

impl Intent {
    /// Unnormalised movement axis with components in `{-1, 0, 1}`.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        let horizontal = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        let vertical = f32::from(u8::from(self.down)) - f32::from(u8::from(self.up));
        Vec2::new(horizontal, vertical)
    }
}

/// Decoded `input` message body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputPayload {
    /// Flags to hold until the next input.
    pub intent: Intent,
    /// Weapon explicitly requested, if the payload named a valid one.
    pub selected_weapon: Option<Weapon>,
}

impl InputPayload {
    /// Coerces an arbitrary JSON value, treating every key with loose truthiness.
    ///
    /// Missing keys, `null`, `false`, `0`, `NaN` and the empty string are falsy.
    /// Anything that is not an object yields an idle payload.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let flag = |key: &str| value.get(key).is_some_and(is_truthy);
        let intent = Intent {
            up: flag("up"),
            down: flag("down"),
            left: flag("left"),
            right: flag("right"),
            craft: flag("craft"),
            attack: flag("attack"),
            swap_weapon: flag("swapWeapon"),
        };
        let selected_weapon = value
            .get("selectedWeapon")
            .and_then(Value::as_str)
            .and_then(Weapon::parse);
        Self {
            intent,
            selected_weapon,
        }
    }
}

impl<'de> Deserialize<'de> for InputPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Messages the transport forwards to the session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundEvent {
    /// A connection asked to enter the game.
    Join {
        /// Identifier the transport assigned to the connection.
        connection: PlayerId,
        /// Requested display name before sanitising.
        username: String,
    },
    /// A connection reported its held controls.
    Input {
        /// Identifier the transport assigned to the connection.
        connection: PlayerId,
        /// Decoded controls; absent payloads decode as idle.
        #[serde(default)]
        payload: InputPayload,
    },
    /// A connection closed.
    Disconnect {
        /// Identifier the transport assigned to the connection.
        connection: PlayerId,
    },
}
