//! Desired UI state shared between every uiviz process.
//!
//! Each controlled [`Subsystem`] owns exactly one state file holding a single
//! [`StateValue`]. The file is the source of truth: CLI invocations commit to it
//! and the daemon reconciles the live environment against it.
//!
//! - [`store`] - Atomic read/write of the state files
//! - [`lock`] - PID-based advisory lock guarding multi-step mutations

pub mod lock;
pub mod store;

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use lock::{LockError, LockHandle, LockManager};
pub use store::{PersistenceError, StateStore};

use crate::core::constants::files;

/// Shape of the value persisted for a subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Hidden (`1`) or visible (`0`).
    Flag,
    /// Continuous opacity in `[0.0, 1.0]`.
    Fraction,
}

/// A desired state, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StateValue {
    /// `true` means hidden.
    Flag(bool),
    /// Opacity, `0.0` is fully transparent.
    Fraction(f32),
}

impl StateValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::Flag(_) => ValueKind::Flag,
            Self::Fraction(_) => ValueKind::Fraction,
        }
    }

    /// Returns the logical negation of this value.
    ///
    /// Fractions only remember fully-on and fully-off: any nonzero opacity
    /// toggles to `0.0`, and `0.0` toggles to `1.0`.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Flag(hidden) => Self::Flag(!hidden),
            Self::Fraction(alpha) if alpha > 0.0 => Self::Fraction(0.0),
            Self::Fraction(_) => Self::Fraction(1.0),
        }
    }

    /// Returns `true` when the value describes a hidden element.
    #[must_use]
    pub fn is_hidden(self) -> bool {
        match self {
            Self::Flag(hidden) => hidden,
            Self::Fraction(alpha) => alpha <= 0.0,
        }
    }

    /// Serializes the value to its on-disk line.
    #[must_use]
    pub fn encode(self) -> String {
        match self {
            Self::Flag(hidden) => format!("{}\n", u8::from(hidden)),
            Self::Fraction(alpha) => format!("{alpha}\n"),
        }
    }

    /// Parses the on-disk representation for `kind`.
    ///
    /// Returns `None` for anything that is not a complete, in-range value.
    #[must_use]
    pub fn decode(kind: ValueKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match kind {
            ValueKind::Flag => match raw.parse::<u8>().ok()? {
                0 => Some(Self::Flag(false)),
                1 => Some(Self::Flag(true)),
                _ => None,
            },
            ValueKind::Fraction => {
                let alpha = raw.parse::<f32>().ok()?;
                (alpha.is_finite() && (0.0..=1.0).contains(&alpha)).then_some(Self::Fraction(alpha))
            }
        }
    }

    /// Parses a user-supplied value for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the accepted values when `input` is invalid.
    pub fn parse_for(kind: ValueKind, input: &str) -> Result<Self, String> {
        let normalized = input.trim().to_lowercase();
        match kind {
            ValueKind::Flag => match normalized.as_str() {
                "1" | "true" | "on" | "hidden" | "hide" => Ok(Self::Flag(true)),
                "0" | "false" | "off" | "visible" | "show" => Ok(Self::Flag(false)),
                _ => Err(format!(
                    "Invalid value '{input}'. Expected one of: hidden, visible, on, off, 1, 0."
                )),
            },
            ValueKind::Fraction => match normalized.as_str() {
                "hidden" | "hide" | "off" => Ok(Self::Fraction(0.0)),
                "visible" | "show" | "on" => Ok(Self::Fraction(1.0)),
                _ => Self::decode(kind, &normalized).ok_or_else(|| {
                    format!("Invalid opacity '{input}'. Expected a number between 0.0 and 1.0.")
                }),
            },
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(true) => write!(f, "hidden"),
            Self::Flag(false) => write!(f, "visible"),
            Self::Fraction(alpha) => write!(f, "{alpha:.2}"),
        }
    }
}

/// A piece of the desktop whose visibility uiviz controls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Subsystem {
    /// Menu bar visibility override.
    MenuBar,
    /// Dock auto-hide behaviour.
    Dock,
    /// Menu bar opacity.
    #[serde(rename = "menu-alpha")]
    MenuBarAlpha,
}

impl Subsystem {
    /// Every subsystem, in reconciliation order.
    pub const ALL: [Self; 3] = [Self::MenuBar, Self::Dock, Self::MenuBarAlpha];

    /// Returns the kind of value persisted for this subsystem.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::MenuBar | Self::Dock => ValueKind::Flag,
            Self::MenuBarAlpha => ValueKind::Fraction,
        }
    }

    /// Returns the name of the state file inside the state directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::MenuBar => files::MENU_BAR_STATE,
            Self::Dock => files::DOCK_STATE,
            Self::MenuBarAlpha => files::MENU_BAR_ALPHA_STATE,
        }
    }

    /// Documented default, used whenever the state file is missing or unreadable.
    #[must_use]
    pub const fn default_value(self) -> StateValue {
        match self.kind() {
            ValueKind::Flag => StateValue::Flag(false),
            ValueKind::Fraction => StateValue::Fraction(1.0),
        }
    }

    /// Value the daemon forces at startup.
    #[must_use]
    pub const fn hidden_value(self) -> StateValue {
        match self.kind() {
            ValueKind::Flag => StateValue::Flag(true),
            ValueKind::Fraction => StateValue::Fraction(0.0),
        }
    }

    /// Whether the host may silently revert the hidden state, requiring the
    /// daemon to re-assert it every tick.
    #[must_use]
    pub const fn needs_reassertion(self) -> bool { matches!(self, Self::MenuBar) }

    /// Human-readable description of `value` for this subsystem.
    #[must_use]
    pub fn describe(self, value: StateValue) -> String {
        match (self, value) {
            (Self::MenuBar, StateValue::Flag(true)) => "Hidden".to_string(),
            (Self::MenuBar, StateValue::Flag(false)) => "Visible".to_string(),
            (Self::Dock, StateValue::Flag(true)) => "Invisible".to_string(),
            (Self::Dock, StateValue::Flag(false)) => "Normal".to_string(),
            (_, value) => format!("opacity {value}"),
        }
    }

    /// Label used in CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MenuBar => "Menu bar visibility",
            Self::Dock => "Dock auto-hide",
            Self::MenuBarAlpha => "Menu bar opacity",
        }
    }
}

impl FromStr for Subsystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "menu-bar" | "menubar" | "menu" => Ok(Self::MenuBar),
            "dock" => Ok(Self::Dock),
            "menu-alpha" | "alpha" | "opacity" => Ok(Self::MenuBarAlpha),
            _ => Err(format!(
                "Invalid subsystem '{s}'. Expected 'menu-bar', 'dock', or 'menu-alpha'."
            )),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuBar => write!(f, "menu-bar"),
            Self::Dock => write!(f, "dock"),
            Self::MenuBarAlpha => write!(f, "menu-alpha"),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_flag_toggle_is_negation() {
        assert_eq!(StateValue::Flag(true).toggled(), StateValue::Flag(false));
        assert_eq!(StateValue::Flag(false).toggled(), StateValue::Flag(true));
    }

    #[test]
    fn test_fraction_toggle_only_remembers_extremes() {
        assert_eq!(StateValue::Fraction(0.4).toggled(), StateValue::Fraction(0.0));
        assert_eq!(StateValue::Fraction(0.0).toggled(), StateValue::Fraction(1.0));
        assert_eq!(StateValue::Fraction(0.4).toggled().toggled(), StateValue::Fraction(1.0));
    }

    #[test]
    fn test_encode_flag() {
        assert_eq!(StateValue::Flag(true).encode(), "1\n");
        assert_eq!(StateValue::Flag(false).encode(), "0\n");
    }

    #[test]
    fn test_decode_flag_rejects_out_of_range() {
        assert_eq!(StateValue::decode(ValueKind::Flag, "1\n"), Some(StateValue::Flag(true)));
        assert_eq!(StateValue::decode(ValueKind::Flag, " 0 "), Some(StateValue::Flag(false)));
        assert_eq!(StateValue::decode(ValueKind::Flag, "2"), None);
        assert_eq!(StateValue::decode(ValueKind::Flag, "-1"), None);
        assert_eq!(StateValue::decode(ValueKind::Flag, "0.5"), None);
        assert_eq!(StateValue::decode(ValueKind::Flag, ""), None);
    }

    #[test]
    fn test_decode_fraction() {
        assert_eq!(
            StateValue::decode(ValueKind::Fraction, "0.25\n"),
            Some(StateValue::Fraction(0.25))
        );
        assert_eq!(StateValue::decode(ValueKind::Fraction, "1"), Some(StateValue::Fraction(1.0)));
        assert_eq!(StateValue::decode(ValueKind::Fraction, "1.5"), None);
        assert_eq!(StateValue::decode(ValueKind::Fraction, "NaN"), None);
        assert_eq!(StateValue::decode(ValueKind::Fraction, "inf"), None);
    }

    #[test]
    fn test_parse_for_flag_aliases() {
        assert_eq!(StateValue::parse_for(ValueKind::Flag, "Hidden"), Ok(StateValue::Flag(true)));
        assert_eq!(StateValue::parse_for(ValueKind::Flag, "off"), Ok(StateValue::Flag(false)));
        assert!(StateValue::parse_for(ValueKind::Flag, "maybe").is_err());
    }

    #[test]
    fn test_parse_for_fraction() {
        assert_eq!(
            StateValue::parse_for(ValueKind::Fraction, "0.3"),
            Ok(StateValue::Fraction(0.3))
        );
        assert_eq!(
            StateValue::parse_for(ValueKind::Fraction, "hidden"),
            Ok(StateValue::Fraction(0.0))
        );
        let err = StateValue::parse_for(ValueKind::Fraction, "2").unwrap_err();
        assert!(err.contains("between 0.0 and 1.0"));
    }

    #[test]
    fn test_subsystem_defaults_are_visible() {
        for subsystem in Subsystem::ALL {
            assert!(!subsystem.default_value().is_hidden(), "{subsystem} default is hidden");
            assert!(subsystem.hidden_value().is_hidden());
            assert_eq!(subsystem.default_value().kind(), subsystem.kind());
        }
    }

    #[test]
    fn test_only_menu_bar_needs_reassertion() {
        assert!(Subsystem::MenuBar.needs_reassertion());
        assert!(!Subsystem::Dock.needs_reassertion());
        assert!(!Subsystem::MenuBarAlpha.needs_reassertion());
    }

    #[test]
    fn test_subsystem_from_str_round_trips_display() {
        for subsystem in Subsystem::ALL {
            assert_eq!(subsystem.to_string().parse::<Subsystem>(), Ok(subsystem));
        }
        assert_eq!("MenuBar".parse::<Subsystem>(), Ok(Subsystem::MenuBar));
        assert!("taskbar".parse::<Subsystem>().unwrap_err().contains("Invalid subsystem"));
    }

    #[test]
    fn test_subsystem_serde_names_match_cli_names() {
        let json = serde_json::to_string(&Subsystem::MenuBarAlpha).unwrap();
        assert_eq!(json, "\"menu-alpha\"");
        let parsed: Subsystem = serde_json::from_str("\"menu-bar\"").unwrap();
        assert_eq!(parsed, Subsystem::MenuBar);
    }

    #[test]
    fn test_describe_uses_subsystem_wording() {
        assert_eq!(Subsystem::MenuBar.describe(StateValue::Flag(true)), "Hidden");
        assert_eq!(Subsystem::Dock.describe(StateValue::Flag(false)), "Normal");
        assert_eq!(
            Subsystem::MenuBarAlpha.describe(StateValue::Fraction(0.5)),
            "opacity 0.50"
        );
    }

    proptest! {
        #[test]
        fn prop_flag_toggle_is_involution(hidden in any::<bool>()) {
            let value = StateValue::Flag(hidden);
            prop_assert_eq!(value.toggled().toggled(), value);
        }

        #[test]
        fn prop_encoded_values_decode_to_themselves(alpha in 0.0f32..=1.0) {
            let value = StateValue::Fraction(alpha);
            prop_assert_eq!(StateValue::decode(ValueKind::Fraction, &value.encode()), Some(value));
        }
    }
}
