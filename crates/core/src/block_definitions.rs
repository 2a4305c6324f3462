//! Block and flag definitions.
//!
//! Definitions are the immutable templates loaded from the block configuration.
//! The `Raw*` types mirror the YAML document as written; [`BlockDefinition`] and
//! [`FlagDefinition`] are their normalized form.

use std::fmt::{Display, Formatter};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Display color of a block. Purely cosmetic.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Blue,
    #[default]
    Gray,
    Green,
    Orange,
    Red,
}

impl BlockColor {
    /// Matches a color name case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "blue" => Some(Self::Blue),
            "gray" | "grey" => Some(Self::Gray),
            "green" => Some(Self::Green),
            "orange" => Some(Self::Orange),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    /// RGB components used when a block is drawn.
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Blue => (0x1E, 0x88, 0xE5),
            Self::Gray => (0x80, 0x80, 0x80),
            Self::Green => (0x2E, 0x7D, 0x32),
            Self::Orange => (0xFB, 0x8C, 0x00),
            Self::Red => (0xC6, 0x28, 0x28),
        }
    }
}

/// Either the text of a value-taking flag or the checked state of a switch.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlagValue {
    Switch(bool),
    Text(String),
}

impl FlagValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Switch(_) => None,
        }
    }
}

impl Display for FlagValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch(checked) => write!(formatter, "{checked}"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FlagDefinition {
    pub key: String,
    pub label: String,
    pub long: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    pub takes_value: bool,
    pub default: FlagValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FlagDefinition {
    /// The long option followed by the short one in parentheses, if any.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.short {
            Some(short) => format!("{} ({short})", self.long),
            None => self.long.clone(),
        }
    }
}

impl Display for FlagDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "`{}` {}", self.key, self.display_label())?;

        if let Some(description) = &self.description {
            write!(formatter, " ({description})")?;
        }

        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    pub id: String,
    pub title: String,
    pub command: String,
    pub color: BlockColor,
    pub input: String,
    pub output: String,
    pub include_in_bootstrap: bool,
    pub flags: Vec<FlagDefinition>,
}

impl BlockDefinition {
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<&FlagDefinition> {
        self.flags.iter().find(|flag| flag.key == key)
    }
}

impl Display for BlockDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} ({})", self.title, self.id)
    }
}

/// The block configuration document as serialized.
#[derive(Serialize, Debug)]
pub struct BlockConfig<'a> {
    pub blocks: &'a [BlockDefinition],
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawBlock {
    pub id: Option<String>,
    pub title: Option<String>,
    pub command: Option<String>,
    pub color: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub include_in_bootstrap: Option<bool>,
    #[serde(default)]
    pub flags: Vec<RawFlag>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct RawFlag {
    pub key: Option<String>,
    pub label: Option<String>,
    pub long: Option<String>,
    pub short: Option<String>,
    #[serde(default)]
    pub takes_value: bool,
    pub default: Option<Value>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
}

/// Prepends `prefix` to a bare option name. Options already starting with a
/// dash are returned trimmed but otherwise untouched.
#[must_use]
pub fn ensure_prefixed(option: &str, prefix: &str) -> String {
    let option = option.trim();
    if option.is_empty() || option.starts_with('-') {
        return option.to_string();
    }

    format!("{prefix}{option}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(value: Option<String>, block: &str, field: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::missing_field(block, field))
}

fn normalize_default(
    block: &str,
    key: &str,
    takes_value: bool,
    default: Option<Value>,
) -> Result<FlagValue> {
    // Switches start checked only for an explicit `true`.
    if !takes_value {
        return Ok(match default {
            None | Some(Value::Null) => FlagValue::Switch(false),
            Some(Value::Bool(checked)) => FlagValue::Switch(checked),
            Some(other) => {
                warn!("Flag `{key}` on block {block} has non-boolean default {other:?}, leaving it unchecked");
                FlagValue::Switch(false)
            }
        });
    }

    let text = match default {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(checked)) => checked.to_string(),
        Some(_) => return Err(Error::InvalidDefault(block.to_string(), key.to_string())),
    };

    Ok(FlagValue::Text(text))
}

impl RawFlag {
    pub(crate) fn normalize(self, block: &str, index: usize) -> Result<FlagDefinition> {
        let long = ensure_prefixed(self.long.as_deref().unwrap_or_default(), "--");
        if long.is_empty() {
            let name = non_empty(self.key).unwrap_or_else(|| format!("#{}", index + 1));
            return Err(Error::MissingLongOption(block.to_string(), name));
        }

        let short = self
            .short
            .map(|short| ensure_prefixed(&short, "-"))
            .filter(|short| !short.is_empty());

        let key =
            non_empty(self.key).unwrap_or_else(|| long.trim_start_matches('-').to_string());
        let label = non_empty(self.label).unwrap_or_else(|| long.clone());
        let default = normalize_default(block, &key, self.takes_value, self.default)?;

        Ok(FlagDefinition {
            key,
            label,
            long,
            short,
            takes_value: self.takes_value,
            default,
            placeholder: non_empty(self.placeholder),
            description: non_empty(self.description),
        })
    }
}

impl RawBlock {
    pub(crate) fn normalize(self, index: usize) -> Result<BlockDefinition> {
        let position = format!("#{}", index + 1);
        let id = required(self.id, &position, "id")?;
        let title = required(self.title, &id, "title")?;
        let command = required(self.command, &id, "command")?;

        let color = match non_empty(self.color) {
            None => BlockColor::default(),
            Some(name) => BlockColor::from_name(&name).unwrap_or_else(|| {
                warn!("Unknown color `{name}` on block {id}, using gray");
                BlockColor::default()
            }),
        };

        let flags = self
            .flags
            .into_iter()
            .enumerate()
            .map(|(index, flag)| flag.normalize(&id, index))
            .collect::<Result<Vec<_>>>()?;

        Ok(BlockDefinition {
            id,
            title,
            command,
            color,
            input: non_empty(self.input).unwrap_or_else(|| "any".to_string()),
            output: non_empty(self.output).unwrap_or_else(|| "any".to_string()),
            include_in_bootstrap: self.include_in_bootstrap.unwrap_or(true),
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_flag(long: &str) -> RawFlag {
        RawFlag {
            long: Some(long.to_string()),
            ..RawFlag::default()
        }
    }

    #[test]
    fn test_ensure_prefixed() {
        assert_eq!(ensure_prefixed("input", "--"), "--input");
        assert_eq!(ensure_prefixed("--input", "--"), "--input");
        assert_eq!(ensure_prefixed(" v ", "-"), "-v");
        assert_eq!(ensure_prefixed("-v", "-"), "-v");
        assert_eq!(ensure_prefixed("   ", "--"), "");
    }

    #[test]
    fn test_ensure_prefixed_is_idempotent() {
        for option in ["input", "--input", "-i", "x"] {
            let once = ensure_prefixed(option, "--");
            assert_eq!(ensure_prefixed(&once, "--"), once);
        }
    }

    #[test]
    fn test_flag_key_and_label_fall_back_to_long() {
        let flag = raw_flag("jpeg-quality").normalize("ocr", 0).unwrap();
        assert_eq!(flag.long, "--jpeg-quality");
        assert_eq!(flag.key, "jpeg-quality");
        assert_eq!(flag.label, "--jpeg-quality");
        assert!(!flag.takes_value);
        assert_eq!(flag.default, FlagValue::Switch(false));
    }

    #[test]
    fn test_numeric_default_becomes_text() {
        let flag = RawFlag {
            takes_value: true,
            default: Some(Value::Number(70.into())),
            ..raw_flag("--jpeg-quality")
        }
        .normalize("ocr", 0)
        .unwrap();

        assert_eq!(flag.default, FlagValue::Text("70".to_string()));
    }

    #[test]
    fn test_switch_default_is_checked_only_for_true() {
        let checked = RawFlag {
            default: Some(Value::Bool(true)),
            ..raw_flag("--keep-original")
        }
        .normalize("cleanup", 0)
        .unwrap();
        assert_eq!(checked.default, FlagValue::Switch(true));

        for default in [
            Value::String("false".to_string()),
            Value::String("yes".to_string()),
            Value::Number(0.into()),
            Value::Number(1.into()),
        ] {
            let flag = RawFlag {
                default: Some(default.clone()),
                ..raw_flag("--keep-original")
            }
            .normalize("cleanup", 0)
            .unwrap();

            assert_eq!(flag.default, FlagValue::Switch(false), "default {default:?}");
        }
    }

    #[test]
    fn test_blank_long_is_rejected() {
        let result = RawFlag {
            key: Some("broken".to_string()),
            ..raw_flag("  ")
        }
        .normalize("cleanup", 0);

        assert!(matches!(result, Err(Error::MissingLongOption(_, key)) if key == "broken"));
    }

    #[test]
    fn test_block_requires_command() {
        let result = RawBlock {
            id: Some("ocr".to_string()),
            title: Some("OCR".to_string()),
            command: Some(" ".to_string()),
            ..RawBlock::default()
        }
        .normalize(0);

        assert!(
            matches!(result, Err(Error::MissingField { block, field }) if block == "ocr" && field == "command")
        );
    }

    #[test]
    fn test_unknown_color_falls_back_to_gray() {
        let block = RawBlock {
            id: Some("ocr".to_string()),
            title: Some("OCR".to_string()),
            command: Some("ocr".to_string()),
            color: Some("purple".to_string()),
            ..RawBlock::default()
        }
        .normalize(0)
        .unwrap();

        assert_eq!(block.color, BlockColor::Gray);
    }

    #[test]
    fn test_block_defaults() {
        let block = RawBlock {
            id: Some("ocr".to_string()),
            title: Some("OCR".to_string()),
            command: Some("ocr".to_string()),
            color: Some("Blue".to_string()),
            ..RawBlock::default()
        }
        .normalize(0)
        .unwrap();

        assert_eq!(block.color, BlockColor::Blue);
        assert_eq!(block.input, "any");
        assert_eq!(block.output, "any");
        assert!(block.include_in_bootstrap);
        assert!(block.flags.is_empty());
    }
}
