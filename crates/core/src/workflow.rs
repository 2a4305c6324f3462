//! Serializable description of a workspace.
//!
//! A workflow names its nodes, states which block each one instantiates and
//! which flags it turns on, and lists the links between nodes by name:
//!
//! ```yaml
//! start: scan
//! nodes:
//!   - name: scan
//!     block: ocr_stage1
//!     flags:
//!       input: scan.pdf
//!       jpeg-quality: true
//!   - name: clean
//!     block: cleanup_stage2
//! links:
//!   - [scan, clean]
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::block_definitions::{BlockDefinition, FlagValue};
use crate::error::{Error, Result};
use crate::instance::{BlockInstance, InstanceId};
use crate::workspace::Workspace;

/// What a workflow says about one flag.
///
/// `true` enables the flag as it is, `false` leaves it disabled, and any other
/// scalar enables it with that value. Values are kept exactly as written, so
/// `1.50` stays `1.50` rather than becoming a number.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FlagSetting {
    Toggle(bool),
    Text(String),
}

impl Display for FlagSetting {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toggle(enabled) => write!(formatter, "{enabled}"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

struct FlagSettingVisitor;

impl Visitor<'_> for FlagSettingVisitor {
    type Value = FlagSetting;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("true, false or a scalar value")
    }

    fn visit_bool<E: de::Error>(self, enabled: bool) -> std::result::Result<FlagSetting, E> {
        Ok(FlagSetting::Toggle(enabled))
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<FlagSetting, E> {
        Ok(match text {
            "true" | "True" | "TRUE" => FlagSetting::Toggle(true),
            "false" | "False" | "FALSE" => FlagSetting::Toggle(false),
            _ => FlagSetting::Text(text.to_string()),
        })
    }

    fn visit_i64<E: de::Error>(self, number: i64) -> std::result::Result<FlagSetting, E> {
        Ok(FlagSetting::Text(number.to_string()))
    }

    fn visit_u64<E: de::Error>(self, number: u64) -> std::result::Result<FlagSetting, E> {
        Ok(FlagSetting::Text(number.to_string()))
    }

    fn visit_f64<E: de::Error>(self, number: f64) -> std::result::Result<FlagSetting, E> {
        Ok(FlagSetting::Text(number.to_string()))
    }
}

impl<'de> Deserialize<'de> for FlagSetting {
    // YAML hands plain scalars to `deserialize_str` as their source text.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(FlagSettingVisitor)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkflowNode {
    pub name: String,
    pub block: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub flags: IndexMap<String, FlagSetting>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub links: Vec<(String, String)>,
}

/// A workspace built from a workflow, with its node names resolved.
#[derive(Debug)]
pub struct Instantiated {
    pub workspace: Workspace,
    pub names: IndexMap<String, InstanceId>,
    pub start: Option<InstanceId>,
}

fn apply_setting(instance: &mut BlockInstance, key: &str, setting: &FlagSetting) -> Result<()> {
    match setting {
        FlagSetting::Toggle(enabled) => instance.set_enabled(key, *enabled),
        value => {
            instance.set_value(key, value.to_string())?;
            instance.set_enabled(key, true)
        }
    }
}

impl Workflow {
    /// Builds a workspace over `definitions` following this workflow.
    ///
    /// # Errors
    ///
    /// - [`Error::NonUniqueNodeName`] if two nodes share a name.
    /// - [`Error::UnknownNode`] if a link or the start names a missing node.
    /// - [`Error::UnknownBlock`] / [`Error::UnknownFlag`] /
    ///   [`Error::InvalidOperation`] for settings that do not fit the blocks.
    /// - Any link error, see [`crate::connections::ConnectionSet::link`].
    pub fn instantiate(&self, definitions: Vec<BlockDefinition>) -> Result<Instantiated> {
        let mut workspace = Workspace::new(definitions);
        let mut names: IndexMap<String, InstanceId> = IndexMap::new();

        for node in &self.nodes {
            if names.contains_key(&node.name) {
                return Err(Error::NonUniqueNodeName(node.name.clone()));
            }

            let id = workspace.spawn(&node.block)?;
            if let Some(instance) = workspace.instance_mut(id) {
                for (key, setting) in &node.flags {
                    apply_setting(instance, key, setting)?;
                }
            }
            names.insert(node.name.clone(), id);
        }

        let lookup = |name: &String| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnknownNode(name.clone()))
        };

        for (from, to) in &self.links {
            workspace.link(lookup(from)?, lookup(to)?)?;
        }

        let start = self.start.as_ref().map(lookup).transpose()?;

        Ok(Instantiated {
            workspace,
            names,
            start,
        })
    }

    /// Describes a workspace. Nodes are named `<block>-<n>` after their
    /// instance IDs; only enabled flags are recorded.
    #[must_use]
    pub fn from_workspace(workspace: &Workspace, start: Option<InstanceId>) -> Self {
        let names: HashMap<InstanceId, String> = workspace
            .instances()
            .map(|(id, instance)| (id, format!("{}-{}", instance.definition().id, id.0)))
            .collect();

        let nodes = workspace
            .instances()
            .map(|(id, instance)| WorkflowNode {
                name: names[&id].clone(),
                block: instance.definition().id.clone(),
                flags: enabled_settings(instance),
            })
            .collect();

        let links = workspace
            .connections()
            .connections()
            .map(|connection| (names[&connection.from].clone(), names[&connection.to].clone()))
            .collect();

        Self {
            start: start.and_then(|id| names.get(&id).cloned()),
            nodes,
            links,
        }
    }
}

fn enabled_settings(instance: &BlockInstance) -> IndexMap<String, FlagSetting> {
    instance
        .definition()
        .flags
        .iter()
        .filter_map(|flag| {
            let state = instance.flag_state(&flag.key)?;
            if !state.enabled {
                return None;
            }

            let setting = match &state.value {
                FlagValue::Text(text) if flag.takes_value => FlagSetting::Text(text.clone()),
                _ => FlagSetting::Toggle(true),
            };
            Some((flag.key.clone(), setting))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler;
    use crate::file_handling::load_definitions;

    const BLOCKS: &str = r#"
blocks:
  - id: ocr_stage1
    title: OCR
    command: python batchocr/ocr_tests.py
    flags:
      - key: input
        label: Input
        long: input
        takes_value: true
      - key: jpeg-quality
        label: JPEG quality
        long: --jpeg-quality
        takes_value: true
        default: 70
  - id: cleanup_stage2
    title: Cleanup
    command: python cleanocr/cleanup_tests.py
    flags:
      - key: max-tokens
        label: Max tokens
        long: --max-tokens
        takes_value: true
        default: 1200
      - key: keep-original
        label: Keep original
        long: keep-original
"#;

    const WORKFLOW: &str = r#"
start: clean
nodes:
  - name: scan
    block: ocr_stage1
    flags:
      input: scan.pdf
      jpeg-quality: true
  - name: clean
    block: cleanup_stage2
    flags:
      max-tokens: 800
      keep-original: false
links:
  - [scan, clean]
"#;

    fn workflow(yaml: &str) -> Workflow {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_instantiate() {
        let built = workflow(WORKFLOW)
            .instantiate(load_definitions(BLOCKS).unwrap())
            .unwrap();

        let start = built.start.unwrap();
        assert_eq!(start, built.names["clean"]);
        assert_eq!(
            built.workspace.assemble_from(start).unwrap(),
            "python batchocr/ocr_tests.py --input scan.pdf --jpeg-quality 70 \
             python cleanocr/cleanup_tests.py --max-tokens 800"
        );
    }

    #[test]
    fn test_unknown_link_target() {
        let mut document = workflow(WORKFLOW);
        document.links.push(("clean".to_string(), "nowhere".to_string()));

        let result = document.instantiate(load_definitions(BLOCKS).unwrap());

        assert!(matches!(result, Err(Error::UnknownNode(name)) if name == "nowhere"));
    }

    #[test]
    fn test_duplicate_node_name() {
        let mut document = workflow(WORKFLOW);
        let copy = document.nodes[0].clone();
        document.nodes.push(copy);

        let result = document.instantiate(load_definitions(BLOCKS).unwrap());

        assert!(matches!(result, Err(Error::NonUniqueNodeName(_))));
    }

    #[test]
    fn test_value_on_switch_is_rejected() {
        let mut document = workflow(WORKFLOW);
        document.nodes[1]
            .flags
            .insert("keep-original".to_string(), FlagSetting::Text("yes".to_string()));

        let result = document.instantiate(load_definitions(BLOCKS).unwrap());

        assert!(matches!(result, Err(Error::InvalidOperation(_, _))));
    }

    #[test]
    fn test_scalar_values_are_kept_as_written() {
        let blocks = "blocks:\n  - id: tool\n    title: Tool\n    command: tool\n    flags:\n      - key: q\n        long: q\n        takes_value: true\n";

        for value in ["1.50", "1e3", "0x10", "007", "scan.pdf"] {
            let yaml = format!("nodes:\n  - name: t\n    block: tool\n    flags:\n      q: {value}\n");
            let document = workflow(&yaml);
            assert_eq!(
                document.nodes[0].flags["q"],
                FlagSetting::Text(value.to_string())
            );

            let built = document
                .instantiate(load_definitions(blocks).unwrap())
                .unwrap();
            let id = built.names["t"];
            assert_eq!(
                built.workspace.assemble_from(id).unwrap(),
                format!("tool --q {value}")
            );
        }
    }

    #[test]
    fn test_booleans_are_toggles() {
        let document = workflow(
            "nodes:\n  - name: t\n    block: tool\n    flags:\n      a: true\n      b: False\n      c: 'on'\n",
        );
        let flags = &document.nodes[0].flags;

        assert_eq!(flags["a"], FlagSetting::Toggle(true));
        assert_eq!(flags["b"], FlagSetting::Toggle(false));
        assert_eq!(flags["c"], FlagSetting::Text("on".to_string()));
    }

    #[test]
    fn test_written_values_read_back_unchanged() {
        let mut node = WorkflowNode {
            name: "t".to_string(),
            block: "tool".to_string(),
            flags: IndexMap::new(),
        };
        node.flags
            .insert("q".to_string(), FlagSetting::Text("1.50".to_string()));
        node.flags.insert("v".to_string(), FlagSetting::Toggle(true));
        let document = Workflow {
            nodes: vec![node],
            ..Workflow::default()
        };

        let yaml = serde_yaml::to_string(&document).unwrap();

        assert_eq!(workflow(&yaml), document);
    }

    #[test]
    fn test_from_workspace_reproduces_command() {
        let built = workflow(WORKFLOW)
            .instantiate(load_definitions(BLOCKS).unwrap())
            .unwrap();
        let expected = built.workspace.assemble_from(built.start.unwrap()).unwrap();

        let exported = Workflow::from_workspace(&built.workspace, built.start);
        let yaml = serde_yaml::to_string(&exported).unwrap();
        let rebuilt = workflow(&yaml)
            .instantiate(load_definitions(BLOCKS).unwrap())
            .unwrap();

        let chain = rebuilt.workspace.select_chain(rebuilt.start).unwrap();
        assert_eq!(assembler::assemble(&chain), expected);
        assert_eq!(exported.start.as_deref(), Some("cleanup_stage2-2"));
    }
}
