use std::io::{stdout, Write};

use cmdchain_core::assembler::render_segment;
use cmdchain_core::block_definitions::{BlockColor, BlockDefinition, FlagValue};
use cmdchain_core::error::Result;
use cmdchain_core::instance::BlockInstance;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};

/// Trait for converting block colors to terminal colors
pub trait AsTermColor {
    fn as_crossterm_color(&self) -> Color;
}

impl AsTermColor for BlockColor {
    fn as_crossterm_color(&self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb { r, g, b }
    }
}

fn default_hint(value: &FlagValue) -> String {
    match value {
        FlagValue::Text(text) if text.is_empty() => String::new(),
        FlagValue::Text(text) => format!(" [{text}]"),
        FlagValue::Switch(true) => " [on]".to_string(),
        FlagValue::Switch(false) => String::new(),
    }
}

/// Prints every block in its color, followed by its flags.
pub fn print_blocks(definitions: &[BlockDefinition]) -> Result<()> {
    let mut stdout = stdout();

    for (index, block) in definitions.iter().enumerate() {
        queue!(
            stdout,
            SetAttribute(Attribute::Bold),
            SetForegroundColor(block.color.as_crossterm_color()),
            Print(format!("{:>3} {block}", index + 1)),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Color::Reset),
            Print(format!("\n      {}\n", block.command)),
        )?;

        for flag in &block.flags {
            let value_hint = if flag.takes_value {
                let placeholder = flag.placeholder.as_deref().unwrap_or("VALUE");
                format!(" <{placeholder}>")
            } else {
                String::new()
            };

            queue!(
                stdout,
                Print(format!(
                    "      {flag}{value_hint}{}\n",
                    default_hint(&flag.default)
                )),
            )?;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Prints each segment of a chain in its block color, then the full command.
pub fn print_pipeline(chain: &[&BlockInstance], command_line: &str) -> Result<()> {
    let mut stdout = stdout();

    queue!(stdout, Print("Pipeline:\n"))?;
    for (position, instance) in chain.iter().enumerate() {
        queue!(
            stdout,
            Print(format!("{:>3} ", position + 1)),
            SetForegroundColor(instance.definition().color.as_crossterm_color()),
            Print(render_segment(instance)),
            SetForegroundColor(Color::Reset),
            Print("\n"),
        )?;
    }

    queue!(stdout, Print(format!("Executing command:\n{command_line}\n")))?;
    stdout.flush()?;
    Ok(())
}
