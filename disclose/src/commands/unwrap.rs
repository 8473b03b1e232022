//! The `unwrap` command: removes soft line breaks and echoes the message.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use log::debug;
use std::io::{self, Write};

use disclose_core::{unwrap_soft_breaks, ByteBuffer};

use crate::cli::UnwrapCommand;
use crate::commands::read_input;

pub fn run_unwrap(cmd: &UnwrapCommand) -> Result<()> {
    let input = read_input(cmd.input.as_deref())?;
    let buffer = ByteBuffer::from_input(&input, cmd.capacity)?;
    let unwrapped = unwrap_soft_breaks(&buffer);
    debug!("Unwrapped {} bytes into {}", buffer.len(), unwrapped.len());

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writer.write_all(unwrapped.message())?;
    writer.flush()?;
    Ok(())
}
