use anyhow::Result;
use std::io::Write;

use crate::state::Session;

/// Export session as pretty-printed JSON
pub fn export_json<W: Write>(session: &Session, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, session)?;
    writeln!(writer)?;
    Ok(())
}
