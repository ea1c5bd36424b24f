use std::io::Write;

use crate::state::{HopRecord, Target, TraceStatus};

/// Printed in place of an address when a hop did not answer
pub const FILTERED_MARKER: &str = "***";

/// Session banner, printed before the first probe
pub fn write_banner<W: Write>(
    writer: &mut W,
    target: &Target,
    max_hops: u8,
) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "Tracing route to {} [{}] over a maximum of {} hop(s):",
        target.original, target.resolved, max_hops
    )?;
    writeln!(writer, "Hop\t{:>15}     Transit Time", "Routing address")?;
    writeln!(writer)
}

/// One line per probe: hop, right-justified address, transit time
pub fn write_hop<W: Write>(writer: &mut W, hop: &HopRecord) -> std::io::Result<()> {
    match (hop.responder, hop.elapsed_ms) {
        (Some(addr), Some(ms)) => {
            writeln!(writer, "{}\t{:>15}     {}ms", hop.ttl, addr.to_string(), ms)
        }
        _ => writeln!(writer, "{}\t{:>15}", hop.ttl, FILTERED_MARKER),
    }
}

/// Closing summary for a finished trace
pub fn write_footer<W: Write>(
    writer: &mut W,
    target: &Target,
    status: &TraceStatus,
) -> std::io::Result<()> {
    match status {
        TraceStatus::Reached { hop } => writeln!(
            writer,
            "\nPacket reached {} after {} hop(s)\n",
            target.original, hop
        ),
        TraceStatus::HopLimitExhausted { hops } => writeln!(
            writer,
            "\nPacket did not reach {} after {} hop(s)\n",
            target.original, hops
        ),
        TraceStatus::Aborted { reason, .. } => {
            writeln!(writer, " Error: network problem, unable to proceed ({})\n", reason)
        }
        TraceStatus::Running => Ok(()),
    }
}
