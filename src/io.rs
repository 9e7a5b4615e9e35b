//! Packet input and report output
//!
//! The analyzer itself never opens files; this module is the thin
//! collaborator that feeds it. Packet batches arrive as JSON Lines, one
//! decoded descriptor per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::analyzer::AnalysisReport;
use crate::core::PacketDescriptor;

/// Read a packet batch from a JSON Lines file
pub fn read_packets_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<PacketDescriptor>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open packet file: {}", path.display()))?;

    let mut packets = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let packet: PacketDescriptor = serde_json::from_str(&line)
            .with_context(|| format!("Invalid packet descriptor at {}:{}", path.display(), idx + 1))?;
        packets.push(packet);
    }

    debug!("Read {} packets from {}", packets.len(), path.display());
    Ok(packets)
}

/// Write an analysis report as pretty JSON
pub fn write_report_json<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to serialize report to {}", path.display()))?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransportProtocol;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_jsonl_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packets.jsonl");

        let packets = vec![
            PacketDescriptor::new(
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 2)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                40000,
                443,
                TransportProtocol::Tcp,
                60,
                1.0,
            ),
            PacketDescriptor::new(
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 3)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                40001,
                53,
                TransportProtocol::Udp,
                72,
                2.0,
            ),
        ];

        let mut lines = String::new();
        for pkt in &packets {
            lines.push_str(&serde_json::to_string(pkt).unwrap());
            lines.push('\n');
        }
        lines.push('\n'); // trailing blank line is tolerated
        std::fs::write(&path, lines).unwrap();

        let loaded = read_packets_jsonl(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].dst_port, 443);
        assert_eq!(loaded[1].protocol, TransportProtocol::Udp);
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"not\": \"a packet\"}\n").unwrap();

        assert!(read_packets_jsonl(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_packets_jsonl("/nonexistent/path.jsonl").is_err());
    }
}
