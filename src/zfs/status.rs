//! `zpool status` Topology Parser
//!
//! Recovers the pool → vdev → disk tree (plus the flat spares list) from the
//! human-oriented device table printed by `zpool status -L`:
//!
//! ```text
//!         NAME        STATE     READ WRITE CKSUM
//!         ssd_tank    ONLINE       0     0     0
//!           mirror-0  ONLINE       0     0     0
//!             sdc     ONLINE       0     0     0
//!             sda     ONLINE       0     0     0
//!         spares
//!           sdj       AVAIL
//! ```
//!
//! There is no grammar to lean on. Rows are classified purely by how far they
//! are indented past the `NAME STATE ... CKSUM` header:
//!
//! - depth 0: pool row, remembered as context only
//! - depth 1 (2 spaces): vdev row, or a spare when inside the `spares` list
//! - depth 2+ (4 or more spaces): physical device row
//!
//! Rows whose field count does not fit their depth are skipped. A malformed
//! error counter aborts the whole parse.

use crate::error::{ExporterError, Result};
use crate::zfs::types::{DeviceKind, TopologyRecord};

/// Spaces substituted for each tab so indentation widths are comparable
pub const TAB_WIDTH: usize = 8;

/// Context name `zpool status` uses for the standby device list
pub const SPARES: &str = "spares";

const VDEV_DEPTH: usize = 2;
const DISK_DEPTH: usize = 4;
const DEVICE_FIELDS: usize = 5;

/// Expand tabs to [`TAB_WIDTH`] spaces
pub fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Split raw command output into tab-expanded lines, in order
pub fn status_lines(output: &str) -> Vec<String> {
    output.lines().map(expand_tabs).collect()
}

fn padding(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_header(line: &str) -> bool {
    line.contains("NAME") && line.contains("STATE") && line.contains("CKSUM")
}

/// Context carried from one line to the next
#[derive(Debug, Default)]
struct TopologyState {
    /// Indentation of the current header; `None` while searching for one
    min_padding: Option<usize>,
    pool: String,
    vdev: String,
}

impl TopologyState {
    fn enter_block(&mut self, min_padding: usize) {
        self.min_padding = Some(min_padding);
        self.pool.clear();
        self.vdev.clear();
    }

    fn leave_block(&mut self) {
        self.min_padding = None;
        self.pool.clear();
        self.vdev.clear();
    }

    fn in_spares(&self) -> bool {
        self.pool == SPARES
    }

    fn device(&self, line: &str, fields: &[&str], kind: DeviceKind) -> Result<TopologyRecord> {
        let counter = |raw: &str| {
            raw.parse::<u64>()
                .map_err(|source| ExporterError::ParseCounter {
                    line: line.trim().to_string(),
                    source,
                })
        };

        let vdev = match kind {
            DeviceKind::Vdev => fields[0].to_string(),
            _ => self.vdev.clone(),
        };

        Ok(TopologyRecord {
            pool: self.pool.clone(),
            vdev,
            name: fields[0].to_string(),
            kind,
            state: fields[1].to_string(),
            read_errors: counter(fields[2])?,
            write_errors: counter(fields[3])?,
            checksum_errors: counter(fields[4])?,
        })
    }

    fn spare(&self, name: &str, state: &str) -> TopologyRecord {
        TopologyRecord {
            pool: self.pool.clone(),
            vdev: String::new(),
            name: name.to_string(),
            kind: DeviceKind::Spare,
            state: state.to_string(),
            read_errors: 0,
            write_errors: 0,
            checksum_errors: 0,
        }
    }
}

/// Parse tab-expanded `zpool status` lines into topology records
///
/// Lines before a `NAME STATE READ WRITE CKSUM` header are ignored. A line
/// indented less than the header closes the device table. Unlike a plain
/// single-table scan, parsing then looks for the next header instead of
/// stopping, so the output of several pools can be concatenated.
///
/// Disk rows that appear before any vdev row of their pool are skipped, so
/// every disk record refers to a vdev record emitted earlier.
///
/// # Errors
///
/// Returns [`ExporterError::ParseCounter`] if a vdev or disk row carries a
/// non-numeric error counter. No partial result is returned.
pub fn parse_pool_status<I, S>(lines: I) -> Result<Vec<TopologyRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    let mut state = TopologyState::default();

    for line in lines {
        let line = line.as_ref();

        let Some(min_padding) = state.min_padding else {
            if is_header(line) {
                state.enter_block(padding(line));
            }
            continue;
        };

        let current_padding = padding(line);
        if current_padding < min_padding {
            state.leave_block();
            if is_header(line) {
                state.enter_block(current_padding);
            }
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match current_padding - min_padding {
            0 => {
                if let Some(name) = fields.first() {
                    state.pool = name.to_string();
                    state.vdev.clear();
                }
            }
            VDEV_DEPTH => match fields.as_slice() {
                [marker] if *marker == SPARES => {
                    state.pool = SPARES.to_string();
                    state.vdev.clear();
                }
                [name, status] if state.in_spares() => {
                    records.push(state.spare(name, status));
                }
                _ if !state.in_spares() && fields.len() == DEVICE_FIELDS => {
                    let record = state.device(line, &fields, DeviceKind::Vdev)?;
                    state.vdev = record.name.clone();
                    records.push(record);
                }
                _ => {}
            },
            // Anything below a vdev is a physical device, however deep
            depth if depth >= DISK_DEPTH => {
                if fields.len() == DEVICE_FIELDS && !state.vdev.is_empty() {
                    records.push(state.device(line, &fields, DeviceKind::Disk)?);
                }
            }
            _ => {}
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSD_TANK: &str = "  pool: ssd_tank
 state: ONLINE
  scan: scrub repaired 0B in 02:44:52 with 0 errors on Sun Aug 14 03:08:54 2022
config:

\tNAME        STATE     READ WRITE CKSUM
\tssd_tank    ONLINE       0    13    26
\t  mirror-0  ONLINE       1    14    27
\t    sdc     ONLINE       2    15    28
\t    sda     ONLINE       3    16    29
\t  mirror-1  ONLINE       4    17    30
\t    sdh     ONLINE       5    18    31
\t    sdd     ONLINE       6    19    32
\t  mirror-2  ONLINE       7    20    33
\t    sde     ONLINE       8    21    34
\t    sdf     ONLINE       9    22    35
\t  mirror-3  ONLINE      10    23    36
\t    sdg     ONLINE      11    24    37
\t    sdi     ONLINE      12    25    38
\tspares
\t  sdj       AVAIL

errors: No known data errors
";

    fn record(
        pool: &str,
        vdev: &str,
        name: &str,
        kind: DeviceKind,
        state: &str,
        errors: (u64, u64, u64),
    ) -> TopologyRecord {
        TopologyRecord {
            pool: pool.to_string(),
            vdev: vdev.to_string(),
            name: name.to_string(),
            kind,
            state: state.to_string(),
            read_errors: errors.0,
            write_errors: errors.1,
            checksum_errors: errors.2,
        }
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\t  sdc"), "          sdc");
        assert_eq!(expand_tabs("no tabs"), "no tabs");
    }

    #[test]
    fn test_parse_mirrored_pool_with_spare() {
        let records = parse_pool_status(status_lines(SSD_TANK)).unwrap();

        assert_eq!(records.len(), 13);
        let count = |kind| records.iter().filter(|r| r.kind == kind).count();
        assert_eq!(count(DeviceKind::Vdev), 4);
        assert_eq!(count(DeviceKind::Disk), 8);
        assert_eq!(count(DeviceKind::Spare), 1);

        assert_eq!(
            records[0],
            record("ssd_tank", "mirror-0", "mirror-0", DeviceKind::Vdev, "ONLINE", (1, 14, 27))
        );
        assert_eq!(
            records[1],
            record("ssd_tank", "mirror-0", "sdc", DeviceKind::Disk, "ONLINE", (2, 15, 28))
        );
        assert_eq!(
            records[11],
            record("ssd_tank", "mirror-3", "sdi", DeviceKind::Disk, "ONLINE", (12, 25, 38))
        );
        assert_eq!(
            records[12],
            record("spares", "", "sdj", DeviceKind::Spare, "AVAIL", (0, 0, 0))
        );
    }

    #[test]
    fn test_bare_disks_are_vdevs() {
        let input = "\tNAME        STATE     READ WRITE CKSUM
\tscratch     ONLINE       0     0     0
\t  sdb       ONLINE       0     0     0
\t  sdc       FAULTED      3     1     0
";
        let records = parse_pool_status(status_lines(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind == DeviceKind::Vdev));
        assert_eq!(records[1].vdev, "sdc");
        assert_eq!(records[1].state, "FAULTED");
        assert_eq!(records[1].read_errors, 3);
    }

    #[test]
    fn test_malformed_counter_fails_whole_parse() {
        let input = "\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  mirror-0  ONLINE       0     0     0
\t    sda     ONLINE       0    x1     0
";
        let err = parse_pool_status(status_lines(input)).unwrap_err();
        assert!(matches!(err, ExporterError::ParseCounter { .. }));
        assert!(err.to_string().contains("sda"));
    }

    #[test]
    fn test_lines_before_header_are_ignored() {
        let records = parse_pool_status(["pool: tank", "config:", "  mirror-0 ONLINE 0 0 0"]).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_multiple_pools_reset_context() {
        let input = format!(
            "{SSD_TANK}
  pool: backup
 state: DEGRADED
config:

\tNAME        STATE     READ WRITE CKSUM
\tbackup      DEGRADED     0     0     0
\t  raidz1-0  DEGRADED     0     0     0
\t    sdk     ONLINE       0     0     0
\t    sdl     REMOVED      0     0     0

errors: No known data errors
"
        );
        let records = parse_pool_status(status_lines(&input)).unwrap();

        assert_eq!(records.len(), 16);
        let backup: Vec<_> = records.iter().filter(|r| r.pool == "backup").collect();
        assert_eq!(backup.len(), 3);
        assert!(backup[1..].iter().all(|r| r.vdev == "raidz1-0"));
        assert_eq!(backup[2].state, "REMOVED");
    }

    #[test]
    fn test_disk_without_vdev_is_skipped() {
        let input = "\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t    sda     ONLINE       0     0     0
\t  mirror-0  ONLINE       0     0     0
\t    sdb     ONLINE       0     0     0
";
        let records = parse_pool_status(status_lines(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "mirror-0");
        assert_eq!(records[1].name, "sdb");
        assert_eq!(records[1].vdev, "mirror-0");
    }

    #[test]
    fn test_deeper_rows_are_disks() {
        let input = "\tNAME          STATE     READ WRITE CKSUM
\ttank          ONLINE       0     0     0
\t  mirror-0    ONLINE       0     0     0
\t      sda     ONLINE       0     0     0
";
        let records = parse_pool_status(status_lines(input)).unwrap();
        assert_eq!(records[1].kind, DeviceKind::Disk);
        assert_eq!(records[1].vdev, "mirror-0");
    }
}
