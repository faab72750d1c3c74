//! Names of the export directory and of the output file.
//!
//! Both names carry the run date as `YYMMDD`; the file name also carries a random serial so that
//! repeated runs on the same day rarely collide. The date and the serial are injected through
//! [`ExportNaming::new`], which keeps the names deterministic under test.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::Result;

/// Largest serial appended to output file names.
pub const MAX_SERIAL: u32 = 100;

/// Date stamp and serial of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportNaming {
    date: NaiveDate,
    serial: u32,
}

impl ExportNaming {
    /// Creates a naming from an explicit date and serial.
    pub fn new(date: NaiveDate, serial: u32) -> Self {
        Self { date, serial }
    }

    /// Uses today's local date and a random serial in `0..=MAX_SERIAL` drawn from the operating
    /// system's random source.
    pub fn now() -> Result<Self> {
        let mut bytes = [0u8; 4];
        getrandom::getrandom(&mut bytes)?;
        Ok(Self::new(
            Local::now().date_naive(),
            serial_from_random(u32::from_le_bytes(bytes)),
        ))
    }

    /// Returns the serial of the output file.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the `YYMMDD` date stamp.
    pub fn stamp(&self) -> String {
        self.date.format("%y%m%d").to_string()
    }

    /// Returns `{YYMMDD}_Book_{serial}.pdf`.
    pub fn file_name(&self) -> String {
        format!("{}_Book_{}.pdf", self.stamp(), self.serial)
    }

    /// Returns `{YYMMDD}_{export_dir}`.
    ///
    /// Only the last component of `export_dir` gets the prefix; its parent is kept. When
    /// `export_dir` has no last component to prefix (`.`, `..`, or a trailing `..`), the
    /// directory is the bare `{YYMMDD}` inside the parent of `export_dir`.
    pub fn directory(&self, export_dir: impl AsRef<Path>) -> PathBuf {
        let export_dir = export_dir.as_ref();
        let name = match export_dir.file_name() {
            Some(name) => format!("{}_{}", self.stamp(), name.to_string_lossy()),
            None => self.stamp(),
        };
        match export_dir.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}

fn serial_from_random(value: u32) -> u32 {
    value % (MAX_SERIAL + 1)
}
