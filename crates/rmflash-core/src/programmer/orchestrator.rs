//! Detection and write flows

use std::path::{Path, PathBuf};

use super::output::{classify_write_failure, parse_device_id};
use super::select::{self, Chooser};
use super::tool::ProgrammerTool;
use crate::chip::{FlashCatalog, FlashPart};
use crate::error::{Error, Result};

/// Where the orchestrator is in its current flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing started yet
    Idle,
    /// Querying the programmer for the device ID
    Detecting,
    /// Device identified
    Detected(FlashPart),
    /// Device could not be identified
    DetectFailed,
    /// Choosing the image to write
    Selecting,
    /// Programmer is writing the image
    Writing,
    /// Image written
    Done,
    /// Writing failed
    WriteFailed,
}

/// Drives a [`ProgrammerTool`] through detection and writing
pub struct Orchestrator<T> {
    tool: T,
    catalog: FlashCatalog,
    image_size: u64,
    phase: Phase,
}

impl<T: ProgrammerTool> Orchestrator<T> {
    /// Create an orchestrator that writes images of exactly `image_size` bytes
    pub fn new(tool: T, catalog: FlashCatalog, image_size: u64) -> Self {
        Self {
            tool,
            catalog,
            image_size,
            phase: Phase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("Programmer phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Query the device ID of the connected flash
    ///
    /// Any failure to obtain a non-zero ID is reported as
    /// [`Error::HardwareIo`].
    pub fn detect_id(&mut self) -> Result<u32> {
        self.enter(Phase::Detecting);

        let id = match self.tool.query() {
            Ok(out) if out.success => {
                parse_device_id(&out.stdout).or_else(|| parse_device_id(&out.stderr))
            }
            Ok(out) => {
                log::debug!("Query failed with exit code {:?}: {}", out.code, out.stderr.trim());
                None
            }
            Err(e) => {
                log::debug!("Query could not run: {}", e);
                None
            }
        };

        match id {
            Some(id) => {
                log::debug!("Flash device id: 0x{:06x}", id);
                Ok(id)
            }
            None => {
                self.enter(Phase::DetectFailed);
                Err(Error::HardwareIo)
            }
        }
    }

    /// Detect the connected flash part
    pub fn detect_flash(&mut self) -> Result<FlashPart> {
        let id = self.detect_id()?;
        match self.catalog.lookup(id) {
            Ok(part) => {
                log::debug!("Flash device name: {}", part.name);
                self.enter(Phase::Detected(part));
                Ok(part)
            }
            Err(e) => {
                self.enter(Phase::DetectFailed);
                Err(e)
            }
        }
    }

    /// Check that `image` exists and has exactly the flash size
    pub fn check_image(&self, image: &Path) -> Result<()> {
        if !image.is_file() {
            return Err(Error::UnknownImage(format!(
                "cannot find the binary image file specified: {}",
                image.display()
            )));
        }

        let size = std::fs::metadata(image)?.len();
        if size != self.image_size {
            return Err(Error::InvalidImage(format!(
                "incorrect binary file size - expected: {} got {}",
                self.image_size, size
            )));
        }

        Ok(())
    }

    /// Write an image to flash
    ///
    /// The image is checked before the programmer is touched. When `part` is
    /// `None` the connected part is detected first. Known part names are
    /// passed on in their catalog spelling; others go to the tool as given.
    pub fn write_image(&mut self, image: &Path, part: Option<&str>) -> Result<()> {
        self.check_image(image)?;

        let part = match part {
            Some(name) => match self.catalog.find_by_name(name) {
                Some(known) => known.name.to_string(),
                None => name.to_string(),
            },
            None => self.detect_flash()?.name.to_string(),
        };

        log::info!("Writing {} to {}", image.display(), part);
        self.enter(Phase::Writing);

        let out = match self.tool.write(&part, image) {
            Ok(out) => out,
            Err(e) => {
                log::debug!("Write could not run: {}", e);
                self.enter(Phase::WriteFailed);
                return Err(Error::HardwareIo);
            }
        };

        if out.success {
            self.enter(Phase::Done);
            Ok(())
        } else {
            log::debug!("Write failed with exit code {:?}: {}", out.code, out.stderr.trim());
            self.enter(Phase::WriteFailed);
            Err(classify_write_failure(&out.stderr))
        }
    }

    /// Select an image and write it to flash
    ///
    /// Without an explicit path the image is chosen from `dir`. Returns the
    /// path that was written.
    pub fn write_selected(
        &mut self,
        explicit: Option<&Path>,
        dir: &Path,
        chooser: &mut dyn Chooser,
        part: Option<&str>,
    ) -> Result<PathBuf> {
        self.enter(Phase::Selecting);
        let image = select::select_image(explicit, dir, self.image_size, chooser)?
            .ok_or_else(|| {
                Error::UnknownImage("specify the binary image file to write to flash".into())
            })?;

        self.write_image(&image, part)?;
        Ok(image)
    }
}
