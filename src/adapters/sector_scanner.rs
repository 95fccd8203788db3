use crate::domain::{DEFAULT_SECTOR_SIZE, ScanResult};
use crate::error::ScanError;
use crate::ports::SectorScanPort;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Fixed-size scratch buffer reused across every file a scanner visits.
pub struct SectorBuffer {
    bytes: Box<[u8]>,
}

impl SectorBuffer {
    pub fn new(sector_size: usize) -> Result<Self, ScanError> {
        if sector_size == 0 {
            return Err(ScanError::InvalidSectorSize(sector_size));
        }
        Ok(Self {
            bytes: vec![0u8; sector_size].into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fills the first `len` bytes from `reader` and returns exactly that prefix,
    /// so stale bytes past `len` are never observed.
    fn fill<R: Read>(&mut self, reader: &mut R, len: usize) -> io::Result<&[u8]> {
        let sector = &mut self.bytes[..len];
        reader.read_exact(sector)?;
        Ok(sector)
    }
}

/// Walks a file sector by sector and counts the sectors that are entirely zero.
///
/// The scanner owns its buffer, so one instance scans files sequentially.
/// Separate instances share nothing and may run on different threads.
pub struct SectorScanner {
    buffer: SectorBuffer,
}

impl SectorScanner {
    pub fn new(sector_size: usize) -> Result<Self, ScanError> {
        Ok(Self {
            buffer: SectorBuffer::new(sector_size)?,
        })
    }

    pub fn sector_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn scan(&mut self, path: &Path) -> Result<ScanResult, ScanError> {
        let open_error = |source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        };

        let not_regular = || {
            open_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ))
        };

        // Opening a FIFO or device for reading can block, so reject those before opening.
        if !fs::metadata(path).map_err(open_error)?.is_file() {
            return Err(not_regular());
        }

        let mut file = File::open(path).map_err(open_error)?;
        let metadata = file.metadata().map_err(open_error)?;
        if !metadata.is_file() {
            return Err(not_regular());
        }

        let size = metadata.len();
        self.scan_reader(&mut file, size)
            .map_err(|(sector, source)| ScanError::Read {
                path: path.to_path_buf(),
                sector,
                source,
            })
    }

    /// Classifies `size` bytes from `reader`. On failure returns the index of the
    /// sector being read alongside the I/O error.
    fn scan_reader<R: Read>(
        &mut self,
        reader: &mut R,
        size: u64,
    ) -> Result<ScanResult, (u64, io::Error)> {
        let sector_size = self.buffer.len() as u64;
        let sector_count = ScanResult::sector_count_for(size, sector_size);
        let tail_len = match size % sector_size {
            0 => sector_size,
            remainder => remainder,
        };

        let mut empty_sector_count = 0;
        for sector in 0..sector_count {
            let len = if sector + 1 == sector_count {
                tail_len
            } else {
                sector_size
            };

            let bytes = self
                .buffer
                .fill(reader, len as usize)
                .map_err(|e| (sector, e))?;

            if bytes.iter().all(|&b| b == 0) {
                empty_sector_count += 1;
            }
        }

        Ok(ScanResult::new(size, sector_count, empty_sector_count))
    }
}

impl Default for SectorScanner {
    fn default() -> Self {
        Self {
            buffer: SectorBuffer {
                bytes: vec![0u8; DEFAULT_SECTOR_SIZE].into_boxed_slice(),
            },
        }
    }
}

impl SectorScanPort for SectorScanner {
    fn sector_size(&self) -> usize {
        SectorScanner::sector_size(self)
    }

    fn scan(&mut self, path: &Path) -> Result<ScanResult, ScanError> {
        SectorScanner::scan(self, path)
    }
}
