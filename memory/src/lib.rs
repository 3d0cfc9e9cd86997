mod bitmap;

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use log::{debug, warn};

pub use bitmap::Bitmap;

#[derive(Debug, PartialEq)]
pub enum MemoryError {
    OverCapacity,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OverCapacity => write!(f, "frame number is over capacity"),
        }
    }
}

impl std::error::Error for MemoryError {}

/// Receiver of the reference/modify bits a TLB observed for a frame.
///
/// The TLB calls this when it evicts a valid entry or writes its entries
/// back, so that the owner of the per-frame bitmaps never loses state the
/// hardware accumulated while the translation was cached.
pub trait FrameBits {
    fn record_reference_bit(&self, frame: u32, bit: bool);
    fn record_modify_bit(&self, frame: u32, bit: bool);
}

#[derive(Debug)]
struct Bitmaps {
    reference: Bitmap,
    modify: Bitmap,
}

/// Per-frame reference and modify bitmaps of physical memory.
///
/// Clones share the same bitmaps.
#[derive(Debug, Clone)]
pub struct FrameBitmaps {
    num_frames: usize,
    bitmaps: Arc<Mutex<Bitmaps>>,
}

impl FrameBitmaps {
    pub fn new(num_frames: usize) -> Self {
        debug!("Allocating R/M bitmaps for {} frames", num_frames);
        Self {
            num_frames,
            bitmaps: Arc::new(Mutex::new(Bitmaps {
                reference: Bitmap::new(num_frames),
                modify: Bitmap::new(num_frames),
            })),
        }
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn check_frame(&self, frame: u32) -> Result<(), MemoryError> {
        if frame as usize >= self.num_frames {
            return Err(MemoryError::OverCapacity);
        }
        Ok(())
    }

    pub fn is_referenced(&self, frame: u32) -> Result<bool, MemoryError> {
        self.check_frame(frame)?;
        let bitmaps = self.bitmaps.lock().unwrap();
        Ok(bitmaps.reference.get(frame as usize))
    }

    pub fn is_modified(&self, frame: u32) -> Result<bool, MemoryError> {
        self.check_frame(frame)?;
        let bitmaps = self.bitmaps.lock().unwrap();
        Ok(bitmaps.modify.get(frame as usize))
    }

    pub fn set_reference_bit(&self, frame: u32, bit: bool) -> Result<(), MemoryError> {
        self.check_frame(frame)?;
        let mut bitmaps = self.bitmaps.lock().unwrap();
        bitmaps.reference.set(frame as usize, bit);
        Ok(())
    }

    pub fn set_modify_bit(&self, frame: u32, bit: bool) -> Result<(), MemoryError> {
        self.check_frame(frame)?;
        let mut bitmaps = self.bitmaps.lock().unwrap();
        bitmaps.modify.set(frame as usize, bit);
        Ok(())
    }

    /// Clears the R bit of every frame. The M bits are left alone.
    pub fn clear_reference_bits(&self) {
        let mut bitmaps = self.bitmaps.lock().unwrap();
        bitmaps.reference.clear();
    }

    /// Forgets both bits of a frame, e.g. once it has been paged out.
    pub fn clear_frame(&self, frame: u32) -> Result<(), MemoryError> {
        self.check_frame(frame)?;
        let mut bitmaps = self.bitmaps.lock().unwrap();
        bitmaps.reference.set(frame as usize, false);
        bitmaps.modify.set(frame as usize, false);
        Ok(())
    }

    pub fn referenced_frames(&self) -> usize {
        self.bitmaps.lock().unwrap().reference.count_ones()
    }

    pub fn modified_frames(&self) -> usize {
        self.bitmaps.lock().unwrap().modify.count_ones()
    }
}

impl FrameBits for FrameBitmaps {
    fn record_reference_bit(&self, frame: u32, bit: bool) {
        if let Err(e) = self.set_reference_bit(frame, bit) {
            warn!("Dropping R bit of frame {}: {}", frame, e);
        }
    }

    fn record_modify_bit(&self, frame: u32, bit: bool) {
        if let Err(e) = self.set_modify_bit(frame, bit) {
            warn!("Dropping M bit of frame {}: {}", frame, e);
        }
    }
}
