/// One bit per frame, packed eight frames to a byte.
#[derive(Debug, Clone)]
pub struct Bitmap {
    bitmap: Vec<u8>,
    len: usize,
}

impl Bitmap {
    /// How many bytes are required to store `len` bits
    pub fn size(len: usize) -> usize {
        len / 8 + if len % 8 == 0 { 0 } else { 1 }
    }

    pub fn new(len: usize) -> Self {
        let mut bitmap = Vec::new();
        bitmap.resize(Self::size(len), 0);
        Bitmap { bitmap, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        self.bitmap[index / 8] & (1 << (index % 8)) != 0
    }

    pub fn set(&mut self, index: usize, bit: bool) {
        if bit {
            self.bitmap[index / 8] |= 1 << (index % 8);
        } else {
            self.bitmap[index / 8] &= !(1 << (index % 8));
        }
    }

    pub fn clear(&mut self) {
        for byte in self.bitmap.iter_mut() {
            *byte = 0;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.bitmap.iter().map(|byte| byte.count_ones() as usize).sum()
    }
}
