// ABOUTME: Owned single-channel coverage buffer with bounds-checked access.
// ABOUTME: Glyphs are drawn through clipped regions instead of raw offsets.

use crate::atlas::AtlasError;

/// Row-major 8-bit coverage buffer. Stride always equals width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Allocate a zeroed buffer, reporting overflow or allocation failure
    /// instead of aborting.
    pub fn new(width: u32, height: u32) -> Result<Self, AtlasError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(AtlasError::Allocation { width, height })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| AtlasError::Allocation { width, height })?;
        data.resize(len, 0);

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap existing pixels. Returns None if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of two consecutive rows
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.stride() + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Write one pixel. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: u8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride();
        Some(&self.data[start..start + self.stride()])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// A `width × height` window whose top-left corner sits at `(x, y)`.
    /// The origin may be negative or past the edge; writes are clipped.
    pub fn region_mut(&mut self, x: i32, y: i32, width: u32, height: u32) -> BitmapRegion<'_> {
        BitmapRegion {
            bitmap: self,
            origin_x: x,
            origin_y: y,
            width,
            height,
            clipped: 0,
        }
    }
}

/// Mutable window into a [`Bitmap`], used as a rasterizer's destination
pub struct BitmapRegion<'a> {
    bitmap: &'a mut Bitmap,
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
    clipped: usize,
}

impl BitmapRegion<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write a pixel in region-local coordinates.
    /// Pixels outside the region or the buffer are dropped and counted.
    pub fn put(&mut self, x: u32, y: u32, value: u8) {
        if x >= self.width || y >= self.height {
            self.clipped += 1;
            return;
        }
        let dst_x = self.origin_x as i64 + x as i64;
        let dst_y = self.origin_y as i64 + y as i64;
        let in_bounds = dst_x >= 0
            && dst_y >= 0
            && dst_x < self.bitmap.width as i64
            && dst_y < self.bitmap.height as i64;
        if in_bounds {
            self.bitmap.set(dst_x as u32, dst_y as u32, value);
        } else {
            self.clipped += 1;
        }
    }

    /// Copy a tightly packed `src_width`-wide coverage image into the region
    pub fn blit(&mut self, src: &[u8], src_width: usize) {
        if src_width == 0 {
            return;
        }
        for (y, row) in src.chunks(src_width).enumerate() {
            for (x, &value) in row.iter().enumerate() {
                self.put(x as u32, y as u32, value);
            }
        }
    }

    /// Number of pixels dropped so far
    pub fn clipped(&self) -> usize {
        self.clipped
    }
}
