use crate::types::NetworkError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A grayscale image with one byte per pixel, stored row by row.
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Image {
    /// Creates an image from its row-major pixels.
    ///
    /// Fails with a DimensionMismatch if there are not exactly `width * height` pixels.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Image, NetworkError> {
        if pixels.len() != width * height {
            return Err(NetworkError::DimensionMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }

        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// Creates an image from a list of rows, which must all be of the same length.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Image, NetworkError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);

        let mut pixels = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.len() != width {
                return Err(NetworkError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            pixels.extend_from_slice(row);
        }

        Image::new(width, rows.len(), pixels)
    }

    /// The amount of pixels in every row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The amount of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// All of the pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at column **x** of row **y**.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Flattens the image row-major into `width * height` values scaled to `[0, 1]` by dividing
    /// them by 255.
    pub fn normalize(&self) -> Vec<f64> {
        self.pixels.iter().map(|pixel| *pixel as f64 / 255.0).collect()
    }

    /// Halves the resolution by averaging every 2x2 block of pixels, truncating the average.
    ///
    /// An odd last row or column has no complete block and is dropped.
    pub fn reduce_resolution(&self) -> Image {
        let width = self.width / 2;
        let height = self.height / 2;

        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let top = (2 * y) * self.width + 2 * x;
                let bottom = top + self.width;
                let sum = self.pixels[top] as u32
                    + self.pixels[top + 1] as u32
                    + self.pixels[bottom] as u32
                    + self.pixels[bottom + 1] as u32;
                pixels.push((sum / 4) as u8);
            }
        }

        Image {
            width,
            height,
            pixels,
        }
    }
}
