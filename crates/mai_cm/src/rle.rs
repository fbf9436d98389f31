//! Run-length compression of pixel data.
//!
//! The stream is a sequence of segments, each starting with a tag byte:
//!
//! - `0x00..=0x7F`: a literal run, the tag is the number of pixels copied verbatim
//!   from the bytes that follow.
//! - `0x80..=0xFF`: a repeat run, `tag & 0x7F` copies of the single pixel that follows.
//!
//! Decoding accepts any sequence of segments. The encoder never writes empty
//! segments or repeats shorter than two pixels.

use tracing::instrument;

use crate::error::{Error, Result};

/// Longest run a single segment can describe
pub const MAX_RUN: usize = 0x7F;

const REPEAT_FLAG: u8 = 0x80;

/// One length-tagged unit of the run-length stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Pixels copied verbatim
    Literal(&'a [u8]),
    /// A single pixel repeated `count` times
    Repeat {
        /// The repeated pixel
        pixel: &'a [u8],
        /// Number of copies
        count: u8,
    },
}

impl Segment<'_> {
    /// Number of pixels this segment expands to
    pub fn pixels(&self, pixel_size: usize) -> usize {
        match self {
            Segment::Literal(data) => data.len() / pixel_size,
            Segment::Repeat { count, .. } => *count as usize,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>, pixel_size: usize) {
        match self {
            Segment::Literal(data) => {
                out.push((data.len() / pixel_size) as u8);
                out.extend_from_slice(data);
            }
            Segment::Repeat { pixel, count } => {
                out.push(REPEAT_FLAG | count);
                out.extend_from_slice(pixel);
            }
        }
    }
}

/// Iterator over the segments of compressed data
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    data: &'a [u8],
    position: usize,
    pixel_size: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position;
        let tag = *self.data.get(position)?;
        let body = position + 1;
        let available = self.data.len() - body;

        let needed = if tag & REPEAT_FLAG == 0 {
            tag as usize * self.pixel_size
        } else {
            self.pixel_size
        };

        if needed > available {
            self.position = self.data.len();
            return Some(Err(Error::TruncatedSegment {
                position,
                needed,
                available,
            }));
        }

        let bytes = &self.data[body..body + needed];
        self.position = body + needed;

        Some(Ok(if tag & REPEAT_FLAG == 0 {
            Segment::Literal(bytes)
        } else {
            Segment::Repeat {
                pixel: bytes,
                count: tag & !REPEAT_FLAG,
            }
        }))
    }
}

/// Parse compressed data into its segments.
pub fn segments(data: &[u8], pixel_size: usize) -> Result<Segments<'_>> {
    if pixel_size == 0 {
        return Err(Error::InvalidPixelSize);
    }

    Ok(Segments {
        data,
        position: 0,
        pixel_size,
    })
}

/// Decompress the whole of `data`.
///
/// A segment declaring more bytes than remain in `data` is an error.
#[instrument(skip(data), fields(len = data.len()), err)]
pub fn decode(data: &[u8], pixel_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for segment in segments(data, pixel_size)? {
        match segment? {
            Segment::Literal(pixels) => out.extend_from_slice(pixels),
            Segment::Repeat { pixel, count } => {
                for _ in 0..count {
                    out.extend_from_slice(pixel);
                }
            }
        }
    }
    Ok(out)
}

/// Greedy segment planner used by [`encode`]
struct Planner<'a> {
    pixels: &'a [u8],
    pixel_size: usize,
    count: usize,
    position: usize,
}

impl<'a> Planner<'a> {
    fn pixel(&self, index: usize) -> &'a [u8] {
        let start = index * self.pixel_size;
        &self.pixels[start..start + self.pixel_size]
    }

    /// Three identical pixels start at `index`
    fn repeat_starts(&self, index: usize) -> bool {
        index + 2 < self.count
            && self.pixel(index) == self.pixel(index + 1)
            && self.pixel(index + 1) == self.pixel(index + 2)
    }
}

impl<'a> Iterator for Planner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        if start >= self.count {
            return None;
        }

        let first = self.pixel(start);
        let mut run = 1;
        while start + run < self.count && run < MAX_RUN && self.pixel(start + run) == first {
            run += 1;
        }

        if run >= 2 {
            self.position += run;
            return Some(Segment::Repeat {
                pixel: first,
                count: run as u8,
            });
        }

        // Pairs stay inside the literal, only three equal pixels are worth a repeat
        let mut end = start + 1;
        while end < self.count && end - start < MAX_RUN && !self.repeat_starts(end) {
            end += 1;
        }

        self.position = end;
        Some(Segment::Literal(
            &self.pixels[start * self.pixel_size..end * self.pixel_size],
        ))
    }
}

/// Compress `pixels`, whose length must be a multiple of `pixel_size`.
#[instrument(skip(pixels), fields(len = pixels.len()), err)]
pub fn encode(pixels: &[u8], pixel_size: usize) -> Result<Vec<u8>> {
    if pixel_size == 0 {
        return Err(Error::InvalidPixelSize);
    }
    if pixels.len() % pixel_size != 0 {
        return Err(Error::PixelAlignment {
            len: pixels.len(),
            pixel_size,
        });
    }

    let planner = Planner {
        pixels,
        pixel_size,
        count: pixels.len() / pixel_size,
        position: 0,
    };

    let mut out = Vec::with_capacity(pixels.len() / 2 + 1);
    for segment in planner {
        segment.write_to(&mut out, pixel_size);
    }
    Ok(out)
}
