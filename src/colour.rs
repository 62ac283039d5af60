//! Colouring algorithms.

use fnv::{FnvHashMap, FnvHashSet};
use log::trace;
use rayon::prelude::ParallelIterator;

use crate::{
    config::MAX_LOOPS,
    geometry::{Position, Rect},
    grid::{Cell, CountGrid, Grid},
    pixel::Rgba,
};

pub const PALETTE_SIZE: usize = 256;

/// Six eight-step ramps: black, blue, cyan, white, yellow, red and back to
/// black. Points inside the set are black.
pub struct Palette {
    colours: [Rgba; PALETTE_SIZE],
}

impl Palette {
    pub fn new() -> Self {
        let mut colours = [Rgba::BLACK; PALETTE_SIZE];
        for (i, colour) in colours.iter_mut().enumerate() {
            let k = (i as u8 & 0x7) * 2;
            *colour = match (i >> 3) % 6 {
                0 => Rgba::from_rgb4(0, 0, k),
                1 => Rgba::from_rgb4(0, k, 15),
                2 => Rgba::from_rgb4(k, 15, 15),
                3 => Rgba::from_rgb4(15, 15, 15 - k),
                4 => Rgba::from_rgb4(15, 15 - k, 0),
                _ => Rgba::from_rgb4(15 - k, 0, 0),
            };
        }
        Self { colours }
    }

    /// Colour of a packed grid cell.
    pub fn colour(&self, cell: u8) -> Rgba {
        match Cell::from_raw(cell) {
            Cell::Computed(MAX_LOOPS) => Rgba::BLACK,
            _ => self.colours[cell as usize % PALETTE_SIZE],
        }
    }

    /// Writes the colour of every cell outside `keep` into `frame`.
    pub fn update_colours(&self, counts: &CountGrid, frame: &mut Grid<Rgba>, keep: Rect) {
        trace!("begin palette colouring");

        debug_assert!(frame.width() == counts.width() && frame.height() == counts.height());

        frame.par_rows_mut().for_each(|(y, row)| {
            for (x, (colour, &cell)) in row.iter_mut().zip(counts.row(y)).enumerate() {
                if !keep.contains(Position::new(x as i32, y)) {
                    *colour = self.colour(cell);
                }
            }
        });

        trace!("end palette colouring");
    }

    /// Colour at `position` in `[0, 1)` along the whole palette.
    pub fn sample(&self, position: f32) -> Rgba {
        let index = (position * PALETTE_SIZE as f32) as usize;
        self.colours[index.min(PALETTE_SIZE - 1)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// Histogram-based colouring algorithm ([Wikipedia](https://en.wikipedia.org/wiki/Plotting_algorithms_for_the_Mandelbrot_set#Histogram_coloring)).
///
/// Each escape count is coloured by the fraction of escaped pixels with a
/// smaller count, so the palette is spread evenly over whatever is on screen.
pub struct HistogramColouring {
    total_samples: usize,
    bucket_labels: Vec<u8>,
    histogram: FnvHashMap<u8, u32>,
    histogram_ranges: FnvHashMap<u8, f32>,
}

impl HistogramColouring {
    pub fn new() -> Self {
        Self {
            total_samples: 0,
            bucket_labels: Vec::new(),
            histogram: FnvHashMap::default(),
            histogram_ranges: FnvHashMap::default(),
        }
    }

    pub fn reset(&mut self) {
        self.total_samples = 0;
        self.bucket_labels.clear();
        self.histogram.clear();
        self.histogram_ranges.clear();
    }

    /// Position of `count` in the cumulative distribution, if any escaped
    /// pixel had that count.
    pub fn range(&self, count: u8) -> Option<f32> {
        self.histogram_ranges.get(&count).copied()
    }

    /// Rebuilds the histogram from `counts` and writes a colour for every
    /// cell into `frame`.
    pub fn update_colours(&mut self, counts: &CountGrid, palette: &Palette, frame: &mut Grid<Rgba>) {
        trace!("begin histogram colouring");

        debug_assert!(frame.width() == counts.width() && frame.height() == counts.height());

        self.reset();
        for y in 0..counts.height() {
            for &cell in counts.row(y) {
                if let Cell::Computed(count) = Cell::from_raw(cell) {
                    if count < MAX_LOOPS {
                        let value = self.histogram.entry(count).or_insert_with(|| {
                            self.bucket_labels.push(count);
                            0
                        });
                        *value += 1;
                        self.total_samples += 1;
                    }
                }
            }
        }

        debug_assert_eq!(
            self.total_samples,
            self.histogram.values().map(|value| *value as usize).sum()
        );

        debug_assert!(
            self.bucket_labels.len()
                == self
                    .bucket_labels
                    .iter()
                    .copied()
                    .collect::<FnvHashSet<u8>>()
                    .len(),
            "bucket_labels contains duplicates: {:?}",
            self.bucket_labels
        );
        self.bucket_labels.sort_unstable();

        let mut acc = 0;
        let total_samples = self.total_samples as f32;
        for bucket_label in &self.bucket_labels {
            self.histogram_ranges
                .insert(*bucket_label, acc as f32 / total_samples);
            acc += self.histogram[bucket_label];
        }

        let ranges = &self.histogram_ranges;
        frame.par_rows_mut().for_each(|(y, row)| {
            for (colour, &cell) in row.iter_mut().zip(counts.row(y)) {
                *colour = match Cell::from_raw(cell) {
                    Cell::Computed(count) => ranges
                        .get(&count)
                        .map_or(Rgba::BLACK, |range| palette.sample(*range)),
                    _ => Rgba::BLACK,
                };
            }
        });

        trace!("end histogram colouring");
    }
}

impl Default for HistogramColouring {
    fn default() -> Self {
        Self::new()
    }
}
