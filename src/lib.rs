/*!
Incremental Mandelbrot rendering for small fixed-size screens.

[`Mandelbrot`] keeps a grid of escape-time counts in sync with a pannable,
zoomable view. Panning scrolls the cached grid and recomputes only the
uncovered strips; [`BorderScan`](render::BorderScan) then evaluates just the
pixels on contours between differing counts and fills the regions they
enclose.

[`explorer::Explorer`] drives an engine from button input, colours the result
and plays the zoom transition, leaving only window and presentation to the
binary.
*/

pub mod arithmetic;
pub mod colour;
pub mod config;
pub mod explorer;
pub mod geometry;
pub mod grid;
pub mod kernel;
pub mod mandelbrot;
pub mod pixel;
pub mod queue;
pub mod render;
pub mod viewport;

pub use mandelbrot::Mandelbrot;
