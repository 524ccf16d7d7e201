pub mod figure;
pub mod render;

pub use figure::Figure;
pub use render::plot_candles;
