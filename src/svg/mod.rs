//! Pure svg markup helpers: the acceptance gate and render-time style isolation.

pub mod isolate;
pub mod validate;

pub use isolate::pre_process;
pub use validate::is_valid_svg;
