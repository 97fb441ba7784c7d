//! Font files shared by the tests.

/// DejaVu Serif, a TrueType font with quadratic outlines.
pub static DEJAVU_SERIF: &[u8] = include_bytes!("../test_data/ttf/DejaVuSerif.ttf");

/// The same font in a WOFF 1.0 container.
pub static DEJAVU_SERIF_WOFF: &[u8] = include_bytes!("../test_data/woff/DejaVuSerif.woff");

/// Source Serif 4 Regular in a WOFF2 container.
pub static SOURCE_SERIF_WOFF2: &[u8] =
    include_bytes!("../test_data/woff2/SourceSerif4-Regular.woff2");
