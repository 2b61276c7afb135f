pub mod comparison;
pub mod geometry;
pub mod hit_tester;
pub mod interaction;
pub mod layout;
pub mod ranking;
pub mod raster;
pub mod render;
pub mod style;
pub mod tooltip;

pub use comparison::{ComparisonSummary, NEW_TERRITORY_PREVIEW, NewTerritoryPreview};
pub use geometry::{Circle, Rect, Vec2};
pub use hit_tester::HitTester;
pub use interaction::{CursorStyle, InteractionResponse, PointerInteraction};
pub use layout::{BubbleLayouter, ClusterLayout, LayoutCache, PlacedCluster, Viewport};
pub use ranking::{DEFAULT_MAX_BARS, RankedBar, RankedItem, items_from_snapshot, rank_bars};
pub use raster::RasterSurface;
pub use render::{
    DrawCommand, FontFamily, FontSpec, Frame, RenderState, Surface, TextAlign, render,
    truncate_label,
};
pub use style::{
    BubbleStyle, Color, HighlightClass, LegendEntry, highlight_style, legend_entries,
};
pub use tooltip::{TOOLTIP_OFFSET, TooltipContent, place_tooltip};
