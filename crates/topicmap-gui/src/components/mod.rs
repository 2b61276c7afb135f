pub mod cluster_map;
pub mod comparison_panel;
pub mod placeholders;
pub mod ranked_bars;
pub mod status;
