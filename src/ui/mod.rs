pub mod bar_chart;
pub mod map;
pub mod panels;
pub mod scatter;
