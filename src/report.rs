// 汇总图：绘制与全屏查看
pub mod chart;
pub mod utils;
pub mod viewer;

pub use chart::SummaryChart;
pub use viewer::SummaryViewer;
