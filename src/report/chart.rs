use crate::models::{PerformanceRecord, PlotConfig, SeriesStats};
use crate::report::utils::parse_color;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};

const X_BOUNDS: [f64; 2] = [0.0, 4.0];
const Y_BOUNDS: [f64; 2] = [0.0, 100.0];
const BAR_WIDTH: f64 = 0.5;
// 每根柱子用多少条竖线填充
const BAR_FILL_LINES: usize = 40;

/// 一个指标对应的柱子
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBar {
    pub label: &'static str,
    pub x: f64,
    pub stats: SeriesStats,
    pub values: Vec<f64>,
}

impl SeriesBar {
    /// 误差线的上下端：下端为均值，上端为均值加标准差
    pub fn error_span(&self) -> (f64, f64) {
        (self.stats.mean, self.stats.mean + self.stats.std)
    }
}

/// 汇总图：每个指标的均值柱、单侧误差线和逐条数据散点
pub struct SummaryChart {
    bars: Vec<SeriesBar>,
    bar_color: Color,
    point_color: Color,
    error_color: Color,
    quit_key: String,
}

impl SummaryChart {
    pub fn new(record: &PerformanceRecord, plot: &PlotConfig) -> Self {
        let bars = record
            .series()
            .into_iter()
            .zip(record.stats())
            .enumerate()
            .map(|(i, ((label, values), stats))| SeriesBar {
                label,
                x: (i + 1) as f64,
                stats,
                values: values.to_vec(),
            })
            .collect();

        Self {
            bars,
            bar_color: parse_color(&plot.bar_color),
            point_color: parse_color(&plot.point_color),
            error_color: parse_color(&plot.error_color),
            quit_key: plot.quit_key.clone(),
        }
    }

    pub fn bars(&self) -> &[SeriesBar] {
        &self.bars
    }

    /// 一行文字形式的汇总
    pub fn summary_line(&self) -> String {
        self.bars()
            .iter()
            .map(|bar| format!("{} {:.2} ± {:.2}", bar.label, bar.stats.mean, bar.stats.std))
            .collect::<Vec<_>>()
            .join("  |  ")
    }

    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(f.area());

        self.draw_canvas(f, chunks[0]);
        self.draw_footer(f, chunks[1]);
    }

    fn draw_canvas(&self, f: &mut Frame, area: Rect) {
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title("Layer175 performance (%)")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .marker(Marker::Braille)
            .x_bounds(X_BOUNDS)
            .y_bounds(Y_BOUNDS)
            .paint(|ctx| {
                for bar in &self.bars {
                    let height = clamp_y(bar.stats.mean);
                    let left = bar.x - BAR_WIDTH / 2.0;
                    for step in 0..=BAR_FILL_LINES {
                        let x = left + BAR_WIDTH * step as f64 / BAR_FILL_LINES as f64;
                        ctx.draw(&CanvasLine::new(x, 0.0, x, height, self.bar_color));
                    }
                }
                ctx.layer();

                for bar in &self.bars {
                    let coords: Vec<(f64, f64)> =
                        bar.values.iter().map(|&v| (bar.x, clamp_y(v))).collect();
                    ctx.draw(&Points {
                        coords: &coords,
                        color: self.point_color,
                    });
                }
                ctx.layer();

                for bar in &self.bars {
                    let (low, high) = bar.error_span();
                    let (low, high) = (clamp_y(low), clamp_y(high));
                    let cap = BAR_WIDTH / 4.0;
                    ctx.draw(&CanvasLine::new(bar.x, low, bar.x, high, self.error_color));
                    ctx.draw(&CanvasLine::new(bar.x - cap, high, bar.x + cap, high, self.error_color));
                }

                for bar in &self.bars {
                    ctx.print(bar.x - BAR_WIDTH / 2.0, 0.0, bar.label);
                }
                for tick in [0.0, 50.0, 100.0] {
                    ctx.print(0.05, tick, format!("{}", tick));
                }
            });

        f.render_widget(canvas, area);
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let footer = Paragraph::new(self.summary_line())
            .block(
                Block::default()
                    .title(format!("Press '{}' to quit", self.quit_key))
                    .borders(Borders::ALL),
            )
            .alignment(Alignment::Center);
        f.render_widget(footer, area);
    }
}

fn clamp_y(value: f64) -> f64 {
    value.clamp(Y_BOUNDS[0], Y_BOUNDS[1])
}
