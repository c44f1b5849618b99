use crate::report::chart::SummaryChart;
use crate::report::utils::is_quit_key;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;

/// 全屏显示汇总图，直到按下退出键
pub struct SummaryViewer {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    quit_key: String,
}

impl SummaryViewer {
    pub fn new(quit_key: &str) -> Result<Self> {
        // 设置终端
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            quit_key: quit_key.to_string(),
        })
    }

    pub fn run(&mut self, chart: &SummaryChart) -> Result<()> {
        let result = self.event_loop(chart);
        // 无论循环是否出错都恢复终端
        self.cleanup()?;
        result
    }

    fn event_loop(&mut self, chart: &SummaryChart) -> Result<()> {
        loop {
            self.terminal.draw(|f| chart.draw(f))?;

            // 窗口大小变化等事件只触发重绘
            if let Event::Key(key) = event::read()? {
                if is_quit_key(&key, &self.quit_key) {
                    return Ok(());
                }
            }
        }
    }

    // 清理终端设置
    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
