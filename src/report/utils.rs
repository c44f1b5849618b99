use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::style::Color;

/// 将颜色字符串转换为ratatui的Color，未知名称回落到白色
pub fn parse_color(color_str: &str) -> Color {
    match color_str.trim().to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        // 灰色系
        "gray" | "grey" => Color::Gray,
        "dark_gray" | "dark_grey" => Color::DarkGray,
        // 亮色
        "light_red" => Color::LightRed,
        "light_green" => Color::LightGreen,
        "light_yellow" => Color::LightYellow,
        "light_blue" => Color::LightBlue,
        "light_magenta" => Color::LightMagenta,
        "light_cyan" => Color::LightCyan,
        _ => Color::White,
    }
}

/// 是否为退出按键：配置的退出键或 Esc
pub fn is_quit_key(key_event: &KeyEvent, quit_key: &str) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }
    match key_event.code {
        KeyCode::Esc => true,
        KeyCode::Char(c) => quit_key.chars().eq(std::iter::once(c)),
        _ => false,
    }
}
